//! Turns image files into inline base64 payloads.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Base64 (standard alphabet, padded) without a data-URL header.
    pub data: String,
    pub mime_type: String,
}

impl Attachment {
    /// Size of the payload once decoded.
    pub fn byte_len(&self) -> usize {
        encoded_byte_len(&self.data)
    }
}

pub fn encoded_byte_len(data: &str) -> usize {
    let padding = data.bytes().rev().take_while(|b| *b == b'=').count();
    (data.len() / 4 * 3).saturating_sub(padding)
}

#[derive(Debug)]
pub enum AttachmentError {
    Read { path: PathBuf, source: io::Error },
}

impl fmt::Display for AttachmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for AttachmentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttachmentError::Read { source, .. } => Some(source),
        }
    }
}

pub fn is_image_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Content type declared by the file name, if any.
pub fn declared_content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

pub fn encode_bytes(bytes: &[u8], mime_type: &str) -> Option<Attachment> {
    if !is_image_type(mime_type) {
        return None;
    }
    Some(Attachment {
        data: STANDARD.encode(bytes),
        mime_type: mime_type.to_string(),
    })
}

/// Reads and encodes an image file. Files whose declared type is not an
/// image are ignored without being read.
pub async fn encode_file(path: &Path) -> Result<Option<Attachment>, AttachmentError> {
    let Some(mime_type) = declared_content_type(path).filter(|mime| is_image_type(mime)) else {
        debug!(path = %path.display(), "ignoring non-image attachment");
        return Ok(None);
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AttachmentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(encode_bytes(&bytes, &mime_type))
}
