//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the interaction loop that feeds key presses and stream
//!   updates into [`crate::core::app`] and redraws.
//! - [`renderer`] and [`transcript`]: frame composition and message bubbles.
//! - [`markdown`] and [`theme`]: reply formatting and styles.
//!
//! This layer presents and captures interaction state, while [`crate::core`]
//! owns the conversation and the remote session.

pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
pub mod transcript;
