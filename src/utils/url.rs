//! Endpoint construction for the Gemini REST API.

/// Strip trailing slashes so endpoints can be appended without doubling them.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Build `{base}/models/{model}:{method}`.
///
/// A model given with its `models/` resource prefix is accepted as-is.
///
/// ```
/// use timmgpt::utils::url::model_endpoint_url;
///
/// assert_eq!(
///     model_endpoint_url(
///         "https://generativelanguage.googleapis.com/v1beta/",
///         "gemini-2.5-flash",
///         "streamGenerateContent"
///     ),
///     "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:streamGenerateContent"
/// );
/// ```
pub fn model_endpoint_url(base_url: &str, model: &str, method: &str) -> String {
    let model = model.trim().trim_start_matches('/');
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{}/models/{}:{}", normalize_base_url(base_url), model, method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://example.test/v1beta///"),
            "https://example.test/v1beta"
        );
        assert_eq!(
            normalize_base_url(" https://example.test/v1beta "),
            "https://example.test/v1beta"
        );
    }

    #[test]
    fn model_endpoint_url_accepts_prefixed_model_names() {
        assert_eq!(
            model_endpoint_url("http://localhost:8080", "models/gemini-pro", "generateContent"),
            "http://localhost:8080/models/gemini-pro:generateContent"
        );
        assert_eq!(
            model_endpoint_url("http://localhost:8080/", "/gemini-pro", "streamGenerateContent"),
            "http://localhost:8080/models/gemini-pro:streamGenerateContent"
        );
    }
}
