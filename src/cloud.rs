//! Cloud pass-through endpoints (spec.md §6). Thin `reqwest` POSTs to an
//! external analysis service; this module never implements the far side
//! of any of these calls.
//!
//! Only reachable when the caller supplies `options.api_key` and
//! `options.api_base_url`, and only compiled in with the `cloud` feature.

#![cfg(feature = "cloud")]

use crate::error::CloudError;
use crate::model::{AnalyzeInput, Report};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

const ANALYZE_PATH: &str = "/api/v1/analyze";
const REDACT_PII_PATH: &str = "/api/v1/ai-analytics/sanitize";
const OPTIMIZE_PROMPT_PATH: &str = "/api/v1/compression/optimize";
const SANITIZE_PATH: &str = "/api/v1/ai-analytics/sanitize";

async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
    base_url: &str,
    path: &str,
    api_key: &str,
    body: &T,
) -> Result<R> {
    let client = reqwest::Client::new();
    let url = format!("{base_url}{path}");
    let response = client
        .post(url)
        .header("X-API-Key", api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| CloudError::RequestFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        return Err(CloudError::HttpStatus {
            status: status.as_u16(),
            body: body_text.chars().take(500).collect(),
        }
        .into());
    }

    response
        .json::<R>()
        .await
        .map_err(|e| CloudError::DecodeFailed(e.to_string()).into())
}

/// Sends `input` (with credentials stripped) to the remote `/analyze`
/// endpoint and returns the decoded [`Report`] (spec.md §6).
///
/// # Errors
///
/// Returns [`CloudError::MissingApiKey`] when `options.api_key` /
/// `options.api_base_url` are absent, and propagates transport/decode
/// failures otherwise.
pub async fn analyze_remote(input: &AnalyzeInput) -> Result<Report> {
    let (base_url, api_key) = credentials(input)?;
    let mut scrubbed = input.clone();
    scrubbed.options.api_key = None;
    scrubbed.options.api_base_url = None;
    post_json(base_url, ANALYZE_PATH, api_key, &scrubbed).await
}

/// Sends `text` to the remote PII-redaction endpoint and returns the
/// redacted text (spec.md §6).
///
/// # Errors
///
/// Same as [`analyze_remote`].
pub async fn redact_pii_remote(text: &str, input: &AnalyzeInput) -> Result<String> {
    let (base_url, api_key) = credentials(input)?;
    #[derive(Serialize)]
    struct Body<'a> {
        text: &'a str,
    }
    #[derive(serde::Deserialize)]
    struct Redacted {
        text: String,
    }
    let redacted: Redacted =
        post_json(base_url, REDACT_PII_PATH, api_key, &Body { text }).await?;
    Ok(redacted.text)
}

/// Sends `text` to the remote prompt-optimization endpoint and returns
/// the optimized text (spec.md §6).
///
/// # Errors
///
/// Same as [`analyze_remote`].
pub async fn optimize_prompt_remote(text: &str, input: &AnalyzeInput) -> Result<String> {
    let (base_url, api_key) = credentials(input)?;
    #[derive(Serialize)]
    struct Body<'a> {
        text: &'a str,
    }
    #[derive(serde::Deserialize)]
    struct Optimized {
        text: String,
    }
    let optimized: Optimized =
        post_json(base_url, OPTIMIZE_PROMPT_PATH, api_key, &Body { text }).await?;
    Ok(optimized.text)
}

/// Sends `text` to the remote sanitization endpoint and returns the
/// sanitized text (spec.md §6).
///
/// # Errors
///
/// Same as [`analyze_remote`].
pub async fn sanitize_remote(text: &str, input: &AnalyzeInput) -> Result<String> {
    let (base_url, api_key) = credentials(input)?;
    #[derive(Serialize)]
    struct Body<'a> {
        text: &'a str,
    }
    #[derive(serde::Deserialize)]
    struct Sanitized {
        text: String,
    }
    let sanitized: Sanitized = post_json(base_url, SANITIZE_PATH, api_key, &Body { text }).await?;
    Ok(sanitized.text)
}

fn credentials(input: &AnalyzeInput) -> Result<(&str, &str)> {
    let api_key = input
        .options
        .api_key
        .as_deref()
        .ok_or(CloudError::MissingApiKey)?;
    let base_url = input
        .options
        .api_base_url
        .as_deref()
        .ok_or(CloudError::MissingApiKey)?;
    Ok((base_url, api_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_missing_api_key() {
        let input = AnalyzeInput::default();
        let err = credentials(&input).unwrap_err();
        assert!(matches!(err, crate::Error::Cloud(CloudError::MissingApiKey)));
    }

    #[test]
    fn test_credentials_present() {
        let input = AnalyzeInput {
            options: crate::model::AnalyzeOptions {
                api_key: Some("key".to_string()),
                api_base_url: Some("https://example.com".to_string()),
                ..crate::model::AnalyzeOptions::default()
            },
            ..Default::default()
        };
        let (base_url, api_key) = credentials(&input).unwrap();
        assert_eq!(base_url, "https://example.com");
        assert_eq!(api_key, "key");
    }
}
