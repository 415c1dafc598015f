use crate::error::ProjectError;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use url::Url;

/// Derive the Frontend API origin from a publishable key.
///
/// Keys look like `pk_test_<base64("<host>$")>` or `pk_live_...`.
pub fn frontend_api_from_key(key: &str) -> Result<Url, ProjectError> {
    let encoded = key
        .strip_prefix("pk_test_")
        .or_else(|| key.strip_prefix("pk_live_"))
        .ok_or_else(|| ProjectError::InvalidPublishableKey("unknown key prefix".to_string()))?;

    let decoded = STANDARD
        .decode(encoded)
        .or_else(|_| STANDARD_NO_PAD.decode(encoded.trim_end_matches('=')))
        .map_err(|e| ProjectError::InvalidPublishableKey(e.to_string()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| ProjectError::InvalidPublishableKey(e.to_string()))?;

    let host = decoded
        .strip_suffix('$')
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ProjectError::InvalidPublishableKey("missing `$` terminator".to_string()))?;

    Ok(Url::parse(&format!("https://{host}"))?)
}
