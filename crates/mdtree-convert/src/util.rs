//! Shared helpers.

use percent_encoding::percent_decode_str;

/// Percent-decode a URL, keeping the raw text when it does not decode to
/// valid UTF-8.
pub(crate) fn decode_url(url: &str, enabled: bool) -> String {
    if !enabled {
        return url.to_owned();
    }
    match percent_decode_str(url).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::debug!(url, error = %e, "Failed to decode URL, keeping it verbatim");
            url.to_owned()
        }
    }
}
