//! Endpoint URL parsing.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Schemes accepted for the game server.
pub(crate) const WS_SCHEMES: &[&str] = &["ws", "wss"];

/// Schemes accepted for the matchmaking and engine services.
pub(crate) const HTTP_SCHEMES: &[&str] = &["http", "https"];

// ============================================================================
// Functions
// ============================================================================

/// Parses `raw` and checks its scheme against `schemes`.
///
/// Returns a human-readable reason on failure; callers pick the error kind.
pub(crate) fn parse(raw: &str, schemes: &[&str]) -> std::result::Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid URL {raw:?}: {e}"))?;

    if !schemes.contains(&url.scheme()) {
        return Err(format!(
            "URL {raw:?} must use {}, got {:?}",
            schemes.join(" or "),
            url.scheme()
        ));
    }

    Ok(url)
}

/// Appends path segments to a base URL, keeping any existing path.
///
/// `http://host/api` + `["match"]` gives `http://host/api/match`.
pub(crate) fn join(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

// ============================================================================
// Tests
// ============================================================================
