//! Output-format negotiation from the Accept header
//!
//! Detection is substring matching against the `image/avif` and
//! `image/webp` media-type tokens, checked in that order: AVIF wins
//! whenever both are acceptable. Anything else leaves the format unset
//! and the backend's default encoding applies.

use serde::Serialize;

/// Negotiated output encoding.
///
/// Only the two negotiable codecs appear here; formats the backend picks
/// on its own (jpeg, png) are never set by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Avif,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
        }
    }
}

/// Select an output encoding from an Accept-style header.
pub fn negotiate(accept: Option<&str>) -> Option<OutputFormat> {
    let accept = accept?;

    if accept.contains("image/avif") {
        Some(OutputFormat::Avif)
    } else if accept.contains("image/webp") {
        Some(OutputFormat::Webp)
    } else {
        None
    }
}
