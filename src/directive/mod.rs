//! Transformation directive construction
//!
//! The directive is the normalized intent handed to the image-processing
//! backend. Fields left unset stay absent on the wire; a zero-valued
//! dimension or quality would change backend behavior, so serialization
//! skips `None` fields instead of emitting defaults.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::negotiate::OutputFormat;
use crate::presets::PresetCatalog;

/// Resize strategy requested by the caller.
///
/// Tokens outside the known set land in `Unrecognized` and are forwarded
/// verbatim; rejecting them is the backend's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fit {
    ScaleDown,
    Contain,
    Cover,
    Crop,
    Pad,
    Unrecognized(String),
}

impl Fit {
    /// Parse a fit token. Never fails; unknown tokens are preserved.
    pub fn parse(s: &str) -> Self {
        match s {
            "scale-down" => Fit::ScaleDown,
            "contain" => Fit::Contain,
            "cover" => Fit::Cover,
            "crop" => Fit::Crop,
            "pad" => Fit::Pad,
            other => Fit::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Fit::ScaleDown => "scale-down",
            Fit::Contain => "contain",
            Fit::Cover => "cover",
            Fit::Crop => "crop",
            Fit::Pad => "pad",
            Fit::Unrecognized(other) => other,
        }
    }
}

impl Serialize for Fit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized transformation parameters for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformationDirective {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl TransformationDirective {
    /// Build a directive from query parameters and the negotiated format.
    ///
    /// Pure and infallible: a malformed individual parameter drops that
    /// field rather than failing the request. `quality` must parse as a
    /// base-10 integer or the field is omitted. `format` comes solely
    /// from negotiation; no query parameter can set it.
    pub fn build(
        params: &HashMap<String, String>,
        catalog: &PresetCatalog,
        format: Option<OutputFormat>,
    ) -> Self {
        let mut directive = Self::default();

        if let Some(fit) = params.get("fit").filter(|v| !v.is_empty()) {
            directive.fit = Some(Fit::parse(fit));
        }

        // Width and height always come from the same preset and are equal
        if let Some(size) = params
            .get("type")
            .filter(|v| !v.is_empty())
            .and_then(|name| catalog.resolve(name))
        {
            directive.width = Some(size);
            directive.height = Some(size);
        }

        if let Some(quality) = params.get("quality").filter(|v| !v.is_empty()) {
            directive.quality = quality.parse().ok();
        }

        directive.format = format;

        directive
    }

    /// Check if any transformation is requested.
    pub fn has_transformations(&self) -> bool {
        self.fit.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.quality.is_some()
            || self.format.is_some()
    }
}
