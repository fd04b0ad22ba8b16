//! Named output-size presets
//!
//! A preset maps a size-class token (`thumbnail`, `small`, `medium`,
//! `large`) to a single square pixel dimension. The catalog is built once
//! at startup from configuration and only read afterwards.

use crate::config::PresetConfig;

/// Immutable catalog of named output sizes.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    thumbnail: u32,
    small: u32,
    medium: u32,
    large: u32,
}

impl PresetCatalog {
    pub fn new(config: &PresetConfig) -> Self {
        Self {
            thumbnail: config.thumbnail,
            small: config.small,
            medium: config.medium,
            large: config.large,
        }
    }

    /// Resolve a size-class token to its pixel dimension.
    ///
    /// Unknown tokens resolve to `None` and the request proceeds with
    /// dimensions unset; an unrecognized size name never fails a request.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        match name {
            "thumbnail" => Some(self.thumbnail),
            "small" => Some(self.small),
            "medium" => Some(self.medium),
            "large" => Some(self.large),
            _ => None,
        }
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new(&PresetConfig::default())
    }
}
