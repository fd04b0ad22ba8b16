// Access control module - caller and source-origin allowlists

use std::collections::HashSet;

use http::Uri;

use crate::config::AccessConfig;
use crate::error::GatewayError;

/// Allowlist of caller identity strings presented by the trusted front end.
///
/// Membership is exact, case-sensitive string equality. The set is
/// compiled once from configuration; concurrent reads need no
/// synchronization.
#[derive(Debug, Clone)]
pub struct ClientAllowlist {
    allowed: HashSet<String>,
}

impl ClientAllowlist {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            allowed: config.allowed_client_ips.iter().cloned().collect(),
        }
    }

    /// Authorize the caller's network identity.
    ///
    /// `None` means no identity header was present at all. A present
    /// identity outside the allowlist rejects with the same 400 class.
    pub fn authorize(&self, client_ip: Option<&str>) -> Result<(), GatewayError> {
        let ip = client_ip.ok_or(GatewayError::MissingClientIp)?;

        if self.allowed.contains(ip) {
            Ok(())
        } else {
            Err(GatewayError::ClientNotAllowed)
        }
    }
}

/// Allowlist of hostnames a source image URL may point at.
#[derive(Debug, Clone)]
pub struct OriginAllowlist {
    allowed: HashSet<String>,
}

impl OriginAllowlist {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            allowed: config.allowed_source_origins.iter().cloned().collect(),
        }
    }

    /// Authorize a candidate source URL.
    ///
    /// The candidate must parse as an absolute URL (scheme and host both
    /// present) and its hostname must be allowlisted. Returns the parsed
    /// URI so the original URL is forwarded as given, not reconstructed
    /// from parts.
    pub fn authorize(&self, candidate: &str) -> Result<Uri, GatewayError> {
        let uri: Uri = candidate
            .parse()
            .map_err(|_| GatewayError::MalformedImageUrl)?;

        if uri.scheme().is_none() {
            return Err(GatewayError::MalformedImageUrl);
        }

        let host = uri.host().ok_or(GatewayError::MalformedImageUrl)?;

        if !self.allowed.contains(host) {
            return Err(GatewayError::SourceNotAllowed);
        }

        Ok(uri)
    }
}
