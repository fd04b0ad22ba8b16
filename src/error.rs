// Error types module

use thiserror::Error;

/// Terminal rejection kinds produced by the gateway pipeline.
///
/// Every kind is locally detected and surfaced directly to the caller as
/// an HTTP status plus plain-text body; none are retried. Display output
/// is the response body the caller sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The trusted front-end identity header was absent entirely.
    #[error("Missing ip header")]
    MissingClientIp,

    /// The presented identity is not in the caller allowlist.
    ///
    /// Maps to 400, not 401/403; existing callers depend on the status.
    #[error("Unauthorized")]
    ClientNotAllowed,

    /// The mandatory `image` query parameter was missing or empty.
    #[error("Missing \"image\" value")]
    MissingImageParam,

    /// The `image` value did not decode and parse as an absolute URL.
    #[error("Invalid \"image URL\" value")]
    MalformedImageUrl,

    /// The target hostname is not in the source-origin allowlist.
    #[error("Invalid source image URL")]
    SourceNotAllowed,
}

impl GatewayError {
    /// HTTP status code surfaced to the caller for this rejection.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::SourceNotAllowed => 403,
            GatewayError::MissingClientIp
            | GatewayError::ClientNotAllowed
            | GatewayError::MissingImageParam
            | GatewayError::MalformedImageUrl => 400,
        }
    }
}
