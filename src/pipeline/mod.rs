// Request pipeline module - per-request context and gateway evaluation

use std::collections::HashMap;
use std::time::Instant;

use http::Uri;
use uuid::Uuid;

use crate::access::{ClientAllowlist, OriginAllowlist};
use crate::directive::TransformationDirective;
use crate::error::GatewayError;
use crate::negotiate;
use crate::presets::PresetCatalog;

/// Terminal outcome of pipeline evaluation for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayDecision {
    /// Forward to the validated target with the attached directive.
    Forward {
        target: Uri,
        directive: TransformationDirective,
    },
    /// Reject with the kind's HTTP status and plain-text body.
    Reject(GatewayError),
}

impl GatewayDecision {
    pub fn is_forward(&self) -> bool {
        matches!(self, GatewayDecision::Forward { .. })
    }
}

/// Per-request state threaded through the proxy hooks.
///
/// Holds the unique request ID and the evaluated decision. The context is
/// the request-scoped side channel between validation and dispatch: the
/// transformation directive rides here, never as a header or query string
/// visible to the origin.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    started: Instant,
    decision: Option<GatewayDecision>,
}

impl RequestContext {
    /// Create a new RequestContext with a unique request ID (UUID v4).
    pub fn new(method: String, path: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path,
            started: Instant::now(),
            decision: None,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Milliseconds elapsed since the context was created.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn set_method(&mut self, method: String) {
        self.method = method;
    }

    pub fn set_path(&mut self, path: String) {
        self.path = path;
    }

    pub fn set_decision(&mut self, decision: GatewayDecision) {
        self.decision = Some(decision);
    }

    /// Validated forward target and directive, if the pipeline decided to
    /// forward.
    pub fn forward(&self) -> Option<(&Uri, &TransformationDirective)> {
        match &self.decision {
            Some(GatewayDecision::Forward { target, directive }) => Some((target, directive)),
            _ => None,
        }
    }

    pub fn forward_target(&self) -> Option<&Uri> {
        self.forward().map(|(target, _)| target)
    }

    /// The directive, exposed as the request-scoped processing options
    /// consumed by the transformation capability at dispatch.
    pub fn directive(&self) -> Option<&TransformationDirective> {
        self.forward().map(|(_, directive)| directive)
    }
}

/// Evaluate the gateway pipeline for one request.
///
/// Steps run strictly in order: caller authorization, target extraction,
/// source authorization, directive build. The first failure is terminal;
/// there is no retry, partial response, or fallback directive. Evaluation
/// is pure: no state is carried between calls, so identical requests
/// produce identical decisions.
pub fn evaluate(
    client_ip: Option<&str>,
    query_params: &HashMap<String, String>,
    accept: Option<&str>,
    clients: &ClientAllowlist,
    origins: &OriginAllowlist,
    catalog: &PresetCatalog,
) -> GatewayDecision {
    if let Err(error) = clients.authorize(client_ip) {
        return GatewayDecision::Reject(error);
    }

    let raw_target = match query_params.get("image").filter(|v| !v.is_empty()) {
        Some(value) => value,
        None => return GatewayDecision::Reject(GatewayError::MissingImageParam),
    };

    let decoded = match urlencoding::decode(raw_target) {
        Ok(value) => value.into_owned(),
        Err(_) => return GatewayDecision::Reject(GatewayError::MalformedImageUrl),
    };

    let target = match origins.authorize(&decoded) {
        Ok(uri) => uri,
        Err(error) => return GatewayDecision::Reject(error),
    };

    // Negotiation is pure; its position relative to the checks above does
    // not affect the outcome.
    let format = negotiate::negotiate(accept);
    let directive = TransformationDirective::build(query_params, catalog, format);

    GatewayDecision::Forward { target, directive }
}
