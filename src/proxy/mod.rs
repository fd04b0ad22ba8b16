// Proxy module - Pingora ProxyHttp implementation
// Validates the caller and the target, then relays the backend response
// to the caller unmodified.

use async_trait::async_trait;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_http::{RequestHeader, ResponseHeader};
use pingora_proxy::{ProxyHttp, Session};
use std::collections::HashMap;
use std::time::Duration;

use crate::access::{ClientAllowlist, OriginAllowlist};
use crate::config::Config;
use crate::error::GatewayError;
use crate::pipeline::{self, GatewayDecision, RequestContext};
use crate::presets::PresetCatalog;

/// ToriiProxy implements the Pingora ProxyHttp trait.
///
/// All request-handling state is immutable after construction: the two
/// allowlists and the preset catalog are compiled once from configuration
/// and read concurrently without synchronization.
pub struct ToriiProxy {
    clients: ClientAllowlist,
    origins: OriginAllowlist,
    catalog: PresetCatalog,
    client_ip_header: String,
    upstream_timeout: Duration,
}

impl ToriiProxy {
    /// Create a new ToriiProxy instance from configuration
    pub fn new(config: Config) -> Self {
        Self {
            clients: ClientAllowlist::new(&config.access),
            origins: OriginAllowlist::new(&config.access),
            catalog: PresetCatalog::new(&config.presets),
            client_ip_header: config.access.client_ip_header.to_ascii_lowercase(),
            upstream_timeout: Duration::from_secs(config.server.timeout),
        }
    }

    /// Extract query parameters from URI
    fn extract_query_params(req: &RequestHeader) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(query) = req.uri.query() {
            for pair in query.split('&') {
                if let Some((key, value)) = pair.split_once('=') {
                    params.insert(
                        key.to_string(),
                        urlencoding::decode(value).unwrap_or_default().to_string(),
                    );
                }
            }
        }
        params
    }

    /// Caller identity as presented by the trusted front-end header.
    ///
    /// Only the configured header counts. The transport-level peer
    /// address is not a fallback: a request that bypassed the front end
    /// carries no identity and is rejected as missing one.
    fn client_identity(&self, req: &RequestHeader) -> Option<String> {
        req.headers
            .get(self.client_ip_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }

    /// Write a terminal plain-text rejection and end the request.
    async fn write_rejection(
        &self,
        session: &mut Session,
        ctx: &RequestContext,
        error: &GatewayError,
    ) -> Result<()> {
        let status_code = error.status_code();
        let body = error.to_string();

        tracing::warn!(
            request_id = %ctx.request_id(),
            path = %ctx.path(),
            status_code = status_code,
            reason = %body,
            "Request rejected"
        );

        let mut header = ResponseHeader::build(status_code, None)?;
        header.insert_header("Content-Type", "text/plain; charset=utf-8")?;
        header.insert_header("Content-Length", body.len().to_string())?;

        session
            .write_response_header(Box::new(header), false)
            .await?;
        session.write_response_body(Some(body.into()), true).await?;

        Ok(())
    }
}

#[async_trait]
impl ProxyHttp for ToriiProxy {
    type CTX = RequestContext;

    /// Create a new request context for each incoming request
    fn new_ctx(&self) -> Self::CTX {
        RequestContext::new("GET".to_string(), "/".to_string())
    }

    /// Run the validation pipeline; reject or mark the request for
    /// forwarding.
    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        let (client_ip, query_params, accept) = {
            let req = session.req_header();

            ctx.set_method(req.method.to_string());
            ctx.set_path(req.uri.path().to_string());

            let client_ip = self.client_identity(req);
            let query_params = Self::extract_query_params(req);
            let accept = req
                .headers
                .get(http::header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            (client_ip, query_params, accept)
        };

        let decision = pipeline::evaluate(
            client_ip.as_deref(),
            &query_params,
            accept.as_deref(),
            &self.clients,
            &self.origins,
            &self.catalog,
        );

        match decision {
            GatewayDecision::Reject(error) => {
                self.write_rejection(session, ctx, &error).await?;
                ctx.set_decision(GatewayDecision::Reject(error));
                Ok(true) // Short-circuit (response already sent)
            }
            forward => {
                ctx.set_decision(forward);
                Ok(false)
            }
        }
    }

    /// Determine the upstream peer from the validated target URL
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        let target = ctx.forward_target().ok_or_else(|| {
            pingora_core::Error::explain(
                pingora_core::ErrorType::InternalError,
                "No forward target in context",
            )
        })?;

        let host = target
            .host()
            .ok_or_else(|| {
                pingora_core::Error::explain(
                    pingora_core::ErrorType::InternalError,
                    "Forward target has no host",
                )
            })?
            .to_string();
        let use_tls = target.scheme_str() == Some("https");
        let port = target.port_u16().unwrap_or(if use_tls { 443 } else { 80 });

        let mut peer = Box::new(HttpPeer::new((host.clone(), port), use_tls, host));

        peer.options.connection_timeout = Some(self.upstream_timeout);
        peer.options.read_timeout = Some(self.upstream_timeout);
        peer.options.write_timeout = Some(self.upstream_timeout);

        Ok(peer)
    }

    /// Rewrite the outbound request to address the validated target.
    ///
    /// The inbound headers are carried through untouched apart from Host.
    /// The transformation directive stays in the request context, the
    /// processing-options channel the transformation capability reads at
    /// dispatch; it never appears as a header or query string on the wire
    /// to the origin.
    async fn upstream_request_filter(
        &self,
        _session: &mut Session,
        upstream_request: &mut RequestHeader,
        ctx: &mut Self::CTX,
    ) -> Result<()> {
        let (target, directive) = ctx.forward().ok_or_else(|| {
            pingora_core::Error::explain(
                pingora_core::ErrorType::InternalError,
                "No forward decision in context",
            )
        })?;

        let host = target.host().unwrap_or_default().to_string();
        let path_and_query = target
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let parsed_uri = path_and_query
            .parse()
            .map_err(|e: http::uri::InvalidUri| {
                pingora_core::Error::explain(
                    pingora_core::ErrorType::InternalError,
                    format!("Invalid target path: {}", e),
                )
            })?;
        upstream_request.set_uri(parsed_uri);

        upstream_request.remove_header(&http::header::HOST);
        upstream_request
            .append_header(
                http::header::HOST,
                http::header::HeaderValue::from_str(&host).map_err(|e| {
                    pingora_core::Error::explain(
                        pingora_core::ErrorType::InternalError,
                        format!("Invalid host header: {}", e),
                    )
                })?,
            )
            .map_err(|e| {
                pingora_core::Error::explain(
                    pingora_core::ErrorType::InternalError,
                    format!("Failed to set Host header: {}", e),
                )
            })?;

        if directive.has_transformations() {
            tracing::debug!(
                request_id = %ctx.request_id(),
                target = %target,
                directive = %serde_json::to_string(directive).unwrap_or_default(),
                "Dispatching with transformation directive"
            );
        }

        Ok(())
    }

    /// Add the request correlation header to the relayed response
    fn upstream_response_filter(
        &self,
        _session: &mut Session,
        upstream_response: &mut ResponseHeader,
        ctx: &mut Self::CTX,
    ) -> Result<()> {
        upstream_response
            .insert_header("X-Request-ID", ctx.request_id())
            .map_err(|e| {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    error = ?e,
                    "Failed to add X-Request-ID header"
                );
                e
            })?;

        Ok(())
    }

    /// Log request completion for debugging and aggregation
    async fn logging(
        &self,
        session: &mut Session,
        _e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status_code = if let Some(resp) = session.response_written() {
            resp.status.as_u16()
        } else {
            500 // Default to 500 if no response written
        };

        tracing::info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            status_code = status_code,
            duration_ms = ctx.elapsed_ms() as u64,
            forwarded = ctx.forward().is_some(),
            "Request completed"
        );
    }
}
