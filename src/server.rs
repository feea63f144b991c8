//! HTTP gateway exposing the fulfillment handler as a webhook.
//!
//! One event per request, processed sequentially per connection. Decode
//! failures come back as 400, handler failures as 500, both with a JSON
//! error body. The dialog service (or a smoke test) posts intent events to
//! `/fulfillment` and polls `/health`.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde_json::json;
use tracing::{error, info};

use crate::config::schema::Config;
use crate::fulfillment::FulfillmentHandler;
use crate::lex::event::IntentEvent;

/// Run the gateway until the process is stopped.
pub async fn run_gateway(config: &Config, handler: Arc<FulfillmentHandler>) -> Result<()> {
    let host: std::net::IpAddr = config
        .gateway
        .host
        .parse()
        .with_context(|| format!("Invalid gateway host: {}", config.gateway.host))?;
    let addr = SocketAddr::new(host, config.gateway.port);

    let service = make_service_fn(move |_| {
        let handler = Arc::clone(&handler);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let handler = Arc::clone(&handler);
                async move { Ok::<_, Infallible>(handle_request(req, handler).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind gateway to {}", addr))?
        .serve(service);

    info!("Gateway listening on http://{}", addr);
    server.await.context("Gateway server error")?;
    Ok(())
}

/// Dispatch one request. Never fails at the transport level: every outcome
/// becomes a JSON response.
pub async fn handle_request(
    req: Request<Body>,
    handler: Arc<FulfillmentHandler>,
) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/health") => json_response(StatusCode::OK, json!({"status": "ok"})),
        (&Method::POST, "/fulfillment") => fulfill(req, handler).await,
        _ => json_response(StatusCode::NOT_FOUND, json!({"error": "not found"})),
    }
}

async fn fulfill(req: Request<Body>, handler: Arc<FulfillmentHandler>) -> Response<Body> {
    let body_bytes = match hyper::body::to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                json!({"error": format!("Failed to read request body: {}", e)}),
            )
        }
    };

    let event: IntentEvent = match serde_json::from_slice(&body_bytes) {
        Ok(event) => event,
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                json!({"error": format!("Invalid intent event: {}", e)}),
            )
        }
    };

    match handler.handle(&event).await {
        Ok(envelope) => match serde_json::to_value(&envelope) {
            Ok(v) => json_response(StatusCode::OK, v),
            Err(e) => json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": format!("Failed to serialize envelope: {}", e)}),
            ),
        },
        Err(e) => {
            error!("Fulfillment failed: {:#}", e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            )
        }
    }
}

/// Build a JSON response without any fallible builder step.
fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}
