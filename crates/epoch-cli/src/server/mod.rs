//! HTTP adapter: a hyper server in front of the conversion engine.

pub mod response;
pub mod routes;

use std::convert::Infallible;
use std::future::Future;
use std::time::Instant;

use anyhow::Context;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use response::{error_response, with_cors, Body};

/// Bind to the configured address and serve until `shutdown` resolves.
pub async fn serve(config: ServerConfig, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(addr = %listener.local_addr()?, "listening");
    run(listener, config.max_body_bytes, shutdown).await
}

/// Accept connections on `listener` until `shutdown` resolves, then let
/// in-flight connections finish.
pub async fn run(
    listener: TcpListener,
    max_body_bytes: usize,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(error = %err, "failed to accept connection");
                        continue;
                    }
                };
                let mut shutdown_signal = shutdown_rx.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(req, max_body_bytes));
                    let http_server = Builder::new(TokioExecutor::new());
                    let conn = http_server.serve_connection(TokioIo::new(stream), service);
                    tokio::pin!(conn);

                    let mut draining = false;
                    loop {
                        tokio::select! {
                            result = conn.as_mut() => {
                                if let Err(err) = result {
                                    debug!(%remote, error = %err, "connection closed with error");
                                }
                                break;
                            }
                            _ = shutdown_signal.changed(), if !draining => {
                                draining = true;
                                conn.as_mut().graceful_shutdown();
                            }
                        }
                    }
                });
            }
            _ = &mut shutdown => {
                info!("shutdown requested, draining connections");
                break;
            }
        }
    }

    drop(listener);
    drop(shutdown_rx);
    // Nobody may be listening; that only means there is nothing to drain.
    let _ = shutdown_tx.send(());
    shutdown_tx.closed().await;
    info!("server stopped");
    Ok(())
}

async fn handle(
    req: Request<Incoming>,
    max_body_bytes: usize,
) -> Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let response = match Limited::new(body, max_body_bytes).collect().await {
        Ok(collected) => routes::route(&parts.method, &parts.uri, &collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => with_cors(
            error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large"),
        ),
        Err(err) => {
            warn!(error = %err, "failed to read request body");
            with_cors(error_response(
                StatusCode::BAD_REQUEST,
                "failed to read request body",
            ))
        }
    };

    info!(
        method = %parts.method,
        path = parts.uri.path(),
        status = response.status().as_u16(),
        elapsed = ?started.elapsed(),
        "request"
    );
    Ok(response)
}
