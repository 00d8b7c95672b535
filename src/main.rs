//! Demo server for the prefix dispatcher.
//!
//! ```text
//! /            request logger
//! /health      liveness probe
//! /api         sub-dispatcher
//!   /echo      reports how the URL looks from inside the mount
//!   /fail      returns a 418
//!   /panic     panics inside the handler
//!   (error)    renders errors as JSON
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use clap::Parser;

use prefix_dispatch::config::{load_config, prepare_config, ServerConfig};
use prefix_dispatch::observability::{logging, metrics::MetricsObserver};
use prefix_dispatch::{
    lifecycle, DefaultFinalHandler, DispatchError, Dispatcher, Handler, HandlerResult,
};

#[derive(Parser)]
#[command(name = "prefix-dispatch")]
#[command(about = "Serve a prefix-mounted handler chain", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => prepare_config(ServerConfig::default())?,
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(environment = %config.environment, "prefix-dispatch v0.1.0 starting");

    let dispatcher = build_dispatcher(&config);
    lifecycle::start(config, dispatcher).await?;
    Ok(())
}

fn build_dispatcher(config: &ServerConfig) -> Dispatcher {
    let mut api = Dispatcher::new();
    api.mount(
        "/echo",
        Handler::request(|req, res, _next| {
            Box::pin(async move {
                res.json(&serde_json::json!({
                    "url": req.url(),
                    "original_url": req.original_url(),
                    "base_url": req.base_url(),
                }))
            })
        }),
    )
    .mount(
        "/fail",
        Handler::request(|_req, _res, _next| {
            Box::pin(async move {
                Err(DispatchError::status(
                    StatusCode::IM_A_TEAPOT,
                    "short and stout",
                ))
            })
        }),
    )
    .mount(
        "/panic",
        Handler::request(|_req, _res, _next| Box::pin(async move { explode() })),
    )
    .add(Handler::error(|err, _req, res, _next| {
        Box::pin(async move {
            let status = err
                .status_code()
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            res.set_status(status);
            res.json(&serde_json::json!({ "error": err.to_string() }))
        })
    }));

    let mut app = Dispatcher::new().with_final_handler(DefaultFinalHandler::new(config.environment));
    app.observe(Arc::new(MetricsObserver))
        .add(Handler::request(|req, res, next| {
            Box::pin(async move {
                tracing::info!(method = %req.method(), url = %req.url(), "Request");
                next.run(req, res).await;
                tracing::info!(status = %res.status(), url = %req.url(), "Response");
                Ok(())
            })
        }))
        .mount(
            "/health",
            Handler::request(|_req, res, _next| {
                Box::pin(async move { res.json(&serde_json::json!({ "status": "ok" })) })
            }),
        )
        .mount("/api", api);
    app
}

fn explode() -> HandlerResult {
    panic!("demo panic")
}
