//! End-to-end tests over a real listener.

use std::net::SocketAddr;

use axum::http::StatusCode;
use prefix_dispatch::config::Environment;
use prefix_dispatch::{DefaultFinalHandler, DispatchError, Dispatcher, Handler};

mod common;

fn app() -> Dispatcher {
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
        "/forbidden",
        Handler::request(|_req, _res, _next| {
            Box::pin(async move {
                Err(DispatchError::status(StatusCode::FORBIDDEN, "members only"))
            })
        }),
    );

    let mut app =
        Dispatcher::new().with_final_handler(DefaultFinalHandler::new(Environment::Test));
    app.mount("/api", api);
    app
}

#[tokio::test]
async fn test_mounted_echo_and_not_found() {
    let addr: SocketAddr = "127.0.0.1:28381".parse().unwrap();
    let shutdown = common::start_server(addr, app()).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("http://{}/api/echo/deep?q=1", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["url"], "/deep?q=1");
    assert_eq!(body["original_url"], "/api/echo/deep?q=1");
    assert_eq!(body["base_url"], "/api/echo");

    let res = client
        .get(format!("http://{}/apiary", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(
        res.headers().get("content-security-policy").unwrap(),
        "default-src 'none'"
    );
    assert!(res.text().await.unwrap().contains("Cannot GET /apiary"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unhandled_error_status() {
    let addr: SocketAddr = "127.0.0.1:28382".parse().unwrap();
    let shutdown = common::start_server(addr, app()).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{}/api/forbidden", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    assert!(res.text().await.unwrap().contains("members only"));

    shutdown.trigger();
}
