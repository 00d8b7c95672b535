//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::Method;
use prefix_dispatch::{
    DispatchError, Dispatcher, FinalHandler, Handler, HttpServer, Request, Response, ServerConfig,
    Shutdown,
};

/// Ordered record of what handlers saw.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, line: impl Into<String>) {
        self.0.lock().unwrap().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Final handler that records each call and the error it received.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Option<String>>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

impl FinalHandler for Recorder {
    fn finish(&self, _req: &mut Request, res: &mut Response, err: Option<DispatchError>) {
        self.0.lock().unwrap().push(err.map(|e| e.to_string()));
        if !res.is_finished() {
            res.end();
        }
    }
}

/// Request handler that logs `name url` and passes control on.
pub fn pass(log: &Log, name: &'static str) -> Handler {
    let log = log.clone();
    Handler::request(move |req, res, next| {
        let log = log.clone();
        Box::pin(async move {
            log.push(format!("{name} {}", req.url()));
            next.run(req, res).await;
            Ok(())
        })
    })
}

/// Request handler that logs `name url` and finishes the response.
pub fn respond(log: &Log, name: &'static str) -> Handler {
    let log = log.clone();
    Handler::request(move |req, res, _next| {
        let log = log.clone();
        Box::pin(async move {
            log.push(format!("{name} {}", req.url()));
            res.send(name);
            Ok(())
        })
    })
}

/// Error handler that logs `name: error` and keeps the error pending.
pub fn catch(log: &Log, name: &'static str) -> Handler {
    let log = log.clone();
    Handler::error(move |err, req, res, next| {
        let log = log.clone();
        Box::pin(async move {
            log.push(format!("{name}: {err}"));
            next.fail(req, res, err).await;
            Ok(())
        })
    })
}

/// Dispatch one GET request and return the final-handler calls.
pub async fn dispatch(dispatcher: &Dispatcher, url: &str) -> (Request, Response, Recorder) {
    let recorder = Recorder::default();
    let mut req = Request::new(Method::GET, url);
    let mut res = Response::new();
    dispatcher
        .handle_with(&mut req, &mut res, Arc::new(recorder.clone()))
        .await;
    (req, res, recorder)
}

/// Start a server for `dispatcher` on `addr`; returns its shutdown handle.
pub async fn start_server(addr: SocketAddr, dispatcher: Dispatcher) -> Shutdown {
    let mut config = ServerConfig::default();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server = HttpServer::new(config, dispatcher);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}
