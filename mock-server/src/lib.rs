use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw for a request to `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hits {
    pub hits: usize,
}

pub type Counter = Arc<AtomicUsize>;

pub fn app() -> Router {
    let counter: Counter = Arc::new(AtomicUsize::new(0));
    Router::new()
        .route("/echo", any(echo))
        .route("/counter", get(count))
        .route("/pets/{name}", get(pet_xml))
        .route("/empty", get(empty))
        .route("/status/{code}", any(status))
        .with_state(counter)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(Echo {
        method: method.to_string(),
        query: uri.query().map(str::to_string),
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn count(State(counter): State<Counter>) -> Json<Hits> {
    let hits = counter.fetch_add(1, Ordering::SeqCst) + 1;
    Json(Hits { hits })
}

async fn pet_xml(Path(name): Path<String>) -> impl IntoResponse {
    let body = format!("<pet><name>{name}</name><age>3</age></pet>");
    ([(header::CONTENT_TYPE, "application/xml")], body)
}

async fn empty() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [("x-empty", "yes")])
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            query: Some("q=cats".to_string()),
            content_type: None,
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "q=cats");
        assert!(json["content_type"].is_null());
        assert_eq!(json["body"], "");
    }

    #[test]
    fn echo_accepts_missing_optionals() {
        let echo: Echo =
            serde_json::from_str(r#"{"method":"POST","body":"a=1"}"#).unwrap();
        assert!(echo.query.is_none());
        assert!(echo.content_type.is_none());
        assert_eq!(echo.body, "a=1");
    }

    #[test]
    fn hits_roundtrips_through_json() {
        let json = serde_json::to_string(&Hits { hits: 2 }).unwrap();
        assert_eq!(json, r#"{"hits":2}"#);
        let back: Hits = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hits, 2);
    }
}
