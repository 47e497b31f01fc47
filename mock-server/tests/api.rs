use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, Hits};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_query_for_get() {
    let resp = app().oneshot(get("/echo?q=cats&page=2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.query.as_deref(), Some("q=cats&page=2"));
    assert!(echo.body.is_empty());
}

#[tokio::test]
async fn echo_reports_form_body_for_post() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body("a=1&b=2".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert!(echo.query.is_none());
    assert_eq!(
        echo.content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(echo.body, "a=1&b=2");
}

// --- counter ---

#[tokio::test]
async fn counter_increments_per_request() {
    use tower::Service;

    let mut app = app().into_service();

    for expected in 1..=3 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(get("/counter"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let hits: Hits = body_json(resp).await;
        assert_eq!(hits.hits, expected);
    }
}

// --- xml ---

#[tokio::test]
async fn pet_is_served_as_xml() {
    let resp = app().oneshot(get("/pets/rex")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"<pet><name>rex</name><age>3</age></pet>");
}

// --- empty / status ---

#[tokio::test]
async fn empty_has_headers_but_no_body() {
    let resp = app().oneshot(get("/empty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers().get("x-empty").unwrap(), "yes");
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app().oneshot(get("/status/418")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(&body_bytes(resp).await[..], b"status 418");
}

#[tokio::test]
async fn status_route_rejects_bad_code() {
    let resp = app().oneshot(get("/status/99")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
