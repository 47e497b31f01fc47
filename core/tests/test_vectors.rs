//! Verify `RequestBuilder::finalize` against the JSON vectors in `test-vectors/`.
//!
//! Each case names a method, base URL, parameters and an optional raw or JSON
//! body, and lists the URL, body and content type the finalized request must
//! carry.

use http::header::CONTENT_TYPE;
use httpcli_core::{HttpMethod, RequestBuilder};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        "PATCH" => HttpMethod::Patch,
        "HEAD" => HttpMethod::Head,
        other => panic!("unknown method: {other}"),
    }
}

#[test]
fn finalize_test_vectors() {
    let raw = include_str!("../../test-vectors/finalize.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method = parse_method(case["method"].as_str().unwrap());

        let mut req = RequestBuilder::new(method, case["url"].as_str().unwrap());
        for pair in case["params"].as_array().unwrap() {
            let pair = pair.as_array().unwrap();
            req.param(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
        }
        if let Some(body) = case.get("raw_body") {
            req.raw_body(body.as_str().unwrap());
        }
        if let Some(json) = case.get("json_body") {
            req.json_body(json.as_str().unwrap());
        }

        let expected = &case["expected"];
        let sent = req.finalize().unwrap();
        assert_eq!(sent.method, method, "{name}: method");
        assert_eq!(sent.url.as_str(), expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.url(), expected["url"].as_str().unwrap(), "{name}: builder url");

        let body = sent.body.as_deref().map(|b| std::str::from_utf8(b).unwrap());
        assert_eq!(body, expected["body"].as_str(), "{name}: body");

        let content_type = sent
            .headers
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap());
        assert_eq!(content_type, expected["content_type"].as_str(), "{name}: content type");
    }
}
