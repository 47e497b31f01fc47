//! Drive the C surface against the live mock server.

use std::ffi::CString;
use std::net::SocketAddr;

use httpcli_ffi::types::{FfiErrorCode, FfiHttpMethod, FfiResult};
use httpcli_ffi::*;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn body_json(result: *mut FfiResult) -> serde_json::Value {
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(r.http_status, 200);
    let body = unsafe { std::slice::from_raw_parts(r.body, r.body_len) };
    serde_json::from_slice(body).unwrap()
}

#[test]
fn post_form_then_rearm_and_repeat() {
    let addr = start_server();

    // POST form parameters to /echo
    let url = CString::new(format!("http://{addr}/echo")).unwrap();
    let req = httpcli_request_new(FfiHttpMethod::Post, url.as_ptr());
    let (key, value) = (CString::new("name").unwrap(), CString::new("rex the dog").unwrap());
    assert_eq!(httpcli_request_param(req, key.as_ptr(), value.as_ptr()), FfiErrorCode::Ok);

    let result = httpcli_request_execute(req);
    let echo = body_json(result);
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["body"], "name=rex+the+dog");
    assert_eq!(echo["content_type"], "application/x-www-form-urlencoded");
    httpcli_free_result(result);
    httpcli_request_free(req);

    // GET /counter twice without rearm, then once after
    let url = CString::new(format!("http://{addr}/counter")).unwrap();
    let req = httpcli_request_new(FfiHttpMethod::Get, url.as_ptr());

    let first = httpcli_request_execute(req);
    let cached = httpcli_request_execute(req);
    assert_eq!(body_json(first), body_json(cached));
    let hits = body_json(first)["hits"].as_u64().unwrap();
    httpcli_free_result(first);
    httpcli_free_result(cached);

    assert_eq!(httpcli_request_rearm(req), FfiErrorCode::Ok);
    let next = httpcli_request_execute(req);
    assert_eq!(body_json(next)["hits"].as_u64().unwrap(), hits + 1);
    httpcli_free_result(next);
    httpcli_request_free(req);
}

#[test]
fn empty_response_has_null_body() {
    let addr = start_server();
    let url = CString::new(format!("http://{addr}/empty")).unwrap();
    let req = httpcli_request_new(FfiHttpMethod::Get, url.as_ptr());

    let result = httpcli_request_execute(req);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(r.http_status, 204);
    assert!(r.body.is_null());
    assert_eq!(r.body_len, 0);
    httpcli_free_result(result);
    httpcli_request_free(req);
}
