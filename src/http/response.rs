//! HTTP response building module
//!
//! Builders for every status the wiki answers with. Builders never fail:
//! a builder error is logged and an empty response returned instead.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{Method, Response, StatusCode};

use crate::wiki::escape_html;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Build 200 HTML response
pub fn build_html_response(content: String) -> Response<Full<Bytes>> {
    let content_length = content.len();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, TEXT_HTML)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 302 Found redirect response
///
/// GET gets a short HTML link to the target, HEAD only its content type.
/// Other methods get an empty body.
pub fn build_redirect_response(method: &Method, target: &str) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, target);
    if *method == Method::GET || *method == Method::HEAD {
        builder = builder.header(CONTENT_TYPE, TEXT_HTML);
    }
    let body = if *method == Method::GET {
        Bytes::from(format!("<a href=\"{}\">Found</a>.\n", escape_html(target)))
    } else {
        Bytes::new()
    };
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("302", &e);
        let mut resp = Response::new(Full::new(Bytes::new()));
        *resp.status_mut() = StatusCode::FOUND;
        resp
    })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(Full::new(Bytes::from(format!("400 Bad Request: {message}"))))
        .unwrap_or_else(|e| {
            log_build_error("400", &e);
            Response::new(Full::new(Bytes::from("400 Bad Request")))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(Full::new(Bytes::from("413 Payload Too Large")))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(Full::new(Bytes::from("413 Payload Too Large")))
        })
}

/// Build 500 Internal Server Error response carrying the error text
pub fn build_500_response(message: &str) -> Response<Full<Bytes>> {
    let body = format!("{message}\n");
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header("X-Content-Type-Options", "nosniff")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            let mut resp = Response::new(Full::new(Bytes::new()));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header("Cache-Control", "no-cache, no-store")
        .body(Full::new(Bytes::from(status.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::from("ok")))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_redirect_links_target() {
        let resp = build_redirect_response(&Method::GET, "/edit/Foo");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/edit/Foo");
        assert_eq!(resp.headers()[CONTENT_TYPE], TEXT_HTML);
        assert_eq!(body_string(resp).await, "<a href=\"/edit/Foo\">Found</a>.\n");
    }

    #[tokio::test]
    async fn test_post_redirect_has_empty_body() {
        let resp = build_redirect_response(&Method::POST, "/view/Foo");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/view/Foo");
        assert!(resp.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_head_redirect_has_content_type_only() {
        let resp = build_redirect_response(&Method::HEAD, "/edit/Foo");
        assert_eq!(resp.headers()[CONTENT_TYPE], TEXT_HTML);
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_500_carries_message() {
        let resp = build_500_response("open Foo.txt: permission denied");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(resp).await, "open Foo.txt: permission denied\n");
    }

    #[test]
    fn test_html_response_headers() {
        let resp = build_html_response("<p>hi</p>".to_string());
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], TEXT_HTML);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
    }
}
