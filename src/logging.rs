//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Bodies longer than this many bytes are truncated in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Password fields in
/// submitted forms are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            Bytes::new()
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    if parts.method != Method::GET && is_form(&parts.headers) {
        let redacted = REDACTED_FIELDS
            .iter()
            .fold(body_text.into_owned(), |text, field| redact_field(&text, field));
        log_body("Received request", &parts, &redacted);
    } else {
        log_body("Received request", &parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            Bytes::new()
        }
    };
    log_body(
        "Sending response",
        &parts,
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

fn is_form(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Replace the value of every `field_name=...` pair in a url-encoded form body.
fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{key}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The longest prefix of `text` that fits in `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(message: &str, parts: &impl std::fmt::Debug, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{message}: {parts:#?}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{Router, routing::post};
    use axum_test::TestServer;

    use super::{logging_middleware, redact_field, truncate};

    #[test]
    fn redacts_only_the_named_field() {
        let form = "email=a%40b.com&password=hunter2&confirm_password=hunter2";

        let redacted = redact_field(form, "password");

        assert_eq!(
            redacted,
            "email=a%40b.com&password=********&confirm_password=hunter2"
        );
    }

    #[test]
    fn redaction_leaves_forms_without_the_field_alone() {
        assert_eq!(redact_field("name=Cash", "password"), "name=Cash");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "ab€";

        assert_eq!(truncate(text, 3), "ab");
        assert_eq!(truncate(text, 5), "ab€");
        assert_eq!(truncate("short", 64), "short");
    }

    #[tokio::test]
    async fn middleware_passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(axum::middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);

        let response = server
            .post("/echo")
            .form(&[("name", "Cash"), ("password", "hunter2")])
            .await;

        response.assert_status_ok();
        response.assert_text("name=Cash&password=hunter2");
    }
}
