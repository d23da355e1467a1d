use axum::{
    body::Body,
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
};

#[track_caller]
fn header_value<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("response has no {name} header"))
        .to_str()
        .expect("header should be visible ASCII")
}

/// Assert that the handler rendered a page successfully.
#[track_caller]
pub(crate) fn assert_html_response(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(response, CONTENT_TYPE.as_str()),
        "text/html; charset=utf-8"
    );
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(header_value(response, "hx-redirect"), endpoint);
}
