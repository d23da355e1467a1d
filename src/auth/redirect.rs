//! Where to send a user after they log in.
//!
//! Only local page paths are accepted as redirect targets. Absolute URLs,
//! protocol-relative URLs, API routes and the auth pages themselves are
//! rejected so that a crafted link cannot bounce a user off-site or into a loop.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Pages that never make sense as a post-log-in destination.
const REJECTED_TARGETS: [&str; 2] = [endpoints::LOG_IN_VIEW, endpoints::REGISTER_VIEW];

fn path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?.as_str();

    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return None;
    }

    let path = uri.path();
    if path.starts_with("/api") || REJECTED_TARGETS.contains(&path) {
        return None;
    }

    Some(path_and_query.to_owned())
}

/// Parse a redirect target supplied by the client.
///
/// Returns `None` unless `raw_url` is a relative URL pointing at one of the app's pages.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    path_and_query(&uri)
}

/// The log-in page URL with `redirect_target` attached as the `redirect_url` query parameter.
pub(super) fn log_in_url_with_redirect(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(query) => Some(format!("{}?{query}", endpoints::LOG_IN_VIEW)),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

/// The log-in page URL that will return the user to the page they asked for.
///
/// Page requests return to their own URL. API requests come from htmx, so the
/// page the user was looking at is read from the `HX-Current-URL` header,
/// which htmx sends as an absolute URL.
pub(super) fn log_in_url_for_request(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        current_page_of_htmx_request(request)?
    } else {
        path_and_query(request.uri())?
    };

    log_in_url_with_redirect(&target)
}

fn current_page_of_htmx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_htmx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_htmx_request {
        tracing::warn!("Missing HX-Request header for {}.", request.uri().path());
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for {}.", request.uri().path());
        return None;
    };

    let target = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| path_and_query(&uri));

    if target.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    target
}
