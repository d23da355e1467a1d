//! Route layers that admit only requests carrying a live session cookie.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState, UserID,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{log_in_url_for_request, log_in_url_with_redirect},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts after the user's latest request.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// A request's valid session.
struct Session {
    user_id: UserID,
    jar: PrivateCookieJar,
    lifetime: Duration,
    local_offset: UtcOffset,
}

impl Session {
    /// Read the session from the request's cookies, if it has a live one.
    async fn from_parts(parts: &mut Parts, state: &AuthState) -> Option<Self> {
        let Some(local_offset) = get_local_offset(&state.local_timezone) else {
            tracing::error!("Unknown local timezone {:?}.", state.local_timezone);
            return None;
        };
        let jar = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .inspect_err(|error| tracing::error!("Could not read cookie jar: {error:?}"))
            .ok()?;
        let token = get_token_from_cookies(&jar)
            .inspect_err(|error| {
                tracing::debug!("Rejected request to {}: {error}", parts.uri.path())
            })
            .ok()?;

        Some(Self {
            user_id: token.user_id,
            jar,
            lifetime: state.cookie_duration,
            local_offset,
        })
    }

    /// Push the session expiry forward and attach the refreshed cookie to `response`.
    fn renew(self, response: &mut Response) {
        let jar = extend_auth_cookie_duration_if_needed(
            self.jar.clone(),
            self.lifetime,
            self.local_offset,
        )
        .unwrap_or_else(|error| {
            tracing::error!("Could not extend session for user {}: {error}", self.user_id);
            self.jar
        });

        let cookies = jar.into_response();
        for value in cookies.headers().get_all(SET_COOKIE) {
            response.headers_mut().append(SET_COOKIE, value.clone());
        }
    }
}

/// How a request without a session is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum Rejection {
    Redirect,
    HxRedirect,
}

impl Rejection {
    fn respond(self, log_in_url: &str) -> Response {
        match self {
            Rejection::Redirect => Redirect::to(log_in_url).into_response(),
            Rejection::HxRedirect => {
                (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response()
            }
        }
    }
}

async fn guard(state: AuthState, request: Request, next: Next, rejection: Rejection) -> Response {
    let log_in_url = log_in_url_for_request(&request);
    let (mut parts, body) = request.into_parts();

    let Some(session) = Session::from_parts(&mut parts, &state).await else {
        let log_in_url = log_in_url.unwrap_or_else(|| {
            tracing::warn!("No page to return to after log in, falling back to the dashboard.");
            log_in_url_with_redirect(endpoints::DASHBOARD_VIEW)
                .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
        });

        return rejection.respond(&log_in_url);
    };

    parts.extensions.insert(session.user_id);
    let mut response = next.run(Request::from_parts(parts, body)).await;
    session.renew(&mut response);

    response
}

/// Admit page requests with a live session, redirecting everyone else to the
/// log-in page with a `redirect_url` back to the requested page.
///
/// Handlers behind this layer receive the user through `Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, Rejection::Redirect).await
}

/// Like [auth_guard] for htmx API requests: the log-in redirect is sent as an
/// `HX-Redirect` header pointing back to the page the request came from.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, Rejection::HxRedirect).await
}
