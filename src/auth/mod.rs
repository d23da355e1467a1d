//! Registration, log-in and log-out, and the cookie session that guards every other page.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use register::{get_register_page, register_user};
pub(crate) use redirect::normalize_redirect_url;
pub(super) use token::Token;

pub(crate) use crate::user::UserID;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub(crate) use log_in::create_test_user_with_password;

#[cfg(test)]
pub use middleware::AuthState;
