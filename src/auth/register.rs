//! The registration page for creating an account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, set_auth_cookie},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input, loading_spinner,
        log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
    user::{Email, NAME_LENGTH, NewUser, create_user, validate_first_name, validate_last_name},
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

fn name_input(name: &str, label: &str, value: &str, error_message: Option<&str>) -> Markup {
    let id = name.replace('_', "-");

    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="text"
                name=(name)
                id=(id)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(NAME_LENGTH.0)
                maxlength=(NAME_LENGTH.1)
                value=(value);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// Per-field error messages for the registration form.
#[derive(Debug, Default)]
struct RegistrationErrors {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl RegistrationErrors {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}

fn registration_form(values: &RegisterForm, errors: &RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            div class="grid grid-cols-1 gap-4 sm:grid-cols-2"
            {
                (name_input("first_name", "First Name", &values.first_name, errors.first_name.as_deref()))
                (name_input("last_name", "Last Name", &values.last_name, errors.last_name.as_deref()))
            }

            (email_input(&values.email, errors.email.as_deref()))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, errors.password.as_deref()))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password.as_deref()))

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(&RegisterForm::default(), &Default::default());
    let content = log_in_register("Create Account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection new users are written to.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// The address the user will log in with.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// The chosen password, typed a second time.
    pub confirm_password: String,
}

/// The validated fields of a registration form, before the password is hashed.
struct ValidatedRegistration {
    first_name: String,
    last_name: String,
    email: Email,
    password: ValidatedPassword,
}

fn validate_registration(form: &RegisterForm) -> Result<ValidatedRegistration, RegistrationErrors> {
    let mut errors = RegistrationErrors::default();

    let first_name = validate_first_name(&form.first_name)
        .inspect_err(|error| errors.first_name = Some(error.to_string()))
        .ok();
    let last_name = validate_last_name(&form.last_name)
        .inspect_err(|error| errors.last_name = Some(error.to_string()))
        .ok();
    let email = Email::new(&form.email)
        .inspect_err(|error| errors.email = Some(error.to_string()))
        .ok();

    let user_inputs = [
        form.first_name.as_str(),
        form.last_name.as_str(),
        form.email.as_str(),
    ];
    let password = ValidatedPassword::new(&form.password, &user_inputs)
        .inspect_err(|error| errors.password = Some(error.to_string()))
        .ok();

    if form.password != form.confirm_password {
        errors.confirm_password = Some(Error::PasswordsDoNotMatch.to_string());
    }

    match (first_name, last_name, email, password) {
        (Some(first_name), Some(last_name), Some(email), Some(password)) if errors.is_empty() => {
            Ok(ValidatedRegistration {
                first_name,
                last_name,
                email,
                password,
            })
        }
        _ => Err(errors),
    }
}

/// Create a user from the registration form and log them in.
///
/// Invalid fields and an email that is already registered re-render the form
/// with an error message next to the offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let registration = match validate_registration(&user_data) {
        Ok(registration) => registration,
        Err(errors) => return registration_form(&user_data, &errors).into_response(),
    };

    let password_hash =
        match PasswordHash::new(registration.password, PasswordHash::DEFAULT_COST) {
            Ok(hash) => hash,
            Err(error) => {
                tracing::error!("an error occurred while hashing a password: {error}");

                return get_internal_server_error_redirect();
            }
        };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let new_user = NewUser {
        first_name: registration.first_name,
        last_name: registration.last_name,
        email: registration.email,
        password_hash,
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => create_user(new_user, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = match result {
        Ok(user) => user,
        Err(error @ Error::DuplicateEmail) => {
            let errors = RegistrationErrors {
                email: Some(error.to_string()),
                ..Default::default()
            };

            return registration_form(&user_data, &errors).into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_timezone) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");

            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_register_page_tests {
    use axum::http::StatusCode;

    use crate::{
        auth::register::get_register_page,
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let h1_selector = scraper::Selector::parse("h1").unwrap();
        let title = document
            .select(&h1_selector)
            .next()
            .expect("want an h1")
            .text()
            .collect::<String>()
            .to_lowercase();
        assert_eq!(title.trim(), "create account");

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::USERS));

        for selector_string in [
            "input[type=text]#first-name",
            "input[type=text]#last-name",
            "input[type=email]#email",
            "input[type=password]#password",
            "input[type=password]#confirm-password",
        ] {
            let selector = scraper::Selector::parse(selector_string).unwrap();
            let count = form.select(&selector).count();
            assert_eq!(count, 1, "want 1 {selector_string}, got {count}");
        }

        let link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(links[0].value().attr("href"), Some(endpoints::LOG_IN_VIEW));
    }
}
