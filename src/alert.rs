//! Alert system for displaying success and error messages to users.
//!
//! Error alerts are swapped into `#alert-container` via `hx-target-error`.
//! Success alerts are sent out-of-band since the main swap target of a
//! successful request is usually the element being changed or removed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A dismissible message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with some extra detail.
    Success { message: String, details: String },
    /// A success message on its own.
    SuccessSimple { message: String },
    /// An error message with a description of how to fix it.
    Error { message: String, details: String },
    /// An error message on its own.
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::Success { .. } | Alert::SuccessSimple { .. })
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let is_success = self.is_success();
        let (message, details) = match self {
            Alert::Success { message, details } | Alert::Error { message, details } => {
                (message, Some(details))
            }
            Alert::SuccessSimple { message } | Alert::ErrorSimple { message } => (message, None),
        };

        let alert_style = if is_success {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow \
            text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400"
        } else {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow \
            text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400"
        };

        let alert = html! {
            div role="alert" class=(alert_style)
            {
                div class="flex-1"
                {
                    span class="font-medium" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty())
                    {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Close"
                    class="ms-auto font-bold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        };

        if is_success {
            html! {
                div hx-swap-oob="innerHTML:#alert-container" { (alert) }
            }
        } else {
            alert
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn success_alert_is_out_of_band() {
        let html = Alert::SuccessSimple {
            message: "Wallet deleted successfully".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let oob = Selector::parse("div[hx-swap-oob]").unwrap();
        let oob = fragment.select(&oob).next().expect("missing out-of-band swap");

        assert_eq!(
            oob.value().attr("hx-swap-oob"),
            Some("innerHTML:#alert-container")
        );
        assert!(html.contains("Wallet deleted successfully"));
    }

    #[test]
    fn error_alert_shows_details() {
        let html = Alert::Error {
            message: "Could not delete wallet".to_owned(),
            details: "It is in use".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let oob = Selector::parse("div[hx-swap-oob]").unwrap();
        assert!(fragment.select(&oob).next().is_none());

        let paragraph = Selector::parse("div[role=alert] p").unwrap();
        let details = fragment.select(&paragraph).next().expect("missing details");
        assert_eq!(details.text().collect::<String>(), "It is in use");
    }
}
