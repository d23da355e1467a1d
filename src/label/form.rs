//! The form shared by the new and edit label pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormEndpoint,
        form_error_message,
    },
    label::LabelName,
};

/// Form data for creating and editing labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelForm {
    pub name: String,
}

impl LabelForm {
    /// Check the label name.
    pub fn validate(&self) -> Result<LabelName, Error> {
        LabelName::new(&self.name)
    }
}

/// Render the label form.
pub fn label_form_view(endpoint: FormEndpoint<'_>, name: &str, error_message: &str) -> Markup {
    let submit_text = match endpoint {
        FormEndpoint::Post(_) => "Create Label",
        FormEndpoint::Put(_) => "Update Label",
    };

    html! {
        form
            hx-post=[endpoint.post()]
            hx-put=[endpoint.put()]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Label Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Holiday"
                    value=(name)
                    minlength=(LabelName::LENGTH.0)
                    maxlength=(LabelName::LENGTH.1)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (form_error_message(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
