//! The form shared by the new and edit category pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::{Category, CategoryIcon, CategoryName, NewCategory},
    color::Color,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormEndpoint, color_select,
        form_error_message,
    },
};

/// Form data for creating and editing categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub color: Color,
    pub icon: CategoryIcon,
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.to_string(),
            color: category.color,
            icon: category.icon,
        }
    }
}

impl CategoryForm {
    /// Check the form fields and convert them into a [NewCategory].
    pub fn validate(&self) -> Result<NewCategory, Error> {
        Ok(NewCategory {
            name: CategoryName::new(&self.name)?,
            color: self.color,
            icon: self.icon,
        })
    }
}

/// Render the category form.
pub fn category_form_view(
    endpoint: FormEndpoint<'_>,
    values: &CategoryForm,
    error_message: &str,
) -> Markup {
    let submit_text = match endpoint {
        FormEndpoint::Post(_) => "Create Category",
        FormEndpoint::Put(_) => "Update Category",
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
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Groceries"
                    value=(values.name)
                    minlength=(CategoryName::LENGTH.0)
                    maxlength=(CategoryName::LENGTH.1)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (color_select(values.color))

            div
            {
                label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }

                select id="icon" name="icon" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for icon in CategoryIcon::ALL {
                        option value=(icon.as_str()) selected[*icon == values.icon]
                        {
                            (icon.label())
                        }
                    }
                }
            }

            (form_error_message(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
