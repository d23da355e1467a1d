//! Shared page layout, styles and small HTML components.
use maud::{DOCTYPE, Markup, PreEscaped, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use rust_decimal::prelude::ToPrimitive;

use crate::{color::Color, money::Money};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "w-full py-2.5 px-5 mb-2 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_RADIO_GROUP_STYLE: &str = "flex flex-col gap-2";
pub const FORM_RADIO_INPUT_STYLE: &str = "peer h-4 w-4 shrink-0 cursor-pointer \
    text-blue-600 border-gray-300 dark:border-gray-600 focus-visible:ring-2 \
    focus-visible:ring-blue-500 focus-visible:ring-offset-2 \
    focus-visible:ring-offset-white focus-visible:dark:ring-offset-gray-900";
pub const FORM_RADIO_LABEL_STYLE: &str = "flex-1 rounded border border-gray-300 \
    dark:border-gray-600 bg-white dark:bg-gray-700 px-3 py-2 text-sm font-medium \
    text-gray-700 dark:text-white cursor-pointer transition \
    hover:border-gray-400 hover:bg-gray-50 hover:text-gray-900 \
    hover:dark:border-gray-500 hover:dark:bg-gray-600 active:scale-[0.99] \
    peer-checked:border-blue-600 peer-checked:bg-blue-50 peer-checked:text-blue-700 \
    peer-checked:shadow-sm peer-checked:dark:border-blue-500 \
    peer-checked:dark:bg-blue-600/20 peer-checked:dark:text-blue-200";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Label badge style
pub const LABEL_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-blue-800 bg-blue-100 rounded-full \
    dark:bg-blue-900 dark:text-blue-300";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    #[allow(dead_code)]
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
    Style(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Billfold" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link rel="icon" type="image/png" href="/static/favicon-128x128.png" sizes="128x128";
                link href="/static/main.css" rel="stylesheet";
                link
                    rel="stylesheet"
                    href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css"
                    crossorigin="anonymous"
                    referrerpolicy="no-referrer";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator {
                        display: inline;
                    }

                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::Style(text) => style { (text) }
                    }
                }

                script src="/static/app.js" defer {}
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            a href="#" class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                img class="w-8 h-8 mr-2" src="/static/favicon-128x128.png" alt="logo";
                "Billfold"
            }

            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        (form_title)
                    }

                    (form)
                }
            }
        }
    }
}

pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="password"
                class=(FORM_LABEL_STYLE)
            {
                "Password"
            }

            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(password)
                minlength=(min_length);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

pub fn email_input(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="email"
                class=(FORM_LABEL_STYLE)
            {
                "Email"
            }

            input
                type="email"
                name="email"
                id="email"
                placeholder="you@example.com"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autocomplete="email"
                value=(email);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Returns the CSS styles for adding a dollar sign prefix to number inputs.
/// Used for currency input fields across multiple forms.
pub fn dollar_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper {
            position: relative;
            display: inline-block;
        }
        .input-wrapper input[type="number"] {
            padding-left: 1.4rem;
        }
        .input-wrapper::before {
            content: '$';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}

fn thousands_separator_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap_or_else(|_| Formatter::new())
            .precision(Precision::Decimals(0))
    })
}

/// Format `amount` as dollars and cents, e.g. "$1,234.50" or "-$450.00".
///
/// Only the whole dollars pass through the number formatter, the cents are
/// taken from the exact decimal value.
pub fn format_currency(amount: Money) -> String {
    let magnitude = amount.abs().as_decimal();
    let sign = if amount.is_negative() { "-" } else { "" };
    let cents = (magnitude.fract() * rust_decimal::Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or_default();

    let dollars = match magnitude.trunc().to_u64() {
        Some(0) | None => "0".to_owned(),
        Some(dollars) => thousands_separator_formatter().fmt_string(dollars),
    };

    format!("{sign}${dollars}.{cents:02}")
}

/// Format `amount` with an explicit sign, e.g. "+$75.50" or "-$50.00".
pub fn format_signed_currency(amount: Money) -> String {
    if amount.is_negative() {
        format_currency(amount)
    } else {
        format!("+{}", format_currency(amount))
    }
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a
            href=(url)
            class=(LINK_STYLE)
        {
          (text)
        }

    )
}

/// Edit and delete links for a row in a table or a card in a list.
///
/// The delete link asks for confirmation with `confirm_message` and then
/// sends a DELETE request to `delete_url`. On success the element selected by
/// `hx_target` is swapped with `hx_swap`, e.g. "closest tr" with "delete".
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    hx_target: &str,
    hx_swap: &str,
) -> Markup {
    html! {
        div class="flex gap-4"
        {
            a href=(edit_url) class=(LINK_STYLE) { "Edit" }

            button
                type="button"
                hx-delete=(delete_url)
                hx-confirm=(confirm_message)
                hx-target=(hx_target)
                hx-target-error="#alert-container"
                hx-swap=(hx_swap)
                class=(BUTTON_DELETE_STYLE)
            {
                "Delete"
            }
        }
    }
}

/// Where a form is submitted: POST for new records, PUT for existing ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormEndpoint<'a> {
    /// Create a record.
    Post(&'a str),
    /// Update a record.
    Put(&'a str),
}

impl<'a> FormEndpoint<'a> {
    /// The URL for the `hx-post` attribute, if any.
    pub fn post(&self) -> Option<&'a str> {
        match self {
            FormEndpoint::Post(url) => Some(url),
            FormEndpoint::Put(_) => None,
        }
    }

    /// The URL for the `hx-put` attribute, if any.
    pub fn put(&self) -> Option<&'a str> {
        match self {
            FormEndpoint::Put(url) => Some(url),
            FormEndpoint::Post(_) => None,
        }
    }
}

/// The error shown above a form's submit button, empty strings render nothing.
pub fn form_error_message(error_message: &str) -> Markup {
    html! {
        @if !error_message.is_empty() {
            p class="text-red-600 dark:text-red-400"
            {
                (error_message)
            }
        }
    }
}

/// A page with the navigation bar and a single centred form.
pub fn form_page(title: &str, nav_bar: Markup, form: Markup) -> Markup {
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4 self-start" { (title) }
            (form)
        }
    };

    base(title, &[dollar_input_styles()], &content)
}

/// A page about one record: its name with an edit link, followed by `sections`.
pub fn detail_page(title: &str, edit_url: &str, nav_bar: Markup, sections: Markup) -> Markup {
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-6 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (title) }

                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                }

                (sections)
            }
        }
    };

    base(title, &[], &content)
}

/// Name and value pairs shown at the top of a detail page.
pub fn detail_facts(facts: &[(&str, Markup)]) -> Markup {
    html! {
        dl class="grid grid-cols-2 gap-x-6 gap-y-2 text-sm sm:grid-cols-4"
        {
            @for (term, value) in facts {
                div
                {
                    dt class="text-gray-500 dark:text-gray-400" { (term) }
                    dd class="font-medium tabular-nums" data-fact=(term) { (value) }
                }
            }
        }
    }
}

/// A headed block on a detail page.
pub fn detail_section(heading: &str, body: Markup) -> Markup {
    html! {
        section class="space-y-2 overflow-x-auto"
        {
            h2 class="text-lg font-semibold" { (heading) }
            (body)
        }
    }
}

/// A small circle filled with `color`.
pub fn color_swatch(color: Color) -> Markup {
    html! {
        span
            class="inline-block w-3 h-3 rounded-full shrink-0"
            style=(format!("background-color: {}", color.hex()))
            title=(color.label())
        {}
    }
}

/// A labelled drop down for picking one of the palette colours.
pub fn color_select(selected: Color) -> Markup {
    html! {
        div
        {
            label for="color" class=(FORM_LABEL_STYLE) { "Colour" }

            select
                id="color"
                name="color"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for color in Color::ALL {
                    option value=(color.as_str()) selected[color == selected]
                    {
                        (color.label())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod format_currency_tests {
    use rust_decimal_macros::dec;

    use crate::money::Money;

    use super::{format_currency, format_signed_currency};

    #[test]
    fn formats_whole_and_fractional_amounts() {
        assert_eq!(format_currency(Money::new(dec!(0))), "$0.00");
        assert_eq!(format_currency(Money::new(dec!(0.5))), "$0.50");
        assert_eq!(format_currency(Money::new(dec!(12.3))), "$12.30");
        assert_eq!(format_currency(Money::new(dec!(1234.56))), "$1,234.56");
        assert_eq!(
            format_currency(Money::new(dec!(99999999.99))),
            "$99,999,999.99"
        );
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_currency(Money::new(dec!(-450))), "-$450.00");
        assert_eq!(format_currency(Money::new(dec!(-0.01))), "-$0.01");
    }

    #[test]
    fn signed_currency_shows_plus_for_income() {
        assert_eq!(format_signed_currency(Money::new(dec!(75.5))), "+$75.50");
        assert_eq!(format_signed_currency(Money::new(dec!(-50))), "-$50.00");
    }
}
