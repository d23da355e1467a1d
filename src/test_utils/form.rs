use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("page should contain a form")
}

/// Assert that the form submits to `endpoint` through the htmx `attribute`,
/// e.g. `hx-post` for create forms and `hx-put` for edit forms.
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    assert_eq!(
        form.value().attr(attribute),
        Some(endpoint),
        "form should submit with {attribute}"
    );
}

#[track_caller]
fn find_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("input[name='{name}']")).unwrap();

    form.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("form has no input named {name:?}"))
}

/// Assert that the form has a required input `name` of the given type.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = find_input(form, name).value();

    assert_eq!(input.attr("type"), Some(type_), "type of input {name:?}");
    assert!(
        input.attr("required").is_some(),
        "input {name:?} should be required"
    );
}

/// Like [assert_form_input], also checking the value the form was filled with.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_form_input(form, name, type_);
    let input = find_input(form, name).value();

    assert_eq!(input.attr("value"), Some(value), "value of input {name:?}");
}

/// Assert that the form has a submit button, optionally with the given label.
#[track_caller]
pub(crate) fn assert_submit_button(form: &ElementRef<'_>, label: Option<&str>) {
    let button = form
        .select(&Selector::parse("button[type='submit']").unwrap())
        .next()
        .expect("form should have a submit button");

    if let Some(label) = label {
        assert_eq!(button.text().collect::<String>().trim(), label);
    }
}

/// Assert the text of the validation message shown inside the form.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want: &str) {
    let selector = Selector::parse("p.text-red-600").unwrap();
    let message = form
        .select(&selector)
        .next()
        .expect("form should show an error message");

    assert_eq!(message.text().collect::<String>().trim(), want);
}
