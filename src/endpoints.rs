//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/:user_id', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing wallets and their balances.
pub const WALLETS_VIEW: &str = "/wallets";
/// The page for creating a new wallet.
pub const NEW_WALLET_VIEW: &str = "/wallets/new";
/// The page showing one wallet with its budgets and transactions.
pub const WALLET_VIEW: &str = "/wallets/{wallet_id}";
/// The page for editing an existing wallet.
pub const EDIT_WALLET_VIEW: &str = "/wallets/{wallet_id}/edit";
/// The page for listing categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page showing one category with its budgets and transactions.
pub const CATEGORY_VIEW: &str = "/categories/{category_id}";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for listing labels.
pub const LABELS_VIEW: &str = "/labels";
/// The page for creating a new label.
pub const NEW_LABEL_VIEW: &str = "/labels/new";
/// The page showing the transactions carrying one label.
pub const LABEL_VIEW: &str = "/labels/{label_id}";
/// The page for editing an existing label.
pub const EDIT_LABEL_VIEW: &str = "/labels/{label_id}/edit";
/// The page for listing budgets and how much of each has been spent.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for creating a new budget.
pub const NEW_BUDGET_VIEW: &str = "/budgets/new";
/// The page showing one budget and the expenses counted against it.
pub const BUDGET_VIEW: &str = "/budgets/{budget_id}";
/// The page for editing an existing budget.
pub const EDIT_BUDGET_VIEW: &str = "/budgets/{budget_id}/edit";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create a wallet.
pub const WALLETS_API: &str = "/api/wallets";
/// The route to update or delete a wallet.
pub const WALLET: &str = "/api/wallets/{wallet_id}";
/// The route to create a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a label.
pub const LABELS_API: &str = "/api/labels";
/// The route to update or delete a label.
pub const LABEL: &str = "/api/labels/{label_id}";
/// The route to create a budget.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to update or delete a budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::WALLETS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_WALLET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::WALLET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_WALLET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_CATEGORY_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_CATEGORY_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LABELS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_LABEL_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LABEL_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_LABEL_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_BUDGET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_BUDGET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);
        assert_endpoint_is_valid_uri(endpoints::COFFEE);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::WALLETS_API);
        assert_endpoint_is_valid_uri(endpoints::WALLET);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES_API);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::LABELS_API);
        assert_endpoint_is_valid_uri(endpoints::LABEL);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_API);
        assert_endpoint_is_valid_uri(endpoints::BUDGET);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
