//! Transactions listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{Category, get_categories},
    endpoints,
    html::{
        LABEL_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, color_swatch, edit_delete_action_links, format_signed_currency,
    },
    label::{Label, get_labels},
    navigation::NavBar,
    transaction::{Transaction, get_transactions},
    wallet::{Wallet, get_wallets},
};

/// The state needed for the transactions listing page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A transaction with the names of the rows it refers to.
#[derive(Debug, Clone)]
pub struct TransactionListItem {
    pub transaction: Transaction,
    pub category: Option<Category>,
    pub wallet: Option<Wallet>,
    pub labels: Vec<Label>,
}

/// Attach the user's categories, wallets and labels to `transactions`.
pub fn resolve_references(
    transactions: Vec<Transaction>,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionListItem>, Error> {
    let categories: HashMap<_, _> = get_categories(user_id, connection)?
        .into_iter()
        .map(|category| (category.id, category))
        .collect();
    let wallets: HashMap<_, _> = get_wallets(user_id, connection)?
        .into_iter()
        .map(|wallet| (wallet.id, wallet))
        .collect();
    let labels: HashMap<_, _> = get_labels(user_id, connection)?
        .into_iter()
        .map(|label| (label.id, label))
        .collect();

    Ok(transactions
        .into_iter()
        .map(|transaction| TransactionListItem {
            category: categories.get(&transaction.category_id).cloned(),
            wallet: wallets.get(&transaction.wallet_id).cloned(),
            labels: transaction
                .label_ids
                .iter()
                .filter_map(|label_id| labels.get(label_id).cloned())
                .collect(),
            transaction,
        })
        .collect())
}

/// Render the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let items = resolve_references(transactions, user_id, &connection)?;

    Ok(transactions_view(&items).into_response())
}

fn amount_view(transaction: &Transaction) -> Markup {
    let style = if transaction.is_expense {
        "tabular-nums text-red-600 dark:text-red-400"
    } else {
        "tabular-nums text-green-600 dark:text-green-400"
    };

    html! {
        span class=(style) data-amount="true" { (format_signed_currency(transaction.signed_amount())) }
    }
}

fn category_view(category: Option<&Category>) -> Markup {
    html! {
        @if let Some(category) = category {
            div class="flex items-center gap-2"
            {
                (color_swatch(category.color))
                i class=(format!("fas {}", category.icon.as_str())) {}
                (category.name)
            }
        }
    }
}

fn labels_view(labels: &[Label]) -> Markup {
    html! {
        div class="flex flex-wrap gap-1"
        {
            @for label in labels {
                span class=(LABEL_BADGE_STYLE) { (label.name) }
            }
        }
    }
}

fn action_links(transaction: &Transaction, hx_target: &str, hx_swap: &str) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction on {}? Its amount will be removed from the wallet balance.",
        transaction.date
    );

    edit_delete_action_links(&edit_url, &delete_url, &confirm_message, hx_target, hx_swap)
}

/// A table of transactions with edit and delete links, shared with the dashboard.
pub fn transactions_table(items: &[TransactionListItem]) -> Markup {
    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Wallet" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Labels" }
                    th scope="col" class="px-6 py-4 text-right" { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for item in items {
                    tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
                    {
                        td class="px-6 py-4 whitespace-nowrap" { (item.transaction.date) }
                        td class=(TABLE_CELL_STYLE) { (item.transaction.description) }
                        td class=(TABLE_CELL_STYLE) { (category_view(item.category.as_ref())) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @if let Some(wallet) = &item.wallet { (wallet.name) }
                        }
                        td class=(TABLE_CELL_STYLE) { (labels_view(&item.labels)) }
                        td class="px-6 py-4 text-right" { (amount_view(&item.transaction)) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            (action_links(&item.transaction, "closest tr", "delete"))
                        }
                    }
                }

                @if items.is_empty() {
                    tr
                    {
                        td colspan="7" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                        {
                            "No transactions recorded yet. "
                            a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                            {
                                "Record your first transaction"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_cards_view(items: &[TransactionListItem]) -> Markup {
    html! {
        ul class="lg:hidden space-y-4"
        {
            @for item in items {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-transaction-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div
                        {
                            p class="font-medium text-gray-900 dark:text-white"
                            {
                                @if item.transaction.description.is_empty() {
                                    @if let Some(category) = &item.category { (category.name) }
                                } @else {
                                    (item.transaction.description)
                                }
                            }
                            p class="text-xs text-gray-500 dark:text-gray-400"
                            {
                                (item.transaction.date)
                                @if let Some(wallet) = &item.wallet { " · " (wallet.name) }
                            }
                        }

                        (amount_view(&item.transaction))
                    }

                    div class="mt-2 flex items-center justify-between gap-4 text-sm"
                    {
                        (labels_view(&item.labels))

                        (action_links(
                            &item.transaction,
                            "closest [data-transaction-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }
        }
    }
}

fn transactions_view(items: &[TransactionListItem]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add Transaction" }
                }

                (transaction_cards_view(items))

                section class="hidden lg:block dark:bg-gray-800"
                {
                    (transactions_table(items))
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rust_decimal_macros::dec;
    use scraper::Selector;

    use crate::{
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{core::test_fixture::get_fixture, create_transaction},
        user::create_test_user,
    };

    use super::{TransactionsPageState, get_transactions_page};

    #[tokio::test]
    async fn lists_signed_amounts_newest_first() {
        let mut fixture = get_fixture();
        let mut expense = fixture.new_transaction(dec!(50), true, &fixture.wallet_a);
        expense.label_ids = vec![fixture.label.id];
        create_transaction(expense, fixture.user_id, &mut fixture.connection).unwrap();
        let income = fixture.new_transaction(dec!(75.50), false, &fixture.wallet_a);
        create_transaction(income, fixture.user_id, &mut fixture.connection).unwrap();
        let state = TransactionsPageState {
            db_connection: Arc::new(Mutex::new(fixture.connection)),
        };

        let response = get_transactions_page(State(state), Extension(fixture.user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let amounts = html
            .select(&Selector::parse("tr[data-transaction-row] [data-amount]").unwrap())
            .map(|amount| amount.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(amounts, ["+$75.50", "-$50.00"]);
        let badges = html
            .select(&Selector::parse("tr[data-transaction-row] span.rounded-full").unwrap())
            .map(|badge| badge.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(badges, ["Weekly"]);
    }

    #[tokio::test]
    async fn does_not_show_other_users_transactions() {
        let mut fixture = get_fixture();
        let expense = fixture.new_transaction(dec!(50), true, &fixture.wallet_a);
        create_transaction(expense, fixture.user_id, &mut fixture.connection).unwrap();
        let other_user = create_test_user("other@example.com", &fixture.connection);
        let state = TransactionsPageState {
            db_connection: Arc::new(Mutex::new(fixture.connection)),
        };

        let response = get_transactions_page(State(state), Extension(other_user.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let rows = html
            .select(&Selector::parse("tr[data-transaction-row]").unwrap())
            .count();
        assert_eq!(rows, 0);
    }
}
