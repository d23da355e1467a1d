//! Wallets listing page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, color_swatch, edit_delete_action_links, format_currency,
    },
    money::Money,
    navigation::NavBar,
    wallet::{Wallet, get_wallets},
};

/// The state needed for the wallets listing page.
#[derive(Debug, Clone)]
pub struct WalletsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WalletsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct WalletRow {
    wallet: Wallet,
    page_url: String,
    edit_url: String,
    delete_url: String,
    confirm_message: String,
}

impl WalletRow {
    fn new(wallet: Wallet) -> Self {
        Self {
            page_url: endpoints::format_endpoint(endpoints::WALLET_VIEW, wallet.id),
            edit_url: endpoints::format_endpoint(endpoints::EDIT_WALLET_VIEW, wallet.id),
            delete_url: endpoints::format_endpoint(endpoints::WALLET, wallet.id),
            confirm_message: format!(
                "Are you sure you want to delete '{}'? Wallets with transactions or budgets cannot be deleted.",
                wallet.name
            ),
            wallet,
        }
    }
}

/// Render the user's wallets with the total balance of the active ones.
pub async fn get_wallets_page(
    State(state): State<WalletsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let wallets = get_wallets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve wallets: {error}"))?;

    let total_balance = wallets
        .iter()
        .filter(|wallet| wallet.is_active)
        .map(|wallet| wallet.balance)
        .sum();

    let rows = wallets.into_iter().map(WalletRow::new).collect::<Vec<_>>();

    Ok(wallets_view(&rows, total_balance).into_response())
}

fn status_badge(is_active: bool) -> Markup {
    html! {
        @if is_active {
            span class="text-xs font-medium px-2 py-0.5 rounded bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300"
            { "Active" }
        } @else {
            span class="text-xs font-medium px-2 py-0.5 rounded bg-gray-100 text-gray-800 dark:bg-gray-700 dark:text-gray-300"
            { "Inactive" }
        }
    }
}

fn wallets_view(rows: &[WalletRow], total_balance: Money) -> Markup {
    let new_wallet_route = endpoints::NEW_WALLET_VIEW;
    let nav_bar = NavBar::new(endpoints::WALLETS_VIEW).into_html();

    let table_row = |row: &WalletRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex items-center gap-2"
                    {
                        (color_swatch(row.wallet.color))
                        a href=(row.page_url) class="font-medium text-gray-900 hover:underline dark:text-white" { (row.wallet.name) }
                    }
                }

                td class="px-6 py-4 text-right tabular-nums" data-balance="true"
                {
                    (format_currency(row.wallet.balance))
                }

                td class="px-6 py-4 text-right tabular-nums"
                {
                    (format_currency(row.wallet.initial_balance))
                }

                td class=(TABLE_CELL_STYLE) { (status_badge(row.wallet.is_active)) }

                td class=(TABLE_CELL_STYLE)
                {
                    (edit_delete_action_links(
                        &row.edit_url,
                        &row.delete_url,
                        &row.confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Wallets" }
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            "Total balance: "
                            span id="total-balance" class="font-semibold tabular-nums"
                            {
                                (format_currency(total_balance))
                            }
                        }
                    }

                    a href=(new_wallet_route) class=(LINK_STYLE) { "Create Wallet" }
                }

                (wallet_cards_view(rows, new_wallet_route))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class="px-6 py-4 text-right" { "Balance" }
                                th scope="col" class="px-6 py-4 text-right" { "Initial Balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No wallets created yet. "
                                        a href=(new_wallet_route) class=(LINK_STYLE)
                                        {
                                            "Create your first wallet"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Wallets", &[], &content)
}

fn wallet_cards_view(rows: &[WalletRow], new_wallet_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in rows {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-wallet-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div class="flex items-center gap-2"
                        {
                            (color_swatch(row.wallet.color))
                            a href=(row.page_url) class="font-medium text-gray-900 hover:underline dark:text-white" { (row.wallet.name) }
                        }

                        span class="text-sm tabular-nums text-gray-900 dark:text-white"
                        { (format_currency(row.wallet.balance)) }
                    }

                    div class="mt-2 flex items-center justify-between gap-4 text-sm"
                    {
                        (status_badge(row.wallet.is_active))

                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &row.confirm_message,
                            "closest [data-wallet-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if rows.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No wallets created yet. "
                    a href=(new_wallet_route) class=(LINK_STYLE)
                    {
                        "Create your first wallet"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod wallets_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;

    use crate::{
        color::Color,
        db::initialize,
        endpoints,
        money::Money,
        test_utils::{assert_valid_html, parse_html_document, select_texts},
        user::create_test_user,
        wallet::{NewWallet, WalletName, create_wallet},
    };

    use super::{WalletsPageState, get_wallets_page};

    #[tokio::test]
    async fn shows_only_the_users_wallets_and_active_total() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let other_user = create_test_user("other@example.com", &connection);
        for (name, balance, is_active, user_id) in [
            ("Cash", dec!(500), true, user.id),
            ("Savings", dec!(1234.5), true, user.id),
            ("Old Card", dec!(-40), false, user.id),
            ("Not Mine", dec!(9999), true, other_user.id),
        ] {
            create_wallet(
                NewWallet {
                    name: WalletName::new_unchecked(name),
                    initial_balance: Money::new(balance),
                    color: Color::Teal,
                    is_active,
                },
                user_id,
                &connection,
            )
            .unwrap();
        }
        let state = WalletsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_wallets_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 3);
        let text = html.root_element().text().collect::<String>();
        assert!(!text.contains("Not Mine"));

        let total = html
            .select(&Selector::parse("#total-balance").unwrap())
            .next()
            .expect("No total balance found")
            .text()
            .collect::<String>();
        assert_eq!(total.trim(), "$1,734.50");
    }

    #[tokio::test]
    async fn shows_empty_message_without_wallets() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let state = WalletsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_wallets_page(State(state), Extension(user.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Create your first wallet"));
    }
    #[tokio::test]
    async fn wallet_names_link_to_wallet_pages() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let wallet = create_wallet(
            NewWallet {
                name: WalletName::new_unchecked("Cash"),
                initial_balance: Money::ZERO,
                color: Color::Teal,
                is_active: true,
            },
            user.id,
            &connection,
        )
        .unwrap();
        let state = WalletsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_wallets_page(State(state), Extension(user.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let page_url = endpoints::format_endpoint(endpoints::WALLET_VIEW, wallet.id);
        assert_eq!(
            select_texts(&html, &format!("tbody a[href='{page_url}']")),
            ["Cash"]
        );
    }
}
