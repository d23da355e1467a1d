//! The page for a single wallet: its balance, budgets and transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::{BudgetSummary, budget_list, get_budget_summaries},
    endpoints,
    html::{color_swatch, detail_facts, detail_page, detail_section, format_currency},
    navigation::NavBar,
    transaction::{
        TransactionFilter, TransactionListItem, get_filtered_transactions, resolve_references,
        transactions_table,
    },
    wallet::{Wallet, WalletId, get_wallet},
};

/// The state needed for the wallet page.
#[derive(Debug, Clone)]
pub struct WalletPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WalletPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render one of the user's wallets with the budgets and transactions that use it.
pub async fn get_wallet_page(
    Path(wallet_id): Path<WalletId>,
    State(state): State<WalletPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let wallet = get_wallet(wallet_id, user_id, &connection)?;
    let budgets = get_budget_summaries(user_id, None, &connection)?
        .into_iter()
        .filter(|summary| summary.budget.wallet_id == wallet_id)
        .collect::<Vec<_>>();
    let transactions = get_filtered_transactions(
        user_id,
        TransactionFilter::Wallet(wallet_id),
        None,
        &connection,
    )
    .inspect_err(|error| {
        tracing::error!("Failed to retrieve transactions for wallet {wallet_id}: {error}")
    })?;
    let items = resolve_references(transactions, user_id, &connection)?;

    Ok(wallet_view(&wallet, &budgets, &items).into_response())
}

fn wallet_view(wallet: &Wallet, budgets: &[BudgetSummary], items: &[TransactionListItem]) -> Markup {
    let page_url = endpoints::format_endpoint(endpoints::WALLET_VIEW, wallet.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_WALLET_VIEW, wallet.id);
    let nav_bar = NavBar::new(&page_url).into_html();

    let facts = detail_facts(&[
        ("Balance", html!((format_currency(wallet.balance)))),
        (
            "Initial balance",
            html!((format_currency(wallet.initial_balance))),
        ),
        (
            "Status",
            html!(@if wallet.is_active { "Active" } @else { "Inactive" }),
        ),
        (
            "Colour",
            html! {
                span class="inline-flex items-center gap-2"
                {
                    (color_swatch(wallet.color)) (wallet.color.label())
                }
            },
        ),
    ]);

    let sections = html! {
        (facts)
        (detail_section(
            "Budgets",
            budget_list(budgets, "No budgets use this wallet."),
        ))
        (detail_section("Transactions", transactions_table(items)))
    };

    detail_page(wallet.name.as_ref(), &edit_url, nav_bar, sections)
}
