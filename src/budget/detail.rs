//! The page for a single budget and the expenses counted against it.

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
    budget::{BudgetId, BudgetSummary, budget_progress, get_budget_expenses, get_budget_summary},
    endpoints,
    html::{LINK_STYLE, detail_facts, detail_page, detail_section, format_currency},
    navigation::NavBar,
    transaction::{TransactionListItem, resolve_references, transactions_table},
};

/// The state needed for the budget page.
#[derive(Debug, Clone)]
pub struct BudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render one of the user's budgets with the expenses that count towards it.
pub async fn get_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<BudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = get_budget_summary(budget_id, user_id, &connection)?;
    let expenses = get_budget_expenses(&summary.budget, user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Failed to retrieve expenses for budget {budget_id}: {error}")
        })?;
    let items = resolve_references(expenses, user_id, &connection)?;

    Ok(budget_view(&summary, &items).into_response())
}

fn budget_view(summary: &BudgetSummary, items: &[TransactionListItem]) -> Markup {
    let budget = &summary.budget;
    let page_url = endpoints::format_endpoint(endpoints::BUDGET_VIEW, budget.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let nav_bar = NavBar::new(&page_url).into_html();
    let title = format!(
        "{} {} {}",
        summary.category.name, budget.month, budget.year
    );

    let sections = html! {
        (detail_facts(&[
            ("Budget", html!((format_currency(budget.amount)))),
            ("Spent", html!((format_currency(summary.spent)))),
            ("Remaining", html!((format_currency(summary.remaining())))),
            (
                "Wallet",
                html! {
                    a
                        href=(endpoints::format_endpoint(endpoints::WALLET_VIEW, summary.wallet.id))
                        class=(LINK_STYLE)
                    {
                        (summary.wallet.name)
                    }
                },
            ),
        ]))
        p class="text-sm" { (budget_progress(summary)) }
        (detail_section("Expenses", transactions_table(items)))
    };

    detail_page(&title, &edit_url, nav_bar, sections)
}
