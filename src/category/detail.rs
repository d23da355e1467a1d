//! The page for a single category: its budgets and transactions.

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
    category::{Category, CategoryId, get_category},
    endpoints,
    html::{color_swatch, detail_facts, detail_page, detail_section, format_currency},
    money::Money,
    navigation::NavBar,
    transaction::{
        TransactionFilter, TransactionListItem, get_filtered_transactions, resolve_references,
        transactions_table,
    },
};

/// The state needed for the category page.
#[derive(Debug, Clone)]
pub struct CategoryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render one of the user's categories with its budgets and transactions.
pub async fn get_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;
    let budgets = get_budget_summaries(user_id, None, &connection)?
        .into_iter()
        .filter(|summary| summary.budget.category_id == category_id)
        .collect::<Vec<_>>();
    let transactions = get_filtered_transactions(
        user_id,
        TransactionFilter::Category(category_id),
        None,
        &connection,
    )
    .inspect_err(|error| {
        tracing::error!("Failed to retrieve transactions for category {category_id}: {error}")
    })?;
    let items = resolve_references(transactions, user_id, &connection)?;

    Ok(category_view(&category, &budgets, &items).into_response())
}

/// The totals of expenses and incomes among `items`.
fn totals(items: &[TransactionListItem]) -> (Money, Money) {
    items
        .iter()
        .map(|item| &item.transaction)
        .fold((Money::ZERO, Money::ZERO), |(spent, earned), transaction| {
            if transaction.is_expense {
                (spent + transaction.amount, earned)
            } else {
                (spent, earned + transaction.amount)
            }
        })
}

fn category_view(
    category: &Category,
    budgets: &[BudgetSummary],
    items: &[TransactionListItem],
) -> Markup {
    let page_url = endpoints::format_endpoint(endpoints::CATEGORY_VIEW, category.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
    let nav_bar = NavBar::new(&page_url).into_html();
    let (spent, earned) = totals(items);

    let facts = detail_facts(&[
        ("Transactions", html!((items.len()))),
        ("Spent", html!((format_currency(spent)))),
        ("Earned", html!((format_currency(earned)))),
        (
            "Style",
            html! {
                span class="inline-flex items-center gap-2"
                {
                    (color_swatch(category.color))
                    i class=(format!("fas {}", category.icon.as_str())) {}
                    (category.icon.label())
                }
            },
        ),
    ]);

    let sections = html! {
        (facts)
        (detail_section(
            "Budgets",
            budget_list(budgets, "No budgets use this category."),
        ))
        (detail_section("Transactions", transactions_table(items)))
    };

    detail_page(category.name.as_ref(), &edit_url, nav_bar, sections)
}
