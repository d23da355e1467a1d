//! Budgets listing page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::{BudgetSummary, get_budget_summaries},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, color_swatch, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the budgets listing page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the user's budgets with how much has been spent against each.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let summaries = get_budget_summaries(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;

    Ok(budgets_view(&summaries).into_response())
}

/// The spent and remaining columns of a budget, shared with the dashboard.
pub fn budget_progress(summary: &BudgetSummary) -> Markup {
    let remaining = summary.remaining();
    let remaining_style = if remaining.is_negative() {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        span class="tabular-nums" { (format_currency(summary.spent)) }
        " of "
        span class="tabular-nums" { (format_currency(summary.budget.amount)) }
        " spent, "
        span class=(format!("tabular-nums {remaining_style}")) data-remaining="true"
        {
            (format_currency(remaining))
        }
        " left"
    }
}

/// Links to budgets with their progress, shown on wallet and category pages.
pub fn budget_list(summaries: &[BudgetSummary], empty_message: &str) -> Markup {
    html! {
        @if summaries.is_empty() {
            p class="text-sm text-gray-500 dark:text-gray-400" { (empty_message) }
        } @else {
            ul class="space-y-2"
            {
                @for summary in summaries {
                    li class="text-sm" data-budget="true"
                    {
                        a
                            href=(endpoints::format_endpoint(endpoints::BUDGET_VIEW, summary.budget.id))
                            class=(LINK_STYLE)
                        {
                            (summary.budget.month) " " (summary.budget.year)
                            " · " (summary.category.name)
                        }
                        ": "
                        (budget_progress(summary))
                    }
                }
            }
        }
    }
}

fn budgets_view(summaries: &[BudgetSummary]) -> Markup {
    let new_budget_route = endpoints::NEW_BUDGET_VIEW;
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let table_row = |summary: &BudgetSummary| {
        let budget = &summary.budget;
        let page_url = endpoints::format_endpoint(endpoints::BUDGET_VIEW, budget.id);
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
        let delete_url = endpoints::format_endpoint(endpoints::BUDGET, budget.id);
        let confirm_message = format!(
            "Are you sure you want to delete the {} {} budget for '{}'?",
            budget.month, budget.year, summary.category.name
        );
        let remaining = summary.remaining();

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(page_url) class=(LINK_STYLE) { (budget.month) " " (budget.year) }
                }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex items-center gap-2"
                    {
                        (color_swatch(summary.category.color))
                        (summary.category.name)
                    }
                }
                td class=(TABLE_CELL_STYLE) { (summary.wallet.name) }
                td class="px-6 py-4 text-right tabular-nums" { (format_currency(budget.amount)) }
                td class="px-6 py-4 text-right tabular-nums" { (format_currency(summary.spent)) }
                td
                    class=(if remaining.is_negative() {
                        "px-6 py-4 text-right tabular-nums text-red-600 dark:text-red-400"
                    } else {
                        "px-6 py-4 text-right tabular-nums"
                    })
                    data-remaining="true"
                {
                    (format_currency(remaining))
                }
                td class=(TABLE_CELL_STYLE)
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
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
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(new_budget_route) class=(LINK_STYLE) { "Create Budget" }
                }

                ul class="lg:hidden space-y-4"
                {
                    @for summary in summaries {
                        li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                        {
                            div class="flex items-center justify-between gap-3"
                            {
                                a
                                    href=(endpoints::format_endpoint(endpoints::BUDGET_VIEW, summary.budget.id))
                                    class="font-medium hover:underline"
                                {
                                    (summary.category.name)
                                }
                                span class="text-sm text-gray-500"
                                {
                                    (summary.budget.month) " " (summary.budget.year)
                                    " · " (summary.wallet.name)
                                }
                            }
                            p class="mt-1 text-sm" { (budget_progress(summary)) }
                        }
                    }
                }

                section class="hidden lg:block dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Wallet" }
                                th scope="col" class="px-6 py-4 text-right" { "Budget" }
                                th scope="col" class="px-6 py-4 text-right" { "Spent" }
                                th scope="col" class="px-6 py-4 text-right" { "Remaining" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for summary in summaries {
                                (table_row(summary))
                            }

                            @if summaries.is_empty() {
                                tr
                                {
                                    td
                                        colspan="7"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No budgets created yet. "
                                        a href=(new_budget_route) class=(LINK_STYLE)
                                        {
                                            "Create your first budget"
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

    base("Budgets", &[], &content)
}

#[cfg(test)]
mod budgets_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        budget::{NewBudget, create_budget},
        category::{CategoryIcon, CategoryName, NewCategory, create_category},
        color::Color,
        db::initialize,
        money::Money,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{NewTransaction, TransactionDescription, create_transaction},
        user::create_test_user,
        wallet::{NewWallet, WalletName, create_wallet},
    };

    use super::{BudgetsPageState, get_budgets_page};

    #[tokio::test]
    async fn shows_spent_and_remaining() {
        let mut connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let category = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                color: Color::Green,
                icon: CategoryIcon::ShoppingCart,
            },
            user.id,
            &connection,
        )
        .unwrap();
        let wallet = create_wallet(
            NewWallet {
                name: WalletName::new_unchecked("Checking"),
                initial_balance: Money::new(dec!(1000)),
                color: Color::Navy,
                is_active: true,
            },
            user.id,
            &connection,
        )
        .unwrap();
        let today = OffsetDateTime::now_utc().date();
        create_budget(
            NewBudget {
                amount: Money::new(dec!(400)),
                month: today.month(),
                year: today.year(),
                category_id: category.id,
                wallet_id: wallet.id,
            },
            user.id,
            &connection,
        )
        .unwrap();
        for (amount, is_expense) in [(dec!(120.25), true), (dec!(30), true), (dec!(500), false)] {
            create_transaction(
                NewTransaction {
                    amount: Money::new(amount),
                    description: TransactionDescription::default(),
                    date: today,
                    is_expense,
                    category_id: category.id,
                    wallet_id: wallet.id,
                    label_ids: vec![],
                },
                user.id,
                &mut connection,
            )
            .unwrap();
        }
        let state = BudgetsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_budgets_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let remaining = html
            .select(&Selector::parse("td[data-remaining]").unwrap())
            .next()
            .expect("No remaining amount found")
            .text()
            .collect::<String>();
        assert_eq!(remaining.trim(), "$249.75");
    }
}
