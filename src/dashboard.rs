//! The dashboard: an overview of the user's wallets, this month's budgets and
//! their latest transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, UserID,
    budget::{BudgetSummary, budget_progress, get_budget_summaries},
    category::get_categories,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, color_swatch, format_currency},
    label::get_labels,
    money::Money,
    navigation::NavBar,
    timezone::local_today,
    transaction::{TransactionListItem, get_transactions, resolve_references, transactions_table},
    wallet::{Wallet, get_active_wallets},
};

/// How many transactions the dashboard lists.
const RECENT_TRANSACTION_COUNT: u32 = 10;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

struct DashboardData {
    today: Date,
    total_balance: Money,
    wallets: Vec<Wallet>,
    budgets: Vec<BudgetSummary>,
    recent_transactions: Vec<TransactionListItem>,
    category_count: usize,
    label_count: usize,
}

fn get_dashboard_data(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let wallets = get_active_wallets(user_id, connection)?;
    let total_balance = wallets.iter().map(|wallet| wallet.balance).sum();
    let budgets = get_budget_summaries(user_id, Some((today.month(), today.year())), connection)?;
    let recent_transactions = resolve_references(
        get_transactions(user_id, Some(RECENT_TRANSACTION_COUNT), connection)?,
        user_id,
        connection,
    )?;

    Ok(DashboardData {
        today,
        total_balance,
        wallets,
        budgets,
        recent_transactions,
        category_count: get_categories(user_id, connection)?.len(),
        label_count: get_labels(user_id, connection)?.len(),
    })
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = get_dashboard_data(user_id, today, &connection)
        .inspect_err(|error| tracing::error!("could not load the dashboard: {error}"))?;

    Ok(dashboard_view(&data).into_response())
}

fn stat_card(title: &str, value: Markup, data_name: &str) -> Markup {
    html! {
        div class="rounded-lg border border-gray-200 bg-white p-4 shadow-sm dark:border-gray-700 dark:bg-gray-800"
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-semibold tabular-nums" data-stat=(data_name) { (value) }
        }
    }
}

fn wallet_cards(wallets: &[Wallet]) -> Markup {
    html! {
        section class="w-full"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h2 class="text-xl font-semibold" { "Wallets" }
                a href=(endpoints::WALLETS_VIEW) class=(LINK_STYLE) { "Manage wallets" }
            }

            @if wallets.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No active wallets. "
                    a href=(endpoints::NEW_WALLET_VIEW) class=(LINK_STYLE) { "Create a wallet" }
                }
            } @else {
                div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4"
                {
                    @for wallet in wallets {
                        div class="rounded-lg border border-gray-200 bg-white p-4 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                            data-wallet-card="true"
                        {
                            div class="flex items-center gap-2"
                            {
                                (color_swatch(wallet.color))
                                a
                                    href=(endpoints::format_endpoint(endpoints::WALLET_VIEW, wallet.id))
                                    class="font-medium hover:underline"
                                {
                                    (wallet.name)
                                }
                            }
                            p class="mt-2 text-lg tabular-nums" { (format_currency(wallet.balance)) }
                        }
                    }
                }
            }
        }
    }
}

fn budgets_section(budgets: &[BudgetSummary], today: Date) -> Markup {
    html! {
        section class="w-full"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h2 class="text-xl font-semibold" { "Budgets for " (today.month()) " " (today.year()) }
                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "All budgets" }
            }

            @if budgets.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No budgets for this month. "
                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Create a budget" }
                }
            } @else {
                ul class="space-y-2"
                {
                    @for summary in budgets {
                        li class="rounded border border-gray-200 bg-white px-4 py-3 dark:border-gray-700 dark:bg-gray-800"
                            data-dashboard-budget="true"
                        {
                            div class="font-medium"
                            {
                                (summary.category.name) " · " (summary.wallet.name)
                            }
                            p class="text-sm" { (budget_progress(summary)) }
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-6xl space-y-8"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                div class="grid grid-cols-2 lg:grid-cols-4 gap-4"
                {
                    (stat_card("Total balance", html! { (format_currency(data.total_balance)) }, "total-balance"))
                    (stat_card("Active wallets", html! { (data.wallets.len()) }, "wallet-count"))
                    (stat_card("Categories", html! { (data.category_count) }, "category-count"))
                    (stat_card("Labels", html! { (data.label_count) }, "label-count"))
                }

                (wallet_cards(&data.wallets))

                (budgets_section(&data.budgets, data.today))

                section class="w-full"
                {
                    div class="flex justify-between items-baseline mb-4"
                    {
                        h2 class="text-xl font-semibold" { "Recent transactions" }
                        a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "All transactions" }
                    }

                    div class="overflow-x-auto dark:bg-gray-800"
                    {
                        (transactions_table(&data.recent_transactions))
                    }
                }
            }
        }
    };

    base("Dashboard", &[], &content)
}
