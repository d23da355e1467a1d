//! Monthly spending budgets per category and wallet.

mod core;
mod create;
mod delete;
mod detail;
mod edit;
pub(crate) mod form;
mod list;

pub use core::{
    Budget, BudgetId, BudgetSummary, NewBudget, allowed_years, create_budget, create_budget_table,
    delete_budget, get_budget, get_budget_expenses, get_budget_summaries, get_budget_summary,
    get_budgets, get_spent_amount, update_budget, validate_year,
};
pub use create::{create_budget_endpoint, get_new_budget_page};
pub use delete::delete_budget_endpoint;
pub use detail::get_budget_page;
pub use edit::{get_edit_budget_page, update_budget_endpoint};
pub use list::{budget_list, budget_progress, get_budgets_page};
