//! Categories group transactions and budgets.

mod core;
mod create;
mod delete;
mod detail;
mod edit;
pub(crate) mod form;
mod icon;
mod list;

pub use core::{
    Category, CategoryId, CategoryName, NewCategory, count_transactions_per_category,
    create_category, create_category_table, delete_category, get_categories, get_category,
    update_category,
};
pub use create::{create_category_endpoint, get_new_category_page};
pub use delete::delete_category_endpoint;
pub use detail::get_category_page;
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use icon::CategoryIcon;
pub use list::get_categories_page;
