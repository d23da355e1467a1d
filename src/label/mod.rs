//! Labels are free-form tags attached to transactions.

mod core;
mod create;
mod delete;
mod detail;
mod edit;
pub(crate) mod form;
mod list;

pub use core::{
    Label, LabelId, LabelName, count_transactions_per_label, create_label, create_label_table,
    delete_label, get_label, get_labels, update_label,
};
pub use create::{create_label_endpoint, get_new_label_page};
pub use delete::delete_label_endpoint;
pub use detail::get_label_page;
pub use edit::{get_edit_label_page, update_label_endpoint};
pub use list::get_labels_page;
