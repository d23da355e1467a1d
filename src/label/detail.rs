//! The page for a single label and the transactions that carry it.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    html::{detail_facts, detail_page, detail_section, format_signed_currency},
    label::{Label, LabelId, get_label},
    money::Money,
    navigation::NavBar,
    transaction::{
        TransactionFilter, TransactionListItem, get_filtered_transactions, resolve_references,
        transactions_table,
    },
};

/// The state needed for the label page.
#[derive(Debug, Clone)]
pub struct LabelPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LabelPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render one of the user's labels with the transactions that carry it.
pub async fn get_label_page(
    Path(label_id): Path<LabelId>,
    State(state): State<LabelPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let label = get_label(label_id, user_id, &connection)?;
    let transactions = get_filtered_transactions(
        user_id,
        TransactionFilter::Label(label_id),
        None,
        &connection,
    )
    .inspect_err(|error| {
        tracing::error!("Failed to retrieve transactions for label {label_id}: {error}")
    })?;
    let items = resolve_references(transactions, user_id, &connection)?;

    Ok(label_view(&label, &items).into_response())
}

fn label_view(label: &Label, items: &[TransactionListItem]) -> Markup {
    let page_url = endpoints::format_endpoint(endpoints::LABEL_VIEW, label.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_LABEL_VIEW, label.id);
    let nav_bar = NavBar::new(&page_url).into_html();
    let net: Money = items
        .iter()
        .map(|item| item.transaction.signed_amount())
        .sum();

    let sections = html! {
        (detail_facts(&[
            ("Transactions", html!((items.len()))),
            ("Net", html!((format_signed_currency(net)))),
        ]))
        (detail_section("Transactions", transactions_table(items)))
    };

    detail_page(label.name.as_ref(), &edit_url, nav_bar, sections)
}
