//! Labels listing page.

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
        LABEL_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    label::{Label, count_transactions_per_label, get_labels},
    navigation::NavBar,
};

/// The state needed for the labels listing page.
#[derive(Debug, Clone)]
pub struct LabelsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LabelsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct LabelRow {
    label: Label,
    page_url: String,
    transaction_count: u32,
    edit_url: String,
    delete_url: String,
    confirm_message: String,
}

/// Render the labels listing page with transaction counts.
pub async fn get_labels_page(
    State(state): State<LabelsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let labels = get_labels(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve labels: {error}"))?;

    let transactions_per_label = count_transactions_per_label(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not count transactions per label: {error}"))?;

    let rows = labels
        .into_iter()
        .map(|label| LabelRow {
            page_url: endpoints::format_endpoint(endpoints::LABEL_VIEW, label.id),
            transaction_count: *transactions_per_label.get(&label.id).unwrap_or(&0),
            edit_url: endpoints::format_endpoint(endpoints::EDIT_LABEL_VIEW, label.id),
            delete_url: endpoints::format_endpoint(endpoints::LABEL, label.id),
            confirm_message: format!(
                "Are you sure you want to delete '{}'? Labels used by transactions cannot be deleted.",
                label.name
            ),
            label,
        })
        .collect::<Vec<_>>();

    Ok(labels_view(&rows).into_response())
}

fn labels_view(rows: &[LabelRow]) -> Markup {
    let new_label_route = endpoints::NEW_LABEL_VIEW;
    let nav_bar = NavBar::new(endpoints::LABELS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Labels" }

                    a href=(new_label_route) class=(LINK_STYLE) { "Create Label" }
                }

                ul class="lg:hidden space-y-4"
                {
                    @for row in rows {
                        li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                            data-label-card="true"
                        {
                            div class="flex items-start justify-between gap-3"
                            {
                                a href=(row.page_url) class=(LABEL_BADGE_STYLE) { (row.label.name) }
                                span class="text-sm tabular-nums" { (row.transaction_count) }
                            }

                            div class="mt-2 flex items-center gap-4 text-sm"
                            {
                                (edit_delete_action_links(
                                    &row.edit_url,
                                    &row.delete_url,
                                    &row.confirm_message,
                                    "closest [data-label-card='true']",
                                    "outerHTML",
                                ))
                            }
                        }
                    }
                }

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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        a href=(row.page_url) class=(LABEL_BADGE_STYLE) { (row.label.name) }
                                    }
                                    td class=(TABLE_CELL_STYLE) { (row.transaction_count) }
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
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No labels created yet. "
                                        a href=(new_label_route) class=(LINK_STYLE)
                                        {
                                            "Create your first label"
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

    base("Labels", &[], &content)
}
