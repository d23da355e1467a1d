//! Categories listing page.

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
    category::{Category, count_transactions_per_category, get_categories},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct CategoryRow {
    category: Category,
    transaction_count: u32,
    edit_url: String,
    delete_url: String,
}

/// Render the categories listing page with transaction counts.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transactions_per_category = count_transactions_per_category(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not count transactions per category: {error}")
        })?;

    let rows = categories
        .into_iter()
        .map(|category| CategoryRow {
            transaction_count: *transactions_per_category.get(&category.id).unwrap_or(&0),
            edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
            delete_url: endpoints::format_endpoint(endpoints::CATEGORY, category.id),
            category,
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&rows).into_response())
}

fn category_badge(category: &Category) -> Markup {
    html! {
        span class="inline-flex items-center gap-2 font-medium text-gray-900 dark:text-white"
        {
            span
                class="inline-flex items-center justify-center w-7 h-7 rounded-full text-white text-xs"
                style=(format!("background-color: {}", category.color.hex()))
            {
                i class=(format!("fas {}", category.icon.as_str())) {}
            }

            a
                href=(endpoints::format_endpoint(endpoints::CATEGORY_VIEW, category.id))
                class="hover:underline"
            {
                (category.name)
            }
        }
    }
}

fn confirm_message(row: &CategoryRow) -> String {
    format!(
        "Are you sure you want to delete '{}'? Categories used by transactions or budgets cannot be deleted.",
        row.category.name
    )
}

fn categories_view(rows: &[CategoryRow]) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(new_category_route) class=(LINK_STYLE) { "Create Category" }
                }

                ul class="lg:hidden space-y-4"
                {
                    @for row in rows {
                        li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                            data-category-card="true"
                        {
                            div class="flex items-start justify-between gap-3"
                            {
                                (category_badge(&row.category))
                                span class="text-sm tabular-nums" { (row.transaction_count) }
                            }

                            div class="mt-2 flex items-center gap-4 text-sm"
                            {
                                (edit_delete_action_links(
                                    &row.edit_url,
                                    &row.delete_url,
                                    &confirm_message(row),
                                    "closest [data-category-card='true']",
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
                                    td class=(TABLE_CELL_STYLE) { (category_badge(&row.category)) }
                                    td class=(TABLE_CELL_STYLE) { (row.transaction_count) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (edit_delete_action_links(
                                            &row.edit_url,
                                            &row.delete_url,
                                            &confirm_message(row),
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
                                        "No categories created yet. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Create your first category"
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

    base("Categories", &[], &content)
}

#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        category::{CategoryIcon, CategoryName, NewCategory, create_category},
        color::Color,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        user::create_test_user,
    };

    use super::{CategoriesPageState, get_categories_page};

    #[tokio::test]
    async fn lists_users_categories() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let other_user = create_test_user("other@example.com", &connection);
        for (name, user_id) in [
            ("Groceries", user.id),
            ("Transport", user.id),
            ("Secret", other_user.id),
        ] {
            create_category(
                NewCategory {
                    name: CategoryName::new_unchecked(name),
                    color: Color::Purple,
                    icon: CategoryIcon::Star,
                },
                user_id,
                &connection,
            )
            .unwrap();
        }
        let state = CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_categories_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Groceries"));
        assert!(!text.contains("Secret"));
    }
}
