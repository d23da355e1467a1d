//! The form shared by the new and edit budget pages.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
    Error,
    budget::{Budget, NewBudget, allowed_years, validate_year},
    category::{Category, CategoryId},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormEndpoint, LINK_STYLE,
        form_error_message,
    },
    money::Money,
    wallet::{Wallet, WalletId},
};

/// Form data for creating and editing budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetForm {
    pub amount: Option<Decimal>,
    /// The month number, 1 for January.
    pub month: u8,
    pub year: i32,
    pub category_id: Option<CategoryId>,
    pub wallet_id: Option<WalletId>,
}

impl BudgetForm {
    /// An empty form for the month containing `today`.
    pub fn for_month_of(today: Date) -> Self {
        Self {
            amount: None,
            month: u8::from(today.month()),
            year: today.year(),
            category_id: None,
            wallet_id: None,
        }
    }

    /// Check the form fields and convert them into a [NewBudget].
    ///
    /// Ownership of the category and wallet is checked when the budget is saved.
    pub fn validate(&self, today: Date) -> Result<NewBudget, Error> {
        let amount = Money::positive_amount(self.amount.unwrap_or_default())?;
        let month = Month::try_from(self.month).map_err(|_| Error::InvalidMonth(self.month))?;
        let year = validate_year(self.year, today)?;

        Ok(NewBudget {
            amount,
            month,
            year,
            category_id: self.category_id.ok_or(Error::InvalidCategory)?,
            wallet_id: self.wallet_id.ok_or(Error::InvalidWallet)?,
        })
    }
}

impl From<&Budget> for BudgetForm {
    fn from(budget: &Budget) -> Self {
        Self {
            amount: Some(budget.amount.as_decimal()),
            month: u8::from(budget.month),
            year: budget.year,
            category_id: Some(budget.category_id),
            wallet_id: Some(budget.wallet_id),
        }
    }
}

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The choices offered by the budget form.
pub struct BudgetFormOptions<'a> {
    pub categories: &'a [Category],
    /// The active wallets, plus the budget's current wallet when editing.
    pub wallets: &'a [Wallet],
    pub today: Date,
}

/// Explain what the user has to create before they can add a budget.
///
/// Returns `None` if the user has at least one category and one active wallet.
pub fn missing_prerequisites_view(options: &BudgetFormOptions<'_>) -> Option<Markup> {
    if !options.categories.is_empty() && !options.wallets.is_empty() {
        return None;
    }

    Some(html! {
        div class="w-full space-y-2 text-gray-900 dark:text-white" data-budget-prerequisites="true"
        {
            p { "Budgets need a category and an active wallet." }

            @if options.categories.is_empty() {
                p
                {
                    a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE) { "Create a category" }
                    " first."
                }
            }

            @if options.wallets.is_empty() {
                p
                {
                    a href=(endpoints::NEW_WALLET_VIEW) class=(LINK_STYLE) { "Create an active wallet" }
                    " first."
                }
            }
        }
    })
}

/// Render the budget form.
pub fn budget_form_view(
    endpoint: FormEndpoint<'_>,
    values: &BudgetForm,
    options: &BudgetFormOptions<'_>,
    error_message: &str,
) -> Markup {
    let submit_text = match endpoint {
        FormEndpoint::Post(_) => "Create Budget",
        FormEndpoint::Put(_) => "Update Budget",
    };
    let (min_year, max_year) = allowed_years(options.today);
    let amount = values.amount.map(|amount| amount.to_string());

    html! {
        form
            hx-post=[endpoint.post()]
            hx-put=[endpoint.put()]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        max="99999999.99"
                        placeholder="0.00"
                        value=[amount]
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="grid grid-cols-2 gap-4"
            {
                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                    select id="month" name="month" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for month in MONTHS {
                            option value=(u8::from(month)) selected[u8::from(month) == values.month]
                            {
                                (month)
                            }
                        }
                    }
                }

                div
                {
                    label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                    input
                        id="year"
                        type="number"
                        name="year"
                        min=(min_year)
                        max=(max_year)
                        value=(values.year)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in options.categories {
                        option
                            value=(category.id)
                            selected[values.category_id == Some(category.id)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="wallet_id" class=(FORM_LABEL_STYLE) { "Wallet" }

                select id="wallet_id" name="wallet_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for wallet in options.wallets {
                        option
                            value=(wallet.id)
                            selected[values.wallet_id == Some(wallet.id)]
                        {
                            (wallet.name)
                            @if !wallet.is_active { " (inactive)" }
                        }
                    }
                }
            }

            (form_error_message(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
