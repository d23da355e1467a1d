//! The form shared by the new and edit transaction pages.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{Category, CategoryId},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormEndpoint, LINK_STYLE,
        form_error_message,
    },
    label::{Label, LabelId},
    money::Money,
    transaction::{NewTransaction, Transaction, TransactionDescription},
    wallet::{Wallet, WalletId},
};

/// Whether a transaction spends or earns money.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

/// Form data for creating and editing transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "type_", default)]
    pub transaction_type: TransactionType,
    pub amount: Option<Decimal>,
    pub date: Date,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub wallet_id: Option<WalletId>,
    /// The checked labels, one form field per label.
    #[serde(default)]
    pub label_ids: Vec<LabelId>,
}

impl TransactionForm {
    /// An empty expense dated `today`.
    pub fn new_expense(today: Date) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            amount: None,
            date: today,
            description: String::new(),
            category_id: None,
            wallet_id: None,
            label_ids: Vec::new(),
        }
    }

    /// Check the form fields and convert them into a [NewTransaction].
    ///
    /// Ownership of the category, wallet and labels is checked when the
    /// transaction is saved.
    ///
    /// # Errors
    ///
    /// Returns [Error::FutureDate] if the date is after `today`.
    pub fn validate(&self, today: Date) -> Result<NewTransaction, Error> {
        let amount = Money::positive_amount(self.amount.unwrap_or_default())?;

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(NewTransaction {
            amount,
            description: TransactionDescription::new(&self.description)?,
            date: self.date,
            is_expense: self.transaction_type == TransactionType::Expense,
            category_id: self.category_id.ok_or(Error::InvalidCategory)?,
            wallet_id: self.wallet_id.ok_or(Error::InvalidWallet)?,
            label_ids: self.label_ids.clone(),
        })
    }
}

impl From<&Transaction> for TransactionForm {
    fn from(transaction: &Transaction) -> Self {
        Self {
            transaction_type: if transaction.is_expense {
                TransactionType::Expense
            } else {
                TransactionType::Income
            },
            amount: Some(transaction.amount.as_decimal()),
            date: transaction.date,
            description: transaction.description.to_string(),
            category_id: Some(transaction.category_id),
            wallet_id: Some(transaction.wallet_id),
            label_ids: transaction.label_ids.clone(),
        }
    }
}

/// The choices offered by the transaction form.
pub struct TransactionFormOptions<'a> {
    pub categories: &'a [Category],
    /// The active wallets, plus the transaction's current wallet when editing.
    pub wallets: &'a [Wallet],
    pub labels: &'a [Label],
    /// The latest date a transaction may have.
    pub today: Date,
}

/// Explain what the user has to create before they can add a transaction.
///
/// Returns `None` if the user has at least one category and one active wallet.
pub fn missing_prerequisites_view(options: &TransactionFormOptions<'_>) -> Option<Markup> {
    if !options.categories.is_empty() && !options.wallets.is_empty() {
        return None;
    }

    Some(html! {
        div
            class="w-full space-y-2 text-gray-900 dark:text-white"
            data-transaction-prerequisites="true"
        {
            p { "Transactions need a category and an active wallet." }

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

fn transaction_type_radio(id: &str, value: &str, text: &str, checked: bool) -> Markup {
    html! {
        div class="flex items-center gap-3"
        {
            input
                name="type_"
                id=(id)
                type="radio"
                value=(value)
                checked[checked]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (text) }
        }
    }
}

/// Render the transaction form.
pub fn transaction_form_view(
    endpoint: FormEndpoint<'_>,
    values: &TransactionForm,
    options: &TransactionFormOptions<'_>,
    error_message: &str,
) -> Markup {
    let submit_text = match endpoint {
        FormEndpoint::Post(_) => "Create Transaction",
        FormEndpoint::Put(_) => "Update Transaction",
    };
    let is_expense = values.transaction_type == TransactionType::Expense;
    let amount = values.amount.map(|amount| amount.to_string());

    html! {
        form
            hx-post=[endpoint.post()]
            hx-put=[endpoint.put()]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Transaction type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    (transaction_type_radio("transaction-type-expense", "expense", "Expense", is_expense))
                    (transaction_type_radio("transaction-type-income", "income", "Income", !is_expense))
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
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

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    max=(options.today)
                    value=(values.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    maxlength=(TransactionDescription::MAX_LENGTH)
                    placeholder="Description"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
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

            @if !options.labels.is_empty() {
                fieldset class="space-y-2"
                {
                    legend class=(FORM_LABEL_STYLE) { "Labels" }

                    div class="flex flex-wrap gap-3"
                    {
                        @for label in options.labels {
                            @let id = format!("label-{}", label.id);

                            div class="flex items-center gap-2"
                            {
                                input
                                    type="checkbox"
                                    name="label_ids"
                                    id=(id)
                                    value=(label.id)
                                    checked[values.label_ids.contains(&label.id)]
                                    class="h-4 w-4 cursor-pointer";

                                label for=(id) class="text-sm" { (label.name) }
                            }
                        }
                    }
                }
            }

            (form_error_message(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
