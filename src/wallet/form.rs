//! The form shared by the new and edit wallet pages.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    color::Color,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormEndpoint, color_select,
        form_error_message,
    },
    money::Money,
    wallet::{NewWallet, Wallet, WalletName},
};

/// Form data for creating and editing wallets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletForm {
    /// The wallet name.
    pub name: String,
    /// The opening balance, zero if left empty.
    pub initial_balance: Option<Decimal>,
    /// The display colour.
    pub color: Color,
    /// Unchecked checkboxes are not sent, so a missing value means inactive.
    #[serde(default)]
    pub is_active: bool,
}

impl Default for WalletForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            initial_balance: None,
            color: Color::default(),
            is_active: true,
        }
    }
}

impl From<&Wallet> for WalletForm {
    fn from(wallet: &Wallet) -> Self {
        Self {
            name: wallet.name.to_string(),
            initial_balance: Some(wallet.initial_balance.as_decimal()),
            color: wallet.color,
            is_active: wallet.is_active,
        }
    }
}

impl WalletForm {
    /// Check the form fields and convert them into a [NewWallet].
    pub fn validate(&self) -> Result<NewWallet, Error> {
        Ok(NewWallet {
            name: WalletName::new(&self.name)?,
            initial_balance: Money::opening_balance(self.initial_balance.unwrap_or_default())?,
            color: self.color,
            is_active: self.is_active,
        })
    }
}

/// Render the wallet form.
pub fn wallet_form_view(
    endpoint: FormEndpoint<'_>,
    values: &WalletForm,
    error_message: &str,
) -> Markup {
    let submit_text = match endpoint {
        FormEndpoint::Post(_) => "Create Wallet",
        FormEndpoint::Put(_) => "Update Wallet",
    };
    let initial_balance = values.initial_balance.map(|balance| balance.to_string());

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
                label for="name" class=(FORM_LABEL_STYLE) { "Wallet Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Checking Account"
                    value=(values.name)
                    minlength=(WalletName::LENGTH.0)
                    maxlength=(WalletName::LENGTH.1)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="initial_balance" class=(FORM_LABEL_STYLE) { "Initial Balance" }

                div class="input-wrapper w-full"
                {
                    input
                        id="initial_balance"
                        type="number"
                        name="initial_balance"
                        step="0.01"
                        min="-99999999.99"
                        max="99999999.99"
                        placeholder="0.00"
                        value=[initial_balance]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            (color_select(values.color))

            div class="flex items-center gap-2"
            {
                input
                    id="is_active"
                    type="checkbox"
                    name="is_active"
                    value="true"
                    checked[values.is_active]
                    class="w-4 h-4";

                label for="is_active" class="text-sm font-medium" { "Active" }
            }

            (form_error_message(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
