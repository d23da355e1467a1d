//! The Font Awesome icons a category can be shown with.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

macro_rules! category_icons {
    ($($variant:ident => ($class:literal, $label:literal)),+ $(,)?) => {
        /// One of the fixed icons offered for categories.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum CategoryIcon {
            $($variant),+
        }

        impl CategoryIcon {
            /// Every icon in the order they are offered in forms.
            pub const ALL: &'static [CategoryIcon] = &[$(CategoryIcon::$variant),+];

            /// The Font Awesome class name, also used in forms and the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(CategoryIcon::$variant => $class),+
                }
            }

            /// The name shown to users.
            pub fn label(&self) -> &'static str {
                match self {
                    $(CategoryIcon::$variant => $label),+
                }
            }
        }
    };
}

category_icons! {
    ShoppingCart => ("fa-shopping-cart", "Shopping Cart"),
    CreditCard => ("fa-credit-card", "Credit Card"),
    DollarSign => ("fa-dollar-sign", "Dollar Sign"),
    Wallet => ("fa-wallet", "Wallet"),
    PiggyBank => ("fa-piggy-bank", "Piggy Bank"),
    Utensils => ("fa-utensils", "Utensils"),
    Coffee => ("fa-coffee", "Coffee"),
    PizzaSlice => ("fa-pizza-slice", "Pizza Slice"),
    Beer => ("fa-beer", "Beer"),
    Car => ("fa-car", "Car"),
    Bus => ("fa-bus", "Bus"),
    Train => ("fa-train", "Train"),
    Plane => ("fa-plane", "Plane"),
    Bicycle => ("fa-bicycle", "Bicycle"),
    GasPump => ("fa-gas-pump", "Gas Pump"),
    Home => ("fa-home", "Home"),
    Lightbulb => ("fa-lightbulb", "Lightbulb"),
    Tools => ("fa-tools", "Tools"),
    Couch => ("fa-couch", "Couch"),
    Heartbeat => ("fa-heartbeat", "Heartbeat"),
    Pills => ("fa-pills", "Pills"),
    Dumbbell => ("fa-dumbbell", "Dumbbell"),
    Hospital => ("fa-hospital", "Hospital"),
    Film => ("fa-film", "Film"),
    Music => ("fa-music", "Music"),
    Gamepad => ("fa-gamepad", "Gamepad"),
    Book => ("fa-book", "Book"),
    Gift => ("fa-gift", "Gift"),
    Tshirt => ("fa-tshirt", "T-Shirt"),
    Cut => ("fa-cut", "Scissors"),
    GraduationCap => ("fa-graduation-cap", "Graduation Cap"),
    Briefcase => ("fa-briefcase", "Briefcase"),
    Laptop => ("fa-laptop", "Laptop"),
    ChartLine => ("fa-chart-line", "Chart Line"),
    QuestionCircle => ("fa-question-circle", "Question Circle"),
    Star => ("fa-star", "Star"),
    Tag => ("fa-tag", "Tag"),
}

impl Default for CategoryIcon {
    fn default() -> Self {
        Self::ShoppingCart
    }
}

impl Display for CategoryIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string did not name an icon.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown category icon \"{0}\"")]
pub struct UnknownIcon(String);

impl FromStr for CategoryIcon {
    type Err = UnknownIcon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryIcon::ALL
            .iter()
            .copied()
            .find(|icon| icon.as_str() == s)
            .ok_or_else(|| UnknownIcon(s.to_owned()))
    }
}

impl TryFrom<String> for CategoryIcon {
    type Error = UnknownIcon;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryIcon> for String {
    fn from(icon: CategoryIcon) -> Self {
        icon.as_str().to_owned()
    }
}

impl ToSql for CategoryIcon {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryIcon {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod category_icon_tests {
    use super::CategoryIcon;

    #[test]
    fn parses_every_icon_class() {
        for icon in CategoryIcon::ALL {
            assert_eq!(icon.as_str().parse::<CategoryIcon>(), Ok(*icon));
        }
    }

    #[test]
    fn rejects_unknown_icon() {
        assert!("fa-rocket".parse::<CategoryIcon>().is_err());
    }

    #[test]
    fn deserializes_from_form_value() {
        let icon: CategoryIcon = serde_json::from_str("\"fa-gas-pump\"").unwrap();

        assert_eq!(icon, CategoryIcon::GasPump);
    }
}
