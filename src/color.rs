//! The palette used to tell wallets and categories apart.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// One of the fixed colours a wallet or category can be shown with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    OrangeRed,
    #[default]
    Blue,
    Green,
    Purple,
    Gold,
    Navy,
    Teal,
    Gray,
    Red,
    Indigo,
    Black,
    Emerald,
}

impl Color {
    /// Every colour in the order they are offered in forms.
    pub const ALL: [Color; 12] = [
        Color::OrangeRed,
        Color::Blue,
        Color::Green,
        Color::Purple,
        Color::Gold,
        Color::Navy,
        Color::Teal,
        Color::Gray,
        Color::Red,
        Color::Indigo,
        Color::Black,
        Color::Emerald,
    ];

    /// The identifier used in forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::OrangeRed => "orange_red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Purple => "purple",
            Color::Gold => "gold",
            Color::Navy => "navy",
            Color::Teal => "teal",
            Color::Gray => "gray",
            Color::Red => "red",
            Color::Indigo => "indigo",
            Color::Black => "black",
            Color::Emerald => "emerald",
        }
    }

    /// The name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Color::OrangeRed => "Orange Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Purple => "Purple",
            Color::Gold => "Gold",
            Color::Navy => "Navy",
            Color::Teal => "Teal",
            Color::Gray => "Gray",
            Color::Red => "Red",
            Color::Indigo => "Indigo",
            Color::Black => "Black",
            Color::Emerald => "Emerald",
        }
    }

    /// The CSS hex code for the colour.
    pub fn hex(&self) -> &'static str {
        match self {
            Color::OrangeRed => "#BB3E00",
            Color::Blue => "#4A90E2",
            Color::Green => "#50E3C2",
            Color::Purple => "#BD10E0",
            Color::Gold => "#F5A623",
            Color::Navy => "#2E3A59",
            Color::Teal => "#4ECDC4",
            Color::Gray => "#95A5A6",
            Color::Red => "#E74C3C",
            Color::Indigo => "#5E72E4",
            Color::Black => "#2C3E50",
            Color::Emerald => "#27AE60",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string did not name a colour.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown colour \"{0}\"")]
pub struct UnknownColor(String);

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| UnknownColor(s.to_owned()))
    }
}

impl ToSql for Color {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Color {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
