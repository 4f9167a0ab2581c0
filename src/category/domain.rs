//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CategoryId, Error, user::UserId};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether money in a category is earned or spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum CategoryKind {
    /// Money earned, e.g. "Salary".
    Income,
    /// Money spent, e.g. "Groceries".
    Expense,
}

impl CategoryKind {
    /// The two letter code used to store the kind in the database.
    pub fn code(&self) -> &'static str {
        match self {
            CategoryKind::Income => "IN",
            CategoryKind::Expense => "EX",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(CategoryKind::Income),
            "EX" => Ok(CategoryKind::Expense),
            other => Err(Error::UnknownCode(other.to_owned())),
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKind::Income => write!(f, "Income"),
            CategoryKind::Expense => write!(f, "Expense"),
        }
    }
}

/// Who can see a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum CategoryScope {
    /// Shared by every user.
    Global,
    /// Visible only to the user that owns it.
    Personal,
}

impl CategoryScope {
    /// The code used to store the scope in the database.
    pub fn code(&self) -> &'static str {
        match self {
            CategoryScope::Global => "GLOBAL",
            CategoryScope::Personal => "PERSONAL",
        }
    }
}

impl FromStr for CategoryScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GLOBAL" => Ok(CategoryScope::Global),
            "PERSONAL" => Ok(CategoryScope::Personal),
            other => Err(Error::UnknownCode(other.to_owned())),
        }
    }
}

/// A hex colour of the form `#RRGGBB` used when charting a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Color(String);

impl Color {
    /// The colour given to categories when none is chosen.
    pub const DEFAULT: &'static str = "#3B82F6";

    /// Create a colour from a `#RRGGBB` string.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidColor] if `color` is not a `#` followed by six hex digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();

        match color.strip_prefix('#') {
            Some(hex) if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                Ok(Self(color.to_owned()))
            }
            _ => Err(Error::InvalidColor(color.to_owned())),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::new(s)
    }
}

/// A category for grouping transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category is for income or expenses.
    pub kind: CategoryKind,
    /// Whether the category is shared with all users.
    pub scope: CategoryScope,
    /// The user that owns a personal category, global categories may have no owner.
    pub owner: Option<UserId>,
    /// The colour used for the category in charts.
    pub color: Color,
}

impl Category {
    /// Whether the category is shared by every user.
    pub fn is_global(&self) -> bool {
        self.scope == CategoryScope::Global
    }

    /// Whether `user_id` may file transactions under this category.
    pub fn is_visible_to(&self, user_id: UserId) -> bool {
        self.is_global() || self.owner == Some(user_id)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope_indicator = if self.is_global() { "🌍" } else { "👤" };
        write!(f, "{scope_indicator} {}: {}", self.kind, self.name)
    }
}

/// The data for a category that has not been inserted into the database yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category is for income or expenses.
    pub kind: CategoryKind,
    /// Whether the category is shared with all users.
    pub scope: CategoryScope,
    /// The owning user, required for personal categories.
    pub owner: Option<UserId>,
    /// The colour used for the category in charts.
    pub color: Color,
}

impl NewCategory {
    /// A category only visible to `owner`.
    pub fn personal(name: CategoryName, kind: CategoryKind, owner: UserId) -> Self {
        Self {
            name,
            kind,
            scope: CategoryScope::Personal,
            owner: Some(owner),
            color: Color::default(),
        }
    }

    /// A category visible to every user.
    pub fn global(name: CategoryName, kind: CategoryKind) -> Self {
        Self {
            name,
            kind,
            scope: CategoryScope::Global,
            owner: None,
            color: Color::default(),
        }
    }

    /// Set the chart colour of the category.
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}
