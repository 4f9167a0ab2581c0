//! Categories for grouping transactions into income and expenses.
//!
//! A category is either personal, visible only to the user that created it,
//! or global and shared by every user.

mod db;
mod domain;

pub use db::{
    create_category, create_category_table, get_categories_for_user, get_category,
    get_or_create_personal_category, get_visible_category,
};
pub use domain::{Category, CategoryKind, CategoryName, CategoryScope, Color, NewCategory};
