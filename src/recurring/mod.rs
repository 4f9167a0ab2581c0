//! Monthly copies of recurring transactions.
//!
//! A transaction flagged as recurring acts as a template. Once a month,
//! [project_recurring_transactions] creates an ordinary transaction from
//! each template, dated the same day of the month.

mod projection;

pub use projection::{
    ProjectedItem, ProjectionOutcome, ProjectionReport, project_recurring_transactions,
};
