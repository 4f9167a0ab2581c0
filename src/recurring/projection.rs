//! Creates this month's copy of every recurring transaction.

use std::fmt;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error, TransactionId,
    calendar::same_day_in_month,
    transaction::{
        DuplicateKey, Transaction, create_transaction, get_recurring_transactions,
        to_two_places, transaction_exists,
    },
};

/// What happened to a single recurring transaction during a projection run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionOutcome {
    /// A non-recurring copy was inserted.
    Created(TransactionId),
    /// A copy would have been inserted if this was not a dry run.
    WouldCreate,
    /// A transaction with the same owner, amount, category, description and
    /// date already exists.
    Skipped,
    /// The copy could not be created.
    Failed(String),
}

/// The result of projecting one recurring transaction into the target month.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedItem {
    /// The ID of the recurring transaction that was copied.
    pub template_id: TransactionId,
    /// The description of the recurring transaction.
    pub description: String,
    /// The signed amount of the recurring transaction.
    pub amount: Decimal,
    /// The date the copy is (or would be) dated.
    pub target_date: Date,
    /// What happened.
    pub outcome: ProjectionOutcome,
}

/// A summary of one projection run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionReport {
    /// The date the run projected into; only its month and year matter.
    pub current_date: Date,
    /// Whether writes were suppressed.
    pub dry_run: bool,
    /// One entry per recurring transaction, in the order they were processed.
    pub items: Vec<ProjectedItem>,
}

impl ProjectionReport {
    /// The number of recurring transactions that were found.
    pub fn templates_found(&self) -> usize {
        self.items.len()
    }

    /// The number of copies that were created, or would have been created in a dry run.
    pub fn created_count(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                ProjectionOutcome::Created(_) | ProjectionOutcome::WouldCreate
            )
        })
    }

    /// The number of recurring transactions that already had a copy.
    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| *outcome == ProjectionOutcome::Skipped)
    }

    /// The number of recurring transactions that could not be copied.
    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, ProjectionOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&ProjectionOutcome) -> bool) -> usize {
        self.items
            .iter()
            .filter(|item| predicate(&item.outcome))
            .count()
    }
}

impl fmt::Display for ProjectedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = to_two_places(self.amount);

        match &self.outcome {
            ProjectionOutcome::Created(_) => write!(
                f,
                "✅ Created: {} - €{amount} on {}",
                self.description, self.target_date
            ),
            ProjectionOutcome::WouldCreate => write!(
                f,
                "🔍 [DRY-RUN] Would create: {} - €{amount} on {}",
                self.description, self.target_date
            ),
            ProjectionOutcome::Skipped => write!(
                f,
                "⏭️  Skipped: {} - already exists for {}",
                self.description, self.target_date
            ),
            ProjectionOutcome::Failed(reason) => write!(
                f,
                "❌ Failed: {} - €{amount} on {}: {reason}",
                self.description, self.target_date
            ),
        }
    }
}

/// The report printed by the `generate_recurring_transactions` command.
impl fmt::Display for ProjectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "🔄 Generating recurring transactions for {:02}/{}",
            u8::from(self.current_date.month()),
            self.current_date.year()
        )?;

        if self.items.is_empty() {
            return writeln!(f, "⚠️  No recurring transactions found.");
        }

        writeln!(f, "📋 Found {} recurring transactions", self.templates_found())?;

        for item in &self.items {
            writeln!(f, "{item}")?;
        }

        writeln!(f, "{}", "=".repeat(60))?;

        if self.dry_run {
            writeln!(f, "🔍 DRY-RUN MODE - no transactions created")?;
        }

        writeln!(f, "✅ Transactions created: {}", self.created_count())?;
        writeln!(f, "⏭️  Transactions skipped: {}", self.skipped_count())?;

        if self.failed_count() > 0 {
            writeln!(f, "❌ Transactions failed: {}", self.failed_count())?;
        }

        Ok(())
    }
}

/// Create a non-recurring copy of every recurring transaction, dated the
/// same day of the month in the month of `current_date`.
///
/// Days past the end of the target month are moved to its last day. A
/// recurring transaction is skipped when a transaction with the same owner,
/// amount, category, description and target date already exists, so
/// running the projection again in the same month creates nothing new.
/// When `dry_run` is set nothing is written and the report lists what would
/// have been created.
///
/// Recurring transactions are never modified. Each one is handled on its
/// own: a failure is recorded in the report and the run carries on with the
/// rest.
///
/// # Errors
/// Returns an [Error::SqlError] if the recurring transactions cannot be loaded.
pub fn project_recurring_transactions(
    current_date: Date,
    dry_run: bool,
    connection: &Connection,
) -> Result<ProjectionReport, Error> {
    let templates = get_recurring_transactions(connection)?;

    if templates.is_empty() {
        tracing::warn!("No recurring transactions found.");
    } else {
        tracing::info!(
            "Projecting {} recurring transactions into {}-{:02}{}",
            templates.len(),
            current_date.year(),
            u8::from(current_date.month()),
            if dry_run { " (dry run)" } else { "" }
        );
    }

    let items = templates
        .iter()
        .map(|template| project_template(template, current_date, dry_run, connection))
        .collect();

    let report = ProjectionReport {
        current_date,
        dry_run,
        items,
    };

    tracing::info!(
        "Recurring transactions created: {}, skipped: {}, failed: {}",
        report.created_count(),
        report.skipped_count(),
        report.failed_count()
    );

    Ok(report)
}

fn project_template(
    template: &Transaction,
    current_date: Date,
    dry_run: bool,
    connection: &Connection,
) -> ProjectedItem {
    let target_date = same_day_in_month(template.date, current_date);

    let outcome = match create_copy(template, target_date, dry_run, connection) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(
                "Could not project recurring transaction {}: {error}",
                template.id
            );
            ProjectionOutcome::Failed(error.to_string())
        }
    };

    if outcome == ProjectionOutcome::Skipped {
        tracing::warn!(
            "Skipped recurring transaction {}, a copy already exists for {target_date}",
            template.id
        );
    } else {
        tracing::debug!(
            "Recurring transaction {} on {target_date}: {outcome:?}",
            template.id
        );
    }

    ProjectedItem {
        template_id: template.id,
        description: template.description.clone(),
        amount: template.amount,
        target_date,
        outcome,
    }
}

fn create_copy(
    template: &Transaction,
    target_date: Date,
    dry_run: bool,
    connection: &Connection,
) -> Result<ProjectionOutcome, Error> {
    // Taking the write lock before the duplicate check stops two concurrent
    // runs from both inserting the same copy.
    let behavior = if dry_run {
        TransactionBehavior::Deferred
    } else {
        TransactionBehavior::Immediate
    };
    let sql_transaction = SqlTransaction::new_unchecked(connection, behavior)?;

    let key = DuplicateKey::for_date(template, target_date);

    if transaction_exists(&key, &sql_transaction)? {
        return Ok(ProjectionOutcome::Skipped);
    }

    if dry_run {
        return Ok(ProjectionOutcome::WouldCreate);
    }

    let copy = create_transaction(
        Transaction::build(template.owner, template.category_id, template.amount, target_date)
            .description(&template.description)
            .notes(&template.notes)
            .recurring(false),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(ProjectionOutcome::Created(copy.id))
}
