//! Ledger controller and sessions.
//!
//! A [`LedgerSession`] works on a snapshot of one worker's ledger. Every
//! mutation is checked against that snapshot, sent to the store as a single
//! request, and followed by a full reload so all derived views are recomputed
//! from the stored entries.

use std::sync::Arc;

use chrono::NaiveDate;
use hourbank_shared::config::LedgerConfig;
use hourbank_shared::types::{LedgerEntryId, WorkerId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::balance::{self, FortnightTotals, TrailingMonths};
use super::entry::{EntryKind, EntryPatch, HOURS_DP, LedgerEntry, NewLedgerEntry};
use super::error::LedgerError;
use super::fortnight::Fortnight;
use super::guard;
use super::limit;
use super::note;
use super::resolver::EntryDateResolver;
use super::store::{OwnerSettings, TransactionLog};
use crate::clock::{Clock, SystemClock};

/// Request to register hours for a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Day the hours belong to.
    pub date: Option<NaiveDate>,
    /// Quantity of hours, strictly positive.
    pub hours: Decimal,
    /// Credit (extra hours) or debit (time off).
    pub kind: EntryKind,
    /// Note label; defaults to the kind's label.
    pub label: Option<String>,
    /// Extra text placed after the date, such as a shift range.
    pub detail: Option<String>,
}

impl RegisterRequest {
    /// Credit request for `hours` on `date`.
    #[must_use]
    pub fn credit(date: NaiveDate, hours: Decimal) -> Self {
        Self {
            date: Some(date),
            hours,
            kind: EntryKind::Credit,
            label: None,
            detail: None,
        }
    }

    /// Debit request for `hours` on `date`.
    #[must_use]
    pub fn debit(date: NaiveDate, hours: Decimal) -> Self {
        Self {
            kind: EntryKind::Debit,
            ..Self::credit(date, hours)
        }
    }

    /// Sets the extra text placed after the date.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the note label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// An entry together with the facts derived for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    /// The stored entry.
    pub entry: LedgerEntry,
    /// Resolved logical date.
    pub date: NaiveDate,
    /// Fortnight of the resolved date.
    pub fortnight: Fortnight,
    /// Whether the session may edit or delete the entry.
    pub editable: bool,
}

/// The fortnight containing today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentFortnight {
    /// The fortnight.
    pub fortnight: Fortnight,
    /// First day.
    pub first_day: NaiveDate,
    /// Last day.
    pub last_day: NaiveDate,
    /// Human label, e.g. `2nd fortnight of 03/2024`.
    pub label: String,
    /// Date range label, e.g. `16/03/2024 - 31/03/2024`.
    pub range_label: String,
}

impl From<Fortnight> for CurrentFortnight {
    fn from(fortnight: Fortnight) -> Self {
        Self {
            fortnight,
            first_day: fortnight.first_day(),
            last_day: fortnight.last_day(),
            label: fortnight.to_string(),
            range_label: fortnight.range_label(),
        }
    }
}

/// Headline figures of a worker's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// Worker the ledger belongs to.
    pub owner_id: WorkerId,
    /// Balance in hours, rounded for display.
    pub balance: Decimal,
    /// Balance ceiling in effect.
    pub ceiling: Decimal,
    /// Hours that can still be credited.
    pub headroom: Decimal,
    /// Informational value of the balance.
    pub monetary_balance: Decimal,
    /// The open fortnight.
    pub current_fortnight: CurrentFortnight,
    /// Totals of the current month.
    pub totals: FortnightTotals,
    /// Number of entries in the ledger.
    pub entry_count: usize,
}

/// Entry point for working with hour bank ledgers.
pub struct LedgerController<R: TransactionLog, C: Clock = SystemClock> {
    log: Arc<R>,
    clock: C,
    config: LedgerConfig,
    resolver: EntryDateResolver,
}

impl<R: TransactionLog, C: Clock> LedgerController<R, C> {
    /// Creates a controller over `log`.
    pub fn new(log: Arc<R>, clock: C, config: LedgerConfig) -> Self {
        let resolver = EntryDateResolver::new(config.timezone);
        Self {
            log,
            clock,
            config,
            resolver,
        }
    }

    /// Today's date in the ledger's time zone.
    pub fn today(&self) -> NaiveDate {
        self.clock.today_in(self.config.timezone)
    }

    /// Resolver configured for the ledger's time zone.
    pub const fn resolver(&self) -> &EntryDateResolver {
        &self.resolver
    }

    /// Ledger settings in effect.
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Opens a session on `owner`'s ledger.
    ///
    /// Owner settings are read once here; entries are reloaded after every
    /// mutation and on [`LedgerSession::refresh`].
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Store` if the entries or settings cannot be read.
    pub async fn open(
        &self,
        owner: WorkerId,
        privileged: bool,
    ) -> Result<LedgerSession<'_, R, C>, LedgerError> {
        let settings = self.log.owner_settings(owner).await?.unwrap_or_default();
        let entries = self.log.list_entries(owner).await?;
        let ceiling = settings
            .balance_ceiling
            .unwrap_or(self.config.default_balance_ceiling);

        debug!(
            owner = %owner,
            entries = entries.len(),
            ceiling = %ceiling,
            "Ledger snapshot loaded"
        );

        Ok(LedgerSession {
            controller: self,
            owner,
            privileged,
            settings,
            ceiling,
            balance: balance::balance(&entries),
            entries,
            stale: false,
        })
    }
}

/// A worker's ledger as seen by one caller.
pub struct LedgerSession<'a, R: TransactionLog, C: Clock = SystemClock> {
    controller: &'a LedgerController<R, C>,
    owner: WorkerId,
    privileged: bool,
    settings: OwnerSettings,
    ceiling: Decimal,
    entries: Vec<LedgerEntry>,
    balance: Decimal,
    stale: bool,
}

impl<R: TransactionLog, C: Clock> LedgerSession<'_, R, C> {
    /// Worker whose ledger this is.
    pub const fn owner(&self) -> WorkerId {
        self.owner
    }

    /// Whether the caller bypasses the fortnight lock.
    pub const fn privileged(&self) -> bool {
        self.privileged
    }

    /// True after a mutation whose reload failed, until the next successful refresh.
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Today's date in the ledger's time zone.
    pub fn today(&self) -> NaiveDate {
        self.controller.today()
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Current balance in hours.
    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    /// Balance ceiling in effect.
    pub const fn ceiling(&self) -> Decimal {
        self.ceiling
    }

    /// Hours that can still be credited before reaching the ceiling.
    pub fn headroom(&self) -> Decimal {
        (self.ceiling - self.balance).max(Decimal::ZERO)
    }

    /// Informational hourly rate.
    pub const fn hourly_rate(&self) -> Decimal {
        self.settings.hourly_rate
    }

    /// Informational value of the balance, rounded to cents.
    pub fn monetary_balance(&self) -> Decimal {
        balance::monetary_value(self.balance, self.settings.hourly_rate)
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// The open fortnight.
    pub fn current_fortnight(&self) -> CurrentFortnight {
        Fortnight::containing(self.today()).into()
    }

    /// Totals of the current month, split by fortnight.
    pub fn fortnight_totals(&self) -> FortnightTotals {
        self.fortnight_totals_for(self.today())
    }

    /// Totals of the month containing `month_anchor`, split by fortnight.
    pub fn fortnight_totals_for(&self, month_anchor: NaiveDate) -> FortnightTotals {
        balance::fortnight_totals(&self.entries, self.controller.resolver(), month_anchor)
    }

    /// Monthly trend ending at the current month.
    pub fn trend(&self) -> TrailingMonths<'_> {
        balance::trailing_months(
            &self.entries,
            self.controller.resolver(),
            self.today(),
            self.controller.config().trend_months,
            self.settings.hourly_rate,
        )
    }

    /// Entries with their resolved date, fortnight and editability.
    pub fn entry_views(&self) -> Vec<EntryView> {
        let today = self.today();
        let resolver = self.controller.resolver();
        self.entries
            .iter()
            .map(|entry| {
                let date = resolver.resolve(entry);
                EntryView {
                    date,
                    fortnight: Fortnight::containing(date),
                    editable: guard::is_editable(entry, resolver, today, self.privileged),
                    entry: entry.clone(),
                }
            })
            .collect()
    }

    /// Headline figures.
    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            owner_id: self.owner,
            balance: balance::display_hours(self.balance),
            ceiling: self.ceiling,
            headroom: self.headroom(),
            monetary_balance: self.monetary_balance(),
            current_fortnight: self.current_fortnight(),
            totals: self.fortnight_totals(),
            entry_count: self.entries.len(),
        }
    }

    // ========================================================================
    // Pre-checks
    // ========================================================================

    /// Runs every check `register` would, without touching the store.
    ///
    /// Order: hours, date, label, future date, closed fortnight, duplicate
    /// date, then the ceiling for credits. A stale session is rejected
    /// before any of them.
    pub fn check_register(&self, request: &RegisterRequest) -> Result<NaiveDate, LedgerError> {
        self.ensure_current()?;
        validate_hours(request.hours)?;
        let date = request.date.ok_or(LedgerError::MissingDate)?;
        let label = request.label.as_deref().map(str::trim);
        if let Some(label) = label.filter(|label| !label.is_empty()) {
            if !note::is_valid_label(label) {
                return Err(LedgerError::InvalidLabel(label.to_string()));
            }
        }

        guard::can_register(
            date,
            self.today(),
            self.owner,
            &self.entries,
            self.privileged,
        )?;

        if request.kind == EntryKind::Credit {
            limit::ensure_can_add(request.hours, self.balance, self.ceiling)?;
        }

        Ok(date)
    }

    /// Locates an entry and checks that it may be edited or deleted.
    pub fn check_mutate(&self, entry_id: LedgerEntryId) -> Result<&LedgerEntry, LedgerError> {
        self.ensure_current()?;
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.id == entry_id)
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        guard::can_mutate(
            entry,
            self.controller.resolver(),
            self.today(),
            self.privileged,
        )?;

        Ok(entry)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Registers hours for a day and reloads the ledger.
    ///
    /// The stored note reads `"<label> - DD/MM/YYYY[ <detail>] (Nh)"`.
    /// A stale session is reloaded first so the checks see every stored entry.
    ///
    /// # Errors
    ///
    /// Validation and policy rejections happen before any store call.
    /// `LedgerError::Store` means nothing was written;
    /// `LedgerError::RefreshFailed` means the entry was written but the
    /// session is stale.
    pub async fn register(&mut self, request: RegisterRequest) -> Result<LedgerEntry, LedgerError> {
        self.refresh_if_stale().await?;
        let date = self
            .check_register(&request)
            .inspect_err(|e| self.log_rejection("register", e))?;

        let RegisterRequest {
            hours,
            kind,
            label,
            detail,
            ..
        } = request;
        let label = label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(kind.default_label());
        let note = note::compose(label, date, detail.as_deref(), hours);

        let created = self
            .controller
            .log
            .insert_entry(NewLedgerEntry {
                owner_id: self.owner,
                hours,
                kind,
                note: Some(note),
            })
            .await?;

        info!(
            owner = %self.owner,
            entry_id = %created.id,
            kind = %created.kind,
            hours = %created.hours,
            date = %date,
            "Hours registered"
        );

        self.reload_after_mutation().await?;
        Ok(created)
    }

    /// Changes the hours of an entry and reloads the ledger.
    ///
    /// The note's `(Nh)` suffix is rewritten to the new quantity; the date
    /// marker and any other text are kept.
    ///
    /// # Errors
    ///
    /// Same contract as [`register`](Self::register), plus
    /// `LedgerError::EntryNotFound` when the entry is not in this ledger.
    pub async fn edit(
        &mut self,
        entry_id: LedgerEntryId,
        new_hours: Decimal,
    ) -> Result<(), LedgerError> {
        self.refresh_if_stale().await?;
        let patch = self
            .prepare_edit(entry_id, new_hours)
            .inspect_err(|e| self.log_rejection("edit", e))?;

        self.controller.log.update_entry(entry_id, patch).await?;

        info!(
            owner = %self.owner,
            entry_id = %entry_id,
            hours = %new_hours,
            "Ledger entry updated"
        );

        self.reload_after_mutation().await
    }

    /// Removes an entry and reloads the ledger.
    ///
    /// Only the fortnight lock applies; removing a debit can leave the
    /// balance above the ceiling.
    ///
    /// # Errors
    ///
    /// Same contract as [`edit`](Self::edit).
    pub async fn delete(&mut self, entry_id: LedgerEntryId) -> Result<(), LedgerError> {
        self.refresh_if_stale().await?;
        self.check_mutate(entry_id)
            .inspect_err(|e| self.log_rejection("delete", e))?;

        self.controller.log.delete_entry(entry_id).await?;

        info!(owner = %self.owner, entry_id = %entry_id, "Ledger entry deleted");

        self.reload_after_mutation().await
    }

    /// Reloads the entries from the store.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn refresh(&mut self) -> Result<(), LedgerError> {
        let entries = self.controller.log.list_entries(self.owner).await?;
        self.balance = balance::balance(&entries);
        self.entries = entries;
        self.stale = false;

        debug!(
            owner = %self.owner,
            entries = self.entries.len(),
            balance = %self.balance,
            "Ledger snapshot reloaded"
        );
        Ok(())
    }

    async fn refresh_if_stale(&mut self) -> Result<(), LedgerError> {
        if self.stale {
            debug!(owner = %self.owner, "Reloading stale ledger before mutation");
            self.refresh().await?;
        }
        Ok(())
    }

    fn ensure_current(&self) -> Result<(), LedgerError> {
        if self.stale {
            return Err(LedgerError::StaleSession);
        }
        Ok(())
    }

    fn prepare_edit(
        &self,
        entry_id: LedgerEntryId,
        new_hours: Decimal,
    ) -> Result<EntryPatch, LedgerError> {
        validate_hours(new_hours)?;
        let entry = self.check_mutate(entry_id)?;

        limit::ensure_can_edit(
            entry.hours,
            new_hours,
            self.balance,
            entry.kind,
            self.ceiling,
        )?;

        Ok(EntryPatch {
            hours: Some(new_hours),
            note: entry
                .note
                .as_deref()
                .map(|text| note::rewrite_hours(text, new_hours)),
        })
    }

    async fn reload_after_mutation(&mut self) -> Result<(), LedgerError> {
        match self.refresh().await {
            Ok(()) => Ok(()),
            Err(LedgerError::Store(err)) => {
                self.stale = true;
                warn!(owner = %self.owner, error = %err, "Ledger reload failed after mutation");
                Err(LedgerError::RefreshFailed(err))
            }
            Err(other) => Err(other),
        }
    }

    fn log_rejection(&self, operation: &str, err: &LedgerError) {
        warn!(
            owner = %self.owner,
            operation,
            code = err.error_code(),
            reason = %err,
            "Ledger change rejected"
        );
    }
}

fn validate_hours(hours: Decimal) -> Result<(), LedgerError> {
    if hours.is_zero() {
        return Err(LedgerError::ZeroHours);
    }
    if hours.is_sign_negative() {
        return Err(LedgerError::NegativeHours(hours));
    }
    if hours.normalize().scale() > HOURS_DP {
        return Err(LedgerError::TooPrecise(hours));
    }
    Ok(())
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
