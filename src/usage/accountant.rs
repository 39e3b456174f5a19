use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::error::LedgerError;
use super::family::classify;
use super::ledger::UsageLedger;
use super::pricing::pricing_for;
use super::types::{month_key, FamilyTag, FamilyUsage, MonthReport, UsageSnapshot};

/// Turns the raw ledger into priced month-to-date figures.
///
/// Read-only: recording an event is the caller's job, so a caller can append
/// first and then get totals that already include it.
pub struct UsageAccountant<'a> {
    ledger: &'a UsageLedger,
}

impl<'a> UsageAccountant<'a> {
    pub fn new(ledger: &'a UsageLedger) -> Self {
        Self { ledger }
    }

    /// Build the snapshot returned with a synthesis request made at `now`.
    pub fn snapshot(
        &self,
        chars_this_request: u64,
        voice_identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<UsageSnapshot, LedgerError> {
        let month_key = month_key(&now);
        let month_to_date_by_family = self.usage_by_family(&month_key)?;

        Ok(UsageSnapshot {
            chars_this_request,
            voice_family: classify(voice_identifier),
            month_key,
            month_to_date_by_family,
        })
    }

    /// Priced per-family usage for a month, with totals.
    pub fn month_report(&self, month_key: &str) -> Result<MonthReport, LedgerError> {
        let by_family = self.usage_by_family(month_key)?;
        let total_chars: u64 = by_family.values().map(|u| u.chars).sum();
        let total_estimated_cost_usd: f64 =
            by_family.values().map(|u| u.estimated_cost_usd).sum();

        Ok(MonthReport {
            month_key: month_key.to_string(),
            by_family,
            total_chars,
            total_estimated_cost_usd,
        })
    }

    fn usage_by_family(
        &self,
        month_key: &str,
    ) -> Result<BTreeMap<FamilyTag, FamilyUsage>, LedgerError> {
        let chars_by_family = self.ledger.sum_characters_by_family(month_key)?;

        Ok(chars_by_family
            .into_iter()
            .filter(|(_, chars)| *chars > 0)
            .map(|(family, chars)| (family, FamilyUsage::compute(chars, pricing_for(family))))
            .collect())
    }
}
