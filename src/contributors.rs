use crate::classifier::ClassifiedTransaction;
use crate::error::{Result, ScheduleAError};
use crate::lines::LineId;
use crate::schema::{ContributorProfile, Transaction};
use crate::utils::{checked_add, YearWindow};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Part II line 5: 2% of total support.
pub const PART_II_LIMIT_RATE: Decimal = dec!(0.02);
/// Part III line 7b: the greater of $5,000 or 1% of total support.
pub const PART_III_LIMIT_FLOOR: Decimal = dec!(5000);
pub const PART_III_LIMIT_RATE: Decimal = dec!(0.01);

/// Identity used to group a contributor's gifts across the window.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContributorKey {
    /// Donor, vendor or client reference from the ledger
    Reference(String),
    /// Normalized transaction description
    Description(String),
    /// No usable identity; keyed by transaction id so it never merges with another gift
    Anonymous(String),
}

impl ContributorKey {
    pub fn for_transaction(transaction: &Transaction) -> Self {
        if let Some(reference) = transaction
            .contributor_id
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            return ContributorKey::Reference(reference.to_string());
        }

        if let Some(description) = transaction
            .description
            .as_deref()
            .map(normalize_description)
            .filter(|d| !d.is_empty())
        {
            return ContributorKey::Description(description);
        }

        ContributorKey::Anonymous(transaction.id.clone())
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, ContributorKey::Anonymous(_))
    }

    pub fn description(text: &str) -> Self {
        ContributorKey::Description(normalize_description(text))
    }

    /// Profile keys are written by hand, so descriptions are normalized the
    /// same way transaction descriptions are before matching.
    fn normalized(&self) -> Self {
        match self {
            ContributorKey::Description(text) => ContributorKey::description(text),
            other => other.clone(),
        }
    }
}

impl fmt::Display for ContributorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContributorKey::Reference(id) => write!(f, "contributor '{}'", id),
            ContributorKey::Description(text) => write!(f, "description '{}'", text),
            ContributorKey::Anonymous(id) => write!(f, "unidentified receipt {}", id),
        }
    }
}

/// Lowercases, drops punctuation and collapses whitespace.
pub fn normalize_description(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Contributor-level exclusions for one five-year window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorExclusions {
    /// 2% of Part II total support
    pub part_ii_threshold: Decimal,
    /// Part II line 5
    pub part_ii_excess: Decimal,
    pub part_ii_excess_contributors: usize,
    /// max($5,000, 1% of Part III total support)
    pub part_iii_threshold: Decimal,
    /// Part III line 7a
    pub part_iii_disqualified: Decimal,
    /// Part III line 7b
    pub part_iii_excess: Decimal,
    pub part_iii_excess_contributors: usize,
}

pub struct ContributorAggregator<'a> {
    profiles: BTreeMap<ContributorKey, &'a ContributorProfile>,
}

impl<'a> ContributorAggregator<'a> {
    pub fn new(profiles: &'a [ContributorProfile]) -> Self {
        Self {
            profiles: profiles.iter().map(|p| (p.key.normalized(), p)).collect(),
        }
    }

    /// Total contribution per contributor across every year of the window.
    pub fn aggregate_contributors(
        &self,
        classified: &[ClassifiedTransaction<'_>],
        window: YearWindow,
    ) -> Result<BTreeMap<ContributorKey, Decimal>> {
        let mut totals: BTreeMap<ContributorKey, Decimal> = BTreeMap::new();

        for item in classified
            .iter()
            .filter(|c| c.bucket.is_contribution() && window.contains(c.tax_year))
        {
            let key = ContributorKey::for_transaction(item.transaction);
            let total = totals.get(&key).copied().unwrap_or_default();
            let total = total.checked_add(item.transaction.amount).ok_or_else(|| {
                ScheduleAError::AmountOverflow {
                    context: format!("the contribution total for {}", key),
                }
            })?;
            totals.insert(key, total);
        }

        debug!(
            "Aggregated contributions from {} contributors for {}-{}",
            totals.len(),
            window.first_year,
            window.last_year
        );

        Ok(totals)
    }

    /// Applies the Part II 2% rule and the Part III disqualified-person and
    /// $5,000-or-1% rules against whole-window support totals.
    pub fn exclusions(
        &self,
        totals: &BTreeMap<ContributorKey, Decimal>,
        part_ii_total_support: Decimal,
        part_iii_total_support: Decimal,
    ) -> Result<ContributorExclusions> {
        let part_ii_threshold = (part_ii_total_support * PART_II_LIMIT_RATE).max(Decimal::ZERO);
        let part_iii_threshold = if part_iii_total_support > Decimal::ZERO {
            (part_iii_total_support * PART_III_LIMIT_RATE).max(PART_III_LIMIT_FLOOR)
        } else {
            Decimal::ZERO
        };

        let mut result = ContributorExclusions {
            part_ii_threshold,
            part_iii_threshold,
            ..Default::default()
        };

        for (key, &total) in totals {
            // unidentified receipts cannot be attributed to anyone, so nothing is limited
            if total <= Decimal::ZERO || key.is_anonymous() {
                continue;
            }
            let profile = self.profiles.get(key);
            let exempt = profile.is_some_and(|p| p.exempt_from_limit);
            let disqualified = profile.is_some_and(|p| p.disqualified_person);

            if !exempt && part_ii_threshold > Decimal::ZERO && total > part_ii_threshold {
                result.part_ii_excess = checked_add(
                    result.part_ii_excess,
                    total - part_ii_threshold,
                    &LineId::PartIILine5,
                )?;
                result.part_ii_excess_contributors += 1;
            }

            if disqualified {
                result.part_iii_disqualified =
                    checked_add(result.part_iii_disqualified, total, &LineId::PartIIILine7a)?;
            } else if part_iii_threshold > Decimal::ZERO && total > part_iii_threshold {
                result.part_iii_excess = checked_add(
                    result.part_iii_excess,
                    total - part_iii_threshold,
                    &LineId::PartIIILine7b,
                )?;
                result.part_iii_excess_contributors += 1;
            }
        }

        debug!(
            "Part II excess {} from {} contributors; Part III disqualified {} and excess {} from {} contributors",
            result.part_ii_excess,
            result.part_ii_excess_contributors,
            result.part_iii_disqualified,
            result.part_iii_excess,
            result.part_iii_excess_contributors
        );

        Ok(result)
    }
}
