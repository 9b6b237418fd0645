use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The 33 1/3% support test, as displayed on the form.
pub const ONE_THIRD_THRESHOLD: Decimal = dec!(33.33);
/// The 10% floor of the facts-and-circumstances test.
pub const FACTS_AND_CIRCUMSTANCES_THRESHOLD: Decimal = dec!(10);

/// Externally supplied facts. Absent flags count as false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualificationFacts {
    pub first_five_years: Option<bool>,
    pub facts_and_circumstances: Option<bool>,
}

impl QualificationFacts {
    fn first_five_years(&self) -> bool {
        self.first_five_years.unwrap_or(false)
    }

    fn facts_and_circumstances(&self) -> bool {
        self.facts_and_circumstances.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartIIPath {
    Line13,
    Line16a,
    Line16b,
    Line17a,
    Line17b,
    Line18,
}

impl fmt::Display for PartIIPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartIIPath::Line13 => "line13",
            PartIIPath::Line16a => "line16a",
            PartIIPath::Line16b => "line16b",
            PartIIPath::Line17a => "line17a",
            PartIIPath::Line17b => "line17b",
            PartIIPath::Line18 => "line18",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartIIIPath {
    Line14,
    Line19a,
    Line19b,
    Line20,
}

impl fmt::Display for PartIIIPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartIIIPath::Line14 => "line14",
            PartIIIPath::Line19a => "line19a",
            PartIIIPath::Line19b => "line19b",
            PartIIIPath::Line20 => "line20",
        };
        f.write_str(s)
    }
}

/// Part II checkboxes. Exactly one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIIQualification {
    pub line13: bool,
    pub line16a: bool,
    pub line16b: bool,
    pub line17a: bool,
    pub line17b: bool,
    pub line18: bool,
    pub path: PartIIPath,
}

impl PartIIQualification {
    fn from_path(path: PartIIPath) -> Self {
        Self {
            line13: path == PartIIPath::Line13,
            line16a: path == PartIIPath::Line16a,
            line16b: path == PartIIPath::Line16b,
            line17a: path == PartIIPath::Line17a,
            line17b: path == PartIIPath::Line17b,
            line18: path == PartIIPath::Line18,
            path,
        }
    }

    pub fn qualifies(&self) -> bool {
        self.path != PartIIPath::Line18
    }

    pub fn checked_count(&self) -> usize {
        [
            self.line13,
            self.line16a,
            self.line16b,
            self.line17a,
            self.line17b,
            self.line18,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

/// Part III checkboxes. Exactly one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIIIQualification {
    pub line14: bool,
    pub line19a: bool,
    pub line19b: bool,
    pub line20: bool,
    pub path: PartIIIPath,
}

impl PartIIIQualification {
    fn from_path(path: PartIIIPath) -> Self {
        Self {
            line14: path == PartIIIPath::Line14,
            line19a: path == PartIIIPath::Line19a,
            line19b: path == PartIIIPath::Line19b,
            line20: path == PartIIIPath::Line20,
            path,
        }
    }

    pub fn qualifies(&self) -> bool {
        self.path != PartIIIPath::Line20
    }

    pub fn checked_count(&self) -> usize {
        [self.line14, self.line19a, self.line19b, self.line20]
            .iter()
            .filter(|b| **b)
            .count()
    }
}

pub struct QualificationDecider;

impl QualificationDecider {
    /// Walks the Part II checklist; the first line that applies wins.
    pub fn decide_part_ii(
        current_percentage: Decimal,
        prior_percentage: Decimal,
        facts: QualificationFacts,
    ) -> PartIIQualification {
        let path = if facts.first_five_years() {
            PartIIPath::Line13
        } else if current_percentage >= ONE_THIRD_THRESHOLD {
            PartIIPath::Line16a
        } else if prior_percentage >= ONE_THIRD_THRESHOLD {
            PartIIPath::Line16b
        } else if facts.facts_and_circumstances()
            && current_percentage >= FACTS_AND_CIRCUMSTANCES_THRESHOLD
        {
            PartIIPath::Line17a
        } else if facts.facts_and_circumstances()
            && prior_percentage >= FACTS_AND_CIRCUMSTANCES_THRESHOLD
        {
            PartIIPath::Line17b
        } else {
            PartIIPath::Line18
        };

        PartIIQualification::from_path(path)
    }

    /// Walks the Part III checklist. Lines 19a/19b need more than one-third
    /// support and no more than one-third investment income in the same window.
    pub fn decide_part_iii(
        current_support: Decimal,
        current_investment: Decimal,
        prior_support: Decimal,
        prior_investment: Decimal,
        facts: QualificationFacts,
    ) -> PartIIIQualification {
        let passes = |support: Decimal, investment: Decimal| {
            support > ONE_THIRD_THRESHOLD && investment <= ONE_THIRD_THRESHOLD
        };

        let path = if facts.first_five_years() {
            PartIIIPath::Line14
        } else if passes(current_support, current_investment) {
            PartIIIPath::Line19a
        } else if passes(prior_support, prior_investment) {
            PartIIIPath::Line19b
        } else {
            PartIIIPath::Line20
        };

        PartIIIQualification::from_path(path)
    }
}
