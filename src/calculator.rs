use crate::aggregation::YearAggregate;
use crate::contributors::ContributorExclusions;
use crate::error::Result;
use crate::lines::LineId;
use crate::utils::{checked_add, checked_sub, checked_sum, percentage};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Five-year totals and public support percentage for Part II.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIITotals {
    pub line1: Decimal,
    pub line2: Decimal,
    pub line3: Decimal,
    pub line4: Decimal,
    pub line5: Decimal,
    pub line6: Decimal,
    pub line7: Decimal,
    pub line8: Decimal,
    pub line9: Decimal,
    pub line10: Decimal,
    pub line11: Decimal,
    pub line12: Decimal,
    pub public_support_percentage: Decimal,
}

/// Five-year totals and percentages for Part III.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIIITotals {
    pub line1: Decimal,
    pub line2: Decimal,
    pub line3: Decimal,
    pub line4: Decimal,
    pub line5: Decimal,
    pub line6: Decimal,
    pub line7a: Decimal,
    pub line7b: Decimal,
    pub line7c: Decimal,
    pub line8: Decimal,
    pub line9: Decimal,
    pub line10a: Decimal,
    pub line10b: Decimal,
    pub line10c: Decimal,
    pub line11: Decimal,
    pub line12: Decimal,
    pub line13: Decimal,
    pub public_support_percentage: Decimal,
    pub investment_income_percentage: Decimal,
}

/// Everything computed for one five-year window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowComputation {
    pub years: Vec<YearAggregate>,
    /// Column (f): every per-year line summed over the window
    pub totals: BTreeMap<LineId, Decimal>,
    pub exclusions: ContributorExclusions,
    pub part_ii: PartIITotals,
    pub part_iii: PartIIITotals,
}

impl WindowComputation {
    pub fn total(&self, line: LineId) -> Decimal {
        self.totals.get(&line).copied().unwrap_or_default()
    }
}

/// Current-year figures plus the same figures one window back (Part II line 15,
/// Part III lines 16 and 18).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleComputation {
    pub current: WindowComputation,
    pub prior: WindowComputation,
}

pub struct SupportScheduleCalculator;

impl SupportScheduleCalculator {
    /// Sums a line over every year of the window.
    pub fn line_total(years: &[YearAggregate], line: LineId) -> Result<Decimal> {
        checked_sum(years.iter().map(|y| y.get(line)), &line)
    }

    pub fn compute(
        years: Vec<YearAggregate>,
        exclusions: ContributorExclusions,
    ) -> Result<WindowComputation> {
        let totals = LineId::BASE_LINES
            .iter()
            .chain(LineId::DERIVED_LINES.iter())
            .map(|&line| Self::line_total(&years, line).map(|total| (line, total)))
            .collect::<Result<BTreeMap<LineId, Decimal>>>()?;
        let total = |line: LineId| totals[&line];

        let line4 = total(LineId::PartIILine4);
        let line11 = total(LineId::PartIILine11);
        let line6 = checked_sub(line4, exclusions.part_ii_excess, &LineId::PartIILine6)?;
        let part_ii = PartIITotals {
            line1: total(LineId::PartIILine1),
            line2: total(LineId::PartIILine2),
            line3: total(LineId::PartIILine3),
            line4,
            line5: exclusions.part_ii_excess,
            line6,
            line7: total(LineId::PartIILine7),
            line8: total(LineId::PartIILine8),
            line9: total(LineId::PartIILine9),
            line10: total(LineId::PartIILine10),
            line11,
            line12: total(LineId::PartIILine12),
            public_support_percentage: percentage(line6, line11)?,
        };

        let iii_line6 = total(LineId::PartIIILine6);
        let line7c = checked_add(
            exclusions.part_iii_disqualified,
            exclusions.part_iii_excess,
            &LineId::PartIIILine7c,
        )?;
        let line8 = checked_sub(iii_line6, line7c, &LineId::PartIIILine8)?;
        let line10c = total(LineId::PartIIILine10c);
        let line13 = total(LineId::PartIIILine13);
        let part_iii = PartIIITotals {
            line1: total(LineId::PartIIILine1),
            line2: total(LineId::PartIIILine2),
            line3: total(LineId::PartIIILine3),
            line4: total(LineId::PartIIILine4),
            line5: total(LineId::PartIIILine5),
            line6: iii_line6,
            line7a: exclusions.part_iii_disqualified,
            line7b: exclusions.part_iii_excess,
            line7c,
            line8,
            line9: total(LineId::PartIIILine9),
            line10a: total(LineId::PartIIILine10a),
            line10b: total(LineId::PartIIILine10b),
            line10c,
            line11: total(LineId::PartIIILine11),
            line12: total(LineId::PartIIILine12),
            line13,
            public_support_percentage: percentage(line8, line13)?,
            investment_income_percentage: percentage(line10c, line13)?,
        };

        Ok(WindowComputation {
            years,
            totals,
            exclusions,
            part_ii,
            part_iii,
        })
    }
}
