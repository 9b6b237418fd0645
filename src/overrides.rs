use crate::error::{Result, ScheduleAError};
use crate::lines::LineId;
use crate::utils::checked_add;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A manual entry on a base line for a single tax year. Used for amounts the
/// ledger cannot produce on its own (e.g. receipts from activities that are not
/// an unrelated trade, Part III line 3).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LineAdjustment {
    /// Replace the ledger-derived amount.
    SetValue {
        #[schemars(description = "A base line such as part_iii.line3. Totals cannot be adjusted.")]
        line: LineId,
        year: i32,
        value: Decimal,
    },

    /// Add to (or, with a negative amount, subtract from) the ledger-derived amount.
    AddToValue {
        line: LineId,
        year: i32,
        amount: Decimal,
        #[serde(default)]
        #[schemars(description = "Preparer note explaining the entry")]
        note: Option<String>,
    },
}

impl LineAdjustment {
    pub fn line(&self) -> LineId {
        match self {
            LineAdjustment::SetValue { line, .. } | LineAdjustment::AddToValue { line, .. } => {
                *line
            }
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            LineAdjustment::SetValue { year, .. } | LineAdjustment::AddToValue { year, .. } => {
                *year
            }
        }
    }

    /// Only base lines inside `first_year..=last_year` may be adjusted.
    pub fn validate(&self, first_year: i32, last_year: i32) -> Result<()> {
        let line = self.line();
        if line.is_window_only() {
            return Err(ScheduleAError::InvalidAdjustment {
                line: line.to_string(),
                details: "this line is a five-year figure computed from contributor totals"
                    .to_string(),
            });
        }
        if !line.is_base() {
            return Err(ScheduleAError::InvalidAdjustment {
                line: line.to_string(),
                details: "only lines entered from the ledger can be adjusted; totals and exclusions are computed"
                    .to_string(),
            });
        }

        let year = self.year();
        if !(first_year..=last_year).contains(&year) {
            return Err(ScheduleAError::InvalidAdjustment {
                line: line.to_string(),
                details: format!(
                    "year {} is outside the reporting years {}-{}",
                    year, first_year, last_year
                ),
            });
        }

        Ok(())
    }
}

/// Applies every adjustment for `year`, in order, to a map of base line amounts.
pub fn apply_adjustments(
    base: &mut BTreeMap<LineId, Decimal>,
    year: i32,
    adjustments: &[LineAdjustment],
) -> Result<()> {
    for adjustment in adjustments.iter().filter(|a| a.year() == year) {
        match adjustment {
            LineAdjustment::SetValue { line, value, .. } => {
                base.insert(*line, *value);
            }
            LineAdjustment::AddToValue { line, amount, .. } => {
                let entry = base.entry(*line).or_default();
                *entry = checked_add(*entry, *amount, line)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_apply_in_order_for_matching_year() {
        let mut base = BTreeMap::new();
        base.insert(LineId::PartIIILine3, dec!(100));

        let adjustments = vec![
            LineAdjustment::AddToValue {
                line: LineId::PartIIILine3,
                year: 2022,
                amount: dec!(50),
                note: None,
            },
            LineAdjustment::SetValue {
                line: LineId::PartIIILine11,
                year: 2022,
                value: dec!(700),
            },
            LineAdjustment::SetValue {
                line: LineId::PartIIILine3,
                year: 2021,
                value: dec!(1),
            },
        ];

        apply_adjustments(&mut base, 2022, &adjustments).unwrap();
        assert_eq!(base[&LineId::PartIIILine3], dec!(150));
        assert_eq!(base[&LineId::PartIIILine11], dec!(700));
    }

    #[test]
    fn test_validate_rejects_derived_lines_and_out_of_range_years() {
        let derived = LineAdjustment::SetValue {
            line: LineId::PartIILine4,
            year: 2022,
            value: dec!(1),
        };
        assert!(derived.validate(2018, 2023).is_err());

        let window_only = LineAdjustment::SetValue {
            line: LineId::PartIILine5,
            year: 2022,
            value: dec!(1),
        };
        match window_only.validate(2018, 2023) {
            Err(ScheduleAError::InvalidAdjustment { line, details }) => {
                assert_eq!(line, "Part II line 5");
                assert!(details.contains("five-year figure"));
            }
            other => panic!("expected invalid adjustment, got {:?}", other),
        }

        let stale = LineAdjustment::SetValue {
            line: LineId::PartIILine1,
            year: 2010,
            value: dec!(1),
        };
        assert!(stale.validate(2018, 2023).is_err());

        let ok = LineAdjustment::AddToValue {
            line: LineId::PartIILine1,
            year: 2018,
            amount: dec!(-10),
            note: Some("Returned pledge".to_string()),
        };
        assert!(ok.validate(2018, 2023).is_ok());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"[
            { "action": "set_value", "line": "part_iii.line3", "year": 2022, "value": "1200.50" },
            { "action": "add_to_value", "line": "part_ii.line10", "year": 2021, "amount": "-25" }
        ]"#;
        let adjustments: Vec<LineAdjustment> = serde_json::from_str(json).unwrap();
        assert_eq!(adjustments[0].line(), LineId::PartIIILine3);
        assert_eq!(adjustments[1].year(), 2021);
    }
}
