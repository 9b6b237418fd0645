use crate::classifier::ClassifiedTransaction;
use crate::error::Result;
use crate::lines::LineId;
use crate::overrides::{apply_adjustments, LineAdjustment};
use crate::utils::{checked_add, checked_sum};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line amounts for a single tax year. Every base and derived line is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearAggregate {
    pub year: i32,
    pub lines: BTreeMap<LineId, Decimal>,
}

impl YearAggregate {
    /// Builds the aggregate from base line amounts, computing the derived lines.
    pub fn from_base_lines(year: i32, base: &BTreeMap<LineId, Decimal>) -> Result<Self> {
        let mut lines: BTreeMap<LineId, Decimal> = LineId::BASE_LINES
            .iter()
            .map(|line| (*line, base.get(line).copied().unwrap_or_default()))
            .collect();

        let sum = |lines: &BTreeMap<LineId, Decimal>, target: LineId, ids: &[LineId]| {
            checked_sum(ids.iter().map(|id| lines[id]), &target)
        };

        // Part II
        let line4 = sum(
            &lines,
            LineId::PartIILine4,
            &[LineId::PartIILine1, LineId::PartIILine2, LineId::PartIILine3],
        )?;
        lines.insert(LineId::PartIILine4, line4);
        lines.insert(LineId::PartIILine7, line4);
        let line11 = sum(
            &lines,
            LineId::PartIILine11,
            &[
                LineId::PartIILine7,
                LineId::PartIILine8,
                LineId::PartIILine9,
                LineId::PartIILine10,
            ],
        )?;
        lines.insert(LineId::PartIILine11, line11);

        // Part III
        let line6 = sum(
            &lines,
            LineId::PartIIILine6,
            &[
                LineId::PartIIILine1,
                LineId::PartIIILine2,
                LineId::PartIIILine3,
                LineId::PartIIILine4,
                LineId::PartIIILine5,
            ],
        )?;
        lines.insert(LineId::PartIIILine6, line6);
        lines.insert(LineId::PartIIILine9, line6);
        let line10c = sum(
            &lines,
            LineId::PartIIILine10c,
            &[LineId::PartIIILine10a, LineId::PartIIILine10b],
        )?;
        lines.insert(LineId::PartIIILine10c, line10c);
        let line13 = sum(
            &lines,
            LineId::PartIIILine13,
            &[
                LineId::PartIIILine9,
                LineId::PartIIILine10c,
                LineId::PartIIILine11,
                LineId::PartIIILine12,
            ],
        )?;
        lines.insert(LineId::PartIIILine13, line13);

        Ok(Self { year, lines })
    }

    pub fn get(&self, line: LineId) -> Decimal {
        self.lines.get(&line).copied().unwrap_or_default()
    }
}

pub struct YearlySupportAggregator<'a> {
    adjustments: &'a [LineAdjustment],
}

impl<'a> YearlySupportAggregator<'a> {
    pub fn new(adjustments: &'a [LineAdjustment]) -> Self {
        Self { adjustments }
    }

    /// Sums classified amounts for `year`, applies manual adjustments, then
    /// derives the total lines.
    pub fn aggregate(
        &self,
        year: i32,
        classified: &[ClassifiedTransaction<'_>],
    ) -> Result<YearAggregate> {
        let mut base: BTreeMap<LineId, Decimal> = BTreeMap::new();

        for item in classified.iter().filter(|c| c.tax_year == year) {
            for line in item.bucket.lines {
                let entry = base.entry(*line).or_default();
                *entry = checked_add(*entry, item.transaction.amount, line)?;
            }
        }

        apply_adjustments(&mut base, year, self.adjustments)?;

        YearAggregate::from_base_lines(year, &base)
    }

    pub fn aggregate_years(
        &self,
        years: &[i32],
        classified: &[ClassifiedTransaction<'_>],
    ) -> Result<Vec<YearAggregate>> {
        years
            .iter()
            .map(|&year| self.aggregate(year, classified))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LineBucket;
    use crate::error::ScheduleAError;
    use crate::schema::{SupportClassification, Transaction, TransactionType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn income(id: &str, amount: Decimal) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            amount,
            transaction_type: TransactionType::Income,
            category_id: None,
            contributor_id: None,
            description: None,
        }
    }

    fn classified<'a>(
        transaction: &'a Transaction,
        year: i32,
        classification: SupportClassification,
    ) -> ClassifiedTransaction<'a> {
        ClassifiedTransaction {
            transaction,
            tax_year: year,
            bucket: LineBucket::for_classification(classification),
        }
    }

    #[test]
    fn test_derived_lines_are_sums_of_base_lines() {
        let gift = income("t1", dec!(1000));
        let tax = income("t2", dec!(200));
        let services = income("t3", dec!(30));
        let interest = income("t4", dec!(40));
        let ubi = income("t5", dec!(5));
        let fees = income("t6", dec!(600));
        let other = income("t7", dec!(7));

        let items = vec![
            classified(&gift, 2022, SupportClassification::Contribution),
            classified(&tax, 2022, SupportClassification::GovernmentTaxRevenue),
            classified(&services, 2022, SupportClassification::GovernmentServiceFurnished),
            classified(&interest, 2022, SupportClassification::InvestmentIncome),
            classified(&ubi, 2022, SupportClassification::UnrelatedBusinessIncome),
            classified(&fees, 2022, SupportClassification::ProgramServiceGrossReceipt),
            classified(&other, 2022, SupportClassification::OtherIncome),
        ];

        let aggregate = YearlySupportAggregator::new(&[]).aggregate(2022, &items).unwrap();

        assert_eq!(aggregate.get(LineId::PartIILine4), dec!(1230));
        assert_eq!(aggregate.get(LineId::PartIILine7), dec!(1230));
        assert_eq!(aggregate.get(LineId::PartIILine11), dec!(1282));
        assert_eq!(aggregate.get(LineId::PartIILine12), dec!(600));

        assert_eq!(aggregate.get(LineId::PartIIILine6), dec!(1830));
        assert_eq!(aggregate.get(LineId::PartIIILine10c), dec!(45));
        assert_eq!(aggregate.get(LineId::PartIIILine13), dec!(1882));
    }

    #[test]
    fn test_other_years_and_non_support_are_skipped() {
        let gift = income("t1", dec!(1000));
        let sale = income("t2", dec!(9999));
        let items = vec![
            classified(&gift, 2021, SupportClassification::Contribution),
            classified(&sale, 2022, SupportClassification::NonSupport),
        ];

        let aggregate = YearlySupportAggregator::new(&[]).aggregate(2022, &items).unwrap();
        assert_eq!(aggregate, YearAggregate::from_base_lines(2022, &BTreeMap::new()).unwrap());
        assert!(aggregate.lines.values().all(|v| v.is_zero()));
    }

    #[test]
    fn test_adjustments_flow_into_totals() {
        let gift = income("t1", dec!(1000));
        let items = vec![classified(&gift, 2022, SupportClassification::Contribution)];
        let adjustments = vec![LineAdjustment::SetValue {
            line: LineId::PartIIILine3,
            year: 2022,
            value: dec!(250),
        }];

        let aggregate = YearlySupportAggregator::new(&adjustments).aggregate(2022, &items).unwrap();
        assert_eq!(aggregate.get(LineId::PartIIILine3), dec!(250));
        assert_eq!(aggregate.get(LineId::PartIIILine6), dec!(1250));
        assert_eq!(aggregate.get(LineId::PartIILine4), dec!(1000));
    }

    #[test]
    fn test_refunds_reduce_lines() {
        let gift = income("t1", dec!(1000));
        let refund = income("t2", dec!(-150));
        let items = vec![
            classified(&gift, 2022, SupportClassification::Contribution),
            classified(&refund, 2022, SupportClassification::Contribution),
        ];

        let aggregate = YearlySupportAggregator::new(&[]).aggregate(2022, &items).unwrap();
        assert_eq!(aggregate.get(LineId::PartIILine1), dec!(850));
    }

    #[test]
    fn test_overflowing_line_is_an_error() {
        let first = income("t1", dec!(50000000000000000000000000000));
        let second = income("t2", dec!(50000000000000000000000000000));
        let items = vec![
            classified(&first, 2022, SupportClassification::Contribution),
            classified(&second, 2022, SupportClassification::Contribution),
        ];

        match YearlySupportAggregator::new(&[]).aggregate(2022, &items) {
            Err(ScheduleAError::AmountOverflow { context }) => {
                assert_eq!(context, "Part II line 1")
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_derived_line_is_an_error() {
        let base: BTreeMap<LineId, Decimal> = [
            (LineId::PartIILine8, dec!(50000000000000000000000000000)),
            (LineId::PartIILine9, dec!(50000000000000000000000000000)),
        ]
        .into_iter()
        .collect();

        assert!(matches!(
            YearAggregate::from_base_lines(2022, &base),
            Err(ScheduleAError::AmountOverflow { .. })
        ));
    }
}
