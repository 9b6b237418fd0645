use crate::error::{Result, ScheduleAError};
use crate::report::{LineValues, ScheduleAData};
use crate::utils::{checked_add, checked_sub, checked_sum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Largest error a single two-place rounding can introduce.
const ROUNDING_SLACK: Decimal = dec!(0.005);

#[derive(Debug, Clone, Default)]
pub struct VerificationResult {
    pub checks_performed: usize,
    pub warnings: Vec<String>,
}

/// Re-checks the internal consistency of a rendered schedule: derived lines
/// equal the sums of their components in every column, totals match the
/// columns, and exactly one qualification box is checked per part.
///
/// Every rendered amount was rounded on its own, so each comparison allows
/// `tolerance` plus half a cent for every rounded figure taking part in it.
pub struct ScheduleVerifier<'a> {
    data: &'a ScheduleAData,
    tolerance: Decimal,
    result: VerificationResult,
}

impl<'a> ScheduleVerifier<'a> {
    pub fn new(data: &'a ScheduleAData, tolerance: Decimal) -> Self {
        Self {
            data,
            tolerance: tolerance.abs(),
            result: VerificationResult::default(),
        }
    }

    pub fn verify(mut self) -> Result<VerificationResult> {
        let data = self.data;
        let a = &data.part_ii.section_a;
        let b = &data.part_ii.section_b;
        for (name, values) in [
            ("line1", &a.line1),
            ("line2", &a.line2),
            ("line3", &a.line3),
            ("line4", &a.line4),
            ("line7", &b.line7),
            ("line8", &b.line8),
            ("line9", &b.line9),
            ("line10", &b.line10),
            ("line11", &b.line11),
            ("line12", &b.line12),
        ] {
            self.check_total("Part II", name, values)?;
        }
        self.check_sum("Part II", "line4", &a.line4, &[&a.line1, &a.line2, &a.line3])?;
        self.check_sum("Part II", "line7", &b.line7, &[&a.line4])?;
        self.check_sum(
            "Part II",
            "line11",
            &b.line11,
            &[&b.line7, &b.line8, &b.line9, &b.line10],
        )?;
        self.check_scalar(
            "Part II",
            "line6",
            &a.line6,
            checked_sub(parse(&a.line4.total)?, parse(&a.line5)?, &"Part II line 6")?,
        )?;

        let a = &data.part_iii.section_a;
        let b = &data.part_iii.section_b;
        for (name, values) in [
            ("line1", &a.line1),
            ("line2", &a.line2),
            ("line3", &a.line3),
            ("line4", &a.line4),
            ("line5", &a.line5),
            ("line6", &a.line6),
            ("line9", &b.line9),
            ("line10a", &b.line10a),
            ("line10b", &b.line10b),
            ("line10c", &b.line10c),
            ("line11", &b.line11),
            ("line12", &b.line12),
            ("line13", &b.line13),
        ] {
            self.check_total("Part III", name, values)?;
        }
        self.check_sum(
            "Part III",
            "line6",
            &a.line6,
            &[&a.line1, &a.line2, &a.line3, &a.line4, &a.line5],
        )?;
        self.check_sum("Part III", "line9", &b.line9, &[&a.line6])?;
        self.check_sum("Part III", "line10c", &b.line10c, &[&b.line10a, &b.line10b])?;
        self.check_sum(
            "Part III",
            "line13",
            &b.line13,
            &[&b.line9, &b.line10c, &b.line11, &b.line12],
        )?;
        self.check_scalar(
            "Part III",
            "line7c",
            &a.line7c,
            checked_add(parse(&a.line7a)?, parse(&a.line7b)?, &"Part III line 7c")?,
        )?;
        self.check_scalar(
            "Part III",
            "line8",
            &a.line8,
            checked_sub(parse(&a.line6.total)?, parse(&a.line7c)?, &"Part III line 8")?,
        )?;

        self.check_single_box("Part II", self.count_part_ii_boxes())?;
        self.check_single_box("Part III", self.count_part_iii_boxes())?;

        if data.summary.total_support == "0.00" {
            self.result.warnings.push(
                "Part II total support is zero; public support percentage reported as 0.00"
                    .to_string(),
            );
        }

        Ok(self.result)
    }

    fn check_total(&mut self, part: &str, line: &str, values: &LineValues) -> Result<()> {
        let context = format!("{} {} total", part, line);
        let columns = values
            .years
            .iter()
            .map(|v| parse(v))
            .collect::<Result<Vec<Decimal>>>()?;
        let expected = checked_sum(columns, &context)?;
        let rounded = values.years.len() + 1;
        self.compare(part, line, "total", expected, parse(&values.total)?, rounded)
    }

    fn check_sum(
        &mut self,
        part: &str,
        line: &str,
        values: &LineValues,
        components: &[&LineValues],
    ) -> Result<()> {
        let context = format!("{} {}", part, line);
        for (idx, actual) in values.years.iter().enumerate() {
            let mut expected = Decimal::ZERO;
            for component in components {
                if let Some(v) = component.years.get(idx) {
                    expected = checked_add(expected, parse(v)?, &context)?;
                }
            }
            let year = self
                .data
                .part_ii
                .section_a
                .years
                .get(idx)
                .map(|y| y.to_string())
                .unwrap_or_else(|| format!("column {}", idx));
            self.compare(part, line, &year, expected, parse(actual)?, components.len() + 1)?;
        }
        Ok(())
    }

    /// `expected` is derived from two rendered figures.
    fn check_scalar(
        &mut self,
        part: &str,
        line: &str,
        actual: &str,
        expected: Decimal,
    ) -> Result<()> {
        self.compare(part, line, "total", expected, parse(actual)?, 3)
    }

    fn compare(
        &mut self,
        part: &str,
        line: &str,
        year: &str,
        expected: Decimal,
        actual: Decimal,
        rounded_values: usize,
    ) -> Result<()> {
        self.result.checks_performed += 1;
        let slack = ROUNDING_SLACK * Decimal::from(rounded_values as u64);
        let allowed = self.tolerance.saturating_add(slack);
        let difference = checked_sub(expected, actual, &format!("{} {}", part, line))?;
        if difference.abs() > allowed {
            return Err(ScheduleAError::ConsistencyViolation {
                part: part.to_string(),
                line: line.to_string(),
                year: year.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn check_single_box(&mut self, part: &str, checked: usize) -> Result<()> {
        self.compare(
            part,
            "qualification",
            "boxes checked",
            Decimal::ONE,
            Decimal::from(checked as u64),
            0,
        )
    }

    fn count_part_ii_boxes(&self) -> usize {
        let c = &self.data.part_ii.section_c;
        [c.line13, c.line16a, c.line16b, c.line17a, c.line17b, c.line18]
            .iter()
            .filter(|b| **b)
            .count()
    }

    fn count_part_iii_boxes(&self) -> usize {
        let d = &self.data.part_iii.section_d;
        [
            self.data.part_iii.section_c.line14,
            d.line19a,
            d.line19b,
            d.line20,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

fn parse(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| ScheduleAError::InvalidAmount {
        value: value.to_string(),
        details: e.to_string(),
    })
}

pub fn verify_schedule(data: &ScheduleAData, tolerance: Decimal) -> Result<VerificationResult> {
    ScheduleVerifier::new(data, tolerance).verify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        Category, ScheduleARequest, SupportClassification, Transaction, TransactionType,
    };
    use crate::ScheduleAProcessor;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn request(gift: Decimal, interest: Decimal) -> ScheduleARequest {
        let mut request = ScheduleARequest::new("Lakeside Literacy Project", 2023);
        request.categories = vec![
            Category {
                id: "gifts".to_string(),
                name: "Individual Gifts".to_string(),
                parent_category_id: None,
                classification: Some(SupportClassification::Contribution),
            },
            Category {
                id: "interest".to_string(),
                name: "Bank Interest".to_string(),
                parent_category_id: None,
                classification: Some(SupportClassification::InvestmentIncome),
            },
        ];
        for (i, year) in (2018..=2023).enumerate() {
            request.transactions.push(Transaction {
                id: format!("g{}", i),
                date: NaiveDate::from_ymd_opt(year, 4, 1).unwrap(),
                amount: gift,
                transaction_type: TransactionType::Income,
                category_id: Some("gifts".to_string()),
                contributor_id: Some(format!("donor-{}", i)),
                description: None,
            });
            request.transactions.push(Transaction {
                id: format!("i{}", i),
                date: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
                amount: interest,
                transaction_type: TransactionType::Income,
                category_id: Some("interest".to_string()),
                contributor_id: None,
                description: None,
            });
        }
        request
    }

    fn sample() -> ScheduleAData {
        ScheduleAProcessor::process(&request(dec!(12000.00), dec!(300.00))).unwrap()
    }

    #[test]
    fn test_generated_schedule_verifies() {
        let data = sample();
        let result = verify_schedule(&data, dec!(0.01)).unwrap();
        assert!(result.checks_performed > 40);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_sub_cent_amounts_verify() {
        // each column renders 0.01 while the exact five-year total renders 0.03
        let data = ScheduleAProcessor::process(&request(dec!(0.005), dec!(0.005))).unwrap();
        assert_eq!(data.part_ii.section_a.line1.years[0], "0.01");
        assert_eq!(data.part_ii.section_a.line1.total, "0.03");

        let result = verify_schedule(&data, dec!(0.01)).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_tampered_line_is_reported() {
        let mut data = sample();
        data.part_ii.section_a.line4.years[2] = "1.00".to_string();

        match verify_schedule(&data, dec!(0.01)) {
            Err(ScheduleAError::ConsistencyViolation { part, line, .. }) => {
                assert_eq!(part, "Part II");
                assert_eq!(line, "line4");
            }
            other => panic!("expected consistency violation, got {:?}", other),
        }
    }

    #[test]
    fn test_two_checked_boxes_are_reported() {
        let mut data = sample();
        data.part_iii.section_d.line20 = true;
        data.part_iii.section_d.line19a = true;

        let result = verify_schedule(&data, dec!(0.01));
        assert!(matches!(
            result,
            Err(ScheduleAError::ConsistencyViolation { ref line, .. }) if line == "qualification"
        ));
    }

    #[test]
    fn test_unparseable_amount() {
        let mut data = sample();
        data.part_ii.section_a.line5 = "n/a".to_string();
        assert!(matches!(
            verify_schedule(&data, Decimal::ZERO),
            Err(ScheduleAError::InvalidAmount { .. })
        ));
    }
}
