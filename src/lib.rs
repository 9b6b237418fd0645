//! # Schedule A Builder
//!
//! A library for computing the IRS Form 990 Schedule A public support test
//! (Parts II and III) from an organization's categorized transaction history.
//!
//! ## Core Concepts
//!
//! - **Classification**: Each category carries a support classification that decides
//!   which schedule lines its transactions feed
//! - **Five-Year Window**: Support is measured over the tax year and the four before it;
//!   the prior-year percentages use the window shifted back one year
//! - **Contributor Exclusions**: Large gifts are limited against whole-window totals
//!   (Part II line 5, Part III lines 7a/7b)
//! - **Qualification**: The form's checklist is walked in order and the first line that
//!   applies is the only box checked
//!
//! ## Example
//!
//! ```rust,ignore
//! use schedule_a_builder::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let mut request = ScheduleARequest::new("Riverbend Food Pantry", 2023);
//! request.categories = vec![Category {
//!     id: "gifts".to_string(),
//!     name: "Individual Gifts".to_string(),
//!     parent_category_id: None,
//!     classification: Some(SupportClassification::Contribution),
//! }];
//! request.transactions = vec![Transaction {
//!     id: "t1".to_string(),
//!     date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
//!     amount: dec!(250.00),
//!     transaction_type: TransactionType::Income,
//!     category_id: Some("gifts".to_string()),
//!     contributor_id: None,
//!     description: Some("Online gift".to_string()),
//! }];
//!
//! let schedule = process_schedule_a(&request).unwrap();
//! println!("{}", schedule.to_json().unwrap());
//! ```

pub mod aggregation;
pub mod calculator;
pub mod categories;
pub mod classifier;
pub mod contributors;
pub mod decider;
pub mod error;
pub mod ingestion;
pub mod lines;
pub mod overrides;
pub mod report;
pub mod schema;
pub mod utils;
pub mod verification;

pub use aggregation::{YearAggregate, YearlySupportAggregator};
pub use calculator::{
    PartIIITotals, PartIITotals, ScheduleComputation, SupportScheduleCalculator,
    WindowComputation,
};
pub use categories::{CategoryIndex, CategorySummary, ResolutionSource};
pub use classifier::{ClassifiedTransaction, LineBucket, TransactionClassifier};
pub use contributors::{ContributorAggregator, ContributorExclusions, ContributorKey};
pub use decider::{
    PartIIIPath, PartIIIQualification, PartIIPath, PartIIQualification, QualificationDecider,
    QualificationFacts,
};
pub use error::{Result, ScheduleAError};
pub use ingestion::*;
pub use lines::LineId;
pub use overrides::LineAdjustment;
pub use report::*;
pub use schema::*;
pub use utils::*;
pub use verification::{verify_schedule, ScheduleVerifier, VerificationResult};

use log::{debug, info};
use rust_decimal::Decimal;

/// Earliest tax year accepted.
const MIN_TAX_YEAR: i32 = 1900;
const MAX_TAX_YEAR: i32 = 9999;

pub struct ScheduleAProcessor;

impl ScheduleAProcessor {
    pub fn process(request: &ScheduleARequest) -> Result<ScheduleAData> {
        validate_request(request)?;

        info!(
            "Computing Schedule A for organization: {} (tax year {})",
            request.organization_name, request.tax_year
        );
        debug!(
            "Request contains {} categories, {} transactions, {} contributor profiles and {} adjustments",
            request.categories.len(),
            request.transactions.len(),
            request.contributors.len(),
            request.adjustments.len()
        );

        let index = CategoryIndex::new(&request.categories);
        let summary = index.summary();
        for entry in summary.defaulted() {
            debug!(
                "Category '{}' ({}) has no classification; reported as other income",
                entry.name, entry.id
            );
        }
        let classifier = TransactionClassifier::new(&index, request.fiscal_year_end_month);
        let classified = classifier.classify_all(&request.transactions);

        let current_window = YearWindow::ending(request.tax_year);
        let prior_window = current_window.previous();

        let (period_start, _) =
            tax_year_date_range(prior_window.first_year, request.fiscal_year_end_month);
        let (_, period_end) =
            tax_year_date_range(current_window.last_year, request.fiscal_year_end_month);
        debug!("Reporting period {} to {}", period_start, period_end);

        let outside = classified
            .iter()
            .filter(|c| !current_window.contains(c.tax_year) && !prior_window.contains(c.tax_year))
            .count();
        if outside > 0 {
            debug!(
                "{} transactions fall outside tax years {}-{} and were ignored",
                outside, prior_window.first_year, current_window.last_year
            );
        }

        let computation = ScheduleComputation {
            current: compute_window(request, &classified, current_window)?,
            prior: compute_window(request, &classified, prior_window)?,
        };

        let facts = QualificationFacts {
            first_five_years: Some(request.resolved_first_five_years()),
            facts_and_circumstances: Some(request.resolved_facts_and_circumstances()),
        };

        let part_ii = QualificationDecider::decide_part_ii(
            computation.current.part_ii.public_support_percentage,
            computation.prior.part_ii.public_support_percentage,
            facts,
        );
        let part_iii = QualificationDecider::decide_part_iii(
            computation.current.part_iii.public_support_percentage,
            computation.current.part_iii.investment_income_percentage,
            computation.prior.part_iii.public_support_percentage,
            computation.prior.part_iii.investment_income_percentage,
            facts,
        );

        debug!(
            "Part II qualification path: {}; Part III qualification path: {}",
            part_ii.path, part_iii.path
        );

        Ok(
            ScheduleAReportBuilder::new(&request.organization_name, request.tax_year)
                .build(&computation, part_ii, part_iii),
        )
    }

    pub fn process_with_verification(
        request: &ScheduleARequest,
        tolerance: Decimal,
    ) -> Result<ScheduleAData> {
        let data = Self::process(request)?;

        let verification = verify_schedule(&data, tolerance)?;
        for warning in verification.warnings {
            debug!("Schedule verification note: {}", warning);
        }

        Ok(data)
    }
}

pub fn process_schedule_a(request: &ScheduleARequest) -> Result<ScheduleAData> {
    ScheduleAProcessor::process(request)
}

pub fn process_with_verification(
    request: &ScheduleARequest,
    tolerance: Decimal,
) -> Result<ScheduleAData> {
    ScheduleAProcessor::process_with_verification(request, tolerance)
}

/// Aggregates, applies contributor exclusions and computes totals for one window.
fn compute_window(
    request: &ScheduleARequest,
    classified: &[ClassifiedTransaction<'_>],
    window: YearWindow,
) -> Result<WindowComputation> {
    let years = YearlySupportAggregator::new(&request.adjustments)
        .aggregate_years(&window.years(), classified)?;

    let contributors = ContributorAggregator::new(&request.contributors);
    let totals = contributors.aggregate_contributors(classified, window)?;
    let exclusions = contributors.exclusions(
        &totals,
        SupportScheduleCalculator::line_total(&years, LineId::PartIILine11)?,
        SupportScheduleCalculator::line_total(&years, LineId::PartIIILine13)?,
    )?;

    SupportScheduleCalculator::compute(years, exclusions)
}

/// Checks the caller contract. Data-quality gaps are not errors; only a tax
/// year or fiscal year that cannot be right, or adjustments that cannot apply.
pub fn validate_request(request: &ScheduleARequest) -> Result<()> {
    validate_fiscal_year_end_month(request.fiscal_year_end_month)?;

    if !(MIN_TAX_YEAR..=MAX_TAX_YEAR).contains(&request.tax_year) {
        return Err(ScheduleAError::InvalidTaxYear {
            tax_year: request.tax_year,
            reason: format!("must be between {} and {}", MIN_TAX_YEAR, MAX_TAX_YEAR),
        });
    }

    if let Some(formed) = request.formation_year {
        if request.tax_year < formed {
            return Err(ScheduleAError::InvalidTaxYear {
                tax_year: request.tax_year,
                reason: format!("precedes the organization's formation year {}", formed),
            });
        }
    }

    let current = YearWindow::ending(request.tax_year);
    let first_year = current.previous().first_year;
    for adjustment in &request.adjustments {
        adjustment.validate(first_year, current.last_year)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn gift(id: &str, year: i32, amount: Decimal, donor: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(year, 6, 15).unwrap(),
            amount,
            transaction_type: TransactionType::Income,
            category_id: Some("gifts".to_string()),
            contributor_id: Some(donor.to_string()),
            description: None,
        }
    }

    fn request_with(transactions: Vec<Transaction>) -> ScheduleARequest {
        let mut request = ScheduleARequest::new("Test Charity", 2023);
        request.categories = vec![
            Category {
                id: "gifts".to_string(),
                name: "Gifts".to_string(),
                parent_category_id: None,
                classification: Some(SupportClassification::Contribution),
            },
            Category {
                id: "interest".to_string(),
                name: "Interest".to_string(),
                parent_category_id: None,
                classification: Some(SupportClassification::InvestmentIncome),
            },
        ];
        request.transactions = transactions;
        request
    }

    #[test]
    fn test_end_to_end_processing() {
        let transactions = (2019..=2023)
            .map(|y| gift(&format!("t{}", y), y, dec!(20000), &format!("donor-{}", y)))
            .collect();
        let request = request_with(transactions);

        let data = process_schedule_a(&request).unwrap();
        assert_eq!(data.summary.total_support, "100000.00");
        // each donor's 20000 exceeds the 2000 limit by 18000
        assert_eq!(data.part_ii.section_a.line5, "90000.00");
        assert_eq!(data.summary.total_public_support, "10000.00");
        assert_eq!(data.summary.public_support_percentage, "10.00");
        assert!(data.part_ii.section_c.line18);
    }

    #[test]
    fn test_invalid_tax_year_fails_loudly() {
        let mut request = request_with(vec![]);
        request.formation_year = Some(2024);
        assert!(matches!(
            process_schedule_a(&request),
            Err(ScheduleAError::InvalidTaxYear { .. })
        ));

        let mut request = request_with(vec![]);
        request.tax_year = 0;
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_invalid_fiscal_year_end_month() {
        let mut request = request_with(vec![]);
        request.fiscal_year_end_month = 13;
        assert!(matches!(
            process_schedule_a(&request),
            Err(ScheduleAError::InvalidFiscalYearEndMonth(13))
        ));
    }

    #[test]
    fn test_adjustment_outside_reporting_years_is_rejected() {
        let mut request = request_with(vec![]);
        request.adjustments = vec![LineAdjustment::SetValue {
            line: LineId::PartIIILine3,
            year: 2017,
            value: dec!(10),
        }];
        assert!(matches!(
            process_schedule_a(&request),
            Err(ScheduleAError::InvalidAdjustment { .. })
        ));

        request.adjustments[0] = LineAdjustment::SetValue {
            line: LineId::PartIIILine3,
            year: 2018,
            value: dec!(10),
        };
        assert!(process_schedule_a(&request).is_ok());
    }

    #[test]
    fn test_process_with_verification() {
        let transactions = (2018..=2023)
            .map(|y| gift(&format!("t{}", y), y, dec!(1500.25), "same-donor"))
            .collect();
        let request = request_with(transactions);

        let data = process_with_verification(&request, dec!(0.01)).unwrap();
        assert_eq!(data.part_ii.section_a.years, vec![2019, 2020, 2021, 2022, 2023]);
    }
}
