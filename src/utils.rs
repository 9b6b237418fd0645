use crate::error::{Result, ScheduleAError};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Number of tax years in a public support computation period.
pub const WINDOW_YEARS: i32 = 5;

/// A run of consecutive tax years, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub first_year: i32,
    pub last_year: i32,
}

impl YearWindow {
    /// The five years ending with `tax_year`.
    pub fn ending(tax_year: i32) -> Self {
        Self {
            first_year: tax_year - (WINDOW_YEARS - 1),
            last_year: tax_year,
        }
    }

    /// The same window shifted back one year.
    pub fn previous(&self) -> Self {
        Self {
            first_year: self.first_year - 1,
            last_year: self.last_year - 1,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }

    pub fn years(&self) -> Vec<i32> {
        (self.first_year..=self.last_year).collect()
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn validate_fiscal_year_end_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(ScheduleAError::InvalidFiscalYearEndMonth(month));
    }
    Ok(())
}

/// Returns the tax year a date belongs to. A fiscal year is labelled by the
/// calendar year in which it begins.
///
/// # Examples
/// - FY ends Dec (12): 2023-03-15 => 2023
/// - FY ends June (6): 2023-07-01 => 2023, 2023-06-30 => 2022
pub fn tax_year_for_date(date: NaiveDate, fiscal_year_end_month: u32) -> i32 {
    if fiscal_year_end_month == 12 || date.month() > fiscal_year_end_month {
        date.year()
    } else {
        date.year() - 1
    }
}

/// First and last day of a tax year.
pub fn tax_year_date_range(tax_year: i32, fiscal_year_end_month: u32) -> (NaiveDate, NaiveDate) {
    if fiscal_year_end_month == 12 {
        let start = NaiveDate::from_ymd_opt(tax_year, 1, 1).unwrap_or(NaiveDate::MIN);
        return (start, last_day_of_month(tax_year, 12));
    }

    let start = NaiveDate::from_ymd_opt(tax_year, fiscal_year_end_month + 1, 1)
        .unwrap_or(NaiveDate::MIN);
    let end = last_day_of_month(tax_year + 1, fiscal_year_end_month);
    (start, end)
}

/// Rounds half away from zero to two places, the convention used on the form.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator * 100`, rounded to two places. A zero or negative
/// denominator yields 0.00.
pub fn percentage(numerator: Decimal, denominator: Decimal) -> Result<Decimal> {
    if denominator <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(denominator))
        .or_else(|| {
            numerator
                .checked_div(denominator)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        })
        .map(round_half_up)
        .ok_or_else(|| overflow(&"a support percentage"))
}

pub fn checked_add(a: Decimal, b: Decimal, context: &impl fmt::Display) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub fn checked_sub(a: Decimal, b: Decimal, context: &impl fmt::Display) -> Result<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

pub fn checked_sum<I>(values: I, context: &impl fmt::Display) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| checked_add(acc, value, context))
}

fn overflow(context: &impl fmt::Display) -> ScheduleAError {
    ScheduleAError::AmountOverflow {
        context: context.to_string(),
    }
}

/// Fixed two-place decimal string. Never renders "-0.00".
pub fn format_fixed(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded.to_string()
}
