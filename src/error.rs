use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleAError {
    #[error("Invalid tax year {tax_year}: {reason}")]
    InvalidTaxYear { tax_year: i32, reason: String },

    #[error("Invalid fiscal year end month {0}: must be between 1 and 12")]
    InvalidFiscalYearEndMonth(u32),

    #[error("Invalid adjustment for {line}: {details}")]
    InvalidAdjustment { line: String, details: String },

    #[error("Schedule inconsistency in {part} {line} ({year}): expected {expected}, found {actual}")]
    ConsistencyViolation {
        part: String,
        line: String,
        year: String,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("Invalid amount '{value}': {details}")]
    InvalidAmount { value: String, details: String },

    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleAError>;
