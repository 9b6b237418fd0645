use crate::categories::{CategoryIndex, ResolutionSource};
use crate::lines::LineId;
use crate::schema::{SupportClassification, Transaction, TransactionType};
use crate::utils::tax_year_for_date;
use log::debug;

/// The schedule lines a transaction's amount is added to. Parts II and III are
/// filled side by side, so most classifications land on one line of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBucket {
    pub classification: Option<SupportClassification>,
    pub lines: &'static [LineId],
}

impl LineBucket {
    /// A bucket that feeds no line (expenses).
    pub const NONE: LineBucket = LineBucket {
        classification: None,
        lines: &[],
    };

    pub fn for_classification(classification: SupportClassification) -> Self {
        Self {
            classification: Some(classification),
            lines: lines_for(classification),
        }
    }

    pub fn is_contribution(&self) -> bool {
        self.classification == Some(SupportClassification::Contribution)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Fixed classification table.
pub fn lines_for(classification: SupportClassification) -> &'static [LineId] {
    match classification {
        SupportClassification::Contribution => &[LineId::PartIILine1, LineId::PartIIILine1],
        SupportClassification::GovernmentTaxRevenue => {
            &[LineId::PartIILine2, LineId::PartIIILine4]
        }
        SupportClassification::GovernmentServiceFurnished => {
            &[LineId::PartIILine3, LineId::PartIIILine5]
        }
        SupportClassification::InvestmentIncome => &[LineId::PartIILine8, LineId::PartIIILine10a],
        SupportClassification::UnrelatedBusinessIncome => {
            &[LineId::PartIILine9, LineId::PartIIILine10b]
        }
        SupportClassification::ProgramServiceGrossReceipt => {
            &[LineId::PartIILine12, LineId::PartIIILine2]
        }
        SupportClassification::OtherIncome => &[LineId::PartIILine10, LineId::PartIIILine12],
        SupportClassification::NonSupport => &[],
    }
}

/// A transaction paired with its tax year and bucket.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedTransaction<'a> {
    pub transaction: &'a Transaction,
    pub tax_year: i32,
    pub bucket: LineBucket,
}

pub struct TransactionClassifier<'a> {
    index: &'a CategoryIndex,
    fiscal_year_end_month: u32,
}

impl<'a> TransactionClassifier<'a> {
    pub fn new(index: &'a CategoryIndex, fiscal_year_end_month: u32) -> Self {
        Self {
            index,
            fiscal_year_end_month,
        }
    }

    /// Buckets a single transaction. Never fails: an unknown category is
    /// treated as other income.
    pub fn classify(&self, transaction: &Transaction) -> LineBucket {
        if transaction.transaction_type == TransactionType::Expense {
            return LineBucket::NONE;
        }

        let resolved = self.index.resolve(transaction.category_id.as_deref());
        LineBucket::for_classification(resolved.classification)
    }

    pub fn classify_all<'t>(
        &self,
        transactions: &'t [Transaction],
    ) -> Vec<ClassifiedTransaction<'t>> {
        let mut defaulted = 0usize;
        let mut unreported = 0usize;

        let classified: Vec<ClassifiedTransaction<'t>> = transactions
            .iter()
            .map(|transaction| {
                let bucket = self.classify(transaction);
                if bucket.is_empty() {
                    unreported += 1;
                } else if self.index.resolve(transaction.category_id.as_deref()).source
                    == ResolutionSource::Defaulted
                {
                    defaulted += 1;
                }

                ClassifiedTransaction {
                    transaction,
                    tax_year: tax_year_for_date(transaction.date, self.fiscal_year_end_month),
                    bucket,
                }
            })
            .collect();

        debug!(
            "Classified {} transactions ({} expenses or non-support receipts feed no line, {} defaulted to other income)",
            classified.len(),
            unreported,
            defaulted
        );

        classified
    }
}
