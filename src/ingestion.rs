use crate::schema::{
    Category, ScheduleARequest, SupportClassification, Transaction, TransactionType,
};
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A flat ledger line as exported by bookkeeping systems that have no
/// separate category table.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category_name: String,
    pub classification: Option<SupportClassification>,
    pub contributor_reference: Option<String>,
    pub description: Option<String>,
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// `cat-<slug>`, suffixed with a counter when another name already produced it.
fn unique_category_id(name_key: &str, taken: &BTreeMap<String, Category>) -> String {
    let slug = slug(name_key);
    let base = if slug.is_empty() {
        "cat-uncategorized".to_string()
    } else {
        format!("cat-{}", slug)
    };

    if !taken.contains_key(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Builds a request from ledger rows. One category is created per distinct
/// category name (trimmed, case-insensitive); the first row that declares a
/// classification for a name wins.
pub fn convert_ledger_to_request(
    rows: &[LedgerRow],
    organization_name: String,
    tax_year: i32,
    fiscal_year_end_month: u32,
) -> ScheduleARequest {
    let mut categories: BTreeMap<String, Category> = BTreeMap::new();
    let mut ids_by_name: BTreeMap<String, String> = BTreeMap::new();
    let mut transactions = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let name_key = row.category_name.trim().to_lowercase();
        let id = match ids_by_name.get(&name_key) {
            Some(id) => id.clone(),
            None => {
                let id = unique_category_id(&name_key, &categories);
                categories.insert(
                    id.clone(),
                    Category {
                        id: id.clone(),
                        name: row.category_name.trim().to_string(),
                        parent_category_id: None,
                        classification: None,
                    },
                );
                ids_by_name.insert(name_key, id.clone());
                id
            }
        };

        if let Some(category) = categories.get_mut(&id) {
            if category.classification.is_none() {
                category.classification = row.classification;
            }
        }

        transactions.push(Transaction {
            id: format!("ledger-{}", idx + 1),
            date: row.date,
            amount: row.amount,
            transaction_type: row.transaction_type,
            category_id: Some(id),
            contributor_id: row.contributor_reference.clone(),
            description: row.description.clone(),
        });
    }

    debug!(
        "Converted {} ledger rows into {} categories",
        rows.len(),
        categories.len()
    );

    let mut request = ScheduleARequest::new(organization_name, tax_year);
    request.fiscal_year_end_month = fiscal_year_end_month;
    request.categories = categories.into_values().collect();
    request.transactions = transactions;
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(category: &str, classification: Option<SupportClassification>) -> LedgerRow {
        LedgerRow {
            date: NaiveDate::from_ymd_opt(2022, 9, 1).unwrap(),
            amount: dec!(75),
            transaction_type: TransactionType::Income,
            category_name: category.to_string(),
            classification,
            contributor_reference: None,
            description: Some("Online gift".to_string()),
        }
    }

    #[test]
    fn test_categories_are_deduplicated_by_name() {
        let rows = vec![
            row("Individual Gifts", None),
            row(" individual gifts ", Some(SupportClassification::Contribution)),
            row("Individual Gifts", Some(SupportClassification::OtherIncome)),
            row("Bank Interest", Some(SupportClassification::InvestmentIncome)),
        ];

        let request = convert_ledger_to_request(&rows, "Northside Shelter".to_string(), 2023, 6);

        assert_eq!(request.fiscal_year_end_month, 6);
        assert_eq!(request.categories.len(), 2);
        let gifts = request
            .categories
            .iter()
            .find(|c| c.id == "cat-individual-gifts")
            .unwrap();
        assert_eq!(gifts.classification, Some(SupportClassification::Contribution));

        assert_eq!(request.transactions.len(), 4);
        assert_eq!(request.transactions[3].id, "ledger-4");
        assert_eq!(
            request.transactions[3].category_id.as_deref(),
            Some("cat-bank-interest")
        );
    }

    #[test]
    fn test_similar_names_keep_separate_categories() {
        let rows = vec![
            row("Gifts & Grants", Some(SupportClassification::Contribution)),
            row("Gifts Grants", Some(SupportClassification::OtherIncome)),
            row("!!!", Some(SupportClassification::NonSupport)),
            row("gifts & grants", None),
        ];

        let request = convert_ledger_to_request(&rows, "Northside Shelter".to_string(), 2023, 12);

        assert_eq!(request.categories.len(), 3);
        let ids: Vec<_> = request.transactions.iter().map(|t| t.category_id.clone()).collect();
        assert_eq!(ids[0].as_deref(), Some("cat-gifts-grants"));
        assert_eq!(ids[1].as_deref(), Some("cat-gifts-grants-2"));
        assert_eq!(ids[2].as_deref(), Some("cat-uncategorized"));
        assert_eq!(ids[3], ids[0]);

        let classification = |id: &str| {
            request
                .categories
                .iter()
                .find(|c| c.id == id)
                .and_then(|c| c.classification)
        };
        assert_eq!(
            classification("cat-gifts-grants"),
            Some(SupportClassification::Contribution)
        );
        assert_eq!(
            classification("cat-gifts-grants-2"),
            Some(SupportClassification::OtherIncome)
        );
    }
}
