use crate::contributors::ContributorKey;
use crate::overrides::LineAdjustment;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SupportClassification {
    #[schemars(
        description = "Gifts, grants, contributions and membership fees, including grants from governmental units (Part II line 1, Part III line 1)"
    )]
    Contribution,

    #[schemars(
        description = "Tax revenues levied for the organization's benefit and paid to or expended on its behalf (Part II line 2, Part III line 4)"
    )]
    GovernmentTaxRevenue,

    #[schemars(
        description = "Value of services or facilities furnished by a governmental unit without charge (Part II line 3, Part III line 5)"
    )]
    GovernmentServiceFurnished,

    #[schemars(
        description = "Interest, dividends, payments on securities loans, rents, royalties and similar sources (Part II line 8, Part III line 10a)"
    )]
    InvestmentIncome,

    #[schemars(
        description = "Net income from unrelated business activities (Part II line 9, Part III line 10b)"
    )]
    UnrelatedBusinessIncome,

    #[schemars(
        description = "Gross receipts from admissions, merchandise sold, services performed or facilities furnished in an activity related to the exempt purpose (Part II line 12, Part III line 2)"
    )]
    ProgramServiceGrossReceipt,

    #[schemars(
        description = "Other income, not including gain or loss from the sale of capital assets (Part II line 10, Part III line 12)"
    )]
    OtherIncome,

    #[schemars(
        description = "Revenue that never counts toward support (e.g. capital gains, transfers)"
    )]
    NonSupport,
}

impl SupportClassification {
    pub const ALL: [SupportClassification; 8] = [
        SupportClassification::Contribution,
        SupportClassification::GovernmentTaxRevenue,
        SupportClassification::GovernmentServiceFurnished,
        SupportClassification::InvestmentIncome,
        SupportClassification::UnrelatedBusinessIncome,
        SupportClassification::ProgramServiceGrossReceipt,
        SupportClassification::OtherIncome,
        SupportClassification::NonSupport,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    #[schemars(description = "Stable category identifier referenced by transactions")]
    pub id: String,

    #[schemars(description = "Display name of the category")]
    pub name: String,

    #[serde(default)]
    #[schemars(
        description = "Parent category. A category without its own classification inherits the nearest classified ancestor's."
    )]
    pub parent_category_id: Option<String>,

    #[serde(default)]
    #[schemars(
        description = "Support classification. Categories that resolve to no classification are treated as other_income."
    )]
    pub classification: Option<SupportClassification>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    pub id: String,

    pub date: NaiveDate,

    #[schemars(description = "Signed amount. A negative income amount (refund) reduces its line.")]
    pub amount: Decimal,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    #[serde(default)]
    pub category_id: Option<String>,

    #[serde(default)]
    #[schemars(
        description = "Donor, vendor or client reference. Used to group contributions by contributor."
    )]
    pub contributor_id: Option<String>,

    #[serde(default)]
    #[schemars(
        description = "Free-text description. Used as the contributor identity when no reference is present."
    )]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ContributorProfile {
    pub key: ContributorKey,

    #[serde(default)]
    #[schemars(
        description = "Officer, director, substantial contributor or other disqualified person. All of their contributions are excluded on Part III line 7a."
    )]
    pub disqualified_person: bool,

    #[serde(default)]
    #[schemars(
        description = "Governmental unit or publicly supported organization. Its gifts are not limited by the Part II 2% rule."
    )]
    pub exempt_from_limit: bool,
}

fn default_fiscal_year_end_month() -> u32 {
    12
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScheduleARequest {
    #[schemars(description = "The legal name of the organization")]
    pub organization_name: String,

    #[schemars(
        description = "The tax year being reported. A fiscal year is identified by the calendar year in which it begins."
    )]
    pub tax_year: i32,

    #[serde(default = "default_fiscal_year_end_month")]
    #[schemars(description = "The month when the fiscal year ends (1 = January, 12 = December)")]
    pub fiscal_year_end_month: u32,

    #[serde(default)]
    #[schemars(description = "First tax year in which the organization was a section 501(c)(3)")]
    pub formation_year: Option<i32>,

    #[serde(default)]
    #[schemars(
        description = "Whether this is the organization's first, second, third, fourth or fifth tax year as a 501(c)(3). Derived from formation_year when absent."
    )]
    pub first_five_years: Option<bool>,

    #[serde(default)]
    #[schemars(
        description = "Whether the organization documents the facts-and-circumstances test. Treated as false when absent."
    )]
    pub facts_and_circumstances: Option<bool>,

    #[serde(default)]
    pub contributors: Vec<ContributorProfile>,

    #[serde(default)]
    #[schemars(description = "Manual line entries applied on top of the ledger-derived amounts")]
    pub adjustments: Vec<LineAdjustment>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl ScheduleARequest {
    pub fn new(organization_name: impl Into<String>, tax_year: i32) -> Self {
        Self {
            organization_name: organization_name.into(),
            tax_year,
            fiscal_year_end_month: default_fiscal_year_end_month(),
            formation_year: None,
            first_five_years: None,
            facts_and_circumstances: None,
            contributors: Vec::new(),
            adjustments: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ScheduleARequest)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// The first-five-years flag, derived from `formation_year` when not given explicitly.
    pub fn resolved_first_five_years(&self) -> bool {
        match (self.first_five_years, self.formation_year) {
            (Some(flag), _) => flag,
            (None, Some(formed)) => self.tax_year - formed < 5,
            (None, None) => false,
        }
    }

    pub fn resolved_facts_and_circumstances(&self) -> bool {
        self.facts_and_circumstances.unwrap_or(false)
    }
}
