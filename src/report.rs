use crate::calculator::{ScheduleComputation, WindowComputation};
use crate::decider::{PartIIIQualification, PartIIQualification, ONE_THIRD_THRESHOLD};
use crate::lines::LineId;
use crate::utils::format_fixed;
use serde::{Deserialize, Serialize};

/// One line across the five columns (a)-(e) plus the total column (f).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineValues {
    pub years: Vec<String>,
    pub total: String,
}

impl LineValues {
    fn from_window(window: &WindowComputation, line: LineId) -> Self {
        Self {
            years: window.years.iter().map(|y| format_fixed(y.get(line))).collect(),
            total: format_fixed(window.total(line)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIISectionA {
    pub years: Vec<i32>,
    pub line1: LineValues,
    pub line2: LineValues,
    pub line3: LineValues,
    pub line4: LineValues,
    pub line5: String,
    pub line6: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIISectionB {
    pub years: Vec<i32>,
    pub line7: LineValues,
    pub line8: LineValues,
    pub line9: LineValues,
    pub line10: LineValues,
    pub line11: LineValues,
    pub line12: LineValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartIISectionC {
    pub line13: bool,
    pub line14: String,
    pub line15: String,
    pub line16a: bool,
    pub line16b: bool,
    pub line17a: bool,
    pub line17b: bool,
    pub line18: bool,
    pub qualification_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartIIData {
    pub section_a: PartIISectionA,
    pub section_b: PartIISectionB,
    pub section_c: PartIISectionC,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIIISectionA {
    pub years: Vec<i32>,
    pub line1: LineValues,
    pub line2: LineValues,
    pub line3: LineValues,
    pub line4: LineValues,
    pub line5: LineValues,
    pub line6: LineValues,
    pub line7a: String,
    pub line7b: String,
    pub line7c: String,
    pub line8: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIIISectionB {
    pub years: Vec<i32>,
    pub line9: LineValues,
    pub line10a: LineValues,
    pub line10b: LineValues,
    pub line10c: LineValues,
    pub line11: LineValues,
    pub line12: LineValues,
    pub line13: LineValues,
}

/// Public support percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartIIISectionC {
    pub line14: bool,
    pub line15: String,
    pub line16: String,
}

/// Investment income percentage and the qualification checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartIIISectionD {
    pub line17: String,
    pub line18: String,
    pub line19a: bool,
    pub line19b: bool,
    pub line20: bool,
    pub qualification_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartIIIData {
    pub section_a: PartIIISectionA,
    pub section_b: PartIIISectionB,
    pub section_c: PartIIISectionC,
    pub section_d: PartIIISectionD,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleASummary {
    pub total_public_support: String,
    pub total_support: String,
    pub public_support_percentage: String,
    pub meets_threshold: bool,
    #[serde(rename = "partIIQualifies")]
    pub part_ii_qualifies: bool,
    #[serde(rename = "partIIQualificationPath")]
    pub part_ii_qualification_path: String,
    #[serde(rename = "partIIIPublicSupport")]
    pub part_iii_public_support: String,
    #[serde(rename = "partIIITotalSupport")]
    pub part_iii_total_support: String,
    #[serde(rename = "partIIIPublicSupportPercentage")]
    pub part_iii_public_support_percentage: String,
    #[serde(rename = "partIIIInvestmentPercentage")]
    pub part_iii_investment_percentage: String,
    #[serde(rename = "partIIIMeetsThreshold")]
    pub part_iii_meets_threshold: bool,
    #[serde(rename = "partIIIQualifies")]
    pub part_iii_qualifies: bool,
    #[serde(rename = "partIIIQualificationPath")]
    pub part_iii_qualification_path: String,
}

/// The rendered schedule handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAData {
    pub organization_name: String,
    pub tax_year: i32,
    #[serde(rename = "partII")]
    pub part_ii: PartIIData,
    #[serde(rename = "partIII")]
    pub part_iii: PartIIIData,
    pub summary: ScheduleASummary,
}

impl ScheduleAData {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub struct ScheduleAReportBuilder<'a> {
    organization_name: &'a str,
    tax_year: i32,
}

impl<'a> ScheduleAReportBuilder<'a> {
    pub fn new(organization_name: &'a str, tax_year: i32) -> Self {
        Self {
            organization_name,
            tax_year,
        }
    }

    pub fn build(
        &self,
        computation: &ScheduleComputation,
        part_ii_decision: PartIIQualification,
        part_iii_decision: PartIIIQualification,
    ) -> ScheduleAData {
        let current = &computation.current;
        let prior = &computation.prior;
        let years: Vec<i32> = current.years.iter().map(|y| y.year).collect();
        let line = |id| LineValues::from_window(current, id);

        let part_ii = PartIIData {
            section_a: PartIISectionA {
                years: years.clone(),
                line1: line(LineId::PartIILine1),
                line2: line(LineId::PartIILine2),
                line3: line(LineId::PartIILine3),
                line4: line(LineId::PartIILine4),
                line5: format_fixed(current.part_ii.line5),
                line6: format_fixed(current.part_ii.line6),
            },
            section_b: PartIISectionB {
                years: years.clone(),
                line7: line(LineId::PartIILine7),
                line8: line(LineId::PartIILine8),
                line9: line(LineId::PartIILine9),
                line10: line(LineId::PartIILine10),
                line11: line(LineId::PartIILine11),
                line12: line(LineId::PartIILine12),
            },
            section_c: PartIISectionC {
                line13: part_ii_decision.line13,
                line14: format_fixed(current.part_ii.public_support_percentage),
                line15: format_fixed(prior.part_ii.public_support_percentage),
                line16a: part_ii_decision.line16a,
                line16b: part_ii_decision.line16b,
                line17a: part_ii_decision.line17a,
                line17b: part_ii_decision.line17b,
                line18: part_ii_decision.line18,
                qualification_path: part_ii_decision.path.to_string(),
            },
        };

        let part_iii = PartIIIData {
            section_a: PartIIISectionA {
                years: years.clone(),
                line1: line(LineId::PartIIILine1),
                line2: line(LineId::PartIIILine2),
                line3: line(LineId::PartIIILine3),
                line4: line(LineId::PartIIILine4),
                line5: line(LineId::PartIIILine5),
                line6: line(LineId::PartIIILine6),
                line7a: format_fixed(current.part_iii.line7a),
                line7b: format_fixed(current.part_iii.line7b),
                line7c: format_fixed(current.part_iii.line7c),
                line8: format_fixed(current.part_iii.line8),
            },
            section_b: PartIIISectionB {
                years,
                line9: line(LineId::PartIIILine9),
                line10a: line(LineId::PartIIILine10a),
                line10b: line(LineId::PartIIILine10b),
                line10c: line(LineId::PartIIILine10c),
                line11: line(LineId::PartIIILine11),
                line12: line(LineId::PartIIILine12),
                line13: line(LineId::PartIIILine13),
            },
            section_c: PartIIISectionC {
                line14: part_iii_decision.line14,
                line15: format_fixed(current.part_iii.public_support_percentage),
                line16: format_fixed(prior.part_iii.public_support_percentage),
            },
            section_d: PartIIISectionD {
                line17: format_fixed(current.part_iii.investment_income_percentage),
                line18: format_fixed(prior.part_iii.investment_income_percentage),
                line19a: part_iii_decision.line19a,
                line19b: part_iii_decision.line19b,
                line20: part_iii_decision.line20,
                qualification_path: part_iii_decision.path.to_string(),
            },
        };

        let summary = ScheduleASummary {
            total_public_support: format_fixed(current.part_ii.line6),
            total_support: format_fixed(current.part_ii.line11),
            public_support_percentage: format_fixed(current.part_ii.public_support_percentage),
            meets_threshold: current.part_ii.public_support_percentage >= ONE_THIRD_THRESHOLD,
            part_ii_qualifies: part_ii_decision.qualifies(),
            part_ii_qualification_path: part_ii_decision.path.to_string(),
            part_iii_public_support: format_fixed(current.part_iii.line8),
            part_iii_total_support: format_fixed(current.part_iii.line13),
            part_iii_public_support_percentage: format_fixed(
                current.part_iii.public_support_percentage,
            ),
            part_iii_investment_percentage: format_fixed(
                current.part_iii.investment_income_percentage,
            ),
            part_iii_meets_threshold: current.part_iii.public_support_percentage
                > ONE_THIRD_THRESHOLD
                && current.part_iii.investment_income_percentage <= ONE_THIRD_THRESHOLD,
            part_iii_qualifies: part_iii_decision.qualifies(),
            part_iii_qualification_path: part_iii_decision.path.to_string(),
        };

        ScheduleAData {
            organization_name: self.organization_name.to_string(),
            tax_year: self.tax_year,
            part_ii,
            part_iii,
            summary,
        }
    }
}
