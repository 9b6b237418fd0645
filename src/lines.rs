use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Line identifiers of Schedule A Parts II and III.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum LineId {
    #[serde(rename = "part_ii.line1")]
    PartIILine1,
    #[serde(rename = "part_ii.line2")]
    PartIILine2,
    #[serde(rename = "part_ii.line3")]
    PartIILine3,
    #[serde(rename = "part_ii.line4")]
    PartIILine4,
    #[serde(rename = "part_ii.line5")]
    PartIILine5,
    #[serde(rename = "part_ii.line6")]
    PartIILine6,
    #[serde(rename = "part_ii.line7")]
    PartIILine7,
    #[serde(rename = "part_ii.line8")]
    PartIILine8,
    #[serde(rename = "part_ii.line9")]
    PartIILine9,
    #[serde(rename = "part_ii.line10")]
    PartIILine10,
    #[serde(rename = "part_ii.line11")]
    PartIILine11,
    #[serde(rename = "part_ii.line12")]
    PartIILine12,

    #[serde(rename = "part_iii.line1")]
    PartIIILine1,
    #[serde(rename = "part_iii.line2")]
    PartIIILine2,
    #[serde(rename = "part_iii.line3")]
    PartIIILine3,
    #[serde(rename = "part_iii.line4")]
    PartIIILine4,
    #[serde(rename = "part_iii.line5")]
    PartIIILine5,
    #[serde(rename = "part_iii.line6")]
    PartIIILine6,
    #[serde(rename = "part_iii.line7a")]
    PartIIILine7a,
    #[serde(rename = "part_iii.line7b")]
    PartIIILine7b,
    #[serde(rename = "part_iii.line7c")]
    PartIIILine7c,
    #[serde(rename = "part_iii.line8")]
    PartIIILine8,
    #[serde(rename = "part_iii.line9")]
    PartIIILine9,
    #[serde(rename = "part_iii.line10a")]
    PartIIILine10a,
    #[serde(rename = "part_iii.line10b")]
    PartIIILine10b,
    #[serde(rename = "part_iii.line10c")]
    PartIIILine10c,
    #[serde(rename = "part_iii.line11")]
    PartIIILine11,
    #[serde(rename = "part_iii.line12")]
    PartIIILine12,
    #[serde(rename = "part_iii.line13")]
    PartIIILine13,
}

impl LineId {
    /// Lines summed directly from classified amounts (or entered manually).
    pub const BASE_LINES: [LineId; 16] = [
        LineId::PartIILine1,
        LineId::PartIILine2,
        LineId::PartIILine3,
        LineId::PartIILine8,
        LineId::PartIILine9,
        LineId::PartIILine10,
        LineId::PartIILine12,
        LineId::PartIIILine1,
        LineId::PartIIILine2,
        LineId::PartIIILine3,
        LineId::PartIIILine4,
        LineId::PartIIILine5,
        LineId::PartIIILine10a,
        LineId::PartIIILine10b,
        LineId::PartIIILine11,
        LineId::PartIIILine12,
    ];

    /// Per-year lines computed from other lines of the same year.
    pub const DERIVED_LINES: [LineId; 7] = [
        LineId::PartIILine4,
        LineId::PartIILine7,
        LineId::PartIILine11,
        LineId::PartIIILine6,
        LineId::PartIIILine9,
        LineId::PartIIILine10c,
        LineId::PartIIILine13,
    ];

    pub fn is_base(&self) -> bool {
        Self::BASE_LINES.contains(self)
    }

    /// Lines that exist only as a five-year figure (exclusions and public support).
    pub fn is_window_only(&self) -> bool {
        matches!(
            self,
            LineId::PartIILine5
                | LineId::PartIILine6
                | LineId::PartIIILine7a
                | LineId::PartIIILine7b
                | LineId::PartIIILine7c
                | LineId::PartIIILine8
        )
    }

    pub fn part(&self) -> &'static str {
        if self.label().starts_with("III") {
            "Part III"
        } else {
            "Part II"
        }
    }

    fn label(&self) -> &'static str {
        match self {
            LineId::PartIILine1 => "II.1",
            LineId::PartIILine2 => "II.2",
            LineId::PartIILine3 => "II.3",
            LineId::PartIILine4 => "II.4",
            LineId::PartIILine5 => "II.5",
            LineId::PartIILine6 => "II.6",
            LineId::PartIILine7 => "II.7",
            LineId::PartIILine8 => "II.8",
            LineId::PartIILine9 => "II.9",
            LineId::PartIILine10 => "II.10",
            LineId::PartIILine11 => "II.11",
            LineId::PartIILine12 => "II.12",
            LineId::PartIIILine1 => "III.1",
            LineId::PartIIILine2 => "III.2",
            LineId::PartIIILine3 => "III.3",
            LineId::PartIIILine4 => "III.4",
            LineId::PartIIILine5 => "III.5",
            LineId::PartIIILine6 => "III.6",
            LineId::PartIIILine7a => "III.7a",
            LineId::PartIIILine7b => "III.7b",
            LineId::PartIIILine7c => "III.7c",
            LineId::PartIIILine8 => "III.8",
            LineId::PartIIILine9 => "III.9",
            LineId::PartIIILine10a => "III.10a",
            LineId::PartIIILine10b => "III.10b",
            LineId::PartIIILine10c => "III.10c",
            LineId::PartIIILine11 => "III.11",
            LineId::PartIIILine12 => "III.12",
            LineId::PartIIILine13 => "III.13",
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label();
        let number = label.split('.').nth(1).unwrap_or(label);
        write!(f, "{} line {}", self.part(), number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_and_derived_are_disjoint() {
        for line in LineId::DERIVED_LINES {
            assert!(!line.is_base(), "{} should not be a base line", line);
            assert!(!line.is_window_only());
        }
        assert!(LineId::PartIIILine12.is_base());
        assert!(LineId::PartIILine5.is_window_only());
        assert!(!LineId::PartIILine5.is_base());
    }

    #[test]
    fn test_display() {
        assert_eq!(LineId::PartIILine4.to_string(), "Part II line 4");
        assert_eq!(LineId::PartIIILine10a.to_string(), "Part III line 10a");
    }
}
