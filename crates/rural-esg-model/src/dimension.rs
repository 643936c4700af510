// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the three independently scored question groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Environmental,
    Social,
    Governance,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Environmental,
        Dimension::Social,
        Dimension::Governance,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Environmental => "environmental",
            Dimension::Social => "social",
            Dimension::Governance => "governance",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordinal maturity label derived from a dimension's summed score.
/// Ordering is meaningful: REATIVA < NORMATIVA < PROATIVA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "REATIVA")]
    Reativa,
    #[serde(rename = "NORMATIVA")]
    Normativa,
    #[serde(rename = "PROATIVA")]
    Proativa,
}

impl Classification {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Reativa => "REATIVA",
            Classification::Normativa => "NORMATIVA",
            Classification::Proativa => "PROATIVA",
        }
    }

    pub fn parse(input: &str) -> Result<Self, crate::ValidationError> {
        match input {
            "REATIVA" => Ok(Classification::Reativa),
            "NORMATIVA" => Ok(Classification::Normativa),
            "PROATIVA" => Ok(Classification::Proativa),
            other => Err(crate::ValidationError(format!(
                "unknown classification: {other}"
            ))),
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_order_is_reativa_normativa_proativa() {
        assert!(Classification::Reativa < Classification::Normativa);
        assert!(Classification::Normativa < Classification::Proativa);
    }

    #[test]
    fn classification_round_trips_through_its_wire_name() {
        for c in [
            Classification::Reativa,
            Classification::Normativa,
            Classification::Proativa,
        ] {
            assert_eq!(Classification::parse(c.as_str()), Ok(c));
        }
        assert!(Classification::parse("reativa").is_err());
    }

    #[test]
    fn dimension_serializes_lowercase() {
        let v = serde_json::to_value(Dimension::Environmental).expect("serialize");
        assert_eq!(v, serde_json::json!("environmental"));
    }
}
