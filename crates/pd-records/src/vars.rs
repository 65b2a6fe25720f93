//! Reporter Rows
//!
//! One row of model-level measurements, collected per step.

use serde::{Deserialize, Serialize};

/// Model reporter values at a given step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelVars {
    pub step: u64,
    #[serde(rename = "Is Alive")]
    pub is_alive: u32,
    #[serde(rename = "Cooperating")]
    pub cooperating: u32,
    #[serde(rename = "Defecting")]
    pub defecting: u32,
    /// Percentage of alive agents cooperating
    #[serde(rename = "Proportion")]
    pub proportion: f64,
    #[serde(rename = "Altruism")]
    pub altruism: f64,
    #[serde(rename = "Mean Score")]
    pub mean_score: f64,
}

impl ModelVars {
    /// Reporter column names, in export order
    pub const COLUMNS: [&'static str; 6] = [
        "Is Alive",
        "Cooperating",
        "Defecting",
        "Proportion",
        "Altruism",
        "Mean Score",
    ];

    /// Reporter values formatted for a spreadsheet cell, matching `COLUMNS`
    pub fn cells(&self) -> [String; 6] {
        [
            self.is_alive.to_string(),
            self.cooperating.to_string(),
            self.defecting.to_string(),
            format!("{:?}", self.proportion),
            format!("{:?}", self.altruism),
            format!("{:?}", self.mean_score),
        ]
    }

    /// True when every alive agent plays the same move
    pub fn is_unanimous(&self) -> bool {
        self.cooperating == 0 || self.defecting == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_match_columns() {
        let vars = ModelVars {
            step: 3,
            is_alive: 100,
            cooperating: 25,
            defecting: 75,
            proportion: 25.0,
            altruism: 12.5,
            mean_score: 0.0,
        };
        let cells = vars.cells();
        assert_eq!(cells.len(), ModelVars::COLUMNS.len());
        assert_eq!(cells[0], "100");
        assert_eq!(cells[3], "25.0");
        assert_eq!(cells[5], "0.0");
    }

    #[test]
    fn test_unanimous() {
        let mut vars = ModelVars {
            is_alive: 4,
            cooperating: 4,
            ..ModelVars::default()
        };
        assert!(vars.is_unanimous());
        vars.cooperating = 3;
        vars.defecting = 1;
        assert!(!vars.is_unanimous());
    }
}
