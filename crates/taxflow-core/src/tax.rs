//! Tax computation results as returned by the backend.

use serde::{Deserialize, Serialize};

use crate::extraction::TaxRegime;

/// Computed figures for one regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeSummary {
    pub taxable_income: f64,
    pub total_tax: f64,
    pub deductions: f64,
    pub net_tax_payable: f64,
}

/// Raw response of the calculate-tax call.
///
/// Either record may be missing; [`into_comparison`](Self::into_comparison)
/// decides whether there is anything to display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxComputation {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub old_regime: Option<RegimeSummary>,
    #[serde(default)]
    pub new_regime: Option<RegimeSummary>,
}

impl TaxComputation {
    /// Returns the side-by-side comparison, or `None` unless both regimes are present.
    pub fn into_comparison(self) -> Option<TaxComparison> {
        Some(TaxComparison {
            old_regime: self.old_regime?,
            new_regime: self.new_regime?,
        })
    }
}

/// Both regime records, ready for display. Never mutated after receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxComparison {
    pub old_regime: RegimeSummary,
    pub new_regime: RegimeSummary,
}

impl TaxComparison {
    pub fn regime(&self, regime: TaxRegime) -> &RegimeSummary {
        match regime {
            TaxRegime::Old => &self.old_regime,
            TaxRegime::New => &self.new_regime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_response_yields_comparison() {
        let computation: TaxComputation = serde_json::from_value(json!({
            "session_id": "abc",
            "old_regime": {"regime": "old", "taxable_income": 700000.0, "total_tax": 54600.0,
                           "deductions": 200000.0, "net_tax_payable": 44600.0},
            "new_regime": {"regime": "new", "taxable_income": 850000.0, "total_tax": 39000.0,
                           "deductions": 50000.0, "net_tax_payable": 29000.0}
        }))
        .unwrap();

        let comparison = computation.into_comparison().unwrap();
        assert_eq!(comparison.regime(TaxRegime::Old).taxable_income, 700000.0);
        assert_eq!(comparison.regime(TaxRegime::New).net_tax_payable, 29000.0);
    }

    #[test]
    fn test_missing_regime_yields_nothing() {
        let computation: TaxComputation = serde_json::from_value(json!({
            "old_regime": {"taxable_income": 1.0, "total_tax": 0.0,
                           "deductions": 0.0, "net_tax_payable": 0.0}
        }))
        .unwrap();
        assert!(computation.into_comparison().is_none());
        assert!(TaxComputation::default().into_comparison().is_none());
    }
}
