//! Review form model.
//!
//! The form is built from an extraction, edited by the user and captured as
//! string values at submit time. Numeric coercion is left to the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TaxflowError};
use crate::extraction::{ExtractedData, ReviewField, TAX_REGIME_KEY, TaxRegime};

/// Input step hint carried by every numeric field.
pub const INPUT_STEP: &str = "0.01";

/// One labeled numeric input on the review form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub field: ReviewField,
    pub label: String,
    pub value: String,
}

/// Editable review form: nine numeric inputs plus the regime control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewForm {
    fields: Vec<FormField>,
    tax_regime: TaxRegime,
}

impl ReviewForm {
    /// Renders one input per recognised field, in the fixed order.
    ///
    /// Values come from the extraction, or are empty when absent. The regime
    /// control keeps its default unless the extraction names a regime.
    pub fn from_extraction(data: &ExtractedData) -> Self {
        let fields = ReviewField::ordered()
            .map(|field| FormField {
                field,
                label: field.label(),
                value: data.prefill(field),
            })
            .collect();

        Self {
            fields,
            tax_regime: data.tax_regime().unwrap_or_default(),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn tax_regime(&self) -> TaxRegime {
        self.tax_regime
    }

    /// Current text of a field's input.
    pub fn value(&self, field: ReviewField) -> &str {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    /// Replaces the text of a field's input. The value is stored as typed.
    pub fn set_value(&mut self, field: ReviewField, value: impl Into<String>) {
        if let Some(entry) = self.fields.iter_mut().find(|f| f.field == field) {
            entry.value = value.into();
        }
    }

    /// Same as [`set_value`](Self::set_value) but addressed by wire name.
    pub fn set_value_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = name
            .parse::<ReviewField>()
            .map_err(|_| TaxflowError::UnknownField(name.to_string()))?;
        self.set_value(field, value);
        Ok(())
    }

    pub fn set_regime(&mut self, regime: TaxRegime) {
        self.tax_regime = regime;
    }

    /// Captures every control on the form as a string value.
    pub fn submission(&self) -> ReviewSubmission {
        let mut values = Map::new();
        for entry in &self.fields {
            values.insert(entry.field.name().to_string(), Value::String(entry.value.clone()));
        }
        values.insert(
            TAX_REGIME_KEY.to_string(),
            Value::String(self.tax_regime.to_string()),
        );
        ReviewSubmission(values)
    }
}

/// Reviewed values as submitted: field name to string value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewSubmission(Map<String, Value>);

impl ReviewSubmission {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form_for(value: Value) -> ReviewForm {
        ReviewForm::from_extraction(&serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_one_input_per_field_in_order() {
        let form = form_for(json!({"tds": 5000, "gross_salary": 900000}));

        assert_eq!(form.fields().len(), 9);
        let order: Vec<ReviewField> = form.fields().iter().map(|f| f.field).collect();
        assert_eq!(order, ReviewField::ordered().collect::<Vec<_>>());
        assert_eq!(form.fields()[0].label, "Gross Salary");
        assert_eq!(form.fields()[0].value, "900000");
        assert_eq!(form.value(ReviewField::RentPaid), "");
        assert_eq!(form.value(ReviewField::Tds), "5000");
    }

    #[test]
    fn test_regime_defaults_when_absent() {
        assert_eq!(form_for(json!({})).tax_regime(), TaxRegime::default());
        assert_eq!(
            form_for(json!({"tax_regime": "old"})).tax_regime(),
            TaxRegime::Old
        );
    }

    #[test]
    fn test_edits_flow_into_submission() {
        let mut form = form_for(json!({"gross_salary": 900000}));
        form.set_value(ReviewField::RentPaid, "120000");
        form.set_value_by_name("deduction_80c", "150000").unwrap();
        form.set_regime(TaxRegime::Old);

        let submission = form.submission();
        assert_eq!(serde_json::to_value(&submission).unwrap().as_object().unwrap().len(), 10);
        assert_eq!(submission.get("gross_salary"), Some("900000"));
        assert_eq!(submission.get("rent_paid"), Some("120000"));
        assert_eq!(submission.get("deduction_80c"), Some("150000"));
        assert_eq!(submission.get("hra_received"), Some(""));
        assert_eq!(submission.get("tax_regime"), Some("old"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut form = form_for(json!({}));
        let err = form.set_value_by_name("bonus", "1").unwrap_err();
        assert_eq!(err, TaxflowError::UnknownField("bonus".to_string()));
    }
}
