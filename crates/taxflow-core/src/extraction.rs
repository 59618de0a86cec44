//! Extracted salary-slip data and the fixed set of reviewable fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::error::TaxflowError;

/// Key under which the extraction carries the regime selection.
pub const TAX_REGIME_KEY: &str = "tax_regime";

/// The nine numeric fields shown on the review form, in rendering order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, AsRefStr,
    EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewField {
    GrossSalary,
    BasicSalary,
    HraReceived,
    RentPaid,
    #[serde(rename = "deduction_80c")]
    #[strum(serialize = "deduction_80c")]
    Deduction80c,
    #[serde(rename = "deduction_80d")]
    #[strum(serialize = "deduction_80d")]
    Deduction80d,
    StandardDeduction,
    ProfessionalTax,
    Tds,
}

impl ReviewField {
    /// All fields in the order the review form renders them.
    pub fn ordered() -> impl Iterator<Item = ReviewField> {
        Self::iter()
    }

    /// Wire name of the field (`gross_salary`, `deduction_80c`, ...).
    pub fn name(&self) -> &str {
        self.as_ref()
    }

    /// Human-readable label derived from the wire name.
    pub fn label(&self) -> String {
        field_label(self.name())
    }
}

impl std::fmt::Display for ReviewField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds a label from a field name: underscores become spaces and the first
/// character of every word is upper-cased. The rest of each word is kept as is,
/// so `deduction_80c` becomes `Deduction 80c`.
pub fn field_label(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The two tax regimes compared side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaxRegime {
    Old,
    #[default]
    New,
}

impl TaxRegime {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

impl std::fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaxRegime {
    type Err = TaxflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(Self::Old),
            "new" => Ok(Self::New),
            _ => Err(TaxflowError::UnknownRegime(s.to_string())),
        }
    }
}

/// Field values the backend extracted from an uploaded document.
///
/// The mapping is kept verbatim, including keys the client does not know
/// about, because the whole extraction is sent back as chat context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedData(Map<String, Value>);

impl ExtractedData {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Raw value for a key, if the extraction carried one.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Text used to pre-fill the input for `field`.
    ///
    /// Absent and `null` values yield an empty string so the field still
    /// renders as an empty editable input.
    pub fn prefill(&self, field: ReviewField) -> String {
        self.get(field.name()).map(display_value).unwrap_or_default()
    }

    /// Regime selection carried by the extraction, if it names a known regime.
    pub fn tax_regime(&self) -> Option<TaxRegime> {
        self.get(TAX_REGIME_KEY)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }
}

impl From<Map<String, Value>> for ExtractedData {
    fn from(values: Map<String, Value>) -> Self {
        Self(values)
    }
}

/// Renders a JSON value the way it would appear in a text input.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display drops a trailing ".0"
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
