//! # Input Schema
//!
//! Typed process-description records with explicit optional fields.
//!
//! The upstream pipeline hands the builder a JSON object map of process
//! descriptions. Each record is parsed into the types here before any
//! entity is created; unknown keys are ignored, recognized keys with the
//! wrong shape degrade to `None` (logged) instead of failing the whole
//! record. Scalars that may arrive as numbers or number strings go
//! through [`NumOrStr`].

use serde::{Deserialize, Deserializer};

/// A scalar that may arrive as a JSON number or as a number string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumOrStr {
    Num(f64),
    Str(String),
}

impl NumOrStr {
    /// The numeric value, if it parses and is finite.
    ///
    /// No lenient casting beyond string parsing: `NaN` and infinities are
    /// rejected the same as garbage text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumOrStr::Num(n) => Some(*n),
            NumOrStr::Str(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

/// Deserialize a field tolerantly: a value of the wrong shape becomes
/// `None` rather than an error, matching the skip-and-continue policy for
/// sub-records.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!(error = %e, "malformed sub-record ignored");
            Ok(None)
        }
    }
}

// =============================================================================
// PROCESS DESCRIPTION
// =============================================================================

/// One named process description from the caller's mapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessSpec {
    #[serde(rename = "@id", alias = "id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub process_type: Option<String>,
    /// A bare string is treated as a location code with no identifier.
    #[serde(deserialize_with = "lenient")]
    pub location: Option<LocationSpec>,
    #[serde(deserialize_with = "lenient")]
    pub process_documentation: Option<DocumentationSpec>,
    pub dq_entry: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub dq_system: Option<DqSystemSpec>,
    #[serde(deserialize_with = "lenient")]
    pub exchange_dq_system: Option<DqSystemSpec>,
    /// Parsed entry by entry so one malformed exchange cannot sink the
    /// rest of the list.
    pub exchanges: Vec<serde_json::Value>,
}

/// Location input: either a structured record or just a code string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocationSpec {
    Record(LocationRecord),
    Code(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationRecord {
    #[serde(rename = "@id", alias = "id")]
    pub id: Option<String>,
    /// The location code (e.g. a region acronym).
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

/// Documentation sub-record: flat descriptive fields plus nested actor
/// and source references.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentationSpec {
    pub time_description: Option<String>,
    pub technology_description: Option<String>,
    pub data_collection_description: Option<String>,
    pub completeness_description: Option<String>,
    pub data_selection_description: Option<String>,
    pub review_details: Option<String>,
    pub data_treatment_description: Option<String>,
    pub inventory_method_description: Option<String>,
    pub modeling_constants_description: Option<String>,
    pub sampling_description: Option<String>,
    pub restrictions_description: Option<String>,
    pub copyright: Option<bool>,
    pub intended_application: Option<String>,
    pub project_description: Option<String>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub reviewer: Option<String>,
    pub data_documentor: Option<String>,
    pub data_generator: Option<String>,
    pub data_set_owner: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub publication: Option<SourceSpec>,
    pub sources: Vec<serde_json::Value>,
    // Data-quality keys may live here instead of on the process record.
    pub dq_entry: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub dq_system: Option<DqSystemSpec>,
    #[serde(deserialize_with = "lenient")]
    pub exchange_dq_system: Option<DqSystemSpec>,
}

/// Source input record. Keys are capitalized in the upstream tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceSpec {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<CategorySpec>,
    #[serde(rename = "Url")]
    pub url: Option<String>,
    #[serde(rename = "Version")]
    pub version: Option<String>,
    #[serde(rename = "TextReference")]
    pub text_reference: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<NumOrStr>,
}

/// Category input: a path string or a list of path segments.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategorySpec {
    Path(String),
    Segments(Vec<String>),
}

impl CategorySpec {
    /// The forward-slash-separated category path.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            CategorySpec::Path(p) => p.clone(),
            CategorySpec::Segments(s) => s.join("/"),
        }
    }
}

/// Data-quality system reference input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DqSystemSpec {
    #[serde(rename = "@id", alias = "id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

// =============================================================================
// EXCHANGES
// =============================================================================

/// One exchange entry of a process description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExchangeSpec {
    pub input: bool,
    pub avoided_product: bool,
    pub quantitative_reference: bool,
    pub amount: Option<NumOrStr>,
    #[serde(deserialize_with = "lenient")]
    pub unit: Option<UnitSpec>,
    #[serde(deserialize_with = "lenient")]
    pub flow: Option<FlowSpec>,
    #[serde(deserialize_with = "lenient")]
    pub uncertainty: Option<UncertaintySpec>,
    /// A nested process description; resolved recursively.
    pub provider: Option<serde_json::Value>,
    pub dq_entry: Option<String>,
    pub comment: Option<String>,
}

/// Unit input: a name string or a record with a `name` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UnitSpec {
    Record(UnitRecord),
    Name(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UnitRecord {
    pub name: Option<String>,
}

impl UnitSpec {
    /// The unit name, if one was supplied.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            UnitSpec::Name(n) => Some(n.as_str()),
            UnitSpec::Record(r) => r.name.as_deref(),
        }
    }
}

/// Flow input record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowSpec {
    #[serde(rename = "@id", alias = "id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub flow_type: Option<String>,
}

/// Uncertainty input record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UncertaintySpec {
    pub distribution_type: Option<String>,
    pub geom_mean: Option<NumOrStr>,
    pub geom_sd: Option<NumOrStr>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn num_or_str_parses_number_strings() {
        let n: NumOrStr = serde_json::from_value(json!("3.2")).expect("parse");
        assert_eq!(n.as_f64(), Some(3.2));
        let n: NumOrStr = serde_json::from_value(json!(2.5)).expect("parse");
        assert_eq!(n.as_f64(), Some(2.5));
    }

    #[test]
    fn num_or_str_rejects_garbage_and_nan() {
        let n: NumOrStr = serde_json::from_value(json!("not a number")).expect("parse");
        assert_eq!(n.as_f64(), None);
        let n: NumOrStr = serde_json::from_value(json!("NaN")).expect("parse");
        assert_eq!(n.as_f64(), None);
    }

    #[test]
    fn location_accepts_bare_string() {
        let spec: ProcessSpec =
            serde_json::from_value(json!({"name": "p", "location": "RFCW"})).expect("parse");
        let code = match spec.location {
            Some(LocationSpec::Code(c)) => Some(c),
            _ => None,
        };
        assert_eq!(code.as_deref(), Some("RFCW"));
    }

    #[test]
    fn location_accepts_record() {
        let spec: ProcessSpec = serde_json::from_value(
            json!({"location": {"name": "US", "latitude": 39.8, "longitude": -98.6}}),
        )
        .expect("parse");
        let record = match spec.location {
            Some(LocationSpec::Record(r)) => Some(r),
            _ => None,
        };
        let record = record.expect("structured location");
        assert_eq!(record.name.as_deref(), Some("US"));
        assert_eq!(record.latitude, Some(39.8));
    }

    #[test]
    fn malformed_sub_record_degrades_to_none() {
        let spec: ProcessSpec =
            serde_json::from_value(json!({"name": "p", "location": 42})).expect("parse");
        assert!(spec.location.is_none());
    }

    #[test]
    fn source_category_joins_segments() {
        let c: CategorySpec =
            serde_json::from_value(json!(["a", "b", "c"])).expect("parse");
        assert_eq!(c.to_path(), "a/b/c");
        let c: CategorySpec = serde_json::from_value(json!("x/y")).expect("parse");
        assert_eq!(c.to_path(), "x/y");
    }

    #[test]
    fn exchange_parses_scenario_shape() {
        let e: ExchangeSpec = serde_json::from_value(json!({
            "input": true,
            "amount": 2.5,
            "unit": "MJ",
            "flow": {"name": "fuel", "category": "21: Mining"},
            "uncertainty": {
                "distributionType": "Logarithmic Normal Distribution",
                "geomMean": "3.2",
                "geomSd": "1.1"
            }
        }))
        .expect("parse");
        assert!(e.input);
        assert_eq!(e.unit.as_ref().and_then(|u| u.name()), Some("MJ"));
        assert_eq!(
            e.flow.as_ref().and_then(|f| f.name.as_deref()),
            Some("fuel")
        );
        let u = e.uncertainty.expect("uncertainty");
        assert_eq!(u.geom_mean.and_then(|g| g.as_f64()), Some(3.2));
    }
}
