use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// PropertyValue – a single TDMS object property
// ---------------------------------------------------------------------------

/// A dynamically-typed property value as stored in a TDMS metadata block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    /// Unsigned 64-bit values that do not fit an `i64`.
    Unsigned(u64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{s}"),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Unsigned(u) => write!(f, "{u}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl PropertyValue {
    /// Try to interpret the value as an `f64` (e.g. for `wf_increment`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Unsigned(u) => Some(*u as f64),
            _ => None,
        }
    }
}

/// Property name → value, ordered by name for stable display.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Name of the property holding the sample spacing in seconds.
pub const SAMPLE_SPACING_PROPERTY: &str = "wf_increment";

// ---------------------------------------------------------------------------
// SampleSeries – one channel read from one file
// ---------------------------------------------------------------------------

/// Amplitudes of one channel from one file, uniformly spaced and starting at t = 0.
#[derive(Debug, Clone)]
pub struct SampleSeries {
    /// Where the samples came from (file name), used for legends.
    pub label: String,
    /// Amplitude values.
    pub values: Vec<f64>,
    /// Seconds per sample.
    pub spacing: f64,
    /// All properties attached to the channel.
    pub properties: Properties,
}

impl SampleSeries {
    /// Local time axis: `t_k = k * spacing`.
    pub fn time_track(&self) -> Vec<f64> {
        (0..self.values.len())
            .map(|k| k as f64 * self.spacing)
            .collect()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_track_starts_at_zero() {
        let series = SampleSeries {
            label: "a.tdms".into(),
            values: vec![0.0; 4],
            spacing: 0.5,
            properties: Properties::new(),
        };
        assert_eq!(series.time_track(), vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn numeric_properties_convert() {
        assert_eq!(PropertyValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(PropertyValue::Float(0.25).as_f64(), Some(0.25));
        assert_eq!(PropertyValue::String("x".into()).as_f64(), None);
    }

    #[test]
    fn properties_serialize_as_plain_json() {
        let mut props = Properties::new();
        props.insert("unit_string".into(), PropertyValue::String("V".into()));
        props.insert(SAMPLE_SPACING_PROPERTY.into(), PropertyValue::Float(0.001));
        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(json, r#"{"unit_string":"V","wf_increment":0.001}"#);
    }
}
