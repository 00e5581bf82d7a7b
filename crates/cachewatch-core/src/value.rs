//! Typed metric values and resolution results.

use std::fmt;

/// Declared value type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueType {
    /// Free-form text (status, names, versions).
    String,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Double-precision floating point.
    Double,
}

/// A resolved metric value, tagged with its runtime type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum MetricValue {
    /// Text value.
    Str(String),
    /// 32-bit integer value.
    Int(i32),
    /// 64-bit integer value.
    Long(i64),
    /// Floating point value.
    Double(f64),
}

impl MetricValue {
    /// The zero value of `value_type`: `0`, `0.0`, or the empty string.
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::String => Self::Str(String::new()),
            ValueType::Int => Self::Int(0),
            ValueType::Long => Self::Long(0),
            ValueType::Double => Self::Double(0.0),
        }
    }

    /// Narrow a wide counter into an `Int`, saturating at the `i32` bounds.
    pub fn int_saturating(value: i64) -> Self {
        Self::Int(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// Runtime type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Str(_) => ValueType::String,
            Self::Int(_) => ValueType::Int,
            Self::Long(_) => ValueType::Long,
            Self::Double(_) => ValueType::Double,
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

/// Outcome of computing one metric against a live instance.
///
/// `present == false` means the value could not be produced; `value` then
/// holds the zero value of the declared type and must not be forwarded as
/// a real reading.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MetricResult {
    /// The computed (or defaulted) value.
    pub value: MetricValue,
    /// Whether `value` is an actual reading.
    pub present: bool,
}

impl MetricResult {
    /// A present reading.
    pub fn present(value: impl Into<MetricValue>) -> Self {
        Self {
            value: value.into(),
            present: true,
        }
    }

    /// An unavailable reading of the given type.
    pub fn absent(value_type: ValueType) -> Self {
        Self {
            value: MetricValue::zero(value_type),
            present: false,
        }
    }

    /// A present reading, or a present zero when the backing component is missing.
    pub fn or_zero(value: Option<MetricValue>, value_type: ValueType) -> Self {
        Self::present(value.unwrap_or_else(|| MetricValue::zero(value_type)))
    }
}
