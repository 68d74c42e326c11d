// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value and result types carried from a probe query to the publish sink.

use std::fmt::Display;

use serde::Serialize;

use crate::probe::ProbeError;

/// A single measured value for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MetricValue {
    /// Textual information (names, descriptions, addresses).
    Text(String),
    /// A fractional measurement (percentages, temperatures, load averages).
    Decimal(f64),
    /// A non-negative integral measurement (core counts, packet counts, sizes).
    Count(u64),
}

impl MetricValue {
    /// Returns the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Text(_) => None,
            MetricValue::Decimal(v) => Some(*v),
            MetricValue::Count(v) => Some(*v as f64),
        }
    }

    /// Returns the value as a string slice if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Text(s) => write!(f, "{s}"),
            MetricValue::Decimal(v) => write!(f, "{v}"),
            MetricValue::Count(v) => write!(f, "{v}"),
        }
    }
}

/// The outcome of one refresh attempt for one channel.
///
/// A refresh never yields "nothing": either the probe produced a value, or
/// the result is explicitly unavailable with the reason preserved. This keeps
/// "no information" distinct from any falsy value a consumer might confuse it
/// with.
#[derive(Debug, Clone)]
pub enum MetricResult {
    /// A fresh value was obtained from the probe.
    Value(MetricValue),
    /// No value could be obtained; the reason is kept for diagnostics.
    Unavailable(ProbeError),
}

impl MetricResult {
    /// Returns the contained value, if any.
    pub fn value(&self) -> Option<&MetricValue> {
        match self {
            MetricResult::Value(v) => Some(v),
            MetricResult::Unavailable(_) => None,
        }
    }

    /// Returns `true` if no value was obtained.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, MetricResult::Unavailable(_))
    }
}

impl From<Result<MetricValue, ProbeError>> for MetricResult {
    fn from(result: Result<MetricValue, ProbeError>) -> Self {
        match result {
            Ok(value) => MetricResult::Value(value),
            Err(err) => MetricResult::Unavailable(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_value_accessors() {
        let text = MetricValue::Text("eth0".to_string());
        assert_eq!(text.as_text(), Some("eth0"));
        assert_eq!(text.as_f64(), None);

        let decimal = MetricValue::Decimal(42.5);
        assert_eq!(decimal.as_f64(), Some(42.5));
        assert_eq!(decimal.as_text(), None);

        let count = MetricValue::Count(8);
        assert_eq!(count.as_f64(), Some(8.0));
    }

    #[test]
    fn test_result_from_probe_outcome() {
        let ok: MetricResult = Ok(MetricValue::Count(1)).into();
        assert!(!ok.is_unavailable());
        assert_eq!(ok.value(), Some(&MetricValue::Count(1)));

        let err: MetricResult = Err(ProbeError::DeviceNotFound { index: 3 }).into();
        assert!(err.is_unavailable());
        assert_eq!(err.value(), None);
    }
}
