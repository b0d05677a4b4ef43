//! Serde helpers for `f64` fields that may hold `inf`, `-inf` or `NaN`.
//!
//! JSON has no literal for non-finite numbers and `serde_json` writes them as
//! `null`. Fields using these helpers write finite values as plain numbers and
//! non-finite ones as the strings `"inf"`, `"-inf"` and `"NaN"`.
//!
//! ```
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct Row {
//!     #[serde(with = "contracts::shared::float")]
//!     value: f64,
//! }
//! ```

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// `f64` with the string encoding for non-finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Float(f64);

impl Serialize for Float {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value == f64::INFINITY {
            serializer.serialize_str("inf")
        } else if value == f64::NEG_INFINITY {
            serializer.serialize_str("-inf")
        } else {
            serializer.serialize_f64(value)
        }
    }
}

struct FloatVisitor;

impl<'de> Visitor<'de> for FloatVisitor {
    type Value = Float;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or one of \"inf\", \"-inf\", \"NaN\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Float, E> {
        Ok(Float(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Float, E> {
        Ok(Float(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Float, E> {
        Ok(Float(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Float, E> {
        match v {
            "inf" | "+inf" | "Infinity" => Ok(Float(f64::INFINITY)),
            "-inf" | "-Infinity" => Ok(Float(f64::NEG_INFINITY)),
            "NaN" | "nan" => Ok(Float(f64::NAN)),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for Float {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }
}

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    Float(*value).serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Float::deserialize(deserializer).map(|f| f.0)
}

/// For `Option<f64>`; `None` stays `null`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map(Float).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Float>::deserialize(deserializer)?.map(|f| f.0))
    }
}

/// For `Vec<f64>`.
pub mod seq {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().copied().map(Float))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Ok(Vec::<Float>::deserialize(deserializer)?.into_iter().map(|f| f.0).collect())
    }
}

/// For row-major grids of optional cells (`Vec<Vec<Option<f64>>>`).
pub mod grid {
    use super::*;

    pub fn serialize<S: Serializer>(rows: &[Vec<Option<f64>>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.map(Float)).collect::<Vec<_>>()),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<Option<f64>>>, D::Error> {
        let rows = Vec::<Vec<Option<Float>>>::deserialize(deserializer)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.map(|f| f.0)).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super")]
        value: f64,
        #[serde(with = "super::option")]
        maybe: Option<f64>,
        #[serde(with = "super::seq")]
        values: Vec<f64>,
        #[serde(with = "super::grid")]
        z: Vec<Vec<Option<f64>>>,
    }

    #[test]
    fn test_non_finite_values_survive_json() {
        let sample = Sample {
            value: f64::INFINITY,
            maybe: Some(f64::NEG_INFINITY),
            values: vec![1.5, f64::INFINITY],
            z: vec![vec![None, Some(f64::INFINITY)]],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(
            json,
            r#"{"value":"inf","maybe":"-inf","values":[1.5,"inf"],"z":[[null,"inf"]]}"#
        );
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_nan_and_plain_numbers() {
        let json = r#"{"value":"NaN","maybe":null,"values":[1,2.5],"z":[]}"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert!(sample.value.is_nan());
        assert_eq!(sample.maybe, None);
        assert_eq!(sample.values, vec![1.0, 2.5]);

        assert!(serde_json::from_str::<Sample>(r#"{"value":"big","maybe":null,"values":[],"z":[]}"#).is_err());
    }
}
