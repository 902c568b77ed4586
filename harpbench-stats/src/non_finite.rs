//! Serde helpers for floats that may be NaN or infinite.
//!
//! JSON has no literal for non-finite numbers and `serde_json` writes them as
//! `null`, which cannot be read back into an `f64`. Finite values stay plain
//! numbers; NaN and the infinities are written as the strings `"NaN"`, `"inf"`
//! and `"-inf"`.
//!
//! Use with `#[serde(with = "harpbench_stats::non_finite")]` on an `f64`
//! field, or `non_finite::seq` on a `Vec<f64>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Special(String),
}

impl From<f64> for Repr {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Repr::Number(value)
        } else {
            Repr::Special(value.to_string())
        }
    }
}

impl Repr {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Repr::Number(v) => Ok(v),
            Repr::Special(s) => s
                .parse()
                .map_err(|_| E::custom(format!("invalid float literal: {s:?}"))),
        }
    }
}

/// Serialize one float
pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    Repr::from(*value).serialize(serializer)
}

/// Deserialize one float
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Repr::deserialize(deserializer)?.into_f64()
}

/// Same encoding for a sequence of floats
pub mod seq {
    use super::Repr;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a sample
    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&Repr::from(*value))?;
        }
        seq.end()
    }

    /// Deserialize a sample
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Repr>::deserialize(deserializer)?
            .into_iter()
            .map(Repr::into_f64)
            .collect()
    }
}
