//! Serde helpers keeping NaN intact through JSON, which has no NaN literal.
//!
//! NaN is written as `null` and `null` is read back as NaN.

pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

pub mod nan_columns {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        columns: &BTreeMap<String, Vec<f64>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for (name, values) in columns {
            let values: Vec<Option<f64>> = values
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect();
            map.serialize_entry(name, &values)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<f64>>, D::Error> {
        let raw = BTreeMap::<String, Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
                (name, values)
            })
            .collect())
    }
}

pub mod nan_values {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            values
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) }),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Ok(Vec::<Option<f64>>::deserialize(deserializer)?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }
}
