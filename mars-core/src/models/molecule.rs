use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Segment;
use crate::utils::nan_columns;

///
/// One molecule record: its numeric trace columns, scalar parameters
/// (region markers such as `start`, `end`, `bg_start`, `bg_end`) and computed segment tables.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub uid: String,
    #[serde(default, with = "nan_columns")]
    pub columns: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub segment_tables: BTreeMap<String, Vec<Segment>>,
}

impl Molecule {
    pub fn new(uid: impl Into<String>) -> Self {
        Molecule {
            uid: uid.into(),
            ..Default::default()
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_segments(mut self, table: impl Into<String>, segments: Vec<Segment>) -> Self {
        self.segment_tables.insert(table.into(), segments);
        self
    }
}
