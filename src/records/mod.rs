//! Work-item records and the [RecordStore] they are read from.

use crate::errors::EbcResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

mod file;
pub(crate) use file::TomlRecordStore;

/// The value of a single record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Arrays, tables and datetimes. These have no scalar rendering.
    Other(toml::Value),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Other(_) => Ok(()),
        }
    }
}

/// A link from a record to another artifact.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct Relation {
    pub(crate) rel: String,
    pub(crate) url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) attributes: BTreeMap<String, String>,
}

/// A work-item record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Record {
    pub(crate) id: u64,
    /// The declared record type, e.g. `Bug` or `User Story`.
    #[serde(rename = "type")]
    pub(crate) record_type: String,
    #[serde(default)]
    pub(crate) fields: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) relations: Vec<Relation>,
}

/// Storage of work-item records.
#[async_trait]
pub(crate) trait RecordStore: Send + Sync {
    /// Fetches a record with all of its fields expanded.
    async fn get_record(&self, id: u64, project: &str) -> EbcResult<Record>;

    /// Appends `relation` to the record.
    async fn add_relation(&self, id: u64, relation: Relation) -> EbcResult<()>;

    /// Sets a single field of the record.
    async fn set_field(&self, id: u64, field_name: &str, value: FieldValue) -> EbcResult<()>;

    /// Reference names of every field known to the project.
    async fn field_names(&self, project: &str) -> EbcResult<Vec<String>>;

    /// Names of every record type known to the project.
    async fn record_types(&self, project: &str) -> EbcResult<Vec<String>>;
}
