//! A [RecordStore] backed by a single TOML file.

use super::{FieldValue, Record, RecordStore, Relation};
use crate::{
    constants::{ID_FIELD, SYSTEM_FIELDS, TYPE_FIELD},
    errors::{EbcError, EbcResult},
};
use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

/// On-disk layout of the records file.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RecordsFile {
    #[serde(default)]
    records: Vec<Record>,
}

/// Records kept in a TOML file, read and rewritten on every operation.
#[derive(Debug)]
pub(crate) struct TomlRecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TomlRecordStore {
    /// Creates a store over the file at `path`. A missing file holds no records.
    pub(crate) fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> EbcResult<RecordsFile> {
        if !self.path.exists() {
            return Ok(RecordsFile::default());
        }
        Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?)
    }

    fn persist(&self, file: &RecordsFile) -> EbcResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(file)?)?;
        Ok(())
    }

    /// Applies `f` to record `id` and writes the file back.
    fn modify<F>(&self, id: u64, f: F) -> EbcResult<()>
    where
        F: FnOnce(&mut Record),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| EbcError::Store(format!("Record store lock poisoned: {e}")))?;

        let mut file = self.load()?;
        let record = file
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EbcError::RecordNotFound(id))?;
        f(record);
        self.persist(&file)
    }
}

#[async_trait]
impl RecordStore for TomlRecordStore {
    async fn get_record(&self, id: u64, _project: &str) -> EbcResult<Record> {
        let mut record = self
            .load()?
            .records
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(EbcError::RecordNotFound(id))?;

        let id = i64::try_from(record.id)
            .map_err(|_| EbcError::Store(format!("Record id {} out of range", record.id)))?;
        record
            .fields
            .entry(ID_FIELD.to_string())
            .or_insert(FieldValue::Integer(id));
        record
            .fields
            .entry(TYPE_FIELD.to_string())
            .or_insert_with(|| FieldValue::Text(record.record_type.clone()));
        Ok(record)
    }

    async fn add_relation(&self, id: u64, relation: Relation) -> EbcResult<()> {
        self.modify(id, |record| record.relations.push(relation))
    }

    async fn set_field(&self, id: u64, field_name: &str, value: FieldValue) -> EbcResult<()> {
        self.modify(id, |record| {
            record.fields.insert(field_name.to_string(), value);
        })
    }

    async fn field_names(&self, _project: &str) -> EbcResult<Vec<String>> {
        let file = self.load()?;
        Ok(SYSTEM_FIELDS
            .iter()
            .map(|f| f.to_string())
            .chain(file.records.into_iter().flat_map(|r| r.fields.into_keys()))
            .sorted()
            .dedup()
            .collect())
    }

    async fn record_types(&self, _project: &str) -> EbcResult<Vec<String>> {
        let file = self.load()?;
        Ok(file
            .records
            .into_iter()
            .map(|r| r.record_type)
            .sorted()
            .dedup()
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::TomlRecordStore;
    use crate::{
        errors::EbcError,
        records::{FieldValue, RecordStore, Relation},
    };

    const RECORDS: &str = r#"
[[records]]
id = 42
type = "Bug"

[records.fields]
"System.Title" = "Fix bug #1"
"Custom.Points" = 3
"System.Tags" = ["a", "b"]

[[records]]
id = 7
type = "User Story"
"#;

    fn store() -> (tempfile::TempDir, TomlRecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.toml");
        std::fs::write(&path, RECORDS).unwrap();
        (dir, TomlRecordStore::new(path))
    }

    #[tokio::test]
    async fn exposes_system_fields() {
        let (_dir, store) = store();
        let record = store.get_record(42, "proj").await.unwrap();

        assert_eq!(record.record_type, "Bug");
        assert_eq!(record.fields["System.Id"], FieldValue::Integer(42));
        assert_eq!(record.fields["System.WorkItemType"], FieldValue::Text("Bug".into()));
        assert_eq!(record.fields["Custom.Points"], FieldValue::Integer(3));
    }

    #[tokio::test]
    async fn composite_fields_do_not_break_parsing() {
        let (_dir, store) = store();
        let record = store.get_record(42, "proj").await.unwrap();
        assert_eq!(
            record.fields["System.Tags"],
            FieldValue::Other(toml::Value::Array(vec!["a".into(), "b".into()]))
        );
        assert_eq!(record.fields["System.Tags"].to_string(), "");

        // Other records in the same file stay readable.
        assert_eq!(store.get_record(7, "proj").await.unwrap().record_type, "User Story");
    }

    #[tokio::test]
    async fn missing_record_is_an_error() {
        let (_dir, store) = store();
        let err = store.get_record(1, "proj").await.unwrap_err();
        assert!(matches!(err, EbcError::RecordNotFound(1)));
    }

    #[tokio::test]
    async fn persists_relations_and_fields() {
        let (_dir, store) = store();
        let relation = Relation {
            rel: "ArtifactLink".to_string(),
            url: "vstfs:///Git/Ref/x".to_string(),
            attributes: Default::default(),
        };
        store.add_relation(7, relation.clone()).await.unwrap();
        store
            .set_field(7, "System.State", FieldValue::Text("Active".into()))
            .await
            .unwrap();

        let record = store.get_record(7, "proj").await.unwrap();
        assert_eq!(record.relations, vec![relation]);
        assert_eq!(record.fields["System.State"], FieldValue::Text("Active".into()));
    }

    #[tokio::test]
    async fn lists_fields_and_types() {
        let (_dir, store) = store();
        let fields = store.field_names("proj").await.unwrap();
        assert!(fields.contains(&"Custom.Points".to_string()));
        assert!(fields.contains(&"System.Title".to_string()));
        assert_eq!(
            store.record_types("proj").await.unwrap(),
            vec!["Bug".to_string(), "User Story".to_string()]
        );
    }
}
