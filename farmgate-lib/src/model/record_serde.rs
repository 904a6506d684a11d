//! JSON (de)serialization for Record.
//!
//! Records are plain JSON objects. On read, the identity is taken from `id`
//! or, failing that, `_id` (string or integer). On write, null fields are
//! skipped and the identity is emitted as `id` when no field carries it.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Record;
use super::Value;
use super::record::identity_of;

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        if let Some(id) = &self.id
            && !self.fields.contains_key("id")
            && !self.fields.contains_key("_id")
        {
            map.serialize_entry("id", id)?;
        }

        for (key, value) in &self.fields {
            if value.is_null() {
                continue;
            }
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object representing a record")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Record, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut fields: HashMap<String, Value> = HashMap::new();
        while let Some(key) = map.next_key::<String>()? {
            let value: Value = map.next_value()?;
            fields.insert(key, value);
        }

        let id = fields
            .get("id")
            .and_then(identity_of)
            .or_else(|| fields.get("_id").and_then(identity_of));

        Ok(Record {
            resource: String::new(),
            id,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mongo_id() {
        let json = r#"{"_id": "65f0c2", "status": "pending", "amount": 31.95}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.id(), Some("65f0c2"));
        assert_eq!(record.get_string("status").unwrap(), Some("pending"));
        assert_eq!(record.get_float("amount").unwrap(), Some(31.95));
    }

    #[test]
    fn test_deserialize_numeric_id_prefers_id() {
        let json = r#"{"id": 42, "_id": "abc"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id(), Some("42"));
    }

    #[test]
    fn test_serialize_skips_null_and_emits_id() {
        let mut record = Record::new("orders").set("status", "pending").set("notes", Value::Null);
        record.set_id("o-1");

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":\"o-1\""));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(!json.contains("notes"));
    }

    #[test]
    fn test_deserialize_rejects_non_object() {
        assert!(serde_json::from_str::<Record>("[1, 2]").is_err());
    }
}
