//! Plugin-defined record types and their mapping to the generic payload.
//!
//! The platform moves plugin records as JSON-object strings and never depends
//! on a concrete record type. A record only has to satisfy [`Definition`]:
//! export itself to a string-keyed map and rebuild itself from one. Every
//! `serde` type gets the capability for free.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::messages::common::{PluginDefinedObject, Repository, Snapshot, SourceConfig};

/// A string-keyed generic payload.
pub type Dict = serde_json::Map<String, Value>;

/// Errors moving a definition in or out of its generic payload.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("malformed definition payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("definition payload must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// Bidirectional mapping between a plugin record and a generic payload.
///
/// For any value `v`, `Self::from_dict(v.to_dict()?)` must equal `v`.
pub trait Definition: Sized {
    /// Export this record as a string-keyed map.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the record cannot be represented as a
    /// JSON object.
    fn to_dict(&self) -> Result<Dict, DefinitionError>;

    /// Rebuild a record from a string-keyed map.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the map does not describe a valid record.
    fn from_dict(dict: Dict) -> Result<Self, DefinitionError>;
}

impl<T> Definition for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_dict(&self) -> Result<Dict, DefinitionError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(DefinitionError::NotAnObject {
                found: kind_of(&other),
            }),
        }
    }

    fn from_dict(dict: Dict) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_value(Value::Object(dict))?)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The five record types a plugin defines.
///
/// A plugin names its generated (or hand-written) definitions once; the
/// registries use them to decode requests and encode results.
pub trait Schema: 'static {
    type Repository: Definition;
    type SourceConfig: Definition;
    type Snapshot: Definition;
    type LinkedSource: Definition;
    type VirtualSource: Definition;
}

// ---------------------------------------------------------------------------
// PluginDefinedObject helpers
// ---------------------------------------------------------------------------

impl PluginDefinedObject {
    /// Wrap a definition as its JSON-object string.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the definition cannot be exported.
    pub fn encode<T: Definition>(definition: &T) -> Result<Self, DefinitionError> {
        let dict = definition.to_dict()?;
        Ok(Self {
            json: serde_json::to_string(&dict)?,
        })
    }

    /// Parse the JSON-object string into a definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if `json` is not a JSON object or does not
    /// describe a valid `T`.
    pub fn decode<T: Definition>(&self) -> Result<T, DefinitionError> {
        match serde_json::from_str::<Value>(&self.json)? {
            Value::Object(dict) => T::from_dict(dict),
            other => Err(DefinitionError::NotAnObject {
                found: kind_of(&other),
            }),
        }
    }

    /// Parse the JSON-object string into a generic map.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if `json` is not a JSON object.
    pub fn dict(&self) -> Result<Dict, DefinitionError> {
        self.decode()
    }
}

/// Wire records that only wrap a `parameters` payload.
macro_rules! parameter_record {
    ($($record:ident),* $(,)?) => {
        $(
            impl $record {
                /// Wrap a definition as this record's parameters.
                ///
                /// # Errors
                ///
                /// Returns [`DefinitionError`] if the definition cannot be exported.
                pub fn from_definition<T: Definition>(definition: &T) -> Result<Self, DefinitionError> {
                    Ok(Self {
                        parameters: PluginDefinedObject::encode(definition)?,
                    })
                }

                /// Decode this record's parameters into a definition.
                ///
                /// # Errors
                ///
                /// Returns [`DefinitionError`] if the parameters do not describe a `T`.
                pub fn to_definition<T: Definition>(&self) -> Result<T, DefinitionError> {
                    self.parameters.decode()
                }
            }
        )*
    };
}

parameter_record!(Repository, SourceConfig, Snapshot);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct RepositoryDefinition {
        name: String,
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        install_path: Option<String>,
        port: u16,
        tags: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct NotARecord(u32);

    #[test]
    fn encode_produces_json_object_string() {
        let definition = RepositoryDefinition {
            name: "pg".into(),
            version: "15.4".into(),
            install_path: None,
            port: 5432,
            tags: vec![],
        };
        let object = PluginDefinedObject::encode(&definition).unwrap();
        let parsed: Value = serde_json::from_str(&object.json).unwrap();
        assert_eq!(
            parsed,
            json!({ "name": "pg", "version": "15.4", "port": 5432, "tags": [] })
        );
    }

    #[test]
    fn decode_rejects_non_object_payload() {
        let object = PluginDefinedObject {
            json: "[1, 2, 3]".into(),
        };
        let err = object.decode::<RepositoryDefinition>().unwrap_err();
        assert!(matches!(err, DefinitionError::NotAnObject { found: "an array" }));
    }

    #[test]
    fn decode_rejects_missing_required_field() {
        let object = PluginDefinedObject {
            json: r#"{"name": "pg"}"#.into(),
        };
        let err = object.decode::<RepositoryDefinition>().unwrap_err();
        assert!(matches!(err, DefinitionError::Json(_)));
    }

    #[test]
    fn non_object_record_cannot_export() {
        let err = NotARecord(7).to_dict().unwrap_err();
        assert!(matches!(err, DefinitionError::NotAnObject { found: "a number" }));
    }

    #[test]
    fn generic_map_is_itself_a_definition() {
        let object = PluginDefinedObject {
            json: r#"{"version": "1.0"}"#.into(),
        };
        let dict = object.dict().unwrap();
        assert_eq!(dict.get("version"), Some(&json!("1.0")));
    }

    #[test]
    fn parameter_records_wrap_definitions() {
        let snapshot = Snapshot::from_definition(&json!({ "lsn": "0/16B3748" })).unwrap();
        assert_eq!(snapshot.parameters.json, r#"{"lsn":"0/16B3748"}"#);

        let dict: Dict = snapshot.to_definition().unwrap();
        assert_eq!(dict.get("lsn"), Some(&json!("0/16B3748")));

        let err = Repository::default().to_definition::<Dict>().unwrap_err();
        assert!(matches!(err, DefinitionError::Json(_)));
    }

    prop_compose! {
        fn arbitrary_repository()(
            name in "[a-zA-Z0-9_\\-]{0,32}",
            version in "[0-9]{1,2}\\.[0-9]{1,2}",
            install_path in proptest::option::of("/[a-z/]{0,40}"),
            port in any::<u16>(),
            tags in prop::collection::vec("[a-z]{1,8}", 0..5),
        ) -> RepositoryDefinition {
            RepositoryDefinition { name, version, install_path, port, tags }
        }
    }

    proptest! {
        /// Export then import yields the original value.
        #[test]
        fn dict_round_trip(definition in arbitrary_repository()) {
            let dict = definition.to_dict().unwrap();
            prop_assert_eq!(RepositoryDefinition::from_dict(dict).unwrap(), definition.clone());

            let object = PluginDefinedObject::encode(&definition).unwrap();
            prop_assert_eq!(object.decode::<RepositoryDefinition>().unwrap(), definition);
        }
    }
}
