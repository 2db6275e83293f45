//! `style_config` wire codec.
//!
//! The backend stores style configuration as a JSON-stringified blob. Reads may
//! return either that string or an already-decoded object (or null); writes
//! always send the string form. Use with `#[serde(with = "crate::style::blob")]`.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let text = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

/// Serialize an optional style; pair with `skip_serializing_if = "Option::is_none"`.
pub fn serialize_option<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => serialize(inner, serializer),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: DeserializeOwned + Default,
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    decode_value(raw.unwrap_or(Value::Null)).map_err(D::Error::custom)
}

/// Decode a raw `style_config` value (string, object or null).
pub fn decode_value<T>(raw: Value) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    match raw {
        Value::Null => Ok(T::default()),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "null" {
                Ok(T::default())
            } else {
                serde_json::from_str(trimmed)
            }
        }
        other => serde_json::from_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BlockStyle;
    use serde_json::json;

    #[test]
    fn decodes_string_object_and_null() {
        let from_string: BlockStyle =
            decode_value(json!("{\"background_color\":\"#112233\"}")).unwrap();
        let from_object: BlockStyle =
            decode_value(json!({"background_color": "#112233"})).unwrap();
        let from_null: BlockStyle = decode_value(Value::Null).unwrap();
        let from_empty: BlockStyle = decode_value(json!("")).unwrap();

        assert_eq!(from_string.background_color.as_deref(), Some("#112233"));
        assert_eq!(from_object.background_color.as_deref(), Some("#112233"));
        assert!(from_null.background_color.is_none());
        assert!(from_empty.background_color.is_none());
    }

    #[test]
    fn rejects_garbage_string() {
        let result: Result<BlockStyle, _> = decode_value(json!("{not json"));
        assert!(result.is_err());
    }
}
