//! Serde helper for PATCH payloads where `null` and "field omitted" mean different things.
//!
//! Use with `#[serde(default, deserialize_with = "crate::nullable::deserialize")]` on an
//! `Option<Option<T>>` field: omitted → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::deserialize")]
        nisn: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_omitted_null_and_value() {
        let omitted: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(omitted.nisn, None);

        let null: Patch = serde_json::from_str(r#"{"nisn":null}"#).unwrap();
        assert_eq!(null.nisn, Some(None));

        let value: Patch = serde_json::from_str(r#"{"nisn":"0012345678"}"#).unwrap();
        assert_eq!(value.nisn, Some(Some("0012345678".into())));
    }
}
