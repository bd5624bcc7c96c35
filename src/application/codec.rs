//! Encoding of values to and from the strings stored in Redis.
//!
//! Values are stored as compact JSON. Reads of missing keys or empty lists decode to `None` rather
//! than an error, so callers can tell "nothing there" apart from "something unreadable there".

use serde::{de::DeserializeOwned, Serialize};

use crate::models::{QuayError, QuayResult};

/// Serialise a value for storage.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> QuayResult<String> {
    serde_json::to_string(value).map_err(|err| QuayError::Internal(format!("Failed to encode value: {}", err)))
}

/// Deserialise a stored value, if there was one.
pub fn decode<T: DeserializeOwned>(value: Option<&str>) -> QuayResult<Option<T>> {
    match value {
        Some(s) => Ok(Some(serde_json::from_str(s)?)),
        None => Ok(None),
    }
}

/// Deserialise a list of stored values, failing on the first that can't be read.
pub fn decode_all<T: DeserializeOwned>(values: &[String]) -> QuayResult<Vec<T>> {
    let mut decoded = Vec::with_capacity(values.len());
    for value in values {
        decoded.push(serde_json::from_str(value)?);
    }
    Ok(decoded)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::job::Payload;
    use serde_json::json;

    #[test]
    fn payload_roundtrip() {
        let payloads = vec![
            Payload::new("Mailer", vec![json!("a@x.com")]),
            Payload::new("Noop", Vec::new()),
            Payload::new(
                "Report",
                vec![json!(-17), json!({"b": [1, 2, {"c": null}], "a": "ü"}), json!([[], {}])],
            ),
        ];

        for payload in payloads {
            let encoded = encode(&payload).unwrap();
            let decoded: Option<Payload> = decode(Some(&encoded)).unwrap();
            assert_eq!(decoded, Some(payload));
        }
    }

    #[test]
    fn compact_and_key_ordered() {
        let value = json!({"b": 1, "a": [1, "two"]});
        assert_eq!(encode(&value).unwrap(), r#"{"a":[1,"two"],"b":1}"#);
    }

    #[test]
    fn absent_decodes_to_none() {
        let decoded: Option<Payload> = decode(None).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn malformed_is_decode_error() {
        match decode::<Payload>(Some("{\"class\":")) {
            Err(QuayError::Decode(_)) => (),
            other => panic!("expected decode error, got {:?}", other),
        }

        match decode::<Payload>(Some("[1, 2]")) {
            Err(QuayError::Decode(_)) => (),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn decode_list() {
        let values = vec![r#"{"class":"A","args":[]}"#.to_owned(), r#"{"class":"B","args":[1]}"#.to_owned()];
        let decoded: Vec<Payload> = decode_all(&values).unwrap();
        assert_eq!(decoded, vec![Payload::new("A", Vec::new()), Payload::new("B", vec![json!(1)])]);

        let values = vec![r#"{"class":"A"}"#.to_owned(), "nope".to_owned()];
        assert!(decode_all::<Payload>(&values).is_err());
    }
}
