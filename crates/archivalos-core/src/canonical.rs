// Copyright (c) 2026 Joseph Verdicchio and ArchivalOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{ArchivalOSError, ArchivalOSResult};

pub fn sha256_hex(data: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(data);
    hex::encode(h.finalize())
}

/// First 16 hex characters of the SHA-256 digest.
pub fn hash16(data: &[u8]) -> String {
    let mut digest = sha256_hex(data);
    digest.truncate(16);
    digest
}

/// Canonical JSON bytes: recursively sorted keys, compact separators,
/// ASCII-safe string encoding. This is the one fixed serialization
/// convention; both the commitment payload and the run records go through
/// it, so two serializations of equal values are equal byte sequences on
/// every platform.
pub fn canonical_json_bytes(v: &impl Serialize) -> ArchivalOSResult<Vec<u8>> {
    let value =
        serde_json::to_value(v).map_err(|e| ArchivalOSError::Artifact(e.to_string()))?;
    let sorted = sort_json(value);
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    sorted
        .serialize(&mut ser)
        .map_err(|e| ArchivalOSError::Artifact(e.to_string()))?;
    Ok(out)
}

fn sort_json(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, val) in entries {
                sorted.insert(k, sort_json(val));
            }
            Value::Object(sorted)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(sort_json).collect()),
        other => other,
    }
}

/// Compact formatter that escapes every non-ASCII character as `\uXXXX`
/// (surrogate pairs above the BMP). Fragments arrive with quotes,
/// backslashes and control characters already routed to the escape path,
/// so only the ASCII range check is needed here.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bytes_stable_regardless_of_insertion_order() {
        let a: Value = json!({"z":1,"a":2,"nested":{"y":true,"b":[3,{"k":1,"c":2}]}});
        let b: Value = json!({"nested":{"b":[3,{"c":2,"k":1}],"y":true},"a":2,"z":1});
        assert_eq!(
            canonical_json_bytes(&a).expect("json a"),
            canonical_json_bytes(&b).expect("json b")
        );
    }

    #[test]
    fn canonical_bytes_are_compact_and_sorted() {
        let v: Value = json!({"b": 2, "a": [1.5, 1.6], "c": null});
        let bytes = canonical_json_bytes(&v).expect("canonical");
        assert_eq!(bytes, br#"{"a":[1.5,1.6],"b":2,"c":null}"#);
    }

    #[test]
    fn non_ascii_is_escaped() {
        let v: Value = json!({"note": "µ-strain σ=1", "emoji": "🜂"});
        let bytes = canonical_json_bytes(&v).expect("canonical");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.is_ascii());
        assert!(text.contains("\\u00b5-strain \\u03c3=1"));
        assert!(text.contains("\\ud83d\\udf02"));
    }

    #[test]
    fn float_rendering_matches_commitment_literal() {
        let v: Value = json!({"ctrl": [1.5, 1.6], "echo": [0.95, 1.05]});
        let bytes = canonical_json_bytes(&v).expect("canonical");
        assert_eq!(bytes, br#"{"ctrl":[1.5,1.6],"echo":[0.95,1.05]}"#);
    }

    #[test]
    fn hash16_is_prefix_of_full_digest() {
        let full = sha256_hex(b"payload");
        assert_eq!(hash16(b"payload"), full[..16]);
    }
}
