#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use archivalos_core::canonical::canonical_json_bytes;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

#[derive(Debug, Arbitrary)]
enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Node>),
    Object(Vec<(String, Node)>),
}

fn to_value(node: Node) -> Value {
    match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(b),
        Node::Int(i) => Value::from(i),
        Node::Str(s) => Value::String(s),
        Node::List(items) => Value::Array(items.into_iter().map(to_value).collect()),
        Node::Object(entries) => {
            let mut map = Map::new();
            for (k, v) in entries {
                map.insert(k, to_value(v));
            }
            Value::Object(map)
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(node) = Node::arbitrary(&mut u) else {
        return;
    };
    let value = to_value(node);

    let first = match canonical_json_bytes(&value) {
        Ok(b) => b,
        Err(_) => return,
    };
    let second = canonical_json_bytes(&value).unwrap_or_default();
    assert_eq!(first, second);
    assert!(first.is_ascii());

    // Canonicalization is a fixed point: reparsing the canonical bytes and
    // serializing again must reproduce them exactly.
    let reparsed: Value = match serde_json::from_slice(&first) {
        Ok(v) => v,
        Err(_) => return,
    };
    let third = canonical_json_bytes(&reparsed).unwrap_or_default();
    assert_eq!(first, third);
});
