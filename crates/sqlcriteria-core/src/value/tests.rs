use super::*;
use serde_json::json;

#[test]
fn pattern_text_covers_scalars_only() {
    assert_eq!(Value::Text("bo".into()).to_pattern_text(), Some("bo".into()));
    assert_eq!(Value::Int(-4).to_pattern_text(), Some("-4".into()));
    assert_eq!(Value::Uint(7).to_pattern_text(), Some("7".into()));
    assert_eq!(Value::Bool(true).to_pattern_text(), Some("true".into()));

    assert_eq!(Value::Null.to_pattern_text(), None);
    assert_eq!(Value::Blob(vec![1]).to_pattern_text(), None);
    assert_eq!(Value::List(vec![]).to_pattern_text(), None);
}

#[test]
fn display_renders_nested_lists_and_blobs() {
    let value = Value::List(vec![
        Value::Int(1),
        Value::Text("a".into()),
        Value::Blob(vec![0xde, 0xad]),
        Value::Null,
    ]);

    assert_eq!(value.to_string(), "[1, a, 0xdead, null]");
}

#[test]
fn serializes_untagged() {
    let value = Value::List(vec![Value::Null, Value::Bool(false), Value::Text("x".into())]);

    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!([null, false, "x"])
    );
}

#[test]
fn scalar_and_null_flags() {
    assert!(Value::Null.is_null());
    assert!(Value::Null.is_scalar());
    assert!(!Value::List(vec![]).is_scalar());
    assert_eq!(Value::Float(1.5).label(), "float");
}
