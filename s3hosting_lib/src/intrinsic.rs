//! helpers for building CloudFormation intrinsic functions as json values.

use serde_json::{json, Value};

pub fn get_ref(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

pub fn split(delimiter: &str, source: Value) -> Value {
    json!({ "Fn::Split": [delimiter, source] })
}

pub fn select(index: usize, list: Value) -> Value {
    json!({ "Fn::Select": [index.to_string(), list] })
}

/// returns the logical ids that a value points at via `Ref` or `Fn::GetAtt`,
/// in the order they first appear. pseudo parameters (`AWS::StackId`, etc.)
/// are skipped since they are not resources.
pub fn referenced_ids(value: &Value) -> Vec<String> {
    let mut out = vec![];
    collect_references(value, &mut out);
    out
}

fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("Ref") {
                push_unique(out, id);
            }
            if let Some(Value::Array(args)) = map.get("Fn::GetAtt") {
                if let Some(Value::String(id)) = args.first() {
                    push_unique(out, id);
                }
            }
            for v in map.values() {
                collect_references(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_references(v, out);
            }
        }
        _ => {}
    }
}

fn push_unique(out: &mut Vec<String>, id: &str) {
    if id.starts_with("AWS::") {
        return;
    }
    if !out.iter().any(|x| x == id) {
        out.push(id.to_string());
    }
}
