use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{SessionState, StateError, Value};

#[test]
fn get_absent() {
    let s = SessionState::new();
    assert_eq!(s.get("counter"), None);
    assert!(!s.contains("counter"));
    assert_eq!(s["counter"], Value::Null);
}

#[test]
fn set_get() {
    let mut s = SessionState::new();
    s.set("counter", 10);
    assert_eq!(s.get("counter"), Some(&json!(10)));
    assert!(s.contains("counter"));

    s.set("counter", 20);
    assert_eq!(s["counter"], json!(20));
}

#[test]
fn delete() {
    let mut s = SessionState::new();
    s.set("city", "Paris");
    assert_eq!(s.delete("city"), Some(json!("Paris")));
    assert_eq!(s.get("city"), None);
    assert_eq!(s.delete("city"), None);
}

#[test]
fn enumerate_is_snapshot() {
    let mut s = SessionState::new();
    s.set("a", 1);
    s.set("b", true);
    let snapshot = s.enumerate();
    s.set("a", 2);
    s.delete("b");

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["a"], json!(1));
    assert_eq!(snapshot["b"], json!(true));
    assert_eq!(s.len(), 1);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Message {
    role: String,
    content: String,
}

#[test]
fn typed_round_trip() {
    let mut s = SessionState::new();
    let messages = vec![Message {
        role: "assistant".into(),
        content: "hi".into(),
    }];
    s.set_as("messages", &messages).unwrap();
    let back: Vec<Message> = s.get_as("messages").unwrap().unwrap();
    assert_eq!(back, messages);
    assert_eq!(s.get_as::<Vec<Message>>("missing").unwrap(), None);
}

#[test]
fn get_as_wrong_type() {
    let mut s = SessionState::new();
    s.set("counter", "ten");
    let e = s.get_as::<i64>("counter").unwrap_err();
    assert!(matches!(e, StateError::Decode { ref key, .. } if key == "counter"));
}

#[test]
fn increment() {
    let mut s = SessionState::new();
    assert_eq!(s.increment("counter", 1), 1);
    assert_eq!(s.increment("counter", 1), 2);
    assert_eq!(s.increment("counter", -5), -3);
    assert_eq!(s["counter"], json!(-3));
}

#[test]
fn push_creates_array() {
    let mut s = SessionState::new();
    s.push("click_log", "Green");
    s.push("click_log", "Blue");
    assert_eq!(s["click_log"], json!(["Green", "Blue"]));
}

#[test]
fn get_or_insert_with_keeps_existing() {
    let mut s = SessionState::new();
    s.get_or_insert_with("theme", || json!("Dark"));
    *s.get_or_insert_with("theme", || json!("Light")) = json!("System");
    assert_eq!(s["theme"], json!("System"));
}
