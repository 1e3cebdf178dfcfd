//! Integration tests for the fact store
//!
//! Tests insertion order, overwrite semantics, typed access, and snapshots.

use precept_foundation::{Facts, Value};

fn names(facts: &Facts) -> Vec<&str> {
    facts.names().collect()
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn iteration_follows_insertion_order() {
    let mut facts = Facts::new();
    facts.put("zebra", 1);
    facts.put("apple", 2);
    facts.put("mango", 3);
    assert_eq!(names(&facts), vec!["zebra", "apple", "mango"]);
}

#[test]
fn overwrite_keeps_position() {
    let mut facts = Facts::new();
    facts.put("a", 1);
    facts.put("b", 2);
    let previous = facts.put("a", 10);

    assert_eq!(previous, Some(Value::Int(1)));
    assert_eq!(names(&facts), vec!["a", "b"]);
    assert_eq!(facts.get("a"), Some(&Value::Int(10)));
    assert_eq!(facts.len(), 2);
}

#[test]
fn remove_then_put_appends() {
    let mut facts: Facts = [("a", 1), ("b", 2)].into_iter().collect();
    assert_eq!(facts.remove("a"), Some(Value::Int(1)));
    assert_eq!(facts.remove("a"), None);
    facts.put("a", 3);
    assert_eq!(names(&facts), vec!["b", "a"]);
}

#[test]
fn clear_empties_the_store() {
    let mut facts: Facts = [("a", 1)].into_iter().collect();
    facts.clear();
    assert!(facts.is_empty());
    assert!(!facts.contains("a"));
}

// =============================================================================
// Typed Access
// =============================================================================

#[test]
fn typed_getters() {
    let mut facts = Facts::new();
    facts.put("rain", true);
    facts.put("age", 18);

    assert_eq!(facts.get_as::<bool>("rain").unwrap(), Some(true));
    assert_eq!(facts.get_as::<bool>("snow").unwrap(), None);
    assert_eq!(facts.require::<i64>("age").unwrap(), 18);
    assert!(!facts.get_or_default("snow", false).unwrap());
}

#[test]
fn require_reports_missing_and_mismatched() {
    let mut facts = Facts::new();
    facts.put("age", "eighteen");

    assert!(facts.require::<i64>("missing").unwrap_err().is_missing_fact());
    assert!(facts.require::<i64>("age").unwrap_err().is_type_mismatch());
    assert!(facts.get_or_default::<i64>("age", 0).is_err());
}

#[test]
fn host_objects_are_shared() {
    struct Account {
        balance: i64,
    }

    let mut facts = Facts::new();
    facts.put_object("account", Account { balance: 100 });

    let copy = facts.clone();
    assert_eq!(facts.get_object::<Account>("account").map(|a| a.balance), Some(100));
    assert_eq!(facts.get("account"), copy.get("account"));
}

// =============================================================================
// Snapshots and Equality
// =============================================================================

#[test]
fn clones_are_independent() {
    let mut facts: Facts = [("a", 1)].into_iter().collect();
    let snapshot = facts.clone();
    facts.put("a", 2);
    facts.put("b", 3);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("a"), Some(&Value::Int(1)));
    assert_ne!(snapshot, facts);
}

#[test]
fn equality_is_order_sensitive() {
    let ab: Facts = [("a", 1), ("b", 2)].into_iter().collect();
    let ba: Facts = [("b", 2), ("a", 1)].into_iter().collect();
    assert_ne!(ab, ba);
    assert_eq!(ab.as_map(), ba.as_map());
}

#[test]
fn display_lists_facts() {
    let facts: Facts = [("rain", true)].into_iter().collect();
    assert_eq!(facts.to_string(), "[Fact{name='rain', value=true}]");
}
