//! The deterministic record corpus the store starts with

use crate::store::RecordStore;

/// Key of record `i`
pub fn record_key(i: usize) -> String {
    format!("user_{}", i)
}

/// Initial value of record `i`
pub fn record_value(i: usize) -> String {
    format!("{{\"name\": \"user_{}\", \"age\": {}}}", i, 20 + i % 30)
}

/// Populate `user_1 ..= user_<count>`. Must finish before any sender starts.
pub fn seed(store: &dyn RecordStore, count: usize) {
    for i in 1..=count {
        store.set(&record_key(i), record_value(i));
    }
    tracing::info!(records = count, "Seeded record store");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LockedRecordStore;

    #[test]
    fn test_record_shape() {
        assert_eq!(record_key(7), "user_7");
        assert_eq!(record_value(1), r#"{"name": "user_1", "age": 21}"#);
        assert_eq!(record_value(30), r#"{"name": "user_30", "age": 20}"#);
    }

    #[test]
    fn test_every_seeded_key_is_found() {
        let store = LockedRecordStore::new();
        seed(&store, 100);

        assert_eq!(store.len(), 100);
        for i in 1..=100 {
            assert_eq!(store.get(&record_key(i)), Some(record_value(i)));
        }
        assert_eq!(store.get("user_0"), None);
        assert_eq!(store.get("user_101"), None);
    }
}
