use crate::value::Value;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

///
/// SessionMemory
///
/// Named memory a session accumulates across submissions. Side-effect steps
/// write it; callers read it after consuming the result sequence.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionMemory {
    entries: BTreeMap<String, Value>,
}

impl SessionMemory {
    /// A fresh memory behind the shared lock the pipeline threads through.
    #[must_use]
    pub fn shared() -> SharedMemory {
        Arc::new(RwLock::new(Self::default()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Overwrite a named entry.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    /// Initialize a named entry; an existing entry is left untouched so
    /// re-applying session configuration never clobbers accumulated state.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.entries.entry(name.into()).or_insert(value);
    }

    /// Append onto a named list entry, creating it on first use. A scalar
    /// entry is promoted to a single-element list before appending.
    pub fn append(&mut self, name: &str, value: Value) {
        match self.entries.get_mut(name) {
            Some(Value::List(items)) => items.push(value),
            Some(existing) => {
                let first = existing.clone();
                *existing = Value::List(vec![first, value]);
            }
            None => {
                self.entries.insert(name.to_string(), Value::List(vec![value]));
            }
        }
    }
}

/// Shared handle to one session's memory; cheap to clone into a processor.
pub type SharedMemory = Arc<RwLock<SessionMemory>>;

///
/// TESTS
///
