use crate::{coefficient::Coefficient, value::Value};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// PathEntry
///
/// One visited value tagged with the step labels active at the visit.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    labels: BTreeSet<String>,
    value: Value,
}

impl PathEntry {
    #[must_use]
    pub const fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

///
/// Path
///
/// Append-only history of the values a traverser has moved through.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq, Serialize, Deserialize)]
pub struct Path(Vec<PathEntry>);

impl Path {
    pub(crate) fn push(&mut self, labels: BTreeSet<String>, value: Value) {
        self.0.push(PathEntry { labels, value });
    }

    /// The visited values in visit order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(PathEntry::value)
    }

    /// The most recent value recorded under the given label, if any.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|entry| entry.labels.contains(label))
            .map(PathEntry::value)
    }
}

///
/// Traverser
///
/// The unit of execution state flowing through a compiled pipeline: the
/// current value, the path that led to it, the labels of the stage that
/// produced it, and a bulk coefficient.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Coefficient")]
pub struct Traverser<C: Coefficient> {
    value: Value,
    path: Path,
    labels: BTreeSet<String>,
    coefficient: C,
}

impl<C: Coefficient> Traverser<C> {
    // Spawned by the pipeline source; the initial value opens the path.
    pub(crate) fn spawn(value: Value, coefficient: C, labels: &BTreeSet<String>) -> Self {
        let mut path = Path::default();
        path.push(labels.clone(), value.clone());

        Self {
            value,
            path,
            labels: labels.clone(),
            coefficient,
        }
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    #[must_use]
    pub const fn coefficient(&self) -> &C {
        &self.coefficient
    }

    /// The materialized multiplicity this traverser stands for.
    pub fn bulk(&self) -> u64 {
        self.coefficient.count()
    }

    // Map stage application: replace the value, extend the path, combine
    // coefficients.
    pub(crate) fn map_to(&mut self, value: Value, labels: &BTreeSet<String>, coefficient: &C) {
        self.value = value;
        self.coefficient = self.coefficient.multiply(coefficient);
        self.labels = labels.clone();
        self.path.push(labels.clone(), self.value.clone());
    }

    // Pass-through stage application (filters, side-effects): the value is
    // unchanged; labeled stages still mark the path.
    pub(crate) fn pass_through(&mut self, labels: &BTreeSet<String>, coefficient: &C) {
        self.coefficient = self.coefficient.multiply(coefficient);
        if !labels.is_empty() {
            self.labels = labels.clone();
            self.path.push(labels.clone(), self.value.clone());
        }
    }
}

///
/// TESTS
///
