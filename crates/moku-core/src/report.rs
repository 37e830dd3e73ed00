//! Routing validation report with per-kind counts.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::routing::{ErrorKind, ValidationError};

/// Outcome of validating a configuration's routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingReport {
    pub connections: usize,
    pub errors: Vec<ValidationError>,
}

impl RoutingReport {
    pub fn new(connections: usize, errors: Vec<ValidationError>) -> Self {
        Self {
            connections,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of errors of each kind; kinds with no errors are absent.
    pub fn counts(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.errors {
            *counts.entry(e.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Errors attributed to the connection at `index`.
    pub fn errors_for_connection(&self, index: usize) -> impl Iterator<Item = &ValidationError> {
        self.errors
            .iter()
            .filter(move |e| e.connection_index == Some(index))
    }

    /// Errors not attached to any connection.
    pub fn slot_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(|e| e.connection_index.is_none())
    }
}

impl fmt::Display for RoutingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "routing OK ({} connections)", self.connections);
        }
        writeln!(
            f,
            "routing has {} error(s) across {} connections:",
            self.errors.len(),
            self.connections
        )?;
        for e in &self.errors {
            writeln!(f, "  {e}")?;
        }
        let summary: Vec<String> = self
            .counts()
            .iter()
            .map(|(kind, n)| format!("{kind}={n}"))
            .collect();
        write!(f, "summary: {}", summary.join(", "))
    }
}

impl From<Vec<ValidationError>> for RoutingReport {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self {
            connections: 0,
            errors,
        }
    }
}
