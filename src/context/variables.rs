use std::collections::HashMap;

use crate::context::{Context, ResolveError};

/// Named numbers. Only resolves with zero arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, f64>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the previous value bound to `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut variables = Variables::new();
        variables.extend(iter);
        variables
    }
}

impl<K: Into<String>> Extend<(K, f64)> for Variables {
    fn extend<I: IntoIterator<Item = (K, f64)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl Context for Variables {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        match self.get(name) {
            Some(value) if arguments.is_empty() => Ok(value),
            _ => Err(ResolveError::unresolved(name, arguments)),
        }
    }

    fn is_resolvable(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}
