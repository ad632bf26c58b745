//! The named-vector map.

use crate::error::{VectorConfigError, VectorConfigResult};
use crate::vector::{self, Vector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Mul;

/// An insertion-ordered map from variable names to vectors.
///
/// Iteration, the flat layout used by [`exmap_vector`](Self::exmap_vector),
/// and [`dim`](Self::dim) all follow insertion order.
///
/// # Example
///
/// ```rust
/// use vector_config::VectorConfig;
///
/// let mut config = VectorConfig::new();
/// config.insert("x", vec![1.0, 2.0]).insert("y", vec![3.0]);
///
/// let moved = config.exmap_vector(&[0.5, 0.5, -1.0]).unwrap();
/// assert_eq!(moved.get("x").unwrap(), &vec![1.5, 2.5]);
/// assert_eq!(moved.get("y").unwrap(), &vec![2.0]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, Vector)>", into = "Vec<(String, Vector)>")]
pub struct VectorConfig {
    entries: Vec<(String, Vector)>,
    index: HashMap<String, usize>,
}

impl VectorConfig {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: Vector) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert `value` under `key`, replacing any existing entry.
    ///
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Vector) -> &mut Self {
        let key = key.into();
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
        self
    }

    /// Get the vector stored under `key`.
    ///
    /// A missing key logs the current contents before failing.
    pub fn get(&self, key: &str) -> VectorConfigResult<&Vector> {
        match self.index.get(key) {
            Some(&slot) => Ok(&self.entries[slot].1),
            None => {
                tracing::error!(
                    target: "vector_config",
                    key = key,
                    contents = %self,
                    "asked for missing key"
                );
                Err(VectorConfigError::InvalidKey(key.to_string()))
            }
        }
    }

    /// Check whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Total number of scalars across all vectors.
    pub fn dim(&self) -> usize {
        self.entries.iter().map(|(_, value)| value.len()).sum()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Add `value` into the entry for `key`, inserting it if absent.
    pub fn add(&mut self, key: impl Into<String>, value: &[f64]) -> VectorConfigResult<()> {
        let key = key.into();
        let Some(&slot) = self.index.get(&key) else {
            self.insert(key, value.to_vec());
            return Ok(());
        };

        let stored = &mut self.entries[slot].1;
        check_size(&key, stored, value)?;
        vector::add_assign(stored, value);
        Ok(())
    }

    /// A copy with every vector multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), vector::scale(value, factor)))
            .collect()
    }

    /// Elementwise sum with `other` over the keys of `self`.
    ///
    /// Every key of `self` must be present in `other` with the same length.
    pub fn try_add(&self, other: &VectorConfig) -> VectorConfigResult<Self> {
        self.map_values(|key, value| {
            let rhs = other.get(key)?;
            check_size(key, value, rhs)?;
            Ok(vector::add(value, rhs))
        })
    }

    /// Elementwise difference with `other` over the keys of `self`.
    pub fn try_sub(&self, other: &VectorConfig) -> VectorConfigResult<Self> {
        self.map_values(|key, value| {
            let rhs = other.get(key)?;
            check_size(key, value, rhs)?;
            Ok(vector::sub(value, rhs))
        })
    }

    /// Apply an update given as another map.
    ///
    /// Keys listed in `delta` are incremented by their delta; keys missing
    /// from `delta` pass through unchanged. Keys only in `delta` are ignored.
    pub fn exmap(&self, delta: &VectorConfig) -> VectorConfigResult<Self> {
        self.map_values(|key, value| match delta.index.get(key) {
            Some(&slot) => {
                let step = &delta.entries[slot].1;
                check_size(key, value, step)?;
                Ok(vector::add(value, step))
            }
            None => Ok(value.clone()),
        })
    }

    /// Apply an update given as one flat vector.
    ///
    /// The flat vector is split into consecutive slices sized like the
    /// stored vectors, in insertion order.
    pub fn exmap_vector(&self, delta: &[f64]) -> VectorConfigResult<Self> {
        let expected = self.dim();
        if delta.len() != expected {
            tracing::error!(
                target: "vector_config",
                expected = expected,
                actual = delta.len(),
                "flat delta does not match map dimension"
            );
            return Err(VectorConfigError::FlatDimensionMismatch {
                expected,
                actual: delta.len(),
            });
        }

        let mut offset = 0;
        self.map_values(|_, value| {
            let step = &delta[offset..offset + value.len()];
            offset += value.len();
            Ok(vector::add(value, step))
        })
    }

    /// Sum over keys of the dot product with the matching entry of `other`.
    pub fn dot(&self, other: &VectorConfig) -> VectorConfigResult<f64> {
        self.entries.iter().try_fold(0.0, |acc, (key, value)| {
            let rhs = other.get(key)?;
            check_size(key, value, rhs)?;
            Ok(acc + vector::dot(value, rhs))
        })
    }

    /// Check equality within an absolute tolerance.
    ///
    /// Both maps must have the same number of keys, and every key of `self`
    /// must be present in `other` with a value within `tol` elementwise.
    pub fn equals(&self, other: &VectorConfig, tol: f64) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.entries.iter().all(|(key, value)| match other.index.get(key) {
            Some(&slot) => vector::equal_with_abs_tol(value, &other.entries[slot].1, tol),
            None => false,
        })
    }

    fn map_values(
        &self,
        mut f: impl FnMut(&str, &Vector) -> VectorConfigResult<Vector>,
    ) -> VectorConfigResult<Self> {
        let mut result = VectorConfig::new();
        for (key, value) in &self.entries {
            result.insert(key.clone(), f(key, value)?);
        }
        Ok(result)
    }
}

fn check_size(key: &str, stored: &[f64], incoming: &[f64]) -> VectorConfigResult<()> {
    if stored.len() == incoming.len() {
        return Ok(());
    }
    tracing::error!(
        target: "vector_config",
        key = key,
        stored = stored.len(),
        incoming = incoming.len(),
        "mismatched dimensions"
    );
    Err(VectorConfigError::DimensionMismatch {
        key: key.to_string(),
        expected: stored.len(),
        actual: incoming.len(),
    })
}

/// Sum over keys of `a` of the dot product with the matching entry of `b`.
pub fn dot(a: &VectorConfig, b: &VectorConfig) -> VectorConfigResult<f64> {
    a.dot(b)
}

impl Mul<f64> for &VectorConfig {
    type Output = VectorConfig;

    fn mul(self, factor: f64) -> VectorConfig {
        self.scale(factor)
    }
}

impl Mul<f64> for VectorConfig {
    type Output = VectorConfig;

    fn mul(self, factor: f64) -> VectorConfig {
        self.scale(factor)
    }
}

impl<K: Into<String>> FromIterator<(K, Vector)> for VectorConfig {
    fn from_iter<I: IntoIterator<Item = (K, Vector)>>(iter: I) -> Self {
        let mut config = VectorConfig::new();
        for (key, value) in iter {
            config.insert(key, value);
        }
        config
    }
}

impl From<Vec<(String, Vector)>> for VectorConfig {
    fn from(entries: Vec<(String, Vector)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<VectorConfig> for Vec<(String, Vector)> {
    fn from(config: VectorConfig) -> Self {
        config.entries
    }
}

impl fmt::Display for VectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "VectorConfig")?;
        writeln!(f, "size: {}", self.len())?;
        for (key, value) in &self.entries {
            writeln!(f, "{key}: {value:?}")?;
        }
        Ok(())
    }
}
