use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::recommend::normalizer::normalize;

/// A user's skill list exactly as entered or returned by the server.
///
/// Entries stay raw (plain strings, delimited strings, nested lists or
/// `{name|label|skill|value}` objects); normalization happens at scoring time.
/// Stored in the cache as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserSkillProfile {
    entries: Vec<Value>,
}

impl UserSkillProfile {
    pub fn new(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn add(&mut self, skill: &str) {
        self.entries.push(Value::String(skill.to_string()));
    }

    /// Removes every entry whose normalized tokens equal those of `skill`.
    /// Returns how many entries were dropped.
    pub fn remove(&mut self, skill: &str) -> usize {
        let target = normalize(&Value::String(skill.to_string()));
        if target.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|entry| normalize(entry) != target);
        before - self.entries.len()
    }

    /// The profile as a single normalizer input.
    pub fn as_input(&self) -> Value {
        Value::Array(self.entries.clone())
    }
}

impl<S: Into<String>> FromIterator<S> for UserSkillProfile {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|s| Value::String(s.into())).collect())
    }
}
