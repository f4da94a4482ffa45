//! Skill normalizer: turns any skill representation into lowercase atomic tokens.
//!
//! Accepted shapes: `null`, a delimited string (`"Python, React/Node"`), a list of
//! strings, nested lists, or objects carrying one of `name`, `label`, `skill`,
//! `value`. Anything else degrades to no tokens; this never fails.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separators between skills inside a single string. Runs count as one.
pub const SKILL_DELIMITERS: [char; 5] = [',', '|', '/', ';', '+'];

/// Object fields consulted for a skill label, in priority order.
const LABEL_FIELDS: [&str; 4] = ["name", "label", "skill", "value"];

/// A canonical skill: trimmed, lowercased, non-empty, free of delimiters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillToken(String);

impl SkillToken {
    /// Returns `None` when nothing survives trimming or the text still holds a delimiter.
    pub fn new(raw: &str) -> Option<Self> {
        let token = raw.trim().to_lowercase();
        if token.is_empty() || token.contains(SKILL_DELIMITERS) {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for SkillToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SkillToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes `raw` into tokens, preserving input order.
///
/// Case folding is the only canonicalization: duplicates are kept, callers that
/// need a set use [`token_set`].
pub fn normalize(raw: &Value) -> Vec<SkillToken> {
    let mut tokens = Vec::new();
    match raw {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                collect_element(item, &mut tokens);
            }
        }
        other => collect_element(other, &mut tokens),
    }
    tokens
}

/// Convenience for plain string lists such as a job's `required_skills`.
pub fn normalize_strs<S: AsRef<str>>(skills: &[S]) -> Vec<SkillToken> {
    let mut tokens = Vec::new();
    for skill in skills {
        split_into(skill.as_ref(), &mut tokens);
    }
    tokens
}

pub fn token_set(raw: &Value) -> BTreeSet<SkillToken> {
    normalize(raw).into_iter().collect()
}

fn collect_element(element: &Value, out: &mut Vec<SkillToken>) {
    match element {
        Value::Null => {}
        Value::String(s) => split_into(s, out),
        Value::Number(n) => split_into(&n.to_string(), out),
        Value::Bool(b) => split_into(&b.to_string(), out),
        Value::Array(items) => {
            for item in items {
                collect_element(item, out);
            }
        }
        Value::Object(map) => {
            let label = LABEL_FIELDS
                .iter()
                .find_map(|field| map.get(*field).filter(|v| !v.is_null()));
            match label {
                Some(Value::String(s)) => split_into(s, out),
                Some(Value::Number(n)) => split_into(&n.to_string(), out),
                Some(Value::Bool(b)) => split_into(&b.to_string(), out),
                _ => {}
            }
        }
    }
}

fn split_into(text: &str, out: &mut Vec<SkillToken>) {
    out.extend(text.split(SKILL_DELIMITERS).filter_map(SkillToken::new));
}
