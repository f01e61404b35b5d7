//! Explicit environment and working-directory settings for spawned commands

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Environment variable overrides applied to spawned commands.
///
/// Setting a variable here never touches the current process; the value only
/// reaches commands run with a [`RunOptions`] carrying this environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an override. Values are stored as their string form.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.vars.insert(key.into(), value.to_string());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn unset(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// The override for `key`, falling back to the inherited process value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned().or_else(|| std::env::var(key).ok())
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Parses `KEY=VALUE`. The value may itself contain `=`.
    pub fn parse_assignment(assignment: &str) -> Option<(String, String)> {
        let (key, value) = assignment.split_once('=')?;
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Options for [`run_command`](crate::run_command)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Working directory; the current one when unset
    pub cwd: Option<PathBuf>,
    pub env: Environment,
    /// Start from an empty environment instead of inheriting
    pub clear_env: bool,
    /// Log captured output at debug level
    pub log: bool,
}

impl RunOptions {
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }
}
