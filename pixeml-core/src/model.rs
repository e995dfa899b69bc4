//! Task records as the server hands them out, and the resolved form we display.

use serde::{Deserialize, Serialize};

/// A schema template: declares which settings a task of this type carries,
/// and the type of each one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: i64,
    pub name: String,

    /// `(setting_name, setting_type)` in declaration order.
    /// The type string is opaque to us ("string", "int", "time", ...).
    pub settings: Vec<(String, String)>,
}

impl TaskType {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            settings: Vec::new(),
        }
    }

    pub fn with_setting(mut self, name: impl Into<String>, setting_type: impl Into<String>) -> Self {
        self.settings.push((name.into(), setting_type.into()));
        self
    }

    /// Position of the first declaration named `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.settings.iter().position(|(n, _)| n == name)
    }

    /// Declared type of the first setting named `name`.
    pub fn declared_type(&self, name: &str) -> Option<&str> {
        self.position_of(name).map(|i| self.settings[i].1.as_str())
    }
}

/// Raw task record. Settings are untyped `(name, value)` pairs in whatever
/// order the server stored them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedTask {
    pub id: i64,
    pub name: String,

    /// References a [`TaskType`] by id, not by position.
    pub type_id: i64,

    pub settings: Vec<(String, String)>,
}

impl UnresolvedTask {
    pub fn new(id: i64, name: impl Into<String>, type_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            type_id,
            settings: Vec::new(),
        }
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.push((name.into(), value.into()));
        self
    }
}

/// A stored value annotated with its declared type.
///
/// Serialized as the triple `[name, setting_type, value]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(String, String, String)",
    into = "(String, String, String)"
)]
pub struct ResolvedSetting {
    pub name: String,
    pub setting_type: String,
    pub value: String,
}

impl From<(String, String, String)> for ResolvedSetting {
    fn from((name, setting_type, value): (String, String, String)) -> Self {
        Self {
            name,
            setting_type,
            value,
        }
    }
}

impl From<ResolvedSetting> for (String, String, String) {
    fn from(s: ResolvedSetting) -> Self {
        (s.name, s.setting_type, s.value)
    }
}

/// Display-ready task. Derived on every reload and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTask {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    pub type_name: String,

    /// One entry per stored setting, in resolution order.
    pub settings: Vec<ResolvedSetting>,
}

impl ResolvedTask {
    pub fn setting(&self, name: &str) -> Option<&ResolvedSetting> {
        self.settings.iter().find(|s| s.name == name)
    }

    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.setting(name).map(|s| s.value.as_str())
    }

    /// Name/value pairs, dropping the type annotation.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.settings
            .iter()
            .map(|s| (s.name.clone(), s.value.clone()))
            .collect()
    }
}
