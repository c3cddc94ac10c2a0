use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use veil_hierarchy::{member_key, MemberKind};

/// The final rename decisions, keyed by original qualified names.
///
/// Keys come in three shapes:
/// - `owner` for a class, mapped to its new internal name;
/// - `owner.name(descriptor)` for a field or method (see
///   [`veil_hierarchy::member_key`]), mapped to the new simple name;
/// - `.name(descriptor)` for the apparent signature of a dynamic call site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameMapping {
    entries: BTreeMap<String, String>,
}

impl NameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn class(&self, internal_name: &str) -> Option<&str> {
        self.get(internal_name)
    }

    pub fn member(&self, owner: &str, kind: MemberKind, name: &str, descriptor: &str) -> Option<&str> {
        self.get(&member_key(owner, kind, name, descriptor))
    }

    pub fn call_site(&self, name: &str, descriptor: &str) -> Option<&str> {
        self.get(&call_site_key(name, descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Class entries only (keys without a `.`).
    pub fn classes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(key, _)| !key.contains('.'))
    }

    /// One `key -> name` line per entry, sorted by key.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            let _ = writeln!(out, "{key} -> {value}");
        }
        out
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `.name(descriptor)`: the key under which a dynamic call site is looked up.
pub fn call_site_key(name: &str, descriptor: &str) -> String {
    member_key("", MemberKind::Method, name, descriptor)
}
