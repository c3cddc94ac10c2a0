use globset::{GlobBuilder, GlobMatcher};

use crate::error::{RemapError, Result};

/// One rule as written by the user, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepRuleSpec {
    /// Glob over internal class names. `*` stays inside one package segment,
    /// `**` crosses `/`.
    pub class: String,
    /// Glob over member names; `None` keeps every member when `members` is set.
    pub member: Option<String>,
    /// Keep members of matching classes, not only the class name.
    pub members: bool,
}

#[derive(Debug, Clone)]
struct KeepRule {
    class: GlobMatcher,
    member: Option<GlobMatcher>,
    members: bool,
}

/// Compiled keep rules.
///
/// A rule with a member pattern only pins members; the class itself keeps its
/// name only when a rule without a member pattern matches it.
#[derive(Debug, Clone, Default)]
pub struct KeepRules {
    rules: Vec<KeepRule>,
}

impl KeepRules {
    pub fn new<'a>(specs: impl IntoIterator<Item = &'a KeepRuleSpec>) -> Result<Self> {
        let rules = specs
            .into_iter()
            .map(|spec| {
                Ok(KeepRule {
                    class: compile(&spec.class)?,
                    member: spec.member.as_deref().map(compile).transpose()?,
                    members: spec.members || spec.member.is_some(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn keeps_class(&self, internal_name: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.member.is_none() && rule.class.is_match(internal_name))
    }

    pub fn keeps_member(&self, owner: &str, name: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.members
                && rule.class.is_match(owner)
                && rule
                    .member
                    .as_ref()
                    .map_or(true, |member| member.is_match(name))
        })
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| RemapError::InvalidKeepPattern {
            pattern: pattern.to_string(),
            source,
        })
}
