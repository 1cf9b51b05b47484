//! Static role/path/method policy table.
//!
//! The table is parsed once from casbin-style CSV lines and never mutated:
//!
//! ```text
//! # p, <role>, <path pattern>, <method>[, allow|deny]
//! p, client, /client/*, GET
//! p, contractor, /offers/:id, *, deny
//! ```
//!
//! Patterns match whole paths. `*` as the final segment matches one or more
//! trailing segments (`/client/*` does not match `/client`), `:name` matches
//! exactly one non-empty segment. Deny rules
//! win over allow rules; a triple with no matching rule is denied.

use anyhow::{anyhow, Context, Result};
use std::{fs, path::Path};
use thiserror::Error;
use tracing::{debug, info};

use super::models::Role;

/// Policy shipped with the binary, used when no policy file is configured.
pub const DEFAULT_POLICY: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/policy.csv"));

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy evaluation failed: {0}")]
    Evaluation(String),
}

/// Decision point consulted by the authorization middleware.
pub trait PolicyEnforcer: Send + Sync {
    /// # Errors
    /// Returns an error when the decision cannot be evaluated.
    fn check(&self, role: Role, path: &str, method: &str) -> Result<bool, PolicyError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Wildcard,
}

#[derive(Clone, Debug)]
struct Rule {
    role: Role,
    pattern: Vec<Segment>,
    method: Option<String>,
    effect: Effect,
}

impl Rule {
    fn matches(&self, role: Role, segments: &[&str], method: &str) -> bool {
        self.role == role
            && self
                .method
                .as_deref()
                .map_or(true, |m| m.eq_ignore_ascii_case(method))
            && pattern_matches(&self.pattern, segments)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PolicyTable {
    rules: Vec<Rule>,
}

impl PolicyTable {
    /// Parse policy lines. Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    /// Returns an error naming the offending line for unknown roles, relative
    /// paths, or malformed rows.
    pub fn parse(source: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let rule = parse_rule(line).with_context(|| format!("policy line {}", index + 1))?;
            rules.push(rule);
        }
        debug!(rules = rules.len(), "policy table parsed");
        Ok(Self { rules })
    }

    /// Load a policy file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {}", path.display()))?;
        let table = Self::parse(&source)?;
        info!(path = %path.display(), rules = table.len(), "policy table loaded");
        Ok(table)
    }

    /// The policy compiled into the binary.
    ///
    /// # Errors
    /// Returns an error if the bundled policy is malformed.
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_POLICY)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Pure decision: deny rules first, then allow rules, otherwise deny.
    #[must_use]
    pub fn decide(&self, role: Role, path: &str, method: &str) -> bool {
        let segments = split_path(path);
        let mut allowed = false;
        for rule in self.rules.iter().filter(|rule| rule.matches(role, &segments, method)) {
            match rule.effect {
                Effect::Deny => return false,
                Effect::Allow => allowed = true,
            }
        }
        allowed
    }
}

impl PolicyEnforcer for PolicyTable {
    fn check(&self, role: Role, path: &str, method: &str) -> Result<bool, PolicyError> {
        if !path.starts_with('/') {
            return Err(PolicyError::Evaluation(format!("request path is not absolute: {path}")));
        }
        Ok(self.decide(role, path, method))
    }
}

fn parse_rule(line: &str) -> Result<Rule> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (kind, rest) = fields
        .split_first()
        .ok_or_else(|| anyhow!("empty policy row"))?;
    if *kind != "p" {
        return Err(anyhow!("unsupported policy type: {kind}"));
    }

    let (role, path, method, effect) = match rest {
        [role, path, method] => (role, path, method, Effect::Allow),
        [role, path, method, effect] => (role, path, method, parse_effect(effect)?),
        _ => return Err(anyhow!("expected `p, role, path, method[, effect]`")),
    };

    let role: Role = role.parse().map_err(|err: String| anyhow!(err))?;
    if !path.starts_with('/') {
        return Err(anyhow!("path pattern must start with '/': {path}"));
    }
    if method.is_empty() {
        return Err(anyhow!("missing method"));
    }

    Ok(Rule {
        role,
        pattern: parse_pattern(path)?,
        method: (*method != "*").then(|| method.to_uppercase()),
        effect,
    })
}

fn parse_effect(effect: &str) -> Result<Effect> {
    match effect.to_lowercase().as_str() {
        "allow" => Ok(Effect::Allow),
        "deny" => Ok(Effect::Deny),
        other => Err(anyhow!("unknown effect: {other}")),
    }
}

fn parse_pattern(path: &str) -> Result<Vec<Segment>> {
    let raw = split_path(path);
    let last = raw.len().saturating_sub(1);
    raw.iter()
        .enumerate()
        .map(|(index, segment)| match *segment {
            "*" if index == last => Ok(Segment::Wildcard),
            "*" => Err(anyhow!("'*' is only allowed as the last segment: {path}")),
            s if s.starts_with(':') && s.len() > 1 => Ok(Segment::Param),
            s => Ok(Segment::Literal(s.to_string())),
        })
        .collect()
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn pattern_matches(pattern: &[Segment], segments: &[&str]) -> bool {
    match (pattern.split_first(), segments.split_first()) {
        (Some((Segment::Wildcard, _)), rest) => rest.is_some(),
        (None, None) => true,
        (Some((Segment::Param, rest)), Some((_, tail))) => pattern_matches(rest, tail),
        (Some((Segment::Literal(expected), rest)), Some((actual, tail))) => {
            expected == actual && pattern_matches(rest, tail)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r"
        # marketplace routes
        p, client, /client/*, GET
        p, client, /client/tenders, POST
        p, contractor, /contractor/*, *
        p, contractor, /contractor/offers/:id, DELETE, deny
        p, client, /me, GET
        p, contractor, /me, GET
    ";

    #[test]
    fn builtin_policy_parses() -> Result<()> {
        let table = PolicyTable::builtin()?;
        assert!(!table.is_empty());
        assert!(table.decide(Role::Client, "/client/dashboard", "GET"));
        assert!(table.decide(Role::Contractor, "/contractor/profile", "GET"));
        assert!(!table.decide(Role::Client, "/contractor/profile", "GET"));
        assert!(!table.decide(Role::Contractor, "/client/dashboard", "GET"));
        Ok(())
    }

    #[test]
    fn wildcard_requires_a_trailing_segment() -> Result<()> {
        let table = PolicyTable::parse(POLICY)?;
        assert!(table.decide(Role::Client, "/client/dashboard", "GET"));
        assert!(table.decide(Role::Client, "/client/tenders/42", "GET"));
        assert!(!table.decide(Role::Client, "/client", "GET"));
        assert!(!table.decide(Role::Client, "/client/", "GET"));
        assert!(!table.decide(Role::Client, "/clients", "GET"));
        Ok(())
    }

    #[test]
    fn method_must_match() -> Result<()> {
        let table = PolicyTable::parse(POLICY)?;
        assert!(table.decide(Role::Client, "/client/tenders", "POST"));
        assert!(table.decide(Role::Client, "/client/tenders", "post"));
        assert!(!table.decide(Role::Client, "/client/tenders/1", "PUT"));
        assert!(table.decide(Role::Contractor, "/contractor/offers", "PATCH"));
        Ok(())
    }

    #[test]
    fn deny_overrides_allow() -> Result<()> {
        let table = PolicyTable::parse(POLICY)?;
        assert!(table.decide(Role::Contractor, "/contractor/offers/7", "GET"));
        assert!(!table.decide(Role::Contractor, "/contractor/offers/7", "DELETE"));
        assert!(table.decide(Role::Contractor, "/contractor/offers/7/restore", "DELETE"));
        Ok(())
    }

    #[test]
    fn absent_triple_is_denied() -> Result<()> {
        let table = PolicyTable::parse(POLICY)?;
        assert!(!table.decide(Role::Client, "/admin", "GET"));
        assert!(!PolicyTable::default().decide(Role::Client, "/me", "GET"));
        Ok(())
    }

    #[test]
    fn check_rejects_relative_path() -> Result<()> {
        let table = PolicyTable::parse(POLICY)?;
        assert!(table.check(Role::Client, "client/dashboard", "GET").is_err());
        assert!(table.check(Role::Client, "/me", "GET")?);
        Ok(())
    }

    #[test]
    fn parse_rejects_malformed_rows() {
        assert!(PolicyTable::parse("p, admin, /admin, GET").is_err());
        assert!(PolicyTable::parse("p, client, admin, GET").is_err());
        assert!(PolicyTable::parse("g, client, contractor").is_err());
        assert!(PolicyTable::parse("p, client, /a/*/b, GET").is_err());
        assert!(PolicyTable::parse("p, client, /a, GET, maybe").is_err());
        assert!(PolicyTable::parse("p, client").is_err());
    }

    #[test]
    fn parse_error_names_line() {
        let err = PolicyTable::parse("p, client, /me, GET\np, nobody, /me, GET").err();
        assert!(err.is_some_and(|err| err.to_string().contains("policy line 2")));
    }
}
