//! Multi-strategy skill matching against the canonical catalog

use crate::error::Result;
use crate::processing::catalog::SkillCatalog;
use crate::processing::normalizer::{normalize, NormalizedText};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Characters around a match that must not be alphanumeric
const BOUNDARY_START: &str = r"(?:^|[^\p{Alphabetic}\p{N}])";
const BOUNDARY_END: &str = r"(?:$|[^\p{Alphabetic}\p{N}])";

/// Skill matcher compiled once from a catalog and shared across documents
pub struct SkillMatcher {
    skills: Vec<CompiledSkill>,
    aliases: Vec<CompiledAlias>,
    /// Lowercased skill names and aliases -> canonical name
    names: HashMap<String, String>,
}

struct CompiledSkill {
    name: String,
    exact: Regex,
    flexible: Option<Regex>,
    compact: Option<String>,
}

struct CompiledAlias {
    alias: String,
    canonical: String,
    pattern: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    Exact,
    Flexible,
    Compact,
    Alias,
}

/// A found skill together with how it was found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillHit {
    pub skill: String,
    pub strategy: MatchStrategy,
    /// Alias token when the hit came from the alias table
    pub via: Option<String>,
    pub context: String,
}

impl SkillMatcher {
    pub fn new(catalog: &SkillCatalog) -> Result<Self> {
        let skills = catalog
            .skills()
            .iter()
            .map(|name| CompiledSkill::compile(name))
            .collect::<Result<Vec<_>>>()?;

        let aliases = catalog
            .aliases()
            .iter()
            .map(|entry| {
                let alias = entry.alias.trim().to_lowercase();
                Ok(CompiledAlias {
                    pattern: bounded(&regex::escape(&alias))?,
                    alias,
                    canonical: entry.canonical.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut names: HashMap<String, String> = aliases
            .iter()
            .map(|alias| (alias.alias.clone(), alias.canonical.clone()))
            .collect();
        for skill in &skills {
            names.insert(skill.name.to_lowercase(), skill.name.clone());
        }

        debug!("Compiled skill matcher: {} skills, {} aliases", skills.len(), aliases.len());

        Ok(Self { skills, aliases, names })
    }

    /// Match raw text: normalizes first, then runs every strategy
    pub fn match_text(&self, text: &str) -> BTreeSet<String> {
        self.match_normalized(&normalize(text))
    }

    /// Set of canonical skills present in the text, each at most once
    pub fn match_normalized(&self, text: &NormalizedText) -> BTreeSet<String> {
        self.hits(text).into_iter().map(|hit| hit.skill).collect()
    }

    /// Like `match_text`, but reports which strategy found each skill
    pub fn explain(&self, text: &str) -> Vec<SkillHit> {
        self.hits(&normalize(text))
    }

    fn hits(&self, text: &NormalizedText) -> Vec<SkillHit> {
        let mut found = BTreeSet::new();
        let mut hits = Vec::new();

        if text.is_empty() {
            return hits;
        }

        for skill in &self.skills {
            if let Some((strategy, context)) = skill.find(text) {
                found.insert(skill.name.clone());
                hits.push(SkillHit {
                    skill: skill.name.clone(),
                    strategy,
                    via: None,
                    context,
                });
            }
        }

        for alias in &self.aliases {
            if found.contains(&alias.canonical) {
                continue;
            }
            if let Some(m) = alias.pattern.find(&text.normalized) {
                found.insert(alias.canonical.clone());
                hits.push(SkillHit {
                    skill: alias.canonical.clone(),
                    strategy: MatchStrategy::Alias,
                    via: Some(alias.alias.clone()),
                    context: context_window(&text.normalized, m.start(), m.end()),
                });
            }
        }

        hits
    }

    /// Catalog spelling of a skill name or alias given in any casing
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.names.get(&name.trim().to_lowercase()).map(String::as_str)
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }
}

impl CompiledSkill {
    fn compile(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        let exact = bounded(&regex::escape(&lower))?;

        let flexible = if lower.chars().any(is_flexible_separator) {
            Some(bounded(&flexible_body(&lower))?)
        } else {
            None
        };

        let stripped: String = lower
            .chars()
            .filter(|c| !(c.is_whitespace() || matches!(c, '.' | '+' | '#' | '-')))
            .collect();
        let compact = (stripped.chars().count() > 2).then_some(stripped);

        Ok(Self {
            name: name.to_string(),
            exact,
            flexible,
            compact,
        })
    }

    fn find(&self, text: &NormalizedText) -> Option<(MatchStrategy, String)> {
        if let Some(m) = self.exact.find(&text.normalized) {
            return Some((MatchStrategy::Exact, context_window(&text.normalized, m.start(), m.end())));
        }

        if let Some(flexible) = &self.flexible {
            if let Some(m) = flexible.find(&text.normalized) {
                return Some((MatchStrategy::Flexible, context_window(&text.normalized, m.start(), m.end())));
            }
        }

        if let Some(needle) = &self.compact {
            if let Some(start) = text.compact.find(needle.as_str()) {
                return Some((
                    MatchStrategy::Compact,
                    context_window(&text.compact, start, start + needle.len()),
                ));
            }
        }

        None
    }
}

fn is_flexible_separator(c: char) -> bool {
    matches!(c, '.' | '+' | '#') || c.is_whitespace()
}

/// Pattern body where `.`, `+`, `#` and spaces are all optional separators
fn flexible_body(skill: &str) -> String {
    let mut body = String::with_capacity(skill.len() * 2);
    for c in skill.chars() {
        match c {
            '.' => body.push_str(r"[.\s]*"),
            '+' => body.push_str(r"[+\s]*"),
            '#' => body.push_str(r"[#\s]*"),
            c if c.is_whitespace() => body.push_str(r"\s*"),
            c => body.push_str(&regex::escape(&c.to_string())),
        }
    }
    body
}

fn bounded(body: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("{}(?:{}){}", BOUNDARY_START, body, BOUNDARY_END))?)
}

fn context_window(text: &str, start: usize, end: usize) -> String {
    const RADIUS: usize = 30;
    let mut from = start.saturating_sub(RADIUS);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + RADIUS).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].trim().to_string()
}
