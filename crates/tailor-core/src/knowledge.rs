//! Background knowledge: forbidden and required directed edges plus
//! temporal tiers.
//!
//! An edge from a later tier into an earlier tier is forbidden. A tier may
//! additionally forbid edges among its own members. Names that do not appear
//! in a graph are ignored by consumers rather than rejected.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// A directed `from -> to` constraint between two variable names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KnowledgeEdge {
    pub from: String,
    pub to: String,
}

impl KnowledgeEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Background knowledge consulted by the search and orientation phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Knowledge {
    forbidden: BTreeSet<KnowledgeEdge>,
    required: BTreeSet<KnowledgeEdge>,
    tiers: Vec<Vec<String>>,
    forbidden_within: BTreeSet<usize>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse knowledge from TOML, e.g.
    ///
    /// ```toml
    /// tiers = [["age"], ["smoking", "diet"], ["cancer"]]
    /// forbidden_within = [2]
    /// required = [{ from = "smoking", to = "cancer" }]
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<knowledge>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn set_forbidden(&mut self, from: &str, to: &str) {
        self.forbidden.insert(KnowledgeEdge::new(from, to));
    }

    pub fn remove_forbidden(&mut self, from: &str, to: &str) {
        self.forbidden.remove(&KnowledgeEdge::new(from, to));
    }

    pub fn set_required(&mut self, from: &str, to: &str) {
        self.required.insert(KnowledgeEdge::new(from, to));
    }

    pub fn remove_required(&mut self, from: &str, to: &str) {
        self.required.remove(&KnowledgeEdge::new(from, to));
    }

    /// Place `vars` in `tier`, removing them from any other tier.
    pub fn set_tier(&mut self, tier: usize, vars: &[&str]) {
        for var in vars {
            self.add_to_tier(tier, var);
        }
    }

    /// Place one variable in `tier`, removing it from any other tier.
    pub fn add_to_tier(&mut self, tier: usize, var: &str) {
        for members in &mut self.tiers {
            members.retain(|m| m != var);
        }
        if self.tiers.len() <= tier {
            self.tiers.resize_with(tier + 1, Vec::new);
        }
        self.tiers[tier].push(var.to_string());
    }

    pub fn set_tier_forbidden_within(&mut self, tier: usize, forbidden: bool) {
        if forbidden {
            self.forbidden_within.insert(tier);
        } else {
            self.forbidden_within.remove(&tier);
        }
    }

    pub fn tier_of(&self, var: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.iter().any(|m| m == var))
    }

    pub fn num_tiers(&self) -> usize {
        self.tiers.len()
    }

    /// True if no constraint of any kind is recorded.
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
            && self.required.is_empty()
            && self.tiers.iter().all(Vec::is_empty)
    }

    /// Whether `from -> to` is forbidden explicitly or by tiers.
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        self.is_forbidden_by_tiers(from, to)
            || self.forbidden.contains(&KnowledgeEdge::new(from, to))
    }

    /// Whether tiers alone forbid `from -> to`.
    pub fn is_forbidden_by_tiers(&self, from: &str, to: &str) -> bool {
        match (self.tier_of(from), self.tier_of(to)) {
            (Some(t1), Some(t2)) if t1 == t2 => self.forbidden_within.contains(&t1),
            (Some(t1), Some(t2)) => t1 > t2,
            _ => false,
        }
    }

    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&KnowledgeEdge::new(from, to))
    }

    /// True iff no edge between `x` and `y` is required in either direction.
    pub fn no_edge_required(&self, x: &str, y: &str) -> bool {
        !(self.is_required(x, y) || self.is_required(y, x))
    }

    /// Explicitly forbidden edges.
    pub fn forbidden_edges(&self) -> impl Iterator<Item = &KnowledgeEdge> {
        self.forbidden.iter()
    }

    /// Required edges.
    pub fn required_edges(&self) -> impl Iterator<Item = &KnowledgeEdge> {
        self.required.iter()
    }

    /// Every forbidden edge among `names`, explicit or implied by tiers.
    pub fn all_forbidden_among(&self, names: &[String]) -> Vec<KnowledgeEdge> {
        let mut out = Vec::new();
        for from in names {
            for to in names {
                if from != to && self.is_forbidden(from, to) {
                    out.push(KnowledgeEdge::new(from.clone(), to.clone()));
                }
            }
        }
        out
    }
}
