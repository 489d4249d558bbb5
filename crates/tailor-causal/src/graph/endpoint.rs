//! Endpoint marks and edges.

use serde::{Deserialize, Serialize};

/// The mark an edge carries at one of its ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

impl Endpoint {
    /// Glyph when the mark sits at the left end of `a ?-? b`.
    fn left_glyph(self) -> char {
        match self {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        }
    }

    /// Glyph when the mark sits at the right end of `a ?-? b`.
    fn right_glyph(self) -> char {
        match self {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        }
    }
}

/// An edge between node indices `a` and `b`, with the mark at each end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub at_a: Endpoint,
    pub at_b: Endpoint,
}

impl Edge {
    pub fn new(a: usize, b: usize, at_a: Endpoint, at_b: Endpoint) -> Self {
        Self { a, b, at_a, at_b }
    }

    pub fn directed(from: usize, to: usize) -> Self {
        Self::new(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    pub fn undirected(a: usize, b: usize) -> Self {
        Self::new(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    /// `a o-o b`.
    pub fn nondirected(a: usize, b: usize) -> Self {
        Self::new(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    pub fn is_directed(&self) -> bool {
        matches!(
            (self.at_a, self.at_b),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    /// Render as `A --> B` given node names.
    pub fn render(&self, names: &[String]) -> String {
        format!(
            "{} {}-{} {}",
            names[self.a],
            self.at_a.left_glyph(),
            self.at_b.right_glyph(),
            names[self.b]
        )
    }
}
