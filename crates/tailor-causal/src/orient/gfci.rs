//! Instance-specific GFCI.
//!
//! Takes the CPDAG found by IS-FGES as the adjacency backbone, prunes
//! triangle edges that some conditioning set over the backbone separates,
//! marks colliders (modified R0) and hands the result to the FCI rules.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use tailor_core::config::OrientConfig;
use tailor_core::errors::{RunOutcome, SearchError};
use tailor_core::knowledge::Knowledge;
use tailor_core::traits::Cancellable;

use super::fci_rules::FciOrient;
use super::sepsets::{SepsetProducer, SepsetsGreedy};
use crate::graph::{Endpoint, EndpointGraph};
use crate::independence::IndependenceTest;
use crate::search::{IsFges, SearchResult};

/// Triangle candidates tested between cancellation checks.
const PRUNE_BATCH: usize = 16;

/// Output of [`IsGfci::search`].
#[derive(Debug, Clone)]
pub struct GfciResult {
    /// The IS-FGES run the PAG was built from.
    pub fges: SearchResult,
    pub pag: EndpointGraph,
}

/// Orientation phase over an independence oracle.
pub struct IsGfci<'t> {
    test: &'t dyn IndependenceTest,
    knowledge: Knowledge,
    config: OrientConfig,
}

impl<'t> IsGfci<'t> {
    pub fn new(test: &'t dyn IndependenceTest, config: &OrientConfig) -> Result<Self, SearchError> {
        config.validate().map_err(|e| SearchError::InvalidArgument {
            reason: e.to_string(),
        })?;
        Ok(Self {
            test,
            knowledge: Knowledge::new(),
            config: config.clone(),
        })
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    /// Run IS-FGES, then orient its CPDAG. If the search is cancelled the
    /// PAG is the partial CPDAG unchanged.
    #[instrument(skip_all, fields(nodes = self.test.names().len()))]
    pub fn search(
        &self,
        fges: &IsFges<'_>,
        cancel: &impl Cancellable,
    ) -> Result<RunOutcome<GfciResult>, SearchError> {
        let outcome = fges.search(cancel);
        if outcome.cancelled {
            let pag = outcome.value.graph.clone();
            return Ok(RunOutcome::partial(GfciResult {
                fges: outcome.value,
                pag,
            }));
        }
        let fges_result = outcome.value;
        let oriented = self.orient(&fges_result.graph, cancel)?;
        Ok(oriented.map(|pag| GfciResult {
            fges: fges_result,
            pag,
        }))
    }

    /// Build a PAG from `fges_graph`. The backbone is only read; the PAG is
    /// a new graph.
    #[instrument(skip_all, fields(edges = fges_graph.num_edges()))]
    pub fn orient(
        &self,
        fges_graph: &EndpointGraph,
        cancel: &impl Cancellable,
    ) -> Result<RunOutcome<EndpointGraph>, SearchError> {
        if fges_graph.names() != self.test.names() {
            return Err(SearchError::VariableMismatch {
                details: format!(
                    "graph has {:?}, independence test has {:?}",
                    fges_graph.names(),
                    self.test.names()
                ),
            });
        }

        let sepsets = SepsetsGreedy::new(fges_graph, self.test, self.config.depth());
        let orient = FciOrient::new(&self.knowledge)
            .with_config(&self.config)
            .with_sepsets(&sepsets);

        let mut graph = fges_graph.clone();
        graph.reorient_all(Endpoint::Circle);
        orient.orient_by_knowledge(&mut graph);

        let Some(removed) = self.prune_triangles(&mut graph, fges_graph, &sepsets, cancel) else {
            return Ok(RunOutcome::partial(graph));
        };
        info!(removed, edges = graph.num_edges(), "triangle pruning");

        let Some(colliders) = self.modified_r0(&mut graph, fges_graph, &sepsets, &orient, cancel) else {
            return Ok(RunOutcome::partial(graph));
        };
        debug!(colliders, "modified R0");

        let finished = orient.final_orientation(&mut graph, cancel)?;
        info!(edges = graph.num_edges(), finished, "orientation complete");
        if finished {
            Ok(RunOutcome::complete(graph))
        } else {
            Ok(RunOutcome::partial(graph))
        }
    }

    /// Remove every edge `a *-* c` closing a triangle `a, b, c` in the
    /// backbone when some sepset for `a`, `c` exists. Sepsets depend only on
    /// the backbone, so candidates are tested in parallel batches.
    ///
    /// `None` when cancelled; `graph` is then untouched.
    fn prune_triangles(
        &self,
        graph: &mut EndpointGraph,
        fges_graph: &EndpointGraph,
        sepsets: &SepsetsGreedy<'_>,
        cancel: &impl Cancellable,
    ) -> Option<usize> {
        let mut candidates = BTreeSet::new();
        for b in fges_graph.nodes() {
            if cancel.is_cancelled() {
                return None;
            }
            let adj = fges_graph.adjacent(b);
            for (i, &a) in adj.iter().enumerate() {
                for &c in &adj[i + 1..] {
                    if graph.is_adjacent(a, c) {
                        candidates.insert((a.min(c), a.max(c)));
                    }
                }
            }
        }

        let candidates: Vec<(usize, usize)> = candidates.into_iter().collect();
        let mut separated = Vec::with_capacity(candidates.len());
        for batch in candidates.chunks(PRUNE_BATCH) {
            if cancel.is_cancelled() {
                debug!(tested = separated.len(), of = candidates.len(), "triangle pruning cancelled");
                return None;
            }
            separated.par_extend(batch.par_iter().map(|&(a, c)| sepsets.sepset(a, c).is_some()));
        }

        let mut removed = 0;
        for (&(a, c), separated) in candidates.iter().zip(separated) {
            if separated && graph.remove_edge(a, c) {
                debug!(a = graph.name(a), c = graph.name(c), "pruned triangle edge");
                removed += 1;
            }
        }
        Some(removed)
    }

    /// Force the backbone's definite colliders and the unshielded colliders
    /// whose sepset excludes the middle node. Each collider is applied whole;
    /// `None` when cancelled between them.
    fn modified_r0(
        &self,
        graph: &mut EndpointGraph,
        fges_graph: &EndpointGraph,
        sepsets: &dyn SepsetProducer,
        orient: &FciOrient<'_>,
        cancel: &impl Cancellable,
    ) -> Option<usize> {
        let mut oriented = 0;
        for b in graph.nodes() {
            let adj = graph.adjacent(b);
            for (i, &a) in adj.iter().enumerate() {
                for &c in &adj[i + 1..] {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let collider = if fges_graph.is_def_collider(a, b, c) {
                        true
                    } else if fges_graph.is_adjacent(a, c) && !graph.is_adjacent(a, c) {
                        sepsets.sepset(a, c).is_some_and(|s| !s.contains(&b))
                    } else {
                        false
                    };
                    if collider && orient_to_collider(graph, orient, a, b, c) {
                        oriented += 1;
                    }
                }
            }
        }
        Some(oriented)
    }
}

/// `a *-> b <-* c`, skipping either arrowhead knowledge vetoes.
fn orient_to_collider(graph: &mut EndpointGraph, orient: &FciOrient<'_>, a: usize, b: usize, c: usize) -> bool {
    let mut changed = false;
    for end in [a, c] {
        if graph.endpoint(end, b) != Some(Endpoint::Arrow) && orient.is_arrowhead_allowed(graph, end, b) {
            graph.set_endpoint(end, b, Endpoint::Arrow);
            changed = true;
        }
    }
    changed
}

impl std::fmt::Debug for IsGfci<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsGfci")
            .field("knowledge", &self.knowledge)
            .field("config", &self.config)
            .finish()
    }
}
