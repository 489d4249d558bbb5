//! Instance-specific FGES.
//!
//! Greedy equivalence search over CPDAGs where every local score comes from
//! [`IsScore`] evaluated against a fixed population graph. A run is two rounds
//! of forward insertion (FES) followed by backward deletion (BES):
//!
//! 1. Heuristic speedup: only pairs found by the first step (effect edges)
//!    are considered.
//! 2. With faithfulness assumed, pairs two steps apart through a noncollider
//!    are covered; otherwise every unconditionally d-connected pair is
//!    reconsidered so path cancellations can be recovered.
//!
//! Candidate bumps are computed in parallel against an immutable graph and
//! merged into the arrow queue in pair order, so results do not depend on
//! the thread count.
//!
//! The IS score is not score-equivalent, so the search also carries a working
//! DAG: the extension of the current CPDAG that keeps the orientation each
//! accepted bump was computed for. An edit is applied only if the working
//! DAG's score does not drop.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use tailor_core::config::SearchConfig;
use tailor_core::errors::{RunOutcome, SearchError, TailorResult};
use tailor_core::knowledge::Knowledge;
use tailor_core::traits::Cancellable;

use super::arrow::{Arrow, ArrowQueue};
use super::subsets::{all_subsets, difference_sorted, is_subset_sorted, subsets_of_size, union_sorted};
use crate::graph::paths::{exists_semi_directed_path, unconditionally_d_connected};
use crate::graph::{dag_from_cpdag, dag_from_cpdag_guided, EndpointGraph, MeekRules};
use crate::score::IsScore;

/// Which candidate pairs a forward phase may consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    HeuristicSpeedup,
    CoverNoncolliders,
    AllowUnfaithfulness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Insert,
    Delete,
}

/// One applied insertion or deletion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStep {
    pub kind: EditKind,
    pub from: String,
    pub to: String,
    /// T for insertions, H for deletions.
    pub subset: Vec<String>,
    pub bump: f64,
    /// Working score after the edit, edit prior included.
    pub score: f64,
    pub mode: Mode,
}

/// Output of [`IsFges::search`].
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The learned CPDAG.
    pub graph: EndpointGraph,
    /// The member of `graph`'s class the trace was scored on.
    pub dag: EndpointGraph,
    /// Working score of `dag`, edit prior included.
    pub score: f64,
    /// Applied edits in order.
    pub trace: Vec<SearchStep>,
}

/// Relative slack when comparing working scores.
const SCORE_TOLERANCE: f64 = 1e-9;

/// Result of scoring one candidate pair.
enum Evaluation {
    /// Nothing to record; any queued arrow for the pair stays.
    Skipped,
    /// Queued arrows for `(a, b)` are replaced by `arrow`.
    Scored {
        a: usize,
        b: usize,
        neighbors_of_b: Option<Vec<usize>>,
        arrow: Option<Arrow>,
    },
}

/// A positive first-step bump for the pair `x`, `y`.
struct FirstEdge {
    x: usize,
    y: usize,
    forward: f64,
    backward: f64,
    in_context: bool,
}

/// Mutable state of one search run.
struct SearchState {
    graph: EndpointGraph,
    dag: EndpointGraph,
    score: f64,
    effect_edges: EndpointGraph,
    arrows: ArrowQueue,
    /// Undirected neighbours of each node when it was last scored.
    neighbors: Vec<Option<Vec<usize>>>,
    mode: Mode,
    trace: Vec<SearchStep>,
}

impl SearchState {
    fn new(graph: EndpointGraph, dag: EndpointGraph, score: f64) -> Self {
        let n = graph.num_nodes();
        Self {
            effect_edges: graph.empty_like(),
            graph,
            dag,
            score,
            arrows: ArrowQueue::new(),
            neighbors: vec![None; n],
            mode: Mode::HeuristicSpeedup,
            trace: Vec::new(),
        }
    }

    fn reset_queue(&mut self) {
        self.arrows.clear();
        self.neighbors.iter_mut().for_each(|n| *n = None);
    }

    fn apply(&mut self, evaluations: Vec<Evaluation>) {
        for evaluation in evaluations {
            if let Evaluation::Scored {
                a,
                b,
                neighbors_of_b,
                arrow,
            } = evaluation
            {
                if let Some(neighbors) = neighbors_of_b {
                    self.neighbors[b] = Some(neighbors);
                }
                self.arrows.clear_pair(a, b);
                if let Some(arrow) = arrow {
                    self.arrows.push(arrow);
                }
            }
        }
    }

    /// Nodes whose undirected neighbourhood differs from the stored one.
    fn changed_neighborhoods(&self) -> BTreeSet<usize> {
        self.graph
            .nodes()
            .filter(|&n| self.neighbors[n].as_deref() != Some(self.graph.undirected_neighbors(n).as_slice()))
            .collect()
    }

    fn record(&mut self, kind: EditKind, arrow: &Arrow) {
        let names = self.graph.names();
        self.trace.push(SearchStep {
            kind,
            from: names[arrow.a].clone(),
            to: names[arrow.b].clone(),
            subset: arrow.h_or_t.iter().map(|&i| names[i].clone()).collect(),
            bump: arrow.bump,
            score: self.score,
            mode: self.mode,
        });
    }

    fn into_result(self) -> SearchResult {
        SearchResult {
            graph: self.graph,
            dag: self.dag,
            score: self.score,
            trace: self.trace,
        }
    }
}

/// Instance-specific greedy equivalence search.
#[derive(Debug)]
pub struct IsFges<'s> {
    score: &'s IsScore,
    names: Vec<String>,
    knowledge: Knowledge,
    population: EndpointGraph,
    pop_parents: Vec<Vec<usize>>,
    pop_children: Vec<Vec<usize>>,
    initial: Option<EndpointGraph>,
    adjacencies: Option<EndpointGraph>,
    max_degree: usize,
    faithfulness_assumed: bool,
    symmetric_first_step: bool,
    pool: Option<rayon::ThreadPool>,
}

impl<'s> IsFges<'s> {
    /// A search over the score's variables with an empty population graph.
    pub fn new(score: &'s IsScore, config: &SearchConfig) -> TailorResult<Self> {
        config.validate()?;
        let names = score.names();
        let n = names.len();
        let max_degree = config.degree_cap(score.sample_size());
        let pool = if config.parallelism > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.parallelism)
                .build()
                .ok()
        } else {
            None
        };
        Ok(Self {
            score,
            population: EndpointGraph::new(names.clone()),
            names,
            knowledge: Knowledge::new(),
            pop_parents: vec![Vec::new(); n],
            pop_children: vec![Vec::new(); n],
            initial: None,
            adjacencies: None,
            max_degree,
            faithfulness_assumed: config.faithfulness_assumed,
            symmetric_first_step: config.symmetric_first_step,
            pool,
        })
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// POP context for every local score.
    pub fn with_population_graph(mut self, population: EndpointGraph) -> Result<Self, SearchError> {
        self.score.check_graph(&population)?;
        self.pop_parents = population.nodes().map(|n| population.parents(n)).collect();
        self.pop_children = population.nodes().map(|n| population.children(n)).collect();
        self.population = population;
        Ok(self)
    }

    /// Starting CPDAG. Its edges also seed the effect-edge set and the
    /// first-step parent context.
    pub fn with_initial_graph(mut self, initial: EndpointGraph) -> Result<Self, SearchError> {
        self.score.check_graph(&initial)?;
        self.initial = Some(initial);
        Ok(self)
    }

    /// Restrict every considered pair to those adjacent in `adjacencies`.
    pub fn with_adjacencies(mut self, adjacencies: EndpointGraph) -> Result<Self, SearchError> {
        self.score.check_graph(&adjacencies)?;
        self.adjacencies = Some(adjacencies);
        Ok(self)
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn population_graph(&self) -> &EndpointGraph {
        &self.population
    }

    /// Sum of local scores of `dag` in the search's POP context, without
    /// the structure-edit prior.
    pub fn score_dag(&self, dag: &EndpointGraph) -> Result<f64, SearchError> {
        self.score.score_dag(dag, &self.population)
    }

    /// Sum of full local scores of `dag` in the search's POP context, edit
    /// prior included. This is the score accepted edits never lower.
    pub fn working_score(&self, dag: &EndpointGraph) -> f64 {
        dag.nodes()
            .map(|y| {
                self.score
                    .local_score(y, &dag.parents(y), &self.pop_parents[y], &self.pop_children[y])
            })
            .sum()
    }

    /// Run the search. On cancellation the last fully-applied CPDAG is
    /// returned with `cancelled` set.
    #[instrument(skip_all, fields(nodes = self.names.len(), max_degree = self.max_degree))]
    pub fn search(&self, cancel: &impl Cancellable) -> RunOutcome<SearchResult> {
        let mut graph = self
            .initial
            .clone()
            .unwrap_or_else(|| self.population.empty_like());
        self.add_required_edges(&mut graph);
        let dag = dag_from_cpdag(&graph).unwrap_or_else(|e| {
            debug!(error = %e, "start graph has no DAG extension, scoring its directed edges");
            graph.clone()
        });
        let score = self.working_score(&dag);
        let mut state = SearchState::new(graph, dag, score);

        let widened = if self.faithfulness_assumed {
            Mode::CoverNoncolliders
        } else {
            Mode::AllowUnfaithfulness
        };

        for mode in [Mode::HeuristicSpeedup, widened] {
            if cancel.is_cancelled() {
                return RunOutcome::partial(state.into_result());
            }
            state.mode = mode;
            if mode == Mode::HeuristicSpeedup {
                self.initialize_first_step(&mut state);
            } else {
                self.initialize_from_existing(&mut state);
            }
            info!(?mode, queued = state.arrows.len(), "forward equivalence search");
            if !self.fes(&mut state, cancel) {
                return RunOutcome::partial(state.into_result());
            }
            info!(?mode, edges = state.graph.num_edges(), "backward equivalence search");
            if !self.bes(&mut state, cancel) {
                return RunOutcome::partial(state.into_result());
            }
        }

        info!(
            edges = state.graph.num_edges(),
            steps = state.trace.len(),
            "instance-specific FGES complete"
        );
        RunOutcome::complete(state.into_result())
    }

    // ---- initialization -------------------------------------------------

    fn initialize_first_step(&self, state: &mut SearchState) {
        state.reset_queue();
        state.effect_edges = state.graph.empty_like();
        let n = self.names.len();
        state.neighbors.iter_mut().for_each(|s| *s = Some(Vec::new()));

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (j, i)))
            .filter(|&(x, y)| !(self.forbidden(x, y) && self.forbidden(y, x)) && self.allowed_adjacency(x, y))
            .collect();

        let firsts = self.evaluate_all(&pairs, |x, y| self.first_step_bump(x, y));

        let mut in_context = Vec::new();
        for first in firsts.into_iter().flatten() {
            let FirstEdge {
                x,
                y,
                forward,
                backward,
                in_context: ctx,
            } = first;
            state.effect_edges.add_undirected(x, y);
            if ctx {
                in_context.push((x, y));
                in_context.push((y, x));
                continue;
            }
            state.arrows.push(first_step_arrow(x, y, forward.max(backward)));
            if self.symmetric_first_step && backward > 0.0 {
                state.arrows.push(first_step_arrow(y, x, backward));
            }
        }

        let snapshot = &*state;
        let evaluations = self.evaluate_all(&in_context, |a, b| self.evaluate_forward(snapshot, a, b));
        state.apply(evaluations);
        debug!(
            effect_edges = state.effect_edges.num_edges(),
            queued = state.arrows.len(),
            "first step scored"
        );
    }

    fn first_step_bump(&self, x: usize, y: usize) -> Option<FirstEdge> {
        let context = self
            .initial
            .as_ref()
            .filter(|g| g.degree(x) > 0 || g.degree(y) > 0);
        let context_parents = |child: usize, parent: usize| -> Vec<usize> {
            context
                .map(|g| g.parents(child).into_iter().filter(|&p| p != parent).collect())
                .unwrap_or_default()
        };

        let forward = self.score_change(y, &context_parents(y, x), x);
        let backward = if self.symmetric_first_step {
            self.score_change(x, &context_parents(x, y), y)
        } else {
            f64::NEG_INFINITY
        };
        (forward.max(backward) > 0.0).then_some(FirstEdge {
            x,
            y,
            forward,
            backward,
            in_context: context.is_some(),
        })
    }

    /// Second-round queue: every node d-connected to `y` that is not yet an
    /// effect neighbour of `y`.
    fn initialize_from_existing(&self, state: &mut SearchState) {
        state.reset_queue();
        if let Some(initial) = &self.initial {
            for edge in initial.edges() {
                if !state.effect_edges.is_adjacent(edge.a, edge.b) {
                    state.effect_edges.add_undirected(edge.a, edge.b);
                }
            }
        }

        let mut pairs = Vec::new();
        for y in state.graph.nodes() {
            let mut reach = unconditionally_d_connected(&state.graph, y);
            reach.remove(&y);
            for a in state.effect_edges.adjacent(y) {
                reach.remove(&a);
            }
            for x in reach {
                if self.forbidden(x, y) && self.forbidden(y, x) {
                    continue;
                }
                if !self.allowed_adjacency(x, y) {
                    continue;
                }
                pairs.push((x, y));
            }
        }

        let snapshot = &*state;
        let evaluations = self.evaluate_all(&pairs, |a, b| self.evaluate_forward(snapshot, a, b));
        state.apply(evaluations);
        debug!(pairs = pairs.len(), queued = state.arrows.len(), "second round queued");
    }

    /// Orient the start graph by required and forbidden edges.
    fn add_required_edges(&self, graph: &mut EndpointGraph) {
        if self.knowledge.is_empty() {
            return;
        }
        for required in self.knowledge.required_edges() {
            let (Some(a), Some(b)) = (graph.node_index(&required.from), graph.node_index(&required.to)) else {
                continue;
            };
            if a != b && !graph.is_ancestor_of(b, a) {
                graph.remove_edge(a, b);
                graph.add_directed(a, b);
            }
        }
        for edge in graph.edges() {
            let (a, b) = if self.forbidden(edge.a, edge.b) {
                (edge.a, edge.b)
            } else if self.forbidden(edge.b, edge.a) {
                (edge.b, edge.a)
            } else {
                continue;
            };
            if graph.is_directed(b, a) {
                continue;
            }
            graph.remove_edge(a, b);
            if graph.is_ancestor_of(a, b) {
                graph.add_edge(edge.a, edge.b, edge.at_a, edge.at_b);
            } else {
                graph.add_directed(b, a);
            }
        }
    }

    // ---- forward --------------------------------------------------------

    /// Returns false if cancelled.
    fn fes(&self, state: &mut SearchState, cancel: &impl Cancellable) -> bool {
        while let Some(arrow) = state.arrows.pop() {
            if cancel.is_cancelled() {
                return false;
            }
            let (x, y) = (arrow.a, arrow.b);
            let graph = &state.graph;
            if graph.is_adjacent(x, y) {
                continue;
            }
            if graph.degree(x) >= self.max_degree || graph.degree(y) >= self.max_degree {
                continue;
            }
            let na_yx = na_yx(graph, x, y);
            if na_yx != arrow.na_yx {
                continue;
            }
            if arrow.t_neighbors.as_deref() != Some(t_neighbors(graph, x, y).as_slice()) {
                continue;
            }
            if !self.valid_insert(graph, x, y, &arrow.h_or_t, &na_yx) {
                continue;
            }

            let before = state.graph.clone();
            let mut hints = state.dag.clone();
            state.graph.add_directed(x, y);
            hints.add_directed(x, y);
            for &t in &arrow.h_or_t {
                state.graph.add_directed(t, y);
                hints.add_directed(t, y);
            }
            for &n in &na_yx {
                hints.add_directed(n, y);
            }
            MeekRules::new(&self.knowledge).orient_implied(&mut state.graph);
            if !self.commit(state, before, &hints) {
                continue;
            }
            state.record(EditKind::Insert, &arrow);
            debug!(
                from = %self.names[x],
                to = %self.names[y],
                bump = arrow.bump,
                score = state.score,
                "insert"
            );

            let mut to_process = state.changed_neighborhoods();
            to_process.insert(x);
            to_process.insert(y);
            self.reevaluate_forward(state, &to_process);
        }
        true
    }

    fn reevaluate_forward(&self, state: &mut SearchState, nodes: &BTreeSet<usize>) {
        let graph = &state.graph;
        let mut pairs = Vec::new();
        for &r in nodes {
            let candidates: Vec<usize> = match state.mode {
                Mode::HeuristicSpeedup => state.effect_edges.adjacent(r),
                Mode::CoverNoncolliders => two_step_noncolliders(graph, r),
                Mode::AllowUnfaithfulness => unconditionally_d_connected(graph, r).into_iter().collect(),
            };
            for w in candidates {
                if w == r || !self.allowed_adjacency(w, r) {
                    continue;
                }
                if !graph.is_adjacent(w, r) {
                    pairs.push((w, r));
                }
            }
        }
        for &(w, r) in &pairs {
            state.arrows.clear_pair(w, r);
        }
        let snapshot = &*state;
        let evaluations = self.evaluate_all(&pairs, |a, b| self.evaluate_forward(snapshot, a, b));
        state.apply(evaluations);
    }

    /// Best insertion `a --> b` over every clique-extending T.
    fn evaluate_forward(&self, state: &SearchState, a: usize, b: usize) -> Evaluation {
        if state.mode == Mode::HeuristicSpeedup && !state.effect_edges.is_adjacent(a, b) {
            return Evaluation::Skipped;
        }
        if !self.allowed_adjacency(a, b) {
            return Evaluation::Skipped;
        }
        let graph = &state.graph;
        let neighbors_of_b = Some(graph.undirected_neighbors(b));
        let na_yx = na_yx(graph, a, b);
        if graph.is_adjacent(a, b) || self.forbidden(a, b) || !graph.is_clique(&na_yx) {
            return Evaluation::Scored {
                a,
                b,
                neighbors_of_b,
                arrow: None,
            };
        }

        let t_neighbors = t_neighbors(graph, a, b);
        let parents = graph.parents(b);
        let mut best: Option<(Vec<usize>, f64)> = None;
        let mut previous: Vec<Vec<usize>> = vec![Vec::new()];

        'levels: for size in 0..=t_neighbors.len() {
            let mut cliques = Vec::new();
            for t in subsets_of_size(&t_neighbors, size) {
                let union = union_sorted(&na_yx, &t);
                if !previous.iter().any(|c| is_subset_sorted(c, &union)) {
                    break 'levels;
                }
                if !graph.is_clique(&union) {
                    continue;
                }
                let bump = self.score_change(b, &union_sorted(&union, &parents), a);
                cliques.push(union);
                if bump > 0.0 && best.as_ref().map_or(true, |(_, top)| bump > *top) {
                    best = Some((t, bump));
                }
            }
            previous = cliques;
        }

        Evaluation::Scored {
            a,
            b,
            neighbors_of_b,
            arrow: best.map(|(t, bump)| Arrow {
                a,
                b,
                h_or_t: t,
                t_neighbors: Some(t_neighbors),
                na_yx,
                bump,
            }),
        }
    }

    fn valid_insert(&self, graph: &EndpointGraph, x: usize, y: usize, t: &[usize], na_yx: &[usize]) -> bool {
        if self.forbidden(x, y) || t.iter().any(|&n| self.forbidden(n, y)) {
            return false;
        }
        let union = union_sorted(t, na_yx);
        graph.is_clique(&union) && !exists_semi_directed_path(graph, y, x, &union, graph.num_nodes())
    }

    // ---- backward -------------------------------------------------------

    /// Returns false if cancelled.
    fn bes(&self, state: &mut SearchState, cancel: &impl Cancellable) -> bool {
        state.reset_queue();
        self.initialize_backward(state);

        while let Some(arrow) = state.arrows.pop() {
            if cancel.is_cancelled() {
                return false;
            }
            let (x, y) = (arrow.a, arrow.b);
            let graph = &state.graph;
            if !graph.is_adjacent(x, y) || graph.is_directed(y, x) {
                continue;
            }
            if na_yx(graph, x, y) != arrow.na_yx {
                continue;
            }
            if !self.valid_delete(graph, x, y, &arrow.h_or_t, &arrow.na_yx) {
                continue;
            }

            let before = state.graph.clone();
            let mut hints = state.dag.clone();
            state.graph.remove_edge(x, y);
            hints.remove_edge(x, y);
            for &n in &difference_sorted(&arrow.na_yx, &arrow.h_or_t) {
                hints.add_directed(n, y);
            }
            for &h in &arrow.h_or_t {
                if state.graph.is_parent_of(h, y) || state.graph.is_parent_of(h, x) {
                    continue;
                }
                state.graph.add_directed(y, h);
                hints.add_directed(y, h);
                if state.graph.is_undirected(x, h) {
                    state.graph.add_directed(x, h);
                    hints.add_directed(x, h);
                }
            }
            MeekRules::new(&self.knowledge).orient_implied(&mut state.graph);
            if !self.commit(state, before, &hints) {
                continue;
            }
            state.record(EditKind::Delete, &arrow);
            debug!(
                from = %self.names[x],
                to = %self.names[y],
                bump = arrow.bump,
                score = state.score,
                "delete"
            );

            let mut to_process = state.changed_neighborhoods();
            to_process.insert(x);
            to_process.insert(y);
            let ax = state.graph.adjacent(x);
            to_process.extend(state.graph.adjacent(y).into_iter().filter(|n| ax.contains(n)));
            self.reevaluate_backward(state, &to_process);
        }
        true
    }

    fn initialize_backward(&self, state: &mut SearchState) {
        let mut pairs = Vec::new();
        let mut touched = BTreeSet::new();
        for edge in state.graph.edges() {
            let (x, y) = (edge.a, edge.b);
            if self.edge_required(x, y) {
                continue;
            }
            state.arrows.clear_pair(x, y);
            state.arrows.clear_pair(y, x);
            pairs.extend(deletion_pairs(&state.graph, x, y));
            touched.insert(x);
            touched.insert(y);
        }
        let graph = &state.graph;
        let evaluations = self.evaluate_all(&pairs, |a, b| self.evaluate_backward(graph, a, b));
        state.apply(evaluations);
        for n in touched {
            state.neighbors[n] = Some(state.graph.undirected_neighbors(n));
        }
    }

    fn reevaluate_backward(&self, state: &mut SearchState, nodes: &BTreeSet<usize>) {
        let mut pairs = Vec::new();
        for &r in nodes {
            state.neighbors[r] = Some(state.graph.undirected_neighbors(r));
            for w in state.graph.adjacent(r) {
                pairs.extend(deletion_pairs(&state.graph, w, r));
            }
        }
        let graph = &state.graph;
        let evaluations = self.evaluate_all(&pairs, |a, b| self.evaluate_backward(graph, a, b));
        state.apply(evaluations);
    }

    /// Best deletion of `a --> b` over every subset H of NaYX.
    fn evaluate_backward(&self, graph: &EndpointGraph, a: usize, b: usize) -> Evaluation {
        if self.edge_required(a, b) {
            return Evaluation::Skipped;
        }
        let na_yx = na_yx(graph, a, b);
        let parents = graph.parents(b);
        let mut best: Option<(Vec<usize>, f64)> = None;

        for h in all_subsets(&na_yx) {
            if h.iter().any(|&n| self.forbidden(n, b)) {
                continue;
            }
            let mut conditioning = union_sorted(&difference_sorted(&na_yx, &h), &parents);
            conditioning.retain(|&p| p != a);
            let bump = -self.score_change(b, &conditioning, a);
            if bump >= 0.0 && best.as_ref().map_or(true, |(_, top)| bump > *top) {
                best = Some((h, bump));
            }
        }

        Evaluation::Scored {
            a,
            b,
            neighbors_of_b: None,
            arrow: best.map(|(h, bump)| Arrow {
                a,
                b,
                h_or_t: h,
                t_neighbors: None,
                na_yx,
                bump,
            }),
        }
    }

    fn valid_delete(&self, graph: &EndpointGraph, x: usize, y: usize, h: &[usize], na_yx: &[usize]) -> bool {
        if h.iter().any(|&n| self.forbidden(x, n) || self.forbidden(y, n)) {
            return false;
        }
        graph.is_clique(&difference_sorted(na_yx, h))
    }

    // ---- shared ---------------------------------------------------------

    /// Extend the edited CPDAG to a DAG that keeps the orientations in
    /// `hints` where the class allows, and adopt it unless the working score
    /// drops. A rejected edit restores `before`.
    fn commit(&self, state: &mut SearchState, before: EndpointGraph, hints: &EndpointGraph) -> bool {
        let dag = match dag_from_cpdag_guided(&state.graph, hints) {
            Ok(dag) => dag,
            Err(e) => {
                debug!(error = %e, "edit rejected");
                state.graph = before;
                return false;
            }
        };
        let score = self.working_score(&dag);
        if score < state.score - SCORE_TOLERANCE * state.score.abs().max(1.0) {
            debug!(before = state.score, after = score, "edit rejected, working score would drop");
            state.graph = before;
            return false;
        }
        state.dag = dag;
        state.score = score;
        true
    }

    /// Score each pair on the configured pool, results in pair order.
    fn evaluate_all<T, F>(&self, pairs: &[(usize, usize)], eval: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync,
    {
        let run = || pairs.par_iter().map(|&(a, b)| eval(a, b)).collect::<Vec<_>>();
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Change in the local score of `y` from adding `x` to `parents`.
    fn score_change(&self, y: usize, parents: &[usize], x: usize) -> f64 {
        debug_assert!(x != y && !parents.contains(&y));
        self.score
            .local_score_diff(x, y, parents, &self.pop_parents[y], &self.pop_children[y])
    }

    fn forbidden(&self, from: usize, to: usize) -> bool {
        !self.knowledge.is_empty() && self.knowledge.is_forbidden(&self.names[from], &self.names[to])
    }

    fn edge_required(&self, a: usize, b: usize) -> bool {
        !self.knowledge.is_empty() && !self.knowledge.no_edge_required(&self.names[a], &self.names[b])
    }

    fn allowed_adjacency(&self, a: usize, b: usize) -> bool {
        self.adjacencies.as_ref().map_or(true, |g| g.is_adjacent(a, b))
    }
}

fn first_step_arrow(a: usize, b: usize, bump: f64) -> Arrow {
    Arrow {
        a,
        b,
        h_or_t: Vec::new(),
        t_neighbors: Some(Vec::new()),
        na_yx: Vec::new(),
        bump,
    }
}

/// Undirected neighbours of `y` adjacent to `x`.
fn na_yx(graph: &EndpointGraph, x: usize, y: usize) -> Vec<usize> {
    graph
        .undirected_neighbors(y)
        .into_iter()
        .filter(|&z| z != x && graph.is_adjacent(z, x))
        .collect()
}

/// Undirected neighbours of `y` not adjacent to `x`.
fn t_neighbors(graph: &EndpointGraph, x: usize, y: usize) -> Vec<usize> {
    graph
        .undirected_neighbors(y)
        .into_iter()
        .filter(|&z| z != x && !graph.is_adjacent(z, x))
        .collect()
}

/// Nodes `m` reached by `x *-* n *-* m` where `m` is not adjacent to `x` and
/// `n` is not a definite collider between them.
fn two_step_noncolliders(graph: &EndpointGraph, x: usize) -> Vec<usize> {
    let mut out = BTreeSet::new();
    for n in graph.adjacent(x) {
        for m in graph.adjacent(n) {
            if m == x || graph.is_adjacent(x, m) || graph.is_def_collider(m, n, x) {
                continue;
            }
            out.insert(m);
        }
    }
    out.into_iter().collect()
}

/// Ordered deletion candidates for the edge between `w` and `r`.
fn deletion_pairs(graph: &EndpointGraph, w: usize, r: usize) -> Vec<(usize, usize)> {
    if graph.is_directed(w, r) {
        vec![(w, r)]
    } else if graph.is_directed(r, w) {
        vec![(r, w)]
    } else if graph.is_undirected(w, r) {
        vec![(w, r), (r, w)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn neighbourhood_split_by_adjacency_to_x() {
        let mut g = EndpointGraph::new(names(&["X", "Y", "A", "B"]));
        g.add_undirected(1, 2);
        g.add_undirected(1, 3);
        g.add_directed(0, 2);
        assert_eq!(na_yx(&g, 0, 1), vec![2]);
        assert_eq!(t_neighbors(&g, 0, 1), vec![3]);
    }

    #[test]
    fn two_step_skips_definite_colliders() {
        let mut g = EndpointGraph::new(names(&["A", "B", "C", "D"]));
        g.add_directed(0, 1);
        g.add_directed(2, 1);
        g.add_undirected(0, 3);
        g.add_undirected(3, 2);
        assert_eq!(two_step_noncolliders(&g, 0), vec![2]);
        g.remove_edge(0, 3);
        assert!(two_step_noncolliders(&g, 0).is_empty());
    }

    #[test]
    fn deletion_pairs_follow_orientation() {
        let mut g = EndpointGraph::new(names(&["A", "B"]));
        g.add_directed(1, 0);
        assert_eq!(deletion_pairs(&g, 0, 1), vec![(1, 0)]);
        g.add_undirected(0, 1);
        assert_eq!(deletion_pairs(&g, 0, 1), vec![(0, 1), (1, 0)]);
    }
}
