//! End-to-end run: IS score, IS-FGES, then IS-GFCI over one test instance.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use tailor_core::config::TailorConfig;
use tailor_core::data::{Dataset, TestInstance};
use tailor_core::errors::{RunOutcome, TailorResult};
use tailor_core::knowledge::Knowledge;
use tailor_core::traits::Cancellable;

use crate::graph::{EndpointGraph, GraphSnapshot};
use crate::independence::{IndependenceTest, ProbabilisticTest};
use crate::orient::IsGfci;
use crate::score::IsScore;
use crate::search::{IsFges, SearchStep};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// IS-FGES output.
    pub cpdag: EndpointGraph,
    /// IS-GFCI output.
    pub pag: EndpointGraph,
    /// IS score of the search's working DAG, without the edit prior.
    pub is_score: Option<f64>,
    pub trace: Vec<SearchStep>,
    pub cancelled: bool,
}

#[derive(Serialize)]
struct ReportView<'a> {
    cpdag: GraphSnapshot,
    pag: GraphSnapshot,
    is_score: Option<f64>,
    trace: &'a [SearchStep],
    cancelled: bool,
}

impl PipelineReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ReportView {
            cpdag: self.cpdag.snapshot(),
            pag: self.pag.snapshot(),
            is_score: self.is_score,
            trace: &self.trace,
            cancelled: self.cancelled,
        })
    }
}

/// A configured run over training data and one test instance.
pub struct Pipeline {
    config: TailorConfig,
    data: Arc<Dataset>,
    instance: TestInstance,
    knowledge: Knowledge,
    population: Option<EndpointGraph>,
    test: Option<Arc<dyn IndependenceTest>>,
}

impl Pipeline {
    pub fn new(config: TailorConfig, data: Arc<Dataset>, instance: TestInstance) -> Self {
        Self {
            config,
            data,
            instance,
            knowledge: Knowledge::new(),
            population: None,
            test: None,
        }
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// Population backbone. It is also the search's starting graph.
    pub fn with_population_graph(mut self, population: EndpointGraph) -> Self {
        self.population = Some(population);
        self
    }

    /// Replace the probabilistic oracle, e.g. with d-separation in a known DAG.
    pub fn with_independence_test(mut self, test: Arc<dyn IndependenceTest>) -> Self {
        self.test = Some(test);
        self
    }

    pub fn config(&self) -> &TailorConfig {
        &self.config
    }

    #[instrument(skip_all, fields(rows = self.data.num_rows(), vars = self.data.num_columns()))]
    pub fn run(&self, cancel: &impl Cancellable) -> TailorResult<RunOutcome<PipelineReport>> {
        self.config.validate()?;

        let score = IsScore::new(Arc::clone(&self.data), self.instance.clone(), &self.config.score)?;
        let mut fges = IsFges::new(&score, &self.config.search)?.with_knowledge(self.knowledge.clone());
        if let Some(population) = &self.population {
            fges = fges
                .with_population_graph(population.clone())?
                .with_initial_graph(population.clone())?;
        }

        let test: Arc<dyn IndependenceTest> = match &self.test {
            Some(test) => Arc::clone(test),
            None => Arc::new(
                ProbabilisticTest::new(Arc::clone(&self.data), self.config.score.sample_prior, &self.config.oracle)?
                    .with_instance(self.instance.clone()),
            ),
        };
        let gfci = IsGfci::new(test.as_ref(), &self.config.orient)?.with_knowledge(self.knowledge.clone());

        let outcome = gfci.search(&fges, cancel)?;
        let cancelled = outcome.cancelled;
        let result = outcome.value;

        let is_score = match fges.score_dag(&result.fges.dag) {
            Ok(score) => Some(score),
            Err(e) => {
                debug!(error = %e, "working DAG could not be scored");
                None
            }
        };
        info!(
            cpdag_edges = result.fges.graph.num_edges(),
            pag_edges = result.pag.num_edges(),
            steps = result.fges.trace.len(),
            cancelled,
            "pipeline finished"
        );

        let report = PipelineReport {
            cpdag: result.fges.graph,
            pag: result.pag,
            is_score,
            trace: result.fges.trace,
            cancelled,
        };
        Ok(if cancelled {
            RunOutcome::partial(report)
        } else {
            RunOutcome::complete(report)
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("rows", &self.data.num_rows())
            .field("knowledge", &self.knowledge)
            .field("has_population_graph", &self.population.is_some())
            .field("custom_test", &self.test.is_some())
            .finish()
    }
}
