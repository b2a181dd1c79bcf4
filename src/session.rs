use log::info;
use serde::Serialize;
use std::time::Instant;

use crate::data::{Combination, Dataset};
use crate::error::Error;
use crate::filters::FilterConfig;
use crate::fitness::{filter_weights, max_fitness, rank};
use crate::generator::{candidate_count, enumerate_feasible};
use crate::ingest;
use crate::transport::{Chunk, chunk_payload};

/// Summary of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub courses: usize,
    /// Saturates at `u64::MAX`.
    pub candidates: u64,
    pub feasible: usize,
    pub elapsed_ms: u64,
}

/// Ranked combinations plus the weights they were ranked with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSchedules {
    pub report: GenerationReport,
    pub max_fitness: f64,
    pub weights: Vec<FilterWeight>,
    pub combinations: Vec<Combination>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterWeight {
    pub id: String,
    pub weight: f64,
}

/// The feasible set of the latest generation run, kept so that a change in
/// filter priorities only re-ranks instead of regenerating.
#[derive(Debug, Clone)]
pub struct RankingSession {
    report: GenerationReport,
    config: FilterConfig,
    // feasible set in generation order; ranking ties fall back to it
    generated: Vec<Combination>,
    combinations: Vec<Combination>,
    // serialized ranking, keyed by the chunk size it was split with
    chunks: Option<(usize, Vec<Chunk>)>,
}

impl RankingSession {
    pub fn generate(dataset: &Dataset, config: FilterConfig) -> Result<Self, Error> {
        config.validate()?;
        let start_time = Instant::now();

        let candidates = u64::try_from(candidate_count(dataset)).unwrap_or(u64::MAX);
        let generated = enumerate_feasible(dataset);
        let mut combinations = generated.clone();
        rank(&mut combinations, &config);

        let report = GenerationReport {
            courses: dataset.len(),
            candidates,
            feasible: combinations.len(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        if combinations.is_empty() {
            info!("No feasible timetable among {} candidates", candidates);
        }
        Ok(Self {
            report,
            config,
            generated,
            combinations,
            chunks: None,
        })
    }

    /// Priority order (or filter parameters) changed: re-rank the stored set.
    pub fn reprioritize(&mut self, config: FilterConfig) -> Result<(), Error> {
        config.validate()?;
        let mut combinations = self.generated.clone();
        rank(&mut combinations, &config);
        self.combinations = combinations;
        self.config = config;
        self.chunks = None;
        Ok(())
    }

    pub fn report(&self) -> GenerationReport {
        self.report
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn ranked(&self) -> RankedSchedules {
        let weights = filter_weights(&self.config);
        RankedSchedules {
            report: self.report,
            max_fitness: max_fitness(&weights),
            weights: weights
                .into_iter()
                .map(|(id, weight)| FilterWeight {
                    id: id.to_string(),
                    weight,
                })
                .collect(),
            combinations: self.combinations.clone(),
        }
    }

    /// The current ranking split into transport chunks. Serialized once per
    /// ranking and chunk size.
    pub fn chunks(&mut self, chunk_size: usize) -> Result<&[Chunk], Error> {
        let stale = self
            .chunks
            .as_ref()
            .is_none_or(|(size, _)| *size != chunk_size);
        if stale {
            let chunks = chunk_payload(&self.combinations, chunk_size)?;
            self.chunks = Some((chunk_size, chunks));
        }
        Ok(self
            .chunks
            .as_ref()
            .map(|(_, chunks)| chunks.as_slice())
            .unwrap_or_default())
    }

    pub fn instructors(&self) -> Vec<String> {
        ingest::instructors(&self.combinations)
    }
}
