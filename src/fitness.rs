use std::collections::HashSet;

use log::{debug, info};

use crate::data::{Combination, Weekday};
use crate::filters::{DaysOfWeekParams, FilterConfig, FilterKind};

/// 1 + 2 + ... + n
pub fn summation(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Linearly descending weights for `count` ranked items, summing to 1.
///
/// Position 1 (top priority) gets `count / summation(count)`, the last one
/// gets `1 / summation(count)`. No items means no weights.
pub fn normalized_weights(count: usize) -> Vec<f64> {
    let total = summation(count);
    if total == 0 {
        return Vec::new();
    }
    (1..=count)
        .map(|position| (count - position + 1) as f64 / total as f64)
        .collect()
}

/// Each active filter with its normalized weight, highest priority first.
pub fn filter_weights(config: &FilterConfig) -> Vec<(FilterKind, f64)> {
    let order = config.priority_order();
    let weights = normalized_weights(order.len());
    order.into_iter().zip(weights).collect()
}

pub fn max_fitness(weights: &[(FilterKind, f64)]) -> f64 {
    let mut max_fitness = 0.0;
    for (_, weight) in weights {
        max_fitness += weight;
    }
    max_fitness
}

/// A soft preference that scores a feasible combination.
pub trait Criterion {
    fn kind(&self) -> FilterKind;
    fn score(&self, combination: &Combination) -> f64;
}

/// Rewards keeping the user's target days free.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOfWeekCriterion {
    day_weights: Vec<(Weekday, f64)>,
}

impl DayOfWeekCriterion {
    pub fn new(params: &DaysOfWeekParams) -> Self {
        let days = params.target_days();
        let weights = normalized_weights(days.len());
        Self {
            day_weights: days.into_iter().zip(weights).collect(),
        }
    }

    pub fn day_weights(&self) -> &[(Weekday, f64)] {
        &self.day_weights
    }

    /// `(objective, penalty)`: weight of target days kept free and weight of
    /// target days that have a class.
    pub fn objective_and_penalty(&self, combination: &Combination) -> (f64, f64) {
        let occupied: HashSet<Weekday> = combination.details().map(|detail| detail.day).collect();
        let mut objective = 0.0;
        let mut penalty = 0.0;
        for (day, weight) in &self.day_weights {
            if occupied.contains(day) {
                penalty += weight;
            } else {
                objective += weight;
            }
        }
        (objective, penalty)
    }
}

impl Criterion for DayOfWeekCriterion {
    fn kind(&self) -> FilterKind {
        FilterKind::DaysOfWeek
    }

    fn score(&self, combination: &Combination) -> f64 {
        let (objective, penalty) = self.objective_and_penalty(combination);
        objective * (1.0 - penalty)
    }
}

/// Scoring branch for a filter, if it has one.
// Time window, class gap and instructor filters only take part in weighting.
fn criterion_for(kind: FilterKind, config: &FilterConfig) -> Option<Box<dyn Criterion>> {
    match kind {
        FilterKind::DaysOfWeek => {
            let params = config.days_of_week.clone().unwrap_or_default();
            Some(Box::new(DayOfWeekCriterion::new(&params)))
        }
        FilterKind::Time | FilterKind::ClassGap | FilterKind::Instructor => None,
    }
}

/// Scores every combination and sorts them best first.
///
/// Fitness starts at the maximum fitness; each active filter with a scoring
/// branch then overwrites it, in priority order, so the last scoring filter
/// decides the final value. Sorting is stable.
pub fn rank(combinations: &mut [Combination], config: &FilterConfig) {
    let weights = filter_weights(config);
    let max_fitness = max_fitness(&weights);
    info!(
        "Ranking {} combinations with {} active filters (max fitness {:.4})",
        combinations.len(),
        weights.len(),
        max_fitness
    );
    debug!("Filter weights: {:?}", weights);

    let criteria: Vec<Box<dyn Criterion>> = weights
        .iter()
        .filter_map(|(kind, _)| criterion_for(*kind, config))
        .collect();
    debug!(
        "Scoring filters: {:?}",
        criteria.iter().map(|c| c.kind()).collect::<Vec<_>>()
    );

    for combination in combinations.iter_mut() {
        let mut fitness = max_fitness;
        for criterion in &criteria {
            fitness = criterion.score(combination);
        }
        combination.fitness = Some(fitness);
    }

    combinations.sort_by(|a, b| fitness_of(b).total_cmp(&fitness_of(a)));
}

pub fn rank_owned(mut combinations: Vec<Combination>, config: &FilterConfig) -> Vec<Combination> {
    rank(&mut combinations, config);
    combinations
}

fn fitness_of(combination: &Combination) -> f64 {
    combination.fitness.unwrap_or(0.0)
}
