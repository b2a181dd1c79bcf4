use crate::data::{ClassOption, Combination, CourseEntry, CourseOffering, Dataset};
use itertools::Itertools;
use log::{debug, info, trace};
use std::time::Instant;

/// Number of combinations an unconstrained run produces.
pub fn candidate_count(dataset: &Dataset) -> u128 {
    dataset
        .offerings()
        .map(|offering| offering.options.len() as u128)
        .fold(1u128, |acc, n| acc.saturating_mul(n))
}

/// Every assignment of one option per course, in course order.
pub fn enumerate_all(dataset: &Dataset) -> Vec<Combination> {
    enumerate(dataset, |_| true)
}

/// Assignments that pass the hard constraints (no overlap, seats left).
pub fn enumerate_feasible(dataset: &Dataset) -> Vec<Combination> {
    enumerate(dataset, |options| !violates_hard_constraints(options))
}

fn enumerate<F>(dataset: &Dataset, accept: F) -> Vec<Combination>
where
    F: Fn(&[&ClassOption]) -> bool,
{
    let start_time = Instant::now();
    let courses: Vec<&CourseOffering> = dataset.offerings().collect();
    info!(
        "Enumerating {} courses with {} candidate combinations...",
        courses.len(),
        candidate_count(dataset)
    );

    let mut current: Vec<&ClassOption> = Vec::with_capacity(courses.len());
    let mut results = Vec::new();
    backtrack(&courses, &mut current, &mut results, &accept);

    info!(
        "Kept {} combinations in {:.2?}",
        results.len(),
        start_time.elapsed()
    );
    results
}

// depth is the length of `current`; the buffer is pushed and popped in place
// and only copied out at the leaf
fn backtrack<'a, F>(
    courses: &[&'a CourseOffering],
    current: &mut Vec<&'a ClassOption>,
    results: &mut Vec<Combination>,
    accept: &F,
) where
    F: Fn(&[&ClassOption]) -> bool,
{
    let depth = current.len();
    if depth == courses.len() {
        if accept(current.as_slice()) {
            results.push(snapshot(courses, current));
        } else {
            trace!("Pruned combination #{}", results.len());
        }
        return;
    }

    let course = courses[depth];
    if course.options.is_empty() {
        debug!("Course {} has no options, branch yields nothing", course.code);
    }
    for option in &course.options {
        current.push(option);
        backtrack(courses, current, results, accept);
        current.pop();
    }
}

fn snapshot(courses: &[&CourseOffering], current: &[&ClassOption]) -> Combination {
    let entries = courses
        .iter()
        .zip(current)
        .map(|(course, option)| CourseEntry {
            title: course.title.clone(),
            code: course.code.clone(),
            option: (*option).clone(),
        })
        .collect();
    Combination::new(entries)
}

/// True when the options cannot be taken together: a same-day time overlap
/// between two different courses, or any meeting with no seats left.
pub fn violates_hard_constraints(options: &[&ClassOption]) -> bool {
    if options
        .iter()
        .flat_map(|option| option.details())
        .any(|detail| detail.seats_available <= 0)
    {
        return true;
    }

    options.iter().tuple_combinations().any(|(a, b)| {
        a.details()
            .cartesian_product(b.details().collect::<Vec<_>>())
            .any(|(x, y)| x.overlaps(y))
    })
}

impl Combination {
    /// Re-checks the hard constraints on an already built combination.
    pub fn is_feasible(&self) -> bool {
        let options: Vec<&ClassOption> = self.courses.iter().map(|entry| &entry.option).collect();
        !violates_hard_constraints(&options)
    }
}
