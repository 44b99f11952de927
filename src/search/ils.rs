//! Iterated local search over the neighborhood operators.
//!
//! # Algorithm
//!
//! Each restart cycle intensifies (Or-opt, then Relocate) until the
//! vehicle count stops dropping, then perturbs: a weak perturbation of
//! bounded random exchanges followed by a strong perturbation sweeping
//! 2-opt* tail swaps across all route pairs. Whenever intensification
//! retires a vehicle the iteration counter resets, so the budget bounds
//! consecutive non-improving cycles rather than total work.
//!
//! The driver is a small multi-start over the perturbation ladder (one
//! run per exchange-attempt count); the surviving best-vehicle-count
//! solutions get a distance-only polish and the overall best is returned.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::config::{Budget, SearchConfig};
use crate::local_search::{exchange, or_opt, relocate, two_opt_star};
use crate::models::{ProblemData, Solution};

/// Improves an existing solution under the given budget; never returns a
/// worse solution than its input.
pub fn improve(
    solution: Solution,
    data: &ProblemData,
    budget: &Budget,
    config: &SearchConfig,
) -> Solution {
    if solution.routes().is_empty() {
        return solution;
    }
    let ladder: &[usize] = if config.perturbation_ladder.is_empty() {
        &[10, 100]
    } else {
        &config.perturbation_ladder
    };

    let runs: Vec<Solution> = ladder
        .par_iter()
        .map(|&attempts| {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(attempts as u64));
            run_once(data, solution.clone(), budget, attempts, &mut rng)
        })
        .collect();

    let best_vehicles = runs
        .iter()
        .map(Solution::num_vehicles)
        .min()
        .unwrap_or(solution.num_vehicles());

    // distance-only polish on every surviving best-vehicle-count run
    let mut best = solution;
    for run in runs {
        if run.num_vehicles() > best_vehicles {
            continue;
        }
        let polished = or_opt::run(
            data,
            exchange::run(data, run, config.distance_gain_threshold),
        );
        if polished.is_better_than(&best, data) {
            best = polished;
        }
    }
    debug!(
        vehicles = best.num_vehicles(),
        distance = best.total_distance(data),
        "improvement stage complete"
    );
    best
}

fn run_once<R: Rng>(
    data: &ProblemData,
    mut current: Solution,
    budget: &Budget,
    attempts: usize,
    rng: &mut R,
) -> Solution {
    let mut best = current.clone();
    let mut iter = 0;
    while iter < budget.iterations {
        for _ in 0..budget.intensification.max(1) {
            let before = current.num_vehicles();
            current = or_opt::run(data, current);
            current = relocate::run(data, current);
            if current.num_vehicles() < before {
                debug!(
                    vehicles = current.num_vehicles(),
                    "vehicle retired; restart credit"
                );
                iter = 0;
            } else {
                break;
            }
        }
        debug_assert!(crate::evaluation::is_feasible(data, &current));
        if current.is_better_than(&best, data) {
            best = current.clone();
        }
        current = exchange::random_exchanges(data, current, attempts, rng);
        current = two_opt_star::sweep(data, current);
        debug_assert!(crate::evaluation::is_feasible(data, &current));
        iter += 1;
    }
    best
}
