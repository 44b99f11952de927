//! Cluster, construct, and merge with depth-first multi-start.
//!
//! # Algorithm
//!
//! Customers are ordered by due time and greedily bucketed into `k`
//! clusters of roughly one vehicle-capacity multiple of demand each.
//! Every cluster is routed independently (they share no customers), then
//! the per-cluster route sets are merged left to right: a finished route
//! whose vehicle is back at the depot can depart again to serve the next
//! cluster, splicing the two routes into one multi-trip route.
//!
//! The departure time of each next-cluster construction is a branch point:
//! rather than committing to one greedy choice, a bounded depth-first
//! search tries each plausible departure (a merged route's own depot
//! availability) and keeps the best complete leaf. Infeasible branches
//! simply yield no leaf. The whole scheme is repeated for
//! `k = 1..=num_clusters_threshold`, in parallel over `k`.

use rayon::prelude::*;
use tracing::debug;

use crate::config::SearchConfig;
use crate::constructive::insertion::{self, SeedOrdering};
use crate::models::{ProblemData, Route, Solution};

/// Runs the cluster-and-merge construction, returning the fewest-vehicle
/// solution found across all cluster counts.
pub fn cluster_route_merge(data: &ProblemData, config: &SearchConfig) -> Solution {
    let max_k = config.num_clusters_threshold.max(1).min(data.num_customers());
    let best = (1..=max_k)
        .into_par_iter()
        .filter_map(|k| {
            let solution = run_for_k(data, config, k);
            if let Some(s) = &solution {
                debug!(k, vehicles = s.num_vehicles(), "cluster merge leaf kept");
            }
            solution
        })
        .reduce_with(|a, b| insertion::better_construction(a, b, data));
    match best {
        Some(solution) => solution,
        // k = 1 is plain construction and always covers every customer
        None => {
            let (routes, unrouted) = construct_cluster(data, config, &data.customer_ids(), 0.0);
            debug_assert!(unrouted.is_empty());
            Solution::new(routes)
        }
    }
}

fn run_for_k(data: &ProblemData, config: &SearchConfig, k: usize) -> Option<Solution> {
    let clusters = partition(data, k);
    // customers still unrouted after each level, for departure pruning
    let mut remaining_after: Vec<Vec<usize>> = vec![Vec::new(); clusters.len()];
    for level in (0..clusters.len().saturating_sub(1)).rev() {
        let mut rest = remaining_after[level + 1].clone();
        rest.extend_from_slice(&clusters[level + 1]);
        remaining_after[level] = rest;
    }

    let search = DfsMerge {
        data,
        config,
        clusters,
        remaining_after,
    };
    let mut best = None;
    search.dfs(0, Vec::new(), &mut best);
    best
}

/// Orders customers by due time and buckets them greedily so each cluster
/// carries roughly `ceil(total/k/capacity) * capacity` demand; the last
/// cluster absorbs the remainder.
fn partition(data: &ProblemData, k: usize) -> Vec<Vec<usize>> {
    let ordered = SeedOrdering::EarliestDueDate.order(data, &data.customer_ids());
    if k <= 1 {
        return vec![ordered];
    }
    let capacity = f64::from(data.capacity());
    let per_cluster =
        (f64::from(data.total_demand()) / k as f64 / capacity).ceil() * capacity;

    let mut clusters = Vec::with_capacity(k);
    let mut current = Vec::new();
    let mut load = 0.0;
    for u in ordered {
        let demand = f64::from(data.node(u).demand());
        if clusters.len() < k - 1 && !current.is_empty() && load + demand > per_cluster {
            clusters.push(std::mem::take(&mut current));
            load = 0.0;
        }
        current.push(u);
        load += demand;
    }
    if !current.is_empty() {
        clusters.push(current);
    }
    clusters
}

/// Per-cluster construction: multi-trip I1 in due-time order at the given
/// departure time.
fn construct_cluster(
    data: &ProblemData,
    config: &SearchConfig,
    customers: &[usize],
    departure: f64,
) -> (Vec<Route>, Vec<usize>) {
    let weights = config
        .insertion_weights
        .first()
        .copied()
        .unwrap_or(crate::config::InsertionWeights::STANDARD[0]);
    insertion::solomon_i1(data, customers, SeedOrdering::EarliestDueDate, weights, departure)
}

struct DfsMerge<'a> {
    data: &'a ProblemData,
    config: &'a SearchConfig,
    clusters: Vec<Vec<usize>>,
    remaining_after: Vec<Vec<usize>>,
}

impl DfsMerge<'_> {
    fn dfs(&self, level: usize, merged: Vec<Route>, best: &mut Option<Solution>) {
        if level == self.clusters.len() {
            let candidate = Solution::new(merged);
            let better = best
                .as_ref()
                .map_or(true, |b| candidate.num_vehicles() < b.num_vehicles());
            if better {
                *best = Some(candidate);
            }
            return;
        }

        for departure in self.branch_departures(level, &merged) {
            let (routes, unrouted) =
                construct_cluster(self.data, self.config, &self.clusters[level], departure);
            if !unrouted.is_empty() {
                // this departure cannot serve the whole cluster: no leaf
                continue;
            }
            let spliced = merge_route_sets(self.data, merged.clone(), routes);
            let reduced = reroute_short(self.data, self.config, spliced);
            self.dfs(level + 1, reduced, best);
        }
    }

    /// Departure-time branch candidates for the given level: each merged
    /// route's depot availability, filtered so every still-unrouted
    /// customer stays reachable, capped at the configured branch factor.
    fn branch_departures(&self, level: usize, merged: &[Route]) -> Vec<f64> {
        if level == 0 {
            return vec![0.0];
        }
        let limit = self
            .data
            .latest_departure_over(self.remaining_after[level - 1].iter().copied());
        let mut times: Vec<f64> = merged
            .iter()
            .map(|r| r.latest_depot_arrival() + self.data.depot().service_time())
            .filter(|&t| t <= limit)
            .collect();
        times.sort_by(f64::total_cmp);
        times.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        times.truncate(self.config.max_branch_departures.max(1));
        if times.is_empty() {
            times.push(0.0);
        }
        times
    }
}

/// Splices compatible routes across two route sets.
///
/// The current set is ordered by when each vehicle is back at the depot,
/// the next set by when it first needs to start service; each finished
/// route takes the first next-set route it can reach in time. Unmatched
/// routes pass through; leftover next-set routes are appended as new
/// vehicles.
fn merge_route_sets(data: &ProblemData, mut current: Vec<Route>, next: Vec<Route>) -> Vec<Route> {
    if current.is_empty() {
        return next;
    }
    current.sort_by(|a, b| a.latest_depot_arrival().total_cmp(&b.latest_depot_arrival()));
    let mut next: Vec<Option<Route>> = {
        let mut n = next;
        n.sort_by(|a, b| {
            a.service_start(data, 1).total_cmp(&b.service_start(data, 1))
        });
        n.into_iter().map(Some).collect()
    };

    let mut out = Vec::with_capacity(current.len());
    for l in current {
        let mut spliced = None;
        for slot in next.iter_mut() {
            let Some(m) = slot else { continue };
            let last = l.len() - 1;
            let delta = l.service_start(data, last) - m.service_start(data, 0);
            if !m.check_push_forward(data, delta, 0) {
                continue;
            }
            if let Some(merged) = Route::merged(data, &l, m) {
                spliced = Some(merged);
                *slot = None;
                break;
            }
        }
        out.push(spliced.unwrap_or(l));
    }
    out.extend(next.into_iter().flatten());
    out
}

/// Dissolves routes shorter than the configured threshold and re-routes
/// their customers together; keeps the rebuilt configuration only if it
/// does not use more vehicles (ties broken by having fewer short routes).
fn reroute_short(data: &ProblemData, config: &SearchConfig, routes: Vec<Route>) -> Vec<Route> {
    let threshold = config.delta_threshold;
    let num_short = |rs: &[Route]| {
        rs.iter()
            .filter(|r| r.num_customers() < threshold)
            .count()
    };
    if num_short(&routes) < 2 {
        return routes;
    }

    let (short, long): (Vec<Route>, Vec<Route>) = routes
        .iter()
        .cloned()
        .partition(|r| r.num_customers() < threshold);
    let customers: Vec<usize> = short.iter().flat_map(|r| r.customer_ids()).collect();
    let (rebuilt, unrouted) = construct_cluster(data, config, &customers, 0.0);
    if !unrouted.is_empty() {
        return routes;
    }

    let mut candidate = long;
    candidate.extend(rebuilt);
    let fewer_vehicles = candidate.len() < routes.len();
    let same_but_tidier =
        candidate.len() == routes.len() && num_short(&candidate) < num_short(&routes);
    if fewer_vehicles || same_but_tidier {
        candidate
    } else {
        routes
    }
}
