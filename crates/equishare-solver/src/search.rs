//! One search worker: greedy construction followed by local search.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use equishare_core::{Score, SimpleScore};

use crate::acceptor::{Acceptor, LateAcceptanceAcceptor};
use crate::director::{ConstraintIndex, Director};
use crate::model::Model;
use crate::moves::{MoveSelector, SearchMove};
use crate::scope::SearchScope;
use crate::statistics::StatisticsCollector;
use crate::termination::Termination;

/// Tuning of a worker's local search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerConfig {
    pub late_acceptance_size: usize,
    pub accepted_count_limit: usize,
    /// Moves sampled per step before giving up on finding an accepted one.
    pub evaluation_limit: usize,
}

#[derive(Debug)]
pub(crate) struct WorkerResult {
    pub worker_index: usize,
    pub best_score: SimpleScore,
    pub best_values: Vec<bool>,
    pub step_count: u64,
}

/// Collects accepted moves of a step and keeps the best one.
#[derive(Debug)]
struct AcceptedCountForager {
    accepted_count_limit: usize,
    accepted: usize,
    picked: Option<(SearchMove, SimpleScore)>,
}

impl AcceptedCountForager {
    fn new(accepted_count_limit: usize) -> Self {
        Self {
            accepted_count_limit: accepted_count_limit.max(1),
            accepted: 0,
            picked: None,
        }
    }

    fn step_started(&mut self) {
        self.accepted = 0;
        self.picked = None;
    }

    fn add_move(&mut self, mv: SearchMove, score: SimpleScore) {
        self.accepted += 1;
        if self.picked.map_or(true, |(_, best)| score > best) {
            self.picked = Some((mv, score));
        }
    }

    fn is_quit_early(&self) -> bool {
        self.accepted >= self.accepted_count_limit
    }

    fn pick_move(&mut self) -> Option<(SearchMove, SimpleScore)> {
        self.picked.take()
    }
}

/// Assigns every group, hardest first, to its least violating option.
fn construct<R: Rng>(model: &Model, index: &ConstraintIndex, director: &mut Director<'_>, rng: &mut R) {
    let groups = model.groups();
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.shuffle(rng);
    let difficulty = |g: usize| groups[g].iter().map(|&v| index.weight(v)).max().unwrap_or(0);
    order.sort_by_key(|&g| std::cmp::Reverse(difficulty(g)));

    for group in order {
        let options = groups[group].len();
        let offset = rng.random_range(0..options);
        let mut best: Option<(usize, SimpleScore)> = None;
        for k in 0..options {
            let to = (offset + k) % options;
            let Some(score) = director.evaluate(SearchMove::Assign { group, to }) else {
                continue;
            };
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((to, score));
            }
        }
        if let Some((to, _)) = best {
            director.apply(SearchMove::Assign { group, to });
        }
    }
}

/// Runs one worker until `termination` fires or no move is left.
pub(crate) fn run_worker<T: Termination>(
    model: &Model,
    index: &ConstraintIndex,
    config: WorkerConfig,
    seed: u64,
    worker_index: usize,
    termination: &T,
    statistics: &StatisticsCollector,
) -> WorkerResult {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut scope = SearchScope::new(worker_index);
    let mut director = Director::new(model, index);

    construct(model, index, &mut director, &mut rng);
    let mut last_step_score = director.score();
    scope.offer_best_score(last_step_score);
    let mut best_values = director.values().to_vec();
    debug!(
        event = "construction_end",
        worker = worker_index,
        violation = last_step_score.violation(),
    );

    let selector = MoveSelector::new(model);
    let mut acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(config.late_acceptance_size);
    let mut forager = AcceptedCountForager::new(config.accepted_count_limit);
    acceptor.phase_started(&last_step_score);

    while !selector.is_empty() && !termination.is_terminated(&scope) {
        forager.step_started();
        for _ in 0..config.evaluation_limit {
            let Some(mv) = selector.sample(director.choice(), &mut rng) else {
                continue;
            };
            let Some(move_score) = director.evaluate(mv) else {
                continue;
            };
            let accepted = acceptor.is_accepted(&last_step_score, &move_score);
            statistics.record_move(accepted);
            if accepted {
                forager.add_move(mv, move_score);
                if forager.is_quit_early() {
                    break;
                }
            }
        }

        if let Some((mv, score)) = forager.pick_move() {
            director.apply(mv);
            last_step_score = score;
            acceptor.step_ended(&score);
            if scope.offer_best_score(score) {
                best_values.copy_from_slice(director.values());
                trace!(
                    event = "new_best",
                    worker = worker_index,
                    step = scope.step_count(),
                    violation = score.violation(),
                );
            }
        }
        scope.increment_step_count();
        statistics.record_step();
    }

    let best_score = scope.best_score().unwrap_or(last_step_score);
    debug!(
        event = "worker_end",
        worker = worker_index,
        steps = scope.step_count(),
        violation = best_score.violation(),
        feasible = best_score.is_feasible(),
    );
    WorkerResult {
        worker_index,
        best_score,
        best_values,
        step_count: scope.step_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoolVar, LinearConstraint, LinearExpr};
    use crate::termination::{BestScoreFeasibleTermination, OrTermination, StepCountTermination};

    /// Items of the given weights into `bins` bins with an upper bound each.
    fn bin_model(weights: &[i64], bins: usize, capacity: i64) -> Model {
        let mut model = Model::new();
        let mut per_bin: Vec<Vec<BoolVar>> = vec![Vec::new(); bins];
        for item in 0..weights.len() {
            let vars: Vec<BoolVar> = (0..bins)
                .map(|b| model.new_bool_var(format!("x_{item}_{b}")))
                .collect();
            model.add_exactly_one(&vars).unwrap();
            for (b, &v) in vars.iter().enumerate() {
                per_bin[b].push(v);
            }
        }
        for (b, vars) in per_bin.iter().enumerate() {
            let expr = LinearExpr::weighted_sum(vars, weights);
            model
                .add_constraint(LinearConstraint::new(format!("bin_{b}"), expr).at_most(capacity))
                .unwrap();
        }
        model
    }

    fn config() -> WorkerConfig {
        WorkerConfig {
            late_acceptance_size: 50,
            accepted_count_limit: 4,
            evaluation_limit: 64,
        }
    }

    #[test]
    fn test_worker_finds_tight_partition() {
        // 3 + 3 + 2 + 2 + 2 = 12 into two bins of 6.
        let model = bin_model(&[3, 3, 2, 2, 2], 2, 6);
        let index = ConstraintIndex::build(&model);
        let statistics = StatisticsCollector::new();
        let termination = OrTermination::new((
            BestScoreFeasibleTermination::new(),
            StepCountTermination::new(10_000),
        ));

        let result = run_worker(&model, &index, config(), 11, 0, &termination, &statistics);

        assert!(result.best_score.is_feasible());
        assert!(model.is_satisfied_by(&result.best_values));
    }

    #[test]
    fn test_worker_is_deterministic_per_seed() {
        let model = bin_model(&[5, 4, 3, 3, 2, 2, 1], 3, 7);
        let index = ConstraintIndex::build(&model);
        let termination = StepCountTermination::new(200);

        let a = run_worker(&model, &index, config(), 99, 0, &termination, &StatisticsCollector::new());
        let b = run_worker(&model, &index, config(), 99, 0, &termination, &StatisticsCollector::new());

        assert_eq!(a.best_values, b.best_values);
        assert_eq!(a.best_score, b.best_score);
    }

    #[test]
    fn test_forager_keeps_best_and_quits() {
        let mut forager = AcceptedCountForager::new(2);
        forager.step_started();
        forager.add_move(SearchMove::Assign { group: 0, to: 1 }, SimpleScore::of(-5));
        assert!(!forager.is_quit_early());
        forager.add_move(SearchMove::Assign { group: 1, to: 0 }, SimpleScore::of(-2));
        assert!(forager.is_quit_early());

        let (mv, score) = forager.pick_move().unwrap();
        assert_eq!(mv, SearchMove::Assign { group: 1, to: 0 });
        assert_eq!(score, SimpleScore::of(-2));
        assert!(forager.pick_move().is_none());
    }
}
