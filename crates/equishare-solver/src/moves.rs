//! Search moves and random move selection.

use rand::Rng;

use crate::model::{BoolVar, Model};

/// A neighbourhood move over the working valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchMove {
    /// Switches a group to another option.
    Assign { group: usize, to: usize },
    /// Exchanges the chosen options of two groups.
    Swap { left: usize, right: usize },
    /// Toggles a variable outside every group.
    Flip { var: BoolVar },
}

/// Samples random moves for one worker.
#[derive(Debug, Clone)]
pub(crate) struct MoveSelector {
    /// Groups with more than one option.
    movable_groups: Vec<usize>,
    option_counts: Vec<usize>,
    free_vars: Vec<BoolVar>,
    group_count: usize,
}

impl MoveSelector {
    pub(crate) fn new(model: &Model) -> Self {
        let option_counts: Vec<usize> = model.groups().iter().map(Vec::len).collect();
        let movable_groups = option_counts
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 1)
            .map(|(g, _)| g)
            .collect();
        Self {
            movable_groups,
            option_counts,
            free_vars: model.free_vars().collect(),
            group_count: model.groups().len(),
        }
    }

    /// Returns true if no move can ever change the valuation.
    pub(crate) fn is_empty(&self) -> bool {
        self.movable_groups.is_empty() && self.free_vars.is_empty()
    }

    pub(crate) fn sample<R: Rng>(&self, choice: &[Option<usize>], rng: &mut R) -> Option<SearchMove> {
        let grouped = self.movable_groups.len();
        let free = self.free_vars.len();
        if grouped + free == 0 {
            return None;
        }

        if free > 0 && rng.random_range(0..grouped + free) >= grouped {
            let var = self.free_vars[rng.random_range(0..free)];
            return Some(SearchMove::Flip { var });
        }

        if self.group_count >= 2 && rng.random_bool(0.5) {
            let left = self.movable_groups[rng.random_range(0..grouped)];
            let right = rng.random_range(0..self.group_count);
            if left != right && choice[left] != choice[right] {
                return Some(SearchMove::Swap { left, right });
            }
        }

        let group = self.movable_groups[rng.random_range(0..grouped)];
        let options = self.option_counts[group];
        let current = choice[group];
        let mut to = rng.random_range(0..options);
        if current == Some(to) {
            to = (to + 1 + rng.random_range(0..options - 1)) % options;
        }
        Some(SearchMove::Assign { group, to })
    }
}
