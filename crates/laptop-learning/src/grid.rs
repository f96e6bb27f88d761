//! Hyperparameter grid expansion.

use crate::types::HyperParams;
use laptop_processing::ParamGrid;

/// Expansion of a [`ParamGrid`] into concrete candidates.
pub trait ParamGridExt {
    /// Cartesian product of the grid axes.
    ///
    /// Order is fixed: `n_estimators` varies slowest, then `max_depth`, then
    /// `learning_rate`. Ties during model selection resolve to the earliest
    /// candidate in this order.
    fn candidates(&self) -> Vec<HyperParams>;
}

impl ParamGridExt for ParamGrid {
    fn candidates(&self) -> Vec<HyperParams> {
        let mut out = Vec::with_capacity(self.len());
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &learning_rate in &self.learning_rate {
                    out.push(HyperParams {
                        n_estimators,
                        max_depth,
                        learning_rate,
                    });
                }
            }
        }
        out
    }
}
