//! K-fold cross-validation splits.

use crate::error::{LearningError, Result};
use std::ops::Range;

/// One train/validation split of row indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Range<usize>,
}

/// Contiguous, unshuffled k-fold splitter.
///
/// Rows are divided into `k` consecutive blocks; the first `n % k` blocks
/// hold one extra row. Each block serves once as the validation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    k: usize,
}

impl KFold {
    pub fn new(k: usize) -> Result<Self> {
        if k < 2 {
            return Err(LearningError::InvalidConfig(format!(
                "k-fold needs at least 2 folds, got {k}"
            )));
        }
        Ok(Self { k })
    }

    pub fn n_splits(&self) -> usize {
        self.k
    }

    /// Split `n` rows into `k` folds.
    pub fn split(&self, n: usize) -> Result<Vec<Fold>> {
        if self.k > n {
            return Err(LearningError::InvalidData(format!(
                "cannot split {n} rows into {} folds",
                self.k
            )));
        }

        let base = n / self.k;
        let extra = n % self.k;
        let mut folds = Vec::with_capacity(self.k);
        let mut start = 0;
        for i in 0..self.k {
            let len = base + usize::from(i < extra);
            let validation = start..start + len;
            let train = (0..start).chain(validation.end..n).collect();
            folds.push(Fold { train, validation });
            start += len;
        }
        Ok(folds)
    }
}
