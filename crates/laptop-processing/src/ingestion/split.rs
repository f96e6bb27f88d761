//! Seeded train/test partitioning.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Number of test rows for `n` rows at ratio `test_size`.
pub fn test_row_count(n: usize, test_size: f64) -> usize {
    (n as f64 * test_size).ceil() as usize
}

/// Split `df` into disjoint `(train, test)` partitions.
///
/// Rows are permuted with a generator seeded from `seed`; the first
/// `ceil(n * test_size)` permuted rows form the test set and the rest the
/// training set. The same table, ratio and seed always give the same split.
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ProcessingError::SplitFailed(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let n = df.height();
    if n == 0 {
        return Err(ProcessingError::EmptyDataset(
            "cannot split a table with no rows".to_string(),
        ));
    }

    let n_test = test_row_count(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(ProcessingError::SplitFailed(format!(
            "{n} rows at test_size {test_size} leaves an empty partition"
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());
    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());

    Ok((df.take(&train_idx)?, df.take(&test_idx)?))
}
