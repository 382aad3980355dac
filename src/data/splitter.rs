// ============================================================
// Layer 4: Train/Test Splitter
// ============================================================
// Partitions the accident table by year:
//   - rows from the held-out year → test set
//   - every other row             → training set
//
// The held-out year plays the role of "the future": the model
// is fitted on earlier years and judged on a year it has never
// seen. That is why the split is NOT shuffled.
//
// Reference: Rust Book §13 (Iterators and Closures)

use crate::domain::record::AccidentRecord;

/// Year whose rows are held out for evaluation
pub const TEST_YEAR: i32 = 2020;

/// Split `records` into (train, test) by year.
///
/// Relative row order is preserved inside each split.
/// Every input row lands in exactly one of the two outputs.
pub fn split_by_year(
    records:   Vec<AccidentRecord>,
    test_year: i32,
) -> (Vec<AccidentRecord>, Vec<AccidentRecord>) {
    let total = records.len();

    let (test, train): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| r.year == test_year);

    tracing::debug!(
        "Year split: {} training, {} test (held-out year {}) of {} rows",
        train.len(),
        test.len(),
        test_year,
        total,
    );

    (train, test)
}
