//! Feature/target separation and seeded stratified train/test splitting.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

use super::table::{Column, Table};
use crate::error::EstimateError;

/// Column predicted by the model unless configured otherwise.
pub const DEFAULT_TARGET_COLUMN: &str = "price";
/// Fraction of rows held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
/// Seed used for reproducible splits.
pub const DEFAULT_SEED: u64 = 42;

/// Separate `target` from the rest of the table.
///
/// Returns the remaining columns as the feature table and the target column
/// on its own, both with the original row order.
pub fn split_features_target(
    table: &Table,
    target: &str,
) -> Result<(Table, Column), EstimateError> {
    let y = table.require(target)?.clone();
    let x = table.drop_column(target)?;
    Ok((x, y))
}

/// Proportion and seed for [`stratified_split`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

/// Row indices (into the unsplit table) assigned to each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Train/test partition of a feature table and its target column.
#[derive(Debug, Clone)]
pub struct StratifiedSplit {
    pub x_train: Table,
    pub x_test: Table,
    pub y_train: Column,
    pub y_test: Column,
    pub indices: SplitIndices,
}

/// Partition rows so each category of `stratify_col` keeps its share on both sides.
pub fn stratified_split(
    x: &Table,
    y: &Column,
    stratify_col: &str,
    options: &SplitOptions,
) -> Result<StratifiedSplit, EstimateError> {
    let Some(key_column) = x.column(stratify_col) else {
        return Err(EstimateError::Validation(format!(
            "'{stratify_col}' not found in features."
        )));
    };
    if y.len() != x.n_rows() {
        return Err(EstimateError::Validation(format!(
            "Feature rows ({}) and target rows ({}) differ",
            x.n_rows(),
            y.len()
        )));
    }
    let indices = stratified_indices(key_column, options)?;
    Ok(StratifiedSplit {
        x_train: x.select_rows(&indices.train),
        x_test: x.select_rows(&indices.test),
        y_train: y.select(&indices.train),
        y_test: y.select(&indices.test),
        indices,
    })
}

/// Compute the stratified row partition for a key column.
pub fn stratified_indices(
    key_column: &Column,
    options: &SplitOptions,
) -> Result<SplitIndices, EstimateError> {
    let fraction = options.test_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(EstimateError::Validation(format!(
            "test fraction must be between 0 and 1, got {fraction}"
        )));
    }
    let n = key_column.len();
    let n_test = ((n as f64) * fraction).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(EstimateError::Validation(format!(
            "Cannot split {n} rows with test fraction {fraction}"
        )));
    }

    let mut strata: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for row in 0..n {
        strata.entry(key_column.stratum_key(row)).or_default().push(row);
    }
    if let Some((key, _)) = strata.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(EstimateError::Validation(format!(
            "The least populated class '{key}' in '{}' has only 1 member; at least 2 are required",
            key_column.name()
        )));
    }
    if n_test < strata.len() || n_train < strata.len() {
        return Err(EstimateError::Validation(format!(
            "Split of {n_train} train / {n_test} test rows cannot hold all {} classes of '{}'",
            strata.len(),
            key_column.name()
        )));
    }

    let counts: Vec<usize> = strata.values().map(Vec::len).collect();
    let test_counts = allocate_test_counts(&counts, n_test);

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for (mut rows, take) in strata.into_values().zip(test_counts) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..take]);
        train.extend_from_slice(&rows[take..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(SplitIndices { train, test })
}

/// Largest-remainder allocation of `n_test` rows across classes.
///
/// Every class keeps at least one training row. Callers guarantee
/// `n_test <= sum(counts) - counts.len()`.
fn allocate_test_counts(counts: &[usize], n_test: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    let mut allocated = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for (idx, &count) in counts.iter().enumerate() {
        let exact = (n_test * count) as f64 / total as f64;
        let floor = (exact.floor() as usize).min(count - 1);
        allocated.push(floor);
        remainders.push((exact - floor as f64, idx));
    }
    remainders.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut remaining = n_test - allocated.iter().sum::<usize>();
    while remaining > 0 {
        let mut progressed = false;
        for &(_, idx) in &remainders {
            if remaining == 0 {
                break;
            }
            if allocated[idx] + 1 < counts[idx] {
                allocated[idx] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    allocated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn housing() -> Table {
        Table::new(vec![
            Column::numeric("sqft", vec![1000.0, 1500.0]),
            Column::numeric("bedrooms", vec![2.0, 3.0]),
            Column::numeric("price", vec![300000.0, 450000.0]),
        ])
        .unwrap()
    }

    fn stratified_fixture(rows: usize) -> (Table, Column) {
        let flags: Vec<bool> = (0..rows).map(|i| i % 4 == 0).collect();
        let sqft: Vec<f64> = (0..rows).map(|i| 800.0 + i as f64 * 10.0).collect();
        let price: Vec<f64> = sqft.iter().map(|s| s * 100.0).collect();
        let x = Table::new(vec![
            Column::numeric("sqft", sqft),
            Column::boolean("property_type_Bunglow", flags),
        ])
        .unwrap();
        (x, Column::numeric("price", price))
    }

    #[test]
    fn separates_target_from_features() {
        let (x, y) = split_features_target(&housing(), "price").unwrap();
        assert_eq!(x.column_names(), vec!["sqft", "bedrooms"]);
        assert!(!x.contains("price"));
        assert_eq!(y.name(), "price");
        assert_eq!(y.to_f64().unwrap(), vec![300000.0, 450000.0]);
        assert_eq!(x.n_rows(), y.len());
    }

    #[test]
    fn absent_target_is_a_lookup_failure() {
        let err = split_features_target(&housing(), "rent").unwrap_err();
        assert!(matches!(err, EstimateError::SchemaLookup { column } if column == "rent"));
    }

    #[test]
    fn unknown_stratify_column_is_named_in_error() {
        let (x, y) = stratified_fixture(20);
        let err = stratified_split(&x, &y, "city", &SplitOptions::default()).unwrap_err();
        assert!(matches!(err, EstimateError::Validation(_)));
        assert!(err.to_string().contains("'city'"));
    }

    #[test]
    fn same_seed_gives_same_partition() {
        let (x, y) = stratified_fixture(50);
        let opts = SplitOptions::default();
        let first = stratified_split(&x, &y, "property_type_Bunglow", &opts).unwrap();
        let second = stratified_split(&x, &y, "property_type_Bunglow", &opts).unwrap();
        assert_eq!(first.indices, second.indices);
    }

    #[test]
    fn partition_is_disjoint_complete_and_sized() {
        let (x, y) = stratified_fixture(50);
        let split =
            stratified_split(&x, &y, "property_type_Bunglow", &SplitOptions::default()).unwrap();
        assert_eq!(split.indices.test.len(), 10);
        assert_eq!(split.indices.train.len(), 40);
        let mut all: Vec<usize> = split
            .indices
            .train
            .iter()
            .chain(split.indices.test.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn class_proportions_are_preserved() {
        let (x, y) = stratified_fixture(40);
        let split =
            stratified_split(&x, &y, "property_type_Bunglow", &SplitOptions::default()).unwrap();
        let flagged = |t: &Table| {
            (0..t.n_rows())
                .filter(|&r| t.column("property_type_Bunglow").unwrap().value_f64(r) == Some(1.0))
                .count()
        };
        // 10 of 40 rows are flagged; 8 test rows should carry 2 of them.
        assert_eq!(flagged(&split.x_test), 2);
        assert_eq!(flagged(&split.x_train), 8);
    }

    #[test]
    fn rows_stay_aligned_with_targets() {
        let (x, y) = stratified_fixture(30);
        let split =
            stratified_split(&x, &y, "property_type_Bunglow", &SplitOptions::default()).unwrap();
        let sqft = split.x_train.column("sqft").unwrap();
        for row in 0..split.y_train.len() {
            let expected = sqft.value_f64(row).unwrap() * 100.0;
            assert_eq!(split.y_train.value_f64(row), Some(expected));
        }
    }

    #[test]
    fn singleton_class_is_rejected() {
        let x = Table::new(vec![Column::text(
            "kind",
            vec!["a".into(), "a".into(), "a".into(), "b".into()],
        )])
        .unwrap();
        let y = Column::numeric("price", vec![1.0, 2.0, 3.0, 4.0]);
        let err = stratified_split(&x, &y, "kind", &SplitOptions::default()).unwrap_err();
        assert!(err.to_string().contains("only 1 member"));
    }

    #[test]
    fn fraction_outside_unit_interval_is_rejected() {
        let (x, y) = stratified_fixture(20);
        let opts = SplitOptions {
            test_fraction: 1.5,
            seed: 1,
        };
        assert!(stratified_split(&x, &y, "property_type_Bunglow", &opts).is_err());
    }

    #[test]
    fn allocation_hands_out_remainders_in_order() {
        assert_eq!(allocate_test_counts(&[5, 5], 3), vec![2, 1]);
        assert_eq!(allocate_test_counts(&[2, 2, 6], 3), vec![1, 0, 2]);
    }
}
