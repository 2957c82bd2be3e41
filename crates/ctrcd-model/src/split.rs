//! Stratified train/test splitting.

use rand::{SeedableRng, seq::SliceRandom};
use rand_pcg::Pcg64;

/// Row indices of a train/test partition.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Training row indices.
    pub train: Vec<usize>,
    /// Held-out row indices.
    pub test: Vec<usize>,
}

/// Splits rows into train and test, preserving class prevalence.
///
/// Each class is shuffled independently with a [`Pcg64`] seeded from
/// `seed`, and `test_fraction` of it (rounded) goes to the test side, so
/// both partitions keep the outcome prevalence of the full dataset.
///
/// # Examples
///
/// ```
/// use ctrcd_model::split::stratified_split;
///
/// let labels = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
/// let split = stratified_split(&labels, 0.2, 42);
/// assert_eq!(split.test.len(), 2);
/// assert_eq!(split.train.len(), 8);
/// // Exactly one positive lands in each partition.
/// let test_pos = split.test.iter().filter(|&&i| labels[i] == 1.0).count();
/// assert_eq!(test_pos, 1);
/// ```
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn stratified_split(labels: &[f64], test_fraction: f64, seed: u64) -> TrainTestSplit {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    let negatives: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] != 1.0).collect();
    let positives: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 1.0).collect();

    for mut class_indices in [negatives, positives] {
        class_indices.shuffle(&mut rng);
        let n_test = ((class_indices.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(class_indices.len());
        test.extend(class_indices.drain(..n_test));
        train.extend(class_indices);
    }

    train.sort_unstable();
    test.sort_unstable();
    TrainTestSplit { train, test }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_neg: usize, n_pos: usize) -> Vec<f64> {
        let mut labels = vec![0.0; n_neg];
        labels.extend(vec![1.0; n_pos]);
        labels
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let labels = labels(80, 20);
        let split = stratified_split(&labels, 0.2, 42);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn prevalence_is_preserved() {
        let labels = labels(80, 20);
        let split = stratified_split(&labels, 0.2, 42);
        assert_eq!(split.test.len(), 20);
        let test_pos = split.test.iter().filter(|&&i| labels[i] == 1.0).count();
        assert_eq!(test_pos, 4);
        let train_pos = split.train.iter().filter(|&&i| labels[i] == 1.0).count();
        assert_eq!(train_pos, 16);
    }

    #[test]
    fn same_seed_reproduces_the_split() {
        let labels = labels(50, 10);
        let a = stratified_split(&labels, 0.2, 7);
        let b = stratified_split(&labels, 0.2, 7);
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);
    }

    #[test]
    fn different_seeds_differ() {
        let labels = labels(50, 10);
        let a = stratified_split(&labels, 0.2, 7);
        let b = stratified_split(&labels, 0.2, 8);
        assert_ne!(a.test, b.test);
    }
}
