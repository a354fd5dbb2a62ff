use log::debug;
use ndarray::Array2;

/// Threshold every cell in place: 1 where `value >= threshold`, 0 elsewhere
pub fn binarize(data: &mut Array2<i64>, threshold: i64) {
    data.mapv_inplace(|value| i64::from(value >= threshold));

    let ones = data.iter().filter(|&&v| v == 1).count();
    debug!(
        "Binarized {} cells at threshold {}: {} set",
        data.len(),
        threshold,
        ones
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_threshold_is_inclusive() {
        let mut data = arr2(&[[0, 4, 5], [6, -3, 10]]);
        binarize(&mut data, 5);
        assert_eq!(data, arr2(&[[0, 0, 1], [1, 0, 1]]));
    }

    #[test]
    fn test_non_positive_threshold_sets_everything_above() {
        let mut data = arr2(&[[-1, 0], [1, -5]]);
        binarize(&mut data, 0);
        assert_eq!(data, arr2(&[[0, 1], [1, 0]]));
    }
}
