//! Quantile cut points.

/// Interior cut points dividing `data` into `n` equal-probability groups.
///
/// Uses inclusive linear interpolation over the sorted data: with
/// `m = len - 1`, the `i`-th cut sits at position `i * m / n`, interpolated
/// between its two neighbours. The minimum and maximum of the data are
/// treated as the 0th and 100th percentiles.
///
/// Returns `None` for empty data or `n < 2`. A single data point yields that
/// point for every cut.
pub fn quantiles(data: impl IntoIterator<Item = f64>, n: usize) -> Option<Vec<f64>> {
    if n < 2 {
        return None;
    }

    let mut sorted: Vec<f64> = data.into_iter().collect();
    sorted.sort_by(f64::total_cmp);

    match sorted.len() {
        0 => None,
        1 => Some(vec![sorted[0]; n - 1]),
        len => {
            let m = len - 1;
            Some(
                (1..n)
                    .map(|i| {
                        let j = i * m / n;
                        let delta = i * m % n;
                        (sorted[j] * (n - delta) as f64 + sorted[j + 1] * delta as f64) / n as f64
                    })
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(data: &[f64], n: usize) -> Vec<f64> {
        quantiles(data.iter().copied(), n).unwrap()
    }

    #[test]
    fn test_quartiles_interpolate() {
        assert_eq!(q(&[1.0, 2.0, 3.0, 4.0, 5.0], 4), vec![2.0, 3.0, 4.0]);
        assert_eq!(q(&[20.0, 22.0, 22.0], 4), vec![21.0, 22.0, 22.0]);
        assert_eq!(q(&[1.0, 2.0], 4), vec![1.25, 1.5, 1.75]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        assert_eq!(q(&[5.0, 1.0, 4.0, 2.0, 3.0], 4), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_quintiles_of_two_levels() {
        let mut data = vec![500.0; 8];
        data.extend(vec![1500.0; 8]);
        assert_eq!(q(&data, 5), vec![500.0, 500.0, 1500.0, 1500.0]);
    }

    #[test]
    fn test_tertiles_land_between_neighbours() {
        // m = 3, cuts at positions 1 and 2
        assert_eq!(q(&[10.0, 20.0, 30.0, 40.0], 3), vec![20.0, 30.0]);
        // m = 4, cuts at 4/3 and 8/3
        let cuts = q(&[0.0, 3.0, 6.0, 9.0, 12.0], 3);
        assert!((cuts[0] - 4.0).abs() < 1e-9);
        assert!((cuts[1] - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(quantiles(std::iter::empty(), 4), None);
        assert_eq!(quantiles([1.0, 2.0], 1), None);
        assert_eq!(q(&[7.0], 4), vec![7.0, 7.0, 7.0]);
        assert_eq!(q(&[3.0, 3.0, 3.0], 5), vec![3.0; 4]);
    }
}
