use anyhow::Result;
use log::error;

/// Points where `values` reach or exceed `baseline`.
pub fn desirable_mask(values: &[f64], baseline: &[f64]) -> Vec<bool> {
    values
        .iter()
        .zip(baseline)
        .map(|(v, b)| v >= b)
        .collect()
}

/// Polygons filling the area between `lower` and `upper` over the runs of
/// consecutive `true` entries in `mask`.
///
/// A run that does not touch the edge of the x-range is extended, on either
/// side, up to the point where the two curves cross on the neighbouring
/// interval. A run of a single point therefore still yields a (thin) polygon.
pub fn shaded_regions(
    xs: &[f64],
    lower: &[f64],
    upper: &[f64],
    mask: &[bool],
) -> Result<Vec<Vec<(f64, f64)>>> {
    let n = xs.len();
    if lower.len() != n || upper.len() != n || mask.len() != n {
        let reason = format!(
            "mismatched series lengths (x={n}, lower={}, upper={}, mask={})",
            lower.len(),
            upper.len(),
            mask.len()
        );
        error!("{reason}");
        anyhow::bail!(reason);
    }

    let crossing = |i: usize, j: usize| -> Option<(f64, f64)> {
        let d_i = upper[i] - lower[i];
        let d_j = upper[j] - lower[j];
        if d_i == d_j {
            return None;
        }

        let t = (d_i / (d_i - d_j)).clamp(0.0, 1.0);
        Some((
            xs[i] + t * (xs[j] - xs[i]),
            lower[i] + t * (lower[j] - lower[i]),
        ))
    };

    let mut regions = Vec::new();
    let mut idx = 0;
    while idx < n {
        if !mask[idx] {
            idx += 1;
            continue;
        }

        let start = idx;
        while idx + 1 < n && mask[idx + 1] {
            idx += 1;
        }
        let end = idx;

        let mut polygon = Vec::with_capacity(2 * (end - start + 1) + 2);
        if start > 0 {
            polygon.extend(crossing(start - 1, start));
        }
        polygon.extend((start..=end).map(|i| (xs[i], upper[i])));
        if end + 1 < n {
            polygon.extend(crossing(end, end + 1));
        }
        polygon.extend((start..=end).rev().map(|i| (xs[i], lower[i])));
        regions.push(polygon);

        idx += 1;
    }

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_extent(polygon: &[(f64, f64)]) -> (f64, f64) {
        polygon
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(*x), hi.max(*x))
            })
    }

    #[test]
    fn test_desirable_mask() {
        let avg = [1.0, 5.0, 2.0, 3.0];
        let traffic = [3.0, 3.0, 3.0, 3.0];
        assert_eq!(
            desirable_mask(&avg, &traffic),
            vec![false, true, false, true]
        );
    }

    #[test]
    fn test_full_shading_when_always_desirable() {
        let xs = [0.0, 1.0, 2.0];
        let traffic = [1.0, 1.0, 1.0];
        let avg = [2.0, 3.0, 1.5];
        let mask = desirable_mask(&avg, &traffic);

        let regions = shaded_regions(&xs, &traffic, &avg, &mask).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(x_extent(&regions[0]), (0.0, 2.0));
        assert_eq!(regions[0].len(), 6);
    }

    #[test]
    fn test_shading_restricted_to_mixed_subset() {
        let xs = [0.0, 1.0, 2.0];
        let traffic = [3.0, 3.0, 3.0];
        let avg = [1.0, 5.0, 2.0];
        let mask = desirable_mask(&avg, &traffic);
        assert_eq!(mask, vec![false, true, false]);

        let regions = shaded_regions(&xs, &traffic, &avg, &mask).unwrap();
        assert_eq!(regions.len(), 1);

        let (lo, hi) = x_extent(&regions[0]);
        assert!(lo > 0.0 && lo < 1.0, "{lo}");
        assert!(hi > 1.0 && hi < 2.0, "{hi}");
        assert!((lo - 0.5).abs() < 1e-12);
        assert!((hi - 5.0 / 3.0).abs() < 1e-12);
        assert!(regions[0].contains(&(1.0, 5.0)));
        assert!(regions[0].contains(&(1.0, 3.0)));
    }

    #[test]
    fn test_separate_runs_yield_separate_regions() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let space = [2.0; 5];
        let p5 = [3.0, 3.0, 1.0, 1.0, 2.5];
        let mask = desirable_mask(&p5, &space);

        let regions = shaded_regions(&xs, &space, &p5, &mask).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(x_extent(&regions[0]).0, 0.0);
        assert!((x_extent(&regions[0]).1 - 1.5).abs() < 1e-12);
        assert_eq!(x_extent(&regions[1]).1, 4.0);
    }

    #[test]
    fn test_no_shading_when_never_desirable() {
        let xs = [0.0, 1.0];
        let regions = shaded_regions(&xs, &[2.0, 2.0], &[1.0, 1.0], &[false, false]).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_mismatched_lengths_fail() {
        assert!(shaded_regions(&[0.0, 1.0], &[1.0], &[1.0, 2.0], &[true, true]).is_err());
    }
}
