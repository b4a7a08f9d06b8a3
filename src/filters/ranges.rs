//! Numeric binning for range filters.

use super::config::NumericRange;

/// Number of bins produced by [`generate_default_ranges`].
pub const DEFAULT_BIN_COUNT: usize = 5;

/// Partition `[min, max]` into [`DEFAULT_BIN_COUNT`] equal-width bins.
///
/// See [`generate_ranges`].
pub fn generate_default_ranges(min: f64, max: f64, samples: &[f64]) -> Vec<NumericRange> {
    generate_ranges(min, max, samples, DEFAULT_BIN_COUNT)
}

/// Partition `[min, max]` into `bin_count` contiguous, non-overlapping, equal-width bins.
///
/// Every bin includes its lower bound and excludes its upper bound, except the last bin which
/// includes both, so each value in `[min, max]` falls in exactly one bin. Ids are `range-<n>`.
///
/// Non-finite bounds are replaced by the finite extremes of `samples` when placing the edges,
/// but an infinite `min` or `max` stays the outer edge of the first or last bin so values beyond
/// the samples are still covered. If no finite bounds can be found a single bin spanning the
/// given bounds is returned. A degenerate domain (`min == max`) yields one closed bin.
pub fn generate_ranges(min: f64, max: f64, samples: &[f64], bin_count: usize) -> Vec<NumericRange> {
    let (lo, hi) = match finite_bounds(min, max, samples) {
        Some(bounds) => bounds,
        None => return vec![bin(0, min, max, true, true)],
    };
    let open = |edges: &mut [f64]| {
        if min == f64::NEG_INFINITY {
            edges[0] = min;
        }
        if max == f64::INFINITY {
            edges[edges.len() - 1] = max;
        }
    };
    if lo == hi || bin_count <= 1 {
        let mut edges = [lo, hi];
        open(&mut edges[..]);
        return vec![bin(0, edges[0], edges[1], true, true)];
    }

    let mut edges = bin_edges(lo, hi, bin_count);
    open(&mut edges[..]);
    edges
        .windows(2)
        .enumerate()
        .map(|(i, pair)| bin(i, pair[0], pair[1], true, i + 2 == edges.len()))
        .collect()
}

/// `n + 1` ascending edges from `lo` to `hi`. Interpolates when `hi - lo` overflows.
fn bin_edges(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let width = (hi - lo) / n as f64;
    (0..=n)
        .map(|i| {
            if i == n {
                hi
            } else if width.is_finite() {
                lo + width * i as f64
            } else {
                let t = i as f64 / n as f64;
                lo * (1.0 - t) + hi * t
            }
        })
        .collect()
}

fn finite_bounds(min: f64, max: f64, samples: &[f64]) -> Option<(f64, f64)> {
    let finite = samples.iter().copied().filter(|v| v.is_finite());
    let sample_min = finite.clone().reduce(f64::min);
    let sample_max = finite.reduce(f64::max);

    let lo = if min.is_finite() { Some(min) } else { sample_min }?;
    let hi = if max.is_finite() { Some(max) } else { sample_max }?;
    Some(if lo <= hi { (lo, hi) } else { (hi, lo) })
}

fn bin(i: usize, min: f64, max: f64, include_min: bool, include_max: bool) -> NumericRange {
    NumericRange {
        id: format!("range-{i}"),
        label: format!("{}-{}", format_bound(min), format_bound(max)),
        min,
        max,
        include_min,
        include_max,
    }
}

/// Integral bounds print without decimals; others are rounded to two places.
fn format_bound(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let rounded = format!("{v:.2}");
    rounded.trim_end_matches('0').trim_end_matches('.').to_string()
}
