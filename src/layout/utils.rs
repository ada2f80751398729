//! Weighted splitting helpers shared by the layouts.
//!
//! Part boundaries are computed from the running weight sum, so the parts of
//! a split always add up to the input length minus the gaps.

use crate::types::{Rect, RectDelta};

/// Minimum length of any part produced by [`adjust_weights`]
const MIN_PART_LENGTH: i32 = 1;

/// Split `[start, start + length)` into `(begin, length)` parts proportional
/// to `weights`, with `gap` between consecutive parts.
pub fn split_weighted(start: i32, length: i32, weights: &[f64], gap: i32) -> Vec<(i32, i32)> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let actual = (length - (n as i32 - 1) * gap).max(0) as f64;
    let sum: f64 = weights.iter().sum();
    // Degenerate weights fall back to an even split
    let even;
    let weights = if sum > 0.0 && sum.is_finite() {
        weights
    } else {
        even = vec![1.0; n];
        &even[..]
    };
    let sum: f64 = weights.iter().sum();

    let mut acc = 0.0;
    let mut parts = Vec::with_capacity(n);
    for (i, weight) in weights.iter().enumerate() {
        let offset = i as i32 * gap;
        let begin = start + (actual * acc / sum).floor() as i32 + offset;
        acc += weight;
        let end = if i + 1 == n {
            start + length
        } else {
            start + (actual * acc / sum).floor() as i32 + offset
        };
        parts.push((begin, (end - begin).max(0)));
    }
    parts
}

/// Split `area` into rects proportional to `weights`, side by side when
/// `horizontal`, stacked otherwise.
pub fn split_area_weighted(area: Rect, weights: &[f64], gap: i32, horizontal: bool) -> Vec<Rect> {
    if horizontal {
        split_weighted(area.x, area.width, weights, gap)
            .into_iter()
            .map(|(x, width)| Rect::new(x, area.y, width, area.height))
            .collect()
    } else {
        split_weighted(area.y, area.height, weights, gap)
            .into_iter()
            .map(|(y, height)| Rect::new(area.x, y, area.width, height))
            .collect()
    }
}

/// Split `area` in two, the first part taking `ratio` of it.
pub fn split_area_half_weighted(area: Rect, ratio: f64, gap: i32, horizontal: bool) -> (Rect, Rect) {
    let parts = split_area_weighted(area, &[ratio, 1.0 - ratio], gap, horizontal);
    (parts[0], parts[1])
}

/// Move the boundaries around part `target` by `delta_fw` (its far edge) and
/// `delta_bw` (its near edge) and return the resulting normalised weights.
///
/// Neighbours never shrink below one unit and neither does the target.
pub fn adjust_weights(
    start: i32,
    length: i32,
    weights: &[f64],
    gap: i32,
    target: usize,
    delta_fw: i32,
    delta_bw: i32,
) -> Vec<f64> {
    let mut parts = split_weighted(start, length, weights, gap);
    if target >= parts.len() {
        return normalize(&parts);
    }

    if target > 0 && delta_bw != 0 {
        let neighbor = target - 1;
        let (target_base, target_length) = parts[target];
        let (neighbor_base, neighbor_length) = parts[neighbor];
        let delta = clip(
            delta_bw,
            MIN_PART_LENGTH - target_length,
            neighbor_length - MIN_PART_LENGTH,
        );
        parts[target] = (target_base - delta, target_length + delta);
        parts[neighbor] = (neighbor_base, neighbor_length - delta);
    }

    if target + 1 < parts.len() && delta_fw != 0 {
        let neighbor = target + 1;
        let (target_base, target_length) = parts[target];
        let (neighbor_base, neighbor_length) = parts[neighbor];
        let delta = clip(
            delta_fw,
            MIN_PART_LENGTH - target_length,
            neighbor_length - MIN_PART_LENGTH,
        );
        parts[target] = (target_base, target_length + delta);
        parts[neighbor] = (neighbor_base + delta, neighbor_length - delta);
    }

    normalize(&parts)
}

/// [`adjust_weights`] along one axis of `area`, taking the matching edges of `delta`.
pub fn adjust_area_weights(
    area: Rect,
    weights: &[f64],
    gap: i32,
    target: usize,
    delta: RectDelta,
    horizontal: bool,
) -> Vec<f64> {
    if horizontal {
        adjust_weights(area.x, area.width, weights, gap, target, delta.right, delta.left)
    } else {
        adjust_weights(area.y, area.height, weights, gap, target, delta.bottom, delta.top)
    }
}

/// New first-part ratio of a two-way split after `delta`.
pub fn adjust_area_half_weights(
    area: Rect,
    ratio: f64,
    gap: i32,
    target: usize,
    delta: RectDelta,
    horizontal: bool,
) -> f64 {
    adjust_area_weights(area, &[ratio, 1.0 - ratio], gap, target, delta, horizontal)[0]
}

fn normalize(parts: &[(i32, i32)]) -> Vec<f64> {
    let total: i32 = parts.iter().map(|&(_, length)| length).sum();
    if total <= 0 {
        return vec![1.0 / parts.len().max(1) as f64; parts.len()];
    }
    parts
        .iter()
        .map(|&(_, length)| length as f64 / total as f64)
        .collect()
}

fn clip(value: i32, min: i32, max: i32) -> i32 {
    if min > max {
        return 0;
    }
    value.clamp(min, max)
}
