//! Weighted random choices.
//!
//! Every random decision made during generation goes through this module,
//! so a generator seeded the same way always makes the same choices.

use rand::Rng;

/// Weights below zero and NaN count as zero.
#[inline]
fn sanitize(weight: f32) -> f32 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Cumulative-weight draw over `weights`.
///
/// One uniform number is drawn over the total weight and the first index
/// whose partial sum exceeds it wins. When every weight is zero the draw
/// falls back to a uniform pick. `None` only for an empty slice.
pub fn pick_weighted_index<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: f32 = weights.iter().copied().map(sanitize).sum();
    if total <= 0.0 {
        return Some(rng.gen_range(0..weights.len()));
    }

    let target = rng.gen::<f32>() * total;
    let mut partial = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        let w = sanitize(w);
        if w <= 0.0 {
            continue;
        }
        partial += w;
        last_positive = i;
        if target < partial {
            return Some(i);
        }
    }
    // rounding left `target` at or past the final partial sum
    Some(last_positive)
}

/// Draw one item, each weighted by `weight`.
pub fn pick_weighted<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    mut weight: impl FnMut(&T) -> f32,
    rng: &mut R,
) -> Option<&'a T> {
    let weights: Vec<f32> = items.iter().map(&mut weight).collect();
    pick_weighted_index(&weights, rng).map(|i| &items[i])
}

/// Weighted permutation: repeatedly draw without replacement until every
/// item has been taken. Heavier items tend to come first.
pub fn biased_shuffle<T, R: Rng + ?Sized>(
    items: Vec<T>,
    mut weight: impl FnMut(&T) -> f32,
    rng: &mut R,
) -> Vec<T> {
    let mut pending: Vec<(f32, T)> = items.into_iter().map(|item| (weight(&item), item)).collect();
    let mut out = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let weights: Vec<f32> = pending.iter().map(|(w, _)| *w).collect();
        let Some(i) = pick_weighted_index(&weights, rng) else {
            break;
        };
        out.push(pending.remove(i).1);
    }
    out
}

/// Uniform float in `[min, max]`; `min` when the range is empty.
pub fn uniform_between<R: Rng + ?Sized>(min: f32, max: f32, rng: &mut R) -> f32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}
