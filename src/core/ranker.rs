use std::cmp::Ordering;

/// Number of recommendations returned per request
pub const TOP_N: usize = 3;

/// Sort by score descending and keep the first `limit` items
///
/// A missing or NaN score ranks below every real score. The sort is stable,
/// so ties keep their input order.
pub fn rank_top<T, F>(mut items: Vec<T>, limit: usize, score: F) -> Vec<T>
where
    F: Fn(&T) -> Option<f64>,
{
    let key = |item: &T| {
        score(item)
            .filter(|s| !s.is_nan())
            .unwrap_or(f64::NEG_INFINITY)
    };

    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    items.truncate(limit);
    items
}
