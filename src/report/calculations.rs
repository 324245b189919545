use std::collections::HashMap;
use std::hash::Hash;

/// Occurrences of each value, most frequent first. Ties are ordered by value
/// so the output is stable between runs.
pub fn value_counts<K, I>(values: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut counts: Vec<(K, usize)> = counts.into_iter().collect();
    counts.sort_by(|(a_key, a_count), (b_key, b_count)| {
        b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
    });
    counts
}

/// Occurrences of each value, ordered by value.
pub fn sorted_counts<K, I>(values: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts = value_counts(values);
    counts.sort_by(|(a, _), (b, _)| a.cmp(b));
    counts
}

/// Most frequent value, smallest value on ties.
pub fn mode<K, I>(values: I) -> Option<K>
where
    K: Eq + Hash + Ord,
    I: IntoIterator<Item = K>,
{
    value_counts(values).into_iter().next().map(|(key, _)| key)
}

pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Inclusive integer range `start..=end` and the number of values in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub start: u64,
    pub end: u64,
    pub count: usize,
}

/// Splits the values into at most `bins` equally wide integer buckets
/// covering `min..=max`.
pub fn histogram(values: &[u64], bins: usize) -> Vec<Bucket> {
    let (min, max) = match (values.iter().min(), values.iter().max()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => return Vec::new(),
    };

    let bins = bins.max(1) as u64;
    let span = max - min + 1;
    let width = ((span + bins - 1) / bins).max(1);
    let bucket_count = ((span + width - 1) / width) as usize;

    let mut buckets: Vec<Bucket> = (0..bucket_count)
        .map(|idx| {
            let start = min + idx as u64 * width;
            Bucket {
                start,
                end: (start + width - 1).min(max),
                count: 0,
            }
        })
        .collect();

    for value in values {
        let idx = ((value - min) / width) as usize;
        buckets[idx].count += 1;
    }

    buckets
}
