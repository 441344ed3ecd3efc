use rand::Rng;

/// Frequency-weighted Shannon entropy of a set of options, in bits
///
/// Computes `log2(total) - sum(f * log2(f)) / total`. An empty set has no
/// consistent choice left and is reported as `+infinity`.
pub fn weighted_entropy<I>(frequencies: I) -> f64
where
    I: IntoIterator<Item = u32>,
{
    let mut total = 0.0;
    let mut weighted_log_sum = 0.0;
    for frequency in frequencies {
        let f = f64::from(frequency);
        total += f;
        weighted_log_sum += f * f.log2();
    }

    if total <= 0.0 {
        return f64::INFINITY;
    }

    total.log2() - weighted_log_sum / total
}

/// Running totals of a weight sequence
///
/// Entry `i` holds the sum of weights `0..=i`.
pub fn cumulative_weights(weights: &[u32]) -> Vec<u64> {
    weights
        .iter()
        .scan(0u64, |running, &weight| {
            *running += u64::from(weight);
            Some(*running)
        })
        .collect()
}

/// Locate the first cumulative weight strictly greater than `draw`
///
/// `draw` is expected in `[0, total)`. Returns `None` when no entry exceeds it.
pub fn locate_draw(cumulative: &[u64], draw: u64) -> Option<usize> {
    let index = cumulative.partition_point(|&running| running <= draw);
    (index < cumulative.len()).then_some(index)
}

/// Pick an index with probability proportional to its weight
///
/// Draws uniformly from `[0, total_weight)` and maps the draw onto the
/// cumulative weight array. Returns `None` if the weights sum to zero.
pub fn weighted_choice<R: Rng + ?Sized>(weights: &[u32], rng: &mut R) -> Option<usize> {
    let cumulative = cumulative_weights(weights);
    let total = cumulative.last().copied().unwrap_or(0);
    if total == 0 {
        return None;
    }

    locate_draw(&cumulative, rng.random_range(0..total))
}
