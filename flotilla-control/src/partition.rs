//! Work-assignment partitioning: topic and subscription lists are split into
//! contiguous per-worker chunks, and the aggregate publish rate is divided by
//! the number of workers that actually received work.

/// Splits `items` into `chunks` contiguous runs in input order, sizes
/// differing by at most one. Trailing runs are empty when there are fewer
/// items than chunks.
pub fn partition_list<T>(items: Vec<T>, chunks: usize) -> Vec<Vec<T>> {
    if chunks == 0 {
        return Vec::new();
    }

    let base = items.len() / chunks;
    let remainder = items.len() % chunks;

    let mut result = Vec::with_capacity(chunks);
    let mut rest = items;
    for i in 0..chunks {
        let take = base + usize::from(i < remainder);
        let tail = rest.split_off(take);
        result.push(rest);
        rest = tail;
    }
    result
}

/// Pairs each group member with its chunk, omitting members whose chunk came
/// out empty. "Assigned" means "has non-empty work", so the returned length is
/// the used-worker count.
pub fn assign_work<W: Clone, T>(group: &[W], items: Vec<T>) -> Vec<(W, Vec<T>)> {
    partition_list(items, group.len())
        .into_iter()
        .zip(group.iter())
        .filter(|(chunk, _)| !chunk.is_empty())
        .map(|(chunk, worker)| (worker.clone(), chunk))
        .collect()
}

/// Divides the requested aggregate rate across the workers that actually
/// received work, so the realized fleet-wide rate matches the request no
/// matter how many group members ended up idle.
pub fn per_worker_rate(aggregate_rate: f64, used_workers: usize) -> f64 {
    aggregate_rate / used_workers as f64
}
