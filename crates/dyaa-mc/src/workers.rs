use std::sync::atomic::AtomicBool;

use dyaa_core::{derive_substream_seed, ErrorInfo, GenError, RngHandle};
use dyaa_grid::MergeableGrid;
use rayon::prelude::*;

use crate::cuts::EventFilter;
use crate::filler::{FillSummary, GridFiller};
use crate::matrix_element::MatrixElement;
use crate::phase_space::PhaseSpaceGenerator;

/// Seed of the RNG owned by `worker_index`.
pub fn worker_seed(master_seed: u64, worker_index: usize) -> u64 {
    derive_substream_seed(master_seed, worker_index as u64)
}

/// Splits `calls` into `workers` contiguous shares; the first `calls % workers`
/// shares carry one extra call.
pub fn partition_calls(calls: u64, workers: usize) -> Vec<u64> {
    if workers == 0 {
        return Vec::new();
    }
    let count = workers as u64;
    let base = calls / count;
    let extra = calls % count;
    (0..count)
        .map(|index| base + u64::from(index < extra))
        .collect()
}

pub(crate) fn check_workers(workers: usize) -> Result<(), GenError> {
    if workers == 0 {
        return Err(GenError::Config(
            ErrorInfo::new("worker-count", "at least one worker is required")
                .with_hint("set `workers` to 1 for a sequential run"),
        ));
    }
    Ok(())
}

/// Fills `grid` with `calls` events spread over a pool of `workers` threads.
///
/// Every worker fills an empty copy of `grid` from its own substream; weights
/// are normalized by the total call count. Partial grids are merged in worker
/// order, so the result only depends on `master_seed` and `workers`.
pub fn run_partitioned<P, M, F, G>(
    filler: &GridFiller<P, M, F>,
    grid: &mut G,
    calls: u64,
    workers: usize,
    master_seed: u64,
    cancel: Option<&AtomicBool>,
) -> Result<FillSummary, GenError>
where
    P: PhaseSpaceGenerator + Sync,
    M: MatrixElement + Sync,
    F: EventFilter + Sync,
    G: MergeableGrid,
{
    check_workers(workers)?;
    filler.check(grid, calls)?;
    let shares = partition_calls(calls, workers);
    let partials: Vec<G> = shares.iter().map(|_| grid.empty_like()).collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| GenError::Config(ErrorInfo::new("thread-pool", err.to_string())))?;

    let results: Result<Vec<(G, FillSummary)>, GenError> = pool.install(|| {
        partials
            .into_par_iter()
            .zip(shares.par_iter())
            .enumerate()
            .map(|(index, (mut partial, &events))| -> Result<(G, FillSummary), GenError> {
                let mut rng = RngHandle::from_seed(worker_seed(master_seed, index));
                log::debug!("worker {index} filling {events} events");
                let summary = filler.fill_events(&mut rng, &mut partial, events, calls, cancel)?;
                log::debug!(
                    "worker {index} done: {} accepted, {} rejected, {} degenerate",
                    summary.accepted,
                    summary.rejected,
                    summary.degenerate
                );
                Ok((partial, summary))
            })
            .collect()
    });

    let mut summary = FillSummary {
        normalization: calls,
        ..FillSummary::default()
    };
    for (partial_grid, partial_summary) in results? {
        grid.merge(partial_grid)?;
        summary.merge(&partial_summary);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_cover_every_call() {
        assert_eq!(partition_calls(10, 3), vec![4, 3, 3]);
        assert_eq!(partition_calls(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(partition_calls(9, 1), vec![9]);
        assert!(partition_calls(9, 0).is_empty());
        assert_eq!(partition_calls(100_001, 7).iter().sum::<u64>(), 100_001);
    }

    #[test]
    fn worker_seeds_differ() {
        assert_ne!(worker_seed(7, 0), worker_seed(7, 1));
        assert_eq!(worker_seed(7, 3), derive_substream_seed(7, 3));
    }
}
