use sha2::{Digest, Sha256};

use crate::accumulator::GridAccumulator;
use crate::grid::NtupleGrid;

fn update_f64(hasher: &mut Sha256, value: f64) {
    hasher.update(value.to_bits().to_le_bytes());
}

/// Computes the canonical content hash of a grid.
///
/// Every stored weight and kinematic value enters through its bit pattern, so
/// two grids hash equal exactly when their accumulated state is byte-identical.
/// Provenance is not part of the hash.
pub fn canonical_hash(grid: &NtupleGrid) -> String {
    let mut hasher = Sha256::new();

    hasher.update((grid.channels().len() as u64).to_le_bytes());
    for channel in grid.channels() {
        hasher.update((channel.entry().len() as u64).to_le_bytes());
        for &(a, b, factor) in channel.entry() {
            hasher.update(a.to_le_bytes());
            hasher.update(b.to_le_bytes());
            update_f64(&mut hasher, factor);
        }
    }

    hasher.update((grid.orders().len() as u64).to_le_bytes());
    for order in grid.orders() {
        for power in [order.alphas, order.alpha, order.logxir, order.logxif] {
            hasher.update(power.to_le_bytes());
        }
    }

    hasher.update((grid.bin_limits().limits().len() as u64).to_le_bytes());
    for &limit in grid.bin_limits().limits() {
        update_f64(&mut hasher, limit);
    }

    for cell in grid.cells() {
        hasher.update((cell.len() as u64).to_le_bytes());
        for entry in cell.entries() {
            update_f64(&mut hasher, entry.x1);
            update_f64(&mut hasher, entry.x2);
            update_f64(&mut hasher, entry.q2);
            update_f64(&mut hasher, entry.weight);
        }
    }

    hex::encode(hasher.finalize())
}
