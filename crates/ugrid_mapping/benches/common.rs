use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, Throughput};
use ugrid_mapping::prelude::{Grid, UnstructuredGrid};

pub const SAMPLE_SIZE: usize = 30;
pub const WARM_UP: Duration = Duration::from_millis(500);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

/// Throughput in grid locations or query points.
pub fn locations_throughput(locations: usize) -> Throughput {
    Throughput::Elements(locations.max(1) as u64)
}

/// Square `side` x `side` grid of cells with edge length `cell`, bed falling towards +y.
pub fn square_grid(side: usize, cell: f64) -> Arc<dyn Grid> {
    Arc::new(
        UnstructuredGrid::regular(side, side, cell, cell)
            .with_vertex_z(|p| (p.x * 0.3).sin() - p.y),
    )
}
