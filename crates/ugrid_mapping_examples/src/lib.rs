#![forbid(unsafe_code)]

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use ugrid_mapping::prelude::{Coverage, Grid, UnstructuredGrid};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to info for the crates here.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ugrid_mapping=info,ugrid_mapping_examples=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Regular grid over a `width` x `width` square with a bed sloping down towards +x.
pub fn sloped_basin(cells_per_side: usize, width: f64, depth: f64) -> Arc<dyn Grid> {
    let d = width / cells_per_side.max(1) as f64;
    Arc::new(
        UnstructuredGrid::regular(cells_per_side, cells_per_side, d, d)
            .with_vertex_z(move |p| -depth * p.x / width - 0.1 * (p.y / width).sin()),
    )
}

/// Prints name, location kind, count, and value range of a coverage's first component.
pub fn print_coverage_summary(coverage: &Coverage) {
    let values = coverage.values(0).unwrap_or(&[]);
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() {
        println!(
            "{:<22} {:>9} locations: {:>6}",
            coverage.name(),
            coverage.location(),
            0
        );
    } else {
        println!(
            "{:<22} {:>9} locations: {:>6} | min {:>9.3} | max {:>9.3}",
            coverage.name(),
            coverage.location(),
            values.len(),
            min,
            max
        );
    }
}
