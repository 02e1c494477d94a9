use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use ugrid_mapping::prelude::*;
use ugrid_mapping_examples::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // 20 x 10 cells of 50 m.
    let grid: Arc<dyn Grid> = Arc::new(UnstructuredGrid::regular(20, 10, 50.0, 50.0));

    // Same grid, two vertical discretizations.
    let mut sigma = SegmentIndexMapper::new();
    sigma.set_grid(grid.clone());
    sigma.apply_layer_config(&LayerConfig::sigma([0.1, 0.2, 0.3, 0.4]))?;

    let mut z = SegmentIndexMapper::new();
    z.set_grid(grid);
    z.apply_layer_config(&LayerConfig::z_layers(vec![0.2; 5], 0.0, -25.0))?;

    println!(
        "segments: sigma {} | z {}",
        sigma.segment_count().unwrap_or(0),
        z.segment_count().unwrap_or(0)
    );

    let mut rng = StdRng::seed_from_u64(2025);
    for i in 0..8 {
        let x = rng.random_range(0.0..1000.0);
        let y = rng.random_range(0.0..500.0);
        let rel = rng.random::<f64>();
        let depth = -25.0 * rel;

        let s = sigma.segment_index(x, y, rel);
        let zl = z.segment_index(x, y, depth);
        match (s, zl) {
            (Ok(s), Ok(zl)) => println!(
                "obs {i}: ({x:>7.2}, {y:>7.2}) rel {rel:.3} -> sigma segment {s:>4} (layer {}) | z segment {zl:>4} (layer {})",
                sigma.layer_from_segment_index(s)?,
                z.layer_from_segment_index(zl)?,
            ),
            (Err(e), _) | (_, Err(e)) => println!("obs {i}: ({x:>7.2}, {y:>7.2}) not mapped: {e}"),
        }
    }

    // Out-of-column heights and points on shared edges are reported, not guessed.
    for (x, y, depth) in [(125.0, 75.0, -30.0), (100.0, 75.0, -5.0)] {
        if let Err(e) = z.segment_index(x, y, depth) {
            println!("({x}, {y}, {depth}): {e}");
        }
    }

    Ok(())
}
