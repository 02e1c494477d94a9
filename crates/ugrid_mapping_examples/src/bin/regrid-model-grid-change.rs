use std::sync::Arc;

use glam::DVec2;
use tracing::{info, warn};
use ugrid_mapping::prelude::*;
use ugrid_mapping_examples::{init_tracing, print_coverage_summary, sloped_basin};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let old = sloped_basin(8, 800.0, 10.0);
    let new = sloped_basin(16, 800.0, 10.0);

    // Bed level without values is loaded from the elevation source.
    let mut coverages = vec![
        Coverage::from_values(
            DEFAULT_BATHYMETRY_NAME,
            LocationKind::Vertex,
            Arc::new(UnstructuredGrid::empty()),
            Vec::new(),
        )?,
        Coverage::from_values(
            "Initial Salinity",
            LocationKind::Cell,
            old.clone(),
            salinity(old.as_ref()),
        )?
        .with_default_value(30.0),
        Coverage::new("Viscosity", LocationKind::FlowLink, old.clone()).with_default_value(1.0),
    ];

    let engine = IdwEngine::new();
    let options = GridUpdateOptions::new().with_bathymetry_no_data_value(-999.0);
    let updater = GridUpdater::new(&engine)
        .with_options(options)?
        .with_bathymetry_source(|grid: &dyn Grid, location| match location {
            LocationKind::Vertex => grid.vertex_z_values(),
            // No cell-centred elevations in this model; the loader fills no-data.
            _ => Vec::new(),
        });

    let change = GridChange::all();
    info!(
        "Replacing model grid: {} -> {} cells.",
        old.cell_count(),
        new.cell_count()
    );

    // Diagnostics raised during updates go to the log.
    let mut warnings = FilterSink::new(
        FnSink::new(|event| {
            if let CoverageEvent::Warning { context, message } = event {
                warn!("{}: {}", context, message);
            }
        }),
        [CoverageEventKind::Warning],
    );

    for coverage in &mut coverages {
        let outcome = updater.update_coverage_after_grid_set_with_events(
            coverage,
            Some(new.clone()),
            change,
            &mut warnings,
        )?;
        println!("{:<18} -> {outcome:?}", coverage.name());
    }
    for coverage in &coverages {
        print_coverage_summary(coverage);
    }

    // Cell-centred bed level: the vertex source does not fit, so it becomes no-data.
    let mut cell_bed = Coverage::new("Cell Bed Level", LocationKind::Cell, old);
    load_bathymetry_with_events(
        &mut cell_bed,
        new,
        -999.0,
        vertex_z_values,
        &mut warnings,
    )?;
    print_coverage_summary(&cell_bed);

    // Removing the grid empties every coverage.
    for coverage in &mut coverages {
        updater.update_coverage_after_grid_set_with_events(coverage, None, change, &mut warnings)?;
    }
    println!("after removing the grid:");
    for coverage in &coverages {
        print_coverage_summary(coverage);
    }

    Ok(())
}

/// Fresh water entering at the left boundary, sea water towards the right.
fn salinity(grid: &dyn Grid) -> Vec<f64> {
    grid.coordinates(LocationKind::Cell)
        .into_iter()
        .map(DVec2::from)
        .map(|p| 35.0 * (p.x / 800.0).clamp(0.0, 1.0))
        .collect()
}
