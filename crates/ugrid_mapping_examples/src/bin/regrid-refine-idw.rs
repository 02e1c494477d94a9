use ugrid_mapping::prelude::*;
use ugrid_mapping_examples::{init_tracing, print_coverage_summary, sloped_basin};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let coarse = sloped_basin(10, 1000.0, 12.0);
    let fine = sloped_basin(25, 1000.0, 12.0);

    let z = vertex_z_values(coarse.as_ref());
    let mut bed = Coverage::from_values("Bed Level", LocationKind::Vertex, coarse.clone(), z)?;
    let mut level = Coverage::from_values(
        "Initial Water Level",
        LocationKind::Cell,
        coarse.clone(),
        vec![0.25; coarse.cell_count()],
    )?;
    let mut roughness = Coverage::new("Roughness", LocationKind::FlowLink, coarse)
        .with_default_value(0.023);

    println!("before:");
    for c in [&bed, &level, &roughness] {
        print_coverage_summary(c);
    }

    let engine = IdwEngine::with_config(
        IdwConfig::new()
            .with_power(2.0)
            .with_max_neighbors(12)
            .with_search_radius(250.0),
    )?;
    let binder = CoverageGridBinder::new(&engine);

    let mut events = VecSink::new();
    binder.load_grid_with_events(&mut bed, fine.clone(), true, &mut events)?;
    binder.load_grid_with_events(&mut level, fine.clone(), true, &mut events)?;
    // Reset instead of reinterpolating: every link gets the default.
    binder.load_grid_with_events(&mut roughness, fine, false, &mut events)?;

    println!("after:");
    for c in [&bed, &level, &roughness] {
        print_coverage_summary(c);
    }

    println!(
        "events: {} edits | {} interpolated | {} filled | {} warnings",
        events.count(CoverageEventKind::EditFinished),
        events.count(CoverageEventKind::ComponentInterpolated),
        events.count(CoverageEventKind::ComponentFilled),
        events.count(CoverageEventKind::Warning),
    );

    Ok(())
}
