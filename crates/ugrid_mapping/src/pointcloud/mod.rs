//! Conversion of a coverage component into discrete `(x, y, value)` samples.
use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coverage::Coverage;
use crate::error::{Error, Result};

/// A single sample in physical space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointValue {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl PointValue {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Ordered collection of samples, the input of an interpolation engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<PointValue>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointValue> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[PointValue] {
        &self.points
    }

    pub fn push(&mut self, point: PointValue) {
        self.points.push(point);
    }

    /// Sample values in cloud order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Axis-aligned bounds of the sample positions as `(min, max)`, or `None` when empty.
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        let first = self.points.first()?.position();
        Some(self.points.iter().skip(1).fold((first, first), |(lo, hi), p| {
            let q = p.position();
            (lo.min(q), hi.max(q))
        }))
    }
}

impl From<Vec<PointValue>> for PointCloud {
    fn from(points: Vec<PointValue>) -> Self {
        Self { points }
    }
}

impl FromIterator<PointValue> for PointCloud {
    fn from_iter<I: IntoIterator<Item = PointValue>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a PointValue;
    type IntoIter = std::slice::Iter<'a, PointValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Builds one sample per location of `coverage` from the given component.
///
/// Sample positions are the grid coordinates for the coverage's location kind. With
/// `skip_missing_values`, locations holding the component's `no_data_value` are omitted.
///
/// # Errors
///
/// * [`Error::Unsupported`] for time-dependent coverages and non-double components.
/// * [`Error::OutOfRange`] if `component_index` does not name a component.
/// * [`Error::DataConsistency`] if the grid reports a different number of coordinates than
///   the component holds values.
pub fn to_point_cloud(
    coverage: &Coverage,
    component_index: usize,
    skip_missing_values: bool,
) -> Result<PointCloud> {
    if coverage.is_time_dependent() {
        return Err(Error::Unsupported(format!(
            "coverage '{}' is time dependent; point clouds hold a single static field",
            coverage.name()
        )));
    }

    let component = coverage.component(component_index).ok_or_else(|| {
        Error::OutOfRange(format!(
            "component index {component_index} is not below the component count {}",
            coverage.components().len()
        ))
    })?;
    let values = component.as_f64().ok_or_else(|| {
        Error::Unsupported(format!(
            "component '{}' of coverage '{}' is not double-valued",
            component.name,
            coverage.name()
        ))
    })?;

    let coordinates = coverage.grid().coordinates(coverage.location());
    if coordinates.len() != values.len() {
        return Err(Error::data_consistency(
            format!("coordinates vs values of coverage '{}'", coverage.name()),
            coordinates.len(),
            values.len(),
        ));
    }

    let no_data = component.no_data_value;
    Ok(coordinates
        .into_iter()
        .zip(values.iter().copied())
        .filter(|&(_, v)| !(skip_missing_values && v == no_data))
        .map(|(c, v)| PointValue::new(c.x, c.y, v))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::coverage::Component;
    use crate::grid::{Grid, LocationKind, UnstructuredGrid};

    fn three_cells() -> Arc<dyn Grid> {
        Arc::new(UnstructuredGrid::regular(3, 1, 2.0, 2.0))
    }

    #[test]
    fn skipping_missing_values_drops_sentinels() {
        let coverage = Coverage::from_values(
            "c",
            LocationKind::Cell,
            three_cells(),
            vec![1.0, -999.0, 3.0],
        )
        .unwrap();

        let cloud = to_point_cloud(&coverage, 0, true).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.values(), vec![1.0, 3.0]);
        assert_eq!(cloud.as_slice()[0].position(), DVec2::new(1.0, 1.0));
        assert_eq!(cloud.as_slice()[1].position(), DVec2::new(5.0, 1.0));

        let all = to_point_cloud(&coverage, 0, false).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn time_dependent_coverage_is_unsupported() {
        let coverage = Coverage::new("c", LocationKind::Cell, three_cells()).with_time_dependent(true);
        assert!(matches!(
            to_point_cloud(&coverage, 0, false),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn integer_component_is_unsupported() {
        let coverage = Coverage::with_components(
            "c",
            LocationKind::Cell,
            three_cells(),
            vec![
                Component::double("d", vec![0.0; 3]),
                Component::integer("i", vec![1, 2, 3]),
            ],
        )
        .unwrap();
        assert!(matches!(
            to_point_cloud(&coverage, 1, false),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            to_point_cloud(&coverage, 2, false),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn bounds_cover_all_samples() {
        let cloud: PointCloud = vec![
            PointValue::new(1.0, 5.0, 0.0),
            PointValue::new(-2.0, 3.0, 0.0),
            PointValue::new(4.0, -1.0, 0.0),
        ]
        .into();
        let (lo, hi) = cloud.bounds().unwrap();
        assert_eq!(lo, DVec2::new(-2.0, -1.0));
        assert_eq!(hi, DVec2::new(4.0, 5.0));
        assert!(PointCloud::new().bounds().is_none());
    }
}
