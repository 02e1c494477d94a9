//! Interpolation engine port used by the coverage regridding code.
//!
//! The engine is an external collaborator: given scattered samples and the target locations of
//! a grid, it returns one value per target location in its canonical order. For flow links the
//! caller maps that order onto the grid's own numbering through
//! [`Grid::reorder_flow_link_values`]. Calls are synchronous and may block.
//!
//! [`IdwEngine`] is an inverse distance weighting reference engine.
use std::fmt;

use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Grid, LocationKind};
use crate::pointcloud::PointCloud;

pub mod idw;

pub use idw::{IdwConfig, IdwEngine};

/// How distances between coordinates are measured.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    /// Planar coordinates, Euclidean distance.
    #[default]
    Cartesian,
    /// Longitude/latitude in degrees, great-circle distance.
    Spherical,
}

impl ProjectionKind {
    /// Projection matching a grid's coordinate system.
    pub fn for_grid(grid: &dyn Grid) -> Self {
        if grid.is_geographic() {
            ProjectionKind::Spherical
        } else {
            ProjectionKind::Cartesian
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectionKind::Cartesian => "cartesian",
            ProjectionKind::Spherical => "spherical",
        };
        f.pad(name)
    }
}

/// Target locations of a grid for one location kind.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetGeometry {
    location: LocationKind,
    coordinates: Vec<DVec2>,
}

impl TargetGeometry {
    pub fn new(location: LocationKind, coordinates: Vec<DVec2>) -> Self {
        Self {
            location,
            coordinates,
        }
    }

    /// Collects the coordinates of every `location` of `grid`.
    pub fn from_grid(grid: &dyn Grid, location: LocationKind) -> Self {
        let coordinates = grid
            .coordinates(location)
            .into_iter()
            .map(DVec2::from)
            .collect();
        Self::new(location, coordinates)
    }

    pub fn location(&self) -> LocationKind {
        self.location
    }

    pub fn coordinates(&self) -> &[DVec2] {
        &self.coordinates
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

/// Interpolates scattered samples onto the locations of a grid.
pub trait InterpolationEngine: Send + Sync {
    /// Returns one value per target location.
    ///
    /// Failures should be reported as [`crate::error::Error::Interpolation`].
    fn interpolate(
        &self,
        samples: &PointCloud,
        target: &TargetGeometry,
        location: LocationKind,
        projection: ProjectionKind,
    ) -> Result<Vec<f64>>;
}

impl<E: InterpolationEngine + ?Sized> InterpolationEngine for &E {
    fn interpolate(
        &self,
        samples: &PointCloud,
        target: &TargetGeometry,
        location: LocationKind,
        projection: ProjectionKind,
    ) -> Result<Vec<f64>> {
        (**self).interpolate(samples, target, location, projection)
    }
}

impl<E: InterpolationEngine + ?Sized> InterpolationEngine for Box<E> {
    fn interpolate(
        &self,
        samples: &PointCloud,
        target: &TargetGeometry,
        location: LocationKind,
        projection: ProjectionKind,
    ) -> Result<Vec<f64>> {
        (**self).interpolate(samples, target, location, projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::UnstructuredGrid;

    #[test]
    fn projection_follows_grid_coordinate_system() {
        let grid = UnstructuredGrid::regular(1, 1, 1.0, 1.0);
        assert_eq!(ProjectionKind::for_grid(&grid), ProjectionKind::Cartesian);
        let grid = grid.with_geographic(true);
        assert_eq!(ProjectionKind::for_grid(&grid), ProjectionKind::Spherical);
    }

    #[test]
    fn target_geometry_collects_grid_coordinates() {
        let grid = UnstructuredGrid::regular(2, 1, 4.0, 2.0);
        let target = TargetGeometry::from_grid(&grid, LocationKind::Cell);
        assert_eq!(target.location(), LocationKind::Cell);
        assert_eq!(
            target.coordinates(),
            &[DVec2::new(2.0, 1.0), DVec2::new(6.0, 1.0)]
        );
        let links = TargetGeometry::from_grid(&grid, LocationKind::FlowLink);
        assert_eq!(links.coordinates(), &[DVec2::new(4.0, 1.0)]);
    }
}
