//! In-memory unstructured grid implementing the [`Grid`] port.
//!
//! Cells are arbitrary simple polygons given as vertex-index rings. Internal flow links are
//! derived from edges shared by exactly two cells, in cell-then-edge order. Point location is a
//! bounding-box prefilter followed by a crossing-number test, with a distance tolerance that
//! classifies points on an edge or vertex as boundary points.
use std::collections::HashMap;

use glam::{DVec2, DVec3};
use mint::Vector2;

use crate::error::{Error, Result};
use crate::grid::{Grid, LocationKind, CELL_NOT_FOUND};

/// Default distance below which a point counts as lying on a cell edge.
pub const DEFAULT_EDGE_TOLERANCE: f64 = 1e-8;

/// Where a point lies relative to the cells of an [`UnstructuredGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellLocation {
    /// Strictly inside the given (0-based) cell.
    Inside(usize),
    /// On an edge or vertex of the given (0-based) cell, the first one found.
    Boundary(usize),
    Outside,
}

/// Internal connection between two cells across a shared edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowLink {
    /// The two cells (0-based) on either side of the link.
    pub cells: (usize, usize),
    /// The two vertices (0-based) of the shared edge.
    pub edge: (usize, usize),
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    min: DVec2,
    max: DVec2,
}

impl Bounds {
    fn contains(&self, p: DVec2, tol: f64) -> bool {
        p.x >= self.min.x - tol
            && p.x <= self.max.x + tol
            && p.y >= self.min.y - tol
            && p.y <= self.max.y + tol
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Containment {
    Inside,
    OnBoundary,
    Outside,
}

/// A 2D unstructured mesh with vertex elevations.
#[derive(Clone, Debug)]
pub struct UnstructuredGrid {
    vertices: Vec<DVec3>,
    cells: Vec<Vec<usize>>,
    cell_bounds: Vec<Bounds>,
    flow_links: Vec<FlowLink>,
    flow_link_order: Option<Vec<usize>>,
    geographic: bool,
    edge_tolerance: f64,
}

impl UnstructuredGrid {
    /// Creates a grid from vertices and cell vertex rings.
    ///
    /// Fails with [`Error::Configuration`] when a cell has fewer than three vertices or
    /// references a vertex that does not exist.
    pub fn new(vertices: Vec<DVec3>, cells: Vec<Vec<usize>>) -> Result<Self> {
        for (c, ring) in cells.iter().enumerate() {
            if ring.len() < 3 {
                return Err(Error::Configuration(format!(
                    "cell {c} has {} vertices; at least 3 are required",
                    ring.len()
                )));
            }
            if let Some(&v) = ring.iter().find(|&&v| v >= vertices.len()) {
                return Err(Error::Configuration(format!(
                    "cell {c} references vertex {v}, but the grid has {} vertices",
                    vertices.len()
                )));
            }
        }

        let cell_bounds = cells
            .iter()
            .map(|ring| {
                let mut min = DVec2::splat(f64::INFINITY);
                let mut max = DVec2::splat(f64::NEG_INFINITY);
                for &v in ring {
                    let p = vertices[v].truncate();
                    min = min.min(p);
                    max = max.max(p);
                }
                Bounds { min, max }
            })
            .collect();

        let flow_links = derive_flow_links(&cells);

        Ok(Self {
            vertices,
            cells,
            cell_bounds,
            flow_links,
            flow_link_order: None,
            geographic: false,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
        })
    }

    /// A grid without vertices or cells.
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            cells: Vec::new(),
            cell_bounds: Vec::new(),
            flow_links: Vec::new(),
            flow_link_order: None,
            geographic: false,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
        }
    }

    /// Creates an `nx` by `ny` grid of rectangular cells with its lower-left corner at the origin.
    ///
    /// Cells are numbered row by row starting at the lower-left cell; vertices likewise.
    /// All vertex elevations are zero.
    pub fn regular(nx: usize, ny: usize, dx: f64, dy: f64) -> Self {
        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.push(DVec3::new(i as f64 * dx, j as f64 * dy, 0.0));
            }
        }

        let row = nx + 1;
        let mut cells = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = j * row + i;
                cells.push(vec![v0, v0 + 1, v0 + 1 + row, v0 + row]);
            }
        }

        match Self::new(vertices, cells) {
            Ok(grid) => grid,
            Err(_) => unreachable!("regular grid rings are always valid"),
        }
    }

    /// Sets vertex elevations from a function of the vertex position.
    pub fn with_vertex_z(mut self, z: impl Fn(DVec2) -> f64) -> Self {
        for v in &mut self.vertices {
            v.z = z(v.truncate());
        }
        self
    }

    /// Marks the grid coordinates as geographic (longitude, latitude).
    pub fn with_geographic(mut self, geographic: bool) -> Self {
        self.geographic = geographic;
        self
    }

    /// Sets the distance below which a point counts as lying on an edge.
    pub fn with_edge_tolerance(mut self, tolerance: f64) -> Self {
        self.edge_tolerance = tolerance.abs();
        self
    }

    /// Sets the permutation applied by [`Grid::reorder_flow_link_values`].
    ///
    /// `order[i]` is the position, in engine order, of this grid's flow link `i`.
    pub fn with_flow_link_order(mut self, order: Vec<usize>) -> Result<Self> {
        let n = self.flow_links.len();
        if order.len() != n {
            return Err(Error::data_consistency("flow link order", n, order.len()));
        }
        let mut seen = vec![false; n];
        for &i in &order {
            if i >= n || seen[i] {
                return Err(Error::Configuration(format!(
                    "flow link order is not a permutation of 0..{n}"
                )));
            }
            seen[i] = true;
        }
        self.flow_link_order = Some(order);
        Ok(self)
    }

    pub fn flow_links(&self) -> &[FlowLink] {
        &self.flow_links
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Vertex ring (0-based vertex indices) of a cell.
    pub fn cell(&self, cell: usize) -> Option<&[usize]> {
        self.cells.get(cell).map(Vec::as_slice)
    }

    /// Classifies a point: strictly inside a cell, on a cell boundary, or outside the grid.
    ///
    /// Unlike [`Grid::find_cell`], this keeps "outside" and "ambiguous" apart.
    pub fn locate(&self, p: DVec2) -> CellLocation {
        let mut boundary = None;
        for c in 0..self.cells.len() {
            match self.containment(c, p) {
                Containment::Inside => return CellLocation::Inside(c),
                Containment::OnBoundary if boundary.is_none() => boundary = Some(c),
                _ => {}
            }
        }
        boundary.map_or(CellLocation::Outside, CellLocation::Boundary)
    }

    /// Area centroid of a cell, falling back to the vertex mean for degenerate rings.
    pub fn cell_center(&self, cell: usize) -> DVec2 {
        let ring = &self.cells[cell];
        let mut area2 = 0.0;
        let mut acc = DVec2::ZERO;
        for k in 0..ring.len() {
            let a = self.xy(ring[k]);
            let b = self.xy(ring[(k + 1) % ring.len()]);
            let cross = a.perp_dot(b);
            area2 += cross;
            acc += (a + b) * cross;
        }
        if area2.abs() <= f64::EPSILON {
            let sum: DVec2 = ring.iter().map(|&v| self.xy(v)).sum();
            return sum / ring.len() as f64;
        }
        acc / (3.0 * area2)
    }

    #[inline]
    fn xy(&self, vertex: usize) -> DVec2 {
        self.vertices[vertex].truncate()
    }

    fn containment(&self, cell: usize, p: DVec2) -> Containment {
        let tol = self.edge_tolerance;
        if !self.cell_bounds[cell].contains(p, tol) {
            return Containment::Outside;
        }

        let ring = &self.cells[cell];
        let mut inside = false;
        for k in 0..ring.len() {
            let a = self.xy(ring[k]);
            let b = self.xy(ring[(k + 1) % ring.len()]);
            if distance_to_segment(p, a, b) <= tol {
                return Containment::OnBoundary;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }

        if inside {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }
}

impl Grid for UnstructuredGrid {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn flow_link_count(&self) -> usize {
        self.flow_links.len()
    }

    fn find_cell(&self, x: f64, y: f64, include_edges: bool) -> usize {
        match self.locate(DVec2::new(x, y)) {
            CellLocation::Inside(c) => c + 1,
            CellLocation::Boundary(c) if include_edges => c + 1,
            _ => CELL_NOT_FOUND,
        }
    }

    fn vertex_z_values(&self) -> Vec<f64> {
        self.vertices.iter().map(|v| v.z).collect()
    }

    fn coordinates(&self, location: LocationKind) -> Vec<Vector2<f64>> {
        match location {
            LocationKind::Vertex => self.vertices.iter().map(|v| v.truncate().into()).collect(),
            LocationKind::Cell => (0..self.cells.len())
                .map(|c| self.cell_center(c).into())
                .collect(),
            LocationKind::FlowLink => self
                .flow_links
                .iter()
                .map(|link| ((self.xy(link.edge.0) + self.xy(link.edge.1)) * 0.5).into())
                .collect(),
        }
    }

    fn reorder_flow_link_values(&self, values: &[f64]) -> Vec<f64> {
        match &self.flow_link_order {
            Some(order) => order
                .iter()
                .map(|&i| values.get(i).copied().unwrap_or(f64::NAN))
                .collect(),
            None => values.to_vec(),
        }
    }

    fn is_geographic(&self) -> bool {
        self.geographic
    }
}

fn derive_flow_links(cells: &[Vec<usize>]) -> Vec<FlowLink> {
    let mut first_owner: HashMap<(usize, usize), usize> = HashMap::new();
    let mut links = Vec::new();
    for (c, ring) in cells.iter().enumerate() {
        for k in 0..ring.len() {
            let a = ring[k];
            let b = ring[(k + 1) % ring.len()];
            let key = (a.min(b), a.max(b));
            match first_owner.get(&key) {
                Some(&other) if other != c => links.push(FlowLink {
                    cells: (other, c),
                    edge: key,
                }),
                Some(_) => {}
                None => {
                    first_owner.insert(key, c);
                }
            }
        }
    }
    links
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
