//! Scalar fields defined over the locations of a grid.
//!
//! A [`Coverage`] owns a reference to exactly one grid, an integer argument enumerating the
//! locations of one [`LocationKind`] (`0..N`), and one or more [`Component`]s whose values are
//! aligned 1:1 with the argument. Structural changes go through an [`EditSession`], which
//! brackets the change with start/finish notifications so observers see a single update.
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::{Grid, LocationKind};

pub mod edit;
pub mod events;

pub use edit::EditSession;
pub use events::{CoverageEvent, CoverageEventKind, EventSink, FilterSink, FnSink, VecSink};

/// Default no-data sentinel for new components.
pub const DEFAULT_NO_DATA_VALUE: f64 = -999.0;

/// Element type of a component's values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Double,
    Integer,
}

/// Values of a component.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentValues {
    Double(Vec<f64>),
    Integer(Vec<i64>),
}

impl ComponentValues {
    pub fn len(&self) -> usize {
        match self {
            ComponentValues::Double(v) => v.len(),
            ComponentValues::Integer(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ComponentValues::Double(_) => ValueType::Double,
            ComponentValues::Integer(_) => ValueType::Integer,
        }
    }

    pub(crate) fn clear(&mut self) {
        match self {
            ComponentValues::Double(v) => v.clear(),
            ComponentValues::Integer(v) => v.clear(),
        }
    }

    pub(crate) fn fill(&mut self, count: usize, value: f64) {
        match self {
            ComponentValues::Double(v) => {
                v.clear();
                v.resize(count, value);
            }
            ComponentValues::Integer(v) => {
                v.clear();
                v.resize(count, value as i64);
            }
        }
    }
}

/// One value array of a coverage, with its sentinel and default.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub name: String,
    pub values: ComponentValues,
    /// Marks a location's value as absent.
    pub no_data_value: f64,
    /// Value assigned to every location after a structural reset.
    pub default_value: f64,
}

impl Component {
    /// Double-valued component with the default sentinel and a default of `0.0`.
    pub fn double(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: ComponentValues::Double(values),
            no_data_value: DEFAULT_NO_DATA_VALUE,
            default_value: 0.0,
        }
    }

    pub fn integer(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            values: ComponentValues::Integer(values),
            no_data_value: DEFAULT_NO_DATA_VALUE,
            default_value: 0.0,
        }
    }

    pub fn with_no_data_value(mut self, no_data_value: f64) -> Self {
        self.no_data_value = no_data_value;
        self
    }

    pub fn with_default_value(mut self, default_value: f64) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_type(&self) -> ValueType {
        self.values.value_type()
    }

    /// Whether the component holds doubles, the only type that can be interpolated.
    pub fn is_double(&self) -> bool {
        self.value_type() == ValueType::Double
    }

    /// The values as doubles, if the component is double-valued.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.values {
            ComponentValues::Double(v) => Some(v),
            ComponentValues::Integer(_) => None,
        }
    }

    /// The single value shared by every location, if the component is double-valued,
    /// non-empty, and uniform.
    pub fn uniform_value(&self) -> Option<f64> {
        let values = self.as_f64()?;
        let first = *values.first()?;
        values
            .iter()
            .all(|v| v.to_bits() == first.to_bits() || *v == first)
            .then_some(first)
    }
}

/// A scalar field over one kind of grid location.
#[derive(Clone, Debug)]
pub struct Coverage {
    name: String,
    location: LocationKind,
    grid: Arc<dyn Grid>,
    argument: Vec<usize>,
    components: Vec<Component>,
    time_dependent: bool,
    edit_label: Option<String>,
}

impl Coverage {
    /// Creates a coverage with a single double component named `value`, filled with `0.0`.
    pub fn new(name: impl Into<String>, location: LocationKind, grid: Arc<dyn Grid>) -> Self {
        let count = grid.location_count(location);
        Self {
            name: name.into(),
            location,
            grid,
            argument: (0..count).collect(),
            components: vec![Component::double("value", vec![0.0; count])],
            time_dependent: false,
            edit_label: None,
        }
    }

    /// Creates a coverage from explicit components, each aligned with the grid's locations.
    pub fn with_components(
        name: impl Into<String>,
        location: LocationKind,
        grid: Arc<dyn Grid>,
        components: Vec<Component>,
    ) -> Result<Self> {
        let name = name.into();
        if components.is_empty() {
            return Err(Error::InvalidOperation(format!(
                "coverage '{name}' needs at least one component"
            )));
        }
        let count = grid.location_count(location);
        for c in &components {
            if c.len() != count {
                return Err(Error::data_consistency(
                    format!("component '{}' of coverage '{name}'", c.name),
                    count,
                    c.len(),
                ));
            }
        }
        Ok(Self {
            name,
            location,
            grid,
            argument: (0..count).collect(),
            components,
            time_dependent: false,
            edit_label: None,
        })
    }

    /// Creates a single-component coverage from values aligned with the grid's locations.
    pub fn from_values(
        name: impl Into<String>,
        location: LocationKind,
        grid: Arc<dyn Grid>,
        values: Vec<f64>,
    ) -> Result<Self> {
        Self::with_components(name, location, grid, vec![Component::double("value", values)])
    }

    /// Marks the coverage as time dependent.
    pub fn with_time_dependent(mut self, time_dependent: bool) -> Self {
        self.time_dependent = time_dependent;
        self
    }

    /// Sets the default value of component 0.
    pub fn with_default_value(mut self, default_value: f64) -> Self {
        if let Some(c) = self.components.first_mut() {
            c.default_value = default_value;
        }
        self
    }

    /// Sets the no-data value of component 0.
    pub fn with_no_data_value(mut self, no_data_value: f64) -> Self {
        if let Some(c) = self.components.first_mut() {
            c.no_data_value = no_data_value;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> LocationKind {
        self.location
    }

    pub fn grid(&self) -> &Arc<dyn Grid> {
        &self.grid
    }

    pub fn argument(&self) -> &[usize] {
        &self.argument
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    /// Double values of a component.
    pub fn values(&self, component: usize) -> Option<&[f64]> {
        self.components.get(component)?.as_f64()
    }

    pub fn is_time_dependent(&self) -> bool {
        self.time_dependent
    }

    /// Number of locations in the argument.
    pub fn len(&self) -> usize {
        self.argument.len()
    }

    pub fn is_empty(&self) -> bool {
        self.argument.is_empty()
    }

    /// Label of the open edit session, if any.
    pub fn current_edit(&self) -> Option<&str> {
        self.edit_label.as_deref()
    }

    /// Opens an edit session; the finish notification is sent when the session is dropped.
    pub fn begin_edit<'a>(
        &'a mut self,
        label: impl Into<String>,
        sink: &'a mut dyn EventSink,
    ) -> EditSession<'a> {
        EditSession::open(self, label.into(), sink)
    }

    /// Replaces every no-data entry of the double components with that component's default.
    ///
    /// Returns the number of replaced values.
    pub fn replace_missing_values_with_default_values(&mut self) -> usize {
        let mut replaced = 0;
        for c in &mut self.components {
            let (no_data, default) = (c.no_data_value, c.default_value);
            if let ComponentValues::Double(values) = &mut c.values {
                for v in values.iter_mut().filter(|v| **v == no_data) {
                    *v = default;
                    replaced += 1;
                }
            }
        }
        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::UnstructuredGrid;

    fn grid() -> Arc<dyn Grid> {
        Arc::new(UnstructuredGrid::regular(2, 2, 1.0, 1.0))
    }

    #[test]
    fn new_coverage_enumerates_locations() {
        let vertices = Coverage::new("bed", LocationKind::Vertex, grid());
        assert_eq!(vertices.argument(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let links = Coverage::new("roughness", LocationKind::FlowLink, grid());
        assert_eq!(links.len(), 4);
        assert_eq!(links.values(0).unwrap().len(), 4);
    }

    #[test]
    fn with_components_checks_lengths() {
        let err = Coverage::with_components(
            "c",
            LocationKind::Cell,
            grid(),
            vec![Component::double("a", vec![1.0; 3])],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DataConsistency { expected: 4, actual: 3, .. }));

        assert!(Coverage::with_components("c", LocationKind::Cell, grid(), Vec::new()).is_err());
    }

    #[test]
    fn uniform_value_detects_constant_fields() {
        assert_eq!(Component::double("a", vec![2.0; 3]).uniform_value(), Some(2.0));
        assert_eq!(Component::double("a", vec![2.0, 3.0]).uniform_value(), None);
        assert_eq!(Component::double("a", Vec::new()).uniform_value(), None);
        assert_eq!(Component::integer("a", vec![1, 1]).uniform_value(), None);
        assert_eq!(
            Component::double("a", vec![f64::NAN, f64::NAN]).uniform_value().map(f64::is_nan),
            Some(true)
        );
    }

    #[test]
    fn replace_missing_values_uses_component_default() {
        let mut coverage = Coverage::from_values(
            "c",
            LocationKind::Cell,
            grid(),
            vec![1.0, -999.0, 3.0, -999.0],
        )
        .unwrap()
        .with_default_value(7.5);
        assert_eq!(coverage.replace_missing_values_with_default_values(), 2);
        assert_eq!(coverage.values(0).unwrap(), &[1.0, 7.5, 3.0, 7.5]);
    }

    #[test]
    fn builders_configure_first_component() {
        let coverage = Coverage::new("c", LocationKind::Cell, grid())
            .with_no_data_value(-1.0)
            .with_default_value(4.0)
            .with_time_dependent(true);
        let c = coverage.component(0).unwrap();
        assert_eq!((c.no_data_value, c.default_value), (-1.0, 4.0));
        assert!(coverage.is_time_dependent());
        assert!(coverage.current_edit().is_none());
    }
}
