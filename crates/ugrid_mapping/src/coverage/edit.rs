//! Scoped mutation of a [`Coverage`].
//!
//! [`EditSession`] is the only way to change a coverage's argument, values, or grid. Opening a
//! session sends [`CoverageEvent::EditStarted`]; dropping it sends
//! [`CoverageEvent::EditFinished`], so the bracket closes exactly once even when the editing code
//! returns early with an error.
use std::sync::Arc;

use crate::coverage::events::{CoverageEvent, CoverageEventKind, EventSink};
use crate::coverage::{Component, ComponentValues, Coverage};
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Open edit on a coverage. Closes on drop.
pub struct EditSession<'a> {
    coverage: &'a mut Coverage,
    sink: &'a mut dyn EventSink,
    label: String,
}

impl<'a> EditSession<'a> {
    pub(crate) fn open(
        coverage: &'a mut Coverage,
        label: String,
        sink: &'a mut dyn EventSink,
    ) -> Self {
        coverage.edit_label = Some(label.clone());
        if sink.wants(CoverageEventKind::EditStarted) {
            sink.send(CoverageEvent::EditStarted {
                coverage: coverage.name.clone(),
                label: label.clone(),
            });
        }
        Self {
            coverage,
            sink,
            label,
        }
    }

    pub fn coverage(&self) -> &Coverage {
        self.coverage
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Sends an event through the session's sink, if the sink wants it.
    pub fn emit(&mut self, event: CoverageEvent) {
        if self.sink.wants(event.kind()) {
            self.sink.send(event);
        }
    }

    /// Whether the session's sink wants events of this kind.
    pub fn wants(&self, kind: CoverageEventKind) -> bool {
        self.sink.wants(kind)
    }

    /// Sends a non-fatal diagnostic with the coverage name as context.
    pub fn warn(&mut self, message: impl Into<String>) {
        let context = self.coverage.name.clone();
        self.emit(CoverageEvent::Warning {
            context,
            message: message.into(),
        });
    }

    /// Rebuilds the argument as `0..count`.
    pub fn reset_argument(&mut self, count: usize) {
        self.coverage.argument.clear();
        self.coverage.argument.extend(0..count);
        if self.wants(CoverageEventKind::ArgumentReset) {
            let coverage = self.coverage.name.clone();
            self.sink.send(CoverageEvent::ArgumentReset { coverage, count });
        }
    }

    /// Empties the argument and every component.
    pub fn clear(&mut self) {
        self.coverage.argument.clear();
        for c in &mut self.coverage.components {
            c.values.clear();
        }
        if self.wants(CoverageEventKind::ArgumentReset) {
            let coverage = self.coverage.name.clone();
            self.sink.send(CoverageEvent::ArgumentReset { coverage, count: 0 });
        }
    }

    /// Fills a component with one value at every argument location.
    pub fn fill_component(&mut self, component: usize, value: f64) -> Result<()> {
        let count = self.coverage.argument.len();
        self.component_values_mut(component)?.fill(count, value);
        if self.wants(CoverageEventKind::ComponentFilled) {
            let coverage = self.coverage.name.clone();
            self.sink.send(CoverageEvent::ComponentFilled {
                coverage,
                component,
                count,
                value,
            });
        }
        Ok(())
    }

    /// Fills a component with its configured default value.
    pub fn fill_with_default(&mut self, component: usize) -> Result<()> {
        let value = self.component_ref(component)?.default_value;
        self.fill_component(component, value)
    }

    /// Assigns all values of a double component, notifying each changed location.
    pub fn set_values(&mut self, component: usize, values: Vec<f64>) -> Result<()> {
        self.set_raw_values(component, values)?;
        if self.wants(CoverageEventKind::ValueChanged) {
            for location in 0..self.coverage.argument.len() {
                let coverage = self.coverage.name.clone();
                self.sink.send(CoverageEvent::ValueChanged {
                    coverage,
                    component,
                    location,
                });
            }
        }
        Ok(())
    }

    /// Assigns all values of a double component without per-value notifications.
    pub fn set_raw_values(&mut self, component: usize, values: Vec<f64>) -> Result<()> {
        let expected = self.coverage.argument.len();
        if values.len() != expected {
            return Err(Error::data_consistency(
                format!("values for component {component} of '{}'", self.coverage.name),
                expected,
                values.len(),
            ));
        }
        match self.component_values_mut(component)? {
            ComponentValues::Double(v) => {
                *v = values;
                Ok(())
            }
            ComponentValues::Integer(_) => Err(Error::Unsupported(format!(
                "component {component} is not double-valued"
            ))),
        }
    }

    pub fn set_no_data_value(&mut self, component: usize, no_data_value: f64) -> Result<()> {
        self.component_mut(component)?.no_data_value = no_data_value;
        Ok(())
    }

    /// Rebinds the coverage to another grid.
    pub fn set_grid(&mut self, grid: Arc<dyn Grid>) {
        self.coverage.grid = grid;
        if self.wants(CoverageEventKind::GridRebound) {
            let location_count = self.coverage.grid.location_count(self.coverage.location);
            let coverage = self.coverage.name.clone();
            self.sink.send(CoverageEvent::GridRebound {
                coverage,
                location_count,
            });
        }
    }

    fn component_ref(&self, component: usize) -> Result<&Component> {
        let count = self.coverage.components.len();
        self.coverage.components.get(component).ok_or_else(|| {
            Error::OutOfRange(format!(
                "component index {component} is not below the component count {count}"
            ))
        })
    }

    fn component_mut(&mut self, component: usize) -> Result<&mut Component> {
        let count = self.coverage.components.len();
        self.coverage.components.get_mut(component).ok_or_else(|| {
            Error::OutOfRange(format!(
                "component index {component} is not below the component count {count}"
            ))
        })
    }

    fn component_values_mut(&mut self, component: usize) -> Result<&mut ComponentValues> {
        Ok(&mut self.component_mut(component)?.values)
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        self.coverage.edit_label = None;
        if self.sink.wants(CoverageEventKind::EditFinished) {
            self.sink.send(CoverageEvent::EditFinished {
                coverage: self.coverage.name.clone(),
                label: std::mem::take(&mut self.label),
            });
        }
    }
}
