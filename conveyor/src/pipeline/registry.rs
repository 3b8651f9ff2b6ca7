//! Stage registry: insertion-ordered, duplicate-rejecting.

use super::StageSpec;
use crate::errors::DuplicateStageError;
use std::collections::HashMap;

/// An ordered collection of stage specifications.
///
/// Insertion order is execution order. The registry is built at process
/// start from static configuration and handed to the runner; no mutation
/// after a run begins.
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: Vec<StageSpec>,
    index: HashMap<String, usize>,
}

impl StageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stage, preserving insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStageError` if the name is already registered.
    pub fn register(&mut self, spec: StageSpec) -> Result<(), DuplicateStageError> {
        if let Some(&first_index) = self.index.get(&spec.name) {
            return Err(DuplicateStageError::new(&spec.name, first_index));
        }

        self.index.insert(spec.name.clone(), self.stages.len());
        self.stages.push(spec);
        Ok(())
    }

    /// Registers a stage, consuming and returning the registry for chaining.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStageError` if the name is already registered.
    pub fn with_stage(mut self, spec: StageSpec) -> Result<Self, DuplicateStageError> {
        self.register(spec)?;
        Ok(self)
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Looks up a stage by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StageSpec> {
        self.index.get(name).map(|&i| &self.stages[i])
    }

    /// Returns a registry containing only the named stage, for single-stage
    /// runs. `None` if the stage is unknown.
    #[must_use]
    pub fn select(&self, name: &str) -> Option<Self> {
        let spec = self.get(name)?.clone();
        let mut selected = Self::new();
        selected.index.insert(spec.name.clone(), 0);
        selected.stages.push(spec);
        Some(selected)
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if no stages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the registered stage names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }
}
