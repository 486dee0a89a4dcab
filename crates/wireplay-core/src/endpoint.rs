//! Named participants and their fixed positions.

use std::collections::HashMap;

use crate::{error::RegistryError, interpolate::Point, surface::MarkerStyle};

/// A named, positioned participant in the visualized exchange.
///
/// Immutable after registration; steps refer to endpoints by name only.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// Unique name within one registry.
    pub name: String,
    /// Fixed position on the rendering surface.
    pub position: Point,
    /// Marker appearance.
    pub style: MarkerStyle,
}

impl Endpoint {
    /// Construct an endpoint.
    pub fn new(name: impl Into<String>, position: Point, style: MarkerStyle) -> Self {
        Self { name: name.into(), position, style }
    }
}

/// The participants of one visualization.
///
/// Mutation stops once a run starts: the runner resolves every step against
/// an immutable snapshot, so nothing can pull an endpoint out from under an
/// animation.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    /// Declaration order; drives marker placement order.
    endpoints: Vec<Endpoint>,
    /// Name -> index into `endpoints`.
    index: HashMap<String, usize>,
}

impl EndpointRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateEndpoint`] if the name is taken.
    pub fn register(&mut self, endpoint: Endpoint) -> Result<(), RegistryError> {
        if self.index.contains_key(&endpoint.name) {
            return Err(RegistryError::DuplicateEndpoint { name: endpoint.name });
        }

        self.index.insert(endpoint.name.clone(), self.endpoints.len());
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Look up a participant by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEndpoint`] if absent.
    pub fn resolve(&self, name: &str) -> Result<&Endpoint, RegistryError> {
        self.index
            .get(name)
            .and_then(|&i| self.endpoints.get(i))
            .ok_or_else(|| RegistryError::UnknownEndpoint { name: name.to_string() })
    }

    /// Whether a participant with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Participants in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// Number of registered participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
