//! Read-only persona lookup.

use super::Persona;
use std::collections::HashMap;
use std::sync::Arc;

/// A read-only lookup from persona name to [`Persona`].
///
/// Populated once at construction; no runtime mutation. Entries are
/// shared by reference across pipelines and stages, and the registry is
/// safe for unsynchronized concurrent reads. If two personas carry the
/// same name, the later definition wins.
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    personas: HashMap<String, Arc<Persona>>,
}

impl PersonaRegistry {
    /// Creates a registry from a set of persona definitions.
    #[must_use]
    pub fn new(personas: impl IntoIterator<Item = Persona>) -> Self {
        Self {
            personas: personas
                .into_iter()
                .map(|p| (p.name.clone(), Arc::new(p)))
                .collect(),
        }
    }

    /// Creates a registry seeded with the built-in personas.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new(super::builtin_personas())
    }

    /// Looks up a persona by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Persona>> {
        self.personas.get(name).cloned()
    }

    /// Returns true if a persona with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.personas.contains_key(name)
    }

    /// Returns the registered persona names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.personas.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered personas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
