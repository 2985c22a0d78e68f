//! Personas and the read-only persona registry.
//!
//! A persona is a named behavioral profile applied to a model
//! invocation. Personas are immutable and shared by reference across
//! stages; equality is by name, not structural comparison.

mod builtin;
mod registry;

pub use builtin::{builtin_personas, editor, reviewer, storyteller};
pub use registry::PersonaRegistry;

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A named behavioral profile for a model invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// The persona's unique identifier.
    pub name: String,
    /// A short description of who the persona is.
    pub description: String,
    /// The voice the persona writes in.
    pub voice: String,
    /// What the persona is trying to achieve.
    pub objective: String,
    /// The role the persona plays in the pipeline.
    pub role: String,
}

impl Persona {
    /// Creates a new persona.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        voice: impl Into<String>,
        objective: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            voice: voice.into(),
            objective: objective.into(),
            role: role.into(),
        }
    }

    /// Renders the persona as a system-prompt preamble.
    ///
    /// Model clients prepend this block to the composed prompt so the
    /// backend adopts the persona's profile.
    #[must_use]
    pub fn prompt_block(&self) -> String {
        format!(
            "You are {name}: {description}\nVoice: {voice}\nObjective: {objective}\nRole: {role}",
            name = self.name,
            description = self.description,
            voice = self.voice,
            objective = self.objective,
            role = self.role,
        )
    }
}

impl PartialEq for Persona {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Persona {}

impl Hash for Persona {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
