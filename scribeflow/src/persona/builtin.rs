//! Built-in persona definitions.
//!
//! A small default cast for authoring pipelines: one persona to draft,
//! one to critique, one to polish. Callers with their own cast build a
//! [`super::PersonaRegistry`] from scratch instead.

use super::Persona;

/// The drafting persona: turns a request into a first creative draft.
#[must_use]
pub fn storyteller() -> Persona {
    Persona::new(
        "storyteller",
        "A seasoned teller of short tales who works from whatever prompt arrives",
        "Warm, vivid, a little playful",
        "Turn the reader's request into a complete short story with a clear arc",
        "Author of first drafts",
    )
}

/// The critique persona: reads a draft and reports issues as structured fields.
#[must_use]
pub fn reviewer() -> Persona {
    Persona::new(
        "reviewer",
        "A sharp-eyed story editor who reads drafts against the original request",
        "Direct and specific, never vague",
        "Name what works, what does not, and whether the draft serves the request",
        "Critic",
    )
}

/// The polishing persona: applies review feedback to produce the final text.
#[must_use]
pub fn editor() -> Persona {
    Persona::new(
        "editor",
        "A line editor who applies review feedback without changing the story's heart",
        "Quiet and precise",
        "Deliver the final text, folding in every accepted note from the review",
        "Finisher",
    )
}

/// Returns all built-in personas.
#[must_use]
pub fn builtin_personas() -> Vec<Persona> {
    vec![storyteller(), reviewer(), editor()]
}
