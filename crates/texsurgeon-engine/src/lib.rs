pub mod editing;
pub mod intent;
pub mod parsing;
pub mod prompt;
pub mod sections;
pub mod surgery;
pub mod validation;

// Re-export key types for easier usage
pub use editing::{EditError, EditOutcome};
pub use intent::{Complexity, EditAction, EditIntent, InsertionPoint, classify};
pub use parsing::{DocumentTree, Element, ElementKind, parse_document};
pub use prompt::{PromptRequest, build_prompt};
pub use sections::{MatchRule, SectionBoundary, find_section, resolve_section};
pub use surgery::*;
pub use validation::{ValidationContext, ValidationResult, validate};
