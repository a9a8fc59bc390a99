//! The built-in intrinsic handlers.
//!
//! Each handler computes a type-appropriate expansion for one call
//! marker. Registering a new intrinsic is adding an impl here (or in a
//! caller's crate) and inserting it into the registry; the parser and
//! resolver stay untouched.

mod cast;
mod empty;
mod equals;
mod new_array;

pub use cast::Cast;
pub use empty::Empty;
pub use equals::Equals;
pub use new_array::NewArray;

use mono_resolve::IntrinsicRegistry;

/// The standard registry: `cast`, `equals`, `newArray`, `empty`.
pub fn default_registry() -> IntrinsicRegistry {
    let mut registry = IntrinsicRegistry::empty();
    registry.register(Box::new(Cast));
    registry.register(Box::new(Equals));
    registry.register(Box::new(NewArray));
    registry.register(Box::new(Empty));
    registry
}
