//! monogen — a primitive-specialization template generator.
//!
//! Expands a single generic source template (slots `KType`/`VType`)
//! into one concrete, type-specialized source file per supported scalar
//! kind combination, plus an object-erasure fallback, ahead of
//! compilation. Pipeline: parse once, then per assignment run the
//! substitution resolver and intrinsic expansion; the driver enumerates
//! the cross-product and fans units out in parallel.

pub mod commands;
pub mod driver;

pub use driver::{
    enumerate_assignments, generate, DriverError, GeneratedUnit, GenerationReport, MemorySink,
    OutputSink, PairPolicy, UnitFailure,
};
