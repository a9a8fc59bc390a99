//! The generation driver.
//!
//! Parses a template once, enumerates the assignment cross-product,
//! checks the whole-template preconditions (registered intrinsics,
//! identifier injectivity), then fans the independent generation units
//! out over a worker pool. Unit failures are aggregated, never allowed
//! to abort sibling units; only precondition failures stop the batch,
//! and those surface before anything is written.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, info};

use mono_ir::{
    Arity, Assignment, Catalog, ConfigurationError, ConstructKind, Kind, Slot, TemplateModel,
};
use mono_parse::{parse_template, ParseError};
use mono_resolve::{derive_identifier, resolve, IntrinsicRegistry, ResolveError};

/// What to do with symmetric concrete pairs in a two-slot cross-product.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum PairPolicy {
    /// Generate every combination.
    #[default]
    All,
    /// Skip pairs where both slots are the same concrete kind.
    SkipIdenticalConcrete,
}

/// Receives each successful output. The contract is "persist text under
/// a name derived from identifier"; nothing else is assumed.
pub trait OutputSink {
    fn accept(&mut self, identifier: &str, text: &str) -> std::io::Result<()>;
}

/// Sink collecting outputs in memory.
#[derive(Default)]
pub struct MemorySink {
    pub outputs: Vec<(String, String)>,
}

impl OutputSink for MemorySink {
    fn accept(&mut self, identifier: &str, text: &str) -> std::io::Result<()> {
        self.outputs.push((identifier.to_string(), text.to_string()));
        Ok(())
    }
}

/// One successfully generated unit.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub identifier: String,
    pub assignment: Assignment,
}

/// One failed unit; siblings are unaffected.
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub identifier: String,
    pub assignment: Assignment,
    pub error: ResolveError,
}

/// Aggregated result of one template's batch.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<GeneratedUnit>,
    pub failures: Vec<UnitFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Whole-template failure: nothing was (or will be) written.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("assignments ({first}) and ({second}) both derive output identifier `{identifier}`")]
    NamingCollision {
        identifier: String,
        first: String,
        second: String,
    },

    #[error("failed to persist `{identifier}`: {source}")]
    Sink {
        identifier: String,
        #[source]
        source: std::io::Error,
    },
}

/// Enumerate the assignment set for a template's declared arity: every
/// catalog kind plus `Generic`, crossed when the template has two slots.
pub fn enumerate_assignments(
    arity: Arity,
    catalog: &Catalog,
    policy: PairPolicy,
) -> Vec<Assignment> {
    let mut kinds: Vec<Kind> = catalog.kinds().to_vec();
    kinds.push(Kind::Generic);

    match arity {
        Arity::One => kinds.iter().map(|k| Assignment::single(*k)).collect(),
        Arity::Two => {
            let mut assignments = Vec::with_capacity(kinds.len() * kinds.len());
            for k in &kinds {
                for v in &kinds {
                    if policy == PairPolicy::SkipIdenticalConcrete
                        && k == v
                        && !k.is_generic()
                    {
                        continue;
                    }
                    assignments.push(Assignment::pair(*k, *v));
                }
            }
            assignments
        }
    }
}

/// Run one template through the whole pipeline.
///
/// Report ordering follows enumeration order regardless of worker
/// scheduling, so repeated runs are byte-identical.
pub fn generate(
    source: &str,
    template_name: &str,
    arity: Arity,
    catalog: &Catalog,
    policy: PairPolicy,
    registry: &IntrinsicRegistry,
    sink: &mut dyn OutputSink,
) -> Result<GenerationReport, DriverError> {
    let model = parse_template(source, template_name)?;

    // Unknown intrinsics fail the whole template before any unit runs;
    // silent pass-through would emit invalid output.
    for (name, span) in model.intrinsic_mentions() {
        if !registry.contains(name) {
            return Err(ConfigurationError::UnknownIntrinsic {
                name: name.clone(),
                span: *span,
            }
            .into());
        }
    }

    // The supplied arity must match what the primary declaration
    // actually declares; a mismatch would either starve a slot or
    // collapse every value kind onto one identifier.
    if let Some(construct) = model.primary_decl() {
        if let ConstructKind::TypeDecl { decl_slots, .. } = &construct.kind {
            let declares_v = decl_slots.contains(&Slot::V);
            match arity {
                Arity::One if declares_v => {
                    return Err(ConfigurationError::MissingKind { slot: Slot::V }.into());
                }
                Arity::Two if !declares_v => {
                    return Err(ConfigurationError::UnexpectedKind { slot: Slot::V }.into());
                }
                _ => {}
            }
        }
    }

    let assignments = enumerate_assignments(arity, catalog, policy);
    let identifiers = derive_identifiers(&model, template_name, &assignments)?;

    debug!(
        template = template_name,
        units = assignments.len(),
        "generating cross-product"
    );
    let results: Vec<Result<String, ResolveError>> = assignments
        .par_iter()
        .map(|assignment| resolve(&model, assignment, registry))
        .collect();

    let mut report = GenerationReport::default();
    for (i, result) in results.into_iter().enumerate() {
        let identifier = &identifiers[i];
        let assignment = assignments[i];
        match result {
            Ok(text) => {
                sink.accept(identifier, &text).map_err(|source| DriverError::Sink {
                    identifier: identifier.clone(),
                    source,
                })?;
                report.written.push(GeneratedUnit {
                    identifier: identifier.clone(),
                    assignment,
                });
            }
            Err(ResolveError::Configuration(error)) => {
                // Post-checked configuration problems abort the batch.
                return Err(DriverError::Configuration(error));
            }
            Err(error) => {
                report.failures.push(UnitFailure {
                    identifier: identifier.clone(),
                    assignment,
                    error,
                });
            }
        }
    }

    info!(
        template = template_name,
        written = report.written.len(),
        failed = report.failures.len(),
        "batch complete"
    );
    Ok(report)
}

/// Derive every unit's output identifier and verify injectivity before
/// anything is written.
fn derive_identifiers(
    model: &TemplateModel,
    template_name: &str,
    assignments: &[Assignment],
) -> Result<Vec<String>, DriverError> {
    let mut identifiers = Vec::with_capacity(assignments.len());
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    for (i, assignment) in assignments.iter().enumerate() {
        let identifier = match derive_identifier(model, assignment) {
            Ok(Some(identifier)) => identifier,
            Ok(None) => fallback_identifier(template_name, assignment),
            // The primary declaration names a slot the assignment lacks:
            // the supplied arity does not match the template.
            Err(ResolveError::Resolution(
                mono_resolve::ResolutionError::UndeclaredSlot { slot, .. },
            )) => {
                return Err(ConfigurationError::MissingKind { slot }.into());
            }
            Err(_) => fallback_identifier(template_name, assignment),
        };
        if let Some(&first) = seen.get(&identifier) {
            return Err(DriverError::NamingCollision {
                identifier,
                first: assignments[first].describe(),
                second: assignment.describe(),
            });
        }
        seen.insert(identifier.clone(), i);
        identifiers.push(identifier);
    }
    Ok(identifiers)
}

/// Identifier for templates without a templated primary declaration:
/// the template's own name stem joined with the assignment's display
/// names. Still injective over the cross-product.
fn fallback_identifier(template_name: &str, assignment: &Assignment) -> String {
    let stem = template_name
        .rsplit(['/', '\\'])
        .next()
        .and_then(|s| s.split('.').next())
        .unwrap_or(template_name);
    let mut identifier = stem.to_string();
    identifier.push('_');
    if let Some(k) = assignment.kind(Slot::K) {
        identifier.push_str(k.display());
    }
    if let Some(v) = assignment.kind(Slot::V) {
        identifier.push_str(v.display());
    }
    identifier
}
