//! CLI command implementations.
//!
//! The engine proper never touches the filesystem; these commands are
//! the external collaborator: read a template file, hand outputs to a
//! disk-backed sink, render diagnostics to stderr.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use mono_diagnostic::span_utils::LineOffsetTable;
use mono_diagnostic::{DiagnosticEmitter, DiagnosticQueue, TerminalEmitter};
use mono_ir::{Arity, Catalog, Kind};
use mono_parse::parse_template;
use tracing::warn;

use crate::driver::{generate, DriverError, OutputSink, PairPolicy};

/// Options for `monogen generate`.
pub struct GenerateOptions {
    pub template: PathBuf,
    pub out_dir: PathBuf,
    pub arity: Option<Arity>,
    pub kinds: Option<Vec<Kind>>,
    pub policy: PairPolicy,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            template: PathBuf::new(),
            out_dir: PathBuf::from("."),
            arity: None,
            kinds: None,
            policy: PairPolicy::All,
        }
    }
}

/// Sink persisting each output under `<dir>/<identifier>.java`.
struct DiskSink {
    dir: PathBuf,
}

impl OutputSink for DiskSink {
    fn accept(&mut self, identifier: &str, text: &str) -> io::Result<()> {
        fs::write(self.dir.join(format!("{identifier}.java")), text)
    }
}

/// Infer a template's arity from its file name: a `VType` marker means
/// two slots, otherwise one.
pub fn infer_arity(path: &Path) -> Arity {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem.contains("VType") {
        Arity::Two
    } else {
        Arity::One
    }
}

fn template_display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("<template>")
        .to_string()
}

/// `monogen generate`: run the full cross-product and write outputs.
pub fn run_generate(options: &GenerateOptions) -> i32 {
    let source = match fs::read_to_string(&options.template) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", options.template.display());
            return 1;
        }
    };
    if let Err(e) = fs::create_dir_all(&options.out_dir) {
        eprintln!(
            "error: cannot create output directory {}: {e}",
            options.out_dir.display()
        );
        return 1;
    }

    let name = template_display_name(&options.template);
    let arity = options.arity.unwrap_or_else(|| infer_arity(&options.template));
    let catalog = match &options.kinds {
        Some(kinds) => match Catalog::from_kinds(kinds.clone()) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("error: invalid type list: {e}");
                return 1;
            }
        },
        None => Catalog::standard(),
    };

    let registry = mono_intrinsics::default_registry();
    let mut sink = DiskSink {
        dir: options.out_dir.clone(),
    };
    let mut emitter = TerminalEmitter::<io::Stderr>::stderr(io::stderr().is_terminal());

    match generate(
        &source, &name, arity, &catalog, options.policy, &registry, &mut sink,
    ) {
        Ok(report) => {
            let table = LineOffsetTable::build(&source);
            let mut queue = DiagnosticQueue::new();
            for failure in &report.failures {
                let diag = failure.error.to_diagnostic(&name).with_note(format!(
                    "while generating `{}` ({})",
                    failure.identifier,
                    failure.assignment.describe()
                ));
                queue.push(diag, &table, &source);
            }
            let error_count = queue.error_count();
            for diag in queue.into_sorted() {
                emitter.emit(&diag, Some(&source));
            }
            emitter.emit_summary(error_count, 0);
            emitter.flush();
            println!(
                "{}: wrote {} file{} to {}",
                name,
                report.written.len(),
                if report.written.len() == 1 { "" } else { "s" },
                options.out_dir.display()
            );
            i32::from(!report.is_success())
        }
        Err(error) => {
            warn!(template = %name, "batch aborted");
            match &error {
                DriverError::Parse(e) => emitter.emit(&e.to_diagnostic(&name), Some(&source)),
                DriverError::Configuration(e) => {
                    eprintln!("error: {e}");
                }
                DriverError::NamingCollision { .. } | DriverError::Sink { .. } => {
                    eprintln!("error: {error}");
                }
            }
            emitter.flush();
            1
        }
    }
}

/// `monogen check`: parse and validate without generating.
pub fn run_check(path: &Path) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", path.display());
            return 1;
        }
    };
    let name = template_display_name(path);
    match parse_template(&source, name.as_str()) {
        Ok(model) => {
            println!(
                "{name}: ok ({} construct{}, {} intrinsic name{})",
                model.constructs().len(),
                if model.constructs().len() == 1 { "" } else { "s" },
                model.intrinsic_mentions().len(),
                if model.intrinsic_mentions().len() == 1 { "" } else { "s" },
            );
            0
        }
        Err(e) => {
            let mut emitter = TerminalEmitter::<io::Stderr>::stderr(io::stderr().is_terminal());
            emitter.emit(&e.to_diagnostic(&name), Some(&source));
            emitter.flush();
            1
        }
    }
}

/// `monogen list-types`: print the standard catalog.
pub fn run_list_types() -> i32 {
    for kind in Kind::CONCRETE {
        let bits = kind
            .bits()
            .map_or(String::new(), |b| format!(" ({b}-bit)"));
        println!("{:<8} -> {}{}", kind.native(), kind.display(), bits);
    }
    println!("{:<8} -> {} (erased type parameter)", "generic", Kind::Generic.display());
    0
}

/// Parse a `--types` list like `int,long,double`.
pub fn parse_kind_list(list: &str) -> Result<Vec<Kind>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|id| Kind::from_id(id).ok_or_else(|| format!("unknown type `{id}`")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_arity() {
        assert_eq!(infer_arity(Path::new("KTypeVTypeHashMap.java")), Arity::Two);
        assert_eq!(infer_arity(Path::new("KTypeArrayList.java")), Arity::One);
        assert_eq!(infer_arity(Path::new("dir/KTypeStack.java")), Arity::One);
    }

    #[test]
    fn test_parse_kind_list() {
        assert_eq!(
            parse_kind_list("int, long"),
            Ok(vec![Kind::Int, Kind::Long])
        );
        assert!(parse_kind_list("int,decimal").is_err());
    }
}
