//! monogen CLI.

use std::path::PathBuf;

use monogen::commands::{
    infer_arity, parse_kind_list, run_check, run_generate, run_list_types, GenerateOptions,
};
use monogen::PairPolicy;
use mono_ir::Arity;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    init_tracing(verbose);

    let command = &args[1];
    let code = match command.as_str() {
        "generate" => {
            if args.len() < 3 {
                eprintln!("Usage: monogen generate <template.java> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --out <dir>            Output directory (default: .)");
                eprintln!("  --arity <1|2>          Slot count (default: from file name)");
                eprintln!("  --types <list>         Comma-separated kinds (default: all)");
                eprintln!("  --pairs <all|skip-identical>");
                eprintln!("                         Symmetric concrete pair policy");
                eprintln!("  -v, --verbose          Verbose output");
                std::process::exit(1);
            }

            let mut options = GenerateOptions {
                template: PathBuf::from(&args[2]),
                ..GenerateOptions::default()
            };
            options.arity = Some(infer_arity(&options.template));

            let mut i = 3;
            let mut bad_arg = None;
            while i < args.len() {
                match args[i].as_str() {
                    "--out" if i + 1 < args.len() => {
                        options.out_dir = PathBuf::from(&args[i + 1]);
                        i += 2;
                    }
                    "--arity" if i + 1 < args.len() => {
                        options.arity = match args[i + 1].as_str() {
                            "1" => Some(Arity::One),
                            "2" => Some(Arity::Two),
                            other => {
                                bad_arg = Some(format!("invalid arity `{other}`"));
                                break;
                            }
                        };
                        i += 2;
                    }
                    "--types" if i + 1 < args.len() => {
                        match parse_kind_list(&args[i + 1]) {
                            Ok(kinds) => options.kinds = Some(kinds),
                            Err(e) => {
                                bad_arg = Some(e);
                                break;
                            }
                        }
                        i += 2;
                    }
                    "--pairs" if i + 1 < args.len() => {
                        options.policy = match args[i + 1].as_str() {
                            "all" => PairPolicy::All,
                            "skip-identical" => PairPolicy::SkipIdenticalConcrete,
                            other => {
                                bad_arg = Some(format!("invalid pair policy `{other}`"));
                                break;
                            }
                        };
                        i += 2;
                    }
                    "-v" | "--verbose" => i += 1,
                    other => {
                        bad_arg = Some(format!("unknown option `{other}`"));
                        break;
                    }
                }
            }
            if let Some(message) = bad_arg {
                eprintln!("error: {message}");
                std::process::exit(1);
            }
            run_generate(&options)
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: monogen check <template.java>");
                std::process::exit(1);
            }
            run_check(&PathBuf::from(&args[2]))
        }
        "list-types" => run_list_types(),
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            1
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    println!("monogen - primitive-specialization template generator");
    println!();
    println!("Usage: monogen <command> [arguments]");
    println!();
    println!("Commands:");
    println!("  generate <template.java>   Expand a template over the type catalog");
    println!("  check <template.java>      Parse and validate a template");
    println!("  list-types                 Show the supported type catalog");
    println!("  help                       Show this help");
}
