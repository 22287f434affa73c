//! mbindc command-line entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use mbind_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use mbindc::{generate, init_tracing, load_model, parse_args, write_units, CliArgs};

fn print_usage() {
    eprintln!("Usage: mbindc <model.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dialect=<name>      Output dialect: c, cpp, objc (default: c)");
    eprintln!("  --library=<name>      Assembly the bindings load (default: model assembly)");
    eprintln!("  --separator=<sep>     Separator for flattened names (default: _)");
    eprintln!("  --lookup=<strategy>   Runtime lookup: name, token (default: name)");
    eprintln!("  --exceptions=<mode>   Managed exceptions: throw, ignore (default: throw)");
    eprintln!("  --base-name=<stem>    Output file stem (default: library name)");
    eprintln!("  --out-dir=<dir>       Output directory (default: .)");
    eprintln!("  --color=<mode>        Diagnostics color: auto, always, never");
    eprintln!("  -v, --notes           Report renames and escapes");
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return ExitCode::from(2);
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            print_usage();
            return ExitCode::from(2);
        }
    };

    run(&cli)
}

fn run(cli: &CliArgs) -> ExitCode {
    let mut emitter = TerminalEmitter::<io::Stderr>::stderr(cli.color, io::stderr().is_terminal());

    let result = load_model(&cli.input)
        .and_then(|model| generate(model, &cli.options))
        .and_then(|generated| {
            write_units(&cli.out_dir, &generated.units).map(|paths| (generated, paths))
        });

    match result {
        Ok((generated, paths)) => {
            emitter.emit_all(&generated.diagnostics);
            let errors = generated.error_count();
            emitter.emit_summary(errors, generated.warning_count());
            emitter.flush();
            for path in &paths {
                println!("{}", path.display());
            }
            if errors > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            match e.diagnostic() {
                Some(diag) => {
                    emitter.emit(&diag);
                    emitter.emit_summary(1, 0);
                    emitter.flush();
                }
                None => eprintln!("error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}
