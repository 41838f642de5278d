//! shapestate CLI - Tool for inspecting saved state files.

use std::env;
use std::process::ExitCode;

use shapestate::core::{Key, Metadata, Value};
use shapestate::state::read_state_file;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut filter = "warn";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => filter = "debug",
            "-vv" | "--trace" => filter = "trace",
            "-q" | "--quiet" => filter = "error",
            _ => filtered_args.push(arg),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    if filtered_args.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    let result = match filtered_args[0] {
        "dump" | "d" => with_file(&filtered_args, |entries| {
            for (key, metadata) in entries {
                println!("{} (v{})", key.id(), metadata.version());
                for (k, v) in metadata.entries() {
                    print_value(k, v, 1);
                }
            }
        }),
        "keys" | "k" => with_file(&filtered_args, |entries| {
            for (key, metadata) in entries {
                println!("{}  [{} entries]", key.id(), metadata.len());
            }
        }),
        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn with_file(
    args: &[&str],
    body: impl FnOnce(&[(Key<Metadata>, Metadata)]),
) -> shapestate::Result<()> {
    let Some(path) = args.get(1) else {
        return Err(shapestate::Error::other("missing <file> argument"));
    };
    let entries = read_state_file(path)?;
    body(&entries);
    Ok(())
}

fn print_value(key: &Key, value: &Value, depth: usize) {
    let pad = "  ".repeat(depth);
    match value {
        Value::Metadata(md) => {
            println!("{pad}{}: metadata (v{})", key.id(), md.version());
            for (k, v) in md.entries() {
                print_value(k, v, depth + 1);
            }
        }
        Value::List(items) | Value::Set(items) | Value::SortedSet(items) => {
            println!("{pad}{}: {} [{} items]", key.id(), value.kind_name(), items.len());
        }
        Value::Map(pairs) | Value::SortedMap(pairs) => {
            println!("{pad}{}: {} [{} pairs]", key.id(), value.kind_name(), pairs.len());
        }
        Value::Proxy(proxy) => {
            println!("{pad}{}: proxied {}", key.id(), proxy.type_key.id());
        }
        scalar => {
            println!("{pad}{}: {scalar:?}", key.id());
        }
    }
}

fn print_help() {
    println!("shapestate-cli - inspect saved state files");
    println!();
    println!("Usage: shapestate-cli [flags] <command> <file>");
    println!();
    println!("Commands:");
    println!("  dump, d <file>   Print the full structure of a state file");
    println!("  keys, k <file>   List top-level entry keys");
    println!("  help             Show this help");
    println!();
    println!("Flags:");
    println!("  -v, --verbose    Debug logging");
    println!("  -vv, --trace     Trace logging");
    println!("  -q, --quiet      Errors only");
}
