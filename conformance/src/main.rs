//! GATT conformance runner.
//!
//! Run a specific case:
//! ```bash
//! gatt-conformance --case /TP/GAC/CL/BV-01-C
//! ```
//!
//! List cases, optionally for one category:
//! ```bash
//! gatt-conformance --list --category gad
//! ```
//!
//! Run everything:
//! ```bash
//! gatt-conformance --all --format json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Test passed
//! - 1: Test failed
//! - 2: Usage error

use std::time::Duration;

use clap::Parser;
use facet::Facet;
use gatt_conformance::config::HarnessConfig;
use gatt_conformance::tests;
use gatt_conformance::testcase::TestResult;
use gatt_transport::TransportKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gatt-conformance")]
#[command(about = "Scripted ATT/GATT conformance harness")]
struct Args {
    /// Run a specific case (e.g., "/TP/GAD/CL/BV-01-C")
    #[arg(long)]
    case: Option<String>,

    /// Run every registered case
    #[arg(long, conflicts_with = "case")]
    all: bool,

    /// List available cases
    #[arg(long)]
    list: bool,

    /// Filter by category (gac, gad, gar)
    #[arg(long)]
    category: Option<String>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,

    /// Hex dump every exchange and enable collaborator debug output
    #[arg(long, short)]
    verbose: bool,

    /// Transport backend (mem, datagram)
    #[arg(long)]
    transport: Option<TransportKind>,

    /// Fail a case that makes no progress for this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

/// JSON output for a case listing.
#[derive(Facet)]
struct TestCaseJson {
    name: String,
    category: String,
}

/// JSON output for a test result.
#[derive(Facet)]
struct TestResultJson {
    test: String,
    passed: bool,
    error: Option<String>,
}

fn main() {
    // Output goes to stderr, no timestamps.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let args = Args::parse();

    if args.list {
        list_tests(&args);
        return;
    }

    let mut config = HarnessConfig::from_env();
    if args.verbose {
        config.verbose = true;
    }
    if let Some(kind) = args.transport {
        config.transport = kind;
    }
    if let Some(ms) = args.timeout_ms {
        config.stall_timeout = Duration::from_millis(ms.max(1));
    }

    let names: Vec<String> = if let Some(case) = &args.case {
        vec![case.clone()]
    } else if args.all {
        match &args.category {
            Some(category) => tests::list_category(category),
            None => tests::list_all(),
        }
        .into_iter()
        .map(str::to_string)
        .collect()
    } else {
        eprintln!("Usage: gatt-conformance --case <name>");
        eprintln!("       gatt-conformance --all [--category <category>]");
        eprintln!("       gatt-conformance --list");
        std::process::exit(2);
    };

    let mut failed = 0usize;
    for name in &names {
        let result = tests::run(name, &config);
        report(name, &result, &args);
        if !result.passed {
            failed += 1;
        }
    }

    if names.len() > 1 && args.format != "json" {
        eprintln!("{} passed, {} failed", names.len() - failed, failed);
    }
    std::process::exit(if failed == 0 { 0 } else { 1 });
}

fn list_tests(args: &Args) {
    let names = match &args.category {
        Some(category) => tests::list_category(category),
        None => tests::list_all(),
    };

    if args.format == "json" {
        let output: Vec<TestCaseJson> = names
            .iter()
            .map(|name| TestCaseJson {
                name: name.to_string(),
                category: category_of(name),
            })
            .collect();
        match facet_json::to_string(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("JSON serialization failed: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        println!("Available test cases:\n");

        let mut current_category = String::new();
        for name in &names {
            let category = category_of(name);
            if category != current_category {
                if !current_category.is_empty() {
                    println!();
                }
                println!("## {}", category);
                current_category = category;
            }
            println!("  {}", name);
        }

        println!("\nTotal: {} tests", names.len());
    }
}

fn report(name: &str, result: &TestResult, args: &Args) {
    if args.format == "json" {
        let output = TestResultJson {
            test: name.to_string(),
            passed: result.passed,
            error: result.error.clone(),
        };
        match facet_json::to_string(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("JSON serialization failed: {}", e),
        }
    } else if result.passed {
        println!("PASS: {}", name);
    } else {
        println!("FAIL: {}", name);
        if let Some(error) = &result.error {
            println!("  {}", error);
        }
    }
}

/// "/TP/GAD/CL/BV-01-C" -> "gad".
fn category_of(name: &str) -> String {
    name.split('/').nth(2).unwrap_or_default().to_ascii_lowercase()
}
