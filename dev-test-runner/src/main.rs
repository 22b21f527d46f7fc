//! Replays scenario files through the verifier and compares the violation
//! kinds it reports with the expected ones.
//!
//! Usage: `dev-test-runner [SCENARIO.json ...]`; with no arguments every file
//! under `dev-test-runner/scenarios/` runs.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Deserialize;

use api_conformance::path_de::load_json_file;
use api_conformance::{check_contract, Contract, ContractMismatcher, ObservedExchange, VerifyOptions};

#[derive(Debug, Deserialize)]
struct Scenario {
    description: String,
    contract: Contract,
    #[serde(default = "default_strict")]
    strict: bool,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    exchange: ObservedExchange,
    /// Violation `type` tags, in reporting order.
    #[serde(default)]
    expect: Vec<String>,
}

fn default_strict() -> bool {
    true
}

fn scenario_paths() -> Result<Vec<PathBuf>> {
    let args: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if !args.is_empty() {
        return Ok(args);
    }
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/*.json");
    let mut paths = glob::glob(&pattern.to_string_lossy())?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

/// Returns the number of failed cases.
fn run_scenario(path: &Path) -> Result<usize> {
    let scenario: Scenario = load_json_file(path)?;
    eprintln!("== {} ({}) ==", scenario.description, path.display());

    let defects = check_contract(&scenario.contract);
    for defect in &defects {
        eprintln!("  ⚠️  contract defect: {defect}");
    }

    let mismatcher = ContractMismatcher::new(&scenario.contract)
        .with_context(|| format!("building mismatcher for {}", path.display()))?
        .with_options(VerifyOptions { strict: scenario.strict });

    let mut failed = 0;
    for case in &scenario.cases {
        let verification = mismatcher
            .find_violations(&case.exchange.request, &case.exchange.response)
            .with_context(|| format!("case `{}`", case.name))?;
        let actual: Vec<&str> = verification.violations.iter().map(|v| v.kind_name()).collect();
        if actual == case.expect {
            eprintln!("  ✅ {}", case.name);
        } else {
            failed += 1;
            eprintln!("  ❌ {}", case.name);
            eprintln!("     expected: {:?}", case.expect);
            eprintln!("     actual:   {actual:?}");
            for violation in &verification.violations {
                eprintln!("       - {}", violation.message());
            }
        }
    }
    Ok(failed)
}

fn main() -> ExitCode {
    let paths = match scenario_paths() {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("failed to resolve scenarios: {error:#}");
            return ExitCode::from(2);
        }
    };

    let mut failed = 0;
    for path in &paths {
        match run_scenario(path) {
            Ok(n) => failed += n,
            Err(error) => {
                failed += 1;
                eprintln!("  ❌ {error:#}");
            }
        }
    }

    eprintln!("{} scenario file(s), {failed} failure(s)", paths.len());
    if failed > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
