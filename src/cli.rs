//! Minimal CLI: check captured traffic against a contract, or report contract defects.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use api_conformance::contract_check::check_contract;
use api_conformance::definitions::Contract;
use api_conformance::mismatcher::{ContractMismatcher, VerifyOptions};
use api_conformance::observed::ObservedExchange;
use api_conformance::path_de::{load_json_file, load_json_records};
use api_conformance::violations::Verification;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// verify observed HTTP exchanges against an API contract
#[derive(Parser, Debug)]
#[command(name = "api-conformance", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// check every captured request/response pair and list its violations
    Check(CheckOut),
    /// report defects in the contract itself
    Contract(ContractOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// One or more exchange files. May be literal paths or quoted glob patterns.
    ///
    /// Each file holds one `{request, response}` object, an array of them, or
    /// NDJSON with `--ndjson`.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    /// contract .json file
    #[arg(long, short)]
    contract: PathBuf,

    #[command(flatten)]
    input_settings: InputSettings,

    /// tolerate undeclared request headers, bodies and body properties
    #[arg(long)]
    lenient: bool,

    /// emit the report as JSON
    #[arg(long)]
    json: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ContractOut {
    /// contract .json file
    #[arg(long, short)]
    contract: PathBuf,
}

/// One verified exchange, tagged with where it came from.
#[derive(Debug, Serialize)]
struct ExchangeReport {
    source: String,
    index: usize,
    method: String,
    path: String,
    #[serde(flatten)]
    verification: Verification,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<(PathBuf, usize, ObservedExchange)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let records: Vec<ObservedExchange> = load_json_records(&source_path, self.ndjson)?;
            tracing::debug!(source = %source_path.display(), count = records.len(), "loaded exchanges");
            out.extend(
                records
                    .into_iter()
                    .enumerate()
                    .map(|(index, exchange)| (source_path.clone(), index, exchange)),
            );
        }
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => target.run(),
            Command::Contract(target) => target.run(),
        }
    }
}

impl CheckOut {
    fn run(&self) -> Result<ExitCode> {
        let contract: Contract = load_json_file(&self.contract)?;
        let mismatcher = ContractMismatcher::new(&contract)
            .with_context(|| format!("invalid contract {}", self.contract.display()))?
            .with_options(VerifyOptions { strict: !self.lenient });

        let exchanges = self.input_settings.load()?;
        let reports = exchanges
            .par_iter()
            .map(|(source, index, exchange)| -> Result<ExchangeReport> {
                let verification = mismatcher.find_violations(&exchange.request, &exchange.response)?;
                Ok(ExchangeReport {
                    source: source.display().to_string(),
                    index: *index,
                    method: exchange.request.method.clone(),
                    path: exchange.request.path.clone(),
                    verification,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let failed = reports.iter().filter(|r| !r.verification.conforms()).count();
        if self.out.is_some() {
            colored::control::set_override(false);
        }
        let rendered = if self.json {
            serde_json::to_string_pretty(&reports)?
        } else {
            render_reports(&reports)
        };
        write_output(self.out.as_deref(), &rendered)?;

        if failed > 0 {
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }
}

impl ContractOut {
    fn run(&self) -> Result<ExitCode> {
        let contract: Contract = load_json_file(&self.contract)?;
        let defects = check_contract(&contract);
        if defects.is_empty() {
            println!("{} {}", "✅".green(), format!("{}: no defects", contract.name).green().bold());
            return Ok(ExitCode::SUCCESS);
        }
        println!(
            "{} {}",
            "🔴".red(),
            format!("{}: {} defect(s)", contract.name, defects.len()).red().bold()
        );
        for defect in &defects {
            println!("  {} {defect}", "❌".red());
        }
        Ok(ExitCode::FAILURE)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn render_reports(reports: &[ExchangeReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let location = format!("{}#{}", report.source, report.index);
        let request = format!("{} {}", report.method, report.path);
        if report.verification.conforms() {
            out.push_str(&format!("{} {} {}\n", "✅".green(), location.dimmed(), request.green()));
            continue;
        }
        out.push_str(&format!(
            "{} {} {} {}\n",
            "❌".red(),
            location.dimmed(),
            request.red().bold(),
            format!("[{}]", report.verification.context.endpoint).cyan()
        ));
        for violation in &report.verification.violations {
            out.push_str(&format!(
                "    {} {}\n",
                format!("{}:", violation.kind_name()).yellow(),
                violation.message()
            ));
        }
    }
    let failed = reports.iter().filter(|r| !r.verification.conforms()).count();
    let summary = format!("{} exchange(s), {failed} with violations", reports.len());
    out.push_str(&format!(
        "\n{}\n",
        if failed == 0 { summary.green().bold() } else { summary.red().bold() }
    ));
    out
}

fn write_output(out: Option<&Path>, rendered: &str) -> Result<()> {
    let Some(out) = out else {
        println!("{rendered}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, rendered).with_context(|| format!("writing {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
