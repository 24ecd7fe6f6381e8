//! apicheck CLI - declarative contract verification for REST APIs

mod storage;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use apicheck_core::invariant::Verdict;
use apicheck_core::report::Reporter;
use apicheck_core::scenario::Suite;
use apicheck_core::{Config, RunReport, plan};
use apicheck_runner::{HttpTransport, run_scenarios};

#[derive(Parser)]
#[command(name = "apicheck")]
#[command(about = "Declarative contract verification for REST APIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose output (stream every verdict, not only failures)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run contract scenarios
    Run {
        /// Config file (default: .apicheck.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Suite files to run instead of the configured ones
        #[arg(short, long)]
        suite: Vec<PathBuf>,

        /// Show execution plan without sending requests
        #[arg(long)]
        dry_run: bool,

        /// Deterministic seed for sampled extractions
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Initialize config and example suite
    Init,

    /// Show version and check configuration
    Doctor,

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

/// Streams failing verdicts to stderr as they are produced; every verdict
/// when verbose.
struct TerminalReporter {
    verbose: bool,
}

impl Reporter for TerminalReporter {
    fn verdict(&mut self, scenario: &str, step: usize, verdict: &Verdict) {
        if verdict.passed && !self.verbose {
            return;
        }
        let icon = if verdict.passed { "ok" } else { "FAIL" };
        eprintln!("    [{icon}] {scenario} step {step}: {}", verdict.message);
    }
}

/// No output at all.
struct SilentReporter;

impl Reporter for SilentReporter {
    fn verdict(&mut self, _scenario: &str, _step: usize, _verdict: &Verdict) {}
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            config,
            suite,
            dry_run,
            seed,
        } => {
            // Load config
            let mut cfg = if let Some(path) = config {
                Config::load(std::path::Path::new(&path))?
            } else {
                Config::load_default()?
            };
            if !suite.is_empty() {
                cfg.suites = suite;
            }

            // Load suites; unreadable files become tool errors, not panics.
            let mut errors: Vec<String> = Vec::new();
            let mut loaded: Vec<(String, Suite)> = Vec::new();
            for path in &cfg.suites {
                match Suite::load(path) {
                    Ok(suite) => loaded.push((path.display().to_string(), suite)),
                    Err(e) => errors.push(e.to_string()),
                }
            }

            // Dry run: show plan and exit
            if dry_run {
                let run_plan = plan::plan(&cfg, &loaded);
                match cli.output {
                    OutputFormat::Terminal => {
                        println!("{}", run_plan.to_terminal());
                        for e in &errors {
                            println!("  [ERROR] {e}");
                        }
                    }
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&run_plan)?);
                    }
                    OutputFormat::Silent => {}
                }
                return Ok(if run_plan.has_errors() || !errors.is_empty() {
                    1
                } else {
                    0
                });
            }

            if cli.output != OutputFormat::Silent {
                eprintln!("Config:");
                eprintln!("  base_url: {}", cfg.base_url);
                eprintln!("  suites:   {}", loaded.len());
                if !cfg.headers.is_empty() {
                    eprintln!("  headers:  {} configured", cfg.headers.len());
                }
                eprintln!();
            }

            let transport = HttpTransport::from_config(&cfg).map_err(anyhow::Error::new)?;
            let seed_bindings = cfg.seed_bindings();

            let run_start = Instant::now();
            let mut scenario_reports = Vec::new();
            for (_, suite) in &loaded {
                let reports = match cli.output {
                    OutputFormat::Silent => run_scenarios(
                        &transport,
                        &seed_bindings,
                        &suite.scenarios,
                        seed,
                        &mut SilentReporter,
                    ),
                    _ => run_scenarios(
                        &transport,
                        &seed_bindings,
                        &suite.scenarios,
                        seed,
                        &mut TerminalReporter {
                            verbose: cli.verbose,
                        },
                    ),
                };
                scenario_reports.extend(reports);
            }
            let duration_secs = run_start.elapsed().as_secs_f64();

            let report = RunReport::from_scenarios(scenario_reports, errors);

            // Output
            match cli.output {
                OutputFormat::Terminal => {
                    let icon = if report.all_passed() { "PASS" } else { "FAIL" };
                    println!("\n{icon}: {}", report.reason());
                    println!(
                        "  Scenarios: {} total, {} passed, {} failed",
                        report.total, report.passed, report.failed
                    );
                    println!("  Exit code: {}", report.exit_code());

                    for e in &report.errors {
                        println!("  ERROR: {e}");
                    }

                    let failed: Vec<_> =
                        report.scenarios.iter().filter(|s| !s.passed()).collect();
                    if !failed.is_empty() {
                        println!("\nFailures:");
                        for scenario in failed {
                            for step in scenario.steps.iter().filter(|s| s.failed()) {
                                println!(
                                    "  [{}] step {} {}",
                                    scenario.name, step.index, step.operation
                                );
                                for v in step.verdicts.iter().filter(|v| !v.passed) {
                                    println!("    {}: {}", v.check, v.message);
                                }
                            }
                        }
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Silent => {}
            }

            // Persist report to ~/.apicheck/reports/
            let report_data = storage::ReportData {
                config: &cfg,
                report: &report,
                duration_secs,
            };
            match storage::save_report(&report_data) {
                Ok(path) => {
                    if cli.output != OutputFormat::Silent {
                        eprintln!("Report saved: {}", path.display());
                    }
                }
                Err(e) => eprintln!("Warning: failed to save report: {e}"),
            }

            Ok(report.exit_code())
        }

        Commands::Init => {
            let config_path = ".apicheck.toml";
            if std::path::Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");

            let suite_path = "scenarios.toml";
            if !std::path::Path::new(suite_path).exists() {
                std::fs::write(suite_path, Suite::example())?;
                println!("Created {suite_path}");
            }

            println!("\nEdit the files to configure:");
            println!("  - base_url: API under verification");
            println!("  - headers/params: auth tokens, API keys, entity IDs");
            println!("  - scenarios.toml: request/extract/check chains");
            Ok(0)
        }

        Commands::Doctor => {
            println!("apicheck doctor");
            println!("===============\n");

            // Check for config
            let config_ok = Config::load_default().is_ok();
            println!(
                "[{}] Config file (.apicheck.toml)",
                if config_ok { "OK" } else { "--" }
            );

            if let Ok(cfg) = Config::load_default() {
                for suite in &cfg.suites {
                    let suite_ok = suite.exists() && Suite::load(suite).is_ok();
                    println!(
                        "[{}] Suite file ({})",
                        if suite_ok { "OK" } else { "NG" },
                        suite.display()
                    );
                }
            }

            if !config_ok {
                println!("\nCreate config and example suite:");
                println!("  apicheck init");
            }

            println!("\nReady to verify!");
            Ok(0)
        }

        Commands::Schema => {
            let schema = apicheck_core::report::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}
