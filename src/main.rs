mod errors;

use {
    clap::{Parser, Subcommand},
    discern_evidence::{
        average, dempster, distance_weighted, yager, CombinationError, CombinationRule,
        JointMassDistribution, MassDistribution,
    },
    discern_fixture::Fixture,
    errors::*,
    std::path::PathBuf,
    std::str::FromStr,
    tracing::{error, info},
    tracing_forest::ForestLayer,
    tracing_log::LogTracer,
    tracing_subscriber::layer::SubscriberExt,
    tracing_subscriber::{EnvFilter, Registry},
};

/// discern-cli combines recorded bodies of evidence from fixture files.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[clap(arg_required_else_help = true)]
struct Cli {
    /// Log levels: error, warn, info, debug, trace
    ///
    /// Default is "info".
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// The subcommands supported by the Discern CLI.
#[derive(Subcommand)]
enum Command {
    /// Combine the input distributions in a fixture file under one rule
    Combine {
        /// Sets the fixture file to read
        #[arg(short, long, value_name = "FILE")]
        fixture: PathBuf,

        /// Combination rule: dempster, yager, average, distance
        #[arg(short, long)]
        rule: String,
    },
    /// Combine under every recorded rule and compare against the fixture's expected outputs
    Check {
        /// Sets the fixture file to read
        #[arg(short, long, value_name = "FILE")]
        fixture: PathBuf,
    },
}

/// An [`EnvFilter`] pattern to limit matched log events to error events.
const ERROR_FILTER: &str = "error";
/// An [`EnvFilter`] pattern to limit matched log events to warning events.
const WARN_FILTER: &str = "warn";
/// An [`EnvFilter`] pattern to limit matched log events to informational events.
const INFO_FILTER: &str = "info";
/// An [`EnvFilter`] pattern to limit matched log events to debug events.
const DEBUG_FILTER: &str = "debug";
/// An [`EnvFilter`] pattern to limit matched log events to trace events.
const TRACE_FILTER: &str = "trace";

/// The tolerance used when checking combined output against fixture
/// expectations, looser than the engine's own invariant to absorb rounding in
/// recorded values.
const CHECK_EPSILON: f64 = 1e-3;

fn init_tracing(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install()?;

    LogTracer::init().expect("log tracer init failed");

    let log_level: &str = cli.log_level.as_ref().map_or("info", |ll| ll.as_str());
    let subscriber = Registry::default()
        .with(ForestLayer::default())
        .with(EnvFilter::new(
            match log_level.to_ascii_lowercase().as_str() {
                "error" => ERROR_FILTER,
                "warn" => WARN_FILTER,
                "info" => INFO_FILTER,
                "debug" => DEBUG_FILTER,
                "trace" => TRACE_FILTER,
                _ => log_level,
            },
        ));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Dispatches to the combination operator for a rule.
fn combine(
    rule: CombinationRule,
    masses: &[MassDistribution],
) -> Result<JointMassDistribution, CombinationError> {
    match rule {
        CombinationRule::Dempster => dempster(masses),
        CombinationRule::Yager => yager(masses),
        CombinationRule::Average => average(masses),
        CombinationRule::Distance => distance_weighted(masses),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    match &cli.command.ok_or(CliArgumentError::MissingSubcommand)? {
        Command::Combine { fixture, rule } => {
            let rule = CombinationRule::from_str(rule)
                .map_err(|_| CliArgumentError::InvalidRule(rule.clone()))?;
            let fixture = Fixture::load(fixture)?;
            info!(
                sources = fixture.inputs().len(),
                hypotheses = fixture.frame().len(),
                "loaded fixture",
            );
            let joint = combine(rule, fixture.inputs())?;
            println!("{} {}", joint.rule(), joint);
        }
        Command::Check { fixture } => {
            let fixture = Fixture::load(fixture)?;
            if fixture.expected_rules().count() == 0 {
                Err(CheckError::NoExpectedOutputs)?;
            }
            let mut mismatches = Vec::new();
            for rule in fixture.expected_rules() {
                let expected = fixture.expected(rule).expect("recorded rule");
                match combine(rule, fixture.inputs()) {
                    Ok(joint) if joint.approx_eq(expected, CHECK_EPSILON) => {
                        info!(rule = %rule, "joint distribution matches expected output");
                    }
                    Ok(joint) => {
                        error!(
                            rule = %rule,
                            combined = %joint,
                            expected = %expected,
                            "joint distribution deviates from expected output",
                        );
                        mismatches.push(rule.to_string());
                    }
                    Err(e) => {
                        error!(
                            rule = %rule,
                            error_message = ?e,
                            "combination failed",
                        );
                        mismatches.push(rule.to_string());
                    }
                }
            }
            if !mismatches.is_empty() {
                Err(CheckError::Mismatch(mismatches.join(", ")))?;
            }
        }
    }

    Ok(())
}
