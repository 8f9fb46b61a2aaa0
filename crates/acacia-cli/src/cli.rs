//! Command Line Interface for Acacia
//!
//! Acacia uses the `clap` crate to parse command line arguments and create
//! the CLI interface. This module defines all available commands and options
//! (and their documentation) as well as some utility functions to apply these
//! options.

use std::{fs, path::PathBuf};

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info};
use log4rs::{
    Config,
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};

use acacia_automaton::{
    Player, cobuchi::CoBuchiAutomaton, turn_based::builder::TurnBasedAutomatonBuilder,
};
use acacia_parser::{
    ParseCoBuchi, ParsePartition, Partition, never_claim::NeverClaimParser,
    partition::PartitionParser,
};
use acacia_synthesis::{Direction, GroupOrder, Method, Outcome, SolveReport, ToCheck};

/// Acacia - antichain-based bounded synthesis - Command Line Interface
///
/// Acacia checks whether an LTL specification, given as never-claims of the
/// negation of its units (as produced by ltl2ba) together with a partition of
/// the signals into inputs and outputs, is realizable. Optionally, a
/// mean-payoff objective can be added through the partition file.
///
/// You can use the --help / -h flag to get all available commands and
/// options.
#[derive(Parser, Debug)]
#[command(version, name = "Acacia CLI", about, long_about)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) log_config: LoggerConfig,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Check the realizability of the specification
    Check {
        #[command(flatten)]
        input: SpecificationInput,

        /// Never-claims of the units of the negated specification, needed to
        /// check unrealizability
        #[arg(long, value_name = "NEGATED")]
        negated: Vec<PathBuf>,

        /// Configuration file for the synthesis procedure
        #[arg(short, long, value_name = "CONFIG_FILE")]
        config_file: Option<PathBuf>,

        /// Player making the first move
        #[arg(long, value_enum)]
        player: Option<PlayerOption>,

        /// Check the units monolithically or compositionally
        #[arg(short, long, value_enum)]
        method: Option<MethodOption>,

        /// Algorithm used to solve the safety games
        #[arg(long, value_enum)]
        direction: Option<DirectionOption>,

        /// Verdicts to check
        #[arg(long, value_enum)]
        tocheck: Option<ToCheckOption>,

        /// First value of K
        #[arg(long)]
        k_start: Option<usize>,

        /// Largest value of K
        #[arg(long)]
        k_bound: Option<usize>,

        /// Increment of K between two attempts
        #[arg(long)]
        k_step: Option<usize>,

        /// Disable the critical signals optimization
        #[arg(long, default_value_t = false)]
        no_critical: bool,

        /// Disable the detection of bounded states
        #[arg(long, default_value_t = false)]
        no_opt1: bool,

        /// Disable the removal of surely losing states
        #[arg(long, default_value_t = false)]
        no_opt2: bool,

        /// Composition order of the units: `flat`, `binary` or a
        /// parenthesization over the unit names such as `((a b) c)`
        #[arg(short, long, value_name = "GROUP_ORDER")]
        group_order: Option<String>,
    },
    /// Read the specification and report the size of its turn-based
    /// automaton
    Inspect {
        #[command(flatten)]
        input: SpecificationInput,

        /// Player making the first move
        #[arg(long, value_enum, default_value_t = PlayerOption::Env)]
        player: PlayerOption,
    },
}

#[derive(Args, Debug)]
pub(crate) struct SpecificationInput {
    /// Never-claims of the specification units, each unit is named after the
    /// stem of its file
    #[arg(required = true)]
    never_claims: Vec<PathBuf>,

    /// Partition of the signals into inputs and outputs
    #[arg(short, long, value_name = "PARTITION_FILE")]
    partition: PathBuf,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum PlayerOption {
    /// The environment moves first (default)
    Env,
    /// The system moves first
    Sys,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum MethodOption {
    /// One automaton for all units (default)
    Mono,
    /// One automaton per unit, games composed along the group order
    Comp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum DirectionOption {
    /// Backward fixpoint computation (default)
    Backward,
    /// Forward exploration
    Forward,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum ToCheckOption {
    /// Realizability only (default)
    Real,
    /// Unrealizability only
    Unreal,
    /// Both, alternating for every value of K
    Both,
}

impl From<PlayerOption> for Player {
    fn from(value: PlayerOption) -> Self {
        match value {
            PlayerOption::Env => Player::Environment,
            PlayerOption::Sys => Player::System,
        }
    }
}

impl From<MethodOption> for Method {
    fn from(value: MethodOption) -> Self {
        match value {
            MethodOption::Mono => Method::Monolithic,
            MethodOption::Comp => Method::Compositional,
        }
    }
}

impl From<DirectionOption> for Direction {
    fn from(value: DirectionOption) -> Self {
        match value {
            DirectionOption::Backward => Direction::Backward,
            DirectionOption::Forward => Direction::Forward,
        }
    }
}

impl From<ToCheckOption> for ToCheck {
    fn from(value: ToCheckOption) -> Self {
        match value {
            ToCheckOption::Real => ToCheck::Realizability,
            ToCheckOption::Unreal => ToCheck::Unrealizability,
            ToCheckOption::Both => ToCheck::Both,
        }
    }
}

/// Interpret the group order given on the command line
pub(crate) fn parse_group_order(order: &str) -> GroupOrder {
    match order.trim() {
        "flat" => GroupOrder::Flat,
        "binary" => GroupOrder::Binary,
        custom => GroupOrder::Custom(custom.to_string()),
    }
}

#[derive(Debug, Args)]
pub(crate) struct LoggerConfig {
    /// Read the logger configuration from file.
    /// Logger configuration can be provided in the log4rs specification format.
    #[arg(long)]
    logger_config_file: Option<String>,

    /// Enable debug output.
    /// **Note**: This flag must be passed first, before any command.
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Initialize the logger as specified in `cfg`
///
/// By default the logger is configured to log to stdout. If a log4rs
/// configuration file is given in `cfg`, the configuration from that file will
/// be used instead
pub(crate) fn initialize_logger(cfg: LoggerConfig) -> Result<(), anyhow::Error> {
    if let Some(f) = cfg.logger_config_file {
        log4rs::init_file(f, Default::default())
            .with_context(|| "Failed to read logger config file")?;
        return Ok(());
    }

    let p_encoder = match cfg.debug {
        true => PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} - {h({l})} - [{f}:{L} - {M}] - {m}{n}"),
        false => PatternEncoder::new("{d(%H:%M:%S)} - {h({l})} - {m}{n}"),
    };

    // Log to stdout
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(p_encoder))
        .build();

    let level = if cfg.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .with_context(|| "Failed to initialize logger")?;

    log4rs::init_config(log_config).with_context(|| "Failed to initialize console logger")?;
    Ok(())
}

/// Read and parse the partition file and the never-claims of the
/// specification units
pub(crate) fn parse_specification(
    input: &SpecificationInput,
) -> Result<(Partition, Vec<CoBuchiAutomaton>), anyhow::Error> {
    let f = fs::read_to_string(&input.partition).with_context(|| {
        format!(
            "Unable to read partition file '{}'",
            input.partition.display()
        )
    })?;
    let partition = PartitionParser::new()
        .parse_partition(&f)
        .with_context(|| format!("Failed to parse '{}'", input.partition.display()))?;

    info!(
        "Partition: inputs {:?}, outputs {:?}, {} cost dimensions",
        partition.alphabet.inputs(),
        partition.alphabet.outputs(),
        partition.costs.dimension()
    );

    let automata = parse_never_claims(&input.never_claims)?;
    Ok((partition, automata))
}

/// Read and parse never-claims, naming every automaton after the stem of its
/// file
pub(crate) fn parse_never_claims(files: &[PathBuf]) -> Result<Vec<CoBuchiAutomaton>, anyhow::Error> {
    let parser = NeverClaimParser::new();
    files
        .iter()
        .map(|file| {
            let name = file
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| anyhow!("Invalid file name '{}'", file.display()))?;
            let f = fs::read_to_string(file)
                .with_context(|| format!("Unable to read never claim '{}'", file.display()))?;
            let aut = parser
                .parse_automaton(name, &f)
                .with_context(|| format!("Failed to parse '{}'", file.display()))?;

            info!(
                "Parsed automaton '{name}' with {} states ({} accepting)",
                aut.states().len(),
                aut.n_accepting()
            );
            Ok(aut)
        })
        .collect()
}

/// Build the turn-based automaton of the specification and report its size
pub(crate) fn inspect(
    partition: Partition,
    automata: Vec<CoBuchiAutomaton>,
    player: Player,
) -> Result<(), anyhow::Error> {
    let weights = partition.costs.weights(&partition.alphabet)?;
    let tbucw = TurnBasedAutomatonBuilder::new(partition.alphabet, player)
        .with_weights(weights)?
        .with_automata(automata)?
        .build()?;

    info!(
        "Turn-based automaton '{}': {} states, {} accepting, {} turn states, {} complete, {} bounded",
        tbucw.name(),
        tbucw.len(),
        tbucw.n_accepting_states(),
        tbucw.n_turn_states(),
        tbucw.n_complete_states(),
        tbucw.n_bounded_states()
    );
    if tbucw.weights().dimension() > 0 {
        info!("Weights: {}", tbucw.weights());
    }
    Ok(())
}

/// Log the outcome of the synthesis procedure
pub(crate) fn display_result(outcome: &Outcome, report: &SolveReport) {
    match outcome {
        Outcome::Realizable { game, k, c } => {
            if c.is_empty() {
                info!("The specification is realizable for k = {k}.");
            } else {
                info!("The specification is realizable for k = {k} with credits c = {c:?}.");
            }
            info!(
                "Winning positions of the system: {}, of the environment: {}",
                game.positions_o().len(),
                game.positions_i().len()
            );
        }
        Outcome::Unrealizable { k } => {
            info!("The specification is unrealizable (environment strategy found for k = {k}).")
        }
        Outcome::BoundExhausted => {
            info!("Realizability could not be decided within the given bounds.")
        }
    }

    info!(
        "Solved {} safety games ({} fixpoint iterations, maximal antichain size {}, {} states removed) in {:.3}s",
        report.games_solved,
        report.fixpoint_iterations,
        report.max_antichain_size,
        report.removed_states,
        report.elapsed.as_secs_f64()
    );
}
