//! Acacia Command Line Interface
//!
//! This crate contains the Acacia CLI that checks the realizability of LTL
//! specifications given as never-claims (of the negated specification units)
//! and a partition of the signals into inputs and outputs. Consult the output
//! of `acacia --help` for all available options.

use ::config::Config;

use clap::Parser;
use human_panic::setup_panic;
use log::{debug, info};

use acacia_synthesis::{CompositionEngine, SynthesisProblem};

use crate::cli::{
    Cli, display_result, initialize_logger, inspect, parse_group_order, parse_never_claims,
    parse_specification,
};

mod acacia_config;
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_panic!();

    // parse the cli arguments
    let cli = Cli::parse();
    initialize_logger(cli.log_config)?;
    info!("Welcome to Acacia!");
    match cli.command {
        cli::Commands::Check {
            input,
            negated,
            config_file,
            player,
            method,
            direction,
            tocheck,
            k_start,
            k_bound,
            k_step,
            no_critical,
            no_opt1,
            no_opt2,
            group_order,
        } => {
            let (partition, automata) = parse_specification(&input)?;
            let negated = parse_never_claims(&negated)?;

            // Check whether a configuration file was supplied
            let mut settings = Config::builder();
            if let Some(config_file) = config_file {
                if !config_file.exists() {
                    return Err(anyhow::anyhow!(
                        "Specified configuration file '{}' does not exist.",
                        config_file.display()
                    )
                    .into());
                }

                settings = settings.add_source(config::File::from(config_file));
            }

            // Parse configuration from environment variables
            settings = settings.add_source(config::Environment::with_prefix("ACACIA"));
            let mut config = settings
                .build()?
                .try_deserialize::<acacia_config::AcaciaConfig>()?;

            // Options given on the command line
            if let Some(player) = player {
                config.set_starting_player(player.into());
            }
            if let Some(method) = method {
                config.set_method(method.into());
            }
            if let Some(direction) = direction {
                config.set_direction(direction.into());
            }
            if let Some(tocheck) = tocheck {
                config.set_to_check(tocheck.into());
            }
            config.set_k_range(k_start, k_bound, k_step);
            if no_critical {
                config.disable_critical();
            }
            if no_opt1 {
                config.disable_opt1();
            }
            if no_opt2 {
                config.disable_opt2();
            }
            if let Some(order) = group_order {
                config.set_group_order(parse_group_order(&order));
            }

            let config = config.synthesis_config();
            debug!("Synthesis configuration: {config:?}");

            let problem = SynthesisProblem::new(partition.alphabet, automata)
                .with_costs(partition.costs)?
                .with_negated(negated);

            let mut engine = CompositionEngine::new(config)?;
            let outcome = engine.synthesize(&problem)?;

            display_result(&outcome, engine.report());
        }
        cli::Commands::Inspect { input, player } => {
            let (partition, automata) = parse_specification(&input)?;
            inspect(partition, automata, player.into())?;
        }
    }

    Ok(())
}
