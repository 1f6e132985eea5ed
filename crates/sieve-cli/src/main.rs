use std::path::PathBuf;

use clap::Parser;
use cli::{Args, Commands};
use logging::setup_logging;
use operators::list_operators;
use query::{run_query, QueryOptions};
use sieve_config::{
    config::{self, generate_default_config, get_config, CONFIG_PATH},
    error::ConfigError,
};
use sieve_core::FilterResult;
use tracing::{debug, info};
use utils::disable_color;

mod cli;
mod logging;
mod operators;
mod query;
mod utils;

fn set_config_path(path: &str) -> FilterResult<()> {
    let path = std::path::absolute(PathBuf::from(path)).map_err(ConfigError::IoError)?;
    debug!("using config file {}", path.display());
    if let Ok(mut config_path) = CONFIG_PATH.write() {
        *config_path = path;
    }
    Ok(())
}

/// `defconfig` writes the file, so it must not require one to exist.
fn loads_config(command: &Commands) -> bool {
    !matches!(command, Commands::DefConfig)
}

fn handle_cli() -> FilterResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        disable_color();
    }

    if let Some(ref c) = args.config {
        set_config_path(c)?;
    }

    if loads_config(&args.command) {
        config::init()?;
    }

    match args.command {
        Commands::DefConfig => {
            generate_default_config()?;
        }
        Commands::Config => {
            let config = get_config();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                info!("{}", config.to_annotated_document()?);
            }
        }
        Commands::Operators => list_operators(args.json)?,
        Commands::Query {
            table,
            request,
            filters,
            custom_order,
            db,
            limit,
            offset,
        } => {
            let options = QueryOptions {
                table,
                request,
                filters,
                custom_order,
                db,
                limit,
                offset,
            };
            run_query(options, args.json)?;
        }
    }

    Ok(())
}

fn main() {
    // Install miette's fancy error handler for beautiful error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defconfig_skips_config_load() {
        let args = Args::parse_from(["sieve", "defconfig"]);
        assert!(!loads_config(&args.command));

        for argv in [
            vec!["sieve", "config"],
            vec!["sieve", "operators"],
            vec!["sieve", "query", "users", "name=foo", "-f", "name=like"],
        ] {
            let args = Args::parse_from(argv);
            assert!(loads_config(&args.command));
        }
    }
}
