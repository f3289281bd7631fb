mod logging;

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use facture_core::{FactureError, Group, ReferenceRegistry};
use facture_generate::output::dump_json;
use facture_generate::{EngineOptions, FactureEngine};
use facture_plan::{PlanError, config_json_schema, load_config_dir};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::logging::init_logging;

#[derive(Error)]
enum CliError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Facture(#[from] FactureError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

// `main` reports errors through `Debug`; show the message itself.
impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputType {
    Json,
    Sql,
}

#[derive(Parser, Debug)]
#[command(
    name = "facture",
    version,
    about = "Generate fixture rows from a terse config and inject them into marked file sections"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,
    /// Directory holding facture.toml (or facture.json). Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    conf_dir: Option<PathBuf>,
    /// Print the generated data set to stdout.
    #[arg(long, value_enum)]
    output_type: Option<OutputType>,
    /// Do not write into target files.
    #[arg(long, default_value_t = false)]
    skip_targets: bool,
    /// Accept group names without the facture_group_ prefix.
    #[arg(long, default_value_t = false)]
    flexible_group_names: bool,
    /// Print the configuration JSON Schema and exit.
    #[arg(long, default_value_t = false)]
    emit_config_schema: bool,
    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    if cli.emit_config_schema {
        println!("{}", serde_json::to_string_pretty(&config_json_schema())?);
        return Ok(());
    }

    run(cli)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let conf_dir = match cli.conf_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    debug!(conf_dir = %conf_dir.display(), "setting up data");
    let registry = ReferenceRegistry::new();
    let loaded = load_config_dir(&conf_dir, &registry)?;
    for issue in &loaded.warnings {
        warn!(code = %issue.code, path = %issue.path, "{}", issue.message);
    }
    info!(config = %loaded.path.display(), "configuration loaded");

    let config = loaded.config;
    let inputs = config.to_group_inputs(&registry)?;
    let engine = FactureEngine::new(EngineOptions {
        flexible_group_names: cli.flexible_group_names,
        render_sql: matches!(cli.output_type, Some(OutputType::Sql)) || !cli.skip_targets,
        ..EngineOptions::default()
    });
    let result = engine.run(inputs, &config.tables, &config.targets)?;

    match cli.output_type {
        Some(OutputType::Json) => println!("{}", dump_json(&result.groups)?),
        Some(OutputType::Sql) => print_sql(&result.groups),
        None => {}
    }

    if cli.skip_targets {
        debug!("skipping exporting to targets because of --skip-targets");
        return Ok(());
    }

    let report = engine.inject(&result, &config.targets)?;
    for file in &report.files {
        for target in &file.targets {
            info!(
                file = %file.filename.display(),
                target = %target.name,
                rows = target.rows,
                "target written"
            );
        }
    }

    Ok(())
}

fn print_sql(groups: &[Group]) {
    let blocks: Vec<&str> = groups
        .iter()
        .flat_map(|group| group.data.iter())
        .filter_map(|row| row.output_sql.as_deref())
        .collect();
    println!("{}", blocks.join("\n\n"));
}
