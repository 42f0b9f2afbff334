//! Command handlers

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands, OutputFormat, Strategy};
use crate::output::{output_fleet, output_issues, output_plan, output_roster};
use crate::session::run_session;
use seatplan_app::config::Config;
use seatplan_app::export::export_to_excel;
use seatplan_app::grouping::{group_students, GroupingOptions};
use seatplan_domain::model::{Fleet, Student};
use seatplan_domain::service::Session;
use seatplan_infra::{load_plan, load_roster, save_plan, FleetLoader};
use seatplan_types::{Error, Result};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref model) = cli.model {
        config.model = model.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::Load { files } => cmd_load(&config, files, output_format),

        Commands::Group {
            files,
            strategy,
            batch_size,
            fleet,
            output,
            xlsx,
        } => cmd_group(
            &config,
            files,
            *strategy,
            *batch_size,
            fleet.as_deref(),
            output.clone(),
            xlsx.clone(),
            output_format,
        ),

        Commands::Export { plan, output } => cmd_export(&config, plan.clone(), output.clone()),

        Commands::Session { files, plan, fleet } => {
            cmd_session(&config, files, plan.as_deref(), fleet.as_deref())
        }

        Commands::Fleet { fleet } => cmd_fleet(fleet.as_deref(), output_format),

        Commands::Config {
            show,
            set_strategy,
            set_batch_size,
            set_model,
            set_endpoint,
            set_api_key_env,
            set_origin,
            set_destination,
            set_output,
            reset,
        } => cmd_config(
            *show,
            *set_strategy,
            *set_batch_size,
            set_model.clone(),
            set_endpoint.clone(),
            set_api_key_env.clone(),
            set_origin.clone(),
            set_destination.clone(),
            *set_output,
            *reset,
        ),
    }
}

fn resolve_fleet(path: Option<&Path>) -> Result<Fleet> {
    match path {
        Some(path) => FleetLoader::load_from_file(path),
        None => Ok(Fleet::standard()),
    }
}

/// Load the roster, report skipped rows and refuse an empty result
fn load_students(config: &Config, files: &[PathBuf]) -> Result<Vec<Student>> {
    let load = load_roster(files, &config.load_options());
    output_issues(&load.issues);

    if load.students.is_empty() {
        return Err(Error::Roster("no students loaded".to_string()));
    }
    tracing::info!(
        students = load.students.len(),
        files = files.len(),
        skipped = load.issues.len(),
        "roster loaded"
    );
    Ok(load.students)
}

fn cmd_load(config: &Config, files: &[PathBuf], output_format: OutputFormat) -> Result<()> {
    let students = load_students(config, files)?;
    output_roster(output_format, &students)
}

#[allow(clippy::too_many_arguments)]
fn cmd_group(
    config: &Config,
    files: &[PathBuf],
    strategy: Option<Strategy>,
    batch_size: Option<usize>,
    fleet_path: Option<&Path>,
    output: Option<PathBuf>,
    xlsx: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let fleet = resolve_fleet(fleet_path)?;
    let students = load_students(config, files)?;

    let options = GroupingOptions::from_config(config)
        .with_strategy(strategy)
        .with_batch_size(batch_size)
        .with_progress(output_format == OutputFormat::Table);

    let plan = group_students(&students, &fleet, config, &options)?;

    if let Some(path) = output {
        save_plan(&path, &plan)?;
        eprintln!("Plan saved to: {}", path.display());
    }
    if let Some(path) = xlsx {
        export_to_excel(&plan, config, &path)?;
        eprintln!("Exported to: {}", path.display());
    }

    output_plan(output_format, &plan)
}

fn cmd_export(config: &Config, plan_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let plan = load_plan(&plan_path)?;

    // Determine output path
    let output_path = output.unwrap_or_else(|| {
        let stem = plan_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("plan");
        plan_path.with_file_name(format!("{}.xlsx", stem))
    });

    export_to_excel(&plan, config, &output_path)?;

    println!("Exported to: {}", output_path.display());
    Ok(())
}

fn cmd_session(
    config: &Config,
    files: &[PathBuf],
    plan_path: Option<&Path>,
    fleet_path: Option<&Path>,
) -> Result<()> {
    let students = load_students(config, files)?;

    let mut session = match plan_path {
        Some(path) => Session::from_groups(load_plan(path)?.groups, students),
        None => Session::new(&resolve_fleet(fleet_path)?, students),
    };

    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout());
    run_session(&mut session, config, stdin.lock(), &mut out)
}

fn cmd_fleet(fleet_path: Option<&Path>, output_format: OutputFormat) -> Result<()> {
    let fleet = resolve_fleet(fleet_path)?;
    output_fleet(output_format, &fleet)
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    show: bool,
    set_strategy: Option<Strategy>,
    set_batch_size: Option<usize>,
    set_model: Option<String>,
    set_endpoint: Option<String>,
    set_api_key_env: Option<String>,
    set_origin: Option<String>,
    set_destination: Option<String>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(strategy) = set_strategy {
        config.strategy = strategy;
        modified = true;
    }

    if let Some(batch_size) = set_batch_size {
        config.batch_size = batch_size;
        modified = true;
    }

    if let Some(model) = set_model {
        config.model = model;
        modified = true;
    }

    if let Some(endpoint) = set_endpoint {
        config.llm_endpoint = endpoint;
        modified = true;
    }

    if let Some(var) = set_api_key_env {
        config.api_key_env = var;
        modified = true;
    }

    if let Some(origin) = set_origin {
        config.default_route.origin = origin;
        modified = true;
    }

    if let Some(destination) = set_destination {
        config.default_route.destination = destination;
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration saved");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
