//! Grid building - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grid_core::debug_overlay::DebugOverlay;
use grid_core::grid::GridCoord;
use grid_tools::scenario::{query_path, Scenario};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "grid-tools")]
#[command(about = "Development tools for the building grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate footprint template files
    Validate {
        /// Template file or directory of template files
        #[arg(default_value = "assets/data/footprints")]
        path: PathBuf,
    },
    /// Find a path on a scenario grid
    Path {
        /// Scenario RON file
        scenario: PathBuf,
        /// Start cell as `x,z` (defaults to the scenario's query)
        #[arg(long, value_parser = parse_coord)]
        from: Option<GridCoord>,
        /// Goal cell as `x,z` (defaults to the scenario's query)
        #[arg(long, value_parser = parse_coord)]
        to: Option<GridCoord>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a scenario grid as ASCII
    Render {
        /// Scenario RON file
        scenario: PathBuf,
        /// Overlay the scenario's path query
        #[arg(long)]
        with_path: bool,
    },
}

fn parse_coord(s: &str) -> Result<GridCoord, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,z but got '{s}'"))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("bad x: {e}"))?;
    let z = z.trim().parse::<i32>().map_err(|e| format!("bad z: {e}"))?;
    Ok(GridCoord::new(x, z))
}

fn fail(message: impl std::fmt::Display) -> ! {
    tracing::error!("{message}");
    std::process::exit(1);
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => run_validate(&path),
        Commands::Path {
            scenario,
            from,
            to,
            json,
        } => run_path(&scenario, from, to, json),
        Commands::Render {
            scenario,
            with_path,
        } => run_render(&scenario, with_path),
    }
}

fn run_validate(path: &std::path::Path) {
    tracing::info!("Validating footprint data in: {}", path.display());
    if path.is_file() {
        match grid_tools::validate::validate_template_file(path) {
            Ok(registry) => tracing::info!("Validation passed: {} templates", registry.len()),
            Err(e) => fail(format!("Validation failed: {e}")),
        }
        return;
    }

    match grid_tools::validate::validate_data_directory(path) {
        Ok(report) if report.is_ok() => tracing::info!(
            "Validation passed: {} files, {} templates",
            report.passed.len(),
            report.template_count()
        ),
        Ok(report) => {
            for (file, reason) in &report.failed {
                tracing::error!("{}: {reason}", file.display());
            }
            fail(format!("Validation failed: {} files invalid", report.failed.len()));
        }
        Err(e) => fail(format!("Validation failed: {e}")),
    }
}

fn run_path(scenario: &std::path::Path, from: Option<GridCoord>, to: Option<GridCoord>, json: bool) {
    let scenario = Scenario::load(scenario).unwrap_or_else(|e| fail(e));
    let default = scenario.path.map(|(a, b)| (GridCoord::from(a), GridCoord::from(b)));
    let (Some(from), Some(to)) = (
        from.or(default.map(|(a, _)| a)),
        to.or(default.map(|(_, b)| b)),
    ) else {
        fail("No path query: pass --from and --to or set `path` in the scenario");
    };

    let mut system = scenario.build().unwrap_or_else(|e| fail(e));
    let report = query_path(&mut system, from, to).unwrap_or_else(|e| fail(e));

    if json {
        println!("{}", report.to_json().unwrap_or_else(|e| fail(e)));
    } else {
        println!("{}", report.to_text());
    }
}

fn run_render(scenario: &std::path::Path, with_path: bool) {
    let scenario = Scenario::load(scenario).unwrap_or_else(|e| fail(e));
    let mut system = scenario.build().unwrap_or_else(|e| fail(e));

    let cells = match scenario.path {
        Some((from, to)) if with_path => query_path(&mut system, from.into(), to.into())
            .map(|report| report.cells)
            .unwrap_or_else(|e| fail(e)),
        _ => Vec::new(),
    };

    print!("{}", DebugOverlay::render(system.grid(), Some(&cells)));
}
