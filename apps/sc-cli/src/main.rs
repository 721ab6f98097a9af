use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sc_carve::{CarveError, CarveOptions, CarveOutcome, SplitMode, carve, split_basins, trunk_path};
use sc_lp::SolverOptions;
use sc_network::{NetError, StreamNet};

#[derive(Parser)]
#[command(name = "sc-cli")]
#[command(about = "StreamCarve CLI - quantile carving of stream elevation profiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate network file structure and topology
    Validate {
        /// Path to the network JSON file
        network_path: PathBuf,
    },
    /// Summarize the basins of a network
    Info {
        /// Path to the network JSON file
        network_path: PathBuf,
    },
    /// Fit a quantile elevation profile along the network
    Carve {
        /// Path to the network JSON file
        network_path: PathBuf,
        /// Target quantile in (0, 1)
        #[arg(long, default_value_t = 0.5)]
        tau: f64,
        /// Minimum downward gradient per unit channel distance
        #[arg(long, default_value_t = 0.0)]
        min_gradient: f64,
        /// Decomposition level
        #[arg(long, value_enum, default_value = "basins")]
        split: SplitArg,
        /// Output JSON file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Let the LP backend print iteration progress
        #[arg(long)]
        solver_verbose: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SplitArg {
    /// Split into basins, then trunk/tributaries per basin
    Basins,
    /// Split a single basin into trunk and tributaries
    Trunk,
    /// Solve the whole network as one problem
    None,
}

impl From<SplitArg> for SplitMode {
    fn from(arg: SplitArg) -> Self {
        match arg {
            SplitArg::Basins => SplitMode::Basins,
            SplitArg::Trunk => SplitMode::TrunkTributaries,
            SplitArg::None => SplitMode::None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("Carve error: {0}")]
    Carve(#[from] CarveError),
}

type AppResult<T> = Result<T, AppError>;

/// On-disk network description: receiver index per node (`null` marks an
/// outlet), distance from the outlet, and the elevation sample.
#[derive(Deserialize)]
struct NetworkFile {
    receivers: Vec<Option<usize>>,
    distance: Vec<f64>,
    elevation: Vec<f64>,
}

#[derive(Serialize)]
struct CarveOutput {
    /// Fitted elevation per node; `null` where a sub-network solve failed.
    fitted: Vec<Option<f64>>,
    reports: Vec<ReportOut>,
}

#[derive(Serialize)]
struct ReportOut {
    task: usize,
    label: String,
    nodes: usize,
    status: String,
    iterations: u32,
    objective: Option<f64>,
    solve_time_ms: f64,
    detail: Option<String>,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { network_path } => cmd_validate(&network_path),
        Commands::Info { network_path } => cmd_info(&network_path),
        Commands::Carve {
            network_path,
            tau,
            min_gradient,
            split,
            output,
            solver_verbose,
        } => cmd_carve(
            &network_path,
            tau,
            min_gradient,
            split,
            output.as_deref(),
            solver_verbose,
        ),
    }
}

fn load_network(path: &Path) -> AppResult<(StreamNet, Vec<f64>)> {
    let text = fs::read_to_string(path)?;
    let file: NetworkFile = serde_json::from_str(&text)?;
    let net = StreamNet::from_receivers(&file.receivers, &file.distance)?;
    Ok((net, file.elevation))
}

fn cmd_validate(path: &Path) -> AppResult<()> {
    let (net, elevation) = load_network(path)?;
    println!("network OK: {} nodes, {} edges, {} outlets", net.len(), net.edge_count(), net.outlets().len());
    if elevation.len() != net.len() {
        println!(
            "warning: elevation length {} does not match node count {}",
            elevation.len(),
            net.len()
        );
    }
    Ok(())
}

fn cmd_info(path: &Path) -> AppResult<()> {
    let (net, _) = load_network(path)?;
    let basins = split_basins(&net)?;
    println!("{} nodes, {} basins", net.len(), basins.len());
    for (i, basin) in basins.iter().enumerate() {
        let trunk = trunk_path(basin.net());
        let outlet = basin.net().outlets()[0];
        println!(
            "basin {i}: {} nodes, outlet at node {}, trunk of {} nodes",
            basin.len(),
            basin.parent_of(outlet),
            trunk.len()
        );
    }
    Ok(())
}

fn cmd_carve(
    path: &Path,
    tau: f64,
    min_gradient: f64,
    split: SplitArg,
    output: Option<&Path>,
    solver_verbose: bool,
) -> AppResult<()> {
    let (net, elevation) = load_network(path)?;
    let opts = CarveOptions {
        tau,
        min_gradient,
        split: split.into(),
        solver: SolverOptions {
            verbose: solver_verbose,
            ..Default::default()
        },
    };

    let outcome = carve(&net, &elevation, &opts)?;
    let failed = outcome.reports.iter().filter(|r| !r.is_success()).count();
    eprintln!(
        "carved {} nodes in {} sub-networks ({} failed)",
        net.len(),
        outcome.reports.len(),
        failed
    );

    let out = render_output(&outcome);
    let json = serde_json::to_string_pretty(&out)?;
    match output {
        Some(p) => fs::write(p, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn render_output(outcome: &CarveOutcome) -> CarveOutput {
    CarveOutput {
        fitted: outcome
            .fitted
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect(),
        reports: outcome
            .reports
            .iter()
            .map(|r| ReportOut {
                task: r.task,
                label: r.label.clone(),
                nodes: r.nodes,
                status: r.status.to_string(),
                iterations: r.iterations,
                objective: r.objective.is_finite().then_some(r.objective),
                solve_time_ms: r.solve_time.as_secs_f64() * 1e3,
                detail: r.detail.clone(),
            })
            .collect(),
    }
}
