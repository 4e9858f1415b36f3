use clap::{Parser, Subcommand};
use iso_app::{
    AppResult, StageEvent, StageRequest, SystemRunner, build_forcing_file, load_config,
    process_geometry_file, run_initial_state, run_simulation, run_ssh_adjustment, run_test,
};
use iso_results::{StageManifest, StageSummary};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "isomip")]
#[command(about = "ISOMIP+ Ocean0 preparation: geometry, SSH adjustment, forcing and runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the test-case YAML file
    #[arg(short, long, global = true, default_value = "ocean0.yaml")]
    config: PathBuf,

    /// Work directory holding the model's files
    #[arg(short, long, global = true, default_value = ".")]
    work_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Validate,
    /// Crop, calve and smooth the input geometry
    ProcessGeometry,
    /// Build the initial state: geometry, mesh, partition, model, cull
    InitialState,
    /// Iteratively adjust SSH or land-ice pressure
    AdjustSsh,
    /// Build land_ice_forcing.nc from init.nc, replacing any existing file
    BuildForcing,
    /// Run the production simulation
    Simulate,
    /// Short test run with the test core count
    TestRun,
    /// List recorded stages and the adjustment history
    Status,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let request = StageRequest::new(&cli.config, &cli.work_dir);
    let mut runner = SystemRunner;

    match cli.command {
        Commands::Validate => cmd_validate(&cli.config),
        Commands::ProcessGeometry => cmd_process_geometry(&request),
        Commands::InitialState => {
            let manifest = run_initial_state(&request, &mut runner, Some(&mut render_progress))?;
            print_manifest(&manifest);
            Ok(())
        }
        Commands::AdjustSsh => {
            let manifest = run_ssh_adjustment(&request, &mut runner, Some(&mut render_progress))?;
            print_manifest(&manifest);
            Ok(())
        }
        Commands::BuildForcing => cmd_build_forcing(&request),
        Commands::Simulate => {
            let manifest = run_simulation(&request, &mut runner, Some(&mut render_progress))?;
            print_manifest(&manifest);
            Ok(())
        }
        Commands::TestRun => {
            let manifest = run_test(&request, &mut runner, Some(&mut render_progress))?;
            print_manifest(&manifest);
            Ok(())
        }
        Commands::Status => cmd_status(&cli.work_dir),
    }
}

fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    // a subscriber may already be installed when embedded
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = load_config(config_path)?;
    println!("✓ Configuration is valid");
    println!(
        "  SSH adjustment: {} iterations of {}",
        config.ssh_adjustment.iteration_count, config.ssh_adjustment.variable_to_modify
    );
    println!("  Forcing years: {}", config.forcing.scaling.len());
    if !iso_app::netcdf_enabled() {
        println!("  note: built without NetCDF support; file stages will fail");
    }
    Ok(())
}

fn cmd_process_geometry(request: &StageRequest) -> AppResult<()> {
    let summary = process_geometry_file(request)?;
    println!("✓ Geometry processed");
    print_summary(&summary);
    Ok(())
}

fn cmd_build_forcing(request: &StageRequest) -> AppResult<()> {
    let summary = build_forcing_file(request)?;
    println!("✓ Forcing written");
    print_summary(&summary);
    Ok(())
}

fn cmd_status(work_dir: &Path) -> AppResult<()> {
    let status = iso_app::status(work_dir)?;
    if status.stages.is_empty() {
        println!("No stages recorded in {}", status.ledger_dir.display());
    } else {
        println!("Stages ({}):", status.ledger_dir.display());
        for m in &status.stages {
            println!("  {:<16} {}  config={}", m.stage, m.timestamp, short_hash(&m.config_hash));
        }
    }
    if !status.iterations.is_empty() {
        println!("\nSSH adjustment:");
        for r in &status.iterations {
            match &r.max_delta {
                Some(d) => println!("  {:>3}  {}", r.iteration, d),
                None => println!("  {:>3}  (no land-ice cell)", r.iteration),
            }
        }
    }
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

fn render_progress(event: StageEvent) {
    let mut line = format!(
        "[{}] {}  elapsed={:.1}s",
        event.stage,
        event.step.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    println!("{line}");
}

fn print_manifest(manifest: &StageManifest) {
    println!("✓ Stage {} completed", manifest.stage);
    if !manifest.artifacts.is_empty() {
        println!("  Artifacts: {}", manifest.artifacts.join(", "));
    }
    if let Some(summary) = &manifest.summary {
        print_summary(summary);
    }
}

fn print_summary(summary: &StageSummary) {
    match summary {
        StageSummary::Geometry {
            nx,
            ny,
            calved_cells,
        } => println!("  Grid: {nx} x {ny}, calved cells: {calved_cells}"),
        StageSummary::SshAdjustment {
            iterations,
            mode,
            final_max_delta_ssh,
        } => {
            println!("  Iterations: {iterations} ({mode})");
            if let Some(d) = final_max_delta_ssh {
                println!("  Final max |deltaSSH|: {d:.6e} m");
            }
        }
        StageSummary::Forcing { n_time, n_cells } => {
            println!("  Forcing: {n_time} times x {n_cells} cells")
        }
    }
}
