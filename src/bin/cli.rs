//! platescan CLI: plan, inspect and run plate scans.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use platescan::camera::CameraService;
use platescan::commands;
use platescan::overlay::{draw_cross_hairs, parse_hex_color, render_crosshair, CrosshairStyle};
use platescan::path_table;
use platescan::planner::{parse_z_override, path_length};
use platescan::printer::PrinterService;
use platescan::{PlatescanConfig, ScanRunner, ScanSettings, StopFlag, Waypoint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "platescan-cli")]
#[command(about = "Snake-path plate scanning with a camera on a serial XYZ stage")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./platescan.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the scan path and print or save the waypoint table.
    Plan {
        #[command(flatten)]
        grid: GridArgs,

        /// Write the table here instead of printing it.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print waypoints as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the motion commands for the planned path.
    Gcode {
        #[command(flatten)]
        grid: GridArgs,

        /// Feed rate in mm/min appended to every move.
        #[arg(long)]
        feed_rate: Option<u32>,
    },

    /// Render the alignment crosshair to a PNG.
    Overlay(OverlayArgs),

    /// Home the printer, then move and capture at every waypoint.
    Run(RunArgs),

    /// Write a default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Args)]
struct GridArgs {
    /// Grid rows (overrides config).
    #[arg(long, allow_negative_numbers = true)]
    rows: Option<i64>,

    /// Grid columns (overrides config).
    #[arg(long, allow_negative_numbers = true)]
    cols: Option<i64>,

    /// Fixed Z for every waypoint; "none" interpolates from the corners.
    #[arg(long, allow_negative_numbers = true)]
    z: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct OverlayArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Draw the centre lines onto this still instead of rendering an overlay.
    #[arg(long)]
    on: Option<PathBuf>,

    #[arg(long)]
    radius: Option<u32>,

    #[arg(long)]
    thickness: Option<u32>,

    /// Colour as #rrggbb.
    #[arg(long)]
    color: Option<String>,

    #[arg(long)]
    alpha: Option<u8>,
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    #[command(flatten)]
    grid: GridArgs,

    /// Serial device (overrides config).
    #[arg(long)]
    device: Option<PathBuf>,

    /// Skip homing before the scan.
    #[arg(long)]
    no_home: bool,

    /// Use the built-in mock camera instead of real hardware.
    #[arg(long)]
    mock_camera: bool,

    /// Print the scan report as JSON.
    #[arg(long)]
    json: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<PlatescanConfig> {
    let config = match path {
        Some(p) => PlatescanConfig::load_from_file(p)
            .with_context(|| format!("loading configuration from {}", p.display()))?,
        None => PlatescanConfig::load_or_default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn plan_from(config: &PlatescanConfig, grid: &GridArgs) -> Result<Vec<Waypoint>> {
    let rows = grid.rows.unwrap_or(config.scan.rows as i64);
    let cols = grid.cols.unwrap_or(config.scan.cols as i64);
    let z_override = match &grid.z {
        Some(raw) => parse_z_override(raw)?,
        None => config.scan.z_override,
    };
    Ok(commands::plan::plan_path(config.scan.corners, rows, cols, z_override).await?)
}

#[cfg(feature = "native-camera")]
fn open_camera(config: &PlatescanConfig, mock: bool) -> Result<CameraService> {
    if mock {
        return Ok(CameraService::new(platescan::testing::MockCameraBackend::new()));
    }
    let backend = platescan::camera::native::NokhwaBackend::open(
        config.camera.device_index,
        config.camera.rotation,
        config.camera.preview_resolution,
    )?;
    Ok(CameraService::new(backend))
}

#[cfg(not(feature = "native-camera"))]
fn open_camera(_config: &PlatescanConfig, mock: bool) -> Result<CameraService> {
    if mock {
        return Ok(CameraService::new(platescan::testing::MockCameraBackend::new()));
    }
    bail!("built without the native-camera feature; pass --mock-camera or rebuild with --features native-camera")
}

async fn cmd_plan(config: &PlatescanConfig, grid: &GridArgs, out: Option<PathBuf>, json: bool) -> Result<()> {
    let waypoints = plan_from(config, grid).await?;
    if let Some(path) = out {
        path_table::save_waypoints(&path, &waypoints)?;
        println!(
            "Wrote {} waypoints to {} ({:.2} travel)",
            waypoints.len(),
            path.display(),
            path_length(&waypoints)
        );
    } else if json {
        println!("{}", serde_json::to_string_pretty(&waypoints)?);
    } else {
        print!("{}", path_table::to_table_string(&waypoints));
    }
    Ok(())
}

async fn cmd_gcode(config: &PlatescanConfig, grid: &GridArgs, feed_rate: Option<u32>) -> Result<()> {
    let waypoints = plan_from(config, grid).await?;
    let feed_rate = feed_rate.or(config.printer.feed_rate);
    for line in commands::plan::plan_gcode(waypoints, feed_rate).await? {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_overlay(config: &PlatescanConfig, args: &OverlayArgs) -> Result<()> {
    let mut style: CrosshairStyle = config.overlay;
    if let Some(radius) = args.radius {
        style.radius = radius;
    }
    if let Some(thickness) = args.thickness {
        style.thickness = thickness;
    }
    if let Some(color) = &args.color {
        style.color = parse_hex_color(color)?;
    }
    if let Some(alpha) = args.alpha {
        style.alpha = alpha;
    }
    style.validate()?;

    if let Some(still) = &args.on {
        let frame = image::open(still)
            .with_context(|| format!("reading {}", still.display()))?
            .to_rgb8();
        draw_cross_hairs(&frame, &style)
            .save(&args.out)
            .with_context(|| format!("writing {}", args.out.display()))?;
        println!("Marked centre of {} into {}", still.display(), args.out.display());
        return Ok(());
    }

    let overlay = render_crosshair(&style, config.camera.preview_window);
    overlay
        .image
        .save(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    let (w, h) = overlay.padded_size();
    println!("Wrote {}x{} crosshair to {}", w, h, args.out.display());
    Ok(())
}

async fn cmd_run(mut config: PlatescanConfig, args: RunArgs) -> Result<()> {
    if let Some(device) = &args.device {
        config.printer.device_path = device.display().to_string();
    }
    let waypoints = plan_from(&config, &args.grid).await?;

    let stop = StopFlag::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        log::warn!("Stop requested, finishing current step");
        handler_stop.stop();
    })
    .context("installing Ctrl-C handler")?;

    let camera = open_camera(&config, args.mock_camera)?;
    camera.set_rotation(config.camera.rotation)?;
    let printer = PrinterService::open(&config.printer)?;
    let runner = ScanRunner::new(printer, camera, ScanSettings::from_config(&config), stop);

    let table = config.storage.path_file();
    path_table::save_waypoints(&table, &waypoints)?;
    log::info!("Waypoint table written to {}", table.display());

    let (report, runner) = commands::scan::run_scan(
        runner,
        waypoints,
        Some(config.storage.capture_log_file()),
        !args.no_home,
    )
    .await?;
    runner.into_printer().close()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Visited {}/{} waypoints, {} captures{}",
            report.visited,
            report.planned,
            report.captures.len(),
            if report.cancelled { " (stopped)" } else { "" }
        );
    }
    Ok(())
}

fn cmd_init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(PlatescanConfig::default_path);
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    PlatescanConfig::default().save_to_file(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    platescan::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { force } => cmd_init_config(cli.config, force),
        Commands::Plan { grid, out, json } => {
            let config = load_config(cli.config.as_ref())?;
            cmd_plan(&config, &grid, out, json).await
        }
        Commands::Gcode { grid, feed_rate } => {
            let config = load_config(cli.config.as_ref())?;
            cmd_gcode(&config, &grid, feed_rate).await
        }
        Commands::Overlay(args) => {
            let config = load_config(cli.config.as_ref())?;
            cmd_overlay(&config, &args)
        }
        Commands::Run(args) => {
            let config = load_config(cli.config.as_ref())?;
            cmd_run(config, args).await
        }
    }
}
