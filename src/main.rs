pub mod app;
pub mod camera;
pub mod config;
pub mod controller;
pub mod data;
pub mod engine;
pub mod popup;
pub mod render;
pub mod scene;
pub mod style;
pub mod types;

use anyhow::{anyhow, Result};
use app::App;
use camera::CameraPosition;
use clap::{Parser, Subcommand};
use config::AppConfig;
use engine::ScreenPoint;
use geo::{Coord, InteriorPoint};
use popup::MockStats;
use scene::HeadlessScene;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the loaded counties and their extents
    Inspect,
    /// Select the county at a coordinate and print its card
    Pick {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// Drive the map with pointer events read from stdin
    Session,
    /// Write a PNG snapshot of the map
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "map.png")]
        out: PathBuf,
        /// Select this county before rendering
        #[arg(long)]
        select: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_config = AppConfig::load_or_default(&cli.config)?;
    let mut app = open(&app_config).await;

    match &cli.command {
        Commands::Inspect => {
            println!("{} counties", app.county_count());
            for region in app.engine().regions() {
                let e = region.extent;
                println!(
                    "{:<20} {:<8} {:<16} [{:.4}, {:.4}, {:.4}, {:.4}]",
                    region.name(),
                    region.properties.shape_iso.as_deref().unwrap_or("-"),
                    region.id,
                    e.west,
                    e.south,
                    e.east,
                    e.north
                );
            }
        }
        Commands::Pick { lon, lat } => {
            let point = app.engine().geo_to_screen(Coord { x: *lon, y: *lat });
            match app.click(point) {
                Some(details) => println!("{details}"),
                None => println!("No county at ({lon}, {lat})"),
            }
        }
        Commands::Session => run_session(&mut app).await?,
        Commands::Render { out, select } => {
            if let Some(name) = select {
                let region = app
                    .engine()
                    .regions()
                    .iter()
                    .find(|r| r.name().eq_ignore_ascii_case(name))
                    .ok_or_else(|| anyhow!("No county named '{}'", name))?;
                let coord = region
                    .geometry
                    .interior_point()
                    .map(|p| p.0)
                    .ok_or_else(|| anyhow!("County '{}' has no interior", name))?;
                let point = app.engine().geo_to_screen(coord);
                app.click(point);
            }
            render::save_snapshot(app.engine(), out)?;
            println!("Snapshot written to {:?}", out);
        }
    }

    Ok(())
}

async fn open(config: &AppConfig) -> App<HeadlessScene> {
    let home = CameraPosition::from(config.view);
    let aspect = config.viewport.width.max(1) as f64 / config.viewport.height.max(1) as f64;
    let scene = HeadlessScene::new(config.viewport, home.visible_extent(aspect));
    App::start(scene, config, Box::new(MockStats::thread_local())).await
}

async fn run_session(app: &mut App<HeadlessScene>) -> Result<()> {
    println!("commands: move X Y | click X Y | close | status | snapshot PATH | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            ["move", x, y] => match parse_point(x, y) {
                Some(p) => app.pointer_move(p),
                None => println!("bad coordinates"),
            },
            ["click", x, y] => match parse_point(x, y) {
                Some(p) => match app.click(p) {
                    Some(details) => println!("{details}"),
                    None => println!("(no county)"),
                },
                None => println!("bad coordinates"),
            },
            ["close"] => app.close_popup(),
            ["status"] => {
                let c = app.controller();
                println!(
                    "hovered: {}  selected: {}  cursor: {:?}",
                    c.hovered().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    c.selected().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    app.engine().cursor()
                );
            }
            ["snapshot", path] => {
                if let Err(e) = render::save_snapshot(app.engine(), &PathBuf::from(path)) {
                    tracing::error!(error = ?e, "snapshot failed");
                }
            }
            ["quit"] | ["exit"] => break,
            _ => println!("unknown command: {line}"),
        }
    }

    Ok(())
}

fn parse_point(x: &str, y: &str) -> Option<ScreenPoint> {
    Some(ScreenPoint::new(x.parse().ok()?, y.parse().ok()?))
}
