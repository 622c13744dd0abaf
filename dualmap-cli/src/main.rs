//! DualMap demo CLI.
//!
//! Runs a scripted dual-map session over the simulated backends: theme
//! swaps under contention, view synchronization in both directions, a
//! marker drag, and the readiness probes, then prints what the module
//! reported outward. Useful for eyeballing the sync protocol with
//! `RUST_LOG=dualmap=debug`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dualmap::backend::sim::{SimRasterBackend, SimVectorBackend};
use dualmap::backend::{RasterBackend, VectorBackend};
use dualmap::{DualMap, MapConfig, PrimaryEvent, SecondaryEvent, Theme};

#[derive(Debug, Parser)]
#[command(name = "dualmap", about = "Scripted demo of the dual-map view synchronizer")]
struct Args {
    /// Log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log: String,

    /// Optional JSON file with an array of themes to cycle through.
    #[arg(long)]
    themes: Option<PathBuf>,
}

fn builtin_themes() -> Vec<Theme> {
    let noir = Theme {
        name: "noir".to_string(),
        bg: "#0b0b0f".to_string(),
        water: "#101722".to_string(),
        parks: "#0f1d14".to_string(),
        road_default: "#2a2a2e".to_string(),
        road_residential: "#33333a".to_string(),
        road_tertiary: "#3e3e46".to_string(),
        road_secondary: "#4a4a54".to_string(),
        road_primary: "#5c5c68".to_string(),
        road_motorway: "#787886".to_string(),
        text: Some("#e8e8f0".to_string()),
    };
    let sepia = Theme {
        name: "sepia".to_string(),
        bg: "#f4ecd8".to_string(),
        water: "#c9d6c2".to_string(),
        parks: "#d8e0c0".to_string(),
        road_default: "#d9cbb0".to_string(),
        road_residential: "#cfc0a2".to_string(),
        road_tertiary: "#c2b18f".to_string(),
        road_secondary: "#b39f79".to_string(),
        road_primary: "#9c8560".to_string(),
        road_motorway: "#80683f".to_string(),
        text: Some("#3f3424".to_string()),
    };
    vec![noir, sepia]
}

fn load_themes(path: &PathBuf) -> Vec<Theme> {
    match std::fs::read_to_string(path).map_err(|err| err.to_string()).and_then(|json| {
        serde_json::from_str::<Vec<Theme>>(&json).map_err(|err| err.to_string())
    }) {
        Ok(themes) if !themes.is_empty() => themes,
        Ok(_) => {
            eprintln!("{}: no themes in file, using built-ins", path.display());
            builtin_themes()
        }
        Err(err) => {
            eprintln!("{}: {}, using built-ins", path.display(), err);
            builtin_themes()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log)),
        )
        .init();

    let themes = match &args.themes {
        Some(path) => load_themes(path),
        None => builtin_themes(),
    };

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = DualMap::new(tx);
    let raster = SimRasterBackend::new();
    let vector = SimVectorBackend::new();

    controller.initialize(
        &MapConfig {
            center: (48.8566, 2.3522),
            zoom: 13.0,
            tile_url: "https://tiles/{z}/{x}/{y}.png".to_string(),
        },
        Arc::new(raster.clone()),
        Arc::new(vector.clone()),
    );
    info!(zoom = vector.zoom(), "secondary initialized one level below the primary");

    // Swap every theme before the first load completes; only the last wins
    for theme in &themes {
        controller.apply_theme(theme);
    }
    controller.handle_secondary_event(SecondaryEvent::StyleLoaded);
    controller.handle_secondary_event(SecondaryEvent::StyleLoaded);
    info!(
        theme = controller.current_theme_name().as_deref().unwrap_or("-"),
        applications = vector.styles().len() - 1,
        "style swaps settled"
    );

    // Pan the primary; the secondary follows at zoom - 1. The follow makes
    // the secondary settle too, and that echo is forwarded like any event.
    raster.set_view(51.5074, -0.1278, 15.0, true);
    controller.handle_primary_event(PrimaryEvent::MoveEnd);
    controller.handle_secondary_event(SecondaryEvent::MoveEnd);
    info!(center = ?vector.center(), zoom = vector.zoom(), "secondary followed the primary");

    // Pan the secondary back; the primary snaps at zoom + 1
    vector.jump_to(2.3522, 48.8566, 12.0);
    controller.handle_secondary_event(SecondaryEvent::MoveEnd);
    controller.handle_primary_event(PrimaryEvent::MoveEnd);
    info!(center = ?raster.center(), zoom = raster.zoom(), "primary snapped after the secondary");

    // Drag the marker on the secondary; the primary mirrors it
    controller.set_marker_visible(true);
    controller.handle_secondary_event(SecondaryEvent::MarkerDragEnd {
        lon: 2.2945,
        lat: 48.8584,
    });

    // Bounded waits against a renderer that never signals
    raster.set_tiles_loading(true);
    controller.wait_for_primary_idle(Duration::from_millis(50)).await;
    controller.wait_for_secondary_idle(Duration::from_millis(50)).await;
    info!("readiness probes returned within their timeouts");

    println!("state updates reported outward:");
    while let Ok(update) = rx.try_recv() {
        println!("  {update:?}");
    }
}
