//! Scripted run through one feature flow, printing every screen visited.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cosmicface_core::AssetRegistry;
use cosmicface_flow::{AppShell, Feature, GestureCarousel, NavEvent, OrbitalSelector, Route, Screen};

use crate::analyze::load_photos;
use crate::backends::{self, Orchestrator};
use crate::config::load_config;

const FACIAL_FEATURES: [&str; 5] = ["eyes", "nose", "mouth", "brow", "jawline"];
const LIFE_STAGES: [&str; 3] = ["early life", "middle life", "late life"];
const ORBIT_RADIUS: f64 = 120.0;
const TRACK_WIDTH: f64 = 320.0;

pub async fn run_walkthrough(feature: &str, photos: &[PathBuf]) -> Result<()> {
    let feature: Feature = feature.parse().map_err(anyhow::Error::msg)?;
    if photos.len() != feature.slots().len() {
        bail!(
            "{feature} needs {} photo(s), got {}",
            feature.slots().len(),
            photos.len()
        );
    }

    let config = load_config()?;
    let snap = Duration::from_millis(config.carousel.snap_duration_ms);
    let orchestrator = backends::orchestrator(&config, None)?;
    let registry = AssetRegistry::new();
    let assets = load_photos(&registry, photos)?;

    let mut app = AppShell::new();
    let flow = app.open(feature);
    print_screen(flow.screen());

    if flow.screen() != Screen::Upload {
        print_screen(app.advance(NavEvent::Begin)?);
    }
    for (slot, asset) in feature.slots().iter().zip(assets) {
        app.advance(NavEvent::SelectPhoto { slot: *slot, asset })?;
        println!("  selected {slot:?} photo");
    }

    print_screen(app.advance(NavEvent::Submit)?);
    let screen = submit(&mut app, &orchestrator).await?;
    print_screen(screen);

    for event in tour(feature) {
        let screen = app.advance(event)?;
        print_screen(screen);
        explore(screen, snap);
    }

    orchestrator.flush_saves().await;

    while app.route() != Route::Home {
        match app.go_back() {
            Route::Home => println!("<- home (app)"),
            _ => {
                if let Some(flow) = app.flow() {
                    println!("<- {}", flow.screen());
                }
            }
        }
    }
    Ok(())
}

async fn submit(app: &mut AppShell, orchestrator: &Orchestrator) -> Result<Screen> {
    let flow = app.flow().context("no open flow")?;
    let ticket = flow
        .pending_ticket()
        .context("flow is not waiting for an analysis")?;
    let analysis = orchestrator
        .analyze(
            flow.feature().analysis_kind(),
            &flow.state().photos(),
            flow.session_id(),
        )
        .await?;
    println!("  analysis source: {}", analysis.source);
    Ok(app.advance(NavEvent::completed(ticket, analysis.result))?)
}

/// Forward steps taken after results arrive.
fn tour(feature: Feature) -> Vec<NavEvent> {
    match feature {
        Feature::DailyInsight => vec![NavEvent::Finish],
        Feature::LifeMap => vec![
            NavEvent::ViewFacialDetails,
            NavEvent::ViewTimeline,
            NavEvent::GenerateAnimation,
        ],
        Feature::Compatibility => vec![NavEvent::GenerateAnimation],
    }
}

fn explore(screen: Screen, snap: Duration) {
    match screen {
        Screen::FacialDetails => {
            let mut orbit = OrbitalSelector::new(
                FACIAL_FEATURES.len(),
                ORBIT_RADIUS,
                (ORBIT_RADIUS, ORBIT_RADIUS),
            )
            .with_snap_duration(snap);
            orbit.select(FACIAL_FEATURES.len() / 2);
            let active = orbit.active_index();
            let (x, y) = orbit.node_position(active);
            println!(
                "  orbit: {} at ({x:.1}, {y:.1}), ring rotated {:.1} deg",
                FACIAL_FEATURES[active],
                orbit.rotation_degrees()
            );
        }
        Screen::Timeline => {
            let mut carousel = GestureCarousel::new(LIFE_STAGES.len()).with_snap_duration(snap);
            carousel.pointer_down(TRACK_WIDTH, TRACK_WIDTH);
            carousel.pointer_move(TRACK_WIDTH * 0.4);
            let index = carousel.pointer_up();
            println!(
                "  timeline: swiped to {} (stage {} of {}, {:.0}%)",
                LIFE_STAGES[index],
                index + 1,
                carousel.item_count(),
                carousel.progress_percent()
            );
        }
        _ => {}
    }
}

fn print_screen(screen: Screen) {
    println!("-> {screen}");
}
