use std::time::Duration;

use clap::{Parser, Subcommand};
use client::{ClientConfig, HttpEventsApi, MapLoader};
use store::{CameraRig, MapStore};
use tools::{diff_rosters, marker_rows, render_report};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect the participant map of a workshop event")]
struct Args {
    /// Backend base URL (default: MAP_API_BASE_URL, then http://localhost:8080)
    #[arg(long)]
    api: Option<String>,

    /// Event code (default: MAP_EVENT_CODE)
    #[arg(long)]
    event: Option<String>,

    /// Participant id of the viewing user (default: MAP_CURRENT_USER_ID)
    #[arg(long)]
    me: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the event once and print its roster
    Show {
        /// Globe radius used for marker positions
        #[arg(long, default_value_t = 1.0)]
        radius: f64,

        /// Select a participant and print the camera framing for it
        #[arg(long)]
        select: Option<String>,

        /// Print markers as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Poll the roster and print joins, departures and level-ups
    Watch {
        /// Seconds between polls (default: MAP_POLL_INTERVAL_SECS, then 30)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many polls
        #[arg(long)]
        polls: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env();
    if let Some(api) = args.api {
        config.api_base_url = api;
    }
    let code = args
        .event
        .or_else(|| config.event_code.clone())
        .ok_or("no event code: pass --event or set MAP_EVENT_CODE")?;

    let mut loader = MapLoader::new(HttpEventsApi::new(&config)?);
    let mut store = MapStore::new();
    store.set_current_user_id(args.me.or_else(|| config.current_user_id.clone()));
    loader.load(&mut store, &code).await?;

    match args.command {
        Command::Show {
            radius,
            select,
            json,
        } => cmd_show(&mut store, radius, select.as_deref(), json)?,
        Command::Watch { interval, polls } => {
            let interval = interval
                .filter(|&s| s > 0)
                .map(Duration::from_secs)
                .unwrap_or(config.poll_interval);
            cmd_watch(&mut loader, &mut store, &code, interval, polls).await;
        }
    }

    Ok(())
}

fn cmd_show(
    store: &mut MapStore,
    radius: f64,
    select: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if select.is_some() {
        store.set_selected_participant(select);
    }
    let state = store.state();

    if json {
        let rows = marker_rows(state, radius)?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    print!("{}", render_report(state));
    let rig = CameraRig {
        globe_radius: radius,
        ..CameraRig::default()
    };
    if let (Some(p), Some(focus)) = (state.selected_participant(), state.camera_focus(&rig)) {
        let focus = focus?;
        println!(
            "camera on {}: target {:?} eye {:?}",
            p.username,
            focus.target.as_array(),
            focus.eye.as_array()
        );
    }
    Ok(())
}

async fn cmd_watch(
    loader: &mut MapLoader<HttpEventsApi>,
    store: &mut MapStore,
    code: &str,
    interval: Duration,
    polls: Option<u64>,
) {
    println!(
        "watching {code}: {} participants, polling every {}s",
        store.state().participants().len(),
        interval.as_secs()
    );

    let mut done = 0u64;
    while polls.is_none_or(|max| done < max) {
        tokio::time::sleep(interval).await;
        done += 1;

        let before = store.state().participants().clone();
        match loader.refresh_participants(store, code).await {
            Ok(true) => {
                let diff = diff_rosters(&before, store.state().participants());
                for name in &diff.joined {
                    println!("+ {name} joined");
                }
                for name in &diff.left {
                    println!("- {name} left");
                }
                for (name, level) in &diff.leveled_up {
                    println!("^ {name} reached {} (L{level})", roster::level_name(*level));
                }
                if diff.is_empty() {
                    info!(poll = done, "no roster changes");
                }
            }
            Ok(false) => {}
            Err(err) => warn!(poll = done, "refresh failed: {err}"),
        }
    }
}
