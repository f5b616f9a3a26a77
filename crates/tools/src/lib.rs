//! Text and JSON renderings of the map state for the `waymap` CLI.

use std::collections::HashSet;
use std::fmt::Write as _;

use foundation::CoordinateError;
use foundation::math::display_degrees;
use roster::{Roster, StepState, completion_percentage, level_name, level_of, level_steps};
use serde::Serialize;
use store::MapState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerRow {
    pub participant_id: String,
    pub username: String,
    pub level: u8,
    pub level_name: &'static str,
    pub color: &'static str,
    pub completion_percentage: f64,
    pub position: [f64; 3],
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub selected: bool,
    pub is_me: bool,
}

/// Markers joined with the progress and degree readouts a detail panel shows.
pub fn marker_rows(state: &MapState, radius: f64) -> Result<Vec<MarkerRow>, CoordinateError> {
    let markers = state.markers(radius)?;
    let rows = markers
        .into_iter()
        .zip(state.participants())
        .map(|(marker, p)| {
            let (x_deg, y_deg) = p.position.to_degree_space();
            let (lon_deg, lat_deg) = display_degrees(x_deg, y_deg);
            MarkerRow {
                participant_id: marker.participant_id,
                username: marker.username,
                level: marker.level,
                level_name: level_name(marker.level),
                color: marker.color,
                completion_percentage: completion_percentage(p),
                position: marker.position.as_array(),
                lon_deg,
                lat_deg,
                selected: marker.selected,
                is_me: marker.is_current_user,
            }
        })
        .collect();
    Ok(rows)
}

fn steps_glyphs(steps: &[StepState]) -> String {
    steps
        .iter()
        .map(|s| match s {
            StepState::Complete => '#',
            StepState::Current => '>',
            StepState::Locked => '.',
        })
        .collect()
}

/// Human-readable roster, most advanced participants first.
pub fn render_report(state: &MapState) -> String {
    let mut out = String::new();

    match state.event() {
        Some(ev) => {
            let status = if ev.active { "active" } else { "ended" };
            let _ = writeln!(out, "{} ({}) [{status}]", ev.name, ev.code);
            if let Some(desc) = &ev.description {
                let _ = writeln!(out, "{desc}");
            }
        }
        None => out.push_str("(no event loaded)\n"),
    }
    if let Some(err) = state.load_error() {
        let _ = writeln!(out, "load error: {err}");
    }

    let _ = writeln!(out, "{} participants", state.participants().len());
    for p in state.participants_by_progress() {
        let level = level_of(p);
        let tag = match (state.is_current_user(p), state.selected_id() == Some(p.id.as_str())) {
            (true, true) => "*>",
            (true, false) => "* ",
            (false, true) => " >",
            (false, false) => "  ",
        };
        let (x_deg, y_deg) = p.position.to_degree_space();
        let (lon, lat) = display_degrees(x_deg, y_deg);
        let _ = writeln!(
            out,
            "{tag} {:<16} [{}] L{level} {:<9} {:>5.1}%  lon {lon:>7.2} lat {lat:>6.2}",
            p.username,
            steps_glyphs(&level_steps(p)),
            level_name(level),
            completion_percentage(p),
        );
    }
    out
}

/// Roster changes between two polls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RosterDiff {
    pub joined: Vec<String>,
    pub left: Vec<String>,
    /// `(username, new level)` for participants whose level went up.
    pub leveled_up: Vec<(String, u8)>,
}

impl RosterDiff {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty() && self.leveled_up.is_empty()
    }
}

pub fn diff_rosters(old: &Roster, new: &Roster) -> RosterDiff {
    let mut diff = RosterDiff::default();
    let new_ids: HashSet<&str> = new.iter().map(|p| p.id.as_str()).collect();

    for p in new {
        match old.get(&p.id) {
            None => diff.joined.push(p.username.clone()),
            Some(prev) => {
                let level = level_of(p);
                if level > level_of(prev) {
                    diff.leveled_up.push((p.username.clone(), level));
                }
            }
        }
    }
    for p in old {
        if !new_ids.contains(p.id.as_str()) {
            diff.left.push(p.username.clone());
        }
    }
    diff
}
