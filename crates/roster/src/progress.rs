//! Progress classification derived from a participant's completion flags.
//!
//! Everything here is a pure function of the flags (and, for the percentage,
//! the backend-supplied value). Nothing is cached or stored.

use crate::model::{LEVEL_FLAG_COUNT, Participant};

/// Highest level a participant can be classified at.
pub const MAX_LEVEL: u8 = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Tier {
    name: &'static str,
    color: &'static str,
}

const TIERS: [Tier; MAX_LEVEL as usize + 1] = [
    Tier {
        name: "Stranded",
        color: "#9CA3AF",
    },
    Tier {
        name: "Survivor",
        color: "#A8D8EA",
    },
    Tier {
        name: "Explorer",
        color: "#C4B5E0",
    },
    Tier {
        name: "Navigator",
        color: "#F6C28B",
    },
    Tier {
        name: "Homeward",
        color: "#7ED6A5",
    },
];

/// Level from any ordered sequence of completion flags: the number of true
/// flags, capped at [`MAX_LEVEL`].
pub fn level_of_flags(flags: &[bool]) -> u8 {
    let done = flags.iter().filter(|&&f| f).count();
    done.min(MAX_LEVEL as usize) as u8
}

pub fn level_of(participant: &Participant) -> u8 {
    level_of_flags(&participant.levels_complete)
}

fn tier(level: impl Into<i64>) -> Tier {
    let idx = level.into().clamp(0, i64::from(MAX_LEVEL));
    TIERS[idx as usize]
}

/// Display name of a level. Total: out-of-range levels clamp to `[0, 4]`.
pub fn level_name(level: impl Into<i64>) -> &'static str {
    tier(level).name
}

/// Marker color of a level as a `#RRGGBB` string. Clamps like [`level_name`].
pub fn level_color(level: impl Into<i64>) -> &'static str {
    tier(level).color
}

/// The backend's percentage when it sent one, otherwise
/// `round(100 · complete / total)` over the flags.
pub fn completion_percentage(participant: &Participant) -> f64 {
    if let Some(pct) = participant.completion_percentage {
        return pct;
    }
    let done = participant.levels_complete.iter().filter(|&&f| f).count();
    (100.0 * done as f64 / LEVEL_FLAG_COUNT as f64).round()
}

/// Per-level completion, index-aligned with the level table.
pub fn level_completion_status(participant: &Participant) -> [bool; LEVEL_FLAG_COUNT] {
    participant.levels_complete
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepState {
    Complete,
    /// Next step to work on: previous step complete, this one not.
    Current,
    Locked,
}

/// Step-by-step view for progress rendering.
///
/// Step `i` is `Current` when it is incomplete and step `i - 1` is complete
/// (step 0 needs no predecessor). Flags are taken as given, so a gap in the
/// sequence can produce more than one `Current` step.
pub fn level_steps(participant: &Participant) -> [StepState; LEVEL_FLAG_COUNT] {
    steps_from_flags(&participant.levels_complete)
}

fn steps_from_flags(flags: &[bool; LEVEL_FLAG_COUNT]) -> [StepState; LEVEL_FLAG_COUNT] {
    std::array::from_fn(|i| {
        if flags[i] {
            StepState::Complete
        } else if i == 0 || flags[i - 1] {
            StepState::Current
        } else {
            StepState::Locked
        }
    })
}
