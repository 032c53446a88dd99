//! Overnight verification-window arithmetic.
//!
//! Windows are stored as "HH:MM" local wall-clock strings and may wrap past
//! midnight (start > end). Containment checks always take the reporter's own
//! local time; the server clock is never consulted here.

use thiserror::Error;

/// Selectable window boundaries, in schedule order. The catalogue itself
/// wraps past midnight, so ordering is by index, not by raw minutes.
pub const WINDOW_SLOTS: [&str; 13] = [
    "22:00", "22:30", "23:00", "23:30", "00:00", "00:30", "01:00", "01:30", "02:00", "02:30",
    "03:00", "03:30", "04:00",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid time '{0}', expected HH:MM")]
    BadFormat(String),
    #[error("'{0}' is not a selectable verification slot (22:00 through 04:00, half-hour steps)")]
    NotASlot(String),
    #[error("window end must come after the start within the overnight range")]
    EndNotAfterStart,
}

/// Parse an "HH:MM" wall-clock string to minutes since local midnight.
pub fn parse_wall_clock(s: &str) -> Result<u16, WindowError> {
    let bad = || WindowError::BadFormat(s.to_string());
    let (h, m) = s.split_once(':').ok_or_else(bad)?;
    let h: u16 = h.parse().map_err(|_| bad())?;
    let m: u16 = m.parse().map_err(|_| bad())?;
    if h > 23 || m > 59 {
        return Err(bad());
    }
    Ok(h * 60 + m)
}

/// An overnight verification window. `start > end` means it wraps midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    start: u16,
    end: u16,
}

impl Window {
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Ok(Self {
            start: parse_wall_clock(start)?,
            end: parse_wall_clock(end)?,
        })
    }

    /// Boundary-inclusive containment of a local instant, in minutes since
    /// midnight, with wrap-around semantics.
    pub fn contains(&self, now: u16) -> bool {
        if self.start <= self.end {
            self.start <= now && now <= self.end
        } else {
            now >= self.start || now <= self.end
        }
    }
}

fn slot_index(s: &str) -> Result<usize, WindowError> {
    WINDOW_SLOTS
        .iter()
        .position(|slot| *slot == s)
        .ok_or_else(|| WindowError::NotASlot(s.to_string()))
}

/// Validate a submitted start/end pair against the slot catalogue.
///
/// Both boundaries must be catalogue entries and the end must come strictly
/// later in catalogue order. Raw minute comparison would reject every wrapped
/// pair (e.g. 23:00 to 01:00), so ordering is by index.
pub fn validate_slot_pair(start: &str, end: &str) -> Result<Window, WindowError> {
    let start_idx = slot_index(start)?;
    let end_idx = slot_index(end)?;
    if end_idx <= start_idx {
        return Err(WindowError::EndNotAfterStart);
    }
    Window::parse(start, end)
}
