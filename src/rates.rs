//! Process-wide currency rate state.
//!
//! Tracks the date of the most recently stored rate set and when the last
//! network fetch was attempted. Both live in one slot so a reader never
//! sees a date from one update paired with the fetch time of another.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use strum::Display;
use tracing::debug;

use crate::config::ConfigError;
use crate::error::{NumbyError, NumbyResult};
use crate::units::currency::is_date_stale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Staleness {
    Fresh,
    Stale,
}

#[derive(Debug, Clone, Default)]
struct RateState {
    updated: Option<NaiveDate>,
    last_fetch: Option<Instant>,
}

lazy_static! {
    static ref RATE_STATE: RwLock<RateState> = RwLock::new(RateState::default());
}

fn poisoned() -> NumbyError {
    NumbyError::Config(ConfigError::StateUnavailable("rate state".to_string()))
}

/// Records the date of a rate set that was just stored.
pub fn record_update(date: NaiveDate) {
    let mut state = RATE_STATE
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    debug!("rate set dated {} recorded", date);
    state.updated = Some(date);
}

pub fn get_rates_update_date() -> Option<NaiveDate> {
    RATE_STATE.read().ok().and_then(|state| state.updated)
}

/// Rates count as stale when none were ever stored.
pub fn are_rates_stale() -> NumbyResult<Staleness> {
    let state = RATE_STATE.read().map_err(|_| poisoned())?;
    Ok(match state.updated {
        Some(date) if !is_date_stale(date, Utc::now()) => Staleness::Fresh,
        _ => Staleness::Stale,
    })
}

/// Claims a fetch slot. Fails with the remaining wait when the previous
/// attempt was less than `min_interval` ago.
pub fn begin_fetch(min_interval: Duration) -> Result<(), Duration> {
    let mut state = RATE_STATE
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let now = Instant::now();
    if let Some(last) = state.last_fetch {
        let elapsed = now.duration_since(last);
        if elapsed < min_interval {
            return Err(min_interval - elapsed);
        }
    }
    state.last_fetch = Some(now);
    Ok(())
}
