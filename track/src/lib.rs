//! Where the car is on the course: checkpoint gates, lap timing, off-track detection and the
//! highscore table.

extern crate nalgebra as na;
#[macro_use]
extern crate serde_derive;

pub mod highscores;
pub mod progress;
pub mod spline;

pub use crate::highscores::{HighscoreEntry, HighscoreTable, HIGHSCORE_CAPACITY, MIN_VALID_TIME_MS};
pub use crate::progress::{TrackEvent, TrackProgress};
pub use crate::spline::TrackSpline;
