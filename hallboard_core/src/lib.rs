//! Firmware core for a sensor-instrumented physical chessboard.
//!
//! An 8×8 grid of presence sensors is polled through a [`SensorSource`]; the
//! [`Tracker`] owns the authoritative logical board and the turn, folds the
//! resulting pickup/place edges into chess moves, and — when the players'
//! physical actions diverge from legal play — records which squares are wrong
//! and what has to move where before the turn may advance.
//!
//! Hardware binding (multiplexer lines, clock, promotion buttons, audio) is
//! deliberately absent: sensors enter through [`SensorSource`] and
//! out-of-band cues leave through [`tracker::SideChannel`].
//!
//! [`SensorSource`]: sensors::SensorSource
//! [`Tracker`]: tracker::Tracker

pub mod board;
pub mod move_gen;
pub mod sensors;
pub mod tracker;
