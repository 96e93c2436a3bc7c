//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio, or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{bird_hits_pipe, bird_on_ground, bird_passed_pipe, pipe_overlaps_bird};
pub use state::{Bird, GameEvent, GamePhase, GameState, Pipe};
pub use tick::{TickInput, tick};
