//! Echo Flap - a side-scrolling arcade game with sonified gap guidance
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, scoring state machine)
//! - `sonifier`: Continuous tone engine mapping gap proximity to pitch
//! - `audio`: Procedural one-shot sound effects
//! - `input`: Control modes and trigger routing
//! - `score`: Best-score persistence
//! - `render`: Canvas 2D drawing (browser only)

pub mod audio;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod score;
pub mod sim;
pub mod sonifier;

pub use input::ControlMode;
pub use score::BestScore;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz - one tick every 20 ms)
    pub const TICK_SECS: f32 = 0.02;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Viewport dimensions (logical pixels)
    pub const VIEW_W: f32 = 288.0;
    pub const VIEW_H: f32 = 512.0;
    /// Top of the ground strip; the bird dies on contact
    pub const GROUND_Y: f32 = 400.0;

    /// Bird sprite dimensions
    pub const BIRD_W: f32 = 34.0;
    pub const BIRD_H: f32 = 24.0;
    /// Collision radius, derived from the sprite height
    pub const BIRD_RADIUS: f32 = BIRD_H / 2.0;
    /// Fixed horizontal position of the bird's center
    pub const BIRD_X: f32 = 60.0;
    /// Vertical spawn position (also the idle-bob centerline)
    pub const BIRD_SPAWN_Y: f32 = 180.0;
    /// Wing animation frame count and cycle interval
    pub const BIRD_FRAMES: usize = 3;
    pub const ANIM_INTERVAL_TICKS: u64 = 5;

    /// Gravity acceleration (px/tick^2, downward)
    pub const GRAVITY: f32 = 0.25;
    /// Flap thrust: velocity is set to this value outright (px/tick, upward)
    pub const FLAP_THRUST: f32 = -4.6;

    /// Rotation mapping: nose-up and nose-down use distinct slopes
    /// (degrees per px/tick of velocity) with hard caps.
    pub const ROT_UP_SLOPE: f32 = 5.4;
    pub const ROT_DOWN_SLOPE: f32 = 10.0;
    pub const ROT_MIN_DEG: f32 = -25.0;
    pub const ROT_MAX_DEG: f32 = 90.0;

    /// Idle bob in the Ready phase (cosmetic only)
    pub const IDLE_BOB_AMPLITUDE: f32 = 6.0;
    pub const IDLE_BOB_RATE: f32 = 0.1;

    /// Pipe geometry
    pub const PIPE_W: f32 = 52.0;
    /// Height of each pipe column segment
    pub const PIPE_SEGMENT_H: f32 = 400.0;
    /// Vertical opening between the top and bottom columns
    pub const PIPE_GAP: f32 = 170.0;
    /// Horizontal scroll speed (px/tick)
    pub const PIPE_SPEED: f32 = 2.0;
    /// A new pipe spawns every this many Playing ticks
    pub const SPAWN_INTERVAL_TICKS: u64 = 100;
    /// Gap offset randomization: `GAP_OFFSET_SCALE * min(u + 1, GAP_OFFSET_CLAMP)`
    /// with u uniform in [0, 1). Tuning values, no invariant attached.
    pub const GAP_OFFSET_SCALE: f32 = -210.0;
    pub const GAP_OFFSET_CLAMP: f32 = 1.8;
}

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * std::f32::consts::PI / 180.0
}
