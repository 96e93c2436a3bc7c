//! Game state and core simulation types

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen; the bird bobs in place waiting for a trigger
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended; the bird falls until it rests on the ground
    Over,
}

/// Things that happened during a tick, for the platform layer to react to
/// (sound effects, tone engine start/stop). The sim itself never touches audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Ready -> Playing transition
    Started,
    /// The bird flapped
    Flapped,
    /// A pipe was passed
    Scored,
    /// The bird hit a pipe or the ground (Playing -> Over)
    Collided,
    /// The dead bird came to rest on the ground (fires once per run)
    Landed,
    /// Over -> Ready transition
    Reset,
}

/// The player's bird. Horizontal position stays at `BIRD_X` for the whole run.
#[derive(Debug, Clone)]
pub struct Bird {
    /// Center position in px (y = 0 at the top of the viewport)
    pub pos: Vec2,
    /// Vertical velocity in px/tick (positive = downward)
    pub vel: f32,
    /// Display rotation in degrees, derived from velocity
    pub rot_deg: f32,
    /// Wing animation frame (0..BIRD_FRAMES)
    pub frame: usize,
    /// Collision radius
    pub radius: f32,
}

impl Bird {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(BIRD_X, BIRD_SPAWN_Y),
            vel: 0.0,
            rot_deg: 0.0,
            frame: 0,
            radius: BIRD_RADIUS,
        }
    }

    /// Derive display rotation from velocity: nose-up and nose-down scale
    /// with distinct slopes, clamped to [ROT_MIN_DEG, ROT_MAX_DEG].
    pub fn update_rotation(&mut self) {
        self.rot_deg = if self.vel < 0.0 {
            (self.vel * ROT_UP_SLOPE).max(ROT_MIN_DEG)
        } else {
            (self.vel * ROT_DOWN_SLOPE).min(ROT_MAX_DEG)
        };
    }

    /// Advance the wing animation on its fixed cycle.
    pub fn animate(&mut self, time_ticks: u64) {
        if time_ticks % ANIM_INTERVAL_TICKS == 0 {
            self.frame = (self.frame + 1) % BIRD_FRAMES;
        }
    }
}

impl Default for Bird {
    fn default() -> Self {
        Self::new()
    }
}

/// A pipe pair: top and bottom columns with a gap between them
#[derive(Debug, Clone)]
pub struct Pipe {
    /// Left edge in px, decreasing every tick
    pub x: f32,
    /// Raw randomized vertical offset of the top column (negative),
    /// `-210 * min(u + 1, 1.8)`; a tuning value, not an invariant.
    pub gap_offset: f32,
    /// Set once the bird has cleared this pipe; scores at most once
    pub passed: bool,
}

impl Pipe {
    /// Upper gap boundary (bottom edge of the top column)
    pub fn gap_top(&self) -> f32 {
        self.gap_offset + PIPE_SEGMENT_H
    }

    /// Lower gap boundary (top edge of the bottom column)
    pub fn gap_bottom(&self) -> f32 {
        self.gap_top() + PIPE_GAP
    }

    /// Right edge in px
    pub fn right(&self) -> f32 {
        self.x + PIPE_W
    }

    /// True once the pipe has scrolled fully past the left edge
    pub fn off_screen(&self) -> bool {
        self.right() < 0.0
    }
}

/// Complete game state, advanced only by [`tick`](super::tick::tick)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Current phase
    pub phase: GamePhase,
    /// The player's bird
    pub bird: Bird,
    /// Active pipes, oldest (leftmost) first
    pub pipes: VecDeque<Pipe>,
    /// Pipes passed this run
    pub score: u32,
    /// Global tick counter (drives idle bob and wing animation)
    pub time_ticks: u64,
    /// Ticks spent in Playing since the last start (drives pipe spawning)
    pub play_ticks: u64,
    /// Guards the one-shot death sound in the Over phase
    pub death_sound_played: bool,
    /// Events emitted by the current tick (cleared at the start of each tick)
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            phase: GamePhase::Ready,
            bird: Bird::new(),
            pipes: VecDeque::new(),
            score: 0,
            time_ticks: 0,
            play_ticks: 0,
            death_sound_played: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Append a new pipe at the right edge with a randomized gap offset
    pub fn spawn_pipe(&mut self) {
        let u: f32 = self.rng.random();
        let gap_offset = GAP_OFFSET_SCALE * (u + 1.0).min(GAP_OFFSET_CLAMP);
        self.pipes.push_back(Pipe {
            x: VIEW_W,
            gap_offset,
            passed: false,
        });
    }

    /// The pipe collision and scoring run against: the oldest not yet passed
    pub fn nearest_pipe(&self) -> Option<&Pipe> {
        self.pipes.iter().find(|p| !p.passed)
    }

    /// Gap boundaries (top, bottom) of the nearest pipe, for the tone engine
    pub fn nearest_gap(&self) -> Option<(f32, f32)> {
        self.nearest_pipe().map(|p| (p.gap_top(), p.gap_bottom()))
    }

    /// Over -> Ready reset: bird back at spawn with zero velocity, pipes
    /// cleared, score zeroed, death sound re-armed.
    pub fn reset_to_ready(&mut self) {
        self.phase = GamePhase::Ready;
        self.bird = Bird::new();
        self.pipes.clear();
        self.score = 0;
        self.play_ticks = 0;
        self.death_sound_played = false;
    }
}
