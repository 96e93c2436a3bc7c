//! Canvas 2D rendering
//!
//! Reads the game state and draws the frame; never mutates gameplay. All
//! sprites are procedural shapes - no image assets.

use web_sys::CanvasRenderingContext2d;

use crate::consts::*;
use crate::deg_to_rad;
use crate::sim::{Bird, GamePhase, GameState, Pipe};

const SKY: &str = "#70c5ce";
const GROUND: &str = "#ded895";
const GROUND_EDGE: &str = "#5a3f1e";
const PIPE_BODY: &str = "#5bb344";
const PIPE_RIM: &str = "#2e6b1e";
const BIRD_BODY: &str = "#f7c935";
const BIRD_WING: &str = "#e09c2b";
const BIRD_BEAK: &str = "#e0531f";
const TEXT: &str = "#ffffff";
const TEXT_SHADOW: &str = "#333333";

/// Height of the pipe rim cap at each gap boundary
const CAP_H: f64 = 24.0;
/// Rim cap sticks out this much on each side of the column
const CAP_LIP: f64 = 3.0;

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Draw one frame: background, pipes, ground, bird, HUD overlay
    pub fn draw(&self, state: &GameState, best: u32) {
        self.draw_background();
        for pipe in &state.pipes {
            self.draw_pipe(pipe);
        }
        self.draw_ground();
        self.draw_bird(&state.bird);
        self.draw_overlay(state, best);
    }

    fn draw_background(&self) {
        self.ctx.set_fill_style_str(SKY);
        self.ctx
            .fill_rect(0.0, 0.0, VIEW_W as f64, VIEW_H as f64);
    }

    fn draw_pipe(&self, pipe: &Pipe) {
        let x = pipe.x as f64;
        let w = PIPE_W as f64;
        let gap_top = pipe.gap_top() as f64;
        let gap_bottom = pipe.gap_bottom() as f64;

        self.ctx.set_fill_style_str(PIPE_BODY);
        // Top column extends from above the viewport down to the gap
        self.ctx
            .fill_rect(x, gap_top - PIPE_SEGMENT_H as f64, w, PIPE_SEGMENT_H as f64);
        // Bottom column from the gap down past the ground
        self.ctx.fill_rect(x, gap_bottom, w, PIPE_SEGMENT_H as f64);

        // Rim caps facing the gap
        self.ctx.set_fill_style_str(PIPE_RIM);
        self.ctx
            .fill_rect(x - CAP_LIP, gap_top - CAP_H, w + 2.0 * CAP_LIP, CAP_H);
        self.ctx
            .fill_rect(x - CAP_LIP, gap_bottom, w + 2.0 * CAP_LIP, CAP_H);
    }

    fn draw_ground(&self) {
        self.ctx.set_fill_style_str(GROUND);
        self.ctx.fill_rect(
            0.0,
            GROUND_Y as f64,
            VIEW_W as f64,
            (VIEW_H - GROUND_Y) as f64,
        );
        self.ctx.set_fill_style_str(GROUND_EDGE);
        self.ctx.fill_rect(0.0, GROUND_Y as f64, VIEW_W as f64, 3.0);
    }

    fn draw_bird(&self, bird: &Bird) {
        let r = bird.radius as f64;

        self.ctx.save();
        let _ = self.ctx.translate(bird.pos.x as f64, bird.pos.y as f64);
        let _ = self.ctx.rotate(deg_to_rad(bird.rot_deg) as f64);

        // Body
        self.ctx.set_fill_style_str(BIRD_BODY);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(0.0, 0.0, r, 0.0, std::f64::consts::TAU);
        self.ctx.fill();

        // Wing: three-frame beat, offset below/center/above
        let wing_dy = match bird.frame {
            0 => 4.0,
            1 => 0.0,
            _ => -4.0,
        };
        self.ctx.set_fill_style_str(BIRD_WING);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(-3.0, wing_dy, r * 0.45, 0.0, std::f64::consts::TAU);
        self.ctx.fill();

        // Beak
        self.ctx.set_fill_style_str(BIRD_BEAK);
        self.ctx.fill_rect(r - 4.0, -2.0, 8.0, 5.0);

        // Eye
        self.ctx.set_fill_style_str(TEXT);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(r * 0.35, -r * 0.35, 2.5, 0.0, std::f64::consts::TAU);
        self.ctx.fill();

        self.ctx.restore();
    }

    fn draw_overlay(&self, state: &GameState, best: u32) {
        self.ctx.set_text_align("center");
        match state.phase {
            GamePhase::Ready => {
                self.banner("TAP TO FLAP", VIEW_H as f64 * 0.35, 24);
            }
            GamePhase::Playing => {
                self.banner(&state.score.to_string(), 60.0, 36);
            }
            GamePhase::Over => {
                self.banner("GAME OVER", VIEW_H as f64 * 0.32, 28);
                self.banner(
                    &format!("SCORE {}   BEST {}", state.score, best),
                    VIEW_H as f64 * 0.42,
                    18,
                );
            }
        }
    }

    fn banner(&self, text: &str, y: f64, size: u32) {
        let x = VIEW_W as f64 / 2.0;
        self.ctx
            .set_font(&format!("bold {}px 'Courier New', monospace", size));
        self.ctx.set_fill_style_str(TEXT_SHADOW);
        let _ = self.ctx.fill_text(text, x + 2.0, y + 2.0);
        self.ctx.set_fill_style_str(TEXT);
        let _ = self.ctx.fill_text(text, x, y);
    }
}
