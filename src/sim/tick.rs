//! Fixed timestep simulation tick
//!
//! Advances the game state machine by exactly one 20 ms tick.

use super::collision::{bird_hits_pipe, bird_on_ground, bird_passed_pipe, pipe_overlaps_bird};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input for a single tick (deterministic)
///
/// `trigger` is one-shot: latched by the platform layer when any routed
/// input fires, cleared after the tick consumes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// The normalized trigger action (flap / state transition)
    pub trigger: bool,
}

/// Advance the game state by one fixed tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();
    state.time_ticks += 1;

    match state.phase {
        GamePhase::Ready => tick_ready(state, input),
        GamePhase::Playing => tick_playing(state, input),
        GamePhase::Over => tick_over(state, input),
    }
}

/// Ready: cosmetic idle bob and wing animation only, no physics.
fn tick_ready(state: &mut GameState, input: &TickInput) {
    let t = state.time_ticks as f32;
    state.bird.pos.y = BIRD_SPAWN_Y + (t * IDLE_BOB_RATE).sin() * IDLE_BOB_AMPLITUDE;
    state.bird.rot_deg = 0.0;
    state.bird.animate(state.time_ticks);

    if input.trigger {
        state.phase = GamePhase::Playing;
        state.play_ticks = 0;
        state.events.push(GameEvent::Started);
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput) {
    state.play_ticks += 1;

    // A flap overrides velocity for this tick; gravity resumes next tick.
    // Flapping is refused once the bird's center is above the viewport top.
    let flapped = input.trigger && state.bird.pos.y > 0.0;
    if flapped {
        state.bird.vel = FLAP_THRUST;
        state.events.push(GameEvent::Flapped);
    }

    // Semi-implicit Euler: the velocity at the start of the tick moves the
    // bird, then gravity updates velocity for the next tick.
    state.bird.pos.y += state.bird.vel;
    if !flapped {
        state.bird.vel += GRAVITY;
    }
    state.bird.update_rotation();
    state.bird.animate(state.time_ticks);

    // Scroll, spawn, retire (front pipe only, FIFO).
    for pipe in &mut state.pipes {
        pipe.x -= PIPE_SPEED;
    }
    if state.play_ticks % SPAWN_INTERVAL_TICKS == 0 {
        state.spawn_pipe();
    }
    if state.pipes.front().is_some_and(|p| p.off_screen()) {
        state.pipes.pop_front();
    }

    // Collision and scoring run once per tick against the oldest pipe not
    // yet passed; collision only applies while its span overlaps the bird.
    let mut collided = false;
    if let Some(pipe) = state.pipes.iter_mut().find(|p| !p.passed) {
        if pipe_overlaps_bird(pipe, &state.bird) {
            collided = bird_hits_pipe(&state.bird, pipe);
        } else if bird_passed_pipe(&state.bird, pipe) {
            pipe.passed = true;
            state.score += 1;
            state.events.push(GameEvent::Scored);
        }
    }

    if collided || bird_on_ground(&state.bird) {
        state.phase = GamePhase::Over;
        state.events.push(GameEvent::Collided);
    }
}

/// Over: the bird keeps falling under doubled gravity until it rests on the
/// ground; the landing event fires exactly once per run.
fn tick_over(state: &mut GameState, input: &TickInput) {
    if !bird_on_ground(&state.bird) {
        state.bird.pos.y += state.bird.vel;
        state.bird.vel += GRAVITY * 2.0;
        state.bird.update_rotation();
    }

    if bird_on_ground(&state.bird) {
        state.bird.pos.y = GROUND_Y - state.bird.radius;
        state.bird.vel = 0.0;
        if !state.death_sound_played {
            state.death_sound_played = true;
            state.events.push(GameEvent::Landed);
        }
    }

    if input.trigger {
        state.reset_to_ready();
        state.events.push(GameEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bird, Pipe};
    use proptest::prelude::*;

    const TRIGGER: TickInput = TickInput { trigger: true };
    const IDLE: TickInput = TickInput { trigger: false };

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        tick(&mut state, &TRIGGER);
        assert_eq!(state.phase, GamePhase::Playing);
        state
    }

    #[test]
    fn test_ready_to_playing_on_trigger() {
        let mut state = GameState::new(1);
        tick(&mut state, &IDLE);
        assert_eq!(state.phase, GamePhase::Ready);
        tick(&mut state, &TRIGGER);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.events.contains(&GameEvent::Started));
    }

    #[test]
    fn test_ready_has_no_physics() {
        let mut state = GameState::new(1);
        for _ in 0..50 {
            tick(&mut state, &IDLE);
            assert_eq!(state.bird.vel, 0.0);
            // Idle bob stays within its amplitude around the spawn height
            assert!((state.bird.pos.y - BIRD_SPAWN_Y).abs() <= IDLE_BOB_AMPLITUDE + 0.001);
        }
        assert!(state.pipes.is_empty());
    }

    #[test]
    fn test_gravity_accumulates_each_tick() {
        let mut state = playing_state(1);
        let mut expected_vel = state.bird.vel;
        for _ in 0..20 {
            tick(&mut state, &IDLE);
            expected_vel += GRAVITY;
            assert_eq!(state.bird.vel, expected_vel);
        }
    }

    #[test]
    fn test_flap_overrides_velocity() {
        let mut state = playing_state(1);
        for _ in 0..10 {
            tick(&mut state, &IDLE);
        }
        tick(&mut state, &TRIGGER);
        assert_eq!(state.bird.vel, FLAP_THRUST);
        assert!(state.events.contains(&GameEvent::Flapped));
        // Gravity resumes the tick after
        tick(&mut state, &IDLE);
        assert_eq!(state.bird.vel, FLAP_THRUST + GRAVITY);
    }

    #[test]
    fn test_position_integrates_before_gravity() {
        let mut state = playing_state(1);
        state.bird.vel = 3.0;
        let y = state.bird.pos.y;
        tick(&mut state, &IDLE);
        // Position moved by the start-of-tick velocity, not the updated one
        assert_eq!(state.bird.pos.y, y + 3.0);
        assert_eq!(state.bird.vel, 3.0 + GRAVITY);
    }

    #[test]
    fn test_flap_refused_above_viewport_top() {
        let mut state = playing_state(1);
        state.bird.pos.y = -5.0;
        state.bird.vel = -2.0;
        tick(&mut state, &TRIGGER);
        // No override: gravity applied instead
        assert_eq!(state.bird.vel, -2.0 + GRAVITY);
        assert!(!state.events.contains(&GameEvent::Flapped));
    }

    #[test]
    fn test_spawn_every_hundred_ticks() {
        let mut state = playing_state(1);
        // Pin the bird to the nearest gap center so no run ends; we only
        // care about the spawn cadence here. No pipe retires this early.
        for n in 1..=(2 * SPAWN_INTERVAL_TICKS + 50) {
            state.bird.vel = 0.0;
            if let Some((top, bottom)) = state.nearest_gap() {
                state.bird.pos.y = (top + bottom) / 2.0;
            }
            tick(&mut state, &IDLE);
            assert_eq!(state.phase, GamePhase::Playing);
            let expected = n / SPAWN_INTERVAL_TICKS;
            assert_eq!(state.pipes.len() as u64, expected, "at play tick {n}");
        }
    }

    #[test]
    fn test_pipes_scroll_left() {
        let mut state = playing_state(1);
        state.pipes.push_back(Pipe {
            x: 200.0,
            gap_offset: -300.0,
            passed: false,
        });
        state.bird.vel = 0.0;
        state.bird.pos.y = 185.0;
        tick(&mut state, &IDLE);
        assert_eq!(state.pipes[0].x, 200.0 - PIPE_SPEED);
    }

    #[test]
    fn test_fifo_retirement_only_when_fully_off_screen() {
        let mut state = playing_state(1);
        state.pipes.push_back(Pipe {
            x: -PIPE_W + PIPE_SPEED + 1.0,
            gap_offset: -300.0,
            passed: true,
        });
        state.pipes.push_back(Pipe {
            x: 200.0,
            gap_offset: -300.0,
            passed: false,
        });
        state.bird.vel = 0.0;
        state.bird.pos.y = 185.0;

        // Right edge still at +1 after the first shift: kept
        tick(&mut state, &IDLE);
        assert_eq!(state.pipes.len(), 2);
        // Now fully off the left edge: popped from the front
        tick(&mut state, &IDLE);
        assert_eq!(state.pipes.len(), 1);
        assert_eq!(state.pipes[0].x, 200.0 - 2.0 * PIPE_SPEED);
    }

    #[test]
    fn test_score_exactly_once_per_pipe() {
        let mut state = playing_state(1);
        // Right edge one scroll step away from clearing the bird's span
        state.pipes.push_back(Pipe {
            x: BIRD_X - BIRD_RADIUS - PIPE_W + 1.0,
            gap_offset: -300.0,
            passed: false,
        });
        state.bird.vel = 0.0;
        state.bird.pos.y = 185.0;

        tick(&mut state, &IDLE);
        assert_eq!(state.score, 1);
        assert!(state.events.contains(&GameEvent::Scored));
        assert!(state.pipes[0].passed);

        // Further ticks never score the same pipe again
        for _ in 0..10 {
            state.bird.vel = 0.0;
            state.bird.pos.y = 185.0;
            tick(&mut state, &IDLE);
        }
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_collision_with_pipe_ends_run() {
        let mut state = playing_state(1);
        state.pipes.push_back(Pipe {
            x: BIRD_X - PIPE_W / 2.0,
            gap_offset: -300.0,
            passed: false,
        });
        // Inside the pipe's span, above the gap (gap_top = 100)
        state.bird.pos.y = 50.0;
        state.bird.vel = 0.0;
        tick(&mut state, &IDLE);
        assert_eq!(state.phase, GamePhase::Over);
        assert!(state.events.contains(&GameEvent::Collided));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_no_score_when_colliding() {
        let mut state = playing_state(1);
        state.pipes.push_back(Pipe {
            x: BIRD_X - PIPE_W / 2.0,
            gap_offset: -300.0,
            passed: false,
        });
        state.bird.pos.y = 50.0;
        state.bird.vel = 0.0;
        tick(&mut state, &IDLE);
        assert_eq!(state.phase, GamePhase::Over);
        assert!(!state.events.contains(&GameEvent::Scored));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_ground_contact_ends_run() {
        let mut state = playing_state(1);
        state.bird.pos.y = GROUND_Y - BIRD_RADIUS - 1.0;
        state.bird.vel = 5.0;
        tick(&mut state, &IDLE);
        assert_eq!(state.phase, GamePhase::Over);
    }

    #[test]
    fn test_dead_bird_falls_with_doubled_gravity_and_lands_once() {
        let mut state = playing_state(1);
        state.pipes.push_back(Pipe {
            x: BIRD_X - PIPE_W / 2.0,
            gap_offset: -300.0,
            passed: false,
        });
        state.bird.pos.y = 50.0;
        state.bird.vel = 0.0;
        tick(&mut state, &IDLE);
        assert_eq!(state.phase, GamePhase::Over);

        let vel_before = state.bird.vel;
        tick(&mut state, &IDLE);
        assert_eq!(state.bird.vel, vel_before + GRAVITY * 2.0);

        // Fall to the ground; the landing event fires exactly once
        let mut landings = 0;
        for _ in 0..500 {
            tick(&mut state, &IDLE);
            if state.events.contains(&GameEvent::Landed) {
                landings += 1;
            }
        }
        assert_eq!(landings, 1);
        assert!(state.death_sound_played);
        assert_eq!(state.bird.pos.y, GROUND_Y - BIRD_RADIUS);
        assert_eq!(state.bird.vel, 0.0);
    }

    #[test]
    fn test_trigger_while_over_resets_to_ready() {
        let mut state = playing_state(1);
        state.score = 5;
        state.pipes.push_back(Pipe {
            x: BIRD_X - PIPE_W / 2.0,
            gap_offset: -300.0,
            passed: false,
        });
        state.bird.pos.y = 50.0;
        state.bird.vel = 0.0;
        tick(&mut state, &IDLE);
        assert_eq!(state.phase, GamePhase::Over);

        tick(&mut state, &TRIGGER);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 0);
        assert!(state.pipes.is_empty());
        assert_eq!(state.bird.vel, 0.0);
        assert!(!state.death_sound_played);
        assert!(state.events.contains(&GameEvent::Reset));
    }

    #[test]
    fn test_full_run_through_first_pipe() {
        // Drive a real run with periodic flaps and verify the first pipe
        // spawns on the 100th playing tick and scores when cleared.
        let mut state = playing_state(42);
        let mut scored = false;
        for n in 1..=400u64 {
            // Flap whenever the bird sinks below the nearest gap center
            let target = state
                .nearest_gap()
                .map(|(top, bottom)| (top + bottom) / 2.0)
                .unwrap_or(BIRD_SPAWN_Y);
            let input = TickInput {
                trigger: state.bird.pos.y > target,
            };
            tick(&mut state, &input);
            if n < SPAWN_INTERVAL_TICKS {
                assert!(state.pipes.is_empty());
            }
            if state.events.contains(&GameEvent::Scored) {
                scored = true;
                break;
            }
            assert_eq!(state.phase, GamePhase::Playing, "died at play tick {n}");
        }
        assert!(scored);
    }

    proptest! {
        #[test]
        fn prop_rotation_always_clamped(vel in -200.0f32..200.0) {
            let mut bird = Bird::new();
            bird.vel = vel;
            bird.update_rotation();
            prop_assert!(bird.rot_deg >= ROT_MIN_DEG);
            prop_assert!(bird.rot_deg <= ROT_MAX_DEG);
        }
    }
}
