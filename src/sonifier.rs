//! Proximity tone engine
//!
//! Continuously sonifies the bird's vertical offset from the nearest gap
//! center so the direction to steer is audible without vision: the tone sits
//! at a neutral pitch in the middle of the gap, rises toward a high alarm as
//! the bird nears the upper boundary, and falls toward a low drone near the
//! lower one.
//!
//! The browser backend is a single persistent sine oscillator into a gain
//! node. Stopping only fades the gain; the oscillator keeps running
//! inaudibly, which sidesteps audio-context construction limits and click
//! artifacts on restart.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

/// Neutral pitch at the gap center
pub const SAFE_HZ: f32 = 330.0;
/// Pitch at or beyond the upper gap boundary
pub const DANGER_HIGH_HZ: f32 = 900.0;
/// Pitch at or beyond the lower gap boundary
pub const DANGER_LOW_HZ: f32 = 150.0;
/// Absolute frequency ceiling
pub const MAX_HZ: f32 = 1100.0;

/// Frequency glide duration per update
pub const GLIDE_SECS: f64 = 0.07;
/// Gain ramp on start, and the level it ramps to
pub const FADE_IN_SECS: f64 = 0.08;
pub const TONE_GAIN: f32 = 0.45;
/// Gain ramp to silence on stop
pub const FADE_OUT_SECS: f64 = 0.12;

/// Concave response exponent: small offsets near the center move the pitch
/// quickly, further excursions more slowly.
pub const RESPONSE_EXPONENT: f32 = 0.7;
/// Normalized offsets saturate here, slightly past the boundary itself
pub const OVERSHOOT_LIMIT: f32 = 1.2;

/// Map the bird's vertical position against a gap to a tone frequency.
///
/// Offset is signed distance from the gap center, normalized by the half-gap
/// and capped at [`OVERSHOOT_LIMIT`]. Above center the tone rises toward
/// [`DANGER_HIGH_HZ`], below it falls toward [`DANGER_LOW_HZ`]; the result
/// is always within `[DANGER_LOW_HZ, MAX_HZ]`.
pub fn target_frequency(bird_y: f32, gap_top: f32, gap_bottom: f32) -> f32 {
    let center = (gap_top + gap_bottom) / 2.0;
    let half_gap = (gap_bottom - gap_top) / 2.0;
    if half_gap <= 0.0 {
        return SAFE_HZ;
    }

    let offset = bird_y - center;
    let normalized = (offset.abs() / half_gap).min(OVERSHOOT_LIMIT);
    let shaped = normalized.powf(RESPONSE_EXPONENT);

    let hz = if offset < 0.0 {
        SAFE_HZ + (DANGER_HIGH_HZ - SAFE_HZ) * shaped
    } else {
        SAFE_HZ - (SAFE_HZ - DANGER_LOW_HZ) * shaped
    };
    hz.clamp(DANGER_LOW_HZ, MAX_HZ)
}

/// Engine lifecycle. The audio graph is built lazily on the first `start()`
/// (which must follow a user gesture per the host autoplay policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneLifecycle {
    /// Never started; `stop()`/`update()` are no-ops
    Uninitialized,
    /// Started at least once, currently faded out
    Idle,
    /// Audible and tracking the gap
    Running,
}

/// The currently scheduled frequency glide. Overwritten whole on every
/// update, so the latest schedule always wins and no stale ramp overlaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreqRamp {
    pub target_hz: f32,
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// The gliding-tone generator
pub struct ProximityTone {
    lifecycle: ToneLifecycle,
    ramp: Option<FreqRamp>,
    #[cfg(target_arch = "wasm32")]
    graph: Option<ToneGraph>,
}

#[cfg(target_arch = "wasm32")]
struct ToneGraph {
    ctx: AudioContext,
    osc: OscillatorNode,
    gain: GainNode,
}

#[cfg(target_arch = "wasm32")]
impl ToneGraph {
    fn build() -> Option<Self> {
        let ctx = AudioContext::new().ok()?;
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(SAFE_HZ);
        gain.gain().set_value(0.0);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        // Started once and never stopped; audibility is controlled by gain
        osc.start().ok()?;

        Some(Self { ctx, osc, gain })
    }
}

impl ProximityTone {
    pub fn new() -> Self {
        Self {
            lifecycle: ToneLifecycle::Uninitialized,
            ramp: None,
            #[cfg(target_arch = "wasm32")]
            graph: None,
        }
    }

    pub fn lifecycle(&self) -> ToneLifecycle {
        self.lifecycle
    }

    /// The last scheduled glide, if any
    pub fn current_ramp(&self) -> Option<FreqRamp> {
        self.ramp
    }

    /// Start (or resume) the tone, fading the gain up from wherever it
    /// currently sits - a stop() interrupted mid-fade resumes smoothly.
    pub fn start(&mut self) {
        #[cfg(target_arch = "wasm32")]
        {
            if self.graph.is_none() {
                self.graph = ToneGraph::build();
                if self.graph.is_none() {
                    log::warn!("Failed to create AudioContext - gap tone disabled");
                    return;
                }
            }
            if let Some(graph) = &self.graph {
                if graph.ctx.state() == AudioContextState::Suspended {
                    let _ = graph.ctx.resume();
                }
                let t = graph.ctx.current_time();
                let gain = graph.gain.gain();
                gain.cancel_scheduled_values(t).ok();
                gain.set_value_at_time(gain.value(), t).ok();
                gain.linear_ramp_to_value_at_time(TONE_GAIN, t + FADE_IN_SECS)
                    .ok();
            }
        }
        self.lifecycle = ToneLifecycle::Running;
    }

    /// Fade the tone to silence. The oscillator keeps running inaudibly.
    /// No-op if the engine has never been started.
    pub fn stop(&mut self) {
        if self.lifecycle == ToneLifecycle::Uninitialized {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        if let Some(graph) = &self.graph {
            let t = graph.ctx.current_time();
            let gain = graph.gain.gain();
            gain.cancel_scheduled_values(t).ok();
            gain.set_value_at_time(gain.value(), t).ok();
            gain.linear_ramp_to_value_at_time(0.0, t + FADE_OUT_SECS).ok();
        }
        self.lifecycle = ToneLifecycle::Idle;
    }

    /// Schedule a glide toward the frequency for the given gap boundaries.
    /// No-op unless running. `None` (no pipe on screen yet) glides back to
    /// the neutral tone.
    pub fn update(&mut self, bird_y: f32, gap: Option<(f32, f32)>) {
        if self.lifecycle != ToneLifecycle::Running {
            return;
        }

        let target_hz = match gap {
            Some((top, bottom)) => target_frequency(bird_y, top, bottom),
            None => SAFE_HZ,
        };
        let start_secs = self.now_secs();
        self.ramp = Some(FreqRamp {
            target_hz,
            start_secs,
            duration_secs: GLIDE_SECS,
        });

        #[cfg(target_arch = "wasm32")]
        if let Some(graph) = &self.graph {
            // Cancel-and-reschedule: anchor at the oscillator's current value
            // so the glide is continuous, never a jump.
            let freq = graph.osc.frequency();
            freq.cancel_scheduled_values(start_secs).ok();
            freq.set_value_at_time(freq.value(), start_secs).ok();
            freq.linear_ramp_to_value_at_time(target_hz, start_secs + GLIDE_SECS)
                .ok();
        }
    }

    fn now_secs(&self) -> f64 {
        #[cfg(target_arch = "wasm32")]
        if let Some(graph) = &self.graph {
            return graph.ctx.current_time();
        }
        0.0
    }
}

impl Default for ProximityTone {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Reference gap: top = 100, bottom = 270, center = 185, half-gap = 85
    const TOP: f32 = 100.0;
    const BOTTOM: f32 = 270.0;

    #[test]
    fn test_center_is_neutral() {
        assert_eq!(target_frequency(185.0, TOP, BOTTOM), SAFE_HZ);
    }

    #[test]
    fn test_upper_boundary_is_high_alarm() {
        // At the upper boundary the normalized offset is exactly 1
        assert_eq!(target_frequency(TOP, TOP, BOTTOM), DANGER_HIGH_HZ);
    }

    #[test]
    fn test_lower_boundary_is_low_drone() {
        assert_eq!(target_frequency(BOTTOM, TOP, BOTTOM), DANGER_LOW_HZ);
    }

    #[test]
    fn test_overshoot_saturates() {
        // Far above the boundary: capped at OVERSHOOT_LIMIT, then clamped
        let far_up = target_frequency(-1000.0, TOP, BOTTOM);
        assert_eq!(
            far_up,
            (SAFE_HZ + (DANGER_HIGH_HZ - SAFE_HZ) * OVERSHOOT_LIMIT.powf(RESPONSE_EXPONENT))
                .clamp(DANGER_LOW_HZ, MAX_HZ)
        );
        // Far below: the low side clamps at the floor
        assert_eq!(target_frequency(1000.0, TOP, BOTTOM), DANGER_LOW_HZ);
    }

    #[test]
    fn test_concave_response() {
        // Halfway to the boundary should already be past the midpoint pitch
        let halfway = target_frequency(185.0 - 42.5, TOP, BOTTOM);
        let midpoint = (SAFE_HZ + DANGER_HIGH_HZ) / 2.0;
        assert!(halfway > midpoint);
    }

    #[test]
    fn test_update_is_noop_before_start() {
        let mut tone = ProximityTone::new();
        tone.update(50.0, Some((TOP, BOTTOM)));
        assert_eq!(tone.lifecycle(), ToneLifecycle::Uninitialized);
        assert!(tone.current_ramp().is_none());
    }

    #[test]
    fn test_stop_is_noop_before_start() {
        let mut tone = ProximityTone::new();
        tone.stop();
        assert_eq!(tone.lifecycle(), ToneLifecycle::Uninitialized);
    }

    #[test]
    fn test_start_then_update_schedules_ramp() {
        let mut tone = ProximityTone::new();
        tone.start();
        assert_eq!(tone.lifecycle(), ToneLifecycle::Running);

        tone.update(TOP, Some((TOP, BOTTOM)));
        let ramp = tone.current_ramp().unwrap();
        assert_eq!(ramp.target_hz, DANGER_HIGH_HZ);
        assert_eq!(ramp.duration_secs, GLIDE_SECS);
    }

    #[test]
    fn test_latest_update_wins() {
        let mut tone = ProximityTone::new();
        tone.start();
        tone.update(TOP, Some((TOP, BOTTOM)));
        tone.update(185.0, Some((TOP, BOTTOM)));
        assert_eq!(tone.current_ramp().unwrap().target_hz, SAFE_HZ);
    }

    #[test]
    fn test_update_without_gap_is_neutral() {
        let mut tone = ProximityTone::new();
        tone.start();
        tone.update(42.0, None);
        assert_eq!(tone.current_ramp().unwrap().target_hz, SAFE_HZ);
    }

    #[test]
    fn test_stop_then_immediate_start_is_running() {
        let mut tone = ProximityTone::new();
        tone.start();
        tone.stop();
        assert_eq!(tone.lifecycle(), ToneLifecycle::Idle);
        tone.start();
        assert_eq!(tone.lifecycle(), ToneLifecycle::Running);
        // Updates flow again after the restart
        tone.update(200.0, Some((TOP, BOTTOM)));
        assert!(tone.current_ramp().is_some());
    }

    #[test]
    fn test_update_ignored_while_stopped() {
        let mut tone = ProximityTone::new();
        tone.start();
        tone.update(185.0, Some((TOP, BOTTOM)));
        tone.stop();
        tone.update(TOP, Some((TOP, BOTTOM)));
        // The ramp from before the stop is still the last one scheduled
        assert_eq!(tone.current_ramp().unwrap().target_hz, SAFE_HZ);
    }

    proptest! {
        #[test]
        fn prop_frequency_always_clamped(
            y in -2000.0f32..2000.0,
            top in 0.0f32..400.0,
            gap in 1.0f32..400.0,
        ) {
            let hz = target_frequency(y, top, top + gap);
            prop_assert!(hz >= DANGER_LOW_HZ);
            prop_assert!(hz <= MAX_HZ);
        }

        #[test]
        fn prop_above_center_rises_below_center_falls(off in 1.0f32..85.0) {
            let center = (TOP + BOTTOM) / 2.0;
            prop_assert!(target_frequency(center - off, TOP, BOTTOM) > SAFE_HZ);
            prop_assert!(target_frequency(center + off, TOP, BOTTOM) < SAFE_HZ);
        }
    }
}
