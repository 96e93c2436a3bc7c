//! Control modes and trigger routing
//!
//! Every input source funnels into one logical trigger action; which sources
//! are live depends on the selected control mode. Routing is a pure function
//! so the whole gating matrix is unit-testable without a browser.

use serde::Deserialize;

/// Keys that produce a trigger in every mode (keyboard is always a fallback)
pub const TRIGGER_KEYS: [&str; 3] = [" ", "ArrowUp", "Enter"];

/// The selected input modality. One per session, set from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Pointer + keyboard, no audio feedback
    #[default]
    Pointer,
    /// Pointer + keyboard with the gap tone enabled
    PointerSonified,
    /// Face channel: mouth-open events trigger
    Mouth,
    /// Face channel: eyebrow-raise events trigger
    Eyebrow,
}

impl ControlMode {
    /// Whether this mode drives the proximity tone engine
    pub fn sonified(&self) -> bool {
        matches!(self, ControlMode::PointerSonified)
    }

    /// Whether this mode consumes events from the face-tracking channel
    pub fn uses_face_channel(&self) -> bool {
        matches!(self, ControlMode::Mouth | ControlMode::Eyebrow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Pointer => "pointer",
            ControlMode::PointerSonified => "pointer+tone",
            ControlMode::Mouth => "mouth",
            ControlMode::Eyebrow => "eyebrow",
        }
    }
}

/// A discrete event from the face-tracking collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    MouthOpen,
    EyebrowRaise,
}

/// A raw input occurrence, before mode gating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput<'a> {
    /// Pointer press on the game surface
    PointerPress,
    /// Key press, by DOM key value
    KeyPress(&'a str),
    /// Inbound face-channel event
    Signal(SignalEvent),
}

/// The one action the rest of the game understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerAction;

/// Route a raw input through the active control mode.
///
/// Keyboard triggers always fire; pointer presses are ignored in the face
/// modes; face events only fire in their matching mode.
pub fn route(input: &RawInput<'_>, mode: ControlMode) -> Option<TriggerAction> {
    match input {
        RawInput::KeyPress(key) => TRIGGER_KEYS.contains(key).then_some(TriggerAction),
        RawInput::PointerPress => (!mode.uses_face_channel()).then_some(TriggerAction),
        RawInput::Signal(SignalEvent::MouthOpen) => {
            (mode == ControlMode::Mouth).then_some(TriggerAction)
        }
        RawInput::Signal(SignalEvent::EyebrowRaise) => {
            (mode == ControlMode::Eyebrow).then_some(TriggerAction)
        }
    }
}

/// Wire envelope for face-channel payloads: `{"type": "...", ...}`
#[derive(Debug, Deserialize)]
struct SignalEnvelope {
    #[serde(rename = "type")]
    kind: String,
}

/// Parse one face-channel message.
///
/// `Err` means the payload was malformed (caller logs and ignores it);
/// `Ok(None)` is a well-formed message of no interest here - the tracker
/// also streams cursor "move" updates every frame.
pub fn parse_signal(raw: &str) -> Result<Option<SignalEvent>, serde_json::Error> {
    let envelope: SignalEnvelope = serde_json::from_str(raw)?;
    Ok(match envelope.kind.as_str() {
        "click" => Some(SignalEvent::MouthOpen),
        "eyebrow" => Some(SignalEvent::EyebrowRaise),
        _ => None,
    })
}
