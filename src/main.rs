//! Echo Flap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, CloseEvent, HtmlCanvasElement, KeyboardEvent, MessageEvent,
        MouseEvent, WebSocket,
    };

    use echo_flap::audio::{AudioManager, SoundEffect};
    use echo_flap::consts::*;
    use echo_flap::input::{self, ControlMode, RawInput};
    use echo_flap::render::Renderer;
    use echo_flap::score::BestScore;
    use echo_flap::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use echo_flap::sonifier::ProximityTone;

    /// Local face-tracking bridge endpoint
    const FACE_SIGNAL_URL: &str = "ws://localhost:8765";
    /// Backoff before retrying a dropped face-channel connection
    const RECONNECT_DELAY_MS: i32 = 2000;

    /// Connection status shown by the UI indicator
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum ChannelStatus {
        /// Indicator hidden (not in a face mode)
        Hidden,
        Disconnected,
        Connecting,
        Connected,
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: TickInput,
        mode: ControlMode,
        audio: AudioManager,
        tone: ProximityTone,
        best: BestScore,
        renderer: Renderer,
        accumulator: f32,
        last_time: f64,
        socket: Option<WebSocket>,
    }

    impl Game {
        fn new(seed: u64, renderer: Renderer) -> Self {
            Self {
                state: GameState::new(seed),
                input: TickInput::default(),
                mode: ControlMode::default(),
                audio: AudioManager::new(),
                tone: ProximityTone::new(),
                best: BestScore::load(),
                renderer,
                accumulator: 0.0,
                last_time: 0.0,
                socket: None,
            }
        }

        /// Latch a trigger if the raw input routes through the active mode
        fn handle_raw(&mut self, raw: &RawInput<'_>) {
            if input::route(raw, self.mode).is_some() {
                self.input.trigger = true;
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= TICK_SECS && substeps < MAX_SUBSTEPS {
                let input = self.input;
                tick(&mut self.state, &input);
                self.apply_tick_effects();
                self.accumulator -= TICK_SECS;
                substeps += 1;

                // Clear one-shot input after processing
                self.input.trigger = false;
            }
        }

        /// Map sim events onto sounds and tone-engine transitions, then feed
        /// the tone engine the current gap while playing.
        fn apply_tick_effects(&mut self) {
            for i in 0..self.state.events.len() {
                match self.state.events[i] {
                    GameEvent::Started => {
                        self.audio.play(SoundEffect::Swoosh);
                        if self.mode.sonified() {
                            self.tone.start();
                        }
                    }
                    GameEvent::Flapped => self.audio.play(SoundEffect::Flap),
                    GameEvent::Scored => self.audio.play(SoundEffect::Score),
                    GameEvent::Collided => {
                        self.audio.play(SoundEffect::Hit);
                        self.tone.stop();
                        if self.best.record(self.state.score) {
                            log::info!("New best score: {}", self.best.value());
                        }
                    }
                    GameEvent::Landed => self.audio.play(SoundEffect::Die),
                    GameEvent::Reset => self.audio.play(SoundEffect::Swoosh),
                }
            }

            if self.state.phase == GamePhase::Playing && self.mode.sonified() {
                self.tone
                    .update(self.state.bird.pos.y, self.state.nearest_gap());
            }
        }

        /// Render the current frame
        fn render(&self) {
            self.renderer.draw(&self.state, self.best.value());
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("best") {
                el.set_text_content(Some(&self.best.value().to_string()));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Echo Flap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(VIEW_W as u32);
        canvas.set_height(VIEW_H as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, Renderer::new(ctx))));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_mode_buttons(game.clone());
        update_mode_buttons(ControlMode::default());
        set_status(ChannelStatus::Hidden);

        // Start game loop
        request_animation_frame(game);

        log::info!("Echo Flap running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer press - also unlocks audio on the first user gesture
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.handle_raw(&RawInput::PointerPress);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard - always-active fallback triggers
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if input::TRIGGER_KEYS.contains(&key.as_str()) {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.handle_raw(&RawInput::KeyPress(key.as_str()));
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    const MODE_BUTTONS: [(&str, ControlMode); 4] = [
        ("mode-pointer", ControlMode::Pointer),
        ("mode-sonified", ControlMode::PointerSonified),
        ("mode-mouth", ControlMode::Mouth),
        ("mode-eyebrow", ControlMode::Eyebrow),
    ];

    fn setup_mode_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        for (id, mode) in MODE_BUTTONS {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing mode button #{}", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                set_mode(&game, mode);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Switch the control mode, managing the tone engine and face channel
    fn set_mode(game: &Rc<RefCell<Game>>, mode: ControlMode) {
        let (old_mode, phase) = {
            let g = game.borrow();
            (g.mode, g.state.phase)
        };
        if old_mode == mode {
            return;
        }

        {
            let mut g = game.borrow_mut();
            g.mode = mode;
            // The tone engine follows the mode immediately mid-game
            if old_mode.sonified() && !mode.sonified() {
                g.tone.stop();
            } else if mode.sonified() && !old_mode.sonified() && phase == GamePhase::Playing {
                g.tone.start();
            }
        }

        if old_mode.uses_face_channel() && !mode.uses_face_channel() {
            disconnect_channel(game);
        } else if mode.uses_face_channel() && game.borrow().socket.is_none() {
            connect_channel(game.clone());
        }

        update_mode_buttons(mode);
        log::info!("Control mode: {}", mode.as_str());
    }

    /// Open the face channel and wire its handlers. An unexpected close
    /// schedules a delayed reconnect for as long as a face mode is selected.
    fn connect_channel(game: Rc<RefCell<Game>>) {
        let ws = match WebSocket::new(FACE_SIGNAL_URL) {
            Ok(ws) => ws,
            Err(err) => {
                log::warn!("Face channel connect failed: {:?}", err);
                set_status(ChannelStatus::Disconnected);
                schedule_reconnect(game);
                return;
            }
        };
        set_status(ChannelStatus::Connecting);

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                log::info!("Face channel connected");
                set_status(ChannelStatus::Connected);
            });
            ws.set_onopen(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MessageEvent| {
                let Some(text) = event.data().as_string() else {
                    return;
                };
                match input::parse_signal(&text) {
                    Ok(Some(signal)) => game.borrow_mut().handle_raw(&RawInput::Signal(signal)),
                    Ok(None) => {}
                    Err(err) => log::warn!("Malformed face-channel payload: {}", err),
                }
            });
            ws.set_onmessage(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: CloseEvent| {
                game.borrow_mut().socket = None;
                set_status(ChannelStatus::Disconnected);
                if game.borrow().mode.uses_face_channel() {
                    log::warn!(
                        "Face channel closed (code {}), retrying in {} ms",
                        event.code(),
                        RECONNECT_DELAY_MS
                    );
                    schedule_reconnect(game.clone());
                }
            });
            ws.set_onclose(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            // The close event follows; just log here
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                log::warn!("Face channel error");
            });
            ws.set_onerror(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        game.borrow_mut().socket = Some(ws);
    }

    /// Deliberate close: detach handlers first so no reconnect is scheduled
    fn disconnect_channel(game: &Rc<RefCell<Game>>) {
        if let Some(ws) = game.borrow_mut().socket.take() {
            ws.set_onclose(None);
            ws.set_onerror(None);
            ws.set_onmessage(None);
            ws.set_onopen(None);
            let _ = ws.close();
            log::info!("Face channel closed");
        }
        set_status(ChannelStatus::Hidden);
    }

    fn schedule_reconnect(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move || {
            let still_wanted = {
                let g = game.borrow();
                g.mode.uses_face_channel() && g.socket.is_none()
            };
            if still_wanted {
                connect_channel(game);
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            RECONNECT_DELAY_MS,
        );
        closure.forget();
    }

    fn update_mode_buttons(mode: ControlMode) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        for (id, m) in MODE_BUTTONS {
            if let Some(btn) = document.get_element_by_id(id) {
                let class = if m == mode { "mode-btn active" } else { "mode-btn" };
                let _ = btn.set_attribute("class", class);
            }
        }
    }

    fn set_status(status: ChannelStatus) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(el) = document.get_element_by_id("status") else {
            return;
        };
        let class = match status {
            ChannelStatus::Hidden => "status hidden",
            ChannelStatus::Disconnected => "status disconnected",
            ChannelStatus::Connecting => "status connecting",
            ChannelStatus::Connected => "status connected",
        };
        let _ = el.set_attribute("class", class);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                TICK_SECS
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Echo Flap (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    println!("\nRunning smoke simulation...");
    smoke_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn smoke_run() {
    use echo_flap::consts::BIRD_SPAWN_Y;
    use echo_flap::sim::{GamePhase, GameState, TickInput, tick};

    let mut state = GameState::new(7);
    tick(&mut state, &TickInput { trigger: true });
    assert_eq!(state.phase, GamePhase::Playing);

    // Fly with a keep-to-gap-center policy for a while
    for _ in 0..5000u32 {
        if state.phase == GamePhase::Over {
            break;
        }
        let target = state
            .nearest_gap()
            .map(|(top, bottom)| (top + bottom) / 2.0)
            .unwrap_or(BIRD_SPAWN_Y);
        let input = TickInput {
            trigger: state.bird.pos.y > target,
        };
        tick(&mut state, &input);
    }
    assert!(state.score > 0, "Pilot policy should clear pipes");
    println!(
        "✓ Simulated {} ticks, score {}",
        state.time_ticks, state.score
    );
}
