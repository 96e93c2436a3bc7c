//! Best-score persistence
//!
//! A single monotonic value kept in LocalStorage. Storage failures degrade to
//! session-only tracking; the current run's score is never affected.

/// LocalStorage key (used only in wasm32)
#[allow(dead_code)]
const STORAGE_KEY: &str = "echo_flap_best";

/// The persisted best score
#[derive(Debug, Clone, Copy, Default)]
pub struct BestScore {
    value: u32,
}

impl BestScore {
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Fold a finished run's score in. Returns true when it set (and
    /// persisted) a new best.
    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.value {
            return false;
        }
        self.value = score;
        self.save();
        true
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(raw)) = storage.get_item(STORAGE_KEY) {
                if let Ok(value) = raw.parse::<u32>() {
                    log::info!("Loaded best score: {}", value);
                    return Self { value };
                }
            }
        }

        log::info!("No stored best score, starting fresh");
        Self::default()
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(STORAGE_KEY, &self.value.to_string());
            log::info!("Best score saved ({})", self.value);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save(&self) {
        // No-op for native
    }
}
