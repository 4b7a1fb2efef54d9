use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::features::placement::PlacementController;
use crate::features::signing::SigningSession;
use crate::store::{DocumentStore, MemoryStore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Screen {
    /// Document list; doubles as the post-save summary.
    Documents,
    Editor,
    Signing,
}

pub struct AppState {
    pub nav_stack: Vec<Screen>,
    pub store: Box<dyn DocumentStore + Send>,
    pub editor: PlacementController,
    pub signing: Option<SigningSession>,
    pub config: Config,
    pub last_error: Option<String>,
    pub last_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()), Config::from_env())
    }

    pub fn with_store(store: Box<dyn DocumentStore + Send>, config: Config) -> Self {
        Self {
            nav_stack: Vec::new(),
            store,
            editor: PlacementController::new(),
            signing: None,
            config,
            last_error: None,
            last_message: None,
        }
    }

    pub fn ensure_navigation(&mut self) {
        if self.nav_stack.is_empty() {
            self.nav_stack.push(Screen::Documents);
        }
    }

    pub fn current_screen(&self) -> Screen {
        self.nav_stack.last().copied().unwrap_or(Screen::Documents)
    }

    pub fn nav_depth(&self) -> usize {
        let depth = self.nav_stack.len();
        if depth == 0 { 1 } else { depth }
    }

    pub fn push_screen(&mut self, screen: Screen) {
        self.ensure_navigation();
        if self.current_screen() == screen {
            return;
        }
        self.nav_stack.push(screen);
    }

    pub fn pop_screen(&mut self) {
        self.ensure_navigation();
        if self.nav_stack.len() > 1 {
            self.nav_stack.pop();
        }
    }

    pub fn reset_navigation(&mut self) {
        self.nav_stack.clear();
        self.nav_stack.push(Screen::Documents);
    }
}
