//! Recording stand-ins for the action playback collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use lightyears_core::{PlaybackUi, SpecialActions};

/// One action the replay engine dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// Delivered to [`PlaybackUi::playback_action`].
    Positional { name: String, data: Vec<u8> },
    /// Delivered to [`SpecialActions::special_action`].
    Special { name: String },
}

/// Shared, ordered log of dispatched actions.
///
/// The UI and game stand-ins handed out by [`ui`](Self::ui) and
/// [`game`](Self::game) append to the same log, so the relative order of
/// positional and special actions is preserved.
#[derive(Clone, Debug, Default)]
pub struct ActionLog {
    entries: Rc<RefCell<Vec<Dispatched>>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ui(&self) -> RecordingUi {
        RecordingUi { log: self.clone() }
    }

    pub fn game(&self) -> RecordingGame {
        RecordingGame { log: self.clone() }
    }

    pub fn entries(&self) -> Vec<Dispatched> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn push(&self, d: Dispatched) {
        self.entries.borrow_mut().push(d);
    }
}

/// [`PlaybackUi`] that appends to an [`ActionLog`].
#[derive(Clone, Debug)]
pub struct RecordingUi {
    log: ActionLog,
}

impl PlaybackUi for RecordingUi {
    fn playback_action(&mut self, name: &str, object_data: &[u8]) {
        self.log.push(Dispatched::Positional {
            name: name.to_string(),
            data: object_data.to_vec(),
        });
    }
}

/// [`SpecialActions`] that appends to an [`ActionLog`].
#[derive(Clone, Debug)]
pub struct RecordingGame {
    log: ActionLog,
}

impl SpecialActions for RecordingGame {
    fn special_action(&mut self, name: &str) {
        self.log.push(Dispatched::Special {
            name: name.to_string(),
        });
    }
}
