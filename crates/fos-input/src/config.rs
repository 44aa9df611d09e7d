//! Input configuration

use serde::{Deserialize, Serialize};

use crate::event::{Key, KeyChord, Modifiers};

/// Input behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Chord that copies the selection while text has focus
    pub copy_chord: KeyChord,
    /// Shift+press on text extends the selection instead of moving the caret
    pub shift_extends_selection: bool,
    /// Double-click on text selects the word under the pointer
    pub double_click_selects_word: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            copy_chord: KeyChord::new(Key::Char('c'), Modifiers::CTRL),
            shift_extends_selection: true,
            double_click_selects_word: true,
        }
    }
}
