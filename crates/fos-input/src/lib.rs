//! fOS Input - Event dispatch
//!
//! Turns platform pointer and keyboard input into element, text and
//! virtual child events. Targets come from the picking buffer; routing
//! follows the composed tree.

mod clipboard;
mod config;
mod drag;
mod event;
mod events;
mod hover;
mod selection;
mod state;

pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use config::InputConfig;
pub use drag::VirtualDrag;
pub use event::{InputEvent, Key, KeyChord, Modifiers, MouseButton};
pub use events::{DispatchedEvent, EventKind, EventSink, Target, composed_path};
pub use hover::{HoverTransition, hover_transition};
pub use selection::{Selection, SelectionManager, SelectionType, TextPoint, word_bounds};
pub use state::InputState;
