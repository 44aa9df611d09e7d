//! fOS Frame
//!
//! Per-frame scene pipeline: composed-tree collection, picking readback
//! and input dispatch behind one owner.
//!
//! # Example
//! ```rust,ignore
//! use fos_frame::{Config, Frame};
//!
//! let mut frame: Frame<MyCommand> = Frame::new(Config::default());
//! let root = frame.tree_mut().create_root();
//! frame.prepare(root, &provider);
//! // backend draws frame.render_list().paint_order()
//! frame.handle_input(&event, &mut backend, &mut events);
//! ```

mod config;
mod frame;

pub use config::{CollectConfig, Config, ConfigError};
pub use frame::Frame;

// Re-export sub-crates for advanced usage
pub use fos_input as input;
pub use fos_paint as paint;
pub use fos_scene as scene;

/// Frame pipeline version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
