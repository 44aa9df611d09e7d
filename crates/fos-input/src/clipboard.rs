//! Clipboard access
//!
//! Copy goes through the [`Clipboard`] trait so dispatch can run without
//! a display server.

#[cfg(target_os = "linux")]
use std::process::{Command, Stdio};

/// Clipboard backend
pub trait Clipboard: std::fmt::Debug {
    /// Read text from clipboard
    fn read_text(&mut self) -> Option<String>;

    /// Write text to clipboard; returns whether it was stored
    fn write_text(&mut self, text: &str) -> bool;
}

/// Process-local clipboard
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Option<String> {
        self.contents.clone()
    }

    fn write_text(&mut self, text: &str) -> bool {
        self.contents = Some(text.to_string());
        true
    }
}

/// X11 clipboard through `xclip`, falling back to `xsel`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    /// Check if a clipboard tool is installed
    pub fn is_available(&self) -> bool {
        #[cfg(target_os = "linux")]
        {
            ["xclip", "xsel"].iter().any(|tool| {
                Command::new("which")
                    .arg(tool)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .map(|s| s.success())
                    .unwrap_or(false)
            })
        }

        #[cfg(not(target_os = "linux"))]
        {
            false
        }
    }
}

impl Clipboard for SystemClipboard {
    fn read_text(&mut self) -> Option<String> {
        #[cfg(target_os = "linux")]
        {
            let output = Command::new("xclip")
                .args(["-selection", "clipboard", "-o"])
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .output()
                .or_else(|_| {
                    Command::new("xsel")
                        .args(["--clipboard", "--output"])
                        .stdout(Stdio::piped())
                        .stderr(Stdio::null())
                        .output()
                })
                .ok()?;

            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            None
        }
    }

    fn write_text(&mut self, text: &str) -> bool {
        #[cfg(target_os = "linux")]
        {
            use std::io::Write;

            let spawned = Command::new("xclip")
                .args(["-selection", "clipboard"])
                .stdin(Stdio::piped())
                .stderr(Stdio::null())
                .spawn()
                .or_else(|_| {
                    Command::new("xsel")
                        .args(["--clipboard", "--input"])
                        .stdin(Stdio::piped())
                        .stderr(Stdio::null())
                        .spawn()
                });

            let Ok(mut child) = spawned else {
                tracing::warn!("no clipboard tool available");
                return false;
            };
            let written = child
                .stdin
                .take()
                .is_some_and(|mut stdin| stdin.write_all(text.as_bytes()).is_ok());
            let exited = child.wait().map(|s| s.success()).unwrap_or(false);
            written && exited
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = text;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read_text(), None);
        assert!(clipboard.write_text("copied"));
        assert_eq!(clipboard.read_text().as_deref(), Some("copied"));
        assert_eq!(clipboard.contents(), Some("copied"));
    }

    #[test]
    fn test_system_clipboard_available() {
        // Just check that the probe doesn't panic
        let _ = SystemClipboard::new().is_available();
    }
}
