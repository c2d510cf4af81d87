/*
 * Platform-agnostic types shared across the crate: the window configuration
 * handed to `WindowShell::new`, the pump status reported by the two pump
 * operations, and the logical mouse button identity. Keeping these free of
 * Win32 types lets configuration logic compile and test on every platform;
 * the Windows side wraps the raw values into `WINDOW_STYLE` et al. at the
 * call site.
 */

/// Win32 sentinel meaning "let the platform pick" for window geometry.
pub const CW_USEDEFAULT: i32 = 0x8000_0000_u32 as i32;

/// Default top-level window style (`WS_OVERLAPPEDWINDOW`).
pub const WS_OVERLAPPEDWINDOW: u32 = 0x00CF_0000;

/// Default extended style (`WS_EX_COMPOSITED`): double-buffered painting.
pub const WS_EX_COMPOSITED: u32 = 0x0200_0000;

/// Logical identity of a mouse button, normalized from the per-button
/// down/up message ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Outcome of one pump call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// A message was retrieved, translated, and dispatched.
    Dispatched,
    /// Nothing was pending (`poll_message` only); the call was a no-op.
    Empty,
    /// The quit message was retrieved; the caller should leave its loop.
    Quit,
}

/// Construction parameters for a shell window. Only the title is required;
/// geometry defaults to platform-chosen placement and the styles default to
/// an overlapped, composited top-level window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
    pub style: u32,
    pub ex_style: u32,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: CW_USEDEFAULT,
            height: CW_USEDEFAULT,
            x: CW_USEDEFAULT,
            y: CW_USEDEFAULT,
            style: WS_OVERLAPPEDWINDOW,
            ex_style: WS_EX_COMPOSITED,
        }
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn style(mut self, style: u32) -> Self {
        self.style = style;
        self
    }

    pub fn ex_style(mut self, ex_style: u32) -> Self {
        self.ex_style = ex_style;
        self
    }
}
