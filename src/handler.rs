/*
 * The fixed capability set a shell routes messages to. The seam is a trait
 * whose methods all default to no-ops, so an implementor overrides only the
 * hooks it cares about. The window procedure is monomorphized per handler
 * type, so dispatch stays static.
 */

use crate::{surface::PaintSurface, types::MouseButton};

/// Per-window behavior bound to a shell. Hooks run to completion on the
/// thread driving the pump; returning from a hook returns control to the
/// caller's message loop.
pub trait WindowHandler {
    /// A paint pass. The surface is only valid for the duration of the
    /// call; the paint session closes as soon as the hook returns.
    fn on_paint(&mut self, _surface: &mut PaintSurface) {}

    /// A key went down. `key` is the raw virtual-key code.
    fn on_key_down(&mut self, _key: u32) {}

    /// A key came up.
    fn on_key_up(&mut self, _key: u32) {}

    fn on_mouse_button_down(&mut self, _button: MouseButton) {}

    fn on_mouse_button_up(&mut self, _button: MouseButton) {}

    /// Pointer moved to client coordinates (`x`, `y`). Coordinates can be
    /// negative when the capture extends past the client area.
    fn on_mouse_move(&mut self, _x: i32, _y: i32) {}

    /// The window received a close request. Quit is posted to the message
    /// queue after this returns, unconditionally.
    fn on_close(&mut self) {}

    /// Escape hatch for messages outside the routed set. Return `true` to
    /// mark the message handled; `false` falls through to the platform's
    /// default processing.
    fn handle_other(&mut self, _msg: u32) -> bool {
        false
    }
}
