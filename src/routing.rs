/*
 * Platform-independent message routing: decoding raw window messages into
 * `ShellEvent`s and dispatching them to a `WindowHandler` through the
 * `ShellOps` capability surface. Keeping this free of Win32 calls lets the
 * routing table be unit tested on any platform; the Windows window procedure
 * in `shell` is a thin adapter over `dispatch_message`.
 */

use crate::{handler::WindowHandler, surface::PaintSurface, types::MouseButton};

// Message ids from the Win32 protocol, spelled raw so decode stays portable.
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_QUIT: u32 = 0x0012;
pub const WM_PAINT: u32 = 0x000F;
pub const WM_NCCREATE: u32 = 0x0081;
pub const WM_NCDESTROY: u32 = 0x0082;
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;

/// One raw window message, mirrored portably from the wndproc parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage {
    pub msg: u32,
    pub wparam: usize,
    pub lparam: isize,
}

/// The routed class of a message, after decoding and normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    Paint,
    KeyDown(u32),
    KeyUp(u32),
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),
    MouseMove { x: i32, y: i32 },
    Close,
    /// Anything outside the fixed routed set; carries the raw message id.
    Other(u32),
}

/// What the window procedure should do after routing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler consumed the message; report success to the platform.
    Handled,
    /// Nobody claimed the message; hand it to default platform processing.
    PassThrough(u32),
}

/// Side effects the dispatcher needs from the platform: opening and closing
/// a paint session around the paint hook, and posting the quit signal. The
/// Windows implementation lives in `shell`; tests substitute a recording
/// implementation.
pub trait ShellOps {
    /// Runs `body` inside an open paint session. Implementations must close
    /// the session even if `body` unwinds.
    fn with_paint_session(&mut self, body: &mut dyn FnMut(&mut PaintSurface));

    /// Posts the quit signal that ends the caller's pump loop.
    fn post_quit(&mut self);
}

#[inline]
pub(crate) fn x_from_lparam(lparam: isize) -> i32 {
    // Low word, sign-extended: multi-monitor coordinates can be negative.
    (lparam & 0xFFFF) as u16 as i16 as i32
}

#[inline]
pub(crate) fn y_from_lparam(lparam: isize) -> i32 {
    ((lparam >> 16) & 0xFFFF) as u16 as i16 as i32
}

/// Maps a raw message onto the fixed event set the shell understands.
pub fn decode_message(raw: RawMessage) -> ShellEvent {
    match raw.msg {
        WM_PAINT => ShellEvent::Paint,
        WM_KEYDOWN => ShellEvent::KeyDown(raw.wparam as u32),
        WM_KEYUP => ShellEvent::KeyUp(raw.wparam as u32),
        WM_LBUTTONDOWN => ShellEvent::MouseButtonDown(MouseButton::Left),
        WM_MBUTTONDOWN => ShellEvent::MouseButtonDown(MouseButton::Middle),
        WM_RBUTTONDOWN => ShellEvent::MouseButtonDown(MouseButton::Right),
        WM_LBUTTONUP => ShellEvent::MouseButtonUp(MouseButton::Left),
        WM_MBUTTONUP => ShellEvent::MouseButtonUp(MouseButton::Middle),
        WM_RBUTTONUP => ShellEvent::MouseButtonUp(MouseButton::Right),
        WM_MOUSEMOVE => ShellEvent::MouseMove {
            x: x_from_lparam(raw.lparam),
            y: y_from_lparam(raw.lparam),
        },
        WM_CLOSE => ShellEvent::Close,
        other => ShellEvent::Other(other),
    }
}

/// Routes one raw message to the handler's hooks.
///
/// Paint messages run inside a bracketed paint session supplied by `ops`;
/// close messages post quit after the hook returns, unconditionally. Events
/// nobody claims pass through to default platform processing.
pub fn dispatch_message<H, O>(handler: &mut H, raw: RawMessage, ops: &mut O) -> DispatchOutcome
where
    H: WindowHandler + ?Sized,
    O: ShellOps + ?Sized,
{
    match decode_message(raw) {
        ShellEvent::Paint => {
            ops.with_paint_session(&mut |surface| handler.on_paint(surface));
            DispatchOutcome::Handled
        }
        ShellEvent::KeyDown(key) => {
            handler.on_key_down(key);
            DispatchOutcome::Handled
        }
        ShellEvent::KeyUp(key) => {
            handler.on_key_up(key);
            DispatchOutcome::Handled
        }
        ShellEvent::MouseButtonDown(button) => {
            handler.on_mouse_button_down(button);
            DispatchOutcome::Handled
        }
        ShellEvent::MouseButtonUp(button) => {
            handler.on_mouse_button_up(button);
            DispatchOutcome::Handled
        }
        ShellEvent::MouseMove { x, y } => {
            handler.on_mouse_move(x, y);
            DispatchOutcome::Handled
        }
        ShellEvent::Close => {
            handler.on_close();
            ops.post_quit();
            DispatchOutcome::Handled
        }
        ShellEvent::Other(msg) => {
            if handler.handle_other(msg) {
                DispatchOutcome::Handled
            } else {
                DispatchOutcome::PassThrough(msg)
            }
        }
    }
}

/// Resolves the per-window state pointer for one message. The first creation
/// notification carries the pointer in its creation payload and stores it in
/// the window's user-data slot; every later message reads the slot. A zero
/// result means no association exists yet and the message should fall through
/// to default processing.
pub fn resolve_association(
    msg: u32,
    load_slot: impl FnOnce() -> isize,
    creation_payload: impl FnOnce() -> isize,
    store_slot: impl FnOnce(isize),
) -> isize {
    if msg == WM_NCCREATE {
        let pointer = creation_payload();
        store_slot(pointer);
        pointer
    } else {
        load_slot()
    }
}

/// Runs `body` between `begin` and `end`, with `end` guaranteed to run even
/// when `body` unwinds. This is the primitive behind the paint-session
/// bracketing contract.
pub fn with_bracketed_session<T, B, E, F>(begin: B, end: E, body: F)
where
    B: FnOnce() -> T,
    E: FnOnce(T),
    F: FnOnce(&mut T),
{
    struct Guard<T, E: FnOnce(T)> {
        token: Option<T>,
        end: Option<E>,
    }

    impl<T, E: FnOnce(T)> Drop for Guard<T, E> {
        fn drop(&mut self) {
            if let (Some(token), Some(end)) = (self.token.take(), self.end.take()) {
                end(token);
            }
        }
    }

    let mut guard = Guard {
        token: Some(begin()),
        end: Some(end),
    };
    if let Some(token) = guard.token.as_mut() {
        body(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    fn raw(msg: u32, wparam: usize, lparam: isize) -> RawMessage {
        RawMessage {
            msg,
            wparam,
            lparam,
        }
    }

    fn pack_coords(x: i16, y: i16) -> isize {
        ((y as u16 as isize) << 16) | (x as u16 as isize)
    }

    #[derive(Default)]
    struct RecordingHandler {
        paints: usize,
        key_downs: Vec<u32>,
        key_ups: Vec<u32>,
        button_downs: Vec<MouseButton>,
        button_ups: Vec<MouseButton>,
        moves: Vec<(i32, i32)>,
        closes: usize,
        others: Vec<u32>,
        claim_others: bool,
        panic_in_paint: bool,
    }

    impl WindowHandler for RecordingHandler {
        fn on_paint(&mut self, _surface: &mut PaintSurface) {
            self.paints += 1;
            if self.panic_in_paint {
                panic!("paint hook failure");
            }
        }
        fn on_key_down(&mut self, key: u32) {
            self.key_downs.push(key);
        }
        fn on_key_up(&mut self, key: u32) {
            self.key_ups.push(key);
        }
        fn on_mouse_button_down(&mut self, button: MouseButton) {
            self.button_downs.push(button);
        }
        fn on_mouse_button_up(&mut self, button: MouseButton) {
            self.button_ups.push(button);
        }
        fn on_mouse_move(&mut self, x: i32, y: i32) {
            self.moves.push((x, y));
        }
        fn on_close(&mut self) {
            self.closes += 1;
        }
        fn handle_other(&mut self, msg: u32) -> bool {
            self.others.push(msg);
            self.claim_others
        }
    }

    /// Test double for the platform side: counts paint-session brackets and
    /// quit posts, using the same bracketing primitive as the Windows ops.
    #[derive(Default)]
    struct RecordingOps {
        sessions_opened: Cell<usize>,
        sessions_closed: Rc<Cell<usize>>,
        quits_posted: Cell<usize>,
    }

    impl ShellOps for RecordingOps {
        fn with_paint_session(&mut self, body: &mut dyn FnMut(&mut PaintSurface)) {
            let opened = &self.sessions_opened;
            let closed = Rc::clone(&self.sessions_closed);
            with_bracketed_session(
                || {
                    opened.set(opened.get() + 1);
                    PaintSurface::detached()
                },
                move |_surface| closed.set(closed.get() + 1),
                |surface| body(surface),
            );
        }

        fn post_quit(&mut self) {
            self.quits_posted.set(self.quits_posted.get() + 1);
        }
    }

    #[test]
    fn decode_maps_every_routed_message_class() {
        assert_eq!(decode_message(raw(WM_PAINT, 0, 0)), ShellEvent::Paint);
        assert_eq!(
            decode_message(raw(WM_KEYDOWN, 0x41, 0)),
            ShellEvent::KeyDown(0x41)
        );
        assert_eq!(
            decode_message(raw(WM_KEYUP, 0x1B, 0)),
            ShellEvent::KeyUp(0x1B)
        );
        assert_eq!(decode_message(raw(WM_CLOSE, 0, 0)), ShellEvent::Close);
        assert_eq!(
            decode_message(raw(0x0400, 0, 0)),
            ShellEvent::Other(0x0400)
        );
    }

    #[test]
    fn decode_normalizes_button_identity() {
        let cases = [
            (WM_LBUTTONDOWN, ShellEvent::MouseButtonDown(MouseButton::Left)),
            (
                WM_MBUTTONDOWN,
                ShellEvent::MouseButtonDown(MouseButton::Middle),
            ),
            (
                WM_RBUTTONDOWN,
                ShellEvent::MouseButtonDown(MouseButton::Right),
            ),
            (WM_LBUTTONUP, ShellEvent::MouseButtonUp(MouseButton::Left)),
            (WM_MBUTTONUP, ShellEvent::MouseButtonUp(MouseButton::Middle)),
            (WM_RBUTTONUP, ShellEvent::MouseButtonUp(MouseButton::Right)),
        ];
        for (msg, expected) in cases {
            assert_eq!(decode_message(raw(msg, 0, 0)), expected);
        }
    }

    #[test]
    fn decode_extracts_signed_move_coordinates() {
        assert_eq!(
            decode_message(raw(WM_MOUSEMOVE, 0, pack_coords(120, 45))),
            ShellEvent::MouseMove { x: 120, y: 45 }
        );
        // Drag past the client edge produces negative coordinates; the low
        // and high words must sign-extend, not zero-extend.
        assert_eq!(
            decode_message(raw(WM_MOUSEMOVE, 0, pack_coords(-15, -2))),
            ShellEvent::MouseMove { x: -15, y: -2 }
        );
    }

    #[test]
    fn paint_dispatch_invokes_hook_once_inside_one_session() {
        let mut handler = RecordingHandler::default();
        let mut ops = RecordingOps::default();

        let outcome = dispatch_message(&mut handler, raw(WM_PAINT, 0, 0), &mut ops);

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(handler.paints, 1);
        assert_eq!(ops.sessions_opened.get(), 1);
        assert_eq!(ops.sessions_closed.get(), 1);
    }

    #[test]
    fn paint_session_closes_even_when_the_hook_panics() {
        let mut handler = RecordingHandler {
            panic_in_paint: true,
            ..Default::default()
        };
        let mut ops = RecordingOps::default();

        let result = catch_unwind(AssertUnwindSafe(|| {
            dispatch_message(&mut handler, raw(WM_PAINT, 0, 0), &mut ops);
        }));

        assert!(result.is_err());
        assert_eq!(ops.sessions_opened.get(), 1);
        assert_eq!(ops.sessions_closed.get(), 1);
    }

    #[test]
    fn close_dispatch_runs_hook_then_always_posts_quit() {
        let mut handler = RecordingHandler::default();
        let mut ops = RecordingOps::default();

        let outcome = dispatch_message(&mut handler, raw(WM_CLOSE, 0, 0), &mut ops);

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(handler.closes, 1);
        assert_eq!(ops.quits_posted.get(), 1);
    }

    #[test]
    fn quit_is_posted_regardless_of_what_the_close_hook_records() {
        // A handler that claims every "other" message still cannot veto the
        // quit signal on the close path.
        let mut handler = RecordingHandler {
            claim_others: true,
            ..Default::default()
        };
        let mut ops = RecordingOps::default();

        dispatch_message(&mut handler, raw(WM_CLOSE, 0, 0), &mut ops);

        assert_eq!(ops.quits_posted.get(), 1);
    }

    #[test]
    fn keyboard_and_mouse_dispatch_forward_raw_payloads() {
        let mut handler = RecordingHandler::default();
        let mut ops = RecordingOps::default();

        dispatch_message(&mut handler, raw(WM_KEYDOWN, 0x20, 0), &mut ops);
        dispatch_message(&mut handler, raw(WM_KEYUP, 0x20, 0), &mut ops);
        dispatch_message(&mut handler, raw(WM_RBUTTONDOWN, 0, 0), &mut ops);
        dispatch_message(&mut handler, raw(WM_RBUTTONUP, 0, 0), &mut ops);
        dispatch_message(&mut handler, raw(WM_MOUSEMOVE, 0, pack_coords(9, -1)), &mut ops);

        assert_eq!(handler.key_downs, vec![0x20]);
        assert_eq!(handler.key_ups, vec![0x20]);
        assert_eq!(handler.button_downs, vec![MouseButton::Right]);
        assert_eq!(handler.button_ups, vec![MouseButton::Right]);
        assert_eq!(handler.moves, vec![(9, -1)]);
    }

    #[test]
    fn claimed_other_messages_do_not_pass_through() {
        let mut handler = RecordingHandler {
            claim_others: true,
            ..Default::default()
        };
        let mut ops = RecordingOps::default();

        let outcome = dispatch_message(&mut handler, raw(0x0401, 0, 0), &mut ops);

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(handler.others, vec![0x0401]);
    }

    #[test]
    fn unclaimed_other_messages_fall_through_to_default_processing() {
        let mut handler = RecordingHandler::default();
        let mut ops = RecordingOps::default();

        let outcome = dispatch_message(&mut handler, raw(0x0401, 0, 0), &mut ops);

        assert_eq!(outcome, DispatchOutcome::PassThrough(0x0401));
        assert_eq!(handler.others, vec![0x0401]);
    }

    #[test]
    fn association_uses_creation_payload_on_first_notification() {
        let stored = Cell::new(0isize);

        let pointer = resolve_association(
            WM_NCCREATE,
            || unreachable!("the slot is not read during creation"),
            || 0x5A5A,
            |value| stored.set(value),
        );

        assert_eq!(pointer, 0x5A5A);
        assert_eq!(stored.get(), 0x5A5A);
    }

    #[test]
    fn association_reads_the_slot_for_later_messages() {
        let store_calls = Cell::new(0usize);

        let pointer = resolve_association(
            WM_PAINT,
            || 0x77,
            || unreachable!("no creation payload outside WM_NCCREATE"),
            |_| store_calls.set(store_calls.get() + 1),
        );

        assert_eq!(pointer, 0x77);
        assert_eq!(store_calls.get(), 0);
    }

    #[test]
    fn empty_association_slot_yields_null() {
        let pointer = resolve_association(WM_KEYDOWN, || 0, || 0, |_| {});
        assert_eq!(pointer, 0);
    }

    #[test]
    fn bracketed_session_runs_end_exactly_once_on_the_happy_path() {
        let ended = Cell::new(0usize);

        with_bracketed_session(|| 7u32, |_| ended.set(ended.get() + 1), |token| *token += 1);

        assert_eq!(ended.get(), 1);
    }
}
