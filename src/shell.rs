/*
 * Win32 side of the shell: window-class registration, native window
 * creation, the per-handler-type window procedure, and the two pump
 * operations. Message routing itself lives in `routing` and is shared with
 * the portable tests; this module only adapts wndproc parameters onto it and
 * supplies the real platform side effects.
 *
 * Association model: the shell owns a boxed `ShellState` on the heap; the
 * window's `GWLP_USERDATA` slot holds a borrowed pointer to it, stored on
 * `WM_NCCREATE` and cleared on `WM_NCDESTROY`. The slot never owns the box,
 * so teardown order is: `DestroyWindow` clears the slot, then the shell
 * frees the state.
 */

use crate::{
    error::{ErrorReport, Result, ShellError},
    handler::WindowHandler,
    routing::{self, DispatchOutcome, RawMessage, ShellOps},
    startup,
    surface::PaintSurface,
    types::{PumpStatus, WindowConfig},
};

use windows::{
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{BeginPaint, COLOR_WINDOW, EndPaint, HBRUSH, PAINTSTRUCT},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CREATESTRUCTW, CS_HREDRAW, CS_VREDRAW, CreateWindowExW, DefWindowProcW, DestroyWindow,
            DispatchMessageW, GWLP_USERDATA, GetClassInfoExW, GetMessageW, GetWindowLongPtrW,
            IDC_ARROW, IDI_APPLICATION, LoadCursorW, LoadIconW, MSG, PM_REMOVE, PeekMessageW,
            PostQuitMessage, RegisterClassExW, SW_SHOW, SetWindowLongPtrW, ShowWindow,
            TranslateMessage, UpdateWindow, WINDOW_EX_STYLE, WINDOW_STYLE, WM_QUIT, WNDCLASSEXW,
        },
    },
    core::{HSTRING, PCWSTR},
};

use std::ffi::c_void;

// Represents an invalid HWND, useful for initialization and teardown checks.
const HWND_INVALID: HWND = HWND(std::ptr::null_mut());

// Per-window state reached through the user-data slot. `hwnd` starts invalid
// and is back-filled by the wndproc during WM_NCCREATE, before
// CreateWindowExW returns.
struct ShellState<H: WindowHandler> {
    hwnd: HWND,
    handler: H,
}

/// One native window plus the handler bound to it.
///
/// Construction registers a window class named after the configured title,
/// creates the window, and shows it. The caller then drives the message
/// queue through [`WindowShell::wait_message`] or
/// [`WindowShell::poll_message`]; each dispatched message lands in one of
/// the handler's hooks. Dropping the shell destroys the window if the
/// platform has not already done so.
pub struct WindowShell<H: WindowHandler> {
    state: *mut ShellState<H>,
    hinstance: HINSTANCE,
}

impl<H: WindowHandler> WindowShell<H> {
    pub fn new(config: &WindowConfig, handler: H) -> Result<Self> {
        let hinstance = module_instance()?;
        let class_name = HSTRING::from(config.title.as_str());

        // The box outlives the window; the creation payload hands the wndproc
        // a borrowed pointer to it.
        let state = Box::into_raw(Box::new(ShellState {
            hwnd: HWND_INVALID,
            handler,
        }));

        let created = startup::run_creation_sequence(
            || register_window_class::<H>(hinstance, &class_name),
            || create_native_window(hinstance, &class_name, config, state.cast::<c_void>()),
            |hwnd| show_native_window(*hwnd),
        );

        let hwnd = match created {
            Ok(hwnd) => hwnd,
            Err(error) => {
                // A failed creation leaves the slot cleared (WM_NCDESTROY ran
                // if WM_NCCREATE did), so the box is still solely ours.
                drop(unsafe { Box::from_raw(state) });
                return Err(error);
            }
        };

        if unsafe { (*state).hwnd } != hwnd {
            log::warn!("Shell: creation handshake did not record the handle; adopting it now.");
            unsafe { (*state).hwnd = hwnd };
        }
        log::debug!("Shell: window '{}' created and shown.", config.title);

        Ok(Self { state, hinstance })
    }

    /// The native window handle. Valid for the shell's entire lifetime after
    /// successful construction; invalid once the platform destroys the
    /// window.
    pub fn hwnd(&self) -> HWND {
        unsafe { (*self.state).hwnd }
    }

    /// The hosting module's instance handle.
    pub fn hinstance(&self) -> HINSTANCE {
        self.hinstance
    }

    pub fn handler(&self) -> &H {
        unsafe { &(*self.state).handler }
    }

    pub fn handler_mut(&mut self) -> &mut H {
        unsafe { &mut (*self.state).handler }
    }

    /// Blocks until a message is available, then translates and dispatches
    /// it. Returns [`PumpStatus::Quit`] once the quit signal is retrieved;
    /// the caller's loop should stop then.
    pub fn wait_message(&mut self) -> Result<PumpStatus> {
        let mut msg = MSG::default();
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match ret.0 {
            -1 => {
                let report = ErrorReport::capture("GetMessageW failed");
                log::error!("Shell: {}", report.message());
                Err(ShellError::MessageRetrieval(report))
            }
            0 => Ok(PumpStatus::Quit),
            _ => {
                unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
                Ok(PumpStatus::Dispatched)
            }
        }
    }

    /// Dispatches the next pending message, if any. Nothing pending is an
    /// explicit no-op returning [`PumpStatus::Empty`]; a zeroed message is
    /// never translated or dispatched.
    pub fn poll_message(&mut self) -> PumpStatus {
        let mut msg = MSG::default();
        if !unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
            return PumpStatus::Empty;
        }
        if msg.message == WM_QUIT {
            return PumpStatus::Quit;
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        PumpStatus::Dispatched
    }
}

impl<H: WindowHandler> Drop for WindowShell<H> {
    fn drop(&mut self) {
        let hwnd = unsafe { (*self.state).hwnd };
        // WM_NCDESTROY nulls the stored handle, so a window the platform
        // already destroyed is not destroyed twice.
        if !hwnd.0.is_null() {
            if let Err(error) = unsafe { DestroyWindow(hwnd) } {
                log::warn!("Shell: DestroyWindow failed during teardown: {error:?}");
            }
        }
        drop(unsafe { Box::from_raw(self.state) });
    }
}

fn module_instance() -> Result<HINSTANCE> {
    // The process's own module handle, valid for the process lifetime.
    let module = unsafe { GetModuleHandleW(None) }.map_err(|e| {
        ShellError::ClassRegistration(ErrorReport::from_win32("GetModuleHandleW failed", &e))
    })?;
    // HINSTANCE and HMODULE are the same underlying value on Windows.
    Ok(HINSTANCE(module.0))
}

/*
 * Registers the window class for handler type `H` if not already registered.
 * The class is named after the window title, matching the one-class-per-shell
 * model; a second shell reusing a title reuses the first registration.
 */
fn register_window_class<H: WindowHandler>(
    hinstance: HINSTANCE,
    class_name: &HSTRING,
) -> Result<()> {
    let class_name_pcwstr = PCWSTR(class_name.as_ptr());

    unsafe {
        let mut existing = WNDCLASSEXW::default();
        if GetClassInfoExW(Some(hinstance), class_name_pcwstr, &mut existing).is_ok() {
            log::debug!("Shell: window class '{class_name}' already registered.");
            return Ok(());
        }

        let icon = LoadIconW(None, IDI_APPLICATION).map_err(|e| {
            ShellError::ClassRegistration(ErrorReport::from_win32("LoadIconW failed", &e))
        })?;
        let cursor = LoadCursorW(None, IDC_ARROW).map_err(|e| {
            ShellError::ClassRegistration(ErrorReport::from_win32("LoadCursorW failed", &e))
        })?;

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(shell_wnd_proc::<H>),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: hinstance,
            hIcon: icon,
            hCursor: cursor,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as *mut c_void),
            lpszMenuName: PCWSTR::null(),
            lpszClassName: class_name_pcwstr,
            hIconSm: icon,
        };

        if RegisterClassExW(&wc) == 0 {
            let report = ErrorReport::capture("RegisterClassExW failed");
            log::error!("Shell: {}", report.message());
            Err(ShellError::ClassRegistration(report))
        } else {
            log::debug!("Shell: window class '{class_name}' registered.");
            Ok(())
        }
    }
}

/*
 * Creates the native window, passing the shell-state pointer as the creation
 * payload so the wndproc can associate state with the handle before
 * CreateWindowExW returns.
 */
fn create_native_window(
    hinstance: HINSTANCE,
    class_name: &HSTRING,
    config: &WindowConfig,
    create_params: *mut c_void,
) -> Result<HWND> {
    unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(config.ex_style),
            class_name,
            &HSTRING::from(config.title.as_str()),
            WINDOW_STYLE(config.style),
            config.x,
            config.y,
            config.width,
            config.height,
            None,                  // top-level window, no parent
            None,                  // no menu
            Some(hinstance),
            Some(create_params as _),
        )
        .map_err(|e| {
            let report = ErrorReport::from_win32("CreateWindowExW failed", &e);
            log::error!("Shell: {}", report.message());
            ShellError::WindowCreation(report)
        })
    }
}

fn show_native_window(hwnd: HWND) {
    // Previous-visibility and update results are intentionally unused.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
    }
}

// Platform side effects handed to the dispatcher: real paint brackets and
// the real quit post.
struct Win32ShellOps {
    hwnd: HWND,
}

impl ShellOps for Win32ShellOps {
    fn with_paint_session(&mut self, body: &mut dyn FnMut(&mut PaintSurface)) {
        let hwnd = self.hwnd;
        routing::with_bracketed_session(
            || {
                let mut info = PAINTSTRUCT::default();
                let hdc = unsafe { BeginPaint(hwnd, &mut info) };
                PaintSurface::new(hdc, info)
            },
            |surface| {
                // Runs even if the hook unwinds.
                let _ = unsafe { EndPaint(hwnd, surface.info()) };
            },
            |surface| body(surface),
        );
    }

    fn post_quit(&mut self) {
        unsafe { PostQuitMessage(0) };
    }
}

/*
 * Window procedure, monomorphized per handler type so the class registered
 * for `H` statically routes to `H`'s hooks. Resolves the shell state via the
 * user-data slot (stored on WM_NCCREATE, cleared on WM_NCDESTROY) and hands
 * everything else to `routing::dispatch_message`. Messages arriving before
 * the association exists fall through to default processing.
 */
unsafe extern "system" fn shell_wnd_proc<H: WindowHandler>(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let state_ptr = routing::resolve_association(
        msg,
        || unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) },
        || {
            let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
            create_struct.lpCreateParams as isize
        },
        |pointer| {
            let _ = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, pointer) };
        },
    ) as *mut ShellState<H>;

    let Some(state) = (unsafe { state_ptr.as_mut() }) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };

    if msg == routing::WM_NCCREATE {
        // Back-fills the handle: the only write after construction begins.
        state.hwnd = hwnd;
    }

    if msg == routing::WM_NCDESTROY {
        // Remove the association before the handle dies. The slot only
        // borrows the state, so nothing is freed here.
        let _ = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
        state.hwnd = HWND_INVALID;
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    let raw = RawMessage {
        msg,
        wparam: wparam.0,
        lparam: lparam.0,
    };
    let mut ops = Win32ShellOps { hwnd };
    match routing::dispatch_message(&mut state.handler, raw, &mut ops) {
        DispatchOutcome::Handled => LRESULT(0),
        DispatchOutcome::PassThrough(_) => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}
