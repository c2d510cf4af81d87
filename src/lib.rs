/*
 * Public entry point for the winshell crate, a thin shell over the Win32
 * windowing API. One `WindowShell` owns one native window; construction
 * registers the window class and creates the window, and the caller drives
 * the message queue through the blocking or polling pump. Messages in the
 * fixed routed set (paint, keyboard, mouse, close) land in the overridable
 * hooks on a `WindowHandler`; everything else goes through the
 * `handle_other` escape hatch or default platform processing.
 *
 * Conditional compilation keeps the portable pieces (configuration, error
 * reporting, message routing, the handler trait) available on every platform
 * so logic that depends on them can compile and test anywhere; Win32
 * internals are scoped to Windows builds.
 */
pub mod error;
pub mod handler;
pub mod routing;
#[cfg(target_os = "windows")]
pub mod shell;
#[cfg(any(test, target_os = "windows"))]
pub(crate) mod startup;
#[cfg(not(target_os = "windows"))]
pub(crate) mod surface_stub;
#[cfg(target_os = "windows")]
pub(crate) mod surface_windows;
#[cfg(not(target_os = "windows"))]
pub(crate) use surface_stub as surface;
#[cfg(target_os = "windows")]
pub(crate) use surface_windows as surface;
pub mod types;

pub use error::{ErrorReport, Result, ShellError};
pub use handler::WindowHandler;
pub use routing::{DispatchOutcome, RawMessage, ShellEvent, ShellOps};
#[cfg(target_os = "windows")]
pub use shell::WindowShell;
pub use surface::PaintSurface;
pub use types::{MouseButton, PumpStatus, WindowConfig};
