/*
 * Error reporting for the shell. Every fallible operation returns
 * `Result<T>`; the three failure kinds each carry an `ErrorReport`, a
 * caller-supplied description plus the platform error code captured at the
 * point of failure. A report can be surfaced interactively (modal message
 * box) or written to the debugger output stream.
 */

use std::fmt;

/// A diagnostic captured at the point of a platform failure.
///
/// The error code is read when the report is constructed, never when it is
/// surfaced: any Win32 call made between the failure and the report would
/// overwrite the thread-local last-error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    description: String,
    code: u32,
}

impl ErrorReport {
    /// Builds a report with an explicit error code. This is the portable
    /// constructor; Windows callers normally use [`ErrorReport::capture`]
    /// immediately after the failing call.
    pub fn with_code(description: impl Into<String>, code: u32) -> Self {
        Self {
            description: description.into(),
            code,
        }
    }

    /// Captures the calling thread's current last-error code.
    #[cfg(target_os = "windows")]
    pub fn capture(description: impl Into<String>) -> Self {
        // GetLastError reads thread-local state set by the last Win32 call.
        let code = unsafe { windows::Win32::Foundation::GetLastError() };
        Self::with_code(description, code.0)
    }

    /// Wraps an error the `windows` crate already materialized.
    #[cfg(target_os = "windows")]
    pub fn from_win32(description: impl Into<String>, error: &windows::core::Error) -> Self {
        Self::with_code(description, error.code().0 as u32)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    /// The combined description + code line used by both report actions.
    pub fn message(&self) -> String {
        format!("{} | error code: {}", self.description, self.code)
    }

    /// Presents the report in a modal error box, blocking until the user
    /// acknowledges it. Safe to call with no window on screen; the box is
    /// unowned.
    #[cfg(target_os = "windows")]
    pub fn report_interactive(&self) {
        use windows::Win32::UI::WindowsAndMessaging::{MB_ICONERROR, MB_OK, MessageBoxW};
        use windows::core::PCWSTR;

        let text: Vec<u16> = self
            .message()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        // `text` stays allocated for the duration of the call; a null
        // caption falls back to the system default title.
        unsafe {
            let _ = MessageBoxW(
                None,
                PCWSTR(text.as_ptr()),
                PCWSTR::null(),
                MB_OK | MB_ICONERROR,
            );
        }
    }

    /// Writes the report to the debugger output stream and the log.
    #[cfg(target_os = "windows")]
    pub fn report_debug(&self) {
        use windows::Win32::System::Diagnostics::Debug::OutputDebugStringW;
        use windows::core::PCWSTR;

        log::error!("Shell: {}", self.message());
        let text: Vec<u16> = self
            .message()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        unsafe { OutputDebugStringW(PCWSTR(text.as_ptr())) };
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Every failure the shell can produce. All variants carry the report
/// captured where the platform call failed; there is no recovery or retry
/// anywhere in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// `RegisterClassExW` (or a prerequisite resource load) refused the
    /// window class. Fatal to construction; no creation is attempted.
    ClassRegistration(ErrorReport),
    /// `CreateWindowExW` did not produce a window.
    WindowCreation(ErrorReport),
    /// The blocking pump's retrieval call reported failure.
    MessageRetrieval(ErrorReport),
}

impl ShellError {
    pub fn report(&self) -> &ErrorReport {
        match self {
            Self::ClassRegistration(report)
            | Self::WindowCreation(report)
            | Self::MessageRetrieval(report) => report,
        }
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassRegistration(report) => {
                write!(f, "window class registration failed: {report}")
            }
            Self::WindowCreation(report) => write!(f, "window creation failed: {report}"),
            Self::MessageRetrieval(report) => write!(f, "message retrieval failed: {report}"),
        }
    }
}

impl std::error::Error for ShellError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShellError>;
