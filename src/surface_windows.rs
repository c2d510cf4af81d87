// Live paint-session handle passed to `WindowHandler::on_paint`. The shell
// opens the session with `BeginPaint` before the hook runs and closes it with
// `EndPaint` after the hook returns, so the surface is only valid for the
// duration of the call.

use windows::Win32::Graphics::Gdi::{HDC, PAINTSTRUCT};

#[derive(Debug)]
pub struct PaintSurface {
    hdc: HDC,
    info: PAINTSTRUCT,
}

impl PaintSurface {
    pub(crate) fn new(hdc: HDC, info: PAINTSTRUCT) -> Self {
        Self { hdc, info }
    }

    /// Device context the paint session opened for this window.
    pub fn hdc(&self) -> HDC {
        self.hdc
    }

    /// Paint bookkeeping from `BeginPaint`, including the invalid rectangle.
    pub fn info(&self) -> &PAINTSTRUCT {
        &self.info
    }

    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self::new(HDC::default(), PAINTSTRUCT::default())
    }
}
