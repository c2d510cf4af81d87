// Non-Windows stand-in for the paint surface so the handler trait and the
// message dispatcher stay compilable and testable on every platform. Carries
// no device context; hooks that draw are inherently Windows-only.

#[derive(Debug, Default)]
pub struct PaintSurface(());

impl PaintSurface {
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self(())
    }
}
