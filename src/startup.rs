/*
 * Construction sequencing for the shell: register the window class, create
 * the window, then show it, stopping at the first failure. The Windows side
 * supplies the real operations; tests supply stubs, so the ordering contract
 * (registration failure means no creation attempt is ever made) is checked
 * without a live window session.
 */

use crate::error::Result;

pub(crate) fn run_creation_sequence<W>(
    register: impl FnOnce() -> Result<()>,
    create: impl FnOnce() -> Result<W>,
    show: impl FnOnce(&W),
) -> Result<W> {
    register()?;
    let window = create()?;
    show(&window);
    Ok(window)
}
