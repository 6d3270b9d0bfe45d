//! Opening the registry UI after a successful publish.

use crate::error::{Error, Result};
use tracing::debug;

/// Open `url` in the default browser.
///
/// Dispatch is per platform (`xdg-open`, `open`, the Windows shell); an
/// unsupported platform surfaces as [`Error::BrowserOpen`].
pub fn open_url(url: &str) -> Result<()> {
    debug!(url, "opening browser");
    open::that(url).map_err(|e| Error::BrowserOpen {
        url: url.to_string(),
        source: e,
    })
}

