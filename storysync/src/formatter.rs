//! Seam for the external source formatter run over rewritten stories.

use crate::error::FormatError;
use std::path::Path;

/// Formats a file in place.
///
/// Runs synchronously; the orchestrator waits for it before the event is
/// considered handled.
pub trait Formatter {
    /// Format the file at `path`.
    fn format(&self, path: &Path) -> Result<(), FormatError>;
}

/// Formatter that leaves files as written.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, _path: &Path) -> Result<(), FormatError> {
        Ok(())
    }
}

impl<F: Formatter + ?Sized> Formatter for &F {
    fn format(&self, path: &Path) -> Result<(), FormatError> {
        (**self).format(path)
    }
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn format(&self, path: &Path) -> Result<(), FormatError> {
        (**self).format(path)
    }
}
