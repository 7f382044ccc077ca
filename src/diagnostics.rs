//! Diagnostics sink handed to the parser.
//!
//! The parser never reaches for a global logger on its own; it reports through
//! whatever [`ParseLogger`] the caller gave to [`TmxParser`](crate::TmxParser).

use std::fmt::{self, Display, Write};

/// Key/value pairs attached to a diagnostic.
pub type Fields<'a> = &'a [(&'a str, &'a dyn Display)];

/// Structured sink for parser diagnostics.
pub trait ParseLogger {
    /// Something odd but recoverable.
    fn warn(&self, message: &str, fields: Fields<'_>);
    /// A stage failed; the error is returned right after this call.
    fn error(&self, message: &str, fields: Fields<'_>);
}

/// Forwards to the `log` facade under the `tmx_loader` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLogger;

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

pub(crate) static DEFAULT_LOGGER: LogLogger = LogLogger;

const TARGET: &str = "tmx_loader";

struct Rendered<'a>(&'a str, Fields<'a>);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)?;
        for (i, (key, value)) in self.1.iter().enumerate() {
            f.write_char(if i == 0 { ' ' } else { ',' })?;
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl ParseLogger for LogLogger {
    fn warn(&self, message: &str, fields: Fields<'_>) {
        log::warn!(target: TARGET, "{}", Rendered(message, fields));
    }

    fn error(&self, message: &str, fields: Fields<'_>) {
        log::error!(target: TARGET, "{}", Rendered(message, fields));
    }
}

impl ParseLogger for NullLogger {
    fn warn(&self, _message: &str, _fields: Fields<'_>) {}
    fn error(&self, _message: &str, _fields: Fields<'_>) {}
}
