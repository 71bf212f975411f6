//! [`fmt::Display`] wrappers around [`pulldown_cmark`]'s escaping functions
//! so that escaping can happen inline in `format!` and `write!`. Text that
//! comes from requests or from plain-text API fields goes through
//! [`EscapeHtml`] before it reaches a template; the API's rendered HTML
//! fragments don't.

use pulldown_cmark::escape::{escape_html, StrWrite};
use std::fmt::{self, Display};
use std::io;

struct Adaptor<'a, T> {
    formatter: &'a mut T,
    result: fmt::Result,
}

impl<T> Adaptor<'_, T> {
    fn handle_result(&mut self, result: fmt::Result) -> io::Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.result = result;
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}

impl<T: fmt::Write> StrWrite for Adaptor<'_, T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let result = self.formatter.write_str(s);
        self.handle_result(result)
    }

    fn write_fmt(&mut self, args: fmt::Arguments) -> io::Result<()> {
        let result = self.formatter.write_fmt(args);
        self.handle_result(result)
    }
}

/// Escapes `&`, `<`, `>` and `"` when displayed. Safe for element text and
/// double-quoted attribute values, and for XML text.
pub struct EscapeHtml<'a>(pub &'a str);

impl<'a> Display for EscapeHtml<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };

        let _ = escape_html(&mut adaptor, self.0);
        adaptor.result
    }
}

/// Shorthand for `EscapeHtml(s).to_string()`.
pub fn html(s: &str) -> String {
    EscapeHtml(s).to_string()
}
