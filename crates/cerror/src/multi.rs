//! Ordered aggregate of independent failures.
//!
//! `MultiError` never filters, deduplicates or ranks: every appended
//! value is kept, in insertion order. It has no internal locking, so a
//! collector shared between threads needs an outer mutex.
//!
//! ```rust
//! use cerror::{CError, MultiError};
//!
//! let mut errs = MultiError::new();
//! assert!(errs.clone().error_or_nil().is_none());
//!
//! errs.append(CError::from_parts("DAS", 1, "db1 down", None));
//! errs.append(CError::from_parts("MQ", 2, "broker down", None));
//! assert_eq!(errs.to_string(), "DAS-1: db1 down\nMQ-2: broker down");
//! ```

use std::error::Error;
use std::fmt;

use crate::like::ErrorLike;
use crate::render::{self, RenderMode};
use crate::stack::StackTrace;

#[derive(Clone, Default)]
pub struct MultiError {
    errors: Vec<ErrorLike>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one failure. Absent-identity nodes are appended too.
    pub fn append(&mut self, err: impl Into<ErrorLike>) -> &mut Self {
        self.errors.push(err.into());
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Children in insertion order.
    #[inline]
    pub fn wrapped_errors(&self) -> &[ErrorLike] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorLike> {
        self.errors.iter()
    }

    /// `None` iff nothing was appended.
    pub fn error_or_nil(self) -> Option<MultiError> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Stack of the first child that carries one.
    pub fn stack_trace(&self) -> Option<StackTrace> {
        self.errors.iter().find_map(ErrorLike::stack_trace)
    }

    pub fn render(&self, mode: RenderMode) -> String {
        render::render_multi(self, mode)
    }
}

impl<E: Into<ErrorLike>> Extend<E> for MultiError {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.errors.extend(iter.into_iter().map(Into::into));
    }
}

impl<E: Into<ErrorLike>> FromIterator<E> for MultiError {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut multi = MultiError::new();
        multi.extend(iter);
        multi
    }
}

impl IntoIterator for MultiError {
    type Item = ErrorLike;
    type IntoIter = std::vec::IntoIter<ErrorLike>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a ErrorLike;
    type IntoIter = std::slice::Iter<'a, ErrorLike>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// The first child, so chain walkers reach the leading failure.
impl Error for MultiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.errors.first().map(|e| e as &(dyn Error + 'static))
    }
}

/// Compact by default, verbose with the alternate flag (`{:#}`).
impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if f.alternate() { RenderMode::Verbose } else { RenderMode::Compact };
        f.write_str(&self.render(mode))
    }
}

impl fmt::Debug for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiError")
            .field("errors", &self.errors)
            .finish()
    }
}
