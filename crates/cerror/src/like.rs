use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::error::CError;
use crate::multi::MultiError;
use crate::render::{self, RenderMode};
use crate::stack::StackTrace;

/// Anything that can sit inside an error chain.
///
/// Closed set, matched exhaustively by rendering and stack lookup:
///
/// - **Primitive**: an opaque error from a collaborator (driver, parser,
///   I/O), optionally carrying a stack captured where it was produced.
/// - **Node**: an identified [`CError`].
/// - **Multi**: a [`MultiError`] aggregate.
///
/// Children are shared, never deep-copied, so cloning a chain is cheap.
#[derive(Clone)]
pub enum ErrorLike {
    Primitive(Primitive),
    Node(Arc<CError>),
    Multi(Arc<MultiError>),
}

/// An opaque error plus an optional stack.
#[derive(Clone)]
pub struct Primitive {
    error: Arc<dyn Error + Send + Sync>,
    stack: Option<StackTrace>,
}

impl Primitive {
    #[inline]
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }

    #[inline]
    pub fn stack(&self) -> Option<&StackTrace> {
        self.stack.as_ref()
    }
}

impl ErrorLike {
    /// Wrap a collaborator error without a stack.
    pub fn primitive<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        ErrorLike::Primitive(Primitive {
            error: Arc::new(err),
            stack: None,
        })
    }

    /// Wrap a collaborator error and capture a stack at the caller.
    #[inline(never)]
    pub fn traced<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        ErrorLike::Primitive(Primitive {
            error: Arc::new(err),
            stack: Some(StackTrace::capture(1)),
        })
    }

    /// Wrap a collaborator error that already knows where it came from.
    pub fn with_stack<E>(err: E, stack: StackTrace) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        ErrorLike::Primitive(Primitive {
            error: Arc::new(err),
            stack: Some(stack),
        })
    }

    /// The stack this value carries, if any.
    ///
    /// Nodes always have one; aggregates report their first child that
    /// has one; primitives only if created with a stack.
    pub fn stack_trace(&self) -> Option<StackTrace> {
        match self {
            ErrorLike::Primitive(p) => p.stack.clone(),
            ErrorLike::Node(node) => Some(node.stack_trace()),
            ErrorLike::Multi(multi) => multi.stack_trace(),
        }
    }

    /// `None` for an absent node or an empty aggregate.
    pub fn error_or_nil(self) -> Option<ErrorLike> {
        let absent = match &self {
            ErrorLike::Primitive(_) => false,
            ErrorLike::Node(node) => node.is_absent(),
            ErrorLike::Multi(multi) => multi.is_empty(),
        };
        if absent {
            None
        } else {
            Some(self)
        }
    }

    pub fn as_node(&self) -> Option<&CError> {
        match self {
            ErrorLike::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_multi(&self) -> Option<&MultiError> {
        match self {
            ErrorLike::Multi(multi) => Some(multi),
            _ => None,
        }
    }

    pub fn render(&self, mode: RenderMode) -> String {
        render::render(self, mode)
    }
}

// ── Conversions ───────────────────────────────────────────────────

impl From<CError> for ErrorLike {
    fn from(node: CError) -> Self {
        ErrorLike::Node(Arc::new(node))
    }
}

impl From<Arc<CError>> for ErrorLike {
    fn from(node: Arc<CError>) -> Self {
        ErrorLike::Node(node)
    }
}

impl From<MultiError> for ErrorLike {
    fn from(multi: MultiError) -> Self {
        ErrorLike::Multi(Arc::new(multi))
    }
}

impl From<io::Error> for ErrorLike {
    fn from(err: io::Error) -> Self {
        ErrorLike::primitive(err)
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for ErrorLike {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ErrorLike::Primitive(p) => p.error.source(),
            ErrorLike::Node(node) => node.source(),
            ErrorLike::Multi(multi) => multi.source(),
        }
    }
}

/// Compact by default, verbose with the alternate flag (`{:#}`).
impl fmt::Display for ErrorLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if f.alternate() { RenderMode::Verbose } else { RenderMode::Compact };
        f.write_str(&self.render(mode))
    }
}

impl fmt::Debug for ErrorLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLike::Primitive(p) => f
                .debug_struct("Primitive")
                .field("error", &p.error.to_string())
                .field("stack", &p.stack)
                .finish(),
            ErrorLike::Node(node) => fmt::Debug::fmt(&**node, f),
            ErrorLike::Multi(multi) => fmt::Debug::fmt(&**multi, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_has_no_stack() {
        let e = ErrorLike::primitive(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(e.stack_trace().is_none());
        assert_eq!(e.to_string(), "boom");
    }

    #[test]
    fn traced_primitive_has_stack() {
        let e = ErrorLike::traced(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(e.stack_trace().is_some());
    }

    #[test]
    fn error_or_nil_per_variant() {
        let empty: ErrorLike = MultiError::new().into();
        assert!(empty.error_or_nil().is_none());

        let absent: ErrorLike = CError::from_parts("", 0, "", None).into();
        assert!(absent.error_or_nil().is_none());

        let present: ErrorLike = CError::from_parts("DAS", 1, "x", None).into();
        assert!(present.error_or_nil().is_some());

        let prim = ErrorLike::primitive(std::fmt::Error);
        assert!(prim.error_or_nil().is_some());
    }

    #[test]
    fn io_error_converts() {
        let e: ErrorLike = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(e, ErrorLike::Primitive(_)));
        assert!(e.as_node().is_none());
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ErrorLike>();
    }
}
