use std::error::Error;
use std::fmt;
#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::catalog::Entry;
use crate::like::ErrorLike;
use crate::render::{self, RenderMode};
use crate::stack::StackTrace;
use crate::template::{self, Args, DisplayArgs, TemplateError};

/// Catalog Error — one identified failure, optionally wrapping a cause.
///
/// Identity is the `(header, code)` pair of the catalog entry it was
/// created from. The message starts as the entry template and is
/// rendered by [`specify`](CError::specify).
///
/// # Stack ownership
///
/// A node's stack is fixed at construction:
///
/// - wrapping something that already carries a stack → that stack is
///   reused as-is (same snapshot, not a copy);
/// - otherwise → a fresh stack is captured, skipping the construction
///   frames so the first frame is the caller.
///
/// # Prototypes
///
/// Nodes created once at startup and shared are templates. Derive call
/// site instances with [`renew`](CError::renew) instead of mutating the
/// shared value. `Clone` is cheap: the stack and any wrapped value are
/// shared, the message is copied.
#[derive(Clone)]
pub struct CError {
    header: Arc<str>,
    code: u32,
    template: Arc<str>,
    message: String,
    wrapped: Option<ErrorLike>,
    stack: StackTrace,
    #[cfg(feature = "metrics")]
    hits: Option<Arc<AtomicU64>>,
}

// ── Constructors ──────────────────────────────────────────────────

impl CError {
    /// Create a node bound to a catalog entry.
    ///
    /// ```
    /// use cerror::{Catalog, CError};
    ///
    /// let mut b = Catalog::builder();
    /// b.register("DAS", 1001, "failed to connect to %s: %s").unwrap();
    /// let cat = b.build();
    ///
    /// let mut err = CError::new(cat.lookup("DAS", 1001), None);
    /// err.specify(&[&"db1", &"timeout"]);
    /// assert_eq!(err.to_string(), "DAS-1001: failed to connect to db1: timeout");
    /// ```
    #[inline(never)]
    pub fn new(entry: &Entry, wrapped: Option<ErrorLike>) -> Self {
        Self::from_entry(entry, wrapped, 1)
    }

    /// Create a node from a bare identity, outside any catalog.
    #[inline(never)]
    pub fn from_parts(
        header: impl Into<String>,
        code: u32,
        template: impl Into<String>,
        wrapped: Option<ErrorLike>,
    ) -> Self {
        let header: Arc<str> = Arc::from(header.into());
        let template: Arc<str> = Arc::from(template.into());
        Self::build(header, code, template, None, wrapped, 1)
    }

    #[inline(never)]
    pub(crate) fn from_entry(entry: &Entry, wrapped: Option<ErrorLike>, skip: usize) -> Self {
        #[allow(unused_mut)]
        let mut node = Self::build(
            entry.header_arc(),
            entry.err_code(),
            entry.template_arc(),
            None,
            wrapped,
            skip + 1,
        );

        #[cfg(feature = "metrics")]
        {
            node.hits = Some(Arc::clone(&entry.hits));
            node.bump();
        }

        node
    }

    /// `skip` counts the frames between this function and the caller's code.
    #[inline(never)]
    fn build(
        header: Arc<str>,
        code: u32,
        template: Arc<str>,
        message: Option<String>,
        wrapped: Option<ErrorLike>,
        skip: usize,
    ) -> Self {
        let stack = match wrapped.as_ref().and_then(ErrorLike::stack_trace) {
            Some(inherited) => inherited,
            None => StackTrace::capture(skip + 1),
        };

        let message = message.unwrap_or_else(|| template.to_string());

        Self {
            header,
            code,
            template,
            message,
            wrapped,
            stack,
            #[cfg(feature = "metrics")]
            hits: None,
        }
    }

    /// Wrap a failure produced elsewhere under this node's identity and
    /// current message.
    ///
    /// The result wraps `err` only: anything `self` already wraps is not
    /// carried over. It inherits `err`'s stack if it has one, otherwise
    /// captures a fresh stack at the caller. `self` is left untouched.
    #[inline(never)]
    pub fn wrap(&self, err: impl Into<ErrorLike>) -> CError {
        self.wrap_at(err.into(), 1)
    }

    /// [`renew`](CError::renew) with `args`, then [`wrap`](CError::wrap)
    /// `err`, as one node. Counts once per call under `metrics`.
    ///
    /// ```
    /// use std::io;
    /// use cerror::CError;
    ///
    /// let proto = CError::from_parts("DAS", 1001, "failed to connect to %s", None);
    /// let io = io::Error::new(io::ErrorKind::TimedOut, "timeout");
    /// let e = proto.wrap_with(&[&"db1"], io);
    /// assert_eq!(e.to_string(), "DAS-1001: failed to connect to db1\ntimeout");
    /// ```
    #[inline(never)]
    pub fn wrap_with(&self, args: Args<'_>, err: impl Into<ErrorLike>) -> CError {
        let mut specified = self.clone();
        specified.specify(args);
        specified.wrap_at(err.into(), 1)
    }

    #[inline(never)]
    fn wrap_at(&self, err: ErrorLike, skip: usize) -> CError {
        #[allow(unused_mut)]
        let mut node = Self::build(
            Arc::clone(&self.header),
            self.code,
            Arc::clone(&self.template),
            Some(self.message.clone()),
            Some(err),
            skip + 1,
        );

        #[cfg(feature = "metrics")]
        {
            node.hits = self.hits.clone();
            node.bump();
        }

        node
    }
}

// ── Mutation / derivation ─────────────────────────────────────────

impl CError {
    /// Render the template with `args` into the message, in place.
    ///
    /// Always renders from the template, so calling it twice replaces the
    /// first rendering. Arity mismatches are not errors: the message gets
    /// `%!v(MISSING)` / `%!(EXTRA ..)` markers and a warning is logged.
    /// Use [`try_specify`](CError::try_specify) to reject them instead.
    pub fn specify(&mut self, args: Args<'_>) -> &mut Self {
        let rendered = template::render(&self.template, args);
        if !rendered.is_exact() {
            tracing::warn!(
                code = %self.code(),
                template = %self.template,
                args = ?DisplayArgs(args),
                expected = rendered.expected,
                given = rendered.given,
                "error template argument count mismatch"
            );
        }
        self.message = rendered.text;
        self
    }

    /// Strict [`specify`](CError::specify): on arity mismatch the node is
    /// left unchanged and the mismatch is returned.
    pub fn try_specify(&mut self, args: Args<'_>) -> Result<&mut Self, TemplateError> {
        let rendered = template::render(&self.template, args);
        TemplateError::check(&rendered)?;
        self.message = rendered.text;
        Ok(self)
    }

    /// Clone then specify. Safe to call concurrently on a shared prototype.
    ///
    /// ```
    /// use cerror::CError;
    ///
    /// let proto = CError::from_parts("CFG", 7, "x=%s", None);
    /// let a = proto.renew(&[&1]);
    /// let b = proto.renew(&[&2]);
    /// assert_eq!(a.message(), "x=1");
    /// assert_eq!(b.message(), "x=2");
    /// assert_eq!(proto.message(), "x=%s");
    /// ```
    pub fn renew(&self, args: Args<'_>) -> CError {
        let mut node = self.clone();
        node.specify(args);

        #[cfg(feature = "metrics")]
        node.bump();

        node
    }

    #[cfg(feature = "metrics")]
    fn bump(&self) {
        if let Some(hits) = &self.hits {
            hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────

impl CError {
    #[inline]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The numeric part of the identity.
    #[inline]
    pub fn err_code(&self) -> u32 {
        self.code
    }

    /// `"{header}-{code}"`.
    pub fn code(&self) -> String {
        format!("{}-{}", self.header, self.code)
    }

    #[inline]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The rendered message (the raw template until specified).
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn wrapped(&self) -> Option<&ErrorLike> {
        self.wrapped.as_ref()
    }

    /// True if this node stands for "no error": empty header or zero code.
    #[inline]
    pub fn is_absent(&self) -> bool {
        self.header.is_empty() || self.code == 0
    }

    /// `None` for an absent identity, otherwise the node itself.
    pub fn error_or_nil(self) -> Option<CError> {
        if self.is_absent() {
            None
        } else {
            Some(self)
        }
    }

    /// The stack this failure is reported with.
    ///
    /// A node wrapping a non-empty aggregate reports the first child that
    /// has a stack; every other node reports its own.
    pub fn stack_trace(&self) -> StackTrace {
        if let Some(ErrorLike::Multi(multi)) = &self.wrapped {
            if let Some(stack) = multi.stack_trace() {
                return stack;
            }
        }
        self.stack.clone()
    }

    /// The stack fixed at construction (captured or inherited).
    #[inline]
    pub fn own_stack(&self) -> &StackTrace {
        &self.stack
    }

    pub fn render(&self, mode: RenderMode) -> String {
        render::render_node(self, mode)
    }
}

#[cfg(test)]
impl CError {
    /// Leaf node with a known stack, for deterministic rendering tests.
    pub(crate) fn with_fixed_stack(header: &str, code: u32, template: &str, stack: StackTrace) -> Self {
        Self {
            header: Arc::from(header),
            code,
            template: Arc::from(template),
            message: template.to_string(),
            wrapped: None,
            stack,
            #[cfg(feature = "metrics")]
            hits: None,
        }
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for CError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.wrapped.as_ref().map(|w| w as &(dyn Error + 'static))
    }
}

// ── Display / Debug ───────────────────────────────────────────────

/// Compact by default, verbose with the alternate flag (`{:#}`).
impl fmt::Display for CError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if f.alternate() { RenderMode::Verbose } else { RenderMode::Compact };
        f.write_str(&self.render(mode))
    }
}

impl fmt::Debug for CError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("CError");
        d.field("code", &format_args!("{}-{}", self.header, self.code));
        d.field("message", &self.message);
        if let Some(w) = &self.wrapped {
            d.field("wrapped", w);
        }
        d.field("stack", &self.stack);
        d.finish()
    }
}
