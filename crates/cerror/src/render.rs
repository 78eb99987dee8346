//! Text rendering of error trees.
//!
//! | Mode            | Output |
//! |-----------------|--------|
//! | `Compact`       | `"{code}: {message}"`, wrapped/aggregated text on the following lines |
//! | `CompactQuoted` | the compact text as one escaped, double-quoted literal |
//! | `Verbose`       | the tree, each leaf followed by its stack, one frame per line |
//!
//! The tree is assumed finite: construction offers no way to make a node
//! wrap itself or an ancestor.
//!
//! # Verbose layout
//!
//! ```text
//! API-2: request failed          <- node: header line, then recurse
//! DAS-1001: failed to connect    <- leaf node: header line + its stack
//! \tapp::connect at src/db.rs:40:9
//! \tapp::handler at src/api.rs:12:5
//! ```
//!
//! A node whose stack was inherited from what it wraps does not print a
//! stack of its own: the wrapped value prints that same stack once.

use std::fmt::Write;

use crate::error::CError;
use crate::like::ErrorLike;
use crate::multi::MultiError;
use crate::stack::StackTrace;

/// Output mode for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    #[default]
    Compact,
    CompactQuoted,
    Verbose,
}

/// Render any error value.
pub fn render(err: &ErrorLike, mode: RenderMode) -> String {
    match err {
        ErrorLike::Node(node) => render_node(node, mode),
        ErrorLike::Multi(multi) => render_multi(multi, mode),
        ErrorLike::Primitive(_) => {
            let mut out = String::new();
            match mode {
                RenderMode::Compact => compact(err, &mut out),
                RenderMode::CompactQuoted => quoted(|o| compact(err, o), &mut out),
                RenderMode::Verbose => verbose(err, &mut out),
            }
            out
        }
    }
}

pub(crate) fn render_node(node: &CError, mode: RenderMode) -> String {
    let mut out = String::new();
    match mode {
        RenderMode::Compact => compact_node(node, &mut out),
        RenderMode::CompactQuoted => quoted(|o| compact_node(node, o), &mut out),
        RenderMode::Verbose => verbose_node(node, &mut out),
    }
    out
}

pub(crate) fn render_multi(multi: &MultiError, mode: RenderMode) -> String {
    let mut out = String::new();
    match mode {
        RenderMode::Compact => compact_multi(multi, &mut out),
        RenderMode::CompactQuoted => quoted(|o| compact_multi(multi, o), &mut out),
        RenderMode::Verbose => verbose_multi(multi, &mut out),
    }
    out
}

fn quoted<F: FnOnce(&mut String)>(f: F, out: &mut String) {
    let mut plain = String::new();
    f(&mut plain);
    let _ = write!(out, "{:?}", plain);
}

// ── Compact ───────────────────────────────────────────────────────

fn compact(err: &ErrorLike, out: &mut String) {
    match err {
        ErrorLike::Primitive(p) => {
            let _ = write!(out, "{}", p.error());
        }
        ErrorLike::Node(node) => compact_node(node, out),
        ErrorLike::Multi(multi) => compact_multi(multi, out),
    }
}

fn compact_node(node: &CError, out: &mut String) {
    let _ = write!(out, "{}-{}: {}", node.header(), node.err_code(), node.message());
    if let Some(wrapped) = node.wrapped() {
        out.push('\n');
        compact(wrapped, out);
    }
}

fn compact_multi(multi: &MultiError, out: &mut String) {
    for (i, child) in multi.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        compact(child, out);
    }
}

// ── Verbose ───────────────────────────────────────────────────────

fn verbose(err: &ErrorLike, out: &mut String) {
    match err {
        ErrorLike::Primitive(p) => {
            let _ = writeln!(out, "{}", p.error());
            if let Some(stack) = p.stack() {
                frames(stack, out);
            }
        }
        ErrorLike::Node(node) => verbose_node(node, out),
        ErrorLike::Multi(multi) => verbose_multi(multi, out),
    }
}

fn verbose_node(node: &CError, out: &mut String) {
    let _ = writeln!(out, "{}-{}: {}", node.header(), node.err_code(), node.message());

    match node.wrapped() {
        Some(wrapped) => {
            verbose(wrapped, out);
            // nothing below carried a stack, so ours was captured here
            if wrapped.stack_trace().is_none() {
                frames(node.own_stack(), out);
            }
        }
        None => frames(node.own_stack(), out),
    }
}

fn verbose_multi(multi: &MultiError, out: &mut String) {
    for child in multi {
        verbose(child, out);
    }
}

fn frames(stack: &StackTrace, out: &mut String) {
    let _ = write!(out, "{}", stack);
}
