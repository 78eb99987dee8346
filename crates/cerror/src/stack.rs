//! Call-stack snapshots attached to error nodes.
//!
//! A [`StackTrace`] is captured once per failure chain link and shared,
//! never mutated, by every node that inherits it. Cloning is an `Arc` bump.
//!
//! Capture goes through `std::backtrace::Backtrace::force_capture()` and
//! the resolved text form is split into [`Frame`]s. Frames whose symbol
//! cannot be resolved keep the placeholder the platform prints
//! (`<unknown>`) instead of failing the capture.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config;

/// One resolved call-stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Frame {
    pub symbol: String,
    /// `file:line:col`, when debug info is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} at {}", self.symbol, loc),
            None => f.write_str(&self.symbol),
        }
    }
}

/// Ordered, immutable call-stack snapshot, innermost frame first.
#[derive(Clone, PartialEq, Eq)]
pub struct StackTrace {
    frames: Arc<[Frame]>,
}

impl StackTrace {
    /// Capture the current call stack.
    ///
    /// The capture machinery itself (std's backtrace frames and this
    /// function) is always dropped; `skip` additional innermost frames are
    /// dropped on top so the first reported frame is the caller's code.
    /// Honors [`config::current`]: disabled capture yields an empty stack.
    #[inline(never)]
    pub fn capture(skip: usize) -> Self {
        let cfg = config::current();
        if !cfg.enabled {
            return Self::empty();
        }

        let bt = Backtrace::force_capture();
        if bt.status() != BacktraceStatus::Captured {
            return Self::empty();
        }

        let frames: Vec<Frame> = parse_frames(&bt.to_string())
            .into_iter()
            .skip_while(|f| is_machinery(&f.symbol))
            .skip(1 + skip)
            .take(cfg.max_frames)
            .collect();

        Self { frames: frames.into() }
    }

    /// A stack with no frames.
    pub fn empty() -> Self {
        Self { frames: Arc::from(Vec::new()) }
    }

    /// Build a stack from already-resolved frames.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames: frames.into() }
    }

    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True if both values are the very same snapshot, not just equal frames.
    #[inline]
    pub fn ptr_eq(&self, other: &StackTrace) -> bool {
        Arc::ptr_eq(&self.frames, &other.frames)
    }
}

impl fmt::Debug for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackTrace")
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// One frame per line, tab-indented.
impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.frames.iter() {
            writeln!(f, "\t{}", frame)?;
        }
        Ok(())
    }
}

fn is_machinery(symbol: &str) -> bool {
    symbol.starts_with("std::backtrace")
        || symbol.starts_with("<std::backtrace")
        || symbol.starts_with("backtrace::")
}

/// Split std's backtrace text into frames.
///
/// ```text
///    0: std::backtrace::Backtrace::create
///              at /rustc/.../backtrace.rs:331:13
///       inlined_symbol
///              at src/lib.rs:10:5
///    1: <unknown>
/// ```
///
/// Inlined symbols (no index) become frames of their own.
fn parse_frames(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(loc) = trimmed.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.location = Some(loc.trim().to_string());
            }
            continue;
        }

        let symbol = match trimmed.split_once(": ") {
            Some((idx, rest)) if !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()) => rest,
            _ => trimmed,
        };

        frames.push(Frame {
            symbol: symbol.trim().to_string(),
            location: None,
        });
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace::Backtrace::create
             at /rustc/abc/library/std/src/backtrace.rs:331:13
   1: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:313:9
   2: cerror::stack::StackTrace::capture
             at ./src/stack.rs:55:18
   3: app::connect
             at ./src/main.rs:12:5
      app::inlined_helper
             at ./src/main.rs:20:9
   4: <unknown>
";

    #[test]
    fn parse_indexed_and_inlined_frames() {
        let frames = parse_frames(SAMPLE);
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[3].symbol, "app::connect");
        assert_eq!(frames[3].location.as_deref(), Some("./src/main.rs:12:5"));
        assert_eq!(frames[4].symbol, "app::inlined_helper");
        assert_eq!(frames[5].symbol, "<unknown>");
        assert_eq!(frames[5].location, None);
    }

    #[test]
    fn machinery_frames_are_recognised() {
        let frames = parse_frames(SAMPLE);
        let rest: Vec<_> = frames
            .iter()
            .skip_while(|f| is_machinery(&f.symbol))
            .collect();
        assert_eq!(rest[0].symbol, "cerror::stack::StackTrace::capture");
    }

    #[test]
    fn skip_drops_innermost_frames() {
        #[inline(never)]
        fn both() -> (StackTrace, StackTrace) {
            (StackTrace::capture(0), StackTrace::capture(1))
        }
        let (full, skipped) = both();
        if !config::current().enabled || full.is_empty() {
            return;
        }
        if full.len() < config::current().max_frames {
            assert_eq!(full.len(), skipped.len() + 1);
            assert_eq!(&full.frames()[1..], skipped.frames());
        }
    }

    #[test]
    fn clone_shares_snapshot() {
        let a = StackTrace::from_frames(vec![Frame {
            symbol: "f".into(),
            location: None,
        }]);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn display_one_frame_per_line() {
        let st = StackTrace::from_frames(vec![
            Frame { symbol: "a::b".into(), location: Some("x.rs:1:2".into()) },
            Frame { symbol: "c::d".into(), location: None },
        ]);
        assert_eq!(st.to_string(), "\ta::b at x.rs:1:2\n\tc::d\n");
    }
}
