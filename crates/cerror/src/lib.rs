//! # cerror — Catalog Error
//!
//! Structured, identifiable failures for glue code that talks to
//! databases, brokers and HTTP peers.
//!
//! ## Design
//!
//! - **Catalog** — a write-once table of `(header, code) → template`.
//!   Registered during startup, frozen, then read concurrently.
//! - **`CError`** — one identified failure: catalog identity, rendered
//!   message, optional wrapped cause, and a stack trace that is captured
//!   once per chain (wrapping a stack-bearing error reuses its stack).
//! - **`MultiError`** — ordered aggregate of sibling failures, absent when
//!   empty.
//! - **`ErrorLike`** — closed union of primitive error, node and aggregate.
//! - **Rendering** — `Compact`, `CompactQuoted` and `Verbose` modes.
//!
//! ## Quick Start
//!
//! ```rust
//! use cerror::{catalog, renew, CError, MultiError, RenderMode};
//!
//! catalog::init(|b| {
//!     b.register("DAS", 1001, "failed to connect to %s: %s")?;
//!     b.register("DAS", 1100, "%d shard(s) failed")?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! // One prototype, many call sites.
//! let connect = CError::new(catalog::lookup("DAS", 1001), None);
//!
//! let mut errs = MultiError::new();
//! errs.append(renew!(connect, "db1", "timeout"));
//! errs.append(renew!(connect, "db2", "refused"));
//!
//! let n = errs.len();
//! let top = renew!(CError::new(catalog::lookup("DAS", 1100), Some(errs.into())), n);
//!
//! assert_eq!(
//!     top.render(RenderMode::Compact),
//!     "DAS-1100: 2 shard(s) failed\n\
//!      DAS-1001: failed to connect to db1: timeout\n\
//!      DAS-1001: failed to connect to db2: refused"
//! );
//! ```
//!
//! ## Configuration
//!
//! | Env var             | Effect |
//! |---------------------|--------|
//! | `CERROR_STACK`      | `0` disables stack capture (empty stacks) |
//! | `CERROR_MAX_FRAMES` | Frames kept per capture (default 64) |
//!
//! ## Feature Flags
//!
//! | Flag      | Effect |
//! |-----------|--------|
//! | `metrics` | Per-entry AtomicU64 counters, Prometheus dump |

mod env;
mod error;
mod like;
mod multi;
mod render;
mod convert;
mod report;
#[macro_use]
mod macros;

pub mod catalog;
pub mod config;
pub mod stack;
pub mod template;

#[cfg(feature = "metrics")]
pub mod metrics;

// ── Public API ────────────────────────────────────────────────────

pub use catalog::{Catalog, CatalogBuilder, CatalogError, Entry, EntryId};
pub use config::StackConfig;
pub use convert::ResultExt;
pub use error::CError;
pub use like::{ErrorLike, Primitive};
pub use multi::MultiError;
pub use render::{render, RenderMode};
pub use report::ErrorReport;
pub use stack::{Frame, StackTrace};
pub use template::TemplateError;

/// Convenience Result alias.
pub type CResult<T> = Result<T, CError>;
