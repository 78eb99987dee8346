//! Serializable view of an error tree, for API layers.
//!
//! Mirrors verbose rendering: stacks appear only where `Verbose` would
//! print them, so an inherited stack is emitted once per chain.
//!
//! ```rust
//! use cerror::{CError, ErrorReport};
//!
//! let inner = CError::from_parts("DAS", 1001, "db1 down", None);
//! let outer = CError::from_parts("API", 7, "request failed", Some(inner.into()));
//! let report = ErrorReport::from_node(&outer, false);
//! assert_eq!(report.code.as_deref(), Some("API-7"));
//! assert_eq!(report.causes[0].code.as_deref(), Some("DAS-1001"));
//! ```

use serde::Serialize;

use crate::error::CError;
use crate::like::ErrorLike;
use crate::multi::MultiError;
use crate::stack::{Frame, StackTrace};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// `"{header}-{code}"` for nodes, absent for primitives and aggregates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<Frame>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<ErrorReport>,
}

impl ErrorReport {
    pub fn new(err: &ErrorLike, with_stack: bool) -> Self {
        match err {
            ErrorLike::Node(node) => Self::from_node(node, with_stack),
            ErrorLike::Multi(multi) => Self::from_multi(multi, with_stack),
            ErrorLike::Primitive(p) => Self {
                code: None,
                message: p.error().to_string(),
                stack: frames(p.stack(), with_stack),
                causes: Vec::new(),
            },
        }
    }

    pub fn from_node(node: &CError, with_stack: bool) -> Self {
        let (stack, causes) = match node.wrapped() {
            None => (frames(Some(node.own_stack()), with_stack), Vec::new()),
            Some(wrapped) => {
                let causes = match wrapped {
                    ErrorLike::Multi(multi) => children(multi, with_stack),
                    other => vec![Self::new(other, with_stack)],
                };
                let stack = if wrapped.stack_trace().is_none() {
                    frames(Some(node.own_stack()), with_stack)
                } else {
                    Vec::new()
                };
                (stack, causes)
            }
        };

        Self {
            code: Some(node.code()),
            message: node.message().to_string(),
            stack,
            causes,
        }
    }

    pub fn from_multi(multi: &MultiError, with_stack: bool) -> Self {
        Self {
            code: None,
            message: format!("{} error(s) occurred", multi.len()),
            stack: Vec::new(),
            causes: children(multi, with_stack),
        }
    }
}

fn children(multi: &MultiError, with_stack: bool) -> Vec<ErrorReport> {
    multi.iter().map(|c| ErrorReport::new(c, with_stack)).collect()
}

fn frames(stack: Option<&StackTrace>, with_stack: bool) -> Vec<Frame> {
    match stack {
        Some(stack) if with_stack => stack.frames().to_vec(),
        _ => Vec::new(),
    }
}
