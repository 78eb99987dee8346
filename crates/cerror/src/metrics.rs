//! Per-entry instantiation counters.
//!
//! Enabled with `feature = "metrics"`. Every node created from a catalog
//! entry (`new`, `instantiate`, and `renew`/`wrap`/`wrap_with` on such a
//! node) does one `AtomicU64::fetch_add(1, Relaxed)` on the entry's
//! counter. `wrap_with` and `ResultExt::wrap_err_with` build one node, so
//! a renewed and wrapped failure counts once.
//!
//! ```text
//! CError::new(entry, ..) / proto.renew(..)
//!       │
//!       ▼
//! entry.hits.fetch_add(1, Relaxed)
//!       │
//!       ▼  Prometheus scrape / log dump
//! dump(&catalog) → [{ code, template, count }]
//! ```

use std::sync::atomic::Ordering;

use crate::catalog::{Catalog, Entry, EntryId};

/// Current count for one entry.
#[inline]
pub fn count(entry: &Entry) -> u64 {
    entry.hits.load(Ordering::Relaxed)
}

/// Reset one entry's counter. Returns the old value.
#[inline]
pub fn reset(entry: &Entry) -> u64 {
    entry.hits.swap(0, Ordering::Relaxed)
}

/// Reset every counter in the catalog.
pub fn reset_all(catalog: &Catalog) {
    for entry in catalog.iter() {
        entry.hits.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of one entry's counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub id: EntryId,
    pub code: String,
    pub count: u64,
}

/// All entries with a non-zero count, in registration order.
pub fn dump(catalog: &Catalog) -> Vec<EntrySnapshot> {
    catalog
        .iter()
        .filter_map(|entry| {
            let count = count(entry);
            (count > 0).then(|| EntrySnapshot {
                id: entry.id(),
                code: entry.code(),
                count,
            })
        })
        .collect()
}

/// Dump non-zero counters as aligned text, one entry per line.
pub fn dump_string(catalog: &Catalog) -> String {
    let mut out = String::new();
    for snap in dump(catalog) {
        out.push_str(&format!(
            "[{:>5}] count={:<10} code={}\n",
            snap.id.0, snap.count, snap.code
        ));
    }
    out
}

/// Dump counters in OpenMetrics/Prometheus exposition format.
pub fn dump_prometheus(catalog: &Catalog) -> String {
    let mut out = String::from(
        "# HELP cerror_total Errors created per catalog entry\n\
         # TYPE cerror_total counter\n",
    );
    for entry in catalog.iter() {
        let count = count(entry);
        if count == 0 {
            continue;
        }
        out.push_str(&format!(
            "cerror_total{{header=\"{}\",code=\"{}\"}} {}\n",
            escape_label(entry.header()),
            entry.err_code(),
            count
        ));
    }
    out
}

/// Escape a label value per the exposition format: `\\`, `\"` and `\n`.
fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}
