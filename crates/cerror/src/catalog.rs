//! Error catalog: `(header, code)` → message template.
//!
//! Registration happens once, single-threaded, through [`CatalogBuilder`].
//! [`CatalogBuilder::build`] freezes the table into a [`Catalog`], which
//! has no registration API, so late registration does not compile.
//!
//! A frozen catalog can be installed as the process-wide table:
//!
//! ```rust
//! use cerror::catalog;
//!
//! let cat = catalog::init(|b| {
//!     b.register("DAS", 1001, "failed to connect to %s: %s")?;
//!     b.register("DAS", 1002, "query timed out after %dms")?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let entry = catalog::lookup("DAS", 1001);
//! assert_eq!(entry.template(), "failed to connect to %s: %s");
//! assert_eq!(cat.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;
#[cfg(feature = "metrics")]
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::error::CError;
use crate::like::ErrorLike;

/// Catalog failures. Raised only during the initialisation phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate catalog entry {header}-{code}")]
    Duplicate { header: String, code: u32 },

    #[error("process catalog already installed")]
    AlreadyInstalled,
}

/// Dense index of an entry inside its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u32);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// One registered error class.
pub struct Entry {
    id: EntryId,
    header: Arc<str>,
    code: u32,
    template: Arc<str>,
    #[cfg(feature = "metrics")]
    pub(crate) hits: Arc<AtomicU64>,
}

impl Entry {
    #[inline]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[inline]
    pub fn header(&self) -> &str {
        &self.header
    }

    #[inline]
    pub fn err_code(&self) -> u32 {
        self.code
    }

    #[inline]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// `"{header}-{code}"`.
    pub fn code(&self) -> String {
        format!("{}-{}", self.header, self.code)
    }

    pub(crate) fn header_arc(&self) -> Arc<str> {
        Arc::clone(&self.header)
    }

    pub(crate) fn template_arc(&self) -> Arc<str> {
        Arc::clone(&self.template)
    }

    /// Create an error node bound to this entry. Same as [`CError::new`].
    #[inline(never)]
    pub fn instantiate(&self, wrapped: Option<ErrorLike>) -> CError {
        CError::from_entry(self, wrapped, 1)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("code", &format_args!("{}-{}", self.header, self.code))
            .field("template", &self.template)
            .finish()
    }
}

/// Single-threaded registration phase.
#[derive(Default)]
pub struct CatalogBuilder {
    entries: Vec<Entry>,
    index: HashMap<Arc<str>, HashMap<u32, EntryId>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an error class. Duplicate `(header, code)` pairs are rejected.
    pub fn register(
        &mut self,
        header: impl Into<String>,
        code: u32,
        template: impl Into<String>,
    ) -> Result<EntryId, CatalogError> {
        let header: Arc<str> = Arc::from(header.into());

        let codes = self.index.entry(Arc::clone(&header)).or_default();
        if codes.contains_key(&code) {
            tracing::warn!(header = %header, code, "rejecting duplicate catalog entry");
            return Err(CatalogError::Duplicate {
                header: header.to_string(),
                code,
            });
        }

        let id = EntryId(self.entries.len() as u32);
        codes.insert(code, id);

        let template: Arc<str> = Arc::from(template.into());
        tracing::debug!(header = %header, code, template = %template, %id, "registered catalog entry");

        self.entries.push(Entry {
            id,
            header,
            code,
            template,
            #[cfg(feature = "metrics")]
            hits: Arc::new(AtomicU64::new(0)),
        });

        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Close the registration phase.
    pub fn build(self) -> Catalog {
        Catalog {
            entries: self.entries,
            index: self.index,
        }
    }
}

/// Frozen, read-only catalog. Safe for unsynchronised concurrent reads.
pub struct Catalog {
    entries: Vec<Entry>,
    index: HashMap<Arc<str>, HashMap<u32, EntryId>>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Look up a registered pair.
    ///
    /// # Panics
    ///
    /// If `(header, code)` was never registered. That is a build-time
    /// contract violation, not a runtime condition.
    #[track_caller]
    pub fn lookup(&self, header: &str, code: u32) -> &Entry {
        match self.try_lookup(header, code) {
            Some(entry) => entry,
            None => panic!("unregistered error catalog entry {}-{}", header, code),
        }
    }

    pub fn try_lookup(&self, header: &str, code: u32) -> Option<&Entry> {
        let id = self.index.get(header)?.get(&code)?;
        self.entries.get(id.0 as usize)
    }

    /// # Panics
    ///
    /// If `id` did not come from this catalog.
    #[track_caller]
    pub fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

// ── Process-wide table ────────────────────────────────────────────

static GLOBAL: OnceCell<Catalog> = OnceCell::new();

/// Install `catalog` as the process-wide table. Only one install succeeds.
pub fn install(catalog: Catalog) -> Result<&'static Catalog, CatalogError> {
    let entries = catalog.len();
    GLOBAL
        .set(catalog)
        .map_err(|_| CatalogError::AlreadyInstalled)?;
    tracing::info!(entries, "error catalog installed");
    Ok(global())
}

/// Run the registration phase and install the result in one step.
pub fn init<F>(register: F) -> Result<&'static Catalog, CatalogError>
where
    F: FnOnce(&mut CatalogBuilder) -> Result<(), CatalogError>,
{
    if GLOBAL.get().is_some() {
        return Err(CatalogError::AlreadyInstalled);
    }
    let mut builder = CatalogBuilder::new();
    register(&mut builder)?;
    install(builder.build())
}

/// The process-wide table.
///
/// # Panics
///
/// If no catalog has been installed yet.
#[track_caller]
pub fn global() -> &'static Catalog {
    match GLOBAL.get() {
        Some(catalog) => catalog,
        None => panic!("error catalog used before install"),
    }
}

pub fn try_global() -> Option<&'static Catalog> {
    GLOBAL.get()
}

/// [`Catalog::lookup`] against the process-wide table.
#[track_caller]
pub fn lookup(header: &str, code: u32) -> &'static Entry {
    global().lookup(header, code)
}
