//! Title catalog.
//!
//! Maps normalized (lower-cased) titles to the dense, 0-based index shared
//! by every similarity matrix. Row order in the catalog source is the
//! index order; nothing ever renumbers an entry after load.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// What to do when two rows normalize to the same title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first row reachable by lookup; later rows keep their index
    /// but can only be reached as recommendations.
    #[default]
    KeepFirst,
    /// Refuse to build a catalog with duplicate normalized titles.
    Reject,
}

/// A single catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Normalized title.
    pub title: String,
    /// Row/column position in every similarity matrix.
    pub index: usize,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    title: String,
}

/// Normalized-title to index mapping.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    titles: Vec<String>,
    lookup: HashMap<String, usize>,
    shadowed: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from titles in index order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTitle`] under [`DuplicatePolicy::Reject`]
    /// when two titles normalize to the same key.
    pub fn from_titles<I, S>(titles: I, policy: DuplicatePolicy) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();

        for (index, raw) in titles.into_iter().enumerate() {
            let title = normalize_title(raw.as_ref());
            if let Some(&first) = catalog.lookup.get(&title) {
                if policy == DuplicatePolicy::Reject {
                    return Err(Error::DuplicateTitle {
                        title,
                        first,
                        duplicate: index,
                    });
                }
                log::warn!(
                    "Catalog row {} ({:?}) is shadowed by row {}",
                    index,
                    title,
                    first
                );
                catalog.shadowed.push(CatalogEntry {
                    title: title.clone(),
                    index,
                });
            } else {
                catalog.lookup.insert(title.clone(), index);
            }
            catalog.titles.push(title);
        }

        Ok(catalog)
    }

    /// Load a catalog from a CSV file with a `title` column.
    ///
    /// Other columns are ignored. Rows are indexed in file order.
    pub fn load_csv(path: &Path, policy: DuplicatePolicy) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;

        if !reader.headers()?.iter().any(|h| h == "title") {
            return Err(Error::MissingColumn("title"));
        }

        let mut titles = Vec::new();
        for row in reader.deserialize::<CatalogRow>() {
            titles.push(row?.title);
        }

        let catalog = Self::from_titles(titles, policy)?;
        log::info!(
            "Loaded catalog from {}: {} titles ({} shadowed)",
            path.display(),
            catalog.len(),
            catalog.shadowed.len()
        );
        Ok(catalog)
    }

    /// Resolve a title to its index. Matching is exact after case folding.
    pub fn resolve(&self, title: &str) -> Result<usize> {
        let key = normalize_title(title);
        self.lookup
            .get(&key)
            .copied()
            .ok_or(Error::NotFound { title: key })
    }

    /// Normalized title at `index`.
    pub fn title(&self, index: usize) -> Option<&str> {
        self.titles.get(index).map(String::as_str)
    }

    /// Display (title-cased) title at `index`.
    pub fn display_title_of(&self, index: usize) -> Option<String> {
        self.title(index).map(display_title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// All entries in index order, shadowed ones included.
    pub fn entries(&self) -> impl Iterator<Item = CatalogEntry> + '_ {
        self.titles.iter().enumerate().map(|(index, title)| CatalogEntry {
            title: title.clone(),
            index,
        })
    }

    /// Entries whose title is unreachable by lookup because an earlier row
    /// normalized to the same key.
    pub fn shadowed(&self) -> &[CatalogEntry] {
        &self.shadowed
    }
}

/// Case-fold a title into its lookup key.
pub fn normalize_title(title: &str) -> String {
    title.to_lowercase()
}

/// Title-case a title for display.
///
/// Every run of cased letters starts upper-case and continues lower-case.
/// Anything that is not a cased letter (spaces, digits, punctuation) ends
/// the run, so `"don't look up"` becomes `"Don'T Look Up"`.
pub fn display_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_word = false;

    for c in title.chars() {
        if c.is_lowercase() || c.is_uppercase() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
