//! Category hierarchy resolution
//!
//! The site menu only exposes a flat list of sub-category links per top-level
//! entry. The tree is recovered from the URLs themselves: a category whose URL
//! occurs inside another category's URL is that category's ancestor.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Separator between the names of a category path
pub const PATH_SEPARATOR: &str = "|";

/// A catalog category and its ancestor chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name of the category
    pub name: String,

    /// `(ancestor name, position)` pairs; position is the offset just past the
    /// ancestor's URL inside this category's URL
    parents: Vec<(String, usize)>,
}

impl Category {
    /// Creates a category discovered under a top-level menu entry
    pub fn new(name: impl Into<String>, top_level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: vec![(top_level.into(), 0)],
        }
    }

    /// Builds a category from an explicit ancestor list
    pub fn with_parents(name: impl Into<String>, parents: Vec<(String, usize)>) -> Self {
        Self {
            name: name.into(),
            parents,
        }
    }

    /// Ancestors in the order they were recorded
    pub fn parents(&self) -> &[(String, usize)] {
        &self.parents
    }

    fn add_parent(&mut self, name: String, position: usize) {
        self.parents.push((name, position));
    }

    /// Renders the root-to-self path, e.g. `"Dogs|Food|Dry food"`
    ///
    /// Ancestors are ordered by position; ancestors sharing a position keep
    /// their recording order.
    pub fn path(&self) -> String {
        let mut parents: Vec<&(String, usize)> = self.parents.iter().collect();
        parents.sort_by_key(|(_, position)| *position);

        parents
            .into_iter()
            .map(|(name, _)| name.as_str())
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A category with no descendant in the discovered set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCategory {
    /// Category href as found in the side menu
    pub url: String,
    pub category: Category,
}

/// One recorded ancestor relationship between two discovered categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ancestry {
    ancestor: usize,
    descendant: usize,
    position: usize,
}

/// Collects discovered categories and resolves them into leaf categories
#[derive(Debug, Default)]
pub struct CategoryHierarchy {
    /// Categories in discovery order, keyed by URL
    entries: Vec<(String, Category)>,
    index: HashMap<String, usize>,
}

impl CategoryHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the sub-categories found under one top-level menu entry
    ///
    /// Each `(url, name)` pair becomes a category whose only parent is
    /// `top_level` at position 0. A URL seen again replaces the earlier entry.
    pub fn seed<I>(&mut self, top_level: &str, subcategories: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (url, name) in subcategories {
            if url.is_empty() {
                tracing::debug!("Skipping sub-category '{}' without URL", name);
                continue;
            }

            let category = Category::new(name, top_level);
            match self.index.get(&url) {
                Some(&slot) => self.entries[slot].1 = category,
                None => {
                    self.index.insert(url.clone(), self.entries.len());
                    self.entries.push((url, category));
                }
            }
        }
    }

    /// Number of categories currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds every ancestor relationship in the set
    ///
    /// A is an ancestor of B when A's URL occurs inside B's (distinct) URL.
    /// Every ordered pair is examined, so this is quadratic in the number of
    /// categories.
    ///
    /// The match is containment anywhere, not only at the start: `/a/` is an
    /// ancestor of `/x/a/` too. Side-menu hrefs on the site are absolute paths
    /// nested under their parent, where both readings agree; the position
    /// still orders the chain when they do not.
    fn ancestries(&self) -> Vec<Ancestry> {
        let mut found = Vec::new();

        for (ancestor, (ancestor_url, _)) in self.entries.iter().enumerate() {
            for (descendant, (descendant_url, _)) in self.entries.iter().enumerate() {
                if ancestor_url == descendant_url {
                    continue;
                }

                if let Some(offset) = descendant_url.find(ancestor_url.as_str()) {
                    found.push(Ancestry {
                        ancestor,
                        descendant,
                        position: offset + ancestor_url.len(),
                    });
                }
            }
        }

        found
    }

    /// Resolves the hierarchy, returning only the leaf categories
    ///
    /// Every ancestor is appended to its descendants' parent lists and then
    /// dropped, so each returned category carries its complete chain.
    /// Leaves keep their discovery order.
    pub fn normalize(self) -> Vec<LeafCategory> {
        let ancestries = self.ancestries();
        let mut entries = self.entries;
        let mut ancestors = HashSet::new();

        for link in &ancestries {
            let name = entries[link.ancestor].1.name.clone();
            entries[link.descendant].1.add_parent(name, link.position);
            ancestors.insert(link.ancestor);
        }

        entries
            .into_iter()
            .enumerate()
            .filter(|(slot, _)| !ancestors.contains(slot))
            .map(|(_, (url, category))| LeafCategory { url, category })
            .collect()
    }
}
