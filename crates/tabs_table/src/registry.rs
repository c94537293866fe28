//! Discovery and lookup of table definitions by name.
//!
//! Definitions are registered explicitly in a [`Catalog`] at start-up.
//! [`Registry::discover`] then selects the catalog entries declared under a
//! root module, which gives the "every table below this root" view without
//! runtime reflection.

use std::collections::btree_map;
use std::collections::BTreeMap;

use tabs_common::Kwargs;
use tracing::debug;

use crate::table::{Definition, Table, TableDef};

/// Errors from building or querying a [`Registry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No definition with the requested name is registered.
    #[error("Table not available. Available tables: {}", .available.join(", "))]
    NotAvailable {
        /// The name that was looked up.
        requested: String,
        /// Every registered name, sorted.
        available: Vec<&'static str>,
    },

    /// Two different definitions share a name.
    #[error("duplicate table name '{name}': {first} and {second}")]
    Duplicate {
        /// The shared name.
        name: &'static str,
        /// Type path of the definition registered first.
        first: &'static str,
        /// Type path of the conflicting definition.
        second: &'static str,
    },
}

/// Every table definition known to a program.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: Vec<Definition>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of table type `T`.
    pub fn with<T: TableDef>(mut self) -> Self {
        self.push(Definition::of::<T>());
        self
    }

    /// Adds a definition.
    pub fn push(&mut self, definition: Definition) {
        self.definitions.push(definition);
    }

    /// Registered definitions, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = Definition> + '_ {
        self.definitions.iter().copied()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Name-indexed set of table definitions.
///
/// Built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tables: BTreeMap<&'static str, Definition>,
}

impl Registry {
    /// Indexes the given definitions by name.
    ///
    /// Registering the same definition twice is harmless; two different
    /// definitions with one name is an error.
    pub fn new<I>(definitions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Definition>,
    {
        let mut tables: BTreeMap<&'static str, Definition> = BTreeMap::new();
        for definition in definitions {
            match tables.get(definition.name()) {
                Some(existing) if *existing != definition => {
                    return Err(RegistryError::Duplicate {
                        name: definition.name(),
                        first: existing.type_path(),
                        second: definition.type_path(),
                    });
                }
                Some(_) => {}
                None => {
                    tables.insert(definition.name(), definition);
                }
            }
        }
        Ok(Self { tables })
    }

    /// Indexes the catalog entries declared in module `root` or below it.
    pub fn discover(catalog: &Catalog, root: &str) -> Result<Self, RegistryError> {
        let registry = Self::new(catalog.iter().filter(|d| is_under(d.module_path(), root)))?;
        debug!(root, tables = registry.len(), "discovered tables");
        Ok(registry)
    }

    /// Looks up a definition by name.
    pub fn definition(&self, name: &str) -> Result<Definition, RegistryError> {
        self.tables
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::NotAvailable {
                requested: name.to_string(),
                available: self.tables.keys().copied().collect(),
            })
    }

    /// Looks up a definition by name and binds it to `kwargs`.
    pub fn get(&self, name: &str, kwargs: Kwargs) -> Result<Box<dyn Table>, RegistryError> {
        Ok(self.definition(name)?.instantiate(kwargs))
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.keys().copied()
    }

    /// Registered definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = Definition> + '_ {
        self.tables.values().copied()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'static str;
    type IntoIter = std::iter::Copied<btree_map::Keys<'a, &'static str, Definition>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.keys().copied()
    }
}

fn is_under(module: &str, root: &str) -> bool {
    module == root
        || module
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with("::"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_under_respects_segments() {
        assert!(is_under("app::tables", "app::tables"));
        assert!(is_under("app::tables::sales", "app::tables"));
        assert!(!is_under("app::tables_old", "app::tables"));
        assert!(!is_under("app", "app::tables"));
    }

    #[test]
    fn empty_registry_lists_nothing() {
        let registry = Registry::new(Vec::new()).unwrap();
        assert!(registry.is_empty());
        let err = registry.definition("People").unwrap_err();
        assert_eq!(err.to_string(), "Table not available. Available tables: ");
    }
}
