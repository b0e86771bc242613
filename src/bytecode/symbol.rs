use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Variable name to slot index, numbered densely from 0 in first-use order.
///
/// Every variable is global. Indices are never reused or renumbered, so the
/// table only grows. It serializes as its ordered list of names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymbolTable {
    names: Vec<String>,
    store: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot of `name`, assigning the next free one on first use.
    pub fn resolve(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.store.get(name) {
            return index;
        }

        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.store.insert(name.to_string(), index);
        index
    }

    /// Looks up `name` without assigning a slot.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.store.get(name).copied()
    }

    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    /// Number of slots assigned, i.e. the next index to hand out.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (i as u32, name.as_str()))
    }
}

impl From<Vec<String>> for SymbolTable {
    fn from(names: Vec<String>) -> Self {
        let mut table = SymbolTable::new();
        for name in &names {
            table.resolve(name);
        }
        table
    }
}

impl From<SymbolTable> for Vec<String> {
    fn from(table: SymbolTable) -> Self {
        table.names
    }
}
