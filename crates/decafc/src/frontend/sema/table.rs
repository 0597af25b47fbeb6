//! Symbol tables and scope chains

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use super::symbol::Symbol;

/// Index of a table in [`SymbolTables`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u32);

impl TableId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

/// Failure of a table operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("'{name}' is already declared in this scope")]
    DuplicateDeclaration { name: String },

    #[error("'{name}' is not declared")]
    UnresolvedSymbol { name: String },
}

/// One scope: its own symbols plus a link to the enclosing scope
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    parent: Option<TableId>,
}

impl SymbolTable {
    pub fn new(parent: Option<TableId>) -> Self {
        Self {
            symbols: HashMap::new(),
            parent,
        }
    }

    pub fn parent(&self) -> Option<TableId> {
        self.parent
    }

    /// Insert a symbol; shadowing names from enclosing tables is allowed
    pub fn insert(&mut self, symbol: Symbol) -> Result<(), ScopeError> {
        if self.symbols.contains_key(&symbol.name) {
            return Err(ScopeError::DuplicateDeclaration { name: symbol.name });
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Look up a name in this table only
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols ordered by name
    pub fn sorted_symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.symbols.values().collect();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }
}

/// Arena owning every table of one program
#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    tables: Vec<SymbolTable>,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope nested in `parent`, or a root scope
    pub fn new_scope(&mut self, parent: Option<TableId>) -> TableId {
        let id = TableId(self.tables.len() as u32);
        self.tables.push(SymbolTable::new(parent));
        id
    }

    pub fn get(&self, id: TableId) -> &SymbolTable {
        &self.tables[id.index()]
    }

    pub fn get_mut(&mut self, id: TableId) -> &mut SymbolTable {
        &mut self.tables[id.index()]
    }

    pub fn insert(&mut self, id: TableId, symbol: Symbol) -> Result<(), ScopeError> {
        self.get_mut(id).insert(symbol)
    }

    /// Resolve `name` in `id`, then in each enclosing table
    pub fn lookup(&self, id: TableId, name: &str) -> Result<&Symbol, ScopeError> {
        let mut current = Some(id);
        while let Some(table_id) = current {
            let table = self.get(table_id);
            if let Some(symbol) = table.lookup_local(name) {
                return Ok(symbol);
            }
            current = table.parent;
        }
        Err(ScopeError::UnresolvedSymbol { name: name.to_string() })
    }

    /// Outermost table of the chain starting at `id`
    pub fn root_of(&self, id: TableId) -> TableId {
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            current = parent;
        }
        current
    }

    pub fn view(&self, id: TableId) -> TableRef<'_> {
        TableRef { tables: self, id }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// A table together with the arena it lives in, so lookups can climb
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a> {
    tables: &'a SymbolTables,
    id: TableId,
}

impl<'a> TableRef<'a> {
    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn lookup(&self, name: &str) -> Result<&'a Symbol, ScopeError> {
        self.tables.lookup(self.id, name)
    }

    pub fn lookup_local(&self, name: &str) -> Option<&'a Symbol> {
        self.tables.get(self.id).lookup_local(name)
    }

    pub fn parent(&self) -> Option<TableRef<'a>> {
        self.tables.get(self.id).parent.map(|id| self.tables.view(id))
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.tables.get(self.id)
    }
}
