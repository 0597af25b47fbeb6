//! Abstract Syntax Tree definitions
//!
//! Nodes live in a single arena owned by [`Ast`] and refer to each other by
//! [`NodeId`]. Parent links and symbol-table annotations are plain indices,
//! so the tree has no ownership cycles.

mod node;
mod types;

use std::fmt::Write as _;

pub use node::*;
pub use types::*;

use crate::common::Span;
use crate::frontend::sema::{Symbol, SymbolTables, TableId, TableRef};

/// A parsed program
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    tables: SymbolTables,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the arena; parent links are filled in by [`Ast::link_parents`]
    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::new(kind, span));
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Iterate over every node id in allocation order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    /// Point every child's parent link at the node that lists it
    pub fn link_parents(&mut self) {
        for id in 0..self.nodes.len() {
            let parent = NodeId::from_index(id);
            for child in self.nodes[id].kind.children() {
                self.nodes[child.index()].parent = Some(parent);
            }
        }
        if let Some(root) = self.root {
            self.nodes[root.index()].parent = None;
        }
    }

    // =========================================================================
    // Symbol table annotations
    // =========================================================================

    pub fn tables(&self) -> &SymbolTables {
        &self.tables
    }

    pub(crate) fn tables_mut(&mut self) -> &mut SymbolTables {
        &mut self.tables
    }

    pub(crate) fn attach_table(&mut self, id: NodeId, table: TableId) {
        self.nodes[id.index()].table = Some(table);
    }

    /// Table attached directly to `id`, if it opens a scope
    pub fn table_of(&self, id: NodeId) -> Option<TableId> {
        self.node(id).table
    }

    /// View of the table attached to `id`, for lookups by later passes
    pub fn symbol_table(&self, id: NodeId) -> Option<TableRef<'_>> {
        self.table_of(id).map(|table| self.tables.view(table))
    }

    /// Table of the closest ancestor-or-self carrying one
    pub fn nearest_table(&self, id: NodeId) -> Option<TableId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(table) = self.table_of(node) {
                return Some(table);
            }
            current = self.parent(node);
        }
        None
    }

    /// Resolve `name` as seen from `id`
    pub fn resolve(&self, id: NodeId, name: &str) -> Option<&Symbol> {
        let table = self.nearest_table(id)?;
        self.tables.lookup(table, name).ok()
    }

    /// Render every symbol table, owner first, for debugging
    pub fn dump_symbols(&self) -> String {
        let mut out = String::new();
        for id in self.ids() {
            let Some(table_id) = self.table_of(id) else {
                continue;
            };
            let table = self.tables.get(table_id);
            let owner = match self.kind(id) {
                NodeKind::Function { name, .. } => format!("function '{}'", name),
                kind => kind.name().to_string(),
            };
            let parent = table
                .parent()
                .map_or_else(|| "none".to_string(), |p| format!("{:?}", p));
            let _ = writeln!(out, "{:?} ({}, parent: {})", table_id, owner, parent);
            for symbol in table.sorted_symbols() {
                let _ = writeln!(out, "    {}", symbol);
            }
        }
        out
    }
}
