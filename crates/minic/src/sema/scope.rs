//! Symbol table and scope management
//!
//! Scopes and symbols live in two arenas and refer to each other by index.
//! Nothing is removed when a scope is left, so the whole tree stays available
//! for reporting once analysis is over.

use std::fmt;

use log::debug;
use string_interner::{DefaultStringInterner, DefaultSymbol};

use super::types::DataType;

/// Index of a scope in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Index of a symbol in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// A function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: DataType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function { params: Vec<Param> },
}

/// Payload-free view of [`SymbolKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Variable,
    Parameter,
    Function,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Variable => f.write_str("variable"),
            Category::Parameter => f.write_str("parameter"),
            Category::Function => f.write_str("function"),
        }
    }
}

/// A symbol in the symbol table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: DataType,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            ty,
        }
    }

    pub fn parameter(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
            ty,
        }
    }

    /// Functions never return a value
    pub fn function(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function { params },
            ty: DataType::Void,
        }
    }

    pub fn category(&self) -> Category {
        match self.kind {
            SymbolKind::Variable => Category::Variable,
            SymbolKind::Parameter => Category::Parameter,
            SymbolKind::Function { .. } => Category::Function,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function { .. })
    }

    /// Declared parameters, empty for anything but a function
    pub fn params(&self) -> &[Param] {
        match &self.kind {
            SymbolKind::Function { params } => params,
            _ => &[],
        }
    }

    pub fn param_count(&self) -> usize {
        self.params().len()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SymbolKind::Variable => write!(f, "{} ({})", self.name, self.ty),
            SymbolKind::Parameter => write!(f, "{} ({}, parameter)", self.name, self.ty),
            SymbolKind::Function { params } => {
                write!(f, "{} ({} function(", self.name, self.ty)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {}", param.ty, param.name)?;
                }
                f.write_str("))")
            }
        }
    }
}

/// Declaration-ordered member of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeItem {
    Symbol(SymbolId),
    Scope(ScopeId),
}

#[derive(Debug)]
struct ScopeNode {
    parent: Option<ScopeId>,
    items: Vec<ScopeItem>,
}

#[derive(Debug)]
struct SymbolEntry {
    key: DefaultSymbol,
    scope: ScopeId,
    symbol: Symbol,
}

/// Tree of lexical scopes rooted at the global scope
#[derive(Debug)]
pub struct ScopeTree {
    names: DefaultStringInterner,
    scopes: Vec<ScopeNode>,
    symbols: Vec<SymbolEntry>,
    current: ScopeId,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            names: DefaultStringInterner::new(),
            scopes: vec![ScopeNode {
                parent: None,
                items: Vec::new(),
            }],
            symbols: Vec::new(),
            current: ScopeId(0),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Push a new child scope under the current one and make it current
    pub fn enter(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(ScopeNode {
            parent: Some(self.current),
            items: Vec::new(),
        });
        self.scopes[self.current.0].items.push(ScopeItem::Scope(id));
        self.current = id;
        debug!("entered scope {} (depth {})", id.0, self.depth(id));
        id
    }

    /// Return to the parent scope; a no-op at the global scope
    pub fn leave(&mut self) -> bool {
        match self.scopes[self.current.0].parent {
            Some(parent) => {
                debug!("left scope {}", self.current.0);
                self.current = parent;
                true
            }
            None => false,
        }
    }

    /// Define a new symbol in the current scope, or `None` if the name is
    /// already taken there
    pub fn define(&mut self, symbol: Symbol) -> Option<SymbolId> {
        if self.lookup_local(&symbol.name).is_some() {
            return None;
        }

        let key = self.names.get_or_intern(&symbol.name);
        let id = SymbolId(self.symbols.len());
        debug!("declared {} in scope {}", symbol, self.current.0);
        self.symbols.push(SymbolEntry {
            key,
            scope: self.current,
            symbol,
        });
        self.scopes[self.current.0].items.push(ScopeItem::Symbol(id));
        Some(id)
    }

    fn find_in(&self, scope: ScopeId, key: DefaultSymbol) -> Option<SymbolId> {
        self.symbols_in(scope).find(|id| self.symbols[id.0].key == key)
    }

    /// Look up a name in the current scope only
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        let key = self.names.get(name)?;
        self.find_in(self.current, key)
    }

    /// Look up a name from the current scope outwards, nearest declaration first
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let key = self.names.get(name)?;
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(found) = self.find_in(id, key) {
                return Some(found);
            }
            scope = self.scopes[id.0].parent;
        }
        None
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0].symbol
    }

    /// Scope a symbol was declared in
    pub fn scope_of(&self, id: SymbolId) -> ScopeId {
        self.symbols[id.0].scope
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    /// Child scopes in the order they were entered
    pub fn children_of(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        self.scopes[scope.0].items.iter().filter_map(|item| match item {
            ScopeItem::Scope(id) => Some(*id),
            ScopeItem::Symbol(_) => None,
        })
    }

    /// Symbols of one scope in declaration order
    pub fn symbols_in(&self, scope: ScopeId) -> impl Iterator<Item = SymbolId> + '_ {
        self.scopes[scope.0].items.iter().filter_map(|item| match item {
            ScopeItem::Symbol(id) => Some(*id),
            ScopeItem::Scope(_) => None,
        })
    }

    pub fn depth(&self, scope: ScopeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.scopes[scope.0].parent;
        while let Some(id) = cursor {
            depth += 1;
            cursor = self.scopes[id.0].parent;
        }
        depth
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    fn fmt_scope(&self, f: &mut fmt::Formatter<'_>, scope: ScopeId, depth: usize) -> fmt::Result {
        for item in &self.scopes[scope.0].items {
            write!(f, "{:indent$}", "", indent = depth * 2)?;
            match item {
                ScopeItem::Symbol(id) => writeln!(f, "{}", self.symbol(*id))?,
                ScopeItem::Scope(id) => {
                    writeln!(f, "[Scope]")?;
                    self.fmt_scope(f, *id, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Global]")?;
        self.fmt_scope(f, self.global(), 1)
    }
}
