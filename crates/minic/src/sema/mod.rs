//! Semantic analysis for MiniC

mod analyzer;
mod scope;
mod types;

pub use analyzer::SemanticAnalyzer;
pub use scope::{Category, Param, ScopeId, ScopeTree, Symbol, SymbolId, SymbolKind};
pub use types::DataType;
