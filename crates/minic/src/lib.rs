//! MiniC front end - lexical, syntax and semantic analysis in one pass
//!
//! The parser pulls tokens from the scanner and calls into the semantic
//! analyzer as each production is recognized. There is no AST; the only
//! artefact of a successful run is the scope tree.
//!
//! ## Architecture
//!
//! - **Lexer** (`lexer/`): logos-driven token automaton and line-tracking scanner
//! - **Parser** (`parser/`): recursive descent with one-token rewindable lookahead
//! - **Sema** (`sema/`): types, scope tree and type rules
//! - **Driver** (`driver/`): `analyze` entry point and dump options
//! - **Common** (`common/`): errors, spans, diagnostic rendering

pub mod common;
pub mod driver;
pub mod lexer;
pub mod parser;
pub mod sema;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{analyze, analyze_with, dump_tokens, read_source, Analysis, AnalyzeConfig};
pub use sema::ScopeTree;
