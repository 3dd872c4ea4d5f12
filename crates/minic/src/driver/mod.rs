//! Analysis driver: runs the fused lex/parse/check pass over one source

use std::fs;
use std::path::Path;

use log::info;

use crate::common::CompileResult;
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::sema::ScopeTree;

/// Options for a single analysis run
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeConfig {
    /// Print every token to stderr before parsing
    pub dump_tokens: bool,
    /// Print the finished scope tree to stderr
    pub dump_scopes: bool,
    pub verbose: bool,
}

/// Result of a successful analysis
#[derive(Debug)]
pub struct Analysis {
    pub scopes: ScopeTree,
}

impl Analysis {
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }
}

/// Read a source file, surfacing failures as [`CompileError::Io`]
///
/// [`CompileError::Io`]: crate::common::CompileError::Io
pub fn read_source(path: &Path) -> CompileResult<String> {
    let source = fs::read_to_string(path)?;
    info!("read {} ({} bytes)", path.display(), source.len());
    Ok(source)
}

/// Analyze a program with default options
pub fn analyze(source: &str) -> CompileResult<Analysis> {
    analyze_with(source, &AnalyzeConfig::default())
}

/// Analyze a program, honouring the dump options in `config`
pub fn analyze_with(source: &str, config: &AnalyzeConfig) -> CompileResult<Analysis> {
    if config.dump_tokens {
        eprintln!("=== Tokens ===");
        eprint!("{}", dump_tokens(source));
        eprintln!("=== End Tokens ===\n");
    }

    info!("analysis started ({} bytes)", source.len());
    if config.verbose {
        eprintln!("Analyzing...");
    }

    let scopes = Parser::new(source)?.parse()?;
    info!(
        "analysis finished: {} scope(s), {} symbol(s)",
        scopes.scope_count(),
        scopes.symbol_count()
    );

    if config.dump_scopes {
        eprintln!("=== Scopes ===");
        eprint!("{}", scopes);
        eprintln!("=== End Scopes ===\n");
    }

    Ok(Analysis { scopes })
}

/// One line per token, `<line>: <KIND> '<text>'`, stopping after `Eof`
pub fn dump_tokens(source: &str) -> String {
    Scanner::new(source)
        .tokenize_all()
        .iter()
        .map(|token| format!("{}: {:?} '{}'\n", token.line, token.kind, token.text))
        .collect()
}
