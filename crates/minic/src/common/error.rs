//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use thiserror::Error;

use super::Span;
use crate::lexer::Token;

/// Fatal analysis error with source location.
///
/// Analysis stops at the first error, so a pass produces at most one of these.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexical error on line {line} near '{lexeme}': {message}")]
    Lexical {
        message: String,
        line: usize,
        lexeme: String,
        span: Span,
    },

    #[error("Syntax error on line {line} near '{lexeme}': {message}")]
    Syntax {
        message: String,
        line: usize,
        lexeme: String,
        span: Span,
    },

    #[error("Semantic error on line {line} near '{lexeme}': {message}")]
    Semantic {
        message: String,
        line: usize,
        lexeme: String,
        span: Span,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexical(message: impl Into<String>, token: &Token) -> Self {
        Self::Lexical {
            message: message.into(),
            line: token.line,
            lexeme: token.text.clone(),
            span: token.span,
        }
    }

    pub fn syntax(message: impl Into<String>, token: &Token) -> Self {
        Self::Syntax {
            message: message.into(),
            line: token.line,
            lexeme: token.text.clone(),
            span: token.span,
        }
    }

    pub fn semantic(message: impl Into<String>, token: &Token) -> Self {
        Self::Semantic {
            message: message.into(),
            line: token.line,
            lexeme: token.text.clone(),
            span: token.span,
        }
    }

    /// Human-readable description without the location prefix
    pub fn message(&self) -> String {
        match self {
            Self::Lexical { message, .. }
            | Self::Syntax { message, .. }
            | Self::Semantic { message, .. } => message.clone(),
            Self::Io(err) => err.to_string(),
        }
    }

    /// 1-based source line, `0` for errors not tied to the source
    pub fn line(&self) -> usize {
        match self {
            Self::Lexical { line, .. } | Self::Syntax { line, .. } | Self::Semantic { line, .. } => {
                *line
            }
            Self::Io(_) => 0,
        }
    }

    /// Literal text of the offending token
    pub fn lexeme(&self) -> &str {
        match self {
            Self::Lexical { lexeme, .. }
            | Self::Syntax { lexeme, .. }
            | Self::Semantic { lexeme, .. } => lexeme,
            Self::Io(_) => "",
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexical { span, .. } | Self::Syntax { span, .. } | Self::Semantic { span, .. } => {
                Some(*span)
            }
            Self::Io(_) => None,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::Lexical { .. })
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Semantic { .. })
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    fn diagnostic(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        let title = match error {
            CompileError::Lexical { .. } => "Lexical error",
            CompileError::Syntax { .. } => "Syntax error",
            CompileError::Semantic { .. } => "Semantic error",
            CompileError::Io(err) => return Diagnostic::error().with_message(format!("IO error: {err}")),
        };

        let mut diagnostic = Diagnostic::error()
            .with_message(title)
            .with_notes(vec![format!(
                "on line {}, found token \"{}\"",
                error.line(),
                error.lexeme()
            )]);
        if let Some(span) = error.span() {
            diagnostic = diagnostic.with_labels(vec![
                Label::primary(file_id, span.start..span.end).with_message(error.message()),
            ]);
        }
        diagnostic
    }

    /// Render one error into an arbitrary terminal writer
    pub fn render(
        &self,
        writer: &mut dyn WriteColor,
        file_id: usize,
        error: &CompileError,
    ) -> Result<(), codespan_reporting::files::Error> {
        term::emit(writer, &self.config, &self.files, &Self::diagnostic(file_id, error))
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let _ = self.render(&mut self.writer.lock(), file_id, error);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
