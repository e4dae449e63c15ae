//! A `Lox` session ties the phases together: scan → parse → resolve →
//! interpret.  It owns the interpreter, the `ExprId` allocator and the
//! diagnostics so that state persists across REPL lines.

use log::{debug, info};

use crate::ast::{ExprIds, Stmt};
use crate::error::{Diagnostics, LoxError};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::{Layout, Scanner};
use crate::token::Token;

/// Process status for a static (scan, parse or resolve) error.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Process status for a runtime error.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// How one call to [`Lox::run`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Ran to completion; carries the last expression statement's value.
    Completed(String),

    /// Static errors were reported; nothing ran.
    StaticError,

    /// A runtime error was reported and execution stopped.
    RuntimeError,

    /// The script called `exit(code)`.
    Exit(i32),
}

impl Status {
    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Completed(_) => 0,
            Status::StaticError => EXIT_STATIC_ERROR,
            Status::RuntimeError => EXIT_RUNTIME_ERROR,
            Status::Exit(code) => *code,
        }
    }
}

pub struct Lox {
    interpreter: Interpreter,
    ids: ExprIds,
    diagnostics: Diagnostics,
    layout: Layout,
}

impl Lox {
    pub fn new(layout: Layout) -> Self {
        Self::with_interpreter(Interpreter::new(), layout)
    }

    /// Session around an already configured interpreter (e.g. one writing
    /// to a buffer).
    pub fn with_interpreter(interpreter: Interpreter, layout: Layout) -> Self {
        info!("Lox session created ({:?})", layout);

        Self {
            interpreter,
            ids: ExprIds::new(),
            diagnostics: Diagnostics::new(),
            layout,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Forget reported errors; globals and definitions are kept.
    pub fn reset(&mut self) {
        self.diagnostics.reset();
    }

    /// Scan `source`.  Errors go to the session diagnostics.
    pub fn tokenize(&mut self, source: &str) -> Vec<Token> {
        Scanner::with_layout(source, self.layout).scan_tokens(&mut self.diagnostics)
    }

    /// Scan and parse `source`; `None` if any static error was reported.
    pub fn parse(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let tokens: Vec<Token> = self.tokenize(source);
        let statements: Vec<Stmt> = Parser::new(&tokens, &mut self.ids).parse(&mut self.diagnostics);

        if self.diagnostics.had_error() {
            debug!("Parse produced static errors, not running");
            return None;
        }

        Some(statements)
    }

    /// Run `source` through every phase.
    pub fn run(&mut self, source: &str) -> Status {
        let Some(statements) = self.parse(source) else {
            return Status::StaticError;
        };

        Resolver::new(&mut self.interpreter).resolve(&statements, &mut self.diagnostics);

        if self.diagnostics.had_error() {
            debug!("Resolve produced static errors, not running");
            return Status::StaticError;
        }

        match self.interpreter.interpret(&statements) {
            Ok(value) => Status::Completed(value),
            Err(LoxError::Exit { code }) => {
                info!("Script requested exit with status {}", code);
                Status::Exit(code)
            }
            Err(err) => {
                self.diagnostics.report(err);
                Status::RuntimeError
            }
        }
    }
}
