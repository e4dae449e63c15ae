//! User functions (closures, bound methods) and host‑provided natives.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::{EnvRef, Environment};
use crate::error::Result;
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;

/// A `fun` declaration or method paired with the scope it was defined in.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this method whose closure has `this` bound to `instance`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        debug!("Binding method '{}'", self.name());

        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment.into_ref(),
            is_initializer: self.is_initializer,
        }
    }

    /// Run the body in a fresh scope chained to the closure.  The caller has
    /// already checked the argument count.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        info!("Calling '{}' with {} arguments", self.name(), arguments.len());

        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(param.lexeme.as_str(), argument);
        }

        let flow: Flow = interpreter.execute_block(&self.declaration.body, environment.into_ref())?;

        if self.is_initializer {
            return Ok(self.closure.borrow().get_local("this").unwrap_or(Value::Nil));
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

// The closure may contain this function, so it is left out.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LoxFunction {{ name: {:?}, arity: {}, is_initializer: {} }}",
            self.name(),
            self.arity(),
            self.is_initializer
        )
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

/// Failure modes a native body can report.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NativeError {
    /// Becomes a runtime error at the call site.
    #[error("{0}")]
    Message(String),

    /// The script asked the host to stop with this status.
    #[error("exit with status {0}")]
    Exit(i32),
}

pub type NativeFn = fn(&[Value]) -> std::result::Result<Value, NativeError>;

/// A built‑in callable with a fixed arity.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: NativeFn,
}

impl NativeFunction {
    pub fn call(&self, arguments: &[Value]) -> std::result::Result<Value, NativeError> {
        debug!("Calling native function '{}'", self.name);
        (self.function)(arguments)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction {{ name: {:?}, arity: {} }}", self.name, self.arity)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}
