//! Helpers shared by the end-to-end test files.
#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::interpreter::Interpreter;
use rox::lox::{Lox, Status};
use rox::scanner::Layout;

/// In-memory sink that stays readable after the interpreter takes a clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session whose `print` output lands in the returned buffer.
pub fn session(layout: Layout) -> (Lox, SharedBuffer) {
    let output = SharedBuffer::default();
    let lox = Lox::with_interpreter(Interpreter::with_output(output.clone()), layout);
    (lox, output)
}

/// Outcome of running one program in a fresh session.
pub struct Run {
    pub status: Status,
    pub output: String,
    pub errors: Vec<String>,
}

pub fn run(source: &str) -> Run {
    let (mut lox, output) = session(Layout::Braces);
    let status = lox.run(source);

    Run {
        status,
        output: output.contents(),
        errors: lox
            .diagnostics()
            .errors()
            .iter()
            .map(|e| e.to_string())
            .collect(),
    }
}

/// Value of the last expression statement; panics on any error.
pub fn eval(source: &str) -> String {
    let result = run(source);

    match result.status {
        Status::Completed(value) => value,
        other => panic!("{:?}: {:?}", other, result.errors),
    }
}

/// The single error `source` produces.
pub fn error(source: &str) -> String {
    let result = run(source);

    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    result.errors[0].clone()
}
