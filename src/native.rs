//! Built‑in functions installed into the global scope before any user code
//! runs.

use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::callable::{NativeError, NativeFunction};
use crate::environment::Environment;
use crate::value::{Callable, Value};

/// Every native, in registration order.
pub const NATIVES: &[(&str, usize, crate::callable::NativeFn)] =
    &[("clock", 0, clock), ("exit", 1, exit)];

/// Define each native in `globals`.
pub fn define_globals(globals: &mut Environment) {
    for &(name, arity, function) in NATIVES {
        debug!("Defining native function '{}'", name);

        let native = NativeFunction {
            name,
            arity,
            function,
        };

        globals.define(name, Value::Callable(Callable::Native(Rc::new(native))));
    }

    info!("Defined {} native functions", NATIVES.len());
}

/// Seconds since the Unix epoch, millisecond resolution.
fn clock(_arguments: &[Value]) -> Result<Value, NativeError> {
    let millis: i64 = Utc::now().timestamp_millis();

    Ok(Value::Number(millis as f64 / 1000.0))
}

/// Ask the host to stop with the given status.
fn exit(arguments: &[Value]) -> Result<Value, NativeError> {
    match arguments.first() {
        Some(Value::Number(code)) => Err(NativeError::Exit(*code as i32)),
        _ => Err(NativeError::Message("Exit code must be a number.".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_recent() {
        match clock(&[]) {
            Ok(Value::Number(seconds)) => assert!(seconds > 1_600_000_000.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn exit_requires_a_number() {
        assert_eq!(exit(&[Value::Number(3.0)]).err(), Some(NativeError::Exit(3)));
        assert!(matches!(
            exit(&[Value::Nil]),
            Err(NativeError::Message(_))
        ));
    }
}
