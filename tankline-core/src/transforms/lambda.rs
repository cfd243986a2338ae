//! Generic mapping between typed values

use alloc::boxed::Box;
use core::fmt;

use crate::value::{Value, ValueKind, ValueType};

type MapFn = dyn Fn(Value) -> Option<Value>;

/// Wraps a pure unary function `I -> O` (or `I -> Option<O>`)
///
/// Used for small type or semantic conversions, such as turning a driver
/// status code into a health flag.
///
/// ## Skip conditions
///
/// Exactly one output per input, except:
/// - the input cannot be converted to `I` (e.g. `2.5` into `i32`), or
/// - a function built with [`filter_map`](Self::filter_map) returns `None`.
///
/// In both cases nothing is emitted downstream.
///
/// ## Purity
///
/// The function must not mutate pipeline state. `Fn` rules out mutating its
/// own captures; reaching shared state through interior mutability is still
/// possible and is not allowed. External side effects such as logging are
/// fine.
///
/// ```rust
/// use tankline_core::{Lambda, Value};
///
/// let healthy = Lambda::new(|code: i32| code == 1);
/// assert_eq!(healthy.apply(Value::Int(1)), Some(Value::Bool(true)));
/// assert_eq!(healthy.apply(Value::Int(0)), Some(Value::Bool(false)));
/// ```
pub struct Lambda {
    input: ValueKind,
    output: ValueKind,
    func: Box<MapFn>,
}

impl Lambda {
    /// Map every input through `f`
    pub fn new<I, O, F>(f: F) -> Self
    where
        I: ValueType,
        O: ValueType,
        F: Fn(I) -> O + 'static,
    {
        Self {
            input: I::KIND,
            output: O::KIND,
            func: Box::new(move |value| I::from_value(value).map(|input| f(input).into_value())),
        }
    }

    /// Map inputs through `f`, emitting nothing when it returns `None`
    pub fn filter_map<I, O, F>(f: F) -> Self
    where
        I: ValueType,
        O: ValueType,
        F: Fn(I) -> Option<O> + 'static,
    {
        Self {
            input: I::KIND,
            output: O::KIND,
            func: Box::new(move |value| {
                I::from_value(value)
                    .and_then(|input| f(input))
                    .map(ValueType::into_value)
            }),
        }
    }

    /// Apply to one value
    pub fn apply(&self, value: Value) -> Option<Value> {
        (self.func)(value)
    }

    /// Kind consumed
    pub fn input_kind(&self) -> ValueKind {
        self.input
    }

    /// Kind emitted
    pub fn output_kind(&self) -> ValueKind {
        self.output
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("input", &self.input)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
