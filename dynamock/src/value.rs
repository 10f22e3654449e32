// vim: tw=80
//! Dynamically typed arguments and return values.
//!
//! Every mocked call travels through the same entry point, so arguments and
//! return values are type-erased into [`Value`]s.  A trailing callback (a
//! "block" handed to the mocked method) is an ordinary positional [`Value`]
//! holding a [`Callback`].

use downcast::{downcast, Any};
use std::{
    fmt::{self, Debug},
    sync::Arc,
};

use crate::MockError;

/// Anything that can be carried inside a [`Value`].
#[doc(hidden)]
pub trait AnyValue: Any + Debug + Send + Sync {
    fn value_type_name(&self) -> &'static str;
}
downcast!(dyn AnyValue);

impl<T: Any + Debug + Send + Sync> AnyValue for T {
    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An owned, dynamically typed argument or return value.
///
/// Note that wrapping a `Value` in another `Value` nests it; use
/// [`Args::push_value`] to add an already erased value to an argument list.
pub struct Value(Box<dyn AnyValue>);

impl Value {
    pub fn new<T: AnyValue>(t: T) -> Self {
        Value(Box::new(t))
    }

    /// The value returned by methods that have no explicit return policy.
    pub fn unit() -> Self {
        Value::new(())
    }

    /// Does this value hold a `T`?
    pub fn is<T: AnyValue>(&self) -> bool {
        (*self.0).is::<T>()
    }

    pub fn downcast_ref<T: AnyValue>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>().ok()
    }

    /// Unwrap the value as a `T`, giving it back unchanged on a type
    /// mismatch.
    pub fn take<T: AnyValue>(self) -> Result<T, Value> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.0.downcast::<T>() {
            Ok(b) => Ok(*b),
            Err(e) => Err(Value(e.into_object()))
        }
    }

    /// Name of the concrete type held, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        (*self.0).value_type_name()
    }

    /// Extract positional argument `index` of `method` as a `T`.  Used by
    /// the code that `#[dispatch]` generates.
    #[doc(hidden)]
    pub fn take_arg<T: AnyValue>(
        value: Option<Value>,
        method: &str,
        index: usize,
    ) -> Result<T, MockError>
    {
        let value = value.ok_or_else(|| MockError::Arity {
            method: method.to_owned(),
            expected: index + 1,
            actual: index,
        })?;
        value.take::<T>().map_err(|v| MockError::ArgumentType {
            method: method.to_owned(),
            index,
            expected: std::any::type_name::<T>(),
            actual: v.type_name(),
        })
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

type CallbackFn = dyn Fn(Args) -> Result<Value, MockError> + Send + Sync;

/// A callable passed as an argument to a mocked method.
///
/// Return policies receive the callback along with the other arguments and
/// may invoke it, just like the real collaborator would.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    pub fn new<F>(f: F) -> Self
        where F: Fn(Args) -> Result<Value, MockError> + Send + Sync + 'static
    {
        Callback(Arc::new(f))
    }

    pub fn call(&self, args: Args) -> Result<Value, MockError> {
        (self.0)(args)
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("<callback>")
    }
}

/// The ordered argument list of one call.
#[derive(Debug, Default)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn arg<T: AnyValue>(mut self, t: T) -> Self {
        self.0.push(Value::new(t));
        self
    }

    /// Append a trailing callback.
    pub fn with_block<F>(self, f: F) -> Self
        where F: Fn(Args) -> Result<Value, MockError> + Send + Sync + 'static
    {
        self.arg(Callback::new(f))
    }

    pub fn push_value(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Borrow argument `index` as a `T`, if it is one.
    pub fn get_as<T: AnyValue>(&self, index: usize) -> Option<&T> {
        self.get(index).and_then(Value::downcast_ref)
    }

    /// The trailing callback, if the last argument is one.
    pub fn block(&self) -> Option<&Callback> {
        self.0.last().and_then(Value::downcast_ref)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Render the arguments like a call site, e.g. `(1, "two", <callback>)`
    pub fn render(&self) -> String {
        let parts = self.0.iter()
            .map(|v| format!("{v:?}"))
            .collect::<Vec<_>>();
        format!("({})", parts.join(", "))
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args(values)
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Args(iter.into_iter().collect())
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Build an [`Args`] list from expressions.
///
/// # Examples
/// ```
/// # use dynamock::*;
/// let args = args![1i32, String::from("two")];
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.get_as::<i32>(0), Some(&1));
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::Args::new() };
    ($($e:expr),+ $(,)?) => {
        $crate::Args::from(vec![$($crate::Value::new($e)),+])
    };
}
