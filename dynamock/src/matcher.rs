// vim: tw=80
//! Argument constraints.
//!
//! An expectation's arguments are matched positionally, one [`Constraint`]
//! per argument.  Constraints are built with the functions in this module, or
//! from bare literals through [`params!`](crate::params).  Any
//! [`Predicate`](predicates::Predicate) from the `predicates` crate can be
//! used through [`pred`].
//!
//! Matching never mutates anything, so a constraint may be evaluated any
//! number of times during lookup.

use predicates::prelude::*;
use predicates_tree::CaseTreeExt;
use std::{fmt::Debug, marker::PhantomData};

use crate::value::{AnyValue, Args, Callback, Value};

/// Matches a single argument.
pub trait ArgMatcher: Send + Sync {
    fn matches(&self, arg: &Value) -> bool;

    /// Short description, used in failure messages.
    fn describe(&self) -> String;

    /// Why `arg` was rejected.
    fn explain(&self, arg: &Value) -> String {
        format!("{} rejected {:?}", self.describe(), arg)
    }
}

/// One positional argument constraint.
pub struct Constraint {
    inner: Box<dyn ArgMatcher>,
    /// Matches all remaining arguments, including none
    rest: bool,
}

impl Constraint {
    pub fn new<M: ArgMatcher + 'static>(m: M) -> Self {
        Constraint { inner: Box::new(m), rest: false }
    }

    pub fn matches(&self, arg: &Value) -> bool {
        self.inner.matches(arg)
    }

    pub fn describe(&self) -> String {
        self.inner.describe()
    }

    pub fn is_rest(&self) -> bool {
        self.rest
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Wraps a typed `Predicate`.  Values of any other type never match.
struct Typed<T, P> {
    p: P,
    _t: PhantomData<fn(&T)>,
}

impl<T, P> ArgMatcher for Typed<T, P>
    where T: AnyValue, P: Predicate<T> + Send + Sync
{
    fn matches(&self, arg: &Value) -> bool {
        arg.downcast_ref::<T>()
            .map(|t| self.p.eval(t))
            .unwrap_or(false)
    }

    fn describe(&self) -> String {
        self.p.to_string()
    }

    fn explain(&self, arg: &Value) -> String {
        match arg.downcast_ref::<T>() {
            None => format!("{}: expected {}, got {}", self.describe(),
                            std::any::type_name::<T>(), arg.type_name()),
            Some(t) => match self.p.find_case(false, t) {
                Some(case) => case.tree().to_string(),
                None => format!("{} accepted {:?}", self.describe(), arg)
            }
        }
    }
}

struct KindOf<T>(PhantomData<fn(&T)>);

impl<T: AnyValue> ArgMatcher for KindOf<T> {
    fn matches(&self, arg: &Value) -> bool {
        arg.is::<T>()
    }

    fn describe(&self) -> String {
        format!("kind_of({})", std::any::type_name::<T>())
    }

    fn explain(&self, arg: &Value) -> String {
        format!("{}: got {}", self.describe(), arg.type_name())
    }
}

struct Anything;

impl ArgMatcher for Anything {
    fn matches(&self, _arg: &Value) -> bool {
        true
    }

    fn describe(&self) -> String {
        String::from("_")
    }
}

struct AnyCallable;

impl ArgMatcher for AnyCallable {
    fn matches(&self, arg: &Value) -> bool {
        arg.is::<Callback>()
    }

    fn describe(&self) -> String {
        String::from("<any callable>")
    }

    fn explain(&self, arg: &Value) -> String {
        format!("{}: got {}", self.describe(), arg.type_name())
    }
}

/// String equality that accepts both `&'static str` and `String` arguments.
struct StrEq(&'static str);

impl ArgMatcher for StrEq {
    fn matches(&self, arg: &Value) -> bool {
        arg.downcast_ref::<&'static str>().map(|s| *s == self.0)
            .or_else(|| arg.downcast_ref::<String>().map(|s| s == self.0))
            .unwrap_or(false)
    }

    fn describe(&self) -> String {
        format!("var == {:?}", self.0)
    }
}

/// Match an argument equal to `t`.  The argument must have exactly type `T`.
pub fn eq<T>(t: T) -> Constraint
    where T: AnyValue + PartialEq
{
    pred::<T, _>(predicate::eq(t))
}

/// Match an argument of type `T` that satisfies a `predicates` predicate.
///
/// # Examples
/// ```
/// # use dynamock::*;
/// let m = MockHandle::new("counter");
/// m.should_receive("add")
///     .with(params![matcher::pred::<i32, _>(predicate::gt(10))])
///     .and_return(true);
/// assert!(m.call_as::<bool>("add", args![11i32]).unwrap());
/// assert!(m.call("add", args![9i32]).is_err());
/// ```
pub fn pred<T, P>(p: P) -> Constraint
    where T: AnyValue, P: Predicate<T> + Send + Sync + 'static
{
    Constraint::new(Typed { p, _t: PhantomData })
}

/// Match an argument of type `T` for which `f` returns true.
pub fn function<T, F>(f: F) -> Constraint
    where T: AnyValue, F: Fn(&T) -> bool + Send + Sync + 'static
{
    pred::<T, _>(predicate::function(f))
}

/// Match any argument whose run-time type is `T`.
pub fn kind_of<T: AnyValue>() -> Constraint {
    Constraint::new(KindOf::<T>(PhantomData))
}

/// Match any single argument.
pub fn any() -> Constraint {
    Constraint::new(Anything)
}

/// Match any [`Callback`] argument, whatever it does.
pub fn any_callable() -> Constraint {
    Constraint::new(AnyCallable)
}

/// Match every remaining argument, including none.  Must come last.
pub fn rest() -> Constraint {
    Constraint { inner: Box::new(Anything), rest: true }
}

/// Conversion used by [`params!`](crate::params), so that literals can stand
/// for equality constraints.
pub trait IntoConstraint {
    fn into_constraint(self) -> Constraint;
}

impl IntoConstraint for Constraint {
    fn into_constraint(self) -> Constraint {
        self
    }
}

impl IntoConstraint for &'static str {
    fn into_constraint(self) -> Constraint {
        Constraint::new(StrEq(self))
    }
}

macro_rules! literal_constraint {
    ($($t:ty)*) => {
        $(
            impl IntoConstraint for $t {
                fn into_constraint(self) -> Constraint {
                    eq(self)
                }
            }
        )*
    }
}

literal_constraint! {
    () bool char String
    i8 i16 i32 i64 i128 isize
    u8 u16 u32 u64 u128 usize
    f32 f64
}

/// Build a list of positional constraints for
/// [`ExpectationBuilder::with`](crate::ExpectationBuilder::with).
///
/// # Examples
/// ```
/// # use dynamock::*;
/// use dynamock::matcher::*;
/// let m = MockHandle::new("checkout");
/// m.should_receive("purchase")
///     .with(params![1i32, kind_of::<String>(), any_callable()])
///     .and_return(true);
/// let args = args![1i32, String::from("guitar")]
///     .with_block(|_| Ok(Value::unit()));
/// assert!(m.call_as::<bool>("purchase", args).unwrap());
/// ```
#[macro_export]
macro_rules! params {
    () => { ::std::vec::Vec::<$crate::matcher::Constraint>::new() };
    ($($e:expr),+ $(,)?) => {
        vec![$($crate::matcher::IntoConstraint::into_constraint($e)),+]
    };
}

/// Matches a whole argument list.
pub(crate) enum Matcher {
    Anything,
    Params(Vec<Constraint>),
    Func(Box<dyn Fn(&Args) -> bool + Send + Sync>),
}

impl Matcher {
    pub(crate) fn matches(&self, args: &Args) -> bool {
        match self {
            Matcher::Anything => true,
            Matcher::Func(f) => f(args),
            Matcher::Params(cs) => {
                let (fixed, rest) = split_rest(cs);
                if rest {
                    if args.len() < fixed.len() {
                        return false;
                    }
                } else if args.len() != fixed.len() {
                    return false;
                }
                fixed.iter()
                    .zip(args.iter())
                    .all(|(c, a)| c.matches(a))
            }
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Matcher::Anything => String::from("<anything>"),
            Matcher::Func(_) => String::from("<function>"),
            Matcher::Params(cs) => {
                let parts = cs.iter()
                    .map(|c| if c.is_rest() {
                        String::from("..")
                    } else {
                        c.describe()
                    }).collect::<Vec<_>>();
                format!("({})", parts.join(", "))
            }
        }
    }

    /// Explain why `args` doesn't match.  Only meaningful if `matches`
    /// returned false.
    pub(crate) fn explain(&self, args: &Args) -> String {
        match self {
            Matcher::Anything => String::from("matches anything"),
            Matcher::Func(_) => String::from("function returned false"),
            Matcher::Params(cs) => {
                let (fixed, rest) = split_rest(cs);
                if (rest && args.len() < fixed.len()) ||
                    (!rest && args.len() != fixed.len())
                {
                    let at_least = if rest { "at least " } else { "" };
                    return format!("expected {}{} argument(s), got {}",
                                   at_least, fixed.len(), args.len());
                }
                fixed.iter()
                    .zip(args.iter())
                    .enumerate()
                    .find(|(_, (c, a))| !c.matches(a))
                    .map(|(i, (c, a))| {
                        format!("argument {}: {}", i, c.inner.explain(a))
                    }).unwrap_or_else(|| String::from("matches"))
            }
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::Anything
    }
}

/// Split off a trailing `rest()` constraint
fn split_rest(cs: &[Constraint]) -> (&[Constraint], bool) {
    match cs.split_last() {
        Some((last, fixed)) if last.is_rest() => (fixed, true),
        _ => (cs, false)
    }
}
