// vim: tw=80
//! Expectations and the fluent builder used to declare them

use fragile::Fragile;
use std::{
    collections::VecDeque,
    mem,
    ops::Range,
    sync::{Arc, Mutex, TryLockError},
};

use crate::{
    lock,
    matcher::{Constraint, Matcher},
    times::{Bound, Times},
    value::{AnyValue, Args, Value},
    verify::Violation,
    MockError,
};

type ReturnFn = dyn FnMut(Args) -> Result<Value, MockError> + Send;
type ReturnOnceFn = dyn FnOnce(Args) -> Result<Value, MockError> + Send;

/// Return functions for expectations
enum Rfunc {
    /// Forward to the real object if there is one, else return `()`
    Default,
    // Indicates that a `return_once` expectation has already returned
    Expired,
    Mut(Box<ReturnFn>),
    Once(Box<ReturnOnceFn>),
}

/// What an expectation did with a call
pub(crate) enum Outcome {
    Done(Result<Value, MockError>),
    /// The handle should forward the call to its real object
    PassThrough(Args),
    /// The return policy is already running further up the stack
    Busy,
}

/// One declared rule for a method.
pub(crate) struct Expectation {
    method: String,
    matcher: Mutex<Matcher>,
    times: Mutex<Times>,
    rfunc: Mutex<Rfunc>,
    history: Mutex<VecDeque<String>>,
    history_limit: usize,
}

impl Expectation {
    pub(crate) fn new(method: &str, history_limit: usize) -> Self {
        Expectation {
            method: method.to_owned(),
            matcher: Mutex::new(Matcher::default()),
            times: Mutex::new(Times::default()),
            rfunc: Mutex::new(Rfunc::Default),
            history: Mutex::new(VecDeque::new()),
            history_limit,
        }
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    /// `None` if this expectation's matcher is already running, as when a
    /// `withf` closure calls back into its own handle.
    pub(crate) fn matches(&self, args: &Args) -> Option<bool> {
        match self.matcher.try_lock() {
            Ok(m) => Some(m.matches(args)),
            Err(TryLockError::Poisoned(p)) => {
                Some(p.into_inner().matches(args))
            },
            Err(TryLockError::WouldBlock) => None
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        lock(&self.times).is_done()
    }

    pub(crate) fn is_satisfied(&self) -> bool {
        lock(&self.times).is_satisfied()
    }

    pub(crate) fn describe(&self) -> String {
        lock(&self.matcher).describe()
    }

    /// Describe this expectation and why it rejected `args`
    pub(crate) fn explain(&self, args: &Args) -> String {
        let matcher = lock(&self.matcher);
        format!("{}{}: {}", self.method, matcher.describe(),
                matcher.explain(args))
    }

    /// Record a call.  Must be done before `respond`, which consumes the
    /// arguments.
    pub(crate) fn record(&self, args: &Args) -> usize {
        if self.history_limit > 0 {
            let mut history = lock(&self.history);
            if history.len() == self.history_limit {
                history.pop_front();
            }
            history.push_back(args.render());
        }
        lock(&self.times).call()
    }

    /// Take back a call recorded by `record` that was never answered.
    pub(crate) fn unrecord(&self) {
        if self.history_limit > 0 {
            lock(&self.history).pop_back();
        }
        lock(&self.times).uncall();
    }

    /// Run the return policy.  No handle lock may be held, so that the policy
    /// can call back into mocks.
    pub(crate) fn respond(&self, handle: &str, args: Args) -> Outcome {
        let mut rfunc = match self.rfunc.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(p)) => p.into_inner(),
            Err(TryLockError::WouldBlock) => return Outcome::Busy,
        };
        match &mut *rfunc {
            Rfunc::Default => Outcome::PassThrough(args),
            Rfunc::Expired => Outcome::Done(Err(MockError::Expired {
                handle: handle.to_owned(),
                method: self.method.clone(),
            })),
            Rfunc::Mut(f) => Outcome::Done(f(args)),
            Rfunc::Once(_) => {
                if let Rfunc::Once(f) = mem::replace(&mut *rfunc, Rfunc::Expired)
                {
                    Outcome::Done(f(args))
                } else {
                    unreachable!()
                }
            }
        }
    }

    /// The count violation of this expectation, if any.
    pub(crate) fn violation(&self, handle: &str) -> Option<Violation> {
        let times = lock(&self.times);
        if times.is_satisfied() {
            return None;
        }
        Some(Violation {
            handle: handle.to_owned(),
            method: self.method.clone(),
            constraint: self.describe(),
            expected: times.expected(),
            actual: times.count(),
            recent: lock(&self.history).iter().cloned().collect(),
        })
    }

    fn set_rfunc(&self, rfunc: Rfunc) {
        *lock(&self.rfunc) = rfunc;
    }
}

/// Configures one expectation.  Returned by
/// [`MockHandle::should_receive`](crate::MockHandle::should_receive).
///
/// Every method returns `&mut Self`, so a whole expectation can be declared
/// in one statement.
///
/// # Examples
/// ```
/// # use dynamock::*;
/// let item = MockHandle::new("item");
/// item.should_receive("find")
///     .with(params![1i32])
///     .at_least()
///     .once()
///     .and_return("guitar");
/// assert_eq!(item.call_as::<&str>("find", args![1i32]).unwrap(), "guitar");
/// item.verify().unwrap();
/// ```
pub struct ExpectationBuilder {
    exp: Arc<Expectation>,
    bound: Bound,
}

impl ExpectationBuilder {
    pub(crate) fn new(exp: Arc<Expectation>) -> Self {
        ExpectationBuilder { exp, bound: Bound::Exactly }
    }

    /// Set positional argument constraints, usually built with
    /// [`params!`](crate::params).
    pub fn with(&mut self, params: Vec<Constraint>) -> &mut Self {
        *lock(&self.exp.matcher) = Matcher::Params(params);
        self
    }

    /// Accept any arguments.  This is the default.
    pub fn with_any_args(&mut self) -> &mut Self {
        *lock(&self.exp.matcher) = Matcher::Anything;
        self
    }

    /// Set a matching function for the whole argument list.
    ///
    /// The function may call other mocks.  If it calls back into the method
    /// it is matching, that inner call fails with
    /// [`MockError::Reentrant`].
    pub fn withf<F>(&mut self, f: F) -> &mut Self
        where F: Fn(&Args) -> bool + Send + Sync + 'static
    {
        *lock(&self.exp.matcher) = Matcher::Func(Box::new(f));
        self
    }

    /// Make the next count a minimum: `at_least().once()`
    pub fn at_least(&mut self) -> &mut Self {
        self.bound = Bound::AtLeast;
        self
    }

    /// Make the next count a maximum: `at_most().twice()`
    pub fn at_most(&mut self) -> &mut Self {
        self.bound = Bound::AtMost;
        self
    }

    /// Expect this expectation to be called exactly once.  Shortcut for
    /// [`times(1)`](#method.times).
    pub fn once(&mut self) -> &mut Self {
        self.times(1)
    }

    pub fn twice(&mut self) -> &mut Self {
        self.times(2)
    }

    /// Require this expectation to be called exactly `n` times, or at least
    /// or at most `n` times after [`at_least`](#method.at_least) or
    /// [`at_most`](#method.at_most).
    pub fn times(&mut self, n: usize) -> &mut Self {
        lock(&self.exp.times).set(self.bound, n);
        self.bound = Bound::Exactly;
        self
    }

    /// Forbid this expectation from ever being called
    pub fn never(&mut self) -> &mut Self {
        lock(&self.exp.times).never();
        self
    }

    /// Allow this expectation to be called any number of times
    ///
    /// This behavior is the default, but the method is provided in case the
    /// default behavior changes.
    pub fn times_any(&mut self) -> &mut Self {
        lock(&self.exp.times).any();
        self
    }

    /// Allow this expectation to be called any number of times within a
    /// given half-open range
    pub fn times_range(&mut self, range: Range<usize>) -> &mut Self {
        lock(&self.exp.times).range(range);
        self
    }

    /// Return a constant value, cloned for each call.
    pub fn and_return<T: AnyValue + Clone>(&mut self, t: T) -> &mut Self {
        self.returning(move |_| Ok(Value::new(t.clone())))
    }

    /// Supply a closure that will provide the return value for each call.
    /// It receives the actual arguments, including any trailing callback.
    /// An `Err` is handed to the caller unchanged.
    pub fn returning<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(Args) -> Result<Value, MockError> + Send + 'static
    {
        self.exp.set_rfunc(Rfunc::Mut(Box::new(f)));
        self
    }

    /// Supply an `FnOnce` closure that will provide the return value.  This
    /// is useful for return types that aren't `Clone`.  A second call fails
    /// with [`MockError::Expired`].
    pub fn return_once<F>(&mut self, f: F) -> &mut Self
        where F: FnOnce(Args) -> Result<Value, MockError> + Send + 'static
    {
        self.exp.set_rfunc(Rfunc::Once(Box::new(f)));
        self
    }

    /// Single-threaded version of [`returning`](#method.returning).  Can be
    /// used when the closure isn't `Send`.
    ///
    /// It is a runtime error to call the mock method from a different thread
    /// than the one that originally called this method.
    pub fn returning_st<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(Args) -> Result<Value, MockError> + 'static
    {
        let mut fragile = Fragile::new(f);
        let fmut = move |args: Args| {
            (fragile.get_mut())(args)
        };
        self.exp.set_rfunc(Rfunc::Mut(Box::new(fmut)));
        self
    }

    /// Fail every call with a clone of `e`, simulating a failing
    /// collaborator.
    pub fn and_raise<E>(&mut self, e: E) -> &mut Self
        where E: std::error::Error + Clone + Send + Sync + 'static
    {
        self.returning(move |_| Err(MockError::user(e.clone())))
    }

    /// Forward matching calls to the real object of a partial mock.  This is
    /// the default for partial mocks; pure mocks return `()` instead.
    pub fn pass_through(&mut self) -> &mut Self {
        self.exp.set_rfunc(Rfunc::Default);
        self
    }
}
