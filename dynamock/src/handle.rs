// vim: tw=80
//! Mock handles and call dispatch

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, TryLockError,
    },
};
use tracing::{debug, trace};

use crate::{
    expectation::{Expectation, ExpectationBuilder, Outcome},
    lock,
    value::{AnyValue, Args, Value},
    verify::Report,
    Config, MockError,
};

/// The generic call entry point shared by mocks and real objects.
///
/// Code under test talks to its collaborators through this trait, so that a
/// [`MockHandle`] can stand in for the real thing.  Real types usually get
/// an implementation from [`#[dispatch]`](crate::dispatch).
pub trait Dispatch: Send {
    fn dispatch(&mut self, method: &str, args: Args)
        -> Result<Value, MockError>;
}

/// Lifecycle of a [`MockHandle`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandleState {
    Unverified,
    /// Every expectation was satisfied at the last verification
    Verified,
    /// At least one expectation was not
    Failed,
}

struct State {
    expectations: Vec<Arc<Expectation>>,
    /// Set when teardown begins.  No more calls are accepted.
    closed: bool,
    verdict: HandleState,
}

struct Inner {
    label: String,
    history_limit: usize,
    state: Mutex<State>,
    /// The wrapped real object of a partial mock
    real: Option<Mutex<Box<dyn Dispatch>>>,
}

/// How a call was resolved against the declared expectations
enum Selection {
    Selected(Arc<Expectation>),
    Undeclared,
    NoMatch(Vec<String>),
    /// A matcher for this method is already running further up the stack
    Busy,
}

/// A stand-in object whose behavior is declared by the test.
///
/// Handles are cheap to clone; all clones share the same expectations.
///
/// # Examples
/// ```
/// # use dynamock::*;
/// let guitar = MockHandle::new("guitar");
/// guitar.should_receive("name").once().and_return("Deschutes");
/// guitar.should_receive("unit_price").once().and_return(2400.00f64);
///
/// assert_eq!(guitar.call_as::<&str>("name", args![]).unwrap(), "Deschutes");
/// assert_eq!(guitar.call_as::<f64>("unit_price", args![]).unwrap(), 2400.0);
/// guitar.verify().unwrap();
/// assert_eq!(guitar.state(), HandleState::Verified);
/// ```
#[derive(Clone)]
pub struct MockHandle(Arc<Inner>);

static UNNAMED: AtomicUsize = AtomicUsize::new(1);

impl MockHandle {
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self::build(label.into(), &Config::default(), None)
    }

    /// Create a handle with a generated label like `mock#3`.
    pub fn unnamed() -> Self {
        let config = Config::default();
        let n = UNNAMED.fetch_add(1, Ordering::Relaxed);
        Self::build(format!("{}#{}", config.label_prefix, n), &config, None)
    }

    /// Wrap a real object.  Methods without an expectation are forwarded to
    /// it, and so are expectations without a return policy.
    pub fn partial<S, D>(label: S, real: D) -> Self
        where S: Into<String>, D: Dispatch + 'static
    {
        Self::build(label.into(), &Config::default(), Some(Box::new(real)))
    }

    pub(crate) fn build(label: String, config: &Config,
                        real: Option<Box<dyn Dispatch>>) -> Self
    {
        let state = State {
            expectations: Vec::new(),
            closed: false,
            verdict: HandleState::Unverified,
        };
        MockHandle(Arc::new(Inner {
            label,
            history_limit: config.history_limit,
            state: Mutex::new(state),
            real: real.map(Mutex::new),
        }))
    }

    /// The diagnostic label
    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn is_partial(&self) -> bool {
        self.0.real.is_some()
    }

    pub fn state(&self) -> HandleState {
        lock(&self.0.state).verdict
    }

    /// Declare a new expectation for `method`.  Expectations on the same
    /// method are tried in declaration order.
    pub fn should_receive(&self, method: &str) -> ExpectationBuilder {
        let exp = Arc::new(Expectation::new(method, self.0.history_limit));
        lock(&self.0.state).expectations.push(exp.clone());
        ExpectationBuilder::new(exp)
    }

    /// Declare that `method` must never be called.
    pub fn should_not_receive(&self, method: &str) -> ExpectationBuilder {
        let mut b = self.should_receive(method);
        b.never();
        b
    }

    /// Call `method` as if it were the real collaborator.
    ///
    /// The first expectation for `method` whose constraints accept `args` is
    /// used.  An expectation that already reached its maximum count is passed
    /// over in favor of a later matching one; if every matching expectation
    /// is exhausted, the first one takes the call anyway so that the excess
    /// shows up at verification.
    pub fn call(&self, method: &str, args: Args) -> Result<Value, MockError> {
        trace!(handle = %self.label(), method, args = %args.render(), "call");
        let candidates = {
            let state = lock(&self.0.state);
            if state.closed {
                return Err(MockError::Closed {
                    handle: self.label().to_owned(),
                    method: method.to_owned(),
                });
            }
            state.expectations.iter()
                .filter(|e| e.method() == method)
                .cloned()
                .collect::<Vec<_>>()
        };
        match select(&candidates, &args) {
            Selection::Selected(exp) => {
                exp.record(&args);
                match exp.respond(self.label(), args) {
                    Outcome::Done(r) => r,
                    Outcome::PassThrough(args) => self.forward(method, args),
                    Outcome::Busy => {
                        exp.unrecord();
                        Err(self.reentrant(method))
                    }
                }
            },
            Selection::Busy => Err(self.reentrant(method)),
            Selection::Undeclared if self.is_partial() => {
                self.forward(method, args)
            },
            Selection::Undeclared => Err(MockError::UnexpectedCall {
                handle: self.label().to_owned(),
                method: method.to_owned(),
            }),
            Selection::NoMatch(tried) => {
                Err(MockError::NoMatchingExpectation {
                    handle: self.label().to_owned(),
                    method: method.to_owned(),
                    args: args.render(),
                    tried,
                })
            }
        }
    }

    /// Like [`call`](#method.call), but unwraps the return value as a `T`.
    pub fn call_as<T: AnyValue>(&self, method: &str, args: Args)
        -> Result<T, MockError>
    {
        take_return(method, self.call(method, args)?)
    }

    /// Check every expectation of this handle.
    pub fn verify(&self) -> Result<(), MockError> {
        let report = self.report();
        if report.is_empty() {
            Ok(())
        } else {
            Err(MockError::VerificationFailed(report))
        }
    }

    /// Verify that all current expectations are satisfied and clear them.
    pub fn checkpoint(&self) -> Result<(), MockError> {
        let r = self.verify();
        let mut state = lock(&self.0.state);
        state.expectations.clear();
        state.verdict = HandleState::Unverified;
        r
    }

    /// Collect this handle's violations and record the verdict.
    pub(crate) fn report(&self) -> Report {
        let mut state = lock(&self.0.state);
        let mut report = Report::default();
        for v in state.expectations.iter()
            .filter_map(|e| e.violation(self.label()))
        {
            report.push(v);
        }
        state.verdict = if report.is_empty() {
            HandleState::Verified
        } else {
            HandleState::Failed
        };
        report
    }

    /// Stop accepting calls
    pub(crate) fn close(&self) {
        lock(&self.0.state).closed = true;
    }

    fn forward(&self, method: &str, args: Args) -> Result<Value, MockError> {
        let Some(real) = &self.0.real else {
            return Ok(Value::unit());
        };
        debug!(handle = %self.label(), method, "forwarding to real object");
        let mut real = match real.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(p)) => p.into_inner(),
            Err(TryLockError::WouldBlock) => {
                return Err(self.reentrant(method));
            }
        };
        real.dispatch(method, args)
    }

    fn reentrant(&self, method: &str) -> MockError {
        MockError::Reentrant {
            handle: self.label().to_owned(),
            method: method.to_owned(),
        }
    }

    /// Are both handles clones of the same mock?
    pub(crate) fn same(&self, other: &MockHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Pick an expectation among the `candidates` declared for one method
fn select(candidates: &[Arc<Expectation>], args: &Args) -> Selection {
    if candidates.is_empty() {
        return Selection::Undeclared;
    }
    let mut exhausted = None;
    for e in candidates {
        match e.matches(args) {
            None => return Selection::Busy,
            Some(true) if !e.is_done() => return Selection::Selected(e.clone()),
            Some(true) => {
                exhausted.get_or_insert_with(|| e.clone());
            },
            Some(false) => ()
        }
    }
    match exhausted {
        Some(e) => Selection::Selected(e),
        None => Selection::NoMatch(
            candidates.iter().map(|e| e.explain(args)).collect()
        )
    }
}

impl<'a> dyn Dispatch + 'a {
    /// Dispatch `method` and unwrap the return value as a `T`.
    pub fn call_as<T: AnyValue>(&mut self, method: &str, args: Args)
        -> Result<T, MockError>
    {
        let v = self.dispatch(method, args)?;
        take_return(method, v)
    }
}

fn take_return<T: AnyValue>(method: &str, v: Value) -> Result<T, MockError> {
    v.take::<T>()
        .map_err(|v| MockError::ReturnType {
            method: method.to_owned(),
            expected: std::any::type_name::<T>(),
            actual: v.type_name(),
        })
}

impl Dispatch for MockHandle {
    fn dispatch(&mut self, method: &str, args: Args)
        -> Result<Value, MockError>
    {
        self.call(method, args)
    }
}

impl fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MockHandle")
            .field("label", &self.label())
            .field("state", &self.state())
            .finish()
    }
}
