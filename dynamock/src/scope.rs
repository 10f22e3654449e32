// vim: tw=80
//! The per-test registry of handles and interceptions

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
};
use tracing::warn;

use crate::{
    factory::{Factory, Rule},
    handle::{Dispatch, MockHandle},
    lock,
    verify::Report,
    Config, MockError,
};

pub(crate) struct ScopeInner {
    config: Config,
    handles: Mutex<Vec<MockHandle>>,
    factories: Mutex<Vec<Arc<Factory>>>,
    next_label: AtomicUsize,
}

impl ScopeInner {
    /// Create a handle and register it for verification
    pub(crate) fn new_handle(&self, label: String,
                             real: Option<Box<dyn Dispatch>>) -> MockHandle
    {
        let handle = MockHandle::build(label, &self.config, real);
        lock(&self.handles).push(handle.clone());
        handle
    }

    /// Take charge of a handle created elsewhere, unless already in charge
    fn adopt(&self, handle: &MockHandle) {
        let mut handles = lock(&self.handles);
        if !handles.iter().any(|h| h.same(handle)) {
            handles.push(handle.clone());
        }
    }
}

/// Owns every mock created for one test.
///
/// Tear the scope down at the end of the test with
/// [`teardown`](#method.teardown), which restores every intercepted factory
/// and verifies every expectation of every handle at once.  If the scope is
/// dropped instead, the same happens on drop, and unsatisfied expectations
/// cause a panic unless the thread is already panicking.
///
/// # Examples
/// ```
/// # use dynamock::*;
/// let scope = Scope::new();
/// let item = scope.mock("item");
/// item.should_receive("find")
///     .with(params![1i32])
///     .at_least()
///     .once();
/// let err = scope.teardown().unwrap_err();
/// assert!(err.to_string().contains("item: find: expected at least 1, got 0"));
/// ```
pub struct Scope {
    inner: Arc<ScopeInner>,
    torn_down: bool,
}

impl Scope {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let inner = ScopeInner {
            config,
            handles: Mutex::new(Vec::new()),
            factories: Mutex::new(Vec::new()),
            next_label: AtomicUsize::new(1),
        };
        Scope { inner: Arc::new(inner), torn_down: false }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Create a mock handle labelled `label`.
    pub fn mock<S: Into<String>>(&self, label: S) -> MockHandle {
        self.inner.new_handle(label.into(), None)
    }

    /// Create a mock handle with a generated label.
    pub fn mock_unnamed(&self) -> MockHandle {
        let n = self.inner.next_label.fetch_add(1, Ordering::Relaxed);
        let label = format!("{}#{}", self.inner.config.label_prefix, n);
        self.inner.new_handle(label, None)
    }

    /// Partially mock an existing real object.
    pub fn partial<S, D>(&self, label: S, real: D) -> MockHandle
        where S: Into<String>, D: Dispatch + 'static
    {
        self.inner.new_handle(label.into(), Some(Box::new(real)))
    }

    /// For the rest of this scope, every instance built by `factory` is
    /// wrapped in a partial mock, which `configure` sets up once per
    /// instance.
    pub fn intercept_new_instances<F>(&self, factory: &Arc<Factory>,
                                      configure: F) -> Result<(), MockError>
        where F: Fn(&MockHandle) + Send + Sync + 'static
    {
        self.install(factory, Rule::PerInstance(Arc::new(configure)))
    }

    /// For the rest of this scope, `factory` returns `handle` instead of
    /// building anything.  The handle is verified with the scope even if it
    /// was not created by it.
    pub fn substitute_new_instances(&self, factory: &Arc<Factory>,
                                    handle: MockHandle) -> Result<(), MockError>
    {
        self.install(factory, Rule::Shared(handle.clone()))?;
        self.inner.adopt(&handle);
        Ok(())
    }

    /// Restore all factories and verify all handles.
    pub fn teardown(mut self) -> Result<(), MockError> {
        self.finish()
    }

    fn install(&self, factory: &Arc<Factory>, rule: Rule)
        -> Result<(), MockError>
    {
        factory.install(&self.inner, rule)?;
        lock(&self.inner.factories).push(factory.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MockError> {
        self.torn_down = true;
        let handles = lock(&self.inner.handles).clone();
        for h in handles.iter() {
            h.close();
        }
        for f in lock(&self.inner.factories).drain(..) {
            f.restore(&self.inner);
        }
        let mut report = Report::default();
        for h in handles.iter() {
            report.extend(h.report());
        }
        if report.is_empty() {
            Ok(())
        } else {
            warn!(violations = report.violations().len(),
                  "unsatisfied expectations at teardown");
            Err(MockError::VerificationFailed(report))
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        if let Err(e) = self.finish() {
            if self.inner.config.panic_on_drop && !thread::panicking() {
                panic!("{}", e);
            }
        }
    }
}

/// Run `f` with a fresh [`Scope`] and tear the scope down afterwards.
///
/// If `f` panics the scope is still torn down, so intercepted factories are
/// restored before the panic propagates.
///
/// # Examples
/// ```
/// # use dynamock::*;
/// let total = scoped(|scope| {
///     let item = scope.mock("item");
///     item.should_receive("price").once().and_return(5u32);
///     item.call_as::<u32>("price", args![]).unwrap() * 2
/// }).unwrap();
/// assert_eq!(total, 10);
/// ```
pub fn scoped<F, R>(f: F) -> Result<R, MockError>
    where F: FnOnce(&Scope) -> R
{
    let scope = Scope::new();
    let r = f(&scope);
    scope.teardown()?;
    Ok(r)
}
