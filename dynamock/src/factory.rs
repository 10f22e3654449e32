// vim: tw=80
//! Injectable constructors whose products can be intercepted by a test.
//!
//! Code under test never builds a mockable collaborator directly.  It asks a
//! [`Factory`] instead, and a [`Scope`](crate::Scope) may temporarily
//! redirect that factory so that every new instance is a partial mock, or
//! the same shared mock.  The redirection is undone when the scope is torn
//! down.

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, Weak,
    },
};
use tracing::{debug, trace};

use crate::{
    handle::{Dispatch, MockHandle},
    lock,
    scope::ScopeInner,
    value::Args,
    Config, MockError,
};

type Constructor = dyn Fn(Args) -> Result<Box<dyn Dispatch>, MockError>
    + Send + Sync;
pub(crate) type Configurator = dyn Fn(&MockHandle) + Send + Sync;

#[derive(Clone)]
pub(crate) enum Rule {
    /// Wrap every new real instance in a partial mock and configure it
    PerInstance(Arc<Configurator>),
    /// Hand out the same mock for every construction
    Shared(MockHandle),
}

struct Interception {
    scope: Weak<ScopeInner>,
    rule: Rule,
}

/// Builds instances of one real type on behalf of code under test.
///
/// # Examples
/// ```
/// # use dynamock::*;
/// struct Item { name: String }
///
/// #[dispatch]
/// impl Item {
///     fn name(&self) -> String {
///         self.name.clone()
///     }
/// }
///
/// let items = Factory::new("Item", |args: Args| {
///     let name = args.get_as::<&str>(0).copied().unwrap_or_default();
///     Ok(Item { name: name.to_owned() })
/// });
///
/// let scope = Scope::new();
/// scope.intercept_new_instances(&items, |item| {
///     item.should_receive("name").once().and_return(String::from("mock"));
/// }).unwrap();
/// let mut item = items.create(args!["Deschutes"]).unwrap();
/// assert_eq!(item.call_as::<String>("name", args![]).unwrap(), "mock");
/// scope.teardown().unwrap();
///
/// // Restored: real instances again
/// let mut item = items.create(args!["Deschutes"]).unwrap();
/// assert_eq!(item.call_as::<String>("name", args![]).unwrap(), "Deschutes");
/// ```
pub struct Factory {
    name: String,
    ctor: Box<Constructor>,
    interception: Mutex<Option<Interception>>,
    /// Number of instances wrapped so far, for labels
    wrapped: AtomicUsize,
}

impl Factory {
    pub fn new<S, T, F>(name: S, ctor: F) -> Arc<Self>
        where S: Into<String>,
              T: Dispatch + 'static,
              F: Fn(Args) -> Result<T, MockError> + Send + Sync + 'static
    {
        let ctor = move |args| {
            ctor(args).map(|t| Box::new(t) as Box<dyn Dispatch>)
        };
        Arc::new(Factory {
            name: name.into(),
            ctor: Box::new(ctor),
            interception: Mutex::new(None),
            wrapped: AtomicUsize::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_intercepted(&self) -> bool {
        lock(&self.interception).is_some()
    }

    /// Build a new instance.  Inside an intercepting scope this returns a
    /// mock instead of the bare real object.
    pub fn create(&self, args: Args) -> Result<Box<dyn Dispatch>, MockError> {
        let current = lock(&self.interception).as_ref()
            .map(|i| (i.scope.clone(), i.rule.clone()));
        match current {
            None => (self.ctor)(args),
            Some((_, Rule::Shared(handle))) => {
                trace!(factory = %self.name, handle = %handle.label(),
                       "handing out shared mock");
                Ok(Box::new(handle))
            },
            Some((scope, Rule::PerInstance(configure))) => {
                let real = (self.ctor)(args)?;
                let n = self.wrapped.fetch_add(1, Ordering::Relaxed) + 1;
                let label = format!("{}#{}", self.name, n);
                trace!(factory = %self.name, %label, "wrapping new instance");
                let handle = match scope.upgrade() {
                    Some(scope) => scope.new_handle(label, Some(real)),
                    None => MockHandle::build(label, &Config::default(),
                                              Some(real))
                };
                configure(&handle);
                Ok(Box::new(handle))
            }
        }
    }

    pub(crate) fn install(&self, scope: &Arc<ScopeInner>, rule: Rule)
        -> Result<(), MockError>
    {
        let mut guard = lock(&self.interception);
        if guard.is_some() {
            return Err(MockError::AlreadyIntercepted(self.name.clone()));
        }
        debug!(factory = %self.name, "intercepting new instances");
        *guard = Some(Interception { scope: Arc::downgrade(scope), rule });
        Ok(())
    }

    /// Undo an interception made by `scope`.  Interceptions owned by other
    /// scopes are left alone.
    pub(crate) fn restore(&self, scope: &Arc<ScopeInner>) {
        let mut guard = lock(&self.interception);
        let owned = guard.as_ref()
            .map(|i| std::ptr::eq(i.scope.as_ptr(), Arc::as_ptr(scope)))
            .unwrap_or(false);
        if owned {
            debug!(factory = %self.name, "restoring original constructor");
            *guard = None;
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("intercepted", &self.is_intercepted())
            .finish()
    }
}
