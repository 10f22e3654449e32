// vim: tw=80
//! Per-scope settings

/// Settings shared by every handle created through one
/// [`Scope`](crate::Scope).
///
/// # Examples
/// ```
/// # use dynamock::*;
/// let config = Config::default()
///     .history_limit(2)
///     .label_prefix("double");
/// let scope = Scope::with_config(config);
/// assert_eq!(scope.mock_unnamed().label(), "double#1");
/// # scope.teardown().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) history_limit: usize,
    pub(crate) label_prefix: String,
    pub(crate) panic_on_drop: bool,
}

impl Config {
    /// How many recent argument lists each expectation remembers for
    /// failure messages.
    pub fn history_limit(mut self, n: usize) -> Self {
        self.history_limit = n;
        self
    }

    /// Prefix of the labels given to unnamed handles.
    pub fn label_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Whether dropping a scope that was never torn down panics when its
    /// expectations are unsatisfied.
    pub fn panic_on_drop(mut self, yes: bool) -> Self {
        self.panic_on_drop = yes;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_limit: 8,
            label_prefix: String::from("mock"),
            panic_on_drop: true,
        }
    }
}
