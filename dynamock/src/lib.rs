// vim: tw=80
//! Expectation-based mock objects with runtime dispatch.
//!
//! Dynamock mocks are declared at run time rather than generated from a
//! trait.  Every collaborator is reached through one generic entry point,
//! [`Dispatch`], which takes a method name and an argument list.  A
//! [`MockHandle`] implements that entry point from the expectations a test
//! declares on it.
//!
//! # Usage
//!
//! * Create a [`Scope`] at the start of the test.  It owns every mock created
//!   for the test and verifies all of them at once when the test is done.
//! * Create mock handles with [`Scope::mock`], partially mock real objects
//!   with [`Scope::partial`], or intercept a [`Factory`] with
//!   [`Scope::intercept_new_instances`].
//! * Declare expectations with [`MockHandle::should_receive`].  Each one may
//!   constrain its arguments, its call count, and its return value.
//! * Hand the mocks to the code under test.  Calls contrary to the declared
//!   expectations fail immediately with a [`MockError`].
//! * Call [`Scope::teardown`].  Every expectation whose call count is out of
//!   range is reported in a single [`MockError::VerificationFailed`].
//!
//! # User Guide
//!
//! * [`Getting started`](#getting-started)
//! * [`Matching arguments`](#matching-arguments)
//! * [`Call counts`](#call-counts)
//! * [`Return values`](#return-values)
//! * [`Callbacks`](#callbacks)
//! * [`Partial mocks`](#partial-mocks)
//! * [`Intercepting new instances`](#intercepting-new-instances)
//!
//! ## Getting Started
//! ```
//! use dynamock::*;
//!
//! fn describe(item: &mut dyn Dispatch) -> Result<String, MockError> {
//!     let name = item.call_as::<&str>("name", args![])?;
//!     let price = item.call_as::<f64>("unit_price", args![])?;
//!     Ok(format!("{name}: {price:.2}"))
//! }
//!
//! let scope = Scope::new();
//! let mut guitar = scope.mock("guitar");
//! guitar.should_receive("name").once().and_return("Deschutes");
//! guitar.should_receive("unit_price").once().and_return(2400.00f64);
//! assert_eq!(describe(&mut guitar).unwrap(), "Deschutes: 2400.00");
//! scope.teardown().unwrap();
//! ```
//!
//! ## Matching arguments
//!
//! Constraints are positional.  Literals match by equality; the functions in
//! [`matcher`] match by type, by predicate, or anything at all.  When two
//! expectations accept the same call, the one declared first wins.
//!
//! ```
//! # use dynamock::*;
//! use dynamock::matcher::*;
//! let item = MockHandle::new("item");
//! item.should_receive("find").with(params![1i32]).and_return("guitar");
//! item.should_receive("find").with(params![kind_of::<i32>()]).and_return("?");
//! assert_eq!(item.call_as::<&str>("find", args![1i32]).unwrap(), "guitar");
//! assert_eq!(item.call_as::<&str>("find", args![2i32]).unwrap(), "?");
//! ```
//!
//! ## Call counts
//!
//! By default an expectation may be called any number of times, including
//! none.  Use [`once`](ExpectationBuilder::once),
//! [`twice`](ExpectationBuilder::twice), [`times`](ExpectationBuilder::times)
//! or [`never`](ExpectationBuilder::never), optionally preceded by
//! [`at_least`](ExpectationBuilder::at_least) or
//! [`at_most`](ExpectationBuilder::at_most).
//!
//! ```
//! # use dynamock::*;
//! let item = MockHandle::new("guitar");
//! item.should_receive("name").once().and_return("Deschutes");
//! item.call("name", args![]).unwrap();
//! item.call("name", args![]).unwrap();
//! let err = item.verify().unwrap_err();
//! assert!(err.to_string().contains("guitar: name: expected 1, got 2"));
//! assert_eq!(item.state(), HandleState::Failed);
//! ```
//!
//! ## Return values
//!
//! [`and_return`](ExpectationBuilder::and_return) returns a clone of a fixed
//! value.  [`returning`](ExpectationBuilder::returning) computes one from the
//! actual arguments, and may fail, which is how a failing collaborator is
//! simulated.  Such an error reaches the caller unchanged.
//!
//! ```
//! # use dynamock::*;
//! let gateway = MockHandle::new("gateway");
//! gateway.should_receive("charge")
//!     .returning(|_| Err(MockError::user("card declined")));
//! let err = gateway.call("charge", args![100u32]).unwrap_err();
//! assert_eq!(err.to_string(), "card declined");
//! ```
//!
//! ## Callbacks
//!
//! A callback passed to a mocked method is its last argument.  It can be
//! matched with [`matcher::any_callable`], and a return policy can invoke it.
//!
//! ```
//! # use dynamock::*;
//! use dynamock::matcher::*;
//! let checkout = MockHandle::new("checkout");
//! checkout.should_receive("with_cart")
//!     .with(params![any_callable()])
//!     .returning(|args| args.block().unwrap().call(args!["cart"]));
//! let args = Args::new().with_block(|args| {
//!     Ok(Value::new(*args.get_as::<&str>(0).unwrap() == "cart"))
//! });
//! assert!(checkout.call_as::<bool>("with_cart", args).unwrap());
//! ```
//!
//! ## Partial mocks
//!
//! A partial mock wraps a real object.  Methods with expectations are
//! mocked; every other method runs the real implementation.
//!
//! ```
//! # use dynamock::*;
//! struct Purchase { total: u32 }
//!
//! #[dispatch]
//! impl Purchase {
//!     fn total(&self) -> u32 { self.total }
//!     fn submit(&mut self) -> bool { unimplemented!() }
//! }
//!
//! let scope = Scope::new();
//! let purchase = scope.partial("purchase", Purchase { total: 30 });
//! purchase.should_receive("submit").once().and_return(true);
//! assert_eq!(purchase.call_as::<u32>("total", args![]).unwrap(), 30);
//! assert!(purchase.call_as::<bool>("submit", args![]).unwrap());
//! scope.teardown().unwrap();
//! ```
//!
//! ## Intercepting new instances
//!
//! Code that builds its own collaborators must do it through a [`Factory`].
//! A scope can then redirect the factory for the rest of the test; see
//! [`Scope::intercept_new_instances`] and the [`factory`] module.

use std::sync::{Mutex, MutexGuard, PoisonError};

mod config;
mod error;
mod expectation;
pub mod factory;
mod handle;
pub mod matcher;
mod scope;
mod times;
mod value;
mod verify;

pub use crate::{
    config::Config,
    error::MockError,
    expectation::ExpectationBuilder,
    factory::Factory,
    handle::{Dispatch, HandleState, MockHandle},
    scope::{scoped, Scope},
    times::Expected,
    value::{Args, Callback, Value},
    verify::{Report, Violation},
};
pub use dynamock_derive::dispatch;
pub use predicates::prelude::{Predicate, predicate};

#[doc(hidden)]
pub use crate::value::AnyValue;

/// Lock a mutex, ignoring poison.  A panicking return policy must not make
/// the mock unusable for the rest of the test.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
