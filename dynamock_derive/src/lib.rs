// vim: tw=80
//! Proc Macros for use with dynamock
//!
//! You probably don't want to use this crate directly.  Instead, you use use
//! its reexports via the [`dynamock`](../dynamock/index.html) crate.

#![cfg_attr(feature = "nightly_derive", feature(proc_macro_diagnostic))]
extern crate proc_macro;

use cfg_if::cfg_if;
use proc_macro2::Span;

mod dispatch;
use crate::dispatch::do_dispatch;

cfg_if! {
    // proc-macro2's Span::unstable method requires the nightly feature, and it
    // doesn't work in test mode.
    // https://github.com/alexcrichton/proc-macro2/issues/159
    if #[cfg(all(feature = "nightly_derive", not(test)))] {
        fn compile_error(span: Span, msg: &'static str) {
            span.unstable()
                .error(msg)
                .emit();
        }
    } else {
        fn compile_error(_span: Span, msg: &str) {
            panic!("{}.  More information may be available when dynamock is built with the \"nightly\" feature.", msg);
        }
    }
}

/// Make the methods of an `impl` block callable by name.
///
/// The `impl` block is emitted unchanged, followed by an implementation of
/// `dynamock::Dispatch` for the same type.  That lets the type be wrapped in
/// a partial mock, or built by a `dynamock::Factory`.
///
/// Every method that takes `&self` or `&mut self` becomes dispatchable.
/// Arguments are taken from the argument list by position and by type.
/// Reference arguments are supplied as their owned counterparts: `&str` as
/// `String`, `&Path` as `PathBuf`, `&[T]` as `Vec<T>`, and `&T` as `T`.
/// Reference return values are converted with `ToOwned`.
///
/// Methods that can't be dispatched are silently left out: static methods,
/// methods that take `self` by value, generic methods, `async` methods, and
/// methods with `impl Trait` arguments.  Other methods can be left out with
/// `#[dispatch(skip)]`.
///
/// # Examples
/// ```ignore
/// use dynamock::*;
/// struct Catalog {
///     items: Vec<String>
/// }
///
/// #[dispatch]
/// impl Catalog {
///     fn add(&mut self, name: &str) -> usize {
///         self.items.push(name.to_owned());
///         self.items.len()
///     }
///
///     fn first(&self) -> &str {
///         &self.items[0]
///     }
///
///     #[dispatch(skip)]
///     fn items(&self) -> impl Iterator<Item = &String> {
///         self.items.iter()
///     }
/// }
///
/// let mut catalog = Catalog { items: Vec::new() };
/// let d: &mut dyn Dispatch = &mut catalog;
/// let n = d.call_as::<usize>("add", args![String::from("guitar")]).unwrap();
/// assert_eq!(n, 1);
/// assert_eq!(d.call_as::<String>("first", args![]).unwrap(), "guitar");
/// assert!(d.dispatch("items", args![]).is_err());
/// ```
#[proc_macro_attribute]
pub fn dispatch(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    do_dispatch(attrs.into(), input.into()).into()
}
