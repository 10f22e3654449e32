// vim: tw=80
//! A partial mock forwards every method without an expectation to the real
//! object it wraps.
#![deny(warnings)]

use std::collections::HashMap;

use dynamock::*;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Inventory {
    stock: HashMap<String, u32>,
}

#[dispatch]
impl Inventory {
    fn stock_of(&self, item: &str) -> u32 {
        self.stock.get(item).copied().unwrap_or(0)
    }

    fn receive(&mut self, item: &str, n: u32) -> u32 {
        let count = self.stock.entry(item.to_owned()).or_default();
        *count += n;
        *count
    }

    fn remove(&mut self, item: &str, n: u32) -> Result<u32, String> {
        let count = self.stock.entry(item.to_owned()).or_default();
        if *count < n {
            return Err(format!("only {count} {item} in stock"));
        }
        *count -= n;
        Ok(*count)
    }
}

fn stocked() -> Inventory {
    let mut inv = Inventory::default();
    inv.receive("guitar", 3);
    inv
}

#[test]
fn undeclared_methods_pass_through() {
    let inv = MockHandle::partial("inventory", stocked());
    assert!(inv.is_partial());
    let n = inv.call_as::<u32>("stock_of", args![String::from("guitar")])
        .unwrap();
    assert_eq!(n, 3);
    let r = inv.call_as::<Result<u32, String>>("remove",
        args![String::from("guitar"), 5u32]).unwrap();
    assert_eq!(r, Err(String::from("only 3 guitar in stock")));
}

#[test]
fn declared_methods_are_mocked() {
    let scope = Scope::new();
    let inv = scope.partial("inventory", stocked());
    inv.should_receive("stock_of").with(params!["guitar"]).once()
        .and_return(0u32);
    let n = inv.call_as::<u32>("stock_of", args![String::from("guitar")])
        .unwrap();
    assert_eq!(n, 0);
    // The real object was not touched
    inv.should_receive("receive").pass_through();
    let n = inv.call_as::<u32>("receive", args![String::from("guitar"), 1u32])
        .unwrap();
    assert_eq!(n, 4);
    scope.teardown().unwrap();
}

#[test]
fn expectation_without_policy_forwards() {
    let inv = MockHandle::partial("inventory", stocked());
    inv.should_receive("receive").once();
    let n = inv.call_as::<u32>("receive", args![String::from("amp"), 2u32])
        .unwrap();
    assert_eq!(n, 2);
    inv.verify().unwrap();
}

#[test]
fn pass_through_result_is_unchanged() {
    let mut real = stocked();
    let inv = MockHandle::partial("inventory", stocked());
    for (item, n) in [("guitar", 1u32), ("guitar", 5), ("amp", 0)] {
        let expected = real.remove(item, n);
        let actual = inv.call_as::<Result<u32, String>>("remove",
            args![item.to_owned(), n]).unwrap();
        assert_eq!(actual, expected);
    }
}

#[test]
fn declared_method_with_other_arguments_is_not_forwarded() {
    let inv = MockHandle::partial("inventory", stocked());
    inv.should_receive("stock_of").with(params!["guitar"]).and_return(0u32);
    let e = inv.call("stock_of", args![String::from("amp")]).unwrap_err();
    assert!(matches!(e, MockError::NoMatchingExpectation{..}));
}

#[test]
fn unknown_method() {
    let inv = MockHandle::partial("inventory", stocked());
    let e = inv.call("restock", args![]).unwrap_err();
    assert!(matches!(e, MockError::UnexpectedCall{..}));
}

#[test]
fn wrong_arity() {
    let inv = MockHandle::partial("inventory", stocked());
    let e = inv.call("stock_of", args![]).unwrap_err();
    assert_eq!(e.to_string(),
        "stock_of: expected 1 argument(s), got 0");
}

#[test]
fn wrong_argument_type() {
    let inv = MockHandle::partial("inventory", stocked());
    let e = inv.call("receive", args![String::from("amp"), 2i32])
        .unwrap_err();
    assert_eq!(e.to_string(),
        "receive: argument 1 should be u32 but is i32");
}
