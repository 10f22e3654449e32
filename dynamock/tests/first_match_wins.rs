// vim: tw=80
//! When several expectations accept the same call, the one declared first
//! handles it, no matter how specific the others are.
#![deny(warnings)]

use dynamock::{*, matcher::*};

#[test]
fn general_before_specific() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params![kind_of::<i32>()])
        .and_return("general");
    item.should_receive("find").with(params![1i32]).and_return("specific");
    assert_eq!(item.call_as::<&str>("find", args![1i32]).unwrap(),
               "general");
}

#[test]
fn specific_before_general() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params![1i32]).and_return("specific");
    item.should_receive("find").with(params![kind_of::<i32>()])
        .and_return("general");
    assert_eq!(item.call_as::<&str>("find", args![1i32]).unwrap(),
               "specific");
    assert_eq!(item.call_as::<&str>("find", args![2i32]).unwrap(),
               "general");
}

#[test]
fn unconstrained_shadows_later() {
    let item = MockHandle::new("item");
    item.should_receive("find").and_return(0u32);
    item.should_receive("find").with(params![1i32]).once().and_return(1u32);
    assert_eq!(item.call_as::<u32>("find", args![1i32]).unwrap(), 0);
    // The shadowed expectation was never called
    let e = item.verify().unwrap_err();
    assert!(e.to_string().contains("expected 1, got 0 (with (var == 1))"));
}

#[test]
fn sequence_by_exhaustion() {
    let item = MockHandle::new("item");
    item.should_receive("next").once().and_return("a");
    item.should_receive("next").once().and_return("b");
    assert_eq!(item.call_as::<&str>("next", args![]).unwrap(), "a");
    assert_eq!(item.call_as::<&str>("next", args![]).unwrap(), "b");
    item.verify().unwrap();
}

#[test]
fn methods_are_independent() {
    let item = MockHandle::new("item");
    item.should_receive("name").and_return("guitar");
    item.should_receive("price").and_return(5u32);
    assert_eq!(item.call_as::<u32>("price", args![]).unwrap(), 5);
    assert_eq!(item.call_as::<&str>("name", args![]).unwrap(), "guitar");
}
