// vim: tw=80
//! Argument constraints: literals, sentinels, predicates and closures.
#![deny(warnings)]

use dynamock::{*, matcher::*};

#[test]
fn literal_requires_exact_type() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params![1i32]).and_return(true);
    assert!(item.call_as::<bool>("find", args![1i32]).unwrap());
    let e = item.call("find", args![1u64]).unwrap_err();
    assert!(matches!(e, MockError::NoMatchingExpectation{..}));
}

#[test]
fn str_literal_matches_string() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params!["guitar"]).and_return(true);
    assert!(item.call_as::<bool>("find", args!["guitar"]).unwrap());
    assert!(item.call_as::<bool>("find", args![String::from("guitar")])
        .unwrap());
    assert!(item.call("find", args!["piano"]).is_err());
}

#[test]
fn kind_of_matches_any_value_of_type() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params![kind_of::<String>()]);
    for s in ["", "a", "guitar"] {
        item.call("find", args![s.to_owned()]).unwrap();
    }
    assert!(item.call("find", args!["guitar"]).is_err());
    assert!(item.call("find", args![5i32]).is_err());
}

#[test]
fn any_callable_matches_any_callback() {
    let item = MockHandle::new("item");
    item.should_receive("each").with(params![any_callable()]);
    item.call("each", Args::new().with_block(|_| Ok(Value::unit())))
        .unwrap();
    item.call("each", Args::new().with_block(|_| Err(MockError::user("x"))))
        .unwrap();
    assert!(item.call("each", args![0i32]).is_err());
}

#[test]
fn any_and_rest() {
    let item = MockHandle::new("item");
    item.should_receive("log").with(params![any(), rest()]);
    item.call("log", args![1i32]).unwrap();
    item.call("log", args!["a", 2u8, 3.0f64]).unwrap();
    assert!(item.call("log", args![]).is_err());
}

#[test]
fn arity_must_match() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params![1i32]);
    assert!(item.call("find", args![1i32, 2i32]).is_err());
    assert!(item.call("find", args![]).is_err());
}

#[test]
fn empty_params_match_no_arguments() {
    let item = MockHandle::new("item");
    item.should_receive("reset").with(params![]);
    item.call("reset", args![]).unwrap();
    assert!(item.call("reset", args![0i32]).is_err());
}

#[test]
fn predicates() {
    let item = MockHandle::new("item");
    item.should_receive("discount")
        .with(params![pred::<u32, _>(predicate::in_iter(vec![10, 20]))])
        .and_return(true);
    item.should_receive("discount")
        .with(params![function::<u32, _>(|x| *x > 100)])
        .and_return(false);
    assert!(item.call_as::<bool>("discount", args![20u32]).unwrap());
    assert!(!item.call_as::<bool>("discount", args![150u32]).unwrap());
    assert!(item.call("discount", args![50u32]).is_err());
}

#[test]
fn withf() {
    let item = MockHandle::new("item");
    item.should_receive("add")
        .withf(|args| args.len() == 2 &&
               args.get_as::<i32>(0) == args.get_as::<i32>(1))
        .and_return(true);
    assert!(item.call_as::<bool>("add", args![3i32, 3i32]).unwrap());
    assert!(item.call("add", args![3i32, 4i32]).is_err());
}

#[test]
fn with_any_args_undoes_with() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params![1i32]).with_any_args();
    item.call("find", args!["anything", 2u8]).unwrap();
}

#[test]
fn matching_is_idempotent() {
    let item = MockHandle::new("item");
    item.should_receive("find")
        .with(params![1i32, kind_of::<String>(), any_callable()])
        .and_return(true);
    let args = || args![1i32, String::from("a")]
        .with_block(|_| Ok(Value::unit()));
    for _ in 0..3 {
        assert!(item.call_as::<bool>("find", args()).unwrap());
    }
    for _ in 0..3 {
        assert!(item.call("find", args![2i32]).is_err());
    }
}

#[test]
fn mismatch_explains_every_candidate() {
    let item = MockHandle::new("item");
    item.should_receive("find").with(params![1i32]);
    item.should_receive("find").with(params![kind_of::<String>()]);
    let e = item.call("find", args![2i32]).unwrap_err();
    let msg = e.to_string();
    assert!(msg.contains("item: no matching expectation for find(2)"),
            "{msg}");
    assert!(msg.contains("find(var == 1)"), "{msg}");
    assert!(msg.contains("find(kind_of(alloc::string::String))"), "{msg}");
}
