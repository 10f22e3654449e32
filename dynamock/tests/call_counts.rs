// vim: tw=80
//! Call counts are checked at verification, and every violation reports the
//! expected range along with the actual count.
#![deny(warnings)]

use dynamock::*;
use pretty_assertions::assert_eq;

#[test]
fn once_called_once() {
    let guitar = MockHandle::new("guitar");
    guitar.should_receive("name").once().and_return("Deschutes");
    guitar.call("name", args![]).unwrap();
    guitar.verify().unwrap();
    assert_eq!(guitar.state(), HandleState::Verified);
}

#[test]
fn guitar_each_method_called_once() {
    let scope = Scope::new();
    let guitar = scope.mock("guitar");
    guitar.should_receive("name").once().and_return("Deschutes");
    guitar.should_receive("description").once()
        .and_return("Deschutes model Guitar");
    guitar.should_receive("unit_price").once().and_return(2400.00f64);
    assert_eq!(guitar.call_as::<&str>("name", args![]).unwrap(), "Deschutes");
    assert_eq!(guitar.call_as::<&str>("description", args![]).unwrap(),
               "Deschutes model Guitar");
    assert_eq!(guitar.call_as::<f64>("unit_price", args![]).unwrap(), 2400.0);
    scope.teardown().unwrap();
    assert_eq!(guitar.state(), HandleState::Verified);
}

#[test]
fn once_called_twice() {
    let guitar = MockHandle::new("guitar");
    guitar.should_receive("name").once().and_return("Deschutes");
    guitar.call("name", args![]).unwrap();
    guitar.call("name", args![]).unwrap();
    let e = guitar.verify().unwrap_err();
    assert!(e.to_string().contains("guitar: name: expected 1, got 2"));
    assert_eq!(guitar.state(), HandleState::Failed);
}

#[test]
fn once_never_called() {
    let guitar = MockHandle::new("guitar");
    guitar.should_receive("name").once();
    let e = guitar.verify().unwrap_err();
    let v = e.report().unwrap().find("guitar", "name").unwrap();
    assert_eq!(v.actual, 0);
    assert_eq!(v.expected.to_string(), "1");
}

#[test]
fn at_least_once() {
    for n in 1..5 {
        let item = MockHandle::new("item");
        item.should_receive("find").at_least().once();
        for _ in 0..n {
            item.call("find", args![1i32]).unwrap();
        }
        item.verify().unwrap();
    }
}

#[test]
fn at_least_once_never_called() {
    let scope = Scope::new();
    let item = scope.mock("item");
    item.should_receive("find")
        .with(params![1i32])
        .at_least()
        .once();
    match scope.teardown() {
        Err(MockError::VerificationFailed(report)) => {
            assert_eq!(report.violations().len(), 1);
            let v = &report.violations()[0];
            assert_eq!(v.handle, "item");
            assert_eq!(v.method, "find");
            assert_eq!(v.constraint, "(var == 1)");
            assert_eq!(v.actual, 0);
        },
        r => panic!("Unexpected result {r:?}")
    }
}

#[test]
fn at_most_twice() {
    let item = MockHandle::new("item");
    item.should_receive("find").at_most().twice();
    item.verify().unwrap();
    for _ in 0..3 {
        item.call("find", args![]).unwrap();
    }
    let e = item.verify().unwrap_err();
    assert!(e.to_string().contains("item: find: expected at most 2, got 3"));
}

#[test]
fn modifier_applies_to_next_count_only() {
    let item = MockHandle::new("item");
    item.should_receive("find").at_least().once().times(3);
    item.call("find", args![]).unwrap();
    assert!(item.verify().is_err());
}

#[test]
fn never() {
    let item = MockHandle::new("item");
    item.should_not_receive("delete");
    item.verify().unwrap();
    item.call("delete", args![]).unwrap();
    let e = item.verify().unwrap_err();
    assert!(e.to_string().contains("item: delete: expected 0, got 1"));
}

#[test]
fn times_range() {
    let item = MockHandle::new("item");
    item.should_receive("find").times_range(2..4);
    item.call("find", args![]).unwrap();
    assert!(item.verify().is_err());
    item.call("find", args![]).unwrap();
    item.verify().unwrap();
    item.call("find", args![]).unwrap();
    item.verify().unwrap();
    item.call("find", args![]).unwrap();
    let e = item.verify().unwrap_err();
    assert!(e.to_string().contains("expected between 2 and 3, got 4"));
}

#[test]
fn recent_calls_are_reported() {
    let scope = Scope::with_config(Config::default().history_limit(2));
    let item = scope.mock("item");
    item.should_receive("find").once();
    for i in 0..3i32 {
        item.call("find", args![i]).unwrap();
    }
    let e = scope.teardown().unwrap_err();
    let v = e.report().unwrap().find("item", "find").unwrap();
    assert_eq!(v.recent, vec!["(1)".to_owned(), "(2)".to_owned()]);
}

#[test]
fn all_violations_are_aggregated() {
    let scope = Scope::new();
    let guitar = scope.mock("guitar");
    let amp = scope.mock("amp");
    guitar.should_receive("name").once();
    guitar.should_receive("tune").never();
    amp.should_receive("volume").twice();
    guitar.call("tune", args![]).unwrap();
    let e = scope.teardown().unwrap_err();
    let report = e.report().unwrap();
    assert_eq!(report.violations().len(), 3);
    assert!(report.find("guitar", "name").is_some());
    assert!(report.find("guitar", "tune").is_some());
    assert!(report.find("amp", "volume").is_some());
    assert!(e.to_string().starts_with("3 unsatisfied expectation(s):"));
    assert_eq!(guitar.state(), HandleState::Failed);
    assert_eq!(amp.state(), HandleState::Failed);
}
