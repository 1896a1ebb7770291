//! Contract matrix for the allocation-failure policy, driven through the
//! public crate API only. Terminate-mode rejections abort the process, so
//! this suite covers the decision table and the ReturnNull-mode behavior;
//! actual termination is exercised at the process boundary by the
//! wardalloc-harness oversize matrix.

use wardalloc_core::{
    AllocFront, AllocOrigin, FailureAction, FailureMode, MAX_ALLOWED_ALLOC_SIZE, RejectReason,
    Verdict,
};
use wardalloc_core::limit::{validate_product, validate_size};
use wardalloc_core::policy::on_rejected;

const OVERSIZE: usize = MAX_ALLOWED_ALLOC_SIZE + 1;

const ALL_ORIGINS: [AllocOrigin; 5] = [
    AllocOrigin::Plain,
    AllocOrigin::Zeroed,
    AllocOrigin::Resize,
    AllocOrigin::ConstructThrowing,
    AllocOrigin::ConstructNonThrowing,
];

#[test]
fn policy_decision_table_is_complete() {
    for origin in ALL_ORIGINS {
        assert_eq!(
            on_rejected(FailureMode::Terminate, origin),
            FailureAction::Terminate
        );
    }
    for origin in ALL_ORIGINS {
        let expected = match origin {
            AllocOrigin::ConstructThrowing => FailureAction::Terminate,
            _ => FailureAction::ReturnNull,
        };
        assert_eq!(on_rejected(FailureMode::ReturnNull, origin), expected);
    }
}

#[test]
fn validator_never_consults_the_policy() {
    // Identical verdicts no matter which mode any front runs under: the
    // verdict is a pure function of the request and the limit.
    let sizes = [0, 1, MAX_ALLOWED_ALLOC_SIZE, OVERSIZE, usize::MAX];
    for size in sizes {
        let v = validate_size(size);
        for _ in 0..4 {
            assert_eq!(validate_size(size), v);
        }
    }
    assert_eq!(
        validate_size(OVERSIZE),
        Verdict::Rejected(RejectReason::SizeExceeded {
            requested: OVERSIZE,
            limit: MAX_ALLOWED_ALLOC_SIZE,
        })
    );
}

#[test]
fn overflowing_product_is_rejected_not_wrapped() {
    // count * elem wraps to a tiny value with wrapping arithmetic; the
    // checked path must classify it as overflow.
    let count = usize::MAX / 4096 + 10;
    match validate_product(count, 4096) {
        Verdict::Rejected(RejectReason::SizeOverflow { .. }) => {}
        other => panic!("expected SizeOverflow rejection, got {other:?}"),
    }
}

#[test]
fn return_null_front_resolves_each_permitted_origin_to_null() {
    let mut front = AllocFront::new(FailureMode::ReturnNull);
    let existing = front.allocate(100).unwrap();

    assert_eq!(front.allocate(OVERSIZE), None);
    assert_eq!(front.allocate_zeroed(OVERSIZE / 4 + 1, 4), None);
    assert_eq!(front.resize(existing, OVERSIZE), None);
    assert_eq!(front.construct_nothrow(OVERSIZE), None);

    // The pre-existing allocation survived every rejection.
    assert_eq!(front.heap().lookup(existing), Some(100));
    assert_eq!(front.heap().active_count(), 1);
}

#[test]
fn rejected_requests_leave_no_backend_trace() {
    let mut front = AllocFront::new(FailureMode::ReturnNull);
    assert_eq!(front.allocate(OVERSIZE), None);
    assert_eq!(front.allocate_zeroed(usize::MAX, 2), None);
    assert!(front.heap_mut().drain_lifecycle_logs().is_empty());
    assert_eq!(front.heap().total_allocated(), 0);
}
