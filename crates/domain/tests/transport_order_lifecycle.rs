//! Full lifecycles of a transport order through its public API.

use domain::{
    Priority, TargetLocationGroup, TransportOrder, TransportOrderError, TransportOrderState,
    TransportUnitId,
};

#[test]
fn happy_path_ends_finished() {
    let mut order = TransportOrder::new(TransportUnitId::new()).with_priority(Priority::High);

    order.initialize().unwrap();
    order.start().unwrap();
    assert!(order.is_active());
    order.finish().unwrap();

    assert_eq!(order.state(), TransportOrderState::Finished);
    assert!(order.state().is_terminal());
    assert!(!order.is_active());
}

#[test]
fn interrupted_order_resumes_and_keeps_ownership() {
    let mut order = TransportOrder::new(TransportUnitId::new());
    order.initialize().unwrap();
    order.start().unwrap();

    order.interrupt().unwrap();
    assert!(order.is_active());
    assert!(order.state().can_start());

    order.start().unwrap();
    assert_eq!(order.state(), TransportOrderState::Started);
}

#[test]
fn terminal_orders_reject_every_transition() {
    for terminal in [
        TransportOrderState::Finished,
        TransportOrderState::Failed,
        TransportOrderState::Canceled,
    ] {
        let mut order = TransportOrder::restore(
            domain::TransportOrderId::new(),
            terminal,
            TransportUnitId::new(),
            None,
            Priority::Normal,
            chrono::Utc::now(),
        );

        assert!(order.initialize().is_err());
        assert!(order.start().is_err());
        assert!(order.finish().is_err());
        assert!(order.interrupt().is_err());
        assert!(order.fail().is_err());
        assert_eq!(
            order.cancel(),
            Err(TransportOrderError::InvalidStateTransition {
                current_state: terminal,
                action: "cancel",
            })
        );
        assert_eq!(order.state(), terminal);
    }
}

#[test]
fn rejected_transition_leaves_order_unchanged() {
    let group = TargetLocationGroup::new("HIGH_BAY");
    let mut order =
        TransportOrder::new(TransportUnitId::new()).with_target_location_group(Some(group));
    let before = order.clone();

    assert!(order.finish().is_err());
    assert!(order.start().is_err());

    assert_eq!(order, before);
}

#[test]
fn serialized_order_round_trips() {
    let order = TransportOrder::new(TransportUnitId::new())
        .with_target_location_group(Some(
            TargetLocationGroup::new("STOCK").with_infeed_blocked(true),
        ))
        .with_priority(Priority::Lowest);

    let json = serde_json::to_value(&order).unwrap();
    assert_eq!(json["state"], "CREATED");
    assert_eq!(json["priority"], "LOWEST");

    let restored: TransportOrder = serde_json::from_value(json).unwrap();
    assert_eq!(restored, order);
    assert!(restored.is_target_blocked());
}
