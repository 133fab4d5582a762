#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::rc::Rc;

use common::{entity, entity_in_state, CountingAgent, CountingEndPoint};
use unitwork_core::commands::{CompositeCommand, UnloadEndPointsCommand};
use unitwork_core::relations::{
    EndPointRef, RegistrationAgent, VirtualCollectionEndPoint, VirtualEndPoint,
};
use unitwork_core::types::{EntityId, EntityState, RelationEndPointId};
use unitwork_core::{
    CommandExt, CommandRef, DataCommand, Phase, UnitOfWork, UnitOfWorkConfig, UowError,
};

fn uow_with_counting_agent() -> (UnitOfWork, Rc<CountingAgent>) {
    let agent = Rc::new(CountingAgent::default());
    let uow = UnitOfWork::with_agent(UnitOfWorkConfig::default(), agent.clone()).unwrap();
    (uow, agent)
}

#[test]
fn test_unload_end_points_end_to_end() {
    let (uow, agent) = uow_with_counting_agent();
    let a = entity("Order", 1);
    let b = entity("Order", 2);
    uow.enlist(&a).unwrap();
    uow.enlist(&b).unwrap();

    let a_items = CountingEndPoint::new(a.id().clone(), "OrderItems", true);
    let a_notes = CountingEndPoint::new(a.id().clone(), "Notes", false);
    let b_items = CountingEndPoint::new(b.id().clone(), "OrderItems", true);
    for ep in [&a_items, &a_notes, &b_items] {
        uow.register_end_point(ep.clone()).unwrap();
    }

    let tree: CommandRef = Rc::new(CompositeCommand::new(vec![
        uow.create_unload_end_points_command(vec![
            a_items.clone() as EndPointRef,
            a_notes.clone() as EndPointRef,
        ]),
        uow.create_unload_end_points_command(vec![b_items.clone() as EndPointRef]),
    ]));

    let plan = tree.expand_to_all_related_objects();
    assert!(plan.collect_exceptions().is_empty());
    plan.begin().unwrap();
    plan.perform().unwrap();
    plan.end().unwrap();

    for ep in [&a_items, &a_notes, &b_items] {
        assert_eq!(ep.marked_count(), 1);
    }
    assert_eq!(agent.unregister_count(a_items.id()), 1);
    assert_eq!(agent.unregister_count(b_items.id()), 1);
    assert_eq!(agent.unregister_count(a_notes.id()), 0);

    let map = uow.end_point_map().borrow();
    assert_eq!(map.len(), 1);
    assert!(map.contains(a_notes.id()));
    // Entities are untouched by end-point unloading
    assert_eq!(uow.registry().count(), 2);
}

#[test]
fn test_unload_end_points_stops_at_first_unregister_failure() {
    let (uow, agent) = uow_with_counting_agent();
    let missing = CountingEndPoint::new(EntityId::new("Order", 1), "OrderItems", true);
    let later = CountingEndPoint::new(EntityId::new("Order", 2), "OrderItems", true);
    uow.register_end_point(later.clone()).unwrap();

    let command = UnloadEndPointsCommand::new(
        vec![missing.clone() as EndPointRef, later.clone() as EndPointRef],
        agent.clone() as Rc<dyn RegistrationAgent>,
        Rc::clone(uow.end_point_map()),
    );

    let err = command.perform().unwrap_err();

    assert_eq!(
        err,
        UowError::EndPointNotRegistered {
            end_point_id: missing.id().clone()
        }
    );
    assert_eq!(missing.marked_count(), 1);
    assert_eq!(later.marked_count(), 0);
    assert_eq!(agent.unregistered(), vec![missing.id().clone()]);
    assert!(uow.end_point_map().borrow().contains(later.id()));
}

#[test]
fn test_unload_end_points_unregisters_each_end_point_after_marking_it() {
    let (uow, agent) = uow_with_counting_agent();
    let first = CountingEndPoint::new(EntityId::new("Order", 1), "OrderItems", true);
    let kept = CountingEndPoint::new(EntityId::new("Order", 2), "OrderItems", false);
    let last = CountingEndPoint::new(EntityId::new("Order", 3), "OrderItems", true);
    for ep in [&first, &kept, &last] {
        uow.register_end_point(ep.clone()).unwrap();
    }

    uow.create_unload_end_points_command(vec![
        first.clone() as EndPointRef,
        kept.clone() as EndPointRef,
        last.clone() as EndPointRef,
    ])
    .notify_and_perform()
    .unwrap();

    for ep in [&first, &kept, &last] {
        assert_eq!(ep.marked_count(), 1);
    }
    assert_eq!(
        agent.unregistered(),
        vec![first.id().clone(), last.id().clone()]
    );
    assert_eq!(uow.end_point_map().borrow().ids(), vec![kept.id().clone()]);
}

#[test]
fn test_unload_command_cascades_through_execute() {
    let uow = UnitOfWork::new(UnitOfWorkConfig::default()).unwrap();
    let order = entity("Order", 7);
    let customer = entity("Customer", 1);
    uow.enlist(&order).unwrap();
    uow.enlist(&customer).unwrap();

    let items = Rc::new(VirtualCollectionEndPoint::loaded(
        RelationEndPointId::new(order.id().clone(), "OrderItems"),
        vec![EntityId::new("OrderItem", 1), EntityId::new("OrderItem", 2)],
    ));
    let pending = Rc::new(VirtualCollectionEndPoint::loaded(
        RelationEndPointId::new(order.id().clone(), "Shipments"),
        Vec::new(),
    ));
    pending.add_opposite(EntityId::new("Shipment", 1));
    uow.register_end_point(items.clone()).unwrap();
    uow.register_end_point(pending.clone()).unwrap();

    let command = uow.create_unload_command(
        &[order.id().clone()],
        vec![items.clone() as EndPointRef, pending.clone() as EndPointRef],
    );
    let report = uow.execute(command).unwrap();

    assert_eq!(report.commands, 2);
    assert_eq!(
        report.phases_completed,
        vec![Phase::Begin, Phase::Perform, Phase::End]
    );
    assert!(!uow.registry().is_enlisted(&order));
    assert!(uow.registry().is_enlisted(&customer));
    assert!(items.opposite_ids().is_empty());
    // Locally changed end-points keep their contents and stay registered
    assert_eq!(pending.opposite_ids().len(), 1);
    assert_eq!(
        uow.end_point_map().borrow().ids(),
        vec![RelationEndPointId::new(order.id().clone(), "Shipments")]
    );
}

#[test]
fn test_unload_planning_errors_are_rejected_before_any_mutation() {
    let uow = UnitOfWork::new(UnitOfWorkConfig::default()).unwrap();
    let clean = entity("Order", 1);
    let (dirty, dirty_ref) = entity_in_state("Order", 2, EntityState::Unchanged);
    uow.enlist(&clean).unwrap();
    uow.enlist(&dirty_ref).unwrap();
    dirty.set_state(EntityState::Changed);

    let unknown = EntityId::new("Order", 3);
    let unload = uow.create_unload_command(&[clean.id().clone()], Vec::new());
    let blocked = uow.create_unload_command(&[dirty_ref.id().clone(), unknown.clone()], Vec::new());
    let tree: CommandRef = Rc::new(CompositeCommand::new(vec![unload, blocked]));

    let err = uow.execute(tree).unwrap_err();

    assert_eq!(
        err,
        UowError::PlanRejected {
            errors: vec![
                UowError::UnloadNotPossible {
                    entity_id: EntityId::new("Order", 2),
                    state: EntityState::Changed,
                },
                UowError::UnknownEntity { entity_id: unknown },
            ]
        }
    );
    assert_eq!(uow.registry().count(), 2);
    assert!(uow.registry().is_enlisted(&clean));
}

#[test]
fn test_plan_without_rejection_runs_until_poison_node() {
    let config = UnitOfWorkConfig {
        reject_plans_with_errors: false,
        ..UnitOfWorkConfig::default()
    };
    let uow = UnitOfWork::new(config).unwrap();
    let order = entity("Order", 1);
    uow.enlist(&order).unwrap();

    let missing = EntityId::new("Order", 2);
    let tree = CompositeCommand::new(vec![
        uow.create_unload_command(&[order.id().clone()], Vec::new()),
        uow.create_unload_command(&[missing.clone()], Vec::new()),
    ]);
    assert!(!tree.can_execute());

    let err = uow.execute(Rc::new(tree)).unwrap_err();

    assert_eq!(err, UowError::UnknownEntity { entity_id: missing });
    // `begin` failed, so nothing was performed
    assert!(uow.registry().is_enlisted(&order));
}

#[test]
fn test_reenlist_after_unload() {
    let uow = UnitOfWork::new(UnitOfWorkConfig::default()).unwrap();
    let order = entity("Order", 1);
    uow.enlist(&order).unwrap();

    uow.execute(uow.create_unload_command(&[order.id().clone()], Vec::new()))
        .unwrap();
    let reloaded = entity("Order", 1);
    assert!(uow.enlist(&reloaded).unwrap());

    assert_eq!(uow.registry().slot_count(), 2);
    assert!(uow.lookup(order.id()).unwrap().ptr_eq(&reloaded));
}

#[test]
fn test_duplicate_ids_unload_the_entity_once() {
    let uow = UnitOfWork::new(UnitOfWorkConfig::default()).unwrap();
    let order = entity("Order", 1);
    let customer = entity("Customer", 1);
    uow.enlist(&order).unwrap();
    uow.enlist(&customer).unwrap();
    let items = Rc::new(VirtualCollectionEndPoint::loaded(
        RelationEndPointId::new(order.id().clone(), "OrderItems"),
        Vec::new(),
    ));
    uow.register_end_point(items.clone()).unwrap();

    let command = uow.create_unload_command(
        &[order.id().clone(), customer.id().clone(), order.id().clone()],
        vec![items.clone() as EndPointRef],
    );
    assert!(command.collect_exceptions().is_empty());

    let report = uow.execute(command).unwrap();

    assert_eq!(report.phases_completed, vec![Phase::Begin, Phase::Perform, Phase::End]);
    assert_eq!(uow.registry().count(), 0);
    assert!(uow.end_point_map().borrow().is_empty());
}

#[test]
fn test_shared_map_is_not_reentrant() {
    let (uow, agent) = uow_with_counting_agent();
    let ep = CountingEndPoint::new(EntityId::new("Order", 1), "OrderItems", true);
    uow.register_end_point(ep.clone()).unwrap();

    let command = UnloadEndPointsCommand::new(
        vec![ep.clone() as EndPointRef],
        agent,
        Rc::clone(uow.end_point_map()),
    );
    let held = uow.end_point_map().borrow();

    assert!(matches!(command.perform(), Err(UowError::Internal { .. })));
    assert!(held.contains(ep.id()));
    assert_eq!(ep.marked_count(), 0);
}
