//! Tests for the two-part priority discipline of doctors and imaging rooms
//!
//! These tests drive `PriorityResource` and `ResourceRegistry` directly with
//! hand-made process ids, so every grant can be checked without running a
//! whole clinic day.

use clinic_flow_simulator::clinic::{PriorityKey, PriorityResource, RequestOutcome, ResourceRegistry};
use clinic_flow_simulator::simulation::ProcessId;
use clinic_flow_simulator::types::{DoctorId, ImagingRoomId, ResourceId};

const HORIZON: f64 = 480.0;

fn doctor() -> PriorityResource {
    PriorityResource::new(ResourceId::Doctor(DoctorId(0)), 1)
}

/// Release the current holder and return whoever got the slot next
fn hand_over(resource: &mut PriorityResource, holder: ProcessId) -> Option<ProcessId> {
    resource.release(holder).unwrap()
}

#[test]
fn test_earlier_appointment_wins_regardless_of_enqueue_order() {
    let mut resource = doctor();
    let holder = ProcessId(0);
    assert_eq!(resource.request(holder, PriorityKey::appointment(5.0)).unwrap(), RequestOutcome::Granted);

    // t2 enqueues before t1
    let late_slot = ProcessId(1);
    let early_slot = ProcessId(2);
    resource.request(late_slot, PriorityKey::appointment(40.0)).unwrap();
    resource.request(early_slot, PriorityKey::appointment(25.0)).unwrap();

    assert_eq!(hand_over(&mut resource, holder), Some(early_slot));
    assert_eq!(hand_over(&mut resource, early_slot), Some(late_slot));
    assert_eq!(hand_over(&mut resource, late_slot), None);
    assert!(resource.is_idle());
}

#[test]
fn test_walk_ins_wait_for_every_appointment() {
    let mut resource = doctor();
    let holder = ProcessId(0);
    resource.request(holder, PriorityKey::walk_in(1.0)).unwrap();

    // Early walk-ins queue first, then appointments booked much later
    let walk_in_a = ProcessId(1);
    let walk_in_b = ProcessId(2);
    let appointment_a = ProcessId(3);
    let appointment_b = ProcessId(4);
    resource.request(walk_in_a, PriorityKey::walk_in(2.0)).unwrap();
    resource.request(walk_in_b, PriorityKey::walk_in(3.0)).unwrap();
    resource.request(appointment_a, PriorityKey::appointment(470.0)).unwrap();
    resource.request(appointment_b, PriorityKey::appointment(300.0)).unwrap();

    let mut grants = Vec::new();
    let mut current = holder;
    while let Some(next) = hand_over(&mut resource, current) {
        grants.push(next);
        current = next;
    }
    assert_eq!(grants, vec![appointment_b, appointment_a, walk_in_a, walk_in_b]);
}

#[test]
fn test_appointment_at_30_beats_walk_in_at_35() {
    let mut resource = doctor();
    let holder = ProcessId(0);
    resource.request(holder, PriorityKey::appointment(10.0)).unwrap();

    // The walk-in enqueues first
    let walk_in = ProcessId(1);
    let appointment = ProcessId(2);
    assert_eq!(
        resource.request(walk_in, PriorityKey::walk_in(35.0)).unwrap(),
        RequestOutcome::Queued { position: 0 }
    );
    // Jumps ahead of the walk-in on arrival
    assert_eq!(
        resource.request(appointment, PriorityKey::appointment(30.0)).unwrap(),
        RequestOutcome::Queued { position: 0 }
    );

    assert_eq!(hand_over(&mut resource, holder), Some(appointment));
    assert_eq!(hand_over(&mut resource, appointment), Some(walk_in));

    // The scalar form ranks the pair the same way
    let offset = HORIZON * 1000.0;
    assert_eq!(PriorityKey::walk_in(35.0).legacy_scalar(offset), 480_035.0);
    assert!(
        PriorityKey::appointment(30.0).legacy_scalar(offset) < PriorityKey::walk_in(35.0).legacy_scalar(offset)
    );
}

#[test]
fn test_equal_keys_are_served_first_come_first_served() {
    let mut resource = doctor();
    let holder = ProcessId(0);
    resource.request(holder, PriorityKey::appointment(0.0)).unwrap();

    let first = ProcessId(7);
    let second = ProcessId(3);
    resource.request(first, PriorityKey::walk_in(50.0)).unwrap();
    resource.request(second, PriorityKey::walk_in(50.0)).unwrap();

    assert_eq!(hand_over(&mut resource, holder), Some(first));
    assert_eq!(hand_over(&mut resource, first), Some(second));
}

#[test]
fn test_never_more_than_one_holder() {
    let mut resource = doctor();
    for (index, time) in [12.0, 3.0, 7.5, 1.0].into_iter().enumerate() {
        resource.request(ProcessId(index), PriorityKey::walk_in(time)).unwrap();
        assert_eq!(resource.holder_count(), 1);
    }
    assert_eq!(resource.queue_len(), 3);

    let mut current = ProcessId(0);
    while let Some(next) = hand_over(&mut resource, current) {
        assert_eq!(resource.holder_count(), 1);
        assert!(resource.is_held_by(next));
        current = next;
    }
    assert_eq!(resource.holder_count(), 0);
}

#[test]
fn test_releasing_an_unheld_slot_is_an_error() {
    let mut resource = doctor();
    resource.request(ProcessId(0), PriorityKey::walk_in(1.0)).unwrap();
    assert!(resource.release(ProcessId(9)).is_err());
    assert!(resource.is_held_by(ProcessId(0)));
}

#[test]
fn test_evicted_waiter_never_gets_the_slot() {
    let mut resource = doctor();
    resource.request(ProcessId(0), PriorityKey::walk_in(1.0)).unwrap();
    resource.request(ProcessId(1), PriorityKey::appointment(2.0)).unwrap();
    resource.request(ProcessId(2), PriorityKey::walk_in(3.0)).unwrap();

    assert!(resource.evict(ProcessId(1)).is_empty());
    assert_eq!(resource.queue_len(), 1);
    assert_eq!(hand_over(&mut resource, ProcessId(0)), Some(ProcessId(2)));
}

#[test]
fn test_registry_routes_requests_per_resource() {
    let mut registry = ResourceRegistry::new(2, 2);
    let doctor_two = ResourceId::Doctor(DoctorId(1));
    let room_one = ResourceId::Imaging(ImagingRoomId(0));

    assert_eq!(
        registry.request(doctor_two, ProcessId(0), PriorityKey::walk_in(1.0)).unwrap(),
        RequestOutcome::Granted
    );
    assert_eq!(
        registry.request(room_one, ProcessId(1), PriorityKey::walk_in(1.0)).unwrap(),
        RequestOutcome::Granted
    );
    registry.request(room_one, ProcessId(2), PriorityKey::appointment(9.0)).unwrap();

    assert_eq!(registry.doctor_holder_counts(), vec![0, 1]);
    assert_eq!(registry.imaging_queue_lengths(), vec![1, 0]);
    assert_eq!(registry.shortest_imaging_queues(), vec![ImagingRoomId(1)]);
    assert!(!registry.all_idle());

    assert_eq!(registry.release(room_one, ProcessId(1)).unwrap(), Some(ProcessId(2)));
    registry.release(room_one, ProcessId(2)).unwrap();
    registry.release(doctor_two, ProcessId(0)).unwrap();
    assert!(registry.all_idle());
}

#[test]
fn test_registry_rejects_unknown_resources() {
    let mut registry = ResourceRegistry::new(1, 1);
    assert!(registry.get(ResourceId::Doctor(DoctorId(4))).is_err());
    assert!(registry
        .request(ResourceId::Imaging(ImagingRoomId(3)), ProcessId(0), PriorityKey::walk_in(0.0))
        .is_err());
}
