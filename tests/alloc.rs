//! Tests for the instance-allocation notification contract.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use trestle::{InstanceDescriptor, InstanceNotifier};

fn instance(name: &str) -> InstanceDescriptor {
    InstanceDescriptor {
        name: name.to_string(),
        slots: 4,
    }
}

#[test]
fn completion_is_delivered_from_another_thread() {
    let notifier = Arc::new(InstanceNotifier::new());
    let ticket = notifier.register();
    let id = ticket.id();

    let remote = Arc::clone(&notifier);
    let handle = thread::spawn(move || {
        // The allocator completes from its own context, never from the
        // requesting call path.
        thread::sleep(Duration::from_millis(10));
        remote.notify(id, instance("worker-1"))
    });

    let descriptor = ticket.wait().expect("allocation never completed");
    assert_eq!(descriptor.name, "worker-1");
    assert!(handle.join().unwrap());
}

#[test]
fn each_request_is_completed_exactly_once() {
    let notifier = InstanceNotifier::new();
    let ticket = notifier.register();
    let id = ticket.id();

    assert!(notifier.notify(id, instance("worker-1")));
    // The second completion for the same correlation id is rejected.
    assert!(!notifier.notify(id, instance("worker-2")));

    assert_eq!(ticket.wait().unwrap().name, "worker-1");
}

#[test]
fn unknown_correlation_ids_are_rejected() {
    let notifier = InstanceNotifier::new();
    let ticket = notifier.register();

    // An id the notifier never issued (ids are handed out sequentially, so
    // advance a second notifier past this one's range).
    let other = InstanceNotifier::new();
    other.register();
    let foreign = other.register();

    assert!(!notifier.notify(foreign.id(), instance("worker-1")));
    assert_eq!(notifier.outstanding(), 1);
    drop(ticket);
}

#[test]
fn outstanding_counts_open_requests() {
    let notifier = InstanceNotifier::new();
    let a = notifier.register();
    let b = notifier.register();
    assert_eq!(notifier.outstanding(), 2);

    assert!(notifier.notify(a.id(), instance("worker-1")));
    assert_eq!(notifier.outstanding(), 1);

    assert!(notifier.notify(b.id(), instance("worker-2")));
    assert_eq!(notifier.outstanding(), 0);
}

#[test]
fn try_wait_sees_an_already_delivered_completion() {
    let notifier = InstanceNotifier::new();
    let ticket = notifier.register();

    assert!(ticket.try_wait().is_none());
    notifier.notify(ticket.id(), instance("worker-1"));
    assert_eq!(ticket.try_wait().unwrap().name, "worker-1");
}
