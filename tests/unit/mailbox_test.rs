//! Tests for mailbox implementations

use prometheus_task_queue::core::{Envelope, EnvelopeOptions, QueueError};
use prometheus_task_queue::infra::mailbox::memory::BoundedMailbox;

fn make_envelope(body: &str) -> Envelope {
    Envelope::from_message(&body, EnvelopeOptions::new())
}

#[test]
fn test_bounded_mailbox_enqueue_and_dequeue() {
    let mailbox = BoundedMailbox::new(4);
    mailbox.enqueue(make_envelope("one")).unwrap();
    mailbox.enqueue(make_envelope("two")).unwrap();
    assert_eq!(mailbox.size(), 2);

    let first = mailbox.try_dequeue().unwrap();
    assert_eq!(first.payload(), b"one");
    assert_eq!(mailbox.size(), 1);
}

#[test]
fn test_bounded_mailbox_rejects_when_full() {
    let mailbox = BoundedMailbox::new(1);
    mailbox.enqueue(make_envelope("only")).unwrap();
    assert_eq!(
        mailbox.enqueue(make_envelope("overflow")),
        Err(QueueError::CapacityExceeded)
    );
}

#[test]
fn test_bounded_mailbox_close() {
    let mailbox = BoundedMailbox::new(2);
    assert!(!mailbox.is_closed());
    mailbox.close();
    assert!(mailbox.is_closed());
    assert_eq!(
        mailbox.enqueue(make_envelope("late")),
        Err(QueueError::QueueShutdown)
    );
    assert_eq!(mailbox.dequeue().count(), 0);
}
