use super::*;

#[test]
fn queue_drains_in_order() {
    let queue = ToastQueue::new();
    queue.success("saved");
    queue.error("failed");
    assert_eq!(
        queue.drain(),
        vec![
            Toast { level: ToastLevel::Success, message: "saved".into() },
            Toast { level: ToastLevel::Error, message: "failed".into() },
        ]
    );
}

#[test]
fn drain_empties_queue() {
    let queue = ToastQueue::new();
    queue.success("once");
    assert_eq!(queue.drain().len(), 1);
    assert!(queue.drain().is_empty());
}
