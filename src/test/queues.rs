use crate::queue::{AccountingQueue, Arena, PacketQueue, QueueError};

#[test]
fn accounting_queue_rejects_enqueue_when_full_without_mutating() {
    let mut q = AccountingQueue::with_limit("acct", 2);
    assert!(q.account_enqueue().is_ok());
    assert!(q.account_enqueue().is_ok());
    assert!(q.is_full());

    assert_eq!(q.account_enqueue(), Err(QueueError::Full));
    assert_eq!(q.size(), 2);

    assert!(q.account_dequeue().is_ok());
    assert!(q.account_dequeue().is_ok());
    assert_eq!(q.account_dequeue(), Err(QueueError::Empty));
    assert_eq!(q.size(), 0);
}

#[test]
fn accounting_queue_limit_changes_only_when_empty() {
    let mut q = AccountingQueue::new("acct");
    assert_eq!(q.limit(), None);
    q.account_enqueue().expect("unbounded");

    assert!(!q.set_size_limit(Some(1)));
    assert_eq!(q.limit(), None);

    q.account_dequeue().expect("one item");
    assert!(q.set_size_limit(Some(1)));
    assert_eq!(q.limit(), Some(1));
}

#[test]
fn packet_queue_is_fifo() {
    let mut arena = Arena::new();
    let mut q = PacketQueue::new("q");
    let hs: Vec<_> = (0..3).map(|i| arena.insert(i)).collect();
    for &h in &hs {
        q.enqueue(&mut arena, h).expect("unbounded");
    }
    assert_eq!(q.len(), 3);
    assert_eq!(q.handles(&arena), hs);

    assert_eq!(q.peek(), Ok(hs[0]));
    assert_eq!(q.dequeue(&mut arena), Ok(hs[0]));
    assert_eq!(q.dequeue(&mut arena), Ok(hs[1]));
    assert_eq!(q.dequeue(&mut arena), Ok(hs[2]));
    assert_eq!(q.dequeue(&mut arena), Err(QueueError::Empty));
    assert_eq!(q.peek(), Err(QueueError::Empty));
    assert!(!arena.is_queued(hs[0]));
}

#[test]
fn packet_queue_full_rejects_without_linking() {
    let mut arena = Arena::new();
    let mut q = PacketQueue::with_limit("q", 1);
    let a = arena.insert("a");
    let b = arena.insert("b");

    q.enqueue(&mut arena, a).expect("room for one");
    assert_eq!(q.enqueue(&mut arena, b), Err(QueueError::Full));
    assert_eq!(q.len(), 1);
    assert!(!arena.is_queued(b));
    assert_eq!(q.handles(&arena), vec![a]);

    // 未入队的元素可以直接移除
    assert_eq!(arena.remove(b), "b");
}

#[test]
fn packet_queue_rejects_item_already_in_a_queue() {
    let mut arena = Arena::new();
    let mut q1 = PacketQueue::new("q1");
    let mut q2 = PacketQueue::new("q2");
    let h = arena.insert(7u32);

    q1.enqueue(&mut arena, h).expect("first enqueue");
    assert_eq!(q1.enqueue(&mut arena, h), Err(QueueError::AlreadyQueued));
    assert_eq!(q2.enqueue(&mut arena, h), Err(QueueError::AlreadyQueued));
    assert_eq!(q1.len(), 1);
    assert_eq!(q2.len(), 0);

    q1.dequeue(&mut arena).expect("one item");
    q2.enqueue(&mut arena, h).expect("free to move");
    assert_eq!(q2.peek(), Ok(h));
}

#[test]
fn arena_handles_go_stale_after_remove() {
    let mut arena = Arena::new();
    let h = arena.insert(1u8);
    assert_eq!(arena.remove(h), 1);
    assert!(!arena.contains(h));
    assert!(arena.get(h).is_none());

    // 槽位复用后旧句柄仍然无效
    let h2 = arena.insert(2u8);
    assert_ne!(h, h2);
    assert!(arena.get(h).is_none());
    assert_eq!(arena[h2], 2);
    assert_eq!(arena.len(), 1);
}

#[test]
#[should_panic(expected = "still queued")]
fn arena_refuses_to_remove_a_queued_item() {
    let mut arena = Arena::new();
    let mut q = PacketQueue::new("q");
    let h = arena.insert(());
    q.enqueue(&mut arena, h).expect("unbounded");
    arena.remove(h);
}
