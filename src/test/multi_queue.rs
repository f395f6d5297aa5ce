use crate::queue::{Arena, MultiQueue, PacketQueue, QueueError};

#[derive(Debug, Clone, PartialEq)]
struct Item {
    src: u32,
    id: u32,
}

fn by_src(item: &Item) -> Option<u32> {
    Some(item.src)
}

fn setup() -> (Arena<Item>, MultiQueue<Item, u32>) {
    let mut mq = MultiQueue::new("mq", by_src);
    mq.add_queue(1, PacketQueue::new("from-1"));
    mq.add_queue(2, PacketQueue::with_limit("from-2", 2));
    (Arena::new(), mq)
}

#[test]
fn anonymous_dequeue_follows_global_arrival_order() {
    let (mut arena, mut mq) = setup();
    let hs: Vec<_> = [(1, 0), (2, 1), (9, 2), (1, 3)]
        .into_iter()
        .map(|(src, id)| arena.insert(Item { src, id }))
        .collect();
    for &h in &hs {
        mq.enqueue(&mut arena, h).expect("room");
    }
    assert_eq!(mq.len(), 4);
    // src=9 没有注册子队列，落到匿名子队列
    assert_eq!(mq.anonymous_len(), 1);
    assert_eq!(mq.len_keyed(&1), Ok(2));
    assert_eq!(mq.handles(&arena), hs);

    let mut order = Vec::new();
    while let Ok(h) = mq.dequeue(&mut arena) {
        order.push(arena[h].id);
    }
    assert_eq!(order, vec![0, 1, 2, 3]);
    assert!(mq.is_empty());
    assert_eq!(mq.dequeue(&mut arena), Err(QueueError::Empty));
}

#[test]
fn keyed_dequeue_splices_the_aggregate_list() {
    let (mut arena, mut mq) = setup();
    let a = arena.insert(Item { src: 1, id: 0 });
    let b = arena.insert(Item { src: 2, id: 1 });
    let c = arena.insert(Item { src: 1, id: 2 });
    let d = arena.insert(Item { src: 2, id: 3 });
    for h in [a, b, c, d] {
        mq.enqueue(&mut arena, h).expect("room");
    }

    assert_eq!(mq.dequeue_keyed(&mut arena, &2), Ok(b));
    assert_eq!(mq.handles(&arena), vec![a, c, d]);
    assert_eq!(mq.keyed_handles(&arena, &2), Ok(vec![d]));
    assert_eq!(mq.len(), 3);

    // 聚合头 a 同时是子队列 1 的头
    assert_eq!(mq.dequeue(&mut arena), Ok(a));
    assert_eq!(mq.peek_keyed(&1), Ok(c));
    assert_eq!(mq.dequeue_keyed(&mut arena, &1), Ok(c));
    assert_eq!(mq.is_empty_keyed(&1), Ok(true));
    assert_eq!(mq.dequeue_keyed(&mut arena, &1), Err(QueueError::Empty));
    assert_eq!(mq.peek(), Ok(d));
    assert_eq!(mq.dequeue(&mut arena), Ok(d));
    assert!(mq.is_empty());
}

#[test]
fn full_sub_queue_rejects_without_touching_aggregate() {
    let (mut arena, mut mq) = setup();
    let hs: Vec<_> = (0..3).map(|id| arena.insert(Item { src: 2, id })).collect();
    mq.enqueue(&mut arena, hs[0]).expect("room");
    mq.enqueue(&mut arena, hs[1]).expect("room");
    assert_eq!(mq.enqueue(&mut arena, hs[2]), Err(QueueError::Full));

    assert_eq!(mq.len(), 2);
    assert_eq!(mq.handles(&arena), vec![hs[0], hs[1]]);
    assert!(!arena.is_queued(hs[2]));
}

#[test]
fn unknown_key_is_reported() {
    let (mut arena, mut mq) = setup();
    let h = arena.insert(Item { src: 1, id: 0 });
    assert!(matches!(
        mq.enqueue_keyed(&mut arena, h, &42),
        Err(QueueError::InvalidKey(_))
    ));
    assert!(matches!(
        mq.dequeue_keyed(&mut arena, &42),
        Err(QueueError::InvalidKey(_))
    ));
    assert!(!mq.contains_key(&42));
    assert!(mq.contains_key(&1));

    // 按 key 入队不经过分类函数
    mq.enqueue_keyed(&mut arena, h, &2).expect("room");
    assert_eq!(mq.len_keyed(&2), Ok(1));
    assert_eq!(mq.len_keyed(&1), Ok(0));
}

#[test]
fn item_cannot_be_queued_twice() {
    let (mut arena, mut mq) = setup();
    let h = arena.insert(Item { src: 1, id: 0 });
    mq.enqueue(&mut arena, h).expect("room");
    assert_eq!(mq.enqueue(&mut arena, h), Err(QueueError::AlreadyQueued));
    assert_eq!(
        mq.enqueue_keyed(&mut arena, h, &2),
        Err(QueueError::AlreadyQueued)
    );
    assert_eq!(mq.len(), 1);
}

#[test]
#[should_panic(expected = "registered twice")]
fn registering_a_key_twice_panics() {
    let (_arena, mut mq) = setup();
    mq.add_queue(1, PacketQueue::new("again"));
}
