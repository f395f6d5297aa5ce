//! 可入队元素的 arena
//!
//! 每个槽位除了元素本身，还带两组链接：
//! - `specific`：元素在其所属子队列中的前驱/后继
//! - `main`：元素在多队列聚合链表中的前驱/后继
//!
//! 链接用带代数（generation）的句柄表示，不存在引用环；任意位置的摘除都是 O(1)。

/// arena 中元素的句柄。代数不匹配的句柄视为过期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

/// 子队列在多队列中的编号；独立队列固定为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct QueueTag(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lane {
    Specific,
    Main,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Link {
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// 一条双向链表的头尾
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct List {
    pub(crate) head: Option<Handle>,
    pub(crate) tail: Option<Handle>,
}

#[derive(Debug)]
struct Entry<T> {
    item: T,
    queue: Option<QueueTag>,
    specific: Option<Link>,
    main: Option<Link>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

/// 可入队元素的存储池
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 放入一个元素（未入任何队列）
    pub fn insert(&mut self, item: T) -> Handle {
        let entry = Entry {
            item,
            queue: None,
            specific: None,
            main: None,
        };
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return Handle {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).expect("arena index overflow");
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        Handle {
            index,
            generation: 0,
        }
    }

    /// 取出元素。元素仍在队列中时属于调用方错误，直接 panic。
    pub fn remove(&mut self, h: Handle) -> T {
        let slot = &mut self.slots[h.index as usize];
        assert_eq!(slot.generation, h.generation, "stale arena handle {h:?}");
        let entry = slot.entry.take().expect("arena slot already vacant");
        assert!(
            entry.specific.is_none() && entry.main.is_none(),
            "removing {h:?} while it is still queued"
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(h.index);
        self.len -= 1;
        entry.item
    }

    pub fn get(&self, h: Handle) -> Option<&T> {
        self.entry(h).map(|e| &e.item)
    }

    pub fn get_mut(&mut self, h: Handle) -> Option<&mut T> {
        self.entry_opt_mut(h).map(|e| &mut e.item)
    }

    pub fn contains(&self, h: Handle) -> bool {
        self.entry(h).is_some()
    }

    /// 元素当前是否挂在某个子队列上
    pub fn is_queued(&self, h: Handle) -> bool {
        self.entry(h).is_some_and(|e| e.specific.is_some())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn entry(&self, h: Handle) -> Option<&Entry<T>> {
        let slot = self.slots.get(h.index as usize)?;
        if slot.generation != h.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_opt_mut(&mut self, h: Handle) -> Option<&mut Entry<T>> {
        let slot = self.slots.get_mut(h.index as usize)?;
        if slot.generation != h.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    fn entry_mut(&mut self, h: Handle) -> &mut Entry<T> {
        self.entry_opt_mut(h)
            .unwrap_or_else(|| panic!("stale arena handle {h:?}"))
    }

    fn lane_mut(&mut self, h: Handle, lane: Lane) -> &mut Option<Link> {
        let entry = self.entry_mut(h);
        match lane {
            Lane::Specific => &mut entry.specific,
            Lane::Main => &mut entry.main,
        }
    }

    fn linked_mut(&mut self, h: Handle, lane: Lane) -> &mut Link {
        self.lane_mut(h, lane)
            .as_mut()
            .unwrap_or_else(|| panic!("{h:?} is not linked on {lane:?}"))
    }

    pub(crate) fn queue_of(&self, h: Handle) -> Option<QueueTag> {
        self.entry(h).and_then(|e| e.queue)
    }

    pub(crate) fn is_linked(&self, h: Handle, lane: Lane) -> bool {
        self.entry(h).is_some_and(|e| match lane {
            Lane::Specific => e.specific.is_some(),
            Lane::Main => e.main.is_some(),
        })
    }

    pub(crate) fn next(&self, h: Handle, lane: Lane) -> Option<Handle> {
        let entry = self.entry(h)?;
        let link = match lane {
            Lane::Specific => entry.specific,
            Lane::Main => entry.main,
        };
        link.and_then(|l| l.next)
    }

    /// 追加到链表尾部。`Lane::Specific` 同时记录所属子队列。
    pub(crate) fn push_back(&mut self, list: &mut List, lane: Lane, h: Handle, tag: QueueTag) {
        let prev = list.tail;
        let slot = self.lane_mut(h, lane);
        debug_assert!(slot.is_none(), "{h:?} already linked on {lane:?}");
        *slot = Some(Link { prev, next: None });
        if lane == Lane::Specific {
            self.entry_mut(h).queue = Some(tag);
        }
        match prev {
            Some(t) => self.linked_mut(t, lane).next = Some(h),
            None => list.head = Some(h),
        }
        list.tail = Some(h);
    }

    /// 从链表任意位置摘除，前后邻居直接拼接。
    pub(crate) fn unlink(&mut self, list: &mut List, lane: Lane, h: Handle) {
        let Link { prev, next } = self
            .lane_mut(h, lane)
            .take()
            .unwrap_or_else(|| panic!("{h:?} is not linked on {lane:?}"));
        if lane == Lane::Specific {
            self.entry_mut(h).queue = None;
        }
        match prev {
            Some(p) => self.linked_mut(p, lane).next = next,
            None => list.head = next,
        }
        match next {
            Some(n) => self.linked_mut(n, lane).prev = prev,
            None => list.tail = prev,
        }
    }
}

impl<T> std::ops::Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, h: Handle) -> &T {
        self.get(h)
            .unwrap_or_else(|| panic!("stale arena handle {h:?}"))
    }
}

impl<T> std::ops::IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, h: Handle) -> &mut T {
        self.get_mut(h)
            .unwrap_or_else(|| panic!("stale arena handle {h:?}"))
    }
}
