/*!
Lifetime bookkeeping for vertices.

Vertices reference each other through their neighbourhoods, so reference
counting alone never frees a closed mesh. Every vertex registers itself with
the [`VOwner`] registry when it is created, and deregisters itself when its
last handle drops. Tearing the registry down releases every vertex that is
still alive, regardless of outstanding handles, by cutting its links to other
vertices. While that sweep runs the registry is inactive, and vertices that
drop as a consequence of the sweep do not touch it. Vertices that survive the
sweep, because a handle to them is still held, stay registered.

The registry lives in thread local storage: handles are not `Send`, so a
vertex never outlives or leaves the thread that created it. Labels come from
a process wide counter and are never reused.
*/

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_LABEL: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static OWNER: VOwner = VOwner::new();
}

/// Something the registry can force to drop its links to other vertices.
pub(crate) trait Release {
    fn release(&self);

    /// Check if a handle to the vertex still exists.
    fn is_held(&self) -> bool;
}

/// Registry of all live vertices created on the current thread.
struct VOwner {
    active: Cell<bool>,
    live: RefCell<BTreeMap<u64, Box<dyn Release>>>,
}

impl VOwner {
    fn new() -> Self {
        VOwner {
            active: Cell::new(true),
            live: RefCell::new(BTreeMap::new()),
        }
    }

    fn sweep(&self) -> usize {
        self.active.set(false);
        // Move the entries out before releasing anything, vertices dropped by
        // the release must not find the map borrowed.
        let live = std::mem::take(&mut *self.live.borrow_mut());
        let count = live.len();
        for (_, vertex) in live.iter() {
            vertex.release();
        }
        let held: BTreeMap<_, _> = live.into_iter().filter(|(_, v)| v.is_held()).collect();
        log::debug!(
            "Released {} live vertices, {} still held",
            count,
            held.len()
        );
        *self.live.borrow_mut() = held;
        count
    }
}

impl Drop for VOwner {
    fn drop(&mut self) {
        self.sweep();
    }
}

pub(crate) fn next_label() -> u64 {
    NEXT_LABEL.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn register(label: u64, vertex: Box<dyn Release>) {
    // Registration fails silently only while the thread is shutting down.
    let _ = OWNER.try_with(|owner| {
        if owner.active.get() {
            owner.live.borrow_mut().insert(label, vertex);
        }
    });
}

pub(crate) fn deregister(label: u64) {
    let _ = OWNER.try_with(|owner| {
        if owner.active.get() {
            owner.live.borrow_mut().remove(&label);
        }
    });
}

/// Number of vertices currently alive on this thread.
pub fn live_vertex_count() -> usize {
    OWNER
        .try_with(|owner| owner.live.borrow().len())
        .unwrap_or(0)
}

/// Check if the vertex with the given label is alive.
pub fn is_live(label: u64) -> bool {
    OWNER
        .try_with(|owner| owner.live.borrow().contains_key(&label))
        .unwrap_or(false)
}

/// Labels of all vertices alive on this thread, in ascending order.
pub fn live_labels() -> Vec<u64> {
    OWNER
        .try_with(|owner| owner.live.borrow().keys().copied().collect())
        .unwrap_or_default()
}

/// Force the release of every live vertex on this thread.
///
/// Each vertex drops its neighbourhoods, its snapshot and its pending edge
/// synchronisations, which breaks all reference cycles. Handles still held by
/// the caller remain valid and point at isolated vertices, which stay tracked
/// so that a mesh rebuilt from them can be released again. Returns the number
/// of vertices released. The registry is active again once this returns.
pub fn release_all() -> usize {
    OWNER
        .try_with(|owner| {
            let count = owner.sweep();
            owner.active.set(true);
            count
        })
        .unwrap_or(0)
}
