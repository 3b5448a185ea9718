use std::{
    cell::{RefCell, RefMut},
    cmp::Ordering,
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    ops::{BitOr, BitXor},
    rc::{Rc, Weak},
};

use crate::{
    error::Error,
    neighbourhood::Neighbourhood,
    owner::{self, Release},
};

/// Which state of a vertex the next query reads.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// The live state.
    #[default]
    Current,
    /// The state captured by the last [`VPtr::synchronise`].
    Old,
}

type Nb<P, E> = Neighbourhood<VPtr<P, E>, E>;

pub(crate) struct VertexState<P, E> {
    view: View,
    position: P,
    old_position: P,
    neighbours: Nb<P, E>,
    old_neighbours: Nb<P, E>,
    // Vertices whose edge towards this vertex is mirrored onto this vertex's
    // edge towards them on the next edge query.
    synch_sources: Vec<(u64, Weak<Node<P, E>>)>,
    looping: View,
}

impl<P, E> VertexState<P, E> {
    fn nb(&self, view: View) -> &Nb<P, E> {
        match view {
            View::Current => &self.neighbours,
            View::Old => &self.old_neighbours,
        }
    }

    fn nb_mut(&mut self, view: View) -> &mut Nb<P, E> {
        match view {
            View::Current => &mut self.neighbours,
            View::Old => &mut self.old_neighbours,
        }
    }

    fn restore(&mut self) {
        self.view = View::Current;
    }
}

pub(crate) struct Node<P, E> {
    label: u64,
    state: RefCell<VertexState<P, E>>,
}

impl<P, E> Drop for Node<P, E> {
    fn drop(&mut self) {
        owner::deregister(self.label);
    }
}

impl<P, E> Release for Weak<Node<P, E>> {
    fn release(&self) {
        if let Some(node) = self.upgrade() {
            let (current, old, sources) = {
                let mut state = node.state.borrow_mut();
                (
                    state.neighbours.take_entries(),
                    state.old_neighbours.take_entries(),
                    std::mem::take(&mut state.synch_sources),
                )
            };
            // Dropped outside the borrow, other vertices may drop in turn.
            drop((current, old, sources));
        }
    }

    fn is_held(&self) -> bool {
        self.strong_count() > 0
    }
}

/**
 * Reference counted handle to a vertex of a vertex-vertex mesh.
 *
 * A vertex carries an opaque position payload `P` and an ordered
 * neighbourhood of `(neighbour, edge)` pairs with edge payload `E`. The order
 * of the neighbourhood is the cyclic order of the neighbours around the
 * vertex, counter clockwise by convention.
 *
 * Handles compare, order and hash by the label of the vertex, which is
 * unique for the lifetime of the process. A handle always points at a
 * vertex; the absence of a vertex is expressed with [`Option`].
 *
 * Each vertex also keeps an old state, captured by
 * [`synchronise`](Self::synchronise). [`get_old`](Self::get_old) makes the
 * next query read the old state instead of the live one. Every query resets
 * the vertex back to the live state when it returns, so one call to
 * `get_old` is good for exactly one query:
 *
 * ```rust
 * use vvlib::VPtr;
 *
 * let a = VPtr::<(), ()>::new(());
 * let b = VPtr::<(), ()>::new(());
 * a.synchronise();
 * a.splice_next(&a, b.clone());
 * assert_eq!(a.get_old().neighbour_count(), 0);
 * assert_eq!(a.neighbour_count(), 1);
 * ```
 */
pub struct VPtr<P, E> {
    node: Rc<Node<P, E>>,
}

impl<P, E> Clone for VPtr<P, E> {
    fn clone(&self) -> Self {
        VPtr {
            node: Rc::clone(&self.node),
        }
    }
}

impl<P, E> VPtr<P, E> {
    pub fn label(&self) -> u64 {
        self.node.label
    }

    pub(crate) fn node(&self) -> &Rc<Node<P, E>> {
        &self.node
    }

    fn state(&self) -> RefMut<'_, VertexState<P, E>> {
        self.node.state.borrow_mut()
    }

    /// Run `f` on the neighbourhood of the active view, then go back to the
    /// live state.
    fn read<R>(&self, f: impl FnOnce(&Nb<P, E>) -> R) -> R {
        let mut state = self.state();
        let out = f(state.nb(state.view));
        state.restore();
        out
    }

    /// Run `f` on the live neighbourhood. Any old view is ended first.
    fn write<R>(&self, f: impl FnOnce(&mut Nb<P, E>) -> R) -> R {
        let mut state = self.state();
        state.restore();
        f(&mut state.neighbours)
    }

    /// The view the next query will read.
    pub fn view(&self) -> View {
        self.state().view
    }

    pub fn is_old(&self) -> bool {
        self.view() == View::Old
    }

    /// End the old view, if one is active. Does nothing otherwise.
    pub fn restore(&self) {
        self.state().restore();
    }

    /// Make the next query on this vertex read the state captured by the last
    /// [`synchronise`](Self::synchronise).
    pub fn get_old(&self) -> &Self {
        self.state().view = View::Old;
        self
    }

    /// Number of neighbours in the active view.
    pub fn neighbour_count(&self) -> usize {
        self.read(|nb| nb.len())
    }

    /// Check if `v` is a neighbour in the active view.
    pub fn contains(&self, v: &Self) -> bool {
        self.read(|nb| nb.contains(v))
    }

    /// Neighbours in the active view, in cyclic order starting at the front.
    pub fn neighbours(&self) -> Vec<Self> {
        self.read(|nb| nb.neighbours().cloned().collect())
    }

    /// The neighbour following `v`, wrapping around at the end. `None` if `v`
    /// is not a neighbour.
    pub fn next(&self, v: &Self) -> Option<Self> {
        self.next_n(v, 1)
    }

    /// The neighbour preceding `v`, wrapping around at the front. `None` if
    /// `v` is not a neighbour.
    pub fn prev(&self, v: &Self) -> Option<Self> {
        self.prev_n(v, 1)
    }

    /// The neighbour `k` steps after `v`.
    pub fn next_n(&self, v: &Self, k: usize) -> Option<Self> {
        self.read(|nb| {
            nb.find(v)
                .and_then(|i| nb.get(nb.next_index(i, k)))
                .map(|(n, _)| n.clone())
        })
    }

    /// The neighbour `k` steps before `v`.
    pub fn prev_n(&self, v: &Self, k: usize) -> Option<Self> {
        self.read(|nb| {
            nb.find(v)
                .and_then(|i| nb.get(nb.prev_index(i, k)))
                .map(|(n, _)| n.clone())
        })
    }

    /// The neighbour following the flagged one.
    pub fn next_flagged(&self) -> Option<Self> {
        self.read(|nb| {
            nb.flag_index()
                .and_then(|i| nb.get(nb.next_index(i, 1)))
                .map(|(n, _)| n.clone())
        })
    }

    /// The neighbour preceding the flagged one.
    pub fn prev_flagged(&self) -> Option<Self> {
        self.read(|nb| {
            nb.flag_index()
                .and_then(|i| nb.get(nb.prev_index(i, 1)))
                .map(|(n, _)| n.clone())
        })
    }

    /// Any neighbour, `None` if the neighbourhood is empty.
    pub fn select(&self) -> Option<Self> {
        self.read(|nb| nb.front().cloned())
    }

    pub fn flagged(&self) -> Option<Self> {
        self.read(|nb| nb.flagged().cloned())
    }

    /// Move the flag to `target`. Returns false, leaving the flag untouched,
    /// if `target` is not a neighbour.
    pub fn flag(&self, target: &Self) -> bool {
        self.write(|nb| nb.flag(target))
    }

    pub fn unflag(&self) {
        self.write(|nb| nb.clear_flag())
    }

    /// Remove `target` from the neighbourhood. Returns false if it was not a
    /// neighbour.
    pub fn remove(&self, target: &Self) -> bool {
        let removed = self.write(|nb| nb.remove(target));
        removed.is_some()
    }

    /// Remove the flagged neighbour, if any, and return it.
    pub fn remove_flagged(&self) -> Option<Self> {
        let removed = self.write(|nb| nb.flag_index().map(|i| nb.remove_at(i)));
        removed.map(|(n, _)| n)
    }

    /// Put `v` in place of `target`, keeping the edge value. Returns false if
    /// `target` is not a neighbour.
    pub fn replace(&self, target: &Self, v: Self) -> bool {
        let replaced = self.write(|nb| nb.find(target).map(|i| nb.replace_at(i, v)));
        replaced.is_some()
    }

    pub fn replace_flagged(&self, v: Self) -> bool {
        let replaced = self.write(|nb| nb.flag_index().map(|i| nb.replace_at(i, v)));
        replaced.is_some()
    }

    pub fn for_each_neighbour(&self, mut f: impl FnMut(&Self, &Self)) {
        for n in self.neighbours() {
            f(self, &n);
        }
    }

    /// Visit every `(self, neighbour)` pair, and after each one, every pair
    /// `(neighbour, neighbour of neighbour)`.
    pub fn recurse_for_each_neighbour(&self, mut f: impl FnMut(&Self, &Self)) {
        for n in self.neighbours() {
            f(self, &n);
            for m in n.neighbours() {
                f(&n, &m);
            }
        }
    }

    /// Start an explicit loop over the neighbourhood of the active view.
    ///
    /// The loop stays on the view that was active here for all its steps,
    /// even though each step ends any old view for other queries. A loop
    /// started after [`get_old`](Self::get_old) walks the whole old
    /// neighbourhood; it does not fall back to the live one after its first
    /// step.
    pub fn loop_start(&self) {
        let mut state = self.state();
        state.looping = state.view;
        let looping = state.looping;
        state.nb_mut(looping).loop_start();
        state.restore();
    }

    pub fn loop_not_done(&self) -> bool {
        let mut state = self.state();
        state.restore();
        state.nb(state.looping).loop_not_done()
    }

    pub fn loop_next(&self) {
        let mut state = self.state();
        state.restore();
        let looping = state.looping;
        state.nb_mut(looping).loop_next();
    }

    /// The neighbour under the loop cursor.
    pub fn current(&self) -> Option<Self> {
        let mut state = self.state();
        state.restore();
        state.nb(state.looping).current().cloned()
    }

    /// Remove all neighbours, and forget the old state's neighbours too.
    pub fn nb_clear(&self) {
        let (current, old) = {
            let mut state = self.state();
            state.restore();
            (
                state.neighbours.take_entries(),
                state.old_neighbours.take_entries(),
            )
        };
        drop((current, old));
    }
}

impl<P, E> VPtr<P, E>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    /// Create a new vertex with an empty neighbourhood, and register it with
    /// the owner.
    pub fn new(position: P) -> Self {
        let label = owner::next_label();
        let node = Rc::new(Node {
            label,
            state: RefCell::new(VertexState {
                view: View::Current,
                old_position: position.clone(),
                position,
                neighbours: Neighbourhood::new(),
                old_neighbours: Neighbourhood::new(),
                synch_sources: Vec::new(),
                looping: View::Current,
            }),
        });
        owner::register(label, Box::new(Rc::downgrade(&node)));
        VPtr { node }
    }

    /// The live position. Reading the position always ends an old view.
    pub fn position(&self) -> P {
        let mut state = self.state();
        state.restore();
        state.position.clone()
    }

    pub fn set_position(&self, position: P) {
        let mut state = self.state();
        state.restore();
        state.position = position;
    }

    /// The position captured by the last [`synchronise`](Self::synchronise).
    pub fn old_position(&self) -> P {
        let mut state = self.state();
        state.restore();
        state.old_position.clone()
    }

    /// Edge value towards the neighbour `v`, in the active view.
    pub fn get_edge(&self, v: &Self) -> Result<E, Error> {
        let label = self.label();
        self.read(|nb| {
            nb.find(v)
                .and_then(|i| nb.edge(i))
                .cloned()
                .ok_or(Error::MissingEdge {
                    from: label,
                    to: v.label(),
                })
        })
    }

    /// Check if there is no edge towards `v` in the active view.
    pub fn is_null_edge(&self, v: &Self) -> bool {
        !self.contains(v)
    }

    /// Set the live edge value towards the neighbour `v`.
    pub fn set_edge(&self, v: &Self, e: E) -> Result<(), Error> {
        let label = self.label();
        self.write(|nb| match nb.find(v).and_then(|i| nb.edge_mut(i)) {
            Some(slot) => {
                *slot = e;
                Ok(())
            }
            None => Err(Error::MissingEdge {
                from: label,
                to: v.label(),
            }),
        })
    }

    /// Set the edge towards `v`, and have `v` mirror it back the next time its
    /// edges are queried.
    pub fn set_sym_edge(&self, v: &Self, e: E) -> Result<(), Error> {
        self.set_edge(v, e)?;
        v.add_synch_edge(self);
        Ok(())
    }

    /// Defer copying the edge `v -> self` onto the edge `self -> v` until the
    /// next [`synch_edges`](Self::synch_edges).
    pub fn add_synch_edge(&self, v: &Self) {
        let mut state = self.state();
        if !state.synch_sources.iter().any(|(l, _)| *l == v.label()) {
            state
                .synch_sources
                .push((v.label(), Rc::downgrade(&v.node)));
        }
    }

    /// Perform all deferred edge copies.
    ///
    /// Sources that no longer exist, or relations missing on either side, are
    /// skipped.
    pub fn synch_edges(&self) {
        let sources = std::mem::take(&mut self.state().synch_sources);
        for (label, source) in sources {
            let Some(node) = source.upgrade() else {
                log::trace!("Skipping edge sync from dropped vertex {}", label);
                continue;
            };
            let source = VPtr { node };
            let value = {
                let state = source.state();
                state
                    .neighbours
                    .find(self)
                    .and_then(|i| state.neighbours.edge(i).cloned())
            };
            match value {
                Some(e) => {
                    if self.set_edge(&source, e).is_err() {
                        log::trace!("Vertex {} lost its edge to {}", self.label(), label);
                    }
                }
                None => log::trace!("Vertex {} has no edge to {}", label, self.label()),
            }
        }
    }

    /// Asymmetric edge access: synchronise pending edges, then read the live
    /// edge towards `v`.
    pub fn edge_to(&self, v: &Self) -> Result<E, Error> {
        self.synch_edges();
        self.restore();
        self.get_edge(v)
    }

    /// Symmetric edge access: like [`edge_to`](Self::edge_to), and also have
    /// `v` mirror this edge back the next time its edges are queried.
    pub fn sym_edge_to(&self, v: &Self) -> Result<E, Error> {
        self.synch_edges();
        v.add_synch_edge(self);
        self.restore();
        self.get_edge(v)
    }

    /// Insert `v` right after `target`, or at the end if `target` is not a
    /// neighbour. The new edge has the default value.
    pub fn splice_next(&self, target: &Self, v: Self) {
        self.write(|nb| nb.splice_next(target, v, E::default()))
    }

    /// Insert `v` right before `target`, or at the end if `target` is not a
    /// neighbour. The new edge has the default value.
    pub fn splice_prev(&self, target: &Self, v: Self) {
        self.write(|nb| nb.splice_prev(target, v, E::default()))
    }

    pub fn splice_next_flagged(&self, v: Self) {
        self.write(|nb| match nb.flag_index() {
            Some(i) => nb.insert_at(i + 1, v, E::default()),
            None => nb.push(v, E::default()),
        })
    }

    pub fn splice_prev_flagged(&self, v: Self) {
        self.write(|nb| match nb.flag_index() {
            Some(i) => nb.insert_at(i, v, E::default()),
            None => nb.push(v, E::default()),
        })
    }

    /// Replace the live neighbourhood with `neighbours`, in that order, with
    /// default edge values.
    pub fn nb_assign(&self, neighbours: impl IntoIterator<Item = Self>) {
        let entries: Vec<_> = neighbours.into_iter().map(|n| (n, E::default())).collect();
        let dropped = self.write(|nb| {
            let dropped = nb.take_entries();
            nb.assign(entries);
            dropped
        });
        drop(dropped);
    }

    /// Capture the live neighbourhood, position and flag as the old state.
    pub fn synchronise(&self) {
        let dropped = {
            let mut state = self.state();
            state.restore();
            state.old_position = state.position.clone();
            let snapshot = state.neighbours.clone();
            std::mem::replace(&mut state.old_neighbours, snapshot)
        };
        drop(dropped);
    }

    /// New vertex with the same position and a copy of the live
    /// neighbourhood. The neighbours themselves are shared, not copied, and
    /// they do not learn about the clone.
    pub fn clone_vertex(&self) -> Self {
        let (position, neighbours) = {
            let mut state = self.state();
            state.restore();
            (state.position.clone(), state.neighbours.clone())
        };
        let v = Self::new(position);
        v.state().neighbours = neighbours;
        v
    }
}

impl<P, E> PartialEq for VPtr<P, E> {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl<P, E> Eq for VPtr<P, E> {}

impl<P, E> PartialOrd for VPtr<P, E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P, E> Ord for VPtr<P, E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label().cmp(&other.label())
    }
}

impl<P, E> Hash for VPtr<P, E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label().hash(state);
    }
}

impl<P, E> Display for VPtr<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V({})", self.label())
    }
}

impl<P, E> Debug for VPtr<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V({})", self.label())
    }
}

/// `&a ^ &b` is [`VPtr::edge_to`].
impl<P, E> BitXor<&VPtr<P, E>> for &VPtr<P, E>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    type Output = Result<E, Error>;

    fn bitxor(self, rhs: &VPtr<P, E>) -> Self::Output {
        self.edge_to(rhs)
    }
}

/// `&a | &b` is [`VPtr::sym_edge_to`].
impl<P, E> BitOr<&VPtr<P, E>> for &VPtr<P, E>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    type Output = Result<E, Error>;

    fn bitor(self, rhs: &VPtr<P, E>) -> Self::Output {
        self.sym_edge_to(rhs)
    }
}
