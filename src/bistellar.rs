/*!
Bistellar moves on vertex-vertex meshes (Lickorish 1999).

Every move comes as a generic function with two compile time switches:

+ `USE_OLD`: read the neighbours of the input vertices from their old state,
  captured by [`VPtr::synchronise`], rather than the live state. Edits always
  apply to the live state.

+ `CHECKS`: validate the preconditions of the move. Without checks, a
  violated precondition either surfaces as an error from a failed lookup, or
  leaves the neighbourhoods in an unspecified state.

The plain wrappers (`flip`, `edge_split`, ...) read the live state with
checks on, the `_unchecked` wrappers skip the checks, and the `_old` wrappers
read the old state with checks on.

None of the moves verify global consistency of the mesh, such as planarity or
manifoldness. Neighbourhoods are assumed to be ordered counter clockwise.
*/

use crate::{error::Error, path::face_vertices, vertex::VPtr};

fn peek<P, E>(v: &VPtr<P, E>, use_old: bool) -> &VPtr<P, E> {
    if use_old { v.get_old() } else { v }
}

fn mutual<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>) -> bool {
    a.contains(b) && b.contains(a)
}

/// Detach `v` from all its live neighbours, in both directions.
///
/// There is no old state variant: the move empties the live neighbourhood, so
/// it always reads the live one. A pending old view on `v` is ended first.
pub fn remove_generic<const CHECKS: bool, P, E>(v: &VPtr<P, E>) -> Result<(), Error> {
    v.restore();
    while v.neighbour_count() > 0 {
        let Some(x) = v.select() else {
            if CHECKS {
                return Err(Error::EmptyNeighbourhood(v.label()));
            }
            break;
        };
        x.remove(v);
        v.remove(&x);
    }
    Ok(())
}

pub fn remove<P, E>(v: &VPtr<P, E>) -> Result<(), Error> {
    remove_generic::<true, P, E>(v)
}

pub fn remove_unchecked<P, E>(v: &VPtr<P, E>) -> Result<(), Error> {
    remove_generic::<false, P, E>(v)
}

/**
 * Flip the edge `a - b`.
 *
 * With `x` and `y` the neighbours of `a` after and before `b`, the edge
 * `a - b` is replaced by the edge `x - y`:
 * ```text
 *        x                x
 *       / \              /|\
 *      /   \            / | \
 *     b-----a    =>    b  |  a
 *      \   /            \ | /
 *       \ /              \|/
 *        y                y
 * ```
 * `y` is inserted after `a` around `x`, and `x` before `a` around `y`.
 *
 * With checks, a relation that only exists in one direction is refused with
 * a warning and `Ok(false)`, without touching the mesh. Vertices that are not
 * related at all are an error. Returns `Ok(true)` when the edge was flipped.
 */
pub fn flip_generic<const USE_OLD: bool, const CHECKS: bool, P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
) -> Result<bool, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    if CHECKS {
        match (a.contains(b), b.contains(a)) {
            (true, true) => {}
            (false, false) => return Err(Error::NotNeighbours(a.label(), b.label())),
            _ => {
                log::warn!("Refusing to flip the one way relation between {} and {}", a, b);
                return Ok(false);
            }
        }
    }
    let x = peek(a, USE_OLD).next(b);
    let y = peek(a, USE_OLD).prev(b);
    let (Some(x), Some(y)) = (x, y) else {
        return Err(Error::NotNeighbours(a.label(), b.label()));
    };
    a.remove(b);
    b.remove(a);
    x.splice_next(a, y.clone());
    y.splice_prev(a, x);
    Ok(true)
}

pub fn flip<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>) -> Result<bool, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    flip_generic::<false, true, P, E>(a, b)
}

pub fn flip_unchecked<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>) -> Result<bool, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    flip_generic::<false, false, P, E>(a, b)
}

pub fn flip_old<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>) -> Result<bool, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    flip_generic::<true, true, P, E>(a, b)
}

/**
 * Insert a new vertex inside the polygon to the left of the directed edge
 * `a -> b`, and connect it to every boundary vertex of the polygon.
 *
 * `position` receives the boundary vertices, in counter clockwise order
 * starting with `a`, and returns the position of the new vertex. Around each
 * boundary vertex, the new vertex is inserted between its two neighbours on
 * the boundary. The neighbourhood of the new vertex is the boundary.
 *
 * With checks, `a` and `b` not being mutual neighbours is logged and `Ok(None)`
 * is returned without touching the mesh. A boundary that cannot be walked is
 * an error.
 */
pub fn centroid_generic<const USE_OLD: bool, const CHECKS: bool, P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
    position: impl FnOnce(&[VPtr<P, E>]) -> P,
) -> Result<Option<VPtr<P, E>>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    if CHECKS && !mutual(a, b) {
        log::warn!("Cannot insert a centroid, {} and {} are not mutual neighbours", a, b);
        return Ok(None);
    }
    let boundary = face_vertices(a, b, USE_OLD)?;
    let c = VPtr::new(position(&boundary));
    let n = boundary.len();
    for (i, v) in boundary.iter().enumerate() {
        // The boundary continues just before the vertex it came from.
        v.splice_prev(&boundary[(i + n - 1) % n], c.clone());
    }
    c.nb_assign(boundary);
    Ok(Some(c))
}

pub fn centroid<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>, pos: P) -> Result<Option<VPtr<P, E>>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    centroid_generic::<false, true, P, E>(a, b, |_| pos)
}

pub fn centroid_unchecked<P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
    pos: P,
) -> Result<Option<VPtr<P, E>>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    centroid_generic::<false, false, P, E>(a, b, |_| pos)
}

pub fn centroid_old<P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
    pos: P,
) -> Result<Option<VPtr<P, E>>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    centroid_generic::<true, true, P, E>(a, b, |_| pos)
}

/**
 * Split the edge `a - b` with a new vertex at `position`.
 *
 * With `x` and `y` the neighbours of `a` after and before `b`, the new vertex
 * `m` takes the place of `b` around `a` and of `a` around `b`, keeping the
 * edge values. `m` is inserted after `a` around `x` and before `a` around
 * `y`, and its own neighbourhood is `[a, y, b, x]`:
 * ```text
 *        x                x
 *       / \              /|\
 *      /   \            / | \
 *     b-----a    =>    b--m--a
 *      \   /            \ | /
 *       \ /              \|/
 *        y                y
 * ```
 * With checks, `a` and `b` not being mutual neighbours is an error.
 */
pub fn edge_split_generic<const USE_OLD: bool, const CHECKS: bool, P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
    position: P,
) -> Result<VPtr<P, E>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    if CHECKS && !mutual(a, b) {
        return Err(Error::NotNeighbours(a.label(), b.label()));
    }
    let x = peek(a, USE_OLD).next(b);
    let y = peek(a, USE_OLD).prev(b);
    let (Some(x), Some(y)) = (x, y) else {
        return Err(Error::NotNeighbours(a.label(), b.label()));
    };
    let m = VPtr::new(position);
    a.replace(b, m.clone());
    b.replace(a, m.clone());
    x.splice_next(a, m.clone());
    y.splice_prev(a, m.clone());
    m.nb_assign([a.clone(), y, b.clone(), x]);
    Ok(m)
}

pub fn edge_split<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>, pos: P) -> Result<VPtr<P, E>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    edge_split_generic::<false, true, P, E>(a, b, pos)
}

pub fn edge_split_unchecked<P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
    pos: P,
) -> Result<VPtr<P, E>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    edge_split_generic::<false, false, P, E>(a, b, pos)
}

pub fn edge_split_old<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>, pos: P) -> Result<VPtr<P, E>, Error>
where
    P: Clone + 'static,
    E: Clone + Default + 'static,
{
    edge_split_generic::<true, true, P, E>(a, b, pos)
}

#[cfg(test)]
mod test {
    use super::{
        centroid, centroid_generic, centroid_old, edge_split, edge_split_old, flip, flip_old,
        flip_unchecked, remove,
    };
    use crate::{
        error::Error,
        owner,
        path::test::{V, split_square},
        vertex::VPtr,
    };
    use proptest::prelude::*;

    fn labels(vs: &[V]) -> Vec<u64> {
        vs.iter().map(|v| v.label()).collect()
    }

    fn nb(v: &V) -> Vec<u64> {
        labels(&v.neighbours())
    }

    /**
     * Triangulated wheel with `n` rim vertices around a hub. All
     * neighbourhoods are counter clockwise. Rim vertex `i` has the
     * neighbourhood `[i + 1, hub, i - 1]`.
     */
    fn wheel(n: usize) -> (V, Vec<V>) {
        let hub = V::new((0, 0));
        let rim: Vec<V> = (0..n as i32).map(|i| V::new((i, 1))).collect();
        hub.nb_assign(rim.iter().cloned());
        for (i, r) in rim.iter().enumerate() {
            r.nb_assign([rim[(i + 1) % n].clone(), hub.clone(), rim[(i + n - 1) % n].clone()]);
        }
        (hub, rim)
    }

    #[test]
    fn t_remove_hub() {
        let (hub, rim) = wheel(5);
        remove(&hub).expect("Cannot remove vertex");
        assert_eq!(hub.neighbour_count(), 0);
        assert!(rim.iter().all(|r| !r.contains(&hub) && r.neighbour_count() == 2));
    }

    #[test]
    fn t_remove_one_way_relations() {
        let (hub, rim) = wheel(4);
        rim[0].remove(&hub);
        let stranger = V::new((9, 9));
        hub.splice_next(&rim[3], stranger.clone());
        remove(&hub).expect("Cannot remove vertex");
        assert_eq!(hub.neighbour_count(), 0);
        assert_eq!(stranger.neighbour_count(), 0);
        assert!(rim.iter().all(|r| !r.contains(&hub)));
    }

    #[test]
    fn t_remove_with_pending_old_view() {
        let v = V::new((0, 0));
        v.synchronise();
        let x = V::new((1, 0));
        v.nb_assign([x.clone()]);
        x.nb_assign([v.clone()]);
        v.get_old();
        remove(&v).expect("Cannot remove vertex");
        assert_eq!(v.neighbour_count(), 0);
        assert!(!x.contains(&v));
        // The old state is untouched.
        assert_eq!(v.get_old().neighbour_count(), 0);
    }

    /// Quadrilateral `A C B D` with the diagonal `A - B`.
    fn kite() -> [V; 4] {
        let [a, b, c, d] = [(0, 0), (1, 1), (1, 0), (0, 1)].map(V::new);
        a.nb_assign([d.clone(), b.clone(), c.clone()]);
        b.nb_assign([c.clone(), a.clone(), d.clone()]);
        c.nb_assign([a.clone(), b.clone()]);
        d.nb_assign([b.clone(), a.clone()]);
        [a, b, c, d]
    }

    #[test]
    fn t_flip_kite() {
        let [a, b, c, d] = kite();
        assert_eq!(a.next(&b), Some(c.clone()));
        assert_eq!(a.prev(&b), Some(d.clone()));
        assert_eq!(flip(&a, &b), Ok(true));
        assert_eq!(nb(&a), labels(&[d.clone(), c.clone()]));
        assert_eq!(nb(&b), labels(&[c.clone(), d.clone()]));
        assert_eq!(nb(&c), labels(&[a.clone(), d.clone(), b.clone()]));
        assert_eq!(nb(&d), labels(&[b.clone(), c.clone(), a.clone()]));
    }

    #[test]
    fn t_flip_one_way_is_refused() {
        let [a, b, c, d] = kite();
        b.remove(&a);
        let before: Vec<_> = [&a, &b, &c, &d].iter().map(|v| nb(v)).collect();
        assert_eq!(flip(&a, &b), Ok(false));
        let after: Vec<_> = [&a, &b, &c, &d].iter().map(|v| nb(v)).collect();
        assert_eq!(before, after);
        a.remove(&b);
        assert_eq!(flip(&a, &b), Err(Error::NotNeighbours(a.label(), b.label())));
    }

    #[test]
    fn t_flip_unchecked_one_way() {
        let [a, b, c, d] = kite();
        b.remove(&a);
        assert_eq!(flip_unchecked(&a, &b), Ok(true));
        assert!(!a.contains(&b));
        assert!(c.contains(&d) && d.contains(&c));
    }

    #[test]
    fn t_flip_reads_old_state() {
        let [a, b, c, d] = kite();
        a.synchronise();
        a.nb_assign([c.clone(), b.clone(), d.clone()]);
        assert_eq!(flip_old(&a, &b), Ok(true));
        // The old order put `c` after `b`.
        assert_eq!(nb(&c), labels(&[a.clone(), d.clone(), b.clone()]));
        assert_eq!(nb(&d), labels(&[b.clone(), c.clone(), a.clone()]));
        assert_eq!(nb(&a), labels(&[c.clone(), d.clone()]));
    }

    #[test]
    fn t_centroid_triangle() {
        let v = split_square();
        let c = centroid(&v[0], &v[1], (1, 1))
            .expect("Cannot insert centroid")
            .expect("Centroid refused");
        assert_eq!(c.position(), (1, 1));
        assert_eq!(nb(&c), labels(&v[0..3]));
        assert_eq!(nb(&v[0]), labels(&[v[1].clone(), c.clone(), v[2].clone(), v[3].clone()]));
        assert_eq!(nb(&v[1]), labels(&[v[2].clone(), c.clone(), v[0].clone()]));
        assert_eq!(
            nb(&v[2]),
            labels(&[v[3].clone(), v[0].clone(), c.clone(), v[1].clone()])
        );
        assert_eq!(nb(&v[3]), labels(&[v[0].clone(), v[2].clone()]));
    }

    #[test]
    fn t_centroid_outer_quad() {
        let v = split_square();
        let c = centroid(&v[1], &v[0], (0, 0))
            .expect("Cannot insert centroid")
            .expect("Centroid refused");
        assert_eq!(
            nb(&c),
            labels(&[v[1].clone(), v[0].clone(), v[3].clone(), v[2].clone()])
        );
        for v in v.iter() {
            assert!(v.contains(&c));
        }
    }

    #[test]
    fn t_centroid_position_from_boundary() {
        let v = split_square();
        let c = centroid_generic::<false, true, _, _>(&v[0], &v[2], |vs| {
            let n = vs.len() as i32;
            let (x, y) = vs.iter().fold((0, 0), |(x, y), v| {
                let (px, py) = v.position();
                (x + px, y + py)
            });
            (3 * x / n, 3 * y / n)
        })
        .expect("Cannot insert centroid")
        .expect("Centroid refused");
        assert_eq!(c.position(), (1, 2));
    }

    #[test]
    fn t_centroid_not_neighbours() {
        let v = split_square();
        let count = owner::live_vertex_count();
        assert_eq!(centroid(&v[1], &v[3], (0, 0)), Ok(None));
        v[1].remove(&v[0]);
        assert_eq!(centroid(&v[0], &v[1], (0, 0)), Ok(None));
        assert_eq!(owner::live_vertex_count(), count);
    }

    #[test]
    fn t_centroid_old_state() {
        let v = split_square();
        for x in v.iter() {
            x.synchronise();
        }
        v[0].remove(&v[2]);
        v[2].remove(&v[0]);
        // The diagonal is still there in the old state.
        let c = centroid_old(&v[0], &v[1], (0, 0))
            .expect("Cannot insert centroid")
            .expect("Centroid refused");
        assert_eq!(c.neighbour_count(), 3);
    }

    #[test]
    fn t_edge_split_diagonal() {
        let v = split_square();
        let m = edge_split(&v[0], &v[2], (1, 1)).expect("Cannot split edge");
        assert_eq!(nb(&m), labels(&v));
        assert_eq!(nb(&v[0]), labels(&[v[1].clone(), m.clone(), v[3].clone()]));
        assert_eq!(nb(&v[2]), labels(&[v[3].clone(), m.clone(), v[1].clone()]));
        assert_eq!(nb(&v[3]), labels(&[v[0].clone(), m.clone(), v[2].clone()]));
        assert_eq!(nb(&v[1]), labels(&[v[2].clone(), m.clone(), v[0].clone()]));
    }

    #[test]
    fn t_edge_split_keeps_edges() {
        // Same layout as the split square, with edge values.
        let [a, x, b, y] = [(); 4].map(VPtr::<(), u32>::new);
        a.nb_assign([x.clone(), b.clone(), y.clone()]);
        x.nb_assign([b.clone(), a.clone()]);
        b.nb_assign([y.clone(), a.clone(), x.clone()]);
        y.nb_assign([a.clone(), b.clone()]);
        a.set_edge(&b, 5).expect("Cannot set edge");
        b.set_edge(&a, 6).expect("Cannot set edge");
        let m = edge_split(&a, &b, ()).expect("Cannot split edge");
        assert_eq!(a.get_edge(&m), Ok(5));
        assert_eq!(b.get_edge(&m), Ok(6));
        assert_eq!(m.get_edge(&a), Ok(0));
        assert_eq!(x.get_edge(&m), Ok(0));
        assert!(a.is_null_edge(&b));
    }

    #[test]
    fn t_edge_split_not_neighbours() {
        let v = split_square();
        assert_eq!(
            edge_split(&v[1], &v[3], (0, 0)).err(),
            Some(Error::NotNeighbours(v[1].label(), v[3].label()))
        );
        v[2].remove(&v[0]);
        assert!(edge_split(&v[0], &v[2], (0, 0)).is_err());
    }

    #[test]
    fn t_edge_split_old_state() {
        let v = split_square();
        v[0].synchronise();
        v[0].nb_assign([v[3].clone(), v[2].clone(), v[1].clone()]);
        let m = edge_split_old(&v[0], &v[2], (1, 1)).expect("Cannot split edge");
        assert_eq!(nb(&m), labels(&v));
    }

    proptest! {
        #[test]
        fn p_remove_detaches(n in 3usize..12) {
            let (hub, rim) = wheel(n);
            remove(&hub).expect("Cannot remove vertex");
            prop_assert_eq!(hub.neighbour_count(), 0);
            for r in rim.iter() {
                prop_assert!(!r.contains(&hub));
            }
        }

        #[test]
        fn p_flip_rotates_diagonal(n in 4usize..12, k in 0usize..12) {
            let k = k % n;
            let (hub, rim) = wheel(n);
            let x = rim[(k + 1) % n].clone();
            let y = rim[(k + n - 1) % n].clone();
            prop_assert_eq!(flip(&hub, &rim[k]), Ok(true));
            prop_assert!(!hub.contains(&rim[k]));
            prop_assert!(!rim[k].contains(&hub));
            prop_assert_eq!(x.next(&hub), Some(y.clone()));
            prop_assert_eq!(y.prev(&hub), Some(x.clone()));
        }

        #[test]
        fn p_centroid_stars_face(n in 3usize..12, k in 0usize..12) {
            let k = k % n;
            let (hub, rim) = wheel(n);
            let c = centroid(&hub, &rim[k], (0, 0))
                .expect("Cannot insert centroid")
                .expect("Centroid refused");
            let boundary = [hub.clone(), rim[k].clone(), rim[(k + 1) % n].clone()];
            prop_assert_eq!(c.neighbour_count(), 3);
            prop_assert_eq!(nb(&c), labels(&boundary));
            for i in 0..3 {
                let v = &boundary[i];
                prop_assert_eq!(v.next(&c), Some(boundary[(i + 2) % 3].clone()));
                prop_assert_eq!(v.prev(&c), Some(boundary[(i + 1) % 3].clone()));
            }
        }

        #[test]
        fn p_centroid_stars_outer_polygon(n in 3usize..12, k in 0usize..12) {
            let k = k % n;
            let (hub, rim) = wheel(n);
            // The outer face runs clockwise around the rim.
            let boundary: Vec<V> = (0..n).map(|i| rim[(k + 1 + n - i) % n].clone()).collect();
            let c = centroid(&boundary[0], &boundary[1], (0, 0))
                .expect("Cannot insert centroid")
                .expect("Centroid refused");
            prop_assert_eq!(c.neighbour_count(), n);
            prop_assert_eq!(nb(&c), labels(&boundary));
            for (i, v) in boundary.iter().enumerate() {
                prop_assert_eq!(v.next(&c), Some(boundary[(i + n - 1) % n].clone()));
                prop_assert_eq!(v.prev(&c), Some(boundary[(i + 1) % n].clone()));
                prop_assert!(v.contains(&hub));
            }
            prop_assert!(!hub.contains(&c));
        }

        #[test]
        fn p_edge_split_inserts_midpoint(n in 3usize..12, k in 0usize..12) {
            let k = k % n;
            let (hub, rim) = wheel(n);
            let m = edge_split(&hub, &rim[k], (0, 0)).expect("Cannot split edge");
            let x = rim[(k + 1) % n].clone();
            let y = rim[(k + n - 1) % n].clone();
            prop_assert_eq!(m.neighbour_count(), 4);
            prop_assert_eq!(nb(&m), labels(&[hub.clone(), y, rim[k].clone(), x]));
            prop_assert!(!hub.contains(&rim[k]));
            prop_assert!(!rim[k].contains(&hub));
            prop_assert!(hub.contains(&m) && rim[k].contains(&m));
        }

        #[test]
        fn p_synchronise_round_trip(n in 3usize..12, f in 0usize..12) {
            let (hub, rim) = wheel(n);
            hub.flag(&rim[f % n]);
            let before = nb(&hub);
            hub.synchronise();
            hub.get_old();
            hub.restore();
            prop_assert_eq!(nb(&hub), before);
            prop_assert_eq!(hub.flagged(), Some(rim[f % n].clone()));
            prop_assert_eq!(hub.position(), (0, 0));
        }

        #[test]
        fn p_handles_release_once(count in 1usize..32) {
            let v = V::new((0, 0));
            let label = v.label();
            let handles: Vec<_> = (0..count).map(|_| v.clone()).collect();
            drop(v);
            prop_assert!(owner::is_live(label));
            drop(handles);
            prop_assert!(!owner::is_live(label));
        }
    }
}
