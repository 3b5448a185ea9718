use crate::{error::Error, vertex::VPtr};

/**
 * Walks the boundary of the polygon to the left of a directed edge.
 *
 * Neighbourhoods are ordered counter clockwise, so the vertex after `q` when
 * coming from `p` is the neighbour of `q` just before `p`. The walk keeps two
 * cursors on consecutive boundary vertices, steps the leading one, and swaps
 * their roles, until it arrives back at the starting vertex. Each boundary
 * vertex of a simple polygon is produced exactly once, starting with the two
 * vertices of the edge.
 *
 * With `use_old`, every step reads the old state of the leading vertex.
 *
 * A malformed mesh whose boundary never returns to the start makes the walk
 * run forever.
 */
pub struct FaceWalk<P, E> {
    start: VPtr<P, E>,
    from: VPtr<P, E>,
    at: VPtr<P, E>,
    use_old: bool,
    emitted: usize,
    done: bool,
}

impl<P, E> FaceWalk<P, E> {
    pub fn new(a: &VPtr<P, E>, b: &VPtr<P, E>, use_old: bool) -> Self {
        FaceWalk {
            start: a.clone(),
            from: a.clone(),
            at: b.clone(),
            use_old,
            emitted: 0,
            done: false,
        }
    }
}

impl<P, E> Iterator for FaceWalk<P, E> {
    type Item = Result<VPtr<P, E>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.emitted {
            0 => {
                self.emitted += 1;
                return Some(Ok(self.start.clone()));
            }
            1 => {
                self.emitted += 1;
                if self.at == self.start {
                    self.done = true;
                    return None;
                }
                return Some(Ok(self.at.clone()));
            }
            _ => {}
        }
        if self.use_old {
            self.at.get_old();
        }
        let Some(next) = self.at.prev(&self.from) else {
            self.done = true;
            return Some(Err(Error::BrokenBoundary {
                at: self.at.label(),
                from: self.from.label(),
            }));
        };
        if next == self.start {
            self.done = true;
            return None;
        }
        self.from = std::mem::replace(&mut self.at, next.clone());
        self.emitted += 1;
        Some(Ok(next))
    }
}

/// Vertices of the polygon to the left of the directed edge `a -> b`, in
/// counter clockwise order starting with `a`.
pub fn face_vertices<P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
    use_old: bool,
) -> Result<Vec<VPtr<P, E>>, Error> {
    FaceWalk::new(a, b, use_old).collect()
}
