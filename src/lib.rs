/*!
Vertex-vertex mesh algebra with bistellar editing operations.

# Overview

+ A mesh is made of vertices, each holding a position payload and an ordered
  neighbourhood of `(neighbour, edge)` pairs. The order of the neighbourhood
  is the counter clockwise order of the neighbours around the vertex. There
  are no explicit edge or face elements: faces are walked from the
  neighbourhoods, see [`FaceWalk`].

+ Vertices are handled through the reference counted [`VPtr<P, E>`], generic
  over the position type `P` and the edge payload type `E`. The algebra never
  looks inside either.

+ Vertices reference each other, so a mesh is full of reference cycles. Every
  vertex is tracked by a thread local registry, and [`release_all`] releases
  all of them at once. Dropping the last handle of a vertex that is not part
  of a cycle frees it right away.

+ Each vertex keeps an old copy of its state, taken with
  [`VPtr::synchronise`]. Algorithms that rewrite the mesh in passes read the
  old state with [`VPtr::get_old`] while editing the live one.

+ The [`bistellar`] module implements the moves Remove, Flip, Centroid and
  EdgeSplit, each with compile time switches for reading old state and for
  checking preconditions.

+ With the `use_glam` feature, the [`vv_glam`] module provides vertex types
  with [`glam`](https://crates.io/crates/glam) positions, and moves that
  place new vertices from the positions of their neighbours.

```rust
use vvlib::{VPtr, bistellar};

// A triangle, neighbourhoods counter clockwise.
let [a, b, c] = [(0., 0.), (1., 0.), (0., 1.)].map(VPtr::<(f32, f32), ()>::new);
a.nb_assign([b.clone(), c.clone()]);
b.nb_assign([c.clone(), a.clone()]);
c.nb_assign([a.clone(), b.clone()]);
let center = bistellar::centroid(&a, &b, (0.3, 0.3))
    .expect("Cannot insert centroid")
    .expect("Not a mutual edge");
assert_eq!(center.neighbours(), vec![a.clone(), b.clone(), c.clone()]);
assert_eq!(a.next(&b), Some(center));
```
*/

pub mod bistellar;
mod check;
mod error;
mod neighbourhood;
mod owner;
mod path;
mod vertex;

#[cfg(feature = "use_glam")]
pub mod vv_glam;

pub use check::{check_mutual_adjacency, check_no_duplicates, check_topology};
pub use error::Error;
pub use owner::{is_live, live_labels, live_vertex_count, release_all};
pub use path::{FaceWalk, face_vertices};
pub use vertex::{VPtr, View};
