/*!
Vertex types with [`glam`] positions, and moves that place the new vertex
from the positions of its neighbours.
*/

use crate::{
    bistellar::{centroid_generic, edge_split_generic},
    error::Error,
    vertex::VPtr,
};

/// Vertex with a 3D single precision position.
pub type Vec3Vertex<E = ()> = VPtr<glam::Vec3, E>;

/// Vertex with a 3D double precision position.
pub type DVec3Vertex<E = ()> = VPtr<glam::DVec3, E>;

/// Vertex with a 2D single precision position.
pub type Vec2Vertex<E = ()> = VPtr<glam::Vec2, E>;

/// Vertex with a 2D double precision position.
pub type DVec2Vertex<E = ()> = VPtr<glam::DVec2, E>;

/// Positions that can be averaged.
pub trait Centroid: Copy + 'static {
    fn centroid(points: &[Self]) -> Self;
}

macro_rules! impl_centroid {
    ($vec:ty, $scalar:ty) => {
        impl Centroid for $vec {
            fn centroid(points: &[Self]) -> Self {
                if points.is_empty() {
                    return <$vec>::ZERO;
                }
                points.iter().copied().sum::<$vec>() / (points.len() as $scalar)
            }
        }
    };
}

impl_centroid!(glam::Vec2, f32);
impl_centroid!(glam::DVec2, f64);
impl_centroid!(glam::Vec3, f32);
impl_centroid!(glam::DVec3, f64);

/// Split the edge `a - b` with a new vertex at its midpoint.
pub fn split_edge_at_midpoint<P, E>(a: &VPtr<P, E>, b: &VPtr<P, E>) -> Result<VPtr<P, E>, Error>
where
    P: Centroid,
    E: Clone + Default + 'static,
{
    let mid = P::centroid(&[a.position(), b.position()]);
    edge_split_generic::<false, true, P, E>(a, b, mid)
}

/// Star the polygon to the left of `a -> b` with a new vertex at the average
/// of the boundary positions. `Ok(None)` if `a` and `b` are not mutual
/// neighbours.
pub fn insert_face_centroid<P, E>(
    a: &VPtr<P, E>,
    b: &VPtr<P, E>,
) -> Result<Option<VPtr<P, E>>, Error>
where
    P: Centroid,
    E: Clone + Default + 'static,
{
    centroid_generic::<false, true, P, E>(a, b, |boundary| {
        let points: Vec<P> = boundary.iter().map(|v| v.position()).collect();
        P::centroid(&points)
    })
}
