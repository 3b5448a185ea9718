use crate::{error::Error, vertex::VPtr};

/// Check that every relation between the given vertices is mirrored: if `v`
/// lists `n`, then `n` lists `v`. Returns the first relation that is not.
pub fn check_mutual_adjacency<P, E>(vertices: &[VPtr<P, E>]) -> Result<(), Error> {
    for v in vertices {
        for n in v.neighbours() {
            if !n.contains(v) {
                return Err(Error::NotNeighbours(v.label(), n.label()));
            }
        }
    }
    Ok(())
}

/// Check that no neighbourhood lists the same vertex twice.
pub fn check_no_duplicates<P, E>(vertices: &[VPtr<P, E>]) -> Result<(), Error> {
    let mut seen = Vec::new();
    for v in vertices {
        seen.clear();
        seen.extend(v.neighbours().iter().map(|n| n.label()));
        seen.sort_unstable();
        if let Some(w) = seen.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::DuplicateNeighbour {
                vertex: v.label(),
                neighbour: w[0],
            });
        }
    }
    Ok(())
}

/// Run all checks.
pub fn check_topology<P, E>(vertices: &[VPtr<P, E>]) -> Result<(), Error> {
    check_mutual_adjacency(vertices)?;
    check_no_duplicates(vertices)
}
