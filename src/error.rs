use thiserror::Error;

/// Errors raised by the vertex algebra and the bistellar operators.
///
/// Vertices are identified by their labels in every variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An edge value was requested for a relation that does not exist.
    #[error("vertex {from} has no edge towards vertex {to}")]
    MissingEdge { from: u64, to: u64 },
    /// The two vertices were required to be mutual neighbours.
    #[error("vertices {0} and {1} are not mutual neighbours")]
    NotNeighbours(u64, u64),
    /// A neighbourhood expected to be non-empty had nothing to select.
    #[error("vertex {0} has an empty neighbourhood")]
    EmptyNeighbourhood(u64),
    /// The boundary walk could not continue from `at`, because `from` is not
    /// in its neighbourhood.
    #[error("boundary walk broken at vertex {at}: vertex {from} is not a neighbour")]
    BrokenBoundary { at: u64, from: u64 },
    /// The neighbour appears more than once in the vertex's neighbourhood.
    #[error("vertex {vertex} lists vertex {neighbour} more than once")]
    DuplicateNeighbour { vertex: u64, neighbour: u64 },
}
