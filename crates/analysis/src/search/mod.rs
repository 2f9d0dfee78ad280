//! Graph traversals: the per-capability reverse search that drives all
//! list-shaped output, and the forward search that the graph and
//! intermediate shapes compose with it.

pub mod backward;
pub mod bfs;
pub mod forward;

pub use backward::{for_each_path, search_backward};
pub use bfs::{BfsState, BfsStateMap};
pub use forward::{search_forward, GraphSink};
