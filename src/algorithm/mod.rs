/// Bitset over tile indices for options and adjacency rules
pub mod bitset;
/// Resumable run controller driving attempts step by step
pub mod executor;
/// Constraint propagation after a collapse
pub mod propagation;
/// Updatable min-priority queue ordering cells by entropy
pub mod queue;
