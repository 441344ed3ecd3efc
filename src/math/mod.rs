//! Mathematical utilities for the algorithm

/// Entropy and frequency-weighted random selection
pub mod probability;
