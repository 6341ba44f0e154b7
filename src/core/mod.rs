//! Core file I/O: loaders and writers for CSV and sequence data.

pub mod loaders;
pub mod writers;

pub use loaders::Series;
