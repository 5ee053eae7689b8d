//! Background-subtracted cuts through file or memory backed matrices.

pub mod engine;
pub mod region;
pub mod source;
pub mod spectrum;

pub use engine::{CoordinateMap, CutEngine, CutStats, Identity, Linear};
pub use region::RegionList;
pub use source::{BinAxis, CutAxis, DenseMatrix, FileMatrix, MemoryMatrix, VirtualMatrix};
pub use spectrum::Spectrum;
