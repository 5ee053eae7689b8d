//! Matrix file storage.
//!
//! Files start with a fixed header ([`MatrixHeader`]) followed by either raw
//! little-endian elements or line-compressed data plus a line index.

pub mod cache;
pub mod element;
pub mod handle;
pub mod header;
pub mod info;

pub use cache::ColumnCache;
pub use element::Element;
pub use handle::MatrixHandle;
pub use header::MatrixHeader;
pub use info::{ElementKind, MatrixInfo, StorageVariant};
