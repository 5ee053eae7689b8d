//! Global configuration for ggmat runtime behavior.
//!
//! Holds the storage variant used for every matrix file a command creates.
//! It is set once at startup from the command line and read whenever an
//! output matrix is created. Until it is set, outputs use
//! `LineCompressedV2`, or a variant able to hold floating-point data when
//! the output is not integer.

use crate::matrix::{ElementKind, StorageVariant};
use std::sync::atomic::{AtomicU8, Ordering};

/// Header byte of the configured variant, or `UNSET`.
static DEFAULT_VARIANT: AtomicU8 = AtomicU8::new(UNSET);

const UNSET: u8 = u8::MAX;

/// Set the storage variant used for newly created matrices.
///
/// # Example
///
/// ```
/// use ggmat::config;
/// use ggmat::matrix::StorageVariant;
///
/// config::set_default_variant(StorageVariant::Raw);
/// assert_eq!(config::default_variant(), StorageVariant::Raw);
/// # config::reset_default_variant();
/// ```
#[inline]
pub fn set_default_variant(variant: StorageVariant) {
    DEFAULT_VARIANT.store(variant.to_byte(), Ordering::Release);
}

/// Forget any configured variant.
#[inline]
pub fn reset_default_variant() {
    DEFAULT_VARIANT.store(UNSET, Ordering::Release);
}

/// The variant set with [`set_default_variant`], if any.
#[inline]
pub fn configured_variant() -> Option<StorageVariant> {
    StorageVariant::from_byte(DEFAULT_VARIANT.load(Ordering::Acquire))
}

/// Storage variant used for newly created integer matrices.
#[inline]
pub fn default_variant() -> StorageVariant {
    configured_variant().unwrap_or(StorageVariant::LineCompressedV2)
}

/// Storage variant for a new matrix of `kind` derived from a matrix stored
/// as `source`.
///
/// An explicit or configured variant is used as given, so an incompatible
/// choice still fails validation. Otherwise the first of
/// `LineCompressedV2`, `source` and `Raw` able to hold `kind` is used.
pub fn output_variant(
    explicit: Option<StorageVariant>,
    kind: ElementKind,
    source: StorageVariant,
) -> StorageVariant {
    if let Some(variant) = explicit.or_else(configured_variant) {
        return variant;
    }
    [StorageVariant::LineCompressedV2, source]
        .into_iter()
        .find(|v| v.supports(kind))
        .unwrap_or(StorageVariant::Raw)
}
