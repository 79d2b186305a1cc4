//! Photo payload decoding and thumbnail derivation.

pub mod pipeline;

pub use pipeline::{derive_blocking, AssetError, DerivedAsset};
