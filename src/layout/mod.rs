//! Justified gallery layout
//!
//! [`layout`] packs items of known aspect ratio into rows that exactly fill a
//! container width. [`DimensionCache`] remembers image sizes between runs so a
//! layout can be computed before images load.

pub mod dimensions;
pub mod masonry;

pub use dimensions::{DimensionCache, Dimensions};
pub use masonry::{LayoutBox, LayoutItem, LayoutOptions, layout, layout_height, rows};
