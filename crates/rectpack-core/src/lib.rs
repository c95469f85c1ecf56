//! Free-rectangle tracking for 2D rectangle bin packing.
//!
//! - Geometry: `Rect<T>` with overlap / containment / intersection predicates for integer or real coordinates
//! - Tracker: `FreeRectManager` keeps the maximal free rectangles of one bin (MaxRects split + containment pruning)
//! - Choosing where an item goes is left to the caller: read the free rectangles, score them, then commit with `place_rect`.
//!
//! Quick example:
//! ```
//! use rectpack_core::{FreeRectManager, Rect};
//! # fn main() -> rectpack_core::Result<()> {
//! let mut bin = FreeRectManager::new(Rect::new(0u32, 0, 10, 10))?;
//! bin.place_rect(&Rect::new(0, 0, 4, 4))?;
//! assert_eq!(bin.len(), 2);
//! for fr in bin.iter() {
//!     println!("free: {:?}", fr);
//! }
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod tracker;

pub use config::*;
pub use error::*;
pub use geometry::*;
pub use tracker::*;

/// Convenience prelude for common types.
/// Importing `rectpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PruneStrategy, TrackerConfig, TrackerConfigBuilder};
    pub use crate::error::{RectPackError, Result};
    pub use crate::geometry::{Coord, Rect};
    pub use crate::tracker::{FreeRectManager, PlaceReport};
}
