//! Bitmap size limits to prevent memory exhaustion from degenerate requests
//!
//! These limits are enforced by the in-memory [`crate::BitmapArena`]; the
//! composer itself only keeps its text rect inside whatever it was given.

/// Maximum bitmap width in pixels
pub const MAX_BITMAP_WIDTH: i32 = 4096;

/// Maximum bitmap height in pixels
pub const MAX_BITMAP_HEIGHT: i32 = 4096;

/// Check if dimensions are within safe limits
#[inline]
pub fn is_within_limits(width: i32, height: i32) -> bool {
    width > 0 && width <= MAX_BITMAP_WIDTH && height > 0 && height <= MAX_BITMAP_HEIGHT
}
