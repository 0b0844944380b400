//! Garment size-ratio breakdown.
//!
//! A work order's quantity is entered as a number of "full ratio" and
//! "half ratio" sets; this module expands those set counts into per-size
//! piece counts for the even sizes 36 through 50. A full set contains one
//! piece of every size; a half set covers only the four core sizes.

use std::collections::BTreeMap;

/// Even garment sizes covered by a full ratio set.
pub const SIZES: [u32; 8] = [36, 38, 40, 42, 44, 46, 48, 50];

/// Core sizes covered by a half ratio set.
pub const HALF_SIZES: [u32; 4] = [40, 42, 44, 46];

/// Pieces contributed by one full set.
pub const PIECES_PER_FULL_SET: u32 = SIZES.len() as u32;

/// Pieces contributed by one half set.
pub const PIECES_PER_HALF_SET: u32 = HALF_SIZES.len() as u32;

/// Expands full/half ratio set counts into per-size piece counts.
///
/// Every size in [`SIZES`] appears in the result, including zero-piece
/// sizes, so callers can render a fixed-width size row.
pub fn size_breakdown(half_sets: u32, full_sets: u32) -> BTreeMap<u32, u32> {
    let mut pieces: BTreeMap<u32, u32> = SIZES.iter().map(|&s| (s, full_sets)).collect();
    for &size in &HALF_SIZES {
        if let Some(count) = pieces.get_mut(&size) {
            *count += half_sets;
        }
    }
    pieces
}

/// Total pieces produced by the given set counts.
pub fn total_pieces(half_sets: u32, full_sets: u32) -> u32 {
    full_sets * PIECES_PER_FULL_SET + half_sets * PIECES_PER_HALF_SET
}
