//! Exact Boolean operations on 64-bit integer polygons.
//!
//! The core is a scanline clipper: input rings are decomposed into
//! bounds rising from local minima, an active-edge list tracks the
//! bounds crossing each scanline, winding counts classify the regions
//! between them, and output rings are stitched together from edge
//! events. All orientation and ordering decisions are made in 128-bit
//! integer arithmetic, so results are exact for coordinates up to
//! ±1e18.
//!
//! ```
//! use polybool::{union, FillRule, Point64};
//!
//! let a = vec![vec![
//!     Point64::new(0, 0),
//!     Point64::new(10, 0),
//!     Point64::new(10, 10),
//!     Point64::new(0, 10),
//! ]];
//! let b = vec![vec![
//!     Point64::new(5, 5),
//!     Point64::new(15, 5),
//!     Point64::new(15, 15),
//!     Point64::new(5, 15),
//! ]];
//! let merged = union(&a, &b, FillRule::NonZero).unwrap();
//! assert_eq!(merged.len(), 1);
//! assert_eq!(polybool::area(&merged[0]).abs(), 175.0);
//! ```

pub mod core;
mod engine;
mod error;
mod offset;
mod polytree;
mod rectclip;

pub use crate::core::{
    area, area_paths, get_bounds, get_bounds_path, is_collinear, is_parallel, is_positive,
    point_in_polygon, segment_intersection, simplify_path, simplify_paths, strip_duplicates,
    translate_path, translate_paths, ClipType, FillRule, Path64, Paths64, PathType, Point64,
    PointInPolygonResult, Rect64, SegmentIntersection,
};
pub use engine::Clipper64;
pub use error::{ClipError, Result};
pub use offset::{inflate_paths, JoinType, PathOffset};
pub use polytree::{build_polytree, PolyNode64, PolyTree64};
pub use rectclip::{rect_clip, rect_clip_lines};

/// Performs one Boolean operation on closed subject and clip paths.
pub fn boolean_op(
    clip_type: ClipType,
    fill_rule: FillRule,
    subjects: &Paths64,
    clips: &Paths64,
) -> Result<Paths64> {
    let mut clipper = Clipper64::new();
    clipper.add_subjects(subjects)?;
    clipper.add_clips(clips)?;
    clipper.execute(clip_type, fill_rule)
}

/// The full engine surface: closed solution paths plus the open-path
/// slot, which is reserved and always empty here.
pub fn execute(
    clip_type: ClipType,
    fill_rule: FillRule,
    subjects: &Paths64,
    clips: &Paths64,
) -> Result<(Paths64, Paths64)> {
    let closed = boolean_op(clip_type, fill_rule, subjects, clips)?;
    Ok((closed, Paths64::new()))
}

/// Union of subjects and clips.
pub fn union(subjects: &Paths64, clips: &Paths64, fill_rule: FillRule) -> Result<Paths64> {
    boolean_op(ClipType::Union, fill_rule, subjects, clips)
}

/// Intersection of subjects with clips.
pub fn intersect(subjects: &Paths64, clips: &Paths64, fill_rule: FillRule) -> Result<Paths64> {
    boolean_op(ClipType::Intersection, fill_rule, subjects, clips)
}

/// Subjects minus clips.
pub fn difference(subjects: &Paths64, clips: &Paths64, fill_rule: FillRule) -> Result<Paths64> {
    boolean_op(ClipType::Difference, fill_rule, subjects, clips)
}

/// Regions covered by exactly one of subjects and clips.
pub fn xor(subjects: &Paths64, clips: &Paths64, fill_rule: FillRule) -> Result<Paths64> {
    boolean_op(ClipType::Xor, fill_rule, subjects, clips)
}
