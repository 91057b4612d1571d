//! Value types shared by every part of the library: integer points, paths
//! and rectangles, the public enums, and the exact-arithmetic predicates
//! the scanline engine is built on.

use std::cmp::{max, min};
use std::fmt;

use derive_more::{Add, Neg, Sub};

use crate::error::{ClipError, Result};

/// Rounds an f64 value away from zero (2.5 -> 3, -2.5 -> -3).
#[inline]
pub fn round_away(x: f64) -> f64 {
    if x >= 0.0 {
        (x + 0.5).floor()
    } else {
        (x - 0.5).ceil()
    }
}

///////////////////////////////////////////////////////////////////////////////
// Point64
///////////////////////////////////////////////////////////////////////////////

/// A point on the integer lattice. Y grows downward, so an edge whose
/// `bot.y > top.y` ascends the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Add, Sub, Neg)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point64 {
    pub x: i64,
    pub y: i64,
}

impl Point64 {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Convenience for building a [`Point64`].
#[inline]
pub const fn pt(x: i64, y: i64) -> Point64 {
    Point64::new(x, y)
}

///////////////////////////////////////////////////////////////////////////////
// Path types
///////////////////////////////////////////////////////////////////////////////

/// An ordered sequence of lattice points. A closed path's last point is
/// logically adjacent to its first; a duplicate at the seam is ignored on
/// input.
pub type Path64 = Vec<Point64>;
pub type Paths64 = Vec<Path64>;

///////////////////////////////////////////////////////////////////////////////
// Rect64
///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect64 {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Rect64 {
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// An inverted rectangle that any real point will expand.
    pub const fn invalid() -> Self {
        Self {
            left: i64::MAX,
            top: i64::MAX,
            right: i64::MIN,
            bottom: i64::MIN,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.left != i64::MAX
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.bottom <= self.top || self.right <= self.left
    }

    pub fn mid_point(&self) -> Point64 {
        Point64::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn contains_point(&self, pt: Point64) -> bool {
        pt.x > self.left && pt.x < self.right && pt.y > self.top && pt.y < self.bottom
    }

    pub fn contains_rect(&self, other: &Rect64) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    pub fn intersects(&self, other: &Rect64) -> bool {
        max(self.left, other.left) <= min(self.right, other.right)
            && max(self.top, other.top) <= min(self.bottom, other.bottom)
    }

    /// The rectangle as a closed four-point path.
    pub fn as_path(&self) -> Path64 {
        vec![
            Point64::new(self.left, self.top),
            Point64::new(self.right, self.top),
            Point64::new(self.right, self.bottom),
            Point64::new(self.left, self.bottom),
        ]
    }
}

///////////////////////////////////////////////////////////////////////////////
// Enums
///////////////////////////////////////////////////////////////////////////////

/// The Boolean operation to perform between subject and clip regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClipType {
    Intersection,
    Union,
    Difference,
    Xor,
}

/// Which input set a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathType {
    Subject,
    Clip,
}

/// Maps a winding count to filled/unfilled, selecting how
/// self-intersections are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
    Positive,
    Negative,
}

/// Result of a point-in-polygon query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointInPolygonResult {
    Inside,
    Outside,
    OnBoundary,
}

/// Classification of a segment/segment intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentIntersection {
    /// The segments do not meet.
    None,
    /// The segments meet at a single lattice point.
    Point(Point64),
    /// The segments are collinear and share more than one point; the two
    /// points delimit the shared subsegment.
    Overlap(Point64, Point64),
}

///////////////////////////////////////////////////////////////////////////////
// Exact arithmetic
///////////////////////////////////////////////////////////////////////////////

/// 128-bit exact arithmetic. Every discrete decision in the engine comes
/// down to the sign of one of these quantities; floating point only ever
/// enters when an intersection *point* is materialised (already a rounded
/// lattice point) or when slopes are compared by magnitude for a
/// numerical-quality tie-break.
pub mod exact {
    use super::Point64;

    /// Cross product of the vectors p1->p2 and p1->p3. Positive for a
    /// left turn, negative for a right turn, zero when collinear. With
    /// coordinates bounded by ±1e18 the i128 product cannot overflow.
    #[inline]
    pub fn cross_product(p1: Point64, p2: Point64, p3: Point64) -> i128 {
        (p2.x - p1.x) as i128 * (p3.y - p1.y) as i128
            - (p2.y - p1.y) as i128 * (p3.x - p1.x) as i128
    }

    /// Sign of [`cross_product`]: -1, 0 or 1.
    #[inline]
    pub fn cross_sign(p1: Point64, p2: Point64, p3: Point64) -> i32 {
        let c = cross_product(p1, p2, p3);
        match c {
            c if c > 0 => 1,
            c if c < 0 => -1,
            _ => 0,
        }
    }

    /// Dot product of the vectors p1->p2 and p2->p3.
    #[inline]
    pub fn dot_product(p1: Point64, p2: Point64, p3: Point64) -> i128 {
        (p2.x - p1.x) as i128 * (p3.x - p2.x) as i128
            + (p2.y - p1.y) as i128 * (p3.y - p2.y) as i128
    }

    /// Squared euclidean distance between two points.
    #[inline]
    pub fn sqr_distance(a: Point64, b: Point64) -> i128 {
        let dx = (b.x - a.x) as i128;
        let dy = (b.y - a.y) as i128;
        dx * dx + dy * dy
    }

    /// Twice the signed area of a closed path, exact.
    pub fn area2(path: &[Point64]) -> i128 {
        if path.len() < 3 {
            return 0;
        }
        let mut sum: i128 = 0;
        let mut prev = path[path.len() - 1];
        for &p in path {
            sum += prev.x as i128 * p.y as i128 - p.x as i128 * prev.y as i128;
            prev = p;
        }
        sum
    }

    #[inline]
    fn tri_sign(x: i64) -> i32 {
        match x {
            x if x < 0 => -1,
            x if x > 0 => 1,
            _ => 0,
        }
    }

    /// Unsigned 64x64 -> 128 limb multiplication, kept in the classic
    /// lo/hi cross-term form.
    #[inline]
    pub fn multiply_u64(a: u64, b: u64) -> (u64, u64) {
        let x1 = (a & 0xFFFF_FFFF) * (b & 0xFFFF_FFFF);
        let x2 = (a >> 32) * (b & 0xFFFF_FFFF) + (x1 >> 32);
        let x3 = (a & 0xFFFF_FFFF) * (b >> 32) + (x2 & 0xFFFF_FFFF);
        let lo = ((x3 & 0xFFFF_FFFF) << 32) | (x1 & 0xFFFF_FFFF);
        let hi = (a >> 32) * (b >> 32) + (x2 >> 32) + (x3 >> 32);
        (lo, hi)
    }

    /// Whether a*b == c*d without overflow: magnitudes are compared limb
    /// by limb and the sign is resolved separately.
    #[inline]
    pub fn products_are_equal(a: i64, b: i64, c: i64, d: i64) -> bool {
        let ab = multiply_u64(a.unsigned_abs(), b.unsigned_abs());
        let cd = multiply_u64(c.unsigned_abs(), d.unsigned_abs());
        ab == cd && tri_sign(a) * tri_sign(b) == tri_sign(c) * tri_sign(d)
    }
}

/// True when the three points are collinear.
#[inline]
pub fn is_collinear(pt1: Point64, shared: Point64, pt2: Point64) -> bool {
    exact::products_are_equal(
        shared.x - pt1.x,
        pt2.y - shared.y,
        shared.y - pt1.y,
        pt2.x - shared.x,
    )
}

/// True when the two segments carry parallel direction vectors.
#[inline]
pub fn is_parallel(seg1a: Point64, seg1b: Point64, seg2a: Point64, seg2b: Point64) -> bool {
    exact::products_are_equal(
        seg1b.x - seg1a.x,
        seg2b.y - seg2a.y,
        seg1b.y - seg1a.y,
        seg2b.x - seg2a.x,
    )
}

///////////////////////////////////////////////////////////////////////////////
// Segment predicates
///////////////////////////////////////////////////////////////////////////////

#[inline]
fn in_range(v: i64, a: i64, b: i64) -> bool {
    v >= min(a, b) && v <= max(a, b)
}

/// True when `pt` lies on the closed segment a..b.
pub fn is_on_segment(pt: Point64, a: Point64, b: Point64) -> bool {
    exact::cross_product(a, b, pt) == 0 && in_range(pt.x, a.x, b.x) && in_range(pt.y, a.y, b.y)
}

/// Classifies the intersection of two segments.
///
/// A proper crossing yields the lattice point nearest the true
/// intersection (coordinates rounded away from zero). Collinear segments
/// are projected onto the axis with the larger extent and resolved by 1-D
/// interval overlap. An endpoint resting on the other segment yields that
/// endpoint.
pub fn segment_intersection(
    seg1a: Point64,
    seg1b: Point64,
    seg2a: Point64,
    seg2b: Point64,
) -> SegmentIntersection {
    let d1 = exact::cross_product(seg2a, seg2b, seg1a);
    let d2 = exact::cross_product(seg2a, seg2b, seg1b);
    let d3 = exact::cross_product(seg1a, seg1b, seg2a);
    let d4 = exact::cross_product(seg1a, seg1b, seg2b);

    if d1 == 0 && d2 == 0 && d3 == 0 && d4 == 0 {
        // Collinear: compare 1-D intervals on the axis with more spread.
        let use_x = (seg1b.x - seg1a.x).unsigned_abs().max((seg2b.x - seg2a.x).unsigned_abs())
            >= (seg1b.y - seg1a.y).unsigned_abs().max((seg2b.y - seg2a.y).unsigned_abs());
        let key = |p: Point64| if use_x { p.x } else { p.y };
        let (lo1, hi1) = if key(seg1a) <= key(seg1b) {
            (seg1a, seg1b)
        } else {
            (seg1b, seg1a)
        };
        let (lo2, hi2) = if key(seg2a) <= key(seg2b) {
            (seg2a, seg2b)
        } else {
            (seg2b, seg2a)
        };
        let (start, end) = (
            if key(lo1) >= key(lo2) { lo1 } else { lo2 },
            if key(hi1) <= key(hi2) { hi1 } else { hi2 },
        );
        return match key(start).cmp(&key(end)) {
            std::cmp::Ordering::Greater => SegmentIntersection::None,
            std::cmp::Ordering::Equal => SegmentIntersection::Point(start),
            std::cmp::Ordering::Less => SegmentIntersection::Overlap(start, end),
        };
    }

    if ((d1 > 0) != (d2 > 0)) && d1 != 0 && d2 != 0 && ((d3 > 0) != (d4 > 0)) && d3 != 0 && d4 != 0
    {
        // Proper crossing. d1 and d2 carry opposite signs so the ratio
        // lands strictly inside (0, 1).
        let t = d1 as f64 / (d1 - d2) as f64;
        let x = seg1a.x + round_away(t * (seg1b.x - seg1a.x) as f64) as i64;
        let y = seg1a.y + round_away(t * (seg1b.y - seg1a.y) as f64) as i64;
        return SegmentIntersection::Point(Point64::new(x, y));
    }

    if d1 == 0 && in_range(seg1a.x, seg2a.x, seg2b.x) && in_range(seg1a.y, seg2a.y, seg2b.y) {
        return SegmentIntersection::Point(seg1a);
    }
    if d2 == 0 && in_range(seg1b.x, seg2a.x, seg2b.x) && in_range(seg1b.y, seg2a.y, seg2b.y) {
        return SegmentIntersection::Point(seg1b);
    }
    if d3 == 0 && in_range(seg2a.x, seg1a.x, seg1b.x) && in_range(seg2a.y, seg1a.y, seg1b.y) {
        return SegmentIntersection::Point(seg2a);
    }
    if d4 == 0 && in_range(seg2b.x, seg1a.x, seg1b.x) && in_range(seg2b.y, seg1a.y, seg1b.y) {
        return SegmentIntersection::Point(seg2b);
    }
    SegmentIntersection::None
}

/// True when the segments meet. With `inclusive` set, touching endpoints
/// count as intersecting; otherwise only proper crossings do.
pub fn segs_intersect(
    seg1a: Point64,
    seg1b: Point64,
    seg2a: Point64,
    seg2b: Point64,
    inclusive: bool,
) -> bool {
    match segment_intersection(seg1a, seg1b, seg2a, seg2b) {
        SegmentIntersection::None => false,
        SegmentIntersection::Overlap(..) => inclusive,
        SegmentIntersection::Point(p) => {
            inclusive
                || (p != seg1a && p != seg1b && p != seg2a && p != seg2b)
        }
    }
}

/// The point on segment a..b closest to `off_pt` (clamped projection,
/// ties rounded to even).
pub fn closest_point_on_segment(off_pt: Point64, a: Point64, b: Point64) -> Point64 {
    if a == b {
        return a;
    }
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let q = (((off_pt.x - a.x) as f64 * dx) + ((off_pt.y - a.y) as f64 * dy)) / (dx * dx + dy * dy);
    let q = q.clamp(0.0, 1.0);
    Point64::new(a.x + (q * dx).round() as i64, a.y + (q * dy).round() as i64)
}

///////////////////////////////////////////////////////////////////////////////
// Point in polygon
///////////////////////////////////////////////////////////////////////////////

/// Locates `pt` relative to a closed path under the given fill rule.
///
/// Boundary points are detected first; interiors are decided by the
/// signed winding number of the path around the point, so the same scan
/// serves every fill rule.
pub fn point_in_polygon(pt: Point64, path: &[Point64], fill_rule: FillRule) -> PointInPolygonResult {
    if path.len() < 3 {
        return PointInPolygonResult::Outside;
    }
    let mut wn: i64 = 0;
    let mut a = path[path.len() - 1];
    for &b in path {
        if is_on_segment(pt, a, b) {
            return PointInPolygonResult::OnBoundary;
        }
        if a.y != b.y {
            // Half-open crossing rule so a vertex on the ray counts once.
            if a.y <= pt.y {
                if b.y > pt.y && exact::cross_sign(a, b, pt) > 0 {
                    wn += 1;
                }
            } else if b.y <= pt.y && exact::cross_sign(a, b, pt) < 0 {
                wn -= 1;
            }
        }
        a = b;
    }
    let filled = match fill_rule {
        FillRule::EvenOdd => wn & 1 != 0,
        FillRule::NonZero => wn != 0,
        FillRule::Positive => wn > 0,
        FillRule::Negative => wn < 0,
    };
    if filled {
        PointInPolygonResult::Inside
    } else {
        PointInPolygonResult::Outside
    }
}

///////////////////////////////////////////////////////////////////////////////
// Path utilities
///////////////////////////////////////////////////////////////////////////////

/// Upper bound on coordinate magnitude accepted by the engine.
pub const MAX_COORD: i64 = 1_000_000_000_000_000_000;

/// Validates that every coordinate stays within ±1e18.
pub fn check_paths_in_range(paths: &[Path64]) -> Result<()> {
    for path in paths {
        for p in path {
            if p.x.abs() > MAX_COORD || p.y.abs() > MAX_COORD {
                return Err(ClipError::CoordinateOutOfRange);
            }
        }
    }
    Ok(())
}

/// Signed area of a closed path (half the exact twice-area).
pub fn area(path: &[Point64]) -> f64 {
    exact::area2(path) as f64 * 0.5
}

/// Sum of signed areas over a set of paths.
pub fn area_paths(paths: &[Path64]) -> f64 {
    paths.iter().map(|p| area(p)).sum()
}

/// True when the path's signed area is non-negative.
pub fn is_positive(path: &[Point64]) -> bool {
    exact::area2(path) >= 0
}

/// Bounding box over a set of paths; invalid when the set holds no points.
pub fn get_bounds(paths: &[Path64]) -> Rect64 {
    let mut r = Rect64::invalid();
    for path in paths {
        for p in path {
            r.left = min(r.left, p.x);
            r.top = min(r.top, p.y);
            r.right = max(r.right, p.x);
            r.bottom = max(r.bottom, p.y);
        }
    }
    r
}

/// Bounding box of a single path.
pub fn get_bounds_path(path: &[Point64]) -> Rect64 {
    let mut r = Rect64::invalid();
    for p in path {
        r.left = min(r.left, p.x);
        r.top = min(r.top, p.y);
        r.right = max(r.right, p.x);
        r.bottom = max(r.bottom, p.y);
    }
    r
}

/// Removes consecutive duplicate points; for closed paths the seam
/// duplicate is removed as well.
pub fn strip_duplicates(path: &[Point64], is_closed: bool) -> Path64 {
    let mut out: Path64 = Vec::with_capacity(path.len());
    for &p in path {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    if is_closed {
        while out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
    }
    out
}

/// Squared perpendicular distance from `p` to the line through a and b.
/// The cross product is exact; only the final ratio is floating point.
fn perpendic_dist_sqr(p: Point64, a: Point64, b: Point64) -> f64 {
    let d = exact::sqr_distance(a, b);
    if d == 0 {
        return exact::sqr_distance(a, p) as f64;
    }
    let c = exact::cross_product(a, b, p) as f64;
    c * c / d as f64
}

/// Removes vertices that deviate less than `epsilon` (perpendicular
/// distance) from the line through their immediate neighbours, repeating
/// until every remaining vertex earns its place. Closed paths treat the
/// seam like any other joint.
pub fn simplify_path(path: &[Point64], epsilon: f64, is_closed: bool) -> Path64 {
    let eps_sqr = epsilon * epsilon;
    let mut out: Path64 = strip_duplicates(path, is_closed);
    loop {
        let n = out.len();
        if n < 3 {
            return out;
        }
        // The least significant vertex goes first so a gentle curve is
        // not eaten from one end.
        let mut flattest: Option<(usize, f64)> = None;
        let lo = usize::from(!is_closed);
        let hi = if is_closed { n } else { n - 1 };
        for i in lo..hi {
            let prev = out[(i + n - 1) % n];
            let next = out[(i + 1) % n];
            let d = perpendic_dist_sqr(out[i], prev, next);
            if d <= eps_sqr && flattest.map_or(true, |(_, best)| d < best) {
                flattest = Some((i, d));
            }
        }
        match flattest {
            Some((i, _)) => {
                out.remove(i);
            }
            None => return out,
        }
    }
}

/// [`simplify_path`] over a set of paths; emptied paths are dropped.
pub fn simplify_paths(paths: &[Path64], epsilon: f64, is_closed: bool) -> Paths64 {
    paths
        .iter()
        .map(|p| simplify_path(p, epsilon, is_closed))
        .filter(|p| p.len() >= if is_closed { 3 } else { 2 })
        .collect()
}

/// Translates a path by (dx, dy).
pub fn translate_path(path: &[Point64], dx: i64, dy: i64) -> Path64 {
    path.iter().map(|p| Point64::new(p.x + dx, p.y + dy)).collect()
}

/// Translates every path by (dx, dy).
pub fn translate_paths(paths: &[Path64], dx: i64, dy: i64) -> Paths64 {
    paths.iter().map(|p| translate_path(p, dx, dy)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_sign_orientation() {
        let a = pt(0, 0);
        let b = pt(10, 0);
        assert_eq!(exact::cross_sign(a, b, pt(5, 10)), 1);
        assert_eq!(exact::cross_sign(a, b, pt(5, -10)), -1);
        assert_eq!(exact::cross_sign(a, b, pt(20, 0)), 0);
    }

    #[test]
    fn cross_product_is_exact_at_scale() {
        // Values chosen so the f64 rendition of the products collapses to
        // equality while the exact result does not.
        let a = pt(0, 0);
        let b = pt(1_000_000_007, 1);
        let c = pt(2_000_000_014, 3);
        assert_ne!(exact::cross_product(a, b, c), 0);
    }

    #[test]
    fn products_equal_matches_i128() {
        let cases = [
            (3, 4, 6, 2),
            (-3, 4, 6, -2),
            (i64::MAX, 2, i64::MAX, 2),
            (7, 0, 0, 9),
            (123_456_789, -987_654_321, -123_456_789, 987_654_321),
        ];
        for (a, b, c, d) in cases {
            assert_eq!(
                exact::products_are_equal(a, b, c, d),
                a as i128 * b as i128 == c as i128 * d as i128,
                "{a} {b} {c} {d}"
            );
        }
    }

    #[test]
    fn area2_square() {
        let sq = vec![pt(0, 0), pt(10, 0), pt(10, 10), pt(0, 10)];
        assert_eq!(exact::area2(&sq), 200);
        assert_eq!(area(&sq), 100.0);
        assert!(is_positive(&sq));
        let mut rev = sq.clone();
        rev.reverse();
        assert_eq!(area(&rev), -100.0);
    }

    #[test]
    fn segment_intersection_crossing() {
        let r = segment_intersection(pt(0, 0), pt(10, 10), pt(0, 10), pt(10, 0));
        assert_eq!(r, SegmentIntersection::Point(pt(5, 5)));
    }

    #[test]
    fn segment_intersection_endpoint_touch() {
        let r = segment_intersection(pt(0, 0), pt(10, 0), pt(5, 0), pt(5, 8));
        assert_eq!(r, SegmentIntersection::Point(pt(5, 0)));
    }

    #[test]
    fn segment_intersection_collinear_overlap() {
        let r = segment_intersection(pt(0, 0), pt(10, 0), pt(4, 0), pt(20, 0));
        assert_eq!(r, SegmentIntersection::Overlap(pt(4, 0), pt(10, 0)));
        // Touching end to end collapses to a single point.
        let r = segment_intersection(pt(0, 0), pt(10, 0), pt(10, 0), pt(20, 0));
        assert_eq!(r, SegmentIntersection::Point(pt(10, 0)));
        let r = segment_intersection(pt(0, 0), pt(10, 0), pt(11, 0), pt(20, 0));
        assert_eq!(r, SegmentIntersection::None);
    }

    #[test]
    fn segment_intersection_disjoint() {
        let r = segment_intersection(pt(0, 0), pt(10, 0), pt(0, 5), pt(10, 5));
        assert_eq!(r, SegmentIntersection::None);
    }

    #[test]
    fn closest_point_clamps() {
        assert_eq!(closest_point_on_segment(pt(-5, 5), pt(0, 0), pt(10, 0)), pt(0, 0));
        assert_eq!(closest_point_on_segment(pt(15, 5), pt(0, 0), pt(10, 0)), pt(10, 0));
        assert_eq!(closest_point_on_segment(pt(5, 5), pt(0, 0), pt(10, 0)), pt(5, 0));
    }

    #[test]
    fn point_in_polygon_square() {
        let sq = vec![pt(0, 0), pt(10, 0), pt(10, 10), pt(0, 10)];
        assert_eq!(
            point_in_polygon(pt(5, 5), &sq, FillRule::NonZero),
            PointInPolygonResult::Inside
        );
        assert_eq!(
            point_in_polygon(pt(15, 5), &sq, FillRule::NonZero),
            PointInPolygonResult::Outside
        );
        assert_eq!(
            point_in_polygon(pt(10, 5), &sq, FillRule::NonZero),
            PointInPolygonResult::OnBoundary
        );
        assert_eq!(
            point_in_polygon(pt(0, 0), &sq, FillRule::EvenOdd),
            PointInPolygonResult::OnBoundary
        );
    }

    #[test]
    fn point_in_polygon_fill_rules() {
        // Two concentric same-orientation squares: winding 2 inside both.
        let outer = vec![pt(0, 0), pt(100, 0), pt(100, 100), pt(0, 100)];
        let inner = vec![pt(20, 20), pt(80, 20), pt(80, 80), pt(20, 80)];
        let mut ring: Path64 = outer.clone();
        // point_in_polygon works on one path; test the rules separately.
        assert_eq!(
            point_in_polygon(pt(50, 50), &ring, FillRule::Positive),
            PointInPolygonResult::Inside
        );
        ring.reverse();
        assert_eq!(
            point_in_polygon(pt(50, 50), &ring, FillRule::Positive),
            PointInPolygonResult::Outside
        );
        assert_eq!(
            point_in_polygon(pt(50, 50), &ring, FillRule::Negative),
            PointInPolygonResult::Inside
        );
        assert_eq!(
            point_in_polygon(pt(50, 50), &inner, FillRule::EvenOdd),
            PointInPolygonResult::Inside
        );
    }

    #[test]
    fn strip_duplicates_closed_seam() {
        let p = vec![pt(0, 0), pt(0, 0), pt(10, 0), pt(10, 10), pt(0, 0)];
        assert_eq!(
            strip_duplicates(&p, true),
            vec![pt(0, 0), pt(10, 0), pt(10, 10)]
        );
    }

    #[test]
    fn simplify_removes_near_collinear_vertices() {
        // (50,1) deviates by one unit from the straight top edge.
        let p = vec![pt(0, 0), pt(50, 1), pt(100, 0), pt(100, 100), pt(0, 100)];
        let s = simplify_path(&p, 2.0, true);
        assert_eq!(s.len(), 4);
        assert!(!s.contains(&pt(50, 1)));
        // A tight epsilon keeps it.
        let s = simplify_path(&p, 0.5, true);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn simplify_keeps_open_endpoints() {
        let p = vec![pt(0, 0), pt(10, 1), pt(20, 0), pt(30, 50)];
        let s = simplify_path(&p, 2.0, false);
        assert_eq!(s.first(), Some(&pt(0, 0)));
        assert_eq!(s.last(), Some(&pt(30, 50)));
        assert!(!s.contains(&pt(10, 1)));
    }

    #[test]
    fn simplify_paths_drops_consumed_rings() {
        let sliver = vec![pt(0, 0), pt(100, 1), pt(200, 0)];
        let keeper = vec![pt(0, 0), pt(100, 0), pt(100, 100), pt(0, 100)];
        let out = simplify_paths(&[sliver, keeper.clone()], 3.0, true);
        assert_eq!(out, vec![keeper]);
    }

    #[test]
    fn bounds_and_translate() {
        let p = vec![pt(-3, 2), pt(7, -8), pt(4, 9)];
        let b = get_bounds(std::slice::from_ref(&p));
        assert_eq!(b, Rect64::new(-3, -8, 7, 9));
        let moved = translate_path(&p, 10, 10);
        assert_eq!(moved[0], pt(7, 12));
    }

    #[test]
    fn range_check() {
        let ok: Paths64 = vec![vec![pt(MAX_COORD, -MAX_COORD)]];
        assert!(check_paths_in_range(&ok).is_ok());
        let bad: Paths64 = vec![vec![pt(MAX_COORD + 1, 0)]];
        assert!(check_paths_in_range(&bad).is_err());
    }
}
