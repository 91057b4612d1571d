//! Clipping against an axis-aligned rectangle.
//!
//! Far cheaper than the scanline engine when the clip region is a
//! rectangle: closed paths go through a half-plane-at-a-time sweep and
//! polylines through outcode-based segment trimming. Intersections with
//! the rectangle sides are computed with exact 128-bit rational
//! rounding, so results land on the same lattice the Boolean core uses.

use crate::core::{Path64, Paths64, Point64, Rect64};

/// Rounded-to-nearest division, ties away from zero.
#[inline]
fn div_round(n: i128, d: i128) -> i128 {
    let (n, d, sign) = if (n < 0) != (d < 0) {
        (n.abs(), d.abs(), -1)
    } else {
        (n.abs(), d.abs(), 1)
    };
    sign * ((n + d / 2) / d)
}

/// Y of the segment a..b at the vertical line `x` (a.x != b.x).
#[inline]
fn y_at_x(a: Point64, b: Point64, x: i64) -> i64 {
    a.y + div_round(
        (x - a.x) as i128 * (b.y - a.y) as i128,
        (b.x - a.x) as i128,
    ) as i64
}

/// X of the segment a..b at the horizontal line `y` (a.y != b.y).
#[inline]
fn x_at_y(a: Point64, b: Point64, y: i64) -> i64 {
    a.x + div_round(
        (y - a.y) as i128 * (b.x - a.x) as i128,
        (b.y - a.y) as i128,
    ) as i64
}

#[derive(Clone, Copy)]
enum Side {
    Left(i64),
    Right(i64),
    Top(i64),
    Bottom(i64),
}

impl Side {
    #[inline]
    fn is_inside(self, p: Point64) -> bool {
        match self {
            Side::Left(x) => p.x >= x,
            Side::Right(x) => p.x <= x,
            Side::Top(y) => p.y >= y,
            Side::Bottom(y) => p.y <= y,
        }
    }

    #[inline]
    fn crossing(self, a: Point64, b: Point64) -> Point64 {
        match self {
            Side::Left(x) | Side::Right(x) => Point64::new(x, y_at_x(a, b, x)),
            Side::Top(y) | Side::Bottom(y) => Point64::new(x_at_y(a, b, y), y),
        }
    }
}

/// Clips one closed path against a single half-plane.
fn clip_against(path: &[Point64], side: Side) -> Path64 {
    let mut out: Path64 = Vec::with_capacity(path.len() + 4);
    if path.is_empty() {
        return out;
    }
    let mut prev = path[path.len() - 1];
    let mut prev_in = side.is_inside(prev);
    for &cur in path {
        let cur_in = side.is_inside(cur);
        if cur_in {
            if !prev_in {
                out.push(side.crossing(prev, cur));
            }
            out.push(cur);
        } else if prev_in {
            out.push(side.crossing(prev, cur));
        }
        prev = cur;
        prev_in = cur_in;
    }
    out
}

/// Intersects closed paths with a rectangle.
///
/// Each path is clipped against the four rectangle sides in turn; paths
/// with fewer than three surviving distinct points are dropped. Input
/// orientation is preserved.
pub fn rect_clip(rect: Rect64, paths: &[Path64]) -> Paths64 {
    let mut solution: Paths64 = Vec::new();
    if rect.is_empty() {
        return solution;
    }
    let sides = [
        Side::Left(rect.left),
        Side::Top(rect.top),
        Side::Right(rect.right),
        Side::Bottom(rect.bottom),
    ];
    for path in paths {
        let bounds = crate::core::get_bounds_path(path);
        if !bounds.is_valid() || !rect.intersects(&bounds) {
            continue;
        }
        if rect.contains_rect(&bounds) {
            solution.push(path.clone());
            continue;
        }
        let mut clipped = path.clone();
        for side in sides {
            clipped = clip_against(&clipped, side);
            if clipped.is_empty() {
                break;
            }
        }
        let clipped = crate::core::strip_duplicates(&clipped, true);
        if clipped.len() >= 3 {
            solution.push(clipped);
        }
    }
    solution
}

// Outcode bits for the segment clipper.
const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const ABOVE: u8 = 4;
const BELOW: u8 = 8;

#[inline]
fn outcode(rect: &Rect64, p: Point64) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.left {
        code |= LEFT;
    } else if p.x > rect.right {
        code |= RIGHT;
    }
    if p.y < rect.top {
        code |= ABOVE;
    } else if p.y > rect.bottom {
        code |= BELOW;
    }
    code
}

/// Trims the segment a..b to the rectangle, or `None` when it misses.
fn clip_segment(rect: &Rect64, mut a: Point64, mut b: Point64) -> Option<(Point64, Point64)> {
    let mut code_a = outcode(rect, a);
    let mut code_b = outcode(rect, b);
    loop {
        if code_a | code_b == INSIDE {
            return Some((a, b));
        }
        if code_a & code_b != INSIDE {
            return None;
        }
        // Push the endpoint that is outside onto the rectangle boundary.
        let code = if code_a != INSIDE { code_a } else { code_b };
        let p = if code & LEFT != 0 {
            Point64::new(rect.left, y_at_x(a, b, rect.left))
        } else if code & RIGHT != 0 {
            Point64::new(rect.right, y_at_x(a, b, rect.right))
        } else if code & ABOVE != 0 {
            Point64::new(x_at_y(a, b, rect.top), rect.top)
        } else {
            Point64::new(x_at_y(a, b, rect.bottom), rect.bottom)
        };
        if code == code_a {
            a = p;
            code_a = outcode(rect, a);
        } else {
            b = p;
            code_b = outcode(rect, b);
        }
    }
}

/// Intersects open polylines with a rectangle. Each input polyline may
/// yield several disjoint pieces; pieces are emitted in traversal order.
pub fn rect_clip_lines(rect: Rect64, paths: &[Path64]) -> Paths64 {
    let mut solution: Paths64 = Vec::new();
    if rect.is_empty() {
        return solution;
    }
    for path in paths {
        let mut piece: Path64 = Vec::new();
        for w in path.windows(2) {
            let (a, b) = (w[0], w[1]);
            match clip_segment(&rect, a, b) {
                Some((ca, cb)) => {
                    if piece.last() == Some(&ca) {
                        piece.push(cb);
                    } else {
                        if piece.len() >= 2 {
                            solution.push(std::mem::take(&mut piece));
                        } else {
                            piece.clear();
                        }
                        piece.push(ca);
                        piece.push(cb);
                    }
                }
                None => {
                    if piece.len() >= 2 {
                        solution.push(std::mem::take(&mut piece));
                    } else {
                        piece.clear();
                    }
                }
            }
        }
        if piece.len() >= 2 {
            solution.push(piece);
        }
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{area, pt};

    fn square(x: i64, y: i64, size: i64) -> Path64 {
        vec![
            pt(x, y),
            pt(x + size, y),
            pt(x + size, y + size),
            pt(x, y + size),
        ]
    }

    #[test]
    fn contained_path_passes_through() {
        let r = Rect64::new(0, 0, 100, 100);
        let out = rect_clip(r, &[square(10, 10, 20)]);
        assert_eq!(out, vec![square(10, 10, 20)]);
    }

    #[test]
    fn disjoint_path_is_dropped() {
        let r = Rect64::new(0, 0, 100, 100);
        assert!(rect_clip(r, &[square(200, 200, 20)]).is_empty());
    }

    #[test]
    fn straddling_square_is_cropped() {
        let r = Rect64::new(0, 0, 100, 100);
        let out = rect_clip(r, &[square(50, 50, 100)]);
        assert_eq!(out.len(), 1);
        assert_eq!(area(&out[0]).abs(), 2500.0);
        for p in &out[0] {
            assert!(r.contains_point(*p) || p.x == 100 || p.y == 100 || p.x == 50 || p.y == 50);
        }
    }

    #[test]
    fn sloped_crossing_rounds_on_the_boundary() {
        let r = Rect64::new(0, 0, 10, 10);
        // The edge from (-5,0) to (5,9) crosses x=0 at y=4.5.
        let tri = vec![pt(-5, 0), pt(5, 9), pt(-5, 9)];
        let out = rect_clip(r, &[tri]);
        assert_eq!(out.len(), 1);
        assert!(out[0].contains(&pt(0, 5)));
    }

    #[test]
    fn surrounding_path_collapses_to_the_rect() {
        let r = Rect64::new(10, 10, 40, 40);
        let out = rect_clip(r, &[square(0, 0, 100)]);
        assert_eq!(out.len(), 1);
        assert_eq!(area(&out[0]).abs(), 900.0);
    }

    #[test]
    fn line_piece_inside() {
        let r = Rect64::new(0, 0, 100, 100);
        let out = rect_clip_lines(r, &[vec![pt(10, 10), pt(20, 20), pt(30, 10)]]);
        assert_eq!(out, vec![vec![pt(10, 10), pt(20, 20), pt(30, 10)]]);
    }

    #[test]
    fn line_trimmed_at_both_ends() {
        let r = Rect64::new(0, 0, 100, 100);
        let out = rect_clip_lines(r, &[vec![pt(-50, 50), pt(150, 50)]]);
        assert_eq!(out, vec![vec![pt(0, 50), pt(100, 50)]]);
    }

    #[test]
    fn line_leaving_and_reentering_splits() {
        let r = Rect64::new(0, 0, 100, 100);
        // Crosses the rectangle, exits above it, then comes back in.
        let poly = vec![pt(-10, 50), pt(50, 50), pt(50, -40), pt(90, -40), pt(90, 50)];
        let out = rect_clip_lines(r, &[poly]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], vec![pt(0, 50), pt(50, 50), pt(50, 0)]);
        assert_eq!(out[1], vec![pt(90, 0), pt(90, 50)]);
    }

    #[test]
    fn fully_outside_line_is_dropped() {
        let r = Rect64::new(0, 0, 100, 100);
        assert!(rect_clip_lines(r, &[vec![pt(-10, -10), pt(-20, -30)]]).is_empty());
    }
}
