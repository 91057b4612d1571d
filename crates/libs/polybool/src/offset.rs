//! Inflate/deflate closed paths by a signed distance.
//!
//! Each ring is swept into an offset ribbon ring (join geometry applied
//! at every convex vertex, the raw wedge at concave ones) and the
//! collected rings are resolved with a single `Union`/`Positive` pass
//! through the Boolean core, which removes the self-intersections the
//! sweep leaves behind.

use std::f64::consts::PI;

use crate::core::{is_positive, round_away, ClipType, FillRule, Path64, Paths64, Point64};
use crate::engine::Clipper64;
use crate::error::Result;

const TWO_PI: f64 = PI * 2.0;
const DEFAULT_ARC_TOLERANCE: f64 = 0.25;
const TOLERANCE: f64 = 1.0e-12;

/// How convex corners of the offset outline are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// Corners squared off one delta away from the vertex.
    Square,
    /// Corners chamfered flat across the two edge offsets.
    Bevel,
    /// Corners swept with an arc.
    Round,
    /// Corners extended to their true meeting point, squared off beyond
    /// the miter limit.
    Miter,
}

#[derive(Debug, Clone, Copy)]
struct Vec2 {
    x: f64,
    y: f64,
}

/// Offsets closed paths by a signed delta. Positive deltas inflate,
/// negative deltas deflate; rings a deflation consumes entirely vanish
/// from the result.
#[derive(Debug)]
pub struct PathOffset {
    groups: Vec<(Paths64, JoinType)>,
    miter_limit: f64,
    arc_tolerance: f64,

    delta: f64,
    miter_lim: f64,
    step_sin: f64,
    step_cos: f64,
    steps_per_rad: f64,
}

impl Default for PathOffset {
    fn default() -> Self {
        Self::new(2.0, DEFAULT_ARC_TOLERANCE)
    }
}

impl PathOffset {
    pub fn new(miter_limit: f64, arc_tolerance: f64) -> Self {
        Self {
            groups: Vec::new(),
            miter_limit: miter_limit.max(2.0),
            arc_tolerance,
            delta: 0.0,
            miter_lim: 0.5,
            step_sin: 0.0,
            step_cos: 0.0,
            steps_per_rad: 0.0,
        }
    }

    /// Queues closed paths for offsetting with the given join style.
    pub fn add_paths(&mut self, paths: &[Path64], join_type: JoinType) {
        let mut group: Paths64 = Vec::with_capacity(paths.len());
        for path in paths {
            let clean = crate::core::strip_duplicates(path, true);
            if clean.len() >= 3 {
                group.push(clean);
            }
        }
        if !group.is_empty() {
            self.groups.push((group, join_type));
        }
    }

    /// Runs the offset and returns the cleaned result.
    pub fn execute(&mut self, delta: f64) -> Result<Paths64> {
        if delta.abs() < TOLERANCE {
            // Nothing to offset; hand the input through a cleaning union
            // instead.
            let mut clipper = Clipper64::new();
            for (group, _) in &self.groups {
                clipper.add_subjects(group)?;
            }
            return clipper.execute(ClipType::Union, FillRule::Positive);
        }

        self.delta = delta;
        self.miter_lim = if self.miter_limit > 2.0 {
            2.0 / (self.miter_limit * self.miter_limit)
        } else {
            0.5
        };

        // Arc step angle from the sagitta tolerance, capped so huge
        // deltas do not explode the vertex count.
        let abs_delta = delta.abs();
        let tol = if self.arc_tolerance <= 0.0 {
            DEFAULT_ARC_TOLERANCE
        } else {
            self.arc_tolerance
        }
        .min(abs_delta * DEFAULT_ARC_TOLERANCE);
        let mut steps = PI / (1.0 - tol / abs_delta).acos();
        steps = steps.min(abs_delta * PI).max(4.0);
        self.step_sin = (TWO_PI / steps).sin();
        self.step_cos = (TWO_PI / steps).cos();
        if delta < 0.0 {
            self.step_sin = -self.step_sin;
        }
        self.steps_per_rad = steps / TWO_PI;

        let groups = std::mem::take(&mut self.groups);
        let mut ribbon: Paths64 = Vec::new();
        for (group, join_type) in &groups {
            // Offsetting negates when the ring winds backward, so level
            // every group on the orientation of its lowest ring while
            // holes keep their relative reversal.
            let flip = !is_positive(lowest_path(group));
            for path in group {
                let src: Path64 = if flip {
                    path.iter().rev().copied().collect()
                } else {
                    path.clone()
                };
                if let Some(out) = self.offset_ring(&src, *join_type) {
                    ribbon.push(out);
                }
            }
        }
        self.groups = groups;

        let mut clipper = Clipper64::new();
        clipper.add_subjects(&ribbon)?;
        clipper.execute(ClipType::Union, FillRule::Positive)
    }

    fn offset_ring(&self, path: &Path64, join_type: JoinType) -> Option<Path64> {
        let n = path.len();
        if n < 3 {
            return None;
        }
        let normals: Vec<Vec2> = (0..n)
            .map(|i| unit_normal(path[i], path[(i + 1) % n]))
            .collect();

        let mut out: Path64 = Vec::with_capacity(n * 2);
        let mut k = n - 1;
        for j in 0..n {
            self.offset_point(path, &normals, j, &mut k, join_type, &mut out);
        }
        if out.len() < 3 {
            return None;
        }
        Some(out)
    }

    fn offset_point(
        &self,
        path: &Path64,
        normals: &[Vec2],
        j: usize,
        k: &mut usize,
        join_type: JoinType,
        out: &mut Path64,
    ) {
        let nk = normals[*k];
        let nj = normals[j];
        let mut sin_a = nk.x * nj.y - nj.x * nk.y;
        let cos_a = nk.x * nj.x + nk.y * nj.y;

        if (sin_a * self.delta).abs() < 1.0 && cos_a > 0.0 {
            // Practically straight: one offset point suffices.
            out.push(perpendic(path[j], nk, self.delta));
            *k = j;
            return;
        }
        sin_a = sin_a.clamp(-1.0, 1.0);

        if sin_a * self.delta < 0.0 {
            // Concave corner: emit the raw wedge and let the union pass
            // swallow it.
            out.push(perpendic(path[j], nk, self.delta));
            out.push(path[j]);
            out.push(perpendic(path[j], nj, self.delta));
        } else {
            match join_type {
                JoinType::Miter => {
                    let r = 1.0 + cos_a;
                    if r >= self.miter_lim {
                        self.do_miter(path[j], nk, nj, r, out);
                    } else {
                        self.do_square(path[j], nk, nj, sin_a, cos_a, out);
                    }
                }
                JoinType::Round => self.do_round(path[j], nk, nj, sin_a, cos_a, out),
                JoinType::Bevel => {
                    out.push(perpendic(path[j], nk, self.delta));
                    out.push(perpendic(path[j], nj, self.delta));
                }
                JoinType::Square => self.do_square(path[j], nk, nj, sin_a, cos_a, out),
            }
        }
        *k = j;
    }

    fn do_miter(&self, p: Point64, nk: Vec2, nj: Vec2, r: f64, out: &mut Path64) {
        let q = self.delta / r;
        out.push(Point64::new(
            p.x + round_away((nk.x + nj.x) * q) as i64,
            p.y + round_away((nk.y + nj.y) * q) as i64,
        ));
    }

    fn do_square(&self, p: Point64, nk: Vec2, nj: Vec2, sin_a: f64, cos_a: f64, out: &mut Path64) {
        // Square the corner off one delta beyond the vertex along the
        // half-angle tangent.
        let t = (sin_a.atan2(cos_a) / 4.0).tan();
        out.push(Point64::new(
            p.x + round_away(self.delta * (nk.x - nk.y * t)) as i64,
            p.y + round_away(self.delta * (nk.y + nk.x * t)) as i64,
        ));
        out.push(Point64::new(
            p.x + round_away(self.delta * (nj.x + nj.y * t)) as i64,
            p.y + round_away(self.delta * (nj.y - nj.x * t)) as i64,
        ));
    }

    fn do_round(&self, p: Point64, nk: Vec2, nj: Vec2, sin_a: f64, cos_a: f64, out: &mut Path64) {
        let angle = sin_a.atan2(cos_a);
        let steps = ((self.steps_per_rad * angle.abs()).round() as i64).max(1);
        let mut x = nk.x;
        let mut y = nk.y;
        for _ in 0..steps {
            out.push(Point64::new(
                p.x + round_away(x * self.delta) as i64,
                p.y + round_away(y * self.delta) as i64,
            ));
            let x2 = x;
            x = x * self.step_cos - self.step_sin * y;
            y = x2 * self.step_sin + y * self.step_cos;
        }
        out.push(perpendic(p, nj, self.delta));
    }
}

#[inline]
fn perpendic(p: Point64, n: Vec2, delta: f64) -> Point64 {
    Point64::new(
        p.x + round_away(n.x * delta) as i64,
        p.y + round_away(n.y * delta) as i64,
    )
}

/// Outward unit normal of the directed edge pt1 -> pt2.
fn unit_normal(pt1: Point64, pt2: Point64) -> Vec2 {
    let dx = (pt2.x - pt1.x) as f64;
    let dy = (pt2.y - pt1.y) as f64;
    if dx.abs() < TOLERANCE && dy.abs() < TOLERANCE {
        return Vec2 { x: 0.0, y: 0.0 };
    }
    let f = 1.0 / (dx * dx + dy * dy).sqrt();
    Vec2 {
        x: dy * f,
        y: -dx * f,
    }
}

/// The ring holding the group's bottom-most (then left-most) vertex; its
/// orientation decides the group's reference winding.
fn lowest_path(group: &Paths64) -> &Path64 {
    let mut best = &group[0];
    let mut best_pt = Point64::new(i64::MAX, i64::MIN);
    for path in group {
        for &p in path {
            if p.y > best_pt.y || (p.y == best_pt.y && p.x < best_pt.x) {
                best_pt = p;
                best = path;
            }
        }
    }
    best
}

/// One-call convenience for offsetting closed paths.
pub fn inflate_paths(
    paths: &[Path64],
    delta: f64,
    join_type: JoinType,
    miter_limit: f64,
) -> Result<Paths64> {
    let mut offset = PathOffset::new(miter_limit, DEFAULT_ARC_TOLERANCE);
    offset.add_paths(paths, join_type);
    offset.execute(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{area_paths, pt};

    fn square(x: i64, y: i64, size: i64) -> Path64 {
        vec![
            pt(x, y),
            pt(x + size, y),
            pt(x + size, y + size),
            pt(x, y + size),
        ]
    }

    #[test]
    fn inflate_square_miter() {
        let out = inflate_paths(&[square(0, 0, 100)], 10.0, JoinType::Miter, 2.0).unwrap();
        assert_eq!(out.len(), 1);
        // Miter joins on right angles keep corners sharp: a 120-unit
        // square.
        assert_eq!(area_paths(&out).abs(), 14400.0);
    }

    #[test]
    fn deflate_square() {
        let out = inflate_paths(&[square(0, 0, 100)], -10.0, JoinType::Miter, 2.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(area_paths(&out).abs(), 6400.0);
    }

    #[test]
    fn deflate_past_collapse_returns_empty() {
        let out = inflate_paths(&[square(0, 0, 20)], -15.0, JoinType::Miter, 2.0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn round_join_stays_between_bevel_and_miter() {
        let bevel = inflate_paths(&[square(0, 0, 100)], 10.0, JoinType::Bevel, 2.0).unwrap();
        let round = inflate_paths(&[square(0, 0, 100)], 10.0, JoinType::Round, 2.0).unwrap();
        let miter = inflate_paths(&[square(0, 0, 100)], 10.0, JoinType::Miter, 2.0).unwrap();
        let (ab, ar, am) = (
            area_paths(&bevel).abs(),
            area_paths(&round).abs(),
            area_paths(&miter).abs(),
        );
        assert!(ab < ar, "bevel {ab} < round {ar}");
        assert!(ar < am, "round {ar} < miter {am}");
    }

    #[test]
    fn orientation_is_levelled_per_group() {
        // A reversed ring offsets the same as its forward twin.
        let fwd = inflate_paths(&[square(0, 0, 50)], 5.0, JoinType::Miter, 2.0).unwrap();
        let mut rev_ring = square(0, 0, 50);
        rev_ring.reverse();
        let rev = inflate_paths(&[rev_ring], 5.0, JoinType::Miter, 2.0).unwrap();
        assert_eq!(area_paths(&fwd).abs(), area_paths(&rev).abs());
    }

    #[test]
    fn hole_deflates_when_outer_inflates() {
        // Outer with a hole: inflating by 5 grows the outer and shrinks
        // the hole.
        let outer = square(0, 0, 100);
        let mut hole = square(30, 30, 40);
        hole.reverse();
        let out = inflate_paths(&[outer, hole], 5.0, JoinType::Miter, 2.0).unwrap();
        assert_eq!(out.len(), 2);
        // 110^2 outer minus 30^2 hole.
        assert_eq!(area_paths(&out), 12100.0 - 900.0);
    }
}
