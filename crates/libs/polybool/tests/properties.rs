//! Algebraic properties of the Boolean operations, checked over random
//! rectilinear inputs where every crossing lands exactly on the lattice.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use polybool::core::exact;
use polybool::{
    area_paths, difference, intersect, union, xor, FillRule, Path64, Paths64, Point64,
};

fn pt(x: i64, y: i64) -> Point64 {
    Point64::new(x, y)
}

fn rect(x: i64, y: i64, w: i64, h: i64) -> Path64 {
    vec![pt(x, y), pt(x + w, y), pt(x + w, y + h), pt(x, y + h)]
}

/// Signed winding number of a closed path around a point.
fn winding(p: Point64, path: &[Point64]) -> i64 {
    let mut wn = 0;
    let mut a = path[path.len() - 1];
    for &b in path {
        if a.y != b.y {
            if a.y <= p.y {
                if b.y > p.y && exact::cross_sign(a, b, p) > 0 {
                    wn += 1;
                }
            } else if b.y <= p.y && exact::cross_sign(a, b, p) < 0 {
                wn -= 1;
            }
        }
        a = b;
    }
    wn
}

/// NonZero membership of a point in a set of oriented rings (holes wind
/// opposite to their outers and cancel).
fn covers(paths: &Paths64, p: Point64) -> bool {
    paths.iter().map(|path| winding(p, path)).sum::<i64>() != 0
}

fn on_any_boundary(paths: &Paths64, p: Point64) -> bool {
    paths.iter().any(|path| {
        let mut a = path[path.len() - 1];
        for &b in path.iter() {
            if polybool::core::is_on_segment(p, a, b) {
                return true;
            }
            a = b;
        }
        false
    })
}

/// Measure of the region a path set encloses under NonZero.
fn region_area(paths: &Paths64) -> f64 {
    area_paths(&union(paths, &vec![], FillRule::NonZero).unwrap())
}

fn rect_strategy() -> impl Strategy<Value = Path64> {
    (0i64..200, 0i64..200, 1i64..60, 1i64..60).prop_map(|(x, y, w, h)| rect(x, y, w, h))
}

fn rects(max: usize) -> impl Strategy<Value = Paths64> {
    prop::collection::vec(rect_strategy(), 1..=max)
}

proptest! {
    #[test]
    fn union_and_intersection_with_self_are_identity(s in rects(4)) {
        let normalized = region_area(&s);
        let self_union = area_paths(&union(&s, &s, FillRule::NonZero).unwrap());
        let self_intersection = area_paths(&intersect(&s, &s, FillRule::NonZero).unwrap());
        let minus_nothing = area_paths(&difference(&s, &vec![], FillRule::NonZero).unwrap());
        prop_assert_eq!(self_union, normalized);
        prop_assert_eq!(self_intersection, normalized);
        prop_assert_eq!(minus_nothing, normalized);
    }

    #[test]
    fn area_is_conserved(s in rects(4), c in rects(4)) {
        let a_s = region_area(&s);
        let a_c = region_area(&c);
        let a_union = area_paths(&union(&s, &c, FillRule::NonZero).unwrap());
        let a_inter = area_paths(&intersect(&s, &c, FillRule::NonZero).unwrap());
        prop_assert_eq!(a_s + a_c, a_union + a_inter);
    }

    #[test]
    fn union_is_idempotent(s in rects(4), c in rects(4)) {
        let once = union(&s, &c, FillRule::NonZero).unwrap();
        let twice = union(&once, &vec![], FillRule::NonZero).unwrap();
        prop_assert_eq!(area_paths(&once), area_paths(&twice));
    }

    #[test]
    fn runs_are_deterministic(s in rects(4), c in rects(4)) {
        let a = union(&s, &c, FillRule::NonZero).unwrap();
        let b = union(&s, &c, FillRule::NonZero).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn difference_and_intersection_partition_the_subject(s in rects(3), c in rects(3)) {
        let a_s = region_area(&s);
        let a_diff = area_paths(&difference(&s, &c, FillRule::NonZero).unwrap());
        let a_inter = area_paths(&intersect(&s, &c, FillRule::NonZero).unwrap());
        prop_assert_eq!(a_diff + a_inter, a_s);
    }

    #[test]
    fn xor_with_self_is_empty(s in rect_strategy()) {
        let s = vec![s];
        let out = xor(&s, &s, FillRule::NonZero).unwrap();
        prop_assert_eq!(area_paths(&out), 0.0);
    }

    #[test]
    fn outputs_are_structurally_clean(s in rects(4), c in rects(4)) {
        let out = union(&s, &c, FillRule::NonZero).unwrap();
        for path in &out {
            prop_assert!(path.len() >= 3);
            prop_assert_ne!(exact::area2(path), 0);
            for i in 0..path.len() {
                prop_assert_ne!(path[i], path[(i + 1) % path.len()]);
            }
        }
    }
}

/// Each Boolean operation agrees pointwise with its set definition, which
/// also covers De Morgan: S ∪ C and ¬(¬S ∩ ¬C) must classify every
/// sampled point identically.
#[test]
fn operations_agree_with_pointwise_membership() {
    let mut rng = StdRng::seed_from_u64(0x706f6c79);
    for case in 0..40 {
        let n_s = rng.gen_range(1..4);
        let n_c = rng.gen_range(1..4);
        let mk = |rng: &mut StdRng, n: usize| -> Paths64 {
            (0..n)
                .map(|_| {
                    rect(
                        rng.gen_range(0..150),
                        rng.gen_range(0..150),
                        rng.gen_range(1..50),
                        rng.gen_range(1..50),
                    )
                })
                .collect()
        };
        let s = mk(&mut rng, n_s);
        let c = mk(&mut rng, n_c);

        let u = union(&s, &c, FillRule::NonZero).unwrap();
        let i = intersect(&s, &c, FillRule::NonZero).unwrap();
        let d = difference(&s, &c, FillRule::NonZero).unwrap();
        let x = xor(&s, &c, FillRule::NonZero).unwrap();

        let mut sampled = 0;
        while sampled < 60 {
            let p = pt(rng.gen_range(-10..220), rng.gen_range(-10..220));
            if on_any_boundary(&s, p)
                || on_any_boundary(&c, p)
                || on_any_boundary(&u, p)
                || on_any_boundary(&i, p)
                || on_any_boundary(&d, p)
                || on_any_boundary(&x, p)
            {
                continue;
            }
            sampled += 1;
            let in_s = covers(&s, p);
            let in_c = covers(&c, p);
            assert_eq!(covers(&u, p), in_s || in_c, "union mismatch case {case} at {p}");
            assert_eq!(covers(&i, p), in_s && in_c, "intersection mismatch case {case} at {p}");
            assert_eq!(covers(&d, p), in_s && !in_c, "difference mismatch case {case} at {p}");
            assert_eq!(covers(&x, p), in_s ^ in_c, "xor mismatch case {case} at {p}");
        }
    }
}
