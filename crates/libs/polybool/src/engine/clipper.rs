//! The scanline driver: admits local minima into the active-edge list,
//! detects and processes scanbeam intersections, routes horizontals
//! through their own queue, and assembles output rings from edge events.

use std::collections::BinaryHeap;

use crate::core::{
    check_paths_in_range, segment_intersection, ClipType, FillRule, Path64, Paths64, PathType,
    Point64, SegmentIntersection,
};
use crate::error::{ClipError, Result};
use crate::polytree::{build_polytree, PolyTree64};

use super::fns;
use super::{Active, IntersectNode, LocalMinima, OutPt, OutRec, Vertex, VertexFlags};

/// Boolean clipping engine over 64-bit integer paths.
///
/// Add subject and clip paths, then call [`execute`](Self::execute). The
/// engine may be re-executed with a different operation or fill rule; the
/// admitted paths are kept until [`clear`](Self::clear).
#[derive(Debug)]
pub struct Clipper64 {
    vertices: Vec<Vertex>,
    minima: Vec<LocalMinima>,
    current_lm: usize,

    actives: Vec<Active>,
    ael_first: Option<usize>,
    sel_first: Option<usize>,

    out_pts: Vec<OutPt>,
    out_recs: Vec<OutRec>,
    intersects: Vec<IntersectNode>,
    horz_queue: Vec<usize>,

    scanlines: BinaryHeap<i64>,
    bot_y: i64,

    clip_type: ClipType,
    fill_rule: FillRule,
    succeeded: bool,

    preserve_collinear: bool,
    reverse_solution: bool,
}

impl Default for Clipper64 {
    fn default() -> Self {
        Self::new()
    }
}

///////////////////////////////////////////////////////////////////////////////
// Construction and input
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            minima: Vec::new(),
            current_lm: 0,
            actives: Vec::new(),
            ael_first: None,
            sel_first: None,
            out_pts: Vec::new(),
            out_recs: Vec::new(),
            intersects: Vec::new(),
            horz_queue: Vec::new(),
            scanlines: BinaryHeap::new(),
            bot_y: 0,
            clip_type: ClipType::Union,
            fill_rule: FillRule::NonZero,
            succeeded: true,
            preserve_collinear: false,
            reverse_solution: false,
        }
    }

    /// Keep collinear output vertices instead of stripping them at
    /// emission (spikes are stripped regardless).
    pub fn set_preserve_collinear(&mut self, on: bool) {
        self.preserve_collinear = on;
    }

    /// Emit solution paths with reversed orientation.
    pub fn set_reverse_solution(&mut self, on: bool) {
        self.reverse_solution = on;
    }

    /// Admits closed subject paths.
    pub fn add_subjects(&mut self, paths: &[Path64]) -> Result<()> {
        self.add_paths(paths, PathType::Subject)
    }

    /// Admits closed clip paths.
    pub fn add_clips(&mut self, paths: &[Path64]) -> Result<()> {
        self.add_paths(paths, PathType::Clip)
    }

    /// Drops all admitted paths and run state.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.minima.clear();
        self.clear_run_state();
    }

    fn clear_run_state(&mut self) {
        self.current_lm = 0;
        self.actives.clear();
        self.ael_first = None;
        self.sel_first = None;
        self.out_pts.clear();
        self.out_recs.clear();
        self.intersects.clear();
        self.horz_queue.clear();
        self.scanlines.clear();
        self.succeeded = true;
    }

    fn add_paths(&mut self, paths: &[Path64], path_type: PathType) -> Result<()> {
        check_paths_in_range(paths)?;
        for path in paths {
            self.add_vertex_ring(path, path_type);
        }
        Ok(())
    }

    /// Builds the doubly-linked vertex ring for one closed path and marks
    /// its extrema. Paths with fewer than three distinct points, and
    /// completely flat rings, are dropped silently.
    fn add_vertex_ring(&mut self, path: &[Point64], path_type: PathType) {
        let clean = crate::core::strip_duplicates(path, true);
        if clean.len() < 3 {
            return;
        }
        let y0 = clean[0].y;
        if clean.iter().all(|p| p.y == y0) {
            return;
        }

        let base = self.vertices.len();
        let n = clean.len();
        for (i, &p) in clean.iter().enumerate() {
            self.vertices.push(Vertex {
                pt: p,
                prev: base + (i + n - 1) % n,
                next: base + (i + 1) % n,
                flags: VertexFlags::NONE,
            });
        }

        // Establish the direction of travel into vertex 0, skipping the
        // purely horizontal run that may precede it.
        let v0 = base;
        let mut seed = self.vertices[v0].prev;
        while seed != v0 && self.vertices[seed].pt.y == self.vertices[v0].pt.y {
            seed = self.vertices[seed].prev;
        }
        // Y grows downward: "going up" means y is decreasing.
        let mut going_up = self.vertices[seed].pt.y > self.vertices[v0].pt.y;
        let going_up0 = going_up;

        let mut prev_v = v0;
        let mut curr = self.vertices[v0].next;
        while curr != v0 {
            let cy = self.vertices[curr].pt.y;
            let py = self.vertices[prev_v].pt.y;
            if cy > py && going_up {
                self.vertices[prev_v].flags |= VertexFlags::LOCAL_MAX;
                going_up = false;
            } else if cy < py && !going_up {
                going_up = true;
                self.add_loc_min(prev_v, path_type);
            }
            prev_v = curr;
            curr = self.vertices[curr].next;
        }
        // Close the seam: a direction change across vertex 0 flags the
        // final vertex.
        if going_up != going_up0 {
            if going_up0 {
                self.add_loc_min(prev_v, path_type);
            } else {
                self.vertices[prev_v].flags |= VertexFlags::LOCAL_MAX;
            }
        }
    }

    fn add_loc_min(&mut self, vertex: usize, path_type: PathType) {
        if self.vertices[vertex].flags.contains(VertexFlags::LOCAL_MIN) {
            return;
        }
        self.vertices[vertex].flags |= VertexFlags::LOCAL_MIN;
        self.minima.push(LocalMinima {
            vertex,
            path_type,
            is_open: false,
        });
    }

    /// Structural check of every vertex ring before the sweep starts.
    fn validate_vertex_rings(&self) -> Result<()> {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.next >= self.vertices.len()
                || v.prev >= self.vertices.len()
                || self.vertices[v.next].prev != i
                || self.vertices[v.prev].next != i
            {
                return crate::error::invalid_input("vertex ring links do not close");
            }
        }
        Ok(())
    }
}

///////////////////////////////////////////////////////////////////////////////
// Scan bookkeeping
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    fn fail(&mut self, msg: &'static str) {
        debug_assert!(false, "{msg}");
        log::error!("internal invariant violated: {msg}");
        self.succeeded = false;
    }

    fn reset(&mut self) {
        self.clear_run_state();
        // Drain minima bottom-up: Y descending, then X ascending; the
        // stable sort keeps insertion order for coincident minima.
        let mut minima = std::mem::take(&mut self.minima);
        let vertices = &self.vertices;
        minima.sort_by(|a, b| {
            let (pa, pb) = (vertices[a.vertex].pt, vertices[b.vertex].pt);
            pb.y.cmp(&pa.y).then(pa.x.cmp(&pb.x))
        });
        self.minima = minima;
        for lm in &self.minima {
            self.scanlines.push(self.vertices[lm.vertex].pt.y);
        }
    }

    #[inline]
    fn insert_scanline(&mut self, y: i64) {
        self.scanlines.push(y);
    }

    fn pop_scanline(&mut self) -> Option<i64> {
        let y = self.scanlines.pop()?;
        while self.scanlines.peek() == Some(&y) {
            self.scanlines.pop();
        }
        Some(y)
    }

    #[inline]
    fn has_loc_min_at_y(&self, y: i64) -> bool {
        self.current_lm < self.minima.len()
            && self.vertices[self.minima[self.current_lm].vertex].pt.y == y
    }

    #[inline]
    fn push_horz(&mut self, e: usize) {
        self.horz_queue.push(e);
    }

    #[inline]
    fn pop_horz(&mut self) -> Option<usize> {
        self.horz_queue.pop()
    }
}

///////////////////////////////////////////////////////////////////////////////
// Active-edge list
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    fn insert_left_edge(&mut self, e: usize) {
        match self.ael_first {
            None => {
                self.actives[e].prev_in_ael = None;
                self.actives[e].next_in_ael = None;
                self.ael_first = Some(e);
            }
            Some(first)
                if !fns::is_valid_ael_order(
                    &self.actives[first],
                    &self.actives[e],
                    &self.vertices,
                    &self.minima,
                ) =>
            {
                self.actives[e].prev_in_ael = None;
                self.actives[e].next_in_ael = Some(first);
                self.actives[first].prev_in_ael = Some(e);
                self.ael_first = Some(e);
            }
            Some(first) => {
                let mut cur = first;
                while let Some(n) = self.actives[cur].next_in_ael {
                    if !fns::is_valid_ael_order(
                        &self.actives[n],
                        &self.actives[e],
                        &self.vertices,
                        &self.minima,
                    ) {
                        break;
                    }
                    cur = n;
                }
                let next = self.actives[cur].next_in_ael;
                self.actives[e].next_in_ael = next;
                if let Some(n) = next {
                    self.actives[n].prev_in_ael = Some(e);
                }
                self.actives[e].prev_in_ael = Some(cur);
                self.actives[cur].next_in_ael = Some(e);
            }
        }
    }

    /// Inserts `e2` immediately to the right of `e`.
    fn insert_right_edge(&mut self, e: usize, e2: usize) {
        let next = self.actives[e].next_in_ael;
        self.actives[e2].next_in_ael = next;
        if let Some(n) = next {
            self.actives[n].prev_in_ael = Some(e2);
        }
        self.actives[e2].prev_in_ael = Some(e);
        self.actives[e].next_in_ael = Some(e2);
    }

    /// Swaps two AEL-adjacent edges (either order).
    fn swap_positions_in_ael(&mut self, e1: usize, e2: usize) {
        let (left, right) = if self.actives[e1].next_in_ael == Some(e2) {
            (e1, e2)
        } else if self.actives[e2].next_in_ael == Some(e1) {
            (e2, e1)
        } else {
            self.fail("swap of non-adjacent edges");
            return;
        };
        let next = self.actives[right].next_in_ael;
        if let Some(n) = next {
            self.actives[n].prev_in_ael = Some(left);
        }
        let prev = self.actives[left].prev_in_ael;
        if let Some(p) = prev {
            self.actives[p].next_in_ael = Some(right);
        }
        self.actives[right].prev_in_ael = prev;
        self.actives[right].next_in_ael = Some(left);
        self.actives[left].prev_in_ael = Some(right);
        self.actives[left].next_in_ael = next;
        if prev.is_none() {
            self.ael_first = Some(right);
        }
    }

    fn delete_from_ael(&mut self, e: usize) {
        let prev = self.actives[e].prev_in_ael;
        let next = self.actives[e].next_in_ael;
        match prev {
            Some(p) => self.actives[p].next_in_ael = next,
            None => self.ael_first = next,
        }
        if let Some(n) = next {
            self.actives[n].prev_in_ael = prev;
        }
        self.actives[e].prev_in_ael = None;
        self.actives[e].next_in_ael = None;
    }

    /// Maxima partner of `e`: the other edge terminating at the same top
    /// vertex. Usually to the right; the reverse scan covers a partner an
    /// in-place bound update left earlier in the AEL. Returns the partner
    /// and whether it sits forward of `e`.
    fn get_maxima_pair(&self, e: usize) -> Option<(usize, bool)> {
        let vt = self.actives[e].vertex_top;
        let mut i = self.actives[e].next_in_ael;
        while let Some(n) = i {
            if self.actives[n].vertex_top == vt {
                return Some((n, true));
            }
            i = self.actives[n].next_in_ael;
        }
        let mut i = self.actives[e].prev_in_ael;
        while let Some(p) = i {
            if self.actives[p].vertex_top == vt {
                return Some((p, false));
            }
            i = self.actives[p].prev_in_ael;
        }
        None
    }
}

///////////////////////////////////////////////////////////////////////////////
// Winding calculator
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    /// Computes the winding counts of a freshly admitted closed-path edge
    /// from its nearest same-type neighbour to the left, then accumulates
    /// the opposite type's winding across the edges in between.
    fn set_wind_count_closed(&mut self, e: usize) {
        let kind = fns::poly_type(&self.actives[e], &self.minima);
        let wind_dx = self.actives[e].wind_dx;

        let mut e2 = self.actives[e].prev_in_ael;
        while let Some(i) = e2 {
            if fns::poly_type(&self.actives[i], &self.minima) == kind
                && !fns::is_open(&self.actives[i], &self.minima)
            {
                break;
            }
            e2 = self.actives[i].prev_in_ael;
        }

        let mut iter;
        match e2 {
            None => {
                self.actives[e].wind_count = wind_dx;
                self.actives[e].wind_count2 = 0;
                iter = self.ael_first;
            }
            Some(prev) if self.fill_rule == FillRule::EvenOdd => {
                self.actives[e].wind_count = wind_dx;
                self.actives[e].wind_count2 = self.actives[prev].wind_count2;
                iter = self.actives[prev].next_in_ael;
            }
            Some(prev) => {
                let pw = self.actives[prev].wind_count;
                let pdx = self.actives[prev].wind_dx;
                // When the neighbour's count and direction disagree the
                // new edge starts outside the neighbour's polygon; it may
                // still be inside another.
                let wc = if pw * pdx < 0 {
                    if pw.abs() > 1 {
                        if pdx * wind_dx < 0 {
                            pw
                        } else {
                            pw + wind_dx
                        }
                    } else {
                        wind_dx
                    }
                } else if pdx * wind_dx < 0 {
                    pw
                } else {
                    pw + wind_dx
                };
                self.actives[e].wind_count = wc;
                self.actives[e].wind_count2 = self.actives[prev].wind_count2;
                iter = self.actives[prev].next_in_ael;
            }
        }

        if self.fill_rule == FillRule::EvenOdd {
            while iter != Some(e) {
                let Some(i) = iter else {
                    self.fail("AEL walk passed the admitted edge");
                    return;
                };
                if fns::poly_type(&self.actives[i], &self.minima) != kind
                    && !fns::is_open(&self.actives[i], &self.minima)
                {
                    self.actives[e].wind_count2 = i32::from(self.actives[e].wind_count2 == 0);
                }
                iter = self.actives[i].next_in_ael;
            }
        } else {
            while iter != Some(e) {
                let Some(i) = iter else {
                    self.fail("AEL walk passed the admitted edge");
                    return;
                };
                if fns::poly_type(&self.actives[i], &self.minima) != kind
                    && !fns::is_open(&self.actives[i], &self.minima)
                {
                    self.actives[e].wind_count2 += self.actives[i].wind_dx;
                }
                iter = self.actives[i].next_in_ael;
            }
        }
    }

    /// The fill-rule and clip-type contribution predicate: true when the
    /// region just left of the edge belongs to the Boolean result.
    fn is_contributing_closed(&self, e: usize) -> bool {
        let a = &self.actives[e];
        match self.fill_rule {
            FillRule::Positive => {
                if a.wind_count != 1 {
                    return false;
                }
            }
            FillRule::Negative => {
                if a.wind_count != -1 {
                    return false;
                }
            }
            FillRule::NonZero => {
                if a.wind_count.abs() != 1 {
                    return false;
                }
            }
            FillRule::EvenOdd => {}
        }
        match self.clip_type {
            ClipType::Intersection => match self.fill_rule {
                FillRule::Positive => a.wind_count2 > 0,
                FillRule::Negative => a.wind_count2 < 0,
                _ => a.wind_count2 != 0,
            },
            ClipType::Union => match self.fill_rule {
                FillRule::Positive => a.wind_count2 <= 0,
                FillRule::Negative => a.wind_count2 >= 0,
                _ => a.wind_count2 == 0,
            },
            ClipType::Difference => {
                let outside_other = match self.fill_rule {
                    FillRule::Positive => a.wind_count2 <= 0,
                    FillRule::Negative => a.wind_count2 >= 0,
                    _ => a.wind_count2 == 0,
                };
                (fns::poly_type(a, &self.minima) == PathType::Subject) == outside_other
            }
            ClipType::Xor => true,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Output records
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    fn new_outrec(&mut self) -> usize {
        let idx = self.out_recs.len();
        self.out_recs.push(OutRec {
            idx,
            owner: None,
            front_edge: None,
            back_edge: None,
            pts: None,
        });
        idx
    }

    fn new_out_pt(&mut self, p: Point64) -> usize {
        let idx = self.out_pts.len();
        self.out_pts.push(OutPt {
            pt: p,
            next: idx,
            prev: idx,
        });
        idx
    }

    #[inline]
    fn is_front(&self, e: usize) -> bool {
        self.actives[e]
            .outrec
            .is_some_and(|o| self.out_recs[o].front_edge == Some(e))
    }

    fn prev_hot_edge(&self, e: usize) -> Option<usize> {
        let mut prev = self.actives[e].prev_in_ael;
        while let Some(p) = prev {
            if fns::is_hot(&self.actives[p]) && !fns::is_open(&self.actives[p], &self.minima) {
                return Some(p);
            }
            prev = self.actives[p].prev_in_ael;
        }
        None
    }

    /// Follows the owner chain to the nearest record that still holds a
    /// ring; swallowed records delegate ownership to their survivor.
    fn real_outrec(&self, idx: usize) -> Option<usize> {
        let mut i = Some(idx);
        while let Some(cur) = i {
            if self.out_recs[cur].pts.is_some() {
                return Some(cur);
            }
            i = self.out_recs[cur].owner;
        }
        None
    }

    #[inline]
    fn outrec_is_ascending(&self, e: usize) -> bool {
        self.is_front(e)
    }

    fn set_sides(&mut self, outrec: usize, front: usize, back: usize) {
        self.out_recs[outrec].front_edge = Some(front);
        self.out_recs[outrec].back_edge = Some(back);
    }

    fn swap_outrecs(&mut self, e1: usize, e2: usize) {
        let or1 = self.actives[e1].outrec;
        let or2 = self.actives[e2].outrec;
        if or1 == or2 {
            if let Some(o) = or1 {
                let f = self.out_recs[o].front_edge;
                self.out_recs[o].front_edge = self.out_recs[o].back_edge;
                self.out_recs[o].back_edge = f;
            }
            return;
        }
        if let Some(o) = or1 {
            if self.out_recs[o].front_edge == Some(e1) {
                self.out_recs[o].front_edge = Some(e2);
            } else {
                self.out_recs[o].back_edge = Some(e2);
            }
        }
        if let Some(o) = or2 {
            if self.out_recs[o].front_edge == Some(e2) {
                self.out_recs[o].front_edge = Some(e1);
            } else {
                self.out_recs[o].back_edge = Some(e1);
            }
        }
        self.actives[e1].outrec = or2;
        self.actives[e2].outrec = or1;
    }

    fn uncouple_outrec(&mut self, e: usize) {
        let Some(or) = self.actives[e].outrec else {
            return;
        };
        if let Some(fe) = self.out_recs[or].front_edge {
            self.actives[fe].outrec = None;
        }
        if let Some(be) = self.out_recs[or].back_edge {
            self.actives[be].outrec = None;
        }
        self.out_recs[or].front_edge = None;
        self.out_recs[or].back_edge = None;
    }

    fn swap_front_back_sides(&mut self, outrec: usize) {
        let f = self.out_recs[outrec].front_edge;
        self.out_recs[outrec].front_edge = self.out_recs[outrec].back_edge;
        self.out_recs[outrec].back_edge = f;
        if let Some(p) = self.out_recs[outrec].pts {
            self.out_recs[outrec].pts = Some(self.out_pts[p].next);
        }
    }

    /// Opens a new output record at a contributing local minimum. The
    /// side assignment consults the nearest hot edge to the left so the
    /// emerging ring winds opposite to its enclosing region, which is
    /// what makes holes come out counter-oriented.
    fn add_local_min_poly(&mut self, e1: usize, e2: usize, p: Point64, is_new: bool) {
        let or = self.new_outrec();
        self.actives[e1].outrec = Some(or);
        self.actives[e2].outrec = Some(or);

        match self.prev_hot_edge(e1) {
            Some(ph) => {
                self.out_recs[or].owner =
                    self.actives[ph].outrec.and_then(|o| self.real_outrec(o));
                if self.outrec_is_ascending(ph) == is_new {
                    self.set_sides(or, e2, e1);
                } else {
                    self.set_sides(or, e1, e2);
                }
            }
            None => {
                self.out_recs[or].owner = None;
                if is_new {
                    self.set_sides(or, e1, e2);
                } else {
                    self.set_sides(or, e2, e1);
                }
            }
        }
        let op = self.new_out_pt(p);
        self.out_recs[or].pts = Some(op);
    }

    /// Appends `p` to the hot edge's ring, front or back depending on
    /// which side the edge feeds. A repeat of the point already sitting
    /// at that end is returned rather than inserted; suppressing equal
    /// points elsewhere on the ring would detach `pts` from the side the
    /// front edge feeds, so only the insertion end is consulted.
    fn add_out_pt(&mut self, e: usize, p: Point64) -> usize {
        let Some(or) = self.actives[e].outrec else {
            self.fail("output point emitted on a cold edge");
            return self.new_out_pt(p);
        };
        let Some(front) = self.out_recs[or].pts else {
            self.fail("live output record without a ring");
            return self.new_out_pt(p);
        };
        let to_front = self.out_recs[or].front_edge == Some(e);
        let back = self.out_pts[front].next;

        if to_front && self.out_pts[front].pt == p {
            return front;
        }
        if !to_front && self.out_pts[back].pt == p {
            return back;
        }

        let new_op = self.new_out_pt(p);
        self.out_pts[new_op].prev = front;
        self.out_pts[new_op].next = back;
        self.out_pts[back].prev = new_op;
        self.out_pts[front].next = new_op;
        if to_front {
            self.out_recs[or].pts = Some(new_op);
        }
        new_op
    }

    /// Closes or joins output records when two edges terminate at a
    /// shared maxima vertex.
    fn add_local_max_poly(&mut self, e1: usize, e2: usize, p: Point64) {
        if self.is_front(e1) == self.is_front(e2) {
            if fns::is_open_end(&self.actives[e1], &self.vertices) {
                if let Some(o) = self.actives[e1].outrec {
                    self.swap_front_back_sides(o);
                }
            } else if fns::is_open_end(&self.actives[e2], &self.vertices) {
                if let Some(o) = self.actives[e2].outrec {
                    self.swap_front_back_sides(o);
                }
            } else {
                self.fail("maxima pair feeds the same ring side");
                return;
            }
        }

        let result = self.add_out_pt(e1, p);
        let or1 = self.actives[e1].outrec;
        let or2 = self.actives[e2].outrec;
        if or1 == or2 {
            // The ring has closed on itself.
            let Some(or) = or1 else {
                self.fail("maxima event on cold edges");
                return;
            };
            self.out_recs[or].pts = Some(result);
            let owner = self
                .prev_hot_edge(e1)
                .and_then(|h| self.actives[h].outrec)
                .and_then(|o| self.real_outrec(o));
            self.out_recs[or].owner = owner;
            self.uncouple_outrec(e1);
        } else {
            let (Some(a), Some(b)) = (or1, or2) else {
                self.fail("maxima join with a cold edge");
                return;
            };
            if self.out_recs[a].idx < self.out_recs[b].idx {
                self.join_outrec_paths(e1, e2);
            } else {
                self.join_outrec_paths(e2, e1);
            }
        }
    }

    /// Splices e2's ring onto e1's, producing one continuous boundary,
    /// and marks e2's record dead.
    fn join_outrec_paths(&mut self, e1: usize, e2: usize) {
        let (Some(or1), Some(or2)) = (self.actives[e1].outrec, self.actives[e2].outrec) else {
            self.fail("ring join on cold edges");
            return;
        };
        let (Some(p1_start), Some(p2_start)) = (self.out_recs[or1].pts, self.out_recs[or2].pts)
        else {
            self.fail("ring join on a dead record");
            return;
        };
        let p1_end = self.out_pts[p1_start].next;
        let p2_end = self.out_pts[p2_start].next;

        if self.is_front(e1) {
            self.out_pts[p2_end].prev = p1_start;
            self.out_pts[p1_start].next = p2_end;
            self.out_pts[p2_start].next = p1_end;
            self.out_pts[p1_end].prev = p2_start;
            self.out_recs[or1].pts = Some(p2_start);
            self.out_recs[or1].front_edge = self.out_recs[or2].front_edge;
            if let Some(fe) = self.out_recs[or1].front_edge {
                self.actives[fe].outrec = Some(or1);
            }
        } else {
            self.out_pts[p1_end].prev = p2_start;
            self.out_pts[p2_start].next = p1_end;
            self.out_pts[p1_start].next = p2_end;
            self.out_pts[p2_end].prev = p1_start;
            self.out_recs[or1].back_edge = self.out_recs[or2].back_edge;
            if let Some(be) = self.out_recs[or1].back_edge {
                self.actives[be].outrec = Some(or1);
            }
        }

        self.out_recs[or2].front_edge = None;
        self.out_recs[or2].back_edge = None;
        self.out_recs[or2].pts = None;
        self.out_recs[or2].owner = Some(or1);

        self.actives[e1].outrec = None;
        self.actives[e2].outrec = None;
    }
}

///////////////////////////////////////////////////////////////////////////////
// Edge intersection events
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    /// Handles the meeting of two adjacent edges at `p`: winding counts
    /// move between them, and hot/cold transitions open, extend, close or
    /// swap output records. `e1` must be left of `e2`.
    fn intersect_edges(&mut self, e1: usize, e2: usize, p: Point64) {
        let same_type = fns::is_same_poly_type(&self.actives[e1], &self.actives[e2], &self.minima);

        if same_type {
            if self.fill_rule == FillRule::EvenOdd {
                let w = self.actives[e1].wind_count;
                self.actives[e1].wind_count = self.actives[e2].wind_count;
                self.actives[e2].wind_count = w;
            } else {
                let d2 = self.actives[e2].wind_dx;
                let d1 = self.actives[e1].wind_dx;
                if self.actives[e1].wind_count + d2 == 0 {
                    self.actives[e1].wind_count = -self.actives[e1].wind_count;
                } else {
                    self.actives[e1].wind_count += d2;
                }
                if self.actives[e2].wind_count - d1 == 0 {
                    self.actives[e2].wind_count = -self.actives[e2].wind_count;
                } else {
                    self.actives[e2].wind_count -= d1;
                }
            }
        } else if self.fill_rule != FillRule::EvenOdd {
            self.actives[e1].wind_count2 += self.actives[e2].wind_dx;
            self.actives[e2].wind_count2 -= self.actives[e1].wind_dx;
        } else {
            self.actives[e1].wind_count2 = i32::from(self.actives[e1].wind_count2 == 0);
            self.actives[e2].wind_count2 = i32::from(self.actives[e2].wind_count2 == 0);
        }

        let (e1_wc, e2_wc) = match self.fill_rule {
            FillRule::Positive => (self.actives[e1].wind_count, self.actives[e2].wind_count),
            FillRule::Negative => (-self.actives[e1].wind_count, -self.actives[e2].wind_count),
            _ => (
                self.actives[e1].wind_count.abs(),
                self.actives[e2].wind_count.abs(),
            ),
        };
        let e1_hot = fns::is_hot(&self.actives[e1]);
        let e2_hot = fns::is_hot(&self.actives[e2]);
        if (!e1_hot && !(e1_wc == 0 || e1_wc == 1)) || (!e2_hot && !(e2_wc == 0 || e2_wc == 1)) {
            return;
        }

        if e1_hot && e2_hot {
            if (e1_wc != 0 && e1_wc != 1)
                || (e2_wc != 0 && e2_wc != 1)
                || (!same_type && self.clip_type != ClipType::Xor)
            {
                self.add_local_max_poly(e1, e2, p);
            } else if self.is_front(e1) || self.actives[e1].outrec == self.actives[e2].outrec {
                // Rings that only touch at a vertex are split here and
                // restarted, rather than carried on as one boundary.
                self.add_local_max_poly(e1, e2, p);
                self.add_local_min_poly(e1, e2, p, false);
            } else {
                self.add_out_pt(e1, p);
                self.add_out_pt(e2, p);
                self.swap_outrecs(e1, e2);
            }
        } else if e1_hot {
            self.add_out_pt(e1, p);
            self.swap_outrecs(e1, e2);
        } else if e2_hot {
            self.add_out_pt(e2, p);
            self.swap_outrecs(e1, e2);
        } else {
            // Neither edge contributes yet; a region boundary may start
            // here.
            let (e1_wc2, e2_wc2) = match self.fill_rule {
                FillRule::Positive => (self.actives[e1].wind_count2, self.actives[e2].wind_count2),
                FillRule::Negative => {
                    (-self.actives[e1].wind_count2, -self.actives[e2].wind_count2)
                }
                _ => (
                    self.actives[e1].wind_count2.abs(),
                    self.actives[e2].wind_count2.abs(),
                ),
            };
            if !same_type {
                self.add_local_min_poly(e1, e2, p, false);
            } else if e1_wc == 1 && e2_wc == 1 {
                match self.clip_type {
                    ClipType::Union => {
                        if e1_wc2 <= 0 || e2_wc2 <= 0 {
                            self.add_local_min_poly(e1, e2, p, false);
                        }
                    }
                    ClipType::Difference => {
                        let ty = fns::poly_type(&self.actives[e1], &self.minima);
                        if (ty == PathType::Clip && e1_wc2 > 0 && e2_wc2 > 0)
                            || (ty == PathType::Subject && e1_wc2 <= 0 && e2_wc2 <= 0)
                        {
                            self.add_local_min_poly(e1, e2, p, false);
                        }
                    }
                    ClipType::Xor => self.add_local_min_poly(e1, e2, p, false),
                    ClipType::Intersection => {
                        if e1_wc2 > 0 && e2_wc2 > 0 {
                            self.add_local_min_poly(e1, e2, p, false);
                        }
                    }
                }
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Local minima admission
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    fn insert_local_minima_into_ael(&mut self, bot_y: i64) {
        while self.has_loc_min_at_y(bot_y) {
            let lm = self.current_lm;
            self.current_lm += 1;
            let vix = self.minima[lm].vertex;
            let vpt = self.vertices[vix].pt;

            // The descending bound runs toward vertex.prev, the ascending
            // one toward vertex.next; which of them is the left bound
            // falls out of their slopes.
            let vprev = self.vertices[vix].prev;
            let vnext = self.vertices[vix].next;
            let mut left = Active {
                bot: vpt,
                top: self.vertices[vprev].pt,
                curr_x: vpt.x,
                dx: 0.0,
                wind_dx: -1,
                wind_count: 0,
                wind_count2: 0,
                outrec: None,
                prev_in_ael: None,
                next_in_ael: None,
                prev_in_sel: None,
                next_in_sel: None,
                jump: None,
                vertex_top: vprev,
                local_min: lm,
                is_left_bound: false,
            };
            fns::set_dx(&mut left);
            let mut right = Active {
                bot: vpt,
                top: self.vertices[vnext].pt,
                curr_x: vpt.x,
                dx: 0.0,
                wind_dx: 1,
                wind_count: 0,
                wind_count2: 0,
                outrec: None,
                prev_in_ael: None,
                next_in_ael: None,
                prev_in_sel: None,
                next_in_sel: None,
                jump: None,
                vertex_top: vnext,
                local_min: lm,
                is_left_bound: false,
            };
            fns::set_dx(&mut right);

            let swap = if fns::is_horizontal(&left) {
                fns::is_heading_right_horz(&left)
            } else if fns::is_horizontal(&right) {
                fns::is_heading_left_horz(&right)
            } else {
                left.dx < right.dx
            };
            if swap {
                std::mem::swap(&mut left, &mut right);
            }
            left.is_left_bound = true;

            let li = self.actives.len();
            self.actives.push(left);
            let ri = self.actives.len();
            self.actives.push(right);

            self.insert_left_edge(li);
            self.set_wind_count_closed(li);
            let contributing = self.is_contributing_closed(li);

            self.actives[ri].wind_count = self.actives[li].wind_count;
            self.actives[ri].wind_count2 = self.actives[li].wind_count2;
            self.insert_right_edge(li, ri);
            if contributing {
                let b = self.actives[li].bot;
                self.add_local_min_poly(li, ri, b, true);
            }

            // A new minimum can interleave with an established edge fan:
            // bubble the right bound rightward past residents it is out
            // of order with, running the full intersection protocol at
            // each swap.
            while let Some(n) = self.actives[ri].next_in_ael {
                if !fns::is_valid_ael_order(
                    &self.actives[n],
                    &self.actives[ri],
                    &self.vertices,
                    &self.minima,
                ) {
                    break;
                }
                let b = self.actives[ri].bot;
                self.intersect_edges(ri, n, b);
                self.swap_positions_in_ael(ri, n);
                if !self.succeeded {
                    return;
                }
            }

            if fns::is_horizontal(&self.actives[ri]) {
                self.push_horz(ri);
            } else {
                let ty = self.actives[ri].top.y;
                self.insert_scanline(ty);
            }
            if fns::is_horizontal(&self.actives[li]) {
                self.push_horz(li);
            } else {
                let ty = self.actives[li].top.y;
                self.insert_scanline(ty);
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Scanbeam intersections
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    fn do_intersections(&mut self, top_y: i64) {
        if self.build_intersect_list(top_y) {
            self.process_intersect_list();
        }
        self.intersects.clear();
    }

    fn adjust_curr_x_and_copy_to_sel(&mut self, top_y: i64) {
        self.sel_first = self.ael_first;
        let mut ae = self.ael_first;
        while let Some(i) = ae {
            let cx = fns::top_x(&self.actives[i], top_y);
            let a = &mut self.actives[i];
            a.prev_in_sel = a.prev_in_ael;
            a.next_in_sel = a.next_in_ael;
            a.jump = a.next_in_sel;
            a.curr_x = cx;
            ae = a.next_in_ael;
        }
    }

    fn extract_from_sel(&mut self, e: usize) -> Option<usize> {
        let next = self.actives[e].next_in_sel;
        if let Some(n) = next {
            self.actives[n].prev_in_sel = self.actives[e].prev_in_sel;
        }
        if let Some(p) = self.actives[e].prev_in_sel {
            self.actives[p].next_in_sel = next;
        }
        self.actives[e].prev_in_sel = None;
        self.actives[e].next_in_sel = None;
        next
    }

    fn insert1_before2_in_sel(&mut self, e1: usize, e2: usize) {
        let prev = self.actives[e2].prev_in_sel;
        self.actives[e1].prev_in_sel = prev;
        if let Some(p) = prev {
            self.actives[p].next_in_sel = Some(e1);
        } else {
            self.sel_first = Some(e1);
        }
        self.actives[e1].next_in_sel = Some(e2);
        self.actives[e2].prev_in_sel = Some(e1);
    }

    fn add_new_intersect_node(&mut self, e1: usize, e2: usize, top_y: i64) {
        let (b1, t1) = (self.actives[e1].bot, self.actives[e1].top);
        let (b2, t2) = (self.actives[e2].bot, self.actives[e2].top);
        let mut ip = match segment_intersection(b1, t1, b2, t2) {
            SegmentIntersection::Point(p) => p,
            _ => Point64::new(self.actives[e1].curr_x, top_y),
        };
        if ip.y > self.bot_y || ip.y < top_y {
            // Rounding pushed the point outside the scanbeam: clamp Y to
            // the nearer boundary and take X from the edge whose X moves
            // least per unit of Y.
            let y = if ip.y < top_y { top_y } else { self.bot_y };
            let x = if self.actives[e1].dx.abs() < self.actives[e2].dx.abs() {
                fns::top_x(&self.actives[e1], y)
            } else {
                fns::top_x(&self.actives[e2], y)
            };
            ip = Point64::new(x, y);
        }
        self.intersects.push(IntersectNode {
            pt: ip,
            edge1: e1,
            edge2: e2,
        });
    }

    /// Merge-sorts the SEL by X-at-top-of-scanbeam; every out-of-order
    /// pair discovered while merging is an edge crossing inside the
    /// scanbeam and is recorded for processing.
    fn build_intersect_list(&mut self, top_y: i64) -> bool {
        let Some(first) = self.ael_first else {
            return false;
        };
        if self.actives[first].next_in_ael.is_none() {
            return false;
        }
        self.adjust_curr_x_and_copy_to_sel(top_y);

        let mut left = self.sel_first;
        while left.is_some_and(|l| self.actives[l].jump.is_some()) {
            let mut prev_base: Option<usize> = None;
            while let Some(l) = left {
                let Some(r0) = self.actives[l].jump else {
                    break;
                };
                let mut curr_base = l;
                let r_end = self.actives[r0].jump;
                self.actives[l].jump = r_end;

                let mut left_i = Some(l);
                let mut right_i = Some(r0);
                let mut l_end = Some(r0);
                while left_i != l_end && right_i != r_end {
                    let (Some(li), Some(ri)) = (left_i, right_i) else {
                        self.fail("SEL merge ran past a partition");
                        return false;
                    };
                    if self.actives[ri].curr_x < self.actives[li].curr_x {
                        // `ri` has crossed every left-partition edge
                        // between here and `li` since the scanbeam
                        // bottom.
                        let Some(mut tmp) = self.actives[ri].prev_in_sel else {
                            self.fail("SEL node lost its left neighbour");
                            return false;
                        };
                        loop {
                            self.add_new_intersect_node(tmp, ri, top_y);
                            if tmp == li {
                                break;
                            }
                            let Some(t) = self.actives[tmp].prev_in_sel else {
                                self.fail("SEL walk fell off the partition");
                                return false;
                            };
                            tmp = t;
                        }
                        right_i = self.extract_from_sel(ri);
                        l_end = right_i;
                        self.insert1_before2_in_sel(ri, li);
                        if left_i == Some(curr_base) {
                            curr_base = ri;
                            self.actives[curr_base].jump = r_end;
                            match prev_base {
                                None => self.sel_first = Some(curr_base),
                                Some(pb) => self.actives[pb].jump = Some(curr_base),
                            }
                        }
                    } else {
                        left_i = self.actives[li].next_in_sel;
                    }
                }
                prev_base = Some(curr_base);
                left = r_end;
            }
            left = self.sel_first;
        }
        !self.intersects.is_empty()
    }

    #[inline]
    fn edges_adjacent(&self, node: IntersectNode) -> bool {
        self.actives[node.edge1].next_in_ael == Some(node.edge2)
            || self.actives[node.edge1].prev_in_ael == Some(node.edge2)
    }

    /// Replays the recorded crossings bottom-up. A crossing whose edges
    /// are not currently adjacent swaps places with a later one whose
    /// edges are, which reorders the events without changing the final
    /// edge configuration.
    fn process_intersect_list(&mut self) {
        self.intersects.sort_by(fns::intersect_node_order);
        for i in 0..self.intersects.len() {
            if !self.edges_adjacent(self.intersects[i]) {
                let mut j = i + 1;
                loop {
                    if j >= self.intersects.len() {
                        self.fail("no adjacent-edge crossing left to process");
                        return;
                    }
                    if self.edges_adjacent(self.intersects[j]) {
                        break;
                    }
                    j += 1;
                }
                self.intersects.swap(i, j);
            }
            let node = self.intersects[i];
            self.intersect_edges(node.edge1, node.edge2, node.pt);
            self.swap_positions_in_ael(node.edge1, node.edge2);
            self.actives[node.edge1].curr_x = node.pt.x;
            self.actives[node.edge2].curr_x = node.pt.x;
            if !self.succeeded {
                return;
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Horizontal edges
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    /// Shortens a horizontal whose bound continues through further
    /// vertices at the same Y, always removing 180-degree spikes and,
    /// unless collinear points are preserved, same-direction joints.
    fn trim_horz(&mut self, e: usize, preserve_collinear: bool) {
        let mut trimmed = false;
        let mut nv = fns::next_vertex(&self.actives[e], &self.vertices);
        let mut p = self.vertices[nv].pt;
        while p.y == self.actives[e].top.y {
            if preserve_collinear
                && (p.x < self.actives[e].top.x) != (self.actives[e].bot.x < self.actives[e].top.x)
            {
                break;
            }
            self.actives[e].vertex_top = nv;
            self.actives[e].top = p;
            trimmed = true;
            if fns::is_maxima(&self.actives[e], &self.vertices) {
                break;
            }
            nv = fns::next_vertex(&self.actives[e], &self.vertices);
            p = self.vertices[nv].pt;
        }
        if trimmed {
            fns::set_dx(&mut self.actives[e]);
        }
    }

    /// Travel direction and X extent of the horizontal. A zero-length
    /// horizontal inherits the direction that leads toward its maxima
    /// partner.
    fn reset_horz_direction(&mut self, e: usize, vertex_max: Option<usize>) -> (bool, i64, i64) {
        if self.actives[e].bot.x == self.actives[e].top.x {
            let cx = self.actives[e].curr_x;
            let mut ae = self.actives[e].next_in_ael;
            while let Some(a) = ae {
                if vertex_max == Some(self.actives[a].vertex_top) {
                    break;
                }
                ae = self.actives[a].next_in_ael;
            }
            (ae.is_some(), cx, cx)
        } else if self.actives[e].curr_x < self.actives[e].top.x {
            (true, self.actives[e].curr_x, self.actives[e].top.x)
        } else {
            (false, self.actives[e].top.x, self.actives[e].curr_x)
        }
    }

    /// Processes one horizontal edge at the current scanline, walking the
    /// AEL in its travel direction. Consecutive horizontal segments of
    /// the same bound are advanced in place, never re-queued; re-queueing
    /// would loop forever.
    fn do_horizontal(&mut self, horz: usize) {
        let y = self.actives[horz].bot.y;
        let vertex_max = fns::curr_y_maxima_vertex(&self.actives[horz], &self.vertices);

        if let Some(vm) = vertex_max {
            if vm != self.actives[horz].vertex_top {
                self.trim_horz(horz, self.preserve_collinear);
            }
        }

        let (mut is_left_to_right, mut left_x, mut right_x) =
            self.reset_horz_direction(horz, vertex_max);

        if fns::is_hot(&self.actives[horz]) {
            let cx = self.actives[horz].curr_x;
            self.add_out_pt(horz, Point64::new(cx, y));
        }

        loop {
            let mut ae = if is_left_to_right {
                self.actives[horz].next_in_ael
            } else {
                self.actives[horz].prev_in_ael
            };
            while let Some(a) = ae {
                if vertex_max == Some(self.actives[a].vertex_top) {
                    // The horizontal ends against its maxima partner.
                    if fns::is_hot(&self.actives[horz]) {
                        while self.actives[horz].vertex_top != self.actives[a].vertex_top {
                            let t = self.actives[horz].top;
                            self.add_out_pt(horz, t);
                            self.update_edge_into_ael(horz);
                        }
                        let t = self.actives[horz].top;
                        if is_left_to_right {
                            self.add_local_max_poly(horz, a, t);
                        } else {
                            self.add_local_max_poly(a, horz, t);
                        }
                    }
                    self.delete_from_ael(a);
                    self.delete_from_ael(horz);
                    return;
                }

                if vertex_max != Some(self.actives[horz].vertex_top) {
                    // Stop once past the end of this horizontal segment.
                    let acx = self.actives[a].curr_x;
                    if (is_left_to_right && acx > right_x) || (!is_left_to_right && acx < left_x) {
                        break;
                    }
                    if acx == self.actives[horz].top.x && !fns::is_horizontal(&self.actives[a]) {
                        // At the shared end, only pass edges that slope
                        // back across the horizontal's continuation.
                        let nv = fns::next_vertex(&self.actives[horz], &self.vertices);
                        let npt = self.vertices[nv].pt;
                        let ax = fns::top_x(&self.actives[a], npt.y);
                        if (is_left_to_right && ax >= right_x) || (!is_left_to_right && ax <= left_x)
                        {
                            break;
                        }
                    }
                }

                let p = Point64::new(self.actives[a].curr_x, y);
                if is_left_to_right {
                    self.intersect_edges(horz, a, p);
                    self.swap_positions_in_ael(horz, a);
                    self.actives[horz].curr_x = self.actives[a].curr_x;
                    ae = self.actives[horz].next_in_ael;
                } else {
                    self.intersect_edges(a, horz, p);
                    self.swap_positions_in_ael(a, horz);
                    self.actives[horz].curr_x = self.actives[a].curr_x;
                    ae = self.actives[horz].prev_in_ael;
                }
                if !self.succeeded {
                    return;
                }
            }

            // End of this horizontal segment; continue along any further
            // horizontals of the same bound at this Y.
            let nv = fns::next_vertex(&self.actives[horz], &self.vertices);
            if self.vertices[nv].pt.y != self.actives[horz].top.y {
                break;
            }
            if fns::is_hot(&self.actives[horz]) {
                let t = self.actives[horz].top;
                self.add_out_pt(horz, t);
            }
            self.update_edge_into_ael(horz);
            let r = self.reset_horz_direction(horz, vertex_max);
            is_left_to_right = r.0;
            left_x = r.1;
            right_x = r.2;
        }

        if vertex_max == Some(self.actives[horz].vertex_top) {
            // The travel-direction walk missed the maxima partner; on
            // coincident-X ties it can sit on the other side, so rescan
            // before giving up.
            if let Some((pair, forward)) = self.get_maxima_pair(horz) {
                if fns::is_hot(&self.actives[horz]) {
                    let t = self.actives[horz].top;
                    if forward {
                        self.add_local_max_poly(horz, pair, t);
                    } else {
                        self.add_local_max_poly(pair, horz, t);
                    }
                }
                self.delete_from_ael(pair);
                self.delete_from_ael(horz);
            } else {
                self.fail("maxima partner missing for a horizontal");
            }
            return;
        }

        // An intermediate horizontal: the bound turns away from this Y.
        if fns::is_hot(&self.actives[horz]) {
            let t = self.actives[horz].top;
            self.add_out_pt(horz, t);
        }
        self.update_edge_into_ael(horz);
    }
}

///////////////////////////////////////////////////////////////////////////////
// Top of scanbeam
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    /// Advances the bound past its top vertex; the edge stays in place in
    /// the AEL. A newly horizontal edge is left for the caller to queue.
    fn update_edge_into_ael(&mut self, e: usize) {
        let vt = fns::next_vertex(&self.actives[e], &self.vertices);
        let top = self.actives[e].top;
        self.actives[e].bot = top;
        self.actives[e].vertex_top = vt;
        self.actives[e].top = self.vertices[vt].pt;
        self.actives[e].curr_x = top.x;
        fns::set_dx(&mut self.actives[e]);
        if fns::is_horizontal(&self.actives[e]) {
            self.trim_horz(e, self.preserve_collinear);
            return;
        }
        let ty = self.actives[e].top.y;
        self.insert_scanline(ty);
    }

    fn do_top_of_scanbeam(&mut self, y: i64) {
        let mut ae = self.ael_first;
        while let Some(i) = ae {
            if self.actives[i].top.y == y {
                self.actives[i].curr_x = self.actives[i].top.x;
                if fns::is_maxima(&self.actives[i], &self.vertices) {
                    ae = self.do_maxima(i);
                    continue;
                }
                // An intermediate vertex.
                if fns::is_hot(&self.actives[i]) {
                    let t = self.actives[i].top;
                    self.add_out_pt(i, t);
                }
                self.update_edge_into_ael(i);
                if fns::is_horizontal(&self.actives[i]) {
                    self.push_horz(i);
                }
            } else {
                let cx = fns::top_x(&self.actives[i], y);
                self.actives[i].curr_x = cx;
            }
            ae = self.actives[i].next_in_ael;
        }
    }

    /// Terminates a bound pair at a shared maxima vertex, first swapping
    /// any unrelated edges out from between the pair. Returns the edge
    /// the AEL walk should continue from.
    fn do_maxima(&mut self, e: usize) -> Option<usize> {
        let prev_e = self.actives[e].prev_in_ael;
        let next_e = self.actives[e].next_in_ael;
        let Some((max_pair, forward)) = self.get_maxima_pair(e) else {
            // The partner is horizontal and still pending.
            return next_e;
        };
        if !forward {
            if fns::is_horizontal(&self.actives[max_pair]) {
                // A queued horizontal partner closes the pair during its
                // own pass.
                return next_e;
            }
            // The partner ended up left of this edge; process from there
            // so the in-between sweep runs left to right.
            return self.do_maxima(max_pair);
        }

        let mut between = next_e;
        while between != Some(max_pair) {
            let Some(n) = between else {
                self.fail("maxima partner vanished from the AEL");
                return None;
            };
            let top = self.actives[e].top;
            self.intersect_edges(e, n, top);
            self.swap_positions_in_ael(e, n);
            if !self.succeeded {
                return None;
            }
            between = self.actives[e].next_in_ael;
        }

        if fns::is_hot(&self.actives[e]) {
            let top = self.actives[e].top;
            self.add_local_max_poly(e, max_pair, top);
        }
        self.delete_from_ael(e);
        self.delete_from_ael(max_pair);
        match prev_e {
            Some(p) => self.actives[p].next_in_ael,
            None => self.ael_first,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Execution
///////////////////////////////////////////////////////////////////////////////

impl Clipper64 {
    /// Runs the Boolean operation and returns the closed solution paths.
    pub fn execute(&mut self, clip_type: ClipType, fill_rule: FillRule) -> Result<Paths64> {
        self.validate_vertex_rings()?;
        self.execute_internal(clip_type, fill_rule)?;
        let solution = self.build_paths();
        log::debug!(
            "{:?}/{:?}: {} minima -> {} paths",
            clip_type,
            fill_rule,
            self.minima.len(),
            solution.len()
        );
        Ok(solution)
    }

    /// Runs the Boolean operation and arranges the result as a polygon
    /// tree with holes at odd depths.
    pub fn execute_tree(&mut self, clip_type: ClipType, fill_rule: FillRule) -> Result<PolyTree64> {
        let solution = self.execute(clip_type, fill_rule)?;
        Ok(build_polytree(&solution))
    }

    fn execute_internal(&mut self, clip_type: ClipType, fill_rule: FillRule) -> Result<()> {
        self.reset();
        self.clip_type = clip_type;
        self.fill_rule = fill_rule;

        let Some(mut y) = self.pop_scanline() else {
            return Ok(());
        };
        while self.succeeded {
            log::trace!("scanline y={y}");
            self.insert_local_minima_into_ael(y);
            while let Some(h) = self.pop_horz() {
                self.do_horizontal(h);
            }
            self.debug_check_ael_order();
            self.bot_y = y;
            let Some(top_y) = self.pop_scanline() else {
                break;
            };
            self.do_intersections(top_y);
            self.do_top_of_scanbeam(top_y);
            while let Some(h) = self.pop_horz() {
                self.do_horizontal(h);
            }
            y = top_y;
        }
        if self.succeeded {
            Ok(())
        } else {
            Err(ClipError::InternalError(
                "scanline state diverged; output abandoned",
            ))
        }
    }

    fn build_paths(&self) -> Paths64 {
        let mut solution = Vec::with_capacity(self.out_recs.len());
        for rec in &self.out_recs {
            let Some(start) = rec.pts else { continue };
            if !fns::ring_is_valid(start, &self.out_pts, self.out_pts.len() + 1) {
                log::error!("skipping an output ring with broken links");
                continue;
            }
            if let Some(path) = fns::build_path(
                start,
                &self.out_pts,
                self.reverse_solution,
                self.preserve_collinear,
            ) {
                log::trace!(
                    "record {}: ring of {} points -> path of {}",
                    rec.idx,
                    fns::ring_len(start, &self.out_pts),
                    path.len()
                );
                solution.push(path);
            }
        }
        solution
    }

    /// At the bottom of a scanbeam the AEL must be sorted by current X,
    /// and under NonZero the per-type winding counts step by at most one
    /// from edge to edge.
    fn debug_check_ael_order(&mut self) {
        #[cfg(debug_assertions)]
        {
            let mut last_wc: [Option<i32>; 2] = [None, None];
            let mut ae = self.ael_first;
            while let Some(i) = ae {
                if let Some(n) = self.actives[i].next_in_ael {
                    debug_assert!(
                        self.actives[i].curr_x <= self.actives[n].curr_x,
                        "AEL out of order at x={} > x={}",
                        self.actives[i].curr_x,
                        self.actives[n].curr_x
                    );
                }
                if self.fill_rule == FillRule::NonZero {
                    let slot = match fns::poly_type(&self.actives[i], &self.minima) {
                        PathType::Subject => 0,
                        PathType::Clip => 1,
                    };
                    let wc = self.actives[i].wind_count;
                    if let Some(prev) = last_wc[slot] {
                        debug_assert!(
                            (wc.abs() - prev.abs()).abs() <= 1,
                            "winding count jumped from {prev} to {wc}"
                        );
                    }
                    last_wc[slot] = Some(wc);
                }
                ae = self.actives[i].next_in_ael;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pt;

    fn square(x: i64, y: i64, size: i64) -> Path64 {
        vec![
            pt(x, y),
            pt(x + size, y),
            pt(x + size, y + size),
            pt(x, y + size),
        ]
    }

    #[test]
    fn vertex_ring_extrema_square() {
        let mut c = Clipper64::new();
        c.add_subjects(&[square(0, 0, 10)]).unwrap();
        assert_eq!(c.minima.len(), 1);
        let min_v = c.minima[0].vertex;
        assert!(c.vertices[min_v].flags.contains(VertexFlags::LOCAL_MIN));
        let max_count = c
            .vertices
            .iter()
            .filter(|v| v.flags.contains(VertexFlags::LOCAL_MAX))
            .count();
        assert_eq!(max_count, 1);
    }

    #[test]
    fn vertex_ring_extrema_zigzag() {
        // A W-shaped ring has two local minima and two local maxima.
        let zigzag = vec![pt(0, 0), pt(4, 8), pt(8, 2), pt(12, 8), pt(16, 0), pt(8, 14)];
        let mut c = Clipper64::new();
        c.add_subjects(&[zigzag]).unwrap();
        assert_eq!(c.minima.len(), 2);
        let max_count = c
            .vertices
            .iter()
            .filter(|v| v.flags.contains(VertexFlags::LOCAL_MAX))
            .count();
        assert_eq!(max_count, 2);
    }

    #[test]
    fn degenerate_inputs_are_dropped() {
        let mut c = Clipper64::new();
        c.add_subjects(&[
            vec![],
            vec![pt(0, 0)],
            vec![pt(0, 0), pt(5, 5)],
            vec![pt(0, 0), pt(5, 0), pt(9, 0)], // flat
            vec![pt(1, 1), pt(1, 1), pt(1, 1), pt(1, 1)],
        ])
        .unwrap();
        assert!(c.minima.is_empty());
        let out = c.execute(ClipType::Union, FillRule::NonZero).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        let mut c = Clipper64::new();
        let bad = vec![pt(0, 0), pt(2_000_000_000_000_000_000, 0), pt(0, 5)];
        assert!(matches!(
            c.add_subjects(&[bad]),
            Err(ClipError::CoordinateOutOfRange)
        ));
    }

    #[test]
    fn single_square_roundtrip() {
        let mut c = Clipper64::new();
        c.add_subjects(&[square(0, 0, 10)]).unwrap();
        let out = c.execute(ClipType::Union, FillRule::NonZero).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(crate::core::area(&out[0]).abs(), 100.0);
    }

    #[test]
    fn engine_reexecution_is_stable() {
        let mut c = Clipper64::new();
        c.add_subjects(&[square(0, 0, 10)]).unwrap();
        c.add_clips(&[square(5, 5, 10)]).unwrap();
        let first = c.execute(ClipType::Intersection, FillRule::NonZero).unwrap();
        let second = c.execute(ClipType::Intersection, FillRule::NonZero).unwrap();
        assert_eq!(first, second);
        let union = c.execute(ClipType::Union, FillRule::NonZero).unwrap();
        assert_eq!(crate::core::area_paths(&union).abs(), 175.0);
    }
}
