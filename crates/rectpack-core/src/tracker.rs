use crate::config::{PruneStrategy, TrackerConfig};
use crate::error::{RectPackError, Result};
use crate::geometry::{Coord, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Tracks the maximal free rectangles of a single bin.
///
/// The tracker starts with one free rectangle covering the whole bin. Each
/// committed placement carves the placed rectangle out of every free rectangle
/// it overlaps, then drops free rectangles contained in another one.
///
/// Invariants after every call:
/// - every free rectangle has positive area
/// - no free rectangle is contained in another (exact duplicates are collapsed)
/// - every unoccupied point of the bin lies in at least one free rectangle
///
/// Free rectangles may overlap each other.
#[derive(Debug, Clone)]
pub struct FreeRectManager<T: Coord = u32> {
    root: Rect<T>,
    free: Vec<Rect<T>>,
    config: TrackerConfig,
    placements: usize,
}

/// Counters describing what a single [`FreeRectManager::place_rect`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceReport {
    /// Free rectangles that overlapped the placement and were split.
    pub split: usize,
    /// Free-list length after the split pass, before pruning.
    pub after_split: usize,
    /// Free-list length after pruning.
    pub after_prune: usize,
}

impl PlaceReport {
    fn unchanged(len: usize) -> Self {
        Self {
            split: 0,
            after_split: len,
            after_prune: len,
        }
    }

    /// True if the free list was left untouched.
    pub fn is_noop(&self) -> bool {
        self.split == 0
    }

    /// Number of rectangles removed by the pruning pass.
    pub fn pruned(&self) -> usize {
        self.after_split - self.after_prune
    }
}

impl<T: Coord> FreeRectManager<T> {
    /// Creates a tracker for a bin with extent `root` and the default configuration.
    pub fn new(root: Rect<T>) -> Result<Self> {
        Self::with_config(root, TrackerConfig::default())
    }

    pub fn with_config(root: Rect<T>, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        if !root.has_positive_area() || !root.edges_fit() {
            return Err(RectPackError::InvalidGeometry {
                w: format!("{:?}", root.w),
                h: format!("{:?}", root.h),
            });
        }
        debug!(?root, prune = ?config.prune, "free-rectangle tracker created");
        Ok(Self {
            root,
            free: vec![root],
            config,
            placements: 0,
        })
    }

    /// Commits `placed` as occupied and carves it out of the free space.
    ///
    /// Zero-area placements and placements that overlap no free rectangle are
    /// no-ops. Only the part of `placed` inside the bin is considered, so it may
    /// extend past the bin (and past the top of the coordinate range). The free list is rebuilt off to the side and only swapped in once
    /// the split and prune passes (and the optional verification) succeed, so an
    /// `Err` leaves the tracker exactly as it was.
    #[instrument(skip_all, fields(free = self.free.len()))]
    pub fn place_rect(&mut self, placed: &Rect<T>) -> Result<PlaceReport> {
        let len = self.free.len();
        if placed.is_empty() {
            trace!(?placed, "zero-area placement ignored");
            return Ok(PlaceReport::unchanged(len));
        }
        // free rects never leave the root, so only the clipped part can overlap them
        let Some(placed) = placed.clipped_to(&self.root) else {
            self.placements += 1;
            trace!(?placed, "placement outside the bin");
            return Ok(PlaceReport::unchanged(len));
        };
        let placed = &placed;

        let mut kept: Vec<Rect<T>> = Vec::with_capacity(len);
        let mut fresh: Vec<Rect<T>> = Vec::new();
        let mut split = 0usize;
        for fr in &self.free {
            if fr.overlaps(placed) {
                split += 1;
                split_free_rect(fr, placed, &mut fresh);
            } else {
                kept.push(*fr);
            }
        }

        self.placements += 1;
        if split == 0 {
            trace!(?placed, "placement overlaps no free rectangle");
            return Ok(PlaceReport::unchanged(len));
        }

        let after_split = kept.len() + fresh.len();
        let next = match self.config.prune {
            PruneStrategy::Sweep => {
                kept.extend(fresh);
                prune_sweep(kept, self.use_parallel(after_split))
            }
            PruneStrategy::Staged => prune_staged(kept, fresh),
        };

        if self.config.verify_invariants {
            if let Err(e) = check_free_list(&next) {
                // keep the pre-call free list
                self.placements -= 1;
                warn!(?placed, error = %e, "rejecting placement");
                return Err(e);
            }
        }

        let report = PlaceReport {
            split,
            after_split,
            after_prune: next.len(),
        };
        trace!(
            split = report.split,
            after_split = report.after_split,
            after_prune = report.after_prune,
            "placement committed"
        );
        self.free = next;
        Ok(report)
    }

    /// Number of free rectangles.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// True once the bin has no free space left.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Free rectangle at `index`; positions are stable until the next placement.
    pub fn get(&self, index: usize) -> Result<Rect<T>> {
        self.free
            .get(index)
            .copied()
            .ok_or(RectPackError::OutOfRange {
                index,
                len: self.free.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rect<T>> + '_ {
        self.free.iter()
    }

    pub fn as_slice(&self) -> &[Rect<T>] {
        &self.free
    }

    /// The bin extent the tracker was created with.
    pub fn root(&self) -> Rect<T> {
        self.root
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of non-empty placements committed so far.
    pub fn placements(&self) -> usize {
        self.placements
    }

    /// Checks the free list against the positive-area and non-containment invariants.
    pub fn verify(&self) -> Result<()> {
        check_free_list(&self.free)
    }

    fn use_parallel(&self, len: usize) -> bool {
        self.config.parallel && len >= self.config.parallel_threshold
    }
}

/// Pushes the parts of `fr` left, right, above and below `placed`.
/// Each part spans the full extent of `fr` along the other axis, so parts may overlap.
fn split_free_rect<T: Coord>(fr: &Rect<T>, placed: &Rect<T>, out: &mut Vec<Rect<T>>) {
    let fr_x2 = fr.right();
    let fr_y2 = fr.bottom();
    let n_x2 = placed.right();
    let n_y2 = placed.bottom();

    let mut push = |r: Rect<T>| {
        if r.has_positive_area() {
            out.push(r);
        }
    };
    // left
    if placed.x > fr.x {
        push(Rect::new(fr.x, fr.y, placed.x - fr.x, fr.h));
    }
    // right
    if n_x2 < fr_x2 {
        push(Rect::new(n_x2, fr.y, fr_x2 - n_x2, fr.h));
    }
    // top
    if placed.y > fr.y {
        push(Rect::new(fr.x, fr.y, fr.w, placed.y - fr.y));
    }
    // bottom
    if n_y2 < fr_y2 {
        push(Rect::new(fr.x, n_y2, fr.w, fr_y2 - n_y2));
    }
}

/// True if some other entry contains `rects[i]`. Of two equal entries the
/// later one is the redundant one.
fn is_redundant<T: Coord>(rects: &[Rect<T>], i: usize) -> bool {
    let a = &rects[i];
    rects
        .iter()
        .enumerate()
        .any(|(j, b)| j != i && b.contains(a) && (j < i || b != a))
}

#[cfg(feature = "parallel")]
fn redundancy_flags<T: Coord>(rects: &[Rect<T>], parallel: bool) -> Vec<bool> {
    if parallel {
        (0..rects.len())
            .into_par_iter()
            .map(|i| is_redundant(rects, i))
            .collect()
    } else {
        (0..rects.len()).map(|i| is_redundant(rects, i)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn redundancy_flags<T: Coord>(rects: &[Rect<T>], _parallel: bool) -> Vec<bool> {
    (0..rects.len()).map(|i| is_redundant(rects, i)).collect()
}

/// Flags every redundant entry in one sweep, then collects the survivors.
fn prune_sweep<T: Coord>(rects: Vec<Rect<T>>, parallel: bool) -> Vec<Rect<T>> {
    let flags = redundancy_flags(&rects, parallel);
    rects
        .into_iter()
        .zip(flags)
        .filter_map(|(r, redundant)| (!redundant).then_some(r))
        .collect()
}

/// `kept` is already free of containment among itself, so only pairs
/// involving a freshly split rectangle need checking.
fn prune_staged<T: Coord>(mut kept: Vec<Rect<T>>, mut fresh: Vec<Rect<T>>) -> Vec<Rect<T>> {
    fresh.retain(|nr| !kept.iter().any(|of| of.contains(nr)));
    kept.retain(|of| !fresh.iter().any(|nr| nr.contains(of)));
    kept.extend(prune_sweep(fresh, false));
    kept
}

fn check_free_list<T: Coord>(rects: &[Rect<T>]) -> Result<()> {
    for (i, a) in rects.iter().enumerate() {
        if !a.has_positive_area() {
            return Err(RectPackError::InvariantViolation(format!(
                "free rect #{i} {a:?} has no area"
            )));
        }
        if let Some((j, b)) = rects
            .iter()
            .enumerate()
            .find(|(j, b)| *j != i && b.contains(a))
        {
            return Err(RectPackError::InvariantViolation(format!(
                "free rect #{i} {a:?} is contained in #{j} {b:?}"
            )));
        }
    }
    Ok(())
}
