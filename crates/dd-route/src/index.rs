//! Owned zone collection with an R-tree for point and segment queries.
//!
//! # Spatial index
//!
//! Each zone's rectangle is stored as an `AABB<[f64; 2]>` in an `rstar`
//! R-tree.  Queries first collect candidates whose bounding box intersects
//! the query envelope, then run the exact test from [`ExclusionZone`].  The
//! tree is rebuilt with `bulk_load` after every mutation; zone counts are
//! small and mutations rare compared to lookups.
//!
//! Query results are always reported in insertion order so that "the first
//! zone containing a point" is stable.

use rstar::{RTree, RTreeObject, AABB};

use dd_core::{GridPoint, ZoneId};

use crate::ExclusionZone;

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a zone's rectangle and its slot in `zones`.
#[derive(Clone)]
struct ZoneEntry {
    lower: [f64; 2],
    upper: [f64; 2],
    slot:  usize,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.lower, self.upper)
    }
}

#[inline]
fn as_point(p: GridPoint) -> [f64; 2] {
    [f64::from(p.x), f64::from(p.y)]
}

// ── ZoneSet ───────────────────────────────────────────────────────────────────

/// All exclusion zones currently in force.
#[derive(Clone)]
pub struct ZoneSet {
    zones: Vec<ExclusionZone>,
    tree:  RTree<ZoneEntry>,
}

impl Default for ZoneSet {
    fn default() -> Self {
        Self { zones: Vec::new(), tree: RTree::new() }
    }
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones in insertion order.
    pub fn as_slice(&self) -> &[ExclusionZone] {
        &self.zones
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionZone> {
        self.zones.iter()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    pub fn insert(&mut self, zone: ExclusionZone) -> ZoneId {
        let id = zone.id;
        self.zones.push(zone);
        self.rebuild();
        id
    }

    /// Replace the rectangle, name and reason of zone `id`.
    ///
    /// Returns `false` if no such zone exists.
    pub fn update(
        &mut self,
        id:     ZoneId,
        a:      GridPoint,
        b:      GridPoint,
        name:   &str,
        reason: &str,
    ) -> bool {
        let Some(zone) = self.zones.iter_mut().find(|z| z.id == id) else {
            return false;
        };
        zone.set_corners(a, b);
        zone.name = name.to_owned();
        zone.reason = reason.to_owned();
        self.rebuild();
        true
    }

    pub fn remove(&mut self, id: ZoneId) -> Option<ExclusionZone> {
        let pos = self.zones.iter().position(|z| z.id == id)?;
        let zone = self.zones.remove(pos);
        self.rebuild();
        Some(zone)
    }

    pub fn get(&self, id: ZoneId) -> Option<&ExclusionZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The first zone (insertion order) whose rectangle contains `p`.
    pub fn containing(&self, p: GridPoint) -> Option<&ExclusionZone> {
        let envelope = AABB::from_point(as_point(p));
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.slot)
            .filter(|&slot| self.zones[slot].contains(p))
            .min()
            .map(|slot| &self.zones[slot])
    }

    /// Every zone the segment `a → b` passes through, in insertion order.
    pub fn crossing(&self, a: GridPoint, b: GridPoint) -> Vec<&ExclusionZone> {
        let envelope = AABB::from_corners(as_point(a), as_point(b));
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.slot)
            .filter(|&slot| self.zones[slot].intersects_segment(a, b))
            .collect();
        slots.sort_unstable();
        slots.into_iter().map(|slot| &self.zones[slot]).collect()
    }

    /// `true` if the segment `a → b` passes through any zone.
    pub fn blocks(&self, a: GridPoint, b: GridPoint) -> bool {
        let envelope = AABB::from_corners(as_point(a), as_point(b));
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|e| self.zones[e.slot].intersects_segment(a, b))
    }

    fn rebuild(&mut self) {
        let entries = self
            .zones
            .iter()
            .enumerate()
            .map(|(slot, z)| ZoneEntry {
                lower: as_point(z.min_corner()),
                upper: as_point(z.max_corner()),
                slot,
            })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }
}

impl std::fmt::Debug for ZoneSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneSet").field("zones", &self.zones).finish()
    }
}
