//! Routing trait and the default single-detour planner.
//!
//! # Pluggability
//!
//! The dispatcher calls routing via the [`RoutePlanner`] trait, so a real
//! path planner (visibility graph, grid A*) can replace [`DetourPlanner`]
//! without touching the orchestrator.
//!
//! # Limitation
//!
//! `DetourPlanner` inserts at most one waypoint.  A detour around one zone
//! may still cross a second zone, and chained or overlapping zones are not
//! guaranteed to be avoided.

use rustc_hash::FxHashSet;

use dd_core::GridPoint;

use crate::ExclusionZone;

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered polyline from start to end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub points: Vec<GridPoint>,
}

impl Route {
    /// The straight two-point route.
    pub fn direct(start: GridPoint, end: GridPoint) -> Self {
        Self { points: vec![start, end] }
    }

    /// Sum of segment lengths.
    pub fn total_distance(&self) -> f64 {
        total_distance(&self.points)
    }

    /// `true` if a waypoint was interposed.
    pub fn is_detour(&self) -> bool {
        self.points.len() > 2
    }

    /// The interposed waypoint, if any.
    pub fn waypoint(&self) -> Option<GridPoint> {
        if self.is_detour() { self.points.get(1).copied() } else { None }
    }

    pub fn start(&self) -> Option<GridPoint> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<GridPoint> {
        self.points.last().copied()
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("]")
    }
}

/// Sum of consecutive Euclidean segment lengths; `0.0` for fewer than two
/// points.
pub fn total_distance(points: &[GridPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

// ── RoutePlanner trait ────────────────────────────────────────────────────────

/// Pluggable zone-avoiding planner.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so the dispatcher can sit behind a
/// mutex shared with the scheduler's tasks.
pub trait RoutePlanner: Send + Sync {
    /// Plan a route from `start` to `end` around `zones`.
    ///
    /// `grid_limit` bounds the rasterised area considered forbidden.
    /// Planning never fails: when no detour is found the direct route is
    /// returned.
    fn plan(
        &self,
        start:      GridPoint,
        end:        GridPoint,
        zones:      &[ExclusionZone],
        grid_limit: i32,
    ) -> Route;
}

// ── DetourPlanner ─────────────────────────────────────────────────────────────

/// Heuristic router: direct line if clear, otherwise the best single
/// detour through an offset zone corner.
///
/// 1. If `start → end` crosses no zone, return `[start, end]`.
/// 2. Rasterise every zone (clipped to `[0, grid_limit]`) into a forbidden
///    set, and collect each zone's corners pushed out by `margin`,
///    dropping corners with a negative coordinate.
/// 3. Return `[start, wp, end]` for the allowed corner `wp` minimising
///    `|start − wp| + |wp − end|`; ties keep the first candidate.  With no
///    allowed corner, fall back to `[start, end]`.
#[derive(Debug, Clone, Copy)]
pub struct DetourPlanner {
    /// Outward offset of candidate waypoints from zone corners.
    pub margin: i32,
}

impl DetourPlanner {
    pub const DEFAULT_MARGIN: i32 = 2;

    pub fn new(margin: i32) -> Self {
        Self { margin }
    }
}

impl Default for DetourPlanner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MARGIN)
    }
}

impl RoutePlanner for DetourPlanner {
    fn plan(
        &self,
        start:      GridPoint,
        end:        GridPoint,
        zones:      &[ExclusionZone],
        grid_limit: i32,
    ) -> Route {
        if !zones.iter().any(|z| z.intersects_segment(start, end)) {
            return Route::direct(start, end);
        }

        let forbidden = forbidden_points(zones, grid_limit);

        let mut best: Option<(GridPoint, f64)> = None;
        for wp in candidate_waypoints(zones, self.margin) {
            if forbidden.contains(&wp) {
                continue;
            }
            let cost = start.distance(wp) + wp.distance(end);
            if best.is_none_or(|(_, c)| cost < c) {
                best = Some((wp, cost));
            }
        }

        match best {
            Some((wp, _)) => Route { points: vec![start, wp, end] },
            None => Route::direct(start, end),
        }
    }
}

/// Every integer point inside some zone, clipped to `[0, grid_limit]²`.
fn forbidden_points(zones: &[ExclusionZone], grid_limit: i32) -> FxHashSet<GridPoint> {
    let mut set = FxHashSet::default();
    for z in zones {
        for x in z.x1.max(0)..=z.x2.min(grid_limit) {
            for y in z.y1.max(0)..=z.y2.min(grid_limit) {
                set.insert(GridPoint::new(x, y));
            }
        }
    }
    set
}

/// Offset corners of every zone, in zone order, minus negative points.
fn candidate_waypoints(
    zones:  &[ExclusionZone],
    margin: i32,
) -> impl Iterator<Item = GridPoint> + '_ {
    zones
        .iter()
        .flat_map(move |z| z.offset_corners(margin))
        .filter(|p| p.is_non_negative())
}
