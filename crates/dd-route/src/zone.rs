//! Rectangular no-fly zones.

use dd_core::{GridPoint, ZoneId};

/// An axis-aligned no-fly rectangle `[x1, x2] × [y1, y2]`, bounds inclusive.
///
/// Corners are normalised on construction so `x1 <= x2` and `y1 <= y2`
/// regardless of the order the operator typed them in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExclusionZone {
    pub id:     ZoneId,
    pub x1:     i32,
    pub y1:     i32,
    pub x2:     i32,
    pub y2:     i32,
    pub name:   String,
    pub reason: String,
}

impl ExclusionZone {
    /// Create a zone with a freshly generated id.
    pub fn new(
        a:      GridPoint,
        b:      GridPoint,
        name:   impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_id(ZoneId::generate(), a, b, name, reason)
    }

    pub fn with_id(
        id:     ZoneId,
        a:      GridPoint,
        b:      GridPoint,
        name:   impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let mut zone = Self {
            id,
            x1: 0,
            y1: 0,
            x2: 0,
            y2: 0,
            name: name.into(),
            reason: reason.into(),
        };
        zone.set_corners(a, b);
        zone
    }

    /// Replace the rectangle, normalising corner order.
    pub fn set_corners(&mut self, a: GridPoint, b: GridPoint) {
        self.x1 = a.x.min(b.x);
        self.x2 = a.x.max(b.x);
        self.y1 = a.y.min(b.y);
        self.y2 = a.y.max(b.y);
    }

    /// Lower-left corner.
    #[inline]
    pub fn min_corner(&self) -> GridPoint {
        GridPoint::new(self.x1, self.y1)
    }

    /// Upper-right corner.
    #[inline]
    pub fn max_corner(&self) -> GridPoint {
        GridPoint::new(self.x2, self.y2)
    }

    /// `true` if `p` lies inside or on the border of the rectangle.
    #[inline]
    pub fn contains(&self, p: GridPoint) -> bool {
        (self.x1..=self.x2).contains(&p.x) && (self.y1..=self.y2).contains(&p.y)
    }

    /// `true` if the closed segment `a → b` touches the rectangle.
    ///
    /// Liang–Barsky parametric clipping: the segment is
    /// `P(t) = a + t·(b − a)`, `t ∈ [0, 1]`, clipped against each of the four
    /// half-planes in turn.  A degenerate segment reduces to `contains(a)`.
    pub fn intersects_segment(&self, a: GridPoint, b: GridPoint) -> bool {
        let (ax, ay) = (f64::from(a.x), f64::from(a.y));
        let dx = f64::from(b.x) - ax;
        let dy = f64::from(b.y) - ay;

        let p = [-dx, dx, -dy, dy];
        let q = [
            ax - f64::from(self.x1),
            f64::from(self.x2) - ax,
            ay - f64::from(self.y1),
            f64::from(self.y2) - ay,
        ];

        let mut t_enter = 0.0_f64;
        let mut t_exit = 1.0_f64;

        for (&pi, &qi) in p.iter().zip(q.iter()) {
            if pi == 0.0 {
                // Parallel to this edge: reject if outside it.
                if qi < 0.0 {
                    return false;
                }
                continue;
            }
            let r = qi / pi;
            if pi < 0.0 {
                if r > t_exit {
                    return false;
                }
                t_enter = t_enter.max(r);
            } else {
                if r < t_enter {
                    return false;
                }
                t_exit = t_exit.min(r);
            }
        }

        t_enter <= t_exit
    }

    /// The four corners pushed diagonally outward by `margin` grid units,
    /// saturating at the `i32` range.
    pub fn offset_corners(&self, margin: i32) -> [GridPoint; 4] {
        let (left, right) = (self.x1.saturating_sub(margin), self.x2.saturating_add(margin));
        let (low, high) = (self.y1.saturating_sub(margin), self.y2.saturating_add(margin));
        [
            GridPoint::new(left, low),
            GridPoint::new(right, low),
            GridPoint::new(left, high),
            GridPoint::new(right, high),
        ]
    }
}
