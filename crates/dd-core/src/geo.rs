//! Integer grid coordinates.
//!
//! The service area is a flat integer grid with the depot at the origin.
//! Positions are stored as `i32`; distances are computed in `f64`.

/// A point on the delivery grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    /// The depot, where every mission starts and ends.
    pub const DEPOT: GridPoint = GridPoint { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in grid units.
    #[inline]
    pub fn distance(self, other: GridPoint) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }

    /// Distance from the depot; the secondary key of the order queue.
    #[inline]
    pub fn distance_to_depot(self) -> f64 {
        self.distance(Self::DEPOT)
    }

    #[inline]
    pub fn is_depot(self) -> bool {
        self == Self::DEPOT
    }

    /// `true` if both coordinates are non-negative.
    #[inline]
    pub fn is_non_negative(self) -> bool {
        self.x >= 0 && self.y >= 0
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
