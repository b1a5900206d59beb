use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

///
/// Location
///
/// A single geographic point. Equality and hashing are bitwise on the
/// coordinates so locations can participate in row signatures.
///

#[derive(Clone, Copy, Debug)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Well-known-text rendering used when binding point columns.
    #[must_use]
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.x, self.y)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

///
/// Region
///
/// A set of polygons; each polygon is a closed ring of points.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Region {
    pub polygons: Vec<Vec<Location>>,
}

impl Region {
    #[must_use]
    pub const fn new(polygons: Vec<Vec<Location>>) -> Self {
        Self { polygons }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Well-known-text rendering used when binding polygon columns.
    #[must_use]
    pub fn to_wkt(&self) -> String {
        let polygons = self
            .polygons
            .iter()
            .map(|ring| {
                let points = ring
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("(({points}))")
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("MULTIPOLYGON({polygons})")
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wkt())
    }
}
