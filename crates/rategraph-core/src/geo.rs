//! Polygon filtering of geolocated records.

use crate::{Coordinates, Error, Result};
use serde::{Deserialize, Serialize};

/// A simple polygon in `(longitude, latitude)` vertex order.
///
/// The ring is closed implicitly; repeating the first vertex is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    /// Create a polygon from at least three vertices.
    pub fn new(vertices: Vec<(f64, f64)>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::MalformedCoordinate(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        for &(lon, lat) in &vertices {
            Coordinates::new(lon, lat)?;
        }
        Ok(Self { vertices })
    }

    /// Parse `"lon,lat;lon,lat;..."`.
    pub fn parse(raw: &str) -> Result<Self> {
        let vertices = raw
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|pair| {
                let (lon, lat) = pair
                    .split_once(',')
                    .ok_or_else(|| Error::MalformedCoordinate(pair.to_string()))?;
                let c = Coordinates::parse(lon, lat)?;
                Ok((c.longitude, c.latitude))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(vertices)
    }

    /// Polygon vertices.
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Whether the point lies inside the polygon. Points on an edge count as inside.
    pub fn contains(&self, point: Coordinates) -> bool {
        let (x, y) = (point.longitude, point.latitude);
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.vertices[i];
            let (xj, yj) = self.vertices[j];
            if on_segment((x, y), (xi, yi), (xj, yj)) {
                return true;
            }
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

fn on_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    if cross.abs() > 1e-12 {
        return false;
    }
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}
