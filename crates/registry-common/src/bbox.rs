//! Bounding box used to restrict collection queries to a region.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// The whole globe.
    pub const GLOBAL: BoundingBox = BoundingBox {
        min_x: -180.0,
        min_y: -90.0,
        max_x: 180.0,
        max_y: 90.0,
    };

    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// A box is valid when its minimum corner lies strictly below its maximum corner.
    pub fn is_valid(&self) -> bool {
        self.min_x < self.max_x && self.min_y < self.max_y
    }

    /// Corner coordinates in `[west, south, east, north]` order.
    pub fn corners(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Parse a "minx,miny,maxx,maxy" string.
impl FromStr for BoundingBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        let bbox = Self::new(values[0], values[1], values[2], values[3]);
        if !bbox.is_valid() {
            return Err(BboxParseError::Degenerate(s.to_string()));
        }
        Ok(bbox)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),

    #[error("BBOX has zero or negative extent: {0}")]
    Degenerate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox: BoundingBox = "-125.0,24.0,-66.0,50.0".parse().unwrap();
        assert_eq!(bbox.min_x, -125.0);
        assert_eq!(bbox.min_y, 24.0);
        assert_eq!(bbox.max_x, -66.0);
        assert_eq!(bbox.max_y, 50.0);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let bbox = BoundingBox::new(5.5, 47.0, 15.0, 55.25);
        let parsed: BoundingBox = bbox.to_string().parse().unwrap();
        assert_eq!(parsed, bbox);
    }
}
