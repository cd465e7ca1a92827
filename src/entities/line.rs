//! Line entity (type 110)

use super::{Entity, EntityCommon, SeqMap};
use crate::error::Result;
use crate::global::GlobalData;
use crate::io::params::{format_real, ParamFormatter, ParamParser};
use crate::types::Point3;

/// A line defined by two endpoints
///
/// Forms 1 and 2 reinterpret the endpoints as a ray or an unbounded line;
/// the stored parameters are the same six coordinates.
#[derive(Debug, Clone)]
pub struct Line {
    /// Common entity data
    pub common: EntityCommon,
    /// Start point
    pub start: Point3,
    /// End point
    pub end: Point3,
}

impl Line {
    /// Create a new line from origin to origin
    pub fn new() -> Self {
        Line {
            common: EntityCommon::new(),
            start: Point3::ZERO,
            end: Point3::ZERO,
        }
    }

    /// Create a new line between two points
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Line {
            start,
            end,
            ..Self::new()
        }
    }

    /// Get the length of the line
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Get the direction vector (normalized)
    pub fn direction(&self) -> Point3 {
        (self.end - self.start).normalize()
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Line {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_LINE
    }

    fn type_name(&self) -> &'static str {
        "Line"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0, 1, 2]
    }

    fn forbids_structure(&self) -> bool {
        true
    }

    fn supports_hierarchy(&self) -> bool {
        false
    }

    fn rescale(&mut self, sf: f64) {
        self.start = self.start * sf;
        self.end = self.end * sf;
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.start.x = p.read_real(Some(0.0))?;
        self.start.y = p.read_real(Some(0.0))?;
        self.start.z = p.read_real(Some(0.0))?;
        self.end.x = p.read_real(Some(0.0))?;
        self.end.y = p.read_real(Some(0.0))?;
        self.end.z = p.read_real(Some(0.0))?;
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        globals: &GlobalData,
        _seq_map: &SeqMap,
    ) -> Result<()> {
        let uir = globals.min_resolution;
        for v in [
            self.start.x,
            self.start.y,
            self.start.z,
            self.end.x,
            self.end.y,
            self.end.z,
        ] {
            f.push(format_real(v, uir));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_creation() {
        let line = Line::new();
        assert_eq!(line.start, Point3::ZERO);
        assert_eq!(line.end, Point3::ZERO);
        assert_eq!(line.type_code(), 110);
    }

    #[test]
    fn test_line_length() {
        let line = Line::from_points(Point3::ZERO, Point3::new(3.0, 4.0, 0.0));
        assert_eq!(line.length(), 5.0);
    }

    #[test]
    fn test_rescale() {
        let mut line = Line::from_points(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        line.rescale(25.4);
        assert_eq!(line.start.x, 25.4);
        assert_eq!(line.end.x, 50.8);
    }

    #[test]
    fn test_pd_roundtrip() {
        let g = GlobalData::default();
        let mut f = ParamFormatter::new(g.pdelim, g.rdelim);
        let line = Line::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        line.format_pd(&mut f, &g, &SeqMap::new()).unwrap();
        let payload = f.finish();

        let mut back = Line::new();
        let mut p = ParamParser::new(&payload, g.pdelim, g.rdelim);
        back.read_pd(&mut p, &g).unwrap();
        assert_eq!(back.end, Point3::new(1.0, 2.0, 3.0));
    }
}
