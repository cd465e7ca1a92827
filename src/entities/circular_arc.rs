//! Circular arc entity (type 100)

use super::{Entity, EntityCommon, SeqMap};
use crate::error::Result;
use crate::global::GlobalData;
use crate::io::params::{format_real, ParamFormatter, ParamParser};

/// An arc in the XY plane at displacement `zt`, counter-clockwise from
/// `start` to `end` about `center`
#[derive(Debug, Clone, Default)]
pub struct CircularArc {
    /// Common entity data
    pub common: EntityCommon,
    /// Z displacement of the arc plane
    pub zt: f64,
    /// Center X
    pub xc: f64,
    /// Center Y
    pub yc: f64,
    /// Start point X
    pub x1: f64,
    /// Start point Y
    pub y1: f64,
    /// End point X
    pub x2: f64,
    /// End point Y
    pub y2: f64,
}

impl CircularArc {
    pub fn new() -> Self {
        CircularArc::default()
    }

    /// Radius from the center to the start point
    pub fn radius(&self) -> f64 {
        let dx = self.x1 - self.xc;
        let dy = self.y1 - self.yc;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when the start and end points coincide (full circle)
    pub fn is_closed(&self) -> bool {
        self.x1 == self.x2 && self.y1 == self.y2
    }
}

impl Entity for CircularArc {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_CIRCULAR_ARC
    }

    fn type_name(&self) -> &'static str {
        "CircularArc"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0]
    }

    fn forbids_structure(&self) -> bool {
        true
    }

    fn supports_hierarchy(&self) -> bool {
        false
    }

    fn rescale(&mut self, sf: f64) {
        self.zt *= sf;
        self.xc *= sf;
        self.yc *= sf;
        self.x1 *= sf;
        self.y1 *= sf;
        self.x2 *= sf;
        self.y2 *= sf;
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.zt = p.read_real(Some(0.0))?;
        self.xc = p.read_real(Some(0.0))?;
        self.yc = p.read_real(Some(0.0))?;
        self.x1 = p.read_real(Some(0.0))?;
        self.y1 = p.read_real(Some(0.0))?;
        self.x2 = p.read_real(Some(0.0))?;
        self.y2 = p.read_real(Some(0.0))?;
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
            self.zt, self.xc, self.yc, self.x1, self.y1, self.x2, self.y2,
        ] {
            f.push(format_real(v, uir));
        }
        Ok(())
    }
}
