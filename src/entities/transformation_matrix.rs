//! Transformation matrix entity (type 124)

use super::{Entity, EntityCommon, SeqMap};
use crate::error::Result;
use crate::global::GlobalData;
use crate::io::params::{format_real, ParamFormatter, ParamParser};
use crate::types::Transform;

/// A 3x3 rotation block plus a translation vector
///
/// The composed transform of an entity whose directory entry also names a
/// transform is the parent product; that composition lives on the
/// document, which can chase the chain.
#[derive(Debug, Clone, Default)]
pub struct TransformationMatrix {
    /// Common entity data
    pub common: EntityCommon,
    /// The transform carried by this entity
    pub xf: Transform,
}

impl TransformationMatrix {
    pub fn new() -> Self {
        TransformationMatrix {
            common: EntityCommon::new(),
            xf: Transform::IDENTITY,
        }
    }

    pub fn from_transform(xf: Transform) -> Self {
        TransformationMatrix {
            xf,
            ..Self::new()
        }
    }
}

impl Entity for TransformationMatrix {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_TRANSFORMATION_MATRIX
    }

    fn type_name(&self) -> &'static str {
        "TransformationMatrix"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0, 1, 10, 11, 12]
    }

    fn supports_hierarchy(&self) -> bool {
        false
    }

    fn rescale(&mut self, sf: f64) {
        // Only the translation carries length units.
        self.xf.t = self.xf.t * sf;
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        for row in 0..3 {
            for col in 0..3 {
                self.xf.r[row][col] = p.read_real(Some(0.0))?;
            }
            let t = p.read_real(Some(0.0))?;
            match row {
                0 => self.xf.t.x = t,
                1 => self.xf.t.y = t,
                _ => self.xf.t.z = t,
            }
        }
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        globals: &GlobalData,
        _seq_map: &SeqMap,
    ) -> Result<()> {
        let uir = globals.min_resolution;
        let t = [self.xf.t.x, self.xf.t.y, self.xf.t.z];
        for row in 0..3 {
            for col in 0..3 {
                // Rotation terms are unitless; keep tiny ones.
                f.push(format_real(self.xf.r[row][col], 0.0));
            }
            f.push(format_real(t[row], uir));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3;

    #[test]
    fn test_pd_roundtrip() {
        let g = GlobalData::default();
        let xf = Transform::from_rotation_z(0.5).compose(&Transform::from_translation(
            Point3::new(10.0, -5.0, 2.0),
        ));
        let e = TransformationMatrix::from_transform(xf);
        let mut f = ParamFormatter::new(g.pdelim, g.rdelim);
        e.format_pd(&mut f, &g, &SeqMap::new()).unwrap();

        let payload = f.finish();
        let mut back = TransformationMatrix::new();
        let mut p = ParamParser::new(&payload, g.pdelim, g.rdelim);
        back.read_pd(&mut p, &g).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert!((back.xf.r[i][j] - xf.r[i][j]).abs() < 1e-12);
            }
        }
        assert!((back.xf.t - xf.t).length() < 1e-12);
    }

    #[test]
    fn test_rescale_scales_translation_only() {
        let mut e = TransformationMatrix::from_transform(Transform::from_translation(
            Point3::new(1.0, 0.0, 0.0),
        ));
        e.rescale(25.4);
        assert_eq!(e.xf.t.x, 25.4);
        assert_eq!(e.xf.r[0][0], 1.0);
    }
}
