//! Rational B-spline surface entity (type 128)

use super::{Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_int, format_logical, format_real, ParamFormatter, ParamParser};
use crate::types::Point3;

/// A NURBS surface over a `(upper_index_u + 1) x (upper_index_v + 1)`
/// control net
///
/// Control points and weights are stored in U-major order: all U values
/// for the first V row, then the next row.
#[derive(Debug, Clone, Default)]
pub struct RationalBSplineSurface {
    /// Common entity data
    pub common: EntityCommon,
    /// Upper index of sum in U
    pub upper_index_u: i32,
    /// Upper index of sum in V
    pub upper_index_v: i32,
    /// Degree in U
    pub degree_u: i32,
    /// Degree in V
    pub degree_v: i32,
    /// Closed in U
    pub closed_u: bool,
    /// Closed in V
    pub closed_v: bool,
    /// All weights equal
    pub polynomial: bool,
    /// Periodic in U
    pub periodic_u: bool,
    /// Periodic in V
    pub periodic_v: bool,
    /// Knot sequence in U
    pub knots_u: Vec<f64>,
    /// Knot sequence in V
    pub knots_v: Vec<f64>,
    /// Weights, U-major
    pub weights: Vec<f64>,
    /// Control net, U-major
    pub control_points: Vec<Point3>,
    /// Parameter range in U
    pub u0: f64,
    pub u1: f64,
    /// Parameter range in V
    pub v0: f64,
    pub v1: f64,
}

impl RationalBSplineSurface {
    pub fn new() -> Self {
        RationalBSplineSurface::default()
    }

    fn net_size(&self) -> usize {
        ((self.upper_index_u + 1) * (self.upper_index_v + 1)) as usize
    }

    fn check_counts(&self) -> Result<()> {
        if self.upper_index_u < 1
            || self.upper_index_v < 1
            || self.degree_u < 1
            || self.degree_v < 1
            || self.upper_index_u < self.degree_u
            || self.upper_index_v < self.degree_v
        {
            return Err(IgesError::Parse(format!(
                "b-spline surface has indices {}/{} and degrees {}/{}",
                self.upper_index_u, self.upper_index_v, self.degree_u, self.degree_v
            )));
        }
        Ok(())
    }
}

impl Entity for RationalBSplineSurface {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_RATIONAL_BSPLINE_SURFACE
    }

    fn type_name(&self) -> &'static str {
        "RationalBSplineSurface"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]
    }

    fn forbids_structure(&self) -> bool {
        true
    }

    fn supports_hierarchy(&self) -> bool {
        false
    }

    fn rescale(&mut self, sf: f64) {
        for cp in self.control_points.iter_mut() {
            *cp = *cp * sf;
        }
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.upper_index_u = p.read_int(None)?;
        self.upper_index_v = p.read_int(None)?;
        self.degree_u = p.read_int(None)?;
        self.degree_v = p.read_int(None)?;
        self.check_counts()?;
        self.closed_u = p.read_logical(Some(false))?;
        self.closed_v = p.read_logical(Some(false))?;
        self.polynomial = p.read_logical(Some(false))?;
        self.periodic_u = p.read_logical(Some(false))?;
        self.periodic_v = p.read_logical(Some(false))?;

        let nk_u = (self.upper_index_u + self.degree_u + 2) as usize;
        let nk_v = (self.upper_index_v + self.degree_v + 2) as usize;
        for _ in 0..nk_u {
            self.knots_u.push(p.read_real(None)?);
        }
        for _ in 0..nk_v {
            self.knots_v.push(p.read_real(None)?);
        }
        let net = self.net_size();
        for _ in 0..net {
            let w = p.read_real(Some(1.0))?;
            if w <= 0.0 {
                return Err(IgesError::Parse(format!(
                    "non-positive b-spline weight {}",
                    w
                )));
            }
            self.weights.push(w);
        }
        for _ in 0..net {
            let x = p.read_real(Some(0.0))?;
            let y = p.read_real(Some(0.0))?;
            let z = p.read_real(Some(0.0))?;
            self.control_points.push(Point3::new(x, y, z));
        }
        self.u0 = p.read_real(Some(0.0))?;
        self.u1 = p.read_real(Some(1.0))?;
        self.v0 = p.read_real(Some(0.0))?;
        self.v1 = p.read_real(Some(1.0))?;
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        globals: &GlobalData,
        _seq_map: &SeqMap,
    ) -> Result<()> {
        self.check_counts().map_err(|_| {
            IgesError::Format("b-spline surface counts are inconsistent".into())
        })?;
        let uir = globals.min_resolution;
        f.push(format_int(self.upper_index_u));
        f.push(format_int(self.upper_index_v));
        f.push(format_int(self.degree_u));
        f.push(format_int(self.degree_v));
        f.push(format_logical(self.closed_u));
        f.push(format_logical(self.closed_v));
        f.push(format_logical(self.polynomial));
        f.push(format_logical(self.periodic_u));
        f.push(format_logical(self.periodic_v));
        for k in self.knots_u.iter().chain(self.knots_v.iter()) {
            f.push(format_real(*k, 0.0));
        }
        for w in &self.weights {
            f.push(format_real(*w, 0.0));
        }
        for cp in &self.control_points {
            f.push(format_real(cp.x, uir));
            f.push(format_real(cp.y, uir));
            f.push(format_real(cp.z, uir));
        }
        f.push(format_real(self.u0, 0.0));
        f.push(format_real(self.u1, 0.0));
        f.push(format_real(self.v0, 0.0));
        f.push(format_real(self.v1, 0.0));
        Ok(())
    }
}
