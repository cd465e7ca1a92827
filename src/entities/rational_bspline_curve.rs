//! Rational B-spline curve entity (type 126)

use super::{Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_int, format_logical, format_real, ParamFormatter, ParamParser};
use crate::types::Point3;

/// A NURBS curve: `upper_index + 1` control points of degree `degree`
///
/// The knot vector has `upper_index + degree + 2` entries; weights and
/// control points each have `upper_index + 1`.
#[derive(Debug, Clone, Default)]
pub struct RationalBSplineCurve {
    /// Common entity data
    pub common: EntityCommon,
    /// Upper index of sum (control point count minus one)
    pub upper_index: i32,
    /// Degree of basis functions
    pub degree: i32,
    /// Curve lies in a plane
    pub planar: bool,
    /// Start and end points coincide
    pub closed: bool,
    /// All weights equal (polynomial rather than rational)
    pub polynomial: bool,
    /// Curve is periodic
    pub periodic: bool,
    /// Knot sequence
    pub knots: Vec<f64>,
    /// Weights, one per control point
    pub weights: Vec<f64>,
    /// Control points
    pub control_points: Vec<Point3>,
    /// Starting parameter value
    pub v0: f64,
    /// Ending parameter value
    pub v1: f64,
    /// Unit normal of the plane, meaningful when `planar`
    pub normal: Point3,
}

impl RationalBSplineCurve {
    pub fn new() -> Self {
        RationalBSplineCurve::default()
    }

    /// Number of control points
    pub fn control_point_count(&self) -> usize {
        self.control_points.len()
    }

    fn check_counts(&self) -> Result<()> {
        if self.upper_index < 1 || self.degree < 1 || self.upper_index < self.degree {
            return Err(IgesError::Parse(format!(
                "b-spline curve has upper index {} and degree {}",
                self.upper_index, self.degree
            )));
        }
        Ok(())
    }
}

impl Entity for RationalBSplineCurve {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_RATIONAL_BSPLINE_CURVE
    }

    fn type_name(&self) -> &'static str {
        "RationalBSplineCurve"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0, 1, 2, 3, 4, 5]
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
        self.upper_index = p.read_int(None)?;
        self.degree = p.read_int(None)?;
        self.check_counts()?;
        self.planar = p.read_logical(Some(false))?;
        self.closed = p.read_logical(Some(false))?;
        self.polynomial = p.read_logical(Some(false))?;
        self.periodic = p.read_logical(Some(false))?;

        let n_knots = (self.upper_index + self.degree + 2) as usize;
        let n_points = (self.upper_index + 1) as usize;
        self.knots.reserve(n_knots);
        for _ in 0..n_knots {
            self.knots.push(p.read_real(None)?);
        }
        self.weights.reserve(n_points);
        for _ in 0..n_points {
            let w = p.read_real(Some(1.0))?;
            if w <= 0.0 {
                return Err(IgesError::Parse(format!(
                    "non-positive b-spline weight {}",
                    w
                )));
            }
            self.weights.push(w);
        }
        self.control_points.reserve(n_points);
        for _ in 0..n_points {
            let x = p.read_real(Some(0.0))?;
            let y = p.read_real(Some(0.0))?;
            let z = p.read_real(Some(0.0))?;
            self.control_points.push(Point3::new(x, y, z));
        }
        self.v0 = p.read_real(Some(0.0))?;
        self.v1 = p.read_real(Some(1.0))?;
        if !p.terminated() {
            self.normal.x = p.read_real(Some(0.0))?;
        }
        if !p.terminated() {
            self.normal.y = p.read_real(Some(0.0))?;
        }
        if !p.terminated() {
            self.normal.z = p.read_real(Some(0.0))?;
        }
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        globals: &GlobalData,
        _seq_map: &SeqMap,
    ) -> Result<()> {
        self.check_counts().map_err(|_| {
            IgesError::Format("b-spline curve counts are inconsistent".into())
        })?;
        let uir = globals.min_resolution;
        f.push(format_int(self.upper_index));
        f.push(format_int(self.degree));
        f.push(format_logical(self.planar));
        f.push(format_logical(self.closed));
        f.push(format_logical(self.polynomial));
        f.push(format_logical(self.periodic));
        for k in &self.knots {
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
        f.push(format_real(self.v0, 0.0));
        f.push(format_real(self.v1, 0.0));
        f.push(format_real(self.normal.x, 0.0));
        f.push(format_real(self.normal.y, 0.0));
        f.push(format_real(self.normal.z, 0.0));
        Ok(())
    }
}
