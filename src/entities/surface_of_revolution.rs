//! Surface of revolution entity (type 120)

use super::{is_curve_type, DeIndex, Entity, EntityCommon, SeqMap, TYPE_LINE};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_pointer, format_real, ParamFormatter, ParamParser};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::EntityId;

/// A generatrix curve revolved about an axis line from `start_angle` to
/// `end_angle` (radians)
#[derive(Debug, Clone, Default)]
pub struct SurfaceOfRevolution {
    /// Common entity data
    pub common: EntityCommon,
    axis_ptr: i32,
    generatrix_ptr: i32,
    /// Axis of revolution, a line entity
    pub axis: Option<EntityId>,
    /// The curve being revolved
    pub generatrix: Option<EntityId>,
    /// Start angle in radians
    pub start_angle: f64,
    /// Terminate angle in radians
    pub end_angle: f64,
}

impl SurfaceOfRevolution {
    pub fn new() -> Self {
        SurfaceOfRevolution {
            end_angle: std::f64::consts::TAU,
            ..SurfaceOfRevolution::default()
        }
    }
}

impl Entity for SurfaceOfRevolution {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_SURFACE_OF_REVOLUTION
    }

    fn type_name(&self) -> &'static str {
        "SurfaceOfRevolution"
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

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.axis_ptr = p.read_pointer()?;
        self.generatrix_ptr = p.read_pointer()?;
        self.start_angle = p.read_real(Some(0.0))?;
        self.end_angle = p.read_real(Some(std::f64::consts::TAU))?;
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        _globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<()> {
        // An unresolved reference emits 0 so a degenerate entity still
        // round-trips.
        let seq = |slot: Option<EntityId>, what: &str| -> Result<i32> {
            match slot {
                Some(id) => seq_map
                    .get(&id)
                    .map(|s| *s as i32)
                    .ok_or_else(|| IgesError::Format(format!("{} missing from sequence map", what))),
                None => Ok(0),
            }
        };
        f.push(format_pointer(seq(self.axis, "axis")?));
        f.push(format_pointer(seq(self.generatrix, "generatrix")?));
        // Angles are unitless; never round them to the length resolution.
        f.push(format_real(self.start_angle, 0.0));
        f.push(format_real(self.end_angle, 0.0));
        Ok(())
    }

    fn associate(&mut self, index: &DeIndex, notes: &mut NotificationCollection) -> bool {
        let mut ok = true;
        match index.resolve(self.axis_ptr) {
            Ok(Some((id, TYPE_LINE))) => self.axis = Some(id),
            Ok(Some((_, code))) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "surface of revolution at DE {} has axis of type {}, expected a line",
                        self.common.sequence, code
                    ),
                );
                ok = false;
            }
            Ok(None) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "surface of revolution at DE {} has no axis",
                        self.common.sequence
                    ),
                );
                ok = false;
            }
            Err(_) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "dangling axis pointer on surface of revolution at DE {}",
                        self.common.sequence
                    ),
                );
                ok = false;
            }
        }
        match index.resolve(self.generatrix_ptr) {
            Ok(Some((id, code))) if is_curve_type(code) => self.generatrix = Some(id),
            Ok(None) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "surface of revolution at DE {} has no generatrix",
                        self.common.sequence
                    ),
                );
                ok = false;
            }
            _ => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "bad generatrix pointer on surface of revolution at DE {}",
                        self.common.sequence
                    ),
                );
                ok = false;
            }
        }
        if !ok {
            self.common.degenerate = true;
        }
        ok
    }

    fn child_ids(&self) -> Vec<EntityId> {
        self.axis.into_iter().chain(self.generatrix).collect()
    }

    fn unlink(&mut self, id: EntityId) -> bool {
        let mut cleared = false;
        if self.axis == Some(id) {
            self.axis = None;
            cleared = true;
        }
        if self.generatrix == Some(id) {
            self.generatrix = None;
            cleared = true;
        }
        cleared
    }
}
