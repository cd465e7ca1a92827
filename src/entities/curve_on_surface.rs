//! Curve on a parametric surface entity (type 142)

use super::{is_curve_type, DeIndex, Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_int, format_pointer, ParamFormatter, ParamParser};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::EntityId;

/// How the curve was created on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveCreation {
    #[default]
    Unspecified = 0,
    Projection = 1,
    Intersection = 2,
    Parametric = 3,
}

impl CurveCreation {
    pub fn from_pd(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Projection),
            2 => Some(Self::Intersection),
            3 => Some(Self::Parametric),
            _ => None,
        }
    }
}

/// Which representation of the curve is preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundPreference {
    #[default]
    Unspecified = 0,
    Parametric = 1,
    ModelSpace = 2,
    Equal = 3,
}

impl BoundPreference {
    pub fn from_pd(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Parametric),
            2 => Some(Self::ModelSpace),
            3 => Some(Self::Equal),
            _ => None,
        }
    }
}

/// A curve lying on a surface, carried in parameter space, model space,
/// or both
#[derive(Debug, Clone, Default)]
pub struct CurveOnSurface {
    /// Common entity data
    pub common: EntityCommon,
    /// How the curve was created
    pub creation: CurveCreation,
    /// Preferred representation
    pub preference: BoundPreference,
    surface_ptr: i32,
    parameter_curve_ptr: i32,
    model_curve_ptr: i32,
    /// The underlying surface
    pub surface: Option<EntityId>,
    /// Curve in the surface's parameter space
    pub parameter_curve: Option<EntityId>,
    /// Curve in model space
    pub model_curve: Option<EntityId>,
}

impl CurveOnSurface {
    pub fn new() -> Self {
        CurveOnSurface::default()
    }
}

fn is_surface_type(code: i32) -> bool {
    matches!(
        code,
        super::TYPE_SURFACE_OF_REVOLUTION | super::TYPE_RATIONAL_BSPLINE_SURFACE
    )
}

impl Entity for CurveOnSurface {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_CURVE_ON_SURFACE
    }

    fn type_name(&self) -> &'static str {
        "CurveOnSurface"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0]
    }

    fn forbids_structure(&self) -> bool {
        true
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        let crtn = p.read_int(Some(0))?;
        self.creation = CurveCreation::from_pd(crtn)
            .ok_or_else(|| IgesError::Parse(format!("bad curve creation flag {}", crtn)))?;
        self.surface_ptr = p.read_pointer()?;
        self.parameter_curve_ptr = p.read_pointer()?;
        self.model_curve_ptr = p.read_pointer()?;
        let pref = p.read_int(Some(0))?;
        self.preference = BoundPreference::from_pd(pref)
            .ok_or_else(|| IgesError::Parse(format!("bad bound preference flag {}", pref)))?;
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        _globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<()> {
        let seq = |slot: Option<EntityId>| -> Result<i32> {
            match slot {
                Some(id) => seq_map
                    .get(&id)
                    .map(|s| *s as i32)
                    .ok_or_else(|| IgesError::Format(format!("{} missing from sequence map", id))),
                None => Ok(0),
            }
        };
        f.push(format_int(self.creation as i32));
        f.push(format_pointer(seq(self.surface)?));
        f.push(format_pointer(seq(self.parameter_curve)?));
        f.push(format_pointer(seq(self.model_curve)?));
        f.push(format_int(self.preference as i32));
        Ok(())
    }

    fn associate(&mut self, index: &DeIndex, notes: &mut NotificationCollection) -> bool {
        let mut ok = true;
        let de = self.common.sequence;
        match index.resolve(self.surface_ptr) {
            Ok(Some((id, code))) if is_surface_type(code) => self.surface = Some(id),
            Ok(Some((_, code))) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "curve on surface at DE {} names type {} as its surface",
                        de, code
                    ),
                );
                ok = false;
            }
            Ok(None) => {
                notes.notify(
                    NotificationType::Error,
                    format!("curve on surface at DE {} has no surface", de),
                );
                ok = false;
            }
            Err(_) => {
                notes.notify(
                    NotificationType::Error,
                    format!("dangling surface pointer on curve on surface at DE {}", de),
                );
                ok = false;
            }
        }
        if self.parameter_curve_ptr == 0 && self.model_curve_ptr == 0 {
            notes.notify(
                NotificationType::Error,
                format!("curve on surface at DE {} carries no curve at all", de),
            );
            ok = false;
        }
        for (ptr, slot, what) in [
            (
                self.parameter_curve_ptr,
                &mut self.parameter_curve,
                "parameter-space curve",
            ),
            (self.model_curve_ptr, &mut self.model_curve, "model-space curve"),
        ] {
            if ptr == 0 {
                continue;
            }
            match index.resolve(ptr) {
                Ok(Some((id, code))) if is_curve_type(code) => *slot = Some(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("bad {} pointer on curve on surface at DE {}", what, de),
                    );
                    ok = false;
                }
            }
        }
        if !ok {
            self.common.degenerate = true;
        }
        ok
    }

    fn child_ids(&self) -> Vec<EntityId> {
        self.surface
            .into_iter()
            .chain(self.parameter_curve)
            .chain(self.model_curve)
            .collect()
    }

    fn unlink(&mut self, id: EntityId) -> bool {
        let mut cleared = false;
        for slot in [
            &mut self.surface,
            &mut self.parameter_curve,
            &mut self.model_curve,
        ] {
            if *slot == Some(id) {
                *slot = None;
                cleared = true;
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_associate() {
        let mut idx = DeIndex::new();
        idx.insert(1, EntityId::new(1), 128);
        idx.insert(3, EntityId::new(2), 102);

        let g = GlobalData::default();
        let mut cos = CurveOnSurface::new();
        let mut p = ParamParser::new("1,1,0,3,2;", g.pdelim, g.rdelim);
        cos.read_pd(&mut p, &g).unwrap();
        assert_eq!(cos.creation, CurveCreation::Projection);
        assert_eq!(cos.preference, BoundPreference::ModelSpace);

        let mut notes = NotificationCollection::new();
        assert!(cos.associate(&idx, &mut notes));
        assert_eq!(cos.surface, Some(EntityId::new(1)));
        assert_eq!(cos.model_curve, Some(EntityId::new(2)));
        assert_eq!(cos.parameter_curve, None);
    }

    #[test]
    fn test_curveless_block_degrades_entity() {
        let mut idx = DeIndex::new();
        idx.insert(1, EntityId::new(1), 128);

        let g = GlobalData::default();
        let mut cos = CurveOnSurface::new();
        let mut p = ParamParser::new("0,1,0,0,0;", g.pdelim, g.rdelim);
        cos.read_pd(&mut p, &g).unwrap();

        let mut notes = NotificationCollection::new();
        assert!(!cos.associate(&idx, &mut notes));
        assert!(cos.common.degenerate);
        assert!(notes.has_type(NotificationType::Error));
    }

    #[test]
    fn test_missing_surface_degrades_entity() {
        let mut idx = DeIndex::new();
        idx.insert(3, EntityId::new(2), 110);

        let g = GlobalData::default();
        let mut cos = CurveOnSurface::new();
        let mut p = ParamParser::new("0,0,0,3,0;", g.pdelim, g.rdelim);
        cos.read_pd(&mut p, &g).unwrap();

        let mut notes = NotificationCollection::new();
        assert!(!cos.associate(&idx, &mut notes));
        assert!(cos.common.degenerate);
        assert_eq!(cos.surface, None);
        // The model-space curve still resolves so the entity round-trips.
        assert_eq!(cos.model_curve, Some(EntityId::new(2)));
    }

    #[test]
    fn test_bad_flag_rejected() {
        let g = GlobalData::default();
        let mut cos = CurveOnSurface::new();
        let mut p = ParamParser::new("7,1,2,0,0;", g.pdelim, g.rdelim);
        assert!(cos.read_pd(&mut p, &g).is_err());
    }
}
