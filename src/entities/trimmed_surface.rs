//! Trimmed parametric surface entity (type 144)

use super::{DeIndex, Entity, EntityCommon, SeqMap, TYPE_CURVE_ON_SURFACE};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_int, format_pointer, ParamFormatter, ParamParser};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::EntityId;

/// A surface bounded by an outer boundary and zero or more inner
/// boundaries, each a curve-on-surface entity
#[derive(Debug, Clone, Default)]
pub struct TrimmedSurface {
    /// Common entity data
    pub common: EntityCommon,
    /// The outer boundary is the surface's own boundary
    pub outer_is_surface_boundary: bool,
    surface_ptr: i32,
    outer_ptr: i32,
    inner_ptrs: Vec<i32>,
    /// The surface being trimmed
    pub surface: Option<EntityId>,
    /// Outer boundary; absent when the surface's own boundary applies
    pub outer_boundary: Option<EntityId>,
    /// Inner boundaries (holes)
    pub inner_boundaries: Vec<EntityId>,
}

impl TrimmedSurface {
    pub fn new() -> Self {
        TrimmedSurface::default()
    }
}

fn is_surface_type(code: i32) -> bool {
    matches!(
        code,
        super::TYPE_SURFACE_OF_REVOLUTION | super::TYPE_RATIONAL_BSPLINE_SURFACE
    )
}

impl Entity for TrimmedSurface {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_TRIMMED_SURFACE
    }

    fn type_name(&self) -> &'static str {
        "TrimmedSurface"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0]
    }

    fn forbids_structure(&self) -> bool {
        true
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.surface_ptr = p.read_pointer()?;
        let n1 = p.read_int(Some(0))?;
        self.outer_is_surface_boundary = match n1 {
            0 => true,
            1 => false,
            _ => {
                return Err(IgesError::Parse(format!(
                    "bad outer boundary flag {} on trimmed surface",
                    n1
                )))
            }
        };
        let n2 = p.read_int(Some(0))?;
        if n2 < 0 {
            return Err(IgesError::Parse(format!(
                "trimmed surface declares {} inner boundaries",
                n2
            )));
        }
        self.outer_ptr = p.read_pointer()?;
        for _ in 0..n2 {
            self.inner_ptrs.push(p.read_pointer()?);
        }
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
        // An unresolved surface emits 0 so a degenerate entity still
        // round-trips.
        f.push(format_pointer(seq(self.surface)?));
        f.push(format_int(if self.outer_is_surface_boundary { 0 } else { 1 }));
        f.push(format_int(self.inner_boundaries.len() as i32));
        f.push(format_pointer(seq(self.outer_boundary)?));
        for id in &self.inner_boundaries {
            f.push(format_pointer(seq(Some(*id))?));
        }
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
                    format!("trimmed surface at DE {} names type {} as its surface", de, code),
                );
                ok = false;
            }
            Ok(None) => {
                notes.notify(
                    NotificationType::Error,
                    format!("trimmed surface at DE {} has no surface", de),
                );
                ok = false;
            }
            Err(_) => {
                notes.notify(
                    NotificationType::Error,
                    format!("dangling surface pointer on trimmed surface at DE {}", de),
                );
                ok = false;
            }
        }
        if self.outer_ptr != 0 {
            match index.resolve(self.outer_ptr) {
                Ok(Some((id, TYPE_CURVE_ON_SURFACE))) => self.outer_boundary = Some(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("bad outer boundary pointer on trimmed surface at DE {}", de),
                    );
                    ok = false;
                }
            }
        }
        let inner_ptrs = std::mem::take(&mut self.inner_ptrs);
        for ptr in inner_ptrs {
            match index.resolve(ptr) {
                Ok(Some((id, TYPE_CURVE_ON_SURFACE))) => self.inner_boundaries.push(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("bad inner boundary pointer on trimmed surface at DE {}", de),
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
            .chain(self.outer_boundary)
            .chain(self.inner_boundaries.iter().copied())
            .collect()
    }

    fn unlink(&mut self, id: EntityId) -> bool {
        let mut cleared = false;
        if self.surface == Some(id) {
            self.surface = None;
            cleared = true;
        }
        if self.outer_boundary == Some(id) {
            self.outer_boundary = None;
            cleared = true;
        }
        let before = self.inner_boundaries.len();
        self.inner_boundaries.retain(|b| *b != id);
        cleared || before != self.inner_boundaries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_associate() {
        let mut idx = DeIndex::new();
        idx.insert(1, EntityId::new(1), 120);
        idx.insert(3, EntityId::new(2), 142);
        idx.insert(5, EntityId::new(3), 142);

        let g = GlobalData::default();
        let mut ts = TrimmedSurface::new();
        let mut p = ParamParser::new("1,1,1,3,5;", g.pdelim, g.rdelim);
        ts.read_pd(&mut p, &g).unwrap();
        assert!(!ts.outer_is_surface_boundary);

        let mut notes = NotificationCollection::new();
        assert!(ts.associate(&idx, &mut notes));
        assert_eq!(ts.surface, Some(EntityId::new(1)));
        assert_eq!(ts.outer_boundary, Some(EntityId::new(2)));
        assert_eq!(ts.inner_boundaries, vec![EntityId::new(3)]);
    }

    #[test]
    fn test_missing_surface_degrades_entity() {
        let g = GlobalData::default();
        let mut ts = TrimmedSurface::new();
        let mut p = ParamParser::new("0,0,0,0;", g.pdelim, g.rdelim);
        ts.read_pd(&mut p, &g).unwrap();

        let idx = DeIndex::new();
        let mut notes = NotificationCollection::new();
        assert!(!ts.associate(&idx, &mut notes));
        assert!(ts.common.degenerate);
        assert!(notes.has_type(NotificationType::Error));
    }

    #[test]
    fn test_outer_must_be_curve_on_surface() {
        let mut idx = DeIndex::new();
        idx.insert(1, EntityId::new(1), 128);
        idx.insert(3, EntityId::new(2), 110); // a bare line is not a boundary

        let g = GlobalData::default();
        let mut ts = TrimmedSurface::new();
        let mut p = ParamParser::new("1,1,0,3;", g.pdelim, g.rdelim);
        ts.read_pd(&mut p, &g).unwrap();

        let mut notes = NotificationCollection::new();
        assert!(!ts.associate(&idx, &mut notes));
        assert!(ts.common.degenerate);
    }
}
