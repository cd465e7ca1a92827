//! Singular subfigure instance entity (type 408)

use super::{DeIndex, Entity, EntityCommon, SeqMap, TYPE_SUBFIGURE_DEFINITION};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_pointer, format_real, ParamFormatter, ParamParser};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{EntityId, Point3};

/// One placement of a subfigure definition: a translation plus a uniform
/// scale applied to the definition's entities
#[derive(Debug, Clone)]
pub struct SubfigureInstance {
    /// Common entity data
    pub common: EntityCommon,
    definition_ptr: i32,
    /// The subfigure definition being instanced
    pub definition: Option<EntityId>,
    /// Placement offset
    pub offset: Point3,
    /// Uniform scale factor
    pub scale: f64,
}

impl SubfigureInstance {
    pub fn new() -> Self {
        SubfigureInstance {
            common: EntityCommon::new(),
            definition_ptr: 0,
            definition: None,
            offset: Point3::ZERO,
            scale: 1.0,
        }
    }
}

impl Default for SubfigureInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for SubfigureInstance {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_SUBFIGURE_INSTANCE
    }

    fn type_name(&self) -> &'static str {
        "SubfigureInstance"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0]
    }

    fn rescale(&mut self, sf: f64) {
        // The offset is a model-space length; the scale factor is not.
        self.offset = self.offset * sf;
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.definition_ptr = p.read_pointer()?;
        self.offset.x = p.read_real(Some(0.0))?;
        self.offset.y = p.read_real(Some(0.0))?;
        self.offset.z = p.read_real(Some(0.0))?;
        self.scale = p.read_real(Some(1.0))?;
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<()> {
        // An unresolved definition emits 0 so a degenerate entity still
        // round-trips.
        let seq = match self.definition {
            Some(id) => *seq_map
                .get(&id)
                .ok_or_else(|| IgesError::Format(format!("{} missing from sequence map", id)))?
                as i32,
            None => 0,
        };
        f.push(format_pointer(seq));
        let uir = globals.min_resolution;
        f.push(format_real(self.offset.x, uir));
        f.push(format_real(self.offset.y, uir));
        f.push(format_real(self.offset.z, uir));
        f.push(format_real(self.scale, 0.0));
        Ok(())
    }

    fn associate(&mut self, index: &DeIndex, notes: &mut NotificationCollection) -> bool {
        match index.resolve(self.definition_ptr) {
            Ok(Some((id, TYPE_SUBFIGURE_DEFINITION))) => {
                self.definition = Some(id);
                true
            }
            Ok(Some((_, code))) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "subfigure instance at DE {} names type {} as its definition",
                        self.common.sequence, code
                    ),
                );
                self.common.degenerate = true;
                false
            }
            Ok(None) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "subfigure instance at DE {} names no definition",
                        self.common.sequence
                    ),
                );
                self.common.degenerate = true;
                false
            }
            Err(_) => {
                notes.notify(
                    NotificationType::Error,
                    format!(
                        "dangling definition pointer on subfigure instance at DE {}",
                        self.common.sequence
                    ),
                );
                self.common.degenerate = true;
                false
            }
        }
    }

    fn child_ids(&self) -> Vec<EntityId> {
        self.definition.into_iter().collect()
    }

    fn unlink(&mut self, id: EntityId) -> bool {
        if self.definition == Some(id) {
            self.definition = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_defaults() {
        let g = GlobalData::default();
        let mut inst = SubfigureInstance::new();
        // offset and scale all defaulted
        let mut p = ParamParser::new("5,,,,;", g.pdelim, g.rdelim);
        inst.read_pd(&mut p, &g).unwrap();
        assert_eq!(inst.definition_ptr, 5);
        assert_eq!(inst.offset, Point3::ZERO);
        assert_eq!(inst.scale, 1.0);
    }

    #[test]
    fn test_missing_definition_degrades_entity() {
        let g = GlobalData::default();
        let mut inst = SubfigureInstance::new();
        let mut p = ParamParser::new("0,1.0,2.0,0.0,1.0;", g.pdelim, g.rdelim);
        inst.read_pd(&mut p, &g).unwrap();

        let idx = DeIndex::new();
        let mut notes = NotificationCollection::new();
        assert!(!inst.associate(&idx, &mut notes));
        assert!(inst.common.degenerate);
        assert!(notes.has_type(NotificationType::Error));
    }

    #[test]
    fn test_definition_kind_enforced() {
        let mut idx = DeIndex::new();
        idx.insert(5, EntityId::new(9), 110);

        let g = GlobalData::default();
        let mut inst = SubfigureInstance::new();
        let mut p = ParamParser::new("5,1.0,2.0,0.0,2.5;", g.pdelim, g.rdelim);
        inst.read_pd(&mut p, &g).unwrap();

        let mut notes = NotificationCollection::new();
        assert!(!inst.associate(&idx, &mut notes));
        assert!(inst.common.degenerate);
    }

    #[test]
    fn test_rescale_scales_offset_not_factor() {
        let mut inst = SubfigureInstance::new();
        inst.offset = Point3::new(1.0, 0.0, 0.0);
        inst.scale = 2.0;
        inst.rescale(25.4);
        assert_eq!(inst.offset.x, 25.4);
        assert_eq!(inst.scale, 2.0);
    }
}
