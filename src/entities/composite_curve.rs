//! Composite curve entity (type 102)

use super::{is_simple_curve_type, DeIndex, Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_pointer, ParamFormatter, ParamParser};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::EntityId;

/// An ordered list of curve segments forming one connected curve
///
/// Segments must be simple curve kinds (100, 104, 110, 126); a composite
/// may not nest another composite. The segments are owned children: each
/// carries a back-reference to this entity, and a segment chain may not
/// loop back to it.
#[derive(Debug, Clone, Default)]
pub struct CompositeCurve {
    /// Common entity data
    pub common: EntityCommon,
    /// Raw segment pointers pending association
    segment_ptrs: Vec<i32>,
    /// Resolved segment entities, in curve order
    pub segments: Vec<EntityId>,
}

impl CompositeCurve {
    pub fn new() -> Self {
        CompositeCurve::default()
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Append a resolved segment. The document wires the back-reference.
    pub(crate) fn push_segment(&mut self, id: EntityId) {
        self.segments.push(id);
    }
}

impl Entity for CompositeCurve {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_COMPOSITE_CURVE
    }

    fn type_name(&self) -> &'static str {
        "CompositeCurve"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0]
    }

    fn forbids_structure(&self) -> bool {
        true
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        let n = p.read_int(None)?;
        if n < 0 {
            return Err(IgesError::Parse(format!(
                "composite curve declares {} segments",
                n
            )));
        }
        for _ in 0..n {
            self.segment_ptrs.push(p.read_pointer()?);
        }
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        _globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<()> {
        f.push(self.segments.len().to_string());
        for id in &self.segments {
            let seq = seq_map.get(id).ok_or_else(|| {
                IgesError::Format(format!("composite segment {} missing from sequence map", id))
            })?;
            f.push(format_pointer(*seq as i32));
        }
        Ok(())
    }

    fn associate(&mut self, index: &DeIndex, notes: &mut NotificationCollection) -> bool {
        let mut ok = true;
        let ptrs = std::mem::take(&mut self.segment_ptrs);
        for ptr in ptrs {
            match index.resolve(ptr) {
                Ok(Some((id, code))) if is_simple_curve_type(code) => self.segments.push(id),
                Ok(Some((_, code))) => {
                    notes.notify(
                        NotificationType::Error,
                        format!(
                            "composite curve at DE {} references non-curve type {}",
                            self.common.sequence, code
                        ),
                    );
                    ok = false;
                }
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!(
                            "dangling segment pointer on composite curve at DE {}",
                            self.common.sequence
                        ),
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
        self.segments.clone()
    }

    fn unlink(&mut self, id: EntityId) -> bool {
        let before = self.segments.len();
        self.segments.retain(|s| *s != id);
        before != self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associate_accepts_curves_only() {
        let mut idx = DeIndex::new();
        idx.insert(1, EntityId::new(10), 110);
        idx.insert(3, EntityId::new(11), 314);

        let g = GlobalData::default();
        let mut cc = CompositeCurve::new();
        let mut p = ParamParser::new("2,1,3;", g.pdelim, g.rdelim);
        cc.read_pd(&mut p, &g).unwrap();

        let mut notes = NotificationCollection::new();
        assert!(!cc.associate(&idx, &mut notes));
        assert!(cc.common.degenerate);
        assert_eq!(cc.segments, vec![EntityId::new(10)]);
        assert!(notes.has_type(NotificationType::Error));
    }

    #[test]
    fn test_unlink_removes_segment() {
        let mut cc = CompositeCurve::new();
        cc.push_segment(EntityId::new(1));
        cc.push_segment(EntityId::new(2));
        assert!(cc.unlink(EntityId::new(1)));
        assert!(!cc.unlink(EntityId::new(1)));
        assert_eq!(cc.segments, vec![EntityId::new(2)]);
    }
}
