//! Subfigure definition entity (type 308)

use super::{DeIndex, Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_hollerith, format_int, format_pointer, ParamFormatter, ParamParser};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{EntityId, EntityUse};

/// A named, reusable collection of entities, instanced by entity 408
///
/// `depth` is the nesting depth of subfigure definitions reachable from
/// this one. Members are owned children; a member chain may not loop back
/// to the definition.
#[derive(Debug, Clone, Default)]
pub struct SubfigureDefinition {
    /// Common entity data
    pub common: EntityCommon,
    /// Nesting depth
    pub depth: i32,
    /// Subfigure name
    pub name: String,
    member_ptrs: Vec<i32>,
    /// Resolved member entities, in order
    pub members: Vec<EntityId>,
}

impl SubfigureDefinition {
    pub fn new() -> Self {
        let mut common = EntityCommon::new();
        common.status.entity_use = EntityUse::Definition;
        SubfigureDefinition {
            common,
            ..SubfigureDefinition::default()
        }
    }

    /// Number of member entities
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Append a resolved member. The document wires the back-reference.
    pub(crate) fn push_member(&mut self, id: EntityId) {
        self.members.push(id);
    }
}

impl Entity for SubfigureDefinition {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_SUBFIGURE_DEFINITION
    }

    fn type_name(&self) -> &'static str {
        "SubfigureDefinition"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0]
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.depth = p.read_int(Some(0))?;
        self.name = p.read_string()?.unwrap_or_default();
        let n = p.read_int(None)?;
        if n < 0 {
            return Err(IgesError::Parse(format!(
                "subfigure definition declares {} members",
                n
            )));
        }
        for _ in 0..n {
            self.member_ptrs.push(p.read_pointer()?);
        }
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        _globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<()> {
        f.push(format_int(self.depth));
        f.push(format_hollerith(&self.name));
        f.push(format_int(self.members.len() as i32));
        for id in &self.members {
            let seq = seq_map.get(id).ok_or_else(|| {
                IgesError::Format(format!("subfigure member {} missing from sequence map", id))
            })?;
            f.push(format_pointer(*seq as i32));
        }
        Ok(())
    }

    fn associate(&mut self, index: &DeIndex, notes: &mut NotificationCollection) -> bool {
        let mut ok = true;
        let ptrs = std::mem::take(&mut self.member_ptrs);
        for ptr in ptrs {
            match index.resolve(ptr) {
                Ok(Some((id, _))) => self.members.push(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!(
                            "dangling member pointer on subfigure definition at DE {}",
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
        self.members.clone()
    }

    fn unlink(&mut self, id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        before != self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pd_roundtrip_with_name() {
        let g = GlobalData::default();
        let mut def = SubfigureDefinition::new();
        def.depth = 1;
        def.name = "pad,via".into(); // delimiter inside the name survives
        def.members = vec![EntityId::new(1), EntityId::new(2)];

        let mut seq_map = SeqMap::new();
        seq_map.insert(EntityId::new(1), 1);
        seq_map.insert(EntityId::new(2), 3);
        let mut f = ParamFormatter::new(g.pdelim, g.rdelim);
        def.format_pd(&mut f, &g, &seq_map).unwrap();
        let payload = f.finish();
        assert_eq!(payload, "1,7Hpad,via,2,1,3;");

        let mut back = SubfigureDefinition::new();
        let mut p = ParamParser::new(&payload, g.pdelim, g.rdelim);
        back.read_pd(&mut p, &g).unwrap();
        assert_eq!(back.depth, 1);
        assert_eq!(back.name, "pad,via");
    }

    #[test]
    fn test_default_use_is_definition() {
        let def = SubfigureDefinition::new();
        assert_eq!(def.common.status.entity_use, EntityUse::Definition);
    }
}
