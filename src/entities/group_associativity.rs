//! Associativity instance entity (type 402)
//!
//! Associativities attach to other entities through the first optional
//! pointer group of a parameter block. Form 1 (group without back
//! pointers) gets typed members; other forms keep their raw parameters.
//! Membership is non-owning, so associativity graphs may be arbitrary.

use super::{DeIndex, Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_int, format_pointer, ParamFormatter, ParamParser};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{EntityId, EntityUse};

/// Form number of the group associativity
pub const FORM_GROUP: i32 = 1;

#[derive(Debug, Clone, Default)]
pub struct GroupAssociativity {
    /// Common entity data
    pub common: EntityCommon,
    member_ptrs: Vec<i32>,
    /// Resolved group members (form 1)
    pub members: Vec<EntityId>,
    /// Raw fields of untyped forms
    pub raw_values: Vec<Option<String>>,
}

impl GroupAssociativity {
    pub fn new() -> Self {
        let mut common = EntityCommon::new();
        common.form = FORM_GROUP;
        common.status.entity_use = EntityUse::LogicalPositional;
        GroupAssociativity {
            common,
            ..GroupAssociativity::default()
        }
    }
}

impl Entity for GroupAssociativity {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_ASSOCIATIVITY
    }

    fn type_name(&self) -> &'static str {
        "Associativity"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[]
    }

    fn supports_hierarchy(&self) -> bool {
        false
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        if self.common.form == FORM_GROUP {
            let n = p.read_int(None)?;
            if n < 0 {
                return Err(IgesError::Parse(format!("group declares {} members", n)));
            }
            for _ in 0..n {
                self.member_ptrs.push(p.read_pointer()?);
            }
            Ok(())
        } else {
            while !p.terminated() {
                self.raw_values.push(p.read_raw()?);
            }
            Ok(())
        }
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        _globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<()> {
        if self.common.form == FORM_GROUP {
            f.push(format_int(self.members.len() as i32));
            for id in &self.members {
                let seq = seq_map.get(id).ok_or_else(|| {
                    IgesError::Format(format!("group member {} missing from sequence map", id))
                })?;
                f.push(format_pointer(*seq as i32));
            }
        } else {
            for v in &self.raw_values {
                match v {
                    Some(text) => f.push(text.clone()),
                    None => f.push_default(),
                }
            }
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
                            "dangling member pointer on associativity at DE {}",
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

    /// Group membership never owns; cycles through it are legal.
    fn owned_child_ids(&self) -> Vec<EntityId> {
        Vec::new()
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
    fn test_group_roundtrip() {
        let g = GlobalData::default();
        let mut grp = GroupAssociativity::new();
        grp.members = vec![EntityId::new(4), EntityId::new(7)];
        let mut seq_map = SeqMap::new();
        seq_map.insert(EntityId::new(4), 1);
        seq_map.insert(EntityId::new(7), 3);

        let mut f = ParamFormatter::new(g.pdelim, g.rdelim);
        grp.format_pd(&mut f, &g, &seq_map).unwrap();
        assert_eq!(f.finish(), "2,1,3;");
    }

    #[test]
    fn test_membership_is_not_owning() {
        let mut grp = GroupAssociativity::new();
        grp.members = vec![EntityId::new(4)];
        assert_eq!(grp.child_ids().len(), 1);
        assert!(grp.owned_child_ids().is_empty());
    }

    #[test]
    fn test_unknown_form_raw_capture() {
        let g = GlobalData::default();
        let mut a = GroupAssociativity::new();
        a.common.form = 7;
        let mut p = ParamParser::new("2,5,9;", g.pdelim, g.rdelim);
        a.read_pd(&mut p, &g).unwrap();
        assert_eq!(a.raw_values.len(), 3);
        assert!(a.members.is_empty());
    }
}
