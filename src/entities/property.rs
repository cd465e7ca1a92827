//! Property entity (type 406)
//!
//! Properties attach to other entities through the second optional pointer
//! group of a parameter block. Only form 15 (name property) gets typed
//! fields; every other form keeps its raw parameters so the file
//! round-trips.

use super::{Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_hollerith, ParamFormatter, ParamParser};
use crate::types::EntityUse;

/// Form number of the name property
pub const FORM_NAME: i32 = 15;

#[derive(Debug, Clone, Default)]
pub struct Property {
    /// Common entity data
    pub common: EntityCommon,
    /// The name carried by a form-15 property
    pub name: Option<String>,
    /// Raw fields of untyped forms, in order; `None` marks a defaulted field
    pub raw_values: Vec<Option<String>>,
}

impl Property {
    pub fn new() -> Self {
        let mut common = EntityCommon::new();
        common.status.entity_use = EntityUse::Definition;
        common.form = FORM_NAME;
        Property {
            common,
            ..Property::default()
        }
    }

    /// Create a form-15 name property
    pub fn with_name(name: impl Into<String>) -> Self {
        Property {
            name: Some(name.into()),
            ..Self::new()
        }
    }
}

impl Entity for Property {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_PROPERTY
    }

    fn type_name(&self) -> &'static str {
        "Property"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        // Forms are an open set; unrecognised ones round-trip untyped.
        &[]
    }

    fn supports_hierarchy(&self) -> bool {
        false
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        if self.common.form == FORM_NAME {
            let np = p.read_int(Some(1))?;
            if np != 1 {
                return Err(IgesError::Parse(format!(
                    "name property declares {} values, expected 1",
                    np
                )));
            }
            self.name = p.read_string()?;
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
        _seq_map: &SeqMap,
    ) -> Result<()> {
        if self.common.form == FORM_NAME {
            f.push("1");
            f.push(format_hollerith(self.name.as_deref().unwrap_or_default()));
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_property_roundtrip() {
        let g = GlobalData::default();
        let prop = Property::with_name("THRU_HOLE");
        let mut f = ParamFormatter::new(g.pdelim, g.rdelim);
        prop.format_pd(&mut f, &g, &SeqMap::new()).unwrap();
        let payload = f.finish();
        assert_eq!(payload, "1,9HTHRU_HOLE;");

        let mut back = Property::new();
        let mut p = ParamParser::new(&payload, g.pdelim, g.rdelim);
        back.read_pd(&mut p, &g).unwrap();
        assert_eq!(back.name.as_deref(), Some("THRU_HOLE"));
    }

    #[test]
    fn test_untyped_form_preserves_fields() {
        let g = GlobalData::default();
        let mut prop = Property::new();
        prop.common.form = 5; // line widening: raw capture
        let mut p = ParamParser::new("3,0.25,1,,4Habcd;", g.pdelim, g.rdelim);
        prop.read_pd(&mut p, &g).unwrap();
        assert_eq!(prop.raw_values.len(), 5);
        assert_eq!(prop.raw_values[3], None);
        assert_eq!(prop.raw_values[4].as_deref(), Some("4Habcd"));

        let mut f = ParamFormatter::new(g.pdelim, g.rdelim);
        prop.format_pd(&mut f, &g, &SeqMap::new()).unwrap();
        assert_eq!(f.finish(), "3,0.25,1,,4Habcd;");
    }
}
