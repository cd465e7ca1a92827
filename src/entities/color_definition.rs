//! Color definition entity (type 314)
//!
//! Attached to other entities through the directory-entry color field,
//! which holds the negated DE sequence number of the definition.

use super::{Entity, EntityCommon, SeqMap};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_hollerith, format_real, ParamFormatter, ParamParser};
use crate::types::EntityUse;

/// A CMY color, each component a percentage in [0, 100], with an optional
/// display name
#[derive(Debug, Clone, Default)]
pub struct ColorDefinition {
    /// Common entity data
    pub common: EntityCommon,
    /// Cyan percentage
    pub cyan: f64,
    /// Magenta percentage
    pub magenta: f64,
    /// Yellow percentage
    pub yellow: f64,
    /// Optional color name
    pub name: Option<String>,
}

impl ColorDefinition {
    pub fn new() -> Self {
        let mut common = EntityCommon::new();
        common.status.entity_use = EntityUse::Definition;
        ColorDefinition {
            common,
            ..ColorDefinition::default()
        }
    }

    pub fn from_cmy(cyan: f64, magenta: f64, yellow: f64) -> Result<Self> {
        check_component(cyan)?;
        check_component(magenta)?;
        check_component(yellow)?;
        Ok(ColorDefinition {
            cyan,
            magenta,
            yellow,
            ..Self::new()
        })
    }
}

fn check_component(v: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&v) {
        return Err(IgesError::Parse(format!(
            "color component {} outside [0, 100]",
            v
        )));
    }
    Ok(())
}

impl Entity for ColorDefinition {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        super::TYPE_COLOR_DEFINITION
    }

    fn type_name(&self) -> &'static str {
        "ColorDefinition"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[0]
    }

    fn supports_hierarchy(&self) -> bool {
        false
    }

    fn read_pd(&mut self, p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        self.cyan = p.read_real(Some(0.0))?;
        self.magenta = p.read_real(Some(0.0))?;
        self.yellow = p.read_real(Some(0.0))?;
        check_component(self.cyan)?;
        check_component(self.magenta)?;
        check_component(self.yellow)?;
        if !p.terminated() {
            self.name = p.read_string()?;
        }
        Ok(())
    }

    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        _globals: &GlobalData,
        _seq_map: &SeqMap,
    ) -> Result<()> {
        f.push(format_real(self.cyan, 0.0));
        f.push(format_real(self.magenta, 0.0));
        f.push(format_real(self.yellow, 0.0));
        if let Some(name) = &self.name {
            f.push(format_hollerith(name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_range_enforced() {
        assert!(ColorDefinition::from_cmy(0.0, 50.0, 100.0).is_ok());
        assert!(ColorDefinition::from_cmy(-1.0, 0.0, 0.0).is_err());
        assert!(ColorDefinition::from_cmy(0.0, 101.0, 0.0).is_err());
    }

    #[test]
    fn test_pd_roundtrip_with_name() {
        let g = GlobalData::default();
        let mut c = ColorDefinition::from_cmy(10.0, 20.0, 30.0).unwrap();
        c.name = Some("solder mask".into());
        let mut f = ParamFormatter::new(g.pdelim, g.rdelim);
        c.format_pd(&mut f, &g, &SeqMap::new()).unwrap();

        let payload = f.finish();
        let mut back = ColorDefinition::new();
        let mut p = ParamParser::new(&payload, g.pdelim, g.rdelim);
        back.read_pd(&mut p, &g).unwrap();
        assert_eq!(back.cyan, 10.0);
        assert_eq!(back.name.as_deref(), Some("solder mask"));
    }

    #[test]
    fn test_name_optional() {
        let g = GlobalData::default();
        let mut back = ColorDefinition::new();
        let mut p = ParamParser::new("0.0,50.0,1.0D2;", g.pdelim, g.rdelim);
        back.read_pd(&mut p, &g).unwrap();
        assert_eq!(back.yellow, 100.0);
        assert_eq!(back.name, None);
    }
}
