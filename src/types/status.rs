//! Directory-entry status number
//!
//! Field 9 of the directory entry packs four two-digit sub-fields into one
//! 8-digit integer: blank status, subordinate switch, entity use, and
//! hierarchy. Each sub-field is an enumeration, not a bit set.

use crate::error::{IgesError, Result};

/// Blank status: whether the entity is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlankStatus {
    #[default]
    Visible = 0,
    Blanked = 1,
}

impl BlankStatus {
    pub fn from_de(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Visible),
            1 => Some(Self::Blanked),
            _ => None,
        }
    }
}

/// Subordinate entity switch: how the entity's existence is justified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubordinateStatus {
    #[default]
    Independent = 0,
    PhysicallyDependent = 1,
    LogicallyDependent = 2,
    PhysicallyAndLogically = 3,
}

impl SubordinateStatus {
    pub fn from_de(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Independent),
            1 => Some(Self::PhysicallyDependent),
            2 => Some(Self::LogicallyDependent),
            3 => Some(Self::PhysicallyAndLogically),
            _ => None,
        }
    }

    /// True for any dependent state
    pub fn is_dependent(&self) -> bool {
        !matches!(self, Self::Independent)
    }
}

/// Entity use flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityUse {
    #[default]
    Geometry = 0,
    Annotation = 1,
    Definition = 2,
    Other = 3,
    LogicalPositional = 4,
    Parametric2D = 5,
    ConstructionGeometry = 6,
}

impl EntityUse {
    pub fn from_de(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Geometry),
            1 => Some(Self::Annotation),
            2 => Some(Self::Definition),
            3 => Some(Self::Other),
            4 => Some(Self::LogicalPositional),
            5 => Some(Self::Parametric2D),
            6 => Some(Self::ConstructionGeometry),
            _ => None,
        }
    }
}

/// Hierarchy flag: how DE attributes propagate to children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HierarchyStatus {
    /// Global top-down: subordinate entities take this entity's attributes
    #[default]
    AllSubordinate = 0,
    /// Global defer: subordinate entities keep their own attributes
    Defer = 1,
    /// Consult the hierarchy property attached to the entity
    UseProperty = 2,
}

impl HierarchyStatus {
    pub fn from_de(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::AllSubordinate),
            1 => Some(Self::Defer),
            2 => Some(Self::UseProperty),
            _ => None,
        }
    }
}

/// The four sub-fields of DE field 9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusNumber {
    pub blank: BlankStatus,
    pub subordinate: SubordinateStatus,
    pub entity_use: EntityUse,
    pub hierarchy: HierarchyStatus,
}

impl StatusNumber {
    /// Unpack the 8-digit composite (two digits per sub-field)
    pub fn from_de(v: i32) -> Result<Self> {
        if !(0..=99_999_999).contains(&v) {
            return Err(IgesError::Parse(format!("status number {} out of range", v)));
        }
        let blank = BlankStatus::from_de(v / 1_000_000)
            .ok_or_else(|| IgesError::Parse(format!("bad blank status in {}", v)))?;
        let subordinate = SubordinateStatus::from_de((v / 10_000) % 100)
            .ok_or_else(|| IgesError::Parse(format!("bad subordinate switch in {}", v)))?;
        let entity_use = EntityUse::from_de((v / 100) % 100)
            .ok_or_else(|| IgesError::Parse(format!("bad entity use flag in {}", v)))?;
        let hierarchy = HierarchyStatus::from_de(v % 100)
            .ok_or_else(|| IgesError::Parse(format!("bad hierarchy flag in {}", v)))?;
        Ok(StatusNumber {
            blank,
            subordinate,
            entity_use,
            hierarchy,
        })
    }

    /// Pack back into the 8-digit composite
    pub fn to_de(&self) -> i32 {
        (self.blank as i32) * 1_000_000
            + (self.subordinate as i32) * 10_000
            + (self.entity_use as i32) * 100
            + self.hierarchy as i32
    }
}
