//! Shell entity for unknown or untyped type codes
//!
//! Preserves the raw directory-entry fields and the parameter payload
//! byte-for-byte so the file round-trips losslessly, but offers no typed
//! accessors.

use super::{Entity, EntityCommon};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{ParamFormatter, ParamParser};
use crate::types::EntityId;

#[derive(Debug, Clone)]
pub struct NullEntity {
    /// Common entity data
    pub common: EntityCommon,
    type_code: i32,
    /// Parameter-block content lines, verbatim
    payload: Vec<String>,
}

impl NullEntity {
    pub fn new(type_code: i32) -> Self {
        NullEntity {
            common: EntityCommon::new(),
            type_code,
            payload: Vec::new(),
        }
    }

    /// Store the parameter-block lines exactly as read.
    pub(crate) fn capture_payload(&mut self, lines: &[String]) -> Result<()> {
        self.payload = lines.to_vec();
        Ok(())
    }

    /// The preserved payload. A shell created in memory (never read from a
    /// file) emits a bare `<type><record delimiter>` block.
    pub(crate) fn payload_lines(&self, globals: &GlobalData) -> Vec<String> {
        if self.payload.is_empty() {
            vec![format!("{}{}", self.type_code, globals.rdelim)]
        } else {
            self.payload.clone()
        }
    }

    /// The raw payload as one string, for inspection.
    pub fn raw_payload(&self) -> String {
        self.payload
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl Entity for NullEntity {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn type_code(&self) -> i32 {
        self.type_code
    }

    fn type_name(&self) -> &'static str {
        "Null"
    }

    fn allowed_forms(&self) -> &'static [i32] {
        &[]
    }

    fn read_pd(&mut self, _p: &mut ParamParser, _globals: &GlobalData) -> Result<()> {
        Err(IgesError::Custom(
            "null entity parameters are captured verbatim, not parsed".into(),
        ))
    }

    fn format_pd(
        &self,
        _f: &mut ParamFormatter,
        _globals: &GlobalData,
        _seq_map: &super::SeqMap,
    ) -> Result<()> {
        Err(IgesError::Custom(
            "null entity parameters are emitted verbatim, not formatted".into(),
        ))
    }

    fn unlink(&mut self, _id: EntityId) -> bool {
        false
    }
}
