//! Parameter-field codec
//!
//! IGES parameter data is free-format text whose fields are separated by a
//! model-chosen parameter delimiter and terminated by a model-chosen record
//! delimiter. The delimiter pair is threaded through every call explicitly;
//! there is no module-level state. Strings are Hollerith constants
//! (`<n>H<n bytes>`) whose length prefix counts **bytes**, so a string may
//! freely contain either delimiter.

use crate::error::{IgesError, Result};

/// Cursor over one entity's concatenated parameter payload.
///
/// All `read_*` methods consume the field's trailing delimiter. Reading
/// stops permanently at the record delimiter; attempting to read past it is
/// an error. An empty field (two consecutive delimiters) yields the
/// caller-supplied default, and is an error if no default is given.
pub struct ParamParser<'a> {
    data: &'a [u8],
    pos: usize,
    pdelim: u8,
    rdelim: u8,
    terminated: bool,
}

impl<'a> ParamParser<'a> {
    pub fn new(data: &'a str, pdelim: char, rdelim: char) -> Self {
        ParamParser {
            data: data.as_bytes(),
            pos: 0,
            pdelim: pdelim as u8,
            rdelim: rdelim as u8,
            terminated: false,
        }
    }

    /// True once the record delimiter has been consumed.
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Byte offset of the cursor into the payload.
    pub fn byte_pos(&self) -> usize {
        self.pos
    }

    /// Everything after the record delimiter (must be blank in a valid block).
    pub fn trailing(&self) -> &'a str {
        if self.terminated {
            std::str::from_utf8(&self.data[self.pos..]).unwrap_or("")
        } else {
            ""
        }
    }

    fn guard(&self) -> Result<()> {
        if self.terminated {
            return Err(IgesError::Parse(
                "attempted to read past the record delimiter".into(),
            ));
        }
        Ok(())
    }

    /// Consume the next raw field up to the parameter or record delimiter.
    /// Returns `None` for an empty (defaulted) field.
    fn raw_field(&mut self) -> Result<Option<&'a str>> {
        self.guard()?;
        let start = self.pos;
        while self.pos < self.data.len() {
            let b = self.data[self.pos];
            if b == self.pdelim || b == self.rdelim {
                let field = std::str::from_utf8(&self.data[start..self.pos])
                    .map_err(|_| IgesError::Parse("non-ASCII parameter data".into()))?;
                if b == self.rdelim {
                    self.terminated = true;
                }
                self.pos += 1;
                let field = field.trim();
                return Ok(if field.is_empty() { None } else { Some(field) });
            }
            self.pos += 1;
        }
        Err(IgesError::Parse(
            "parameter block not terminated by record delimiter".into(),
        ))
    }

    /// Read an integer field.
    pub fn read_int(&mut self, default: Option<i32>) -> Result<i32> {
        match self.raw_field()? {
            Some(field) => field
                .parse::<i32>()
                .map_err(|_| IgesError::Parse(format!("bad integer field '{}'", field))),
            None => default.ok_or_else(|| {
                IgesError::Parse("missing integer field with no default".into())
            }),
        }
    }

    /// Read a real field. Accepts both `E` and `D` exponent markers.
    pub fn read_real(&mut self, default: Option<f64>) -> Result<f64> {
        match self.raw_field()? {
            Some(field) => {
                let normalized = field.replace(['D', 'd'], "E");
                normalized
                    .parse::<f64>()
                    .map_err(|_| IgesError::Parse(format!("bad real field '{}'", field)))
            }
            None => {
                default.ok_or_else(|| IgesError::Parse("missing real field with no default".into()))
            }
        }
    }

    /// Read a pointer field: a possibly negative DE sequence number, 0 when
    /// absent. Resolution happens later, in the associate pass.
    pub fn read_pointer(&mut self) -> Result<i32> {
        self.read_int(Some(0))
    }

    /// Read a logical field (0 or 1).
    pub fn read_logical(&mut self, default: Option<bool>) -> Result<bool> {
        let v = self.read_int(default.map(|b| b as i32))?;
        match v {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(IgesError::Parse(format!("bad logical field '{}'", v))),
        }
    }

    /// Read one field of unknown type, preserving its textual form so it
    /// can be re-emitted verbatim. Hollerith strings are consumed with
    /// byte-count semantics and re-encoded. Returns `None` for a defaulted
    /// field.
    pub fn read_raw(&mut self) -> Result<Option<String>> {
        self.guard()?;
        // Peek: digits followed by 'H' mean a Hollerith constant.
        let mut probe = self.pos;
        while probe < self.data.len() && self.data[probe] == b' ' {
            probe += 1;
        }
        let digits_start = probe;
        while probe < self.data.len() && self.data[probe].is_ascii_digit() {
            probe += 1;
        }
        if probe > digits_start && probe < self.data.len() && self.data[probe] == b'H' {
            return Ok(self.read_string()?.map(|s| format_hollerith(&s)));
        }
        Ok(self.raw_field()?.map(|s| s.to_string()))
    }

    /// Read a Hollerith string field. Returns `None` for a defaulted field.
    ///
    /// The length prefix counts bytes, and the counted bytes are taken
    /// verbatim, so embedded delimiter characters survive.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        self.guard()?;
        // Leading blanks are allowed before the length prefix.
        while self.pos < self.data.len() && self.data[self.pos] == b' ' {
            self.pos += 1;
        }
        if self.pos >= self.data.len() {
            return Err(IgesError::Parse(
                "parameter block not terminated by record delimiter".into(),
            ));
        }
        let b = self.data[self.pos];
        if b == self.pdelim || b == self.rdelim {
            if b == self.rdelim {
                self.terminated = true;
            }
            self.pos += 1;
            return Ok(None);
        }
        let digits_start = self.pos;
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos == digits_start || self.pos >= self.data.len() || self.data[self.pos] != b'H' {
            return Err(IgesError::Parse("malformed Hollerith string".into()));
        }
        let count: usize = std::str::from_utf8(&self.data[digits_start..self.pos])
            .unwrap()
            .parse()
            .map_err(|_| IgesError::Parse("Hollerith length overflow".into()))?;
        self.pos += 1; // skip 'H'
        if self.pos + count > self.data.len() {
            return Err(IgesError::Parse(format!(
                "Hollerith string shorter than declared length {}",
                count
            )));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| IgesError::Parse("non-ASCII Hollerith content".into()))?
            .to_string();
        // The string must be followed immediately by a delimiter.
        if self.pos >= self.data.len() {
            return Err(IgesError::Parse(
                "parameter block not terminated by record delimiter".into(),
            ));
        }
        let d = self.data[self.pos];
        if d == self.rdelim {
            self.terminated = true;
        } else if d != self.pdelim {
            return Err(IgesError::Parse(format!(
                "Hollerith length mismatch: expected delimiter after {} bytes",
                count
            )));
        }
        self.pos += 1;
        Ok(Some(s))
    }
}

/// Format an integer field.
pub fn format_int(v: i32) -> String {
    v.to_string()
}

/// Format a logical field.
pub fn format_logical(v: bool) -> String {
    if v { "1".into() } else { "0".into() }
}

/// Format a pointer field (0 = absent).
pub fn format_pointer(v: i32) -> String {
    v.to_string()
}

/// Format a real field in IGES `D`-exponent form with trailing zeros
/// trimmed. Magnitudes below `min_res` are rounded to zero.
pub fn format_real(v: f64, min_res: f64) -> String {
    let v = if v.abs() < min_res.abs() { 0.0 } else { v };
    if v == 0.0 {
        return "0.0".into();
    }
    // `{:E}` gives a normalized mantissa with one leading digit.
    let s = format!("{:.14E}", v);
    let (mantissa, exponent) = s.split_once('E').expect("exponential form");
    let mantissa = match mantissa.split_once('.') {
        Some((int_part, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{}.0", int_part)
            } else {
                format!("{}.{}", int_part, frac)
            }
        }
        None => format!("{}.0", mantissa),
    };
    format!("{}D{}", mantissa, exponent)
}

/// Format a Hollerith string field, counting bytes.
pub fn format_hollerith(s: &str) -> String {
    format!("{}H{}", s.len(), s)
}

/// Accumulates formatted fields and assembles the delimited payload.
pub struct ParamFormatter {
    pdelim: char,
    rdelim: char,
    items: Vec<String>,
}

impl ParamFormatter {
    pub fn new(pdelim: char, rdelim: char) -> Self {
        ParamFormatter {
            pdelim,
            rdelim,
            items: Vec::new(),
        }
    }

    /// Append one formatted field.
    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Append an empty (defaulted) field.
    pub fn push_default(&mut self) {
        self.items.push(String::new());
    }

    /// Join the fields with the parameter delimiter and terminate the
    /// record with the record delimiter.
    pub fn finish(self) -> String {
        let mut out = self.items.join(&self.pdelim.to_string());
        out.push(self.rdelim);
        out
    }
}

/// Break a payload into content lines of at most `width` columns.
///
/// Readers reassemble the payload by concatenating the content columns of
/// every record, so a cut that lands inside a field is harmless.
pub fn wrap_payload(payload: &str, width: usize) -> Vec<String> {
    let bytes = payload.as_bytes();
    if bytes.is_empty() {
        return vec![String::new()];
    }
    bytes
        .chunks(width)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let mut p = ParamParser::new("110,1.5,-2,0.625D2,1;", ',', ';');
        assert_eq!(p.read_int(None).unwrap(), 110);
        assert_eq!(p.read_real(None).unwrap(), 1.5);
        assert_eq!(p.read_pointer().unwrap(), -2);
        assert_eq!(p.read_real(None).unwrap(), 62.5);
        assert!(p.read_logical(None).unwrap());
        assert!(p.terminated());
    }

    #[test]
    fn test_defaulted_fields() {
        let mut p = ParamParser::new("1,,3;", ',', ';');
        assert_eq!(p.read_int(None).unwrap(), 1);
        assert_eq!(p.read_int(Some(42)).unwrap(), 42);
        assert_eq!(p.read_int(None).unwrap(), 3);
    }

    #[test]
    fn test_missing_default_is_error() {
        let mut p = ParamParser::new(",;", ',', ';');
        assert!(p.read_int(None).is_err());
    }

    #[test]
    fn test_read_past_terminator_is_error() {
        let mut p = ParamParser::new("1;", ',', ';');
        assert_eq!(p.read_int(None).unwrap(), 1);
        assert!(p.read_int(Some(0)).is_err());
    }

    #[test]
    fn test_unterminated_block() {
        let mut p = ParamParser::new("1,2,3", ',', ';');
        assert_eq!(p.read_int(None).unwrap(), 1);
        assert_eq!(p.read_int(None).unwrap(), 2);
        assert!(p.read_int(None).is_err());
    }

    #[test]
    fn test_hollerith_with_embedded_delimiters() {
        let mut p = ParamParser::new("12Hhello, world;", ',', ';');
        assert_eq!(p.read_string().unwrap().unwrap(), "hello, world");
        assert!(p.terminated());
    }

    #[test]
    fn test_hollerith_roundtrip() {
        for s in ["a", "semi;colon", "1H,", "plain"] {
            let encoded = format!("{},", format_hollerith(s));
            let mut p = ParamParser::new(&encoded, ',', ';');
            assert_eq!(p.read_string().unwrap().unwrap(), s);
        }
    }

    #[test]
    fn test_hollerith_length_mismatch() {
        let mut p = ParamParser::new("5Habc,1;", ',', ';');
        assert!(p.read_string().is_err());
    }

    #[test]
    fn test_custom_delimiters() {
        let mut p = ParamParser::new("110/2.0/3.0#", '/', '#');
        assert_eq!(p.read_int(None).unwrap(), 110);
        assert_eq!(p.read_real(None).unwrap(), 2.0);
        assert_eq!(p.read_real(None).unwrap(), 3.0);
        assert!(p.terminated());
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(25.4, 1e-12), "2.54D1");
        assert_eq!(format_real(0.0, 1e-12), "0.0");
        assert_eq!(format_real(1.0, 1e-12), "1.0D0");
        assert_eq!(format_real(-0.5, 1e-12), "-5.0D-1");
        // below resolution rounds to zero
        assert_eq!(format_real(1e-9, 1e-3), "0.0");
    }

    #[test]
    fn test_format_real_parses_back() {
        for v in [25.4, -1.0e-7, 3.14159265358979, 6.02e23] {
            let s = format_real(v, 1e-15).replace('D', "E");
            let back: f64 = s.parse().unwrap();
            assert!((back - v).abs() <= v.abs() * 1e-13);
        }
    }

    #[test]
    fn test_formatter_assembles_payload() {
        let mut f = ParamFormatter::new(',', ';');
        f.push("110");
        f.push(format_real(1.0, 1e-12));
        f.push_default();
        f.push("3");
        assert_eq!(f.finish(), "110,1.0D0,,3;");
    }

    #[test]
    fn test_wrap_payload() {
        let lines = wrap_payload("abcdefgh", 3);
        assert_eq!(lines, vec!["abc", "def", "gh"]);
        assert_eq!(wrap_payload("", 64), vec![""]);
    }
}
