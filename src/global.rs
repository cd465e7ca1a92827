//! Global-section model
//!
//! The G section carries 25 semantic fields describing the file: the
//! delimiter pair that governs every parameter-data parse downstream,
//! identification strings, numeric precision declarations, units, and
//! timestamps. The unit conversion factor `cf` is derived from the units
//! flag and applied to geometry on load when conversion is enabled.

use crate::error::{IgesError, Result};
use crate::io::params::{format_hollerith, format_int, format_real, ParamParser};

/// IGES units flag values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    Inch = 1,
    #[default]
    Millimeter = 2,
    /// Unit named by the units-name field
    UserDefined = 3,
    Foot = 4,
    Mile = 5,
    Meter = 6,
    Kilometer = 7,
    Mil = 8,
    Micron = 9,
    Centimeter = 10,
    Microinch = 11,
}

impl Units {
    /// Decode the global-section units flag
    pub fn from_flag(flag: i32) -> Option<Self> {
        match flag {
            1 => Some(Units::Inch),
            2 => Some(Units::Millimeter),
            3 => Some(Units::UserDefined),
            4 => Some(Units::Foot),
            5 => Some(Units::Mile),
            6 => Some(Units::Meter),
            7 => Some(Units::Kilometer),
            8 => Some(Units::Mil),
            9 => Some(Units::Micron),
            10 => Some(Units::Centimeter),
            11 => Some(Units::Microinch),
            _ => None,
        }
    }

    /// The units flag value written to the file
    pub fn flag(&self) -> i32 {
        *self as i32
    }

    /// One unit expressed in millimetres. User-defined units report 1.0.
    pub fn to_mm(&self) -> f64 {
        match self {
            Units::Inch => 25.4,
            Units::Millimeter => 1.0,
            Units::UserDefined => 1.0,
            Units::Foot => 304.8,
            Units::Mile => 1_609_344.0,
            Units::Meter => 1000.0,
            Units::Kilometer => 1.0e6,
            Units::Mil => 0.0254,
            Units::Micron => 0.001,
            Units::Centimeter => 10.0,
            Units::Microinch => 2.54e-5,
        }
    }

    /// Canonical units-name string
    pub fn name(&self) -> &'static str {
        match self {
            Units::Inch => "IN",
            Units::Millimeter => "MM",
            Units::UserDefined => "",
            Units::Foot => "FT",
            Units::Mile => "MI",
            Units::Meter => "M",
            Units::Kilometer => "KM",
            Units::Mil => "MIL",
            Units::Micron => "UM",
            Units::Centimeter => "CM",
            Units::Microinch => "UIN",
        }
    }
}

/// The parsed global section plus the model-level conversion switches
#[derive(Debug, Clone)]
pub struct GlobalData {
    /// Parameter delimiter (field 1, default `,`)
    pub pdelim: char,
    /// Record delimiter (field 2, default `;`)
    pub rdelim: char,
    /// Product identification from the sending system
    pub product_id: String,
    /// File name
    pub file_name: String,
    /// Native system id
    pub native_system_id: String,
    /// Preprocessor version
    pub preprocessor_version: String,
    /// Number of binary bits for integer representation
    pub integer_bits: i32,
    /// Max power of ten in a single-precision float
    pub single_max_power: i32,
    /// Significant digits in a single-precision float
    pub single_significant: i32,
    /// Max power of ten in a double-precision float
    pub double_max_power: i32,
    /// Significant digits in a double-precision float
    pub double_significant: i32,
    /// Product identification for the receiving system
    pub receiving_product_id: String,
    /// Model space scale
    pub model_scale: f64,
    /// Units flag
    pub units: Units,
    /// Units name (meaningful for user-defined units)
    pub units_name: String,
    /// Maximum number of line-weight gradations
    pub line_weight_gradations: i32,
    /// Width of the maximum line weight in units
    pub max_line_weight: f64,
    /// File creation timestamp, `YYYYMMDD.HHNNSS`
    pub creation_date: String,
    /// Minimum user-intended resolution
    pub min_resolution: f64,
    /// Approximate maximum coordinate value
    pub max_coordinate: f64,
    /// Author
    pub author: String,
    /// Author's organisation
    pub organization: String,
    /// Version flag (11 = IGES 5.3)
    pub version_flag: i32,
    /// Drafting standard flag
    pub drafting_standard: i32,
    /// Last modification timestamp
    pub modification_date: String,
    /// Application protocol / subset identifier
    pub application_protocol: String,

    /// Convert geometry to millimetres on read
    pub convert: bool,
    /// Unit conversion factor, file units to millimetres
    pub cf: f64,
}

impl Default for GlobalData {
    fn default() -> Self {
        GlobalData {
            pdelim: ',',
            rdelim: ';',
            product_id: String::new(),
            file_name: String::new(),
            native_system_id: String::from("igesrust"),
            preprocessor_version: format!("igesrust {}", env!("CARGO_PKG_VERSION")),
            integer_bits: 32,
            single_max_power: 38,
            single_significant: 6,
            double_max_power: 308,
            double_significant: 15,
            receiving_product_id: String::new(),
            model_scale: 1.0,
            units: Units::Millimeter,
            units_name: String::from("MM"),
            line_weight_gradations: 1,
            max_line_weight: 1.0,
            creation_date: String::new(),
            min_resolution: 1e-3,
            max_coordinate: 0.0,
            author: String::new(),
            organization: String::new(),
            version_flag: 11,
            drafting_standard: 0,
            modification_date: String::new(),
            application_protocol: String::new(),
            convert: true,
            cf: 1.0,
        }
    }
}

impl GlobalData {
    /// Change the units flag and re-derive `cf`
    pub fn set_units(&mut self, units: Units) {
        self.units = units;
        self.units_name = units.name().to_string();
        self.recompute_cf();
    }

    /// Re-derive the conversion factor from the units flag and the
    /// conversion switch. `cf` is 1.0 unless conversion is enabled and the
    /// file units differ from millimetres.
    pub fn recompute_cf(&mut self) {
        self.cf = if self.convert { self.units.to_mm() } else { 1.0 };
    }

    /// Current local time in IGES timestamp form
    pub fn timestamp_now() -> String {
        chrono::Local::now().format("%Y%m%d.%H%M%S").to_string()
    }

    /// Parse the concatenated G-section payload (content columns of every
    /// G record joined in order).
    pub fn parse(payload: &str, convert: bool) -> Result<GlobalData> {
        let mut g = GlobalData {
            convert,
            ..GlobalData::default()
        };
        let bytes = payload.as_bytes();

        // Fields 1 and 2 define the delimiters themselves, so they cannot
        // go through the ordinary field scanner. Each is either defaulted
        // (the field is empty) or a one-byte Hollerith.
        let mut pos = 0;
        g.pdelim = match read_delim_field(bytes, &mut pos, b',')? {
            Some(c) => c,
            None => ',',
        };
        let pd = g.pdelim as u8;
        g.rdelim = match read_delim_field(bytes, &mut pos, pd)? {
            Some(c) => c,
            None => ';',
        };
        if g.pdelim == g.rdelim {
            return Err(IgesError::Global(
                "parameter and record delimiters must differ".into(),
            ));
        }

        let rest = std::str::from_utf8(&bytes[pos..])
            .map_err(|_| IgesError::Global("non-ASCII global section".into()))?;
        let mut p = ParamParser::new(rest, g.pdelim, g.rdelim);
        let d = GlobalData::default();

        g.product_id = read_opt_string(&mut p)?.unwrap_or_default();
        g.file_name = read_opt_string(&mut p)?.unwrap_or_default();
        g.native_system_id = read_opt_string(&mut p)?.unwrap_or(d.native_system_id);
        g.preprocessor_version = read_opt_string(&mut p)?.unwrap_or(d.preprocessor_version);
        g.integer_bits = read_opt_int(&mut p, d.integer_bits)?;
        g.single_max_power = read_opt_int(&mut p, d.single_max_power)?;
        g.single_significant = read_opt_int(&mut p, d.single_significant)?;
        g.double_max_power = read_opt_int(&mut p, d.double_max_power)?;
        g.double_significant = read_opt_int(&mut p, d.double_significant)?;
        g.receiving_product_id = read_opt_string(&mut p)?.unwrap_or_default();
        g.model_scale = read_opt_real(&mut p, d.model_scale)?;
        let flag = read_opt_int(&mut p, Units::Millimeter.flag())?;
        g.units = Units::from_flag(flag)
            .ok_or_else(|| IgesError::Global(format!("unknown units flag {}", flag)))?;
        g.units_name = read_opt_string(&mut p)?.unwrap_or_else(|| g.units.name().to_string());
        g.line_weight_gradations = read_opt_int(&mut p, d.line_weight_gradations)?;
        g.max_line_weight = read_opt_real(&mut p, d.max_line_weight)?;
        g.creation_date = read_opt_string(&mut p)?.unwrap_or_default();
        g.min_resolution = read_opt_real(&mut p, d.min_resolution)?;
        g.max_coordinate = read_opt_real(&mut p, d.max_coordinate)?;
        g.author = read_opt_string(&mut p)?.unwrap_or_default();
        g.organization = read_opt_string(&mut p)?.unwrap_or_default();
        g.version_flag = read_opt_int(&mut p, d.version_flag)?;
        g.drafting_standard = read_opt_int(&mut p, d.drafting_standard)?;
        g.modification_date = read_opt_string(&mut p)?.unwrap_or_default();
        g.application_protocol = read_opt_string(&mut p)?.unwrap_or_default();

        if !p.terminated() {
            return Err(IgesError::Global(
                "global section not terminated by record delimiter".into(),
            ));
        }
        if !p.trailing().trim().is_empty() {
            return Err(IgesError::Global(
                "content after global section record delimiter".into(),
            ));
        }

        g.recompute_cf();
        Ok(g)
    }

    /// Format the 25 fields as one delimited payload (the writer wraps it
    /// into 72-column records).
    pub fn format(&self) -> String {
        let pd = self.pdelim;
        let mut items: Vec<String> = Vec::with_capacity(26);
        items.push(format_hollerith(&self.pdelim.to_string()));
        items.push(format_hollerith(&self.rdelim.to_string()));
        items.push(format_hollerith(&self.product_id));
        items.push(format_hollerith(&self.file_name));
        items.push(format_hollerith(&self.native_system_id));
        items.push(format_hollerith(&self.preprocessor_version));
        items.push(format_int(self.integer_bits));
        items.push(format_int(self.single_max_power));
        items.push(format_int(self.single_significant));
        items.push(format_int(self.double_max_power));
        items.push(format_int(self.double_significant));
        items.push(format_hollerith(&self.receiving_product_id));
        items.push(format_real(self.model_scale, 0.0));
        items.push(format_int(self.units.flag()));
        items.push(format_hollerith(&self.units_name));
        items.push(format_int(self.line_weight_gradations));
        items.push(format_real(self.max_line_weight, 0.0));
        items.push(format_hollerith(&self.creation_date));
        items.push(format_real(self.min_resolution, 0.0));
        items.push(format_real(self.max_coordinate, 0.0));
        items.push(format_hollerith(&self.author));
        items.push(format_hollerith(&self.organization));
        items.push(format_int(self.version_flag));
        items.push(format_int(self.drafting_standard));
        items.push(format_hollerith(&self.modification_date));
        items.push(format_hollerith(&self.application_protocol));
        let mut out = items.join(&pd.to_string());
        out.push(self.rdelim);
        out
    }
}

fn read_opt_string(p: &mut ParamParser) -> Result<Option<String>> {
    if p.terminated() {
        return Ok(None);
    }
    p.read_string()
}

fn read_opt_int(p: &mut ParamParser, default: i32) -> Result<i32> {
    if p.terminated() {
        return Ok(default);
    }
    p.read_int(Some(default))
}

fn read_opt_real(p: &mut ParamParser, default: f64) -> Result<f64> {
    if p.terminated() {
        return Ok(default);
    }
    p.read_real(Some(default))
}

/// Read one of the two delimiter-definition fields: empty (defaulted) or
/// `1H<c>`, separated from the next field by `sep`.
fn read_delim_field(bytes: &[u8], pos: &mut usize, sep: u8) -> Result<Option<char>> {
    if *pos >= bytes.len() {
        return Err(IgesError::Global("truncated global section".into()));
    }
    if bytes[*pos] == sep {
        *pos += 1;
        return Ok(None);
    }
    if bytes.len() - *pos >= 3 && bytes[*pos] == b'1' && bytes[*pos + 1] == b'H' {
        let c = bytes[*pos + 2];
        if !c.is_ascii_graphic() {
            return Err(IgesError::Global("delimiter is not printable".into()));
        }
        *pos += 3;
        // The declared delimiter separates it from the next field unless it
        // was the record-delimiter declaration itself followed by pdelim.
        if *pos < bytes.len() && (bytes[*pos] == sep || bytes[*pos] == c) {
            *pos += 1;
        }
        return Ok(Some(c as char));
    }
    Err(IgesError::Global("malformed delimiter declaration".into()))
}
