//! IGES file reader
//!
//! Reading is two-pass. The shell pass decodes every directory-entry
//! record pair, allocates the entity through the registry, and builds the
//! sequence-number index. The content pass slices each entity's parameter
//! block, parses it, and then resolves every recorded pointer against the
//! index. Back-references, cycle breaking, and the unit-conversion pass
//! run once the graph is bound.

use crate::document::IgesDocument;
use crate::entities::{DeIndex, EntityType, NullEntity, RawDirectoryEntry};
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::record::{parse_terminator, Record, RecordReader, Section};
use crate::notification::NotificationType;
use crate::types::EntityId;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Configuration for the IGES reader.
#[derive(Debug, Clone)]
pub struct IgesReaderConfiguration {
    /// Convert geometry to millimetres on load when the file units differ.
    ///
    /// Default: `true`.
    pub convert_on_read: bool,
}

impl Default for IgesReaderConfiguration {
    fn default() -> Self {
        Self {
            convert_on_read: true,
        }
    }
}

/// IGES file reader
pub struct IgesReader {
    records: RecordReader,
    config: IgesReaderConfiguration,
}

impl IgesReader {
    /// Create a reader over any byte source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(IgesReader {
            records: RecordReader::new(reader)?,
            config: IgesReaderConfiguration::default(),
        })
    }

    /// Create a reader from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Set the reader configuration.
    pub fn with_configuration(mut self, config: IgesReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Read the input and return a document.
    pub fn read(mut self) -> Result<IgesDocument> {
        let mut start: Vec<Record> = Vec::new();
        let mut global: Vec<Record> = Vec::new();
        let mut directory: Vec<Record> = Vec::new();
        let mut parameter: Vec<Record> = Vec::new();
        let mut terminator: Option<Record> = None;

        while let Some(rec) = self.records.next_record()? {
            match rec.section {
                Section::Start => start.push(rec),
                Section::Global => global.push(rec),
                Section::Directory => directory.push(rec),
                Section::Parameter => parameter.push(rec),
                Section::Terminate => {
                    terminator = Some(rec);
                    break;
                }
            }
        }
        let terminator =
            terminator.ok_or_else(|| IgesError::Record("missing terminator record".into()))?;
        if self.records.next_record()?.is_some() {
            return Err(IgesError::Record("records after the terminator".into()));
        }

        let counts = parse_terminator(&terminator.content)?;
        if counts.start != start.len() as u32
            || counts.global != global.len() as u32
            || counts.directory != directory.len() as u32
            || counts.parameter != parameter.len() as u32
        {
            return Err(IgesError::Record(format!(
                "terminator counts S{} G{} D{} P{} disagree with S{} G{} D{} P{} records read",
                counts.start,
                counts.global,
                counts.directory,
                counts.parameter,
                start.len(),
                global.len(),
                directory.len(),
                parameter.len()
            )));
        }
        if directory.len() % 2 != 0 {
            return Err(IgesError::Record(
                "directory section has an odd record count".into(),
            ));
        }

        let mut doc = IgesDocument::new();
        doc.start_comments = start
            .iter()
            .map(|r| r.content.trim_end().to_string())
            .collect();

        let g_payload: String = global.iter().map(|r| r.content.as_str()).collect();
        doc.global = GlobalData::parse(&g_payload, self.config.convert_on_read)?;

        // Shell pass: allocate every entity, index DE sequence numbers.
        let mut index = DeIndex::new();
        let mut order: Vec<EntityId> = Vec::with_capacity(directory.len() / 2);
        for pair in directory.chunks(2) {
            let raw = RawDirectoryEntry::parse(&pair[0], &pair[1])?;
            let mut entity = EntityType::from_type_code(raw.type_code);
            if matches!(entity, EntityType::Null(_)) {
                doc.notifications.notify(
                    NotificationType::NotImplemented,
                    format!(
                        "entity type {} at DE {} round-trips untyped",
                        raw.type_code, raw.sequence
                    ),
                );
            }
            match entity.read_de(&raw) {
                Ok(()) => {}
                Err(IgesError::InvalidForm { type_code, form }) => {
                    doc.notifications.notify(
                        NotificationType::Error,
                        format!(
                            "invalid form {} for entity type {} at DE {}; kept untyped",
                            form, type_code, raw.sequence
                        ),
                    );
                    entity = EntityType::Null(NullEntity::new(raw.type_code));
                    entity.read_de(&raw)?;
                }
                Err(e) => return Err(e),
            }
            let id = doc.push_entity(entity);
            index.insert(raw.sequence, id, raw.type_code);
            order.push(id);
        }

        // Content pass: slice and parse each entity's parameter block.
        let globals = doc.global.clone();
        for id in &order {
            let (pd_start, count, de_seq) = {
                let c = doc.entity(*id).unwrap().common();
                (c.parameter_data, c.param_line_count, c.sequence)
            };
            if count == 0 {
                return Err(IgesError::Parse(format!(
                    "entity at DE {} declares no parameter records",
                    de_seq
                )));
            }
            if pd_start == 0 || (pd_start + count - 1) as usize > parameter.len() {
                return Err(IgesError::Parse(format!(
                    "parameter block of DE {} lies outside the P section",
                    de_seq
                )));
            }
            let mut lines = Vec::with_capacity(count as usize);
            for rec in &parameter[(pd_start - 1) as usize..(pd_start + count - 1) as usize] {
                let owner: u32 = rec
                    .content
                    .get(64..72)
                    .unwrap_or_default()
                    .trim()
                    .parse()
                    .map_err(|_| {
                        IgesError::Parse(format!(
                            "parameter record {} has no directory back-pointer",
                            rec.sequence
                        ))
                    })?;
                if owner != de_seq {
                    return Err(IgesError::Parse(format!(
                        "parameter record {} belongs to DE {}, expected DE {}",
                        rec.sequence, owner, de_seq
                    )));
                }
                lines.push(rec.content[..64].to_string());
            }
            doc.entity_mut(*id).unwrap().read_pd_block(&lines, &globals)?;
        }

        // Associate pass: bind pointers, then mirror them as back-refs.
        let mut notes = std::mem::take(&mut doc.notifications);
        for id in &order {
            let e = doc.entity_mut(*id).unwrap();
            let name = e.as_entity().type_name();
            let forbids = e.as_entity().forbids_structure();
            e.as_entity_mut().associate(&index, &mut notes);
            e.common_mut()
                .associate_common(&index, &mut notes, name, forbids);
        }
        doc.notifications = notes;
        doc.install_backrefs();
        doc.break_owning_cycles();

        // Unit conversion happens exactly once: geometry and the
        // length-bearing global fields scale to millimetres, and the model
        // is re-labelled so a later write/read cannot convert again.
        if doc.global.convert && doc.global.cf != 1.0 {
            let cf = doc.global.cf;
            doc.rescale_all(cf);
            doc.global.min_resolution *= cf;
            doc.global.max_coordinate *= cf;
            doc.global.set_units(crate::global::Units::Millimeter);
        }
        Ok(doc)
    }
}
