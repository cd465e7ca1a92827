//! IGES file writer
//!
//! Writing renumbers every directory entry (1, 3, 5, ... — two records
//! each), asks each entity to format its parameter block at the running
//! P sequence number, and emits the five sections in order. File output
//! is atomic: the bytes are assembled first, written to a sibling temp
//! file, and renamed into place, so a failed write leaves the
//! destination untouched.

use crate::document::IgesDocument;
use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::wrap_payload;
use crate::io::record::{RecordWriter, Section, CONTENT_LEN};
use crate::entities::SeqMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// IGES file writer
pub struct IgesWriter<'a> {
    document: &'a mut IgesDocument,
}

impl<'a> IgesWriter<'a> {
    /// Create a writer over a document. The orphan sweep, renumbering,
    /// and parameter-line counting mutate the document.
    pub fn new(document: &'a mut IgesDocument) -> Self {
        IgesWriter { document }
    }

    /// Write to a file path. With `overwrite` unset, an existing
    /// destination is refused before anything is touched.
    pub fn write_to_file<P: AsRef<Path>>(&mut self, path: P, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(IgesError::FileExists(path.display().to_string()));
        }
        let bytes = self.write_to_vec()?;

        let file_name = path
            .file_name()
            .ok_or_else(|| IgesError::Custom(format!("bad output path {}", path.display())))?;
        let mut tmp_name = std::ffi::OsString::from(".");
        tmp_name.push(file_name);
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        fs::write(&tmp, &bytes)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Write to a byte vector (useful for testing)
    pub fn write_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to_writer(&mut buffer)?;
        Ok(buffer)
    }

    /// Write the full file to any writer
    pub fn write_to_writer<W: Write>(&mut self, writer: W) -> Result<()> {
        let doc = &mut *self.document;

        // No written entity may be orphaned.
        doc.prune_orphans();

        if doc.global.creation_date.is_empty() {
            doc.global.creation_date = GlobalData::timestamp_now();
        }
        doc.global.modification_date = GlobalData::timestamp_now();

        // Renumber directory entries: 1, 3, 5, ...
        let ids = doc.entity_ids();
        let mut seq_map = SeqMap::new();
        for (i, id) in ids.iter().enumerate() {
            let seq = (2 * i + 1) as u32;
            doc.entity_mut(*id).unwrap().common_mut().sequence = seq;
            seq_map.insert(*id, seq);
        }

        // Format every parameter block at its running start line.
        let globals = doc.global.clone();
        let mut pd_blocks: Vec<(u32, Vec<String>)> = Vec::with_capacity(ids.len());
        let mut p_seq = 1u32;
        for id in &ids {
            let e = doc.entity_mut(*id).unwrap();
            let lines = e.format_pd_block(&globals, &seq_map)?;
            e.common_mut().parameter_data = p_seq;
            p_seq += lines.len() as u32;
            pd_blocks.push((e.common().sequence, lines));
        }

        let mut rw = RecordWriter::new(writer);

        if doc.start_comments.is_empty() {
            rw.write_record(&doc.global.product_id, Section::Start)?;
        } else {
            for comment in &doc.start_comments {
                if comment.len() > CONTENT_LEN {
                    return Err(IgesError::Format(
                        "start-section comment exceeds 72 columns".into(),
                    ));
                }
                rw.write_record(comment, Section::Start)?;
            }
        }

        for line in wrap_payload(&doc.global.format(), CONTENT_LEN) {
            rw.write_record(&line, Section::Global)?;
        }

        for id in &ids {
            let (rec1, rec2) = doc.entity(*id).unwrap().format_de(&seq_map)?;
            rw.write_record(&rec1, Section::Directory)?;
            rw.write_record(&rec2, Section::Directory)?;
        }

        for (de_seq, lines) in &pd_blocks {
            for line in lines {
                let content = format!("{:<64}{:>8}", line, de_seq);
                rw.write_record(&content, Section::Parameter)?;
            }
        }

        rw.write_terminator()?;
        rw.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityType;
    use crate::types::Point3;

    #[test]
    fn test_written_records_are_80_columns() {
        let mut doc = IgesDocument::new();
        let id = doc.new_entity(110);
        if let Some(EntityType::Line(line)) = doc.entity_mut(id) {
            line.end = Point3::new(1.0, 2.0, 3.0);
        }
        let bytes = IgesWriter::new(&mut doc).write_to_vec().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        for line in text.lines() {
            assert_eq!(line.len(), 80, "short record: '{}'", line);
        }
        assert!(text.lines().last().unwrap().contains('T'));
    }

    #[test]
    fn test_directory_sequences_are_odd() {
        let mut doc = IgesDocument::new();
        doc.new_entity(110);
        doc.new_entity(110);
        let mut w = IgesWriter::new(&mut doc);
        w.write_to_vec().unwrap();
        let seqs: Vec<u32> = doc.entities().map(|e| e.common().sequence).collect();
        assert_eq!(seqs, vec![1, 3]);
    }

    #[test]
    fn test_param_line_count_matches_emitted_records() {
        let mut doc = IgesDocument::new();
        let id = doc.new_entity(126);
        if let Some(EntityType::RationalBSplineCurve(c)) = doc.entity_mut(id) {
            c.upper_index = 3;
            c.degree = 3;
            c.knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
            c.weights = vec![1.0; 4];
            c.control_points = vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ];
            c.v1 = 1.0;
        }
        let bytes = IgesWriter::new(&mut doc).write_to_vec().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let p_records = text
            .lines()
            .filter(|l| &l[72..73] == "P")
            .count() as u32;
        assert_eq!(
            doc.entities().next().unwrap().common().param_line_count,
            p_records
        );
    }
}
