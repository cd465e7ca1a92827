//! IGES document structure
//!
//! The document exclusively owns every entity. Entities refer to each
//! other through [`EntityId`] values mirrored by per-entity `refs` lists;
//! all link mutations go through document operations so both sides stay
//! consistent. Ids are never reused, which makes [`IgesDocument::is_valid`]
//! the liveness broadcast for handles held outside the document.

use crate::entities::{
    is_simple_curve_type, EntityType, TYPE_COLOR_DEFINITION, TYPE_CURVE_ON_SURFACE, TYPE_LINE,
    TYPE_PROPERTY, TYPE_SUBFIGURE_DEFINITION, TYPE_SUBFIGURE_INSTANCE, TYPE_TRANSFORMATION_MATRIX,
};
use crate::error::{IgesError, Result};
use crate::global::{GlobalData, Units};
use crate::io::reader::{IgesReader, IgesReaderConfiguration};
use crate::io::writer::IgesWriter;
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{EntityId, HierarchyStatus, Transform};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;

/// An IGES model: global data plus an ordered entity table
#[derive(Debug, Clone)]
pub struct IgesDocument {
    /// Global-section data, including the delimiter pair and units
    pub global: GlobalData,
    /// Start-section comment lines
    pub start_comments: Vec<String>,
    /// Notifications collected during the last read/write operation
    pub notifications: NotificationCollection,
    /// All entities, in insertion order
    entities: IndexMap<EntityId, EntityType>,
    /// Next id to assign; ids are never reused
    next_id: u32,
}

impl IgesDocument {
    /// Create a new empty document
    pub fn new() -> Self {
        IgesDocument {
            global: GlobalData::default(),
            start_comments: Vec::new(),
            notifications: NotificationCollection::new(),
            entities: IndexMap::new(),
            next_id: 1,
        }
    }

    // ---------------------------------------------------------------
    // Entity lifecycle
    // ---------------------------------------------------------------

    /// Create a new entity of the given type code. Unknown codes produce
    /// an untyped shell that still round-trips.
    pub fn new_entity(&mut self, type_code: i32) -> EntityId {
        let entity = EntityType::from_type_code(type_code);
        if matches!(entity, EntityType::Null(_)) {
            self.notifications.notify(
                NotificationType::NotImplemented,
                format!("entity type {} has no typed representation", type_code),
            );
        }
        self.push_entity(entity)
    }

    /// Insert an already-built entity and assign its id.
    pub(crate) fn push_entity(&mut self, mut entity: EntityType) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        entity.common_mut().id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Destroy an entity: every parent drops its pointer to it, every
    /// child drops its back-reference, and the id becomes invalid forever.
    pub fn delete_entity(&mut self, id: EntityId) -> Result<()> {
        let entity = self
            .entities
            .get(&id)
            .ok_or(IgesError::EntityNotFound(id.value()))?;
        let parents = entity.common().refs.clone();
        let children = entity.all_child_ids();

        for parent in parents {
            if let Some(p) = self.entities.get_mut(&parent) {
                p.unlink(id);
            }
        }
        for child in children {
            if let Some(c) = self.entities.get_mut(&child) {
                c.common_mut().del_reference(id);
            }
        }
        self.entities.shift_remove(&id);
        Ok(())
    }

    /// True while the entity is alive. Ids are never reused, so a stale
    /// handle stays invalid forever.
    pub fn is_valid(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get an entity by id
    pub fn entity(&self, id: EntityId) -> Option<&EntityType> {
        self.entities.get(&id)
    }

    /// Get a mutable entity by id
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityType> {
        self.entities.get_mut(&id)
    }

    /// Number of entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate over all entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.values()
    }

    /// Iterate over all entity ids in insertion order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    // ---------------------------------------------------------------
    // Graph mutations (both sides of every link kept consistent)
    // ---------------------------------------------------------------

    fn require(&self, id: EntityId) -> Result<&EntityType> {
        self.entities
            .get(&id)
            .ok_or(IgesError::EntityNotFound(id.value()))
    }

    fn expect_kind(&self, id: EntityId, code: i32, expected: &'static str) -> Result<()> {
        let found = self.require(id)?.type_code();
        if found != code {
            return Err(IgesError::WrongEntityKind { expected, found });
        }
        Ok(())
    }

    fn add_backref(&mut self, child: EntityId, parent: EntityId) {
        if let Some(c) = self.entities.get_mut(&child) {
            c.common_mut().add_reference(parent);
        }
    }

    fn drop_backref(&mut self, child: EntityId, parent: EntityId) {
        if let Some(c) = self.entities.get_mut(&child) {
            c.common_mut().del_reference(parent);
        }
    }

    /// True when linking `child` under `parent` would close an owning
    /// cycle, i.e. `parent` is reachable from `child` over owning edges.
    fn creates_cycle(&self, parent: EntityId, child: EntityId) -> bool {
        let mut stack = vec![child];
        let mut seen = vec![child];
        while let Some(id) = stack.pop() {
            if id == parent {
                return true;
            }
            if let Some(e) = self.entities.get(&id) {
                for next in e.owning_child_ids() {
                    if !seen.contains(&next) {
                        seen.push(next);
                        stack.push(next);
                    }
                }
            }
        }
        false
    }

    /// Point an entity's directory entry at a transformation matrix, or
    /// clear it with `None`.
    pub fn set_transform(&mut self, id: EntityId, transform: Option<EntityId>) -> Result<()> {
        self.require(id)?;
        if let Some(t) = transform {
            self.expect_kind(t, TYPE_TRANSFORMATION_MATRIX, "TransformationMatrix")?;
            if t == id || self.creates_cycle(id, t) {
                return Err(IgesError::Custom(
                    "transform chain would form a cycle".into(),
                ));
            }
        }
        let old = self.entities.get(&id).unwrap().common().transform;
        if let Some(old_id) = old {
            self.drop_backref(old_id, id);
        }
        self.entities.get_mut(&id).unwrap().common_mut().transform = transform;
        if let Some(t) = transform {
            self.add_backref(t, id);
        }
        Ok(())
    }

    /// Point an entity's directory entry at a color definition, or clear
    /// it and fall back to the color number.
    pub fn set_color_entity(&mut self, id: EntityId, color: Option<EntityId>) -> Result<()> {
        self.require(id)?;
        if let Some(c) = color {
            self.expect_kind(c, TYPE_COLOR_DEFINITION, "ColorDefinition")?;
        }
        let old = self.entities.get(&id).unwrap().common().color_ref;
        if let Some(old_id) = old {
            self.drop_backref(old_id, id);
        }
        self.entities.get_mut(&id).unwrap().common_mut().color_ref = color;
        if let Some(c) = color {
            self.add_backref(c, id);
        }
        Ok(())
    }

    /// Attach a property or associativity as an extra on any entity.
    pub fn add_extra(&mut self, id: EntityId, extra: EntityId) -> Result<()> {
        self.require(id)?;
        let code = self.require(extra)?.type_code();
        {
            let common = self.entities.get_mut(&id).unwrap().common_mut();
            if code == TYPE_PROPERTY {
                if !common.extras_props.contains(&extra) {
                    common.extras_props.push(extra);
                }
            } else if !common.extras_assoc.contains(&extra) {
                common.extras_assoc.push(extra);
            }
        }
        self.add_backref(extra, id);
        Ok(())
    }

    /// Append a segment to a composite curve.
    pub fn add_segment(&mut self, composite: EntityId, segment: EntityId) -> Result<()> {
        let seg_code = self.require(segment)?.type_code();
        if !is_simple_curve_type(seg_code) {
            return Err(IgesError::WrongEntityKind {
                expected: "simple curve (100, 104, 110, 126)",
                found: seg_code,
            });
        }
        match self.entities.get_mut(&composite) {
            Some(EntityType::CompositeCurve(cc)) => cc.push_segment(segment),
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "CompositeCurve",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(composite.value())),
        }
        self.add_backref(segment, composite);
        Ok(())
    }

    /// Append a member to a subfigure definition.
    pub fn add_member(&mut self, definition: EntityId, member: EntityId) -> Result<()> {
        self.require(member)?;
        if definition == member || self.creates_cycle(definition, member) {
            return Err(IgesError::Custom(
                "subfigure membership would form a cycle".into(),
            ));
        }
        match self.entities.get_mut(&definition) {
            Some(EntityType::SubfigureDefinition(def)) => def.push_member(member),
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "SubfigureDefinition",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(definition.value())),
        }
        self.add_backref(member, definition);
        Ok(())
    }

    /// Point a subfigure instance at its definition.
    pub fn set_definition(&mut self, instance: EntityId, definition: EntityId) -> Result<()> {
        self.expect_kind(instance, TYPE_SUBFIGURE_INSTANCE, "SubfigureInstance")?;
        self.expect_kind(definition, TYPE_SUBFIGURE_DEFINITION, "SubfigureDefinition")?;
        let old = match self.entities.get(&instance) {
            Some(EntityType::SubfigureInstance(inst)) => inst.definition,
            _ => unreachable!(),
        };
        if let Some(old_id) = old {
            self.drop_backref(old_id, instance);
        }
        if let Some(EntityType::SubfigureInstance(inst)) = self.entities.get_mut(&instance) {
            inst.definition = Some(definition);
        }
        self.add_backref(definition, instance);
        Ok(())
    }

    /// Set the axis line of a surface of revolution.
    pub fn set_revolution_axis(&mut self, surface: EntityId, axis: EntityId) -> Result<()> {
        self.expect_kind(axis, TYPE_LINE, "Line")?;
        let old = match self.entities.get(&surface) {
            Some(EntityType::SurfaceOfRevolution(s)) => s.axis,
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "SurfaceOfRevolution",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(surface.value())),
        };
        if let Some(old_id) = old {
            self.drop_backref(old_id, surface);
        }
        if let Some(EntityType::SurfaceOfRevolution(s)) = self.entities.get_mut(&surface) {
            s.axis = Some(axis);
        }
        self.add_backref(axis, surface);
        Ok(())
    }

    /// Set the generatrix curve of a surface of revolution.
    pub fn set_revolution_generatrix(&mut self, surface: EntityId, curve: EntityId) -> Result<()> {
        let code = self.require(curve)?.type_code();
        if !crate::entities::is_curve_type(code) {
            return Err(IgesError::WrongEntityKind {
                expected: "curve",
                found: code,
            });
        }
        let old = match self.entities.get(&surface) {
            Some(EntityType::SurfaceOfRevolution(s)) => s.generatrix,
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "SurfaceOfRevolution",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(surface.value())),
        };
        if let Some(old_id) = old {
            self.drop_backref(old_id, surface);
        }
        if let Some(EntityType::SurfaceOfRevolution(s)) = self.entities.get_mut(&surface) {
            s.generatrix = Some(curve);
        }
        self.add_backref(curve, surface);
        Ok(())
    }

    /// Set the underlying surface of a curve-on-surface or trimmed surface.
    pub fn set_surface(&mut self, id: EntityId, surface: EntityId) -> Result<()> {
        let code = self.require(surface)?.type_code();
        if !matches!(
            code,
            crate::entities::TYPE_SURFACE_OF_REVOLUTION
                | crate::entities::TYPE_RATIONAL_BSPLINE_SURFACE
        ) {
            return Err(IgesError::WrongEntityKind {
                expected: "surface (120, 128)",
                found: code,
            });
        }
        let old = match self.entities.get(&id) {
            Some(EntityType::CurveOnSurface(c)) => c.surface,
            Some(EntityType::TrimmedSurface(t)) => t.surface,
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "CurveOnSurface or TrimmedSurface",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(id.value())),
        };
        if let Some(old_id) = old {
            self.drop_backref(old_id, id);
        }
        match self.entities.get_mut(&id) {
            Some(EntityType::CurveOnSurface(c)) => c.surface = Some(surface),
            Some(EntityType::TrimmedSurface(t)) => t.surface = Some(surface),
            _ => unreachable!(),
        }
        self.add_backref(surface, id);
        Ok(())
    }

    /// Set the model-space curve of a curve-on-surface.
    pub fn set_model_curve(&mut self, id: EntityId, curve: EntityId) -> Result<()> {
        let code = self.require(curve)?.type_code();
        if !crate::entities::is_curve_type(code) {
            return Err(IgesError::WrongEntityKind {
                expected: "curve",
                found: code,
            });
        }
        let old = match self.entities.get(&id) {
            Some(EntityType::CurveOnSurface(c)) => c.model_curve,
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "CurveOnSurface",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(id.value())),
        };
        if let Some(old_id) = old {
            self.drop_backref(old_id, id);
        }
        if let Some(EntityType::CurveOnSurface(c)) = self.entities.get_mut(&id) {
            c.model_curve = Some(curve);
        }
        self.add_backref(curve, id);
        Ok(())
    }

    /// Set the outer boundary of a trimmed surface.
    pub fn set_outer_boundary(&mut self, surface: EntityId, boundary: EntityId) -> Result<()> {
        self.expect_kind(boundary, TYPE_CURVE_ON_SURFACE, "CurveOnSurface")?;
        let old = match self.entities.get(&surface) {
            Some(EntityType::TrimmedSurface(t)) => t.outer_boundary,
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "TrimmedSurface",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(surface.value())),
        };
        if let Some(old_id) = old {
            self.drop_backref(old_id, surface);
        }
        if let Some(EntityType::TrimmedSurface(t)) = self.entities.get_mut(&surface) {
            t.outer_boundary = Some(boundary);
            t.outer_is_surface_boundary = false;
        }
        self.add_backref(boundary, surface);
        Ok(())
    }

    /// Append an inner boundary to a trimmed surface.
    pub fn add_inner_boundary(&mut self, surface: EntityId, boundary: EntityId) -> Result<()> {
        self.expect_kind(boundary, TYPE_CURVE_ON_SURFACE, "CurveOnSurface")?;
        match self.entities.get_mut(&surface) {
            Some(EntityType::TrimmedSurface(t)) => t.inner_boundaries.push(boundary),
            Some(e) => {
                return Err(IgesError::WrongEntityKind {
                    expected: "TrimmedSurface",
                    found: e.type_code(),
                })
            }
            None => return Err(IgesError::EntityNotFound(surface.value())),
        }
        self.add_backref(boundary, surface);
        Ok(())
    }

    /// Set the hierarchy status sub-field. Entities that ignore hierarchy
    /// warn and report success.
    pub fn set_hierarchy(&mut self, id: EntityId, hierarchy: HierarchyStatus) -> Result<bool> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(IgesError::EntityNotFound(id.value()))?;
        if !entity.as_entity().supports_hierarchy() {
            let name = entity.as_entity().type_name();
            self.notifications.notify(
                NotificationType::Warning,
                format!("hierarchy is not supported by {}", name),
            );
            return Ok(true);
        }
        entity.common_mut().status.hierarchy = hierarchy;
        Ok(true)
    }

    /// The transform an entity-124 chain produces: the parent transform
    /// (through the DE transform field) composed with the entity's own.
    pub fn composed_transform(&self, id: EntityId) -> Result<Transform> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            let e = self.require(cid)?;
            let xf = match e {
                EntityType::TransformationMatrix(t) => t.xf,
                other => {
                    return Err(IgesError::WrongEntityKind {
                        expected: "TransformationMatrix",
                        found: other.type_code(),
                    })
                }
            };
            chain.push(xf);
            current = e.common().transform;
            if chain.len() > self.entities.len() {
                return Err(IgesError::Custom("transform chain forms a cycle".into()));
            }
        }
        // Outermost parent applies last.
        let mut product = Transform::IDENTITY;
        for xf in chain.into_iter().rev() {
            product = product * xf;
        }
        Ok(product)
    }

    // ---------------------------------------------------------------
    // Document-wide passes
    // ---------------------------------------------------------------

    /// Multiply every coordinate-bearing entity by a scale factor.
    pub fn rescale_all(&mut self, sf: f64) {
        for entity in self.entities.values_mut() {
            entity.as_entity_mut().rescale(sf);
        }
    }

    /// Install back-references for every resolved forward pointer.
    pub(crate) fn install_backrefs(&mut self) {
        let pairs: Vec<(EntityId, Vec<EntityId>)> = self
            .entities
            .iter()
            .map(|(id, e)| (*id, e.all_child_ids()))
            .collect();
        for (parent, children) in pairs {
            for child in children {
                self.add_backref(child, parent);
            }
        }
    }

    /// Detect cycles over owning edges, report them, and cut the closing
    /// edge of each.
    pub(crate) fn break_owning_cycles(&mut self) {
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;

        let ids = self.entity_ids();
        let mut color: HashMap<EntityId, u8> = ids.iter().map(|id| (*id, WHITE)).collect();
        let mut cuts: Vec<(EntityId, EntityId)> = Vec::new();

        for root in &ids {
            if color[root] != WHITE {
                continue;
            }
            // Iterative DFS; a gray target marks the closing edge.
            let mut stack = vec![(*root, 0usize)];
            color.insert(*root, GRAY);
            while let Some((id, child_idx)) = stack.pop() {
                let children = self
                    .entities
                    .get(&id)
                    .map(|e| e.owning_child_ids())
                    .unwrap_or_default();
                if child_idx >= children.len() {
                    color.insert(id, BLACK);
                    continue;
                }
                stack.push((id, child_idx + 1));
                let child = children[child_idx];
                match color.get(&child).copied().unwrap_or(BLACK) {
                    WHITE => {
                        color.insert(child, GRAY);
                        stack.push((child, 0));
                    }
                    GRAY => cuts.push((id, child)),
                    _ => {}
                }
            }
        }

        for (parent, child) in cuts {
            self.notifications.notify(
                NotificationType::Violation,
                format!(
                    "reference cycle through {} and {}; edge cleared",
                    parent, child
                ),
            );
            if let Some(p) = self.entities.get_mut(&parent) {
                p.unlink(child);
            }
            self.drop_backref(child, parent);
        }
    }

    /// Remove every orphaned entity (empty `refs` but dependent status),
    /// repeating until stable since pruning can orphan a dependent chain.
    pub(crate) fn prune_orphans(&mut self) {
        loop {
            let orphans: Vec<EntityId> = self
                .entities
                .iter()
                .filter(|(_, e)| e.common().is_orphaned())
                .map(|(id, _)| *id)
                .collect();
            if orphans.is_empty() {
                break;
            }
            for id in orphans {
                self.notifications.notify(
                    NotificationType::Warning,
                    format!("pruned orphaned entity {}", id),
                );
                let _ = self.delete_entity(id);
            }
        }
    }

    // ---------------------------------------------------------------
    // Global-data accessors
    // ---------------------------------------------------------------

    /// Model units
    pub fn units(&self) -> Units {
        self.global.units
    }

    /// Change the model units, re-deriving the conversion factor
    pub fn set_units(&mut self, units: Units) {
        self.global.set_units(units);
    }

    /// Minimum user-intended resolution
    pub fn min_resolution(&self) -> f64 {
        self.global.min_resolution
    }

    pub fn set_min_resolution(&mut self, resolution: f64) {
        self.global.min_resolution = resolution.abs();
    }

    pub fn author(&self) -> &str {
        &self.global.author
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.global.author = author.into();
    }

    pub fn organization(&self) -> &str {
        &self.global.organization
    }

    pub fn set_organization(&mut self, organization: impl Into<String>) {
        self.global.organization = organization.into();
    }

    pub fn product_id(&self) -> &str {
        &self.global.product_id
    }

    pub fn set_product_id(&mut self, product_id: impl Into<String>) {
        self.global.product_id = product_id.into();
    }

    pub fn set_native_system_id(&mut self, native_system_id: impl Into<String>) {
        self.global.native_system_id = native_system_id.into();
    }

    /// Enable or disable the unit-conversion pass applied on read
    pub fn set_convert_on_read(&mut self, convert: bool) {
        self.global.convert = convert;
        self.global.recompute_cf();
    }

    /// Choose the delimiter pair. Delimiters must be distinct printable
    /// ASCII and must not collide with characters numbers and Hollerith
    /// constants use.
    pub fn set_delimiters(&mut self, pdelim: char, rdelim: char) -> Result<()> {
        for c in [pdelim, rdelim] {
            if !c.is_ascii_graphic()
                || c.is_ascii_digit()
                || matches!(c, '+' | '-' | '.' | 'D' | 'E' | 'H')
            {
                return Err(IgesError::Custom(format!(
                    "'{}' cannot serve as a delimiter",
                    c
                )));
            }
        }
        if pdelim == rdelim {
            return Err(IgesError::Custom(
                "parameter and record delimiters must differ".into(),
            ));
        }
        self.global.pdelim = pdelim;
        self.global.rdelim = rdelim;
        Ok(())
    }

    // ---------------------------------------------------------------
    // File I/O
    // ---------------------------------------------------------------

    /// Read a file, replacing this document's state entirely. On any
    /// fatal error the document is left empty.
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let config = IgesReaderConfiguration {
            convert_on_read: self.global.convert,
        };
        match IgesReader::from_file(path)?.with_configuration(config).read() {
            Ok(doc) => {
                *self = doc;
                Ok(())
            }
            Err(e) => {
                *self = IgesDocument::new();
                Err(e)
            }
        }
    }

    /// Write the model. The orphan sweep runs first, directory entries are
    /// renumbered, and the output appears atomically via a temp file and
    /// rename. With `overwrite` unset an existing destination is refused.
    pub fn write<P: AsRef<Path>>(&mut self, path: P, overwrite: bool) -> Result<()> {
        IgesWriter::new(self).write_to_file(path, overwrite)
    }
}

impl Default for IgesDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubordinateStatus;

    #[test]
    fn test_new_entity_and_validity() {
        let mut doc = IgesDocument::new();
        let id = doc.new_entity(110);
        assert!(doc.is_valid(id));
        assert_eq!(doc.entity_count(), 1);
        doc.delete_entity(id).unwrap();
        assert!(!doc.is_valid(id));
        // Ids are never reused.
        let id2 = doc.new_entity(110);
        assert_ne!(id, id2);
    }

    #[test]
    fn test_refs_mirror_on_segment_add() {
        let mut doc = IgesDocument::new();
        let cc = doc.new_entity(102);
        let seg = doc.new_entity(110);
        doc.add_segment(cc, seg).unwrap();

        let seg_refs = &doc.entity(seg).unwrap().common().refs;
        assert_eq!(seg_refs, &vec![cc]);
        assert_eq!(
            doc.entity(seg).unwrap().common().status.subordinate,
            SubordinateStatus::PhysicallyDependent
        );
    }

    #[test]
    fn test_add_segment_rejects_non_curves() {
        let mut doc = IgesDocument::new();
        let cc = doc.new_entity(102);
        let color = doc.new_entity(314);
        assert!(matches!(
            doc.add_segment(cc, color),
            Err(IgesError::WrongEntityKind { .. })
        ));
    }

    #[test]
    fn test_delete_cascades_both_directions() {
        let mut doc = IgesDocument::new();
        let cc = doc.new_entity(102);
        let seg = doc.new_entity(110);
        doc.add_segment(cc, seg).unwrap();

        // Deleting the segment clears the composite's pointer to it.
        doc.delete_entity(seg).unwrap();
        match doc.entity(cc).unwrap() {
            EntityType::CompositeCurve(c) => assert_eq!(c.segment_count(), 0),
            _ => panic!("expected composite"),
        }

        // And deleting a parent clears the child's back-reference.
        let cc2 = doc.new_entity(102);
        let seg2 = doc.new_entity(110);
        doc.add_segment(cc2, seg2).unwrap();
        doc.delete_entity(cc2).unwrap();
        assert!(doc.entity(seg2).unwrap().common().refs.is_empty());
    }

    #[test]
    fn test_member_cycle_rejected() {
        let mut doc = IgesDocument::new();
        let outer = doc.new_entity(308);
        let inner = doc.new_entity(308);
        doc.add_member(outer, inner).unwrap();
        assert!(doc.add_member(inner, outer).is_err());
        assert!(doc.add_member(outer, outer).is_err());
    }

    #[test]
    fn test_set_transform_checks_kind() {
        let mut doc = IgesDocument::new();
        let line = doc.new_entity(110);
        let xf = doc.new_entity(124);
        let other = doc.new_entity(110);
        assert!(doc.set_transform(line, Some(xf)).is_ok());
        assert!(doc.set_transform(line, Some(other)).is_err());
        // Clearing drops the back-reference.
        doc.set_transform(line, None).unwrap();
        assert!(doc.entity(xf).unwrap().common().refs.is_empty());
    }

    #[test]
    fn test_composed_transform_chain() {
        use crate::types::Point3;
        let mut doc = IgesDocument::new();
        let parent = doc.new_entity(124);
        let child = doc.new_entity(124);
        if let Some(EntityType::TransformationMatrix(t)) = doc.entity_mut(parent) {
            t.xf = Transform::from_translation(Point3::new(10.0, 0.0, 0.0));
        }
        if let Some(EntityType::TransformationMatrix(t)) = doc.entity_mut(child) {
            t.xf = Transform::from_translation(Point3::new(0.0, 5.0, 0.0));
        }
        doc.set_transform(child, Some(parent)).unwrap();
        let product = doc.composed_transform(child).unwrap();
        assert_eq!(product.apply(Point3::ZERO), Point3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_prune_orphans_cascades() {
        let mut doc = IgesDocument::new();
        let cc = doc.new_entity(102);
        let seg = doc.new_entity(110);
        doc.add_segment(cc, seg).unwrap();
        // Make the composite itself dependent on nothing: orphan it.
        doc.entity_mut(cc).unwrap().common_mut().status.subordinate =
            SubordinateStatus::PhysicallyDependent;
        doc.prune_orphans();
        // The composite goes first, which orphans the segment.
        assert_eq!(doc.entity_count(), 0);
    }

    #[test]
    fn test_hierarchy_warning_on_unsupported() {
        let mut doc = IgesDocument::new();
        let line = doc.new_entity(110);
        assert!(doc.set_hierarchy(line, HierarchyStatus::Defer).unwrap());
        assert!(doc
            .notifications
            .has_type(NotificationType::Warning));
    }

    #[test]
    fn test_delimiter_validation() {
        let mut doc = IgesDocument::new();
        assert!(doc.set_delimiters('/', '#').is_ok());
        assert!(doc.set_delimiters('D', ';').is_err());
        assert!(doc.set_delimiters('1', ';').is_err());
        assert!(doc.set_delimiters(',', ',').is_err());
    }
}
