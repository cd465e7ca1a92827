//! IGES entity types and traits
//!
//! Every entity is a directory entry (20 fixed-width fields over two D
//! records) plus a variable-length parameter-data block. The typed kinds
//! live in their own modules; everything else round-trips through
//! [`NullEntity`]. Dispatch is through the [`EntityType`] enum and the
//! [`Entity`] trait.

use crate::error::{IgesError, Result};
use crate::global::GlobalData;
use crate::io::params::{format_pointer, wrap_payload, ParamFormatter, ParamParser};
use crate::io::record::{Record, PD_CONTENT_LEN};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{EntityId, StatusNumber, SubordinateStatus};
use std::collections::HashMap;

pub mod circular_arc;
pub mod color_definition;
pub mod composite_curve;
pub mod conic_arc;
pub mod curve_on_surface;
pub mod group_associativity;
pub mod line;
pub mod null;
pub mod property;
pub mod rational_bspline_curve;
pub mod rational_bspline_surface;
pub mod subfigure_definition;
pub mod subfigure_instance;
pub mod surface_of_revolution;
pub mod transformation_matrix;
pub mod trimmed_surface;

pub use circular_arc::CircularArc;
pub use color_definition::ColorDefinition;
pub use composite_curve::CompositeCurve;
pub use conic_arc::ConicArc;
pub use curve_on_surface::{BoundPreference, CurveCreation, CurveOnSurface};
pub use group_associativity::GroupAssociativity;
pub use line::Line;
pub use null::NullEntity;
pub use property::Property;
pub use rational_bspline_curve::RationalBSplineCurve;
pub use rational_bspline_surface::RationalBSplineSurface;
pub use subfigure_definition::SubfigureDefinition;
pub use subfigure_instance::SubfigureInstance;
pub use surface_of_revolution::SurfaceOfRevolution;
pub use transformation_matrix::TransformationMatrix;
pub use trimmed_surface::TrimmedSurface;

/// Entity type codes with typed representations
pub const TYPE_CIRCULAR_ARC: i32 = 100;
pub const TYPE_COMPOSITE_CURVE: i32 = 102;
pub const TYPE_CONIC_ARC: i32 = 104;
pub const TYPE_LINE: i32 = 110;
pub const TYPE_SURFACE_OF_REVOLUTION: i32 = 120;
pub const TYPE_TRANSFORMATION_MATRIX: i32 = 124;
pub const TYPE_RATIONAL_BSPLINE_CURVE: i32 = 126;
pub const TYPE_RATIONAL_BSPLINE_SURFACE: i32 = 128;
pub const TYPE_CURVE_ON_SURFACE: i32 = 142;
pub const TYPE_TRIMMED_SURFACE: i32 = 144;
pub const TYPE_SUBFIGURE_DEFINITION: i32 = 308;
pub const TYPE_COLOR_DEFINITION: i32 = 314;
pub const TYPE_ASSOCIATIVITY: i32 = 402;
pub const TYPE_PROPERTY: i32 = 406;
pub const TYPE_SUBFIGURE_INSTANCE: i32 = 408;

/// True for the simple curve kinds a composite curve may contain
pub fn is_simple_curve_type(code: i32) -> bool {
    matches!(
        code,
        TYPE_CIRCULAR_ARC | TYPE_CONIC_ARC | TYPE_LINE | TYPE_RATIONAL_BSPLINE_CURVE
    )
}

/// True for any curve kind, composite included
pub fn is_curve_type(code: i32) -> bool {
    is_simple_curve_type(code) || code == TYPE_COMPOSITE_CURVE
}

/// Index built during the shell pass: DE sequence number to entity id and
/// type code. The associate pass resolves every raw pointer through it.
#[derive(Debug, Default)]
pub struct DeIndex {
    map: HashMap<u32, (EntityId, i32)>,
}

impl DeIndex {
    pub fn new() -> Self {
        DeIndex {
            map: HashMap::new(),
        }
    }

    pub fn insert(&mut self, sequence: u32, id: EntityId, type_code: i32) {
        self.map.insert(sequence, (id, type_code));
    }

    pub fn lookup(&self, sequence: u32) -> Option<(EntityId, i32)> {
        self.map.get(&sequence).copied()
    }

    /// Resolve a raw (possibly negated) pointer field. Returns `None` for
    /// an absent (zero) pointer, an error for a dangling one.
    pub fn resolve(&self, ptr: i32) -> Result<Option<(EntityId, i32)>> {
        if ptr == 0 {
            return Ok(None);
        }
        let seq = ptr.unsigned_abs();
        self.lookup(seq)
            .map(Some)
            .ok_or(IgesError::EntityNotFound(seq))
    }
}

/// Mapping from entity id to renumbered DE sequence, built by the writer
pub type SeqMap = HashMap<EntityId, u32>;

fn seq_of(map: &SeqMap, id: EntityId) -> Result<i32> {
    map.get(&id)
        .map(|s| *s as i32)
        .ok_or_else(|| IgesError::Format(format!("entity {} missing from sequence map", id)))
}

/// Common directory-entry data shared by all entities
#[derive(Debug, Clone, Default)]
pub struct EntityCommon {
    /// Document-assigned id (never reused)
    pub id: EntityId,
    /// DE sequence number; transient, reassigned on write
    pub sequence: u32,
    /// First P record of this entity's parameter block (transient)
    pub parameter_data: u32,
    /// Number of P records; computed on format, never user-set
    pub param_line_count: u32,
    /// Form number
    pub form: i32,
    /// Entity label, at most 8 characters
    pub label: String,
    /// Label subscript
    pub subscript: i32,
    /// Level number (non-negative form)
    pub level: i32,
    /// Line weight number
    pub line_weight: i32,
    /// Line font pattern number (non-negative form)
    pub line_font: i32,
    /// Color number (non-negative form)
    pub color: i32,
    /// The four status sub-fields
    pub status: StatusNumber,

    // Raw DE pointer fields, kept until the associate pass.
    pub structure_ptr: i32,
    pub line_font_ptr: i32,
    pub level_ptr: i32,
    pub view_ptr: i32,
    pub transform_ptr: i32,
    pub label_display_ptr: i32,
    pub color_ptr: i32,

    // Resolved typed references.
    pub structure: Option<EntityId>,
    pub line_font_ref: Option<EntityId>,
    pub level_ref: Option<EntityId>,
    pub view: Option<EntityId>,
    pub transform: Option<EntityId>,
    pub label_display: Option<EntityId>,
    pub color_ref: Option<EntityId>,

    /// Parents that depend on this entity
    pub refs: Vec<EntityId>,
    /// Raw optional pointers: associativity / general-note group
    pub extra_ptrs: Vec<i32>,
    /// Raw optional pointers: property group
    pub prop_ptrs: Vec<i32>,
    /// Resolved associativity / general-note extras
    pub extras_assoc: Vec<EntityId>,
    /// Resolved property extras
    pub extras_props: Vec<EntityId>,
    /// Comment records trailing the parameter block
    pub comments: Vec<String>,
    /// Set when the associate pass failed; the entity round-trips but
    /// refuses typed access until repaired
    pub degenerate: bool,
}

impl EntityCommon {
    pub fn new() -> Self {
        EntityCommon::default()
    }

    /// Install a parent back-reference (no duplicates). Gaining a first
    /// parent promotes an independent entity to physically dependent.
    pub fn add_reference(&mut self, parent: EntityId) {
        if !self.refs.contains(&parent) {
            self.refs.push(parent);
        }
        if self.status.subordinate == SubordinateStatus::Independent {
            self.status.subordinate = SubordinateStatus::PhysicallyDependent;
        }
    }

    /// Remove a parent back-reference.
    pub fn del_reference(&mut self, parent: EntityId) {
        self.refs.retain(|r| *r != parent);
    }

    /// True iff nothing references this entity but its status still claims
    /// it is subordinate.
    pub fn is_orphaned(&self) -> bool {
        self.refs.is_empty() && self.status.subordinate.is_dependent()
    }

    /// Resolved references recorded in the directory entry and extras.
    pub fn common_child_ids(&self) -> Vec<EntityId> {
        let mut out = Vec::new();
        for slot in [
            self.structure,
            self.line_font_ref,
            self.level_ref,
            self.view,
            self.transform,
            self.label_display,
            self.color_ref,
        ]
        .into_iter()
        .flatten()
        {
            out.push(slot);
        }
        out.extend(self.extras_assoc.iter().copied());
        out.extend(self.extras_props.iter().copied());
        out
    }

    /// Clear any common slot referencing `id`; true if something cleared.
    pub fn unlink_common(&mut self, id: EntityId) -> bool {
        let mut cleared = false;
        let mut clear = |slot: &mut Option<EntityId>, raw: &mut i32| {
            if *slot == Some(id) {
                *slot = None;
                *raw = 0;
                cleared = true;
            }
        };
        clear(&mut self.structure, &mut self.structure_ptr);
        clear(&mut self.line_font_ref, &mut self.line_font_ptr);
        clear(&mut self.level_ref, &mut self.level_ptr);
        clear(&mut self.view, &mut self.view_ptr);
        clear(&mut self.transform, &mut self.transform_ptr);
        clear(&mut self.label_display, &mut self.label_display_ptr);
        clear(&mut self.color_ref, &mut self.color_ptr);
        let before = self.extras_assoc.len() + self.extras_props.len();
        self.extras_assoc.retain(|e| *e != id);
        self.extras_props.retain(|e| *e != id);
        cleared || before != self.extras_assoc.len() + self.extras_props.len()
    }

    /// Read the optional trailing pointer groups of a parameter block.
    pub(crate) fn read_extras(&mut self, p: &mut ParamParser) -> Result<()> {
        if p.terminated() {
            return Ok(());
        }
        let n1 = p.read_int(Some(0))?;
        if n1 < 0 {
            return Err(IgesError::Parse("negative extra pointer count".into()));
        }
        for _ in 0..n1 {
            self.extra_ptrs.push(p.read_pointer()?);
        }
        if !p.terminated() {
            let n2 = p.read_int(Some(0))?;
            if n2 < 0 {
                return Err(IgesError::Parse("negative property pointer count".into()));
            }
            for _ in 0..n2 {
                self.prop_ptrs.push(p.read_pointer()?);
            }
        }
        // Anything left before the record delimiter is unexpected.
        while !p.terminated() {
            if p.read_int(Some(0))? != 0 {
                return Err(IgesError::Parse(
                    "unexpected fields after optional pointer groups".into(),
                ));
            }
        }
        Ok(())
    }

    /// Emit the optional trailing pointer groups.
    pub(crate) fn format_extras(&self, f: &mut ParamFormatter, seq_map: &SeqMap) -> Result<()> {
        if self.extras_assoc.is_empty() && self.extras_props.is_empty() {
            return Ok(());
        }
        f.push(self.extras_assoc.len().to_string());
        for id in &self.extras_assoc {
            f.push(format_pointer(seq_of(seq_map, *id)?));
        }
        f.push(self.extras_props.len().to_string());
        for id in &self.extras_props {
            f.push(format_pointer(seq_of(seq_map, *id)?));
        }
        Ok(())
    }

    /// Resolve the directory-entry pointer fields and the extras groups.
    /// Returns false (and marks the entity degenerate) if any pointer
    /// dangles or resolves to the wrong kind.
    pub(crate) fn associate_common(
        &mut self,
        index: &DeIndex,
        notes: &mut NotificationCollection,
        type_name: &'static str,
        forbids_structure: bool,
    ) -> bool {
        let mut ok = true;
        let de = self.sequence;

        if self.structure_ptr != 0 && forbids_structure {
            notes.notify(
                NotificationType::Violation,
                format!("structure pointer cleared on {} at DE {}", type_name, de),
            );
            self.structure_ptr = 0;
        }
        match index.resolve(self.structure_ptr) {
            Ok(Some((id, _))) => self.structure = Some(id),
            Ok(None) => {}
            Err(_) => {
                notes.notify(
                    NotificationType::Error,
                    format!("dangling structure pointer on {} at DE {}", type_name, de),
                );
                ok = false;
            }
        }
        if self.line_font_ptr < 0 {
            match index.resolve(self.line_font_ptr) {
                Ok(Some((id, _))) => self.line_font_ref = Some(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("dangling line-font pointer on {} at DE {}", type_name, de),
                    );
                    ok = false;
                }
            }
        } else {
            self.line_font = self.line_font_ptr;
        }
        if self.level_ptr < 0 {
            match index.resolve(self.level_ptr) {
                Ok(Some((id, _))) => self.level_ref = Some(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("dangling level pointer on {} at DE {}", type_name, de),
                    );
                    ok = false;
                }
            }
        } else {
            self.level = self.level_ptr;
        }
        if self.view_ptr > 0 {
            match index.resolve(self.view_ptr) {
                Ok(Some((id, _))) => self.view = Some(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("dangling view pointer on {} at DE {}", type_name, de),
                    );
                    ok = false;
                }
            }
        }
        if self.transform_ptr > 0 {
            match index.resolve(self.transform_ptr) {
                Ok(Some((id, code))) if code == TYPE_TRANSFORMATION_MATRIX => {
                    self.transform = Some(id)
                }
                Ok(Some((_, code))) => {
                    notes.notify(
                        NotificationType::Error,
                        format!(
                            "transform pointer on {} at DE {} resolves to type {}",
                            type_name, de, code
                        ),
                    );
                    ok = false;
                }
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("dangling transform pointer on {} at DE {}", type_name, de),
                    );
                    ok = false;
                }
            }
        }
        if self.label_display_ptr > 0 {
            match index.resolve(self.label_display_ptr) {
                Ok(Some((id, _))) => self.label_display = Some(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!(
                            "dangling label-display pointer on {} at DE {}",
                            type_name, de
                        ),
                    );
                    ok = false;
                }
            }
        }
        if self.color_ptr < 0 {
            match index.resolve(self.color_ptr) {
                Ok(Some((id, code))) if code == TYPE_COLOR_DEFINITION => {
                    self.color_ref = Some(id)
                }
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("bad color pointer on {} at DE {}", type_name, de),
                    );
                    ok = false;
                }
            }
        } else {
            self.color = self.color_ptr;
        }

        let extra_ptrs = std::mem::take(&mut self.extra_ptrs);
        for ptr in &extra_ptrs {
            match index.resolve(*ptr) {
                Ok(Some((id, _))) => self.extras_assoc.push(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("dangling extra pointer on {} at DE {}", type_name, de),
                    );
                    ok = false;
                }
            }
        }
        let prop_ptrs = std::mem::take(&mut self.prop_ptrs);
        for ptr in &prop_ptrs {
            match index.resolve(*ptr) {
                Ok(Some((id, _))) => self.extras_props.push(id),
                _ => {
                    notes.notify(
                        NotificationType::Error,
                        format!("dangling property pointer on {} at DE {}", type_name, de),
                    );
                    ok = false;
                }
            }
        }

        if !ok {
            self.degenerate = true;
        }
        ok
    }
}

/// Raw integer fields of one directory-entry record pair
#[derive(Debug, Clone, Default)]
pub struct RawDirectoryEntry {
    pub type_code: i32,
    pub parameter_data: i32,
    pub structure: i32,
    pub line_font: i32,
    pub level: i32,
    pub view: i32,
    pub transform: i32,
    pub label_display: i32,
    pub status: i32,
    pub line_weight: i32,
    pub color: i32,
    pub param_line_count: i32,
    pub form: i32,
    pub label: String,
    pub subscript: i32,
    pub sequence: u32,
}

fn de_field(content: &str, idx: usize) -> Result<i32> {
    let text = content
        .get(idx * 8..(idx + 1) * 8)
        .ok_or_else(|| IgesError::Record("directory record too short".into()))?
        .trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| IgesError::Record(format!("bad directory field '{}'", text)))
}

impl RawDirectoryEntry {
    /// Decode a directory-entry record pair.
    pub fn parse(rec1: &Record, rec2: &Record) -> Result<RawDirectoryEntry> {
        let type_code = de_field(&rec1.content, 0)?;
        if de_field(&rec2.content, 0)? != type_code {
            return Err(IgesError::Record(format!(
                "directory record pair at DE {} disagrees on entity type",
                rec1.sequence
            )));
        }
        let label = rec2
            .content
            .get(56..64)
            .unwrap_or_default()
            .trim()
            .to_string();
        Ok(RawDirectoryEntry {
            type_code,
            parameter_data: de_field(&rec1.content, 1)?,
            structure: de_field(&rec1.content, 2)?,
            line_font: de_field(&rec1.content, 3)?,
            level: de_field(&rec1.content, 4)?,
            view: de_field(&rec1.content, 5)?,
            transform: de_field(&rec1.content, 6)?,
            label_display: de_field(&rec1.content, 7)?,
            status: de_field(&rec1.content, 8)?,
            line_weight: de_field(&rec2.content, 1)?,
            color: de_field(&rec2.content, 2)?,
            param_line_count: de_field(&rec2.content, 3)?,
            form: de_field(&rec2.content, 4)?,
            label,
            subscript: de_field(&rec2.content, 8)?,
            sequence: rec1.sequence,
        })
    }
}

/// Base trait implemented by every entity kind
pub trait Entity {
    /// Common directory-entry data
    fn common(&self) -> &EntityCommon;

    /// Mutable common data
    fn common_mut(&mut self) -> &mut EntityCommon;

    /// IGES entity type code
    fn type_code(&self) -> i32;

    /// Human-readable kind name
    fn type_name(&self) -> &'static str;

    /// Form numbers this kind accepts
    fn allowed_forms(&self) -> &'static [i32];

    /// True when the DE structure field is forbidden for this kind
    fn forbids_structure(&self) -> bool {
        false
    }

    /// True when the hierarchy status sub-field is meaningful
    fn supports_hierarchy(&self) -> bool {
        true
    }

    /// Multiply geometric coordinates by a scale factor. Kinds without
    /// coordinates ignore it.
    fn rescale(&mut self, _sf: f64) {}

    /// Parse this kind's parameter fields. The type-code prefix has
    /// already been consumed; pointers must be recorded as raw integers.
    fn read_pd(&mut self, p: &mut ParamParser, globals: &GlobalData) -> Result<()>;

    /// Emit this kind's parameter fields (type code already pushed).
    fn format_pd(
        &self,
        f: &mut ParamFormatter,
        globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<()>;

    /// Resolve this kind's raw pointer fields. Returns false when a
    /// pointer dangles or has the wrong kind (entity becomes degenerate).
    fn associate(&mut self, _index: &DeIndex, _notes: &mut NotificationCollection) -> bool {
        true
    }

    /// Resolved children specific to this kind
    fn child_ids(&self) -> Vec<EntityId> {
        Vec::new()
    }

    /// Children through which ownership (and thus cycles) propagate
    fn owned_child_ids(&self) -> Vec<EntityId> {
        self.child_ids()
    }

    /// Clear any typed slot of this kind referencing `id`
    fn unlink(&mut self, _id: EntityId) -> bool {
        false
    }
}

/// Enumeration of all entity kinds for type-safe storage
#[derive(Debug, Clone)]
pub enum EntityType {
    /// 100 Circular arc
    CircularArc(CircularArc),
    /// 102 Composite curve
    CompositeCurve(CompositeCurve),
    /// 104 Conic arc
    ConicArc(ConicArc),
    /// 110 Line
    Line(Line),
    /// 120 Surface of revolution
    SurfaceOfRevolution(SurfaceOfRevolution),
    /// 124 Transformation matrix
    TransformationMatrix(TransformationMatrix),
    /// 126 Rational B-spline curve
    RationalBSplineCurve(RationalBSplineCurve),
    /// 128 Rational B-spline surface
    RationalBSplineSurface(RationalBSplineSurface),
    /// 142 Curve on a parametric surface
    CurveOnSurface(CurveOnSurface),
    /// 144 Trimmed parametric surface
    TrimmedSurface(TrimmedSurface),
    /// 308 Subfigure definition
    SubfigureDefinition(SubfigureDefinition),
    /// 314 Color definition
    ColorDefinition(ColorDefinition),
    /// 402 Associativity instance
    Associativity(GroupAssociativity),
    /// 406 Property
    Property(Property),
    /// 408 Singular subfigure instance
    SubfigureInstance(SubfigureInstance),
    /// Any other type code; round-trips untyped
    Null(NullEntity),
}

impl EntityType {
    /// The registry: the only path for allocating typed entities. Unknown
    /// codes produce a [`NullEntity`] shell.
    pub fn from_type_code(code: i32) -> EntityType {
        match code {
            TYPE_CIRCULAR_ARC => EntityType::CircularArc(CircularArc::new()),
            TYPE_COMPOSITE_CURVE => EntityType::CompositeCurve(CompositeCurve::new()),
            TYPE_CONIC_ARC => EntityType::ConicArc(ConicArc::new()),
            TYPE_LINE => EntityType::Line(Line::new()),
            TYPE_SURFACE_OF_REVOLUTION => {
                EntityType::SurfaceOfRevolution(SurfaceOfRevolution::new())
            }
            TYPE_TRANSFORMATION_MATRIX => {
                EntityType::TransformationMatrix(TransformationMatrix::new())
            }
            TYPE_RATIONAL_BSPLINE_CURVE => {
                EntityType::RationalBSplineCurve(RationalBSplineCurve::new())
            }
            TYPE_RATIONAL_BSPLINE_SURFACE => {
                EntityType::RationalBSplineSurface(RationalBSplineSurface::new())
            }
            TYPE_CURVE_ON_SURFACE => EntityType::CurveOnSurface(CurveOnSurface::new()),
            TYPE_TRIMMED_SURFACE => EntityType::TrimmedSurface(TrimmedSurface::new()),
            TYPE_SUBFIGURE_DEFINITION => {
                EntityType::SubfigureDefinition(SubfigureDefinition::new())
            }
            TYPE_COLOR_DEFINITION => EntityType::ColorDefinition(ColorDefinition::new()),
            TYPE_ASSOCIATIVITY => EntityType::Associativity(GroupAssociativity::new()),
            TYPE_PROPERTY => EntityType::Property(Property::new()),
            TYPE_SUBFIGURE_INSTANCE => EntityType::SubfigureInstance(SubfigureInstance::new()),
            other => EntityType::Null(NullEntity::new(other)),
        }
    }

    /// Get a reference to the entity trait object
    pub fn as_entity(&self) -> &dyn Entity {
        match self {
            EntityType::CircularArc(e) => e,
            EntityType::CompositeCurve(e) => e,
            EntityType::ConicArc(e) => e,
            EntityType::Line(e) => e,
            EntityType::SurfaceOfRevolution(e) => e,
            EntityType::TransformationMatrix(e) => e,
            EntityType::RationalBSplineCurve(e) => e,
            EntityType::RationalBSplineSurface(e) => e,
            EntityType::CurveOnSurface(e) => e,
            EntityType::TrimmedSurface(e) => e,
            EntityType::SubfigureDefinition(e) => e,
            EntityType::ColorDefinition(e) => e,
            EntityType::Associativity(e) => e,
            EntityType::Property(e) => e,
            EntityType::SubfigureInstance(e) => e,
            EntityType::Null(e) => e,
        }
    }

    /// Get a mutable reference to the entity trait object
    pub fn as_entity_mut(&mut self) -> &mut dyn Entity {
        match self {
            EntityType::CircularArc(e) => e,
            EntityType::CompositeCurve(e) => e,
            EntityType::ConicArc(e) => e,
            EntityType::Line(e) => e,
            EntityType::SurfaceOfRevolution(e) => e,
            EntityType::TransformationMatrix(e) => e,
            EntityType::RationalBSplineCurve(e) => e,
            EntityType::RationalBSplineSurface(e) => e,
            EntityType::CurveOnSurface(e) => e,
            EntityType::TrimmedSurface(e) => e,
            EntityType::SubfigureDefinition(e) => e,
            EntityType::ColorDefinition(e) => e,
            EntityType::Associativity(e) => e,
            EntityType::Property(e) => e,
            EntityType::SubfigureInstance(e) => e,
            EntityType::Null(e) => e,
        }
    }

    /// Shorthand for the common directory-entry data
    pub fn common(&self) -> &EntityCommon {
        self.as_entity().common()
    }

    /// Shorthand for the mutable common data
    pub fn common_mut(&mut self) -> &mut EntityCommon {
        self.as_entity_mut().common_mut()
    }

    /// Shorthand for the type code
    pub fn type_code(&self) -> i32 {
        self.as_entity().type_code()
    }

    /// All resolved children: DE references, extras, and kind-specific
    pub fn all_child_ids(&self) -> Vec<EntityId> {
        let mut out = self.common().common_child_ids();
        out.extend(self.as_entity().child_ids());
        out
    }

    /// Children through which cycles are forbidden: kind-owned children
    /// plus the transform chain
    pub fn owning_child_ids(&self) -> Vec<EntityId> {
        let mut out = self.as_entity().owned_child_ids();
        if let Some(t) = self.common().transform {
            out.push(t);
        }
        out
    }

    /// Clear every slot (common or kind-specific) referencing `id`
    pub fn unlink(&mut self, id: EntityId) -> bool {
        let a = self.common_mut().unlink_common(id);
        let b = self.as_entity_mut().unlink(id);
        a || b
    }

    /// Change the form number, validated against the kind's whitelist.
    pub fn set_form(&mut self, form: i32) -> Result<()> {
        let allowed = self.as_entity().allowed_forms();
        if !allowed.is_empty() && !allowed.contains(&form) {
            return Err(IgesError::InvalidForm {
                type_code: self.type_code(),
                form,
            });
        }
        self.common_mut().form = form;
        Ok(())
    }

    /// Fill common DE fields from the raw record pair and validate the
    /// form number against the kind's whitelist.
    pub fn read_de(&mut self, raw: &RawDirectoryEntry) -> Result<()> {
        let allowed = self.as_entity().allowed_forms();
        if !allowed.is_empty() && !allowed.contains(&raw.form) {
            return Err(IgesError::InvalidForm {
                type_code: raw.type_code,
                form: raw.form,
            });
        }
        let c = self.common_mut();
        c.sequence = raw.sequence;
        c.parameter_data = raw.parameter_data.max(0) as u32;
        c.param_line_count = raw.param_line_count.max(0) as u32;
        c.form = raw.form;
        c.label = raw.label.clone();
        c.subscript = raw.subscript;
        c.line_weight = raw.line_weight;
        c.status = StatusNumber::from_de(raw.status)?;
        c.structure_ptr = raw.structure;
        c.line_font_ptr = raw.line_font;
        c.level_ptr = raw.level;
        c.view_ptr = raw.view;
        c.transform_ptr = raw.transform;
        c.label_display_ptr = raw.label_display;
        c.color_ptr = raw.color;
        if raw.line_font >= 0 {
            c.line_font = raw.line_font;
        }
        if raw.level >= 0 {
            c.level = raw.level;
        }
        if raw.color >= 0 {
            c.color = raw.color;
        }
        Ok(())
    }

    /// Emit the directory-entry record pair (content columns only).
    pub fn format_de(&self, seq_map: &SeqMap) -> Result<(String, String)> {
        let c = self.common();
        let code = self.type_code();
        let enc_neg = |slot: Option<EntityId>, raw: i32| -> Result<i32> {
            match slot {
                Some(id) => Ok(-seq_of(seq_map, id)?),
                None => Ok(raw.max(0)),
            }
        };
        let enc_pos = |slot: Option<EntityId>| -> Result<i32> {
            match slot {
                Some(id) => seq_of(seq_map, id),
                None => Ok(0),
            }
        };
        let structure = match c.structure {
            Some(id) => -seq_of(seq_map, id)?,
            None => 0,
        };
        let rec1 = format!(
            "{:8}{:8}{:8}{:8}{:8}{:8}{:8}{:8}{:08}",
            code,
            c.parameter_data,
            structure,
            enc_neg(c.line_font_ref, c.line_font)?,
            enc_neg(c.level_ref, c.level)?,
            enc_pos(c.view)?,
            enc_pos(c.transform)?,
            enc_pos(c.label_display)?,
            c.status.to_de(),
        );
        let rec2 = format!(
            "{:8}{:8}{:8}{:8}{:8}{:8}{:8}{:>8}{:8}",
            code,
            c.line_weight,
            enc_neg(c.color_ref, c.color)?,
            c.param_line_count,
            c.form,
            "",
            "",
            truncate_label(&c.label),
            c.subscript,
        );
        Ok((rec1, rec2))
    }

    /// Parse a full parameter block: type-code prefix, kind fields, the
    /// optional pointer groups, and trailing comment records.
    pub fn read_pd_block(&mut self, lines: &[String], globals: &GlobalData) -> Result<()> {
        if let EntityType::Null(n) = self {
            return n.capture_payload(lines);
        }
        let payload: String = lines
            .iter()
            .map(|l| pad_to(l, PD_CONTENT_LEN))
            .collect::<Vec<_>>()
            .join("");
        let mut p = ParamParser::new(&payload, globals.pdelim, globals.rdelim);
        let code = p.read_int(None)?;
        if code != self.type_code() {
            return Err(IgesError::Parse(format!(
                "parameter block begins with type {} but DE {} declares {}",
                code,
                self.common().sequence,
                self.type_code()
            )));
        }
        self.as_entity_mut().read_pd(&mut p, globals)?;
        self.common_mut().read_extras(&mut p)?;

        // The remainder of the record carrying the record delimiter must be
        // blank; whole records after it are comments.
        let pos = p.byte_pos();
        let rd_line = (pos - 1) / PD_CONTENT_LEN;
        let line_end = ((rd_line + 1) * PD_CONTENT_LEN).min(payload.len());
        if payload[pos..line_end].trim().is_empty() {
            for line in lines.iter().skip(rd_line + 1) {
                self.common_mut()
                    .comments
                    .push(line.trim_end().to_string());
            }
            Ok(())
        } else {
            Err(IgesError::Parse(format!(
                "content after record delimiter in parameter block of DE {}",
                self.common().sequence
            )))
        }
    }

    /// Produce the parameter block's content lines (64 columns each) and
    /// record the resulting line count.
    pub fn format_pd_block(
        &mut self,
        globals: &GlobalData,
        seq_map: &SeqMap,
    ) -> Result<Vec<String>> {
        let lines = match self {
            EntityType::Null(n) => n.payload_lines(globals),
            _ => {
                let mut f = ParamFormatter::new(globals.pdelim, globals.rdelim);
                f.push(self.type_code().to_string());
                self.as_entity().format_pd(&mut f, globals, seq_map)?;
                self.common().format_extras(&mut f, seq_map)?;
                let mut lines = wrap_payload(&f.finish(), PD_CONTENT_LEN);
                for comment in &self.common().comments {
                    if comment.len() > PD_CONTENT_LEN {
                        return Err(IgesError::Format(format!(
                            "comment line exceeds {} columns",
                            PD_CONTENT_LEN
                        )));
                    }
                    lines.push(comment.clone());
                }
                lines
            }
        };
        self.common_mut().param_line_count = lines.len() as u32;
        Ok(lines)
    }
}

fn pad_to(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

fn truncate_label(label: &str) -> &str {
    if label.len() > 8 {
        &label[..8]
    } else {
        label
    }
}
