//! Entity-graph lifecycle scenarios: reference mirroring, delete
//! cascades, handle validity, and the orphan sweep.

use igesrust::entities::EntityType;
use igesrust::types::{Point3, SubordinateStatus};
use igesrust::IgesDocument;
use tempfile::tempdir;

#[test]
fn delete_cascade_through_trimmed_surface() {
    let mut doc = IgesDocument::new();
    let surface = doc.new_entity(120);
    let boundary = doc.new_entity(142);
    let trimmed = doc.new_entity(144);

    doc.set_surface(boundary, surface).unwrap();
    doc.set_surface(trimmed, surface).unwrap();
    doc.set_outer_boundary(trimmed, boundary).unwrap();
    // The trimmed surface exists only as part of a larger body here.
    doc.entity_mut(trimmed).unwrap().common_mut().status.subordinate =
        SubordinateStatus::PhysicallyDependent;

    // Delete the underlying surface.
    doc.delete_entity(surface).unwrap();
    assert!(!doc.is_valid(surface));

    match doc.entity(trimmed).unwrap() {
        EntityType::TrimmedSurface(t) => assert!(t.surface.is_none()),
        _ => panic!("expected trimmed surface"),
    }
    match doc.entity(boundary).unwrap() {
        EntityType::CurveOnSurface(c) => assert!(c.surface.is_none()),
        _ => panic!("expected curve on surface"),
    }

    // Both survivors are dependent with a dwindling parent chain; the
    // sweep before the next write removes the whole chain.
    let dir = tempdir().unwrap();
    let path = dir.path().join("cascade.igs");
    doc.write(&path, false).unwrap();
    assert_eq!(doc.entity_count(), 0);
    assert!(!doc.is_valid(trimmed));
    assert!(!doc.is_valid(boundary));
}

#[test]
fn back_references_have_no_duplicates() {
    let mut doc = IgesDocument::new();
    let group = doc.new_entity(402);
    let line = doc.new_entity(110);
    doc.add_extra(line, group).unwrap();
    doc.add_extra(line, group).unwrap();

    assert_eq!(doc.entity(line).unwrap().common().extras_assoc.len(), 1);
    assert_eq!(doc.entity(group).unwrap().common().refs.len(), 1);
}

#[test]
fn every_child_pointer_is_mirrored() {
    let mut doc = IgesDocument::new();
    let cc = doc.new_entity(102);
    let a = doc.new_entity(110);
    let b = doc.new_entity(100);
    doc.add_segment(cc, a).unwrap();
    doc.add_segment(cc, b).unwrap();

    for id in [a, b] {
        let child = doc.entity(id).unwrap().common();
        assert_eq!(child.refs.iter().filter(|r| **r == cc).count(), 1);
    }
    let children = doc.entity(cc).unwrap().all_child_ids();
    assert_eq!(children, vec![a, b]);
}

#[test]
fn stale_ids_stay_invalid_forever() {
    let mut doc = IgesDocument::new();
    let id = doc.new_entity(110);
    doc.delete_entity(id).unwrap();
    assert!(!doc.is_valid(id));
    for _ in 0..10 {
        let fresh = doc.new_entity(110);
        assert_ne!(fresh, id);
    }
    assert!(!doc.is_valid(id));
}

#[test]
fn rescale_composes_multiplicatively() {
    let mut doc1 = IgesDocument::new();
    let mut doc2 = IgesDocument::new();
    for doc in [&mut doc1, &mut doc2] {
        let id = doc.new_entity(110);
        if let Some(EntityType::Line(line)) = doc.entity_mut(id) {
            line.start = Point3::new(1.0, 2.0, 3.0);
            line.end = Point3::new(-4.0, 5.0, -6.0);
        }
    }
    doc1.rescale_all(2.0);
    doc1.rescale_all(3.5);
    doc2.rescale_all(7.0);

    let l1 = match doc1.entities().next().unwrap() {
        EntityType::Line(l) => l.clone(),
        _ => unreachable!(),
    };
    let l2 = match doc2.entities().next().unwrap() {
        EntityType::Line(l) => l.clone(),
        _ => unreachable!(),
    };
    assert!((l1.start - l2.start).length() < 1e-12);
    assert!((l1.end - l2.end).length() < 1e-12);
}

#[test]
fn subfigure_instance_to_definition_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("subfig.igs");

    let mut doc = IgesDocument::new();
    let def = doc.new_entity(308);
    let member = doc.new_entity(110);
    if let Some(EntityType::Line(line)) = doc.entity_mut(member) {
        line.end = Point3::new(3.0, 0.0, 0.0);
    }
    if let Some(EntityType::SubfigureDefinition(d)) = doc.entity_mut(def) {
        d.name = "pad".into();
    }
    doc.add_member(def, member).unwrap();

    let inst = doc.new_entity(408);
    if let Some(EntityType::SubfigureInstance(i)) = doc.entity_mut(inst) {
        i.offset = Point3::new(10.0, 20.0, 0.0);
        i.scale = 2.0;
    }
    doc.set_definition(inst, def).unwrap();

    doc.write(&path, false).unwrap();
    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    assert_eq!(back.entity_count(), 3);

    let inst = back
        .entities()
        .find_map(|e| match e {
            EntityType::SubfigureInstance(i) => Some(i),
            _ => None,
        })
        .expect("instance survived");
    assert_eq!(inst.scale, 2.0);
    assert!((inst.offset - Point3::new(10.0, 20.0, 0.0)).length() < 1e-9);
    let def_id = inst.definition.expect("definition resolved");
    match back.entity(def_id).unwrap() {
        EntityType::SubfigureDefinition(d) => {
            assert_eq!(d.name, "pad");
            assert_eq!(d.member_count(), 1);
        }
        _ => panic!("expected subfigure definition"),
    }
}

#[test]
fn properties_attach_as_extras_and_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("props.igs");

    let mut doc = IgesDocument::new();
    let line = doc.new_entity(110);
    if let Some(EntityType::Line(l)) = doc.entity_mut(line) {
        l.end = Point3::new(1.0, 0.0, 0.0);
    }
    let prop = doc.new_entity(406);
    if let Some(EntityType::Property(p)) = doc.entity_mut(prop) {
        p.name = Some("TOP_EDGE".into());
    }
    doc.add_extra(line, prop).unwrap();

    doc.write(&path, false).unwrap();
    let mut back = IgesDocument::new();
    back.read(&path).unwrap();

    let line = back
        .entities()
        .find_map(|e| match e {
            EntityType::Line(_) => Some(e.common()),
            _ => None,
        })
        .expect("line survived");
    assert_eq!(line.extras_props.len(), 1);
    let prop_id = line.extras_props[0];
    match back.entity(prop_id).unwrap() {
        EntityType::Property(p) => assert_eq!(p.name.as_deref(), Some("TOP_EDGE")),
        _ => panic!("expected property"),
    }
}
