//! End-to-end read/write/read scenarios exercising the full codec path:
//! record layer, global section, directory renumbering, parameter
//! formatting, and the two-pass resolver.

use igesrust::entities::{EntityType, TYPE_COLOR_DEFINITION, TYPE_COMPOSITE_CURVE, TYPE_LINE};
use igesrust::types::Point3;
use igesrust::{IgesDocument, Units};
use tempfile::tempdir;

fn make_line(doc: &mut IgesDocument, start: Point3, end: Point3) -> igesrust::EntityId {
    let id = doc.new_entity(TYPE_LINE);
    if let Some(EntityType::Line(line)) = doc.entity_mut(id) {
        line.start = start;
        line.end = end;
    }
    id
}

fn make_bspline(doc: &mut IgesDocument, y: f64) -> igesrust::EntityId {
    let id = doc.new_entity(126);
    if let Some(EntityType::RationalBSplineCurve(c)) = doc.entity_mut(id) {
        c.upper_index = 1;
        c.degree = 1;
        c.knots = vec![0.0, 0.0, 1.0, 1.0];
        c.weights = vec![1.0, 1.0];
        c.control_points = vec![Point3::new(0.0, y, 0.0), Point3::new(10.0, y, 0.0)];
        c.v0 = 0.0;
        c.v1 = 1.0;
    }
    id
}

#[test]
fn roundtrip_single_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("line.igs");

    let mut doc = IgesDocument::new();
    doc.set_product_id("single line");
    make_line(
        &mut doc,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 2.0, 3.0),
    );
    doc.write(&path, false).unwrap();

    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    assert_eq!(back.entity_count(), 1);
    match back.entities().next().unwrap() {
        EntityType::Line(line) => {
            assert!((line.end - Point3::new(1.0, 2.0, 3.0)).length() < 1e-9);
            assert!((line.start - Point3::ZERO).length() < 1e-9);
        }
        other => panic!("expected a line, got type {}", other.type_code()),
    };
}

#[test]
fn roundtrip_preserves_directory_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("defields.igs");

    let mut doc = IgesDocument::new();
    doc.set_author("A. Author");
    doc.set_organization("ACME");
    let id = make_line(
        &mut doc,
        Point3::new(-1.0, -2.0, -3.0),
        Point3::new(4.0, 5.0, 6.0),
    );
    {
        let c = doc.entity_mut(id).unwrap().common_mut();
        c.level = 7;
        c.line_weight = 2;
        c.color = 3;
        c.label = "EDGE".into();
        c.subscript = 12;
    }
    doc.write(&path, false).unwrap();

    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    assert_eq!(back.author(), "A. Author");
    assert_eq!(back.organization(), "ACME");
    let e = back.entities().next().unwrap().common();
    assert_eq!(e.level, 7);
    assert_eq!(e.line_weight, 2);
    assert_eq!(e.color, 3);
    assert_eq!(e.label, "EDGE");
    assert_eq!(e.subscript, 12);
}

#[test]
fn inch_file_converts_to_millimetres_on_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inches.igs");

    let mut doc = IgesDocument::new();
    doc.set_units(Units::Inch);
    make_line(
        &mut doc,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    );
    doc.write(&path, false).unwrap();

    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    match back.entities().next().unwrap() {
        EntityType::Line(line) => {
            assert!((line.end.x - 25.4).abs() < 1e-9);
        }
        _ => panic!("expected a line"),
    }
    // The converted model is a millimetre model now.
    assert_eq!(back.units(), Units::Millimeter);
}

#[test]
fn millimetre_file_is_unchanged_by_conversion() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mm.igs");

    let mut doc = IgesDocument::new();
    make_line(
        &mut doc,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    );
    doc.write(&path, false).unwrap();

    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    match back.entities().next().unwrap() {
        EntityType::Line(line) => assert!((line.end.x - 1.0).abs() < 1e-12),
        _ => panic!("expected a line"),
    };
}

#[test]
fn composite_curve_integrity_after_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("composite.igs");

    let mut doc = IgesDocument::new();
    let cc = doc.new_entity(TYPE_COMPOSITE_CURVE);
    for y in [0.0, 1.0, 2.0] {
        let seg = make_bspline(&mut doc, y);
        doc.add_segment(cc, seg).unwrap();
    }
    doc.write(&path, false).unwrap();

    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    assert_eq!(back.entity_count(), 4);

    let (cc_id, segment_ids) = {
        let composite = back
            .entities()
            .find_map(|e| match e {
                EntityType::CompositeCurve(c) => Some(c),
                _ => None,
            })
            .expect("composite curve survived");
        assert_eq!(composite.segment_count(), 3);
        (composite.common.id, composite.segments.clone())
    };
    for seg_id in segment_ids {
        let seg = back.entity(seg_id).unwrap();
        assert!(
            seg.common().refs.contains(&cc_id),
            "segment lost its back-reference"
        );
    }
}

#[test]
fn delimiter_override_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("delims.igs");

    let mut doc = IgesDocument::new();
    doc.set_delimiters('/', '#').unwrap();
    make_line(
        &mut doc,
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
    );
    // A Hollerith string containing both chosen delimiters must survive.
    let color = doc.new_entity(TYPE_COLOR_DEFINITION);
    if let Some(EntityType::ColorDefinition(c)) = doc.entity_mut(color) {
        c.cyan = 10.0;
        c.magenta = 20.0;
        c.yellow = 30.0;
        c.name = Some("mask/inner#1".into());
    }
    doc.write(&path, false).unwrap();

    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    assert_eq!(back.global.pdelim, '/');
    assert_eq!(back.global.rdelim, '#');
    let color = back
        .entities()
        .find_map(|e| match e {
            EntityType::ColorDefinition(c) => Some(c),
            _ => None,
        })
        .expect("color definition survived");
    assert_eq!(color.name.as_deref(), Some("mask/inner#1"));
    let line = back
        .entities()
        .find_map(|e| match e {
            EntityType::Line(l) => Some(l),
            _ => None,
        })
        .expect("line survived");
    assert!((line.end - Point3::new(2.0, 2.0, 0.0)).length() < 1e-9);
}

#[test]
fn unknown_type_payload_is_byte_identical() {
    let dir = tempdir().unwrap();
    let path_in = dir.path().join("unknown.igs");
    let path_out = dir.path().join("unknown2.igs");

    // Hand-write a file carrying a type-999 entity.
    fn record(content: &str, letter: char, seq: u32) -> String {
        format!("{:<72}{}{:7}\n", content, letter, seq)
    }
    let mut text = String::new();
    text.push_str(&record("unknown entity test", 'S', 1));
    let g = "1H,,1H;,4Htest,4Hfile,3Hsys,3Hver,32,38,6,308,15,4Htest,1.0,2,2HMM,\
1,1.0,15H20260801.120000,0.001,10.0,2Hme,3Horg,11,0,15H20260801.120000,4Hnone;";
    text.push_str(&record(&g[..72], 'G', 1));
    text.push_str(&record(&g[72..144], 'G', 2));
    text.push_str(&record(&g[144..], 'G', 3));
    text.push_str(&record(
        &format!(
            "{:8}{:8}{:8}{:8}{:8}{:8}{:8}{:8}{:08}",
            999, 1, 0, 0, 0, 0, 0, 0, 0
        ),
        'D',
        1,
    ));
    text.push_str(&record(
        &format!(
            "{:8}{:8}{:8}{:8}{:8}{:8}{:8}{:>8}{:8}",
            999, 0, 0, 1, 0, "", "", "", 0
        ),
        'D',
        2,
    ));
    let payload = "999,1,0.625,8Hraw;data;";
    text.push_str(&record(&format!("{:<64}{:>8}", payload, 1), 'P', 1));
    text.push_str(&record(&format!("S{:7}G{:7}D{:7}P{:7}", 1, 3, 2, 1), 'T', 1));
    std::fs::write(&path_in, &text).unwrap();

    let mut doc = IgesDocument::new();
    doc.read(&path_in).unwrap();
    assert_eq!(doc.entity_count(), 1);
    match doc.entities().next().unwrap() {
        EntityType::Null(n) => assert_eq!(n.raw_payload(), payload),
        other => panic!("expected a null shell, got type {}", other.type_code()),
    }

    doc.write(&path_out, false).unwrap();
    let written = std::fs::read_to_string(&path_out).unwrap();
    let p_payload: String = written
        .lines()
        .filter(|l| &l[72..73] == "P")
        .map(|l| l[..64].trim_end())
        .collect();
    assert_eq!(p_payload, payload);
}

#[test]
fn overwrite_flag_protects_existing_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("protected.igs");

    let mut doc = IgesDocument::new();
    make_line(
        &mut doc,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    );
    doc.write(&path, false).unwrap();
    let first = std::fs::read(&path).unwrap();

    assert!(doc.write(&path, false).is_err());
    assert_eq!(std::fs::read(&path).unwrap(), first);
    doc.write(&path, true).unwrap();
}

#[test]
fn no_written_entity_is_orphaned() {
    use igesrust::types::SubordinateStatus;

    let dir = tempdir().unwrap();
    let path = dir.path().join("orphans.igs");

    let mut doc = IgesDocument::new();
    make_line(
        &mut doc,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    );
    // A dependent entity nothing references: must be swept before write.
    let stray = make_line(
        &mut doc,
        Point3::new(5.0, 0.0, 0.0),
        Point3::new(6.0, 0.0, 0.0),
    );
    doc.entity_mut(stray).unwrap().common_mut().status.subordinate =
        SubordinateStatus::PhysicallyDependent;

    doc.write(&path, false).unwrap();
    assert_eq!(doc.entity_count(), 1);
    for e in doc.entities() {
        assert!(!e.common().is_orphaned());
    }

    let mut back = IgesDocument::new();
    back.read(&path).unwrap();
    assert_eq!(back.entity_count(), 1);
}

#[test]
fn full_graph_roundtrip_matches_field_for_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.igs");
    let path2 = dir.path().join("graph2.igs");

    let mut doc = IgesDocument::new();
    let line = make_line(
        &mut doc,
        Point3::new(0.25, 0.5, 0.75),
        Point3::new(9.5, 8.25, 7.125),
    );
    let xf = doc.new_entity(124);
    if let Some(EntityType::TransformationMatrix(t)) = doc.entity_mut(xf) {
        t.xf = igesrust::Transform::from_translation(Point3::new(5.0, 0.0, 0.0));
    }
    doc.set_transform(line, Some(xf)).unwrap();

    doc.write(&path, false).unwrap();
    let mut once = IgesDocument::new();
    once.read(&path).unwrap();
    once.write(&path2, false).unwrap();
    let mut twice = IgesDocument::new();
    twice.read(&path2).unwrap();

    assert_eq!(once.entity_count(), twice.entity_count());
    let tol = f64::max(once.min_resolution(), 1e-12);
    for (a, b) in once.entities().zip(twice.entities()) {
        assert_eq!(a.type_code(), b.type_code());
        assert_eq!(a.common().status.to_de(), b.common().status.to_de());
        if let (EntityType::Line(la), EntityType::Line(lb)) = (a, b) {
            assert!((la.start - lb.start).length() <= tol);
            assert!((la.end - lb.end).length() <= tol);
        }
    }

    // The line still carries its transform after two round trips.
    let line2 = twice
        .entities()
        .find_map(|e| match e {
            EntityType::Line(_) => Some(e.common()),
            _ => None,
        })
        .unwrap();
    assert!(line2.transform.is_some());
}
