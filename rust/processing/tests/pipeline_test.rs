// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline behaviour against an in-memory model and a small IFC file.

use ifc2cloud_geometry::{Error as GeometryError, Mesh, Point3};
use ifc2cloud_processing::{
    aggregate, filter_elements, partition, process_chunk, AggregateMesh, BimModel,
    CategoryColors, Element, GeometryHandle, IfcModel, Pipeline, PipelineConfig, PipelineError,
};

/// Element of the mock model: `faces` disjoint triangles in a row at height `y`
#[derive(Clone)]
struct MockElement {
    category: &'static str,
    faces: usize,
    y: f64,
    behaviour: Behaviour,
}

#[derive(Clone, Copy, PartialEq)]
enum Behaviour {
    Resolve,
    Fail,
    Panic,
}

struct MockModel {
    elements: Vec<MockElement>,
}

impl MockModel {
    fn new(elements: Vec<MockElement>) -> Self {
        Self { elements }
    }
}

fn el(category: &'static str, faces: usize, y: f64) -> MockElement {
    MockElement {
        category,
        faces,
        y,
        behaviour: Behaviour::Resolve,
    }
}

impl BimModel for MockModel {
    fn enumerate(&self) -> Vec<Element> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| Element {
                id: i as u32 + 1,
                category: e.category.to_string(),
                geometry: GeometryHandle {
                    representation: i as u32,
                    placement: None,
                },
            })
            .collect()
    }

    fn resolve(&self, element: &Element) -> ifc2cloud_geometry::Result<Mesh> {
        let fixture = &self.elements[element.geometry.representation as usize];
        match fixture.behaviour {
            Behaviour::Fail => return Err(GeometryError::NoRepresentation),
            Behaviour::Panic => panic!("kernel crashed on #{}", element.id),
            Behaviour::Resolve => {}
        }
        let mut mesh = Mesh::new();
        let x0 = element.id as f64 * 100.0;
        for k in 0..fixture.faces {
            let x = x0 + k as f64 * 2.0;
            let a = mesh.add_vertex(Point3::new(x, fixture.y, 0.0));
            let b = mesh.add_vertex(Point3::new(x + 1.0, fixture.y, 0.0));
            let c = mesh.add_vertex(Point3::new(x, fixture.y + 1.0, 0.0));
            mesh.add_triangle(a, b, c);
        }
        Ok(mesh)
    }
}

/// 2 x "A" with 100 faces in total, 8 x "B" with 50 faces in total
fn mixed_model() -> MockModel {
    let mut elements = vec![el("A", 50, -10.0), el("A", 50, -10.0)];
    elements.extend((0..8).map(|i| el("B", if i < 2 { 7 } else { 6 }, 10.0)));
    MockModel::new(elements)
}

/// Whether `p` lies on one of the mesh faces (all mock faces are in z = 0)
fn on_some_face(mesh: &AggregateMesh, p: [f64; 3]) -> bool {
    const EPS: f64 = 1e-9;
    p[2].abs() <= EPS
        && (0..mesh.face_count()).any(|f| {
            let [a, b, c] = mesh.face_vertices(f);
            let det = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
            let u = ((p[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (p[1] - a[1])) / det;
            let v = ((b[0] - a[0]) * (p[1] - a[1]) - (p[0] - a[0]) * (b[1] - a[1])) / det;
            u >= -EPS && v >= -EPS && u + v <= 1.0 + EPS
        })
}

fn config() -> PipelineConfig {
    PipelineConfig::default().with_seed(11).with_voxel_size(0.0)
}

#[test]
fn test_excluding_category_keeps_only_other_faces() {
    let model = mixed_model();
    let pipeline = Pipeline::new(
        config()
            .with_excluded(["A"])
            .with_workers(4)
            .with_target_points(1000),
    )
    .unwrap();

    let conversion = pipeline.run(&model).unwrap();
    let mesh = &conversion.extraction.mesh;
    assert_eq!(mesh.face_count(), 50);
    assert_eq!(conversion.extraction.stats.elements_excluded, 2);
    assert!(conversion.cloud.len() <= 1000);
    assert!(!conversion.cloud.is_empty());
    for p in &conversion.cloud.points {
        assert!(on_some_face(mesh, *p), "point off the B faces: {:?}", p);
    }
}

#[test]
fn test_worker_count_does_not_change_mesh() {
    let model = mixed_model();
    let meshes: Vec<_> = [1, 2, 3, 4, 7]
        .into_iter()
        .map(|workers| {
            Pipeline::new(config().with_workers(workers))
                .unwrap()
                .extract(&model)
                .unwrap()
                .mesh
        })
        .collect();
    for mesh in &meshes[1..] {
        assert_eq!(mesh, &meshes[0]);
    }
}

#[test]
fn test_partition_count_does_not_change_aggregate() {
    // drives the stages directly so the pool size is not capped by the host
    let model = mixed_model();
    let admitted = filter_elements(model.enumerate(), &[]);
    let colors = CategoryColors::from_categories(["A", "B"]);
    let meshes: Vec<_> = [1, 2, 3, 4, 7, 16]
        .into_iter()
        .map(|workers| {
            let partials = partition(admitted.clone(), workers)
                .into_iter()
                .map(|chunk| process_chunk(&model, chunk, colors.clone()).0)
                .collect::<Vec<_>>();
            assert_eq!(partials.len(), workers);
            aggregate(partials).unwrap()
        })
        .collect();
    assert_eq!(meshes[0].face_count(), 150);
    for mesh in &meshes[1..] {
        assert_eq!(mesh, &meshes[0]);
    }
}

#[test]
fn test_face_indices_in_bounds_and_ranges_disjoint() {
    let extraction = Pipeline::new(config().with_workers(3))
        .unwrap()
        .extract(&mixed_model())
        .unwrap();
    let mesh = extraction.mesh;
    let n = mesh.vertex_count() as u32;
    assert!(mesh.faces.iter().flatten().all(|&i| i < n));

    let mut ranges: Vec<_> = mesh.element_ranges.values().cloned().collect();
    ranges.sort_by_key(|r| r.start);
    assert!(ranges.windows(2).all(|w| w[0].end <= w[1].start));
    assert_eq!(ranges.iter().map(|r| r.len()).sum::<usize>(), 150);
}

#[test]
fn test_excluding_absent_category_is_noop() {
    let model = mixed_model();
    let base = Pipeline::new(config()).unwrap().extract(&model).unwrap();
    let filtered = Pipeline::new(config().with_excluded(["IfcDoor"]))
        .unwrap()
        .extract(&model)
        .unwrap();
    assert_eq!(base.mesh, filtered.mesh);
}

#[test]
fn test_all_excluded_is_no_geometry() {
    let result = Pipeline::new(config().with_excluded(["A", "B"]))
        .unwrap()
        .extract(&mixed_model());
    match result {
        Err(PipelineError::NoGeometry(message)) => assert_eq!(message, "no geometry to sample"),
        other => panic!("unexpected {:?}", other.map(|e| e.stats)),
    }
}

#[test]
fn test_empty_model_is_no_geometry() {
    let result = Pipeline::new(config()).unwrap().extract(&MockModel::new(Vec::new()));
    assert!(matches!(result, Err(PipelineError::NoGeometry(_))));
}

#[test]
fn test_element_failures_are_recorded() {
    let mut elements = vec![el("A", 3, 0.0), el("B", 2, 0.0)];
    elements[0].behaviour = Behaviour::Fail;
    let extraction = Pipeline::new(config().with_workers(2))
        .unwrap()
        .extract(&MockModel::new(elements))
        .unwrap();

    assert_eq!(extraction.failures.len(), 1);
    assert_eq!(extraction.failures[0].element_id, 1);
    assert_eq!(extraction.failures[0].category, "A");
    assert_eq!(extraction.mesh.face_count(), 2);
    assert_eq!(extraction.stats.elements_resolved, 1);
}

#[test]
fn test_worker_panic_is_fatal() {
    let mut elements = vec![el("A", 1, 0.0), el("A", 1, 0.0)];
    elements[1].behaviour = Behaviour::Panic;
    let result = Pipeline::new(config()).unwrap().extract(&MockModel::new(elements));
    match result {
        Err(PipelineError::WorkerFault { message, .. }) => {
            assert!(message.contains("kernel crashed"))
        }
        other => panic!("unexpected {:?}", other.map(|e| e.stats)),
    }
}

#[test]
fn test_all_failed_still_exports_but_cannot_sample() {
    let mut element = el("A", 1, 0.0);
    element.behaviour = Behaviour::Fail;
    let pipeline = Pipeline::new(config()).unwrap();
    let extraction = pipeline.extract(&MockModel::new(vec![element])).unwrap();
    assert!(extraction.mesh.is_empty());
    assert!(matches!(
        pipeline.sample(&extraction.mesh),
        Err(PipelineError::DegenerateSurface)
    ));
}

#[test]
fn test_category_colors_follow_sorted_admitted_categories() {
    let extraction = Pipeline::new(config())
        .unwrap()
        .extract(&mixed_model())
        .unwrap();
    let legend: Vec<&str> = extraction.colors.iter().map(|(c, _)| c).collect();
    assert_eq!(legend, vec!["A", "B"]);
    let b_range = &extraction.mesh.element_ranges[&3];
    let [v, _, _] = extraction.mesh.faces[b_range.start];
    assert_eq!(extraction.mesh.colors[v as usize], extraction.colors.color_for("B"));
}

const BUILDING: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('p',$,'P',$,$,$,$,$,#3);
#2=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);
#3=IFCUNITASSIGNMENT((#2));
#4=IFCDIRECTION((0.,0.,1.));
#10=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,4.,0.2);
#11=IFCEXTRUDEDAREASOLID(#10,$,#4,3.);
#12=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#11));
#13=IFCPRODUCTDEFINITIONSHAPE($,$,(#12));
#14=IFCWALLSTANDARDCASE('w',$,'W',$,$,$,#13,$);
#20=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,0.9,0.05);
#21=IFCEXTRUDEDAREASOLID(#20,$,#4,2.1);
#22=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#21));
#23=IFCPRODUCTDEFINITIONSHAPE($,$,(#22));
#24=IFCDOOR('d',$,'D',$,$,$,#23,$,2.1,0.9);
#30=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#31));
#31=IFCSPHERE($,1.);
#32=IFCPRODUCTDEFINITIONSHAPE($,$,(#30));
#33=IFCBUILDINGELEMENTPROXY('x',$,'X',$,$,$,#32,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

#[test]
fn test_ifc_model_end_to_end() {
    let model = IfcModel::from_content(BUILDING).unwrap();
    let pipeline = Pipeline::new(
        config()
            .with_excluded(["IfcDoor"])
            .with_target_points(500)
            .with_voxel_size(0.05),
    )
    .unwrap();
    let conversion = pipeline.run(&model).unwrap();

    let stats = &conversion.extraction.stats;
    assert_eq!(stats.elements_total, 3);
    assert_eq!(stats.elements_excluded, 1);
    assert_eq!(stats.elements_resolved, 1);
    assert_eq!(conversion.extraction.failures[0].element_id, 33);
    assert!(!conversion.cloud.is_empty());
    assert!(conversion.cloud.len() <= 500);
    assert!(conversion
        .cloud
        .points
        .iter()
        .all(|p| p[0].abs() <= 2.0 + 1e-9 && p[2] >= -1e-9 && p[2] <= 3.0 + 1e-9));
}

#[test]
fn test_commented_out_product_is_not_enumerated() {
    // the comment repeats the wall id with the door's shape
    let content = BUILDING.replace(
        "#14=IFCWALLSTANDARDCASE",
        "/* #14=IFCWALLSTANDARDCASE('old',$,'W',$,$,$,#23,$); */\n#14=IFCWALLSTANDARDCASE",
    );
    let model = IfcModel::from_content(content).unwrap();
    let ids: Vec<u32> = model.enumerate().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![14, 24, 33]);

    let single = Pipeline::new(config().with_workers(1)).unwrap().extract(&model).unwrap();
    assert_eq!(single.stats.elements_admitted, 3);
    assert_eq!(single.stats.elements_resolved, 2);
    assert_eq!(single.mesh.face_count(), 24);

    let admitted = model.enumerate();
    let partials = partition(admitted, 3)
        .into_iter()
        .map(|chunk| process_chunk(&model, chunk, single.colors.clone()).0)
        .collect::<Vec<_>>();
    assert_eq!(aggregate(partials).unwrap(), single.mesh);
}

#[test]
fn test_same_seed_same_cloud() {
    let model = mixed_model();
    let pipeline = Pipeline::new(config().with_target_points(200)).unwrap();
    let a = pipeline.run(&model).unwrap();
    let b = pipeline.run(&model).unwrap();
    assert_eq!(a.seed, 11);
    assert_eq!(a.cloud, b.cloud);
}
