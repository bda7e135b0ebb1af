// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tests for geometry processors, driven through the router.

use crate::error::Error;
use crate::mesh::Mesh;
use crate::router::GeometryRouter;
use approx::assert_relative_eq;
use ifc2cloud_core::EntityDecoder;
use nalgebra::Point3;

fn process(content: &str, item_id: u32) -> crate::Result<Mesh> {
    let mut decoder = EntityDecoder::new(content);
    let item = decoder.decode_by_id(item_id)?;
    GeometryRouter::new().process_item(&item, &mut decoder)
}

const UNIT_CUBE_BREP: &str = r#"
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCCARTESIANPOINT((1.,0.,0.));
#3=IFCCARTESIANPOINT((1.,1.,0.));
#4=IFCCARTESIANPOINT((0.,1.,0.));
#5=IFCCARTESIANPOINT((0.,0.,1.));
#6=IFCCARTESIANPOINT((1.,0.,1.));
#7=IFCCARTESIANPOINT((1.,1.,1.));
#8=IFCCARTESIANPOINT((0.,1.,1.));
#10=IFCPOLYLOOP((#1,#4,#3,#2));
#11=IFCPOLYLOOP((#5,#6,#7,#8));
#12=IFCPOLYLOOP((#1,#2,#6,#5));
#13=IFCPOLYLOOP((#2,#3,#7,#6));
#14=IFCPOLYLOOP((#3,#4,#8,#7));
#15=IFCPOLYLOOP((#4,#1,#5,#8));
#20=IFCFACEOUTERBOUND(#10,.T.);
#21=IFCFACEOUTERBOUND(#11,.T.);
#22=IFCFACEOUTERBOUND(#12,.T.);
#23=IFCFACEOUTERBOUND(#13,.T.);
#24=IFCFACEOUTERBOUND(#14,.T.);
#25=IFCFACEBOUND(#15,.T.);
#30=IFCFACE((#20));
#31=IFCFACE((#21));
#32=IFCFACE((#22));
#33=IFCFACE((#23));
#34=IFCFACE((#24));
#35=IFCFACE((#25));
#40=IFCCLOSEDSHELL((#30,#31,#32,#33,#34,#35));
#41=IFCFACETEDBREP(#40);
#42=IFCCONNECTEDFACESET((#30,#31));
#43=IFCFACEBASEDSURFACEMODEL((#42));
#44=IFCOPENSHELL((#32,#33));
#45=IFCSHELLBASEDSURFACEMODEL((#44));
"#;

#[test]
fn test_faceted_brep_cube() {
    let mesh = process(UNIT_CUBE_BREP, 41).unwrap();
    assert_eq!(mesh.triangle_count(), 12);
    assert_relative_eq!(mesh.surface_area(), 6.0, epsilon = 1e-12);

    let centre = Point3::new(0.5, 0.5, 0.5);
    for tri in mesh.triangles() {
        let a = mesh.vertex(tri[0] as usize);
        assert!((a - centre).dot(&mesh.triangle_normal(tri)) > 0.0);
    }
}

#[test]
fn test_surface_models() {
    let face_based = process(UNIT_CUBE_BREP, 43).unwrap();
    assert_relative_eq!(face_based.surface_area(), 2.0, epsilon = 1e-12);

    let shell_based = process(UNIT_CUBE_BREP, 45).unwrap();
    assert_relative_eq!(shell_based.surface_area(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_reversed_bound_flips_face() {
    let content = r#"
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCCARTESIANPOINT((1.,0.,0.));
#3=IFCCARTESIANPOINT((0.,1.,0.));
#4=IFCPOLYLOOP((#1,#2,#3));
#5=IFCFACEOUTERBOUND(#4,.F.);
#6=IFCFACE((#5));
#7=IFCCONNECTEDFACESET((#6));
#8=IFCFACEBASEDSURFACEMODEL((#7));
"#;
    let mesh = process(content, 8).unwrap();
    let tri = mesh.triangles().next().unwrap();
    assert!(mesh.triangle_normal(tri).z < 0.0);
}

#[test]
fn test_triangulated_face_set_with_pn_index() {
    let content = r#"
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(9.,9.,9.),(2.,0.,0.),(0.,2.,0.)));
#2=IFCTRIANGULATEDFACESET(#1,$,.T.,((1,2,3),(1,2,9)),(1,3,4));
"#;
    let mesh = process(content, 2).unwrap();
    // the second triangle references a missing PnIndex entry and is dropped
    assert_eq!(mesh.triangle_count(), 1);
    assert_relative_eq!(mesh.surface_area(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_triangulated_face_set() {
    let content = r#"
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(1.,0.,0.),(1.,1.,0.),(0.,1.,0.)));
#2=IFCTRIANGULATEDFACESET(#1,$,$,((1,2,3),(1,3,4)),$);
"#;
    let mesh = process(content, 2).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert_relative_eq!(mesh.surface_area(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_polygonal_face_set_with_void() {
    let content = r#"
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(2.,0.,0.),(2.,2.,0.),(0.,2.,0.),(0.5,0.5,0.),(1.5,0.5,0.),(1.5,1.5,0.),(0.5,1.5,0.)));
#2=IFCINDEXEDPOLYGONALFACEWITHVOIDS((1,2,3,4),((5,8,7,6)));
#3=IFCPOLYGONALFACESET(#1,$,(#2),$);
"#;
    let mesh = process(content, 3).unwrap();
    assert_relative_eq!(mesh.surface_area(), 3.0, epsilon = 1e-9);
    for tri in mesh.triangles() {
        assert!(mesh.triangle_normal(tri).z > 0.0);
    }
}

#[test]
fn test_polygonal_face_set_skips_degenerate_face() {
    let content = r#"
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(1.,0.,0.),(1.,1.,0.),(0.,1.,0.)));
#2=IFCINDEXEDPOLYGONALFACE((1,2,3,4));
#3=IFCINDEXEDPOLYGONALFACE((1,2));
#4=IFCPOLYGONALFACESET(#1,$,(#2,#3),$);
"#;
    let mesh = process(content, 4).unwrap();
    assert_relative_eq!(mesh.surface_area(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_extruded_area_solid_with_position() {
    let content = r#"
#1=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,1.,2.);
#2=IFCCARTESIANPOINT((5.,0.,0.));
#3=IFCAXIS2PLACEMENT3D(#2,$,$);
#4=IFCDIRECTION((0.,0.,1.));
#5=IFCEXTRUDEDAREASOLID(#1,#3,#4,3.);
"#;
    let mesh = process(content, 5).unwrap();
    let (min, max) = mesh.bounds().unwrap();
    assert_relative_eq!(min, Point3::new(4.5, -1.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(max, Point3::new(5.5, 1.0, 3.0), epsilon = 1e-12);
}

const MAPPED: &str = r#"
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(1.,0.,0.),(0.,1.,0.)));
#2=IFCTRIANGULATEDFACESET(#1,$,$,((1,2,3)),$);
#3=IFCSHAPEREPRESENTATION($,'Body','Tessellation',(#2));
#4=IFCCARTESIANPOINT((0.,0.,1.));
#5=IFCAXIS2PLACEMENT3D(#4,$,$);
#6=IFCREPRESENTATIONMAP(#5,#3);
#7=IFCCARTESIANPOINT((10.,0.,0.));
#8=IFCCARTESIANTRANSFORMATIONOPERATOR3D($,$,#7,2.,$);
#9=IFCMAPPEDITEM(#6,#8);
"#;

#[test]
fn test_mapped_item_applies_target_and_origin() {
    let mesh = process(MAPPED, 9).unwrap();
    let (min, max) = mesh.bounds().unwrap();
    // origin lifts by 1, target scales by 2 and shifts by 10 in x
    assert_relative_eq!(min, Point3::new(10.0, 0.0, 2.0), epsilon = 1e-12);
    assert_relative_eq!(max, Point3::new(12.0, 2.0, 2.0), epsilon = 1e-12);
    assert_relative_eq!(mesh.surface_area(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_self_referencing_mapped_item_is_rejected() {
    let content = r#"
#1=IFCSHAPEREPRESENTATION($,'Body','MappedRepresentation',(#3));
#2=IFCREPRESENTATIONMAP($,#1);
#3=IFCMAPPEDITEM(#2,$);
"#;
    assert!(matches!(process(content, 3), Err(Error::Geometry(_))));
}

#[test]
fn test_boolean_uses_first_operand() {
    let content = r#"
#1=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,1.,1.);
#2=IFCDIRECTION((0.,0.,1.));
#3=IFCEXTRUDEDAREASOLID(#1,$,#2,1.);
#4=IFCCARTESIANPOINT((0.,0.,0.5));
#5=IFCAXIS2PLACEMENT3D(#4,$,$);
#6=IFCPLANE(#5);
#7=IFCHALFSPACESOLID(#6,.F.);
#8=IFCBOOLEANCLIPPINGRESULT(.DIFFERENCE.,#3,#7);
"#;
    let mesh = process(content, 8).unwrap();
    assert_relative_eq!(mesh.surface_area(), 6.0, epsilon = 1e-9);
}

#[test]
fn test_unsupported_operand_propagates() {
    let content = r#"
#1=IFCSPHERE($,1.);
#2=IFCBOOLEANRESULT(.UNION.,#1,#1);
"#;
    assert!(matches!(process(content, 2), Err(Error::UnsupportedType(_))));
}
