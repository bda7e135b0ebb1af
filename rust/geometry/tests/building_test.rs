// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end geometry for a small millimetre model: placements, units and
//! every supported representation family.

use approx::assert_relative_eq;
use ifc2cloud_core::{length_unit_scale, EntityDecoder, EntityScanner};
use ifc2cloud_geometry::{Error, GeometryRouter, Mesh};

const MODEL: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [DesignTransferView]'),'2;1');
FILE_NAME('small.ifc','2024-01-01T00:00:00',(''),(''),'','','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('0001',$,'Project',$,$,$,$,(#9),#5);
#2=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#5=IFCUNITASSIGNMENT((#2));
#9=IFCGEOMETRICREPRESENTATIONCONTEXT($,'Model',3,1.E-05,#12,$);
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCDIRECTION((0.,0.,1.));
#12=IFCAXIS2PLACEMENT3D(#10,$,$);
#13=IFCLOCALPLACEMENT($,#12);
#14=IFCCARTESIANPOINT((0.,0.,3000.));
#15=IFCAXIS2PLACEMENT3D(#14,$,$);
#16=IFCLOCALPLACEMENT(#13,#15);
#17=IFCBUILDINGSTOREY('0002',$,'Level 1',$,$,#16,$,$,.ELEMENT.,3000.);
#20=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,4000.,200.);
#21=IFCEXTRUDEDAREASOLID(#20,#12,#11,2500.);
#22=IFCSHAPEREPRESENTATION(#9,'Body','SweptSolid',(#21));
#23=IFCPRODUCTDEFINITIONSHAPE($,$,(#22));
#24=IFCWALL('0003',$,'Wall',$,$,#16,#23,$,.STANDARD.);
#30=IFCCIRCLEPROFILEDEF(.AREA.,$,$,150.);
#31=IFCEXTRUDEDAREASOLID(#30,#12,#11,2500.);
#32=IFCSHAPEREPRESENTATION(#9,'Body','SweptSolid',(#31));
#33=IFCPRODUCTDEFINITIONSHAPE($,$,(#32));
#34=IFCCARTESIANPOINT((5000.,5000.,0.));
#35=IFCAXIS2PLACEMENT3D(#34,$,$);
#36=IFCLOCALPLACEMENT(#16,#35);
#37=IFCCOLUMN('0004',$,'Column',$,$,#36,#33,$,.COLUMN.);
#40=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(1000.,0.,0.),(1000.,1000.,0.),(0.,1000.,0.)));
#41=IFCTRIANGULATEDFACESET(#40,$,$,((1,2,3),(1,3,4)),$);
#42=IFCSHAPEREPRESENTATION(#9,'Body','Tessellation',(#41));
#43=IFCREPRESENTATIONMAP(#12,#42);
#44=IFCCARTESIANPOINT((-2000.,0.,0.));
#45=IFCCARTESIANTRANSFORMATIONOPERATOR3D($,$,#44,$,$);
#46=IFCMAPPEDITEM(#43,#45);
#47=IFCSHAPEREPRESENTATION(#9,'Body','MappedRepresentation',(#46));
#48=IFCPRODUCTDEFINITIONSHAPE($,$,(#47));
#49=IFCFURNITURE('0005',$,'Table',$,$,#16,#48,$,$);
#50=IFCSWEPTDISKSOLID(#51,20.,$,$,$);
#51=IFCPOLYLINE((#10,#14));
#52=IFCSHAPEREPRESENTATION(#9,'Body','AdvancedSweptSolid',(#50));
#53=IFCPRODUCTDEFINITIONSHAPE($,$,(#52));
#54=IFCBUILDINGELEMENTPROXY('0006',$,'Rod',$,$,#16,#53,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

/// Mesh of the product with the given entity id
fn product_mesh(product_id: u32) -> ifc2cloud_geometry::Result<Mesh> {
    let mut decoder = EntityDecoder::new(MODEL);
    let scale = length_unit_scale(MODEL, &mut decoder)?;
    let router = GeometryRouter::with_scale(scale);

    let product = decoder.decode_by_id(product_id)?;
    let representation = product.get_ref(6).ok_or(Error::NoRepresentation)?;
    router.process_product(&mut decoder, representation, product.get_ref(5))
}

#[test]
fn test_products_with_representation() {
    let products: Vec<&str> = EntityScanner::new(MODEL)
        .filter(|e| matches!(e.id, 24 | 37 | 49 | 54))
        .map(|e| e.type_name)
        .collect();
    assert_eq!(products, ["IFCWALL", "IFCCOLUMN", "IFCFURNITURE", "IFCBUILDINGELEMENTPROXY"]);
}

#[test]
fn test_wall_in_metres_on_storey() {
    let mesh = product_mesh(24).unwrap();
    let (min, max) = mesh.bounds().unwrap();
    assert_relative_eq!(min.x, -2.0, epsilon = 1e-9);
    assert_relative_eq!(max.x, 2.0, epsilon = 1e-9);
    assert_relative_eq!(min.z, 3.0, epsilon = 1e-9);
    assert_relative_eq!(max.z, 5.5, epsilon = 1e-9);
}

#[test]
fn test_column_placed_relative_to_storey() {
    let mesh = product_mesh(37).unwrap();
    let (min, max) = mesh.bounds().unwrap();
    assert_relative_eq!((min.x + max.x) / 2.0, 5.0, epsilon = 1e-9);
    assert_relative_eq!((min.y + max.y) / 2.0, 5.0, epsilon = 1e-9);
    assert_relative_eq!(max.x - min.x, 0.3, epsilon = 1e-9);
}

#[test]
fn test_mapped_furniture() {
    let mesh = product_mesh(49).unwrap();
    let (min, max) = mesh.bounds().unwrap();
    assert_relative_eq!(min.x, -2.0, epsilon = 1e-9);
    assert_relative_eq!(max.x, -1.0, epsilon = 1e-9);
    assert_relative_eq!(min.z, 3.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.surface_area(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_unsupported_solid_is_reported() {
    assert!(matches!(product_mesh(54), Err(Error::UnsupportedType(_))));
}
