// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Schema Types
//!
//! Entity types are matched through an enum instead of string comparison.
//! Only the product and geometry-resource types the extraction kernel needs
//! are listed; everything else decodes as [`IfcType::Unknown`].

use std::borrow::Cow;
use std::fmt;

use crate::parser::Token;

macro_rules! ifc_types {
    ($($variant:ident => $step:literal),* $(,)?) => {
        /// IFC entity types known to the decoder
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum IfcType {
            $($variant,)*
            Unknown,
        }

        impl IfcType {
            fn lookup(step_name: &str) -> Option<Self> {
                match step_name {
                    $($step => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// Upper-case STEP keyword, e.g. `IFCWALL`
            pub fn step_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $step,)*
                    Self::Unknown => "UNKNOWN",
                }
            }

            /// Schema spelling, e.g. `IfcWall`
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                    Self::Unknown => "Unknown",
                }
            }
        }
    };
}

ifc_types! {
    // Spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",

    // Building elements
    IfcWall => "IFCWALL",
    IfcWallStandardCase => "IFCWALLSTANDARDCASE",
    IfcWallElementedCase => "IFCWALLELEMENTEDCASE",
    IfcSlab => "IFCSLAB",
    IfcSlabStandardCase => "IFCSLABSTANDARDCASE",
    IfcBeam => "IFCBEAM",
    IfcColumn => "IFCCOLUMN",
    IfcRoof => "IFCROOF",
    IfcStair => "IFCSTAIR",
    IfcStairFlight => "IFCSTAIRFLIGHT",
    IfcRamp => "IFCRAMP",
    IfcRampFlight => "IFCRAMPFLIGHT",
    IfcRailing => "IFCRAILING",
    IfcCurtainWall => "IFCCURTAINWALL",
    IfcPlate => "IFCPLATE",
    IfcMember => "IFCMEMBER",
    IfcFooting => "IFCFOOTING",
    IfcPile => "IFCPILE",
    IfcCovering => "IFCCOVERING",
    IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
    IfcDoor => "IFCDOOR",
    IfcWindow => "IFCWINDOW",
    IfcOpeningElement => "IFCOPENINGELEMENT",

    // Furnishing and MEP
    IfcFurnishingElement => "IFCFURNISHINGELEMENT",
    IfcFurniture => "IFCFURNITURE",
    IfcFlowSegment => "IFCFLOWSEGMENT",
    IfcFlowTerminal => "IFCFLOWTERMINAL",
    IfcFlowFitting => "IFCFLOWFITTING",
    IfcPipeSegment => "IFCPIPESEGMENT",
    IfcDuctSegment => "IFCDUCTSEGMENT",
    IfcCableSegment => "IFCCABLESEGMENT",

    // Annotation
    IfcAnnotation => "IFCANNOTATION",
    IfcGrid => "IFCGRID",

    // Representation structure
    IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",
    IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
    IfcRepresentationMap => "IFCREPRESENTATIONMAP",
    IfcMappedItem => "IFCMAPPEDITEM",
    IfcGeometricRepresentationContext => "IFCGEOMETRICREPRESENTATIONCONTEXT",
    IfcGeometricRepresentationSubContext => "IFCGEOMETRICREPRESENTATIONSUBCONTEXT",

    // Placement
    IfcLocalPlacement => "IFCLOCALPLACEMENT",
    IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
    IfcAxis2Placement2D => "IFCAXIS2PLACEMENT2D",
    IfcCartesianPoint => "IFCCARTESIANPOINT",
    IfcDirection => "IFCDIRECTION",
    IfcCartesianTransformationOperator3D => "IFCCARTESIANTRANSFORMATIONOPERATOR3D",
    IfcCartesianTransformationOperator3DnonUniform => "IFCCARTESIANTRANSFORMATIONOPERATOR3DNONUNIFORM",

    // Solids and surfaces
    IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",
    IfcTriangulatedFaceSet => "IFCTRIANGULATEDFACESET",
    IfcPolygonalFaceSet => "IFCPOLYGONALFACESET",
    IfcIndexedPolygonalFace => "IFCINDEXEDPOLYGONALFACE",
    IfcIndexedPolygonalFaceWithVoids => "IFCINDEXEDPOLYGONALFACEWITHVOIDS",
    IfcCartesianPointList2D => "IFCCARTESIANPOINTLIST2D",
    IfcCartesianPointList3D => "IFCCARTESIANPOINTLIST3D",
    IfcFacetedBrep => "IFCFACETEDBREP",
    IfcClosedShell => "IFCCLOSEDSHELL",
    IfcOpenShell => "IFCOPENSHELL",
    IfcConnectedFaceSet => "IFCCONNECTEDFACESET",
    IfcFace => "IFCFACE",
    IfcFaceBound => "IFCFACEBOUND",
    IfcFaceOuterBound => "IFCFACEOUTERBOUND",
    IfcPolyLoop => "IFCPOLYLOOP",
    IfcFaceBasedSurfaceModel => "IFCFACEBASEDSURFACEMODEL",
    IfcShellBasedSurfaceModel => "IFCSHELLBASEDSURFACEMODEL",
    IfcBooleanResult => "IFCBOOLEANRESULT",
    IfcBooleanClippingResult => "IFCBOOLEANCLIPPINGRESULT",

    // Curves and profiles
    IfcPolyline => "IFCPOLYLINE",
    IfcIndexedPolyCurve => "IFCINDEXEDPOLYCURVE",
    IfcRectangleProfileDef => "IFCRECTANGLEPROFILEDEF",
    IfcRectangleHollowProfileDef => "IFCRECTANGLEHOLLOWPROFILEDEF",
    IfcCircleProfileDef => "IFCCIRCLEPROFILEDEF",
    IfcCircleHollowProfileDef => "IFCCIRCLEHOLLOWPROFILEDEF",
    IfcIShapeProfileDef => "IFCISHAPEPROFILEDEF",
    IfcLShapeProfileDef => "IFCLSHAPEPROFILEDEF",
    IfcArbitraryClosedProfileDef => "IFCARBITRARYCLOSEDPROFILEDEF",
    IfcArbitraryProfileDefWithVoids => "IFCARBITRARYPROFILEDEFWITHVOIDS",

    // Units
    IfcUnitAssignment => "IFCUNITASSIGNMENT",
    IfcSIUnit => "IFCSIUNIT",
    IfcConversionBasedUnit => "IFCCONVERSIONBASEDUNIT",
    IfcMeasureWithUnit => "IFCMEASUREWITHUNIT",

    // Relationships
    IfcRelAggregates => "IFCRELAGGREGATES",
    IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
    IfcRelVoidsElement => "IFCRELVOIDSELEMENT",
}

impl IfcType {
    /// Resolve a STEP keyword. Lower/mixed case spellings are accepted.
    pub fn from_step_name(step_name: &str) -> Self {
        if let Some(t) = Self::lookup(step_name) {
            return t;
        }
        if step_name.bytes().any(|b| b.is_ascii_lowercase()) {
            if let Some(t) = Self::lookup(&step_name.to_ascii_uppercase()) {
                return t;
            }
        }
        Self::Unknown
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Schema spelling for a STEP keyword.
///
/// Known types use the schema's casing (`IFCWALLSTANDARDCASE` -> `IfcWallStandardCase`).
/// Unknown ones fall back to `Ifc` + capitalised remainder (`IFCFLOWMOVINGDEVICE` -> `IfcFlowmovingdevice`).
pub fn canonical_type_name(step_name: &str) -> Cow<'static, str> {
    let known = IfcType::from_step_name(step_name);
    if known != IfcType::Unknown {
        return Cow::Borrowed(known.name());
    }

    let upper = step_name.to_ascii_uppercase();
    match upper.strip_prefix("IFC") {
        Some(rest) if !rest.is_empty() => {
            let mut name = String::with_capacity(step_name.len());
            name.push_str("Ifc");
            let mut chars = rest.chars();
            if let Some(first) = chars.next() {
                name.push(first);
            }
            name.extend(chars.map(|c| c.to_ascii_lowercase()));
            Cow::Owned(name)
        }
        _ => Cow::Owned(step_name.to_string()),
    }
}

/// Decode a STEP string literal body: `''` escapes and `\X2\....\X0\` UTF-16 runs.
fn decode_step_string(raw: &str) -> String {
    let unquoted = raw.replace("''", "'");
    if !unquoted.contains("\\X2\\") {
        return unquoted;
    }

    let mut out = String::with_capacity(unquoted.len());
    let mut rest = unquoted.as_str();
    while let Some(start) = rest.find("\\X2\\") {
        out.push_str(&rest[..start]);
        let encoded = &rest[start + 4..];
        let Some(end) = encoded.find("\\X0\\") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let units: Vec<u16> = encoded[..end]
            .as_bytes()
            .chunks(4)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok())
            .filter_map(|hex| u16::from_str_radix(hex, 16).ok())
            .collect();
        out.push_str(&String::from_utf16_lossy(&units));
        rest = &encoded[end + 4..];
    }
    out.push_str(rest);
    out
}

/// IFC entity attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Entity reference
    EntityRef(u32),
    /// String value, escapes decoded
    String(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enum value without the dots
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value such as `IFCLENGTHMEASURE(2.5)`
    Typed(String, Vec<AttributeValue>),
    /// Null/undefined
    Null,
    /// Derived value (*)
    Derived,
}

impl AttributeValue {
    /// Convert from Token
    pub fn from_token(token: &Token) -> Self {
        match token {
            Token::EntityRef(id) => AttributeValue::EntityRef(*id),
            Token::String(s) => AttributeValue::String(decode_step_string(s)),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(e) => AttributeValue::Enum(e.to_string()),
            Token::List(items) => {
                AttributeValue::List(items.iter().map(Self::from_token).collect())
            }
            Token::TypedValue(type_name, args) => AttributeValue::Typed(
                type_name.to_string(),
                args.iter().map(Self::from_token).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }

    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value; integers widen and single-argument typed values unwrap
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Typed(_, args) if args.len() == 1 => args[0].as_float(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Float(f) => Some(*f as i64),
            AttributeValue::Typed(_, args) if args.len() == 1 => args[0].as_int(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Coordinate tuples from a list of lists. Missing components read as 0.
    pub fn parse_coordinate_list_3d(coord_list: &[AttributeValue]) -> Vec<[f64; 3]> {
        coord_list
            .iter()
            .filter_map(|coord_attr| {
                let coord = coord_attr.as_list()?;
                let x = coord.first().and_then(|v| v.as_float()).unwrap_or(0.0);
                let y = coord.get(1).and_then(|v| v.as_float()).unwrap_or(0.0);
                let z = coord.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);
                Some([x, y, z])
            })
            .collect()
    }

    /// 1-based index tuples converted to 0-based; entries below 1 are dropped from the tuple
    pub fn parse_index_tuples(index_list: &[AttributeValue]) -> Vec<Vec<u32>> {
        index_list
            .iter()
            .filter_map(|tuple| tuple.as_list())
            .map(|tuple| {
                tuple
                    .iter()
                    .filter_map(|v| v.as_int())
                    .filter(|&i| i >= 1 && i <= u32::MAX as i64)
                    .map(|i| (i - 1) as u32)
                    .collect()
            })
            .collect()
    }
}

/// Decoded IFC entity with attributes
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntity {
    pub id: u32,
    pub ifc_type: IfcType,
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    pub fn new(id: u32, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            ifc_type,
            attributes,
        }
    }

    /// Get attribute by index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Entity references inside a list attribute; non-reference items are skipped
    pub fn get_refs(&self, index: usize) -> Vec<u32> {
        self.get_list(index)
            .map(|items| items.iter().filter_map(|v| v.as_entity_ref()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_step_name() {
        assert_eq!(IfcType::from_step_name("IFCWALL"), IfcType::IfcWall);
        assert_eq!(IfcType::from_step_name("IfcDoor"), IfcType::IfcDoor);
        assert_eq!(IfcType::from_step_name("IFCSIUNIT"), IfcType::IfcSIUnit);
        assert_eq!(IfcType::from_step_name("IFCCUSTOMTHING"), IfcType::Unknown);
    }

    #[test]
    fn test_names() {
        assert_eq!(IfcType::IfcWallStandardCase.name(), "IfcWallStandardCase");
        assert_eq!(IfcType::IfcWallStandardCase.step_name(), "IFCWALLSTANDARDCASE");
        assert_eq!(IfcType::IfcSlab.to_string(), "IfcSlab");
    }

    #[test]
    fn test_canonical_type_name() {
        assert_eq!(canonical_type_name("IFCBEAM"), "IfcBeam");
        assert_eq!(canonical_type_name("IFCFLOWMOVINGDEVICE"), "IfcFlowmovingdevice");
        assert_eq!(canonical_type_name("CUSTOM"), "CUSTOM");
    }

    #[test]
    fn test_string_escapes() {
        let value = AttributeValue::from_token(&Token::String("it''s"));
        assert_eq!(value.as_string(), Some("it's"));

        let value = AttributeValue::from_token(&Token::String("Gr\\X2\\00FC\\X0\\n"));
        assert_eq!(value.as_string(), Some("Grün"));
    }

    #[test]
    fn test_typed_value_as_float() {
        let value = AttributeValue::from_token(&Token::TypedValue(
            "IFCLENGTHMEASURE",
            vec![Token::Float(0.3048)],
        ));
        assert_eq!(value.as_float(), Some(0.3048));
    }

    #[test]
    fn test_parse_index_tuples() {
        let faces = vec![AttributeValue::List(vec![
            AttributeValue::Integer(1),
            AttributeValue::Integer(2),
            AttributeValue::Integer(3),
        ])];
        assert_eq!(AttributeValue::parse_index_tuples(&faces), vec![vec![0, 1, 2]]);
    }
}
