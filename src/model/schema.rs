//! Structural schema of the glyph record types.
//!
//! A hand-written registry describes every record type's fields: name,
//! declared type, optionality, and element type for ordered collections.
//! [`derive_schema`] walks the registry from a root class and produces a
//! declarative mapping for external consumers (UI form generation, typed
//! clients). Field names here are the wire names, matching what the serde
//! derives on the model types emit.
//!
//! The registry is fixed at build time, so the canonical derivation over
//! [`VariableGlyph`](crate::model::VariableGlyph) is computed once per
//! process and shared.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

/// Static description of one record type.
pub struct ClassDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

/// One field of a record type, in declaration order.
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// The declared shape of a field.
#[derive(Clone, Copy)]
pub enum FieldKind {
    Float,
    Int,
    Str,
    Bool,
    /// The packed point-type tag; a base type at the schema level.
    PointType,
    /// Axis-name to coordinate mapping; a base type at the schema level.
    Location,
    Record(&'static ClassDef),
    Optional(&'static FieldKind),
    List(&'static FieldKind),
}

impl FieldKind {
    fn base_name(&self) -> Option<&'static str> {
        match self {
            FieldKind::Float => Some("float"),
            FieldKind::Int => Some("int"),
            FieldKind::Str => Some("str"),
            FieldKind::Bool => Some("bool"),
            FieldKind::PointType => Some("PointType"),
            FieldKind::Location => Some("Location"),
            _ => None,
        }
    }
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, kind }
}

pub static TRANSFORMATION: ClassDef = ClassDef {
    name: "Transformation",
    fields: &[
        field("translateX", FieldKind::Float),
        field("translateY", FieldKind::Float),
        field("rotation", FieldKind::Float),
        field("scaleX", FieldKind::Float),
        field("scaleY", FieldKind::Float),
        field("skewX", FieldKind::Float),
        field("skewY", FieldKind::Float),
        field("tCenterX", FieldKind::Float),
        field("tCenterY", FieldKind::Float),
    ],
};

pub static COMPONENT: ClassDef = ClassDef {
    name: "Component",
    fields: &[
        field("name", FieldKind::Str),
        field("transformation", FieldKind::Record(&TRANSFORMATION)),
        field("location", FieldKind::Location),
    ],
};

pub static CONTOUR_INFO: ClassDef = ClassDef {
    name: "ContourInfo",
    fields: &[
        field("endPoint", FieldKind::Int),
        field("isClosed", FieldKind::Bool),
    ],
};

pub static PACKED_PATH: ClassDef = ClassDef {
    name: "PackedPath",
    fields: &[
        field("coordinates", FieldKind::List(&FieldKind::Float)),
        field("pointTypes", FieldKind::List(&FieldKind::PointType)),
        field(
            "contourInfo",
            FieldKind::List(&FieldKind::Record(&CONTOUR_INFO)),
        ),
    ],
};

pub static STATIC_GLYPH: ClassDef = ClassDef {
    name: "StaticGlyph",
    fields: &[
        field("path", FieldKind::Record(&PACKED_PATH)),
        field(
            "components",
            FieldKind::List(&FieldKind::Record(&COMPONENT)),
        ),
        field("xAdvance", FieldKind::Optional(&FieldKind::Float)),
        field("yAdvance", FieldKind::Optional(&FieldKind::Float)),
        field("verticalOrigin", FieldKind::Optional(&FieldKind::Float)),
    ],
};

pub static SOURCE: ClassDef = ClassDef {
    name: "Source",
    fields: &[
        field("name", FieldKind::Str),
        field("layerName", FieldKind::Str),
        field("location", FieldKind::Location),
    ],
};

pub static LAYER: ClassDef = ClassDef {
    name: "Layer",
    fields: &[
        field("name", FieldKind::Str),
        field("glyph", FieldKind::Record(&STATIC_GLYPH)),
    ],
};

pub static LOCAL_AXIS: ClassDef = ClassDef {
    name: "LocalAxis",
    fields: &[
        field("name", FieldKind::Str),
        field("minValue", FieldKind::Float),
        field("defaultValue", FieldKind::Float),
        field("maxValue", FieldKind::Float),
    ],
};

pub static VARIABLE_GLYPH: ClassDef = ClassDef {
    name: "VariableGlyph",
    fields: &[
        field("name", FieldKind::Str),
        field("axes", FieldKind::List(&FieldKind::Record(&LOCAL_AXIS))),
        field("unicodes", FieldKind::List(&FieldKind::Int)),
        field("sources", FieldKind::List(&FieldKind::Record(&SOURCE))),
        field("layers", FieldKind::List(&FieldKind::Record(&LAYER))),
    ],
};

pub static AXIS_MAPPING: ClassDef = ClassDef {
    name: "AxisMapping",
    fields: &[
        field("input", FieldKind::Float),
        field("output", FieldKind::Float),
    ],
};

pub static GLOBAL_AXIS: ClassDef = ClassDef {
    name: "GlobalAxis",
    fields: &[
        field("name", FieldKind::Str),
        field("tag", FieldKind::Str),
        field("minValue", FieldKind::Float),
        field("defaultValue", FieldKind::Float),
        field("maxValue", FieldKind::Float),
        field(
            "mapping",
            FieldKind::List(&FieldKind::Record(&AXIS_MAPPING)),
        ),
    ],
};

/// Derived description of one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<&'static str>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Mapping from record type name to its fields, in declaration order.
pub type Schema = BTreeMap<&'static str, Vec<FieldSchema>>;

/// Walk the type graph from `root` and describe every reachable record type.
///
/// Depth-first with the output map doubling as the visited set, so shared
/// and (hypothetically) cyclic references terminate; each class appears
/// exactly once no matter how many fields reference it.
///
/// Panics on a field shape it cannot classify (an optional of a collection,
/// a collection of optionals, nested collections): that is a bug in the
/// registry, not bad input.
pub fn derive_schema(root: &'static ClassDef) -> Schema {
    let mut schema = Schema::new();
    visit(root, &mut schema);
    schema
}

fn visit(class: &'static ClassDef, schema: &mut Schema) {
    if schema.contains_key(class.name) {
        return;
    }
    // Mark as visited before descending so reference cycles terminate.
    schema.insert(class.name, Vec::new());
    let fields: Vec<FieldSchema> = class
        .fields
        .iter()
        .map(|f| describe(class, f, schema))
        .collect();
    schema.insert(class.name, fields);
}

fn describe(class: &'static ClassDef, field: &FieldDef, schema: &mut Schema) -> FieldSchema {
    let mut described = FieldSchema {
        name: field.name,
        type_name: "",
        optional: false,
        subtype: None,
    };
    match field.kind {
        FieldKind::Record(inner) => {
            visit(inner, schema);
            described.type_name = inner.name;
        }
        FieldKind::Optional(inner) => {
            described.optional = true;
            match *inner {
                FieldKind::Record(inner) => {
                    visit(inner, schema);
                    described.type_name = inner.name;
                }
                base => {
                    described.type_name = base
                        .base_name()
                        .unwrap_or_else(|| unclassifiable(class, field));
                }
            }
        }
        FieldKind::List(element) => {
            described.type_name = "list";
            match *element {
                FieldKind::Record(inner) => {
                    visit(inner, schema);
                    described.subtype = Some(inner.name);
                }
                base => {
                    described.subtype =
                        Some(base.base_name().unwrap_or_else(|| unclassifiable(class, field)));
                }
            }
        }
        base => {
            described.type_name = base
                .base_name()
                .unwrap_or_else(|| unclassifiable(class, field));
        }
    }
    described
}

fn unclassifiable(class: &ClassDef, field: &FieldDef) -> ! {
    panic!(
        "unclassifiable field shape for {}.{} in the schema registry",
        class.name, field.name
    );
}

/// The canonical schema: everything reachable from `VariableGlyph`,
/// computed once per process.
pub fn classes_schema() -> &'static Schema {
    static CLASSES_SCHEMA: OnceLock<Schema> = OnceLock::new();
    CLASSES_SCHEMA.get_or_init(|| derive_schema(&VARIABLE_GLYPH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_reachable_record_appears_exactly_once() {
        let schema = classes_schema();
        let names: Vec<&str> = schema.keys().copied().collect();
        assert_eq!(
            names,
            vec![
                "Component",
                "ContourInfo",
                "Layer",
                "LocalAxis",
                "PackedPath",
                "Source",
                "StaticGlyph",
                "Transformation",
                "VariableGlyph",
            ]
        );
    }

    #[test]
    fn fields_keep_declaration_order() {
        let schema = classes_schema();
        let names: Vec<&str> = schema["VariableGlyph"].iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["name", "axes", "unicodes", "sources", "layers"]);
        let names: Vec<&str> = schema["Transformation"].iter().map(|f| f.name).collect();
        assert_eq!(names[0], "translateX");
        assert_eq!(names[8], "tCenterY");
    }

    #[test]
    fn optional_and_collection_annotations() {
        let schema = classes_schema();
        let static_glyph = &schema["StaticGlyph"];
        let x_advance = static_glyph.iter().find(|f| f.name == "xAdvance").unwrap();
        assert_eq!(x_advance.type_name, "float");
        assert!(x_advance.optional);
        let components = static_glyph.iter().find(|f| f.name == "components").unwrap();
        assert_eq!(components.type_name, "list");
        assert_eq!(components.subtype, Some("Component"));
        let path = static_glyph.iter().find(|f| f.name == "path").unwrap();
        assert_eq!(path.type_name, "PackedPath");
        assert!(!path.optional);
    }

    #[test]
    fn base_types_recorded_as_is() {
        let schema = classes_schema();
        let point_types = schema["PackedPath"]
            .iter()
            .find(|f| f.name == "pointTypes")
            .unwrap();
        assert_eq!(point_types.subtype, Some("PointType"));
        let location = schema["Component"]
            .iter()
            .find(|f| f.name == "location")
            .unwrap();
        assert_eq!(location.type_name, "Location");
        assert_eq!(location.subtype, None);
    }

    #[test]
    fn canonical_schema_is_memoized() {
        assert!(std::ptr::eq(classes_schema(), classes_schema()));
    }

    #[test]
    fn subgraph_roots_agree_with_the_canonical_schema() {
        // Deriving from a nested root yields the same descriptions for the
        // types it reaches.
        let sub = derive_schema(&STATIC_GLYPH);
        let full = classes_schema();
        for (name, fields) in &sub {
            assert_eq!(fields, &full[name]);
        }
        assert!(!sub.contains_key("VariableGlyph"));
    }

    #[test]
    fn global_axis_schema_includes_mapping_pairs() {
        let schema = derive_schema(&GLOBAL_AXIS);
        assert!(schema.contains_key("AxisMapping"));
        let mapping = schema["GlobalAxis"]
            .iter()
            .find(|f| f.name == "mapping")
            .unwrap();
        assert_eq!(mapping.subtype, Some("AxisMapping"));
    }

    #[test]
    fn schema_serializes_to_json() {
        let value = serde_json::to_value(classes_schema()).unwrap();
        assert_eq!(value["StaticGlyph"][2]["type"], "float");
        assert_eq!(value["StaticGlyph"][2]["optional"], true);
        assert_eq!(value["VariableGlyph"][0]["name"], "name");
    }
}
