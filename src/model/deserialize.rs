//! Typed deserialization of interchange values.
//!
//! Takes the loosely-typed trees a generic decoder produces
//! (`serde_json::Value`) and builds strictly-typed model values: one explicit
//! function per record type, composed recursively, each returning either the
//! value or a [`CastError`] naming the offending field path. Raw point-type
//! integers are cast to [`PointType`] here; unknown values are data-shape
//! errors, not panics.
//!
//! Fields with model defaults (transformations, locations, collections) may
//! be omitted from the input; fields without defaults are required.

use serde_json::{Map, Value};

use crate::error::CastError;
use crate::model::glyph::{
    AxisMapping, Component, GlobalAxis, Layer, LocalAxis, Location, Source, StaticGlyph,
    Transformation, VariableGlyph,
};
use crate::model::path::{ContourInfo, PackedPath, PointType};

/// Build a [`VariableGlyph`] from an interchange value.
pub fn variable_glyph_from_value(value: &Value) -> Result<VariableGlyph, CastError> {
    variable_glyph_at(value, "")
}

/// Build a [`StaticGlyph`] from an interchange value.
pub fn static_glyph_from_value(value: &Value) -> Result<StaticGlyph, CastError> {
    static_glyph_at(value, "")
}

/// Build a [`GlobalAxis`] from an interchange value.
pub fn global_axis_from_value(value: &Value) -> Result<GlobalAxis, CastError> {
    global_axis_at(value, "")
}

fn variable_glyph_at(value: &Value, path: &str) -> Result<VariableGlyph, CastError> {
    let obj = as_object(value, path)?;
    Ok(VariableGlyph {
        name: require_str(obj, "name", path)?,
        axes: list_at(obj, "axes", path, local_axis_at)?,
        unicodes: unicodes_at(obj, path)?,
        sources: list_at(obj, "sources", path, source_at)?,
        layers: list_at(obj, "layers", path, layer_at)?,
    })
}

fn layer_at(value: &Value, path: &str) -> Result<Layer, CastError> {
    let obj = as_object(value, path)?;
    let glyph_path = join(path, "glyph");
    let glyph_value = obj
        .get("glyph")
        .ok_or_else(|| CastError::MissingField(glyph_path.clone()))?;
    Ok(Layer {
        name: require_str(obj, "name", path)?,
        glyph: static_glyph_at(glyph_value, &glyph_path)?,
    })
}

fn source_at(value: &Value, path: &str) -> Result<Source, CastError> {
    let obj = as_object(value, path)?;
    Ok(Source {
        name: require_str(obj, "name", path)?,
        layer_name: require_str(obj, "layerName", path)?,
        location: location_at(obj, path)?,
    })
}

fn local_axis_at(value: &Value, path: &str) -> Result<LocalAxis, CastError> {
    let obj = as_object(value, path)?;
    Ok(LocalAxis {
        name: require_str(obj, "name", path)?,
        min_value: require_f64(obj, "minValue", path)?,
        default_value: require_f64(obj, "defaultValue", path)?,
        max_value: require_f64(obj, "maxValue", path)?,
    })
}

fn global_axis_at(value: &Value, path: &str) -> Result<GlobalAxis, CastError> {
    let obj = as_object(value, path)?;
    Ok(GlobalAxis {
        name: require_str(obj, "name", path)?,
        tag: require_str(obj, "tag", path)?,
        min_value: require_f64(obj, "minValue", path)?,
        default_value: require_f64(obj, "defaultValue", path)?,
        max_value: require_f64(obj, "maxValue", path)?,
        mapping: list_at(obj, "mapping", path, axis_mapping_at)?,
    })
}

fn axis_mapping_at(value: &Value, path: &str) -> Result<AxisMapping, CastError> {
    let obj = as_object(value, path)?;
    Ok(AxisMapping {
        input: require_f64(obj, "input", path)?,
        output: require_f64(obj, "output", path)?,
    })
}

fn static_glyph_at(value: &Value, path: &str) -> Result<StaticGlyph, CastError> {
    let obj = as_object(value, path)?;
    let glyph_path = match obj.get("path") {
        Some(v) => packed_path_at(v, &join(path, "path"))?,
        None => PackedPath::default(),
    };
    Ok(StaticGlyph {
        path: glyph_path,
        components: list_at(obj, "components", path, component_at)?,
        x_advance: optional_f64(obj, "xAdvance", path)?,
        y_advance: optional_f64(obj, "yAdvance", path)?,
        vertical_origin: optional_f64(obj, "verticalOrigin", path)?,
    })
}

fn component_at(value: &Value, path: &str) -> Result<Component, CastError> {
    let obj = as_object(value, path)?;
    let transformation = match obj.get("transformation") {
        Some(v) => transformation_at(v, &join(path, "transformation"))?,
        None => Transformation::default(),
    };
    Ok(Component {
        name: require_str(obj, "name", path)?,
        transformation,
        location: location_at(obj, path)?,
    })
}

fn transformation_at(value: &Value, path: &str) -> Result<Transformation, CastError> {
    let obj = as_object(value, path)?;
    let mut t = Transformation::default();
    for (key, slot) in [
        ("translateX", &mut t.translate_x),
        ("translateY", &mut t.translate_y),
        ("rotation", &mut t.rotation),
        ("scaleX", &mut t.scale_x),
        ("scaleY", &mut t.scale_y),
        ("skewX", &mut t.skew_x),
        ("skewY", &mut t.skew_y),
        ("tCenterX", &mut t.t_center_x),
        ("tCenterY", &mut t.t_center_y),
    ] {
        if let Some(v) = obj.get(key) {
            *slot = f64_at(v, &join(path, key))?;
        }
    }
    Ok(t)
}

fn packed_path_at(value: &Value, path: &str) -> Result<PackedPath, CastError> {
    let obj = as_object(value, path)?;
    let mut packed = PackedPath::default();
    if let Some(v) = obj.get("coordinates") {
        let coords_path = join(path, "coordinates");
        for (i, item) in array_at(v, &coords_path)?.iter().enumerate() {
            packed
                .coordinates
                .push(f64_at(item, &format!("{coords_path}[{i}]"))?);
        }
    }
    if let Some(v) = obj.get("pointTypes") {
        let types_path = join(path, "pointTypes");
        for (i, item) in array_at(v, &types_path)?.iter().enumerate() {
            packed
                .point_types
                .push(point_type_at(item, &format!("{types_path}[{i}]"))?);
        }
    }
    if let Some(v) = obj.get("contourInfo") {
        let info_path = join(path, "contourInfo");
        for (i, item) in array_at(v, &info_path)?.iter().enumerate() {
            packed
                .contour_info
                .push(contour_info_at(item, &format!("{info_path}[{i}]"))?);
        }
    }
    Ok(packed)
}

fn contour_info_at(value: &Value, path: &str) -> Result<ContourInfo, CastError> {
    let obj = as_object(value, path)?;
    let end_point_path = join(path, "endPoint");
    let end_point = obj
        .get("endPoint")
        .ok_or_else(|| CastError::MissingField(end_point_path.clone()))?;
    let end_point = end_point.as_u64().ok_or_else(|| CastError::WrongType {
        path: end_point_path,
        expected: "unsigned integer",
        found: value_kind(end_point),
    })? as usize;
    let is_closed_path = join(path, "isClosed");
    let is_closed = match obj.get("isClosed") {
        None => false,
        Some(v) => v.as_bool().ok_or_else(|| CastError::WrongType {
            path: is_closed_path,
            expected: "bool",
            found: value_kind(v),
        })?,
    };
    Ok(ContourInfo {
        end_point,
        is_closed,
    })
}

/// Cast a raw point-type integer to the closed enumeration.
fn point_type_at(value: &Value, path: &str) -> Result<PointType, CastError> {
    let raw = value.as_u64().ok_or_else(|| CastError::WrongType {
        path: path.to_string(),
        expected: "unsigned integer",
        found: value_kind(value),
    })?;
    u8::try_from(raw)
        .ok()
        .and_then(|bits| PointType::try_from(bits).ok())
        .ok_or(CastError::UnknownPointType {
            path: path.to_string(),
            value: raw,
        })
}

fn location_at(obj: &Map<String, Value>, path: &str) -> Result<Location, CastError> {
    let mut location = Location::new();
    if let Some(v) = obj.get("location") {
        let loc_path = join(path, "location");
        for (axis, coord) in as_object(v, &loc_path)? {
            let value = f64_at(coord, &format!("{loc_path}.{axis}"))?;
            location.insert(axis.clone(), value);
        }
    }
    Ok(location)
}

fn unicodes_at(obj: &Map<String, Value>, path: &str) -> Result<Vec<u32>, CastError> {
    let mut unicodes = Vec::new();
    if let Some(v) = obj.get("unicodes") {
        let list_path = join(path, "unicodes");
        for (i, item) in array_at(v, &list_path)?.iter().enumerate() {
            let code = item
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| CastError::WrongType {
                    path: format!("{list_path}[{i}]"),
                    expected: "code point",
                    found: value_kind(item),
                })?;
            unicodes.push(code);
        }
    }
    Ok(unicodes)
}

fn list_at<T>(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    element: fn(&Value, &str) -> Result<T, CastError>,
) -> Result<Vec<T>, CastError> {
    let Some(v) = obj.get(key) else {
        return Ok(Vec::new());
    };
    let list_path = join(path, key);
    array_at(v, &list_path)?
        .iter()
        .enumerate()
        .map(|(i, item)| element(item, &format!("{list_path}[{i}]")))
        .collect()
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, CastError> {
    value.as_object().ok_or_else(|| CastError::WrongType {
        path: path.to_string(),
        expected: "object",
        found: value_kind(value),
    })
}

fn array_at<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, CastError> {
    value.as_array().ok_or_else(|| CastError::WrongType {
        path: path.to_string(),
        expected: "array",
        found: value_kind(value),
    })
}

fn require_str(obj: &Map<String, Value>, key: &str, path: &str) -> Result<String, CastError> {
    let field_path = join(path, key);
    let value = obj
        .get(key)
        .ok_or_else(|| CastError::MissingField(field_path.clone()))?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| CastError::WrongType {
            path: field_path,
            expected: "string",
            found: value_kind(value),
        })
}

fn require_f64(obj: &Map<String, Value>, key: &str, path: &str) -> Result<f64, CastError> {
    let field_path = join(path, key);
    let value = obj
        .get(key)
        .ok_or_else(|| CastError::MissingField(field_path.clone()))?;
    f64_at(value, &field_path)
}

fn optional_f64(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<f64>, CastError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => f64_at(v, &join(path, key)).map(Some),
    }
}

fn f64_at(value: &Value, path: &str) -> Result<f64, CastError> {
    value.as_f64().ok_or_else(|| CastError::WrongType {
        path: path.to_string(),
        expected: "number",
        found: value_kind(value),
    })
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
