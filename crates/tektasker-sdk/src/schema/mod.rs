//! Parameter and result schema inference.
//!
//! Maps a declared entity's [`ShapeClass`] and marker payload onto the Tekton type
//! system: `string`, `array` and `object`. Inference is pure: the same entity always
//! yields the same schema.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::entity::{DeclaredEntity, FieldDecl, ShapeClass};
use crate::markers::{ParamMarker, ResultMarker};

/// Tekton param/result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Array,
    Object,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => write!(f, "string"),
            TypeTag::Array => write!(f, "array"),
            TypeTag::Object => write!(f, "object"),
        }
    }
}

/// A Task parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    pub description: String,
    /// Only set for `object` params, in field declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// A Task result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    pub description: String,
}

/// Validation failure. Any of these aborts the whole generation run.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("param '{param}': field '{field}' of a strict struct has no json tag")]
    MissingJsonTag { param: String, field: String },
    #[error("param '{param}': field '{field}' of a strict struct needs an explicit json tag name")]
    EmptyJsonTagName { param: String, field: String },
    #[error("param '{param}': json tag name '{tag}' is used by more than one field")]
    DuplicateJsonTag { param: String, tag: String },
    #[error("param '{param}': default value is not a valid JSON {expected}: {source}")]
    InvalidDefault {
        param: String,
        expected: TypeTag,
        source: serde_json::Error,
    },
}

/// Tekton type of a param with the given classification.
pub fn param_type_tag(class: ShapeClass, strict: bool) -> TypeTag {
    match class {
        ShapeClass::Array => TypeTag::Array,
        // No deterministic field set: the value is an opaque JSON string
        ShapeClass::Map => TypeTag::String,
        ShapeClass::Struct if strict => TypeTag::Object,
        ShapeClass::Struct | ShapeClass::StringAlias | ShapeClass::Scalar => TypeTag::String,
    }
}

/// Tekton type of a result with the given classification.
pub fn result_type_tag(class: ShapeClass) -> TypeTag {
    match class {
        ShapeClass::Array => TypeTag::Array,
        _ => TypeTag::String,
    }
}

/// Infer the schema of a param entity.
pub fn infer_param(
    entity: &DeclaredEntity,
    marker: &ParamMarker,
) -> Result<ParameterSchema, SchemaError> {
    let type_tag = param_type_tag(entity.shape.class(), marker.strict);

    let properties = match type_tag {
        TypeTag::Object => Some(strict_properties(&marker.name, entity.shape.fields())?),
        TypeTag::String | TypeTag::Array => None,
    };

    let default = marker
        .default
        .as_deref()
        .map(|raw| parse_default(&marker.name, raw, type_tag))
        .transpose()?;

    Ok(ParameterSchema {
        name: marker.name.clone(),
        type_tag,
        description: entity.doc.clone(),
        properties,
        default,
    })
}

/// Infer the schema of a result entity.
pub fn infer_result(entity: &DeclaredEntity, marker: &ResultMarker) -> ResultSchema {
    ResultSchema {
        name: marker.name.clone(),
        type_tag: result_type_tag(entity.shape.class()),
        description: entity.doc.clone(),
    }
}

/// Walk struct fields in declaration order and build `name -> {type: string}`.
fn strict_properties(param: &str, fields: &[FieldDecl]) -> Result<Map<String, Value>, SchemaError> {
    let mut properties = Map::new();
    let mut seen = HashSet::new();

    for field in fields {
        let tag = field.json_tag().ok_or_else(|| SchemaError::MissingJsonTag {
            param: param.to_string(),
            field: field.name.clone(),
        })?;

        // `-` alone excludes the field; `-,` names it "-"
        if tag == "-" {
            continue;
        }

        let tag_name = tag.split(',').next().unwrap_or_default();
        if tag_name.is_empty() {
            return Err(SchemaError::EmptyJsonTagName {
                param: param.to_string(),
                field: field.name.clone(),
            });
        }

        if !seen.insert(tag_name.to_string()) {
            return Err(SchemaError::DuplicateJsonTag {
                param: param.to_string(),
                tag: tag_name.to_string(),
            });
        }

        properties.insert(tag_name.to_string(), json!({ "type": "string" }));
    }

    Ok(properties)
}

fn parse_default(param: &str, raw: &str, type_tag: TypeTag) -> Result<Value, SchemaError> {
    let invalid = |source| SchemaError::InvalidDefault {
        param: param.to_string(),
        expected: type_tag,
        source,
    };

    match type_tag {
        TypeTag::Array => serde_json::from_str::<Vec<Value>>(raw)
            .map(Value::Array)
            .map_err(invalid),
        // See TEP-0075 for object param defaults
        TypeTag::Object => serde_json::from_str::<Map<String, Value>>(raw)
            .map(Value::Object)
            .map_err(invalid),
        TypeTag::String => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityMarker, Shape};

    fn param(shape: Shape, default: Option<&str>, strict: bool) -> (DeclaredEntity, ParamMarker) {
        let marker = ParamMarker {
            name: "p".into(),
            default: default.map(String::from),
            strict,
        };
        let entity = DeclaredEntity {
            name: "P".into(),
            doc: "P is a param".into(),
            shape,
            marker: EntityMarker::Param(marker.clone()),
        };
        (entity, marker)
    }

    fn field(name: &str, tag: Option<&str>) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            tag: tag.map(String::from),
        }
    }

    fn strict_struct(fields: Vec<FieldDecl>) -> Shape {
        Shape::Struct { fields }
    }

    #[test]
    fn test_param_type_tags() {
        let cases = [
            (Shape::Array, false, TypeTag::Array),
            (Shape::Map, false, TypeTag::String),
            (Shape::Scalar { string_alias: true }, false, TypeTag::String),
            (Shape::Scalar { string_alias: false }, true, TypeTag::String),
            (strict_struct(vec![]), false, TypeTag::String),
            (strict_struct(vec![]), true, TypeTag::Object),
        ];
        for (shape, strict, expected) in cases {
            let (entity, marker) = param(shape.clone(), None, strict);
            let schema = infer_param(&entity, &marker).unwrap();
            assert_eq!(schema.type_tag, expected, "shape {shape:?} strict={strict}");
            assert_eq!(schema.properties.is_some(), expected == TypeTag::Object);
        }
    }

    #[test]
    fn test_result_type_tags() {
        let marker = ResultMarker { name: "r".into() };
        for (shape, expected) in [
            (Shape::Array, TypeTag::Array),
            (Shape::Map, TypeTag::String),
            (strict_struct(vec![]), TypeTag::String),
            (Shape::Scalar { string_alias: true }, TypeTag::String),
        ] {
            let entity = DeclaredEntity {
                name: "R".into(),
                doc: "R doc".into(),
                shape,
                marker: EntityMarker::Result(marker.clone()),
            };
            let schema = infer_result(&entity, &marker);
            assert_eq!(schema.type_tag, expected);
            assert_eq!(schema.description, "R doc");
        }
    }

    #[test]
    fn test_inference_is_pure() {
        let (entity, marker) = param(
            strict_struct(vec![field("A", Some(r#"json:"a""#))]),
            Some(r#"{"a": "1"}"#),
            true,
        );
        let first = infer_param(&entity, &marker).unwrap();
        let second = infer_param(&entity, &marker).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_strict_struct_skips_dash_fields() {
        let (entity, marker) = param(
            strict_struct(vec![
                field("Internal", Some(r#"json:"-""#)),
                field("B", Some(r#"json:"b,omitempty""#)),
                field("A", Some(r#"json:"a""#)),
            ]),
            None,
            true,
        );
        let schema = infer_param(&entity, &marker).unwrap();
        let properties = schema.properties.unwrap();

        assert_eq!(properties.len(), 2);
        assert_eq!(properties["a"], json!({"type": "string"}));
        assert_eq!(properties["b"], json!({"type": "string"}));
        assert!(!properties.contains_key("-"));
        // declaration order is kept
        let keys: Vec<_> = properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_strict_struct_dash_comma_is_a_name() {
        let (entity, marker) = param(
            strict_struct(vec![field("Dash", Some(r#"json:"-,""#))]),
            None,
            true,
        );
        let properties = infer_param(&entity, &marker).unwrap().properties.unwrap();
        assert!(properties.contains_key("-"));
    }

    #[test]
    fn test_strict_struct_duplicate_tag() {
        let (entity, marker) = param(
            strict_struct(vec![
                field("X1", Some(r#"json:"x""#)),
                field("X2", Some(r#"json:"x""#)),
            ]),
            None,
            true,
        );
        let err = infer_param(&entity, &marker).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateJsonTag { ref tag, .. } if tag == "x"));
    }

    #[test]
    fn test_strict_struct_missing_tag() {
        let (entity, marker) = param(
            strict_struct(vec![field("Untagged", Some(r#"yaml:"untagged""#))]),
            None,
            true,
        );
        let err = infer_param(&entity, &marker).unwrap_err();
        assert!(matches!(err, SchemaError::MissingJsonTag { .. }));

        let (entity, marker) = param(strict_struct(vec![field("NoTag", None)]), None, true);
        assert!(matches!(
            infer_param(&entity, &marker),
            Err(SchemaError::MissingJsonTag { .. })
        ));
    }

    #[test]
    fn test_strict_struct_empty_tag_name() {
        let (entity, marker) = param(
            strict_struct(vec![field("Anon", Some(r#"json:",omitempty""#))]),
            None,
            true,
        );
        let err = infer_param(&entity, &marker).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyJsonTagName { .. }));
    }

    #[test]
    fn test_non_strict_struct_ignores_tags() {
        let (entity, marker) = param(
            strict_struct(vec![
                field("X1", Some(r#"json:"x""#)),
                field("X2", Some(r#"json:"x""#)),
            ]),
            Some(r#"{"x": 1}"#),
            false,
        );
        let schema = infer_param(&entity, &marker).unwrap();
        assert_eq!(schema.type_tag, TypeTag::String);
        assert_eq!(schema.default, Some(json!(r#"{"x": 1}"#)));
    }

    #[test]
    fn test_array_default_parsed() {
        let (entity, marker) = param(Shape::Array, Some(r#"["jeremy","virginie"]"#), false);
        let schema = infer_param(&entity, &marker).unwrap();
        assert_eq!(schema.default, Some(json!(["jeremy", "virginie"])));
    }

    #[test]
    fn test_array_default_not_json() {
        let (entity, marker) = param(Shape::Array, Some("not-json"), false);
        let err = infer_param(&entity, &marker).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidDefault {
                expected: TypeTag::Array,
                ..
            }
        ));
    }

    #[test]
    fn test_array_default_wrong_json_kind() {
        let (entity, marker) = param(Shape::Array, Some(r#"{"a": 1}"#), false);
        assert!(infer_param(&entity, &marker).is_err());
    }

    #[test]
    fn test_object_default_parsed() {
        let (entity, marker) = param(
            strict_struct(vec![
                field("Name", Some(r#"json:"name""#)),
                field("Score", Some(r#"json:"score""#)),
            ]),
            Some(r#"{"name": "jeremy", "score": "10"}"#),
            true,
        );
        let schema = infer_param(&entity, &marker).unwrap();
        assert_eq!(
            schema.default,
            Some(json!({"name": "jeremy", "score": "10"}))
        );
    }

    #[test]
    fn test_object_default_must_be_object() {
        let (entity, marker) = param(
            strict_struct(vec![field("Name", Some(r#"json:"name""#))]),
            Some(r#"["name"]"#),
            true,
        );
        assert!(matches!(
            infer_param(&entity, &marker),
            Err(SchemaError::InvalidDefault {
                expected: TypeTag::Object,
                ..
            })
        ));
    }

    #[test]
    fn test_string_default_kept_verbatim() {
        let (entity, marker) = param(Shape::Map, Some(r#"{"jeremy": "10"}"#), false);
        let schema = infer_param(&entity, &marker).unwrap();
        assert_eq!(schema.default, Some(Value::String(r#"{"jeremy": "10"}"#.into())));
    }

    #[test]
    fn test_schema_serialization_omits_empty_fields() {
        let (entity, marker) = param(Shape::Scalar { string_alias: true }, None, false);
        let schema = infer_param(&entity, &marker).unwrap();
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            value,
            json!({"name": "p", "type": "string", "description": "P is a param"})
        );
    }
}
