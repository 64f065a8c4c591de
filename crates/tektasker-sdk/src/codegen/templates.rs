//! Askama template structs for the generated Go bindings.
//!
//! Every method micro-template renders from a single [`FuncArgs`]; [`RENDERERS`] maps
//! each [`FuncTemplate`] to its render function.

use askama::Template;

use super::{CodegenError, FuncArgs, FuncTemplate};

// =========================================================================
// File header
// =========================================================================

#[derive(Template, Debug)]
#[template(path = "codegen/header.go", escape = "none")]
struct GoHeaderTemplate<'a> {
    header: &'a str,
    pkg_name: &'a str,
    imports: &'a [&'a str],
}

/// Render the license header, generated-code notice, package clause and imports.
pub fn render_header(
    header: &str,
    pkg_name: &str,
    imports: &[&str],
) -> Result<String, CodegenError> {
    let t = GoHeaderTemplate {
        header,
        pkg_name,
        imports,
    };
    t.render()
        .map(|s| s.trim_end().to_string())
        .map_err(|e| CodegenError::Rendering {
            template: "header",
            source: e,
        })
}

// =========================================================================
// Method micro-templates
// =========================================================================

#[derive(Template, Debug)]
#[template(path = "codegen/param_name.go", escape = "none")]
struct ParamNameTemplate<'a> {
    args: &'a FuncArgs,
}

#[derive(Template, Debug)]
#[template(path = "codegen/param_unmarshal_simple.go", escape = "none")]
struct ParamUnmarshalSimpleTemplate<'a> {
    args: &'a FuncArgs,
}

#[derive(Template, Debug)]
#[template(path = "codegen/param_unmarshal_json.go", escape = "none")]
struct ParamUnmarshalJsonTemplate<'a> {
    args: &'a FuncArgs,
}

#[derive(Template, Debug)]
#[template(path = "codegen/result_name.go", escape = "none")]
struct ResultNameTemplate<'a> {
    args: &'a FuncArgs,
}

#[derive(Template, Debug)]
#[template(path = "codegen/result_marshal_simple.go", escape = "none")]
struct ResultMarshalSimpleTemplate<'a> {
    args: &'a FuncArgs,
}

#[derive(Template, Debug)]
#[template(path = "codegen/result_marshal_json.go", escape = "none")]
struct ResultMarshalJsonTemplate<'a> {
    args: &'a FuncArgs,
}

pub type RenderFn = fn(&FuncArgs) -> askama::Result<String>;

fn param_name(args: &FuncArgs) -> askama::Result<String> {
    ParamNameTemplate { args }.render()
}

fn param_unmarshal_simple(args: &FuncArgs) -> askama::Result<String> {
    ParamUnmarshalSimpleTemplate { args }.render()
}

fn param_unmarshal_json(args: &FuncArgs) -> askama::Result<String> {
    ParamUnmarshalJsonTemplate { args }.render()
}

fn result_name(args: &FuncArgs) -> askama::Result<String> {
    ResultNameTemplate { args }.render()
}

fn result_marshal_simple(args: &FuncArgs) -> askama::Result<String> {
    ResultMarshalSimpleTemplate { args }.render()
}

fn result_marshal_json(args: &FuncArgs) -> askama::Result<String> {
    ResultMarshalJsonTemplate { args }.render()
}

/// Dispatch table, in the order methods are emitted.
pub const RENDERERS: [(FuncTemplate, RenderFn); 6] = [
    (FuncTemplate::ParamName, param_name),
    (FuncTemplate::ParamUnmarshalSimple, param_unmarshal_simple),
    (FuncTemplate::ParamUnmarshalJson, param_unmarshal_json),
    (FuncTemplate::ResultName, result_name),
    (FuncTemplate::ResultMarshalSimple, result_marshal_simple),
    (FuncTemplate::ResultMarshalJson, result_marshal_json),
];

/// Render one micro-template for one entity.
pub fn render_func(template: FuncTemplate, args: &FuncArgs) -> Result<String, CodegenError> {
    let render = RENDERERS
        .iter()
        .find(|(t, _)| *t == template)
        .map(|(_, render)| *render)
        .ok_or(CodegenError::UnknownTemplate(template.name()))?;

    render(args)
        .map(|s| s.trim_end().to_string())
        .map_err(|e| CodegenError::Rendering {
            template: template.name(),
            source: e,
        })
}

// =========================================================================
// Support files
// =========================================================================

#[derive(Template, Debug)]
#[template(path = "codegen/parameter_type.go", escape = "none")]
struct ParameterTypeTemplate;

#[derive(Template, Debug)]
#[template(path = "codegen/result_type.go", escape = "none")]
struct ResultTypeTemplate;

pub fn render_parameter_type() -> Result<String, CodegenError> {
    ParameterTypeTemplate
        .render()
        .map(|s| s.trim_end().to_string())
        .map_err(|e| CodegenError::Rendering {
            template: "parameter.type",
            source: e,
        })
}

pub fn render_result_type() -> Result<String, CodegenError> {
    ResultTypeTemplate
        .render()
        .map(|s| s.trim_end().to_string())
        .map_err(|e| CodegenError::Rendering {
            template: "result.type",
            source: e,
        })
}
