//! Case conversion filters for the step command template.
//!
//! A step command often needs the Go package or the ko binary name in another
//! casing, e.g. `--task {{ pkg_name | kebab_case }}`.

use std::collections::HashMap;

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use tera::{Tera, Value};

type Convert = fn(&str) -> String;

const CASE_FILTERS: [(&str, Convert); 4] = [
    ("snake_case", |s| s.to_snake_case()),
    ("kebab_case", |s| s.to_kebab_case()),
    ("pascal_case", |s| s.to_pascal_case()),
    ("camel_case", |s| s.to_lower_camel_case()),
];

/// Register every case filter on `tera`.
pub(crate) fn register(tera: &mut Tera) {
    for (name, convert) in CASE_FILTERS {
        tera.register_filter(
            name,
            move |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
                let s = value
                    .as_str()
                    .ok_or_else(|| tera::Error::msg(format!("{name} filter expects a string")))?;
                Ok(Value::String(convert(s)))
            },
        );
    }
}
