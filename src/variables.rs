//! `{{name}}` placeholder parsing, substitution and validation.
//!
//! Placeholder names follow `[a-zA-Z_][a-zA-Z0-9_]*`. Substitution is a
//! single pass: a substituted value that itself contains a placeholder is
//! never expanded again.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::fields::{PromptVariableType, VariableType};
use crate::template::{PromptVariable, TemplateVariable};

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}").expect("valid placeholder pattern"));

/// Unique placeholder names found in `content`.
pub fn parse_template_variables(content: &str) -> BTreeSet<String> {
    VARIABLE_PATTERN
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Placeholder names in order of first appearance.
pub fn extract_variable_names(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for caps in VARIABLE_PATTERN.captures_iter(content) {
        let name = &caps[1];
        if seen.insert(name.to_string()) {
            ordered.push(name.to_string());
        }
    }
    ordered
}

pub fn has_variables(content: &str) -> bool {
    VARIABLE_PATTERN.is_match(content)
}

/// Replace every placeholder whose name is in `values`; leave the rest verbatim.
pub fn substitute_variables(content: &str, values: &HashMap<String, String>) -> String {
    VARIABLE_PATTERN
        .replace_all(content, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Rewrite `{{name}}` as `\{\{name\}\}` so it no longer matches the pattern.
pub fn escape_variables(content: &str) -> String {
    VARIABLE_PATTERN
        .replace_all(content, r"\{\{${1}\}\}")
        .into_owned()
}

/// Build starter definitions for every placeholder, in order of appearance.
pub fn suggest_variables(content: &str) -> Vec<TemplateVariable> {
    extract_variable_names(content)
        .into_iter()
        .map(|name| TemplateVariable {
            description: format_variable_name(&name),
            name,
            default_value: None,
            required: true,
            var_type: VariableType::Text,
            options: None,
        })
        .collect()
}

/// `snake_case` to `Title Case`.
fn format_variable_name(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub missing_required: Vec<String>,
    pub invalid_selections: Vec<String>,
}

fn provided<'a>(values: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    values.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

/// Check a value map against variable definitions.
pub fn validate_variable_values(
    variables: &[TemplateVariable],
    values: &HashMap<String, String>,
) -> ValidationResult {
    let mut missing_required = Vec::new();
    let mut invalid_selections = Vec::new();

    for variable in variables {
        let value = provided(values, &variable.name);

        if variable.required && value.is_none() && variable.non_empty_default().is_none() {
            missing_required.push(variable.name.clone());
        }

        if variable.var_type == VariableType::Select {
            if let (Some(options), Some(value)) = (&variable.options, value) {
                if !options.iter().any(|o| o == value) {
                    invalid_selections.push(variable.name.clone());
                }
            }
        }
    }

    ValidationResult {
        is_valid: missing_required.is_empty() && invalid_selections.is_empty(),
        missing_required,
        invalid_selections,
    }
}

/// Required names with neither a provided value nor a default.
pub fn missing_required_variables(
    variables: &[TemplateVariable],
    values: &HashMap<String, String>,
) -> Vec<String> {
    validate_variable_values(variables, values).missing_required
}

/// Fill every defined variable: provided value, then default, then empty.
/// Placeholders without a definition are left in place.
pub fn apply_template_variables(
    content: &str,
    variables: &[TemplateVariable],
    values: &HashMap<String, String>,
) -> String {
    let resolved: HashMap<String, String> = variables
        .iter()
        .map(|v| {
            let value = values
                .get(&v.name)
                .cloned()
                .or_else(|| v.default_value.clone())
                .unwrap_or_default();
            (v.name.clone(), value)
        })
        .collect();
    substitute_variables(content, &resolved)
}

/// Render with defaults, showing `[name]` where a variable has none.
pub fn generate_preview(content: &str, variables: &[TemplateVariable]) -> String {
    let preview: HashMap<String, String> = variables
        .iter()
        .map(|v| {
            let shown = v.default_value.clone().unwrap_or_else(|| format!("[{}]", v.name));
            (v.name.clone(), shown)
        })
        .collect();
    apply_template_variables(content, variables, &preview)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidVariable {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptValidationResult {
    pub is_valid: bool,
    pub missing_variables: Vec<String>,
    pub invalid_variables: Vec<InvalidVariable>,
}

/// Check prompt inputs: required presence, and JSON shape for array/object types.
pub fn validate_prompt_variables(
    variables: &[PromptVariable],
    values: &HashMap<String, String>,
) -> PromptValidationResult {
    let mut missing_variables = Vec::new();
    let mut invalid_variables = Vec::new();

    for variable in variables {
        let Some(value) = provided(values, &variable.name) else {
            if variable.required {
                missing_variables.push(variable.name.clone());
            }
            continue;
        };

        let reason = match variable.var_type {
            PromptVariableType::Array => match serde_json::from_str::<serde_json::Value>(value) {
                Ok(v) if v.is_array() => None,
                Ok(_) => Some("Value must be a valid JSON array"),
                Err(_) => Some("Invalid JSON array format"),
            },
            PromptVariableType::Object => match serde_json::from_str::<serde_json::Value>(value) {
                Ok(v) if v.is_object() => None,
                Ok(_) => Some("Value must be a valid JSON object"),
                Err(_) => Some("Invalid JSON object format"),
            },
            _ => None,
        };

        if let Some(reason) = reason {
            invalid_variables.push(InvalidVariable {
                name: variable.name.clone(),
                reason: reason.to_string(),
            });
        }
    }

    PromptValidationResult {
        is_valid: missing_variables.is_empty() && invalid_variables.is_empty(),
        missing_variables,
        invalid_variables,
    }
}
