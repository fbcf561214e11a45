use crate::error::{DataSourceError, ExprError};
use crate::runtime::evaluator::EvalContext;
use crate::runtime::function_dispatch::{Args, ExprFunction};
use crate::runtime::utils::{format_js_number, js_display, js_truthy, pick};
use crate::traits::{AuthAction, InstanceField};
use crate::types::Value;
use serde_json::Value as JsonValue;
use url::form_urlencoded;

const FOCUS_COMPONENT_PARAM: &str = "focusComponentId";

fn source_error(ctx: &EvalContext<'_>, err: DataSourceError) -> ExprError {
    ctx.runtime_error(err.to_string())
}

/// Only strings, numbers and booleans are visible to expressions; anything else reads as null.
fn simple_value(value: Option<JsonValue>) -> Value {
    match value {
        Some(v @ (JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_))) => Value::from(v),
        _ => Value::Null,
    }
}

fn argv(ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    let positional = match ctx.positional_arguments() {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ctx.runtime_error("No positional arguments available")),
    };
    let index = args.num(0);
    match index {
        Some(i) if i >= 0.0 && (i as usize) < positional.len() => {
            // A fractional index names no element
            if i.fract() == 0.0 {
                Ok(positional[i as usize].clone())
            } else {
                Ok(Value::Null)
            }
        }
        Some(i) => Err(ctx.runtime_error(format!("Index {} out of range", format_js_number(i)))),
        None => Err(ctx.runtime_error("Index null out of range")),
    }
}

fn value_argument(ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    let config = ctx
        .value_arguments()
        .ok_or_else(|| ctx.runtime_error("No value arguments available"))?;
    let key = match args.str(0).or(config.default_key.as_deref()) {
        Some(k) if !k.is_empty() => k,
        _ => return Err(ctx.runtime_error("Invalid key (expected string, got null)")),
    };
    match config.data.get(key) {
        Some(value) => Ok(value.clone()),
        None => {
            let mut keys: Vec<&str> = config.data.keys().map(String::as_str).collect();
            keys.sort_unstable();
            Err(ctx.runtime_error(format!("Unknown key {}, Valid keys are: {}", key, keys.join(", "))))
        }
    }
}

fn link_base(ctx: &EvalContext<'_>, target: &str) -> String {
    let task = ctx.data_sources.current_task();
    let instance = ctx.data_sources.instance_context(InstanceField::InstanceId);
    match (task, instance) {
        (Some(task), Some(instance)) => format!("/instance/{}/{}/{}", instance, task, target),
        _ => format!("/{}", target),
    }
}

fn select_and_map(ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    let (path, property) = match (args.str(0), args.str(1)) {
        (Some(path), Some(property)) => (path, property),
        _ => return Err(ctx.runtime_error("Cannot lookup dataModel null")),
    };
    let prepend = args.str(2).unwrap_or("");
    let append = args.str(3).unwrap_or("");
    let append_to_last = args.bool(4).unwrap_or(true);

    let data = ctx
        .data_sources
        .form_data(path, None)
        .map_err(|e| source_error(ctx, e))?;
    let items = match data {
        Some(JsonValue::Array(items)) => items,
        _ => return Ok(Value::String(String::new())),
    };

    let last = items.len().saturating_sub(1);
    let rendered: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = match item.get(property) {
                Some(v) => js_display(v),
                None => "undefined".to_string(),
            };
            let suffix = if i == last && !append_to_last { "" } else { append };
            format!("{}{}{}", prepend, selected, suffix)
        })
        .collect();
    Ok(Value::String(rendered.join(" ")))
}

pub fn exec_lookup(func: ExprFunction, ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    let sources = ctx.data_sources;
    match func {
        ExprFunction::Argv => argv(ctx, args),
        ExprFunction::Value => value_argument(ctx, args),
        ExprFunction::InstanceContext => {
            let key = args.str(0).unwrap_or("null");
            let field: InstanceField = key
                .parse()
                .map_err(|_| ctx.runtime_error(format!("Unknown Instance context property {}", key)))?;
            Ok(sources.instance_context(field).filter(|v| !v.is_empty()).into())
        }
        ExprFunction::FrontendSettings => {
            let key = args
                .str(0)
                .ok_or_else(|| ctx.runtime_error("Value cannot be null. (Parameter 'key')"))?;
            match sources.application_setting(key) {
                Some(v) if js_truthy(&v) => Ok(Value::from(v)),
                _ => Ok(Value::Null),
            }
        }
        ExprFunction::AuthContext => {
            let key = args.str(0).unwrap_or("null");
            let action: AuthAction = key
                .parse()
                .map_err(|_| ctx.runtime_error(format!("Unknown auth context property {}", key)))?;
            Ok(Value::Boolean(sources.has_permission(action)))
        }
        ExprFunction::Component => {
            let id = args
                .str(0)
                .ok_or_else(|| ctx.runtime_error("Cannot lookup component null"))?;
            let value = sources.component_value(id).map_err(|e| source_error(ctx, e))?;
            Ok(simple_value(value))
        }
        ExprFunction::DataModel => {
            let field = args
                .str(0)
                .ok_or_else(|| ctx.runtime_error("Cannot lookup dataModel null"))?;
            let value = sources.form_data(field, args.str(1)).map_err(|e| source_error(ctx, e))?;
            Ok(simple_value(value))
        }
        ExprFunction::HasRole => {
            let found = match (sources.roles(), args.str(0)) {
                (Some(roles), Some(role)) if !role.is_empty() => roles.iter().any(|r| r == role),
                _ => false,
            };
            Ok(Value::Boolean(found))
        }
        ExprFunction::ExternalApi => {
            let api_id = args
                .str(0)
                .ok_or_else(|| ctx.runtime_error("Expected an external API id"))?;
            let path = match args.str(1) {
                Some(p) if !p.is_empty() => p,
                _ => return Ok(Value::Null),
            };
            let data = sources.external_api_data(api_id);
            let picked = match &data {
                Some(v @ (JsonValue::Object(_) | JsonValue::Array(_))) => pick(v, path),
                other => other.as_ref(),
            };
            match picked {
                Some(v) if js_truthy(v) && !v.is_object() && !v.is_array() => Ok(Value::String(js_display(v))),
                _ => Ok(Value::Null),
            }
        }
        ExprFunction::DisplayValue => {
            let id = args
                .str(0)
                .ok_or_else(|| ctx.runtime_error("Cannot lookup component null"))?;
            let text = sources.display_value(id).map_err(|e| source_error(ctx, e))?;
            Ok(text.into())
        }
        ExprFunction::Text => Ok(args.str(0).map(|key| Value::String(sources.text(key))).unwrap_or(Value::Null)),
        ExprFunction::LinkToComponent => {
            let (text, id) = match (args.str(0), args.str(1)) {
                (_, None) => {
                    tracing::warn!(target: "formexpr", "Component id was empty but must be set for linkToComponent to work");
                    return Ok(Value::Null);
                }
                (None, _) => {
                    tracing::warn!(target: "formexpr", "Link text was empty but must be set for linkToComponent to work");
                    return Ok(Value::Null);
                }
                (Some(text), Some(id)) => (text, id),
            };
            let page = sources
                .component_page(id)
                .ok_or_else(|| ctx.runtime_error(format!("Unable to find component with identifier {}", id)))?;
            let url = format!("{}?{}={}", link_base(ctx, &page), FOCUS_COMPONENT_PARAM, form_urlencoded::byte_serialize(id.as_bytes()).collect::<String>());
            Ok(Value::String(format!(
                "<a href=\"{}\" data-link-type=\"LinkToPotentialNode\">{}</a>",
                url, text
            )))
        }
        ExprFunction::LinkToPage => {
            let (text, page) = match (args.str(0), args.str(1)) {
                (_, None) => {
                    tracing::warn!(target: "formexpr", "Page id was empty but must be set for linkToPage to work");
                    return Ok(Value::Null);
                }
                (None, _) => {
                    tracing::warn!(target: "formexpr", "Link text was empty but must be set for linkToPage to work");
                    return Ok(Value::Null);
                }
                (Some(text), Some(page)) => (text, page),
            };
            Ok(Value::String(format!(
                "<a href=\"{}\" data-link-type=\"LinkToPotentialPage\">{}</a>",
                link_base(ctx, page),
                text
            )))
        }
        ExprFunction::Language => Ok(Value::String(sources.current_language())),
        ExprFunction::SelectAndMap => select_and_map(ctx, args),
        _ => Err(ctx.runtime_error(format!("Unknown lookup function: {}", func.name()))),
    }
}
