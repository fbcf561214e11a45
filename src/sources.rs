use crate::error::DataSourceError;
use crate::runtime::utils::{js_display, normalize_field_path, pick};
use crate::traits::{AuthAction, DataSources, InstanceField};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A component as seen by `component`, `displayValue` and `linkToComponent`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentEntry {
    /// Simple binding into the data model
    pub binding: Option<String>,
    /// Data type the binding points into; the default data type when unset
    pub data_type: Option<String>,
    pub hidden: bool,
    pub page: Option<String>,
    pub display_value: Option<String>,
}

/// Data sources backed by a single JSON document.
///
/// ```json
/// {
///   "defaultDataType": "model",
///   "dataModels": { "model": { "person": { "age": 18 } } },
///   "components": { "age": { "binding": "person.age", "page": "page1" } },
///   "roles": ["admin"]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticDataSources {
    pub data_models: HashMap<String, JsonValue>,
    pub default_data_type: Option<String>,
    pub components: HashMap<String, ComponentEntry>,
    pub instance: HashMap<String, String>,
    pub application_settings: serde_json::Map<String, JsonValue>,
    pub permissions: Vec<String>,
    pub roles: Option<Vec<String>>,
    pub external_apis: HashMap<String, JsonValue>,
    pub texts: HashMap<String, String>,
    pub language: Option<String>,
    pub current_task: Option<String>,
}

impl StaticDataSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds a data model and makes it the default when none is set.
    pub fn with_data_model(mut self, data_type: impl Into<String>, model: JsonValue) -> Self {
        let data_type = data_type.into();
        if self.default_data_type.is_none() {
            self.default_data_type = Some(data_type.clone());
        }
        self.data_models.insert(data_type, model);
        self
    }

    pub fn with_component(mut self, id: impl Into<String>, component: ComponentEntry) -> Self {
        self.components.insert(id.into(), component);
        self
    }

    pub fn with_instance(mut self, field: InstanceField, value: impl Into<String>) -> Self {
        self.instance.insert(field.key().to_string(), value.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.application_settings.insert(key.into(), value);
        self
    }

    pub fn with_permission(mut self, action: AuthAction) -> Self {
        self.permissions.push(action.key().to_string());
        self
    }

    pub fn with_roles<I: IntoIterator<Item = S>, S: Into<String>>(mut self, roles: I) -> Self {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_external_api(mut self, id: impl Into<String>, data: JsonValue) -> Self {
        self.external_apis.insert(id.into(), data);
        self
    }

    pub fn with_text(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(key.into(), text.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.current_task = Some(task.into());
        self
    }

    fn bound_component(&self, id: &str) -> Result<&ComponentEntry, DataSourceError> {
        self.components
            .get(id)
            .filter(|c| c.binding.is_some())
            .ok_or_else(|| {
                DataSourceError::NotFound(format!(
                    "Unable to find component with identifier {} or it does not have a simpleBinding",
                    id
                ))
            })
    }
}

impl DataSources for StaticDataSources {
    fn form_data(&self, field: &str, data_type: Option<&str>) -> Result<Option<JsonValue>, DataSourceError> {
        let data_type = data_type
            .or(self.default_data_type.as_deref())
            .ok_or_else(|| DataSourceError::Other("Cannot lookup dataType undefined".to_string()))?;
        let model = self
            .data_models
            .get(data_type)
            .ok_or_else(|| DataSourceError::NotFound(format!("Data model with type {} not found", data_type)))?;
        Ok(pick(model, &normalize_field_path(field)).cloned())
    }

    fn component_value(&self, id: &str) -> Result<Option<JsonValue>, DataSourceError> {
        let component = self.bound_component(id)?;
        if component.hidden {
            return Ok(None);
        }
        match &component.binding {
            Some(binding) => self.form_data(binding, component.data_type.as_deref()),
            None => Ok(None),
        }
    }

    fn display_value(&self, id: &str) -> Result<Option<String>, DataSourceError> {
        if let Some(component) = self.components.get(id) {
            if component.hidden {
                return Ok(None);
            }
            if let Some(text) = &component.display_value {
                return Ok(Some(text.clone()));
            }
        }
        let value = self.component_value(id)?;
        Ok(value.filter(|v| !v.is_null()).map(|v| js_display(&v)))
    }

    fn component_page(&self, id: &str) -> Option<String> {
        self.components.get(id).and_then(|c| c.page.clone())
    }

    fn instance_context(&self, field: InstanceField) -> Option<String> {
        self.instance.get(field.key()).cloned()
    }

    fn application_setting(&self, key: &str) -> Option<JsonValue> {
        self.application_settings.get(key).cloned()
    }

    fn has_permission(&self, action: AuthAction) -> bool {
        self.permissions.iter().any(|p| p == action.key())
    }

    fn roles(&self) -> Option<Vec<String>> {
        self.roles.clone()
    }

    fn external_api_data(&self, api_id: &str) -> Option<JsonValue> {
        self.external_apis.get(api_id).cloned()
    }

    fn text(&self, key: &str) -> String {
        self.texts.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    fn current_language(&self) -> String {
        self.language.clone().unwrap_or_else(|| "nb".to_string())
    }

    fn current_task(&self) -> Option<String> {
        self.current_task.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StaticDataSources {
        StaticDataSources::from_json(
            r#"{
                "defaultDataType": "model",
                "dataModels": {
                    "model": { "person": { "age": 18, "name": "Kari" } },
                    "other": { "code": "X" }
                },
                "components": {
                    "age": { "binding": "person.age", "page": "page1" },
                    "secret": { "binding": "person.name", "hidden": true },
                    "code": { "binding": "code", "dataType": "other", "displayValue": "Code X" },
                    "header": { "page": "page2" }
                },
                "permissions": ["read"],
                "texts": { "title": "Tittel" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_form_data_paths() {
        let sources = sample();
        assert_eq!(sources.form_data("person.age", None).unwrap(), Some(json!(18)));
        assert_eq!(sources.form_data("#/properties/person/properties/name", None).unwrap(), Some(json!("Kari")));
        assert_eq!(sources.form_data("code", Some("other")).unwrap(), Some(json!("X")));
        assert_eq!(sources.form_data("person.missing", None).unwrap(), None);
        assert_eq!(
            sources.form_data("code", Some("nope")).unwrap_err().to_string(),
            "Data model with type nope not found"
        );
    }

    #[test]
    fn test_form_data_without_default_type() {
        let sources = StaticDataSources::new();
        let err = sources.form_data("a", None).unwrap_err();
        assert_eq!(err.to_string(), "Cannot lookup dataType undefined");
    }

    #[test]
    fn test_components() {
        let sources = sample();
        assert_eq!(sources.component_value("age").unwrap(), Some(json!(18)));
        assert_eq!(sources.component_value("secret").unwrap(), None);
        assert_eq!(sources.component_value("code").unwrap(), Some(json!("X")));
        assert!(sources.component_value("header").is_err());
        assert!(sources.component_value("ghost").is_err());

        assert_eq!(sources.display_value("code").unwrap(), Some("Code X".to_string()));
        assert_eq!(sources.display_value("age").unwrap(), Some("18".to_string()));
        assert_eq!(sources.display_value("secret").unwrap(), None);
        assert_eq!(sources.component_page("header"), Some("page2".to_string()));
    }

    #[test]
    fn test_misc_lookups() {
        let sources = sample();
        assert!(sources.has_permission(AuthAction::Read));
        assert!(!sources.has_permission(AuthAction::Write));
        assert_eq!(sources.text("title"), "Tittel");
        assert_eq!(sources.text("unknown.key"), "unknown.key");
        assert_eq!(sources.current_language(), "nb");
        assert_eq!(sources.roles(), None);
    }

    #[test]
    fn test_builder_sets_default_type() {
        let sources = StaticDataSources::new()
            .with_data_model("first", json!({ "a": 1 }))
            .with_data_model("second", json!({ "a": 2 }));
        assert_eq!(sources.default_data_type.as_deref(), Some("first"));
        assert_eq!(sources.form_data("a", None).unwrap(), Some(json!(1)));
    }
}
