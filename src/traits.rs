use crate::error::DataSourceError;
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Instance metadata readable through `instanceContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceField {
    InstanceId,
    AppId,
    InstanceOwnerPartyId,
    InstanceOwnerPartyType,
}

impl InstanceField {
    pub fn key(&self) -> &'static str {
        match self {
            InstanceField::InstanceId => "instanceId",
            InstanceField::AppId => "appId",
            InstanceField::InstanceOwnerPartyId => "instanceOwnerPartyId",
            InstanceField::InstanceOwnerPartyType => "instanceOwnerPartyType",
        }
    }
}

impl FromStr for InstanceField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instanceId" => Ok(InstanceField::InstanceId),
            "appId" => Ok(InstanceField::AppId),
            "instanceOwnerPartyId" => Ok(InstanceField::InstanceOwnerPartyId),
            "instanceOwnerPartyType" => Ok(InstanceField::InstanceOwnerPartyType),
            _ => Err(()),
        }
    }
}

/// Actions the current user may be authorized for, readable through `authContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthAction {
    Read,
    Write,
    Instantiate,
    Confirm,
    Sign,
    Reject,
}

impl AuthAction {
    pub fn key(&self) -> &'static str {
        match self {
            AuthAction::Read => "read",
            AuthAction::Write => "write",
            AuthAction::Instantiate => "instantiate",
            AuthAction::Confirm => "confirm",
            AuthAction::Sign => "sign",
            AuthAction::Reject => "reject",
        }
    }
}

impl FromStr for AuthAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(AuthAction::Read),
            "write" => Ok(AuthAction::Write),
            "instantiate" => Ok(AuthAction::Instantiate),
            "confirm" => Ok(AuthAction::Confirm),
            "sign" => Ok(AuthAction::Sign),
            "reject" => Ok(AuthAction::Reject),
            _ => Err(()),
        }
    }
}

/// Lookups the host application provides to expression functions.
///
/// Every method has a default so a host only implements what its expressions use.
/// Values are plain JSON; the evaluator filters and converts them.
pub trait DataSources {
    /// Raw form data at `field`, in the given data type or the current default one.
    fn form_data(&self, field: &str, data_type: Option<&str>) -> Result<Option<JsonValue>, DataSourceError> {
        let _ = (field, data_type);
        Err(DataSourceError::Unavailable("form data"))
    }

    /// Value bound to the closest component with this id; `Ok(None)` when hidden.
    fn component_value(&self, id: &str) -> Result<Option<JsonValue>, DataSourceError> {
        let _ = id;
        Err(DataSourceError::Unavailable("component data"))
    }

    /// Display text of the closest component with this id; `Ok(None)` when hidden.
    fn display_value(&self, id: &str) -> Result<Option<String>, DataSourceError> {
        let _ = id;
        Err(DataSourceError::Unavailable("display data"))
    }

    /// Page holding the closest component with this id.
    fn component_page(&self, id: &str) -> Option<String> {
        let _ = id;
        None
    }

    fn instance_context(&self, field: InstanceField) -> Option<String> {
        let _ = field;
        None
    }

    fn application_setting(&self, key: &str) -> Option<JsonValue> {
        let _ = key;
        None
    }

    fn has_permission(&self, action: AuthAction) -> bool {
        let _ = action;
        false
    }

    /// Roles of the current user, or `None` when roles are not loaded.
    fn roles(&self) -> Option<Vec<String>> {
        None
    }

    fn external_api_data(&self, api_id: &str) -> Option<JsonValue> {
        let _ = api_id;
        None
    }

    /// Text resource by key. Unknown keys resolve to the key itself.
    fn text(&self, key: &str) -> String {
        key.to_string()
    }

    fn current_language(&self) -> String {
        "nb".to_string()
    }

    /// Id of the current process task.
    fn current_task(&self) -> Option<String> {
        None
    }
}

/// Data sources with nothing available.
pub struct NoDataSources;

impl DataSources for NoDataSources {}
