use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidationError;

/// Icon injected into a notification when the caller supplies none.
pub const DEFAULT_ICON: &str = "myicon";

/// Upper bound on tokens per message, imposed by the legacy gateway.
pub const MAX_TOKENS: usize = 1000;

/// Keys accepted by the legacy gateway inside the `notification` object.
pub const ALLOWED_NOTIFICATION_KEYS: [&str; 12] = [
    "title",
    "body",
    "icon",
    "sound",
    "badge",
    "tag",
    "color",
    "click_action",
    "body_loc_key",
    "body_loc_args",
    "title_loc_key",
    "title_loc_args",
];

/// Delivery priority of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Human-visible notification payload.
///
/// Optional fields are omitted from the wire body when unset. `title` is
/// the only required field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_loc_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_args: Option<Vec<String>>,
}

impl Notification {
    /// Create a notification with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Build a notification from an untyped JSON map, enforcing the
    /// legacy gateway's key allow-list.
    ///
    /// Fails if `title` is missing or null, or if the map contains keys
    /// outside [`ALLOWED_NOTIFICATION_KEYS`]; in the latter case the error
    /// names every offending key.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        // A present-but-empty title is accepted; only a missing or null
        // entry fails.
        let title = match map.get("title") {
            None | Some(Value::Null) => return Err(ValidationError::MissingTitle),
            Some(value) => coerce_to_string(value),
        };

        let disallowed: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|key| !ALLOWED_NOTIFICATION_KEYS.contains(key))
            .collect();
        if !disallowed.is_empty() {
            return Err(ValidationError::DisallowedNotificationKeys(
                disallowed.join(", "),
            ));
        }

        Ok(Self {
            title,
            body: string_field(map, "body")?,
            icon: string_field(map, "icon")?,
            sound: string_field(map, "sound")?,
            badge: string_field(map, "badge")?,
            tag: string_field(map, "tag")?,
            color: string_field(map, "color")?,
            click_action: string_field(map, "click_action")?,
            body_loc_key: string_field(map, "body_loc_key")?,
            body_loc_args: args_field(map, "body_loc_args")?,
            title_loc_key: string_field(map, "title_loc_key")?,
            title_loc_args: args_field(map, "title_loc_args")?,
        })
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Result<Option<String>, ValidationError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Array(_)) | Some(Value::Object(_)) | Some(Value::Null) => {
            Err(ValidationError::InvalidNotificationValue(key.to_string()))
        }
        Some(value) => Ok(Some(coerce_to_string(value))),
    }
}

fn args_field(map: &Map<String, Value>, key: &str) -> Result<Option<Vec<String>>, ValidationError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.iter().map(coerce_to_string).collect())),
        Some(_) => Err(ValidationError::InvalidNotificationValue(key.to_string())),
    }
}

/// Coerce a JSON value into the string form the gateway expects for
/// `data` entries: booleans become `"true"`/`"false"`, numbers their
/// decimal form, `null` the empty string, containers their JSON text.
pub(crate) fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Gateway delivery parameters.
///
/// `collapse_key` and `restricted_package_name` serialize as explicit
/// JSON `null` when unset, matching the legacy wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub collapse_key: Option<String>,
    pub priority: Priority,
    pub content_available: bool,
    pub mutable_content: bool,
    pub time_to_live: u32,
    pub restricted_package_name: Option<String>,
    pub dry_run: bool,
}

/// Caller-supplied subset of [`Parameters`].
///
/// Unset fields fall back to the configured defaults on merge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterOverrides {
    pub collapse_key: Option<String>,
    pub priority: Option<Priority>,
    pub content_available: Option<bool>,
    pub mutable_content: Option<bool>,
    pub time_to_live: Option<u32>,
    pub restricted_package_name: Option<String>,
    pub dry_run: Option<bool>,
}

impl ParameterOverrides {
    pub fn is_empty(&self) -> bool {
        self.collapse_key.is_none()
            && self.priority.is_none()
            && self.content_available.is_none()
            && self.mutable_content.is_none()
            && self.time_to_live.is_none()
            && self.restricted_package_name.is_none()
            && self.dry_run.is_none()
    }

    /// Merge these overrides over `defaults`; supplied fields win.
    pub fn merge_over(&self, defaults: &Parameters) -> Parameters {
        Parameters {
            collapse_key: self
                .collapse_key
                .clone()
                .or_else(|| defaults.collapse_key.clone()),
            priority: self.priority.unwrap_or(defaults.priority),
            content_available: self
                .content_available
                .unwrap_or(defaults.content_available),
            mutable_content: self.mutable_content.unwrap_or(defaults.mutable_content),
            time_to_live: self.time_to_live.unwrap_or(defaults.time_to_live),
            restricted_package_name: self
                .restricted_package_name
                .clone()
                .or_else(|| defaults.restricted_package_name.clone()),
            dry_run: self.dry_run.unwrap_or(defaults.dry_run),
        }
    }
}

/// Message recipient: one token uses `to`, several use `registration_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    To(String),
    RegistrationIds(Vec<String>),
}

/// Notification/data portion of a message; absent branches are omitted
/// from the wire body entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        self.notification.is_none() && self.data.is_none()
    }
}

/// Complete request body POSTed to the gateway.
///
/// Parameters appear only when the caller set them; the gateway applies
/// its own defaults otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    pub target: Target,
    #[serde(flatten)]
    pub payload: Payload,
    #[serde(flatten)]
    pub parameters: Option<Parameters>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a JSON object, got {other}"),
        }
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Priority::Normal).unwrap(), json!("normal"));
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), json!("high"));
    }

    #[test]
    fn notification_from_map_requires_title() {
        let err = Notification::from_map(&map(json!({"body": "no title"}))).unwrap_err();
        assert!(matches!(err, ValidationError::MissingTitle));

        let err = Notification::from_map(&map(json!({"title": null}))).unwrap_err();
        assert!(matches!(err, ValidationError::MissingTitle));
    }

    #[test]
    fn notification_from_map_accepts_an_empty_title() {
        let notification = Notification::from_map(&map(json!({"title": ""}))).unwrap();
        assert_eq!(notification.title, "");
    }

    #[test]
    fn notification_from_map_rejects_unknown_keys() {
        let err = Notification::from_map(&map(json!({
            "title": "Hi",
            "foo": 1,
            "bar": 2
        })))
        .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, ValidationError::DisallowedNotificationKeys(_)));
        assert!(message.contains("foo"));
        assert!(message.contains("bar"));
        assert!(!message.contains("title"));
    }

    #[test]
    fn notification_from_map_accepts_all_allowed_keys() {
        let notification = Notification::from_map(&map(json!({
            "title": "Hi",
            "body": "there",
            "icon": "bell",
            "sound": "default",
            "badge": 3,
            "tag": "chat",
            "color": "#ff0000",
            "click_action": "OPEN",
            "body_loc_key": "GREETING",
            "body_loc_args": ["Bob", 7],
            "title_loc_key": "TITLE",
            "title_loc_args": ["x"]
        })))
        .unwrap();

        assert_eq!(notification.title, "Hi");
        assert_eq!(notification.badge.as_deref(), Some("3"));
        assert_eq!(
            notification.body_loc_args,
            Some(vec!["Bob".to_string(), "7".to_string()])
        );
    }

    #[test]
    fn notification_from_map_rejects_container_values() {
        let err = Notification::from_map(&map(json!({
            "title": "Hi",
            "sound": {"nested": true}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("sound"));

        let err = Notification::from_map(&map(json!({
            "title": "Hi",
            "body_loc_args": "not-an-array"
        })))
        .unwrap_err();
        assert!(err.to_string().contains("body_loc_args"));
    }

    #[test]
    fn notification_omits_unset_fields() {
        let value = serde_json::to_value(Notification::new("Hi")).unwrap();
        assert_eq!(value, json!({"title": "Hi"}));
    }

    #[test]
    fn coercion_matches_gateway_rules() {
        assert_eq!(coerce_to_string(&json!(true)), "true");
        assert_eq!(coerce_to_string(&json!(false)), "false");
        assert_eq!(coerce_to_string(&json!(42)), "42");
        assert_eq!(coerce_to_string(&json!(1.5)), "1.5");
        assert_eq!(coerce_to_string(&json!("s")), "s");
        assert_eq!(coerce_to_string(&Value::Null), "");
        assert_eq!(coerce_to_string(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn default_parameters_serialize_with_explicit_nulls() {
        let value = serde_json::to_value(Parameters::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "collapse_key": null,
                "priority": "normal",
                "content_available": false,
                "mutable_content": false,
                "time_to_live": 0,
                "restricted_package_name": null,
                "dry_run": false
            })
        );
    }

    #[test]
    fn overrides_merge_keeps_unsupplied_defaults() {
        let overrides = ParameterOverrides {
            priority: Some(Priority::High),
            time_to_live: Some(3600),
            ..ParameterOverrides::default()
        };
        let merged = overrides.merge_over(&Parameters::default());

        assert_eq!(merged.priority, Priority::High);
        assert_eq!(merged.time_to_live, 3600);
        assert_eq!(merged.collapse_key, None);
        assert!(!merged.dry_run);
    }

    #[test]
    fn empty_overrides_are_detected() {
        assert!(ParameterOverrides::default().is_empty());
        let overrides = ParameterOverrides {
            dry_run: Some(false),
            ..ParameterOverrides::default()
        };
        assert!(!overrides.is_empty());
    }

    #[test]
    fn target_serializes_to_or_registration_ids() {
        let single = serde_json::to_value(Target::To("abc".into())).unwrap();
        assert_eq!(single, json!({"to": "abc"}));

        let multi =
            serde_json::to_value(Target::RegistrationIds(vec!["t1".into(), "t2".into()])).unwrap();
        assert_eq!(multi, json!({"registration_ids": ["t1", "t2"]}));
    }

    #[test]
    fn empty_payload_serializes_to_empty_object() {
        let value = serde_json::to_value(Payload::default()).unwrap();
        assert_eq!(value, json!({}));
    }
}
