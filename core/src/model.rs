// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Setting holding the EC2 instance type. Instances rarely report it through
/// their describe endpoint, so it is also checked against `InstanceType`.
pub const INSTANCE_TYPE_SETTING: &str = "inst_type";

/// A scalar setting value as it appears in settings documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl SettingValue {
    /// Loose equality used when comparing desired and reported values.
    /// Numbers compare numerically and a string holding a number is equal to
    /// that number, since instance agents often report registry values as text.
    pub fn matches(&self, other: &SettingValue) -> bool {
        match (self, other) {
            (SettingValue::Bool(a), SettingValue::Bool(b)) => a == b,
            (SettingValue::String(a), SettingValue::String(b)) => a == b,
            (SettingValue::Number(a), SettingValue::Number(b)) => numbers_equal(a, b),
            (SettingValue::Number(n), SettingValue::String(s))
            | (SettingValue::String(s), SettingValue::Number(n)) => s
                .trim()
                .parse::<f64>()
                .is_ok_and(|parsed| n.as_f64() == Some(parsed)),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => n.as_f64(),
            SettingValue::String(s) => s.trim().parse().ok(),
            SettingValue::Bool(_) => None,
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => a.as_f64() == b.as_f64(),
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Number(n) => write!(f, "{n}"),
            SettingValue::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Number(value.into())
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Number(value.into())
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl TryFrom<&serde_json::Value> for SettingValue {
    type Error = ();

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Bool(b) => Ok(SettingValue::Bool(*b)),
            serde_json::Value::Number(n) => Ok(SettingValue::Number(n.clone())),
            serde_json::Value::String(s) => Ok(SettingValue::String(s.clone())),
            _ => Err(()),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct SettingG<Value> {
    pub value: Value,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min: Option<serde_json::Number>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max: Option<serde_json::Number>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub step: Option<serde_json::Number>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
}

pub type SettingRaw = SettingG<serde_json::Value>;
pub type Setting = SettingG<SettingValue>;

impl Setting {
    pub fn new<V: Into<SettingValue>>(value: V) -> Self {
        Setting {
            value: value.into(),
            min: None,
            max: None,
            step: None,
            kind: None,
        }
    }

    /// Copies the metadata of a declaration, keeping the value.
    pub fn declare(&mut self, declaration: &SettingDeclaration) {
        self.min = declaration.min.clone().or(self.min.take());
        self.max = declaration.max.clone().or(self.max.take());
        self.step = declaration.step.clone().or(self.step.take());
        self.kind = declaration.kind.clone().or(self.kind.take());
    }
}

pub type SettingsG<Value> = IndexMap<String, SettingG<Value>>;
pub type SettingsRaw = SettingsG<serde_json::Value>;
pub type Settings = SettingsG<SettingValue>;

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ComponentG<Value> {
    #[serde(default = "IndexMap::new")]
    pub settings: SettingsG<Value>,
}

impl<Value> Default for ComponentG<Value> {
    fn default() -> Self {
        ComponentG {
            settings: IndexMap::new(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ApplicationG<Value> {
    #[serde(default = "IndexMap::new")]
    pub components: IndexMap<String, ComponentG<Value>>,
}

impl<Value> Default for ApplicationG<Value> {
    fn default() -> Self {
        ApplicationG {
            components: IndexMap::new(),
        }
    }
}

/// `{"application": {"components": {<name>: {"settings": {<key>: {"value": ..}}}}}}`
///
/// Used both for the settings handed to an adjust and for what an instance
/// reports through its describe endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct SettingsDocumentG<Value> {
    pub application: ApplicationG<Value>,
}

impl<Value> Default for SettingsDocumentG<Value> {
    fn default() -> Self {
        SettingsDocumentG {
            application: ApplicationG::default(),
        }
    }
}

impl<Value> SettingsDocumentG<Value> {
    pub fn component<S: AsRef<str>>(&self, key: S) -> Option<&ComponentG<Value>> {
        self.application.components.get(key.as_ref())
    }

    pub fn component_mut<S: AsRef<str>>(&mut self, key: S) -> &mut ComponentG<Value> {
        self.application
            .components
            .entry(key.as_ref().to_string())
            .or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.application.components.is_empty()
    }
}

pub type SettingsDocumentRaw = SettingsDocumentG<serde_json::Value>;
pub type SettingsDocument = SettingsDocumentG<SettingValue>;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsValidationError {
    #[error("setting `{setting}` of component `{component}` must be a number, string or boolean, found `{value}`")]
    NonScalar {
        component: String,
        setting: String,
        value: String,
    },
}

impl SettingsDocumentRaw {
    pub fn validate(&self) -> Result<SettingsDocument, SettingsValidationError> {
        let mut components = IndexMap::with_capacity(self.application.components.len());

        for (component_name, component) in &self.application.components {
            let mut settings = IndexMap::with_capacity(component.settings.len());

            for (setting_name, setting) in &component.settings {
                let value = SettingValue::try_from(&setting.value).map_err(|_| {
                    SettingsValidationError::NonScalar {
                        component: component_name.clone(),
                        setting: setting_name.clone(),
                        value: setting.value.to_string(),
                    }
                })?;
                settings.insert(
                    setting_name.clone(),
                    Setting {
                        value,
                        min: setting.min.clone(),
                        max: setting.max.clone(),
                        step: setting.step.clone(),
                        kind: setting.kind.clone(),
                    },
                );
            }

            components.insert(component_name.clone(), ComponentG { settings });
        }

        Ok(SettingsDocument {
            application: ApplicationG { components },
        })
    }
}

impl TryFrom<SettingsDocumentRaw> for SettingsDocument {
    type Error = SettingsValidationError;

    fn try_from(value: SettingsDocumentRaw) -> Result<SettingsDocument, Self::Error> {
        value.validate()
    }
}

/// Configured metadata of a setting, echoed in query output and used to
/// check values before they are published.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingDeclaration {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub step: Option<serde_json::Number>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDeclaration {
    #[serde(default)]
    pub settings: IndexMap<String, SettingDeclaration>,
}

pub type Declarations = IndexMap<String, ComponentDeclaration>;

/// An instance to validate, with field names as in EC2 `describe-instances`
/// output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribedInstance {
    #[serde(deserialize_with = "deserialize_instance_id")]
    pub instance_id: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub public_ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub private_ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub instance_type: Option<String>,
}

impl DescribedInstance {
    pub fn new<S: AsRef<str>, T: AsRef<str>>(instance_id: S, public_ip_address: T) -> Self {
        DescribedInstance {
            instance_id: instance_id.as_ref().to_string(),
            public_ip_address: Some(public_ip_address.as_ref().to_string()),
            private_ip_address: None,
            instance_type: None,
        }
    }

    /// Address the describe endpoint is reached at. Public address first.
    pub fn address(&self) -> Option<&str> {
        self.public_ip_address
            .as_deref()
            .or(self.private_ip_address.as_deref())
    }
}

fn deserialize_instance_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum InstanceId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match InstanceId::deserialize(deserializer)? {
        InstanceId::Text(s) => s,
        InstanceId::Unsigned(n) => n.to_string(),
        InstanceId::Signed(n) => n.to_string(),
    })
}
