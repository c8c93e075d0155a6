// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use serde::Serialize;

use crate::{
    describe::DescribeInstance,
    model::{DescribedInstance, INSTANCE_TYPE_SETTING, SettingValue, Settings, SettingsDocument},
};

/// One disagreement between the desired settings and an instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mismatch {
    pub instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub kind: MismatchKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchKind {
    Differs {
        component: String,
        setting: String,
        desired: SettingValue,
        actual: SettingValue,
    },
    MissingSetting {
        component: String,
        setting: String,
        desired: SettingValue,
    },
    MissingComponent {
        component: String,
    },
    /// The instance could not be described at all.
    Unavailable {
        reason: String,
    },
}

impl Mismatch {
    fn new(instance: &DescribedInstance, kind: MismatchKind) -> Self {
        Mismatch {
            instance_id: instance.instance_id.clone(),
            address: instance.address().map(str::to_string),
            kind,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance `{}`", self.instance_id)?;
        if let Some(address) = &self.address {
            write!(f, " ({address})")?;
        }
        match &self.kind {
            MismatchKind::Differs {
                component,
                setting,
                desired,
                actual,
            } => write!(
                f,
                ": `{component}.{setting}` is {actual}, expected {desired}"
            ),
            MismatchKind::MissingSetting {
                component,
                setting,
                desired,
            } => write!(
                f,
                ": `{component}.{setting}` is not reported, expected {desired}"
            ),
            MismatchKind::MissingComponent { component } => {
                write!(f, ": component `{component}` is not reported")
            }
            MismatchKind::Unavailable { reason } => write!(f, ": {reason}"),
        }
    }
}

/// Checks every instance against `settings_to_verify` for `component_key`.
///
/// Instances are described one after another. An instance that cannot be
/// described is recorded as [`MismatchKind::Unavailable`] and the remaining
/// instances are still checked. An empty result means every instance runs
/// with the desired settings.
pub fn do_validate<S: AsRef<str>, D: DescribeInstance>(
    describer: &D,
    component_key: S,
    described_instances: &[DescribedInstance],
    settings_to_verify: &Settings,
) -> Vec<Mismatch> {
    let component_key = component_key.as_ref();
    let mut mismatches = vec![];

    for instance in described_instances {
        match describer.describe(instance) {
            Ok(report) => mismatches.extend(compare_report(
                instance,
                component_key,
                &report,
                settings_to_verify,
            )),
            Err(e) => {
                log::debug!("failed to describe instance `{}`: {e}", instance.instance_id);
                mismatches.push(Mismatch::new(
                    instance,
                    MismatchKind::Unavailable {
                        reason: e.to_string(),
                    },
                ));
            }
        }
    }

    mismatches
}

/// Checks every component of `document` on every instance.
///
/// Each instance is described once and its report is compared against all
/// components, so mismatches come out grouped by instance.
pub fn validate_document<D: DescribeInstance>(
    describer: &D,
    described_instances: &[DescribedInstance],
    document: &SettingsDocument,
) -> Vec<Mismatch> {
    let mut mismatches = vec![];

    for instance in described_instances {
        match describer.describe(instance) {
            Ok(report) => {
                for (component_key, component) in &document.application.components {
                    mismatches.extend(compare_report(
                        instance,
                        component_key,
                        &report,
                        &component.settings,
                    ));
                }
            }
            Err(e) => {
                log::debug!("failed to describe instance `{}`: {e}", instance.instance_id);
                mismatches.push(Mismatch::new(
                    instance,
                    MismatchKind::Unavailable {
                        reason: e.to_string(),
                    },
                ));
            }
        }
    }

    mismatches
}

/// Compares the report of a single instance with the desired settings.
pub fn compare_report(
    instance: &DescribedInstance,
    component_key: &str,
    report: &SettingsDocument,
    settings_to_verify: &Settings,
) -> Vec<Mismatch> {
    let reported = report.component(component_key).map(|c| &c.settings);
    let instance_type = instance.instance_type.as_deref().map(SettingValue::from);
    let mut mismatches = vec![];

    for (name, desired) in settings_to_verify {
        let actual = reported
            .and_then(|settings| settings.get(name))
            .map(|setting| &setting.value)
            .or(if name == INSTANCE_TYPE_SETTING {
                instance_type.as_ref()
            } else {
                None
            });

        match actual {
            Some(actual) if desired.value.matches(actual) => (),
            Some(actual) => mismatches.push(Mismatch::new(
                instance,
                MismatchKind::Differs {
                    component: component_key.to_string(),
                    setting: name.clone(),
                    desired: desired.value.clone(),
                    actual: actual.clone(),
                },
            )),
            None if reported.is_none() => {
                mismatches.push(Mismatch::new(
                    instance,
                    MismatchKind::MissingComponent {
                        component: component_key.to_string(),
                    },
                ));
                break;
            }
            None => mismatches.push(Mismatch::new(
                instance,
                MismatchKind::MissingSetting {
                    component: component_key.to_string(),
                    setting: name.clone(),
                    desired: desired.value.clone(),
                },
            )),
        }
    }

    mismatches
}
