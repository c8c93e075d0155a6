// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use indexmap::IndexMap;

use crate::{
    describe::DescribeInstance,
    inventory::ReadInventory,
    model::{Declarations, INSTANCE_TYPE_SETTING, Setting, SettingValue, SettingsDocument},
    store::ReadSettingsStore,
};

/// A setting reported differently by a later instance than by the instance
/// that first reported its component.
#[derive(Debug, PartialEq)]
struct Disagreement<'a> {
    component: String,
    setting: String,
    instance: &'a str,
    value: SettingValue,
    first_instance: &'a str,
    first_value: SettingValue,
}

impl fmt::Display for Disagreement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "instance `{}` reports `{}.{}` as {}, instance `{}` as {}",
            self.instance,
            self.component,
            self.setting,
            self.value,
            self.first_instance,
            self.first_value,
        )
    }
}

/// Adds the components of `report` that `document` lacks, remembering
/// `instance_id` as their reporter in `reporters`.
fn merge_report<'a>(
    document: &mut SettingsDocument,
    reporters: &mut IndexMap<String, &'a str>,
    instance_id: &'a str,
    report: SettingsDocument,
) -> Vec<Disagreement<'a>> {
    let mut disagreements = vec![];

    for (name, component) in report.application.components {
        let Some(known) = document.application.components.get(&name) else {
            reporters.insert(name.clone(), instance_id);
            document.application.components.insert(name, component);
            continue;
        };
        let first_instance = reporters.get(&name).copied().unwrap_or_default();
        for (key, setting) in &component.settings {
            if let Some(first) = known.settings.get(key)
                && !first.value.matches(&setting.value)
            {
                disagreements.push(Disagreement {
                    component: name.clone(),
                    setting: key.clone(),
                    instance: instance_id,
                    value: setting.value.clone(),
                    first_instance,
                    first_value: first.value.clone(),
                });
            }
        }
    }

    disagreements
}

/// Current settings of `target` as reported by its instances.
///
/// The first instance reporting a component provides its settings. Later
/// instances that disagree only produce a warning. When no instance answers,
/// the document last published for the target is returned instead, and when
/// there is none either the result is empty. Problems along the way are
/// logged, never returned.
pub fn do_query<S, I, D, St>(
    target: S,
    inventory: &I,
    describer: &D,
    store: &St,
    declarations: &Declarations,
) -> SettingsDocument
where
    S: AsRef<str>,
    I: ReadInventory,
    D: DescribeInstance,
    St: ReadSettingsStore,
{
    let target = target.as_ref();
    let instances = inventory.instances(target).unwrap_or_else(|e| {
        log::warn!("unable to list instances of target `{target}`: {e}");
        vec![]
    });

    let mut document = SettingsDocument::default();
    let mut reporters = IndexMap::new();
    let mut answered = false;

    for instance in &instances {
        let mut report = match describer.describe(instance) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("skipping instance `{}`: {e}", instance.instance_id);
                continue;
            }
        };

        if let Some(instance_type) = &instance.instance_type {
            for component in report.application.components.values_mut() {
                component
                    .settings
                    .entry(INSTANCE_TYPE_SETTING.to_string())
                    .or_insert_with(|| Setting::new(instance_type.as_str()));
            }
        }

        for disagreement in merge_report(
            &mut document,
            &mut reporters,
            instance.instance_id.as_str(),
            report,
        ) {
            log::warn!("{disagreement}");
        }
        answered = true;
    }

    if !answered {
        if !instances.is_empty() {
            log::warn!("no instance of target `{target}` could be described");
        }
        match store.get(target) {
            Ok(Some(stored)) => {
                log::debug!("using the settings last published for target `{target}`");
                document = stored;
            }
            Ok(None) => (),
            Err(e) => log::warn!("unable to read stored settings of target `{target}`: {e}"),
        }
    }

    for (name, component) in declarations {
        let Some(reported) = document.application.components.get_mut(name) else {
            continue;
        };
        for (key, declaration) in &component.settings {
            if let Some(setting) = reported.settings.get_mut(key) {
                setting.declare(declaration);
            }
        }
    }

    document
}
