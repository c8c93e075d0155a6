// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use thiserror::Error;

use crate::{
    commands::validate::{Mismatch, validate_document},
    describe::DescribeInstance,
    inventory::ReadInventory,
    model::{Declarations, SettingValue, SettingsDocument, SettingsDocumentRaw, SettingsValidationError},
    store::WriteSettingsStore,
};

pub const DEFAULT_SETTLE_ATTEMPTS: u32 = 6;
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_secs(10);

/// How long instances get to pick up newly published settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settle {
    /// Validation rounds, at least one.
    pub attempts: u32,
    /// Pause before every round but the first.
    pub interval: Duration,
}

impl Default for Settle {
    fn default() -> Self {
        Settle {
            attempts: DEFAULT_SETTLE_ATTEMPTS,
            interval: DEFAULT_SETTLE_INTERVAL,
        }
    }
}

/// Everything an adjustment touches.
pub struct AdjustContext<'a, I, D, St> {
    pub inventory: &'a I,
    pub describer: &'a D,
    pub store: &'a mut St,
    pub declarations: &'a Declarations,
    pub settle: Settle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjustOutcome {
    pub instances: usize,
    /// Validation rounds it took for every instance to agree.
    pub attempts: u32,
}

#[derive(Error, Debug, PartialEq)]
pub enum DeclarationError {
    #[error("component `{component}` does not declare a setting `{setting}`")]
    Unknown { component: String, setting: String },
    #[error("setting `{component}.{setting}` must be a number, found {value}")]
    NotANumber {
        component: String,
        setting: String,
        value: SettingValue,
    },
    #[error("setting `{component}.{setting}` is {value}, below the minimum {min}")]
    BelowMin {
        component: String,
        setting: String,
        value: SettingValue,
        min: serde_json::Number,
    },
    #[error("setting `{component}.{setting}` is {value}, above the maximum {max}")]
    AboveMax {
        component: String,
        setting: String,
        value: SettingValue,
        max: serde_json::Number,
    },
}

#[derive(Error, Debug)]
pub enum AdjustError<StoreError: std::error::Error, InventoryError: std::error::Error> {
    #[error(transparent)]
    Invalid(#[from] SettingsValidationError),
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error("failed to publish settings: {0}")]
    Store(StoreError),
    #[error("failed to list instances: {0}")]
    Inventory(InventoryError),
    #[error("{} mismatch(es) remain after validation:\n{}", .0.len(), list_mismatches(.0))]
    Validation(Vec<Mismatch>),
}

fn list_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(|mismatch| format!("  {mismatch}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Checks every setting of a declared component against its declaration.
/// Components without a declaration are accepted as they are.
pub fn check_declarations(
    document: &SettingsDocument,
    declarations: &Declarations,
) -> Result<(), DeclarationError> {
    for (component_name, component) in &document.application.components {
        let Some(declared) = declarations.get(component_name) else {
            continue;
        };

        for (setting_name, setting) in &component.settings {
            let Some(declaration) = declared.settings.get(setting_name) else {
                return Err(DeclarationError::Unknown {
                    component: component_name.clone(),
                    setting: setting_name.clone(),
                });
            };
            if declaration.min.is_none() && declaration.max.is_none() {
                continue;
            }

            let Some(value) = setting.value.as_f64() else {
                return Err(DeclarationError::NotANumber {
                    component: component_name.clone(),
                    setting: setting_name.clone(),
                    value: setting.value.clone(),
                });
            };
            if let Some(min) = &declaration.min
                && min.as_f64().is_some_and(|min| value < min)
            {
                return Err(DeclarationError::BelowMin {
                    component: component_name.clone(),
                    setting: setting_name.clone(),
                    value: setting.value.clone(),
                    min: min.clone(),
                });
            }
            if let Some(max) = &declaration.max
                && max.as_f64().is_some_and(|max| value > max)
            {
                return Err(DeclarationError::AboveMax {
                    component: component_name.clone(),
                    setting: setting_name.clone(),
                    value: setting.value.clone(),
                    max: max.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Applies `raw_document` to `target`: publishes it to the settings store and
/// waits until every instance of the target reports it.
///
/// `progress` receives a percentage and a short message as the adjustment
/// advances.
pub fn do_adjust<S, I, D, St, P>(
    target: S,
    raw_document: &SettingsDocumentRaw,
    ctx: AdjustContext<'_, I, D, St>,
    mut progress: P,
) -> Result<AdjustOutcome, AdjustError<St::WriteError, I::Error>>
where
    S: AsRef<str>,
    I: ReadInventory,
    D: DescribeInstance,
    St: WriteSettingsStore,
    P: FnMut(u8, &str),
{
    let target = target.as_ref();
    let header = crate::style::get_style_config().header;

    progress(0, "checking settings");
    let document = raw_document.validate()?;
    check_declarations(&document, ctx.declarations)?;

    progress(10, "publishing settings");
    let publishing = "Publishing";
    log::info!("{header}{publishing:>12}{header:#} settings for target `{target}`");
    ctx.store
        .put(target, &document)
        .map_err(AdjustError::Store)?;

    progress(20, "listing instances");
    let instances = ctx
        .inventory
        .instances(target)
        .map_err(AdjustError::Inventory)?;
    if instances.is_empty() {
        log::warn!("target `{target}` has no instances, nothing to validate");
        progress(100, "no instances to validate");
        return Ok(AdjustOutcome {
            instances: 0,
            attempts: 0,
        });
    }

    let attempts = ctx.settle.attempts.max(1);
    let mut mismatches = vec![];
    for attempt in 1..=attempts {
        if attempt > 1 {
            log::debug!(
                "{} mismatch(es) left, waiting {:?} before attempt {attempt}/{attempts}",
                mismatches.len(),
                ctx.settle.interval
            );
            std::thread::sleep(ctx.settle.interval);
        }

        let validating = "Validating";
        log::info!(
            "{header}{validating:>12}{header:#} {} instance(s) of target `{target}` ({attempt}/{attempts})",
            instances.len()
        );

        mismatches = validate_document(ctx.describer, &instances, &document);

        let percent = 20 + (80 * attempt / attempts).min(79);
        progress(
            percent as u8,
            &format!("validation {attempt}/{attempts}: {} mismatch(es)", mismatches.len()),
        );

        if mismatches.is_empty() {
            let good = crate::style::get_style_config().good;
            let validated = "Validated";
            log::info!(
                "{good}{validated:>12}{good:#} settings on {} instance(s) of target `{target}`",
                instances.len()
            );
            progress(100, "settings applied");
            return Ok(AdjustOutcome {
                instances: instances.len(),
                attempts: attempt,
            });
        }
    }

    Err(AdjustError::Validation(mismatches))
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, time::Duration};

    use indexmap::IndexMap;
    use thiserror::Error;

    use super::{
        AdjustContext, AdjustError, DeclarationError, Settle, check_declarations, do_adjust,
    };
    use crate::{
        describe::DescribeInstance,
        inventory::memory::MemoryInventory,
        model::{
            ComponentDeclaration, Declarations, DescribedInstance, SettingDeclaration,
            SettingsDocument, SettingsDocumentRaw,
        },
        store::{ReadSettingsStore, memory::MemoryStore},
    };

    #[derive(Error, Debug)]
    #[error("not yet restarted")]
    struct NotReady;

    /// Reports `stale` until `ready_after` calls were made, `fresh` after.
    struct SlowInstances {
        stale: SettingsDocument,
        fresh: SettingsDocument,
        ready_after: usize,
        calls: Cell<usize>,
    }

    impl DescribeInstance for SlowInstances {
        type Error = NotReady;

        fn describe(&self, _instance: &DescribedInstance) -> Result<SettingsDocument, NotReady> {
            let calls = self.calls.get() + 1;
            self.calls.set(calls);
            if calls > self.ready_after {
                Ok(self.fresh.clone())
            } else {
                Ok(self.stale.clone())
            }
        }
    }

    fn raw(period: i64) -> SettingsDocumentRaw {
        serde_json::from_value(serde_json::json!({
            "application": {"components": {"web": {"settings": {
                "UriEnableCache": {"value": 1},
                "UriScavengerPeriod": {"value": period},
                "inst_type": {"value": "t2.micro"}
            }}}}
        }))
        .unwrap()
    }

    fn inventory() -> MemoryInventory {
        MemoryInventory::from_iter([
            ("1234", DescribedInstance::new("1", "192.168.1.1")),
            ("1234", DescribedInstance::new("2", "192.168.1.2")),
        ])
    }

    fn quick(attempts: u32) -> Settle {
        Settle {
            attempts,
            interval: Duration::ZERO,
        }
    }

    #[test]
    fn adjust_waits_for_instances() -> Result<(), Box<dyn std::error::Error>> {
        let describer = SlowInstances {
            stale: raw(120).validate()?,
            fresh: raw(260).validate()?,
            ready_after: 2,
            calls: Cell::new(0),
        };
        let mut store = MemoryStore::new();
        let mut reported = vec![];

        let outcome = do_adjust(
            "1234",
            &raw(260),
            AdjustContext {
                inventory: &inventory(),
                describer: &describer,
                store: &mut store,
                declarations: &Declarations::new(),
                settle: quick(3),
            },
            |percent, _message: &str| reported.push(percent),
        )?;

        assert_eq!(outcome.instances, 2);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(store.get("1234")?, Some(raw(260).validate()?));
        assert_eq!(reported.first(), Some(&0));
        assert_eq!(reported.last(), Some(&100));
        assert!(reported.windows(2).all(|pair| pair[0] <= pair[1]));

        Ok(())
    }

    #[test]
    fn adjust_fails_when_instances_never_agree() -> Result<(), Box<dyn std::error::Error>> {
        let describer = SlowInstances {
            stale: raw(120).validate()?,
            fresh: raw(120).validate()?,
            ready_after: 0,
            calls: Cell::new(0),
        };
        let mut store = MemoryStore::new();

        let result = do_adjust(
            "1234",
            &raw(260),
            AdjustContext {
                inventory: &inventory(),
                describer: &describer,
                store: &mut store,
                declarations: &Declarations::new(),
                settle: quick(2),
            },
            |_, _: &str| (),
        );

        let Err(AdjustError::Validation(mismatches)) = result else {
            panic!("expected validation failure, got {result:?}");
        };
        assert_eq!(mismatches.len(), 2);
        assert_eq!(describer.calls.get(), 4);

        Ok(())
    }

    #[test]
    fn each_instance_is_described_once_per_round() -> Result<(), Box<dyn std::error::Error>> {
        let raw: SettingsDocumentRaw = serde_json::from_value(serde_json::json!({
            "application": {"components": {
                "web": {"settings": {"UriEnableCache": {"value": 1}}},
                "api": {"settings": {"Workers": {"value": 4}}},
                "worker": {"settings": {"QueueDepth": {"value": 32}}}
            }}
        }))?;
        let describer = SlowInstances {
            stale: raw.validate()?,
            fresh: raw.validate()?,
            ready_after: 0,
            calls: Cell::new(0),
        };
        let mut store = MemoryStore::new();

        let outcome = do_adjust(
            "1234",
            &raw,
            AdjustContext {
                inventory: &inventory(),
                describer: &describer,
                store: &mut store,
                declarations: &Declarations::new(),
                settle: quick(1),
            },
            |_, _: &str| (),
        )?;

        assert_eq!(outcome.attempts, 1);
        assert_eq!(describer.calls.get(), 2);

        Ok(())
    }

    #[test]
    fn adjust_without_instances_succeeds() -> Result<(), Box<dyn std::error::Error>> {
        let describer = SlowInstances {
            stale: SettingsDocument::default(),
            fresh: SettingsDocument::default(),
            ready_after: 0,
            calls: Cell::new(0),
        };
        let mut store = MemoryStore::new();

        let outcome = do_adjust(
            "unknown",
            &raw(260),
            AdjustContext {
                inventory: &inventory(),
                describer: &describer,
                store: &mut store,
                declarations: &Declarations::new(),
                settle: quick(1),
            },
            |_, _: &str| (),
        )?;

        assert_eq!(outcome.instances, 0);
        assert_eq!(describer.calls.get(), 0);
        assert!(store.get("unknown")?.is_some());

        Ok(())
    }

    #[test]
    fn non_scalar_values_are_rejected_before_publishing() {
        let raw: SettingsDocumentRaw = serde_json::from_value(serde_json::json!({
            "application": {"components": {"web": {"settings": {
                "UriEnableCache": {"value": [1, 2]}
            }}}}
        }))
        .unwrap();
        let describer = SlowInstances {
            stale: SettingsDocument::default(),
            fresh: SettingsDocument::default(),
            ready_after: 0,
            calls: Cell::new(0),
        };
        let mut store = MemoryStore::new();

        let result = do_adjust(
            "1234",
            &raw,
            AdjustContext {
                inventory: &inventory(),
                describer: &describer,
                store: &mut store,
                declarations: &Declarations::new(),
                settle: quick(1),
            },
            |_, _: &str| (),
        );

        assert!(matches!(result, Err(AdjustError::Invalid(_))));
        assert!(store.documents.is_empty());
    }

    #[test]
    fn declarations_bound_values() -> Result<(), Box<dyn std::error::Error>> {
        let declarations = Declarations::from([(
            "web".to_string(),
            ComponentDeclaration {
                settings: IndexMap::from([
                    ("UriEnableCache".to_string(), SettingDeclaration::default()),
                    ("inst_type".to_string(), SettingDeclaration::default()),
                    (
                        "UriScavengerPeriod".to_string(),
                        SettingDeclaration {
                            kind: Some("range".to_string()),
                            min: Some(60u64.into()),
                            max: Some(600u64.into()),
                            step: None,
                        },
                    ),
                ]),
            },
        )]);

        assert_eq!(check_declarations(&raw(260).validate()?, &declarations), Ok(()));
        assert!(matches!(
            check_declarations(&raw(30).validate()?, &declarations),
            Err(DeclarationError::BelowMin { .. })
        ));
        assert!(matches!(
            check_declarations(&raw(900).validate()?, &declarations),
            Err(DeclarationError::AboveMax { .. })
        ));

        let mut undeclared = declarations.clone();
        undeclared["web"].settings.shift_remove("inst_type");
        assert_eq!(
            check_declarations(&raw(260).validate()?, &undeclared),
            Err(DeclarationError::Unknown {
                component: "web".to_string(),
                setting: "inst_type".to_string(),
            })
        );

        Ok(())
    }
}
