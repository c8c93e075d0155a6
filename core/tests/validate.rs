// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{path::Path, sync::Arc};

use adjust_core::{
    describe::{DescribeClient, DescribeEndpoint},
    model::{DescribedInstance, SettingsDocumentRaw},
    validate::{MismatchKind, do_validate},
};

const ADJUST_SETTINGS: &str = r#"{
    "application": {
        "components": {
            "web": {
                "settings": {
                    "UriEnableCache": {"value": 1},
                    "UriScavengerPeriod": {"value": 260},
                    "WebConfigCacheEnabled": {"value": 0},
                    "WebConfigEnableKernelCache": {"value": 1},
                    "inst_type": {"value": "t2.micro"}
                }
            }
        }
    }
}"#;

fn fixture(name: &str) -> Result<Vec<u8>, std::io::Error> {
    std::fs::read(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("data")
            .join(name),
    )
}

fn instances() -> Result<Vec<DescribedInstance>, serde_json::Error> {
    serde_json::from_str(
        r#"[
            {"PublicIpAddress": "192.168.1.1", "InstanceId": 1},
            {"PublicIpAddress": "192.168.1.2", "InstanceId": 2}
        ]"#,
    )
}

/// Describe client reaching every instance address through `proxy`, so
/// that a single mock server can stand in for all instances.
fn describe_client(proxy: &str) -> Result<DescribeClient, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(proxy)?)
        .build()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    Ok(DescribeClient::new(
        reqwest_middleware::ClientBuilder::new(client).build(),
        Arc::new(runtime),
        DescribeEndpoint::default(),
    ))
}

#[test]
fn agreeing_instances_validate() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let body = fixture("describe.json")?;

    let mocks: Vec<_> = ["192.168.1.1:8080", "192.168.1.2:8080"]
        .into_iter()
        .map(|host| {
            server
                .mock("GET", "/describe.json")
                .match_header("host", host)
                .with_status(200)
                .with_body(&body)
                .create()
        })
        .collect();

    let desired: SettingsDocumentRaw = serde_json::from_str(ADJUST_SETTINGS)?;
    let desired = desired.validate()?;
    let describer = describe_client(&server.url())?;

    let result = do_validate(
        &describer,
        "web",
        &instances()?,
        &desired.component("web").ok_or("missing component")?.settings,
    );

    assert_eq!(result, vec![]);
    for mock in mocks {
        mock.assert();
    }

    Ok(())
}

#[test]
fn drifted_instance_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let body = fixture("describe.json")?;

    let _matching = server
        .mock("GET", "/describe.json")
        .match_header("host", "192.168.1.1:8080")
        .with_body(&body)
        .create();
    let _unreachable = server
        .mock("GET", "/describe.json")
        .match_header("host", "192.168.1.2:8080")
        .with_status(503)
        .create();

    let mut desired: SettingsDocumentRaw = serde_json::from_str(ADJUST_SETTINGS)?;
    desired.component_mut("web").settings["UriScavengerPeriod"].value = serde_json::json!(300);
    let desired = desired.validate()?;
    let describer = describe_client(&server.url())?;

    let result = do_validate(
        &describer,
        "web",
        &instances()?,
        &desired.component("web").ok_or("missing component")?.settings,
    );

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].instance_id, "1");
    assert!(matches!(
        &result[0].kind,
        MismatchKind::Differs { setting, .. } if setting == "UriScavengerPeriod"
    ));
    assert_eq!(result[1].instance_id, "2");
    assert!(matches!(result[1].kind, MismatchKind::Unavailable { .. }));

    Ok(())
}
