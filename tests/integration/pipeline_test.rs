//! Integration tests for the library pipeline wired from configuration.

use std::time::{Duration, Instant};

use mapkoord_core::error::ErrorKind;
use mapkoord_core::settings::UserSettings;
use mapkoord_export::Provenance;
use mapkoord_service::{Pipeline, PipelineRequest};

use crate::helpers::{BINARY_ASSET, DUPLICATE_DOC, TestEnv};

#[tokio::test]
async fn test_xml_passthrough_from_config() {
    let env = TestEnv::new("");
    let source = env.write("hills.ymap", DUPLICATE_DOC.as_bytes());

    let pipeline = Pipeline::from_config(&env.config());
    let report = pipeline
        .process(&PipelineRequest::new(&source))
        .await
        .expect("process");

    assert_eq!(report.xml_path, source);
    assert_eq!(report.provenance, Provenance::AlreadyXml);
    assert_eq!(report.summary.to_string(), "x=1.0000, y=2.0000, z=3.0000");
}

#[tokio::test]
async fn test_saved_settings_feed_tool_resolution() {
    let env = TestEnv::new("");
    let tool_dir = env.fake_tool_dir();
    UserSettings {
        codewalker_path: Some(tool_dir.clone()),
    }
    .save(&env.settings_path)
    .expect("save settings");

    let pipeline = Pipeline::from_config(&env.config());
    let tool = pipeline.locate(None).expect("tool from saved settings");
    assert_eq!(tool.working_dir, tool_dir);
}

#[tokio::test]
async fn test_corrupt_settings_are_ignored() {
    let env = TestEnv::new("");
    env.write("settings/settings.json", b"{ not json");

    let pipeline = Pipeline::from_config(&env.config());
    let err = pipeline.locate(None).expect_err("nothing to find");
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[cfg(unix)]
#[tokio::test]
async fn test_hanging_tool_times_out_and_is_terminated() {
    let env = TestEnv::new(
        r#"attempt_timeout_seconds = 1

[[export.conventions]]
label = "hangs"
args = ["-c", "exec sleep 30", "sh", "{input}", "{output}"]
"#,
    );
    let source = env.write("hills.ymap", BINARY_ASSET);

    let pipeline = Pipeline::from_config(&env.config());
    let started = Instant::now();
    let err = pipeline
        .process(
            &PipelineRequest::new(&source).with_tool_hint(Some("/bin/sh".into())),
        )
        .await
        .expect_err("must time out");

    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!env.temp.path().join("out").join("hills.xml").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_exit_zero_without_output_is_failure() {
    let env = TestEnv::new(
        r#"
[[export.conventions]]
label = "noop"
args = ["-c", "echo done; exit 0", "sh", "{input}", "{output}"]
"#,
    );
    let source = env.write("hills.ymap", BINARY_ASSET);

    let pipeline = Pipeline::from_config(&env.config());
    let err = pipeline
        .export(&PipelineRequest::new(&source).with_tool_hint(Some("/bin/sh".into())))
        .await
        .expect_err("no output");

    assert_eq!(err.kind, ErrorKind::ExternalTool);
    assert!(err.message.contains("done"));
}
