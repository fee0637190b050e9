//! Integration tests for the `mapkoord` binary.

use crate::helpers::{self, BINARY_ASSET, DUPLICATE_DOC, TestEnv};

#[test]
fn test_process_xml_source_prints_report() {
    let env = TestEnv::new("");
    let source = env.write("hills.ymap.xml", DUPLICATE_DOC.as_bytes());

    let out = env.run(&["process", &helpers::arg(&source)]);

    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert_eq!(
        out.stdout,
        format!(
            "XML: {}\nSource was already XML; no conversion needed.\n\nx=1.0000, y=2.0000, z=3.0000\n",
            source.display()
        )
    );
}

#[test]
fn test_extract_json_output() {
    let env = TestEnv::new("");
    let source = env.write(
        "many.xml",
        br#"<CMapData><entities>
             <Item><position x="0" y="0" z="0"/></Item>
             <Item><position x="10" y="20" z="30"/></Item>
             <Item><position x="1" y="2" z="abc"/></Item>
           </entities></CMapData>"#,
    );

    let out = env.run(&["--format", "json", "extract", &helpers::arg(&source)]);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);

    let json: serde_json::Value = serde_json::from_str(&out.stdout).expect("valid JSON");
    assert_eq!(json["coordinates"].as_array().expect("array").len(), 2);
    assert_eq!(json["summary"]["kind"], "many");
    assert_eq!(json["summary"]["count"], 2);
    assert_eq!(json["skipped"].as_array().expect("array").len(), 2);
}

#[test]
fn test_extract_list_shows_table() {
    let env = TestEnv::new("");
    let source = env.write("one.xml", DUPLICATE_DOC.as_bytes());

    let out = env.run(&["extract", &helpers::arg(&source), "--list"]);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert!(out.stdout.starts_with("x=1.0000, y=2.0000, z=3.0000\n"));
    assert!(out.stdout.contains("1.0000"));
    assert!(out.stdout.contains('#'));
}

#[test]
fn test_empty_document() {
    let env = TestEnv::new("");
    let source = env.write("empty.xml", b"<CMapData><entities/></CMapData>");

    let out = env.run(&["extract", &helpers::arg(&source)]);
    assert_eq!(out.code, Some(0));
    assert_eq!(out.stdout, "No coordinates found.\n");
}

#[test]
fn test_missing_file_exits_with_error() {
    let env = TestEnv::new("");
    let out = env.run(&["process", "does-not-exist.ymap"]);

    assert_eq!(out.code, Some(1));
    assert!(out.stderr.starts_with("Error: NOT_FOUND"), "stderr: {}", out.stderr);
}

#[test]
fn test_binary_without_tool_gives_guidance() {
    let env = TestEnv::new("");
    let source = env.write("hills.ymap", BINARY_ASSET);

    let out = env.run(&["process", &helpers::arg(&source)]);
    assert_eq!(out.code, Some(1));
    assert!(out.stderr.contains("config set-tool"), "stderr: {}", out.stderr);
    assert!(out.stderr.contains("CODEWALKER_PATH"));
}

#[test]
fn test_malformed_xml_exits_with_parse_error() {
    let env = TestEnv::new("");
    let source = env.write("broken.xml", b"<CMapData><entities></CMapData>");

    let out = env.run(&["extract", &helpers::arg(&source)]);
    assert_eq!(out.code, Some(1));
    assert!(out.stderr.contains("Malformed XML"), "stderr: {}", out.stderr);
}

#[test]
fn test_set_locate_and_clear_tool() {
    let env = TestEnv::new("");
    let tool_dir = env.fake_tool_dir();

    let out = env.run(&["config", "set-tool", &helpers::arg(&tool_dir)]);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);

    let saved: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(&env.settings_path).expect("settings written"),
    )
    .expect("settings JSON");
    let saved_path = saved["codewalker_path"].as_str().expect("path saved");
    assert!(saved_path.ends_with("CodeWalker.exe"));

    let out = env.run(&["--format", "json", "locate"]);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    let located: serde_json::Value = serde_json::from_str(&out.stdout).expect("JSON");
    assert_eq!(located["executable"], saved_path);
    assert_eq!(located["discovery_method"], "explicit_hint");

    let out = env.run(&["config", "clear-tool"]);
    assert_eq!(out.code, Some(0));
    let cleared = std::fs::read_to_string(&env.settings_path).expect("settings");
    assert!(cleared.contains("null"));

    let out = env.run(&["config", "clear-tool"]);
    assert_eq!(out.code, Some(0));
    assert!(out.stderr.contains("No CodeWalker location was saved"));
}

#[test]
fn test_set_tool_rejects_missing_path() {
    let env = TestEnv::new("");
    let out = env.run(&["config", "set-tool", "/nonexistent/CodeWalker.exe"]);
    assert_eq!(out.code, Some(1));
    assert!(!env.settings_path.exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let env = TestEnv::new("attempt_timeout_seconds = 0");
    let source = env.write("hills.xml", DUPLICATE_DOC.as_bytes());

    let out = env.run(&["process", &helpers::arg(&source)]);
    assert_eq!(out.code, Some(1));
    assert!(out.stderr.contains("VALIDATION"), "stderr: {}", out.stderr);
}

#[cfg(unix)]
#[test]
fn test_process_binary_with_shell_tool() {
    let env = TestEnv::new(
        r#"
[[export.conventions]]
label = "rejects"
args = ["-c", "echo 'unknown option' >&2; exit 3", "sh", "{input}", "{output}"]

[[export.conventions]]
label = "writes"
args = ["-c", 'printf "<CMapData><Item><position x=\"5\" y=\"6\" z=\"7\"/></Item></CMapData>" > "$2"', "sh", "{input}", "{output}"]
"#,
    );
    let source = env.write("hills.ymap", BINARY_ASSET);

    let out = env.run(&["process", &helpers::arg(&source), "--tool", "/bin/sh"]);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);

    let expected_xml = env.temp.path().join("out").join("hills.xml");
    assert!(out.stdout.starts_with(&format!("XML: {}\n", expected_xml.display())));
    assert!(out.stdout.contains("Binary map asset exported to XML via CodeWalker (writes)."));
    assert!(out.stdout.ends_with("x=5.0000, y=6.0000, z=7.0000\n"));
}
