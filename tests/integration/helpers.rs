//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Map document whose single position is reachable by both extraction passes.
pub const DUPLICATE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CMapData>
  <name>hills</name>
  <entities>
    <Item type="CEntityDef">
      <archetypeName>prop_bench_01a</archetypeName>
      <position x="1.0" y="2.0" z="3.0"/>
      <rotation x="0" y="0" z="0" w="1"/>
    </Item>
  </entities>
</CMapData>"#;

/// Start of a binary resource file.
pub const BINARY_ASSET: &[u8] = b"RSC7\x2d\x00\x00\x00\x01\x02\x03\x04binary";

/// Scratch workspace with its own config and settings file.
pub struct TestEnv {
    /// Scratch directory
    pub temp: tempfile::TempDir,
    /// Config file passed with `--config`
    pub config_path: PathBuf,
    /// Settings file referenced by the config
    pub settings_path: PathBuf,
}

/// Captured result of one CLI run
pub struct CliOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl TestEnv {
    /// Create an environment with `extra` appended to the base config.
    pub fn new(extra: &str) -> Self {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let settings_path = temp.path().join("settings").join("settings.json");
        let config_path = temp.path().join("mapkoord.toml");

        let config = format!(
            "settings_path = '{}'\n\n[export]\ntemp_root = '{}'\npoll_interval_ms = 20\ngrace_period_ms = 200\nmin_output_bytes = 10\n{}\n",
            settings_path.display(),
            temp.path().join("out").display(),
            extra
        );
        std::fs::write(&config_path, config).expect("Failed to write config");

        Self {
            temp,
            config_path,
            settings_path,
        }
    }

    /// Write a file into the scratch directory.
    pub fn write(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.temp.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create dir");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Create a stand-in `CodeWalker.exe` and return its folder.
    pub fn fake_tool_dir(&self) -> PathBuf {
        let exe = self.write("tools/CodeWalker/CodeWalker.exe", b"MZ");
        exe.parent().expect("tool dir").to_path_buf()
    }

    /// Load the environment's config through the library.
    pub fn config(&self) -> mapkoord_core::config::AppConfig {
        mapkoord_core::config::AppConfig::load(&self.config_path.to_string_lossy())
            .expect("Failed to load test config")
    }

    /// Run the CLI binary.
    pub fn run(&self, args: &[&str]) -> CliOutput {
        let output = Command::new(env!("CARGO_BIN_EXE_mapkoord"))
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .current_dir(self.temp.path())
            .env_remove("CODEWALKER_PATH")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run mapkoord");

        CliOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Path as a CLI argument.
pub fn arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
