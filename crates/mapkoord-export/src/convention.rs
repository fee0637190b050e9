//! Argument conventions: the ordered invocation shapes tried against the
//! external tool, and their expansion into concrete invocations.

use std::path::{Path, PathBuf};

use mapkoord_core::config::export::{ArgConvention, ExportConfig, LauncherKind};

use crate::error::ExportError;
use crate::locator::ToolInstallation;

/// Placeholder for the source path.
pub const INPUT: &str = "{input}";
/// Placeholder for the destination path.
pub const OUTPUT: &str = "{output}";

/// Built-in conventions, most likely first.
pub fn default_conventions() -> Vec<ArgConvention> {
    let mut conventions = vec![
        ArgConvention::direct("-exportxml", &["-exportxml", INPUT, OUTPUT]),
        ArgConvention::direct("/exportxml", &["/exportxml", INPUT, OUTPUT]),
        ArgConvention::direct("-convertxml", &["-convertxml", INPUT, OUTPUT]),
        ArgConvention::direct("/convertxml", &["/convertxml", INPUT, OUTPUT]),
        ArgConvention::direct("-convert", &["-convert", INPUT, OUTPUT]),
        ArgConvention::direct("/convert", &["/convert", INPUT, OUTPUT]),
        ArgConvention::direct("positional", &[INPUT, OUTPUT]),
    ];

    if cfg!(windows) {
        conventions.push(ArgConvention::powershell(
            "powershell -exportxml",
            &["-exportxml", INPUT, OUTPUT],
        ));
    }

    conventions
}

/// Configured conventions, or the defaults when none are configured.
pub fn effective_conventions(config: &ExportConfig) -> Vec<ArgConvention> {
    if config.conventions.is_empty() {
        default_conventions()
    } else {
        config.conventions.clone()
    }
}

/// Reject conventions that cannot produce a detectable output.
pub fn validate(convention: &ArgConvention) -> Result<(), ExportError> {
    let invalid = |reason: &str| ExportError::InvalidConvention {
        label: convention.label.clone(),
        reason: reason.to_string(),
    };

    if convention.label.trim().is_empty() {
        return Err(invalid("label is empty"));
    }
    if !convention.args.iter().any(|a| a.contains(INPUT)) {
        return Err(invalid("arguments never reference {input}"));
    }
    if !convention.args.iter().any(|a| a.contains(OUTPUT)) {
        return Err(invalid("arguments never reference {output}"));
    }
    if convention.launcher == LauncherKind::Powershell && !cfg!(windows) {
        return Err(invalid("the powershell launcher is only available on Windows"));
    }
    Ok(())
}

/// Substitute template placeholders in arguments.
pub fn substitute_args(templates: &[String], input: &Path, output: &Path) -> Vec<String> {
    let input_str = input.to_string_lossy();
    let output_str = output.to_string_lossy();
    let input_dir = input
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let output_dir = output
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    templates
        .iter()
        .map(|arg| {
            arg.replace("{input_dir}", &input_dir)
                .replace("{output_dir}", &output_dir)
                .replace(INPUT, &input_str)
                .replace(OUTPUT, &output_str)
        })
        .collect()
}

/// A fully expanded process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Label of the convention this came from.
    pub convention: String,
    /// Program to start.
    pub program: PathBuf,
    /// Arguments to pass.
    pub args: Vec<String>,
    /// Working directory (always the tool's own directory).
    pub working_dir: PathBuf,
}

/// Expand a convention for one (tool, source, destination) triple.
pub fn build_invocation(
    convention: &ArgConvention,
    tool: &ToolInstallation,
    input: &Path,
    output: &Path,
) -> Invocation {
    let args = substitute_args(&convention.args, input, output);

    match convention.launcher {
        LauncherKind::Direct => Invocation {
            convention: convention.label.clone(),
            program: tool.executable.clone(),
            args,
            working_dir: tool.working_dir.clone(),
        },
        LauncherKind::Powershell => Invocation {
            convention: convention.label.clone(),
            program: PathBuf::from("powershell"),
            args: vec![
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                start_process_script(tool, &args),
            ],
            working_dir: tool.working_dir.clone(),
        },
    }
}

/// `Start-Process` command that runs the tool hidden and waits for it.
///
/// The started process is stopped if the script is interrupted before it
/// exits.
fn start_process_script(tool: &ToolInstallation, args: &[String]) -> String {
    let arg_list = args
        .iter()
        .map(|a| ps_quote(a))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "$p = Start-Process -FilePath {} -ArgumentList {} -WorkingDirectory {} \
         -WindowStyle Hidden -PassThru; \
         try {{ $p.WaitForExit(); exit $p.ExitCode }} \
         finally {{ if (-not $p.HasExited) {{ Stop-Process -Id $p.Id -Force }} }}",
        ps_quote(&tool.executable.to_string_lossy()),
        arg_list,
        ps_quote(&tool.working_dir.to_string_lossy()),
    )
}

/// Single-quoted PowerShell literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::DiscoveryMethod;

    fn tool() -> ToolInstallation {
        ToolInstallation {
            executable: PathBuf::from("/opt/cw/CodeWalker.exe"),
            working_dir: PathBuf::from("/opt/cw"),
            discovery_method: DiscoveryMethod::ExplicitHint,
        }
    }

    #[test]
    fn test_default_order_starts_with_exportxml() {
        let labels: Vec<_> = default_conventions()
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(
            &labels[..7],
            [
                "-exportxml",
                "/exportxml",
                "-convertxml",
                "/convertxml",
                "-convert",
                "/convert",
                "positional"
            ]
        );
        for convention in default_conventions() {
            assert!(validate(&convention).is_ok(), "{}", convention.label);
        }
    }

    #[test]
    fn test_configured_conventions_replace_defaults() {
        let config = ExportConfig {
            conventions: vec![ArgConvention::direct("new", &["--xml", INPUT, OUTPUT])],
            ..Default::default()
        };
        let conventions = effective_conventions(&config);
        assert_eq!(conventions.len(), 1);
        assert_eq!(conventions[0].label, "new");
    }

    #[test]
    fn test_validate_rejects_missing_output() {
        let convention = ArgConvention::direct("broken", &["-exportxml", INPUT]);
        assert!(matches!(
            validate(&convention),
            Err(ExportError::InvalidConvention { .. })
        ));
    }

    #[test]
    fn test_substitute_args() {
        let args = substitute_args(
            &[
                "-exportxml".to_string(),
                "{input}".to_string(),
                "--dir={output_dir}".to_string(),
                "{output}".to_string(),
            ],
            Path::new("/maps/hills.ymap"),
            Path::new("/tmp/mapkoord/hills.xml"),
        );
        assert_eq!(
            args,
            [
                "-exportxml",
                "/maps/hills.ymap",
                "--dir=/tmp/mapkoord",
                "/tmp/mapkoord/hills.xml"
            ]
        );
    }

    #[test]
    fn test_direct_invocation_runs_in_tool_dir() {
        let convention = ArgConvention::direct("-exportxml", &["-exportxml", INPUT, OUTPUT]);
        let invocation = build_invocation(
            &convention,
            &tool(),
            Path::new("/maps/a.ymap"),
            Path::new("/tmp/a.xml"),
        );
        assert_eq!(invocation.program, PathBuf::from("/opt/cw/CodeWalker.exe"));
        assert_eq!(invocation.working_dir, PathBuf::from("/opt/cw"));
        assert_eq!(invocation.args, ["-exportxml", "/maps/a.ymap", "/tmp/a.xml"]);
    }

    #[test]
    fn test_powershell_invocation_quotes_arguments() {
        let convention = ArgConvention::powershell("ps", &["-exportxml", INPUT, OUTPUT]);
        let invocation = build_invocation(
            &convention,
            &tool(),
            Path::new("/maps/bob's.ymap"),
            Path::new("/tmp/out.xml"),
        );
        assert_eq!(invocation.program, PathBuf::from("powershell"));
        assert_eq!(invocation.args[..3], ["-NoProfile", "-NonInteractive", "-Command"]);
        let script = invocation.args.last().expect("script");
        assert!(script.starts_with("$p = Start-Process -FilePath '/opt/cw/CodeWalker.exe'"));
        assert!(script.contains(
            "-ArgumentList '-exportxml','/maps/bob''s.ymap','/tmp/out.xml' -WorkingDirectory '/opt/cw'"
        ));
        assert!(script.contains("-WindowStyle Hidden -PassThru;"));
        assert!(!script.contains("-Wait "));
        assert!(script.contains("try { $p.WaitForExit(); exit $p.ExitCode }"));
        assert!(script.ends_with(
            "finally { if (-not $p.HasExited) { Stop-Process -Id $p.Id -Force } }"
        ));
    }
}
