//! Configuration and saved-settings commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use mapkoord_core::config::AppConfig;
use mapkoord_core::error::AppError;
use mapkoord_core::settings::UserSettings;
use mapkoord_export::ToolLocator;
use mapkoord_export::locator::TOOL_FILE_NAME;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration and saved settings
    Show,
    /// Remember the CodeWalker location (prompts if no path is given)
    SetTool {
        /// Path to CodeWalker.exe or its folder
        path: Option<PathBuf>,
    },
    /// Forget the saved CodeWalker location
    ClearTool,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let settings_path = config.effective_settings_path();

    match &args.command {
        ConfigCommand::Show => {
            let settings = UserSettings::load(&settings_path);
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "config": config,
                    "settings_path": settings_path,
                    "settings": settings,
                })),
                OutputFormat::Table => {
                    output::print_kv("Settings file", &settings_path.display().to_string());
                    output::print_kv(
                        "Saved CodeWalker",
                        &settings
                            .codewalker_path
                            .as_ref()
                            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
                    );
                    output::print_kv(
                        "Attempt timeout",
                        &format!("{}s", config.export.attempt_timeout_seconds),
                    );
                    output::print_kv("Output location", &format!("{:?}", config.export.output_location));
                    output::print_kv(
                        "Position tags",
                        &config.extract.position_tags.join(", "),
                    );
                    output::print_kv(
                        "Container tags",
                        &config.extract.container_tags.join(", "),
                    );
                    output::print_kv("Log level", &config.logging.level);
                }
            }
        }
        ConfigCommand::SetTool { path } => {
            let path = match path {
                Some(p) => p.clone(),
                None => {
                    let input: String = dialoguer::Input::new()
                        .with_prompt(format!("Path to {}", TOOL_FILE_NAME))
                        .interact_text()
                        .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;
                    PathBuf::from(input.trim().trim_matches('"'))
                }
            };

            let tool = ToolLocator::new(TOOL_FILE_NAME)
                .resolve_hint(&path)
                .ok_or_else(|| {
                    AppError::not_found(format!(
                        "No {} at '{}'. Point to the executable or the folder containing it.",
                        TOOL_FILE_NAME,
                        path.display()
                    ))
                })?;

            let settings = UserSettings {
                codewalker_path: Some(tool.executable.clone()),
            };
            settings.save(&settings_path)?;
            output::print_success(&format!(
                "CodeWalker location saved: {}",
                tool.executable.display()
            ));
        }
        ConfigCommand::ClearTool => {
            let mut settings = UserSettings::load(&settings_path);
            if settings.codewalker_path.take().is_none() {
                output::print_warning("No CodeWalker location was saved");
                return Ok(());
            }
            settings.save(&settings_path)?;
            output::print_success("Saved CodeWalker location cleared");
        }
    }

    Ok(())
}
