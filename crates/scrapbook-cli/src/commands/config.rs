use std::io::Write;

use scrapbook_core::config::{normalize_base_url, API_URL_ENV};
use scrapbook_core::models::non_blank;

use crate::cli::ConfigCommands;
use crate::commands::common::resolve_client_config;
use crate::config_profiles::{default_config_path, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(
    command: ConfigCommands,
    global_api_url: Option<&str>,
    global_profile: Option<&str>,
    output: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_url,
            no_activate,
        } => {
            let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let path = default_config_path().map_err(CliError::Config)?;
            let api_url = api_url.or_else(|| global_api_url.map(ToString::to_string));
            let profile_name = init_profile(
                &mut config,
                profile.as_deref().or(global_profile),
                api_url,
                no_activate,
            )?;
            config.save_to_path(&path).map_err(CliError::Config)?;
            writeln!(
                output,
                "Profile '{}' initialized at {}",
                profile_name,
                path.display()
            )?;
            Ok(())
        }
        ConfigCommands::Show => {
            let resolved = resolve_client_config(global_api_url, global_profile)?;
            let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
            writeln!(
                output,
                "Profile: {}",
                profiles.resolve_profile_name(global_profile)
            )?;
            writeln!(output, "API URL: {}", resolved.api_base_url)?;
            writeln!(output, "Source:  {}", resolved.source)?;
            if let Ok(path) = default_config_path() {
                writeln!(output, "Config:  {}", path.display())?;
            }
            Ok(())
        }
    }
}

/// Create or update a profile. Without a URL the profile keeps its current
/// one, then takes `SCRAPBOOK_API_URL`.
pub fn init_profile(
    config: &mut CliProfilesConfig,
    profile_name: Option<&str>,
    api_url: Option<String>,
    no_activate: bool,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config
        .profile(&profile_name)
        .and_then(|profile| profile.api_base_url.clone());

    let merged = non_blank(api_url)
        .or(existing)
        .or_else(|| non_blank(std::env::var(API_URL_ENV).ok()));
    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(url) = merged {
        profile.api_base_url = Some(normalize_base_url(&url)?);
    }

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}
