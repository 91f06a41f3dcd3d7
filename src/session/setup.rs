//! Session setup and initialization

use crate::config::Config;
use crate::dispatch::ViewState;
use crate::environment::Environment;
use crate::model::{DisplayMode, Pollutant, Region};
use crate::network::{FetchSettings, NetworkClient};
use crate::openaq::OpenAqClient;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Command-line choices that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub region: Option<Region>,
    pub pollutant: Option<Pollutant>,
    pub display_mode: Option<DisplayMode>,
    pub api_key: Option<String>,
}

/// Session data for both TUI and headless modes
pub struct SessionData {
    pub environment: Environment,
    /// Client shared by every fetch of the session
    pub network: NetworkClient,
    /// Initial region, pollutant and display mode
    pub view: ViewState,
}

/// API key from the command line, then `OPENAQ_API_KEY`, then the config file.
pub fn resolve_api_key(
    cli: Option<String>,
    from_env: Option<String>,
    config: &Config,
) -> Option<String> {
    let non_empty = |key: &String| !key.trim().is_empty();
    cli.filter(non_empty)
        .or_else(|| from_env.filter(non_empty))
        .or_else(|| config.api_key.clone().filter(non_empty))
}

/// Sets up a dashboard session
///
/// Resolves the configuration against the command line and environment,
/// creates the HTTP client and returns the initial dashboard view.
///
/// # Returns
/// * `Ok(SessionData)` - Successfully set up session
/// * `Err` - The HTTP client could not be created
pub fn setup_session(
    config: &Config,
    environment: Environment,
    options: SessionOptions,
) -> Result<SessionData, Box<dyn Error>> {
    let api_key = resolve_api_key(
        options.api_key,
        std::env::var("OPENAQ_API_KEY").ok(),
        config,
    );
    log::debug!(
        "Using {:?}, API key {}",
        environment,
        if api_key.is_some() { "set" } else { "not set" }
    );

    let api = OpenAqClient::new(
        environment.clone(),
        api_key,
        Duration::from_secs(config.request_timeout_secs.max(1)),
    )?;
    let network = NetworkClient::new(Arc::new(api), FetchSettings::from_config(config));

    let view = ViewState::new(
        options.region.unwrap_or(config.region),
        options.pollutant.unwrap_or(config.pollutant),
        options.display_mode.unwrap_or(config.display_mode),
    );

    Ok(SessionData {
        environment,
        network,
        view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_precedence() {
        let config = Config {
            api_key: Some("from-config".to_string()),
            ..Config::default()
        };
        assert_eq!(
            resolve_api_key(Some("cli".to_string()), Some("env".to_string()), &config).as_deref(),
            Some("cli")
        );
        assert_eq!(
            resolve_api_key(None, Some("env".to_string()), &config).as_deref(),
            Some("env")
        );
        assert_eq!(
            resolve_api_key(None, None, &config).as_deref(),
            Some("from-config")
        );
        assert_eq!(resolve_api_key(Some(" ".to_string()), None, &Config::default()), None);
    }

    #[test]
    fn blank_keys_fall_through_to_the_next_source() {
        let config = Config {
            api_key: Some("from-config".to_string()),
            ..Config::default()
        };
        assert_eq!(
            resolve_api_key(None, Some(String::new()), &config).as_deref(),
            Some("from-config")
        );
        assert_eq!(
            resolve_api_key(Some("  ".to_string()), Some("env".to_string()), &config).as_deref(),
            Some("env")
        );
    }

    #[test]
    fn command_line_overrides_config() {
        let config = Config {
            region: Region::Asia,
            pollutant: Pollutant::Pm10,
            ..Config::default()
        };
        let options = SessionOptions {
            region: Some(Region::Europe),
            ..SessionOptions::default()
        };
        let session = setup_session(&config, Environment::Production, options).unwrap();
        assert_eq!(session.view.region, Region::Europe);
        assert_eq!(session.view.pollutant, Pollutant::Pm10);
        assert_eq!(session.view.viewport, Region::Europe.viewport());
    }
}
