mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{FeedsSettings, IntakeSettings, Settings};

/// Loads the configuration from the optional `config/default` file and
/// environment variables, then merges it over the defaults.
///
/// Environment keys split on `_`, so `PORT` sets `port` and `FEEDS_PORT`
/// sets `feeds.port`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    let feeds = partial.feeds.as_ref();
    let intake = partial.intake.as_ref();

    Ok(Settings {
        bind: partial.bind.unwrap_or(default.bind),
        port: partial.port.unwrap_or(default.port),
        feeds: FeedsSettings {
            port: feeds.and_then(|f| f.port).unwrap_or(default.feeds.port),
            heartbeat: feeds
                .and_then(|f| f.heartbeat)
                .unwrap_or(default.feeds.heartbeat),
            buffer: feeds.and_then(|f| f.buffer).unwrap_or(default.feeds.buffer),
        },
        intake: IntakeSettings {
            action: intake
                .and_then(|i| i.action.clone())
                .unwrap_or(default.intake.action),
            redirect: intake
                .and_then(|i| i.redirect.clone())
                .unwrap_or(default.intake.redirect),
        },
    })
}
