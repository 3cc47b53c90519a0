use std::sync::Once;
use env_logger::{Builder, Env, WriteStyle};
use log::LevelFilter;

const ENGINE_TARGET: &str = "scene_engine";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for the editor's own records (commits, undo/redo, template loads).
    pub engine_level: LevelFilter,
    /// Level for every other target, e.g. the image decoders.
    pub default_level: LevelFilter,
    /// Appended after the defaults, `env_logger` syntax: `"scene_engine::history=trace"`.
    pub directives: Option<String>,
    pub write_style: WriteStyle,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            engine_level: LevelFilter::Info,
            default_level: LevelFilter::Warn,
            directives: None,
            write_style: WriteStyle::Auto,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Debug output for the editor: every commit and history step.
    pub fn verbose() -> Self {
        Self { engine_level: LevelFilter::Debug, ..Self::default() }
    }

    /// The filter used when `RUST_LOG` is unset.
    pub fn filter(&self) -> String {
        let mut filter = format!(
            "{},{}={}",
            self.default_level.to_string().to_lowercase(),
            ENGINE_TARGET,
            self.engine_level.to_string().to_lowercase(),
        );
        if let Some(extra) = self.directives.as_deref().filter(|d| !d.trim().is_empty()) {
            filter.push(',');
            filter.push_str(extra.trim());
        }
        filter
    }
}

static INIT: Once = Once::new();

/// Installs the global logger on first call. `RUST_LOG` wins over the
/// configured filter. Returns whether this call installed it; a host that set
/// up its own logger keeps it.
pub fn init_logging(config: LoggingConfig) -> bool {
    let mut installed = false;
    INIT.call_once(|| {
        let mut builder = Builder::from_env(Env::default().default_filter_or(config.filter()));
        builder.write_style(config.write_style);
        if !config.timestamps {
            builder.format_timestamp(None);
        }
        installed = builder.try_init().is_ok();
        if installed {
            log::debug!("logging initialized: {}", config.filter());
        }
    });
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_scopes_the_engine() {
        assert_eq!(LoggingConfig::default().filter(), "warn,scene_engine=info");
        assert_eq!(LoggingConfig::verbose().filter(), "warn,scene_engine=debug");
        let config = LoggingConfig { directives: Some(" scene_engine::history=trace ".to_string()), ..LoggingConfig::default() };
        assert_eq!(config.filter(), "warn,scene_engine=info,scene_engine::history=trace");
    }

    #[test]
    fn only_the_first_call_installs() {
        init_logging(LoggingConfig { timestamps: false, ..LoggingConfig::default() });
        assert!(!init_logging(LoggingConfig::verbose()));
    }
}
