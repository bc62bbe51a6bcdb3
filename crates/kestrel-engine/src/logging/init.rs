use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` provides one.
///
/// wgpu's backend crates are chatty at info level.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "kestrel_engine=debug,wgpu=warn") and takes precedence over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Filter string that will be applied, given the `RUST_LOG` value.
    pub fn resolve_filter(&self, rust_log: Option<&str>) -> String {
        self.env_filter
            .as_deref()
            .or(rust_log.filter(|s| !s.trim().is_empty()))
            .unwrap_or(DEFAULT_FILTER)
            .to_string()
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = config.resolve_filter(rust_log.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);
        builder.format_timestamp_millis();

        if builder.try_init().is_err() {
            // Someone else installed a logger first; keep theirs.
            return;
        }
        log::debug!("logging initialized ({filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let cfg = LoggingConfig {
            env_filter: Some("debug".into()),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_filter(Some("warn")), "debug");
    }

    #[test]
    fn rust_log_used_when_unset() {
        assert_eq!(LoggingConfig::default().resolve_filter(Some("trace")), "trace");
    }

    #[test]
    fn falls_back_to_default_filter() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.resolve_filter(None), DEFAULT_FILTER);
        assert_eq!(cfg.resolve_filter(Some("  ")), DEFAULT_FILTER);
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
