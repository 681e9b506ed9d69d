// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::LoggingConfig;
use anyhow::Result;

/// The configuration for the current process.
/// Build it with `cliutil::ConfigBuilder::new().<field>(...).build()`.
pub struct ConfigBuilder {
    logging: Option<LoggingConfig>,

    log_command_line: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            logging: None,
            log_command_line: true,
        }
    }

    /// Overrides the logging config. If this isn't called, it defaults to
    /// `LoggingConfig::from_env()`, or to no logging at all if the environment
    /// asks for something impossible.
    pub fn logging(mut self, cfg: LoggingConfig) -> Self {
        self.logging = Some(cfg);
        self
    }

    /// `enable` controls whether to log the command-line of the current process.
    pub fn log_command_line(mut self, enable: bool) -> Self {
        self.log_command_line = enable;
        self
    }

    /// Builds a Config suitable for use with cli_main.
    pub fn build(self) -> Config {
        let logging = match self.logging {
            Some(logging) => logging,
            None => or_disabled(LoggingConfig::from_env()),
        };
        Config {
            logging,
            log_command_line: self.log_command_line,
        }
    }
}

// The wrapped program must start even if logging can't be configured.
fn or_disabled(logging: Result<LoggingConfig>) -> LoggingConfig {
    logging.unwrap_or_else(|e| {
        eprintln!("WARNING: logging disabled: {e:#}");
        LoggingConfig::disabled()
    })
}

/// A POD struct containing the configs, after applying any defaults for unset values.
pub struct Config {
    pub(crate) logging: LoggingConfig,
    pub(crate) log_command_line: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config() {
        let config = ConfigBuilder::new()
            .logging(LoggingConfig::disabled())
            .log_command_line(false)
            .build();
        assert!(!config.log_command_line);
        assert!(config.logging.log_file.is_none());
        assert!(config.logging.console_logger.is_none());
    }

    #[test]
    fn invalid_logging_config_disables_logging() {
        let logging = or_disabled(Err(anyhow::anyhow!(
            "You can't have both KICKSTART_LOG_FILE and KICKSTART_LOG_DIR set"
        )));
        assert!(logging.log_file.is_none());
        assert!(logging.console_logger.is_none());
    }
}
