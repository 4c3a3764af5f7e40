//! Dump session configuration

use crate::channel::Port;

/// Settings for one dump session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    /// Controller port the pak is plugged into
    pub port: Port,
    /// Log a progress line every this many pages; 0 disables the lines
    pub progress_interval: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            port: Port::FIRST,
            progress_interval: 8,
        }
    }
}

impl DumpConfig {
    /// Use a different controller port
    pub fn with_port(mut self, port: Port) -> Self {
        self.port = port;
        self
    }

    /// Change the progress log cadence
    pub fn with_progress_interval(mut self, pages: usize) -> Self {
        self.progress_interval = pages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let port = Port::new(2).unwrap();
        let config = DumpConfig::default()
            .with_port(port)
            .with_progress_interval(0);
        assert_eq!(config.port, port);
        assert_eq!(config.progress_interval, 0);
        assert_eq!(DumpConfig::default().port, Port::FIRST);
        assert_eq!(DumpConfig::default().progress_interval, 8);
    }
}
