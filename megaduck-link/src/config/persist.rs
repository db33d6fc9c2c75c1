//! Postcard persistence for link configuration

use super::types::{ConfigError, LinkConfig};

/// Upper bound on the encoded size of a [`LinkConfig`]
pub const MAX_ENCODED_LEN: usize = 32;

impl LinkConfig {
    /// Encode into `buf`, returning the used prefix
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encoding)
    }

    /// Decode and validate a persisted configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: LinkConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Encoding)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CountdownPolicy, HandshakeConfig, ReplyWait, RetryPolicy};

    #[test]
    fn test_persisted_config_survives_reload() {
        let config = LinkConfig {
            poll_interval_micros: 25,
            handshake: HandshakeConfig {
                reply_wait: ReplyWait::Bounded(5),
                countdown: CountdownPolicy::StopAtFirstMismatch,
                retry: RetryPolicy::Attempts(3),
            },
            ..LinkConfig::default()
        };

        let mut buf = [0u8; MAX_ENCODED_LEN];
        let used = config.to_slice(&mut buf).unwrap().len();
        assert_eq!(LinkConfig::from_bytes(&buf[..used]), Ok(config));
    }

    #[test]
    fn test_invalid_persisted_config_rejected() {
        let config = LinkConfig {
            unit_micros: 0,
            ..LinkConfig::default()
        };
        let mut buf = [0u8; MAX_ENCODED_LEN];
        let used = config.to_slice(&mut buf).unwrap().len();
        assert_eq!(
            LinkConfig::from_bytes(&buf[..used]),
            Err(ConfigError::ZeroUnit)
        );
        assert_eq!(LinkConfig::from_bytes(&[]), Err(ConfigError::Encoding));
    }
}
