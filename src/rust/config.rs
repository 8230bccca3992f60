// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::config::TcpConfig,
};
use ::libc::EINVAL;
use ::std::{
    fs,
    str::FromStr,
    time::Duration,
};
use ::yaml_rust::{
    Yaml,
    YamlLoader,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Configuration file.
///
/// ```yaml
/// tcp:
///   initial_rto_ms: 1000
///   max_payload_size: 1000
///   stream_capacity: 64000
///   max_retransmissions: 8
/// ```
///
/// Every key is optional and falls back to the [TcpConfig] default.
#[derive(Clone, Debug)]
pub struct Config {
    config_obj: Yaml,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Config {
    /// Reads a configuration file.
    pub fn new(config_path: &str) -> Result<Self, Fail> {
        let config_s: String = fs::read_to_string(config_path)?;
        let config: Self = config_s.parse()?;
        info!("new(): loaded configuration from {}", config_path);
        Ok(config)
    }

    /// Builds the TCP configuration described by the `tcp` section.
    pub fn tcp_config(&self) -> Result<TcpConfig, Fail> {
        let tcp: &Yaml = &self.config_obj["tcp"];
        match tcp {
            Yaml::Hash(_) | Yaml::BadValue => (),
            _ => return Err(Fail::new(EINVAL, "tcp section must be a map")),
        }

        let initial_rto: Option<Duration> = Self::get_positive_integer(tcp, "initial_rto_ms")?.map(Duration::from_millis);
        let max_payload_size: Option<usize> = match Self::get_positive_integer(tcp, "max_payload_size")? {
            Some(value) => Some(usize::try_from(value).map_err(|_| Fail::new(EINVAL, "max_payload_size is too large"))?),
            None => None,
        };
        let stream_capacity: Option<u64> = Self::get_positive_integer(tcp, "stream_capacity")?;
        let max_retransmissions: Option<u32> = match Self::get_positive_integer(tcp, "max_retransmissions")? {
            Some(value) => Some(u32::try_from(value).map_err(|_| Fail::new(EINVAL, "max_retransmissions is too large"))?),
            None => None,
        };

        let config: TcpConfig = TcpConfig::new(initial_rto, max_payload_size, stream_capacity, max_retransmissions);
        debug!("tcp_config(): {:?}", config);
        Ok(config)
    }

    /// Reads an optional positive integer from a map.
    fn get_positive_integer(obj: &Yaml, key: &str) -> Result<Option<u64>, Fail> {
        match &obj[key] {
            Yaml::BadValue => Ok(None),
            Yaml::Integer(value) if *value > 0 => Ok(Some(*value as u64)),
            _ => {
                let cause: String = format!("{} must be a positive integer", key);
                Err(Fail::new(EINVAL, &cause))
            },
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

/// Parses a configuration from YAML text.
impl FromStr for Config {
    type Err = Fail;

    fn from_str(config_s: &str) -> Result<Self, Fail> {
        let mut config: Vec<Yaml> = YamlLoader::load_from_str(config_s).map_err(|e| {
            let cause: String = format!("malformed configuration ({})", e);
            Fail::new(EINVAL, &cause)
        })?;
        if config.len() != 1 {
            return Err(Fail::new(EINVAL, "wrong number of config objects"));
        }
        Ok(Self {
            config_obj: config.remove(0),
        })
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
