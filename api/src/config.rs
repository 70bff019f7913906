use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Result};
use yaml_rust::YamlLoader;

pub const DEFAULT_MAX_LAYERS: u8 = 16;
pub const DEFAULT_DNS_PORTS: [u16; 3] = [53, 5353, 5355];

#[derive(Clone, Debug)]
pub struct Config {
    /// Recompute and compare embedded checksums
    pub verify_checksums: bool,
    /// Upper bound on decoded layers per frame, stops runaway VLAN/extension header stacks
    pub max_layers: u8,
    /// UDP/TCP ports whose payload is decoded as DNS
    pub dns_ports: Vec<u16>,
    pub doc: Yaml,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            max_layers: DEFAULT_MAX_LAYERS,
            dns_ports: DEFAULT_DNS_PORTS.to_vec(),
            doc: Yaml::default(),
        }
    }
}

impl Config {
    /// Load configuration from a yaml file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("\"{}\" does not exist", path.display()));
        }

        let mut s = String::new();
        File::open(path)?.read_to_string(&mut s)?;
        Self::from_yaml_str(&s)
    }

    /// Load configuration from a yaml document, missing or bad options fall back to defaults
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let docs = YamlLoader::load_from_str(s)?;
        let doc = match docs.into_iter().next() {
            None => return Ok(Self::default()),
            Some(doc) => doc,
        };

        let mut config = Config::default();
        config.doc = Yaml(doc);

        config.verify_checksums = config.get_boolean("dissect.checksum.verify", true);
        config.max_layers =
            config.get_integer("dissect.max.layers", DEFAULT_MAX_LAYERS as i64, 2, 64) as u8;

        let ports = config.get_integer_arr("dissect.dns.ports", 1, u16::MAX as i64);
        if !ports.is_empty() {
            config.dns_ports = ports.into_iter().map(|p| p as u16).collect();
        }

        Ok(config)
    }

    #[inline]
    pub fn is_dns_port(&self, port: u16) -> bool {
        self.dns_ports.contains(&port)
    }

    pub fn get_integer(&self, key: &str, default: i64, min: i64, max: i64) -> i64 {
        get_integer(self.doc.as_ref(), key, default, min, max)
    }

    pub fn get_integer_arr(&self, key: &str, min: i64, max: i64) -> Vec<i64> {
        get_integer_arr(self.doc.as_ref(), key, min, max)
    }

    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        get_boolean(self.doc.as_ref(), key, default)
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
/// Simple wrapper struct to implement Default trait for yaml_rust::Yaml
pub struct Yaml(pub yaml_rust::Yaml);

impl Default for Yaml {
    fn default() -> Self {
        Self(yaml_rust::Yaml::Null)
    }
}

impl AsRef<yaml_rust::Yaml> for Yaml {
    fn as_ref(&self) -> &yaml_rust::Yaml {
        &self.0
    }
}

fn get_boolean(doc: &yaml_rust::Yaml, key: &str, default: bool) -> bool {
    match doc[key] {
        yaml_rust::Yaml::Boolean(b) => b,
        yaml_rust::Yaml::BadValue => {
            log::debug!("Option {} not found, set {} to {}", key, key, default);
            default
        }
        _ => {
            log::warn!(
                "Wrong value type for {}, expecting boolean, set {} to {}",
                key,
                key,
                default
            );
            default
        }
    }
}

fn get_integer(doc: &yaml_rust::Yaml, key: &str, default: i64, min: i64, max: i64) -> i64 {
    match doc[key] {
        yaml_rust::Yaml::Integer(i) => {
            if i < min || i > max {
                log::warn!(
                    "Option {} is less/greater than min/max value {}/{}, set {} to {}",
                    key,
                    min,
                    max,
                    key,
                    default
                );
                default
            } else {
                i
            }
        }
        yaml_rust::Yaml::BadValue => {
            log::debug!("Option {} not found, set {} to {}", key, key, default);
            default
        }
        _ => {
            log::warn!(
                "Wrong value type for {}, expecting integer, set {} to {}",
                key,
                key,
                default
            );
            default
        }
    }
}

fn get_integer_arr(doc: &yaml_rust::Yaml, key: &str, min: i64, max: i64) -> Vec<i64> {
    let mut result = vec![];
    match &doc[key] {
        yaml_rust::Yaml::Array(a) => {
            for element in a {
                match element {
                    yaml_rust::Yaml::Integer(i) if *i >= min && *i <= max => result.push(*i),
                    yaml_rust::Yaml::Integer(i) => log::warn!(
                        "{}'s element {} is out of range {}..={}, ignored",
                        key,
                        i,
                        min,
                        max
                    ),
                    _ => log::warn!("Wrong value type for {}'s element, expecting integer", key),
                }
            }
        }
        yaml_rust::Yaml::BadValue => log::debug!("Option {} not found", key),
        _ => log::warn!("Wrong value type for {}, expecting array", key),
    }
    result
}
