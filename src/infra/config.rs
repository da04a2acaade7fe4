//! Configuration management infrastructure.
//!
//! This module provides configuration file support: default algorithms for
//! each operation, the link segment policy and which XAdES properties are
//! added to XML signatures.

use crate::domain::types::{
    EcdsaEncoding, ExtraSegmentPolicy, LinkSignatureAlgorithm, XmlSignatureAlgorithm,
};
use crate::infra::error::{ServiceError, ServiceResult};
use crate::services::xml_signer::XmlSigningOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfiguration {
    /// Algorithm used by XML signing when the request names none
    pub default_xml_algorithm: String,

    /// Algorithm used by link signing when the request names none
    pub default_link_algorithm: String,

    /// ECDSA signature encoding for links when the request names none
    pub default_ecdsa_encoding: String,

    /// `truncate` or `reject` links with more than the signed segments
    pub extra_link_segments: String,

    /// Whether to show verbose output
    pub verbose: bool,

    /// XAdES signed properties
    pub xades: XadesConfig,
}

/// XAdES enrichment switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XadesConfig {
    pub signing_time: bool,
    pub signing_certificate: bool,
}

impl Default for ServiceConfiguration {
    fn default() -> Self {
        Self {
            default_xml_algorithm: XmlSignatureAlgorithm::default().as_str().to_string(),
            default_link_algorithm: LinkSignatureAlgorithm::default().as_str().to_string(),
            default_ecdsa_encoding: EcdsaEncoding::default().as_str().to_string(),
            extra_link_segments: ExtraSegmentPolicy::default().as_str().to_string(),
            verbose: false,
            xades: XadesConfig::default(),
        }
    }
}

impl Default for XadesConfig {
    fn default() -> Self {
        Self {
            signing_time: true,
            signing_certificate: true,
        }
    }
}

impl ServiceConfiguration {
    pub fn xml_algorithm(&self) -> ServiceResult<XmlSignatureAlgorithm> {
        self.default_xml_algorithm.parse()
    }

    pub fn link_algorithm(&self) -> ServiceResult<LinkSignatureAlgorithm> {
        self.default_link_algorithm.parse()
    }

    pub fn ecdsa_encoding(&self) -> ServiceResult<EcdsaEncoding> {
        self.default_ecdsa_encoding.parse()
    }

    pub fn segment_policy(&self) -> ServiceResult<ExtraSegmentPolicy> {
        self.extra_link_segments.parse()
    }

    #[must_use]
    pub fn xml_signing_options(&self) -> XmlSigningOptions {
        XmlSigningOptions {
            signing_time: self.xades.signing_time,
            signing_certificate: self.xades.signing_certificate,
        }
    }

    /// Check every named value parses.
    pub fn validate(&self) -> ServiceResult<()> {
        self.xml_algorithm()?;
        self.link_algorithm()?;
        self.ecdsa_encoding()?;
        self.segment_policy()?;
        Ok(())
    }
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> ServiceResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> ServiceResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("ksef-signer").join("config.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("ksef-signer-config.toml"))
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> ServiceResult<ServiceConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = ServiceConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file, or the defaults when there is none
    pub fn load_or_default(&self) -> ServiceResult<ServiceConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "No configuration at {}, using defaults",
                self.config_path.display()
            );
            Ok(ServiceConfiguration::default())
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> ServiceResult<ServiceConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            ServiceError::Io(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: ServiceConfiguration = toml::from_str(&content).map_err(|e| {
            ServiceError::Configuration(format!("Failed to parse config file: {e}"))
        })?;

        self.validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &ServiceConfiguration) -> ServiceResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ServiceError::Io(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            ServiceError::Configuration(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            ServiceError::Io(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        log::info!("Configuration saved successfully");
        Ok(())
    }

    /// Validate configuration values
    fn validate_config(&self, config: &ServiceConfiguration) -> ServiceResult<()> {
        config.validate().map_err(|e| match e {
            ServiceError::Configuration(msg) => ServiceError::Configuration(format!(
                "{} in {}",
                msg,
                self.config_path.display()
            )),
            other => other,
        })
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> ServiceResult<()> {
        let mut config = self.load_or_default()?;

        match key {
            "default_xml_algorithm" => {
                config.default_xml_algorithm = value.parse::<XmlSignatureAlgorithm>()?.as_str().to_string();
            }
            "default_link_algorithm" => {
                config.default_link_algorithm =
                    value.parse::<LinkSignatureAlgorithm>()?.as_str().to_string();
            }
            "default_ecdsa_encoding" => {
                config.default_ecdsa_encoding = value.parse::<EcdsaEncoding>()?.as_str().to_string();
            }
            "extra_link_segments" => {
                config.extra_link_segments = value.parse::<ExtraSegmentPolicy>()?.as_str().to_string();
            }
            "xades.signing_time" => config.xades.signing_time = parse_bool(value)?,
            "xades.signing_certificate" => config.xades.signing_certificate = parse_bool(value)?,
            "verbose" => config.verbose = parse_bool(value)?,
            _ => {
                return Err(ServiceError::Configuration(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

fn parse_bool(value: &str) -> ServiceResult<bool> {
    value
        .trim()
        .parse()
        .map_err(|_| ServiceError::Configuration(format!("Invalid boolean value: {value}")))
}
