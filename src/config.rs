//! # Configuration Module
//!
//! Resolves the mapper configuration from a parameter store once at startup.
//!
//! ## Parameters
//!
//! | Key | Type | Default | Meaning |
//! |-----|------|---------|---------|
//! | `scale_linear` | float | 1.0 | Multiplier for forward speed |
//! | `scale_angular` | float | 1.0 | Multiplier for turn rate |
//! | `left_vert_axis` | int | 1 | Axis driving forward speed |
//! | `right_horiz_axis` | int | 2 | Axis driving turn rate |
//! | `left_trigger` | int | 3 | Axis driving the digger drum |
//! | `right_trigger` | int | 4 | Axis driving the linear actuator |
//! | `start_button` | int | 12 | Button requesting the autonomy toggle |

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::params::ParamStore;

/// Mapper configuration, immutable once resolved.
///
/// Axis and button indices are not checked against the reports the device
/// actually produces.
#[derive(Debug, Clone, PartialEq)]
pub struct MapperConfig {
    pub linear_scale: f64,
    pub angular_scale: f64,
    pub left_vert_axis: usize,
    pub right_horiz_axis: usize,
    pub left_trigger: usize,
    pub right_trigger: usize,
    pub start_button: usize,
}

// Default value functions
fn default_linear_scale() -> f64 { 1.0 }
fn default_angular_scale() -> f64 { 1.0 }
fn default_left_vert_axis() -> usize { 1 }
fn default_right_horiz_axis() -> usize { 2 }
fn default_left_trigger() -> usize { 3 }
fn default_right_trigger() -> usize { 4 }
fn default_start_button() -> usize { 12 }

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            linear_scale: default_linear_scale(),
            angular_scale: default_angular_scale(),
            left_vert_axis: default_left_vert_axis(),
            right_horiz_axis: default_right_horiz_axis(),
            left_trigger: default_left_trigger(),
            right_trigger: default_right_trigger(),
            start_button: default_start_button(),
        }
    }
}

impl MapperConfig {
    /// Resolve every parameter by name, falling back to the compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Returns `Param` if an index parameter holds a negative integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use ps4_controller::config::MapperConfig;
    /// use ps4_controller::params::ParamValue;
    ///
    /// let mut params = HashMap::new();
    /// params.insert("scale_linear".to_string(), ParamValue::Float(0.5));
    ///
    /// let config = MapperConfig::from_params(&params)?;
    /// assert_eq!(config.linear_scale, 0.5);
    /// assert_eq!(config.start_button, 12);
    /// # Ok::<(), ps4_controller::error::Ps4ControllerError>(())
    /// ```
    pub fn from_params<P: ParamStore + ?Sized>(params: &P) -> Result<Self> {
        let config = Self {
            angular_scale: params.float("scale_angular", default_angular_scale()),
            linear_scale: params.float("scale_linear", default_linear_scale()),
            left_vert_axis: params.index("left_vert_axis", default_left_vert_axis())?,
            right_horiz_axis: params.index("right_horiz_axis", default_right_horiz_axis())?,
            start_button: params.index("start_button", default_start_button())?,
            left_trigger: params.index("left_trigger", default_left_trigger())?,
            right_trigger: params.index("right_trigger", default_right_trigger())?,
        };

        info!(
            "Mapper configured: scale linear={} angular={}, axes vert={} horiz={} \
             left_trigger={} right_trigger={}, start_button={}",
            config.linear_scale,
            config.angular_scale,
            config.left_vert_axis,
            config.right_horiz_axis,
            config.left_trigger,
            config.right_trigger,
            config.start_button,
        );

        Ok(config)
    }
}

/// Load a flat TOML parameter file.
///
/// A missing file is not an error: the returned store is empty and every
/// parameter takes its default.
///
/// # Errors
///
/// Returns error if:
/// - The file exists but cannot be read
/// - TOML parsing fails
pub fn load_param_file<P: AsRef<Path>>(path: P) -> Result<toml::Table> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Parameter file {} not found, using defaults", path.display());
            return Ok(toml::Table::new());
        }
        Err(e) => return Err(e.into()),
    };

    let table: toml::Table = toml::from_str(&contents)?;
    info!("Loaded {} parameters from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Ps4ControllerError;
    use crate::params::ParamValue;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_functions() {
        assert_eq!(default_linear_scale(), 1.0);
        assert_eq!(default_angular_scale(), 1.0);
        assert_eq!(default_left_vert_axis(), 1);
        assert_eq!(default_right_horiz_axis(), 2);
        assert_eq!(default_left_trigger(), 3);
        assert_eq!(default_right_trigger(), 4);
        assert_eq!(default_start_button(), 12);
    }

    #[test]
    fn test_empty_store_yields_defaults() {
        let params: HashMap<String, ParamValue> = HashMap::new();
        let config = MapperConfig::from_params(&params).unwrap();
        assert_eq!(config, MapperConfig::default());
    }

    #[test]
    fn test_every_key_is_read() {
        let params: HashMap<String, ParamValue> = [
            ("scale_linear", ParamValue::Float(0.4)),
            ("scale_angular", ParamValue::Float(0.6)),
            ("left_vert_axis", ParamValue::Int(0)),
            ("right_horiz_axis", ParamValue::Int(3)),
            ("left_trigger", ParamValue::Int(5)),
            ("right_trigger", ParamValue::Int(6)),
            ("start_button", ParamValue::Int(9)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let config = MapperConfig::from_params(&params).unwrap();
        assert_eq!(
            config,
            MapperConfig {
                linear_scale: 0.4,
                angular_scale: 0.6,
                left_vert_axis: 0,
                right_horiz_axis: 3,
                left_trigger: 5,
                right_trigger: 6,
                start_button: 9,
            }
        );
    }

    #[test]
    fn test_negative_index_rejected() {
        let mut params = HashMap::new();
        params.insert("right_horiz_axis".to_string(), ParamValue::Int(-2));
        let result = MapperConfig::from_params(&params);
        assert!(matches!(result, Err(Ps4ControllerError::Param { .. })));
    }

    #[test]
    fn test_load_param_file() {
        let toml_content = r#"
scale_linear = 0.75
start_button = 9
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let table = load_param_file(temp_file.path()).unwrap();
        let config = MapperConfig::from_params(&table).unwrap();
        assert_eq!(config.linear_scale, 0.75);
        assert_eq!(config.start_button, 9);
        assert_eq!(config.angular_scale, 1.0);
        assert_eq!(config.left_trigger, 3);
    }

    #[test]
    fn test_load_missing_param_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_param_file(dir.path().join("absent.toml")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"scale_linear = = 2").unwrap();
        temp_file.flush().unwrap();

        let result = load_param_file(temp_file.path());
        assert!(matches!(result, Err(Ps4ControllerError::Config(_))));
    }
}
