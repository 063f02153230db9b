use anyhow::{bail, Context};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::processing::ProfileOptions;

pub const DEFAULT_VESSELS: [&str; 5] = ["aorta", "left_la", "right_la", "left_iv", "right_iv"];

fn default_metadata_dir() -> String {
    "metadata".to_string()
}

fn default_centerline_dir() -> String {
    "centerlines".to_string()
}

fn default_mesh_extension() -> String {
    "obj".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Directory holding one subdirectory per case.
    pub root_dir: PathBuf,
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,
    #[serde(default = "default_centerline_dir")]
    pub centerline_dir: String,
    /// Abort a stage at its first failed item instead of reporting and moving on.
    #[serde(default)]
    pub fail_fast: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VesselConfig {
    pub names: Vec<String>,
    pub mesh_extension: String,
    pub centerline_extension: String,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            names: DEFAULT_VESSELS.iter().map(|s| s.to_string()).collect(),
            mesh_extension: default_mesh_extension(),
            centerline_extension: default_mesh_extension(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    /// Sample the depth table every `step` depths when picking the target seed.
    #[serde(default)]
    pub step: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProcessingConfig {
    #[serde(default = "default_true")]
    pub run_depth_profiles: bool,
    #[serde(default = "default_true")]
    pub run_seed_selection: bool,
    #[serde(default = "default_true")]
    pub run_text_export: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            run_depth_profiles: true,
            run_seed_selection: true,
            run_text_export: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    pub general: GeneralConfig,
    #[serde(default)]
    pub vessels: VesselConfig,
    #[serde(default)]
    pub profile: ProfileOptions,
    #[serde(default)]
    pub seeds: SeedConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.profile
            .validate()
            .context("invalid [profile] settings")?;
        if self.seeds.step == Some(0) {
            bail!("invalid [seeds] settings: step must be at least 1");
        }
        if self.vessels.names.is_empty() {
            bail!("invalid [vessels] settings: no vessel names given");
        }
        Ok(())
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<PipelineConfig> {
    let config: PipelineConfig = toml::from_str(contents).context("failed to parse config")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<PipelineConfig> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&config_str).with_context(|| format!("in config {}", path.display()))
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::processing::depth_profile::EmptyBandPolicy;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("[general]\nroot_dir = \"data/seg\"\n").unwrap();
        assert_eq!(config.general.root_dir, PathBuf::from("data/seg"));
        assert_eq!(config.general.metadata_dir, "metadata");
        assert_eq!(config.general.centerline_dir, "centerlines");
        assert!(!config.general.fail_fast);
        assert_eq!(config.vessels.names.len(), 5);
        assert_eq!(config.vessels.mesh_extension, "obj");
        assert_eq!(config.profile, ProfileOptions::default());
        assert_eq!(config.seeds.step, None);
        assert!(config.processing.run_depth_profiles);
        assert!(config.processing.run_text_export);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [general]
            root_dir = "/tmp/cases"
            fail_fast = true

            [vessels]
            names = ["aorta"]
            mesh_extension = "stl"

            [profile]
            stride = 4
            band_half_width = 2
            empty_band = "fail"
            end_region_percentages = [0.25, 0.5]

            [seeds]
            step = 4

            [processing]
            run_text_export = false
        "#;
        let config = parse_config(toml).unwrap();
        assert!(config.general.fail_fast);
        assert_eq!(config.vessels.names, vec!["aorta".to_string()]);
        assert_eq!(config.vessels.mesh_extension, "stl");
        assert_eq!(config.vessels.centerline_extension, "obj");
        assert_eq!(config.profile.stride, 4);
        assert_eq!(config.profile.band_half_width, 2);
        assert_eq!(config.profile.empty_band, EmptyBandPolicy::Fail);
        assert_eq!(config.profile.end_region_percentages, vec![0.25, 0.5]);
        assert_eq!(config.seeds.step, Some(4));
        assert!(config.processing.run_seed_selection);
        assert!(!config.processing.run_text_export);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(parse_config("[general]\nroot_dir = \"x\"\n[profile]\nstride = 0\n").is_err());
        assert!(parse_config("[general]\nroot_dir = \"x\"\n[seeds]\nstep = 0\n").is_err());
        assert!(parse_config("[general]\nroot_dir = \"x\"\n[vessels]\nnames = []\n").is_err());
        assert!(parse_config("[vessels]\nnames = [\"aorta\"]\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("does/not/exist.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("does/not/exist.toml"));
    }
}
