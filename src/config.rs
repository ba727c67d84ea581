//! JSON runtime configuration for the `orientation_report` tool.
use crate::error::{OrientationError, Result};
use crate::image::io::{save_angle_map, save_grayscale_u8, write_json_file};
use crate::image::{CellImage, GrayImageU8};
use crate::pipeline::{OrientationAnalysis, OrientationParams};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON report. Printed to stdout when absent.
    pub report_json: Option<PathBuf>,
    /// Gray-level rendering of the corrected angle field.
    pub angle_map: Option<PathBuf>,
    /// 8-bit rendering (rounded, saturated) of the field the gradients were
    /// computed on. Written only when `analysis.clahe` or `analysis.blur` is
    /// set.
    pub preprocessed_image: Option<PathBuf>,
}

impl OutputConfig {
    /// Write every configured output for `analysis` of `image`.
    ///
    /// All targets are checked before anything is written: none may resolve
    /// to the source image, and image outputs need a supported extension.
    /// Returns the paths written, in order.
    pub fn write_outputs(
        &self,
        image: &CellImage,
        analysis: &OrientationAnalysis,
    ) -> Result<Vec<PathBuf>> {
        if let Some(path) = &self.report_json {
            image.ensure_not_source(path)?;
        }
        let angle_map = self
            .angle_map
            .as_deref()
            .map(|p| image.output_path(p))
            .transpose()?;
        let preprocessed = match (&self.preprocessed_image, &analysis.preprocessed) {
            (Some(path), Some(field)) => Some((image.output_path(path)?, field)),
            (Some(path), None) => {
                warn!(
                    "no preprocessing configured; not writing {}",
                    path.display()
                );
                None
            }
            _ => None,
        };

        let mut written = Vec::new();
        if let Some(path) = &self.report_json {
            write_json_file(path, &analysis.report)?;
            written.push(path.clone());
        }
        if let Some(path) = angle_map {
            save_angle_map(&analysis.corrected_angles(), path.as_path())?;
            written.push(path.as_path().to_path_buf());
        }
        if let Some((path, field)) = preprocessed {
            save_grayscale_u8(&GrayImageU8::from_field(field), path.as_path())?;
            written.push(path.as_path().to_path_buf());
        }
        Ok(written)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub analysis: OrientationParams,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        OrientationError::Config(format!("failed to read config {}: {e}", path.display()))
    })?;
    parse_config(&contents)
        .map_err(|e| OrientationError::Config(format!("failed to parse config {}: {e}", path.display())))
}

fn parse_config(contents: &str) -> serde_json::Result<RuntimeConfig> {
    serde_json::from_str(contents)
}
