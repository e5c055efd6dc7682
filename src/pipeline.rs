//! The fixed sequence of COLMAP stages.
//!
//! Example usage:
//! ```no_run
//! use colmap_convert::pipeline::*;
//!
//! let mut config = PipelineConfig::new("scenes/garden");
//! config.use_gpu = false;
//! config.resize = true;
//! Pipeline::new(config).run().expect("conversion failed");
//! ```

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::command::ExternalCommand;
use crate::layout::{normalize_sparse, SourceLayout};
use crate::resize::{resize_images, SCALE_LEVELS};
use crate::Error;

/// Passed to `--Mapper.ba_global_function_tolerance`.
pub const BA_GLOBAL_FUNCTION_TOLERANCE: &str = "0.000001";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding `input/`. Outputs are written next to it.
    pub source_path: PathBuf,
    /// COLMAP camera model shared by all images.
    pub camera: String,
    pub use_gpu: bool,
    /// Reuse an existing `distorted/` reconstruction and only undistort.
    pub skip_matching: bool,
    /// Also write half, quarter and eighth resolution copies of the images.
    pub resize: bool,
    pub colmap_executable: String,
    pub magick_executable: String,
    /// Show progress bars.
    pub verbose: bool,
}

impl PipelineConfig {
    pub fn new<P: Into<PathBuf>>(source_path: P) -> Self {
        PipelineConfig {
            source_path: source_path.into(),
            camera: "OPENCV".to_string(),
            use_gpu: true,
            skip_matching: false,
            resize: false,
            colmap_executable: "colmap".to_string(),
            magick_executable: "magick".to_string(),
            verbose: true,
        }
    }
}

/// One external invocation together with the message logged if it fails.
#[derive(Debug, Clone)]
pub struct Stage {
    pub command: ExternalCommand,
    pub failure: &'static str,
}

pub struct Pipeline {
    config: PipelineConfig,
    layout: SourceLayout,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let layout = SourceLayout::new(config.source_path.clone());
        Pipeline { config, layout }
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    fn colmap(&self, subcommand: &str) -> ExternalCommand {
        ExternalCommand::new(&self.config.colmap_executable).arg(subcommand)
    }

    fn gpu_flag(&self) -> &'static str {
        if self.config.use_gpu {
            "1"
        } else {
            "0"
        }
    }

    /// Feature extraction, exhaustive matching and mapping.
    pub fn matching_stages(&self) -> Vec<Stage> {
        let l = &self.layout;
        vec![
            Stage {
                command: self
                    .colmap("feature_extractor")
                    .path_opt("--database_path", &l.database())
                    .path_opt("--image_path", &l.input())
                    .opt("--ImageReader.single_camera", "1")
                    .opt("--ImageReader.camera_model", self.config.camera.as_str())
                    .opt("--SiftExtraction.use_gpu", self.gpu_flag()),
                failure: "Feature extraction failed",
            },
            Stage {
                command: self
                    .colmap("exhaustive_matcher")
                    .path_opt("--database_path", &l.database())
                    .opt("--SiftMatching.use_gpu", self.gpu_flag()),
                failure: "Feature matching failed",
            },
            Stage {
                command: self
                    .colmap("mapper")
                    .path_opt("--database_path", &l.database())
                    .path_opt("--image_path", &l.input())
                    .path_opt("--output_path", &l.distorted_sparse())
                    .arg(format!(
                        "--Mapper.ba_global_function_tolerance={}",
                        BA_GLOBAL_FUNCTION_TOLERANCE
                    )),
                failure: "Mapper failed",
            },
        ]
    }

    pub fn undistort_stage(&self) -> Stage {
        let l = &self.layout;
        Stage {
            command: self
                .colmap("image_undistorter")
                .path_opt("--image_path", &l.input())
                .path_opt("--input_path", &l.distorted_model())
                .path_opt("--output_path", l.root())
                .opt("--output_type", "COLMAP"),
            failure: "Image undistortion failed",
        }
    }

    /// Run every stage in order, stopping at the first failure. Directories created before a
    /// failure are left in place.
    pub fn run(&self) -> Result<(), Error> {
        if !self.config.skip_matching {
            fs::create_dir_all(self.layout.distorted_sparse())?;
            for stage in self.matching_stages() {
                stage.command.run(stage.failure)?;
            }
        } else {
            info!("Skipping feature matching and mapping");
        }

        let undistort = self.undistort_stage();
        undistort.command.run(undistort.failure)?;

        let moved = normalize_sparse(&self.layout.sparse())?;
        info!("Moved {} entries into the sparse model", moved.len());

        if self.config.resize {
            println!("Copying and resizing...");
            resize_images(
                &self.layout.images(),
                self.layout.root(),
                &SCALE_LEVELS,
                &self.config.magick_executable,
                self.config.verbose,
            )?;
        }

        Ok(())
    }
}
