//! Downscaled copies of the undistorted images.
//!
//! Every file of the image directory is copied into one directory per [`ScaleLevel`] and then
//! resized in place with ImageMagick's `mogrify`.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::command::ExternalCommand;
use crate::Error;

/// A downscaled image directory and the percentage its images are resized to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub folder: &'static str,
    pub percent: f64,
}

pub const SCALE_LEVELS: [ScaleLevel; 3] = [
    ScaleLevel {
        folder: "images_2",
        percent: 50.,
    },
    ScaleLevel {
        folder: "images_4",
        percent: 25.,
    },
    ScaleLevel {
        folder: "images_8",
        percent: 12.5,
    },
];

pub(crate) fn progress_bar(length: u64, message: &str, verbose: bool) -> ProgressBar {
    if !verbose {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len} ({eta})")
            .progress_chars("#-"),
    );
    pb.set_message(message);
    pb
}

/// Regular files directly inside `dir`, sorted by name.
fn image_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        } else {
            log::debug!("skipping {}", entry.path().display());
        }
    }
    files.sort();
    Ok(files)
}

/// Copy `from` to `to` keeping permissions and modification time.
fn copy_with_metadata(from: &Path, to: &Path) -> Result<(), std::io::Error> {
    fs::copy(from, to)?;
    let modified = fs::metadata(from)?.modified()?;
    fs::OpenOptions::new()
        .write(true)
        .open(to)?
        .set_modified(modified)
}

/// `magick mogrify -resize <percent>% <file>`
pub fn mogrify_command(magick: &str, percent: f64, file: &Path) -> ExternalCommand {
    ExternalCommand::new(magick)
        .arg("mogrify")
        .opt("-resize", format!("{}%", percent))
        .arg(file.as_os_str())
}

/// Fill one directory per level with resized copies of every file in `images`. Stops at the first
/// failing resize.
pub fn resize_images(
    images: &Path,
    root: &Path,
    levels: &[ScaleLevel],
    magick: &str,
    verbose: bool,
) -> Result<(), Error> {
    let files = image_files(images)?;
    let pb = progress_bar(
        (files.len() * levels.len()) as u64,
        "Resizing images",
        verbose,
    );

    for level in levels {
        let dest = root.join(level.folder);
        fs::create_dir_all(&dest)?;
        info!(
            "Writing {} images at {}% to {}",
            files.len(),
            level.percent,
            dest.display()
        );
        let failure = format!("{}% resize failed", level.percent);

        for file in files.iter() {
            // read_dir only yields entries with a final component
            let name = match file.file_name() {
                Some(name) => name,
                None => continue,
            };
            let target = dest.join(name);
            copy_with_metadata(file, &target)?;
            mogrify_command(magick, level.percent, &target).run(&failure)?;
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    Ok(())
}
