extern crate colmap_convert;
extern crate env_logger;
extern crate log;
extern crate structopt;

use colmap_convert::*;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "convert",
    about = "Undistort a directory of photos with COLMAP and lay out the reconstruction."
)]
struct Opt {
    /// Run feature extraction and matching on the CPU.
    #[structopt(long = "no_gpu")]
    no_gpu: bool,

    /// Skip extraction, matching and mapping. Expects <source_path>/distorted/sparse/0 from an
    /// earlier run.
    #[structopt(long = "skip_matching")]
    skip_matching: bool,

    /// Scene directory. Photos are read from <source_path>/input.
    #[structopt(short = "s", long = "source_path", parse(from_os_str))]
    source_path: std::path::PathBuf,

    /// COLMAP camera model shared by every image.
    #[structopt(long = "camera", default_value = "OPENCV")]
    camera: String,

    /// Path to the COLMAP executable. Defaults to `colmap` on the PATH.
    #[structopt(long = "colmap_executable", default_value = "")]
    colmap_executable: String,

    /// Also write 50%, 25% and 12.5% copies of the undistorted images to images_{2,4,8}.
    #[structopt(long = "resize")]
    resize: bool,

    /// Path to the ImageMagick executable. Defaults to `magick` on the PATH.
    #[structopt(long = "magick_executable", default_value = "")]
    magick_executable: String,

    /// Only log warnings and errors, and hide progress bars.
    #[structopt(short = "q", long = "quiet")]
    quiet: bool,
}

fn or_default(executable: String, default: &str) -> String {
    if executable.is_empty() {
        default.to_string()
    } else {
        executable
    }
}

impl From<Opt> for PipelineConfig {
    fn from(opt: Opt) -> Self {
        let mut config = PipelineConfig::new(opt.source_path);
        config.camera = opt.camera;
        config.use_gpu = !opt.no_gpu;
        config.skip_matching = opt.skip_matching;
        config.resize = opt.resize;
        config.colmap_executable = or_default(opt.colmap_executable, "colmap");
        config.magick_executable = or_default(opt.magick_executable, "magick");
        config.verbose = !opt.quiet;
        config
    }
}

fn main() {
    let opt = Opt::from_args();

    let level = if opt.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match Pipeline::new(opt.into()).run() {
        Ok(()) => println!("Done."),
        // command failures are logged by the runner
        Err(e @ Error::CommandFailed { .. }) => std::process::exit(e.exit_code()),
        Err(e) => {
            log::error!("{}. Exiting.", e);
            std::process::exit(e.exit_code());
        }
    }
}
