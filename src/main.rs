use clap::{Parser, Subcommand};
use image::{DynamicImage, ImageFormat};
use imgread::config::{self, ReaderConfig};
use imgread::imaging::{Dimensions, ImageRequest, Rotation};
use imgread::output;
use imgread::reader::ImageReader;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG: &str = "imgread.toml";

/// Display constraints shared by `read` and `info`.
#[derive(clap::Args, Clone)]
struct ViewArgs {
    /// Bounding box the displayed image must fit in
    #[arg(long, default_value = "1920x1080", value_parser = parse_size)]
    max_size: Dimensions,

    /// Display rotation in degrees (multiple of 90)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    rotation: i32,

    /// Keep full-resolution pixels and report scale factors
    #[arg(long)]
    zoomed: bool,

    /// Scale small images up to the bounding box
    #[arg(long)]
    fit_in_window: bool,

    /// Never resample the decoded pixels
    #[arg(long)]
    no_scale: bool,
}

impl ViewArgs {
    fn request(&self, path: &Path) -> Result<ImageRequest, imgread::imaging::ReaderError> {
        Ok(ImageRequest::new(path, self.max_size)
            .rotation(Rotation::from_degrees(self.rotation)?)
            .zoomed(self.zoomed)
            .fit_in_window(self.fit_in_window)
            .no_scale(self.no_scale))
    }
}

#[derive(Parser)]
#[command(name = "imgread")]
#[command(about = "Load images for display the way a viewer would")]
#[command(long_about = "\
Load images for display the way a viewer would

Each file is routed to a backend by its suffix:

  native    BMP, GIF, JPEG, PNG, PNM, QOI, TIFF, WebP, SVG
  legacy    TGA, ICO, CUR, WBMP, MONO and other suffixes not listed as native
  external  XCF, converted with xcf2png (xcftools) first

The decoded image is sized to fit --max-size, honoring --rotation. Files
that fail to load produce a placeholder image naming the problem.

Run 'imgread gen-config' to generate a documented imgread.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./imgread.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log routing and sizing decisions
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read one image and describe the result
    Read {
        path: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
        /// Write the display pixels to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read many images in parallel and summarize each
    Info {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        view: ViewArgs,
        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which backend each file routes to
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a stock imgread.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Read {
            path,
            view,
            output: out,
            json,
        } => {
            let mut reader = ImageReader::new(&resolve_config(config_path)?);
            let request = view.request(&path)?;
            let result = reader.read_image(&request);

            if let Some(out) = &out {
                save_pixels(&result.pixels, out)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result.info())?);
            } else {
                let backend = reader.classify(&path);
                for line in output::format_read_output(
                    &path,
                    backend,
                    &result.info(),
                    request.view.rotation,
                    out.as_deref(),
                ) {
                    println!("{}", line);
                }
            }

            if result.is_placeholder() {
                return Err(format!("failed to load {}", path.display()).into());
            }
        }
        Command::Info { paths, view, json } => {
            let reader = ImageReader::new(&resolve_config(config_path)?);
            let requests = paths
                .iter()
                .map(|p| view.request(p))
                .collect::<Result<Vec<_>, _>>()?;
            let infos: Vec<_> = requests
                .par_iter()
                .map(|request| reader.read(request).info())
                .collect();

            if json {
                let entries: Vec<_> = paths
                    .iter()
                    .zip(&infos)
                    .map(|(path, info)| serde_json::json!({ "path": path, "info": info }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (i, (path, info)) in paths.iter().zip(&infos).enumerate() {
                    println!("{}", output::format_info_line(i + 1, path, info));
                }
                let failed = infos.iter().filter(|info| info.error.is_some()).count();
                println!("{}", output::format_info_summary(infos.len(), failed));
            }
        }
        Command::Classify { paths } => {
            let selector = resolve_config(config_path)?.selector(true);
            for path in &paths {
                println!(
                    "{}",
                    output::format_classify_line(path, selector.classify_path(path))
                );
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the explicit config file, or `./imgread.toml` when it exists.
fn resolve_config(explicit: Option<&Path>) -> Result<ReaderConfig, config::ConfigError> {
    match explicit {
        Some(path) if !path.exists() => Err(config::ConfigError::Validation(format!(
            "config file {} does not exist",
            path.display()
        ))),
        Some(path) => config::load_config(path),
        None => config::load_config(Path::new(DEFAULT_CONFIG)),
    }
}

/// Parse a `WIDTHxHEIGHT` size such as `1920x1080`.
fn parse_size(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if width == 0 || height == 0 {
        return Err("width and height must be positive".to_string());
    }
    Ok(Dimensions::new(width, height))
}

/// Save display pixels; JPEG has no alpha channel, so it gets RGB.
fn save_pixels(pixels: &DynamicImage, path: &Path) -> image::ImageResult<()> {
    let format = ImageFormat::from_path(path)?;
    match format {
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(pixels.to_rgb8()).save_with_format(path, format)
        }
        _ => pixels.save_with_format(path, format),
    }
}
