use std::path::PathBuf;

use argh::FromArgs;
use lkflow::{
    image::Image,
    tracking::{LucasKanadeConfig, LucasKanadeTracker, Point},
};

/// Tracks points between two frames with pyramidal Lucas-Kanade
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the previous frame
    #[argh(positional)]
    old_path: PathBuf,

    /// path to the newest frame
    #[argh(positional)]
    new_path: PathBuf,

    /// point to track as x,y in pixels, can be repeated
    #[argh(option, short = 'p', from_str_fn(parse_point))]
    point: Vec<Point>,

    /// spacing of the point grid used when no point is given
    #[argh(option, short = 'g', default = "32")]
    grid_step: u32,

    /// json file with the tracking configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// half size of the tracking window
    #[argh(option)]
    half_window_size: Option<u16>,

    /// number of subpixel units per pixel
    #[argh(option)]
    subpixel_factor: Option<u32>,

    /// maximum refinement steps per pyramid level
    #[argh(option)]
    max_iterations: Option<u8>,

    /// step size, in subpixel units, that stops the refinement
    #[argh(option)]
    step_threshold: Option<u8>,

    /// maximum number of points to track
    #[argh(option)]
    max_points: Option<u16>,

    /// index of the coarsest pyramid level
    #[argh(option)]
    pyramid_level: Option<u8>,
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {}", value))?;
    let x = x.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<u32>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

fn read_gray_image(path: &PathBuf) -> Result<Image<u8>, Box<dyn std::error::Error>> {
    let gray = image::open(path)?.to_luma8();
    let (width, height) = gray.dimensions();
    Ok(Image::new(
        [width as usize, height as usize].into(),
        gray.into_raw(),
    )?)
}

fn load_config(args: &Args) -> Result<LucasKanadeConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => LucasKanadeConfig::default(),
    };

    if let Some(half_window_size) = args.half_window_size {
        config.half_window_size = half_window_size;
    }
    if let Some(subpixel_factor) = args.subpixel_factor {
        config.subpixel_factor = subpixel_factor;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(step_threshold) = args.step_threshold {
        config.step_threshold = step_threshold;
    }
    if let Some(max_points) = args.max_points {
        config.max_points = max_points;
    }
    if let Some(pyramid_level) = args.pyramid_level {
        config.pyramid_level = pyramid_level;
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    let config = load_config(&args)?;
    log::info!("tracking with {:?}", config);

    let old_img = read_gray_image(&args.old_path)?;
    let new_img = read_gray_image(&args.new_path)?;

    let points: Vec<Point> = if args.point.is_empty() {
        let step = args.grid_step.max(1) as usize;
        (0..old_img.height() as u32)
            .step_by(step)
            .skip(1)
            .flat_map(|y| {
                (0..old_img.width() as u32)
                    .step_by(step)
                    .skip(1)
                    .map(move |x| Point::new(x, y))
            })
            .collect()
    } else {
        args.point.clone()
    };

    let tracker = LucasKanadeTracker::new(config)?;
    let vectors = tracker.track(&new_img, &old_img, &points)?;

    log::info!(
        "tracked {} of {} points",
        vectors.len(),
        points.len().min(tracker.config().max_points as usize)
    );

    let factor = tracker.config().subpixel_factor;
    for vector in vectors {
        let [x, y] = vector.position_pixels(factor);
        let [dx, dy] = vector.flow_pixels(factor);
        println!("({:.2}, {:.2}) -> ({:+.2}, {:+.2})", x, y, dx, dy);
    }

    Ok(())
}
