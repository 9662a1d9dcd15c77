use clap::Parser;
use log::{error, info};

use pothole_prep::config::Args;
use pothole_prep::conversion::convert_label_dir;
use pothole_prep::dataset::aggregate_dataset;
use pothole_prep::io::write_dataset_artifacts;
use pothole_prep::types::ProcessingStats;
use pothole_prep::utils::create_progress_bar;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.label_dir.exists() {
        error!(
            "The specified label_dir does not exist: {}",
            args.label_dir.display()
        );
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> pothole_prep::Result<()> {
    let stats = ProcessingStats::new();

    info!("Converting polygon labels to bounding boxes...");
    let bbox_dir = args.output_dir.join("labels");
    let pb = create_progress_bar(0, "Labels");
    convert_label_dir(&args.label_dir, &bbox_dir, args.class_id, &stats, &pb)?;

    match &args.image_dir {
        Some(image_dir) => {
            if !image_dir.exists() {
                return Err(pothole_prep::PrepError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("image_dir does not exist: {}", image_dir.display()),
                )));
            }
            info!("Extracting per-instance masks and boxes...");
            let pb = create_progress_bar(0, "Masks");
            let (masks, boxes) = aggregate_dataset(
                image_dir,
                &args.label_dir,
                args.connectivity,
                args.split_polygons,
                &stats,
                &pb,
            )?;
            write_dataset_artifacts(&masks, &boxes, &args.output_dir)?;
        }
        None => info!("No image_dir given; skipping mask extraction."),
    }

    stats.print_summary();
    info!("Dataset preparation completed successfully.");
    Ok(())
}
