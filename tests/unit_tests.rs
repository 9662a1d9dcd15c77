use std::fs;
use std::path::Path;

use indicatif::ProgressDrawTarget;
use pothole_prep::config::Connectivity;
use pothole_prep::conversion::{convert_label_dir_quiet, convert_label_file};
use pothole_prep::dataset::aggregate_dataset;
use pothole_prep::io::{read_dataset_artifacts, write_dataset_artifacts};
use pothole_prep::types::ProcessingStats;
use pothole_prep::utils::create_progress_bar;

fn write_label(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::RgbImage::new(width, height)
        .save(dir.join(name))
        .unwrap();
}

fn hidden_bar() -> indicatif::ProgressBar {
    let pb = create_progress_bar(0, "Test");
    pb.set_draw_target(ProgressDrawTarget::hidden());
    pb
}

#[test]
fn test_square_polygon_converts_to_expected_line() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("img_001.txt");
    let output = temp.path().join("img_001_bbox.txt");
    fs::write(&input, "0 0.1 0.1 0.1 0.5 0.5 0.5 0.5 0.1\n").unwrap();

    let (emitted, skipped) = convert_label_file(&input, &output, 0).unwrap();
    assert_eq!(emitted, 1);
    assert_eq!(skipped, 0);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "0 0.300000 0.300000 0.400000 0.400000"
    );
}

#[test]
fn test_two_vertex_line_is_filtered() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("short.txt");
    let output = temp.path().join("short_bbox.txt");
    fs::write(&input, "0 0.1 0.1 0.5 0.5\n").unwrap();

    let (emitted, skipped) = convert_label_file(&input, &output, 0).unwrap();
    assert_eq!(emitted, 0);
    assert_eq!(skipped, 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_empty_input_file_writes_empty_output() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("empty.txt");
    let output = temp.path().join("empty_bbox.txt");
    fs::write(&input, "").unwrap();

    let (emitted, _) = convert_label_file(&input, &output, 0).unwrap();
    assert_eq!(emitted, 0);
    assert!(output.exists());
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_class_id_override_applies_to_every_record() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("multi.txt");
    let output = temp.path().join("multi_bbox.txt");
    fs::write(
        &input,
        "3 0.1 0.1 0.1 0.5 0.5 0.5 0.5 0.1\n7 0.2 0.2 0.2 0.4 0.4 0.4 0.4 0.2\n",
    )
    .unwrap();

    convert_label_file(&input, &output, 0).unwrap();
    let content = fs::read_to_string(&output).unwrap();
    for line in content.lines() {
        assert!(line.starts_with("0 "));
    }
    assert_eq!(content.lines().count(), 2);
    assert!(!content.ends_with('\n'));
}

#[test]
fn test_directory_conversion_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let label_dir = temp.path().join("labels");
    let out_dir = temp.path().join("out");
    fs::create_dir_all(&label_dir).unwrap();
    write_label(&label_dir, "a.txt", "0 0.1 0.1 0.1 0.5 0.5 0.5 0.5 0.1\n");
    write_label(&label_dir, "b.txt", "0 0.1 0.1 0.5 0.5\nnot a number\n");

    convert_label_dir_quiet(&label_dir, &out_dir, 0).unwrap();
    let first_a = fs::read(out_dir.join("a.txt")).unwrap();
    let first_b = fs::read(out_dir.join("b.txt")).unwrap();

    // Second run over the same inputs must be byte-identical.
    convert_label_dir_quiet(&label_dir, &out_dir, 0).unwrap();
    assert_eq!(fs::read(out_dir.join("a.txt")).unwrap(), first_a);
    assert_eq!(fs::read(out_dir.join("b.txt")).unwrap(), first_b);
    assert!(first_b.is_empty());
}

#[test]
fn test_existing_output_from_partial_run_is_preserved() {
    let temp = tempfile::tempdir().unwrap();
    let label_dir = temp.path().join("labels");
    let out_dir = temp.path().join("out");
    fs::create_dir_all(&label_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();
    write_label(&label_dir, "new.txt", "0 0.1 0.1 0.1 0.5 0.5 0.5 0.5 0.1\n");

    // A file left behind by an interrupted earlier run.
    let stale = out_dir.join("stale.txt");
    fs::write(&stale, "0 0.500000 0.500000 0.200000 0.200000").unwrap();

    convert_label_dir_quiet(&label_dir, &out_dir, 0).unwrap();

    assert_eq!(
        fs::read_to_string(&stale).unwrap(),
        "0 0.500000 0.500000 0.200000 0.200000"
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("new.txt")).unwrap(),
        "0 0.300000 0.300000 0.400000 0.400000"
    );
}

#[test]
fn test_aggregation_end_to_end() {
    let temp = tempfile::tempdir().unwrap();
    let image_dir = temp.path().join("images");
    let label_dir = temp.path().join("labels");
    fs::create_dir_all(&image_dir).unwrap();
    fs::create_dir_all(&label_dir).unwrap();

    write_png(&image_dir, "scene.png", 50, 50);
    write_label(
        &label_dir,
        "scene.txt",
        "0 0.1 0.1 0.3 0.1 0.2 0.3\n0 0.6 0.6 0.9 0.6 0.75 0.9\n",
    );

    let stats = ProcessingStats::new();
    let (masks, boxes) = aggregate_dataset(
        &image_dir,
        &label_dir,
        Connectivity::Eight,
        false,
        &stats,
        &hidden_bar(),
    )
    .unwrap();

    let scene_masks = &masks["scene"];
    let scene_boxes = &boxes["scene"];
    assert_eq!(scene_masks.len(), 2);
    assert_eq!(scene_boxes.len(), 2);
    for (mask, bbox) in scene_masks.iter().zip(scene_boxes) {
        assert_eq!(mask.width, 50);
        assert_eq!(mask.height, 50);
        assert_eq!(mask.foreground_bbox(), Some(*bbox));
    }
    // Instance masks are pairwise disjoint.
    let overlap = scene_masks[0]
        .data
        .iter()
        .zip(&scene_masks[1].data)
        .filter(|(&a, &b)| a != 0 && b != 0)
        .count();
    assert_eq!(overlap, 0);
}

#[test]
fn test_missing_label_file_records_empty_entry() {
    let temp = tempfile::tempdir().unwrap();
    let image_dir = temp.path().join("images");
    let label_dir = temp.path().join("labels");
    fs::create_dir_all(&image_dir).unwrap();
    fs::create_dir_all(&label_dir).unwrap();

    write_png(&image_dir, "unlabeled.png", 32, 32);
    write_png(&image_dir, "labeled.png", 32, 32);
    write_label(&label_dir, "labeled.txt", "0 0.2 0.2 0.8 0.2 0.5 0.8\n");

    let stats = ProcessingStats::new();
    let (masks, boxes) = aggregate_dataset(
        &image_dir,
        &label_dir,
        Connectivity::Eight,
        false,
        &stats,
        &hidden_bar(),
    )
    .unwrap();

    // The unlabeled image does not abort the batch; it gets an empty entry.
    assert!(masks["unlabeled"].is_empty());
    assert!(boxes["unlabeled"].is_empty());
    assert_eq!(masks["labeled"].len(), 1);
    assert_eq!(
        stats
            .missing_label_files
            .load(std::sync::atomic::Ordering::Relaxed),
        1
    );
}

#[test]
fn test_label_file_with_no_valid_polygons_yields_empty_lists() {
    let temp = tempfile::tempdir().unwrap();
    let image_dir = temp.path().join("images");
    let label_dir = temp.path().join("labels");
    fs::create_dir_all(&image_dir).unwrap();
    fs::create_dir_all(&label_dir).unwrap();

    write_png(&image_dir, "blank.png", 20, 20);
    write_label(&label_dir, "blank.txt", "0 0.1 0.1 0.5 0.5\n");

    let stats = ProcessingStats::new();
    let (masks, boxes) = aggregate_dataset(
        &image_dir,
        &label_dir,
        Connectivity::Eight,
        false,
        &stats,
        &hidden_bar(),
    )
    .unwrap();

    assert!(masks["blank"].is_empty());
    assert!(boxes["blank"].is_empty());
}

#[test]
fn test_artifacts_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let image_dir = temp.path().join("images");
    let label_dir = temp.path().join("labels");
    let out_dir = temp.path().join("out");
    fs::create_dir_all(&image_dir).unwrap();
    fs::create_dir_all(&label_dir).unwrap();

    write_png(&image_dir, "road_17.jpg", 64, 48);
    write_label(
        &label_dir,
        "road_17.txt",
        "0 0.1 0.1 0.4 0.1 0.4 0.4 0.1 0.4\n",
    );

    let stats = ProcessingStats::new();
    let (masks, boxes) = aggregate_dataset(
        &image_dir,
        &label_dir,
        Connectivity::Eight,
        false,
        &stats,
        &hidden_bar(),
    )
    .unwrap();
    write_dataset_artifacts(&masks, &boxes, &out_dir).unwrap();

    let (loaded_masks, loaded_boxes) = read_dataset_artifacts(&out_dir).unwrap();
    assert_eq!(loaded_masks, masks);
    assert_eq!(loaded_boxes, boxes);
    assert_eq!(loaded_masks["road_17"].len(), loaded_boxes["road_17"].len());
}
