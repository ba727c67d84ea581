mod common;

use cell_orientation::image::io::save_grayscale_u8;
use cell_orientation::image::{read_img, GrayImageU8, ImageF64, ImageU8};
use cell_orientation::pipeline::{analyze, analyze_image, OrientationParams};
use cell_orientation::{build_structure_tensor, compute_gradients, StructureTensorField};
use common::synthetic_image::{
    horizontal_step_u8, noise_u8, oriented_stripes_u8, transpose_u8, vertical_step_u8,
};
use std::f64::consts::{FRAC_PI_2, PI};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn field(width: usize, height: usize, data: &[u8]) -> ImageF64 {
    ImageU8 {
        w: width,
        h: height,
        stride: width,
        data,
    }
    .to_f64()
}

fn tensor_of(width: usize, height: usize, data: &[u8]) -> StructureTensorField {
    let gradients = compute_gradients(&field(width, height, data), 3).expect("gradients");
    build_structure_tensor(&gradients, 15).expect("tensor")
}

#[test]
fn vertical_edge_has_horizontal_gradient_angle() {
    init_logger();
    let tensor = tensor_of(100, 100, &vertical_step_u8(100, 100, 50));
    let angles = tensor.angle_field();
    assert_eq!(angles.shape(), (100, 100));
    for y in 0..100 {
        for x in 48..52 {
            assert!(angles.get(x, y).abs() < 1e-6, "θ({x},{y})={}", angles.get(x, y));
        }
    }
    // The structure itself runs vertically.
    let corrected = tensor.corrected_angle_field();
    assert!((corrected.get(50, 50) - FRAC_PI_2).abs() < 1e-6);
}

#[test]
fn horizontal_edge_has_vertical_gradient_angle() {
    init_logger();
    let tensor = tensor_of(100, 100, &horizontal_step_u8(100, 100, 50));
    let angles = tensor.angle_field();
    for y in 48..52 {
        for x in 0..100 {
            let a = angles.get(x, y).abs();
            assert!((a - FRAC_PI_2).abs() < 1e-6, "θ({x},{y})={a}");
        }
    }
    let corrected = tensor.corrected_angle_field();
    assert!(corrected.get(50, 50).abs() < 1e-6);
}

#[test]
fn step_edges_are_perfectly_ordered() {
    init_logger();
    let tensor = tensor_of(64, 64, &vertical_step_u8(64, 64, 32));
    let s = tensor.order_parameter().expect("order parameter");
    assert!((s - 1.0).abs() < 1e-12, "S={s}");
}

#[test]
fn oblique_stripes_recover_their_direction() {
    init_logger();
    let (w, h) = (128, 128);
    let tensor = tensor_of(w, h, &oriented_stripes_u8(w, h, 12.0, 30.0));
    let corrected = tensor.corrected_angle_field();
    let expected = 120f64.to_radians();
    for y in 16..h - 16 {
        for x in 16..w - 16 {
            let a = corrected.get(x, y);
            assert!(
                (a - expected).abs() < 2f64.to_radians(),
                "angle({x},{y})={:.2}deg",
                a.to_degrees()
            );
        }
    }
    let s = tensor.order_parameter().expect("order parameter");
    assert!(s > 0.8, "S={s}");
    let mean = tensor.mean_orientation().expect("mean");
    assert!((mean - expected).abs() < 5f64.to_radians(), "mean={}", mean.to_degrees());
}

#[test]
fn noise_is_weakly_ordered() {
    init_logger();
    let tensor = tensor_of(128, 128, &noise_u8(128, 128, 0x2545_f491));
    let s = tensor.order_parameter().expect("order parameter");
    assert!((0.0..0.25).contains(&s), "S={s}");
    let corrected = tensor.corrected_angle_field();
    assert!(corrected.data.iter().all(|&a| (0.0..PI).contains(&a)));
}

#[test]
fn transposing_the_image_preserves_order() {
    init_logger();
    let (w, h) = (96, 64);
    let data = oriented_stripes_u8(w, h, 10.0, 20.0);
    let s = tensor_of(w, h, &data).order_parameter().expect("S");
    let s_t = tensor_of(h, w, &transpose_u8(w, h, &data))
        .order_parameter()
        .expect("S transposed");
    assert!((s - s_t).abs() < 1e-9, "S={s} S_t={s_t}");
}

#[test]
fn fields_keep_the_input_shape() {
    let (w, h) = (37, 23);
    let tensor = tensor_of(w, h, &noise_u8(w, h, 7));
    for f in [
        tensor.jxx(),
        tensor.jyy(),
        tensor.jxy(),
        &tensor.angle_field(),
        &tensor.corrected_angle_field(),
        &tensor.coherence_field(),
    ] {
        assert_eq!(f.shape(), (w, h));
    }
}

#[test]
fn pipeline_runs_on_a_file() {
    init_logger();
    let dir = std::env::temp_dir().join(format!("cell_orientation_it_{}", std::process::id()));
    let path = dir.join("stripes.png");
    let (w, h) = (80, 60);
    let gray = GrayImageU8::new(w, h, oriented_stripes_u8(w, h, 8.0, 90.0)).expect("gray");
    save_grayscale_u8(&gray, &path).expect("save");

    let image = read_img(path.to_str().expect("utf-8 path")).expect("read");
    let analysis = analyze_image(&image, &OrientationParams::default()).expect("analysis");
    let report = &analysis.report;
    assert_eq!((report.width, report.height), (w, h));
    assert!(report.order_parameter > 0.95, "S={}", report.order_parameter);
    // Horizontal stripes: structure along the x axis.
    let m = report.mean_orientation_deg;
    assert!(m < 2.0 || m > 178.0, "mean={m}");
    assert_eq!(report.histogram.counts.iter().sum::<u64>(), (w * h) as u64);

    let direct = analyze(&image.to_intensity_field(), &OrientationParams::default())
        .expect("direct");
    assert_eq!(direct.tensor, analysis.tensor);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn horizontal_step_mirrors_vertical_gradients() {
    let g = compute_gradients(&field(100, 100, &horizontal_step_u8(100, 100, 50)), 3)
        .expect("gradients");
    for y in 0..100 {
        let expected = if y == 49 || y == 50 { 1020.0 } else { 0.0 };
        for x in 0..100 {
            assert_eq!(g.iy().get(x, y), expected, "iy({x},{y})");
        }
    }
    assert!(g.ix().data.iter().all(|&v| v == 0.0));
}

#[test]
fn flat_image_reports_the_flat_angle() {
    init_logger();
    let tensor = tensor_of(20, 12, &[90u8; 20 * 12]);
    assert!(tensor.angle_field().data.iter().all(|&a| a == 0.0));
    assert!(tensor
        .corrected_angle_field()
        .data
        .iter()
        .all(|&a| (a - FRAC_PI_2).abs() < 1e-15));
    let s = tensor.order_parameter().expect("order parameter");
    assert!((s - 1.0).abs() < 1e-12);
}
