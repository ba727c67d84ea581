use cell_orientation::config::load_config;
use cell_orientation::image::read_img;
use cell_orientation::pipeline::analyze_image;
use log::info;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;

    let input = config
        .input
        .to_str()
        .ok_or_else(|| format!("input path is not valid UTF-8: {}", config.input.display()))?;
    let image = read_img(input).map_err(|e| e.to_string())?;
    info!(
        "loaded {} ({}x{})",
        image.path(),
        image.width(),
        image.height()
    );

    let analysis = analyze_image(&image, &config.analysis).map_err(|e| e.to_string())?;
    let report = &analysis.report;

    for path in config
        .output
        .write_outputs(&image, &analysis)
        .map_err(|e| e.to_string())?
    {
        info!("saved {}", path.display());
    }

    // stdout carries nothing but the report when no report file is set.
    if config.output.report_json.is_none() {
        let json = serde_json::to_string_pretty(report).map_err(|e| e.to_string())?;
        println!("{json}");
    }

    eprintln!(
        "{}x{}: order parameter {:.4}, mean orientation {:.1} deg, {:.2} ms",
        report.width,
        report.height,
        report.order_parameter,
        report.mean_orientation_deg,
        report.timing.total_ms
    );
    Ok(())
}

fn usage() -> String {
    "Usage: orientation_report <config.json>".to_string()
}
