//! `view` 命令实现 - 俯视 ASCII 渲染。
//!
//! 逐帧处理回放输入，把车辆轮廓、传感器与检测结果画到字符画布上。
//! 仅为排查用的轻量展示层，不做交互。

use anyhow::{Context, Result};
use tracing::info;

use config_loader::ConfigLoader;
use contracts::{FrameOutput, Pose2, ProcessorConfig, VehicleState};
use processor::{SensorRing, UltrasoundProcessor};

use crate::cli::ViewArgs;

/// 画布尺寸（字符）
const CANVAS_COLS: usize = 78;
const CANVAS_ROWS: usize = 24;

/// 画布覆盖的世界范围（米，车体系）
const X_MIN: f64 = -6.0;
const X_MAX: f64 = 10.0;
const Y_MIN: f64 = -5.0;
const Y_MAX: f64 = 5.0;

/// 渲染设置
struct ViewSettings {
    show_contour: bool,
    show_sensors: bool,
    contour: Vec<(f64, f64)>,
    sensors: Vec<(f64, f64)>,
}

/// Execute the `view` command
pub fn run_view(args: &ViewArgs) -> Result<()> {
    let processor_config = match &args.config {
        Some(path) => ConfigLoader::load_processor_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ProcessorConfig::default(),
    };

    let ring = match &args.geometry {
        Some(path) => {
            let geometry = ConfigLoader::load_vehicle_geometry(path).with_context(|| {
                format!("Failed to load vehicle geometry from {}", path.display())
            })?;
            SensorRing::from_calibrations(&geometry.sensors).unwrap_or_default()
        }
        None => SensorRing::default(),
    };

    let settings = ViewSettings {
        show_contour: !args.no_contour,
        show_sensors: !args.no_sensors,
        contour: ring.contour().to_vec(),
        sensors: ring.poses().iter().map(|p| (p.x_m, p.y_m)).collect(),
    };

    let frames = replay::load_replay_csv(&args.input)
        .with_context(|| format!("Failed to load replay input {}", args.input.display()))?;
    info!(frames = frames.len(), "Rendering replay frames");

    let mut processor = UltrasoundProcessor::with_ring(processor_config, ring);
    seed_view_states(&mut processor);

    let mut rendered = 0u64;
    for frame in &frames {
        if processor.process_frame(frame).is_err() {
            continue;
        }
        let Some(output) = processor.last_output() else {
            continue;
        };

        println!("{}", render_frame(output, &settings));
        rendered += 1;
        if args.max_frames > 0 && rendered >= args.max_frames {
            break;
        }
    }

    info!(rendered, "View finished");
    Ok(())
}

/// 回放渲染使用与 run 相同的确定性状态序列
fn seed_view_states(processor: &mut UltrasoundProcessor) {
    let mut t = 0u64;
    while t <= 5_000_000 {
        let _ = processor.push_vehicle_state(VehicleState {
            timestamp_us: t,
            pose: Pose2 {
                x_m: t as f32 * 1.0e-6,
                y_m: 0.0,
                yaw_rad: 0.0,
            },
            ..Default::default()
        });
        t += 50_000;
    }
}

fn world_to_cell(x_m: f64, y_m: f64) -> Option<(usize, usize)> {
    if !(X_MIN..=X_MAX).contains(&x_m) || !(Y_MIN..=Y_MAX).contains(&y_m) {
        return None;
    }
    let col = ((x_m - X_MIN) / (X_MAX - X_MIN) * (CANVAS_COLS - 1) as f64).round() as usize;
    // +y 朝上，行号向下增长
    let row = ((Y_MAX - y_m) / (Y_MAX - Y_MIN) * (CANVAS_ROWS - 1) as f64).round() as usize;
    Some((col.min(CANVAS_COLS - 1), row.min(CANVAS_ROWS - 1)))
}

/// 渲染单帧为多行字符串
///
/// 图层自弱到强：静态特征 `+`、融合 `o`、聚类 `O`、轮廓 `#`、传感器 `S`。
fn render_frame(output: &FrameOutput, settings: &ViewSettings) -> String {
    let mut canvas = vec![vec![' '; CANVAS_COLS]; CANVAS_ROWS];

    let plot = |x: f64, y: f64, ch: char, canvas: &mut Vec<Vec<char>>| {
        if let Some((col, row)) = world_to_cell(x, y) {
            canvas[row][col] = ch;
        }
    };

    for sf in &output.static_features {
        plot(f64::from(sf.x_m), f64::from(sf.y_m), '+', &mut canvas);
    }
    for det in &output.processed.fused {
        plot(det.x_m, det.y_m, 'o', &mut canvas);
    }
    for det in &output.processed.clustered {
        plot(det.x_m, det.y_m, 'O', &mut canvas);
    }
    if settings.show_contour {
        for (x, y) in &settings.contour {
            plot(*x, *y, '#', &mut canvas);
        }
    }
    if settings.show_sensors {
        for (x, y) in &settings.sensors {
            plot(*x, *y, 'S', &mut canvas);
        }
    }

    let mut out = String::with_capacity((CANVAS_COLS + 1) * (CANVAS_ROWS + 2));
    out.push_str(&format!(
        "--- frame t={}us  pose=({:.2}, {:.2}, {:.3})  fused={} clustered={} ---\n",
        output.timestamp_us,
        output.observation_pose.x_m,
        output.observation_pose.y_m,
        output.observation_pose.yaw_rad,
        output.processed.fused.len(),
        output.processed.clustered.len(),
    ));
    for row in &canvas {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}
