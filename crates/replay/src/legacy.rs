//! 旧式二进制采集文件转回放 CSV
//!
//! 以 64 字节为步长扫描整个缓冲，将任意字节内容映射为确定性的合成回放：
//! 每步长一条旧式信号路行，按固定间隔补充 SF/DF/LM/GM 扩展记录。
//! 该映射不解码真实采集格式，仅保证同一输入得到同一输出。

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{PipelineError, Result};
use tracing::info;

/// 目录输入时按此扩展名顺序选取首个采集文件
const PREFERRED_EXTENSIONS: [&str; 6] = ["mudp", "pcap", "dvl", "tapi", "tavi", "ffs"];

/// 扫描步长（字节）
const STRIDE: usize = 64;

/// 相邻步长的时间戳增量（微秒）
const STRIDE_INTERVAL_US: u64 = 50_000;

fn select_capture_file(input_path: &Path) -> Result<PathBuf> {
    if !input_path.exists() {
        return Err(PipelineError::invalid_input(format!(
            "input path does not exist: {}",
            input_path.display()
        )));
    }

    if !input_path.is_dir() {
        return Ok(input_path.to_path_buf());
    }

    // 目录遍历顺序不可靠，先排序保证确定性
    let mut entries: Vec<PathBuf> = fs::read_dir(input_path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    for ext in PREFERRED_EXTENSIONS {
        if let Some(found) = entries
            .iter()
            .find(|p| p.extension().and_then(|e| e.to_str()) == Some(ext))
        {
            return Ok(found.clone());
        }
    }

    Err(PipelineError::invalid_input(
        "no legacy capture file found (.mudp/.pcap/.dvl/.tapi/.tavi/.ffs)",
    ))
}

/// 转换旧式采集（文件或目录）为回放 CSV。
///
/// # Errors
/// 输入不存在、目录内无采集文件、采集为空或过小、输出不可写。
pub fn convert_legacy_capture_to_replay_csv(input_path: &Path, output_csv: &Path) -> Result<()> {
    let selected = select_capture_file(input_path)?;

    let data = fs::read(&selected)?;
    if data.is_empty() {
        return Err(PipelineError::invalid_input(format!(
            "legacy capture is empty: {}",
            selected.display()
        )));
    }

    let file = File::create(output_csv)?;
    let mut out = BufWriter::new(file);

    let mut timestamp_us: u64 = 0;
    let mut rows_written = 0usize;
    let mut i = 0usize;
    while i + 3 < data.len() {
        let raw_dist = u16::from_le_bytes([data[i], data[i + 1]]);
        let distance_m = f32::from(raw_dist % 5500) / 1000.0;
        // 仅前/后两组有效，避免生成组号 2 的无效行
        let group_id = data[i + 2] % 2;
        let signal_way_id = data[i + 3] % 16;
        writeln!(
            out,
            "{timestamp_us},{distance_m},{group_id},{signal_way_id}"
        )?;

        // 扩展记录，供可视化与特征透传测试使用
        let lon = if group_id == 0 { distance_m } else { -distance_m };
        let lat = (f32::from(signal_way_id % 6) - 2.5) * 0.22;
        let stride_index = i / STRIDE;

        if stride_index % 16 == 0 {
            writeln!(out, "SF,{timestamp_us},{lon},{lat},1")?;
        }
        if stride_index % 32 == 0 {
            let vx = (i32::from(data[i]) % 7 - 3) as f32 * 0.05;
            let vy = (i32::from(data[i + 1]) % 7 - 3) as f32 * 0.05;
            writeln!(out, "DF,{timestamp_us},{lon},{lat},{vx},{vy},1")?;
        }
        if stride_index % 48 == 0 {
            let mark_len = 0.5 + 0.1 * f32::from(data[i + 2] % 5);
            writeln!(
                out,
                "LM,{timestamp_us},{},{lat},{},{lat},1",
                lon - mark_len,
                lon + mark_len
            )?;
        }
        if stride_index % 64 == 0 {
            const ROWS: u32 = 4;
            const COLS: u32 = 4;
            const CELL: f32 = 0.35;
            let origin_x = lon - 0.5 * COLS as f32 * CELL;
            let origin_y = lat - 0.5 * ROWS as f32 * CELL;

            let mut occ = String::new();
            for c in 0..COLS as usize {
                for r in 0..ROWS as usize {
                    let idx = (i + r + c + 4) % data.len();
                    let value = f32::from(data[idx] % 100) / 100.0;
                    occ.push_str(&value.to_string());
                    if !(c == COLS as usize - 1 && r == ROWS as usize - 1) {
                        occ.push(';');
                    }
                }
            }
            writeln!(
                out,
                "GM,{timestamp_us},{ROWS},{COLS},{CELL},{origin_x},{origin_y},{occ}"
            )?;
        }

        rows_written += 1;
        timestamp_us += STRIDE_INTERVAL_US;
        i += STRIDE;
    }

    if rows_written == 0 {
        return Err(PipelineError::invalid_input(
            "legacy capture too small to generate replay rows",
        ));
    }

    out.flush()?;
    info!(
        capture = %selected.display(),
        rows = rows_written,
        "Legacy capture converted"
    );
    Ok(())
}
