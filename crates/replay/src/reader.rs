//! 回放输入 CSV 解析
//!
//! 行格式（`#` 与空行跳过，畸形行静默忽略）：
//! - 旧式：`timestamp_us,distance_m,group_id,signal_way_id[,feat_x,feat_y,feat_valid]`
//! - 类型化：`SW,..` / `SF,..` / `DF,..` / `LM,..` / `GM,..`
//!
//! 同一时间戳的行合并为一帧，输出按时间戳升序。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use contracts::{
    DynamicFeature, FrameInput, GridMap, LineMark, Result, SignalWay, StaticFeature,
};
use tracing::debug;

fn is_unsigned_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_bool_flag(s: &str) -> Option<bool> {
    s.trim().parse::<u32>().ok().map(|v| v != 0)
}

/// 解析一行，成功时将内容并入对应时间戳的帧。
///
/// 返回 `None` 表示该行被忽略；先完整解析再写入，畸形行不留下任何副作用。
fn parse_row(cols: &[&str], frames: &mut BTreeMap<u64, FrameInput>) -> Option<()> {
    // 旧式行：首列为无符号整数时间戳
    if is_unsigned_number(cols[0]) {
        if cols.len() < 4 {
            return None;
        }
        let ts: u64 = cols[0].parse().ok()?;
        let sw = SignalWay {
            timestamp_us: ts,
            distance_m: cols[1].trim().parse().ok()?,
            group_id: cols[2].trim().parse().ok()?,
            signal_way_id: cols[3].trim().parse().ok()?,
        };

        let feature = if cols.len() >= 7 {
            Some(StaticFeature {
                x_m: cols[4].trim().parse().ok()?,
                y_m: cols[5].trim().parse().ok()?,
                valid: parse_bool_flag(cols[6])?,
                ..Default::default()
            })
        } else {
            None
        };

        let target = frames.entry(ts).or_default();
        target.timestamp_us = ts;
        target.signal_ways.push(sw);
        if let Some(feature) = feature {
            target.static_features.push(feature);
        }
        return Some(());
    }

    // 类型化行：首列为记录标签
    if cols.len() < 3 {
        return None;
    }
    let tag = cols[0];
    let ts: u64 = cols[1].trim().parse().ok()?;

    match tag {
        "SW" => {
            if cols.len() < 5 {
                return None;
            }
            let sw = SignalWay {
                timestamp_us: ts,
                distance_m: cols[2].trim().parse().ok()?,
                group_id: cols[3].trim().parse().ok()?,
                signal_way_id: cols[4].trim().parse().ok()?,
            };
            let target = frames.entry(ts).or_default();
            target.timestamp_us = ts;
            target.signal_ways.push(sw);
        }
        "SF" => {
            if cols.len() < 5 {
                return None;
            }
            let sf = StaticFeature {
                x_m: cols[2].trim().parse().ok()?,
                y_m: cols[3].trim().parse().ok()?,
                valid: parse_bool_flag(cols[4])?,
                ..Default::default()
            };
            let target = frames.entry(ts).or_default();
            target.timestamp_us = ts;
            target.static_features.push(sf);
        }
        "DF" => {
            if cols.len() < 7 {
                return None;
            }
            let df = DynamicFeature {
                x_m: cols[2].trim().parse().ok()?,
                y_m: cols[3].trim().parse().ok()?,
                vx_mps: cols[4].trim().parse().ok()?,
                vy_mps: cols[5].trim().parse().ok()?,
                valid: parse_bool_flag(cols[6])?,
            };
            let target = frames.entry(ts).or_default();
            target.timestamp_us = ts;
            target.dynamic_features.push(df);
        }
        "LM" => {
            if cols.len() < 7 {
                return None;
            }
            let lm = LineMark {
                x0_m: cols[2].trim().parse().ok()?,
                y0_m: cols[3].trim().parse().ok()?,
                x1_m: cols[4].trim().parse().ok()?,
                y1_m: cols[5].trim().parse().ok()?,
                valid: parse_bool_flag(cols[6])?,
            };
            let target = frames.entry(ts).or_default();
            target.timestamp_us = ts;
            target.line_marks.push(lm);
        }
        "GM" => {
            if cols.len() < 8 {
                return None;
            }
            let rows: u32 = cols[2].trim().parse().ok()?;
            let grid_cols: u32 = cols[3].trim().parse().ok()?;
            let mut gm = GridMap {
                rows,
                cols: grid_cols,
                cell_size_m: cols[4].trim().parse().ok()?,
                origin_x_m: cols[5].trim().parse().ok()?,
                origin_y_m: cols[6].trim().parse().ok()?,
                occupancy: Vec::new(),
                valid: true,
            };

            let expected = rows as usize * grid_cols as usize;
            gm.occupancy.reserve(expected);
            for token in cols[7].split(';').filter(|t| !t.is_empty()) {
                gm.occupancy.push(token.trim().parse().ok()?);
            }
            // 占据数必须与 rows*cols 精确匹配
            if gm.occupancy.len() != expected {
                return None;
            }

            let target = frames.entry(ts).or_default();
            target.timestamp_us = ts;
            target.grid_map = gm;
        }
        _ => return None,
    }

    Some(())
}

/// 加载回放 CSV 为按时间戳升序的帧序列。
///
/// # Errors
/// 仅文件读取失败返回错误；内容层面的畸形行全部静默跳过。
pub fn load_replay_csv(path: &Path) -> Result<Vec<FrameInput>> {
    let content = fs::read_to_string(path)?;

    let mut frames_by_timestamp: BTreeMap<u64, FrameInput> = BTreeMap::new();
    let mut skipped = 0usize;

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let cols: Vec<&str> = line.split(',').collect();
        if cols.is_empty() {
            continue;
        }
        if parse_row(&cols, &mut frames_by_timestamp).is_none() {
            skipped += 1;
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped malformed replay rows");
    }

    Ok(frames_by_timestamp.into_values().collect())
}
