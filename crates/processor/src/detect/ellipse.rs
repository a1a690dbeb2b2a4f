//! Ellipse detector: bistatic echoes as ellipses-of-foci, pairwise crossed.

use contracts::{Detection, SignalWay};

use crate::geometry::{push_unique, EllipseModel};
use crate::ring::SensorRing;

/// Parameter of the per-ellipse seed detection
pub const SEED_PARAM: f64 = 0.30 * std::f64::consts::PI;

/// Boundary subdivisions; both strategies walk the 361 parameter values
/// `t = s/360 * 2pi`, `s = 0..=360`.
const SAMPLE_STEPS: usize = 360;

/// Bisection iterations when refining a sign change
const BISECT_ITERATIONS: usize = 20;

fn sample_param(s: usize) -> f64 {
    (s as f64 / SAMPLE_STEPS as f64) * (2.0 * std::f64::consts::PI)
}

/// Build the reflection-locus ellipse of a signal way: TX and RX are the
/// foci, the measured distance the semi-major axis.
///
/// Contributes nothing when the pair is undecodable or the distance does not
/// exceed half the sensor baseline (no real ellipse exists).
pub fn signal_way_ellipse(ring: &SensorRing, sw: &SignalWay) -> Option<EllipseModel> {
    let (s0, s1) = ring.pair_poses(sw.group_id, sw.signal_way_id)?;
    let distance = f64::from(sw.distance_m);
    if distance <= 0.0 {
        return None;
    }

    let dx = s1.x_m - s0.x_m;
    let dy = s1.y_m - s0.y_m;
    let half_baseline = 0.5 * (dx * dx + dy * dy).sqrt();
    if distance <= half_baseline {
        return None;
    }

    Some(EllipseModel {
        cx: 0.5 * (s0.x_m + s1.x_m),
        cy: 0.5 * (s0.y_m + s1.y_m),
        axis_a: distance,
        axis_b: (distance * distance - half_baseline * half_baseline)
            .max(0.0)
            .sqrt(),
        theta: dy.atan2(dx),
    })
}

/// March along each ellipse and bisect every sign change of the other
/// ellipse's implicit equation down to a crossing point.
pub fn collect_intersections_traverse(
    ring: &SensorRing,
    models: &[EllipseModel],
    out: &mut Vec<Detection>,
) {
    if models.len() < 2 {
        return;
    }

    for i in 0..models.len() - 1 {
        for j in i + 1..models.len() {
            let mut prev_t = 0.0;
            let prev_p = models[i].point_at(prev_t);
            let mut prev_v = models[j].implicit_value(prev_p.x_m, prev_p.y_m);

            for s in 1..=SAMPLE_STEPS {
                let t = sample_param(s);
                let p = models[i].point_at(t);
                let v = models[j].implicit_value(p.x_m, p.y_m);

                if (prev_v <= 0.0 && v >= 0.0) || (prev_v >= 0.0 && v <= 0.0) {
                    let mut lo = prev_t;
                    let mut hi = t;
                    let mut lo_v = prev_v;
                    for _ in 0..BISECT_ITERATIONS {
                        let mid = 0.5 * (lo + hi);
                        let mid_p = models[i].point_at(mid);
                        let mid_v = models[j].implicit_value(mid_p.x_m, mid_p.y_m);
                        if (lo_v <= 0.0) == (mid_v <= 0.0) {
                            lo = mid;
                            lo_v = mid_v;
                        } else {
                            hi = mid;
                        }
                    }
                    let root = models[i].point_at(0.5 * (lo + hi));
                    if !ring.is_inside_contour(root.x_m, root.y_m) {
                        push_unique(out, root);
                    }
                }

                prev_t = t;
                prev_v = v;
            }
        }
    }
}

/// Harvest near-crossings by implicit-error magnitude: every sample within
/// `tolerance` emits directly, and the single best sample per pair emits
/// when within `best_limit`.
pub fn collect_intersections_sampled(
    ring: &SensorRing,
    models: &[EllipseModel],
    out: &mut Vec<Detection>,
    tolerance: f64,
    best_limit: f64,
) {
    if models.len() < 2 {
        return;
    }

    for i in 0..models.len() - 1 {
        for j in i + 1..models.len() {
            let mut best_err = f64::MAX;
            let mut best_pt = Detection::default();

            for s in 0..=SAMPLE_STEPS {
                let p = models[i].point_at(sample_param(s));
                let err = models[j].implicit_error(p.x_m, p.y_m);
                if err < best_err {
                    best_err = err;
                    best_pt = p;
                }
                if err <= tolerance && !ring.is_inside_contour(p.x_m, p.y_m) {
                    push_unique(out, p);
                }
            }

            if best_err <= best_limit && !ring.is_inside_contour(best_pt.x_m, best_pt.y_m) {
                push_unique(out, best_pt);
            }
        }
    }
}
