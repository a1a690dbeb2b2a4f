//! Cross-method fusion with mutual-support voting.

use contracts::{Detection, ProcessedDetections};

use crate::geometry::{has_support_near, push_unique};

/// Radius within which one method supports another method's candidate
pub const SUPPORT_RADIUS_M: f64 = 0.55;

/// Fuse the per-method detection lists.
///
/// Candidates are the de-duplicated union of all three lists. With two or
/// more non-empty methods a candidate survives only with support from at
/// least two of them; with one method there is nothing to cross-validate
/// and everything passes. An empty result falls back to the first non-empty
/// list in the order fov -> ellipse -> tracing, FOV being the strongest
/// geometric-consistency signal.
pub fn fuse_method_detections(detections: &ProcessedDetections) -> Vec<Detection> {
    let mut candidates = Vec::with_capacity(
        detections.tracing.len()
            + detections.fov_intersections.len()
            + detections.ellipse_intersections.len(),
    );
    for p in &detections.tracing {
        push_unique(&mut candidates, *p);
    }
    for p in &detections.fov_intersections {
        push_unique(&mut candidates, *p);
    }
    for p in &detections.ellipse_intersections {
        push_unique(&mut candidates, *p);
    }

    let has_tracing = !detections.tracing.is_empty();
    let has_fov = !detections.fov_intersections.is_empty();
    let has_ellipse = !detections.ellipse_intersections.is_empty();
    let available_methods =
        usize::from(has_tracing) + usize::from(has_fov) + usize::from(has_ellipse);

    let mut fused = Vec::with_capacity(candidates.len());
    for c in &candidates {
        if available_methods <= 1 {
            push_unique(&mut fused, *c);
            continue;
        }

        let support = usize::from(has_support_near(&detections.tracing, c, SUPPORT_RADIUS_M))
            + usize::from(has_support_near(
                &detections.fov_intersections,
                c,
                SUPPORT_RADIUS_M,
            ))
            + usize::from(has_support_near(
                &detections.ellipse_intersections,
                c,
                SUPPORT_RADIUS_M,
            ));
        if support >= 2 {
            push_unique(&mut fused, *c);
        }
    }

    if fused.is_empty() {
        for list in [
            &detections.fov_intersections,
            &detections.ellipse_intersections,
            &detections.tracing,
        ] {
            if !list.is_empty() {
                for p in list {
                    push_unique(&mut fused, *p);
                }
                break;
            }
        }
    }

    fused
}
