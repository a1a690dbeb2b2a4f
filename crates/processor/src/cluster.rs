//! Connectivity clustering: radius adjacency, flood-fill components, centroids.

use contracts::Detection;

/// Merge detections into connected components under `radius_m` and emit one
/// centroid per component, in component-id (assignment) order.
///
/// O(n^2) in detections; frames carry at most a few hundred.
pub fn cluster_detections(points: &[Detection], radius_m: f64) -> Vec<Detection> {
    if points.is_empty() {
        return Vec::new();
    }

    let n = points.len();
    let radius_sq = radius_m * radius_m;

    let mut adjacency = vec![vec![false; n]; n];
    for i in 0..n {
        adjacency[i][i] = true;
        for j in i + 1..n {
            if points[i].distance_sq(&points[j]) <= radius_sq {
                adjacency[i][j] = true;
                adjacency[j][i] = true;
            }
        }
    }

    // 0 = unassigned; component ids start at 1
    let mut cluster_id = vec![0usize; n];
    let mut next_id = 1usize;
    for i in 0..n {
        if cluster_id[i] != 0 {
            continue;
        }
        cluster_id[i] = next_id;
        let mut changed = true;
        while changed {
            changed = false;
            for a in 0..n {
                if cluster_id[a] != next_id {
                    continue;
                }
                for b in 0..n {
                    if adjacency[a][b] && cluster_id[b] == 0 {
                        cluster_id[b] = next_id;
                        changed = true;
                    }
                }
            }
        }
        next_id += 1;
    }

    let mut sums = vec![(0.0f64, 0.0f64, 0.0f64); next_id - 1];
    for (i, point) in points.iter().enumerate() {
        let slot = &mut sums[cluster_id[i] - 1];
        slot.0 += point.x_m;
        slot.1 += point.y_m;
        slot.2 += 1.0;
    }

    sums.into_iter()
        .filter(|(_, _, count)| *count > 0.0)
        .map(|(x, y, count)| Detection::new(x / count, y / count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(cluster_detections(&[], 0.35).is_empty());
    }

    #[test]
    fn test_isolated_points_stay_separate() {
        let points = vec![
            Detection::new(0.0, 0.0),
            Detection::new(5.0, 0.0),
            Detection::new(0.0, 5.0),
        ];
        let clustered = cluster_detections(&points, 0.35);
        assert_eq!(clustered.len(), 3);
        assert_eq!(clustered[0], points[0]);
        assert_eq!(clustered[1], points[1]);
        assert_eq!(clustered[2], points[2]);
    }

    #[test]
    fn test_nearby_points_merge_to_centroid() {
        let points = vec![
            Detection::new(1.0, 1.0),
            Detection::new(1.2, 1.0),
            Detection::new(1.1, 1.2),
        ];
        let clustered = cluster_detections(&points, 0.35);
        assert_eq!(clustered.len(), 1);
        assert!((clustered[0].x_m - 1.1).abs() < 1e-9);
        assert!((clustered[0].y_m - (1.0 + 1.0 + 1.2) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_chained_connectivity_forms_one_component() {
        // Consecutive points within radius, endpoints far apart
        let points = vec![
            Detection::new(0.0, 0.0),
            Detection::new(0.3, 0.0),
            Detection::new(0.6, 0.0),
            Detection::new(0.9, 0.0),
        ];
        let clustered = cluster_detections(&points, 0.35);
        assert_eq!(clustered.len(), 1);
        assert!((clustered[0].x_m - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_output_follows_assignment_order() {
        // First point seen founds the first component
        let points = vec![
            Detection::new(5.0, 0.0),
            Detection::new(0.0, 0.0),
            Detection::new(5.1, 0.0),
        ];
        let clustered = cluster_detections(&points, 0.35);
        assert_eq!(clustered.len(), 2);
        assert!((clustered[0].x_m - 5.05).abs() < 1e-9);
        assert_eq!(clustered[1], Detection::new(0.0, 0.0));
    }

    #[test]
    fn test_cluster_count_bounded_by_input() {
        let points: Vec<Detection> = (0..20)
            .map(|i| Detection::new(f64::from(i) * 0.1, 0.0))
            .collect();
        let clustered = cluster_detections(&points, 0.35);
        assert!(clustered.len() <= points.len());
    }
}
