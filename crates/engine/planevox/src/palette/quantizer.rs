//! K-means color reduction

use crate::color::Rgb;

pub const DEFAULT_ITERATIONS: usize = 10;

/// Reduce `colors` to at most `k` centers.
///
/// With `k` or fewer colors the input is returned unchanged. Otherwise the
/// centers start at evenly spaced entries of the input, points go to the
/// first nearest center under [`Rgb::weighted_distance`], and each center
/// moves to the integer channel mean of its cluster. Empty clusters keep
/// their previous center. Stops early once no center moves.
pub fn kmeans(colors: &[Rgb], k: usize, max_iterations: usize) -> Vec<Rgb> {
    if colors.len() <= k {
        return colors.to_vec();
    }
    if k == 0 {
        return Vec::new();
    }

    let n = colors.len();
    let mut centers: Vec<Rgb> = (0..k).map(|i| colors[i * n / k]).collect();
    let mut clusters: Vec<Vec<Rgb>> = vec![Vec::new(); k];

    for _ in 0..max_iterations {
        clusters.iter_mut().for_each(Vec::clear);
        for &color in colors {
            clusters[nearest(color, &centers)].push(color);
        }

        let mut moved = false;
        for (center, cluster) in centers.iter_mut().zip(&clusters) {
            if cluster.is_empty() {
                continue;
            }
            let mean = channel_mean(cluster);
            if mean != *center {
                *center = mean;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
    centers
}

/// Index of the first center at minimum distance
pub fn nearest(color: Rgb, centers: &[Rgb]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::MAX;
    for (i, &center) in centers.iter().enumerate() {
        let distance = color.weighted_distance(center);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn channel_mean(cluster: &[Rgb]) -> Rgb {
    let (r, g, b) = cluster.iter().fold((0u64, 0u64, 0u64), |(r, g, b), c| {
        (r + c.r() as u64, g + c.g() as u64, b + c.b() as u64)
    });
    let len = cluster.len() as u64;
    Rgb::new((r / len) as u8, (g / len) as u8, (b / len) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(n: u8) -> Vec<Rgb> {
        (0..n).map(|i| Rgb::new(i, i, i)).collect()
    }

    #[test]
    fn test_small_input_is_returned_unchanged() {
        let colors = gradient(5);
        assert_eq!(kmeans(&colors, 5, DEFAULT_ITERATIONS), colors);
        assert_eq!(kmeans(&colors, 8, DEFAULT_ITERATIONS), colors);
    }

    #[test]
    fn test_returns_k_distinct_centers() {
        let colors = gradient(100);
        let centers = kmeans(&colors, 4, DEFAULT_ITERATIONS);
        assert_eq!(centers.len(), 4);
        let mut unique = centers.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_two_clusters_converge_to_means() {
        let colors = vec![
            Rgb::new(0, 0, 0),
            Rgb::new(2, 2, 2),
            Rgb::new(4, 4, 4),
            Rgb::new(200, 200, 200),
            Rgb::new(202, 202, 202),
            Rgb::new(204, 204, 204),
        ];
        let centers = kmeans(&colors, 2, DEFAULT_ITERATIONS);
        assert_eq!(centers, vec![Rgb::new(2, 2, 2), Rgb::new(202, 202, 202)]);
    }

    #[test]
    fn test_deterministic() {
        let colors: Vec<Rgb> = (0..300u32).map(|i| Rgb((i * 7919) & 0xFFFFFF)).collect();
        assert_eq!(kmeans(&colors, 16, 10), kmeans(&colors, 16, 10));
    }

    #[test]
    fn test_nearest_ties_go_to_first_center() {
        let centers = [Rgb::new(0, 0, 0), Rgb::new(20, 0, 0), Rgb::new(10, 0, 0)];
        assert_eq!(nearest(Rgb::new(10, 0, 0), &centers[..2]), 0);
        assert_eq!(nearest(Rgb::new(10, 0, 0), &centers), 2);
    }
}
