use crate::types::{DetectionQuality, EyeSide, FaceObservation, GazeAnchor, Point2D};

/// Stand-in position for an eye the detector found no landmarks for.
pub const NEUTRAL_ANCHOR: Point2D = Point2D::new(0.5, 0.5);

// =========================================================================
// Eye Centroids
// =========================================================================

/// Componentwise arithmetic mean of a contour. `None` for an empty contour.
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f32;
    Some(Point2D::new(sum_x / n, sum_y / n))
}

// Pure function for regression testing
pub fn eye_anchor(left_eye: &[Point2D], right_eye: &[Point2D]) -> GazeAnchor {
    let left = centroid(left_eye);
    let right = centroid(right_eye);

    let quality = match (left, right) {
        (Some(_), Some(_)) => DetectionQuality::BothEyes,
        (None, Some(_)) => DetectionQuality::OneEye { missing: EyeSide::Left },
        (Some(_), None) => DetectionQuality::OneEye { missing: EyeSide::Right },
        (None, None) => DetectionQuality::NoEyes,
    };

    let point = left
        .unwrap_or(NEUTRAL_ANCHOR)
        .midpoint(right.unwrap_or(NEUTRAL_ANCHOR));
    GazeAnchor { point, quality }
}

/// Anchor for a detected face; absent and empty contours count as missing.
pub fn face_anchor(face: &FaceObservation) -> GazeAnchor {
    eye_anchor(face.left_eye(), face.right_eye())
}
