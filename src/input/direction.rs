//! Eight-way swipe classification.
//!
//! Screen coordinates grow downward, so a positive `dy` is a downward swipe. Each
//! compass direction owns a 45° bucket centred on its axis; buckets are open at the
//! counter-clockwise edge and closed at the clockwise edge, which makes the
//! classification a total function of the angle.

use kurbo::Vec2;

use crate::domain::GestureDirection;

/// Classifies an angle in degrees, as returned by `atan2(dy, dx)`, into a swipe
/// direction.
///
/// # Examples
///
/// ```
/// use arc_launcher::domain::GestureDirection;
/// use arc_launcher::input::direction_for_angle;
///
/// assert_eq!(direction_for_angle(22.5), GestureDirection::Right);
/// assert_eq!(direction_for_angle(22.6), GestureDirection::DownRight);
/// assert_eq!(direction_for_angle(-90.0), GestureDirection::Up);
/// ```
#[must_use]
pub fn direction_for_angle(angle: f64) -> GestureDirection {
    use GestureDirection as D;

    if angle > -22.5 && angle <= 22.5 {
        D::Right
    } else if angle > 22.5 && angle <= 67.5 {
        D::DownRight
    } else if angle > 67.5 && angle <= 112.5 {
        D::Down
    } else if angle > 112.5 && angle <= 157.5 {
        D::DownLeft
    } else if angle > -67.5 && angle <= -22.5 {
        D::UpRight
    } else if angle > -112.5 && angle <= -67.5 {
        D::Up
    } else if angle > -157.5 && angle <= -112.5 {
        D::UpLeft
    } else {
        D::Left
    }
}

/// Classifies a total pointer displacement into a swipe direction.
#[must_use]
pub fn classify_swipe(displacement: Vec2) -> GestureDirection {
    direction_for_angle(displacement.y.atan2(displacement.x).to_degrees())
}
