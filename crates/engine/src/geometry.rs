//! Integer position math.
//!
//! Headings are whole degrees. Every result is rounded per axis with
//! half-away-from-zero rounding, and recorded positions depend on it.

use protocol::Position;

/// Normalize a heading into `[0, 360)`.
#[inline]
pub fn normalize_heading(heading: i32) -> i32 {
    heading.rem_euclid(360)
}

#[inline]
pub fn reverse_heading(heading: i32) -> i32 {
    normalize_heading(heading + 180)
}

/// Move `start` by `distance` along `heading`.
///
/// The heading is reduced into its quadrant's `[0, 90]` angle, the offset
/// is rounded per axis and then mirrored by quadrant.
pub fn move_position(start: Position, distance: i32, heading: i32) -> Position {
    let heading = normalize_heading(heading);
    let distance = distance as f64;
    let (reduced, sign_x, sign_y) = match heading {
        0..=90 => (heading, 1, 1),
        91..=180 => (180 - heading, -1, 1),
        181..=270 => (heading - 180, -1, -1),
        _ => (360 - heading, 1, -1),
    };
    let radians = (reduced as f64).to_radians();
    let dx = (distance * radians.cos()).round() as i32;
    let dy = (distance * radians.sin()).round() as i32;
    Position::new(start.x + sign_x * dx, start.y + sign_y * dy)
}

/// Euclidean distance rounded to the nearest integer.
pub fn distance_between(a: Position, b: Position) -> i32 {
    let dx = (a.x as i64 - b.x as i64).abs() as f64;
    let dy = (a.y as i64 - b.y as i64).abs() as f64;
    (dx * dx + dy * dy).sqrt().round() as i32
}

/// Circles overlap only when strictly closer than the sum of their sizes.
#[inline]
pub fn has_overlap(a: Position, a_size: i32, b: Position, b_size: i32) -> bool {
    distance_between(a, b) - (a_size + b_size) < 0
}

#[inline]
pub fn is_in_bounds(position: Position, radius: i32) -> bool {
    distance_between(position, Position::ORIGIN) <= radius
}

/// Whether an object's edge, `offset` beyond its center, is still inside.
#[inline]
pub fn is_in_bounds_with_offset(position: Position, offset: i32, radius: i32) -> bool {
    distance_between(position, Position::ORIGIN) + offset <= radius
}

/// Start position for the bot registered after `player_count` others.
///
/// Bots are spread `360 / bot_count` degrees apart, shifted one slot so
/// the first bot does not sit at heading 0.
pub fn start_position_for_player(player_count: u32, bot_count: u32, start_radius: i32) -> Position {
    let separation = 360 / bot_count.max(1) as i32;
    let heading = (player_count as i32 + 1) * separation;
    move_position(Position::ORIGIN, start_radius, heading)
}

/// Unit-step sample points from `start` towards `end` along `heading`.
///
/// Consecutive duplicates produced by rounding are dropped and the last
/// point is always `end`.
pub fn collect_path_points(start: Position, end: Position, heading: i32) -> Vec<Position> {
    let distance = distance_between(start, end);
    let mut points = Vec::with_capacity(distance.max(0) as usize + 1);
    let mut last = start;
    for step in 1..=distance {
        let point = move_position(start, step, heading);
        if point != last {
            points.push(point);
            last = point;
        }
    }
    if last != end {
        points.push(end);
    }
    points
}

/// Cut `points` where the walked distance would exceed `budget`.
pub fn limit_path(start: Position, points: &mut Vec<Position>, budget: i32) {
    let mut walked = 0;
    let mut previous = start;
    let keep = points
        .iter()
        .take_while(|point| {
            walked += distance_between(previous, **point);
            previous = **point;
            walked <= budget
        })
        .count();
    points.truncate(keep);
}

#[cfg(test)]
mod tests {
    use super::*;

    const O: Position = Position::ORIGIN;

    #[test]
    fn test_move_quadrant_literals() {
        assert_eq!(move_position(O, 10, 0), Position::new(10, 0));
        assert_eq!(move_position(O, 10, 45), Position::new(7, 7));
        assert_eq!(move_position(O, 10, 90), Position::new(0, 10));
        assert_eq!(move_position(O, 10, 135), Position::new(-7, 7));
        assert_eq!(move_position(O, 10, 180), Position::new(-10, 0));
        assert_eq!(move_position(O, 10, 225), Position::new(-7, -7));
        assert_eq!(move_position(O, 10, 270), Position::new(0, -10));
        assert_eq!(move_position(O, 10, 315), Position::new(7, -7));
        assert_eq!(move_position(O, 10, 360), Position::new(10, 0));
    }

    #[test]
    fn test_move_small_heading() {
        assert_eq!(move_position(O, 6, 23), Position::new(6, 2));
    }

    #[test]
    fn test_move_zero_distance_is_identity() {
        let p = Position::new(13, -4);
        for heading in (-720..720).step_by(17) {
            assert_eq!(move_position(p, 0, heading), p);
        }
    }

    #[test]
    fn test_move_normalizes_heading() {
        assert_eq!(move_position(O, 10, -90), move_position(O, 10, 270));
        assert_eq!(move_position(O, 10, 405), move_position(O, 10, 45));
    }

    #[test]
    fn test_reverse_twice_is_normalize() {
        for heading in -1000..1000 {
            assert_eq!(reverse_heading(reverse_heading(heading)), normalize_heading(heading));
        }
        assert_eq!(reverse_heading(90), 270);
        assert_eq!(reverse_heading(270), 90);
    }

    #[test]
    fn test_distance_symmetry() {
        let a = Position::new(3, 4);
        let b = Position::new(-9, 12);
        assert_eq!(distance_between(a, b), distance_between(b, a));
        assert_eq!(distance_between(O, a), 5);
        assert_eq!(distance_between(a, a), 0);
        assert_ne!(distance_between(a, Position::new(3, 5)), 0);
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let a = Position::new(0, 0);
        let b = Position::new(10, 0);
        assert!(!has_overlap(a, 5, b, 5));
        assert!(has_overlap(a, 5, b, 6));
    }

    #[test]
    fn test_bounds() {
        assert!(is_in_bounds(Position::new(100, 0), 100));
        assert!(!is_in_bounds(Position::new(101, 0), 100));
        assert!(is_in_bounds_with_offset(Position::new(90, 0), 10, 100));
        assert!(!is_in_bounds_with_offset(Position::new(91, 0), 10, 100));
    }

    #[test]
    fn test_start_positions() {
        // Four bots: 90 degree slots starting at 90.
        assert_eq!(start_position_for_player(0, 4, 20), Position::new(0, 20));
        assert_eq!(start_position_for_player(1, 4, 20), Position::new(-20, 0));
        assert_eq!(move_position(O, 20, 45), Position::new(14, 14));
        assert_eq!(move_position(O, 30, 135), Position::new(-21, 21));
    }

    #[test]
    fn test_path_points_end_at_destination() {
        let start = Position::new(0, 0);
        let end = move_position(start, 10, 45);
        let points = collect_path_points(start, end, 45);
        assert_eq!(points.last(), Some(&end));
        assert!(points.windows(2).all(|w| w[0] != w[1]));
        assert!(points.iter().all(|p| distance_between(start, *p) <= 10));
    }

    #[test]
    fn test_path_points_empty_for_zero_distance() {
        assert!(collect_path_points(O, O, 90).is_empty());
    }

    #[test]
    fn test_limit_path_respects_budget() {
        let end = move_position(O, 10, 0);
        let mut points = collect_path_points(O, end, 0);
        assert_eq!(points.len(), 10);
        limit_path(O, &mut points, 4);
        assert_eq!(points, vec![
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(3, 0),
            Position::new(4, 0),
        ]);
    }
}
