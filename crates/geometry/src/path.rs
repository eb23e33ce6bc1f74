//! Path commands and flattening
//!
//! Converts move/line/quadratic/cubic command sequences into polylines
//! for hit-testing and for the polygon boolean pipeline. Curves are
//! sampled at a fixed subdivision count chosen by the call site, since
//! hit-testing can get away with coarser sampling than outline
//! generation for eraser booleans.

use crate::transform::Point;

/// A single path drawing command.
///
/// Absolute variants carry page/object-local coordinates; relative
/// variants are offsets from the current point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PathCommand {
    /// Start a new subpath at (x, y)
    MoveTo { x: f64, y: f64 },
    /// Straight segment to (x, y)
    LineTo { x: f64, y: f64 },
    /// Quadratic Bezier with control (cx, cy) ending at (x, y)
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
    /// Cubic Bezier with controls (c1x, c1y), (c2x, c2y) ending at (x, y)
    CubicTo {
        c1x: f64,
        c1y: f64,
        c2x: f64,
        c2y: f64,
        x: f64,
        y: f64,
    },
    /// Close the current subpath back to its start point
    Close,
    /// Relative move
    RelMoveTo { dx: f64, dy: f64 },
    /// Relative line
    RelLineTo { dx: f64, dy: f64 },
    /// Relative quadratic Bezier
    RelQuadTo { dcx: f64, dcy: f64, dx: f64, dy: f64 },
    /// Relative cubic Bezier
    RelCubicTo {
        dc1x: f64,
        dc1y: f64,
        dc2x: f64,
        dc2y: f64,
        dx: f64,
        dy: f64,
    },
}

/// Curve subdivision counts for path flattening.
///
/// A quality/performance tradeoff, not a correctness-critical
/// parameter: more samples track curve extrema more closely at the cost
/// of longer polylines downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenQuality {
    /// Samples per quadratic curve
    pub quad_samples: usize,
    /// Samples per cubic curve
    pub cubic_samples: usize,
}

impl FlattenQuality {
    /// Coarse sampling for interactive hit-testing.
    pub const HIT_TEST: FlattenQuality = FlattenQuality {
        quad_samples: 4,
        cubic_samples: 6,
    };

    /// Finer sampling for outline generation feeding boolean operations.
    pub const OUTLINE: FlattenQuality = FlattenQuality {
        quad_samples: 8,
        cubic_samples: 10,
    };
}

/// Point on a quadratic Bezier at parameter t
fn quadratic_point(p0: Point, c: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * p0.x + 2.0 * u * t * c.x + t * t * p1.x,
        u * u * p0.y + 2.0 * u * t * c.y + t * t * p1.y,
    )
}

/// Point on a cubic Bezier at parameter t
fn cubic_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * u * p0.x + 3.0 * u * u * t * c1.x + 3.0 * u * t * t * c2.x + t * t * t * p1.x,
        u * u * u * p0.y + 3.0 * u * u * t * c1.y + 3.0 * u * t * t * c2.y + t * t * t * p1.y,
    )
}

/// Flatten a command sequence into polylines.
///
/// A new polyline starts at each `MoveTo`/`RelMoveTo`. `Close` appends
/// the subpath's start point when the current point is not already
/// exactly coincident with it, then terminates the polyline.
pub fn flatten_path(commands: &[PathCommand], quality: FlattenQuality) -> Vec<Vec<Point>> {
    let mut polylines: Vec<Vec<Point>> = Vec::new();
    let mut current_line: Vec<Point> = Vec::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;

    let mut flush = |line: &mut Vec<Point>| {
        if line.len() >= 2 {
            polylines.push(std::mem::take(line));
        } else {
            line.clear();
        }
    };

    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo { x, y } | PathCommand::RelMoveTo { dx: x, dy: y } => {
                let target = match cmd {
                    PathCommand::RelMoveTo { .. } => Point::new(current.x + x, current.y + y),
                    _ => Point::new(x, y),
                };
                flush(&mut current_line);
                current = target;
                start = target;
                current_line.push(current);
            }
            PathCommand::LineTo { x, y } => {
                let target = Point::new(x, y);
                push_vertex(&mut current_line, current, target);
                current = target;
            }
            PathCommand::RelLineTo { dx, dy } => {
                let target = Point::new(current.x + dx, current.y + dy);
                push_vertex(&mut current_line, current, target);
                current = target;
            }
            PathCommand::QuadTo { cx, cy, x, y } => {
                current = sample_quad(
                    &mut current_line,
                    current,
                    Point::new(cx, cy),
                    Point::new(x, y),
                    quality.quad_samples,
                );
            }
            PathCommand::RelQuadTo { dcx, dcy, dx, dy } => {
                current = sample_quad(
                    &mut current_line,
                    current,
                    Point::new(current.x + dcx, current.y + dcy),
                    Point::new(current.x + dx, current.y + dy),
                    quality.quad_samples,
                );
            }
            PathCommand::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                current = sample_cubic(
                    &mut current_line,
                    current,
                    Point::new(c1x, c1y),
                    Point::new(c2x, c2y),
                    Point::new(x, y),
                    quality.cubic_samples,
                );
            }
            PathCommand::RelCubicTo {
                dc1x,
                dc1y,
                dc2x,
                dc2y,
                dx,
                dy,
            } => {
                current = sample_cubic(
                    &mut current_line,
                    current,
                    Point::new(current.x + dc1x, current.y + dc1y),
                    Point::new(current.x + dc2x, current.y + dc2y),
                    Point::new(current.x + dx, current.y + dy),
                    quality.cubic_samples,
                );
            }
            PathCommand::Close => {
                if current.x != start.x || current.y != start.y {
                    push_vertex(&mut current_line, current, start);
                }
                current = start;
                flush(&mut current_line);
            }
        }
    }
    flush(&mut current_line);
    polylines
}

/// Flatten a command sequence, keeping only curve endpoints.
///
/// Used when reconstructing PDF ink lists, where curves degrade to
/// their endpoints rather than to sampled polylines.
pub fn path_endpoints(commands: &[PathCommand]) -> Vec<Vec<Point>> {
    flatten_path(
        commands,
        FlattenQuality {
            quad_samples: 1,
            cubic_samples: 1,
        },
    )
}

fn push_vertex(line: &mut Vec<Point>, from: Point, p: Point) {
    if line.is_empty() {
        // A segment without a preceding move starts at the current
        // point: the subpath start after a Close, the local origin at
        // the head of the command list.
        line.push(from);
    }
    line.push(p);
}

fn sample_quad(line: &mut Vec<Point>, from: Point, control: Point, to: Point, n: usize) -> Point {
    if line.is_empty() {
        line.push(from);
    }
    for i in 1..=n {
        let t = i as f64 / n as f64;
        line.push(quadratic_point(from, control, to, t));
    }
    to
}

fn sample_cubic(
    line: &mut Vec<Point>,
    from: Point,
    c1: Point,
    c2: Point,
    to: Point,
    n: usize,
) -> Point {
    if line.is_empty() {
        line.push(from);
    }
    for i in 1..=n {
        let t = i as f64 / n as f64;
        line.push(cubic_point(from, c1, c2, to, t));
    }
    to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_lines() {
        let commands = vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::LineTo { x: 10.0, y: 0.0 },
            PathCommand::LineTo { x: 10.0, y: 10.0 },
        ];
        let polylines = flatten_path(&commands, FlattenQuality::HIT_TEST);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 3);
        assert_eq!(polylines[0][2], Point::new(10.0, 10.0));
    }

    #[test]
    fn test_move_starts_new_polyline() {
        let commands = vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::LineTo { x: 10.0, y: 0.0 },
            PathCommand::MoveTo { x: 20.0, y: 0.0 },
            PathCommand::LineTo { x: 30.0, y: 0.0 },
        ];
        let polylines = flatten_path(&commands, FlattenQuality::HIT_TEST);
        assert_eq!(polylines.len(), 2);
        assert_eq!(polylines[1][0], Point::new(20.0, 0.0));
    }

    #[test]
    fn test_close_appends_start_point() {
        let commands = vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::LineTo { x: 10.0, y: 0.0 },
            PathCommand::LineTo { x: 10.0, y: 10.0 },
            PathCommand::Close,
        ];
        let polylines = flatten_path(&commands, FlattenQuality::HIT_TEST);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].last().copied(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_close_skips_coincident_start() {
        let commands = vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::LineTo { x: 10.0, y: 0.0 },
            PathCommand::LineTo { x: 0.0, y: 0.0 },
            PathCommand::Close,
        ];
        let polylines = flatten_path(&commands, FlattenQuality::HIT_TEST);
        assert_eq!(polylines[0].len(), 3);
    }

    #[test]
    fn test_line_after_close_starts_at_subpath_start() {
        let commands = vec![
            PathCommand::MoveTo { x: 2.0, y: 3.0 },
            PathCommand::LineTo { x: 10.0, y: 3.0 },
            PathCommand::Close,
            PathCommand::LineTo { x: 5.0, y: 8.0 },
        ];
        let polylines = flatten_path(&commands, FlattenQuality::HIT_TEST);
        assert_eq!(polylines.len(), 2);
        // Close resets the current point to the subpath start, so the
        // trailing segment runs from there, not from the origin.
        assert_eq!(
            polylines[1],
            vec![Point::new(2.0, 3.0), Point::new(5.0, 8.0)]
        );
    }

    #[test]
    fn test_relative_commands() {
        let commands = vec![
            PathCommand::MoveTo { x: 10.0, y: 10.0 },
            PathCommand::RelLineTo { dx: 5.0, dy: 0.0 },
            PathCommand::RelMoveTo { dx: 5.0, dy: 5.0 },
            PathCommand::RelLineTo { dx: 0.0, dy: 10.0 },
        ];
        let polylines = flatten_path(&commands, FlattenQuality::HIT_TEST);
        assert_eq!(polylines.len(), 2);
        assert_eq!(polylines[0][1], Point::new(15.0, 10.0));
        assert_eq!(polylines[1][0], Point::new(20.0, 15.0));
        assert_eq!(polylines[1][1], Point::new(20.0, 25.0));
    }

    #[test]
    fn test_quad_sample_count() {
        let commands = vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::QuadTo {
                cx: 5.0,
                cy: 10.0,
                x: 10.0,
                y: 0.0,
            },
        ];
        let polylines = flatten_path(&commands, FlattenQuality::HIT_TEST);
        // Start point plus quad_samples sampled points.
        assert_eq!(
            polylines[0].len(),
            1 + FlattenQuality::HIT_TEST.quad_samples
        );
        // Endpoint lands exactly on the curve's end.
        assert_eq!(polylines[0].last().copied(), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_cubic_midpoint_on_curve() {
        let commands = vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::CubicTo {
                c1x: 0.0,
                c1y: 10.0,
                c2x: 10.0,
                c2y: 10.0,
                x: 10.0,
                y: 0.0,
            },
        ];
        let polylines = flatten_path(&commands, FlattenQuality::OUTLINE);
        let n = FlattenQuality::OUTLINE.cubic_samples;
        let mid = polylines[0][n / 2];
        // Symmetric cubic peaks at y = 7.5 in the middle.
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!((mid.y - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_endpoints_only_flattening() {
        let commands = vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::QuadTo {
                cx: 5.0,
                cy: 10.0,
                x: 10.0,
                y: 0.0,
            },
            PathCommand::LineTo { x: 20.0, y: 0.0 },
        ];
        let polylines = path_endpoints(&commands);
        assert_eq!(polylines[0].len(), 3);
        assert_eq!(polylines[0][1], Point::new(10.0, 0.0));
    }
}
