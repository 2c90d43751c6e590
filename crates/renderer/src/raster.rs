//! Primitive rasterization: lines and filled circles.
//!
//! Both primitives are total: callers may pass any `i64` coordinates. Shapes
//! are clipped to the canvas before rasterizing, so off-canvas geometry costs
//! nothing.

use crate::canvas::{Canvas, Color};

/// Draw a 1px line from `(x1, y1)` to `(x2, y2)` inclusive using the
/// integer Bresenham algorithm (delta-error form).
///
/// Segments with an endpoint off the canvas are first clipped to it, so the
/// work is bounded by the canvas size however far apart the endpoints are.
pub fn draw_line(canvas: &mut Canvas, x1: i64, y1: i64, x2: i64, y2: i64, color: Color) {
    let (x1, y1, x2, y2) = if canvas.in_bounds(x1, y1) && canvas.in_bounds(x2, y2) {
        (x1, y1, x2, y2)
    } else {
        match clip_segment(canvas, x1, y1, x2, y2) {
            Some(clipped) => clipped,
            None => return,
        }
    };
    bresenham(canvas, x1, y1, x2, y2, color);
}

/// Endpoints must lie within one pixel of the canvas.
fn bresenham(canvas: &mut Canvas, x1: i64, y1: i64, x2: i64, y2: i64, color: Color) {
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x2 < x1 { -1 } else { 1 };
    let sy = if y2 < y1 { -1 } else { 1 };

    let mut err = dx - dy;
    let (mut x, mut y) = (x1, y1);

    loop {
        canvas.set_pixel(x, y, color);

        if x == x2 && y == y2 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Liang-Barsky clip of a segment to the canvas grown by one pixel on each
/// side. `None` when nothing of the segment is near the canvas.
fn clip_segment(canvas: &Canvas, x1: i64, y1: i64, x2: i64, y2: i64) -> Option<(i64, i64, i64, i64)> {
    let (min_x, min_y) = (-1.0, -1.0);
    let (max_x, max_y) = (canvas.width() as f64, canvas.height() as f64);

    let (fx1, fy1) = (x1 as f64, y1 as f64);
    let (dx, dy) = (x2 as f64 - fx1, y2 as f64 - fy1);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, fx1 - min_x),
        (dx, max_x - fx1),
        (-dy, fy1 - min_y),
        (dy, max_y - fy1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    // Float error on huge inputs may leave a point slightly outside the box
    let snap_x = |t: f64| (fx1 + t * dx).round().clamp(min_x, max_x) as i64;
    let snap_y = |t: f64| (fy1 + t * dy).round().clamp(min_y, max_y) as i64;

    // Keep exact endpoints that were already inside
    let start = if t0 == 0.0 { (x1, y1) } else { (snap_x(t0), snap_y(t0)) };
    let end = if t1 == 1.0 { (x2, y2) } else { (snap_x(t1), snap_y(t1)) };
    Some((start.0, start.1, end.0, end.1))
}

/// Fill every pixel `(cx + dx, cy + dy)` with `dx² + dy² <= radius²`.
pub fn draw_filled_circle(canvas: &mut Canvas, cx: i64, cy: i64, radius: i64, color: Color) {
    if radius < 0 {
        return;
    }
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);

    // Only offsets that land on the canvas
    let dy_min = (-radius).max(0i64.saturating_sub(cy));
    let dy_max = radius.min((height - 1).saturating_sub(cy));
    let dx_min = (-radius).max(0i64.saturating_sub(cx));
    let dx_max = radius.min((width - 1).saturating_sub(cx));
    if dy_min > dy_max || dx_min > dx_max {
        return;
    }

    let r2 = (radius as i128) * (radius as i128);
    for dy in dy_min..=dy_max {
        for dx in dx_min..=dx_max {
            if (dx as i128) * (dx as i128) + (dy as i128) * (dy as i128) > r2 {
                continue;
            }
            canvas.set_pixel(cx + dx, cy + dy, color);
        }
    }
}
