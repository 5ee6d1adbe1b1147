/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use pipe3d_core::raster::{triangle_outline, Coordinate2D};
use pipe3d_core::PolyTriangle;
use std::io::Write;

/// Character ramp for depth cueing (farthest to nearest)
const DEPTH_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '%', '@'];
const EDGE_CHAR: char = '#';

/// Character-cell canvas consuming screen-space triangles
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f64>,
    char_buffer: Vec<char>,
    pub wireframe: bool,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f64::INFINITY; size],
            char_buffer: vec![' '; size],
            wireframe: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f64::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Draw pipeline output: filled faces unless in wireframe mode, then edges
    pub fn render_triangles(&mut self, triangles: &[PolyTriangle]) {
        for triangle in triangles {
            if !self.wireframe {
                let character = depth_char(triangle);
                self.rasterize_triangle(triangle, character);
            }
            self.plot(&triangle_outline(triangle), EDGE_CHAR);
        }
    }

    /// Write raw lattice points, ignoring any outside the canvas
    pub fn plot(&mut self, points: &[Coordinate2D], character: char) {
        for p in points {
            if p.x < 0 || p.y < 0 || p.x as usize >= self.width || p.y as usize >= self.height {
                continue;
            }
            let idx = p.linear_id(self.width as i32) as usize;
            self.char_buffer[idx] = character;
        }
    }

    fn rasterize_triangle(&mut self, triangle: &PolyTriangle, character: char) {
        let (v0, v1, v2) = (triangle[0], triangle[1], triangle[2]);

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i64;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i64;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i64;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i64;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i64 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f64 + 0.5;
                let py = y as f64 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.z + w1 * v1.z + w2 * v2.z;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                        }
                    }
                }
            }
        }
    }

    /// Canvas rows as strings, top row first
    pub fn lines(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_buffer[y * self.width + x];

                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '%' | '@' => Color::Cyan,
                    EDGE_CHAR => Color::Yellow,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Ramp character from the triangle's mean camera depth (W)
fn depth_char(triangle: &PolyTriangle) -> char {
    let mean_w = triangle.vertices().iter().map(|v| v.w).sum::<f64>() / triangle.len() as f64;
    // Nearer than one unit is fully bright; brightness halves every doubling
    let brightness = (1.0 / mean_w.max(1.0)).clamp(0.0, 1.0);
    let index = (brightness * (DEPTH_RAMP.len() - 1) as f64).round() as usize;
    DEPTH_RAMP[index.min(DEPTH_RAMP.len() - 1)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipe3d_core::Vector3D;

    fn screen_tri(points: [(f64, f64, f64); 3]) -> PolyTriangle {
        let [a, b, c] = points.map(|(x, y, z)| Vector3D::new(x, y, z));
        PolyTriangle::triangle(a, b, c)
    }

    #[test]
    fn test_plot_skips_out_of_range() {
        let mut renderer = AsciiRenderer::new(3, 2);
        renderer.plot(
            &[Coordinate2D::new(1, 1), Coordinate2D::new(-1, 0), Coordinate2D::new(3, 0)],
            'x',
        );
        assert_eq!(renderer.lines(), vec!["   ".to_string(), " x ".to_string()]);
    }

    #[test]
    fn test_wireframe_draws_edges_only() {
        let mut renderer = AsciiRenderer::new(6, 6);
        renderer.wireframe = true;
        let tri = screen_tri([(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (0.0, 4.0, 0.0)]);
        renderer.render_triangles(&[tri]);
        let lines = renderer.lines();
        assert_eq!(lines[0], "##### ");
        assert_eq!(lines[2], "# #   ");
        assert!(lines.iter().all(|l| !l.contains('@')));
    }

    #[test]
    fn test_nearer_triangle_wins_depth_test() {
        let mut renderer = AsciiRenderer::new(10, 10);
        let far = screen_tri([(0.0, 0.0, 0.9), (10.0, 0.0, 0.9), (0.0, 10.0, 0.9)]);
        let near = screen_tri([(0.0, 0.0, 0.1), (10.0, 0.0, 0.1), (0.0, 10.0, 0.1)]);
        renderer.rasterize_triangle(&near, 'n');
        renderer.rasterize_triangle(&far, 'f');
        assert_eq!(renderer.lines()[1].chars().nth(1), Some('n'));

        renderer.clear();
        assert!(renderer.lines().iter().all(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_depth_char_ramp() {
        let mut near = screen_tri([(0.0, 0.0, 0.0); 3]);
        let mut far = near.clone();
        for i in 0..3 {
            near.set(i, Vector3D::with_w(0.0, 0.0, 0.0, 0.5)).unwrap();
            far.set(i, Vector3D::with_w(0.0, 0.0, 0.0, 100.0)).unwrap();
        }
        assert_eq!(depth_char(&near), '@');
        assert_eq!(depth_char(&far), '.');
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let renderer = AsciiRenderer::new(4, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches('\n').count(), 2);
    }
}
