#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dotted,
    Dashed,
    DashDot,
}

impl LineStyle {
    /// Alternating on/off lengths in pixels, starting with a visible stroke.
    pub fn pattern(&self) -> &'static [f64] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dotted => &[3.0, 6.0],
            LineStyle::Dashed => &[16.0, 8.0],
            LineStyle::DashDot => &[16.0, 6.0, 3.0, 6.0],
        }
    }
}

/// Split a polyline in pixel coordinates into the visible strokes of a dash
/// pattern. The pattern phase carries over from one segment to the next.
///
/// plotters' `DashedPathElement` only takes a single dash and gap length, so it
/// cannot draw dash-dot lines.
pub fn dash_segments(points: &[(i32, i32)], pattern: &[f64]) -> Vec<Vec<(i32, i32)>> {
    if points.len() < 2 {
        return vec![];
    }
    if pattern.is_empty() || pattern.iter().sum::<f64>() <= 0.0 {
        return vec![points.to_vec()];
    }

    let to_pixel = |x: f64, y: f64| (x.round() as i32, y.round() as i32);

    let mut dashes = Vec::new();
    let mut current: Vec<(i32, i32)> = Vec::new();
    let mut phase = 0;
    let mut remaining = pattern[0];

    for pair in points.windows(2) {
        let (x0, y0) = (pair[0].0 as f64, pair[0].1 as f64);
        let (x1, y1) = (pair[1].0 as f64, pair[1].1 as f64);
        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let at = |pos: f64| {
            let t = if length > 0.0 { pos / length } else { 0.0 };
            to_pixel(x0 + t * (x1 - x0), y0 + t * (y1 - y0))
        };

        let mut pos = 0.0;
        while pos < length {
            let step = remaining.min(length - pos);
            let visible = phase % 2 == 0;

            if visible {
                if current.is_empty() {
                    current.push(at(pos));
                }
                current.push(at(pos + step));
            }

            pos += step;
            remaining -= step;
            if remaining <= 1e-9 {
                if visible && current.len() > 1 {
                    dashes.push(std::mem::take(&mut current));
                }
                current.clear();
                phase = (phase + 1) % pattern.len();
                remaining = pattern[phase];
            }
        }
    }

    if current.len() > 1 {
        dashes.push(current);
    }

    dashes
}
