//! EMU units and the box arithmetic shared by the slide templates.

/// English Metric Units; 914400 per inch, 12700 per point.
pub type Emu = i64;

pub const EMU_PER_INCH: Emu = 914_400;
pub const EMU_PER_POINT: Emu = 12_700;

pub fn inches(value: f64) -> Emu {
    (value * EMU_PER_INCH as f64).round() as Emu
}

pub fn pt(value: f64) -> Emu {
    (value * EMU_PER_POINT as f64).round() as Emu
}

/// An axis-aligned box in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl Rect {
    pub fn new(x: Emu, y: Emu, cx: Emu, cy: Emu) -> Self {
        Self { x, y, cx, cy }
    }

    pub fn right(&self) -> Emu {
        self.x + self.cx
    }

    pub fn bottom(&self) -> Emu {
        self.y + self.cy
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Fit an image into `area` at most `ratio` of its width and height.
///
/// Width is tried first; if the resulting height overflows, height becomes
/// the binding axis. The result is centered in `area`.
pub fn fit_within(image_w: u32, image_h: u32, area: Rect, ratio: f64) -> Option<Rect> {
    if image_w == 0 || image_h == 0 || area.cx <= 0 || area.cy <= 0 {
        return None;
    }
    let (w, h) = (image_w as f64, image_h as f64);

    let mut target_w = (area.cx as f64 * ratio).floor();
    let mut target_h = (target_w * h / w).floor();
    let max_h = area.cy as f64 * ratio;
    if target_h > max_h {
        target_h = max_h.floor();
        target_w = (target_h * w / h).floor();
    }

    Some(centered(area, target_w as Emu, target_h as Emu))
}

/// Scale by the smaller of the two axis ratios, times `ratio`, and center.
pub fn fit_scaled(image_w: u32, image_h: u32, area: Rect, ratio: f64) -> Option<Rect> {
    if image_w == 0 || image_h == 0 || area.cx <= 0 || area.cy <= 0 {
        return None;
    }
    let (w, h) = (image_w as f64, image_h as f64);
    let scale = (area.cx as f64 / w).min(area.cy as f64 / h) * ratio;

    Some(centered(
        area,
        (w * scale).floor() as Emu,
        (h * scale).floor() as Emu,
    ))
}

fn centered(area: Rect, cx: Emu, cy: Emu) -> Rect {
    Rect {
        x: area.x + (area.cx - cx) / 2,
        y: area.y + (area.cy - cy) / 2,
        cx,
        cy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspect_close(fitted: Rect, w: u32, h: u32) {
        let expected = w as f64 / h as f64;
        let actual = fitted.cx as f64 / fitted.cy as f64;
        // One EMU of truncation on either axis.
        let tolerance = expected * (1.0 / fitted.cx as f64 + 1.0 / fitted.cy as f64);
        assert!(
            (expected - actual).abs() <= tolerance,
            "aspect {actual} differs from {expected}"
        );
    }

    #[test]
    fn units() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(0.7), 640_080);
        assert_eq!(pt(6.0), 76_200);
    }

    #[test]
    fn wide_image_is_width_bound() {
        let area = Rect::new(0, 0, inches(4.0), inches(3.0));
        let fitted = fit_within(1600, 400, area, 0.9).unwrap();
        assert_eq!(fitted.cx, (inches(4.0) as f64 * 0.9).floor() as Emu);
        assert!(fitted.cy as f64 <= area.cy as f64 * 0.9);
        aspect_close(fitted, 1600, 400);
        assert!(area.contains(&fitted));
    }

    #[test]
    fn tall_image_is_height_bound() {
        let area = Rect::new(inches(5.0), inches(3.0), inches(4.0), inches(3.0));
        let fitted = fit_within(300, 900, area, 0.85).unwrap();
        assert_eq!(fitted.cy, (inches(3.0) as f64 * 0.85).floor() as Emu);
        assert!(fitted.cx as f64 <= area.cx as f64 * 0.85);
        aspect_close(fitted, 300, 900);
        assert!(area.contains(&fitted));
    }

    #[test]
    fn fitted_image_is_centered() {
        let area = Rect::new(100, 200, 1000, 1000);
        let fitted = fit_within(100, 100, area, 0.5).unwrap();
        assert_eq!(fitted, Rect::new(350, 450, 500, 500));
    }

    #[test]
    fn scaled_fit_respects_both_axes() {
        let area = Rect::new(0, 0, inches(8.6), inches(3.0));
        for (w, h) in [(1024, 1024), (1920, 1080), (400, 1200), (5000, 10)] {
            let fitted = fit_scaled(w, h, area, 0.85).unwrap();
            assert!(fitted.cx as f64 <= area.cx as f64 * 0.85 + 1.0);
            assert!(fitted.cy as f64 <= area.cy as f64 * 0.85 + 1.0);
            assert!(area.contains(&fitted));
            if fitted.cy > 1000 && fitted.cx > 1000 {
                aspect_close(fitted, w, h);
            }
        }
    }

    #[test]
    fn degenerate_inputs_do_not_fit() {
        let area = Rect::new(0, 0, 100, 100);
        assert_eq!(fit_within(0, 10, area, 0.9), None);
        assert_eq!(fit_scaled(10, 0, area, 0.9), None);
        assert_eq!(fit_within(10, 10, Rect::new(0, 0, 0, 100), 0.9), None);
    }
}
