pub use glam::Vec2 as Point;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const INFINITE: Self = Self::new(f32::INFINITY, f32::INFINITY);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_finite(self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }

    /// First offending component, if either dimension is negative or NaN.
    pub(crate) fn out_of_range_component(self) -> Option<f32> {
        [self.width, self.height]
            .into_iter()
            .find(|value| value.is_nan() || *value < 0.0)
    }

    pub fn deflate(self, thickness: Thickness) -> Self {
        Self {
            width: (self.width - thickness.horizontal()).max(0.0),
            height: (self.height - thickness.vertical()).max(0.0),
        }
    }

    pub fn inflate(self, thickness: Thickness) -> Self {
        Self {
            width: self.width + thickness.horizontal(),
            height: self.height + thickness.vertical(),
        }
    }

    pub fn max(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn translate(&self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Overlap of two rectangles. Disjoint rectangles collapse to an empty
    /// rectangle rather than one with negative extent.
    pub fn intersect(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Self::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    pub fn deflate(&self, thickness: Thickness) -> Self {
        let size = self.size().deflate(thickness);
        Self::new(
            self.x + thickness.left,
            self.y + thickness.top,
            size.width,
            size.height,
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thickness {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Thickness {
    pub const ZERO: Self = Self::uniform(0.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_intersection_is_empty_not_negative() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 30.0, 5.0, 5.0);
        let clip = a.intersect(&b);
        assert_eq!(clip.width, 0.0);
        assert_eq!(clip.height, 0.0);
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(10.0, 20.0)));
        assert!(rect.contains(Point::new(50.0, 30.0)));
        assert!(!rect.contains(Point::new(110.0, 30.0)));
        assert!(!rect.contains(Point::new(50.0, 70.0)));
    }

    #[test]
    fn deflate_never_goes_negative() {
        let size = Size::new(10.0, 4.0).deflate(Thickness::uniform(3.0));
        assert_eq!(size, Size::new(4.0, 0.0));
    }

    #[test]
    fn out_of_range_reports_nan_and_negative() {
        assert_eq!(Size::new(1.0, 2.0).out_of_range_component(), None);
        assert_eq!(Size::new(-1.0, 2.0).out_of_range_component(), Some(-1.0));
        assert!(Size::new(1.0, f32::NAN).out_of_range_component().is_some());
        assert_eq!(Size::INFINITE.out_of_range_component(), None);
    }
}
