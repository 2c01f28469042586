use serde::{Deserialize, Serialize};

/// A pointer position in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict containment: a point on the edge is outside
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 {
            return 0.0;
        }
        w * h
    }

    /// Intersection over the union of both areas, in `[0, 1]`
    pub fn intersection_ratio(&self, other: &Rect) -> f64 {
        let inter = self.intersection_area(other);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_containment_excludes_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_strict(Point::new(5.0, 5.0)));
        assert!(!r.contains_strict(Point::new(0.0, 5.0)));
        assert!(!r.contains_strict(Point::new(5.0, 10.0)));
        assert!(!r.contains_strict(Point::new(11.0, 5.0)));
    }

    #[test]
    fn intersection_area_and_ratio() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&b), 25.0);
        assert!((a.intersection_ratio(&b) - 25.0 / 175.0).abs() < 1e-9);
        let far = Rect::new(20.0, 20.0, 1.0, 1.0);
        assert_eq!(a.intersection_area(&far), 0.0);
        // touching edges do not intersect
        let touching = Rect::new(10.0, 0.0, 5.0, 5.0);
        assert_eq!(a.intersection_ratio(&touching), 0.0);
    }

    #[test]
    fn center_and_translate() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0).translate(5.0, -5.0);
        assert_eq!(r.center(), Point::new(30.0, 35.0));
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
