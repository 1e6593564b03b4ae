//! Axis-aligned boxes with an opaque payload
//!
//! Corners are private: every box comes out of one of the normalizing
//! factories, so `x1 <= x2` and `y1 <= y2` always hold. The payload is shared
//! (`Rc`) between clones, which lets game code hang interaction metadata off a
//! box without the collision code knowing what it is.

use std::rc::Rc;

use glam::Vec2;

/// An axis-aligned rectangle carrying a shared payload of type `T`
#[derive(Debug)]
pub struct Aabb<T = ()> {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    data: Rc<T>,
}

// Manual impl: cloning shares the payload, so `T` need not be `Clone`.
impl<T> Clone for Aabb<T> {
    fn clone(&self) -> Self {
        Self {
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y2,
            data: Rc::clone(&self.data),
        }
    }
}

impl<T> Aabb<T> {
    /// Box spanning two arbitrary corners
    pub fn from_diagonal_with(a: Vec2, b: Vec2, data: Rc<T>) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
            data,
        }
    }

    /// Box from one corner and a (possibly negative) size
    pub fn from_dimensions_with(corner: Vec2, size: Vec2, data: Rc<T>) -> Self {
        Self::from_diagonal_with(corner, corner + size, data)
    }

    /// Box centred on `center` extending `radius.x` / `radius.y` each way
    pub fn from_radius_with(center: Vec2, radius: Vec2, data: Rc<T>) -> Self {
        Self::from_diagonal_with(center - radius, center + radius, data)
    }

    /// Unbounded box: contains and intersects every finite box
    pub fn universe_with(data: Rc<T>) -> Self {
        Self {
            x1: f32::NEG_INFINITY,
            y1: f32::NEG_INFINITY,
            x2: f32::INFINITY,
            y2: f32::INFINITY,
            data,
        }
    }

    /// Zero-area box at `p`
    pub fn point_with(p: Vec2, data: Rc<T>) -> Self {
        Self::from_diagonal_with(p, p, data)
    }

    /// Overlap test, inclusive of touching edges
    pub fn intersects<U>(&self, other: &Aabb<U>) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Point containment, inclusive on both axes
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    /// Translate in place
    pub fn offset(&mut self, delta: Vec2) -> &mut Self {
        self.x1 += delta.x;
        self.y1 += delta.y;
        self.x2 += delta.x;
        self.y2 += delta.y;
        self
    }

    /// Translated copy sharing the payload
    pub fn translated(&self, delta: Vec2) -> Self {
        let mut moved = self.clone();
        moved.offset(delta);
        moved
    }

    /// Copy grown by `margin` on every side (negative margins are clamped so
    /// the box never inverts)
    pub fn expanded(&self, margin: f32) -> Self {
        if !self.min().is_finite() || !self.max().is_finite() {
            return self.clone();
        }
        let half = Vec2::new(
            (self.width() / 2.0 + margin).max(0.0),
            (self.height() / 2.0 + margin).max(0.0),
        );
        Self::from_radius_with(self.middle(), half, Rc::clone(&self.data))
    }

    /// Centre point
    pub fn middle(&self) -> Vec2 {
        Vec2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x1, self.y1)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x2, self.y2)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// The payload attached to this box
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Shared handle to the payload
    pub fn data_rc(&self) -> &Rc<T> {
        &self.data
    }
}

impl<T: Default> Aabb<T> {
    pub fn from_diagonal(a: Vec2, b: Vec2) -> Self {
        Self::from_diagonal_with(a, b, Rc::default())
    }

    pub fn from_dimensions(corner: Vec2, size: Vec2) -> Self {
        Self::from_dimensions_with(corner, size, Rc::default())
    }

    pub fn from_radius(center: Vec2, radius: Vec2) -> Self {
        Self::from_radius_with(center, radius, Rc::default())
    }

    pub fn universe() -> Self {
        Self::universe_with(Rc::default())
    }

    pub fn point(p: Vec2) -> Self {
        Self::point_with(p, Rc::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord() -> impl Strategy<Value = f32> {
        -1000.0f32..1000.0
    }

    fn any_box() -> impl Strategy<Value = Aabb> {
        (coord(), coord(), coord(), coord())
            .prop_map(|(x1, y1, x2, y2)| Aabb::from_diagonal(Vec2::new(x1, y1), Vec2::new(x2, y2)))
    }

    proptest! {
        #[test]
        fn prop_diagonal_normalizes(x1 in coord(), y1 in coord(), x2 in coord(), y2 in coord()) {
            let b: Aabb = Aabb::from_diagonal(Vec2::new(x1, y1), Vec2::new(x2, y2));
            prop_assert!(b.min().x <= b.max().x);
            prop_assert!(b.min().y <= b.max().y);
        }

        #[test]
        fn prop_dimensions_normalize(x in coord(), y in coord(), w in coord(), h in coord()) {
            let b: Aabb = Aabb::from_dimensions(Vec2::new(x, y), Vec2::new(w, h));
            prop_assert!(b.width() >= 0.0);
            prop_assert!(b.height() >= 0.0);
        }

        #[test]
        fn prop_intersects_symmetric(a in any_box(), b in any_box()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_contains_middle(b in any_box()) {
            prop_assert!(b.contains(b.middle()));
        }
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a: Aabb = Aabb::from_dimensions(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b: Aabb = Aabb::from_dimensions(Vec2::new(10.0, 0.0), Vec2::new(5.0, 5.0));
        assert!(a.intersects(&b));
        let c: Aabb = Aabb::from_dimensions(Vec2::new(10.01, 0.0), Vec2::new(5.0, 5.0));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_zero_height_zone_meets_walker() {
        // Zones on the floor line have no height; a walker standing on the
        // floor touches them at y = 0.
        let zone: Aabb = Aabb::from_dimensions(Vec2::new(40.0, 0.0), Vec2::new(30.0, 0.0));
        let walker: Aabb = Aabb::from_dimensions(Vec2::new(50.0, 0.0), Vec2::new(16.0, -24.0));
        assert!(zone.intersects(&walker));
    }

    #[test]
    fn test_contains_inclusive() {
        let b: Aabb = Aabb::from_radius(Vec2::ZERO, Vec2::new(2.0, 1.0));
        assert!(b.contains(Vec2::new(2.0, 1.0)));
        assert!(b.contains(Vec2::new(-2.0, -1.0)));
        assert!(!b.contains(Vec2::new(2.001, 0.0)));
    }

    #[test]
    fn test_offset_chains_and_clone_shares_payload() {
        let mut b = Aabb::from_radius_with(Vec2::ZERO, Vec2::ONE, Rc::new(String::from("door")));
        let copy = b.clone();
        b.offset(Vec2::new(5.0, 0.0)).offset(Vec2::new(0.0, 2.0));
        assert_eq!(b.middle(), Vec2::new(5.0, 2.0));
        assert_eq!(copy.middle(), Vec2::ZERO);
        assert!(Rc::ptr_eq(b.data_rc(), copy.data_rc()));
        assert_eq!(Rc::strong_count(b.data_rc()), 2);
    }

    #[test]
    fn test_universe_and_point() {
        let all: Aabb = Aabb::universe();
        let p: Aabb = Aabb::point(Vec2::new(1e30, -1e30));
        assert!(all.intersects(&p));
        assert!(all.contains(Vec2::new(-1e30, 1e30)));
        assert_eq!(p.width(), 0.0);
        assert!(p.contains(p.middle()));
    }

    #[test]
    fn test_expanded() {
        let b: Aabb = Aabb::from_dimensions(Vec2::ZERO, Vec2::new(100.0, 50.0));
        let e = b.expanded(10.0);
        assert_eq!(e.min(), Vec2::new(-10.0, -10.0));
        assert_eq!(e.max(), Vec2::new(110.0, 60.0));
        let shrunk = b.expanded(-40.0);
        assert_eq!(shrunk.height(), 0.0);
        assert!(shrunk.width() > 0.0);
    }
}
