use glam::DVec2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn around(center: DVec2, half_extents: DVec2) -> BoundingBox {
        BoundingBox {
            min_x: center.x - half_extents.x,
            max_x: center.x + half_extents.x,
            min_y: center.y - half_extents.y,
            max_y: center.y + half_extents.y,
        }
    }

    // touching edges don't count, otherwise two cars pushed exactly apart
    // would keep registering as a collision
    pub fn is_colliding(&self, other: &BoundingBox) -> bool {
        (self.min_x < other.max_x && self.max_x > other.min_x)
            && (self.min_y < other.max_y && self.max_y > other.min_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(x: f64, y: f64) -> BoundingBox {
        BoundingBox::around(DVec2::new(x, y), DVec2::new(5.0, 5.0))
    }

    #[test]
    fn collides_with_self() {
        let origin = unit_box_at(0.0, 0.0);
        assert!(origin.is_colliding(&origin));
    }

    #[test]
    fn engulfed_box_collides() {
        let big = unit_box_at(0.0, 0.0);
        let small = BoundingBox::around(DVec2::new(1.0, 1.0), DVec2::new(0.5, 0.5));
        assert!(big.is_colliding(&small));
        assert!(small.is_colliding(&big));
    }

    #[test]
    fn corners_just_apart_do_not_collide() {
        let origin = unit_box_at(0.0, 0.0);
        assert!(origin.is_colliding(&unit_box_at(9.9, 9.9)));
        assert!(!origin.is_colliding(&unit_box_at(10.0, 10.0)));
        assert!(!origin.is_colliding(&unit_box_at(10.1, 0.0)));
    }
}
