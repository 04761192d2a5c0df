use glam::DVec2;

use crate::track::Checkpoint;

// which side of the line a->b the point p sits on (sign of the cross product)
fn orientation(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (b - a).perp_dot(p - a)
}

impl Checkpoint {
    /* Did a car moving from `from` to `to` this tick cross this line? The
     * start of the move counts as being on the line's negative side, so a car
     * that stopped exactly on the line only crosses it once */
    pub fn crossed_by(&self, from: DVec2, to: DVec2) -> bool {
        if from == to {
            return false;
        }

        let from_side = orientation(self.start, self.end, from) > 0.0;
        let to_side = orientation(self.start, self.end, to) > 0.0;
        if from_side == to_side {
            return false;
        }

        // the move has to pass between the checkpoint's endpoints, not around them
        let start_side = orientation(from, to, self.start);
        let end_side = orientation(from, to, self.end);
        start_side * end_side <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> Checkpoint {
        Checkpoint {
            index: 0,
            start: DVec2::new(100.0, 0.0),
            end: DVec2::new(100.0, 50.0),
        }
    }

    #[test]
    fn straight_through_counts() {
        assert!(gate().crossed_by(DVec2::new(95.0, 25.0), DVec2::new(105.0, 25.0)));
    }

    #[test]
    fn either_direction_counts() {
        assert!(gate().crossed_by(DVec2::new(105.0, 10.0), DVec2::new(95.0, 12.0)));
    }

    #[test]
    fn going_around_the_end_does_not() {
        assert!(!gate().crossed_by(DVec2::new(95.0, 60.0), DVec2::new(105.0, 60.0)));
    }

    #[test]
    fn stopping_short_does_not() {
        assert!(!gate().crossed_by(DVec2::new(90.0, 25.0), DVec2::new(99.0, 25.0)));
    }

    #[test]
    fn parked_on_the_line_does_not() {
        let on_line = DVec2::new(100.0, 25.0);
        assert!(!gate().crossed_by(on_line, on_line));
    }
}
