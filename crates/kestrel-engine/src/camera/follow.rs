use std::cell::Cell;
use std::rc::Rc;

use crate::coords::Vec2;

/// Distance under which a pending target is promoted to current.
pub const HANDOFF_EPSILON: f32 = 0.5;

/// Anything the camera can follow.
pub trait FollowTarget {
    /// Preferred camera target given where the camera currently is.
    fn follow_position(&self, camera_position: Vec2) -> Vec2;
}

impl FollowTarget for Vec2 {
    fn follow_position(&self, _camera_position: Vec2) -> Vec2 {
        *self
    }
}

impl FollowTarget for Cell<Vec2> {
    fn follow_position(&self, _camera_position: Vec2) -> Vec2 {
        self.get()
    }
}

/// Follow bookkeeping for [`Camera`](super::Camera).
pub struct FollowState {
    current: Option<Rc<dyn FollowTarget>>,
    pending: Option<Rc<dyn FollowTarget>>,
    /// Fraction of the remaining distance kept per 1/60 s; 0 snaps.
    smoothing: f32,
    /// Dead-zone radius in world units; 0 disables it.
    boundary_radius: f32,
}

impl Default for FollowState {
    fn default() -> Self {
        Self {
            current: None,
            pending: None,
            smoothing: 0.0,
            boundary_radius: 0.0,
        }
    }
}

impl std::fmt::Debug for FollowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowState")
            .field("has_current", &self.current.is_some())
            .field("has_pending", &self.pending.is_some())
            .field("smoothing", &self.smoothing)
            .field("boundary_radius", &self.boundary_radius)
            .finish()
    }
}

impl FollowState {
    pub fn set(&mut self, target: Rc<dyn FollowTarget>) {
        self.current = Some(target);
        self.pending = None;
    }

    pub fn change(&mut self, target: Rc<dyn FollowTarget>) {
        if self.current.is_none() {
            self.set(target);
        } else {
            self.pending = Some(target);
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.pending = None;
    }

    pub fn has_target(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_handing_off(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = if smoothing.is_finite() { smoothing.clamp(0.0, 0.999) } else { 0.0 };
    }

    pub fn set_boundary_radius(&mut self, radius: f32) {
        self.boundary_radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    }

    /// Returns the camera target after `dt` seconds of following.
    pub fn advance(&mut self, position: Vec2, dt: f32) -> Vec2 {
        if let Some(pending) = &self.pending {
            let goal = pending.follow_position(position);
            let next = self.approach(position, goal, dt);
            if next.distance(goal) < HANDOFF_EPSILON {
                self.current = self.pending.take();
                log::debug!("camera follow handoff complete");
                return goal;
            }
            return next;
        }

        let Some(current) = &self.current else {
            return position;
        };

        let mut goal = current.follow_position(position);
        if self.boundary_radius > 0.0 {
            let delta = goal - position;
            let dist = delta.length();
            if dist <= self.boundary_radius {
                return position;
            }
            // Only close the distance that leaves the dead zone.
            goal = position + delta * ((dist - self.boundary_radius) / dist);
        }
        self.approach(position, goal, dt)
    }

    fn approach(&self, from: Vec2, to: Vec2, dt: f32) -> Vec2 {
        if self.smoothing <= 0.0 {
            return to;
        }
        let keep = self.smoothing.powf(dt.max(0.0) * 60.0);
        from.lerp(to, 1.0 - keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> Rc<dyn FollowTarget> {
        Rc::new(Vec2::new(x, y))
    }

    #[test]
    fn no_target_keeps_position() {
        let mut f = FollowState::default();
        assert_eq!(f.advance(Vec2::new(3.0, 4.0), 0.016), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn unsmoothed_follow_snaps() {
        let mut f = FollowState::default();
        f.set(point(100.0, 50.0));
        assert_eq!(f.advance(Vec2::zero(), 0.016), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn smoothed_follow_moves_part_way() {
        let mut f = FollowState::default();
        f.set_smoothing(0.5);
        f.set(point(100.0, 0.0));
        let next = f.advance(Vec2::zero(), 1.0 / 60.0);
        assert!((next.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn change_without_current_behaves_like_set() {
        let mut f = FollowState::default();
        f.change(point(1.0, 1.0));
        assert!(f.has_target());
        assert!(!f.is_handing_off());
    }

    #[test]
    fn change_hands_off_once_within_epsilon() {
        let mut f = FollowState::default();
        f.set_smoothing(0.5);
        f.set(point(0.0, 0.0));
        f.change(point(64.0, 0.0));
        assert!(f.is_handing_off());

        let mut pos = Vec2::zero();
        for _ in 0..32 {
            pos = f.advance(pos, 1.0 / 60.0);
            if !f.is_handing_off() {
                break;
            }
        }
        assert!(!f.is_handing_off());
        assert_eq!(pos, Vec2::new(64.0, 0.0));
    }

    #[test]
    fn boundary_radius_creates_dead_zone() {
        let mut f = FollowState::default();
        f.set_boundary_radius(10.0);
        f.set(point(5.0, 0.0));
        assert_eq!(f.advance(Vec2::zero(), 0.016), Vec2::zero());

        f.set(point(25.0, 0.0));
        let next = f.advance(Vec2::zero(), 0.016);
        assert!((next.x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn cell_target_tracks_updates() {
        let target = Rc::new(Cell::new(Vec2::new(1.0, 2.0)));
        let mut f = FollowState::default();
        f.set(target.clone());
        assert_eq!(f.advance(Vec2::zero(), 0.016), Vec2::new(1.0, 2.0));
        target.set(Vec2::new(9.0, 9.0));
        assert_eq!(f.advance(Vec2::zero(), 0.016), Vec2::new(9.0, 9.0));
    }
}
