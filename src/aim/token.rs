use bevy::prelude::*;

/// The draggable token. Positions are in screen space, like the drag session.
///
/// While held it follows the clamped drag position; after release it is a
/// Verlet particle on a damped spring towards the anchor.
#[derive(Component, Clone, Copy, Debug)]
pub struct Token {
    /// Current position x_t.
    pub position: Vec2,
    /// Previous position x_{t-1} (encodes velocity implicitly).
    pub previous_position: Vec2,
    pub radius: f32,
    /// True once the token has settled on the anchor.
    pub resting: bool,
}

impl Token {
    pub fn at_rest(anchor: Vec2, radius: f32) -> Self {
        Self {
            position: anchor,
            previous_position: anchor,
            radius,
            resting: true,
        }
    }

    /// Pin the token to `pos` with zero velocity (used while it is held).
    pub fn hold_at(&mut self, pos: Vec2) {
        self.position = pos;
        self.previous_position = pos;
        self.resting = false;
    }

    /// Let go at the current position; the spring takes over from here.
    pub fn release(&mut self) {
        self.previous_position = self.position;
        self.resting = false;
    }

    /// One position-Verlet step of the spring towards `anchor`:
    /// x_{t+1} = x_t + (x_t - x_{t-1}) * damping - k (x_t - anchor) dt^2
    ///
    /// `damping` is the per-tick factor on the velocity-like term. Snaps onto
    /// the anchor once both offset and speed drop below `rest_epsilon`.
    pub fn spring_step(
        &mut self,
        anchor: Vec2,
        stiffness: f32,
        damping: f32,
        dt: f32,
        rest_epsilon: f32,
    ) {
        if self.resting {
            self.position = anchor;
            self.previous_position = anchor;
            return;
        }
        let x_t = self.position;
        let vel_term = (x_t - self.previous_position) * damping;
        let accel = -stiffness * (x_t - anchor);
        let x_tp1 = x_t + vel_term + accel * (dt * dt);

        self.previous_position = x_t;
        self.position = x_tp1;

        let speed = (x_tp1 - x_t).length();
        if x_tp1.distance(anchor) < rest_epsilon && speed < rest_epsilon {
            *self = Self::at_rest(anchor, self.radius);
        }
    }
}
