//! Kinematic jump/fall integrator for the player.
//!
//! Integration is frame-coupled semi-implicit Euler: velocity first, then
//! position, once per rendered frame. There is no fixed timestep.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Vertical kinematic state of the player.
///
/// After every [`PlayerBody::integrate`] call:
/// `vertical_position == 0 ⇒ vertical_velocity == 0 ∧ jumps_remaining == max_jumps`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    vertical_position: f32,
    vertical_velocity: f32,
    jumps_remaining: u8,
    max_jumps: u8,
    airborne: bool,
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStep {
    /// Resting on the ground, nothing to integrate.
    Grounded,
    /// Still in the air after this step.
    Airborne,
    /// Touched down during this step.
    Landed,
}

impl PlayerBody {
    /// A body at rest with a full jump budget.
    pub fn at_rest(max_jumps: u8) -> Self {
        Self {
            vertical_position: 0.0,
            vertical_velocity: 0.0,
            jumps_remaining: max_jumps,
            max_jumps,
            airborne: false,
        }
    }

    pub fn vertical_position(&self) -> f32 {
        self.vertical_position
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn jumps_remaining(&self) -> u8 {
        self.jumps_remaining
    }

    pub fn max_jumps(&self) -> u8 {
        self.max_jumps
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub fn is_grounded(&self) -> bool {
        self.vertical_position == 0.0
    }

    /// Spend one unit of jump budget. Returns false (and changes nothing) when
    /// the budget is exhausted.
    pub fn jump(&mut self, impulse: f32) -> bool {
        if self.jumps_remaining == 0 {
            return false;
        }
        self.jumps_remaining -= 1;
        self.vertical_velocity = impulse;
        self.airborne = true;
        true
    }

    /// Advance one frame under gravity. Runs while a jump is in progress or the
    /// body is above the ground; a grounded idle body is left untouched.
    pub fn integrate(&mut self, gravity: f32) -> BodyStep {
        if !self.airborne && self.vertical_position <= 0.0 {
            return BodyStep::Grounded;
        }

        self.vertical_velocity -= gravity;
        self.vertical_position += self.vertical_velocity;

        if self.vertical_position <= 0.0 {
            self.vertical_position = 0.0;
            self.vertical_velocity = 0.0;
            self.airborne = false;
            self.jumps_remaining = self.max_jumps;
            BodyStep::Landed
        } else {
            BodyStep::Airborne
        }
    }

    /// Cosmetic running bob for the rendered pose. Zero while off the ground;
    /// never feeds back into collision.
    pub fn run_bob(&self, elapsed: f32, config: &SimConfig) -> f32 {
        if self.is_grounded() {
            (elapsed * config.run_bob_frequency).sin().abs() * config.run_bob_amplitude
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ground_invariant(body: &PlayerBody) {
        assert!(body.vertical_position() >= 0.0);
        if body.vertical_position() == 0.0 {
            assert_eq!(body.vertical_velocity(), 0.0);
            assert_eq!(body.jumps_remaining(), body.max_jumps());
        }
    }

    #[test]
    fn rest_body_does_not_move() {
        let mut body = PlayerBody::at_rest(2);
        for _ in 0..10 {
            assert_eq!(body.integrate(0.013), BodyStep::Grounded);
        }
        assert_eq!(body, PlayerBody::at_rest(2));
    }

    #[test]
    fn single_jump_rises_then_lands() {
        let config = SimConfig::default();
        let mut body = PlayerBody::at_rest(config.max_jumps);
        assert!(body.jump(config.jump_impulse));

        let mut frames = 0;
        let mut peak: f32 = 0.0;
        loop {
            let step = body.integrate(config.gravity);
            frames += 1;
            peak = peak.max(body.vertical_position());
            assert_ground_invariant(&body);
            if step == BodyStep::Landed {
                break;
            }
            assert!(frames < 1000, "body never landed");
        }
        // v0 = 0.26, g = 0.013: twenty frames up, twenty down.
        assert!((39..=41).contains(&frames), "landed after {frames} frames");
        assert!(peak > 2.4 && peak < 2.8, "peak {peak}");
    }

    #[test]
    fn first_step_uses_updated_velocity() {
        let mut body = PlayerBody::at_rest(2);
        body.jump(0.26);
        body.integrate(0.013);
        assert!((body.vertical_velocity() - 0.247).abs() < 1e-6);
        assert!((body.vertical_position() - 0.247).abs() < 1e-6);
    }

    #[test]
    fn double_jump_budget() {
        let mut body = PlayerBody::at_rest(2);
        assert!(body.jump(0.26));
        body.integrate(0.013);
        assert!(body.jump(0.26));
        assert_eq!(body.jumps_remaining(), 0);
        body.integrate(0.013);

        let before = body;
        assert!(!body.jump(0.26));
        assert_eq!(body, before);
    }

    #[test]
    fn landing_restores_budget() {
        let mut body = PlayerBody::at_rest(2);
        body.jump(0.26);
        body.jump(0.26);
        while body.integrate(0.013) != BodyStep::Landed {}
        assert_eq!(body.jumps_remaining(), 2);
        assert!(!body.is_airborne());
        assert_ground_invariant(&body);
    }

    #[test]
    fn position_never_negative_under_heavy_gravity() {
        let mut body = PlayerBody::at_rest(1);
        body.jump(0.05);
        for _ in 0..20 {
            body.integrate(1.0);
            assert_ground_invariant(&body);
        }
    }

    #[test]
    fn run_bob_only_on_ground() {
        let config = SimConfig::default();
        let mut body = PlayerBody::at_rest(2);
        let bob = body.run_bob(0.1, &config);
        assert!(bob > 0.0 && bob <= config.run_bob_amplitude);

        body.jump(config.jump_impulse);
        body.integrate(config.gravity);
        assert_eq!(body.run_bob(0.1, &config), 0.0);
    }
}
