use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::coords::Vec2;

/// Parameters for [`Camera::shake`](super::Camera::shake).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShakeParams {
    /// Seconds until the shake has fully decayed.
    pub duration: f32,
    /// Peak translation per axis, in surface pixels.
    pub strength: Vec2,
    /// Peak relative zoom change (0.1 = ±10 %).
    pub zoom_strength: f32,
    /// Peak rotation, in radians.
    pub rotation_strength: f32,
    /// 0 = jittery, 1 = slow and rolling.
    pub smoothness: f32,
}

impl Default for ShakeParams {
    fn default() -> Self {
        Self {
            duration: 0.3,
            strength: Vec2::new(8.0, 8.0),
            zoom_strength: 0.0,
            rotation_strength: 0.0,
            smoothness: 0.5,
        }
    }
}

/// One sample of the shake perturbation.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ShakeSample {
    pub offset: Vec2,
    pub zoom: f32,
    pub rotation: f32,
}

const AXIS_X: usize = 0;
const AXIS_Y: usize = 1;
const AXIS_ZOOM: usize = 2;
const AXIS_ROTATION: usize = 3;

/// Noise retarget frequency range in Hz, picked by smoothness.
const JITTERY_HZ: f32 = 30.0;
const ROLLING_HZ: f32 = 2.0;

/// Critically damped spring chasing a random goal in `[-1, 1]`.
#[derive(Debug, Clone, Default)]
struct ShakeAxis {
    value: f32,
    velocity: f32,
    goal: f32,
    until_retarget: f32,
}

impl ShakeAxis {
    fn advance(&mut self, dt: f32, omega: f32) {
        let x = self.value - self.goal;
        let decay = (-omega * dt).exp();
        let temp = (self.velocity + omega * x) * dt;
        self.velocity = (self.velocity - omega * temp) * decay;
        self.value = self.goal + (x + temp) * decay;
    }
}

/// Decaying random-walk perturbation on x, y, zoom and rotation.
#[derive(Debug, Clone)]
pub struct ShakeState {
    axes: [ShakeAxis; 4],
    strength: [f32; 4],
    duration: f32,
    remaining: f32,
    period: f32,
    omega: f32,
    rng: SmallRng,
}

impl ShakeState {
    /// Returns `None` when the parameters describe no shake at all.
    pub fn new(params: ShakeParams, seed: u64) -> Option<Self> {
        if !(params.duration.is_finite() && params.duration > 0.0) {
            return None;
        }

        let smoothness = if params.smoothness.is_finite() {
            params.smoothness.clamp(0.0, 1.0)
        } else {
            ShakeParams::default().smoothness
        };
        let hz = JITTERY_HZ + (ROLLING_HZ - JITTERY_HZ) * smoothness;
        let mut state = Self {
            axes: Default::default(),
            strength: [
                finite_or_zero(params.strength.x),
                finite_or_zero(params.strength.y),
                finite_or_zero(params.zoom_strength),
                finite_or_zero(params.rotation_strength),
            ],
            duration: params.duration,
            remaining: params.duration,
            period: 1.0 / hz,
            omega: core::f32::consts::TAU * hz,
            rng: SmallRng::seed_from_u64(seed),
        };

        // Start displaced so the very first frame already shakes.
        for i in 0..state.axes.len() {
            let start = state.random_goal();
            let axis = &mut state.axes[i];
            axis.value = start;
            axis.goal = start;
        }
        Some(state)
    }

    /// Advances by `dt`; returns `false` once the shake has fully decayed.
    pub fn advance(&mut self, dt: f32) -> bool {
        let dt = dt.max(0.0);
        self.remaining = (self.remaining - dt).max(0.0);

        for i in 0..self.axes.len() {
            self.axes[i].until_retarget -= dt;
            if self.axes[i].until_retarget <= 0.0 {
                let goal = self.random_goal();
                let axis = &mut self.axes[i];
                axis.goal = goal;
                axis.until_retarget = self.period;
            }
            self.axes[i].advance(dt, self.omega);
        }

        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn sample(&self) -> ShakeSample {
        let envelope = self.remaining / self.duration;
        let v = |i: usize| self.axes[i].value * self.strength[i] * envelope;
        ShakeSample {
            offset: Vec2::new(v(AXIS_X), v(AXIS_Y)),
            zoom: v(AXIS_ZOOM),
            rotation: v(AXIS_ROTATION),
        }
    }

    /// Uniform in `[-1, -0.5] ∪ [0.5, 1]`.
    fn random_goal(&mut self) -> f32 {
        let magnitude = self.rng.gen_range(0.5..=1.0f32);
        if self.rng.gen_bool(0.5) { magnitude } else { -magnitude }
    }
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
