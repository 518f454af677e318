use super::{check_action, EnvError, Environment, Frame, Observation, Rgb, Transition};
use crate::Prng;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for the [`CartPole`] environment.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPoleConfig {
    /// Physics configuration
    pub physics: PhysicalConstants,
    /// Episode configuration
    pub params: EnvironmentParams,
}

/// Cart-Pole environment
///
/// Consists of a simulated cart on a track with a vertical pole attached by a hinge on the top.
/// The goal is to keep the pole upright by pushing the cart left (action `0`) or right
/// (action `1`). Every step yields a reward of 1 and the episode terminates once the cart
/// leaves the track or the pole falls past the maximum angle.
///
/// Episodes have no step limit of their own; wrap in [`StepLimit`](super::StepLimit) to
/// truncate them.
///
/// The environment is based on [Barto et al. (1983)][barto1983] with updated dynamics equations
/// from [Florian (2005)][florian2005], who corrects the friction term.
/// The default constants are those of the OpenAI Gym CartPole-v1 environment,
/// except for friction.
///
/// Observations are `[cart_position, cart_velocity, pole_angle, pole_angular_velocity]`.
///
/// [barto1983]: https://ieeexplore.ieee.org/document/6313077
/// [florian2005]: https://coneural.org/florian/papers/05_cart_pole.pdf
#[derive(Debug, Clone)]
pub struct CartPole {
    phys: InternalPhysicalConstants,
    params: EnvironmentParams,
    /// Current state. `None` before the first reset and after a terminal step.
    state: Option<CartPoleInternalState>,
    /// Last physical state, kept for rendering after the episode has terminated.
    last_physical: CartPolePhysicalState,
    rng: Prng,
}

impl CartPole {
    pub fn new(config: CartPoleConfig) -> Self {
        Self {
            phys: config.physics.into(),
            params: config.params,
            state: None,
            last_physical: CartPolePhysicalState::default(),
            rng: Prng::seed_from_u64(0),
        }
    }

    /// Screen width of rendered frames (pixels).
    pub const SCREEN_WIDTH: u32 = 600;
    /// Screen height of rendered frames (pixels).
    pub const SCREEN_HEIGHT: u32 = 400;

    /// The physical state of the current episode, if one is in progress.
    pub fn physical_state(&self) -> Option<CartPolePhysicalState> {
        self.state.map(|s| s.physical)
    }

    fn is_out_of_bounds(&self, physical: &CartPolePhysicalState) -> bool {
        physical.cart_position.abs() > self.params.max_pos
            || physical.pole_angle.abs() > self.params.max_angle
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new(CartPoleConfig::default())
    }
}

impl Environment for CartPole {
    fn observation_dim(&self) -> usize {
        4
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self, seed: Option<u64>) -> Observation {
        if let Some(seed) = seed {
            self.rng = Prng::seed_from_u64(seed);
        }
        // All parameters are sampled from the same range of values
        let dist = Uniform::new_inclusive(-0.05, 0.05);
        let physical = CartPolePhysicalState {
            cart_position: dist.sample(&mut self.rng),
            cart_velocity: dist.sample(&mut self.rng),
            pole_angle: dist.sample(&mut self.rng),
            pole_angular_velocity: dist.sample(&mut self.rng),
        };
        self.state = Some(CartPoleInternalState {
            physical,
            cached_normal_velocity_is_positive: true,
        });
        self.last_physical = physical;
        physical.into()
    }

    fn step(&mut self, action: usize) -> Result<Transition, EnvError> {
        check_action(action, self.num_actions())?;
        let state = self.state.take().ok_or(EnvError::NotReset)?;

        let applied_force = if action == 0 {
            -self.params.action_force
        } else {
            self.params.action_force
        };
        let next_state = self.phys.next_state(&state, applied_force);
        let terminated = self.is_out_of_bounds(&next_state.physical);
        self.last_physical = next_state.physical;
        if !terminated {
            self.state = Some(next_state);
        }
        Ok(Transition {
            observation: next_state.physical.into(),
            reward: 1.0,
            terminated,
            truncated: false,
        })
    }

    fn render(&self) -> Option<Frame> {
        Some(render_frame(&self.last_physical, &self.phys.c, &self.params))
    }

    fn render_fps(&self) -> u32 {
        50
    }
}

/// Draw the cart-pole system onto a new frame.
fn render_frame(
    physical: &CartPolePhysicalState,
    constants: &PhysicalConstants,
    params: &EnvironmentParams,
) -> Frame {
    const CART_WIDTH: f64 = 50.0;
    const CART_HEIGHT: f64 = 30.0;
    const POLE_HALF_WIDTH: f64 = 5.0;
    const TRACK_Y: f64 = CartPole::SCREEN_HEIGHT as f64 - 100.0;

    let mut frame = Frame::new(CartPole::SCREEN_WIDTH, CartPole::SCREEN_HEIGHT, Rgb::WHITE);
    let world_width = 2.0 * params.max_pos;
    let scale = f64::from(CartPole::SCREEN_WIDTH) / world_width;
    let pole_length = scale * 2.0 * constants.length_half_pole;

    let cart_x = physical.cart_position * scale + f64::from(CartPole::SCREEN_WIDTH) / 2.0;

    #[allow(clippy::cast_possible_truncation)]
    let px = |v: f64| v.round() as i64;
    frame.fill_rect(
        0,
        px(TRACK_Y),
        i64::from(CartPole::SCREEN_WIDTH),
        px(TRACK_Y),
        Rgb::BLACK,
    );
    frame.fill_rect(
        px(cart_x - CART_WIDTH / 2.0),
        px(TRACK_Y - CART_HEIGHT / 2.0),
        px(cart_x + CART_WIDTH / 2.0),
        px(TRACK_Y + CART_HEIGHT / 2.0),
        Rgb::BLACK,
    );

    // Screen y grows downwards; a positive angle leans the pole to the right.
    let axle = (cart_x, TRACK_Y - CART_HEIGHT / 4.0);
    let (sin_angle, cos_angle) = physical.pole_angle.sin_cos();
    let tip = (
        axle.0 + pole_length * sin_angle,
        axle.1 - pole_length * cos_angle,
    );
    frame.draw_line(axle, tip, POLE_HALF_WIDTH, Rgb(202, 152, 101));
    frame.fill_circle(axle.0, axle.1, POLE_HALF_WIDTH, Rgb(129, 132, 203));
    frame
}

/// Physical constants for the [`CartPole`] environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Downward force of gravity (m/s^2)
    pub gravity: f64,
    /// Mass of the cart (kg)
    pub mass_cart: f64,
    /// Mass of the pole (kg)
    pub mass_pole: f64,
    /// Half the length of the pole (m)
    pub length_half_pole: f64,
    /// Coefficient of friction between the cart and the track (unitless).
    ///
    /// The track is assumed to fully confine the cart in the vertical direction and this same
    /// friction coefficient applies whether the normal force of the cart is up or down.
    pub friction_cart: f64,
    /// Coefficient of friction between the pole and the cart at the hinge (unitless).
    pub friction_pole: f64,
    /// Simulation time step (s)
    pub time_step: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length_half_pole: 0.5,
            friction_cart: 0.01,
            friction_pole: 0.01,
            time_step: 0.02,
        }
    }
}

/// Parameters for [`CartPole`] as a reinforcement learning environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentParams {
    /// Magnitude of the force (N) applied by actions.
    pub action_force: f64,
    /// Maximum absolute position (meters) before the episode is ended.
    pub max_pos: f64,
    /// Maximum absolute pole angle from vertical (radians) before the episode is ended.
    pub max_angle: f64,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            action_force: 10.0,
            max_pos: 2.4,
            max_angle: 12.0f64.to_radians(),
        }
    }
}

/// Physical state of the [`CartPole`] environment.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPolePhysicalState {
    /// Cart position from the track midpoint (m).
    pub cart_position: f64,
    /// Cart velocity (m/s).
    pub cart_velocity: f64,
    /// Angle of the pole from vertical (radians).
    pub pole_angle: f64,
    /// Pole angular velocity about the hinge (radians / s).
    pub pole_angular_velocity: f64,
}

impl From<CartPolePhysicalState> for Observation {
    fn from(state: CartPolePhysicalState) -> Self {
        vec![
            state.cart_position,
            state.cart_velocity,
            state.pole_angle,
            state.pole_angular_velocity,
        ]
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct CartPoleInternalState {
    physical: CartPolePhysicalState,

    /// Cached sign of `normal_force * cart_velocity` from the previous step.
    ///
    /// The dynamics equations use this sign to compute the normal force itself.
    /// There are only two possible values so the previous one is tried first and
    /// the negation is used if the result is self-inconsistent.
    cached_normal_velocity_is_positive: bool,
}

/// Internal cart-pole constants with pre-computed common values.
#[derive(Debug, Copy, Clone, PartialEq)]
struct InternalPhysicalConstants {
    c: PhysicalConstants,
    /// `gravity * (mass_cart + mass_pole)`
    total_weight: f64,
    /// `1 / (mass_cart + mass_pole)`
    inv_total_mass: f64,
    /// `mass_pole * length_half_pole`
    mass_length_pole: f64,
}

impl From<PhysicalConstants> for InternalPhysicalConstants {
    fn from(c: PhysicalConstants) -> Self {
        let total_mass = c.mass_cart + c.mass_pole;
        Self {
            c,
            total_weight: c.gravity * total_mass,
            inv_total_mass: total_mass.recip(),
            mass_length_pole: c.mass_pole * c.length_half_pole,
        }
    }
}

/// Trigonometric and derived terms shared by one dynamics evaluation.
#[derive(Debug, Copy, Clone)]
struct StepTerms {
    applied_force: f64,
    angular_velocity_squared: f64,
    sin_angle: f64,
    cos_angle: f64,
}

impl InternalPhysicalConstants {
    /// Simulate one time step with an applied horizontal force on the cart (N).
    ///
    /// Follows "Correct equations for the dynamics of the cart-pole system" by Florian (2005)
    /// with semi-implicit Euler integration.
    fn next_state(
        &self,
        state: &CartPoleInternalState,
        applied_force: f64,
    ) -> CartPoleInternalState {
        let phys = &state.physical;
        let (sin_angle, cos_angle) = phys.pole_angle.sin_cos();
        let terms = StepTerms {
            applied_force,
            angular_velocity_squared: phys.pole_angular_velocity * phys.pole_angular_velocity,
            sin_angle,
            cos_angle,
        };

        let mut signed_cart_friction = if state.cached_normal_velocity_is_positive {
            self.c.friction_cart
        } else {
            -self.c.friction_cart
        };
        let mut angular_acceleration =
            self.angular_acceleration(phys, &terms, signed_cart_friction);
        let mut normal_force = self.normal_force(angular_acceleration, &terms);
        let normal_velocity_is_positive = (normal_force * phys.cart_velocity).is_sign_positive();

        if normal_velocity_is_positive != state.cached_normal_velocity_is_positive {
            signed_cart_friction = -signed_cart_friction;
            angular_acceleration = self.angular_acceleration(phys, &terms, signed_cart_friction);
            normal_force = self.normal_force(angular_acceleration, &terms);
        }

        let force_pole = self.mass_length_pole
            * (terms.angular_velocity_squared * sin_angle + angular_acceleration * cos_angle);
        let force_friction = -signed_cart_friction * normal_force;
        let cart_acceleration = (applied_force + force_pole + force_friction) * self.inv_total_mass;

        let dt = self.c.time_step;
        let cart_velocity = phys.cart_velocity + dt * cart_acceleration;
        CartPoleInternalState {
            physical: CartPolePhysicalState {
                cart_position: phys.cart_position + dt * cart_velocity,
                cart_velocity,
                pole_angle: phys.pole_angle + dt * phys.pole_angular_velocity,
                pole_angular_velocity: phys.pole_angular_velocity + dt * angular_acceleration,
            },
            cached_normal_velocity_is_positive: normal_velocity_is_positive,
        }
    }

    /// Pole angular acceleration, equation (21) of Florian (2005).
    ///
    /// `signed_cart_friction` is `friction_cart * sign(normal_force * cart_velocity)`.
    fn angular_acceleration(
        &self,
        state: &CartPolePhysicalState,
        terms: &StepTerms,
        signed_cart_friction: f64,
    ) -> f64 {
        let alpha = (-terms.applied_force
            - self.mass_length_pole
                * terms.angular_velocity_squared
                * (terms.sin_angle + signed_cart_friction * terms.cos_angle))
            * self.inv_total_mass;
        let beta = self.c.friction_pole * state.pole_angular_velocity / self.mass_length_pole;
        let numerator = self.c.gravity * terms.sin_angle
            + terms.cos_angle * (alpha + self.c.gravity * signed_cart_friction)
            - beta;
        let denominator = self.c.length_half_pole
            * (4.0 / 3.0
                - self.c.mass_pole
                    * terms.cos_angle
                    * self.inv_total_mass
                    * (terms.cos_angle - signed_cart_friction));
        numerator / denominator
    }

    /// Normal force of the cart against the track (N). Positive is downward.
    fn normal_force(&self, angular_acceleration: f64, terms: &StepTerms) -> f64 {
        self.total_weight
            - self.mass_length_pole
                * (angular_acceleration * terms.sin_angle
                    + terms.angular_velocity_squared * terms.cos_angle)
    }
}
