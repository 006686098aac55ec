//! Tunable parameters for agents, the attack scheduler and zones.
//!
//! Every struct carries its defaults as associated constants so hosts and
//! content files can reference them by name. With the `serde` feature each
//! struct deserializes with missing fields falling back to those defaults.

/// Size of the axis-aligned "override rectangle" projected in front of an agent.
///
/// Anything inside it is seen with high confidence regardless of cone angles.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RectSize {
    /// Lateral extent (full width).
    pub width: f32,
    /// Vertical extent (full height), centered on the eye.
    pub height: f32,
    /// Forward reach from the eye.
    pub length: f32,
}

impl Default for RectSize {
    fn default() -> Self {
        Self {
            width: 1.5,
            height: 2.5,
            length: 3.0,
        }
    }
}

/// Per-agent perception, timing and combat tunables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    // ===== vision =====
    pub vision_distance: f32,
    /// Full opening angle of the inner cone, in degrees.
    pub inner_cone_angle: f32,
    /// Full opening angle of the outer cone, in degrees.
    pub outer_cone_angle: f32,
    /// Degrees added to both half-angles while the player is already visible.
    pub visible_angle_bonus: f32,
    /// Scales the vertical angle before comparison; values above 1 flatten the cone.
    pub vertical_angle_multiplier: f32,
    pub eye_height: f32,
    pub override_rect: RectSize,
    /// Override rectangle scale outside of Idle.
    pub override_rect_alert_scale: f32,
    /// Hidden player is still seen within this distance while Idle or Attention.
    pub hiding_reveal_distance_calm: f32,
    /// Hidden player is still seen within this distance while Aggression or Cover.
    pub hiding_reveal_distance_alert: f32,

    // ===== hearing =====
    pub hearing_radius: f32,
    /// Bottom of the hearing cylinder relative to the agent's feet.
    pub hearing_base_offset: f32,
    pub hearing_height: f32,
    /// Hearing radius multiplier applied whenever the agent is not Idle.
    pub alert_hearing_multiplier: f32,
    /// Minimum attenuated noise level that counts as heard.
    pub noise_threshold: f32,
    /// Window in which only louder noises re-trigger the hear callback.
    pub noise_debounce: f32,

    // ===== state timers (seconds) =====
    pub player_spot_wait_time: f32,
    pub attention_wait_time: f32,
    /// Inner-band dwell needed to escalate Attention into Aggression.
    pub escalation_time: f32,
    pub aggression_wait_time: f32,
    /// Idle countdown before dozing off; `None` disables it.
    pub sleep_wait_time: Option<f32>,
    pub sleep_duration: (f32, f32),
    pub headshot_sleep_multiplier: f32,
    pub fear_time: f32,
    pub wake_radius: f32,
    pub near_check_interval: f32,
    /// Waking up forces Attention on the whole zone.
    pub wake_alerts_zone: bool,

    // ===== movement =====
    pub stopping_distance: f32,
    pub repath_distance: f32,
    pub wander_radius: f32,
    /// Minimum spacing between registered move targets inside a zone.
    pub move_spacing: f32,
    pub wander_attempts: u32,
    pub walk_speed: f32,
    pub run_speed: f32,

    // ===== combat =====
    pub optimal_shooting_distance: f32,
    pub strafe_distance: f32,
    pub strafe_interval: f32,
    /// Percent chance to look for cover when entering Aggression.
    pub cover_chance: u32,
    pub cover_search_distance: f32,
    pub cover_proximity: f32,
    pub melee_range: f32,
    /// Wind-up between starting a melee swing and the hit landing.
    pub melee_delay: f32,
    /// Minimum time between two melee swings.
    pub melee_cooldown: f32,
    pub melee_damage: f32,
    /// Percent chance per tick to lob a grenade when admitted.
    pub grenade_chance: u32,
    pub grenade_min_distance: f32,
}

impl AiConfig {
    pub const DEFAULT_VISION_DISTANCE: f32 = 25.0;
    pub const DEFAULT_INNER_CONE_ANGLE: f32 = 60.0;
    pub const DEFAULT_OUTER_CONE_ANGLE: f32 = 120.0;
    pub const DEFAULT_VISIBLE_ANGLE_BONUS: f32 = 5.0;
    pub const DEFAULT_HEARING_RADIUS: f32 = 10.0;
    pub const DEFAULT_PLAYER_SPOT_WAIT_TIME: f32 = 1.0;
    pub const DEFAULT_ATTENTION_WAIT_TIME: f32 = 5.0;
    pub const DEFAULT_AGGRESSION_WAIT_TIME: f32 = 8.0;
    pub const DEFAULT_NEAR_CHECK_INTERVAL: f32 = 0.5;
    pub const DEFAULT_WAKE_RADIUS: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            vision_distance: Self::DEFAULT_VISION_DISTANCE,
            inner_cone_angle: Self::DEFAULT_INNER_CONE_ANGLE,
            outer_cone_angle: Self::DEFAULT_OUTER_CONE_ANGLE,
            visible_angle_bonus: Self::DEFAULT_VISIBLE_ANGLE_BONUS,
            vertical_angle_multiplier: 1.5,
            eye_height: 1.6,
            override_rect: RectSize::default(),
            override_rect_alert_scale: 0.5,
            hiding_reveal_distance_calm: 2.0,
            hiding_reveal_distance_alert: 5.0,

            hearing_radius: Self::DEFAULT_HEARING_RADIUS,
            hearing_base_offset: -1.0,
            hearing_height: 4.0,
            alert_hearing_multiplier: 2.0,
            noise_threshold: 0.5,
            noise_debounce: 5.0,

            player_spot_wait_time: Self::DEFAULT_PLAYER_SPOT_WAIT_TIME,
            attention_wait_time: Self::DEFAULT_ATTENTION_WAIT_TIME,
            escalation_time: 1.5,
            aggression_wait_time: Self::DEFAULT_AGGRESSION_WAIT_TIME,
            sleep_wait_time: None,
            sleep_duration: (20.0, 30.0),
            headshot_sleep_multiplier: 2.0,
            fear_time: 3.0,
            wake_radius: Self::DEFAULT_WAKE_RADIUS,
            near_check_interval: Self::DEFAULT_NEAR_CHECK_INTERVAL,
            wake_alerts_zone: false,

            stopping_distance: 0.5,
            repath_distance: 1.0,
            wander_radius: 4.0,
            move_spacing: 1.5,
            wander_attempts: 4,
            walk_speed: 1.5,
            run_speed: 4.0,

            optimal_shooting_distance: 8.0,
            strafe_distance: 2.0,
            strafe_interval: 2.5,
            cover_chance: 40,
            cover_search_distance: 15.0,
            cover_proximity: 0.6,
            melee_range: 1.5,
            melee_delay: 0.4,
            melee_cooldown: 1.5,
            melee_damage: 0.25,
            grenade_chance: 5,
            grenade_min_distance: 6.0,
        }
    }

    /// Hearing radius in effect for an agent that is (or is not) alerted.
    pub fn effective_hearing_radius(&self, alerted: bool) -> f32 {
        if alerted {
            self.hearing_radius * self.alert_hearing_multiplier
        } else {
            self.hearing_radius
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Attack-order scheduler and grenade admission tunables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    /// Seconds between fire-permission recomputations.
    pub attack_order_interval: f32,
    /// Seconds between closest-visible-agent refreshes.
    pub closest_check_interval: f32,
    /// The closest K eligible agents always get fire permission.
    pub closest_bot_attacking: usize,
    /// Eligible agents ranked (K..M] get permission by chance; beyond M never.
    pub max_bots_attacking: usize,
    /// Percent chance for an overflow agent to be granted permission.
    pub overflow_attack_chance: u32,
    /// Concurrent grenade cooldown slots (clamped to [`Self::MAX_GRENADE_SLOTS`]).
    pub grenade_capacity: usize,
    pub grenade_cooldown: f32,
}

impl ManagerConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_GRENADE_SLOTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ATTACK_ORDER_INTERVAL: f32 = 15.0;
    pub const DEFAULT_CLOSEST_CHECK_INTERVAL: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            attack_order_interval: Self::DEFAULT_ATTACK_ORDER_INTERVAL,
            closest_check_interval: Self::DEFAULT_CLOSEST_CHECK_INTERVAL,
            closest_bot_attacking: 2,
            max_bots_attacking: 4,
            overflow_attack_chance: 30,
            grenade_capacity: 2,
            grenade_cooldown: 10.0,
        }
    }

    pub fn grenade_slots(&self) -> usize {
        self.grenade_capacity.min(Self::MAX_GRENADE_SLOTS)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Zone alarm and propagation tunables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoneConfig {
    /// Seconds for a raised alarm to decay from 1 to 0.
    pub alarm_cooldown: f32,
    /// Upper bound on cross-agent requests processed in one flush.
    pub propagation_limit: usize,
}

impl ZoneConfig {
    pub const DEFAULT_ALARM_COOLDOWN: f32 = 30.0;
    pub const DEFAULT_PROPAGATION_LIMIT: usize = 4096;

    pub fn new() -> Self {
        Self {
            alarm_cooldown: Self::DEFAULT_ALARM_COOLDOWN,
            propagation_limit: Self::DEFAULT_PROPAGATION_LIMIT,
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level configuration for a [`crate::Simulation`].
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Base seed mixed into every random roll.
    pub seed: u64,
    /// Defaults for agents spawned without their own config.
    pub agent: AiConfig,
    pub manager: ManagerConfig,
    pub zone: ZoneConfig,
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}
