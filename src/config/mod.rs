//! Configuration module - environment variable parsing and gameplay rules

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::geometry::HurtMargins;
use crate::game::Side;

/// Runner configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Pace ticks against the wall clock; otherwise run as fast as possible
    pub realtime: bool,
    /// Stop after this many ticks regardless of match state
    pub max_ticks: Option<u64>,

    /// Which side takes input from the input source
    pub human_side: Side,
    /// Seed for the AI random source; drawn from entropy when absent
    pub ai_seed: Option<u64>,

    /// Skin names for each side
    pub skin_a: String,
    pub skin_b: String,
    /// Directory of JSON skin manifests; builtin skins are used when absent
    pub asset_dir: Option<PathBuf>,
    /// JSON input script for the human side; idle input when absent
    pub input_script: Option<PathBuf>,

    /// Number of rounds to play before exiting
    pub rounds: u32,
    /// Print a JSON outcome every this many ticks (and on every event), 0 disables
    pub snapshot_interval: u32,

    /// Gameplay tunables
    pub rules: RulesConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut rules = RulesConfig::default();
        if let Some(secs) = parse_var::<f32>("ROUND_SECONDS")? {
            if secs <= 0.0 {
                return Err(ConfigError::Invalid {
                    name: "ROUND_SECONDS",
                    value: secs.to_string(),
                });
            }
            rules.round_seconds = secs;
        }

        let tick_rate = parse_var::<u32>("TICK_RATE")?.unwrap_or(144);
        if tick_rate == 0 {
            return Err(ConfigError::Invalid {
                name: "TICK_RATE",
                value: "0".to_string(),
            });
        }

        let human_side = match env::var("HUMAN_SIDE") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "a" => Side::A,
                "b" => Side::B,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "HUMAN_SIDE",
                        value,
                    })
                }
            },
            Err(_) => Side::A,
        };

        let log_json = match env::var("LOG_FORMAT") {
            Ok(value) => match value.as_str() {
                "json" => true,
                "pretty" | "text" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LOG_FORMAT",
                        value,
                    })
                }
            },
            Err(_) => false,
        };

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json,
            tick_rate,
            realtime: parse_var::<bool>("REALTIME")?.unwrap_or(true),
            max_ticks: parse_var::<u64>("MAX_TICKS")?,
            human_side,
            ai_seed: parse_var::<u64>("AI_SEED")?,
            skin_a: env::var("SKIN_A").unwrap_or_else(|_| "ryu".to_string()),
            skin_b: env::var("SKIN_B").unwrap_or_else(|_| "ryu".to_string()),
            asset_dir: env::var("ASSET_DIR").ok().map(PathBuf::from),
            input_script: env::var("INPUT_SCRIPT").ok().map(PathBuf::from),
            rounds: parse_var::<u32>("ROUNDS")?.unwrap_or(1).max(1),
            snapshot_interval: parse_var::<u32>("SNAPSHOT_EVERY")?.unwrap_or(0),
            rules,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(None),
    }
}

/// How repeated overlaps of one active frame are filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebounceMode {
    /// One hit per attacker active frame
    ActiveFrame,
    /// Hit only when the defender's frame hold counter is at its reset value
    DefenderHold,
}

/// AI tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTuning {
    /// Walk toward the opponent while farther than this
    pub closing_distance: f32,
    /// Consider acting while this close
    pub melee_range: f32,
    /// Width of the uniform roll drawn each tick in range
    pub roll_range: u32,
    /// Rolls below this act
    pub act_threshold: u32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            closing_distance: 100.0,
            melee_range: 100.0,
            roll_range: 1000,
            act_threshold: 6,
        }
    }
}

/// Gameplay tunables shared by every system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub arena_width: f32,
    /// Screen y of the ground line sprites stand on
    pub ground_line: f32,
    pub start_x_a: f32,
    /// Right edge of side B's idle sprite at round start
    pub start_right_b: f32,

    pub starting_health: i32,
    pub round_seconds: f32,
    /// Ticks each animation frame is held
    pub frame_hold: u32,

    /// Horizontal walking speed, pixels per second
    pub walk_speed: f32,
    /// Initial upward velocity of a jump, pixels per tick
    pub jump_apex: f32,
    /// Velocity lost per tick while airborne
    pub gravity: f32,

    pub knockback: f32,
    pub guard_damage_factor: f32,
    pub hit_meter_gain: i32,
    pub guard_meter_gain: i32,
    pub meter_max: i32,
    pub shoot_cost: i32,

    /// Projectile speed, pixels per second
    pub projectile_speed: f32,
    pub projectile_damage: i32,
    /// Height of the projectile's top edge above the ground line at spawn
    pub projectile_height: f32,

    pub hurt_margins: HurtMargins,
    pub debounce: DebounceMode,
    pub ai: AiTuning,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            arena_width: 1280.0,
            ground_line: 630.0,
            start_x_a: 50.0,
            start_right_b: 1230.0,
            starting_health: 500,
            round_seconds: 90.0,
            frame_hold: 8,
            walk_speed: 300.0,
            jump_apex: 12.0,
            gravity: 0.25,
            knockback: 30.0,
            guard_damage_factor: 0.2,
            hit_meter_gain: 10,
            guard_meter_gain: 7,
            meter_max: 100,
            shoot_cost: 50,
            projectile_speed: 600.0,
            projectile_damage: 40,
            projectile_height: 230.0,
            hurt_margins: HurtMargins::default(),
            debounce: DebounceMode::ActiveFrame,
            ai: AiTuning::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
