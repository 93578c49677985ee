//! Game tuning loaded from JSON.
//!
//! Every field has a default, so a config file only needs to list what it
//! changes. A `version` other than `"0.1"` is rejected.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoolCapacities {
    pub bullets: usize,
    pub particles: usize,
    pub grenades: usize,
    pub enemies: usize,
    pub grounds: usize,
    pub env_props: usize,
    pub messages: usize,
}

impl Default for PoolCapacities {
    fn default() -> Self {
        Self {
            bullets: 100,
            particles: 500,
            grenades: 50,
            enemies: 60,
            grounds: 300,
            env_props: 50,
            messages: 50,
        }
    }
}

impl PoolCapacities {
    /// Largest capacity across pools; area sweeps iterate this many times.
    pub fn max(&self) -> usize {
        [
            self.bullets,
            self.particles,
            self.grenades,
            self.enemies,
            self.grounds,
            self.env_props,
            self.messages,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    pub fixed_dt: f32,
    /// Pixels per second squared, y-down.
    pub gravity: f32,
    pub corpse_time: f32,
    pub bullet_lifetime: f32,
    pub grenade_fuse: f32,
    pub message_lifetime: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub tiles_per_layer: usize,
    pub grenade_blast_radius: f32,
    pub barrel_blast_radius: f32,
    /// Landing sounds are only cued within this many screen widths of the player.
    pub audio_cull_factor: f32,
    pub max_difficulty: u32,
    pub player_max_hp: i32,
    pub player_start_magnum: i32,
    pub player_start_grenades: i32,
    pub capacities: PoolCapacities,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            fixed_dt: 1.0 / 60.0,
            gravity: 600.0,
            corpse_time: 2.0,
            bullet_lifetime: 0.65,
            grenade_fuse: 2.5,
            message_lifetime: 3.0,
            screen_width: 1920.0,
            screen_height: 1080.0,
            tiles_per_layer: 7,
            grenade_blast_radius: 180.0,
            barrel_blast_radius: 240.0,
            audio_cull_factor: 1.1,
            max_difficulty: 8,
            player_max_hp: 100,
            player_start_magnum: 120,
            player_start_grenades: 5,
            capacities: PoolCapacities::default(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.version != "0.1" {
        return Err(format!(
            "Config validation failed: unsupported version '{}'",
            config.version
        ));
    }
    if config.fixed_dt <= 0.0 {
        return Err("Config validation failed: fixed_dt must be > 0".to_string());
    }
    if config.screen_width <= 0.0 || config.screen_height <= 0.0 {
        return Err("Config validation failed: screen size must be > 0".to_string());
    }
    let timings = [
        ("corpse_time", config.corpse_time),
        ("bullet_lifetime", config.bullet_lifetime),
        ("grenade_fuse", config.grenade_fuse),
        ("message_lifetime", config.message_lifetime),
    ];
    for (name, value) in timings {
        if value <= 0.0 {
            return Err(format!("Config validation failed: {name} must be > 0"));
        }
    }
    let caps = &config.capacities;
    let capacities = [
        ("bullets", caps.bullets),
        ("particles", caps.particles),
        ("grenades", caps.grenades),
        ("enemies", caps.enemies),
        ("grounds", caps.grounds),
        ("env_props", caps.env_props),
        ("messages", caps.messages),
    ];
    for (name, value) in capacities {
        if value == 0 {
            return Err(format!(
                "Config validation failed: capacity '{name}' must be > 0"
            ));
        }
    }
    if config.tiles_per_layer < 2 {
        return Err("Config validation failed: tiles_per_layer must be >= 2".to_string());
    }
    if config.player_max_hp <= 0 {
        return Err("Config validation failed: player_max_hp must be > 0".to_string());
    }
    Ok(())
}
