//! Player-facing settings: audio, graphics and gameplay options.

use super::PreferenceStore;

/// Quietest mixer level, in decibels.
pub const MIN_VOLUME_DB: f32 = -80.0;
/// Loudest mixer level, in decibels.
pub const MAX_VOLUME_DB: f32 = 0.0;

mod keys {
    pub const MASTER_VOLUME: &str = "audio.master_volume";
    pub const MUSIC_VOLUME: &str = "audio.music_volume";
    pub const SFX_VOLUME: &str = "audio.sfx_volume";
    pub const QUALITY: &str = "graphics.quality";
    pub const FULLSCREEN: &str = "graphics.fullscreen";
    pub const BRIGHTNESS: &str = "graphics.brightness";
    pub const VSYNC: &str = "graphics.vsync";
    pub const INVERT_Y: &str = "gameplay.invert_y";
    pub const SENSITIVITY: &str = "gameplay.sensitivity";
}

/// Settings page groups that can be reset independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsGroup {
    Audio,
    Graphics,
    Gameplay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // === Audio (dB) ===
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,

    // === Graphics ===
    /// Index into the host's quality presets.
    pub quality: i64,
    pub fullscreen: bool,
    pub brightness: f32,
    pub vsync: bool,

    // === Gameplay ===
    pub invert_y: bool,
    pub sensitivity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: MAX_VOLUME_DB,
            music_volume: MAX_VOLUME_DB,
            sfx_volume: MAX_VOLUME_DB,
            quality: 2,
            fullscreen: false,
            brightness: 0.05,
            vsync: false,
            invert_y: false,
            sensitivity: 4.0,
        }
    }
}

impl Settings {
    /// Reads settings, falling back to defaults for absent keys.
    pub fn load(store: &PreferenceStore) -> Self {
        let defaults = Self::default();
        let float = |key, default: f32| store.get_float(key).map_or(default, |v| v as f32);

        Self {
            master_volume: clamp_volume(float(keys::MASTER_VOLUME, defaults.master_volume)),
            music_volume: clamp_volume(float(keys::MUSIC_VOLUME, defaults.music_volume)),
            sfx_volume: clamp_volume(float(keys::SFX_VOLUME, defaults.sfx_volume)),
            quality: store.get_int(keys::QUALITY).unwrap_or(defaults.quality),
            fullscreen: store.get_bool(keys::FULLSCREEN).unwrap_or(defaults.fullscreen),
            brightness: float(keys::BRIGHTNESS, defaults.brightness),
            vsync: store.get_bool(keys::VSYNC).unwrap_or(defaults.vsync),
            invert_y: store.get_bool(keys::INVERT_Y).unwrap_or(defaults.invert_y),
            sensitivity: float(keys::SENSITIVITY, defaults.sensitivity),
        }
    }

    /// Writes every key. Call [`PreferenceStore::flush`] to persist.
    pub fn store(&self, store: &mut PreferenceStore) {
        store.set_float(keys::MASTER_VOLUME, f64::from(clamp_volume(self.master_volume)));
        store.set_float(keys::MUSIC_VOLUME, f64::from(clamp_volume(self.music_volume)));
        store.set_float(keys::SFX_VOLUME, f64::from(clamp_volume(self.sfx_volume)));
        store.set_int(keys::QUALITY, self.quality);
        store.set_bool(keys::FULLSCREEN, self.fullscreen);
        store.set_float(keys::BRIGHTNESS, f64::from(self.brightness));
        store.set_bool(keys::VSYNC, self.vsync);
        store.set_bool(keys::INVERT_Y, self.invert_y);
        store.set_float(keys::SENSITIVITY, f64::from(self.sensitivity));
    }

    /// Restores one group to its defaults, leaving the others alone.
    pub fn reset(&mut self, group: SettingsGroup) {
        let defaults = Self::default();
        match group {
            SettingsGroup::Audio => {
                self.master_volume = defaults.master_volume;
                self.music_volume = defaults.music_volume;
                self.sfx_volume = defaults.sfx_volume;
            }
            SettingsGroup::Graphics => {
                self.quality = defaults.quality;
                self.fullscreen = defaults.fullscreen;
                self.brightness = defaults.brightness;
            }
            SettingsGroup::Gameplay => {
                self.invert_y = defaults.invert_y;
                self.sensitivity = defaults.sensitivity;
            }
        }
    }

    /// Mixer level shown as 0..=80 on the settings page.
    pub fn volume_display(volume_db: f32) -> u8 {
        (clamp_volume(volume_db) - MIN_VOLUME_DB).round() as u8
    }
}

fn clamp_volume(volume_db: f32) -> f32 {
    volume_db.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB)
}
