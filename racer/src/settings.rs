use anyhow::{bail, Context, Result};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use state::{InputConfig, SettingsStore};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use track::HighscoreTable;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettingsData {
    pub player_name: String,
    pub best_time_ms: Option<u32>,
    pub highscores: HighscoreTable,
    pub input: InputConfig,
}

impl Default for SettingsData {
    fn default() -> SettingsData {
        SettingsData {
            player_name: "Player".to_owned(),
            best_time_ms: None,
            highscores: HighscoreTable::default(),
            input: InputConfig::default(),
        }
    }
}

/// What the options screen changes. Fields left as None keep their stored value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerOptions {
    pub name: Option<String>,
    pub deadzone: Option<f32>,
}

impl PlayerOptions {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.deadzone.is_none()
    }

    pub fn apply(&self, data: &mut SettingsData) -> Result<()> {
        let mut input = data.input;
        if let Some(deadzone) = self.deadzone {
            input.deadzone = deadzone;
        }
        if let Err(e) = input.validate() {
            bail!("bad input settings: {}", e);
        }
        data.input = input;
        if let Some(name) = &self.name {
            data.player_name = name.clone();
        }
        Ok(())
    }
}

/// Player settings kept in a gzip'd bincode file.
#[derive(Clone, Debug)]
pub struct FileSettings {
    path: PathBuf,
    pub data: SettingsData,
}

impl FileSettings {
    /// Read settings from `path`. A missing or unreadable file gives the defaults, so a broken
    /// settings file never keeps the game from starting.
    pub fn load(path: &Path) -> FileSettings {
        let data = if path.exists() {
            match read_settings(path) {
                Ok(data) => data,
                Err(e) => {
                    warn!(path = %path.display(), error = %format!("{:#}", e), "unreadable settings, using defaults");
                    SettingsData::default()
                }
            }
        } else {
            SettingsData::default()
        };
        FileSettings {
            path: path.to_owned(),
            data,
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            }
        }
        let f = BufWriter::new(
            File::create(&self.path).with_context(|| format!("creating {}", self.path.display()))?,
        );
        let mut e = GzEncoder::new(f, Compression::default());
        bincode::serialize_into(&mut e, &self.data).context("encoding settings")?;
        e.finish()?.flush()?;
        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

fn read_settings(path: &Path) -> Result<SettingsData> {
    let f = BufReader::new(File::open(path)?);
    let mut decoder = GzDecoder::new(f);
    let data: SettingsData = bincode::deserialize_from(&mut decoder).context("decoding settings")?;
    Ok(data)
}

impl SettingsStore for FileSettings {
    fn best_time(&self) -> Option<u32> {
        self.data.best_time_ms
    }

    fn set_best_time(&mut self, time_ms: u32) {
        self.data.best_time_ms = Some(time_ms);
    }

    fn player_name(&self) -> String {
        self.data.player_name.clone()
    }
}

/// Settings that live only as long as the process, for scenarios and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySettings {
    pub best_time_ms: Option<u32>,
}

impl SettingsStore for MemorySettings {
    fn best_time(&self) -> Option<u32> {
        self.best_time_ms
    }

    fn set_best_time(&mut self, time_ms: u32) {
        self.best_time_ms = Some(time_ms);
    }

    fn player_name(&self) -> String {
        "Player".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("racer-settings-{}-{}", std::process::id(), name))
            .join("settings.bincode.gz")
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = FileSettings::load(&scratch("missing"));
        assert_eq!(settings.data, SettingsData::default());
        assert_eq!(settings.best_time(), None);
    }

    #[test]
    fn saved_settings_come_back() {
        let path = scratch("saved");
        let mut settings = FileSettings::load(&path);
        settings.set_best_time(51_234);
        settings.data.player_name = "Kai".to_owned();
        settings.data.highscores.submit("Kai", 41_000);
        settings.data.input.deadzone = 0.25;
        settings.save().unwrap();

        let loaded = FileSettings::load(&path);
        assert_eq!(loaded.data, settings.data);
        assert_eq!(loaded.best_time(), Some(51_234));
        assert_eq!(loaded.player_name(), "Kai");
        assert_eq!(loaded.data.input.deadzone, 0.25);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = scratch("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"definitely not gzip").unwrap();
        let settings = FileSettings::load(&path);
        assert_eq!(settings.data, SettingsData::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn options_change_only_what_was_given() {
        let mut data = SettingsData::default();
        let options = PlayerOptions {
            deadzone: Some(0.2),
            ..PlayerOptions::default()
        };
        options.apply(&mut data).unwrap();
        assert_eq!(data.input.deadzone, 0.2);
        assert_eq!(data.input.smoothing, InputConfig::default().smoothing);
        assert_eq!(data.player_name, "Player");
        assert!(PlayerOptions::default().is_empty());
    }

    #[test]
    fn bad_deadzone_is_rejected() {
        let mut data = SettingsData::default();
        let options = PlayerOptions {
            name: Some("Kai".to_owned()),
            deadzone: Some(1.5),
        };
        assert!(options.apply(&mut data).is_err());
        assert_eq!(data, SettingsData::default());
    }
}
