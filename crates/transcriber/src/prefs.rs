use anyhow::Context;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const USE_CUSTOM_MODEL_KEY: &str = "useCustomModel";
const ENABLE_REWRITE_KEY: &str = "enableRewrite";

/// Small string key-value store for UI preferences.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat TOML table on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct TomlFilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlFilePreferences {
    /// A missing file starts empty; it is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read preferences {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse preferences {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string(&self.values).context("failed to encode preferences")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write preferences {}", self.path.display()))
    }
}

impl PreferenceStore for TomlFilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub use_custom_model: bool,
    pub enable_rewrite: bool,
}

impl Preferences {
    /// Anything other than the literal `true` reads as off.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let flag = |key: &str| store.get(key).is_some_and(|value| value == "true");
        Self {
            use_custom_model: flag(USE_CUSTOM_MODEL_KEY),
            enable_rewrite: flag(ENABLE_REWRITE_KEY),
        }
    }

    pub fn save_use_custom_model(&self, store: &mut dyn PreferenceStore) -> anyhow::Result<()> {
        store.set(USE_CUSTOM_MODEL_KEY, &self.use_custom_model.to_string())
    }

    pub fn save_enable_rewrite(&self, store: &mut dyn PreferenceStore) -> anyhow::Result<()> {
        store.set(ENABLE_REWRITE_KEY, &self.enable_rewrite.to_string())
    }
}
