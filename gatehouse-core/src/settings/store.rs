use serde::Deserialize;

/// Where the entity store keeps its state and whether it starts with demo data.
#[derive(Debug, Deserialize, Clone, Default)]
#[allow(unused)]
#[readonly::make]
pub struct StoreSettings {
    /// YAML snapshot file; the store is purely in memory when unset
    #[serde(default)]
    pub snapshot_path: Option<String>,
    #[serde(default)]
    pub seed_demo_data: bool,
    /// Recorded as creator of the demo rows. Required when seeding.
    #[serde(default)]
    pub seed_actor: Option<String>,
}

impl StoreSettings {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_snapshot(path: &str) -> Self {
        Self {
            snapshot_path: Some(path.to_string()),
            ..Self::default()
        }
    }

    pub fn seeded_by(mut self, actor: &str) -> Self {
        self.seed_demo_data = true;
        self.seed_actor = Some(actor.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_unseeded_memory_store() {
        let settings: StoreSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.snapshot_path.is_none());
        assert!(!settings.seed_demo_data);
        assert!(settings.seed_actor.is_none());
    }

    #[test]
    fn test_builders() {
        let settings = StoreSettings::with_snapshot("/tmp/gatehouse.yaml").seeded_by("bootstrap");
        assert_eq!(
            settings.snapshot_path.as_deref(),
            Some("/tmp/gatehouse.yaml")
        );
        assert!(settings.seed_demo_data);
        assert_eq!(settings.seed_actor.as_deref(), Some("bootstrap"));
    }
}
