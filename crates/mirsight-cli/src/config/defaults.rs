use mirsight::engine::config::PairingMode;

/// Built-in values used when neither the command line nor the config file sets one.
pub struct DefaultsConfig {
    pub use_caching: bool,
    pub max_cores: i64,
    pub pairing: PairingMode,
    pub features_dir: &'static str,
    pub conservation_dir: &'static str,
    pub features_conservation_dir: &'static str,
    pub shape_data_dir: &'static str,
    pub parsed_shape_dir: &'static str,
    pub features_cons_shape_dir: &'static str,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            use_caching: true,
            max_cores: -1,
            pairing: PairingMode::Positional,
            features_dir: "data/features",
            conservation_dir: "data/conservation",
            features_conservation_dir: "data/features_conservation",
            shape_data_dir: "data/shape_data",
            parsed_shape_dir: "data/parsed_shape",
            features_cons_shape_dir: "data/features_cons_shape",
        }
    }
}
