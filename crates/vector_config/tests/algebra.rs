//! Property tests for the named-vector map

use proptest::prelude::*;
use vector_config::{Vector, VectorConfig};

fn config() -> impl Strategy<Value = VectorConfig> {
    prop::collection::btree_map("[a-e]", prop::collection::vec(-100.0f64..100.0, 1..4), 0..5)
        .prop_map(|entries| entries.into_iter().collect())
}

fn same_shape(config: &VectorConfig, fill: f64) -> VectorConfig {
    config
        .iter()
        .map(|(key, value)| (key.to_string(), vec![fill; value.len()]))
        .collect()
}

proptest! {
    #[test]
    fn insert_then_get_returns_value(key in "[a-z]{1,8}", value in prop::collection::vec(-1e6f64..1e6, 0..6)) {
        let mut config = VectorConfig::new();
        config.insert(key.clone(), value.clone());
        prop_assert_eq!(config.get(&key).unwrap(), &value);
    }

    #[test]
    fn scale_is_linear(config in config(), s in -10.0f64..10.0) {
        let scaled = config.scale(s);
        for (key, value) in config.iter() {
            let expected: Vector = value.iter().map(|x| x * s).collect();
            prop_assert_eq!(scaled.get(key).unwrap(), &expected);
        }
    }

    #[test]
    fn add_then_sub_is_identity(config in config(), fill in -5.0f64..5.0) {
        let other = same_shape(&config, fill);
        let back = config.try_add(&other).unwrap().try_sub(&other).unwrap();
        prop_assert!(back.equals(&config, 1e-9));
    }

    #[test]
    fn empty_delta_leaves_values_unchanged(config in config()) {
        let updated = config.exmap(&VectorConfig::new()).unwrap();
        prop_assert!(updated.equals(&config, 0.0));
    }

    #[test]
    fn flat_and_map_deltas_agree(config in config(), fill in -5.0f64..5.0) {
        let delta = same_shape(&config, fill);
        let flat = vec![fill; config.dim()];
        let by_map = config.exmap(&delta).unwrap();
        let by_flat = config.exmap_vector(&flat).unwrap();
        prop_assert!(by_map.equals(&by_flat, 0.0));
    }

    #[test]
    fn dot_with_self_is_non_negative(config in config()) {
        prop_assert!(config.dot(&config).unwrap() >= 0.0);
    }

    #[test]
    fn equals_is_reflexive(config in config()) {
        prop_assert!(config.equals(&config, 0.0));
    }
}
