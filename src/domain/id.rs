//! Item identifiers
//!
//! ID Format:
//! - Task IDs: `ts-{6 hex chars}` (e.g., `ts-a1b2c3`)
//! - Epic IDs: `ep-{6 hex chars}` (e.g., `ep-a1b2c3`)
//!
//! The hex part encodes 3 random bytes. Uniqueness is not checked here: the
//! 2^24 space makes collisions unlikely and the store's primary key rejects
//! the ones that do happen.

use rand::rngs::OsRng;
use rand::RngCore;

use super::item::ItemType;

/// Number of random bytes in an identifier
const ID_BYTES: usize = 3;

/// Generates an identifier for `item_type` drawing entropy from `rng`
pub fn generate_id<R: RngCore + ?Sized>(item_type: ItemType, rng: &mut R) -> String {
    let mut bytes = [0u8; ID_BYTES];
    rng.fill_bytes(&mut bytes);

    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", item_type.id_prefix(), hex)
}

/// Generates an identifier using the operating system's entropy source
pub fn new_id(item_type: ItemType) -> String {
    generate_id(item_type, &mut OsRng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_well_formed(id: &str) -> bool {
        let Some((prefix, hex)) = id.split_once('-') else {
            return false;
        };

        matches!(prefix, "ts" | "ep")
            && hex.len() == ID_BYTES * 2
            && hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn task_ids_use_ts_prefix() {
        let mut rng = StepRng::new(0x00ef_cdab, 0);
        assert_eq!(generate_id(ItemType::Task, &mut rng), "ts-abcdef");
    }

    #[test]
    fn epic_ids_use_ep_prefix() {
        let mut rng = StepRng::new(0x0003_0201, 0);
        assert_eq!(generate_id(ItemType::Epic, &mut rng), "ep-010203");
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        assert_eq!(
            generate_id(ItemType::Task, &mut a),
            generate_id(ItemType::Task, &mut b)
        );
    }

    #[test]
    fn os_ids_are_well_formed() {
        assert!(is_well_formed(&new_id(ItemType::Task)));
        assert!(is_well_formed(&new_id(ItemType::Epic)));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_well_formed("ts-12345"));
        assert!(!is_well_formed("ts-1234567"));
        assert!(!is_well_formed("xx-123456"));
        assert!(!is_well_formed("ts-ABCDEF"));
        assert!(!is_well_formed("ts123456"));
    }

    proptest! {
        #[test]
        fn generated_ids_are_always_well_formed(seed in any::<u64>(), epic in any::<bool>()) {
            let item_type = if epic { ItemType::Epic } else { ItemType::Task };
            let id = generate_id(item_type, &mut StdRng::seed_from_u64(seed));

            prop_assert!(is_well_formed(&id));
            prop_assert!(id.starts_with(item_type.id_prefix()));
            prop_assert_eq!(id.len(), 9);
        }
    }
}
