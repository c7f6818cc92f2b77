//! Unit tests for the typed identifiers

use core_kernel::{CarId, DriverId, EventId, ManagerId};
use uuid::Uuid;

mod car_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(CarId::new(), CarId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = CarId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = CarId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_prefix_and_display() {
        assert_eq!(CarId::prefix(), "CAR");
        let id = CarId::new();
        assert_eq!(id.to_string(), format!("CAR-{}", id.as_uuid()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("CAR-not-a-uuid".parse::<CarId>().is_err());
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_each_type_has_its_own_prefix() {
        assert_eq!(DriverId::prefix(), "DRV");
        assert_eq!(EventId::prefix(), "EVT");
        assert_eq!(ManagerId::prefix(), "MGR");
    }

    #[test]
    fn test_foreign_prefix_is_not_stripped() {
        let driver = DriverId::new();
        // "DRV-" is not the car prefix, so the whole string must parse as a UUID
        assert!(driver.to_string().parse::<CarId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::new_v4();
        let id = EventId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
