use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = WorkerId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
    assert_eq!(WorkerId::from(uuid), id);
}

#[test]
fn test_typed_id_display_matches_uuid() {
    let uuid = Uuid::new_v4();
    assert_eq!(LedgerEntryId::from_uuid(uuid).to_string(), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = LedgerEntryId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!(WorkerId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_new_ids_are_v7() {
    let id = LedgerEntryId::new();
    assert_eq!(id.into_inner().get_version_num(), 7);
    assert_ne!(id, LedgerEntryId::new());
}
