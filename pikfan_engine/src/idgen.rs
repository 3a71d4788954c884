//! ** idgen module **
//! Namespaces and helpers for generating mob ids.
//! Mobs placed by an area get stable v5 uuids; mobs spawned during play use v4 (random) uuids.
use uuid::Uuid;

pub const NAMESPACE_MOB: Uuid = uuid::uuid!("5b0c6f4e-8d2a-4c71-9a3e-1f64d2b7c0a9");

/// Generate a v5 UUID for a given token (e.g. `"<area>#<placement index>"`).
pub fn uuid_from_token(namespace: &Uuid, token: &str) -> Uuid {
    Uuid::new_v5(namespace, token.as_bytes())
}

/// Stable id for the `index`th placement of an area.
pub fn placed_mob_id(area: &str, index: usize) -> Uuid {
    uuid_from_token(&NAMESPACE_MOB, &format!("{area}#{index}"))
}

/// Fresh random id for a mob spawned at runtime.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
