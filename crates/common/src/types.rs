use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transport order.
///
/// Wraps a UUID so order ids cannot be mixed up with transport unit
/// or location group ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportOrderId(Uuid);

impl TransportOrderId {
    /// Creates a new random order ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an order ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransportOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransportOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TransportOrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<TransportOrderId> for Uuid {
    fn from(id: TransportOrderId) -> Self {
        id.0
    }
}

/// Identity of a transport unit (pallet, container, bin).
///
/// The unit is opaque here; it only scopes which orders compete for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportUnitId(Uuid);

impl TransportUnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransportUnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransportUnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TransportUnitId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Identifier of a location group that transport orders may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationGroupId(Uuid);

impl LocationGroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LocationGroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LocationGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LocationGroupId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_order_id_new_creates_unique_ids() {
        let id1 = TransportOrderId::new();
        let id2 = TransportOrderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn transport_order_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = TransportOrderId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn transport_unit_id_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let id = TransportUnitId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn location_group_id_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(LocationGroupId::from(uuid).to_string(), uuid.to_string());
    }
}
