//! Ordered set of remote participants and their rendering surfaces.
//!
//! Owned by the relay task; there is no internal locking. Entries keep join
//! order and no two entries share an address.

use crate::sdk::RemoteParticipant;
use common::types::{ParticipantAddress, SurfaceId};
use tracing::debug;

/// A participant the relay is rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredParticipant {
    pub address: ParticipantAddress,
    pub display_name: String,
    pub surface: SurfaceId,
}

#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    entries: Vec<RegisteredParticipant>,
    next_surface: u64,
}

impl ParticipantRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `participant` if its address is not registered yet.
    ///
    /// Returns the surface allocated for it, or `None` for a duplicate.
    pub fn add(&mut self, participant: &RemoteParticipant) -> Option<SurfaceId> {
        if self.contains(&participant.address) {
            debug!(
                target: "relay.registry",
                address = %participant.address,
                "Participant already registered"
            );
            return None;
        }

        let surface = self.allocate_surface();
        self.entries.push(RegisteredParticipant {
            address: participant.address.clone(),
            display_name: participant.display_name(),
            surface,
        });
        Some(surface)
    }

    /// Remove the entry for `address`, if any.
    pub fn remove(&mut self, address: &ParticipantAddress) -> Option<RegisteredParticipant> {
        let index = self.entries.iter().position(|p| &p.address == address)?;
        Some(self.entries.remove(index))
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Entries in join order.
    #[must_use]
    pub fn list(&self) -> &[RegisteredParticipant] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, address: &ParticipantAddress) -> Option<&RegisteredParticipant> {
        self.entries.iter().find(|p| &p.address == address)
    }

    #[must_use]
    pub fn contains(&self, address: &ParticipantAddress) -> bool {
        self.get(address).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand out a fresh surface id. Ids are never reused, even across resets.
    pub fn allocate_surface(&mut self) -> SurfaceId {
        self.next_surface = self.next_surface.saturating_add(1);
        SurfaceId(self.next_surface)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn participant(address: &str) -> RemoteParticipant {
        RemoteParticipant::new(address, Some(&address.to_uppercase()))
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut registry = ParticipantRegistry::new();
        registry.add(&participant("a"));
        registry.add(&participant("b"));
        registry.add(&participant("c"));

        let order: Vec<&str> = registry.list().iter().map(|p| p.address.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(registry.list().first().unwrap().display_name, "A");
    }

    #[test]
    fn test_add_duplicate_is_ignored() {
        let mut registry = ParticipantRegistry::new();
        let first = registry.add(&participant("a"));
        let second = registry.add(&participant("a"));

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = ParticipantRegistry::new();
        registry.add(&participant("a"));

        assert!(registry.remove(&ParticipantAddress::from("zzz")).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_returns_entry_and_keeps_order() {
        let mut registry = ParticipantRegistry::new();
        registry.add(&participant("a"));
        let surface_b = registry.add(&participant("b")).unwrap();
        registry.add(&participant("c"));

        let removed = registry.remove(&ParticipantAddress::from("b")).unwrap();
        assert_eq!(removed.surface, surface_b);

        let order: Vec<&str> = registry.list().iter().map(|p| p.address.as_str()).collect();
        assert_eq!(order, vec!["a", "c"]);
    }

    #[test]
    fn test_surfaces_are_unique_across_reset() {
        let mut registry = ParticipantRegistry::new();
        let before = registry.add(&participant("a")).unwrap();
        registry.reset();
        assert!(registry.is_empty());

        let after = registry.add(&participant("a")).unwrap();
        assert_ne!(before, after);
    }
}
