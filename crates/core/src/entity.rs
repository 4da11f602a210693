//! Entity trait: identity that outlives attribute changes.

/// Entity marker + minimal interface.
///
/// Layout entities (warehouses, zones, cells) are owned by external workflows;
/// the engine only ever reads them, keyed by their identifier.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
