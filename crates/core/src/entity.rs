//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Employees, products, suppliers and lots are entities: editing every field
/// of a product keeps it the same product because its id is unchanged.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
