//! # Partial Update Columns
//!
//! Mutation records distinguish "leave the stored value alone" from
//! "store nothing". [`Patch::Unset`] is the former and is never written.

use serde::{Deserialize, Serialize};

/// A column in a partial-update mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Patch<T> {
    /// Preserve the existing value.
    #[default]
    Unset,
    /// Clear the column.
    Null,
    /// Overwrite with a value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    /// Wraps an optional value, mapping `None` to `Unset`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Patch::Unset, Patch::Set)
    }

    /// Applies this patch on top of a stored value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Unset => current,
            Patch::Null => None,
            Patch::Set(value) => Some(value),
        }
    }

    /// Merges a later patch over this one.
    pub fn then(self, later: Patch<T>) -> Patch<T> {
        match later {
            Patch::Unset => self,
            other => other,
        }
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Set(value) => Patch::Set(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        assert_eq!(Patch::Unset.apply(Some(1)), Some(1));
        assert_eq!(Patch::<i32>::Null.apply(Some(1)), None);
        assert_eq!(Patch::Set(2).apply(Some(1)), Some(2));
        assert_eq!(Patch::Set(2).apply(None), Some(2));
    }

    #[test]
    fn test_then_keeps_earlier_when_unset() {
        assert_eq!(Patch::Set(1).then(Patch::Unset), Patch::Set(1));
        assert_eq!(Patch::Set(1).then(Patch::Null), Patch::Null);
        assert_eq!(Patch::Null.then(Patch::Set(3)), Patch::Set(3));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Patch::from_option(Some(5)), Patch::Set(5));
        assert!(Patch::<u8>::from_option(None).is_unset());
    }
}
