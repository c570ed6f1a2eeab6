//! Identifier newtypes for live entities and configuration tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier that can be allocated by an [`crate::Arena`].
pub trait ArenaId: Copy + Ord + fmt::Debug {
    /// Creates the identifier from its raw allocation counter value.
    fn from_raw(value: u32) -> Self;

    /// Raw allocation counter value backing the identifier.
    fn raw(self) -> u32;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(value: u32) -> Self {
                Self(value)
            }

            fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier assigned to a live enemy.
    EnemyId
);
entity_id!(
    /// Unique identifier assigned to a placed tower.
    TowerId
);
entity_id!(
    /// Unique identifier assigned to a projectile in flight.
    ProjectileId
);
entity_id!(
    /// Unique identifier assigned to a ground aura.
    AuraId
);

/// Index of a route within the generated level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(u32);

impl RouteId {
    /// Creates a route identifier from its index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Index of the route within the level's route list.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index usable with slices.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

macro_rules! table_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a key from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrows the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

table_key!(
    /// Key into the tower type table.
    TowerKind
);
table_key!(
    /// Key into the enemy type table.
    EnemyKind
);
table_key!(
    /// Key into a tower's upgrade tree.
    UpgradeId
);
table_key!(
    /// Key into the level style table.
    LevelStyleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_display_with_type_prefix() {
        assert_eq!(EnemyId::new(7).to_string(), "EnemyId#7");
        assert_eq!(TowerId::new(0).to_string(), "TowerId#0");
    }

    #[test]
    fn table_keys_compare_by_contents() {
        assert_eq!(TowerKind::from("arrow"), TowerKind::new(String::from("arrow")));
        assert!(EnemyKind::from("brute") < EnemyKind::from("runner"));
    }
}
