//! Newtype ids that cross the IR boundary.
//!
//! Internal offsets (const-pool indices, state-buffer offsets) stay as plain
//! integers, the same register-like bias `fuel-vm` keeps for its register
//! and memory-offset indices; only the ids a host passes across the public
//! API are wrapped, to catch wiring mistakes (swapping a field id for a
//! signal id) at the type level.

use std::fmt;

macro_rules! id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// The id's raw integer value.
            pub const fn get(self) -> u32 {
                self.0
            }

            /// The id as a `usize` array index.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(SigExprId, "Index of a signal node in the IR's node array.");
id_type!(FieldId, "Index of a field node in the IR's field-node array.");
id_type!(ConstId, "Index into the const pool's number arena.");
id_type!(ChainId, "Index into the transform chain table.");
id_type!(DomainId, "Identifier of a field evaluation domain.");
