//! Generational identifiers for scene nodes and GPU resources.
//! All IDs use u64 = index (low 32 bits) | generation (high 32 bits). Index 0 = nil.
//! IDs are minted by their owning arena or store; slot reuse bumps the generation
//! so stale IDs held by the host never resolve to a newer node.

use std::fmt;
use std::hash::Hash;

pub const fn string_to_u64(s: &str) -> u64 {
    let mut hash: u64 = 0xA0761D6478BD642F;
    let bytes = s.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0xE7037ED1A0B428DB);
        hash = mix64(hash);
        i += 1;
    }

    mix64(hash ^ (bytes.len() as u64))
}

pub const fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^= x >> 31;
    x
}

macro_rules! define_generational_id {
    ($type_name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $type_name(pub u64);

        impl $type_name {
            #[inline]
            pub const fn nil() -> Self {
                Self(0)
            }

            #[inline]
            pub const fn index(self) -> u32 {
                (self.0 & 0xFFFF_FFFF) as u32
            }

            #[inline]
            pub const fn generation(self) -> u32 {
                (self.0 >> 32) as u32
            }

            #[inline]
            pub const fn from_parts(index: u32, generation: u32) -> Self {
                Self((index as u64) | ((generation as u64) << 32))
            }

            #[inline]
            pub const fn as_u64(self) -> u64 {
                self.0
            }

            #[inline]
            pub const fn from_u64(value: u64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn is_nil(self) -> bool {
                self.0 == 0
            }

            /// Fixed-width lowercase hex, the form IDs take on the host boundary.
            pub fn to_hex(self) -> String {
                format!("{:016x}", self.0)
            }

            /// Parse hex string (up to 16 chars, optional 0x prefix).
            /// Up to 8 chars is read as a bare index with generation 0.
            pub fn parse_str(s: &str) -> Result<Self, String> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                if s.is_empty() || s.len() > 16 {
                    return Err(format!(
                        concat!("Invalid ", stringify!($type_name), " string: '{}'"),
                        s
                    ));
                }
                if s.len() <= 8 {
                    u32::from_str_radix(s, 16)
                        .map(|u| Self::from_parts(u, 0))
                        .map_err(|e| {
                            format!(concat!("Invalid ", stringify!($type_name), " string: {}"), e)
                        })
                } else {
                    u64::from_str_radix(s, 16).map(Self::from_u64).map_err(|e| {
                        format!(concat!("Invalid ", stringify!($type_name), " string: {}"), e)
                    })
                }
            }
        }

        impl Default for $type_name {
            fn default() -> Self {
                Self::nil()
            }
        }

        impl fmt::Debug for $type_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($type_name), "({}:{})"),
                    self.index(),
                    self.generation()
                )
            }
        }

        impl fmt::Display for $type_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", self.index(), self.generation())
            }
        }
    };
}

define_generational_id!(
    NodeID,
    "Scene node ID, unique across bodies, axes, guide lines and labels."
);
define_generational_id!(MeshID, "Mesh ID, allocated by the graphics resource store.");
