use std::fmt;

use serde::{Deserialize, Serialize};

/// JVM access flags (`access_flags` of a class, field or method).
///
/// Several bits are shared between classes and members (`0x0020` is
/// `ACC_SUPER` on a class and `ACC_SYNCHRONIZED` on a method), so the helpers
/// below are only meaningful for the declaration kind they are named after.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const BRIDGE: u16 = 0x0040;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;

    #[inline]
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    #[inline]
    pub const fn with(self, flag: u16) -> Self {
        Self(self.0 | flag)
    }

    pub fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    pub fn is_native(self) -> bool {
        self.contains(Self::NATIVE)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn is_annotation(self) -> bool {
        self.contains(Self::ANNOTATION)
    }

    pub fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    pub fn visibility(self) -> Visibility {
        if self.is_public() {
            Visibility::Public
        } else if self.is_protected() {
            Visibility::Protected
        } else if self.is_private() {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }
}

impl fmt::Debug for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessFlags(0x{:04x})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}
