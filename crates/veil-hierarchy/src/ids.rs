use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) fn new(index: usize) -> Self {
                let raw: u32 = index
                    .try_into()
                    .expect(concat!("too many symbols for ", stringify!($name)));
                Self(raw)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Handle of a [`crate::ClassSymbol`] inside one [`crate::SymbolGraph`].
    ClassId,
    "c"
);
arena_id!(
    /// Handle of a [`crate::MemberSymbol`] inside one [`crate::SymbolGraph`].
    MemberId,
    "m"
);
