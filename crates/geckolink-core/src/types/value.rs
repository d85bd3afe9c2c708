//! Values accepted by a poke.

/// A fixed-width value written with one of the poke commands.
///
/// Floats are converted to their IEEE-754 bit patterns before they reach the
/// wire, so `F32` travels exactly like `U32` and `F64` exactly like `U64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PokeValue
{
    /// One byte
    U8(u8),
    /// Two bytes
    U16(u16),
    /// Four bytes
    U32(u32),
    /// Eight bytes, sent as two 32-bit pokes
    U64(u64),
    /// IEEE-754 single
    F32(f32),
    /// IEEE-754 double
    F64(f64),
}

impl PokeValue
{
    /// Number of device bytes the poke touches.
    #[must_use]
    pub fn width(self) -> usize
    {
        match self {
            PokeValue::U8(_) => 1,
            PokeValue::U16(_) => 2,
            PokeValue::U32(_) | PokeValue::F32(_) => 4,
            PokeValue::U64(_) | PokeValue::F64(_) => 8,
        }
    }
}

macro_rules! impl_from_poke {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PokeValue
            {
                fn from(value: $ty) -> Self
                {
                    PokeValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_poke!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, f32 => F32, f64 => F64);
