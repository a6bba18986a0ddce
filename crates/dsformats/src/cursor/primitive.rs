//! Fixed-width numeric primitives readable and writable through the cursors
//!
//! Byte order is applied by `binrw`, so a cursor only has to decide which
//! [`Endian`] it passes down.

use binrw::io::{Read, Seek, Write};
use binrw::{BinRead, BinResult, BinWrite, Endian};

/// A numeric kind with a fixed on-disk width
pub trait Primitive: Copy + PartialEq + std::fmt::Debug {
    /// Number of bytes the value occupies
    const WIDTH: usize;

    /// Read one value in the given byte order
    fn read_from<R: Read + Seek>(reader: &mut R, endian: Endian) -> BinResult<Self>;

    /// Write one value in the given byte order
    fn write_to<W: Write + Seek>(self, writer: &mut W, endian: Endian) -> BinResult<()>;

    /// Render the value for assertion failures
    fn describe(self) -> String;
}

macro_rules! impl_primitive {
    ($fmt:literal => $($ty:ty),+) => {
        $(
            impl Primitive for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn read_from<R: Read + Seek>(reader: &mut R, endian: Endian) -> BinResult<Self> {
                    <$ty as BinRead>::read_options(reader, endian, ())
                }

                fn write_to<W: Write + Seek>(self, writer: &mut W, endian: Endian) -> BinResult<()> {
                    <$ty as BinWrite>::write_options(&self, writer, endian, ())
                }

                fn describe(self) -> String {
                    format!($fmt, self)
                }
            }
        )+
    };
}

impl_primitive!("{:#X}" => u8, i8, u16, i16, u32, i32, u64, i64);
impl_primitive!("{:?}" => f32, f64);
