use std::ops::RangeInclusive;

/// Contains some helper methods to manipulate bits,
/// the index (`bit_idx`) is supposed to be from lsb to msb (right to left)
pub trait Bits: Copy {
    /// Number of bits of the underlying integer.
    const WIDTH: u8;

    fn is_bit_on(&self, bit_idx: u8) -> bool;

    fn set_bit_on(&mut self, bit_idx: u8);

    fn set_bit_off(&mut self, bit_idx: u8);

    /// Extracts `bits_range` and moves it down to bit 0.
    fn get_bits(&self, bits_range: RangeInclusive<u8>) -> Self;

    fn is_bit_off(&self, bit_idx: u8) -> bool {
        !self.is_bit_on(bit_idx)
    }

    fn get_bit(&self, bit_idx: u8) -> bool {
        self.is_bit_on(bit_idx)
    }

    fn set_bit(&mut self, bit_idx: u8, value: bool) {
        if value {
            self.set_bit_on(bit_idx);
        } else {
            self.set_bit_off(bit_idx);
        }
    }

    /// The most significant bit, i.e. the sign in two's complement.
    fn sign_bit(&self) -> bool {
        self.is_bit_on(Self::WIDTH - 1)
    }
}

macro_rules! impl_bits {
    ($($t:ty),*) => {
        $(
            impl Bits for $t {
                const WIDTH: u8 = <$t>::BITS as u8;

                fn is_bit_on(&self, bit_idx: u8) -> bool {
                    debug_assert!(bit_idx < Self::WIDTH);
                    (*self >> bit_idx) & 1 == 1
                }

                fn set_bit_on(&mut self, bit_idx: u8) {
                    debug_assert!(bit_idx < Self::WIDTH);
                    *self |= 1 << bit_idx;
                }

                fn set_bit_off(&mut self, bit_idx: u8) {
                    debug_assert!(bit_idx < Self::WIDTH);
                    *self &= !(1 << bit_idx);
                }

                fn get_bits(&self, bits_range: RangeInclusive<u8>) -> Self {
                    let start = *bits_range.start();
                    let end = *bits_range.end();
                    debug_assert!(start <= end && end < Self::WIDTH);

                    // `length` ones moved down from the top, so a full-width
                    // range never shifts by WIDTH.
                    let length = end - start + 1;
                    let mask = <$t>::MAX >> (Self::WIDTH - length);

                    (*self >> start) & mask
                }
            }
        )*
    };
}

impl_bits!(u8, u16, u32);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    #[test]
    fn test_is_on() {
        let b = 0b1_1001_1101_u32;
        assert!(b.is_bit_on(0));
        assert!(!b.is_bit_on(1));
        assert!(b.is_bit_on(2));
        assert!(b.is_bit_on(3));
        assert!(b.is_bit_on(8));
        assert!(!b.is_bit_on(31));
    }

    #[test]
    fn test_is_off() {
        let b = 0b1_1001_1101_u32;
        assert!(!b.is_bit_off(0));
        assert!(b.is_bit_off(1));
        assert!(b.is_bit_off(31));
    }

    #[test]
    fn set_bit() {
        let mut b = 0b110_0110_u32;
        b.set_bit(0, true);
        b.set_bit(1, true);
        b.set_bit(2, false);
        b.set_bit(3, false);
        assert_eq!(b, 0b110_0011);

        b.set_bit(31, true);
        assert_eq!(b, 0x8000_0063);
    }

    #[test]
    fn get_bits() {
        let b = 0b10_1100_1110_u32;
        assert_eq!(b.get_bits(0..=3), 0b1110);
        assert_eq!(b.get_bits(1..=1), 0b1);
        assert_eq!(b.get_bits(4..=7), 0b1100);
        assert_eq!(b.get_bits(8..=9), 0b10);
        assert_eq!(b.get_bits(0..=31), 0b10_1100_1110);
        assert_eq!(b.get_bits(28..=31), 0b0);
        assert_eq!(0xE000_0000_u32.get_bits(28..=31), 0xE);
    }

    #[test]
    fn get_bits_full_width_is_identity() {
        let mut rng = rand::rng();
        for _ in 0..64 {
            let value: u32 = rng.random();
            assert_eq!(value.get_bits(0..=31), value);
            assert_eq!(value.get_bits(31..=31), value >> 31);
        }
    }

    #[test]
    fn sign_bit() {
        assert!(0x8000_0000_u32.sign_bit());
        assert!(!0x7FFF_FFFF_u32.sign_bit());
        assert!(0x80_u8.sign_bit());
    }
}
