//! framing/bits.rs
//! MSB-first fixed-width bit packing of signed residuals.

use crate::constants::MAX_BITS_PER_PIXEL;

#[inline(always)]
fn mask(bits: u8) -> u64 {
    (1u64 << bits) - 1
}

/// Bytes needed to hold `count` values of `bits` bits each.
#[inline]
pub fn packed_len(count: usize, bits: u8) -> usize {
    (count * bits as usize + 7) / 8
}

/// Append `values` to `out`, each as a `bits`-wide two's-complement field.
/// The final byte is zero-padded.
pub fn pack_bits<I>(values: I, bits: u8, out: &mut Vec<u8>)
where
    I: IntoIterator<Item = i32>,
{
    debug_assert!(bits >= 1 && bits <= MAX_BITS_PER_PIXEL);
    let m = mask(bits);
    let mut acc: u64 = 0;
    let mut pending: u32 = 0;

    for v in values {
        acc = (acc << bits) | (v as u32 as u64 & m);
        pending += bits as u32;
        while pending >= 8 {
            pending -= 8;
            out.push((acc >> pending) as u8);
        }
        acc &= mask(pending as u8);
    }
    if pending > 0 {
        out.push((acc << (8 - pending)) as u8);
    }
}

/// Iterator over `bits`-wide signed fields read MSB-first from a byte slice.
/// Stops when fewer than `bits` bits remain.
pub struct BitUnpacker<'a> {
    bytes: std::slice::Iter<'a, u8>,
    bits: u8,
    acc: u64,
    available: u32,
}

impl<'a> BitUnpacker<'a> {
    pub fn new(bytes: &'a [u8], bits: u8) -> Self {
        debug_assert!(bits >= 1 && bits <= MAX_BITS_PER_PIXEL);
        Self { bytes: bytes.iter(), bits, acc: 0, available: 0 }
    }
}

impl Iterator for BitUnpacker<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let bits = self.bits as u32;
        while self.available < bits {
            let byte = *self.bytes.next()?;
            self.acc = (self.acc << 8) | byte as u64;
            self.available += 8;
        }
        self.available -= bits;
        let raw = ((self.acc >> self.available) & mask(self.bits)) as u32;
        self.acc &= mask(self.available as u8);

        // Sign-extend from `bits` to 32.
        let shift = 32 - bits;
        Some(((raw << shift) as i32) >> shift)
    }
}
