//! Adler-32 checksum (RFC 1950) over the uncompressed stream.

const MOD_ADLER: u32 = 65_521;

/// Largest run of bytes before the sums must be reduced modulo 65521.
const NMAX: usize = 5552;

/// Rolling Adler-32 state. Initial value 1.
///
/// The engine updates this with bytes in the order they enter the sliding
/// window, so the running value always reflects exactly the consumed input.
#[derive(Debug, Clone)]
pub struct Adler32 {
    s1: u32,
    s2: u32,
}

impl Adler32 {
    /// Create a checksum in its initial state.
    pub fn new() -> Self {
        Self { s1: 1, s2: 0 }
    }

    /// Feed a contiguous byte slice into the checksum.
    ///
    /// Modulo operations are deferred to NMAX-sized chunk boundaries.
    pub fn update(&mut self, data: &[u8]) {
        for chunk in data.chunks(NMAX) {
            for &b in chunk {
                self.s1 += b as u32;
                self.s2 += self.s1;
            }
            self.s1 %= MOD_ADLER;
            self.s2 %= MOD_ADLER;
        }
    }

    /// The current checksum value.
    pub fn value(&self) -> u32 {
        (self.s2 << 16) | self.s1
    }

    /// Restore the initial value.
    pub fn reset(&mut self) {
        self.s1 = 1;
        self.s2 = 0;
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate the Adler-32 checksum of `data` in one shot.
#[inline]
pub fn adler32(data: &[u8]) -> u32 {
    let mut adler = Adler32::new();
    adler.update(data);
    adler.value()
}
