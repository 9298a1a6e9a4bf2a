// GF(2^4) arithmetic with primitive polynomial x^4 + x + 1 (0x13)
// Elements live in the low nibble; packed data carries two elements per byte,
// low nibble first.

const PRIM_POLY: u8 = 0x13;

pub struct Gf16Tables {
    pub exp: [u8; 32],
    pub log: [u8; 16],
}

impl Gf16Tables {
    pub const fn new() -> Self {
        let mut exp = [0u8; 32];
        let mut log = [0u8; 16];

        let mut x: u8 = 1;
        let mut i = 0usize;
        while i < 15 {
            exp[i] = x;
            exp[i + 15] = x;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x10 != 0 {
                x ^= PRIM_POLY;
            }
            i += 1;
        }
        exp[30] = 1;

        Self { exp, log }
    }

    #[inline]
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        let (a, b) = (a & 0x0f, b & 0x0f);
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[(self.log[a as usize] + self.log[b as usize]) as usize]
        }
    }

    #[inline]
    pub fn inv(&self, a: u8) -> Option<u8> {
        let a = a & 0x0f;
        if a == 0 {
            None
        } else {
            Some(self.exp[15 - self.log[a as usize] as usize])
        }
    }

    /// Multiplies both nibbles of a packed byte by `c`.
    #[inline]
    fn mul_packed(&self, c: u8, byte: u8) -> u8 {
        self.mul(c, byte) | (self.mul(c, byte >> 4) << 4)
    }

    pub fn mul_add_region(&self, dst: &mut [u8], src: &[u8], c: u8) {
        match c & 0x0f {
            0 => {}
            1 => {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d ^= s;
                }
            }
            c => {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d ^= self.mul_packed(c, s);
                }
            }
        }
    }

    pub fn mul_region(&self, dst: &mut [u8], c: u8) {
        match c & 0x0f {
            0 => dst.fill(0),
            1 => {}
            c => {
                for d in dst.iter_mut() {
                    *d = self.mul_packed(c, *d);
                }
            }
        }
    }
}

pub static GF16: Gf16Tables = Gf16Tables::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_table() {
        assert_eq!(GF16.inv(0), None);
        for a in 1u8..16 {
            let inv = GF16.inv(a).unwrap();
            assert_eq!(GF16.mul(a, inv), 1, "a={} inv={}", a, inv);
        }
    }

    #[test]
    fn test_generator_order() {
        // alpha = 2 generates all 15 non-zero elements
        let mut seen = [false; 16];
        for i in 0..15 {
            seen[GF16.exp[i] as usize] = true;
        }
        assert!(seen[1..].iter().all(|&s| s));
    }

    #[test]
    fn test_packed_region_scales_each_nibble() {
        let src = [0x21u8, 0xf3];
        let mut dst = [0u8; 2];
        GF16.mul_add_region(&mut dst, &src, 3);
        assert_eq!(dst[0] & 0x0f, GF16.mul(3, 1));
        assert_eq!(dst[0] >> 4, GF16.mul(3, 2));
        assert_eq!(dst[1] & 0x0f, GF16.mul(3, 3));
        assert_eq!(dst[1] >> 4, GF16.mul(3, 0xf));
    }
}
