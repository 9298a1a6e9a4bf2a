// GF(2^8) arithmetic with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11d)

const PRIM_POLY: u16 = 0x11d;

/// Precomputed tables for GF(256) arithmetic
pub struct Gf256Tables {
    pub exp: [u8; 512], // exp[i] = alpha^i, doubled for convenience
    pub log: [u8; 256], // log[x] = i where alpha^i = x (log[0] undefined)
}

impl Gf256Tables {
    pub const fn new() -> Self {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];

        let mut x: u16 = 1;
        let mut i = 0usize;
        while i < 255 {
            exp[i] = x as u8;
            exp[i + 255] = x as u8; // duplicate for mod-free lookup
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIM_POLY;
            }
            i += 1;
        }
        exp[510] = 1;
        log[0] = 0;

        Self { exp, log }
    }

    #[inline]
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[(self.log[a as usize] as usize) + (self.log[b as usize] as usize)]
        }
    }

    /// Multiplicative inverse, `None` for zero.
    #[inline]
    pub fn inv(&self, a: u8) -> Option<u8> {
        if a == 0 {
            None
        } else {
            Some(self.exp[255 - (self.log[a as usize] as usize)])
        }
    }

    /// dst[i] ^= c * src[i]
    pub fn mul_add_region(&self, dst: &mut [u8], src: &[u8], c: u8) {
        match c {
            0 => {}
            1 => {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d ^= s;
                }
            }
            _ => {
                let log_c = self.log[c as usize] as usize;
                for (d, &s) in dst.iter_mut().zip(src) {
                    if s != 0 {
                        *d ^= self.exp[log_c + self.log[s as usize] as usize];
                    }
                }
            }
        }
    }

    /// dst[i] = c * dst[i]
    pub fn mul_region(&self, dst: &mut [u8], c: u8) {
        match c {
            0 => dst.fill(0),
            1 => {}
            _ => {
                let log_c = self.log[c as usize] as usize;
                for d in dst.iter_mut() {
                    if *d != 0 {
                        *d = self.exp[log_c + self.log[*d as usize] as usize];
                    }
                }
            }
        }
    }
}

// Global static tables (computed at compile time)
pub static GF: Gf256Tables = Gf256Tables::new();

#[inline]
pub fn gf_mul(a: u8, b: u8) -> u8 {
    GF.mul(a, b)
}

#[inline]
pub fn gf_inv(a: u8) -> Option<u8> {
    GF.inv(a)
}
