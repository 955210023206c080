//! Encoded rotation algebra.
//!
//! MagicaVoxel stores model orientation as a single byte encoding one of the
//! 48 signed-permutation 3x3 matrices (the symmetries of the cube). The bit
//! layout, from the published format notes:
//!
//! ```text
//! bit | meaning
//! 0-1 : column of the non-zero entry in row 0
//! 2-3 : column of the non-zero entry in row 1
//!       (row 2 uses the remaining column)
//! 4   : sign of row 0 (0 positive, 1 negative)
//! 5   : sign of row 1
//! 6   : sign of row 2
//! 7   : must be 0
//! ```
//!
//! The 48 valid codes are closed under multiplication and form a group of
//! order 48, so inverses can be found by brute force once and cached.

use std::fmt;
use std::ops::Mul;
use std::sync::OnceLock;

use glam::IVec3;

/// Identity rotation code: row 0 uses column 0, row 1 column 1, all signs
/// positive.
const IDENTITY_CODE: u8 = 0x04;

/// One of the 48 valid encoded rotations.
///
/// A `Rotation` can only be constructed from a valid code, so the algebra
/// below never has to re-check validity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

/// Report whether a raw code byte encodes a valid matrix: the top bit is
/// clear and the row-0/row-1 columns are distinct and both in 0..=2.
fn code_valid(code: u8) -> bool {
    let col0 = code & 3;
    let col1 = (code >> 2) & 3;
    code & 0x80 == 0 && col0 != col1 && col0 != 3 && col1 != 3
}

/// Matrix entry (i, j) of a raw code, -1, 0 or 1.
///
/// Works on arbitrary bytes (the row-2 column may fall outside 0..=2 for
/// invalid codes, which simply yields 0), so the inverse-table search can use
/// it before validity is established.
fn code_entry(code: u8, i: usize, j: usize) -> i32 {
    let sign = |bit: u8| if bit == 0 { 1 } else { -1 };
    let hit = |col: i32| (j as i32 == col) as i32;
    match i {
        0 => hit((code & 3) as i32) * sign((code >> 4) & 1),
        1 => hit(((code >> 2) & 3) as i32) * sign((code >> 5) & 1),
        _ => {
            let col = 3 - (code & 3) as i32 - ((code >> 2) & 3) as i32;
            hit(col) * sign((code >> 6) & 1)
        }
    }
}

/// Product of two raw codes, re-encoded into the same bit layout.
fn code_mul(a: u8, b: u8) -> u8 {
    let mut r = 0u8;
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                let x = code_entry(a, i, j) * code_entry(b, j, k);
                if x == 0 {
                    continue;
                }
                if x < 0 {
                    r |= 1 << (i + 4);
                }
                if i < 2 {
                    r |= (k as u8) << (2 * i);
                }
            }
        }
    }
    r
}

/// Inverse lookup table indexed by code, built once on first use.
///
/// Entries for invalid codes stay 0; `Rotation` values never index them.
fn inverse_table() -> &'static [u8; 128] {
    static TABLE: OnceLock<[u8; 128]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u8; 128];
        for code in 0..128u8 {
            if !code_valid(code) {
                continue;
            }
            for candidate in 0..128u8 {
                if code_valid(candidate) && code_mul(code, candidate) == IDENTITY_CODE {
                    table[code as usize] = candidate;
                    break;
                }
            }
        }
        table
    })
}

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Rotation = Rotation(IDENTITY_CODE);

    /// Decode a raw byte, returning `None` for the 208 invalid codes.
    pub fn from_code(code: u8) -> Option<Self> {
        code_valid(code).then_some(Self(code))
    }

    /// The raw 8-bit encoding.
    #[inline]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Matrix entry at row `i`, column `j`, one of -1, 0, 1.
    ///
    /// Both indices must be in 0..=2.
    #[inline]
    pub fn get(self, i: usize, j: usize) -> i32 {
        code_entry(self.0, i, j)
    }

    /// Matrix-vector product over the integers.
    pub fn apply(self, v: IVec3) -> IVec3 {
        let x = [v.x, v.y, v.z];
        let mut r = [0i32; 3];
        for (i, out) in r.iter_mut().enumerate() {
            for (j, component) in x.iter().enumerate() {
                *out += self.get(i, j) * component;
            }
        }
        IVec3::from_array(r)
    }

    /// The inverse rotation, from the precomputed table.
    pub fn inverse(self) -> Rotation {
        Rotation(inverse_table()[self.0 as usize])
    }
}

impl Mul for Rotation {
    type Output = Rotation;

    /// 3x3 integer matrix product; valid codes are closed under it.
    fn mul(self, rhs: Rotation) -> Rotation {
        Rotation(code_mul(self.0, rhs.0))
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotation({:#04x})", self.0)
    }
}
