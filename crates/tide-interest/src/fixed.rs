//! WAD-scaled fixed-point arithmetic with truncating multiplication.
//!
//! Amounts reach `50_000 * 10^18` and factors sit near `10^18`, so the raw
//! product exceeds `u128`. Products are formed in 256 bits (four 64-bit
//! limbs) and divided back down by `WAD`.

use tide_core::constants::WAD;
use tide_core::error::ArithmeticError;

const LIMB_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two `u128` values as `(hi, lo)`.
fn full_mul(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LIMB_MASK);
    let (b1, b0) = (b >> 64, b & LIMB_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // Each term < 2^64, so the sum fits u128.
    let mid = (p00 >> 64) + (p01 & LIMB_MASK) + (p10 & LIMB_MASK);
    let lo = (p00 & LIMB_MASK) | (mid << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// Divide a 256-bit value by a 64-bit divisor, truncating.
///
/// Returns `None` if the quotient does not fit in `u128`.
fn div_256_by_64(hi: u128, lo: u128, divisor: u64) -> Option<u128> {
    let d = divisor as u128;
    let limbs = [hi >> 64, hi & LIMB_MASK, lo >> 64, lo & LIMB_MASK];
    let mut quotient = [0u128; 4];
    let mut rem: u128 = 0;

    for (i, limb) in limbs.iter().enumerate() {
        // rem < d < 2^64, so (rem << 64) | limb fits u128.
        let cur = (rem << 64) | limb;
        quotient[i] = cur / d;
        rem = cur % d;
    }

    if quotient[0] != 0 || quotient[1] != 0 {
        return None;
    }
    Some((quotient[2] << 64) | quotient[3])
}

/// Fixed-point multiply: `floor(a * b / WAD)`.
///
/// Either operand may be a WAD-scaled factor or a base-unit amount; the
/// result carries the other operand's scale.
pub fn mul_wad_down(a: u128, b: u128) -> Result<u128, ArithmeticError> {
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / WAD);
    }
    let (hi, lo) = full_mul(a, b);
    div_256_by_64(hi, lo, WAD as u64).ok_or(ArithmeticError::Overflow)
}

/// Fixed-point exponentiation: computes `(base/WAD)^exp` on the WAD scale.
///
/// Uses binary exponentiation for O(log n) multiplications. Every
/// multiplication truncates, so the result never exceeds the exact power.
pub fn fixed_pow(base: u128, exp: u64) -> Result<u128, ArithmeticError> {
    if exp == 0 {
        return Ok(WAD); // (base/WAD)^0 = 1.0
    }

    let mut result: u128 = WAD;
    let mut b: u128 = base;
    let mut e = exp;

    while e > 0 {
        if e & 1 == 1 {
            result = mul_wad_down(result, b)?;
        }
        e >>= 1;
        if e > 0 {
            b = mul_wad_down(b, b)?;
        }
    }

    Ok(result)
}
