//! Extracting and replacing bitfields in integers.
//!
//! `x.bits(lo, hi)` returns the bits of `x` in the range [`lo`, `hi`) in
//! its low part. `x.with_bits(lo, hi, v)` returns `x` with that range
//! replaced by the low bits of `v`; bits outside the range are untouched and
//! excess bits of `v` are masked off.

pub trait BitField: Sized {
    fn bits(self, lo: u32, hi: u32) -> Self;
    fn with_bits(self, lo: u32, hi: u32, value: Self) -> Self;
}

macro_rules! def_bitfield {
    ($t:ty, $bitwidth:expr) => {
        impl BitField for $t {
            #[inline(always)]
            fn bits(self, lo: u32, hi: u32) -> $t {
                debug_assert!(lo < hi && hi <= $bitwidth);
                (self >> lo) & mask::<$t>(hi - lo)
            }

            #[inline(always)]
            fn with_bits(self, lo: u32, hi: u32, value: $t) -> $t {
                debug_assert!(lo < hi && hi <= $bitwidth);
                let m = mask::<$t>(hi - lo);
                (self & !(m << lo)) | ((value & m) << lo)
            }
        }
    };
}

#[inline(always)]
fn mask<T>(width: u32) -> T
where T: Mask {
    T::mask(width)
}

trait Mask {
    fn mask(width: u32) -> Self;
}

macro_rules! def_mask {
    ($t:ty, $bitwidth:expr) => {
        impl Mask for $t {
            #[inline(always)]
            fn mask(width: u32) -> $t { !0 >> ($bitwidth - width) }
        }
    };
}

def_mask!(u32, 32);

def_bitfield!(u32, 32);
