//! arch.rs
//! Architecture selection and CPU capability detection.
//!
//! A [`Features`] bitmask describes what the host CPU can run; an [`Arch`] is
//! one of the selectable SIMD backends. Unsupported architectures are never an
//! error: selection silently downgrades to the best supported backend, with
//! scalar always available.

use bitflags::bitflags;
use num_enum::TryFromPrimitive;

bitflags! {
    /// Detected CPU capabilities, mirrored into every manager at bind time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Features: u64 {
        const CMOV       = 1 << 0;
        const SSE4_2     = 1 << 1;
        const AESNI      = 1 << 2;
        const PCLMULQDQ  = 1 << 3;
        const AVX        = 1 << 4;
        const AVX2       = 1 << 5;
        const AVX512F    = 1 << 6;
        /// SHA extensions: substitutes the accelerated SSE hash path.
        const SHANI      = 1 << 7;
        /// Parameter-validation layer is active.
        const SAFE_PARAM = 1 << 8;
    }
}

impl Features {
    /// Probe the host CPU. On non-x86_64 targets only the scalar baseline is
    /// reported.
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        let mut f = Features::CMOV;
        if is_x86_feature_detected!("sse4.2") {
            f |= Features::SSE4_2;
        }
        if is_x86_feature_detected!("aes") {
            f |= Features::AESNI;
        }
        if is_x86_feature_detected!("pclmulqdq") {
            f |= Features::PCLMULQDQ;
        }
        if is_x86_feature_detected!("avx") {
            f |= Features::AVX;
        }
        if is_x86_feature_detected!("avx2") {
            f |= Features::AVX2;
        }
        if is_x86_feature_detected!("avx512f") {
            f |= Features::AVX512F;
        }
        if is_x86_feature_detected!("sha") {
            f |= Features::SHANI;
        }
        f
    }

    #[cfg(not(target_arch = "x86_64"))]
    pub fn detect() -> Self {
        Features::CMOV
    }
}

/// Selectable SIMD backend. Scalar is the AESNI-emulation baseline and can
/// always run; the rest are gated on [`Features`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Arch {
    Scalar = 0,
    Sse = 1,
    Avx = 2,
    Avx2 = 3,
    Avx512 = 4,
}

/// All architectures, widest last. Order matters for downgrade.
pub const ALL_ARCHS: [Arch; 5] = [Arch::Scalar, Arch::Sse, Arch::Avx, Arch::Avx2, Arch::Avx512];

impl Arch {
    /// Feature set this architecture needs before it may be bound.
    pub fn required(self) -> Features {
        let sse = Features::SSE4_2 | Features::CMOV | Features::AESNI;
        match self {
            Arch::Scalar => Features::empty(),
            Arch::Sse => sse,
            Arch::Avx => Features::AVX | Features::CMOV | Features::AESNI,
            Arch::Avx2 => Arch::Avx.required() | Features::AVX2,
            Arch::Avx512 => Arch::Avx2.required() | Features::AVX512F,
        }
    }

    pub fn is_supported(self, features: Features) -> bool {
        features.contains(self.required())
    }

    /// Silent-downgrade rule: walk toward scalar until a supported backend is
    /// found. Scalar always qualifies.
    pub fn downgrade(self, features: Features) -> Arch {
        let mut idx = ALL_ARCHS.iter().position(|&a| a == self).unwrap_or(0);
        loop {
            let cand = ALL_ARCHS[idx];
            if cand.is_supported(features) {
                return cand;
            }
            if idx == 0 {
                return Arch::Scalar;
            }
            idx -= 1;
        }
    }

    /// Architectures the current host supports, in widening order.
    pub fn detect_supported() -> Vec<Arch> {
        let features = Features::detect();
        ALL_ARCHS
            .iter()
            .copied()
            .filter(|a| a.is_supported(features))
            .collect()
    }

    /// SIMD lanes a multi-buffer hash batch fills on this backend. With SHA
    /// extensions bound, the SSE path runs two interleaved streams.
    pub fn hash_lanes(self, shani: bool) -> usize {
        match self {
            Arch::Scalar => 1,
            Arch::Sse => {
                if shani {
                    2
                } else {
                    4
                }
            }
            Arch::Avx => 8,
            Arch::Avx2 => 8,
            Arch::Avx512 => 16,
        }
    }

    /// SIMD lanes an AES cipher batch fills on this backend.
    pub fn aes_lanes(self) -> usize {
        match self {
            Arch::Scalar => 1,
            Arch::Sse => 4,
            Arch::Avx => 8,
            Arch::Avx2 => 8,
            Arch::Avx512 => 16,
        }
    }
}
