//! Channel post-processing applied in place after readback.

use half::f16;

use crate::material::BlendMode;
use crate::pixel::{PixelBuffer, PixelData};
use crate::property::{PostProcessRule, PropertyType};

/// Applies the property's channel rule to `buffer` in place.
///
/// Opacity copies R into G, B, and A. Every other property forces alpha to
/// the maximum value when the material is opaque. The two rules never both
/// apply to one bake.
pub fn apply(buffer: &mut PixelBuffer, property: PropertyType, blend_mode: BlendMode) {
    match property.info().post_process {
        PostProcessRule::ReplicateRed => replicate_red(buffer.data_mut()),
        PostProcessRule::ClampOpaqueAlpha => {
            if blend_mode.is_opaque() {
                force_opaque_alpha(buffer.data_mut());
            }
        }
    }
}

/// Copies R into G, B, and A for every pixel.
pub fn replicate_red(data: &mut PixelData) {
    match data {
        PixelData::Bgra8(pixels) => {
            for p in pixels.iter_mut() {
                p.g = p.r;
                p.b = p.r;
                p.a = p.r;
            }
        }
        PixelData::Rgba16F(pixels) => {
            for p in pixels.iter_mut() {
                p.g = p.r;
                p.b = p.r;
                p.a = p.r;
            }
        }
    }
}

/// Sets alpha to 255 (8-bit) or 1.0 (16-bit) for every pixel.
pub fn force_opaque_alpha(data: &mut PixelData) {
    match data {
        PixelData::Bgra8(pixels) => pixels.iter_mut().for_each(|p| p.a = u8::MAX),
        PixelData::Rgba16F(pixels) => pixels.iter_mut().for_each(|p| p.a = f16::ONE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Bgra8, Rgba16F};
    use proptest::prelude::*;

    fn bgra_buffer(pixels: Vec<Bgra8>) -> PixelBuffer {
        let width = u32::try_from(pixels.len()).unwrap();
        PixelBuffer::new(width, 1, PixelData::Bgra8(pixels)).unwrap()
    }

    #[test]
    fn test_opacity_16bit_replicates_red() {
        let mut buffer = PixelBuffer::filled_rgba16f(2, 2, Rgba16F::new(0.3, 0.0, 0.0, 1.0));
        apply(&mut buffer, PropertyType::Opacity, BlendMode::Opaque);
        let PixelData::Rgba16F(pixels) = buffer.data() else {
            panic!("format changed");
        };
        for p in pixels {
            assert_eq!(p.g, p.r);
            assert_eq!(p.b, p.r);
            assert_eq!(p.a, p.r);
            assert_eq!(p.r, f16::from_f32(0.3));
        }
    }

    #[test]
    fn test_opacity_skips_alpha_clamp() {
        let mut buffer = bgra_buffer(vec![Bgra8::new(64, 0, 0, 255)]);
        apply(&mut buffer, PropertyType::Opacity, BlendMode::Opaque);
        assert_eq!(buffer.as_bytes(), &[64, 64, 64, 64]);
    }

    #[test]
    fn test_translucent_keeps_alpha() {
        let mut buffer = bgra_buffer(vec![Bgra8::new(1, 2, 3, 77)]);
        apply(&mut buffer, PropertyType::BaseColor, BlendMode::Translucent);
        assert_eq!(buffer.as_bytes(), &[3, 2, 1, 77]);
    }

    #[test]
    fn test_opaque_16bit_alpha_is_one() {
        let mut buffer = PixelBuffer::filled_rgba16f(3, 1, Rgba16F::new(0.2, 0.4, 0.6, 0.1));
        apply(&mut buffer, PropertyType::FinalColor, BlendMode::Opaque);
        let PixelData::Rgba16F(pixels) = buffer.data() else {
            panic!("format changed");
        };
        for p in pixels {
            assert_eq!(p.a, f16::ONE);
            assert_eq!(p.g, f16::from_f32(0.4));
        }
    }

    proptest! {
        #[test]
        fn prop_opacity_replicates_red(
            raw in proptest::collection::vec(any::<[u8; 4]>(), 1..64),
        ) {
            let pixels: Vec<Bgra8> =
                raw.iter().map(|c| Bgra8::new(c[0], c[1], c[2], c[3])).collect();
            let mut buffer = bgra_buffer(pixels.clone());
            apply(&mut buffer, PropertyType::Opacity, BlendMode::Opaque);
            let PixelData::Bgra8(out) = buffer.data() else { unreachable!() };
            for (before, after) in pixels.iter().zip(out) {
                prop_assert_eq!(after.r, before.r);
                prop_assert_eq!(after.g, before.r);
                prop_assert_eq!(after.b, before.r);
                prop_assert_eq!(after.a, before.r);
            }
        }

        #[test]
        fn prop_opaque_clamp_only_touches_alpha(
            raw in proptest::collection::vec(any::<[u8; 4]>(), 1..64),
        ) {
            let pixels: Vec<Bgra8> =
                raw.iter().map(|c| Bgra8::new(c[0], c[1], c[2], c[3])).collect();
            let mut buffer = bgra_buffer(pixels.clone());
            apply(&mut buffer, PropertyType::Roughness, BlendMode::Opaque);
            let PixelData::Bgra8(out) = buffer.data() else { unreachable!() };
            for (before, after) in pixels.iter().zip(out) {
                prop_assert_eq!(after.a, 255);
                prop_assert_eq!((after.r, after.g, after.b), (before.r, before.g, before.b));
            }
        }
    }
}
