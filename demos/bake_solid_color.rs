//! Demo baking every property of one material.
//!
//! Writes PNGs for the 8-bit properties, an EXR for emissive, and a texture
//! asset for the base color into `./baked`. Run with `RUST_LOG=debug` to see
//! each pipeline stage.

use matbake::{
    init, BakeQueue, BakeRequest, Baker, BatchOutcome, BitDepth, BlendMode, CancelToken,
    DirectoryAssetStore, Material, Options, OutputType, PropertyType, SoftwareRenderer, Vec3,
};

fn main() -> matbake::Result<()> {
    init();

    let options = Options {
        content_dir: "baked".into(),
        default_width: 256,
        default_height: 256,
        default_bit_depth: BitDepth::Bit8,
        default_output: OutputType::Png,
        ..Options::default()
    };
    let store = DirectoryAssetStore::new(options.clone());
    let mut baker = Baker::new(SoftwareRenderer::new(), store, options);

    let material = Material::solid("M_Copper", Vec3::new(0.95, 0.64, 0.54))
        .with_metallic(1.0)
        .with_roughness(0.35)
        .with_emissive(Vec3::new(2.0, 0.5, 0.0))
        .with_blend_mode(BlendMode::Masked)
        .with_opacity(0.8);

    let mut queue = BakeQueue::new();
    for property in PropertyType::ALL {
        let request = baker
            .request(material.clone(), "T_Copper", property)
            .with_output_path("/Game/Textures")
            .with_srgb(true);
        let request = match property {
            PropertyType::EmissiveColor => request
                .with_bit_depth(BitDepth::Bit16)
                .with_output(OutputType::Exr),
            // Shares the unsuffixed name with final color.
            PropertyType::Specular => BakeRequest {
                baked_name: "T_Copper_Spec".into(),
                ..request
            },
            _ => request,
        };
        queue.push(request)?;
    }
    queue.push(
        BakeRequest::new(material, "T_Copper_Asset")
            .with_size(128, 128)
            .with_property(PropertyType::BaseColor)
            .with_output_path("/Game/Textures")
            .with_srgb(true),
    )?;

    let report = baker.bake_batch(queue.as_slice(), &CancelToken::new())?;
    for (request, outcome) in queue.iter().zip(&report.outcomes) {
        match outcome {
            BatchOutcome::Baked(output) => println!("{:>14}: {output}", request.property),
            BatchOutcome::Failed(e) => println!("{:>14}: failed ({e})", request.property),
            BatchOutcome::Skipped => println!("{:>14}: skipped", request.property),
        }
    }
    println!("{} baked, {} failed", report.succeeded(), report.failed());
    Ok(())
}
