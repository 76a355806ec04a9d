use std::hint::black_box;

use colorcal::core::{ColorConverter, PixelFormat, PlanarImage, ReferenceColorSpace};
use colorcal::{CorrectionMapping, CorrectionRecipe, MappingMethod};
use criterion::{criterion_group, criterion_main, Criterion};

fn make_image(width: usize, height: usize) -> PlanarImage {
    let data: Vec<f32> = (0..width * height * 3)
        .map(|i| (i.wrapping_mul(2654435761) % 1000) as f32 / 999.0)
        .collect();
    PlanarImage::from_interleaved(width, height, PixelFormat::Rgb8, &data)
        .expect("fixture dimensions are valid")
}

fn make_recipe(method: MappingMethod, space: ReferenceColorSpace) -> CorrectionRecipe {
    let n = method.n_terms();
    let coefficients = std::array::from_fn(|band| {
        (0..n)
            .map(|k| if k == band + 1 || (n == 2 && k == 1) { 1.0 } else { 0.01 })
            .collect()
    });
    let mapping = CorrectionMapping::new(method, coefficients).expect("term count matches");
    CorrectionRecipe::new(mapping, ColorConverter::default(), space, PixelFormat::Rgb8)
}

fn bench_map(c: &mut Criterion) {
    let img = make_image(640, 480);
    for method in MappingMethod::ALL {
        let recipe = make_recipe(method, ReferenceColorSpace::Srgb);
        let name = format!("map_640x480_{method:?}");
        c.bench_function(&name, |b| {
            b.iter(|| {
                let bands = recipe.map(black_box(&img)).expect("formats match");
                black_box(bands)
            })
        });
    }
}

fn bench_correct_lab(c: &mut Criterion) {
    let img = make_image(640, 480);
    let recipe = make_recipe(MappingMethod::LinearCrossBand, ReferenceColorSpace::Lab);
    c.bench_function("correct_640x480_lab_to_srgb", |b| {
        b.iter(|| {
            let out = recipe.correct(black_box(&img)).expect("formats match");
            black_box(out)
        })
    });
}

criterion_group!(recipe, bench_map, bench_correct_lab);
criterion_main!(recipe);
