use image::{Rgba, RgbaImage};
use shapetrace::{index_of_min, Color, Model, ModelConfig, SearchSettings, ShapeType};

fn small_search() -> SearchSettings {
    SearchSettings {
        candidates: 50,
        age: 50,
        restarts: 4,
        refine_age: 50,
    }
}

fn config(seed: u64, workers: usize) -> ModelConfig {
    ModelConfig {
        output_size: 200,
        workers,
        seed: Some(seed),
        search: small_search(),
    }
}

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([(x * 255 / w) as u8, (y * 255 / h) as u8, ((x + y) * 3 % 256) as u8, 255])
    })
}

#[test]
fn red_target_single_triangle() {
    let target = RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255]));
    let mut model = Model::with_config(target, Color::WHITE, &config(42, 2)).unwrap();
    let initial = model.score();

    let n = model.step(ShapeType::Triangle, 255, 0);
    assert!(n > 0);
    assert!(model.score() < initial);

    let color = model.colors()[0];
    assert_eq!(color.a, 255);
    assert!(color.r >= 250 && color.g <= 5 && color.b <= 5, "{color:?}");

    let svg = model.svg();
    assert_eq!(svg.matches("<polygon").count(), 1);
    assert_eq!(svg.matches("<path").count(), 0);
    assert_eq!(svg.matches("<rect").count(), 1);
}

#[test]
fn same_seed_same_history() {
    let run = || {
        let mut model = Model::with_config(gradient(40, 30), Color::BLACK, &config(7, 3)).unwrap();
        for _ in 0..4 {
            model.step(ShapeType::Any, 0, 1);
        }
        (model.shapes().to_vec(), model.colors().to_vec(), model.score())
    };
    let (shapes_a, colors_a, score_a) = run();
    let (shapes_b, colors_b, score_b) = run();
    assert_eq!(shapes_a, shapes_b);
    assert_eq!(colors_a, colors_b);
    assert_eq!(score_a, score_b);
}

#[test]
fn single_pixel_target() {
    let target = RgbaImage::from_pixel(1, 1, Rgba([90, 60, 30, 255]));
    let mut model = Model::with_config(target, Color::new(90, 60, 30, 255), &config(3, 2)).unwrap();
    assert!(model.score().abs() < 1e-12);
    for kind in ShapeType::CONCRETE {
        model.step(kind, 128, 0);
    }
    assert_eq!(model.shapes().len(), 8);
    assert!(model.score() < 0.01);
}

#[test]
fn exports_are_stable() {
    let mut model = Model::with_config(gradient(32, 32), Color::WHITE, &config(11, 2)).unwrap();
    for _ in 0..5 {
        model.step(ShapeType::Any, 128, 0);
    }
    assert_eq!(model.svg(), model.svg());

    let frames = model.frames(0.0).unwrap();
    assert_eq!(frames.len(), model.shapes().len() + 1);
    assert_eq!(frames[0].dimensions(), model.output_size());
    assert_eq!(frames.last(), Some(&model.render()));
}

#[test]
fn score_goes_down_step_by_step() {
    let mut model = Model::with_config(gradient(48, 32), Color::WHITE, &config(5, 2)).unwrap();
    let mut previous = model.score();
    for _ in 0..6 {
        model.step(ShapeType::Rectangle, 200, 0);
        assert!(model.score() <= previous + 1e-12);
        previous = model.score();
    }
    assert!(model.improvement_percent() > 0.0);
}

#[test]
fn reduction_takes_first_minimum() {
    assert_eq!(index_of_min(&[5.0, 2.0, 2.0, 7.0]), Some(1));
}
