//! Benchmarks for studio-core time operations.
//!
//! Run with: cargo bench -p studio-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use studio_core::{CubicBezier, EasingCurve, FrameRate, KeyframeTrack, RationalTime};

fn bench_rational_time_arithmetic(c: &mut Criterion) {
    let a = RationalTime::new(1001, 30);
    let b = RationalTime::new(500, 24);

    c.bench_function("rational_time_add", |bencher| {
        bencher.iter(|| black_box(a) + black_box(b));
    });

    c.bench_function("rational_time_mul_f64", |bencher| {
        bencher.iter(|| black_box(a).mul_f64(black_box(1.5)));
    });

    c.bench_function("rational_time_rem_euclid", |bencher| {
        bencher.iter(|| black_box(a).rem_euclid(black_box(b)));
    });
}

fn bench_frame_conversion(c: &mut Criterion) {
    let time = RationalTime::new(3600, 1); // 1 hour
    let ntsc = FrameRate::FPS_29_97;

    c.bench_function("to_frames_rounded_1hr_ntsc", |bencher| {
        bencher.iter(|| black_box(time).to_frames_rounded(black_box(ntsc)));
    });

    c.bench_function("from_frames_107892", |bencher| {
        bencher.iter(|| RationalTime::from_frames(black_box(107_892), black_box(ntsc)));
    });

    c.bench_function("from_seconds_f64", |bencher| {
        bencher.iter(|| RationalTime::from_seconds_f64(black_box(1234.5678)));
    });
}

fn bench_keyframe_evaluation(c: &mut Criterion) {
    let mut track = KeyframeTrack::new("bench_param");
    for i in 0..100 {
        let easing = if i % 2 == 0 {
            EasingCurve::Linear
        } else {
            EasingCurve::Bezier(CubicBezier::EASE_IN_OUT)
        };
        track.set(RationalTime::new(i, 1), (i as f64 * 0.1).sin(), easing);
    }

    c.bench_function("keyframe_evaluate_linear_100kf", |bencher| {
        bencher.iter(|| track.evaluate(black_box(RationalTime::new(50, 1))));
    });

    c.bench_function("keyframe_evaluate_bezier_100kf", |bencher| {
        bencher.iter(|| track.evaluate(black_box(RationalTime::new(103, 2))));
    });

    c.bench_function("keyframe_split_100kf", |bencher| {
        bencher.iter(|| {
            let mut left = track.clone();
            left.split_at(black_box(RationalTime::new(101, 2)))
        });
    });
}

criterion_group!(
    benches,
    bench_rational_time_arithmetic,
    bench_frame_conversion,
    bench_keyframe_evaluation,
);
criterion_main!(benches);
