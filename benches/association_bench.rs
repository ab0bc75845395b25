use corr_track::{BBox, associate, calc_iou_matrix, solve_assignment};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::prelude::*;

fn generate_random_boxes(count: usize, rng: &mut StdRng) -> Vec<BBox> {
    (0..count)
        .map(|_| {
            BBox::new(
                rng.gen_range(0.0..1800.0),
                rng.gen_range(0.0..1000.0),
                rng.gen_range(20.0..120.0),
                rng.gen_range(20.0..120.0),
            )
        })
        .collect()
}

/// Detections jittered around existing tracks, as in a steady-state frame.
fn jittered(boxes: &[BBox], rng: &mut StdRng) -> Vec<BBox> {
    boxes
        .iter()
        .map(|bbox| {
            BBox::new(
                bbox.x + rng.gen_range(-5.0..5.0),
                bbox.y + rng.gen_range(-5.0..5.0),
                bbox.width,
                bbox.height,
            )
        })
        .collect()
}

fn bench_associate(c: &mut Criterion, tracks: usize, detections: usize) {
    let mut rng = StdRng::seed_from_u64(42);
    let track_bboxes = generate_random_boxes(tracks, &mut rng);
    let mut detection_bboxes = jittered(&track_bboxes[..tracks.min(detections)], &mut rng);
    detection_bboxes.extend(generate_random_boxes(detections.saturating_sub(tracks), &mut rng));

    c.bench_function(&format!("associate_{tracks}x{detections}"), |b| {
        b.iter(|| associate(black_box(&track_bboxes), black_box(&detection_bboxes), 0.3))
    });
}

fn bench_associate_small(c: &mut Criterion) {
    bench_associate(c, 10, 10);
}

fn bench_associate_medium(c: &mut Criterion) {
    bench_associate(c, 50, 60);
}

fn bench_associate_large(c: &mut Criterion) {
    bench_associate(c, 200, 200);
}

fn bench_solve_assignment(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let track_bboxes = generate_random_boxes(100, &mut rng);
    let detection_bboxes = jittered(&track_bboxes, &mut rng);
    let iou_matrix = calc_iou_matrix(&track_bboxes, &detection_bboxes);

    c.bench_function("solve_assignment_100x100", |b| {
        b.iter(|| solve_assignment(black_box(&iou_matrix)))
    });
}

criterion_group!(
    benches,
    bench_associate_small,
    bench_associate_medium,
    bench_associate_large,
    bench_solve_assignment
);
criterion_main!(benches);
