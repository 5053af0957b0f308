use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use studyguard::reading::ComprehensionTest;
use studyguard::reading::grader::grade;
use studyguard::session::normalize::normalize;
use studyguard::session::scheduler::DrillScheduler;
use studyguard::store::vocab::{VocabItem, VocabRepository};

fn make_repo(count: usize) -> VocabRepository {
    VocabRepository::in_memory(
        (0..count)
            .map(|i| VocabItem {
                term: format!("term{i}"),
                translation: format!("nghĩa {i}"),
            })
            .collect(),
    )
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize (annotated answer)", |b| {
        b.iter(|| normalize(black_box("  Rule Out (Verb) + Something Important  ")))
    });
}

fn bench_draw(c: &mut Criterion) {
    let repo = make_repo(200);

    c.bench_function("scheduler draw+submit (200 items)", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(1);
            let mut sched = DrillScheduler::start(&repo, u32::MAX, &mut rng).unwrap();
            for _ in 0..200 {
                sched.next(&mut rng);
                let idx = sched.current_index().unwrap();
                let term = &repo.get(idx).unwrap().term;
                black_box(sched.submit(term, &repo));
            }
        })
    });
}

fn bench_grade(c: &mut Criterion) {
    let test = ComprehensionTest::load_bundled().unwrap();
    let responses: Vec<Option<String>> = test
        .groups
        .iter()
        .flat_map(|g| g.answer_keys())
        .map(|k| Some(k.to_string()))
        .collect();

    c.bench_function("grade bundled test", |b| {
        b.iter(|| grade(black_box(&test), black_box(&responses)))
    });
}

criterion_group!(benches, bench_normalize, bench_draw, bench_grade);
criterion_main!(benches);
