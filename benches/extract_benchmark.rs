//! Benchmarks for record extraction.
//!
//! Run with: cargo bench
//!
//! Synthetic reports of increasing length are assembled and merged.

use autmine::{merge, Assembler, Document, ExtractOptions, MergePolicy, Pipeline, PipelineOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates a synthetic report with roughly `filler` extra paragraphs.
fn create_report(name: &str, filler: usize) -> Document {
    let mut paragraphs = vec![
        "Obduktionserklæring".to_string(),
        "Ligsynet vedrører en 54-årig mand.".to_string(),
        "Af sagsakterne fremgår, at afdøde blev fundet drivende i havnen.".to_string(),
    ];
    for i in 0..filler {
        paragraphs.push(format!("Afsnit {} uden særlige fund.", i));
    }
    paragraphs.extend(
        [
            "Indvendig undersøgelse",
            "Hjertet vejer 350 g. Leveren vejer 1600 g.",
            "Hjertet måler 12 x 10 x 5 cm.",
            "Hjerteposen er glat og skinnende, farven er rødbrun.",
            "Legemspulsåren og dens grene er glatte.",
            "Konklusion. Dødsårsagen vurderes at være drukning. Der var ingen tegn på vold.",
        ]
        .map(String::from),
    );
    Document::from_paragraphs(name, paragraphs)
}

/// Benchmark single-document assembly at various sizes.
fn bench_assembly(c: &mut Criterion) {
    let assembler = Assembler::new(ExtractOptions::default()).unwrap();
    let mut group = c.benchmark_group("assembly");

    for filler in [10, 100, 500].iter() {
        let doc = create_report("a.docx", *filler);

        group.bench_function(format!("{}_paragraphs", filler), |b| {
            b.iter(|| assembler.assemble(black_box(&doc)));
        });
    }

    group.finish();
}

/// Benchmark a batch run, parallel and sequential.
fn bench_batch(c: &mut Criterion) {
    let docs: Vec<Document> = (0..64)
        .map(|i| create_report(&format!("{:03}.docx", i), 50))
        .collect();

    let parallel = Pipeline::new(ExtractOptions::default()).unwrap();
    let sequential = Pipeline::new(ExtractOptions::default())
        .unwrap()
        .with_options(PipelineOptions::new().sequential());

    let mut group = c.benchmark_group("batch");
    group.bench_function("parallel_64", |b| {
        b.iter(|| parallel.run_documents(black_box(&docs)));
    });
    group.bench_function("sequential_64", |b| {
        b.iter(|| sequential.run_documents(black_box(&docs)));
    });
    group.finish();
}

/// Benchmark duplicate merging.
fn bench_merge(c: &mut Criterion) {
    let assembler = Assembler::new(ExtractOptions::default()).unwrap();
    let records: Vec<_> = (0..256)
        .map(|i| assembler.assemble(&create_report(&format!("{:03}.docx", i), 0)).record)
        .collect();
    let policy = MergePolicy::new().with_isolate_unidentified(false);

    c.bench_function("merge_256", |b| {
        b.iter(|| merge(black_box(records.clone()), &policy));
    });
}

criterion_group!(benches, bench_assembly, bench_batch, bench_merge);
criterion_main!(benches);
