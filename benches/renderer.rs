use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use risk_matrix_renderer::config::Config;
use risk_matrix_renderer::export::{OutputMode, export_with_measurer};
use risk_matrix_renderer::ir::{DomainSet, Item};
use risk_matrix_renderer::layout::compute_layout;
use risk_matrix_renderer::records::parse_records;
use risk_matrix_renderer::render::render_svg;
use risk_matrix_renderer::text_metrics::FallbackMetrics;
use std::hint::black_box;

const LEVELS: [&str; 4] = ["low", "some", "high", "unclear"];

fn generated_items(count: usize, domains: &DomainSet) -> Vec<Item> {
    (0..count)
        .map(|i| {
            let words = 2 + i % 14;
            let name = (0..words)
                .map(|w| format!("trial{}", i * 31 + w))
                .collect::<Vec<_>>()
                .join(" ");
            domains
                .iter()
                .enumerate()
                .fold(Item::new(name), |item, (d, domain)| {
                    item.with_value(domain.id.clone(), LEVELS[(i + d) % LEVELS.len()])
                })
        })
        .collect()
}

fn fixture_items() -> Vec<Item> {
    let input = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/rob2_records.json5"
    ));
    parse_records(input, &DomainSet::rob2())
        .expect("fixture parse failed")
        .items
}

fn bench_records(c: &mut Criterion) {
    let input = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/rob2_records.json5"
    ));
    let domains = DomainSet::rob2();
    c.bench_function("records/rob2_fixture", |b| {
        b.iter(|| {
            let records = parse_records(black_box(input), &domains).expect("parse failed");
            black_box(records.items.len());
        });
    });
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = Config::default();
    for (domain_count, items) in [(5, 10), (5, 200), (9, 200), (9, 2000)] {
        let domains = DomainSet::numbered(domain_count);
        let items = generated_items(items, &domains);
        let id = format!("{}x{}", items.len(), domain_count);
        group.bench_with_input(BenchmarkId::from_parameter(id), &items, |b, items| {
            b.iter(|| {
                let layout = compute_layout(
                    black_box(items),
                    &domains,
                    &config.styles,
                    &config.theme,
                    &config.layout,
                    &FallbackMetrics,
                );
                black_box(layout.rows.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let config = Config::default();
    let domains = DomainSet::rob2();
    let cases = [
        ("fixture", fixture_items()),
        ("generated_200", generated_items(200, &domains)),
    ];
    for (name, items) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), items, |b, items| {
            b.iter(|| {
                let rendered = render_svg(black_box(items), &domains, &config, &FallbackMetrics);
                black_box(rendered.svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    group.sample_size(20);
    let config = Config::default();
    let domains = DomainSet::rob2();
    let items = generated_items(50, &domains);
    let mut modes = vec![OutputMode::Svg];
    if cfg!(feature = "png") {
        modes.push(OutputMode::Png);
    }
    if cfg!(feature = "pdf") {
        modes.extend([OutputMode::MatrixPdf, OutputMode::SummaryPdf]);
    }
    for mode in modes {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{mode:?}")),
            &items,
            |b, items| {
                b.iter(|| {
                    let output =
                        export_with_measurer(black_box(items), &domains, &config, mode, &FallbackMetrics)
                            .expect("export failed");
                    black_box(output.bytes.len());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_records, bench_layout, bench_render, bench_end_to_end
);
criterion_main!(benches);
