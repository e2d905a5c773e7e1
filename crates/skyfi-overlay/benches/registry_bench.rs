//! Benchmarks for overlay registration churn and host reconciliation.
//!
//! Run with: cargo bench -p skyfi-overlay --bench registry_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use skyfi_overlay::{
    Frame, ModalHost, ModalId, ModalRegistry, ModalRequest, OverlayConfig, Rect, View,
};
use std::cell::RefCell;
use std::hint::black_box;
use std::rc::Rc;
use std::time::Duration;

struct Blank;

impl View for Blank {
    fn render(&self, area: Rect, frame: &mut Frame) {
        frame.node(area, "blank");
    }
}

const SCREEN: Rect = Rect::new(0.0, 0.0, 390.0, 844.0);

fn bench_open_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/open_close");

    for depth in [1usize, 8, 32] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("mounted", depth), &depth, |b, &depth| {
            let registry = ModalRegistry::new();
            let host = ModalHost::mount(&registry, OverlayConfig::default());
            b.iter(|| {
                let slots: Vec<_> = (0..depth)
                    .map(|_| {
                        let slot = Rc::new(RefCell::new(None));
                        let s = Rc::clone(&slot);
                        registry.open(ModalRequest::<()>::factory(move |controls| {
                            *s.borrow_mut() = Some(controls);
                            Blank
                        }));
                        slot
                    })
                    .collect();
                for slot in slots.into_iter().rev() {
                    if let Some(controls) = slot.borrow_mut().take() {
                        controls.close();
                    }
                }
                host.tick(Duration::from_secs(1));
                black_box(registry.len())
            });
        });
    }

    group.finish();
}

fn bench_duplicate_open(c: &mut Criterion) {
    let registry = ModalRegistry::new();
    let _host = ModalHost::mount(&registry, OverlayConfig::default());
    registry.open(ModalRequest::<()>::view(Blank).id("kyc"));
    let id = ModalId::from("kyc");

    c.bench_function("registry/duplicate_open", |b| {
        b.iter(|| black_box(registry.open(ModalRequest::<()>::view(Blank).id(id.clone()))))
    });
}

fn bench_render_stack(c: &mut Criterion) {
    let mut group = c.benchmark_group("host/render");

    for depth in [1usize, 8, 32] {
        let registry = ModalRegistry::new();
        let host = ModalHost::mount(&registry, OverlayConfig::default());
        for _ in 0..depth {
            registry.open(ModalRequest::<()>::view(Blank));
        }
        host.tick(Duration::from_secs(1));

        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("frame", depth), &(), |b, _| {
            let mut frame = Frame::new();
            b.iter(|| {
                frame.clear();
                host.render(SCREEN, &mut frame);
                black_box(frame.commands().len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_open_close,
    bench_duplicate_open,
    bench_render_stack
);
criterion_main!(benches);
