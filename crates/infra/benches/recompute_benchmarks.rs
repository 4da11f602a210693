use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use rackview_core::{CellId, FeedKind, WarehouseId, ZoneId};
use rackview_feed::{BindingTable, PartitionKey, RawInventoryRow, RowId, SourceBinding, SourceId};
use rackview_infra::{InMemoryAggregateStore, InMemoryInputs, Reconciler};
use rackview_layout::{Layout, LayoutCell, LayoutParts, Warehouse, Zone};
use rackview_reconcile::Aggregator;
use std::sync::Arc;

const RACKS_PER_ZONE: usize = 50;
const ZONES: usize = 8;

/// One warehouse, `ZONES` zones of `RACKS_PER_ZONE` 4×5 racks each.
fn site() -> (LayoutParts, Vec<SourceBinding>) {
    let warehouse = WarehouseId::new();
    let mut zones = Vec::with_capacity(ZONES);
    let mut cells = Vec::with_capacity(ZONES * RACKS_PER_ZONE);

    for z in 0..ZONES {
        let zone = ZoneId::new();
        zones.push(Zone::new(zone, warehouse, format!("EA{z}-A")));
        for r in 0..RACKS_PER_ZONE {
            cells.push(LayoutCell::multi_cell(CellId::new(), zone, format!("R{r}"), 4, 5));
        }
    }

    let layout = LayoutParts {
        warehouses: vec![Warehouse::new(warehouse, "W1").with_feed(FeedKind::Wms)],
        zones,
        cells,
    };
    let bindings = vec![SourceBinding::new(FeedKind::Wms, "S1", "P1", warehouse, "")];
    (layout, bindings)
}

fn rows(count: usize) -> Vec<RawInventoryRow> {
    (0..count)
        .map(|i| {
            RawInventoryRow::new(
                RowId(i as u64),
                SourceId::new("S1"),
                PartitionKey::new("P1"),
                format!("ea{}a", i % ZONES),
                format!("R{}-{:02}-{:02}", i % RACKS_PER_ZONE, i % 4 + 1, i % 5 + 1),
            )
            .with_item(format!("M{}", i % 97))
            .with_available_qty((i % 13) as f64)
        })
        .collect()
}

fn bench_aggregator_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator_run");
    let (parts, bindings) = site();
    let layout = Layout::new(parts).unwrap();
    let table = BindingTable::build(bindings, layout.warehouses());

    for row_count in [1_000usize, 10_000, 100_000].iter() {
        let input = rows(*row_count);
        group.throughput(Throughput::Elements(*row_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(row_count), &input, |b, input| {
            let aggregator = Aggregator::new(&layout, &table);
            b.iter(|| black_box(aggregator.run(black_box(input), Utc::now())));
        });
    }

    group.finish();
}

fn bench_recompute_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_all");
    group.sample_size(20);

    let (parts, bindings) = site();
    let inputs = Arc::new(InMemoryInputs::new(parts, bindings, rows(10_000)));
    let reconciler = Reconciler::from_inputs(inputs, InMemoryAggregateStore::new());

    group.bench_function("10k_rows_in_memory", |b| {
        b.iter(|| black_box(reconciler.recompute_all().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_aggregator_run, bench_recompute_all);
criterion_main!(benches);
