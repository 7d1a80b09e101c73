//! Registry lookup and GETBULK throughput.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use snmp_agent_core::handler::{GetNextResult, GetResult, ManagedObject, RequestContext};
use snmp_agent_core::{Agent, Oid, Pdu, Query, Registry, Scope, Value, VarBind, Version, oid};

/// One column of `rows` integer cells.
struct Column {
    prefix: Oid,
    rows: u32,
}

impl ManagedObject for Column {
    fn scope(&self) -> Scope {
        Scope::subtree(self.prefix.clone())
    }

    fn get(&self, _ctx: &RequestContext, oid: &Oid) -> GetResult {
        match oid.arcs().split_at_checked(self.prefix.len()) {
            Some((head, [row])) if head == self.prefix.arcs() && (1..=self.rows).contains(row) => {
                GetResult::Value(Value::Integer(*row as i32))
            }
            _ => GetResult::NoSuchInstance,
        }
    }

    fn next(&self, _ctx: &RequestContext, query: &Query) -> GetNextResult {
        let scope = query.scope().scope();
        (1..=self.rows)
            .map(|row| self.prefix.child(row))
            .find(|oid| scope.contains(oid))
            .map(|oid| {
                let row = oid.arcs()[oid.len() - 1];
                VarBind::new(oid, Value::Integer(row as i32))
            })
            .into()
    }
}

fn registry_with(objects: u32, rows: u32) -> Arc<Registry> {
    let registry = Arc::new(Registry::new());
    for i in 0..objects {
        let column = Column {
            prefix: oid!(1, 3, 6, 1, 4, 1, 99, i),
            rows,
        };
        registry
            .register(Arc::new(column), None)
            .expect("disjoint prefixes");
    }
    registry
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_lookup");
    for objects in [10u32, 100, 1000] {
        let registry = registry_with(objects, 1);
        let probe = oid!(1, 3, 6, 1, 4, 1, 99, objects / 2, 1);
        group.bench_with_input(BenchmarkId::new("exact", objects), &probe, |b, probe| {
            b.iter(|| registry.lookup(&Query::exact(None, black_box(probe.clone()))))
        });
        group.bench_with_input(BenchmarkId::new("after", objects), &probe, |b, probe| {
            b.iter(|| registry.lookup(&Query::after(None, black_box(probe.clone()))))
        });
    }
    group.finish();
}

fn bench_get_bulk(c: &mut Criterion) {
    let agent = Agent::builder().registry(registry_with(4, 250)).build();
    let ctx = RequestContext::new(Version::V2c).with_security_name("public");
    let start = [oid!(1, 3, 6, 1, 4, 1, 99)];

    c.bench_function("get_bulk_100", |b| {
        let mut id = 0;
        b.iter(|| {
            id += 1;
            let pdu = Pdu::get_bulk(id, 0, 100, &start);
            black_box(agent.process(ctx.clone(), pdu))
        })
    });
}

criterion_group!(benches, bench_lookup, bench_get_bulk);
criterion_main!(benches);
