use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paramline_engine::{
    CurveKind, ManualClock, NullSink, ParamId, ParameterSpec, Scheduler,
};

fn schedule_and_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline");

    group.bench_function("insert_near_now_256", |b| {
        b.iter(|| {
            let mut sched = Scheduler::new(NullSink, ManualClock::new(0.0));
            let gain = ParamId(1);
            sched
                .register_parameter(ParameterSpec::new(gain, "gain", 0.0))
                .unwrap();
            for step in 0..256u32 {
                let time = step as f64 * 0.01;
                sched
                    .schedule(gain, time, (step % 7) as f64 / 7.0, CurveKind::Linear, 0.01)
                    .unwrap();
            }
            black_box(sched.value_at(gain, 2.0).unwrap());
        });
    });

    group.bench_function("evaluate_mid_schedule", |b| {
        let mut sched = Scheduler::new(NullSink, ManualClock::new(0.0));
        let gain = ParamId(1);
        sched
            .register_parameter(ParameterSpec::new(gain, "gain", 0.0))
            .unwrap();
        for step in 0..64u32 {
            let time = step as f64 * 0.1;
            sched
                .schedule(gain, time, (step % 5) as f64 / 5.0, CurveKind::Linear, 0.1)
                .unwrap();
        }
        b.iter(|| {
            for query in 0..64u32 {
                black_box(sched.value_at(gain, query as f64 * 0.11).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, schedule_and_query);
criterion_main!(benches);
