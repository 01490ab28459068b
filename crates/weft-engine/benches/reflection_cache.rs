use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weft_engine::{
    ClassDefinition, ClassLoader, MethodReflection, ObjectContainer, ObjectManager,
    ParameterReflection, PointcutFilter, PointcutMethodTaggedWithFilter, ReflectionClassFactory,
    ReflectionSource,
};

#[derive(Default)]
struct Clock;

struct Scheduler {
    _clock: Arc<Clock>,
}

fn loader(classes: usize) -> ClassLoader {
    let loader = ClassLoader::new();
    loader.register(ClassDefinition::<Clock>::new("Acme\\Clock").default_constructor());
    loader.register(ClassDefinition::<Scheduler>::new("Acme\\Scheduler").constructor(
        vec![ParameterReflection::object("clock", "Acme\\Clock")],
        |args| {
            Ok(Scheduler {
                _clock: args.object::<Clock>(0)?,
            })
        },
    ));
    for i in 0..classes {
        let mut definition = ClassDefinition::<Clock>::new(&format!("Acme\\Generated{}", i));
        for m in 0..10 {
            definition = definition.declare_method(
                MethodReflection::new(format!("method{}", m)).tagged(format!("tag{}", m)),
            );
        }
        loader.register(definition);
    }
    loader
}

fn bench_reflect(c: &mut Criterion) {
    let mut group = c.benchmark_group("reflect");

    for classes in [10, 1000] {
        let loader = Arc::new(loader(classes));
        let factory = ReflectionClassFactory::new(Arc::clone(&loader) as Arc<dyn ReflectionSource>);
        factory.reflect("Acme\\Generated0").unwrap();

        group.bench_with_input(BenchmarkId::new("cached", classes), &factory, |b, factory| {
            b.iter(|| factory.reflect(black_box("Acme\\Generated0")).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("uncached", classes), &loader, |b, loader| {
            b.iter(|| loader.reflect_class(black_box("Acme\\Generated0")).unwrap());
        });
    }

    group.finish();
}

fn bench_get_object(c: &mut Criterion) {
    let reflections = Arc::new(ReflectionClassFactory::new(Arc::new(loader(0))));
    let container = ObjectContainer::new(reflections);
    let factory = &container as &dyn weft_engine::ObjectFactory;

    c.bench_function("get_singleton", |b| {
        b.iter(|| container.get_object(black_box("Acme\\Scheduler")).unwrap());
    });
    c.bench_function("create_with_autowiring", |b| {
        b.iter(|| factory.create(black_box("Acme\\Scheduler"), &[]).unwrap());
    });
}

fn bench_pointcut(c: &mut Criterion) {
    let factory = ReflectionClassFactory::new(Arc::new(loader(1)));
    let class = factory.reflect("Acme\\Generated0").unwrap();
    let filter = PointcutMethodTaggedWithFilter::new("tag[7-9]");

    c.bench_function("pointcut_tagged_with", |b| {
        b.iter(|| {
            class
                .get_methods()
                .iter()
                .filter(|method| filter.matches(&class, method, 1).unwrap())
                .count()
        });
    });
}

criterion_group!(benches, bench_reflect, bench_get_object, bench_pointcut);
criterion_main!(benches);
