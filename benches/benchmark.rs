use cidr_tree::*;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::prelude::*;

const ITERS: usize = 10_000;
const NUM_SPARSE_ADDR: usize = 20;

fn random_prefix(rng: &mut ThreadRng) -> Ipv4Prefix {
    let len = rng.gen_range(8..=24);
    Ipv4Prefix::from_repr_len(rng.gen::<u32>(), len)
}

fn random_prefixes(n: usize) -> Vec<Ipv4Prefix> {
    let mut rng = thread_rng();
    (0..n).map(|_| random_prefix(&mut rng)).collect()
}

fn random_hosts(n: usize) -> Vec<Ipv4Prefix> {
    let mut rng = thread_rng();
    (0..n)
        .map(|_| Ipv4Prefix::host(Ipv4Address::new(rng.gen())))
        .collect()
}

fn build(prefixes: &[Ipv4Prefix]) -> PrefixTree<Ipv4Prefix> {
    let mut tree = PrefixTree::default();
    for p in prefixes {
        let _ = tree.insert(*p);
    }
    tree
}

pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    let random = random_prefixes(ITERS);
    let mut parents_first = random.clone();
    parents_first.sort_by_key(|p| p.prefix_len());
    let mut children_first = parents_first.clone();
    children_first.reverse();

    group.bench_function("random order", |b| b.iter(|| build(&random)));
    group.bench_function("parents first", |b| b.iter(|| build(&parents_first)));
    group.bench_function("children first", |b| b.iter(|| build(&children_first)));

    group.finish();
}

pub fn lookup(c: &mut Criterion) {
    let prefixes = random_prefixes(ITERS);
    let tree = build(&prefixes);
    let hosts = random_hosts(ITERS);

    let mut group = c.benchmark_group("lookup");

    group.bench_function("find", |b| {
        b.iter(|| prefixes.iter().filter(|p| tree.find(p).is_some()).count())
    });
    group.bench_function("find_loose", |b| {
        b.iter(|| {
            hosts
                .iter()
                .filter_map(|p| tree.find_loose(p))
                .map(|n| n.prefix().prefix_len() as usize)
                .sum::<usize>()
        })
    });

    group.finish();
}

pub fn renumber(c: &mut Criterion) {
    let tree = build(&random_prefixes(ITERS));
    let Some(old) = tree
        .dfi()
        .map(|(n, _)| *n.prefix())
        .find(|p| p.prefix_len() == 16)
    else {
        return;
    };
    let Some(new) = (0..=u16::MAX)
        .map(|i| Ipv4Prefix::from_repr_len(u32::from(i) << 16, 16))
        .find(|p| tree.find_loose(p).map_or(false, |n| n.prefix().prefix_len() < 16))
    else {
        return;
    };

    c.bench_function("renumber", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut t| t.renumber(&old, &new).is_ok(),
            BatchSize::SmallInput,
        )
    });
}

pub fn parse(c: &mut Criterion) {
    let mut rng = thread_rng();
    let sparse: Vec<String> = random_prefixes(NUM_SPARSE_ADDR)
        .iter()
        .map(|p| p.to_string())
        .collect();
    let inputs: Vec<&str> = (0..ITERS)
        .filter_map(|_| sparse.choose(&mut rng))
        .map(|s| s.as_str())
        .collect();

    let mut group = c.benchmark_group("parse");

    group.bench_function("FromStr", |b| {
        b.iter(|| {
            inputs
                .iter()
                .filter(|s| s.parse::<Ipv4Prefix>().is_ok())
                .count()
        })
    });
    group.bench_function("Parser", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            inputs
                .iter()
                .filter(|s| parser.parse_prefix(s).is_ok())
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, insert, lookup, renumber, parse);
criterion_main!(benches);
