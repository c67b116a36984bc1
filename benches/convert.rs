//! Conversion benchmarks
//!
//! Run with: cargo bench --bench convert
//! Profile with: cargo flamegraph --bench convert -- --bench

#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flow2ts::{convert, ConversionOptions, Parser};

/// A typical typed component module
const COMPONENT: &str = r#"// @flow
import type { Node } from 'react';

export type Props = {|
  +title: string,
  items: Array<?string>,
  onSelect?: (index: number) => void,
|};

opaque type Key: string = string;

type State = { selected: ?number, ... };

function keyFor(index: number): Key {
  return (String(index): Key);
}

export default class Picker {
  +props: Props;
  state: State = { selected: null };

  select(index: ?number): void {
    this.state = { ...this.state, selected: index };
  }
}
"#;

/// Utility-type heavy declarations
const UTILITIES: &str = r#"// @flow
type Config = { host: string, port: number, secure: boolean };
type ConfigKey = $Keys<Config>;
type ConfigValue = $Values<Config>;
type PartialConfig = $Shape<Config>;
type WithoutPort = $Diff<Config, { port: number }>;
type Frozen = $ReadOnly<Config>;
type Host = $PropertyType<Config, 'host'>;
declare function get<T>(key: $Keys<Config>): T;
"#;

/// Plain JavaScript with no type syntax at all
const UNTYPED: &str = r#"
function fib(n) {
  if (n < 2) return n;
  return fib(n - 1) + fib(n - 2);
}

const memo = new Map();
for (let i = 0; i < 30; i++) {
  memo.set(i, fib(i));
}
console.log(memo.get(29));
"#;

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let options = ConversionOptions::default();
    let inlined = ConversionOptions {
        inline_utility_types: true,
        ..ConversionOptions::default()
    };

    for (name, source) in [
        ("component", COMPONENT),
        ("utilities", UTILITIES),
        ("untyped", UNTYPED),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| convert(black_box(source), &options).unwrap());
        });
    }

    group.throughput(Throughput::Bytes(UTILITIES.len() as u64));
    group.bench_function("utilities_inlined", |b| {
        b.iter(|| convert(black_box(UTILITIES), &inlined).unwrap());
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (name, source) in [("component", COMPONENT), ("untyped", UNTYPED)] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                Parser::new(black_box(source)).parse_program().unwrap()
            });
        });
    }

    group.finish();
}

fn bench_large_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_large");
    // Many copies of the component exercise edit accumulation and splicing
    let large: String = (0..50)
        .map(|i| COMPONENT.replace("Picker", &format!("Picker{}", i)))
        .collect::<Vec<_>>()
        .join("\n");

    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("50_components", |b| {
        let options = ConversionOptions::default();
        b.iter(|| convert(black_box(&large), &options).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_convert, bench_parse, bench_large_input);
criterion_main!(benches);
