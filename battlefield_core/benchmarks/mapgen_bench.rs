use battlefield_core::{
    Alignment, BattlefieldGenerator, BattlefieldPresets, BattlefieldSize, PlayerId,
    PlayerProfile, Race,
};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn roster() -> Vec<PlayerProfile> {
    [
        (1, "Aldric", Race::Human, Alignment::Lawful),
        (2, "Morwen", Race::Undead, Alignment::Chaotic),
        (3, "Thrain", Race::Dwarf, Alignment::Neutral),
    ]
    .into_iter()
    .map(|(id, name, race, alignment)| PlayerProfile {
        id: PlayerId(id),
        name: name.to_string(),
        race,
        alignment,
        color: String::new(),
    })
    .collect()
}

fn bench_generation(c: &mut Criterion) {
    let presets = BattlefieldPresets::builtin();
    let mut group = c.benchmark_group("mapgen");

    for size in BattlefieldSize::ALL {
        let Ok(generator) = BattlefieldGenerator::from_preset(&presets, size) else {
            continue;
        };
        let generator = generator.with_players(roster());
        group.bench_with_input(BenchmarkId::new("seeded", size), &generator, |b, generator| {
            let mut seed = 0u64;
            b.iter_batched(
                || {
                    seed += 1;
                    seed
                },
                |seed| generator.generate_seeded(seed),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(mapgen_benches, bench_generation);
criterion_main!(mapgen_benches);
