use bandit::{Bandit, Bernoulli, BetaPrior, Mdp, ThompsonConfig};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_strategies(c: &mut Criterion) {
    let mdp = Mdp::single_state(&[0.3, 0.5, 0.7], 0.999).unwrap();
    let bandit = Bandit::new(&mdp, Bernoulli);
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("epsilon_greedy_200", |b| {
        b.iter(|| bandit.epsilon_greedy(200, &mut rng))
    });
    c.bench_function("ucb_200", |b| b.iter(|| bandit.ucb(200, &mut rng)));
    c.bench_function("thompson_200", |b| {
        b.iter(|| {
            let mut prior = BetaPrior::uniform(3);
            bandit
                .thompson_sampling(&mut prior, 200, &ThompsonConfig::default(), &mut rng)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
