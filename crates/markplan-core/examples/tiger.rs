//! The tiger problem: expand a belief set from the uniform prior, run
//! Perseus, and print the resulting alpha-vectors.

use markplan_core::{expand_random, ExpandConfig, Perseus};
use markplan_model::{BeliefSet, ModelError, PomdpBuilder, SparsePomdp};

const ACTION_NAMES: [&str; 3] = ["listen", "open-left", "open-right"];

fn tiger() -> Result<SparsePomdp, ModelError> {
    let mut builder = PomdpBuilder::new(2, 3, 2);
    builder.discount(0.95).horizon(200).epsilon(1e-4);

    // Listening leaves the tiger in place; opening a door resets the game.
    builder.transition(0, 0, 0, 1.0)?.transition(1, 0, 1, 1.0)?;
    for action in 1..3 {
        for state in 0..2 {
            builder
                .transition(state, action, 0, 0.5)?
                .transition(state, action, 1, 0.5)?;
        }
    }

    // Listening hears the tiger correctly 85% of the time.
    builder
        .observation(0, 0, 0, 0.85)?
        .observation(0, 0, 1, 0.15)?
        .observation(0, 1, 0, 0.15)?
        .observation(0, 1, 1, 0.85)?;
    for action in 1..3 {
        for state in 0..2 {
            builder
                .observation(action, state, 0, 0.5)?
                .observation(action, state, 1, 0.5)?;
        }
    }

    builder
        .reward(0, 0, -1.0)?
        .reward(1, 0, -1.0)?
        .reward(0, 1, -100.0)?
        .reward(1, 1, 10.0)?
        .reward(0, 2, 10.0)?
        .reward(1, 2, -100.0)?;

    builder.belief(&[(0, 0.5), (1, 0.5)])?;
    builder.build()
}

fn main() {
    let pomdp = tiger().expect("tiger model should build");

    let config = ExpandConfig {
        num_beliefs: 64,
        seed: 42,
    };
    let expanded = expand_random(&pomdp, &config).expect("expansion should succeed");
    println!(
        "expanded {} beliefs, widest support {}",
        expanded.len(),
        expanded.max_support()
    );

    let beliefs = BeliefSet::from_dense(expanded.num_states(), expanded.data(), expanded.len())
        .expect("belief conversion should succeed");
    let pomdp = pomdp
        .replace_beliefs(beliefs)
        .expect("belief replacement should succeed");

    let initial = vec![0.0; pomdp.beliefs().len() * pomdp.dynamics().num_states()];
    let policy = Perseus::solve(&pomdp, &initial, 7).expect("Perseus should solve");

    println!("{} alpha-vectors:", policy.len());
    for i in 0..policy.len() {
        let alpha = policy.alpha(i).expect("vector");
        let action = policy.action(i).expect("action");
        println!(
            "  [{:8.3}, {:8.3}]  {}",
            alpha[0], alpha[1], ACTION_NAMES[action]
        );
    }

    println!("\nvalue across the simplex:");
    for i in 0..=10 {
        let p = i as f64 / 10.0;
        let (value, action) = policy
            .value_and_action(&[1.0 - p, p])
            .expect("value at belief");
        println!(
            "  b(tiger-right) = {:4.2}: V = {:8.3}, act = {}",
            p, value, ACTION_NAMES[action]
        );
    }
}
