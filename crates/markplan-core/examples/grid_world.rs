//! The 4x3 grid world, solved twice: once as a discounted MDP with value
//! iteration, once as a shortest-path problem with LAO*.

use markplan_core::{LaoStar, ValueIteration};
use markplan_model::{MdpBuilder, ModelError, SparseMdp};

const WIDTH: usize = 4;
const HEIGHT: usize = 3;
const STEP_REWARD: f64 = -0.04;

/// Moves as (dx, dy): left, up, right, down.
const MOVES: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
const ARROWS: [char; 4] = ['<', '^', '>', 'v'];

fn index(x: usize, y: usize) -> usize {
    y * WIDTH + x
}

fn blocked(x: i32, y: i32) -> bool {
    x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 || (x == 1 && y == 1)
}

/// Where a move attempt from (x, y) actually lands.
fn destination(x: usize, y: usize, direction: usize) -> usize {
    let (dx, dy) = MOVES[direction];
    let nx = x as i32 + dx;
    let ny = y as i32 + dy;
    if blocked(nx, ny) {
        index(x, y)
    } else {
        index(nx as usize, ny as usize)
    }
}

/// The stochastic outcome spread of an intended move: 0.8 straight, 0.1 to
/// each side.
fn outcomes(x: usize, y: usize, action: usize) -> Vec<(usize, f64)> {
    let spread = [
        (action, 0.8),
        ((action + 1) % 4, 0.1),
        ((action + 3) % 4, 0.1),
    ];
    let mut merged: Vec<(usize, f64)> = Vec::new();
    for (direction, prob) in spread {
        let dest = destination(x, y, direction);
        match merged.iter_mut().find(|(s, _)| *s == dest) {
            Some((_, p)) => *p += prob,
            None => merged.push((dest, prob)),
        }
    }
    merged
}

/// Discounted-reward version: +1 at the top-right corner, -1 below it,
/// a small step cost everywhere else.
fn reward_mdp() -> Result<SparseMdp, ModelError> {
    let goal = index(3, 2);
    let pit = index(3, 1);
    let bonus = |state: usize| -> f64 {
        if state == goal {
            1.0
        } else if state == pit {
            -1.0
        } else {
            0.0
        }
    };

    let mut builder = MdpBuilder::new(WIDTH * HEIGHT, 4);
    builder.discount(0.95).horizon(10_000).epsilon(1e-6);

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let state = index(x, y);
            for action in 0..4 {
                if state == goal || state == pit || (x == 1 && y == 1) {
                    builder.transition(state, action, state, 1.0)?;
                    continue;
                }
                let mut expected = STEP_REWARD;
                for (dest, prob) in outcomes(x, y, action) {
                    builder.transition(state, action, dest, prob)?;
                    expected += prob * bonus(dest);
                }
                builder.reward(state, action, expected)?;
            }
        }
    }

    builder.build()
}

/// Shortest-path version: unit cost per move, the top-right corner absorbs
/// at zero cost, no pit.
fn shortest_path_mdp() -> Result<SparseMdp, ModelError> {
    let goal = index(3, 2);

    let mut builder = MdpBuilder::new(WIDTH * HEIGHT, 4);
    builder.discount(1.0).horizon(10_000).epsilon(1e-6);

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let state = index(x, y);
            for action in 0..4 {
                if state == goal || (x == 1 && y == 1) {
                    builder.transition(state, action, state, 1.0)?;
                    continue;
                }
                for (dest, prob) in outcomes(x, y, action) {
                    builder.transition(state, action, dest, prob)?;
                }
                builder.reward(state, action, 1.0)?;
            }
        }
    }

    builder.build()
}

fn print_grid(label: &str, cell: impl Fn(usize, usize) -> String) {
    println!("{label}:");
    for y in (0..HEIGHT).rev() {
        let row: Vec<String> = (0..WIDTH).map(|x| cell(x, y)).collect();
        println!("  {}", row.join(" "));
    }
    println!();
}

fn main() {
    let mdp = reward_mdp().expect("grid MDP should build");
    let policy =
        ValueIteration::solve(&mdp, &vec![0.0; mdp.num_states()]).expect("VI should solve");

    print_grid("Value iteration policy", |x, y| {
        if x == 1 && y == 1 {
            "#".to_string()
        } else if index(x, y) == index(3, 2) || index(x, y) == index(3, 1) {
            "T".to_string()
        } else {
            let action = policy.action(index(x, y)).expect("action");
            ARROWS[action].to_string()
        }
    });
    print_grid("Value iteration values", |x, y| {
        format!("{:6.2}", policy.value(index(x, y)).expect("value"))
    });

    let ssp = shortest_path_mdp().expect("grid SSP should build");
    let heuristic = vec![0.0; ssp.num_states()];
    let costs = LaoStar::solve(&ssp, &heuristic).expect("LAO* should solve");

    print_grid("Expected steps to the goal", |x, y| {
        if x == 1 && y == 1 {
            "     #".to_string()
        } else {
            format!("{:6.2}", costs.value(index(x, y)).expect("value"))
        }
    });
}
