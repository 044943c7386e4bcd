use clap::Parser;

use h2_mutexes::config::{Config, QueueOrder};
use h2_mutexes::h2::compute_mutex_pairs;
use h2_mutexes::task::{Effect, GroundedTask, Operator};
use h2_mutexes::types::Atom;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of balls.
    #[arg(value_name = "INT", default_value = "4")]
    balls: usize,

    /// Consider positive literals only.
    #[clap(long)]
    only_positive: bool,

    /// Process the worklist in LIFO order.
    #[clap(long)]
    lifo: bool,

    /// Time limit (in seconds).
    #[clap(long, value_name = "SECONDS")]
    time_limit: Option<f64>,

    /// Print every mutex pair, not only the atom mutexes.
    #[clap(long)]
    all: bool,
}

/// Grounded Gripper: one robot with two grippers moving balls between two rooms.
fn gripper(balls: usize) -> GroundedTask {
    let rooms = ["rooma", "roomb"];
    let grippers = ["left", "right"];
    let balls: Vec<String> = (1..=balls).map(|i| format!("ball{}", i)).collect();

    let at_robby = |r: &str| Atom::new("at-robby", [r]);
    let at = |b: &str, r: &str| Atom::new("at", [b, r]);
    let free = |g: &str| Atom::new("free", [g]);
    let carry = |b: &str, g: &str| Atom::new("carry", [b, g]);

    let mut atoms = Vec::new();
    for r in rooms {
        atoms.push(at_robby(r));
        for b in &balls {
            atoms.push(at(b, r));
        }
    }
    for g in grippers {
        atoms.push(free(g));
        for b in &balls {
            atoms.push(carry(b, g));
        }
    }

    let mut init = vec![at_robby("rooma")];
    init.extend(balls.iter().map(|b| at(b, "rooma")));
    init.extend(grippers.iter().map(|&g| free(g)));

    let mut task = GroundedTask::new(atoms, init);
    for from in rooms {
        for &to in rooms.iter().filter(|&&to| to != from) {
            task = task.with_operator(
                Operator::new(format!("move({}, {})", from, to), vec![at_robby(from).pos()])
                    .with_add(Effect::unconditional(at_robby(to)))
                    .with_del(Effect::unconditional(at_robby(from))),
            );
        }
    }
    for b in &balls {
        for r in rooms {
            for g in grippers {
                task = task
                    .with_operator(
                        Operator::new(
                            format!("pick({}, {}, {})", b, r, g),
                            vec![at(b, r).pos(), at_robby(r).pos(), free(g).pos()],
                        )
                        .with_add(Effect::unconditional(carry(b, g)))
                        .with_del(Effect::unconditional(at(b, r)))
                        .with_del(Effect::unconditional(free(g))),
                    )
                    .with_operator(
                        Operator::new(
                            format!("drop({}, {}, {})", b, r, g),
                            vec![carry(b, g).pos(), at_robby(r).pos()],
                        )
                        .with_add(Effect::unconditional(at(b, r)))
                        .with_add(Effect::unconditional(free(g)))
                        .with_del(Effect::unconditional(carry(b, g))),
                    );
            }
        }
    }
    task
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let task = gripper(args.balls);
    println!(
        "Gripper with {} balls: {} atoms, {} operators",
        args.balls,
        task.atoms.len(),
        task.operators.len()
    );

    let mut config = Config::default().with_only_positive_literals(args.only_positive);
    if args.lifo {
        config = config.with_queue_order(QueueOrder::Lifo);
    }
    if let Some(seconds) = args.time_limit {
        config = config.with_time_limit(std::time::Duration::try_from_secs_f64(seconds)?);
    }

    let report = compute_mutex_pairs(&task, &config)?;
    println!("{}", report.stats);

    if args.all {
        for pair in &report.mutexes {
            println!("mutex {}", pair);
        }
    } else {
        for (a, b) in report.mutexes.atom_mutexes() {
            println!("mutex {} / {}", a, b);
        }
    }
    for lit in report.mutexes.dead_literals() {
        println!("dead {}", lit);
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
