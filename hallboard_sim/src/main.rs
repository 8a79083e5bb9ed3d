use clap::{Parser, ValueEnum};

use hallboard_core::board::Square;
use hallboard_core::sensors::{validate_start_positions, SimulatedSensors};
use hallboard_core::tracker::Tracker;

/// Console simulator for the sensor-board firmware core.
///
/// Replays a scripted sequence of physical pickups and placements against a
/// simulated sensor matrix, polling the tracker after every bit flip and
/// rendering the board whenever the sweep saw a transition. Useful for
/// eyeballing move interpretation and illegal-state recovery without a board
/// wired up.
#[derive(Parser, Debug)]
struct Args {
    /// Scripted scenario to replay.
    #[arg(value_enum, default_value_t = Scenario::Legal)]
    scenario: Scenario,

    /// Log every tracker decision, not just the headlines.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Scenario {
    /// Ordinary opening moves ending in an exchange of captures.
    Legal,
    /// An overreaching pawn walked back into place, then a real move.
    IllegalRecovery,
    /// White castles kingside, dropping the rook short on the way.
    Castling,
    /// A white pawn runs up the a-file, captures through, and promotes.
    Promotion,
}

/// One scripted physical action. Lifts and drops are single sensor flips; a
/// `Move` is a lift and a drop with a poll in between, the way the hardware
/// sweep catches a hand mid-move.
enum Step {
    Lift(u8, u8),
    Drop(u8, u8),
    Move((u8, u8), (u8, u8)),
}

use Step::{Drop, Lift, Move};

fn script(scenario: Scenario) -> Vec<Step> {
    match scenario {
        Scenario::Legal => vec![
            Move((1, 0), (2, 0)), // a3
            Move((6, 3), (5, 3)), // d6
            Move((1, 2), (2, 2)), // c3
            Move((7, 2), (4, 5)), // black bishop to f5
            Move((1, 7), (2, 7)), // h3
            // bishop takes the h-pawn: victim off, killer off, killer down
            Lift(2, 7),
            Lift(4, 5),
            Drop(2, 7),
            // knight takes the bishop right back
            Lift(2, 7),
            Lift(0, 6),
            Drop(2, 7),
        ],
        Scenario::IllegalRecovery => vec![
            Move((1, 0), (4, 0)), // a2 to a5: far too far
            Move((4, 0), (1, 0)), // walked back
            Move((1, 0), (3, 0)), // a4, a legal try this time
            Move((6, 1), (4, 1)), // black b5
            // a4 takes b5
            Lift(4, 1),
            Lift(3, 0),
            Drop(4, 1),
        ],
        Scenario::Castling => vec![
            Move((0, 6), (2, 5)), // knight out
            Move((6, 0), (5, 0)),
            Move((1, 4), (2, 4)), // free the bishop
            Move((6, 1), (5, 1)),
            Move((0, 5), (1, 4)), // bishop out
            Move((6, 2), (5, 2)),
            // rook and king up; king lands on g1, the rook is set down short
            Lift(0, 7),
            Lift(0, 4),
            Drop(0, 6),
            Drop(0, 4),
            // sliding the rook onto f1 finishes the castle
            Move((0, 4), (0, 5)),
        ],
        Scenario::Promotion => vec![
            Move((1, 0), (3, 0)), // a4
            Move((6, 7), (5, 7)), // black h6
            Move((3, 0), (4, 0)), // a5
            Move((5, 7), (4, 7)), // h5
            Move((4, 0), (5, 0)), // a6
            Move((4, 7), (3, 7)), // h4
            // a6 takes b7
            Lift(6, 1),
            Lift(5, 0),
            Drop(6, 1),
            Move((7, 1), (5, 2)), // black knight steps aside
            Move((6, 1), (7, 1)), // the pawn arrives on b8
            // exchange it for the promoted piece
            Lift(7, 1),
            Drop(7, 1),
        ],
    }
}

fn at(row: u8, col: u8) -> Square {
    Square::new(row, col).expect("script coordinates are on the board")
}

fn poll_and_render(tracker: &mut Tracker, sensors: &mut SimulatedSensors) {
    if tracker.poll(sensors) {
        println!("{}", tracker.board());
        println!("   {} to move", tracker.turn());
        for entry in tracker.illegal() {
            println!("   fix: {entry}");
        }
        println!();
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .unwrap();

    let mut sensors = SimulatedSensors::starting_position();
    if let Err(e) = validate_start_positions(&mut sensors) {
        eprintln!("sensor matrix rejected: {e}");
        std::process::exit(1);
    }

    let mut tracker = Tracker::new();
    println!("{}", tracker.board());
    println!();

    for step in script(args.scenario) {
        match step {
            Lift(row, col) => sensors.set(at(row, col), false),
            Drop(row, col) => sensors.set(at(row, col), true),
            Move(from, to) => {
                sensors.set(at(from.0, from.1), false);
                poll_and_render(&mut tracker, &mut sensors);
                sensors.set(at(to.0, to.1), true);
            }
        }
        poll_and_render(&mut tracker, &mut sensors);
    }
}
