//! Spawns the built binary and drives it over stdin/stdout the way a GUI
//! would, checking the protocol handshake and that `go` eventually returns
//! a legal `bestmove`.

use std::io::Write;
use std::process::{Command, Stdio};

use corvid::movegen::{generate_legal_moves, GenMode};
use corvid::position::Position;

#[test]
fn handshake_and_bestmove_after_movetime_search() {
    let exe = env!("CARGO_BIN_EXE_corvid");
    let mut child = Command::new(exe).stdin(Stdio::piped()).stdout(Stdio::piped()).spawn().expect("failed to spawn engine binary");

    let input = b"uci\nisready\nucinewgame\nposition startpos moves e2e4\ngo movetime 100\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("uciok"));
    assert!(stdout.contains("readyok"));
    assert!(stdout.lines().any(|l| l.starts_with("option name Hash")));

    let bestmove_line = stdout.lines().filter(|l| l.starts_with("bestmove")).last().expect("no bestmove line emitted");
    let mv = bestmove_line.split_whitespace().nth(1).expect("bestmove line missing a move");
    assert_ne!(mv, "0000", "engine returned a null move");

    let mut pos = Position::startpos();
    pos.make_move(corvid::movegen::move_from_uci(&pos, "e2e4").unwrap());
    let legal = generate_legal_moves(&pos, GenMode::All);
    assert!(legal.iter().any(|m| m.to_string() == mv), "bestmove {mv} is not legal in the resulting position");
}

#[test]
fn stop_without_a_running_search_does_not_crash_the_engine() {
    let exe = env!("CARGO_BIN_EXE_corvid");
    let mut child = Command::new(exe).stdin(Stdio::piped()).stdout(Stdio::piped()).spawn().expect("failed to spawn engine binary");

    let input = b"uci\nstop\nisready\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let status = child.wait().expect("engine process did not exit");
    assert!(status.success());
}

#[test]
fn setoption_hash_is_accepted_before_any_search() {
    let exe = env!("CARGO_BIN_EXE_corvid");
    let mut child = Command::new(exe).stdin(Stdio::piped()).stdout(Stdio::piped()).spawn().expect("failed to spawn engine binary");

    let input = b"uci\nsetoption name Hash value 32\nisready\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("readyok"));
}
