//! Lexing of one line of UCI input into a `UciCommand`. No semantic
//! validation happens here -- a malformed `position fen` or an
//! out-of-range `depth` is still handed to the caller, which is in a
//! better position to report it against the engine's current state.

#[derive(Debug, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(GoParams),
    Stop,
    PonderHit,
    SetOption { name: String, value: Option<String> },
    Debug(bool),
    Quit,
    Unknown(String),
}

/// Raw fields off a `go` command line, before they are resolved against a
/// position (`searchmoves` is still UCI text here) or validated.
#[derive(Default, Debug, Clone)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub mate: Option<u32>,
    pub movetime: Option<u64>,
    pub infinite: bool,
    pub ponder: bool,
    pub search_moves: Vec<String>,
}

#[must_use]
pub fn parse_uci_command(line: &str) -> UciCommand {
    let trimmed = line.trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.is_empty() {
        return UciCommand::Unknown(String::new());
    }

    match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(parts.iter().map(|s| (*s).to_string()).collect()),
        "go" => UciCommand::Go(parse_go_params(&parts)),
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "setoption" => match parse_setoption(&parts) {
            Some((name, value)) => UciCommand::SetOption { name, value },
            None => UciCommand::Unknown(trimmed.to_string()),
        },
        "debug" => UciCommand::Debug(parts.get(1).is_some_and(|v| *v == "on")),
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    }
}

fn parse_next<T: std::str::FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i + 1).and_then(|v| v.parse::<T>().ok())
}

fn parse_go_params(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < parts.len() {
        let consumed = match parts[i] {
            "wtime" => {
                params.wtime = parse_next(parts, i);
                2
            }
            "btime" => {
                params.btime = parse_next(parts, i);
                2
            }
            "winc" => {
                params.winc = parse_next(parts, i);
                2
            }
            "binc" => {
                params.binc = parse_next(parts, i);
                2
            }
            "movestogo" => {
                params.movestogo = parse_next(parts, i);
                2
            }
            "depth" => {
                params.depth = parse_next(parts, i);
                2
            }
            "nodes" => {
                params.nodes = parse_next(parts, i);
                2
            }
            "mate" => {
                params.mate = parse_next(parts, i);
                2
            }
            "movetime" => {
                params.movetime = parse_next(parts, i);
                2
            }
            "infinite" => {
                params.infinite = true;
                1
            }
            "ponder" => {
                params.ponder = true;
                1
            }
            "searchmoves" => {
                let mut j = i + 1;
                while j < parts.len() && !is_go_keyword(parts[j]) {
                    params.search_moves.push(parts[j].to_string());
                    j += 1;
                }
                j - i
            }
            _ => 1,
        };
        i += consumed;
    }
    params
}

fn is_go_keyword(token: &str) -> bool {
    matches!(
        token,
        "wtime" | "btime" | "winc" | "binc" | "movestogo" | "depth" | "nodes" | "mate" | "movetime" | "infinite" | "ponder" | "searchmoves"
    )
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.first() != Some(&"setoption") {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in &parts[1..] {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }
    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() { None } else { Some(value_parts.join(" ")) };
    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_with_clock_and_increment() {
        let line = "go wtime 60000 btime 59000 winc 500 binc 500";
        match parse_uci_command(line) {
            UciCommand::Go(p) => {
                assert_eq!(p.wtime, Some(60_000));
                assert_eq!(p.btime, Some(59_000));
                assert_eq!(p.winc, Some(500));
                assert_eq!(p.binc, Some(500));
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn parses_searchmoves_until_next_keyword() {
        let line = "go searchmoves e2e4 d2d4 depth 10";
        match parse_uci_command(line) {
            UciCommand::Go(p) => {
                assert_eq!(p.search_moves, vec!["e2e4".to_string(), "d2d4".to_string()]);
                assert_eq!(p.depth, Some(10));
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn parses_setoption_with_multiword_name() {
        let line = "setoption name Null Move Depth value 4";
        match parse_uci_command(line) {
            UciCommand::SetOption { name, value } => {
                assert_eq!(name, "Null Move Depth");
                assert_eq!(value, Some("4".to_string()));
            }
            other => panic!("expected SetOption, got {other:?}"),
        }
    }

    #[test]
    fn parses_setoption_button_with_no_value() {
        let line = "setoption name Clear Hash";
        match parse_uci_command(line) {
            UciCommand::SetOption { name, value } => {
                assert_eq!(name, "Clear Hash");
                assert_eq!(value, None);
            }
            other => panic!("expected SetOption, got {other:?}"),
        }
    }

    #[test]
    fn unknown_command_is_preserved_verbatim() {
        match parse_uci_command("banana") {
            UciCommand::Unknown(s) => assert_eq!(s, "banana"),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}
