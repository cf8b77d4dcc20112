use finebook_core::{
    format_pence, parse_checkout, parse_pounds, Event, EventBus, FinesConfig, MemoryStore, Pence,
    RngState, Screen, Session, SpecialKind, StateStore,
};
use finebook_store::{default_store_path, load_fines_config, JsonFileStore};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
struct CliOptions {
    seed: Option<u64>,
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    help: bool,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--help" | "-h" => options.help = true,
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--store" => {
                if let Some(value) = args.get(idx + 1) {
                    options.store = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--config" => {
                if let Some(value) = args.get(idx + 1) {
                    options.config = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    options
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if options.help {
        print_usage();
        return;
    }

    let config = match &options.config {
        Some(path) => match load_fines_config(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("config error: {err:#}");
                std::process::exit(1);
            }
        },
        None => FinesConfig::default(),
    };
    let rng = match options.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    let store_path = options.store.clone().or_else(default_store_path);
    let store: Box<dyn StateStore> = match &store_path {
        Some(path) => Box::new(JsonFileStore::new(path.clone())),
        None => {
            eprintln!("no home directory found; totals will not survive this run");
            Box::new(MemoryStore::new())
        }
    };

    let mut session = Session::with_store(config, rng, store);
    run_loop(&mut session, store_path);
}

fn run_loop(session: &mut Session, store_path: Option<PathBuf>) {
    let mut events = EventBus::default();
    println!("finebook fines tracker (seed {})", session.rng.seed());
    println!("type 'help' for commands");
    offer_resume(session, &mut events);

    loop {
        let Some(line) = read_line(&prompt_text(session)) else {
            break;
        };
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();
        match cmd {
            "" => {}
            "help" | "h" | "?" => print_help(),
            "quit" | "exit" | "q" => break,
            "start" => {
                if args.is_empty() {
                    println!(
                        "usage: start <name> [name ...] (up to {})",
                        session.config.max_players
                    );
                    continue;
                }
                let names: Vec<String> = args.iter().map(|s| s.to_string()).collect();
                match session.start_session(&names, &mut events) {
                    Ok(()) => {
                        drain_events(&mut events);
                        print_board(session);
                    }
                    Err(err) => println!("error: {err}"),
                }
            }
            "select" => {
                let text = args.join(" ");
                let Some(name) = resolve_player(session, &text) else {
                    println!("unknown player: {text}");
                    continue;
                };
                match session.select_player(&name, &mut events) {
                    Ok(_) => drain_events(&mut events),
                    Err(err) => println!("error: {err}"),
                }
            }
            "fine" | "f" => {
                let Some(raw_amount) = args.first() else {
                    println!("usage: fine <amount> [player]");
                    continue;
                };
                let Some(amount) = parse_amount(&session.config, raw_amount) else {
                    println!("bad amount: {raw_amount} (try 50p, £1, 2.50)");
                    continue;
                };
                let target = if args.len() > 1 {
                    let text = args[1..].join(" ");
                    match resolve_player(session, &text) {
                        Some(name) => name,
                        None => {
                            println!("unknown player: {text}");
                            continue;
                        }
                    }
                } else {
                    match session.selected_player() {
                        Some(name) => name.to_string(),
                        None => {
                            println!("no player selected; 'select <name>' first");
                            continue;
                        }
                    }
                };
                match session.apply_fine(&target, amount, None, &mut events) {
                    Ok(_) => drain_events(&mut events),
                    Err(err) => println!("error: {err}"),
                }
            }
            "special" => {
                let Some(kind_text) = args.first() else {
                    println!("usage: special <180|bull|ton <checkout>>");
                    continue;
                };
                let (kind, checkout) = match *kind_text {
                    "180" => (SpecialKind::OneEighty, None),
                    "bull" => (SpecialKind::BullFinish, None),
                    "ton" => {
                        let Some(raw) = args.get(1) else {
                            println!("usage: special ton <checkout>");
                            continue;
                        };
                        match parse_checkout(raw) {
                            Some(pence) => (SpecialKind::TonFinish, Some(pence)),
                            None => {
                                println!("checkout must be a two or three digit score");
                                continue;
                            }
                        }
                    }
                    other => {
                        println!("unknown special: {other}");
                        continue;
                    }
                };
                match session.apply_special(kind, checkout, &mut events) {
                    Ok(_) => drain_events(&mut events),
                    Err(err) => println!("error: {err}"),
                }
            }
            "undo" | "u" => {
                session.undo_last(&mut events);
                drain_events(&mut events);
            }
            "wheel" => match session.go_to(Screen::Selection, &mut events) {
                Ok(()) => {
                    drain_events(&mut events);
                    print_wheel(session);
                }
                Err(err) => println!("error: {err}"),
            },
            "back" => {
                let target = match session.screen() {
                    Screen::Selection => Screen::Tracking,
                    Screen::Final => Screen::Selection,
                    _ => {
                        println!("nowhere to go back to");
                        continue;
                    }
                };
                match session.go_to(target, &mut events) {
                    Ok(()) => drain_events(&mut events),
                    Err(err) => println!("error: {err}"),
                }
            }
            "exclude" | "include" => {
                let text = args.join(" ");
                let Some(name) = resolve_player(session, &text) else {
                    println!("unknown player: {text}");
                    continue;
                };
                let want_off = cmd == "exclude";
                if session.excluded().contains(&name) == want_off {
                    println!(
                        "{name} is already {}",
                        if want_off { "off the wheel" } else { "on the wheel" }
                    );
                    continue;
                }
                match session.toggle_exclusion(&name, &mut events) {
                    Ok(_) => drain_events(&mut events),
                    Err(err) => println!("error: {err}"),
                }
            }
            "spin" => {
                let respin = session.selection().is_outstanding();
                let spun = if respin {
                    session.respin_selection(&mut events)
                } else {
                    session.run_selection(&mut events)
                };
                match spun {
                    Ok(outcome) => {
                        println!(
                            "{}",
                            if respin {
                                "re-spinning the wheel..."
                            } else {
                                "spinning the wheel..."
                            }
                        );
                        drain_events(&mut events);
                        if outcome.max_reached {
                            println!("maximum fine amount reached");
                        }
                    }
                    Err(err) => println!("error: {err}"),
                }
            }
            "confirm" => match session.go_to(Screen::Final, &mut events) {
                Ok(()) => {
                    drain_events(&mut events);
                    print_final(session);
                }
                Err(err) => println!("error: {err}"),
            },
            "board" | "totals" | "ls" => print_board(session),
            "history" | "log" => print_history(session),
            "fines" | "schedule" => print_schedule(&session.config),
            "resume" => {
                if session.resume_session(&mut events) {
                    drain_events(&mut events);
                    print_board(session);
                } else {
                    println!("no saved session to resume");
                }
            }
            "reset" => {
                let Some(answer) = read_line("really wipe all totals and history? [y/N] ") else {
                    break;
                };
                if is_yes(&answer) {
                    session.reset_session(&mut events);
                    drain_events(&mut events);
                } else {
                    println!("reset cancelled");
                }
            }
            "save-path" => match &store_path {
                Some(path) => println!("{}", path.display()),
                None => println!("no save file; this session is in memory only"),
            },
            "dump" => match serde_json::to_string_pretty(&session.export_record()) {
                Ok(body) => println!("{body}"),
                Err(err) => println!("error: {err}"),
            },
            other => println!("unknown command: {other} (try 'help')"),
        }
    }
}

fn offer_resume(session: &mut Session, events: &mut EventBus) {
    if !session.has_saved_session() {
        return;
    }
    if let Some(game) = session.saved_session() {
        let lines: Vec<String> = game
            .players
            .iter()
            .map(|name| format!("{name} {}", format_pence(session.ledger.total(name))))
            .collect();
        println!(
            "saved session from {} (updated {}):",
            game.created_at.format("%Y-%m-%d %H:%M"),
            game.updated_at.format("%H:%M")
        );
        println!("  {}", lines.join(", "));
    }
    match read_line("resume it? [y/N/reset] ") {
        Some(answer) if is_yes(&answer) => {
            if session.resume_session(events) {
                drain_events(events);
                print_board(session);
            }
        }
        Some(answer) if answer.trim().eq_ignore_ascii_case("reset") => {
            session.reset_session(events);
            drain_events(events);
        }
        _ => println!("leaving it saved; 'resume' brings it back, 'start <names>' begins fresh"),
    }
}

fn prompt_text(session: &Session) -> String {
    match session.selected_player() {
        Some(name) if session.screen() == Screen::Tracking => {
            format!("fines[{}:{}]> ", session.screen().label(), name)
        }
        _ => format!("fines[{}]> ", session.screen().label()),
    }
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).ok()? == 0 {
        return None;
    }
    Some(line.trim_end_matches(&['\n', '\r'][..]).to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Accepts a preset label (`50p`, `£5`), a pence amount with a `p`
/// suffix (`75p`), or a pounds figure (`2.50`, `£1`).
fn parse_amount(config: &FinesConfig, text: &str) -> Option<Pence> {
    if let Some(preset) = config.preset(text) {
        return Some(preset.pence);
    }
    if let Some(stripped) = text.strip_suffix(&['p', 'P'][..]) {
        if !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit()) {
            return stripped.parse().ok();
        }
    }
    parse_pounds(text)
}

/// Exact match first, then a unique case-insensitive match.
fn resolve_player(session: &Session, text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    if let Some(name) = session.players().iter().find(|p| p.as_str() == text) {
        return Some(name.clone());
    }
    let mut matches = session
        .players()
        .iter()
        .filter(|p| p.eq_ignore_ascii_case(text));
    match (matches.next(), matches.next()) {
        (Some(name), None) => Some(name.clone()),
        _ => None,
    }
}

fn drain_events(events: &mut EventBus) {
    let drained: Vec<Event> = events.drain().collect();
    for event in &drained {
        println!("{}", format_event(event));
    }
}

fn format_event(event: &Event) -> String {
    match event {
        Event::SessionStarted { players } => {
            format!("session started: {}", players.join(", "))
        }
        Event::SessionResumed { screen, players } => format!(
            "session resumed: {} players, back on {}",
            players.len(),
            screen.label()
        ),
        Event::SessionReset => "session reset: totals and history cleared".to_string(),
        Event::ScreenChanged { screen } => format!("screen: {}", screen.label()),
        Event::PlayerSelected { name, .. } => format!("selected: {name}"),
        Event::FineApplied {
            name,
            applied,
            total,
            capped,
        } => format!(
            "fine applied: {name} +{} total {}{}",
            format_pence(*applied),
            format_pence(*total),
            if *capped { " (capped)" } else { "" }
        ),
        Event::BatchApplied {
            batch_id,
            amount_each,
            count,
            any_capped,
        } => format!(
            "batch applied: {count} players +{} each{} [{batch_id}]",
            format_pence(*amount_each),
            if *any_capped { " (capped)" } else { "" }
        ),
        Event::SpecialApplied {
            kind,
            trigger,
            amount_each,
            count,
            any_capped,
            ..
        } => format!(
            "special applied: {kind:?} by {trigger}, {count} players +{} each{}",
            format_pence(*amount_each),
            if *any_capped { " (capped)" } else { "" }
        ),
        Event::FineUndone { name, delta } => {
            format!("undid {} from {name}", format_pence(*delta))
        }
        Event::BatchUndone { batch_id, count } => {
            format!("undid batch {batch_id} ({count} entries)")
        }
        Event::NothingToUndo => "nothing to undo".to_string(),
        Event::SelectionWon {
            winner,
            before,
            after,
            max_reached,
        } => format!(
            "wheel: {winner}! {} x 2 = {}{}",
            format_pence(*before),
            format_pence(*after),
            if *max_reached { " (maximum)" } else { "" }
        ),
        Event::SelectionReverted { winner, .. } => {
            format!("previous doubling reverted: {winner}")
        }
        Event::ExclusionToggled { name, excluded } => {
            if *excluded {
                format!("{name} is off the wheel")
            } else {
                format!("{name} is back on the wheel")
            }
        }
    }
}

fn print_board(session: &Session) {
    if session.players().is_empty() {
        println!("no session running; 'start <name> [name ...]' begins one");
        return;
    }
    for (idx, name) in session.players().iter().enumerate() {
        let selected = if session.selected_index() == Some(idx) {
            ">"
        } else {
            " "
        };
        let winner = if session.selection().winner_name.as_deref() == Some(name.as_str()) {
            " (doubled)"
        } else {
            ""
        };
        let excluded = if session.excluded().contains(name) {
            " (off wheel)"
        } else {
            ""
        };
        println!(
            "{selected} {name:<16} {:>9}{winner}{excluded}",
            format_pence(session.ledger.total(name))
        );
    }
}

fn print_wheel(session: &Session) {
    let eligible = session.eligible_names();
    println!("on the wheel: {}", eligible.join(", "));
    if !session.excluded().is_empty() {
        let excluded: Vec<&str> = session.excluded().iter().map(String::as_str).collect();
        println!("excluded: {}", excluded.join(", "));
    }
    println!("'spin' picks a player and doubles their total");
}

fn print_history(session: &Session) {
    if session.ledger.is_empty() {
        println!("no fines yet");
        return;
    }
    println!("latest first:");
    for entry in session.ledger.history().iter().rev() {
        let batch = entry
            .batch_id
            .as_deref()
            .map(|id| format!(" [{id}]"))
            .unwrap_or_default();
        println!(
            "  {} {} +{}{batch}",
            entry.at.format("%H:%M"),
            entry.name,
            format_pence(entry.delta)
        );
    }
}

fn print_schedule(config: &FinesConfig) {
    println!("presets:");
    for preset in &config.presets {
        println!("  {:<8} {}", preset.label, format_pence(preset.pence));
    }
    println!("specials (everyone except the trigger pays):");
    for rule in &config.specials {
        match rule.pence_each {
            Some(pence) => println!("  {:<8} {} each", rule.label, format_pence(pence)),
            None => println!("  {:<8} checkout score in pence, each", rule.label),
        }
    }
    println!(
        "caps: {} base, {} after a doubling",
        format_pence(config.base_cap),
        format_pence(config.doubled_cap)
    );
}

fn print_final(session: &Session) {
    println!("final standings:");
    print_board(session);
    let selection = session.selection();
    if let (Some(winner), Some(before), Some(after)) = (
        selection.winner_name.as_deref(),
        selection.amount_before,
        selection.amount_after,
    ) {
        println!("doubled: {winner} {} x 2 = {}", format_pence(before), format_pence(after));
    }
    let pot: Pence = session
        .players()
        .iter()
        .map(|name| session.ledger.total(name))
        .sum();
    println!("pot: {}", format_pence(pot));
}

fn print_help() {
    println!("commands:");
    println!("  start <name> [name ...]   begin a new session");
    println!("  select <name>             pick who the next fine lands on");
    println!("  fine <amount> [player]    add a fine (50p, £1, 2.50, 75p)");
    println!("  special 180|bull|ton <n>  fine everyone except the selected player");
    println!("  undo                      revert the last fine or batch");
    println!("  wheel                     go to the double-fines wheel");
    println!("  exclude/include <name>    take a player off the wheel, or put back");
    println!("  spin                      spin (or re-spin) for a doubling");
    println!("  confirm                   lock the result in and show final totals");
    println!("  back                      previous screen");
    println!("  board                     totals for everyone");
    println!("  history                   fines, latest first");
    println!("  fines                     the fine schedule and caps");
    println!("  resume                    restore the saved session");
    println!("  reset                     wipe totals, history, and saved game");
    println!("  save-path                 where the state file lives");
    println!("  dump                      raw saved record as JSON");
    println!("  quit                      leave (state is already saved)");
}

fn print_usage() {
    println!("usage: finebook-cli [--seed N] [--store PATH] [--config PATH]");
    println!("  --seed N      fix the wheel's random seed");
    println!("  --store PATH  state file (default: $FINEBOOK_SAVE or ~/.finebook_state.json)");
    println!("  --config PATH fine schedule JSON (default: built-in schedule)");
}
