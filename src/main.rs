//! Peace Talk CLI
//!
//! Usage:
//!   peacetalk                                 # Interactive REPL
//!   peacetalk --serve                         # HTTP API server
//!   peacetalk --data-dir ./data --json        # REPL with JSON output

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use peacetalk::core::{run_server, CoreConfig, CoupleApp, FileStore, SystemClock};
use peacetalk::types::{DialoguePhase, Outcome, ProfileId, ProfileInput};
use peacetalk::{AUTO_RESTART_DELAY_MS, MAX_DIALOGUE_STEPS, VERSION};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "peacetalk",
    version = VERSION,
    about = "Peace Talk - a shared space for two partners to work through conflict",
    long_about = "Peace Talk keeps one couple account with two profiles on one device.\n\n\
                  A partner raises an alarm when they need to talk. Answering late\n\
                  costs speaking points. The Road of Peace is a turn-by-turn\n\
                  dialogue: apologies and quick resolutions earn like points.\n\n\
                  Road of Peace phases:\n  \
                  IDLE        - No dialogue yet\n  \
                  ACTIVE      - Partners are taking turns\n  \
                  RESOLVED    - Ended with peace\n  \
                  UNRESOLVED  - Ended without agreement"
)]
struct Args {
    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Directory holding the couple account
    #[arg(long, env = "PEACETALK_DATA_DIR", default_value = "./peacetalk-data")]
    data_dir: String,

    /// Pause before a full Road of Peace round starts over
    #[arg(long, default_value_t = AUTO_RESTART_DELAY_MS)]
    restart_delay_ms: u64,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Debug logging and full status after every command
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let store = match FileStore::open(&args.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Cannot open data directory {}: {}", args.data_dir, e);
            std::process::exit(1);
        }
    };
    tracing::info!(dir = %store.dir().display(), "data directory opened");
    let app = CoupleApp::new(
        store,
        Arc::new(SystemClock),
        CoreConfig::with_restart_delay_ms(args.restart_delay_ms),
    );

    if args.serve {
        run_serve(&args, app).await;
    } else {
        run_repl(&args, app);
    }
}

/// `RUST_LOG` wins; otherwise info, or debug under --verbose
fn init_tracing(verbose: bool) {
    let default = if verbose { "peacetalk=debug" } else { "peacetalk=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Run HTTP API server
async fn run_serve(args: &Args, app: CoupleApp) {
    println!();
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║  🕊 Peace Talk API Server                                  ║");
    println!("║  Version: {}                                           ║", VERSION);
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    if let Err(e) = run_server(&args.addr, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Run the interactive REPL
fn run_repl(args: &Args, mut app: CoupleApp) {
    print_header(args.no_color);
    if app.account().is_none() {
        println!("No couple account yet. Start with:");
        println!("  register <password> <confirm> <name1[:avatar]> <name2[:avatar]>");
    }
    println!("Type 'help' for commands, 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", format_prompt(&app, args.no_color));
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nGoodbye. Be kind to each other.");
            break;
        }
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command.to_ascii_lowercase().as_str() {
            "help" => print_help(),
            "register" => cmd_register(&mut app, rest, args),
            "login" => {
                if app.login(rest) {
                    print_note("Logged in. Pick a profile with `select 1` or `select 2`.", args);
                } else {
                    print_warning("Wrong password", args);
                }
            }
            "select" => {
                let outcome = app.select_profile(&parse_profile(rest));
                print_outcome(&outcome, &app, args);
            }
            "alarm" => {
                let outcome = app.trigger_alarm();
                print_outcome(&outcome, &app, args);
            }
            "ack" => {
                let outcome = app.acknowledge_alarm();
                print_outcome(&outcome, &app, args);
            }
            "start" => {
                let steps = if rest.is_empty() {
                    Ok(MAX_DIALOGUE_STEPS)
                } else {
                    rest.parse::<i32>()
                };
                match steps {
                    Ok(steps) => {
                        let outcome = app.start_dialogue(steps);
                        print_outcome(&outcome, &app, args);
                    }
                    Err(_) => print_warning("Usage: start [steps]", args),
                }
            }
            "say" => {
                let outcome = app.post_message(rest, false, None);
                print_outcome(&outcome, &app, args);
            }
            "apologize" | "apologise" | "sorry" => {
                // apologize <message> [| <what for>]
                let (text, reason) = match rest.split_once('|') {
                    Some((text, reason)) => (text.trim(), reason.trim()),
                    None => (rest, ""),
                };
                let outcome = app.post_message(text, true, Some(reason));
                print_outcome(&outcome, &app, args);
            }
            "end" => {
                let resolved = !matches!(rest, "unresolved" | "no" | "n");
                let outcome = app.conclude(resolved);
                print_outcome(&outcome, &app, args);
            }
            "logout" => {
                app.logout();
                print_note("Logged out.", args);
            }
            "status" => {
                app.poll();
                print_status(&app, args);
            }
            other => print_warning(&format!("Unknown command '{}'. Type 'help'.", other), args),
        }
    }
}

/// register <password> <confirm> <name1[:avatar]> <name2[:avatar]>
fn cmd_register(app: &mut CoupleApp, rest: &str, args: &Args) {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() < 2 {
        print_warning("Usage: register <password> <confirm> <name1[:avatar]> <name2[:avatar]>", args);
        return;
    }
    let profiles: Vec<ProfileInput> = parts[2..].iter().map(|p| parse_profile_input(p)).collect();

    match app.register(parts[0], parts[1], &profiles) {
        Ok(()) => {
            print_note("Account created and logged in.", args);
            print_status(app, args);
        }
        Err(e) => print_warning(&e.to_string(), args),
    }
}

/// `Alex:🧑` or just `Alex`
fn parse_profile_input(raw: &str) -> ProfileInput {
    match raw.split_once(':') {
        Some((name, avatar)) => ProfileInput::new(name, avatar),
        None => ProfileInput::new(raw, "🙂"),
    }
}

/// `1`, `2` or a full id like `profile2`
fn parse_profile(raw: &str) -> ProfileId {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => ProfileId::for_slot(n - 1),
        _ => ProfileId::from(raw),
    }
}

/// Print header
fn print_header(no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Peace Talk v{}", VERSION);
        println!("========================================");
    } else {
        println!("\x1b[1m╔═══════════════════════════════════════════════════════════╗\x1b[0m");
        println!("\x1b[1m║              🕊  Peace Talk v{}                          ║\x1b[0m", VERSION);
        println!("\x1b[1m╚═══════════════════════════════════════════════════════════╝\x1b[0m");
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  register <pw> <confirm> <name1[:avatar]> <name2[:avatar]>");
    println!("  login <pw>             logout");
    println!("  select <1|2>           status");
    println!("  alarm                  ack");
    println!("  start [steps]          say <message>");
    println!("  apologize <message> [| <what for>]");
    println!("  end [resolved|unresolved]");
    println!("  quit");
}

/// Prompt shows who is at the device and the dialogue phase
fn format_prompt(app: &CoupleApp, no_color: bool) -> String {
    let phase = app.dialogue().phase;
    let who = app
        .active_profile()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "-".to_string());
    let turn = match (&app.dialogue().turn_holder, phase) {
        (Some(id), DialoguePhase::Active) => format!(" | turn={}", id),
        _ => String::new(),
    };

    if no_color {
        format!("[{} | {}{}] > ", who, phase, turn)
    } else {
        format!(
            "{}{} [{} | {}{}]{} > ",
            phase.color_code(),
            phase.emoji(),
            who,
            phase,
            turn,
            DialoguePhase::color_reset()
        )
    }
}

fn print_outcome(outcome: &Outcome, app: &CoupleApp, args: &Args) {
    if args.json {
        #[derive(serde::Serialize)]
        struct Reply<'a> {
            outcome: &'a Outcome,
            view: peacetalk::types::CoupleView,
        }
        let reply = Reply {
            outcome,
            view: app.view(),
        };
        println!("{}", serde_json::to_string(&reply).unwrap_or_default());
        return;
    }

    if args.no_color {
        println!("{}", outcome.to_parseable_string());
    } else {
        println!("{}", outcome.to_terminal_string());
    }

    if app.pending_restart().is_some() {
        print_note("Round complete. The Road of Peace starts over shortly.", args);
    }
    if args.verbose {
        print_status(app, args);
    }
}

fn print_status(app: &CoupleApp, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(&app.view()).unwrap_or_default());
    } else {
        print!("{}", app.view().to_terminal_string(args.no_color));
    }
}

fn print_note(text: &str, args: &Args) {
    if args.json {
        return;
    }
    if args.no_color {
        println!("{}", text);
    } else {
        println!("\x1b[36m  {}\x1b[0m", text);
    }
}

fn print_warning(text: &str, args: &Args) {
    if args.json {
        println!("{}", serde_json::json!({ "error": text }));
    } else if args.no_color {
        println!("! {}", text);
    } else {
        println!("\x1b[33m⚠ {}\x1b[0m", text);
    }
}
