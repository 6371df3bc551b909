//! # HCO CLI
//!
//! Command-line front end for the element-merging game: play interactively
//! in the terminal, or run headless simulations with a simple policy.

mod config;

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hco_core::{Direction, Element, Game, StepResult};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Config, Policy};

#[derive(Parser, Debug)]
#[command(name = "hco")]
#[command(author, version, about = "Play H/C/O in the terminal or run simulations")]
struct Args {
    /// Run in interactive mode (default if no other mode specified)
    #[arg(short, long)]
    interactive: bool,

    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs [default: 42]
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum steps per episode, 0 = unlimited [default: 10000]
    #[arg(short, long)]
    max_steps: Option<u32>,

    /// Policy for headless mode [default: random]
    #[arg(short, long, value_enum)]
    policy: Option<Policy>,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// TOML file with defaults for the options above
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    /// Layer explicit flags over the config file (or built-in defaults).
    fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml(path)?,
            None => Config::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        config.verbose |= self.verbose;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.resolve()?;

    match args.episodes.filter(|_| !args.interactive) {
        Some(episodes) => {
            init_tracing("info");
            run_headless(&config, episodes)
        }
        None => {
            // Keep the board readable unless RUST_LOG asks for more.
            init_tracing("warn");
            run_interactive(&config)
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(config: &Config) -> Result<()> {
    let _raw = RawMode::enable();

    let mut game = Game::new(config.seed);
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    redraw(&game, None)?;

    loop {
        let bytes_read = stdin.read(&mut buffer).context("reading keyboard input")?;
        if bytes_read == 0 {
            break;
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(direction) => {
                if !game.is_done() {
                    let result = game.step(direction);
                    redraw(&game, Some(result))?;
                }
            }
            InputAction::Restart => {
                game.restart();
                redraw(&game, None)?;
            }
            InputAction::Quit => {
                println!("\nGoodbye!");
                break;
            }
            InputAction::None => {}
        }
    }

    Ok(())
}

fn redraw(game: &Game, result: Option<StepResult>) -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?; // Clear screen
    writeln!(out, "=== H / C / O ===")?;
    writeln!(out, "Controls: WASD or Arrow Keys | Q to quit | R to restart\n")?;
    write!(out, "{}", game)?;

    if let Some(result) = result.filter(|r| r.reward > 0) {
        writeln!(out, "  +{} points!", result.reward)?;
    }

    if game.is_done() {
        writeln!(out, "\n  *** GAME OVER ***")?;
        writeln!(out, "  Final Score: {}", game.score())?;
        writeln!(out, "  Highest Element: {}", symbol(game.max_element()))?;
        writeln!(out, "\n  Press R to restart or Q to quit")?;
    }
    out.flush().context("flushing stdout")
}

/// Run headless simulation mode.
fn run_headless(config: &Config, episodes: u32) -> Result<()> {
    if episodes == 0 {
        bail!("--episodes must be at least 1");
    }

    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut highest: BTreeMap<Option<Element>, u32> = BTreeMap::new();

    // Separate RNG for move selection so policies don't perturb spawns.
    let mut picker = SmallRng::seed_from_u64(config.seed.wrapping_add(1000));

    for episode in 0..episodes {
        let mut game = Game::new(config.seed.wrapping_add(episode as u64));
        let mut steps = 0;
        let mut cycle = 0;

        while !game.is_done() && (config.max_steps == 0 || steps < config.max_steps) {
            let direction = match config.policy {
                Policy::Random => select_random(&game, &mut picker),
                Policy::Cycle => select_cycle(&game, &mut cycle),
            };
            let Some(direction) = direction else {
                break;
            };

            game.step(direction);
            steps += 1;

            if config.verbose {
                println!("Episode {} Step {}: {}", episode + 1, steps, direction);
                print!("{}", game);
            }
        }

        info!(
            episode = episode + 1,
            score = game.score(),
            steps,
            done = game.is_done(),
            "episode finished"
        );
        scores.push(game.score());
        *highest.entry(game.max_element()).or_default() += 1;
    }

    let summary = Summary::from_scores(&scores).context("no episodes were played")?;

    // Output results in parseable format
    let mut out = io::stdout().lock();
    writeln!(out, "=== Simulation Results ===")?;
    writeln!(out, "episodes={}", episodes)?;
    writeln!(out, "policy={:?}", config.policy)?;
    writeln!(out, "seed={}", config.seed)?;
    writeln!(out, "max_steps={}", config.max_steps)?;
    writeln!(out, "avg_score={:.2}", summary.mean)?;
    writeln!(out, "median_score={:.2}", summary.median)?;
    writeln!(out, "min_score={}", summary.min)?;
    writeln!(out, "max_score={}", summary.max)?;
    let distribution: Vec<String> = highest
        .iter()
        .map(|(element, count)| format!("{}:{}", symbol(*element), count))
        .collect();
    writeln!(out, "element_distribution={}", distribution.join(","))?;
    out.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Summary {
    mean: f64,
    median: f64,
    min: u32,
    max: u32,
}

impl Summary {
    fn from_scores(scores: &[u32]) -> Option<Summary> {
        let mut sorted = scores.to_vec();
        sorted.sort_unstable();
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let n = sorted.len();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
        } else {
            sorted[n / 2] as f64
        };
        let total: u64 = sorted.iter().map(|&s| s as u64).sum();
        Some(Summary {
            mean: total as f64 / n as f64,
            median,
            min,
            max,
        })
    }
}

/// Select a random legal move.
fn select_random(game: &Game, rng: &mut SmallRng) -> Option<Direction> {
    let valid: Vec<Direction> = Direction::ALL
        .into_iter()
        .zip(game.legal_moves())
        .filter(|(_, legal)| *legal)
        .map(|(direction, _)| direction)
        .collect();
    valid.choose(rng).copied()
}

/// Select moves in a cycle: Left, Down, Right, Up, skipping illegal ones.
fn select_cycle(game: &Game, cycle: &mut usize) -> Option<Direction> {
    const ORDER: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
    let legal = game.legal_moves();

    for _ in 0..ORDER.len() {
        let direction = ORDER[*cycle % ORDER.len()];
        *cycle += 1;
        if legal[direction as usize] {
            return Some(direction);
        }
    }

    None
}

fn symbol(element: Option<Element>) -> char {
    element.map_or('.', Element::symbol)
}

#[derive(Debug, PartialEq, Eq)]
enum InputAction {
    Move(Direction),
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Control keys
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc
        [b'r'] | [b'R'] => InputAction::Restart,

        _ => InputAction::None,
    }
}

/// Puts the terminal into unbuffered, no-echo mode for single-key input and
/// restores the previous settings when dropped.
#[cfg(unix)]
struct RawMode {
    saved: Option<libc::termios>,
}

#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        // SAFETY: termios is plain data and fd is the process's stdin.
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                // Not a terminal; input stays line-buffered.
                return RawMode { saved: None };
            }
            let saved = termios;
            termios.c_lflag = raw_lflag(termios.c_lflag);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);
            RawMode { saved: Some(saved) }
        }
    }
}

/// Local flags for single-key input. `ISIG` is cleared so Ctrl+C arrives as
/// byte 3 and quits through the normal path, restoring the terminal.
#[cfg(unix)]
fn raw_lflag(lflag: libc::tcflag_t) -> libc::tcflag_t {
    lflag & !(libc::ICANON | libc::ECHO | libc::ISIG)
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        if let Some(saved) = self.saved {
            // SAFETY: restores settings previously read from the same fd.
            unsafe {
                libc::tcsetattr(io::stdin().as_raw_fd(), libc::TCSANOW, &saved);
            }
        }
    }
}

// On non-Unix systems input stays line-buffered; press Enter after each key.
#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    fn enable() -> Self {
        RawMode
    }
}
