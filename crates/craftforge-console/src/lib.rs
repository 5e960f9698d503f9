//! Colorful console output for solver events.
//!
//! Provides a custom `tracing` layer that formats solver events with colors,
//! and a [`SinkLayer`] that forwards the same lines, uncolored, to a callback.
//!
//! ## Log Levels
//!
//! - **INFO**: Solve start and end
//! - **DEBUG**: Improvements and per-strategy progress (generations, probes,
//!   macro-steps)

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SOLVE_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the solver console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and sets up tracing.
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Like [`init`], with `level` as the default for solver events.
///
/// `RUST_LOG` still overrides the default.
pub fn init_with_level(level: LevelFilter) {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(CraftConsoleLayer)
            .try_init();
    });
}

// Marks the start of solving for elapsed time tracking.
fn mark_solve_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SOLVE_START_NANOS.store(nanos, Ordering::Relaxed);
}

// Returns elapsed time since solve start.
fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SOLVE_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
  ____            __ _   _____
 / ___|_ __ __ _ / _| |_|  ___|__  _ __ __ _  ___
| |   | '__/ _` | |_| __| |_ / _ \| '__/ _` |/ _ \
| |___| | | (_| |  _| |_|  _| (_) | | | (_| |  __/
 \____|_|  \__,_|_|  \__|_|  \___/|_|  \__, |\___|
                                       |___/
"#;

    let version_line = format!("                v{} - Crafting Sequence Solver\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

fn is_solver_target(target: &str) -> bool {
    target.starts_with("craftforge")
}

/// A tracing layer that formats solver events with colors.
pub struct CraftConsoleLayer;

impl<S: Subscriber> Layer<S> for CraftConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !is_solver_target(event.metadata().target()) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

/// Forwards formatted solver events to a callback as plain text.
///
/// ```
/// use std::sync::Arc;
/// use craftforge_console::SinkLayer;
///
/// let layer = SinkLayer::new(Arc::new(|line: &str| eprintln!("{line}")));
/// # let _ = layer;
/// ```
pub struct SinkLayer {
    sink: Arc<dyn Fn(&str) + Send + Sync>,
}

impl SinkLayer {
    pub fn new(sink: Arc<dyn Fn(&str) + Send + Sync>) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber> Layer<S> for SinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !is_solver_target(event.metadata().target()) {
            return;
        }
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            (self.sink)(&strip_ansi(line));
        }
    }
}

/// Removes ANSI escape sequences.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    strategy: Option<String>,
    actor: Option<String>,
    recipe: Option<String>,
    reason: Option<String>,
    actions: Option<u64>,
    threads: Option<u64>,
    difficulty: Option<i64>,
    quality_target: Option<i64>,
    quality: Option<i64>,
    length: Option<u64>,
    score: Option<f64>,
    best: Option<f64>,
    found: Option<bool>,
    perfect: Option<bool>,
    states_simulated: Option<u64>,
    states_per_sec: Option<u64>,
    duration_ms: Option<u64>,
    elapsed_ms: Option<u64>,
    generation: Option<u64>,
    population: Option<u64>,
    discrepancies: Option<u64>,
    visited: Option<u64>,
    step: Option<u64>,
    frontier: Option<u64>,
    arena_nodes: Option<u64>,
    windows: Option<u64>,
    simulated: Option<u64>,
    progress_lists: Option<u64>,
    quality_lists: Option<u64>,
    index: Option<u128>,
    total: Option<u128>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        let s = s.trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "strategy" => self.strategy = Some(s),
            "actor" => self.actor = Some(s),
            "recipe" => self.recipe = Some(s),
            "reason" => self.reason = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "actions" => self.actions = Some(value),
            "threads" => self.threads = Some(value),
            "length" => self.length = Some(value),
            "states_simulated" => self.states_simulated = Some(value),
            "states_per_sec" => self.states_per_sec = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "elapsed_ms" => self.elapsed_ms = Some(value),
            "generation" => self.generation = Some(value),
            "population" => self.population = Some(value),
            "discrepancies" => self.discrepancies = Some(value),
            "visited" => self.visited = Some(value),
            "step" => self.step = Some(value),
            "frontier" => self.frontier = Some(value),
            "arena_nodes" => self.arena_nodes = Some(value),
            "windows" => self.windows = Some(value),
            "simulated" => self.simulated = Some(value),
            "progress_lists" => self.progress_lists = Some(value),
            "quality_lists" => self.quality_lists = Some(value),
            _ => {}
        }
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        match field.name() {
            "index" => self.index = Some(value),
            "total" => self.total = Some(value),
            _ => self.record_u64(field, u64::try_from(value).unwrap_or(u64::MAX)),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "difficulty" => self.difficulty = Some(value),
            "quality_target" => self.quality_target = Some(value),
            "quality" => self.quality = Some(value),
            _ => self.record_u64(field, value.max(0) as u64),
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "score" => self.score = Some(value),
            "best" => self.best = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "found" => self.found = Some(value),
            "perfect" => self.perfect = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "strategy" => self.strategy = Some(value.to_string()),
            "actor" => self.actor = Some(value.to_string()),
            "recipe" => self.recipe = Some(value.to_string()),
            "reason" => self.reason = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        "improvement" => format_improvement(v),
        "generation" => format_generation(v),
        "probe" => format_probe(v),
        "macro_step" => format_macro_step(v),
        "presolve" => format_presolve(v),
        "progress" => format_progress(v),
        "decompose_halves" => format_halves(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(n: Option<u64>) -> String {
    n.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_solve_start(v: &EventVisitor) -> String {
    mark_solve_start();
    format!(
        "{} {} {} │ {} on {} │ {} actions │ progress {} │ quality {} │ {} threads",
        format_elapsed(),
        "▶".bright_green().bold(),
        v.strategy.as_deref().unwrap_or("Solver").white().bold(),
        v.actor.as_deref().unwrap_or("?").bright_yellow(),
        v.recipe.as_deref().unwrap_or("?").bright_yellow(),
        count(v.actions).bright_yellow(),
        v.difficulty.unwrap_or(0).bright_yellow(),
        v.quality_target.unwrap_or(0).bright_yellow(),
        count(v.threads),
    )
}

fn format_solve_end(v: &EventVisitor) -> String {
    let duration = format_duration_ms(v.duration_ms.unwrap_or(0));
    if v.found != Some(true) {
        let reason = v.reason.as_deref().unwrap_or("no sequence reaches the progress target");
        return format!(
            "{} {} Solving complete │ {} │ {} ({})",
            format_elapsed(),
            "■".bright_cyan().bold(),
            duration.yellow(),
            "NO SOLUTION".bright_red().bold(),
            reason
        );
    }

    let perfect = v.perfect.unwrap_or(false);
    let status = if perfect {
        "PERFECT".bright_green().bold().to_string()
    } else {
        "COMPLETE".bright_yellow().bold().to_string()
    };
    format!(
        "{} {} Solving complete │ {} │ {} │ {} actions │ quality {} │ {} states ({}/s) │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        duration.yellow(),
        format_score(v.score.unwrap_or(0.0)),
        count(v.length).white(),
        v.quality.unwrap_or(0).white(),
        count(v.states_simulated).white(),
        count(v.states_per_sec).bright_magenta().bold(),
        status
    )
}

fn format_improvement(v: &EventVisitor) -> String {
    let icon = if v.perfect == Some(true) {
        "★".bright_green().to_string()
    } else {
        "↑".bright_cyan().to_string()
    };
    format!(
        "{} {} New best │ {} │ {} actions │ quality {} │ after {}",
        format_elapsed(),
        icon,
        format_score(v.score.unwrap_or(0.0)),
        count(v.length).white(),
        v.quality.unwrap_or(0).white(),
        format_duration_ms(v.elapsed_ms.unwrap_or(0)).yellow(),
    )
}

fn format_generation(v: &EventVisitor) -> String {
    format!(
        "{} {} Generation {:>5} │ {} individuals │ best {}",
        format_elapsed(),
        "⚡".bright_cyan(),
        count(v.generation).white(),
        count(v.population),
        format_score(v.best.unwrap_or(0.0)),
    )
}

fn format_probe(v: &EventVisitor) -> String {
    format!(
        "{} {} Probe │ {} discrepancies │ {} states",
        format_elapsed(),
        "⚡".bright_cyan(),
        count(v.discrepancies).white(),
        count(v.visited).bright_magenta(),
    )
}

fn format_macro_step(v: &EventVisitor) -> String {
    format!(
        "{} {} Macro-step {:>4} │ {} paths │ {} arena nodes",
        format_elapsed(),
        "⚡".bright_cyan(),
        count(v.step).white(),
        count(v.frontier),
        count(v.arena_nodes).bright_magenta(),
    )
}

fn format_presolve(v: &EventVisitor) -> String {
    format!(
        "{} {} Presolved {} windows",
        format_elapsed(),
        "◆".bright_blue(),
        count(v.windows).bright_yellow(),
    )
}

fn format_progress(v: &EventVisitor) -> String {
    let covered = match (v.index, v.total) {
        (Some(index), Some(total)) if total > 0 => {
            format!(", {:.1}% of the space", index as f64 / total as f64 * 100.0)
        }
        _ => String::new(),
    };
    format!(
        "{} {} {} states simulated{}",
        format_elapsed(),
        "⚡".bright_cyan(),
        count(v.simulated).bright_magenta().bold(),
        covered,
    )
}

fn format_halves(v: &EventVisitor) -> String {
    format!(
        "{} {} Merging {} progress lists × {} quality lists",
        format_elapsed(),
        "◆".bright_blue(),
        count(v.progress_lists).bright_yellow(),
        count(v.quality_lists).bright_yellow(),
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

fn format_score(score: f64) -> String {
    let text = format!("{:.4}", score);
    if score >= 1.0 {
        text.bright_green().to_string()
    } else if score > 0.0 {
        text.white().to_string()
    } else {
        text.bright_red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = "ok".bright_green().bold().to_string();
        assert_ne!(colored, "ok");
        assert_eq!(strip_ansi(&colored), "ok");
        assert_eq!(strip_ansi("plain │ text"), "plain │ text");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_solve_end_reports_perfect() {
        let v = EventVisitor {
            event: Some("solve_end".into()),
            found: Some(true),
            perfect: Some(true),
            score: Some(1.25),
            length: Some(4),
            quality: Some(420),
            ..EventVisitor::default()
        };
        let line = strip_ansi(&format_event(&v));
        assert!(line.contains("PERFECT"));
        assert!(line.contains("1.2500"));
        assert!(line.contains("4 actions"));
    }

    #[test]
    fn test_unknown_event_is_silent() {
        let v = EventVisitor {
            event: Some("strategy_start".into()),
            ..EventVisitor::default()
        };
        assert!(format_event(&v).is_empty());
    }

    #[test]
    fn test_sink_layer_forwards_solver_events() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let captured = Arc::clone(&lines);
        let layer = SinkLayer::new(Arc::new(move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
        }));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(
                target: "craftforge_solver::solver",
                event = "solve_end",
                found = false,
                duration_ms = 12u64,
            );
            tracing::info!(target: "elsewhere", event = "solve_end", found = false);
        });

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("NO SOLUTION"));
        assert!(lines[0].contains("12ms"));
    }

    #[test]
    fn test_progress_keeps_wide_odometer_positions() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let captured = Arc::clone(&lines);
        let layer = SinkLayer::new(Arc::new(move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
        }));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(
                target: "craftforge_solver::strategy::exhaustive",
                event = "progress",
                index = 1u128 << 70,
                total = 1u128 << 72,
                simulated = 5u64,
            );
        });

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("25.0% of the space"));
    }
}
