//! Colorful console output for run events.
//!
//! A `tracing` layer that formats engine and solver events with colors.
//! Events are recognized by their `event` field.

use std::io::{self, Write};
use std::sync::OnceLock;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the console layer. Only the first call has effect.
///
/// `RUST_LOG` overrides the default `info` filter; `verbose` raises the
/// default to `debug`.
pub fn init(verbose: bool) {
    INIT.get_or_init(|| {
        print_banner();

        let default = if verbose { "equishare=debug,equishare_solver=debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(EquiShareConsoleLayer)
            .try_init();
    });
}

fn print_banner() {
    let version_line = format!(
        "EquiShare v{} - equitable portfolio reassignment",
        env!("CARGO_PKG_VERSION")
    );
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", version_line.bright_cyan().bold());
    let _ = stderr.flush();
}

/// A tracing layer that formats EquiShare events with colors.
///
/// Writes to stderr so stdout stays free for JSON output.
pub struct EquiShareConsoleLayer;

impl<S: Subscriber> Layer<S> for EquiShareConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("equishare") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(*metadata.level(), &visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    cohort: Option<String>,
    label: Option<String>,
    status: Option<String>,
    method: Option<String>,
    tier: Option<String>,
    error: Option<String>,
    constraint: Option<String>,
    degraded: bool,
    level: Option<u64>,
    records: Option<u64>,
    clients: Option<u64>,
    locked: Option<u64>,
    parties: Option<u64>,
    batches: Option<u64>,
    rows: Option<u64>,
    orphans: Option<u64>,
    candidates: Option<u64>,
    placed: Option<u64>,
    leftover: Option<u64>,
    steps: Option<u64>,
    duration_ms: Option<u64>,
}

impl EventVisitor {
    fn set_str(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "message" => self.message = Some(value),
            "cohort" => self.cohort = Some(value),
            "label" => self.label = Some(value),
            "status" => self.status = Some(value),
            "method" => self.method = Some(value),
            "tier" => self.tier = Some(value),
            "error" => self.error = Some(value),
            "constraint" => self.constraint = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_str(field.name(), s.trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_str(field.name(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "degraded" {
            self.degraded = value;
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "level" => self.level = Some(value),
            "records" => self.records = Some(value),
            "clients" => self.clients = Some(value),
            "locked" => self.locked = Some(value),
            "parties" => self.parties = Some(value),
            "batches" => self.batches = Some(value),
            "rows" => self.rows = Some(value),
            "orphans" => self.orphans = Some(value),
            "candidates" => self.candidates = Some(value),
            "placed" => self.placed = Some(value),
            "leftover" => self.leftover = Some(value),
            "steps" => self.steps = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }
}

fn format_event(level: Level, v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "run_start" => format_run_start(v),
        "batch_start" => format_batch_start(v),
        "level_attempt" => format_level_attempt(v),
        "level_result" => format_level_result(level, v),
        "solve_end" => format_solve_end(v),
        "batch_end" => format_batch_end(v),
        "batch_emergency" | "orphans_patched" | "cascade_exhausted" => format_warning(v),
        "run_end" => format_run_end(v),
        "tier_end" => format_tier_end(v),
        "internal_end" => format_internal_end(v),
        _ => String::new(),
    }
}

fn count(n: Option<u64>) -> String {
    n.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn cohort_tag(v: &EventVisitor) -> String {
    format!("[Batch {}]", v.cohort.as_deref().unwrap_or("*"))
}

fn format_run_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} records ({}), locked ({}), parties ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Run]".bright_cyan(),
        count(v.records).bright_yellow(),
        count(v.locked).bright_yellow(),
        count(v.parties).bright_yellow(),
    )
}

fn format_batch_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} clients ({}), records ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        cohort_tag(v).bright_cyan(),
        count(v.clients).bright_yellow(),
        count(v.records).bright_yellow(),
    )
}

fn format_level_attempt(v: &EventVisitor) -> String {
    format!(
        "    {} level {} {}",
        "->".bright_blue(),
        v.level.unwrap_or(0).to_string().yellow(),
        v.label.as_deref().unwrap_or("?").white().bold(),
    )
}

fn format_level_result(level: Level, v: &EventVisitor) -> String {
    // The rejected-solution warning shares the event name.
    if level == Level::WARN {
        return format_warning(v);
    }
    let status = v.status.as_deref().unwrap_or("?");
    let status = match status {
        "optimal" | "feasible" => status.bright_green().to_string(),
        "infeasible" => status.bright_red().to_string(),
        _ => status.yellow().to_string(),
    };
    format!(
        "    {} {} {} ({})",
        "<-".bright_blue(),
        v.label.as_deref().unwrap_or("?").white(),
        status,
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_solve_end(v: &EventVisitor) -> String {
    match &v.constraint {
        Some(constraint) => format!(
            "       {} {}",
            "presolve: unreachable bounds on".bright_black(),
            constraint.bright_red(),
        ),
        None => format!(
            "       {} {}",
            "steps".bright_black(),
            count(v.steps).white(),
        ),
    }
}

fn format_batch_end(v: &EventVisitor) -> String {
    let method = v.method.as_deref().unwrap_or("?");
    let method = if v.degraded {
        method.yellow().bold().to_string()
    } else {
        method.bright_green().bold().to_string()
    };
    format!(
        "{} {} {} method ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        cohort_tag(v).bright_cyan(),
        method,
    )
}

fn format_warning(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {}",
        timestamp().bright_black(),
        "WARN".bright_yellow(),
        v.message.as_deref().unwrap_or("").yellow(),
    );
    if let Some(orphans) = v.orphans {
        output.push_str(&format!(" ({})", orphans.to_formatted_string(&Locale::en).bright_red()));
    }
    if let Some(error) = &v.error {
        output.push_str(&format!(": {}", error.bright_red()));
    }
    output
}

fn format_run_end(v: &EventVisitor) -> String {
    format!(
        "{} {} {} batches ({}), rows ({}), orphans ({}), time spent ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Run]".bright_cyan(),
        count(v.batches).bright_yellow(),
        count(v.rows).bright_yellow(),
        count(v.orphans).bright_yellow(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_tier_end(v: &EventVisitor) -> String {
    format!(
        "{} {} {} candidates ({}), placed ({}), leftover ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!(
            "[{} / {}]",
            v.cohort.as_deref().unwrap_or("-"),
            v.tier.as_deref().unwrap_or("-")
        )
        .bright_cyan(),
        count(v.candidates).bright_yellow(),
        count(v.placed).bright_yellow(),
        count(v.leftover).bright_yellow(),
    )
}

fn format_internal_end(v: &EventVisitor) -> String {
    format!(
        "{} {} {} placed ({}), leftover ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Rotation]".bright_cyan(),
        count(v.placed).bright_yellow(),
        count(v.leftover).bright_yellow(),
    )
}

/// Prints a boxed run summary to stderr.
pub fn print_summary(title: &str, ok: bool, lines: &[(&str, String)]) {
    let border = |s: &str| s.bright_cyan().to_string();
    let mut output = String::from("\n");
    output.push_str(&border("╔══════════════════════════════════════════════════════════╗"));
    output.push('\n');

    let padding = 56usize.saturating_sub(title.len() + 4);
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;
    let title = format!("  {}  ", title);
    let title = if ok {
        title.bright_green().bold().to_string()
    } else {
        title.yellow().bold().to_string()
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        border("║"),
        " ".repeat(left_pad),
        title,
        " ".repeat(right_pad),
        border("║")
    ));
    output.push('\n');
    output.push_str(&border("╠══════════════════════════════════════════════════════════╣"));
    output.push('\n');

    for (name, value) in lines {
        output.push_str(&format!("{}  {:<18}{:>36}  {}", border("║"), name, value, border("║")));
        output.push('\n');
    }
    output.push_str(&border("╚══════════════════════════════════════════════════════════╝"));

    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", output);
    let _ = stderr.flush();
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1_500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_unknown_events_are_silent() {
        let visitor = EventVisitor {
            event: Some("worker_end".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(Level::DEBUG, &visitor).is_empty());
    }

    #[test]
    fn test_run_end_lists_counts() {
        let visitor = EventVisitor {
            event: Some("run_end".to_string()),
            batches: Some(2),
            rows: Some(12_500),
            orphans: Some(0),
            ..EventVisitor::default()
        };
        let line = format_event(Level::INFO, &visitor);

        assert!(line.contains("12,500"));
        assert!(line.contains("[Run]"));
    }
}
