use crate::types::{SortOrder, SortReport, StressReport};
use colored::*;
use humansize::{format_size, BINARY};
use serde::Serialize;
use std::io;

const BOX_TL: &str = "╭";
const BOX_TR: &str = "╮";
const BOX_BL: &str = "╰";
const BOX_BR: &str = "╯";
const BOX_H: &str = "─";
const BOX_V: &str = "│";
const BOX_LT: &str = "├";
const BOX_RT: &str = "┤";

const WIDTH: usize = 62;

pub struct TerminalRenderer {
    use_color: bool,
}

impl TerminalRenderer {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn render_sort(&self, report: &SortReport) {
        let order = match report.order {
            SortOrder::Descending => "largest first",
            SortOrder::Ascending => "smallest first",
        };

        println!();
        self.print_top();
        self.print_line(&format!("Heap sort: {} values, {}", report.count, order), "cyan", true);
        self.print_bottom();

        let values: Vec<String> = report.sorted.iter().map(|v| v.to_string()).collect();
        println!("  {}", values.join(" "));
        println!();
    }

    pub fn render_stress(&self, report: &StressReport) {
        println!();
        self.print_top();
        self.print_line(
            &format!(
                "Stress: {} threads x {} inserts ({:?} growth)",
                report.threads, report.inserts_per_thread, report.growth
            ),
            "cyan",
            true,
        );
        self.print_separator();
        self.print_line(
            &format!(
                "Slots: {} -> {} ({})",
                report.capacity.initial,
                report.capacity.final_slots,
                format_size(report.capacity.storage_bytes, BINARY)
            ),
            "white",
            false,
        );
        self.print_line(
            &format!(
                "Size: {} of {} expected, {} drained",
                report.totals.final_size, report.totals.expected_size, report.totals.drained
            ),
            "white",
            false,
        );
        self.print_line(&format!("Elapsed: {} ms", report.elapsed_ms), "bright_black", false);
        self.print_separator();
        self.print_check("size matches inserts", report.checks.size_matches);
        self.print_check("heap property holds", report.checks.heap_property);
        self.print_check("drains largest first", report.checks.drained_in_order);
        self.print_bottom();
        println!();
    }

    fn print_check(&self, label: &str, passed: bool) {
        let (mark, color) = if passed { ("✓", "green") } else { ("✗", "red") };
        self.print_line(&format!("{} {}", mark, label), color, !passed);
    }

    fn print_top(&self) {
        println!(
            "  {}{}{}",
            self.colorize(BOX_TL, "bright_black", false),
            self.colorize(&BOX_H.repeat(WIDTH), "bright_black", false),
            self.colorize(BOX_TR, "bright_black", false)
        );
    }

    fn print_separator(&self) {
        println!(
            "  {}{}{}",
            self.colorize(BOX_LT, "bright_black", false),
            self.colorize(&BOX_H.repeat(WIDTH), "bright_black", false),
            self.colorize(BOX_RT, "bright_black", false)
        );
    }

    fn print_bottom(&self) {
        println!(
            "  {}{}{}",
            self.colorize(BOX_BL, "bright_black", false),
            self.colorize(&BOX_H.repeat(WIDTH), "bright_black", false),
            self.colorize(BOX_BR, "bright_black", false)
        );
    }

    fn print_line(&self, text: &str, color: &str, bold: bool) {
        let text = fit(text, WIDTH - 2);
        let padding = WIDTH.saturating_sub(text.chars().count() + 2);
        println!(
            "  {} {}{} {}",
            self.colorize(BOX_V, "bright_black", false),
            self.colorize(&text, color, bold),
            " ".repeat(padding),
            self.colorize(BOX_V, "bright_black", false)
        );
    }

    fn colorize(&self, text: &str, color: &str, bold: bool) -> String {
        if !self.use_color {
            return text.to_string();
        }

        let colored = match color {
            "red" => text.red(),
            "green" => text.green(),
            "cyan" => text.cyan(),
            "white" => text.white(),
            "bright_black" => text.bright_black(),
            _ => text.normal(),
        };

        if bold {
            colored.bold().to_string()
        } else {
            colored.to_string()
        }
    }
}

/// Truncates `text` to `width` characters, marking the cut with "...".
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<R: Serialize>(
        &self,
        results: &R,
        output_file: Option<&std::path::Path>,
    ) -> io::Result<()> {
        let json = serde_json::to_string_pretty(results)?;

        if let Some(path) = output_file {
            std::fs::write(path, json)?;
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}
