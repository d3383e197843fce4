use analyzer::{GroupKey, WindowRanking};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use engine::RunOutput;

/// Prints the ALL-group ranking of each window, per-group statistics and the
/// leaderboards to stdout.
pub fn print_summary(output: &RunOutput, top_n: usize) {
    let summary = &output.summary;
    println!("Run {} as of {}", output.run_id, output.as_of);
    if summary.is_empty() {
        println!("No security produced a converged fit.");
        return;
    }

    for ranking in &summary.windows {
        println!(
            "\n{} ({} to {})",
            ranking.window.label, ranking.window.start, ranking.window.end
        );
        println!("{}", ranking_table(ranking, top_n));
        println!("{}", stats_table(ranking));
    }

    for board in &summary.leaders {
        let mut table = new_table(&["Rank", "Ticker", "Realized 1Y", "Category"]);
        for (rank, entry) in board.entries.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&entry.ticker),
                number(entry.realized, 4),
                Cell::new(&entry.category),
            ]);
        }
        println!("\nLeaders: {} / {}", board.kind, board.cap);
        println!("{table}");
    }
}

fn ranking_table(ranking: &WindowRanking, top_n: usize) -> Table {
    let mut table = new_table(&["Rank", "Ticker", "b", "R²", "Trend slope", "Realized"]);
    let Some(all) = ranking.group(&GroupKey::All) else {
        return table;
    };
    for (rank, entry) in all.entries.iter().take(top_n).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.ticker),
            number(entry.b, 4),
            number(entry.r_squared, 3),
            optional(entry.trend_slope, 4),
            optional(entry.realized, 4),
        ]);
    }
    table
}

fn stats_table(ranking: &WindowRanking) -> Table {
    let mut table = new_table(&[
        "Group", "Count", "Mean b", "Median b", "Std dev", "Min", "Max", "Mean trend",
    ]);
    for group in &ranking.groups {
        let stats = &group.stats;
        table.add_row(vec![
            Cell::new(&group.group),
            Cell::new(stats.count),
            number(stats.mean_b, 4),
            number(stats.median_b, 4),
            number(stats.std_dev_b, 4),
            number(stats.min_b, 4),
            number(stats.max_b, 4),
            optional(stats.mean_trend_slope, 4),
        ]);
    }
    table
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn number(value: f64, precision: usize) -> Cell {
    Cell::new(format!("{value:.precision$}")).set_alignment(CellAlignment::Right)
}

fn optional(value: Option<f64>, precision: usize) -> Cell {
    match value {
        Some(value) => number(value, precision),
        None => Cell::new("-").set_alignment(CellAlignment::Right),
    }
}
