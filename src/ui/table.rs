use std::{fmt::Write, num::NonZeroU32};

use crate::domain::RankedRecipe;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Renders ranked recipes as a boxed ASCII table. Rows are printed in the order given.
pub fn render_table(rows: &[RankedRecipe], slots: NonZeroU32) -> String {
    let headers = [
        "ItemID".to_string(),
        "Cost".to_string(),
        "Profit per hour".to_string(),
        "Profit".to_string(),
        "Time".to_string(),
        format!("Profit for {slots} slots per hour"),
        "Total cost".to_string(),
        "Total profit".to_string(),
        "HOTM req".to_string(),
    ];
    let aligns = [
        Align::Left,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
    ];

    let cells: Vec<[String; 9]> = rows.iter().map(row_cells).collect();

    let mut widths = headers.clone().map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let separator = separator_line(&widths);
    out.push_str(&separator);
    push_row(&mut out, &headers, &widths, &[Align::Left; 9]);
    out.push_str(&separator);
    for row in &cells {
        push_row(&mut out, row, &widths, &aligns);
    }
    if cells.is_empty() {
        let inner = widths.iter().map(|w| w + 3).sum::<usize>() - 1;
        let _ = writeln!(out, "| {:<width$}|", "No unlocked recipes", width = inner - 1);
    }
    out.push_str(&separator);
    out
}

fn row_cells(row: &RankedRecipe) -> [String; 9] {
    [
        row.item_id.clone(),
        format_coins(row.cost),
        format_coins(row.profit_per_hour),
        format_coins(row.profit_total),
        format!("{}h", row.time_hours),
        format_coins(row.profit_per_hour_for_slots),
        format_coins(row.cost_for_slots),
        format_coins(row.profit_total_for_slots),
        row.hotm_requirement.to_string(),
    ]
}

fn separator_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize], aligns: &[Align]) {
    out.push('|');
    for ((cell, &width), align) in cells.iter().zip(widths).zip(aligns) {
        let _ = match align {
            Align::Left => write!(out, " {cell:<width$} |"),
            Align::Right => write!(out, " {cell:>width$} |"),
        };
    }
    out.push('\n');
}

/// Groups digits in threes, English style: `1234567` -> `1,234,567`.
pub fn format_coins(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item_id: &str, profit_per_hour: i64) -> RankedRecipe {
        RankedRecipe {
            item_id: item_id.to_string(),
            cost: 1_234_567,
            profit_per_hour,
            profit_total: -4_200,
            time_hours: 12,
            hotm_requirement: 4,
            cost_for_slots: 2_469_134,
            profit_per_hour_for_slots: profit_per_hour * 2,
            profit_total_for_slots: -8_400,
        }
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_coins(0), "0");
        assert_eq!(format_coins(999), "999");
        assert_eq!(format_coins(1_000), "1,000");
        assert_eq!(format_coins(1_234_567), "1,234,567");
        assert_eq!(format_coins(-1_234), "-1,234");
        assert_eq!(format_coins(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn renders_rows_in_given_order() {
        let slots = NonZeroU32::new(2).unwrap();
        let table = render_table(&[row("TITANIUM_DRILL_1", 90_000), row("FUEL_TANK", 500)], slots);

        let first = table.find("TITANIUM_DRILL_1").unwrap();
        let second = table.find("FUEL_TANK").unwrap();
        assert!(first < second);
        assert!(table.contains("Profit for 2 slots per hour"));
        assert!(table.contains("1,234,567"));
        assert!(table.contains("180,000"));
        assert!(table.contains("12h"));
    }

    #[test]
    fn lines_share_one_width() {
        let slots = NonZeroU32::new(1).unwrap();
        for rows in [vec![row("A", 1), row("LONGER_ITEM_NAME", -50)], Vec::new()] {
            let table = render_table(&rows, slots);
            let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
            assert!(widths.windows(2).all(|w| w[0] == w[1]), "{table}");
        }
    }
}
