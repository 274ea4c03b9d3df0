//! Report output
//!
//! One line per zone: `<zone_name> - <zone_id> - <rule_ids>`, with the rule
//! ids rendered as a bracketed list of quoted strings (`['r1', 'r2']`).

use std::io::{self, Write};

use crate::registry::{Registry, ZoneRecord};

/// Render rule ids as `[]`, `['r1']`, `['r1', 'r2']`.
pub fn format_rule_ids(rule_ids: &[String]) -> String {
    let items: Vec<String> = rule_ids.iter().map(|id| quote(id)).collect();
    format!("[{}]", items.join(", "))
}

// Single quotes unless the id contains one and no double quote. Backslashes,
// the chosen quote and control characters are escaped.
fn quote(id: &str) -> String {
    let delim = if id.contains('\'') && !id.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut quoted = String::with_capacity(id.len() + 2);
    quoted.push(delim);
    for c in id.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == delim => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if (c as u32) < 0x20 || c == '\x7f' => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delim);
    quoted
}

pub fn format_line(name: &str, record: &ZoneRecord) -> String {
    format!(
        "{} - {} - {}",
        name,
        record.zone_id,
        format_rule_ids(&record.rule_ids)
    )
}

/// Write every zone in registry order.
pub fn write_report<W: Write>(registry: &Registry, out: &mut W) -> io::Result<()> {
    for (name, record) in registry.iter() {
        writeln!(out, "{}", format_line(name, record))?;
    }
    Ok(())
}
