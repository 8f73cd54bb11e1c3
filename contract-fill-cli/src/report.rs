//! Plain-text reports printed to stdout.

use contract_fill::{
    check, progress, ContractDefinition, ContractState, ContractSummary, Deficiencies,
    FieldValue, Readiness,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Widest value shown by [`values_report`].
const VALUE_WIDTH: usize = 40;

/// Catalog listing for `types` and for ambiguous intents.
pub fn types_table(summaries: &[ContractSummary]) -> String {
    let code_width = summaries.iter().map(|s| s.code.width()).max().unwrap_or(0);
    let name_width = summaries.iter().map(|s| s.name.width()).max().unwrap_or(0);
    let indent = " ".repeat(code_width + 2);

    let mut lines = Vec::new();
    for s in summaries {
        lines.push(format!(
            "{}  {}  {}  {} 项",
            pad(&s.code, code_width),
            pad(&s.name, name_width),
            s.standard_code,
            s.field_count
        ));
        if !s.description.is_empty() {
            lines.push(format!("{}{}", indent, s.description));
        }
        if !s.parties.is_empty() {
            lines.push(format!("{}当事人：{}", indent, s.parties.join(" / ")));
        }
    }
    finish(lines)
}

/// Overall and per-group progress, followed by the next group to collect.
pub fn progress_report(def: &ContractDefinition, state: &ContractState, limit: usize) -> String {
    let report = progress(def, state);
    let mut lines = Vec::new();

    lines.push(format!("{}（{}）第 {} 版", def.name(), def.code(), state.revision()));
    lines.push(format!(
        "已完成 {}/{}（{}%），其中跳过 {} 项",
        report.set + report.skipped,
        report.total,
        report.percentage(),
        report.skipped
    ));

    let width = report.groups.iter().map(|g| g.group.width()).max().unwrap_or(0);
    for g in &report.groups {
        let mark = if g.resolved == g.total { "x" } else { " " };
        lines.push(format!("  [{}] {} {}/{}", mark, pad(&g.group, width), g.resolved, g.total));
    }

    let skipped: Vec<&str> = def
        .fields()
        .iter()
        .filter(|f| state.get(&f.name) == Some(&FieldValue::Skipped))
        .map(|f| f.name.as_str())
        .collect();
    if !skipped.is_empty() {
        lines.push(format!("已跳过：{}", join_limited(&skipped, limit)));
    }

    match check(def, state) {
        Readiness::Ready => lines.push("全部字段已就绪，可以生成合同。".to_string()),
        Readiness::Incomplete(deficiencies) => {
            if let Some(next) = deficiencies.next_group() {
                lines.push(format!("下一组：{}", next.group));
                if !next.ask.is_empty() {
                    lines.push(next.ask.clone());
                }
                push_fields(&mut lines, &next.fields, limit);
            }
        }
    }
    finish(lines)
}

/// Every unresolved field, grouped in collection order.
pub fn deficiency_report(deficiencies: &Deficiencies, limit: usize) -> String {
    let mut lines = vec![format!("尚有 {} 项未填写", deficiencies.len())];
    for group in &deficiencies.groups {
        if group.ask.is_empty() {
            lines.push(format!("[{}] {}", group.priority, group.group));
        } else {
            lines.push(format!("[{}] {}：{}", group.priority, group.group, group.ask));
        }
        push_fields(&mut lines, &group.fields, limit);
    }
    finish(lines)
}

/// Values collected so far, unset fields omitted.
pub fn values_report(def: &ContractDefinition, state: &ContractState) -> String {
    let listed = |name: &str| !matches!(state.get(name), None | Some(FieldValue::Unset));
    let width = def
        .fields()
        .iter()
        .filter(|f| listed(&f.name))
        .map(|f| f.name.width())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for group in def.groups() {
        let names: Vec<&String> = group.fields.iter().filter(|name| listed(name)).collect();
        if names.is_empty() {
            continue;
        }
        lines.push(format!("[{}]", group.name));
        for name in names {
            let shown = match state.get(name) {
                Some(FieldValue::Set(value)) => truncate(value.display(), VALUE_WIDTH),
                _ => "（已跳过）".to_string(),
            };
            lines.push(format!("  {}  {}", pad(name, width), shown));
        }
    }
    finish(lines)
}

fn push_fields(lines: &mut Vec<String>, fields: &[String], limit: usize) {
    lines.extend(fields.iter().take(limit).map(|name| format!("  - {}", name)));
    if fields.len() > limit {
        lines.push(format!("  ... 另有 {} 项", fields.len() - limit));
    }
}

fn join_limited(names: &[&str], limit: usize) -> String {
    let joined = names.iter().take(limit).copied().collect::<Vec<_>>().join(", ");
    if names.len() > limit {
        format!("{} ... 另有 {} 项", joined, names.len() - limit)
    } else {
        joined
    }
}

/// One line per entry, each ending in a newline.
fn finish(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Left-align `s` to `width` terminal columns.
fn pad(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

/// Cut `s` to at most `max` columns on a grapheme boundary, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut lines = Vec::new();
    let mut used = 0;
    for grapheme in s.graphemes(true) {
        let w = grapheme.width();
        if used + w > max.saturating_sub(1) {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push('…');
    finish(lines)
}
