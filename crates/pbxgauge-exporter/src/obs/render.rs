//! Prometheus text exposition (format 0.0.4).
//!
//! Output is sorted by metric name, then by label value, so two scrapes of an
//! unchanged registry are byte-identical. Families with no series are left out.

use std::fmt::Write;

use super::registry::RegistrySnapshot;

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

enum Block<'a> {
    Family(&'a super::registry::FamilySnapshot),
    Global(&'a super::registry::GlobalSample),
}

impl Block<'_> {
    fn name(&self) -> &'static str {
        match self {
            Block::Family(f) => f.name,
            Block::Global(g) => g.name,
        }
    }
}

pub fn render_text(snapshot: &RegistrySnapshot) -> String {
    let mut blocks: Vec<Block<'_>> = snapshot
        .families
        .iter()
        .filter(|f| !f.samples.is_empty())
        .map(Block::Family)
        .chain(snapshot.globals.iter().map(Block::Global))
        .collect();
    blocks.sort_by_key(|b| b.name());

    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Family(f) => {
                let _ = writeln!(out, "# HELP {} {}", f.name, escape_help(f.help));
                let _ = writeln!(out, "# TYPE {} gauge", f.name);
                for s in &f.samples {
                    let _ = writeln!(
                        out,
                        "{}{{{}=\"{}\"}} {}",
                        f.name,
                        f.label_key,
                        escape_label(&s.label),
                        s.value
                    );
                }
            }
            Block::Global(g) => {
                let _ = writeln!(out, "# HELP {} {}", g.name, escape_help(g.help));
                let _ = writeln!(out, "# TYPE {} gauge", g.name);
                let _ = writeln!(out, "{} {}", g.name, g.value);
            }
        }
    }
    out
}
