/// Structural-element metadata from the external static analyzer.
///
/// The analyzer emits one JSONL record per contract, listing functions and
/// constructors with `"start-end"` line ranges and the modifiers each one
/// applies. The engine treats this as read-only input: elements with
/// unresolvable ranges are noise and are dropped, not errors.
use serde::Deserialize;
use tracing::warn;

use super::ranges::LineRange;

fn default_unknown() -> String {
    "unknown".to_string()
}

/// Raw per-contract record as found in the metadata JSONL.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractRecord {
    pub file: String,
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// One structural element as emitted by the analyzer.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    #[serde(default = "default_unknown")]
    pub full_name: String,
    pub lines: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub modifiers: Vec<RawModifier>,
}

/// A modifier applied to an element, with its declaration range.
#[derive(Debug, Clone, Deserialize)]
pub struct RawModifier {
    pub name: String,
    pub lines: String,
}

/// A resolved structural element ready for chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralElement {
    pub name: String,
    pub range: LineRange,
    pub modifiers: Vec<ModifierRef>,
}

/// Line range of a modifier's declaration (not its call site).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierRef {
    pub name: String,
    pub range: LineRange,
}

/// Resolve raw analyzer output into sorted structural elements.
///
/// Elements or modifiers whose range strings do not parse are skipped with a
/// warning; the file is still chunked without their special handling. The
/// result is sorted ascending by start line (the analyzer deduplicates by
/// range identity upstream, but ordering is re-established here).
#[must_use]
pub fn resolve_elements(raw: &[RawElement]) -> Vec<StructuralElement> {
    let mut elements = Vec::with_capacity(raw.len());

    for el in raw {
        let range: LineRange = match el.lines.parse() {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping element `{}`: {e}", el.full_name);
                continue;
            }
        };

        let mut modifiers = Vec::with_capacity(el.modifiers.len());
        for m in &el.modifiers {
            match m.lines.parse() {
                Ok(r) => modifiers.push(ModifierRef {
                    name: m.name.clone(),
                    range: r,
                }),
                Err(e) => warn!("skipping modifier `{}` on `{}`: {e}", m.name, el.full_name),
            }
        }

        elements.push(StructuralElement {
            name: el.full_name.clone(),
            range,
            modifiers,
        });
    }

    elements.sort_by_key(|e| e.range.start);
    elements
}
