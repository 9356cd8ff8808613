/// Chunk builder: the top-level chunking pass over one source file.
///
/// A cursor walks the file once. Whole structural elements are consumed as
/// units when the cursor reaches their start line; modifier declarations are
/// skipped at top level and re-emitted inline with their owning functions;
/// everything else accumulates line by line under the token budget. Elements
/// that alone exceed the budget are handed to the mini-splitter and stand in
/// the output as placeholder chunks.
use tracing::warn;

use super::elements::{ModifierRef, StructuralElement};
use super::mini_split::MiniSplitter;
use super::ranges::LineRange;
use super::scan;
use super::{Accumulator, Chunk, ChunkSet};
use crate::tokenizer::{TokenCounter, TokenizerError};

/// Decide whether a modifier declaration travels with its owning element.
///
/// Prepend unless the modifier's lines are already present in the running
/// accumulator — and even then, still prepend when the element is going to
/// overflow the accumulator: it will start a fresh chunk or sub-chunk where
/// no prior modifier presence can be assumed.
#[must_use]
pub fn should_prepend_modifier(
    modifier: &LineRange,
    accumulated_indices: &[usize],
    element_overflows: bool,
) -> bool {
    if element_overflows {
        return true;
    }
    !modifier
        .lines()
        .any(|idx| accumulated_indices.contains(&idx))
}

/// Streams a source file into an ordered chunk list.
pub struct ChunkBuilder<'a, C: TokenCounter + ?Sized> {
    counter: &'a C,
    max_tokens: usize,
}

impl<'a, C: TokenCounter + ?Sized> ChunkBuilder<'a, C> {
    pub fn new(counter: &'a C, max_tokens: usize) -> Self {
        Self {
            counter,
            max_tokens,
        }
    }

    /// Chunk a whole file.
    ///
    /// `source_lines` are the file's 1-indexed lines; `elements` must be
    /// sorted ascending by start line with pairwise non-overlapping ranges.
    pub fn chunk_file(
        &self,
        source_lines: &[String],
        elements: &[StructuralElement],
    ) -> Result<ChunkSet, TokenizerError> {
        let total = source_lines.len();
        let mut set = ChunkSet::default();
        let mut acc = Accumulator::default();
        let mut cursor: usize = 1;
        let mut next_element: usize = 0;

        let used_modifiers: Vec<&ModifierRef> =
            elements.iter().flat_map(|e| e.modifiers.iter()).collect();

        while cursor <= total {
            let line = &source_lines[cursor - 1];

            // A new top-level declaration closes the running chunk, but only
            // once the accumulator holds a real body: flushing preamble that
            // never saw a closing brace would fragment meaninglessly.
            if scan::is_top_level_declaration(line)
                && !acc.is_empty()
                && scan::has_closing_brace(&acc.lines)
            {
                flush(&mut set, &mut acc);
            }

            // Modifier declarations are re-emitted inline with their owning
            // functions, never chunked as top-level content.
            if let Some(modifier) = used_modifiers.iter().find(|m| m.range.contains(cursor)) {
                cursor = modifier.range.end + 1;
                continue;
            }

            // An element whose start line the cursor has already passed can
            // only come from overlapping analyzer output; treat it as noise.
            while next_element < elements.len() && elements[next_element].range.start < cursor {
                warn!(
                    "element `{}` overlaps already-consumed lines, ignoring",
                    elements[next_element].name
                );
                next_element += 1;
            }

            if next_element < elements.len() && cursor == elements[next_element].range.start {
                let element = &elements[next_element];
                self.consume_element(element, source_lines, &mut acc, &mut set)?;
                cursor = element.range.end + 1;
                next_element += 1;
                continue;
            }

            let line_tokens = self.counter.count_tokens(line)?;
            if acc.token_count + line_tokens > self.max_tokens && !acc.is_empty() {
                flush(&mut set, &mut acc);
            }
            acc.push_counted(line.clone(), cursor, line_tokens);
            cursor += 1;
        }

        if !acc.is_empty() {
            flush(&mut set, &mut acc);
        }

        Ok(set)
    }

    /// Consume one structural element as a unit: prepend its modifiers where
    /// the decision rule says so, then place it whole (Case B/C) or
    /// mini-split it (Case A).
    fn consume_element(
        &self,
        element: &StructuralElement,
        source_lines: &[String],
        acc: &mut Accumulator,
        set: &mut ChunkSet,
    ) -> Result<(), TokenizerError> {
        let total = source_lines.len();
        let start = element.range.start;
        let end = element.range.end.min(total);

        let body_text = source_lines[start - 1..end].join("\n");
        let body_tokens = self.counter.count_tokens(&body_text)?;
        let element_overflows = acc.token_count + body_tokens > self.max_tokens;

        let mut element_buf = Accumulator::default();
        for modifier in &element.modifiers {
            if should_prepend_modifier(&modifier.range, &acc.line_indices, element_overflows) {
                for idx in modifier.range.lines() {
                    if idx <= total {
                        element_buf.push_line(source_lines[idx - 1].clone(), idx);
                    }
                }
            }
        }
        for idx in start..=end {
            element_buf.push_line(source_lines[idx - 1].clone(), idx);
        }
        element_buf.token_count = self.counter.count_tokens(&element_buf.joined())?;

        if element_buf.token_count > self.max_tokens {
            // Case A: the element alone busts the budget. Close the running
            // chunk, emit a placeholder, mini-split the content into orphan
            // sub-chunks tagged with the placeholder's id.
            if !acc.is_empty() {
                flush(set, acc);
            }
            let placeholder_id = set.next_id();
            let token_count = element_buf.token_count;
            let splitter = MiniSplitter::new(self.counter, self.max_tokens);
            let subs =
                splitter.split(&element_buf.lines, &element_buf.line_indices, placeholder_id)?;

            let union: Vec<usize> = subs
                .iter()
                .flat_map(|s| s.line_indices.iter().copied())
                .collect();
            set.chunks.push(Chunk {
                id: placeholder_id,
                lines: Vec::new(),
                line_indices: union,
                token_count,
                sub_chunks: Vec::new(),
            });
            set.orphan_sub_chunks.extend(subs);
        } else if acc.token_count + element_buf.token_count > self.max_tokens && !acc.is_empty() {
            // Case B: fits alone, not together. The element seeds the next
            // accumulator.
            flush(set, acc);
            *acc = element_buf;
        } else {
            // Case C: fits into the running chunk.
            acc.absorb(element_buf);
        }

        Ok(())
    }
}

fn flush(set: &mut ChunkSet, acc: &mut Accumulator) {
    let id = set.next_id();
    set.chunks.push(acc.take().into_chunk(id));
}
