/// Mini-splitter: decomposes one oversized structural element into
/// budget-respecting sub-chunks.
///
/// The input is the element's flattened lines (prepended modifier
/// declarations plus the body, in source order). A single pass groups lines
/// into logical blocks using brace balance, keeps `if`/`try` chains together
/// with their `else`/`catch` continuations, and packs closed blocks into
/// sub-chunks as close to the budget as possible. A block that alone exceeds
/// the budget is emitted whole: the engine never splits mid-statement, and an
/// over-budget indivisible block is a normal output, not an error.
use super::scan::{self, LineKind};
use super::{Accumulator, SubChunk};
use crate::tokenizer::{TokenCounter, TokenizerError};

/// Scanner mode for the line-by-line pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Before the element's opening brace: parameter lists, inheritance
    /// lists and the brace line itself are inert.
    PreBody,
    /// Inside the body, tracking brace balance.
    Body,
    /// Inside a modifier declaration block.
    Modifier,
}

/// Splits a single over-budget element. Sub-chunking is single-level: an
/// emitted sub-chunk is never re-split, even if it remains over budget.
pub struct MiniSplitter<'a, C: TokenCounter + ?Sized> {
    counter: &'a C,
    max_tokens: usize,
}

impl<'a, C: TokenCounter + ?Sized> MiniSplitter<'a, C> {
    pub fn new(counter: &'a C, max_tokens: usize) -> Self {
        Self {
            counter,
            max_tokens,
        }
    }

    /// Split `lines` into ordered sub-chunks jointly covering every input
    /// line exactly once.
    ///
    /// `line_indices` carries the absolute source line number of each input
    /// line (same length as `lines`); prepended modifier declarations keep
    /// their own original numbers. All emitted sub-chunks carry
    /// `parent_chunk_id`.
    pub fn split(
        &self,
        lines: &[String],
        line_indices: &[usize],
        parent_chunk_id: usize,
    ) -> Result<Vec<SubChunk>, TokenizerError> {
        debug_assert_eq!(lines.len(), line_indices.len());
        let mut sub_chunks = Vec::new();
        let mut acc = Accumulator::default();
        let mut block = Accumulator::default();
        let mut state = ScanState::PreBody;
        let mut balance: i32 = 0;
        let mut cohesion = false;

        for (line, &index) in lines.iter().zip(line_indices) {
            let line_tokens = self.counter.count_tokens(line)?;
            let kind = scan::classify(line);

            if kind == LineKind::ModifierDecl {
                state = ScanState::Modifier;
                balance = 0;
            }

            match state {
                ScanState::Modifier => {
                    block.push_counted(line.clone(), index, line_tokens);
                    balance += scan::brace_delta(line);
                    if balance == 0 && kind != LineKind::ModifierDecl {
                        // Balance back to zero past the declaration line:
                        // the modifier block stands alone.
                        sub_chunks.push(block.take().into_sub_chunk(parent_chunk_id));
                        state = ScanState::PreBody;
                    }
                }
                ScanState::PreBody => {
                    block.push_counted(line.clone(), index, line_tokens);
                    if line.contains('{') {
                        // The opening brace is structural and stays inert;
                        // balance counting starts on the next line.
                        state = ScanState::Body;
                    }
                }
                ScanState::Body => {
                    block.push_counted(line.clone(), index, line_tokens);
                    balance += scan::brace_delta(line);

                    match kind {
                        LineKind::ControlOpener => cohesion = true,
                        LineKind::ControlContinuation if cohesion => {}
                        _ => {
                            if cohesion && balance == 0 {
                                cohesion = false;
                            }
                        }
                    }

                    if balance == 0 && !cohesion {
                        self.close_block(&mut acc, &mut block, &mut sub_chunks, parent_chunk_id);
                    }
                }
            }
        }

        // Trailing lines: merge into the accumulator when they still fit,
        // otherwise emit separately.
        if !block.is_empty() {
            if !acc.is_empty() && acc.token_count + block.token_count <= self.max_tokens {
                acc.absorb(block.take());
            } else {
                if !acc.is_empty() {
                    sub_chunks.push(acc.take().into_sub_chunk(parent_chunk_id));
                }
                sub_chunks.push(block.take().into_sub_chunk(parent_chunk_id));
            }
        }
        if !acc.is_empty() {
            sub_chunks.push(acc.into_sub_chunk(parent_chunk_id));
        }

        Ok(sub_chunks)
    }

    /// A logical block just closed: pack it against the open accumulator.
    fn close_block(
        &self,
        acc: &mut Accumulator,
        block: &mut Accumulator,
        sub_chunks: &mut Vec<SubChunk>,
        parent_chunk_id: usize,
    ) {
        if block.token_count > self.max_tokens {
            // Indivisible and over budget: accepted whole.
            if !acc.is_empty() {
                sub_chunks.push(acc.take().into_sub_chunk(parent_chunk_id));
            }
            sub_chunks.push(block.take().into_sub_chunk(parent_chunk_id));
        } else if acc.token_count + block.token_count <= self.max_tokens {
            acc.absorb(block.take());
        } else {
            if !acc.is_empty() {
                sub_chunks.push(acc.take().into_sub_chunk(parent_chunk_id));
            }
            *acc = block.take();
        }
    }
}
