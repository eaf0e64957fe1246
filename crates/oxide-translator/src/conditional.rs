//! Conditional block processing for `%if` / `%else` / `%end`.
//!
//! Blocks nest. Once a branch is suppressed, everything up to the matching
//! `%else` or `%end` is masked; blocks opened inside a masked region are
//! tracked so their `%end`s pair up, but they never toggle emission.

use tracing::trace;

use crate::error::TranslateIssue;

/// One open `%if` block.
#[derive(Debug, Clone, Copy)]
struct Block {
    /// Whether one of the block's branches has been emitted already.
    taken: bool,
}

/// Nesting and masking state of one translation.
#[derive(Debug, Clone, Default)]
pub struct ConditionalState {
    blocks: Vec<Block>,
    /// Depth at which masking started; zero while active.
    mask_start: usize,
    masked_regions: usize,
}

impl ConditionalState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true while inside a suppressed branch.
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.mask_start != 0
    }

    /// Returns how many masked regions have been opened so far.
    #[must_use]
    pub const fn masked_regions(&self) -> usize {
        self.masked_regions
    }

    fn mask(&mut self) {
        self.mask_start = self.depth();
        self.masked_regions += 1;
        trace!(depth = self.mask_start, "masking conditional branch");
    }

    fn unmask(&mut self) {
        trace!(depth = self.mask_start, "conditional branch active");
        self.mask_start = 0;
    }

    /// Masking started at the innermost open block.
    fn masked_here(&self) -> bool {
        self.is_masked() && self.mask_start == self.depth()
    }

    /// Handles `%if <condition>`.
    pub fn open(&mut self, condition: bool) {
        let outer_masked = self.is_masked();
        self.blocks.push(Block {
            taken: outer_masked || condition,
        });
        if !outer_masked && !condition {
            self.mask();
        }
    }

    /// Handles a plain `%else`.
    ///
    /// # Errors
    ///
    /// Returns an issue if no block is open.
    pub fn otherwise(&mut self) -> Result<(), TranslateIssue> {
        let block = self.innermost("else")?;
        if self.masked_here() {
            if !block.taken {
                self.set_taken();
                self.unmask();
            }
        } else if !self.is_masked() {
            self.mask();
        }
        Ok(())
    }

    /// Handles `%else %if <condition>`.
    ///
    /// # Errors
    ///
    /// Returns an issue if no block is open.
    pub fn otherwise_if(&mut self, condition: bool) -> Result<(), TranslateIssue> {
        let block = self.innermost("else")?;
        if self.masked_here() {
            if !block.taken && condition {
                self.set_taken();
                self.unmask();
            }
        } else if !self.is_masked() {
            self.mask();
        }
        Ok(())
    }

    /// Handles `%end`.
    ///
    /// # Errors
    ///
    /// Returns an issue if no block is open.
    pub fn close(&mut self) -> Result<(), TranslateIssue> {
        self.innermost("end")?;
        if self.masked_here() {
            self.unmask();
        }
        self.blocks.pop();
        Ok(())
    }

    /// Closes every block left open at the end of the stream. A missing
    /// final `%end` is not an error.
    pub fn finish(&mut self) {
        if !self.blocks.is_empty() {
            trace!(open = self.blocks.len(), "closing open conditional blocks");
        }
        self.blocks.clear();
        self.mask_start = 0;
    }

    fn innermost(&self, keyword: &str) -> Result<Block, TranslateIssue> {
        self.blocks
            .last()
            .copied()
            .ok_or_else(|| TranslateIssue::UnexpectedKeyword(String::from(keyword)))
    }

    fn set_taken(&mut self) {
        if let Some(block) = self.blocks.last_mut() {
            block.taken = true;
        }
    }
}
