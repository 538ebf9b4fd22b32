//! DEFLATE compression engine (RFC 1951).
//!
//! A streaming compressor in the zlib mould: input flows through a 32 KiB
//! sliding window, the match finder turns it into literals and
//! back-references, the Huffman coder packs them into blocks, and the caller
//! drains finished bytes from the pending buffer between calls.

use crate::bits::BitWriter;
use crate::compress::adler32::Adler32;
use crate::compress::huffman::{HuffmanCoder, MAX_STORED_BLOCK};
use crate::compress::lz77::{
    MatchFinder, MAX_DIST, MIN_LOOKAHEAD, MIN_MATCH, WINDOW_SIZE, WSIZE,
};
use crate::error::{Error, Result};

/// Minimum-length matches further back than this cost more to encode than
/// the literals they replace.
const TOO_FAR: usize = 4096;

/// zlib stream header constants: CM=8 is DEFLATE, CINFO=7 a 32 KiB window.
const CM_DEFLATE: u8 = 8;
const CINFO_32K: u8 = 7;

/// Matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Full literal and match search.
    #[default]
    Default,
    /// For filtered data (small values with a random component): only keep
    /// longer matches, favouring literal statistics.
    Filtered,
    /// Huffman coding only; no match search at all.
    HuffmanOnly,
}

/// The closed set of compression functions: level 0 stores, levels 1-3
/// favour speed, levels 4-9 trade chain depth for ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompressionFunction {
    Stored,
    Fast,
    Slow,
}

/// Per-level matching parameters.
#[derive(Debug, Clone, Copy)]
struct LevelConfig {
    /// Reduce chain effort once a match of this length is in hand.
    good_length: usize,
    /// Fast: longest match still worth per-byte hash insertion.
    /// Slow: longest deferred match that still allows a lazy search.
    max_lazy: usize,
    /// Stop searching once a match of this length is found.
    nice_length: usize,
    /// Hash chain links to follow per search.
    max_chain: usize,
    func: CompressionFunction,
}

/// The zlib canonical level table.
const LEVEL_CONFIG: [LevelConfig; 10] = [
    LevelConfig { good_length: 0, max_lazy: 0, nice_length: 0, max_chain: 0, func: CompressionFunction::Stored },
    LevelConfig { good_length: 4, max_lazy: 4, nice_length: 8, max_chain: 4, func: CompressionFunction::Fast },
    LevelConfig { good_length: 4, max_lazy: 5, nice_length: 16, max_chain: 8, func: CompressionFunction::Fast },
    LevelConfig { good_length: 4, max_lazy: 6, nice_length: 32, max_chain: 32, func: CompressionFunction::Fast },
    LevelConfig { good_length: 4, max_lazy: 4, nice_length: 16, max_chain: 16, func: CompressionFunction::Slow },
    LevelConfig { good_length: 8, max_lazy: 16, nice_length: 32, max_chain: 32, func: CompressionFunction::Slow },
    LevelConfig { good_length: 8, max_lazy: 16, nice_length: 128, max_chain: 128, func: CompressionFunction::Slow },
    LevelConfig { good_length: 8, max_lazy: 32, nice_length: 128, max_chain: 256, func: CompressionFunction::Slow },
    LevelConfig { good_length: 32, max_lazy: 128, nice_length: 258, max_chain: 1024, func: CompressionFunction::Slow },
    LevelConfig { good_length: 32, max_lazy: 258, nice_length: 258, max_chain: 4096, func: CompressionFunction::Slow },
];

/// Cumulative compression statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeflateStats {
    /// Uncompressed bytes consumed.
    pub bytes_in: u64,
    /// Compressed bytes drained by the caller.
    pub bytes_out: u64,
    /// Stored blocks emitted.
    pub stored_blocks: u64,
    /// Static-Huffman blocks emitted.
    pub static_blocks: u64,
    /// Dynamic-Huffman blocks emitted.
    pub dynamic_blocks: u64,
}

/// Streaming DEFLATE compressor.
///
/// Feed input with [`set_input`](Deflater::set_input), call
/// [`deflate`](Deflater::deflate) until it reports no further progress, and
/// drain output with [`flush_output`](Deflater::flush_output) between calls.
/// The emitted stream is raw DEFLATE; the zlib header and Adler-32 trailer
/// belong to the wrapper (see [`deflate_zlib`]), which reads
/// [`adler`](Deflater::adler) for the trailer.
#[derive(Debug)]
pub struct Deflater {
    finder: MatchFinder,
    huffman: HuffmanCoder,
    pending: BitWriter,
    adler: Adler32,
    input: Vec<u8>,
    input_off: usize,
    total_in: u64,
    total_out: u64,
    level: u8,
    config: LevelConfig,
    strategy: Strategy,
    /// Slow strategy only: a literal at `strstart - 1` is deferred for lazy
    /// evaluation.
    prev_available: bool,
    finished: bool,
}

impl Deflater {
    /// Create a compressor for the given level (0-9).
    pub fn new(level: u8) -> Result<Self> {
        Self::with_strategy(level, Strategy::Default)
    }

    /// Create a compressor with an explicit matching strategy.
    pub fn with_strategy(level: u8, strategy: Strategy) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidLevel(level));
        }
        Ok(Self {
            finder: MatchFinder::new(),
            huffman: HuffmanCoder::new(),
            pending: BitWriter::new(),
            adler: Adler32::new(),
            input: Vec::new(),
            input_off: 0,
            total_in: 0,
            total_out: 0,
            level,
            config: LEVEL_CONFIG[level as usize],
            strategy,
            prev_available: false,
            finished: false,
        })
    }

    /// Hand the engine its next slice of input.
    ///
    /// Fails with [`Error::InputPending`] while previous input is
    /// unconsumed, and with [`Error::BufferRange`] when `offset`/`count` do
    /// not fit `buf` (including `offset + count` overflow).
    pub fn set_input(&mut self, buf: &[u8], offset: usize, count: usize) -> Result<()> {
        if self.input_off < self.input.len() {
            return Err(Error::InputPending);
        }
        let end = match offset.checked_add(count) {
            Some(end) if end <= buf.len() => end,
            _ => {
                return Err(Error::BufferRange {
                    offset,
                    count,
                    len: buf.len(),
                })
            }
        };
        self.input.clear();
        self.input.extend_from_slice(&buf[offset..end]);
        self.input_off = 0;
        Ok(())
    }

    /// True when all provided input has been consumed.
    pub fn needs_input(&self) -> bool {
        self.input_off == self.input.len()
    }

    /// Prime the window with a preset dictionary.
    ///
    /// The whole dictionary enters the checksum; only its last
    /// [`MAX_DIST`] bytes become match history. Must be called before any
    /// input is compressed.
    pub fn set_dictionary(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()> {
        let end = match offset.checked_add(len) {
            Some(end) if end <= buf.len() => end,
            _ => {
                return Err(Error::BufferRange {
                    offset,
                    count: len,
                    len: buf.len(),
                })
            }
        };
        if self.total_in != 0 || self.finder.strstart != 1 {
            return Err(Error::DictionaryAfterData);
        }

        let mut dict = &buf[offset..end];
        self.adler.update(dict);
        if dict.len() > MAX_DIST {
            dict = &dict[dict.len() - MAX_DIST..];
        }
        if dict.len() < MIN_MATCH {
            return Ok(());
        }

        let start = self.finder.strstart;
        self.finder.window[start..start + dict.len()].copy_from_slice(dict);
        self.finder.rehash();
        // Seed the chain at every position with three in-dictionary bytes,
        // then step over the final two to sit at the dictionary's end.
        for _ in 0..dict.len() - 2 {
            self.finder.insert_string(self.finder.strstart);
            self.finder.strstart += 1;
        }
        self.finder.strstart += 2;
        self.finder.block_start = self.finder.strstart as i64;
        Ok(())
    }

    /// Change the compression level mid-stream.
    ///
    /// Switching to a different compression function first closes the
    /// current block (never as the last one) under the old function's rules;
    /// a deferred lazy literal is tallied into that block.
    pub fn set_level(&mut self, level: u8) -> Result<()> {
        if level > 9 {
            return Err(Error::InvalidLevel(level));
        }
        let new = LEVEL_CONFIG[level as usize];
        if new.func != self.config.func && self.has_pending_block() {
            if self.config.func == CompressionFunction::Slow && self.prev_available {
                let byte = self.finder.window[self.finder.strstart - 1];
                self.huffman.tally_lit(byte);
                self.prev_available = false;
            }
            match self.config.func {
                CompressionFunction::Stored => {
                    self.finder.strstart += self.finder.lookahead;
                    self.finder.lookahead = 0;
                    loop {
                        let stored = (self.finder.strstart as i64 - self.finder.block_start) as usize;
                        if stored == 0 {
                            break;
                        }
                        let start = self.finder.block_start as usize;
                        let len = stored.min(MAX_STORED_BLOCK);
                        self.huffman.flush_stored_block(
                            &self.finder.window[start..start + len],
                            false,
                            &mut self.pending,
                        );
                        self.finder.block_start += len as i64;
                    }
                }
                _ => self.flush_block(false),
            }
        }
        self.level = level;
        self.config = new;
        Ok(())
    }

    /// Change the matching strategy. Takes effect from the next match
    /// decision.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// Return to the just-constructed state, keeping level and strategy.
    pub fn reset(&mut self) {
        self.finder.reset();
        self.huffman.reset();
        self.pending.clear();
        self.adler.reset();
        self.input.clear();
        self.input_off = 0;
        self.total_in = 0;
        self.total_out = 0;
        self.prev_available = false;
        self.finished = false;
    }

    /// The running Adler-32 over all consumed input (and dictionary) bytes.
    pub fn adler(&self) -> u32 {
        self.adler.value()
    }

    /// Restore the checksum's initial value without touching other state.
    pub fn reset_adler(&mut self) {
        self.adler.reset();
    }

    /// Total uncompressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// The active compression level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// The active matching strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Cumulative statistics. `bytes_out` counts drained bytes, so it is
    /// complete once the stream is finished and fully drained.
    pub fn stats(&self) -> DeflateStats {
        DeflateStats {
            bytes_in: self.total_in,
            bytes_out: self.total_out,
            stored_blocks: self.huffman.stored_blocks(),
            static_blocks: self.huffman.static_blocks(),
            dynamic_blocks: self.huffman.dynamic_blocks(),
        }
    }

    /// True when no compressed bytes are waiting to be drained.
    pub fn is_flushed(&self) -> bool {
        self.pending.is_flushed()
    }

    /// Compressed bytes waiting to be drained.
    pub fn pending_output(&self) -> usize {
        self.pending.pending()
    }

    /// Drain up to `out.len()` compressed bytes. Returns the count copied.
    pub fn flush_output(&mut self, out: &mut [u8]) -> usize {
        let n = self.pending.flush_into(out);
        self.total_out += n as u64;
        n
    }

    /// Run the compressor: fill the window from the input, dispatch to the
    /// active compression function, and repeat while the pending buffer
    /// stays empty and progress is possible.
    ///
    /// With `flush` set, all buffered symbols are forced out once the input
    /// is consumed; with `finish` also set, the emitted block is marked
    /// final (level 0 may need one more call after a truncated slab).
    /// Returns the last progress flag: false once nothing more can be done
    /// without new input, or after the final block.
    pub fn deflate(&mut self, flush: bool, finish: bool) -> bool {
        if self.finished {
            return false;
        }
        let mut progress;
        loop {
            self.fill_window();
            let can_flush = flush && self.input_off == self.input.len();
            progress = match self.config.func {
                CompressionFunction::Stored => self.deflate_stored(can_flush, finish),
                CompressionFunction::Fast => self.deflate_fast(can_flush, finish),
                CompressionFunction::Slow => self.deflate_slow(can_flush, finish),
            };
            if !(self.pending.is_flushed() && progress) {
                break;
            }
        }
        progress
    }

    /// Slide the window if needed, then copy input into the lookahead until
    /// it reaches [`MIN_LOOKAHEAD`] or the input runs dry. Consumed bytes
    /// feed the checksum and the byte counter as they enter the window.
    fn fill_window(&mut self) {
        loop {
            if self.finder.strstart >= WSIZE + MAX_DIST {
                self.finder.slide();
            }
            if self.input_off == self.input.len() || self.finder.lookahead >= MIN_LOOKAHEAD {
                break;
            }
            let dst = self.finder.strstart + self.finder.lookahead;
            let free = WINDOW_SIZE - dst;
            let n = free.min(self.input.len() - self.input_off);
            if n == 0 {
                break;
            }
            let src = &self.input[self.input_off..self.input_off + n];
            self.finder.window[dst..dst + n].copy_from_slice(src);
            self.adler.update(src);
            self.total_in += n as u64;
            self.input_off += n;
            self.finder.lookahead += n;
        }
        if self.finder.lookahead >= MIN_MATCH {
            self.finder.rehash();
        }
    }

    /// Close the current block, choosing the cheapest representation, and
    /// re-anchor `block_start`.
    fn flush_block(&mut self, is_last: bool) {
        let stored_len = (self.finder.strstart as i64 - self.finder.block_start).max(0) as usize;
        let stored: Option<&[u8]> = if self.finder.block_start >= 0 {
            let start = self.finder.block_start as usize;
            Some(&self.finder.window[start..start + stored_len])
        } else {
            // The block's first bytes slid out of the window
            None
        };
        self.huffman.flush_block(stored, is_last, &mut self.pending);
        self.finder.block_start = self.finder.strstart as i64;
        if is_last {
            self.finished = true;
        }
    }

    /// Level 0: pass bytes through in stored blocks.
    ///
    /// A slab is emitted when it reaches [`MAX_STORED_BLOCK`], when it is
    /// about to slide out of the window, or on flush. A slab truncated at
    /// the size limit withholds the final-block flag even under `finish`;
    /// the remainder (possibly empty) goes out on the next call.
    fn deflate_stored(&mut self, can_flush: bool, finish: bool) -> bool {
        self.finder.strstart += self.finder.lookahead;
        self.finder.lookahead = 0;
        debug_assert!(self.finder.block_start >= 0);

        let stored = (self.finder.strstart as i64 - self.finder.block_start) as usize;
        let start = self.finder.block_start as usize;

        if stored >= MAX_STORED_BLOCK
            || (self.finder.block_start < WSIZE as i64 && stored >= MAX_DIST)
        {
            let len = stored.min(MAX_STORED_BLOCK);
            let truncated = len < stored;
            let last = finish && can_flush && !truncated;
            self.huffman.flush_stored_block(
                &self.finder.window[start..start + len],
                last,
                &mut self.pending,
            );
            self.finder.block_start += len as i64;
            if last {
                self.finished = true;
                return false;
            }
            return true;
        }

        if can_flush {
            self.huffman.flush_stored_block(
                &self.finder.window[start..start + stored],
                finish,
                &mut self.pending,
            );
            self.finder.block_start = self.finder.strstart as i64;
            if finish {
                self.finished = true;
            }
            return false;
        }

        self.input_off < self.input.len()
    }

    /// Levels 1-3: take every acceptable match immediately.
    fn deflate_fast(&mut self, can_flush: bool, finish: bool) -> bool {
        loop {
            if self.finder.lookahead < MIN_LOOKAHEAD && !can_flush {
                return self.input_off < self.input.len();
            }
            if self.finder.lookahead == 0 {
                self.flush_block(finish);
                return false;
            }
            if self.finder.strstart > WINDOW_SIZE - MIN_LOOKAHEAD {
                self.finder.slide();
            }

            let mut hash_head = 0u16;
            if self.finder.lookahead >= MIN_MATCH {
                hash_head = self.finder.insert_string(self.finder.strstart);
            }

            let mut have_match = false;
            if hash_head != 0 && self.strategy != Strategy::HuffmanOnly {
                let head = hash_head as usize;
                if self.finder.strstart - head <= MAX_DIST {
                    have_match = self.finder.longest_match(
                        head,
                        self.config.good_length,
                        self.config.nice_length,
                        self.config.max_chain,
                    );
                }
            }

            let bflush;
            if have_match {
                let len = self.finder.match_len;
                let dist = self.finder.strstart - self.finder.match_start;
                bflush = self.huffman.tally_dist(dist, len);
                self.finder.lookahead -= len;

                if len <= self.config.max_lazy && self.finder.lookahead >= MIN_MATCH {
                    // Short match: keep the chain dense over its bytes
                    let mut n = len - 1;
                    while n > 0 {
                        self.finder.strstart += 1;
                        self.finder.insert_string(self.finder.strstart);
                        n -= 1;
                    }
                    self.finder.strstart += 1;
                } else {
                    self.finder.strstart += len;
                    self.finder.rehash();
                }
                self.finder.match_len = MIN_MATCH - 1;
            } else {
                bflush = self
                    .huffman
                    .tally_lit(self.finder.window[self.finder.strstart]);
                self.finder.lookahead -= 1;
                self.finder.strstart += 1;
            }

            if bflush {
                self.flush_block(false);
                return true;
            }
        }
    }

    /// Levels 4-9: defer each match by one byte and emit it only when the
    /// next position cannot beat it.
    fn deflate_slow(&mut self, can_flush: bool, finish: bool) -> bool {
        loop {
            if self.finder.lookahead < MIN_LOOKAHEAD && !can_flush {
                return self.input_off < self.input.len();
            }
            if self.finder.lookahead == 0 {
                if self.prev_available {
                    self.huffman
                        .tally_lit(self.finder.window[self.finder.strstart - 1]);
                    self.prev_available = false;
                }
                self.flush_block(finish);
                return false;
            }
            if self.finder.strstart > WINDOW_SIZE - MIN_LOOKAHEAD {
                self.finder.slide();
            }

            let mut hash_head = 0u16;
            if self.finder.lookahead >= MIN_MATCH {
                hash_head = self.finder.insert_string(self.finder.strstart);
            }

            let prev_len = self.finder.match_len;
            let prev_match = self.finder.match_start;

            if hash_head != 0
                && prev_len < self.config.max_lazy
                && self.strategy != Strategy::HuffmanOnly
            {
                let head = hash_head as usize;
                if self.finder.strstart - head <= MAX_DIST {
                    self.finder.longest_match(
                        head,
                        self.config.good_length,
                        self.config.nice_length,
                        self.config.max_chain,
                    );

                    // Drop marginal matches: short ones far back cost more
                    // than the literals they replace, and Filtered keeps
                    // only clearly worthwhile matches.
                    if self.finder.match_len <= 5
                        && (self.strategy == Strategy::Filtered
                            || (self.finder.match_len == MIN_MATCH
                                && self.finder.strstart - self.finder.match_start > TOO_FAR))
                    {
                        self.finder.match_len = MIN_MATCH - 1;
                    }
                }
            }

            if prev_len >= MIN_MATCH && self.finder.match_len <= prev_len {
                // The deferred match wins; positions inside it still get
                // hashed while three bytes of lookahead remain.
                let max_insert = self.finder.strstart + self.finder.lookahead - MIN_MATCH;
                let dist = self.finder.strstart - 1 - prev_match;
                let bflush = self.huffman.tally_dist(dist, prev_len);

                self.finder.lookahead -= prev_len - 1;
                let mut n = prev_len - 2;
                while n > 0 {
                    self.finder.strstart += 1;
                    if self.finder.strstart <= max_insert {
                        self.finder.insert_string(self.finder.strstart);
                    }
                    n -= 1;
                }
                self.finder.strstart += 1;
                self.prev_available = false;
                self.finder.match_len = MIN_MATCH - 1;

                if bflush {
                    self.flush_block(false);
                    return true;
                }
            } else if self.prev_available {
                // The new match is longer; the previous byte goes out as a
                // literal and the decision moves one position forward.
                let bflush = self
                    .huffman
                    .tally_lit(self.finder.window[self.finder.strstart - 1]);
                if bflush {
                    self.flush_block(false);
                }
                self.finder.strstart += 1;
                self.finder.lookahead -= 1;
                if bflush {
                    return true;
                }
            } else {
                self.prev_available = true;
                self.finder.strstart += 1;
                self.finder.lookahead -= 1;
            }
        }
    }

    fn has_pending_block(&self) -> bool {
        !self.huffman.is_empty()
            || self.prev_available
            || self.finder.block_start != self.finder.strstart as i64
            || (self.config.func == CompressionFunction::Stored && self.finder.lookahead > 0)
    }
}

/// Compress `data` into a raw DEFLATE stream.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    deflate_with_stats(data, level).map(|(out, _)| out)
}

/// Compress `data` into a raw DEFLATE stream, returning block statistics.
pub fn deflate_with_stats(data: &[u8], level: u8) -> Result<(Vec<u8>, DeflateStats)> {
    let mut deflater = Deflater::new(level)?;
    let mut out = Vec::with_capacity(data.len() / 2 + 64);
    deflater.set_input(data, 0, data.len())?;
    drive_to_end(&mut deflater, &mut out);
    Ok((out, deflater.stats()))
}

/// Compress `data` into a zlib stream (RFC 1950): CMF/FLG header, DEFLATE
/// body, big-endian Adler-32 trailer.
pub fn deflate_zlib(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(level)?;
    let mut out = Vec::with_capacity(data.len() / 2 + 64);

    let cmf = (CINFO_32K << 4) | CM_DEFLATE;
    let flevel: u8 = match level {
        0..=1 => 0,
        2..=5 => 1,
        6 => 2,
        _ => 3,
    };
    let mut flg = flevel << 6;
    let check = (u16::from(cmf) << 8) | u16::from(flg);
    if check % 31 != 0 {
        flg += 31 - (check % 31) as u8;
    }
    out.push(cmf);
    out.push(flg);

    deflater.set_input(data, 0, data.len())?;
    drive_to_end(&mut deflater, &mut out);
    out.extend_from_slice(&deflater.adler().to_be_bytes());
    Ok(out)
}

/// Run `deflater` to completion, appending all output to `out`.
fn drive_to_end(deflater: &mut Deflater, out: &mut Vec<u8>) {
    let mut chunk = [0u8; 8192];
    loop {
        let more = deflater.deflate(true, true);
        loop {
            let n = deflater.flush_output(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        if !more {
            break;
        }
    }
}
