//! Text primitives for the line editor: UTF-8 codec operations, display-cell
//! width, and word scanning.
//!
//! Everything here is pure. The rest of the workspace addresses the edit
//! buffer in *scalars* (Unicode code points) externally and bytes internally;
//! this crate owns both translations plus the column arithmetic the renderer
//! needs.
//!
//! Invariants:
//! - No other crate measures display width directly; all column decisions
//!   flow through [`cell_width`] / [`str_cells`].
//! - Byte offsets returned by [`byte_offset`] always land on scalar
//!   boundaries.

pub mod utf8;
pub mod width;
pub mod word;

pub use utf8::{byte_offset, char_at, decode, encode, scalar_count, seq_len};
pub use width::{cell_width, is_ctrl, str_cells};
pub use word::{kill_word_start, last_token, word_start};
