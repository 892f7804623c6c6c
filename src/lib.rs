//! # rmemkit - Aligned Memory and Inline-Storage Containers
//!
//! This crate provides a small set of memory building blocks: an **aligned
//! page allocator** that talks to `mmap(2)` directly, non-owning **views**,
//! a growable sequence with **inline storage** that spills to that allocator,
//! and a **text builder** that renders numbers straight into its buffer.
//!
//! ## Overview
//!
//! Everything is layered on the allocator:
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │   TextBuffer<C, N>         numbers, floats, replace, trim            │
//!   │         │                                                            │
//!   │         ▼                                                            │
//!   │   InlineVec<T, N>          inline ◄──► heap migration                │
//!   │         │          \                                                 │
//!   │         │           └────► View / ViewMut / MultiView                │
//!   │         ▼                                                            │
//!   │   aligned::allocate        mmap, trimmed to the aligned range        │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rmemkit
//!   ├── align      - Alignment macros (align_up!, align_down!)
//!   ├── aligned    - mmap-backed aligned allocate / reallocate / free
//!   ├── block      - Block header stored before each allocation (internal)
//!   ├── capacity   - Power-of-two growth policy
//!   ├── diag       - Fault reporting: check!, fatal, fault policy
//!   ├── error      - Error and Result types
//!   ├── multi      - Structure-of-arrays MultiView / MultiViewMut
//!   ├── number     - Base-N digit encoding
//!   ├── sequence   - InlineVec / Vector
//!   ├── sys        - Page mapping syscalls (internal)
//!   ├── text       - TextBuffer and the append_all! macro
//!   └── view       - View / ViewMut and the search helpers
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rmemkit::{InlineVec, Text, append_all};
//!
//! let mut small: InlineVec<u32, 4> = InlineVec::new();
//! small.extend_from_slice(&[1, 2, 3, 4]);
//! assert!(small.is_inline());
//!
//! small.push(5);
//! assert!(small.is_heap());
//!
//! let mut text = Text::new();
//! append_all!(text, "len = ", small.len(), ", last = ", *small.at(4));
//! assert_eq!(text, "len = 5, last = 5");
//! ```
//!
//! ## How It Works
//!
//! Every heap block comes from its own mapping. The header sits right before
//! the pointer handed out, so `free` and `reallocate` need nothing but that
//! pointer:
//!
//! ```text
//!   Single Allocation:
//!   ┌──────┬───────────────────────┬────────────────────────────────┬──────┐
//!   │ pad  │    Block Header       │         User Data              │ pad  │
//!   │      │  ┌─────────────────┐  │                                │      │
//!   │      │  │ base            │  │  ┌──────────────────────────┐  │      │
//!   │      │  │ size: N         │  │  │                          │  │      │
//!   │      │  │ map_len         │  │  │     N bytes usable       │  │      │
//!   │      │  │ magic "RMEM"    │  │  │                          │  │      │
//!   │      │  └─────────────────┘  │  └──────────────────────────┘  │      │
//!   └──────┴───────────────────────┴────────────────────────────────┴──────┘
//!   ▲ page                         ▲                                       ▲
//!                                  └── Pointer returned to user     page ──┘
//! ```
//!
//! The sequence keeps up to `N` elements in the struct itself and moves to an
//! allocated block once it outgrows them. Any capacity request that fits in
//! `N` again moves it back.
//!
//! ## Faults
//!
//! Out-of-range indexing and invalid positions are reported through
//! [`diag`]. A fault is logged and then handled according to the
//! [`FaultPolicy`], read once from `RMEMKIT_FAULT_POLICY`. Fatal faults
//! always panic after logging.
//!
//! ## Limitations
//!
//! - **Single-threaded containers**: nothing here is `Sync`
//! - **One mapping per block**: small allocations still cost a page
//! - **Byte-oriented text**: no encoding awareness, ASCII whitespace only
//! - **Unix-only**: Requires `libc` and `mmap` (POSIX systems)
//!
//! ## Safety
//!
//! The raw allocator entry points hand out untyped memory. `free` and
//! `reallocate` are `unsafe`: the pointer must not be used after either
//! returns a different block. The containers wrap all of this behind safe
//! APIs.

pub mod align;
pub mod aligned;
mod block;
pub mod capacity;
pub mod diag;
mod elements;
pub mod error;
pub mod multi;
pub mod number;
pub mod sequence;
mod sys;
pub mod text;
pub mod view;

pub use aligned::{AlignedBlock, allocate, free, mapped_len, reallocate, size};
pub use diag::FaultPolicy;
pub use error::{Error, Result};
pub use multi::{Column, ColumnMut, Columns, ColumnsMut, MultiView, MultiViewMut};
pub use sequence::{InlineVec, Vector};
pub use sys::page_size;
pub use text::{CodeUnit, InlineText, Text, Text32, TextArg, TextBuffer, WideText};
pub use view::{INVALID_INDEX, View, ViewMut};
