//! Umbrella crate for the mars analysis tools.
//!
//! Each module re-exports one workspace crate and sits behind the cargo feature of the same name:
//! `core`, `lm`, `kcp` and `segdist` (`full` turns on all of them).

#[cfg(feature = "core")]
#[doc(inline)]
pub use mars_core as core;

#[cfg(feature = "lm")]
#[doc(inline)]
pub use mars_lm as lm;

#[cfg(feature = "kcp")]
#[doc(inline)]
pub use mars_kcp as kcp;

#[cfg(feature = "segdist")]
#[doc(inline)]
pub use mars_segdist as segdist;
