#[cfg(feature = "core")]
#[doc(inline)]
pub use pgsc_core as core;

#[cfg(feature = "liftover")]
#[doc(inline)]
pub use pgsc_liftover as liftover;

#[cfg(feature = "scorefile")]
#[doc(inline)]
pub use pgsc_scorefile as scorefile;

#[cfg(feature = "matching")]
#[doc(inline)]
pub use pgsc_match as matching;
