//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`StrataError`] covers the failure modes the pyramid
//! can actually hit:
//! - GPU initialization failures
//! - Internal desynchronization between storage and metadata
//!
//! Recoverable per-frame conditions (missing depth source, zero requested
//! mips, out-of-range probes) are deliberately *not* errors — they surface as
//! skipped frames and `None` sentinels on the read API instead, so the
//! per-frame hot path never unwinds.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, StrataError>`.

use thiserror::Error;

/// The main error type for the pyramid subsystem.
///
/// Every variant here is either a device bring-up failure or a programming
/// error that would corrupt downstream sampling if published; nothing in this
/// enum is a normal runtime condition.
#[derive(Error, Debug)]
pub enum StrataError {
    // ========================================================================
    // GPU & Device Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Invariant Violations
    // ========================================================================
    /// A chain's descriptor table length no longer matches its allocated
    /// storage. Publishing in this state would desynchronize consumer
    /// sampling, so the frame aborts instead.
    #[error(
        "chain '{chain}': descriptor table holds {descriptors} entries but storage allocated {allocated} mips"
    )]
    TableDesync {
        /// Chain name ("near" / "far")
        chain: &'static str,
        /// Descriptor sequence length
        descriptors: usize,
        /// Allocated mip count
        allocated: usize,
    },

    /// A published frame handle does not resolve to the view currently held
    /// by storage. Indicates the table and the allocator disagree about the
    /// live resource.
    #[error(
        "chain '{chain}' mip {mip}: published handle id {published} but storage holds id {actual}"
    )]
    HandleDesync {
        /// Chain name ("near" / "far")
        chain: &'static str,
        /// Mip index
        mip: u32,
        /// Id recorded in the frame table
        published: u64,
        /// Id of the view storage actually holds
        actual: u64,
    },

    /// Frame phases ran out of order (e.g. `record` without `prepare`).
    #[error("frame {frame}: '{requested}' called while in phase '{current}'")]
    PhaseOrder {
        /// Frame index
        frame: u64,
        /// The phase that was requested
        requested: &'static str,
        /// The phase the generator was actually in
        current: &'static str,
    },
}

/// Alias for `Result<T, StrataError>`.
pub type Result<T> = std::result::Result<T, StrataError>;
