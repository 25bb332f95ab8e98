//! Solana's low-level C syscalls provided by the SVM runtime.
//!
//! Only `sol_log_data` is needed, for emitting events as `Program data:` log lines. Non-`solana`
//! targets get a no-op fallback so the interface can be built and tested on the host.

#[cfg(all(target_os = "solana", not(target_feature = "static-syscalls")))]
/// Syscalls provided by the SVM runtime (SBPFv0, SBPFv1 and SBPFv2).
mod inner {
    extern "C" {
        pub fn sol_log_data(data: *const u8, data_len: u64);
    }
}

#[cfg(all(target_os = "solana", target_feature = "static-syscalls"))]
/// Syscalls provided by the SVM runtime (SBPFv3 and newer).
mod inner {
    pub unsafe fn sol_log_data(data: *const u8, data_len: u64) {
        // murmur32 hash of "sol_log_data"
        let syscall: extern "C" fn(*const u8, u64) =
            unsafe { core::mem::transmute(1930933300u64) };
        syscall(data, data_len)
    }
}

#[cfg(not(target_os = "solana"))]
#[allow(dead_code)]
/// Syscall fallbacks for non-`solana` targets.
mod inner {
    /// Drops the log data; there is no runtime log collector off-chain.
    ///
    /// # Safety
    ///
    /// Always safe to call, the pointer is never read.
    pub unsafe fn sol_log_data(_data: *const u8, _data_len: u64) {}
}

#[allow(unused_imports)]
pub use inner::*;

/// Logs each slice in `data` as one base64 segment of a single `Program data:` log line.
#[inline(always)]
pub fn log_data(data: &[&[u8]]) {
    // Safety: A `&[&[u8]]` is laid out as the array of (pointer, length) pairs the syscall reads.
    unsafe { sol_log_data(data as *const _ as *const u8, data.len() as u64) }
}
