//! Event emission through the `sol_log_data` syscall.

use pad_interface::{
    events::{
        PadEventData,
        MAX_EVENT_LEN,
    },
    syscalls::log_data,
};

/// Packs `event` into a stack buffer and logs it as a single `Program data:` segment.
#[inline(always)]
pub fn emit_event<E: PadEventData>(event: &E) {
    let mut buf = [0u8; MAX_EVENT_LEN];
    log_data(&[event.pack(&mut buf)]);
}
