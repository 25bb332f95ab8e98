//! Solana program entrypoint.
//!
//! Forwards incoming instructions from the runtime into the program's core instruction processing
//! logic.

use pad_interface::instructions::PadInstruction;
use pinocchio::{
    account::AccountView,
    no_allocator,
    nostd_panic_handler,
    program_entrypoint,
    Address,
    ProgramResult,
};

use crate::instructions::*;

program_entrypoint!(process_instruction);
no_allocator!();
nostd_panic_handler!();

#[inline(never)]
pub fn process_instruction(
    _program_id: &Address,
    accounts: &[AccountView],
    instruction_data_with_discriminator: &[u8],
) -> ProgramResult {
    let (instruction, instruction_data) =
        PadInstruction::unpack_tag(instruction_data_with_discriminator)?;

    // Safety: No account data is currently borrowed. CPIs to this program must ensure they do not
    // hold references to the account data used in each instruction.
    unsafe {
        match instruction {
            PadInstruction::InitSmartDelegate => {
                process_init_smart_delegate(accounts, instruction_data)
            }
            PadInstruction::InitPreAuthorization => {
                process_init_pre_authorization(accounts, instruction_data)
            }
            PadInstruction::ClosePreAuthorization => {
                process_close_pre_authorization(accounts, instruction_data)
            }
            PadInstruction::Debit => process_debit(accounts, instruction_data),
            PadInstruction::UpdatePausePreAuthorization => {
                process_update_pause_pre_authorization(accounts, instruction_data)
            }
        }
    }
}
