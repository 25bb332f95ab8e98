use pinocchio::Address;

use crate::instructions::PadInstruction;

/// Creates the program-wide smart delegate PDA.
///
/// # Caller guarantees
///
/// When invoking this instruction, caller must ensure that:
/// - WRITE accounts are not currently borrowed in *any* capacity.
/// - READ accounts are not currently mutably borrowed.
///
/// ### Accounts
///   0. `[WRITE, SIGNER]` Payer
///   1. `[WRITE]` Smart delegate PDA
///   2. `[READ]` System program
pub struct InitSmartDelegate {
    /// The account funding the smart delegate's rent.
    pub payer: Address,
    /// The smart delegate PDA, derived from `["smart-delegate"]`.
    pub smart_delegate: Address,
}

pub struct InitSmartDelegateInstructionData;

impl InitSmartDelegateInstructionData {
    pub const LEN_WITH_DISCRIMINATOR: usize = 8;

    #[inline(always)]
    pub fn pack(&self) -> [u8; Self::LEN_WITH_DISCRIMINATOR] {
        PadInstruction::InitSmartDelegate.discriminator()
    }
}

#[cfg(feature = "client")]
impl InitSmartDelegate {
    pub fn create_account_metas(&self) -> [solana_instruction::AccountMeta; 3] {
        use solana_instruction::AccountMeta;

        [
            AccountMeta::new(self.payer, true),
            AccountMeta::new(self.smart_delegate, false),
            AccountMeta::new_readonly(crate::utils::SYSTEM_PROGRAM_ID, false),
        ]
    }

    pub fn create_instruction(&self) -> solana_instruction::Instruction {
        solana_instruction::Instruction {
            program_id: crate::program::ID,
            accounts: self.create_account_metas().to_vec(),
            data: InitSmartDelegateInstructionData.pack().to_vec(),
        }
    }
}
