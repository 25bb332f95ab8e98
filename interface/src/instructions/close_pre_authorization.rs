use pinocchio::Address;

use crate::instructions::PadInstruction;

/// Closes a pre-authorization and sends its rent to `receiver`.
///
/// Either the token account owner or the debit authority may close it, but the rent always goes
/// back to the token account owner unless the owner is the one closing it.
///
/// # Caller guarantees
///
/// When invoking this instruction, caller must ensure that:
/// - WRITE accounts are not currently borrowed in *any* capacity.
/// - READ accounts are not currently mutably borrowed.
///
/// ### Accounts
///   0. `[WRITE]` Receiver
///   1. `[READ, SIGNER]` Authority, the token account owner or the debit authority
///   2. `[READ]` Token account
///   3. `[WRITE]` Pre-authorization PDA
pub struct ClosePreAuthorization {
    pub receiver: Address,
    pub authority: Address,
    pub token_account: Address,
    pub pre_authorization: Address,
}

pub struct ClosePreAuthorizationInstructionData;

impl ClosePreAuthorizationInstructionData {
    pub const LEN_WITH_DISCRIMINATOR: usize = 8;

    #[inline(always)]
    pub fn pack(&self) -> [u8; Self::LEN_WITH_DISCRIMINATOR] {
        PadInstruction::ClosePreAuthorization.discriminator()
    }
}

#[cfg(feature = "client")]
impl ClosePreAuthorization {
    pub fn create_account_metas(&self) -> [solana_instruction::AccountMeta; 4] {
        use solana_instruction::AccountMeta;

        [
            AccountMeta::new(self.receiver, false),
            AccountMeta::new_readonly(self.authority, true),
            AccountMeta::new_readonly(self.token_account, false),
            AccountMeta::new(self.pre_authorization, false),
        ]
    }

    pub fn create_instruction(&self) -> solana_instruction::Instruction {
        solana_instruction::Instruction {
            program_id: crate::program::ID,
            accounts: self.create_account_metas().to_vec(),
            data: ClosePreAuthorizationInstructionData.pack().to_vec(),
        }
    }
}
