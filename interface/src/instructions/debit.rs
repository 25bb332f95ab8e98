use pinocchio::{
    error::ProgramError,
    Address,
};

use crate::{
    instructions::PadInstruction,
    pack::{
        unpack_u64,
        write_bytes,
        UNINIT_BYTE,
    },
};

/// Transfers `amount` from the pre-authorized token account to a destination token account,
/// signed by the smart delegate.
///
/// # Caller guarantees
///
/// When invoking this instruction, caller must ensure that:
/// - WRITE accounts are not currently borrowed in *any* capacity.
/// - READ accounts are not currently mutably borrowed.
///
/// ### Accounts
///   0. `[READ, SIGNER]` Debit authority
///   1. `[READ]` Mint
///   2. `[WRITE]` Source token account
///   3. `[WRITE]` Destination token account
///   4. `[READ]` Smart delegate PDA
///   5. `[WRITE]` Pre-authorization PDA
///   6. `[READ]` Token program
pub struct Debit {
    pub debit_authority: Address,
    pub mint: Address,
    pub token_account: Address,
    pub destination_token_account: Address,
    pub smart_delegate: Address,
    pub pre_authorization: Address,
    pub token_program: Address,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DebitInstructionData {
    /// The amount to debit, in the mint's base units.
    pub amount: u64,
}

impl DebitInstructionData {
    pub const LEN_WITH_DISCRIMINATOR: usize = 16;

    #[inline(always)]
    pub fn pack(&self) -> [u8; Self::LEN_WITH_DISCRIMINATOR] {
        // Instruction data layout:
        //   - [0..8]: the instruction discriminator, 8 bytes
        //   - [8..16]: the u64 `amount` as little-endian bytes, 8 bytes
        let mut data = [UNINIT_BYTE; Self::LEN_WITH_DISCRIMINATOR];

        write_bytes(&mut data[0..8], &PadInstruction::Debit.discriminator());
        write_bytes(&mut data[8..16], &self.amount.to_le_bytes());

        // Safety: All 16 bytes were written to.
        unsafe { *(data.as_ptr() as *const _) }
    }

    /// Unpacks the instruction data that follows the discriminator.
    #[inline(always)]
    pub fn unpack_untagged(instruction_data: &[u8]) -> Result<Self, ProgramError> {
        let amount = unpack_u64(instruction_data).or(Err(ProgramError::InvalidInstructionData))?;
        Ok(Self { amount })
    }
}

#[cfg(feature = "client")]
impl Debit {
    pub fn create_account_metas(&self) -> [solana_instruction::AccountMeta; 7] {
        use solana_instruction::AccountMeta;

        [
            AccountMeta::new_readonly(self.debit_authority, true),
            AccountMeta::new_readonly(self.mint, false),
            AccountMeta::new(self.token_account, false),
            AccountMeta::new(self.destination_token_account, false),
            AccountMeta::new_readonly(self.smart_delegate, false),
            AccountMeta::new(self.pre_authorization, false),
            AccountMeta::new_readonly(self.token_program, false),
        ]
    }

    pub fn create_instruction(
        &self,
        data: DebitInstructionData,
    ) -> solana_instruction::Instruction {
        solana_instruction::Instruction {
            program_id: crate::program::ID,
            accounts: self.create_account_metas().to_vec(),
            data: data.pack().to_vec(),
        }
    }
}
