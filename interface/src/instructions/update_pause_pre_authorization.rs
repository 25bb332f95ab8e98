use pinocchio::{
    error::ProgramError,
    Address,
};

use crate::{
    instructions::PadInstruction,
    pack::{
        write_bytes,
        ByteReader,
        UNINIT_BYTE,
    },
};

/// Pauses or unpauses a pre-authorization. Paused pre-authorizations reject every debit.
///
/// # Caller guarantees
///
/// When invoking this instruction, caller must ensure that:
/// - WRITE accounts are not currently borrowed in *any* capacity.
/// - READ accounts are not currently mutably borrowed.
///
/// ### Accounts
///   0. `[READ, SIGNER]` Token account owner
///   1. `[READ]` Token account
///   2. `[WRITE]` Pre-authorization PDA
pub struct UpdatePausePreAuthorization {
    pub owner: Address,
    pub token_account: Address,
    pub pre_authorization: Address,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UpdatePausePreAuthorizationInstructionData {
    pub pause: bool,
}

impl UpdatePausePreAuthorizationInstructionData {
    pub const LEN_WITH_DISCRIMINATOR: usize = 9;

    #[inline(always)]
    pub fn pack(&self) -> [u8; Self::LEN_WITH_DISCRIMINATOR] {
        // Instruction data layout:
        //   - [0..8]: the instruction discriminator, 8 bytes
        //   - [8]: the `pause` bool, 1 byte
        let mut data = [UNINIT_BYTE; Self::LEN_WITH_DISCRIMINATOR];

        write_bytes(
            &mut data[0..8],
            &PadInstruction::UpdatePausePreAuthorization.discriminator(),
        );
        data[8].write(self.pause as u8);

        // Safety: All 9 bytes were written to.
        unsafe { *(data.as_ptr() as *const _) }
    }

    /// Unpacks the instruction data that follows the discriminator.
    #[inline(always)]
    pub fn unpack_untagged(instruction_data: &[u8]) -> Result<Self, ProgramError> {
        let pause = ByteReader::new(instruction_data)
            .read_bool()
            .or(Err(ProgramError::InvalidInstructionData))?;
        Ok(Self { pause })
    }
}

#[cfg(feature = "client")]
impl UpdatePausePreAuthorization {
    pub fn create_account_metas(&self) -> [solana_instruction::AccountMeta; 3] {
        use solana_instruction::AccountMeta;

        [
            AccountMeta::new_readonly(self.owner, true),
            AccountMeta::new_readonly(self.token_account, false),
            AccountMeta::new(self.pre_authorization, false),
        ]
    }

    pub fn create_instruction(
        &self,
        data: UpdatePausePreAuthorizationInstructionData,
    ) -> solana_instruction::Instruction {
        solana_instruction::Instruction {
            program_id: crate::program::ID,
            accounts: self.create_account_metas().to_vec(),
            data: data.pack().to_vec(),
        }
    }
}
