//! Definitions of all program instructions: their discriminators, instruction data layouts and,
//! with the `client` feature, builders that produce [`solana_instruction::Instruction`]s.
//!
//! Instruction data is an 8-byte discriminator followed by the borsh-encoded parameters.

pub mod close_pre_authorization;
pub mod debit;
pub mod init_pre_authorization;
pub mod init_smart_delegate;
pub mod update_pause_pre_authorization;

pub use close_pre_authorization::*;
pub use debit::*;
pub use init_pre_authorization::*;
pub use init_smart_delegate::*;
pub use update_pause_pre_authorization::*;
use pinocchio::error::ProgramError;

use crate::state::DISCRIMINATOR_SIZE;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "client"), derive(strum_macros::EnumIter))]
#[cfg_attr(feature = "client", derive(strum_macros::Display))]
pub enum PadInstruction {
    InitSmartDelegate,
    InitPreAuthorization,
    ClosePreAuthorization,
    Debit,
    UpdatePausePreAuthorization,
}

impl PadInstruction {
    #[inline(always)]
    pub const fn discriminator(self) -> [u8; 8] {
        match self {
            Self::InitSmartDelegate => [74, 147, 168, 248, 207, 11, 224, 211],
            Self::InitPreAuthorization => [161, 85, 178, 216, 242, 93, 231, 110],
            Self::ClosePreAuthorization => [202, 3, 103, 53, 188, 38, 203, 30],
            Self::Debit => [144, 252, 105, 115, 174, 111, 100, 65],
            Self::UpdatePausePreAuthorization => [218, 9, 69, 174, 155, 175, 146, 164],
        }
    }

    #[inline(always)]
    pub fn from_discriminator(discriminator: &[u8; 8]) -> Option<Self> {
        match *discriminator {
            [74, 147, 168, 248, 207, 11, 224, 211] => Some(Self::InitSmartDelegate),
            [161, 85, 178, 216, 242, 93, 231, 110] => Some(Self::InitPreAuthorization),
            [202, 3, 103, 53, 188, 38, 203, 30] => Some(Self::ClosePreAuthorization),
            [144, 252, 105, 115, 174, 111, 100, 65] => Some(Self::Debit),
            [218, 9, 69, 174, 155, 175, 146, 164] => Some(Self::UpdatePausePreAuthorization),
            _ => None,
        }
    }

    /// Peels the discriminator off the front of `instruction_data`, returning the instruction and
    /// its remaining, untagged data.
    #[inline(always)]
    pub fn unpack_tag(instruction_data: &[u8]) -> Result<(Self, &[u8]), ProgramError> {
        let (discriminator, data) = instruction_data
            .split_first_chunk::<DISCRIMINATOR_SIZE>()
            .ok_or(ProgramError::InvalidInstructionData)?;
        let instruction =
            Self::from_discriminator(discriminator).ok_or(ProgramError::InvalidInstructionData)?;
        Ok((instruction, data))
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    extern crate std;
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_discriminator_round_trip() {
        for variant in PadInstruction::iter() {
            assert_eq!(
                PadInstruction::from_discriminator(&variant.discriminator()),
                Some(variant)
            );
        }
    }

    #[test]
    fn test_discriminators_are_unique() {
        let discriminators = PadInstruction::iter()
            .map(PadInstruction::discriminator)
            .collect::<HashSet<_>>();
        assert_eq!(discriminators.len(), PadInstruction::iter().count());
    }

    #[test]
    fn test_unpack_tag() {
        let mut data = PadInstruction::Debit.discriminator().to_vec();
        data.extend_from_slice(&5u64.to_le_bytes());
        let (instruction, rest) = PadInstruction::unpack_tag(&data).unwrap();
        assert_eq!(instruction, PadInstruction::Debit);
        assert_eq!(rest, 5u64.to_le_bytes());

        assert_eq!(
            PadInstruction::unpack_tag(&[74, 147, 168]),
            Err(ProgramError::InvalidInstructionData)
        );
        assert_eq!(
            PadInstruction::unpack_tag(&[0; 8]),
            Err(ProgramError::InvalidInstructionData)
        );
    }
}
