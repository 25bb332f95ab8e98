use pinocchio::{
    error::ProgramError,
    Address,
};

use crate::{
    instructions::PadInstruction,
    pack::{
        ByteReader,
        ByteWriter,
        UnpackError,
    },
    state::{
        ADDRESS_SIZE,
        DISCRIMINATOR_SIZE,
        U64_SIZE,
        U8_SIZE,
    },
};

/// Creates a one-time or recurring pre-authorization for a token account and approves the smart
/// delegate as the token account's delegate.
///
/// # Caller guarantees
///
/// When invoking this instruction, caller must ensure that:
/// - WRITE accounts are not currently borrowed in *any* capacity.
/// - READ accounts are not currently mutably borrowed.
///
/// ### Accounts
///   0. `[WRITE, SIGNER]` Payer
///   1. `[READ, SIGNER]` Token account owner
///   2. `[READ]` Smart delegate PDA
///   3. `[WRITE]` Token account
///   4. `[WRITE]` Pre-authorization PDA
///   5. `[READ]` Token program
///   6. `[READ]` System program
pub struct InitPreAuthorization {
    pub payer: Address,
    pub owner: Address,
    pub smart_delegate: Address,
    pub token_account: Address,
    pub pre_authorization: Address,
    pub token_program: Address,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InitPreAuthorizationVariant {
    OneTime {
        amount_authorized: u64,
        expiry_unix_timestamp: i64,
    },
    Recurring {
        repeat_frequency_seconds: u64,
        recurring_amount_authorized: u64,
        num_cycles: Option<u64>,
        reset_every_cycle: bool,
    },
}

impl InitPreAuthorizationVariant {
    pub const MAX_LEN: usize = U8_SIZE + 2 * U64_SIZE + (U8_SIZE + U64_SIZE) + U8_SIZE;

    pub fn pack(&self, writer: &mut ByteWriter) {
        match *self {
            Self::OneTime {
                amount_authorized,
                expiry_unix_timestamp,
            } => {
                writer.write_u8(0);
                writer.write_u64(amount_authorized);
                writer.write_i64(expiry_unix_timestamp);
            }
            Self::Recurring {
                repeat_frequency_seconds,
                recurring_amount_authorized,
                num_cycles,
                reset_every_cycle,
            } => {
                writer.write_u8(1);
                writer.write_u64(repeat_frequency_seconds);
                writer.write_u64(recurring_amount_authorized);
                writer.write_option_u64(num_cycles);
                writer.write_bool(reset_every_cycle);
            }
        }
    }

    pub fn unpack(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        match reader.read_u8()? {
            0 => Ok(Self::OneTime {
                amount_authorized: reader.read_u64()?,
                expiry_unix_timestamp: reader.read_i64()?,
            }),
            1 => Ok(Self::Recurring {
                repeat_frequency_seconds: reader.read_u64()?,
                recurring_amount_authorized: reader.read_u64()?,
                num_cycles: reader.read_option_u64()?,
                reset_every_cycle: reader.read_bool()?,
            }),
            tag => Err(UnpackError::InvalidVariantTag(tag)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InitPreAuthorizationParams {
    pub variant: InitPreAuthorizationVariant,
    pub debit_authority: Address,
    pub activation_unix_timestamp: i64,
}

impl InitPreAuthorizationParams {
    pub const MAX_LEN: usize = InitPreAuthorizationVariant::MAX_LEN + ADDRESS_SIZE + U64_SIZE;

    pub fn pack(&self, writer: &mut ByteWriter) {
        self.variant.pack(writer);
        writer.write_address(&self.debit_authority);
        writer.write_i64(self.activation_unix_timestamp);
    }

    pub fn unpack(reader: &mut ByteReader) -> Result<Self, UnpackError> {
        Ok(Self {
            variant: InitPreAuthorizationVariant::unpack(reader)?,
            debit_authority: reader.read_address()?,
            activation_unix_timestamp: reader.read_i64()?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InitPreAuthorizationInstructionData {
    pub params: InitPreAuthorizationParams,
}

impl InitPreAuthorizationInstructionData {
    pub const MAX_LEN_WITH_DISCRIMINATOR: usize =
        DISCRIMINATOR_SIZE + InitPreAuthorizationParams::MAX_LEN;

    /// Packs the discriminator and params into `buf`, returning the number of bytes written.
    pub fn pack_into(&self, buf: &mut [u8; Self::MAX_LEN_WITH_DISCRIMINATOR]) -> usize {
        let mut writer = ByteWriter::new(buf);
        writer.write(&PadInstruction::InitPreAuthorization.discriminator());
        self.params.pack(&mut writer);
        writer.position()
    }

    #[cfg(feature = "std")]
    pub fn pack(&self) -> std::vec::Vec<u8> {
        let mut buf = [0u8; Self::MAX_LEN_WITH_DISCRIMINATOR];
        let len = self.pack_into(&mut buf);
        buf[..len].to_vec()
    }

    /// Unpacks the instruction data that follows the discriminator.
    #[inline(always)]
    pub fn unpack_untagged(instruction_data: &[u8]) -> Result<Self, ProgramError> {
        let params = InitPreAuthorizationParams::unpack(&mut ByteReader::new(instruction_data))
            .or(Err(ProgramError::InvalidInstructionData))?;
        Ok(Self { params })
    }
}

#[cfg(feature = "client")]
impl InitPreAuthorization {
    pub fn create_account_metas(&self) -> [solana_instruction::AccountMeta; 7] {
        use solana_instruction::AccountMeta;

        [
            AccountMeta::new(self.payer, true),
            AccountMeta::new_readonly(self.owner, true),
            AccountMeta::new_readonly(self.smart_delegate, false),
            AccountMeta::new(self.token_account, false),
            AccountMeta::new(self.pre_authorization, false),
            AccountMeta::new_readonly(self.token_program, false),
            AccountMeta::new_readonly(crate::utils::SYSTEM_PROGRAM_ID, false),
        ]
    }

    pub fn create_instruction(
        &self,
        data: InitPreAuthorizationInstructionData,
    ) -> solana_instruction::Instruction {
        solana_instruction::Instruction {
            program_id: crate::program::ID,
            accounts: self.create_account_metas().to_vec(),
            data: data.pack(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use borsh::BorshSerialize;

    use super::*;

    #[derive(BorshSerialize)]
    enum BorshVariant {
        OneTime {
            amount_authorized: u64,
            expiry_unix_timestamp: i64,
        },
        Recurring {
            repeat_frequency_seconds: u64,
            recurring_amount_authorized: u64,
            num_cycles: Option<u64>,
            reset_every_cycle: bool,
        },
    }

    #[derive(BorshSerialize)]
    struct BorshParams {
        variant: BorshVariant,
        debit_authority: [u8; 32],
        activation_unix_timestamp: i64,
    }

    fn packed(data: &InitPreAuthorizationInstructionData) -> std::vec::Vec<u8> {
        let mut buf = [0u8; InitPreAuthorizationInstructionData::MAX_LEN_WITH_DISCRIMINATOR];
        let len = data.pack_into(&mut buf);
        buf[..len].to_vec()
    }

    #[test]
    fn params_match_borsh() {
        let debit_authority = Address::new_from_array([8; 32]);
        let cases = [
            (
                InitPreAuthorizationVariant::OneTime {
                    amount_authorized: 42,
                    expiry_unix_timestamp: i64::MAX,
                },
                BorshVariant::OneTime {
                    amount_authorized: 42,
                    expiry_unix_timestamp: i64::MAX,
                },
            ),
            (
                InitPreAuthorizationVariant::Recurring {
                    repeat_frequency_seconds: 60,
                    recurring_amount_authorized: 7,
                    num_cycles: Some(3),
                    reset_every_cycle: true,
                },
                BorshVariant::Recurring {
                    repeat_frequency_seconds: 60,
                    recurring_amount_authorized: 7,
                    num_cycles: Some(3),
                    reset_every_cycle: true,
                },
            ),
            (
                InitPreAuthorizationVariant::Recurring {
                    repeat_frequency_seconds: 60,
                    recurring_amount_authorized: 7,
                    num_cycles: None,
                    reset_every_cycle: false,
                },
                BorshVariant::Recurring {
                    repeat_frequency_seconds: 60,
                    recurring_amount_authorized: 7,
                    num_cycles: None,
                    reset_every_cycle: false,
                },
            ),
        ];

        for (variant, borsh_variant) in cases {
            let data = InitPreAuthorizationInstructionData {
                params: InitPreAuthorizationParams {
                    variant,
                    debit_authority,
                    activation_unix_timestamp: -1,
                },
            };
            let bytes = packed(&data);
            let expected = borsh::to_vec(&BorshParams {
                variant: borsh_variant,
                debit_authority: debit_authority.to_bytes(),
                activation_unix_timestamp: -1,
            })
            .unwrap();

            assert_eq!(bytes[..8], PadInstruction::InitPreAuthorization.discriminator());
            assert_eq!(bytes[8..], expected[..]);
            assert_eq!(
                InitPreAuthorizationInstructionData::unpack_untagged(&bytes[8..]),
                Ok(data)
            );
        }
    }

    #[test]
    fn truncated_params_are_rejected() {
        let data = InitPreAuthorizationInstructionData {
            params: InitPreAuthorizationParams {
                variant: InitPreAuthorizationVariant::OneTime {
                    amount_authorized: 1,
                    expiry_unix_timestamp: 2,
                },
                debit_authority: Address::new_from_array([1; 32]),
                activation_unix_timestamp: 0,
            },
        };
        let bytes = packed(&data);
        assert_eq!(
            InitPreAuthorizationInstructionData::unpack_untagged(&bytes[8..bytes.len() - 1]),
            Err(ProgramError::InvalidInstructionData)
        );
    }
}
