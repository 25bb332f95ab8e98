use pinocchio::error::ProgramError;

use crate::{
    pack::{
        ByteReader,
        ByteWriter,
        UnpackError,
    },
    state::{
        DISCRIMINATOR_SIZE,
        U8_SIZE,
    },
};

/// The program-wide delegate every participating token account approves. Debits are signed by
/// this PDA, and the account itself only stores its bump.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SmartDelegate {
    pub bump: u8,
}

impl SmartDelegate {
    pub const DISCRIMINATOR: [u8; 8] = [47, 189, 254, 31, 76, 172, 82, 107];
    pub const LEN: usize = DISCRIMINATOR_SIZE + U8_SIZE;

    pub fn pack_into(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        if dst.len() < Self::LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        let mut writer = ByteWriter::new(dst);
        writer.write(&Self::DISCRIMINATOR);
        writer.write_u8(self.bump);
        Ok(())
    }

    pub fn unpack(data: &[u8]) -> Result<Self, UnpackError> {
        let mut reader = ByteReader::new(data);
        reader.expect_discriminator(&Self::DISCRIMINATOR)?;
        Ok(Self {
            bump: reader.read_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_delegate_layout() {
        let mut data = [0u8; SmartDelegate::LEN];
        SmartDelegate { bump: 255 }.pack_into(&mut data).unwrap();
        assert_eq!(data, [47, 189, 254, 31, 76, 172, 82, 107, 255]);
        assert_eq!(SmartDelegate::unpack(&data), Ok(SmartDelegate { bump: 255 }));

        data[0] = 0;
        assert_eq!(
            SmartDelegate::unpack(&data),
            Err(UnpackError::InvalidDiscriminator)
        );
    }
}
