//! Token-level context for creating mints and token accounts, minting and reading balances in
//! tests and scripts.

use anyhow::Context;
use solana_address::Address;
use solana_instruction::Instruction;
use solana_sdk::{
    program_pack::Pack,
    signature::{
        Keypair,
        Signature,
    },
    signer::Signer,
};
use spl_associated_token_account_interface::{
    address::get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token_2022_interface::{
    check_spl_token_program_account,
    instruction::mint_to_checked,
};
use spl_token_interface::state::{
    Account,
    Mint,
};

use crate::transactions::CustomRpcClient;

pub struct TokenContext {
    /// If the mint authority is provided, [`TokenContext`] enables minting tokens directly
    /// to recipients, mostly for testing purposes.
    mint_authority: Option<Keypair>,
    pub mint_address: Address,
    pub token_program: Address,
    pub mint_decimals: u8,
}

impl TokenContext {
    pub const fn new(mint_address: Address, token_program: Address, mint_decimals: u8) -> Self {
        Self {
            mint_authority: None,
            mint_address,
            token_program,
            mint_decimals,
        }
    }

    /// Creates a new [`TokenContext`] from an existing token. Checks that the token mint exists
    /// on-chain and is owned by a valid token program.
    pub async fn new_from_existing(
        rpc: &CustomRpcClient,
        mint_token: Address,
        mint_authority: Option<Keypair>,
    ) -> anyhow::Result<Self> {
        let mint_account = rpc.client.get_account(&mint_token).await?;
        check_spl_token_program_account(&mint_account.owner)?;
        let base = mint_account
            .data
            .get(..Mint::LEN)
            .context("Mint data is too short")?;
        let mint = Mint::unpack(base)?;

        let auth_1 = mint_authority.as_ref().map(|kp| kp.pubkey());
        let auth_2 = mint.mint_authority.into();
        // If the mint authority is passed in, ensure it matches the mint authority pubkey on-chain.
        if auth_1.is_some() && auth_1 != auth_2 {
            anyhow::bail!(
                "Mint authority passed in {auth_1:#?} doesn't match authority on-chain {auth_2:#?}"
            );
        }

        Ok(Self {
            mint_authority,
            mint_address: mint_token,
            token_program: mint_account.owner,
            mint_decimals: mint.decimals,
        })
    }

    /// Creates an account, airdrops it SOL, and then uses it to create a new, random token mint.
    pub async fn create_new(
        rpc: &CustomRpcClient,
        token_program: Option<Address>,
    ) -> anyhow::Result<Self> {
        let authority = rpc.fund_new_account().await?;
        let token_program = token_program.unwrap_or(spl_token_interface::ID);
        Self::create_new_from_mint(rpc, authority, Keypair::new(), 10, token_program).await
    }

    pub async fn create_new_from_mint(
        rpc: &CustomRpcClient,
        mint_authority: Keypair,
        mint: Keypair,
        decimals: u8,
        token_program: Address,
    ) -> anyhow::Result<Self> {
        let mint_rent = rpc
            .client
            .get_minimum_balance_for_rent_exemption(Mint::LEN)
            .await?;
        let (create_mint_account, initialize_mint) = create_and_initialize_token_instructions(
            &mint_authority.pubkey(),
            &mint.pubkey(),
            mint_rent,
            decimals,
            &token_program,
        )?;

        rpc.send_and_confirm_txn(
            &mint_authority,
            &[&mint],
            &[create_mint_account, initialize_mint],
        )
        .await?;

        Ok(Self {
            mint_authority: Some(mint_authority),
            mint_address: mint.pubkey(),
            token_program,
            mint_decimals: decimals,
        })
    }

    pub fn mint_authority(&self) -> anyhow::Result<&Keypair> {
        self.mint_authority
            .as_ref()
            .context("Mint authority wasn't passed to the token context")
    }

    /// Creates the associated token account for `owner`, paid for by `payer`. Succeeds if it
    /// already exists.
    pub async fn create_ata_for(
        &self,
        rpc: &CustomRpcClient,
        payer: &Keypair,
        owner: &Address,
    ) -> anyhow::Result<Address> {
        rpc.send_single_signer(payer, [self.create_ata_instruction(&payer.pubkey(), owner)])
            .await?;

        Ok(self.get_ata_for(owner))
    }

    pub fn create_ata_instruction(&self, payer: &Address, owner: &Address) -> Instruction {
        create_associated_token_account_idempotent(
            payer,
            owner,
            &self.mint_address,
            &self.token_program,
        )
    }

    pub fn get_ata_for(&self, owner: &Address) -> Address {
        get_associated_token_address_with_program_id(owner, &self.mint_address, &self.token_program)
    }

    /// If the mint authority was passed to the token context upon creation, this mints tokens
    /// directly to the owner's associated token account. Otherwise, it fails immediately.
    pub async fn mint_to(
        &self,
        rpc: &CustomRpcClient,
        owner: &Address,
        amount: u64,
    ) -> anyhow::Result<Signature> {
        let mint_authority = self.mint_authority()?;
        let mint_to = self.mint_to_instruction(&self.get_ata_for(owner), amount)?;
        rpc.send_single_signer(mint_authority, [mint_to])
            .await
            .map(|txn| txn.signature)
    }

    pub fn mint_to_instruction(
        &self,
        token_account: &Address,
        amount: u64,
    ) -> anyhow::Result<Instruction> {
        let mint_authority = self.mint_authority()?;
        Ok(mint_to_checked(
            &self.token_program,
            &self.mint_address,
            token_account,
            &mint_authority.pubkey(),
            &[],
            amount,
            self.mint_decimals,
        )?)
    }

    pub async fn get_balance_for(
        &self,
        rpc: &CustomRpcClient,
        owner: &Address,
    ) -> anyhow::Result<u64> {
        let ata = self.get_ata_for(owner);
        let account_data = rpc.client.get_account_data(&ata).await?;
        let base = account_data
            .get(..Account::LEN)
            .context("Token account data is too short")?;
        Ok(Account::unpack(base)?.amount)
    }
}

/// The system `create_account` and `initialize_mint2` instructions for a new mint with no freeze
/// authority.
pub fn create_and_initialize_token_instructions(
    mint_authority_and_payer: &Address,
    mint: &Address,
    rent_lamports: u64,
    mint_decimals: u8,
    token_program: &Address,
) -> anyhow::Result<(Instruction, Instruction)> {
    let create_mint_account = solana_system_interface::instruction::create_account(
        mint_authority_and_payer,
        mint,
        rent_lamports,
        Mint::LEN as u64,
        token_program,
    );

    let initialize_mint = spl_token_2022_interface::instruction::initialize_mint2(
        token_program,
        mint,
        mint_authority_and_payer,
        None,
        mint_decimals,
    )?;

    Ok((create_mint_account, initialize_mint))
}
