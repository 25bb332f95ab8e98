use std::{
    collections::HashMap,
    path::PathBuf,
};

use anyhow::Context;
use mollusk_svm::{
    Mollusk,
    MolluskContext,
};
use pad_interface::utils::SYSTEM_PROGRAM_ID;
use solana_account::Account;
use solana_address::Address;
use solana_sdk::{
    program_pack::Pack,
    pubkey,
    rent::Rent,
};
use spl_token_interface::state::{
    Account as TokenAccount,
    AccountState,
    Mint,
};

use crate::context::token::TokenContext;

pub const PROGRAM_DEPLOY_FILE: &str = "pre_authorized_debit.so";

/// Converts an input deploy file to a program name used by the [`Mollusk::new`] function.
///
/// Requires the full file name; for example, `pre_authorized_debit.so` would return the absolute
/// path version of `target/deploy/pre_authorized_debit`, which is exactly what [`Mollusk::new`]
/// expects. Fails if the program hasn't been built with `cargo build-sbf`.
pub fn deploy_file_to_program_name(program_name: &str) -> anyhow::Result<String> {
    let path = PathBuf::from(env!("CARGO_WORKSPACE_DIR"))
        .join("target/deploy/")
        .join(program_name)
        .canonicalize()
        .with_context(|| format!("{program_name} not found, run `cargo build-sbf` first"))?;
    let path = path.to_str().context("Path should convert to a &str")?;

    path.strip_suffix(".so")
        .map(str::to_string)
        .context("Deploy file should have an `.so` suffix")
}

fn add_token_programs(mollusk: &mut Mollusk) {
    mollusk_svm_programs_token::token::add_program(mollusk);
    mollusk_svm_programs_token::token2022::add_program(mollusk);
    mollusk_svm_programs_token::associated_token::add_program(mollusk);
}

fn with_accounts(
    mollusk: Mollusk,
    accounts: Vec<(Address, Account)>,
) -> MolluskContext<HashMap<Address, Account>> {
    // Create mollusk context with the simple hashmap implementation for the AccountStore.
    let context = mollusk.with_context(HashMap::new());
    let programs = [
        mollusk_svm::program::keyed_account_for_system_program(),
        mollusk_svm_programs_token::token::keyed_account(),
        mollusk_svm_programs_token::token2022::keyed_account(),
        mollusk_svm_programs_token::associated_token::keyed_account(),
    ];
    for (address, account) in programs.into_iter().chain(accounts) {
        context.account_store.borrow_mut().insert(address, account);
    }

    context
}

/// Creates a [`MolluskContext`] with the SPL token, token 2022 and associated token programs
/// loaded, plus the accounts passed.
pub fn new_token_mollusk_context(
    accounts: Vec<(Address, Account)>,
) -> MolluskContext<HashMap<Address, Account>> {
    let mut mollusk = Mollusk::default();
    add_token_programs(&mut mollusk);
    with_accounts(mollusk, accounts)
}

/// Creates a [`MolluskContext`] with the pre-authorized debit program, the token programs and the
/// accounts passed.
pub fn new_pad_mollusk_context(
    accounts: Vec<(Address, Account)>,
) -> anyhow::Result<MolluskContext<HashMap<Address, Account>>> {
    let mut mollusk = Mollusk::new(
        &pre_authorized_debit::ID,
        &deploy_file_to_program_name(PROGRAM_DEPLOY_FILE)?,
    );
    add_token_programs(&mut mollusk);
    Ok(with_accounts(mollusk, accounts))
}

pub const MOLLUSK_DEFAULT_MINT_AUTHORITY: Address =
    pubkey!("mint1authority11111111111111111111111111111");

pub const MOLLUSK_DEFAULT_TOKEN: TokenContext = TokenContext::new(
    pubkey!("mint111111111111111111111111111111111111111"),
    spl_token_interface::ID,
    6,
);

pub fn system_account(lamports: u64) -> Account {
    Account::new(lamports, 0, &SYSTEM_PROGRAM_ID)
}

/// A rent-exempt, initialized mint owned by `token_program`.
pub fn mint_account(
    mint_authority: &Address,
    supply: u64,
    decimals: u8,
    token_program: &Address,
) -> Account {
    let mint = Mint {
        mint_authority: Some(*mint_authority).into(),
        supply,
        decimals,
        is_initialized: true,
        freeze_authority: None.into(),
    };
    let mut data = vec![0; Mint::LEN];
    mint.pack_into_slice(&mut data);

    Account {
        lamports: Rent::default().minimum_balance(Mint::LEN),
        data,
        owner: *token_program,
        executable: false,
        rent_epoch: 0,
    }
}

/// A rent-exempt, initialized token account. `delegate` sets the delegate and its delegated
/// amount.
pub fn token_account(
    mint: &Address,
    owner: &Address,
    amount: u64,
    delegate: Option<(Address, u64)>,
    token_program: &Address,
) -> Account {
    let account = TokenAccount {
        mint: *mint,
        owner: *owner,
        amount,
        delegate: delegate.map(|(delegate, _)| delegate).into(),
        state: AccountState::Initialized,
        is_native: None.into(),
        delegated_amount: delegate.map_or(0, |(_, amount)| amount),
        close_authority: None.into(),
    };
    let mut data = vec![0; TokenAccount::LEN];
    account.pack_into_slice(&mut data);

    Account {
        lamports: Rent::default().minimum_balance(TokenAccount::LEN),
        data,
        owner: *token_program,
        executable: false,
        rent_epoch: 0,
    }
}

/// A rent-exempt wrapped SOL token account holding `amount` lamports on top of its reserve.
pub fn native_token_account(owner: &Address, amount: u64, token_program: &Address) -> Account {
    let rent_exempt_reserve = Rent::default().minimum_balance(TokenAccount::LEN);
    let native_mint = if token_program == &spl_token_2022_interface::ID {
        spl_token_2022_interface::native_mint::ID
    } else {
        spl_token_interface::native_mint::ID
    };
    let account = TokenAccount {
        mint: native_mint,
        owner: *owner,
        amount,
        delegate: None.into(),
        state: AccountState::Initialized,
        is_native: Some(rent_exempt_reserve).into(),
        delegated_amount: 0,
        close_authority: None.into(),
    };
    let mut data = vec![0; TokenAccount::LEN];
    account.pack_into_slice(&mut data);

    Account {
        lamports: rent_exempt_reserve + amount,
        data,
        owner: *token_program,
        executable: false,
        rent_epoch: 0,
    }
}

/// Decodes the base state of a token account in the context's account store.
pub fn get_token_account(
    context: &MolluskContext<HashMap<Address, Account>>,
    address: &Address,
) -> anyhow::Result<TokenAccount> {
    let store = context.account_store.borrow();
    let account = store
        .get(address)
        .with_context(|| format!("Token account {address} doesn't exist"))?;
    let base = account
        .data
        .get(..TokenAccount::LEN)
        .context("Token account data is too short")?;
    Ok(TokenAccount::unpack(base)?)
}

#[cfg(test)]
mod tests {
    use mollusk_svm::result::Check;

    use super::*;

    #[test]
    fn program_deploy_path() {
        let Ok(program) = deploy_file_to_program_name(PROGRAM_DEPLOY_FILE) else {
            // Not built with `cargo build-sbf`.
            return;
        };
        assert!(program.ends_with("pre_authorized_debit"));
        assert!(PathBuf::from([program.as_str(), ".so"].concat()).is_file());
    }

    #[test]
    fn synthesized_accounts_unpack() {
        let mint = mint_account(
            &MOLLUSK_DEFAULT_MINT_AUTHORITY,
            1_000,
            6,
            &spl_token_interface::ID,
        );
        let mint_state = Mint::unpack(&mint.data).unwrap();
        assert_eq!(mint_state.supply, 1_000);
        assert_eq!(mint_state.decimals, 6);
        assert_eq!(mint.owner, spl_token_interface::ID);

        let owner = Address::new_unique();
        let delegate = Address::new_unique();
        let account = token_account(
            &MOLLUSK_DEFAULT_TOKEN.mint_address,
            &owner,
            500,
            Some((delegate, u64::MAX)),
            &spl_token_interface::ID,
        );
        let state = TokenAccount::unpack(&account.data).unwrap();
        assert_eq!(state.owner, owner);
        assert_eq!(state.amount, 500);
        assert_eq!(Option::<Address>::from(state.delegate), Some(delegate));
        assert_eq!(state.delegated_amount, u64::MAX);
    }

    /// The smart delegate's transfer authority comes from a plain SPL approve, so a delegate
    /// that was approved for `u64::MAX` can move any amount up to the balance.
    #[test]
    fn approve_then_delegated_transfer() {
        let owner = Address::new_unique();
        let delegate = Address::new_unique();
        let source = Address::new_unique();
        let destination = Address::new_unique();
        let mint = MOLLUSK_DEFAULT_TOKEN.mint_address;
        let token_program = spl_token_interface::ID;

        let context = new_token_mollusk_context(vec![
            (owner, system_account(1_000_000_000)),
            (delegate, system_account(1_000_000_000)),
            (mint, mint_account(&MOLLUSK_DEFAULT_MINT_AUTHORITY, 1_000, 6, &token_program)),
            (source, token_account(&mint, &owner, 1_000, None, &token_program)),
            (destination, token_account(&mint, &delegate, 0, None, &token_program)),
        ]);

        let approve = spl_token_2022_interface::instruction::approve(
            &token_program,
            &source,
            &delegate,
            &owner,
            &[],
            u64::MAX,
        )
        .unwrap();
        context.process_and_validate_instruction(&approve, &[Check::success()]);
        assert_eq!(
            get_token_account(&context, &source).unwrap().delegated_amount,
            u64::MAX
        );

        let transfer = spl_token_2022_interface::instruction::transfer_checked(
            &token_program,
            &source,
            &mint,
            &destination,
            &delegate,
            &[],
            400,
            6,
        )
        .unwrap();
        context.process_and_validate_instruction(&transfer, &[Check::success()]);

        assert_eq!(get_token_account(&context, &source).unwrap().amount, 600);
        assert_eq!(get_token_account(&context, &destination).unwrap().amount, 400);
    }
}
