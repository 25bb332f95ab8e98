//! Runs the compiled program under mollusk. Each test returns early unless the program has been
//! built with `cargo build-sbf`.

use std::collections::HashMap;

use mollusk_svm::{
    result::InstructionResult,
    MolluskContext,
};
use pad_client::{
    mollusk_helpers::{
        get_token_account,
        mint_account,
        new_pad_mollusk_context,
        system_account,
        token_account,
        MOLLUSK_DEFAULT_MINT_AUTHORITY,
        MOLLUSK_DEFAULT_TOKEN,
    },
    pda::{
        find_pre_authorization_address,
        find_smart_delegate_address,
    },
};
use pad_interface::{
    error::PadError,
    instructions::{
        ClosePreAuthorization,
        Debit,
        DebitInstructionData,
        InitPreAuthorization,
        InitPreAuthorizationInstructionData,
        InitPreAuthorizationParams,
        InitPreAuthorizationVariant,
        InitSmartDelegate,
        UpdatePausePreAuthorization,
        UpdatePausePreAuthorizationInstructionData,
    },
    state::{
        pre_authorization::{
            PreAuthorization,
            PreAuthorizationVariant,
        },
        smart_delegate::SmartDelegate,
    },
};
use solana_account::Account;
use solana_address::Address;
use solana_instruction::Instruction;
use solana_instruction_error::InstructionError;

const ACTIVATION: i64 = 1_700_000_000;
const INITIAL_BALANCE: u64 = 1_000_000;

struct Fixture {
    context: MolluskContext<HashMap<Address, Account>>,
    payer: Address,
    owner: Address,
    debit_authority: Address,
    stranger: Address,
    source: Address,
    /// Another token account of the same owner and mint, not covered by the pre-authorization.
    other_source: Address,
    destination: Address,
    smart_delegate: Address,
    pre_authorization: Address,
}

impl Fixture {
    /// `None` if the program hasn't been built.
    fn new() -> Option<Self> {
        let payer = Address::new_unique();
        let owner = Address::new_unique();
        let debit_authority = Address::new_unique();
        let stranger = Address::new_unique();
        let source = Address::new_unique();
        let other_source = Address::new_unique();
        let destination = Address::new_unique();
        let mint = MOLLUSK_DEFAULT_TOKEN.mint_address;
        let token_program = MOLLUSK_DEFAULT_TOKEN.token_program;

        let mut context = new_pad_mollusk_context(vec![
            (payer, system_account(10_000_000_000)),
            (owner, system_account(1_000_000_000)),
            (debit_authority, system_account(1_000_000_000)),
            (stranger, system_account(1_000_000_000)),
            (
                mint,
                mint_account(
                    &MOLLUSK_DEFAULT_MINT_AUTHORITY,
                    2 * INITIAL_BALANCE,
                    6,
                    &token_program,
                ),
            ),
            (source, token_account(&mint, &owner, INITIAL_BALANCE, None, &token_program)),
            (other_source, token_account(&mint, &owner, INITIAL_BALANCE, None, &token_program)),
            (destination, token_account(&mint, &debit_authority, 0, None, &token_program)),
        ])
        .ok()?;
        context.mollusk.sysvars.clock.unix_timestamp = ACTIVATION;

        let smart_delegate = find_smart_delegate_address(&pad_interface::program::ID).address;
        let pre_authorization =
            find_pre_authorization_address(&pad_interface::program::ID, &source, &debit_authority)
                .address;

        let fixture = Self {
            context,
            payer,
            owner,
            debit_authority,
            stranger,
            source,
            other_source,
            destination,
            smart_delegate,
            pre_authorization,
        };
        let init = InitSmartDelegate {
            payer,
            smart_delegate,
        }
        .create_instruction();
        assert_ok(&fixture.process(&init));
        Some(fixture)
    }

    fn process(&self, instruction: &Instruction) -> InstructionResult {
        self.context.process_instruction(instruction)
    }

    fn warp_to(&mut self, unix_timestamp: i64) {
        self.context.mollusk.sysvars.clock.unix_timestamp = unix_timestamp;
    }

    fn account(&self, address: &Address) -> Option<Account> {
        self.context.account_store.borrow().get(address).cloned()
    }

    fn pre_authorization_state(&self) -> PreAuthorization {
        let account = self
            .account(&self.pre_authorization)
            .expect("pre-authorization should exist");
        PreAuthorization::unpack(&account.data).expect("should unpack")
    }

    fn init_pre_authorization(&self, variant: InitPreAuthorizationVariant) -> InstructionResult {
        self.init_pre_authorization_as(self.owner, variant)
    }

    fn init_pre_authorization_as(
        &self,
        owner: Address,
        variant: InitPreAuthorizationVariant,
    ) -> InstructionResult {
        let ix = InitPreAuthorization {
            payer: self.payer,
            owner,
            smart_delegate: self.smart_delegate,
            token_account: self.source,
            pre_authorization: self.pre_authorization,
            token_program: MOLLUSK_DEFAULT_TOKEN.token_program,
        }
        .create_instruction(InitPreAuthorizationInstructionData {
            params: InitPreAuthorizationParams {
                variant,
                debit_authority: self.debit_authority,
                activation_unix_timestamp: ACTIVATION,
            },
        });
        self.process(&ix)
    }

    fn debit_as(&self, debit_authority: Address, amount: u64) -> InstructionResult {
        self.debit_from(debit_authority, self.source, amount)
    }

    fn debit_from(
        &self,
        debit_authority: Address,
        token_account: Address,
        amount: u64,
    ) -> InstructionResult {
        let ix = Debit {
            debit_authority,
            mint: MOLLUSK_DEFAULT_TOKEN.mint_address,
            token_account,
            destination_token_account: self.destination,
            smart_delegate: self.smart_delegate,
            pre_authorization: self.pre_authorization,
            token_program: MOLLUSK_DEFAULT_TOKEN.token_program,
        }
        .create_instruction(DebitInstructionData { amount });
        self.process(&ix)
    }

    fn debit(&self, amount: u64) -> InstructionResult {
        self.debit_as(self.debit_authority, amount)
    }

    fn set_paused(&self, pause: bool) -> InstructionResult {
        self.set_paused_as(self.owner, self.source, pause)
    }

    fn set_paused_as(
        &self,
        owner: Address,
        token_account: Address,
        pause: bool,
    ) -> InstructionResult {
        let ix = UpdatePausePreAuthorization {
            owner,
            token_account,
            pre_authorization: self.pre_authorization,
        }
        .create_instruction(UpdatePausePreAuthorizationInstructionData { pause });
        self.process(&ix)
    }

    fn close_as(&self, authority: Address, receiver: Address) -> InstructionResult {
        let ix = ClosePreAuthorization {
            receiver,
            authority,
            token_account: self.source,
            pre_authorization: self.pre_authorization,
        }
        .create_instruction();
        self.process(&ix)
    }

    fn lamports(&self, address: &Address) -> u64 {
        self.account(address).map_or(0, |account| account.lamports)
    }

    fn is_closed(&self, address: &Address) -> bool {
        self.account(address)
            .is_none_or(|account| account.lamports == 0)
    }

    fn balance(&self, address: &Address) -> u64 {
        get_token_account(&self.context, address)
            .expect("token account should exist")
            .amount
    }
}

fn assert_ok(result: &InstructionResult) {
    assert!(
        result.raw_result.is_ok(),
        "expected success, got {:?}",
        result.raw_result
    );
}

fn assert_pad_error(result: &InstructionResult, err: PadError) {
    assert_eq!(
        result.raw_result,
        Err(InstructionError::Custom(err.code()))
    );
}

fn one_time(amount_authorized: u64) -> InitPreAuthorizationVariant {
    InitPreAuthorizationVariant::OneTime {
        amount_authorized,
        expiry_unix_timestamp: ACTIVATION + 100,
    }
}

#[test]
fn smart_delegate_is_initialized_once() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let account = fixture
        .account(&fixture.smart_delegate)
        .expect("smart delegate should exist");
    assert_eq!(account.owner, pad_interface::program::ID);
    assert_eq!(
        SmartDelegate::unpack(&account.data),
        Ok(SmartDelegate {
            bump: find_smart_delegate_address(&pad_interface::program::ID).bump
        })
    );

    let again = InitSmartDelegate {
        payer: fixture.payer,
        smart_delegate: fixture.smart_delegate,
    }
    .create_instruction();
    assert!(fixture.process(&again).raw_result.is_err());
}

#[test]
fn one_time_lifecycle() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));

    let source = get_token_account(&fixture.context, &fixture.source).unwrap();
    assert_eq!(Option::<Address>::from(source.delegate), Some(fixture.smart_delegate));
    assert_eq!(source.delegated_amount, u64::MAX);

    assert_ok(&fixture.debit(40));
    assert_eq!(fixture.balance(&fixture.source), INITIAL_BALANCE - 40);
    assert_eq!(fixture.balance(&fixture.destination), 40);
    assert!(matches!(
        fixture.pre_authorization_state().variant,
        PreAuthorizationVariant::OneTime {
            amount_debited: 40,
            ..
        }
    ));

    assert_pad_error(&fixture.debit(61), PadError::CannotDebitMoreThanAvailable);
    assert_ok(&fixture.debit(60));
    assert_pad_error(&fixture.debit(1), PadError::CannotDebitMoreThanAvailable);
    assert_eq!(fixture.balance(&fixture.destination), 100);
}

#[test]
fn debit_requires_the_debit_authority() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));

    assert_pad_error(
        &fixture.debit_as(fixture.owner, 10),
        PadError::DebitUnauthorized,
    );
    assert_eq!(fixture.balance(&fixture.destination), 0);
}

#[test]
fn one_time_outside_its_window() {
    let Some(mut fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));

    fixture.warp_to(ACTIVATION - 1);
    assert_pad_error(&fixture.debit(10), PadError::PreAuthorizationNotActive);
    fixture.warp_to(ACTIVATION + 100);
    assert_pad_error(&fixture.debit(10), PadError::PreAuthorizationNotActive);
}

#[test]
fn invalid_timestamps_are_rejected() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let expired = InitPreAuthorizationVariant::OneTime {
        amount_authorized: 100,
        expiry_unix_timestamp: ACTIVATION,
    };
    assert_pad_error(
        &fixture.init_pre_authorization(expired),
        PadError::InvalidTimestamp,
    );

    let zero_frequency = InitPreAuthorizationVariant::Recurring {
        repeat_frequency_seconds: 0,
        recurring_amount_authorized: 100,
        num_cycles: None,
        reset_every_cycle: false,
    };
    assert_pad_error(
        &fixture.init_pre_authorization(zero_frequency),
        PadError::InvalidTimestamp,
    );
}

#[test]
fn paused_pre_authorization_rejects_debits() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));

    assert_ok(&fixture.set_paused(true));
    assert!(fixture.pre_authorization_state().paused);
    assert_pad_error(&fixture.debit(10), PadError::PreAuthorizationPaused);

    assert_ok(&fixture.set_paused(false));
    assert_ok(&fixture.debit(10));
}

#[test]
fn recurring_accumulates_across_cycles() {
    let Some(mut fixture) = Fixture::new() else {
        return;
    };
    let recurring = InitPreAuthorizationVariant::Recurring {
        repeat_frequency_seconds: 60,
        recurring_amount_authorized: 100,
        num_cycles: Some(3),
        reset_every_cycle: false,
    };
    assert_ok(&fixture.init_pre_authorization(recurring));

    assert_ok(&fixture.debit(30));
    fixture.warp_to(ACTIVATION + 60);
    // 200 authorized through cycle 2, 30 already debited.
    assert_pad_error(&fixture.debit(171), PadError::CannotDebitMoreThanAvailable);
    assert_ok(&fixture.debit(170));

    let PreAuthorizationVariant::Recurring {
        last_debited_cycle,
        amount_debited_total,
        amount_debited_last_cycle,
        ..
    } = fixture.pre_authorization_state().variant
    else {
        panic!("expected a recurring pre-authorization");
    };
    assert_eq!(last_debited_cycle, 2);
    assert_eq!(amount_debited_total, 200);
    assert_eq!(amount_debited_last_cycle, 170);

    fixture.warp_to(ACTIVATION + 180);
    assert_pad_error(&fixture.debit(1), PadError::PreAuthorizationNotActive);
}

#[test]
fn close_returns_rent_to_the_owner() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));
    let rent = fixture.lamports(&fixture.pre_authorization);
    let owner_lamports = fixture.lamports(&fixture.owner);

    // The debit authority may close, but not send the rent to itself.
    assert_pad_error(
        &fixture.close_as(fixture.debit_authority, fixture.debit_authority),
        PadError::OnlyTokenAccountOwnerCanReceiveClosePreAuthFunds,
    );
    assert_ok(&fixture.close_as(fixture.debit_authority, fixture.owner));

    assert_eq!(fixture.lamports(&fixture.owner), owner_lamports + rent);
    assert!(fixture.is_closed(&fixture.pre_authorization));
    assert!(fixture.debit(1).raw_result.is_err());
}

#[test]
fn owner_closes_to_any_receiver() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));
    let rent = fixture.lamports(&fixture.pre_authorization);
    let payer_lamports = fixture.lamports(&fixture.payer);

    assert_ok(&fixture.close_as(fixture.owner, fixture.payer));
    assert_eq!(fixture.lamports(&fixture.payer), payer_lamports + rent);
    assert!(fixture.is_closed(&fixture.pre_authorization));
}

#[test]
fn close_requires_the_owner_or_the_debit_authority() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));

    assert_pad_error(
        &fixture.close_as(fixture.stranger, fixture.owner),
        PadError::PreAuthorizationCloseUnauthorized,
    );
    assert_pad_error(
        &fixture.close_as(fixture.stranger, fixture.stranger),
        PadError::PreAuthorizationCloseUnauthorized,
    );
    assert!(!fixture.is_closed(&fixture.pre_authorization));
}

#[test]
fn pause_requires_the_token_account_owner() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));

    for signer in [fixture.debit_authority, fixture.stranger] {
        assert_pad_error(
            &fixture.set_paused_as(signer, fixture.source, true),
            PadError::PausePreAuthorizationUnauthorized,
        );
    }
    assert!(!fixture.pre_authorization_state().paused);
}

#[test]
fn instructions_reject_another_token_account() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    assert_ok(&fixture.init_pre_authorization(one_time(100)));

    // Same owner and mint, but not the token account the pre-authorization was made for.
    assert_pad_error(
        &fixture.set_paused_as(fixture.owner, fixture.other_source, true),
        PadError::PreAuthorizationTokenAccountMismatch,
    );
    assert_pad_error(
        &fixture.debit_from(fixture.debit_authority, fixture.other_source, 10),
        PadError::PreAuthorizationTokenAccountMismatch,
    );
    assert_eq!(fixture.balance(&fixture.other_source), INITIAL_BALANCE);
    assert_eq!(fixture.balance(&fixture.destination), 0);
}

#[test]
fn init_requires_the_token_account_owner() {
    let Some(fixture) = Fixture::new() else {
        return;
    };

    assert_pad_error(
        &fixture.init_pre_authorization_as(fixture.stranger, one_time(100)),
        PadError::InitPreAuthorizationUnauthorized,
    );
    assert!(fixture.is_closed(&fixture.pre_authorization));

    let source = get_token_account(&fixture.context, &fixture.source).unwrap();
    assert!(Option::<Address>::from(source.delegate).is_none());
}

#[test]
fn recurring_with_reset_drops_the_unused_allowance() {
    let Some(mut fixture) = Fixture::new() else {
        return;
    };
    let recurring = InitPreAuthorizationVariant::Recurring {
        repeat_frequency_seconds: 60,
        recurring_amount_authorized: 100,
        num_cycles: Some(2),
        reset_every_cycle: true,
    };
    assert_ok(&fixture.init_pre_authorization(recurring));

    assert_ok(&fixture.debit(60));
    assert_pad_error(&fixture.debit(41), PadError::CannotDebitMoreThanAvailable);

    // The 40 left over from cycle 1 doesn't carry into cycle 2.
    fixture.warp_to(ACTIVATION + 60);
    assert_pad_error(&fixture.debit(101), PadError::CannotDebitMoreThanAvailable);
    assert_ok(&fixture.debit(70));
    assert_ok(&fixture.debit(30));
    assert_pad_error(&fixture.debit(1), PadError::CannotDebitMoreThanAvailable);

    let PreAuthorizationVariant::Recurring {
        last_debited_cycle,
        amount_debited_total,
        amount_debited_last_cycle,
        ..
    } = fixture.pre_authorization_state().variant
    else {
        panic!("expected a recurring pre-authorization");
    };
    assert_eq!(last_debited_cycle, 2);
    assert_eq!(amount_debited_total, 160);
    assert_eq!(amount_debited_last_cycle, 100);
    assert_eq!(fixture.balance(&fixture.destination), 160);

    fixture.warp_to(ACTIVATION + 120);
    assert_pad_error(&fixture.debit(1), PadError::PreAuthorizationNotActive);
}

#[test]
fn recurring_ends_after_its_last_cycle() {
    let Some(mut fixture) = Fixture::new() else {
        return;
    };
    let recurring = InitPreAuthorizationVariant::Recurring {
        repeat_frequency_seconds: 60,
        recurring_amount_authorized: 100,
        num_cycles: Some(2),
        reset_every_cycle: false,
    };
    assert_ok(&fixture.init_pre_authorization(recurring));

    // The final second of cycle 2 still debits, including the allowance cycle 1 left unused.
    fixture.warp_to(ACTIVATION + 119);
    assert_ok(&fixture.debit(200));

    fixture.warp_to(ACTIVATION + 120);
    assert_pad_error(&fixture.debit(1), PadError::PreAuthorizationNotActive);
    fixture.warp_to(ACTIVATION + 10 * 60);
    assert_pad_error(&fixture.debit(1), PadError::PreAuthorizationNotActive);
    assert_eq!(fixture.balance(&fixture.source), INITIAL_BALANCE - 200);
}
