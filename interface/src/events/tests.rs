extern crate std;
use std::collections::HashSet;

use borsh::BorshSerialize;
use pinocchio::Address;
use strum::IntoEnumIterator;

use super::*;
use crate::instructions::InitPreAuthorizationVariant;

fn addr(byte: u8) -> Address {
    Address::new_from_array([byte; 32])
}

#[test]
fn event_discriminators_round_trip() {
    for tag in PadEventTag::iter() {
        assert_eq!(PadEventTag::from_discriminator(&tag.discriminator()), Some(tag));
    }
    let unique = PadEventTag::iter()
        .map(PadEventTag::discriminator)
        .collect::<HashSet<_>>();
    assert_eq!(unique.len(), PadEventTag::iter().count());
    assert_eq!(PadEventTag::from_discriminator(&[0; 8]), None);
}

#[derive(BorshSerialize)]
enum BorshDebitVariant {
    OneTime { debit_amount: u64 },
    Recurring { debit_amount: u64, cycle: u64 },
}

#[derive(BorshSerialize)]
struct BorshDebitEvent {
    addresses: [[u8; 32]; 9],
    debit_variant: BorshDebitVariant,
}

#[test]
fn debit_event_matches_borsh() {
    let event = DebitEvent {
        pre_authorization: addr(1),
        debit_authority: addr(2),
        smart_delegate: addr(3),
        mint: addr(4),
        token_program: addr(5),
        source_token_account_owner: addr(6),
        destination_token_account_owner: addr(7),
        source_token_account: addr(8),
        destination_token_account: addr(9),
        debit_variant: DebitEventVariant::Recurring {
            debit_amount: 500,
            cycle: 4,
        },
    };
    let mut buf = [0u8; MAX_EVENT_LEN];
    let packed = event.pack(&mut buf);

    let expected = borsh::to_vec(&BorshDebitEvent {
        addresses: core::array::from_fn(|i| [i as u8 + 1; 32]),
        debit_variant: BorshDebitVariant::Recurring {
            debit_amount: 500,
            cycle: 4,
        },
    })
    .unwrap();

    assert_eq!(packed.len(), MAX_EVENT_LEN);
    assert_eq!(packed[..8], PadEventTag::Debit.discriminator());
    assert_eq!(packed[8..], expected[..]);
    assert_eq!(DebitEvent::unpack(packed), Ok(event));

    let one_time = DebitEvent {
        debit_variant: DebitEventVariant::OneTime { debit_amount: 9 },
        ..event
    };
    let mut buf = [0u8; MAX_EVENT_LEN];
    let packed = one_time.pack(&mut buf);
    let expected_variant = borsh::to_vec(&BorshDebitVariant::OneTime { debit_amount: 9 }).unwrap();
    assert_eq!(packed[8 + 9 * 32..], expected_variant[..]);
    assert_eq!(DebitEvent::unpack(packed), Ok(one_time));
}

#[test]
fn created_event_layout() {
    let event = RecurringPreAuthorizationCreated {
        data: PreAuthorizationCreatedEventData {
            debit_authority: addr(1),
            owner: addr(2),
            payer: addr(3),
            token_account: addr(4),
            pre_authorization: addr(5),
            init_params: InitPreAuthorizationParams {
                variant: InitPreAuthorizationVariant::Recurring {
                    repeat_frequency_seconds: 3_600,
                    recurring_amount_authorized: 10,
                    num_cycles: Some(24),
                    reset_every_cycle: false,
                },
                debit_authority: addr(1),
                activation_unix_timestamp: 1_700_000_000,
            },
        },
    };
    let mut buf = [0u8; MAX_EVENT_LEN];
    let packed = event.pack(&mut buf);

    assert_eq!(packed.len(), 8 + 5 * 32 + InitPreAuthorizationParams::MAX_LEN);
    assert_eq!(packed[..8], PadEventTag::RecurringPreAuthorizationCreated.discriminator());
    assert_eq!(RecurringPreAuthorizationCreated::unpack(packed), Ok(event));

    // The one-time and recurring events share a payload but not a discriminator.
    assert_eq!(
        OneTimePreAuthorizationCreated::unpack(packed),
        Err(UnpackError::InvalidDiscriminator)
    );
}

#[test]
fn pause_and_close_events() {
    let paused = PreAuthorizationPaused {
        data: PausePreAuthorizationEventData {
            owner: addr(1),
            token_account: addr(2),
            pre_authorization: addr(3),
            new_paused_value: true,
        },
    };
    let mut buf = [0u8; MAX_EVENT_LEN];
    let packed = paused.pack(&mut buf);
    assert_eq!(packed.len(), 8 + 3 * 32 + 1);
    assert_eq!(packed[packed.len() - 1], 1);
    assert_eq!(PreAuthorizationPaused::unpack(packed), Ok(paused));

    let closed = OneTimePreAuthorizationClosed {
        data: PreAuthorizationClosedEventData {
            debit_authority: addr(1),
            closing_authority: addr(2),
            token_account_owner: addr(2),
            receiver: addr(2),
            token_account: addr(3),
            pre_authorization: addr(4),
        },
    };
    let mut buf = [0u8; MAX_EVENT_LEN];
    let packed = closed.pack(&mut buf);
    assert_eq!(packed.len(), 8 + 6 * 32);
    assert_eq!(OneTimePreAuthorizationClosed::unpack(packed), Ok(closed));
    assert_eq!(
        OneTimePreAuthorizationClosed::unpack(&packed[..100]),
        Err(UnpackError::InsufficientBytes)
    );
}

#[test]
fn smart_delegate_initialized_layout() {
    let event = SmartDelegateInitialized {
        payer: addr(1),
        smart_delegate: addr(2),
    };
    let mut buf = [0u8; MAX_EVENT_LEN];
    let packed = event.pack(&mut buf);
    assert_eq!(packed.len(), 8 + 64);
    assert_eq!(packed[..8], [136, 72, 57, 213, 203, 214, 232, 114]);
    assert_eq!(SmartDelegateInitialized::unpack(packed), Ok(event));
}
