//! Debit accounting for one-time and recurring pre-authorizations.
//!
//! All arithmetic is checked; corrupted or inconsistent state surfaces as a [`PadError`] instead of
//! a panic. The same functions back the on-chain `debit` handler and the client's max debit
//! estimation, so both always agree on what a debit is allowed to move.

use crate::{
    error::{
        PadError,
        PadResult,
    },
    events::DebitEventVariant,
    state::pre_authorization::{
        PreAuthorization,
        PreAuthorizationVariant,
    },
};

/// Returns the 1-indexed cycle that `now` falls into.
///
/// Cycle `n` spans `[activation + (n - 1) * freq, activation + n * freq)`.
#[inline(always)]
pub fn compute_current_cycle(
    now: i64,
    activation_unix_timestamp: i64,
    repeat_frequency_seconds: u64,
) -> PadResult<u64> {
    if repeat_frequency_seconds == 0 {
        return Err(PadError::InvalidTimestamp);
    }
    if now < activation_unix_timestamp {
        return Err(PadError::PreAuthorizationNotActive);
    }
    let elapsed = now.abs_diff(activation_unix_timestamp);
    (elapsed / repeat_frequency_seconds)
        .checked_add(1)
        .ok_or(PadError::ArithmeticOverflow)
}

/// Returns how much of a recurring pre-authorization can be debited in `current_cycle`.
///
/// - Without `reset_every_cycle`, unused allowance accumulates: everything authorized up to and
///   including the current cycle minus everything debited so far.
/// - With `reset_every_cycle`, a new cycle starts with a fresh allowance and a cycle that has
///   already been debited only has its remainder left.
pub fn compute_available_amount_for_recurring_debit(
    current_cycle: u64,
    last_debited_cycle: u64,
    reset_every_cycle: bool,
    recurring_amount_authorized: u64,
    amount_debited_last_cycle: u64,
    amount_debited_total: u64,
) -> PadResult<u64> {
    if current_cycle == 0 || last_debited_cycle == 0 || current_cycle < last_debited_cycle {
        return Err(PadError::LastDebitedCycleBeforeCurrentCycle);
    }
    if amount_debited_last_cycle > amount_debited_total {
        return Err(PadError::LastDebitedCycleBeforeCurrentCycle);
    }

    match (reset_every_cycle, current_cycle == last_debited_cycle) {
        (false, _) => recurring_amount_authorized
            .checked_mul(current_cycle)
            .and_then(|authorized| authorized.checked_sub(amount_debited_total))
            .ok_or(PadError::ArithmeticOverflow),
        (true, false) => Ok(recurring_amount_authorized),
        (true, true) => recurring_amount_authorized
            .checked_sub(amount_debited_last_cycle)
            .ok_or(PadError::ArithmeticOverflow),
    }
}

/// The largest amount a debit at `now` is allowed to move.
pub fn available_debit_amount(pre_authorization: &PreAuthorization, now: i64) -> PadResult<u64> {
    if pre_authorization.paused {
        return Err(PadError::PreAuthorizationPaused);
    }
    if now < pre_authorization.activation_unix_timestamp {
        return Err(PadError::PreAuthorizationNotActive);
    }

    match pre_authorization.variant {
        PreAuthorizationVariant::OneTime {
            amount_authorized,
            expiry_unix_timestamp,
            amount_debited,
        } => {
            if now >= expiry_unix_timestamp {
                return Err(PadError::PreAuthorizationNotActive);
            }
            amount_authorized
                .checked_sub(amount_debited)
                .ok_or(PadError::ArithmeticOverflow)
        }
        PreAuthorizationVariant::Recurring {
            repeat_frequency_seconds,
            recurring_amount_authorized,
            amount_debited_last_cycle,
            amount_debited_total,
            last_debited_cycle,
            num_cycles,
            reset_every_cycle,
        } => {
            let current_cycle = compute_current_cycle(
                now,
                pre_authorization.activation_unix_timestamp,
                repeat_frequency_seconds,
            )?;
            if num_cycles.is_some_and(|n| current_cycle > n) {
                return Err(PadError::PreAuthorizationNotActive);
            }
            compute_available_amount_for_recurring_debit(
                current_cycle,
                last_debited_cycle,
                reset_every_cycle,
                recurring_amount_authorized,
                amount_debited_last_cycle,
                amount_debited_total,
            )
        }
    }
}

/// Checks that debiting `amount` at `now` is permitted without modifying the pre-authorization.
#[inline(always)]
pub fn validate_debit(pre_authorization: &PreAuthorization, amount: u64, now: i64) -> PadResult {
    if amount > available_debit_amount(pre_authorization, now)? {
        return Err(PadError::CannotDebitMoreThanAvailable);
    }
    Ok(())
}

/// Validates a debit of `amount` at `now` and records it in the pre-authorization's state.
///
/// Returns the event variant describing the debit, where a recurring debit reports the cycle it
/// was recorded in.
pub fn apply_debit(
    pre_authorization: &mut PreAuthorization,
    amount: u64,
    now: i64,
) -> PadResult<DebitEventVariant> {
    validate_debit(pre_authorization, amount, now)?;
    let activation = pre_authorization.activation_unix_timestamp;

    match &mut pre_authorization.variant {
        PreAuthorizationVariant::OneTime { amount_debited, .. } => {
            *amount_debited = amount_debited
                .checked_add(amount)
                .ok_or(PadError::ArithmeticOverflow)?;
            Ok(DebitEventVariant::OneTime {
                debit_amount: amount,
            })
        }
        PreAuthorizationVariant::Recurring {
            repeat_frequency_seconds,
            amount_debited_last_cycle,
            amount_debited_total,
            last_debited_cycle,
            ..
        } => {
            let current_cycle = compute_current_cycle(now, activation, *repeat_frequency_seconds)?;
            *amount_debited_last_cycle = if current_cycle == *last_debited_cycle {
                amount_debited_last_cycle
                    .checked_add(amount)
                    .ok_or(PadError::ArithmeticOverflow)?
            } else {
                amount
            };
            *amount_debited_total = amount_debited_total
                .checked_add(amount)
                .ok_or(PadError::ArithmeticOverflow)?;
            *last_debited_cycle = current_cycle;

            Ok(DebitEventVariant::Recurring {
                debit_amount: amount,
                cycle: *last_debited_cycle,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use pinocchio::Address;

    use super::*;

    /// (current_cycle, last_debited_cycle, recurring_amount, debited_last_cycle, debited_total)
    type Row = (u64, u64, u64, u64, u64);

    fn available(reset_every_cycle: bool, row: Row) -> PadResult<u64> {
        let (current, last, recurring, last_cycle, total) = row;
        compute_available_amount_for_recurring_debit(
            current,
            last,
            reset_every_cycle,
            recurring,
            last_cycle,
            total,
        )
    }

    #[test]
    fn cumulative_available_amount() {
        #[rustfmt::skip]
        let cases: [(Row, u64); 15] = [
            ((1, 1, 0, 0, 0), 0),
            ((1, 1, 100, 0, 0), 100),
            ((1, 1, 100, 100, 100), 0),
            ((5, 1, 100, 0, 0), 500),
            ((5, 1, 100, 100, 100), 400),
            ((5, 4, 100, 100, 100), 400),
            ((5, 4, 100, 100, 400), 100),
            ((5, 4, 100, 400, 400), 100),
            ((5, 5, 100, 100, 100), 400),
            ((5, 5, 100, 100, 400), 100),
            ((5, 5, 100, 400, 400), 100),
            ((5, 5, 100, 0, 500), 0),
            ((5, 5, 100, 400, 500), 0),
            ((5, 5, 100, 500, 500), 0),
            ((5, 5, 100, 0, 100), 400),
        ];
        for (row, expected) in cases {
            assert_eq!(available(false, row), Ok(expected), "{row:?}");
        }
    }

    #[test]
    fn resetting_available_amount() {
        #[rustfmt::skip]
        let cases: [(Row, u64); 12] = [
            ((1, 1, 0, 0, 0), 0),
            ((1, 1, 100, 0, 0), 100),
            ((1, 1, 100, 100, 100), 0),
            ((5, 1, 100, 0, 0), 100),
            ((5, 1, 100, 100, 100), 100),
            ((5, 4, 100, 100, 100), 100),
            ((5, 4, 100, 100, 400), 100),
            ((5, 4, 100, 400, 400), 100),
            ((5, 5, 100, 100, 100), 0),
            ((5, 5, 100, 100, 400), 0),
            ((5, 5, 100, 0, 500), 100),
            ((5, 5, 100, 0, 100), 100),
        ];
        for (row, expected) in cases {
            assert_eq!(available(true, row), Ok(expected), "{row:?}");
        }
    }

    #[test]
    fn cumulative_invalid_states() {
        #[rustfmt::skip]
        let cases: [Row; 9] = [
            (0, 1, 100, 0, 0),
            (1, 0, 100, 0, 0),
            (1, 2, 100, 0, 0),
            (1, 1, 10, 10, 5),
            (1, 1, 100, 100, 0),
            (5, 1, 100, 100, 0),
            (5, 1, 100, 100, 600),
            (5, 4, 100, 100, 600),
            (5, 5, 100, 100, 600),
        ];
        for row in cases {
            assert!(available(false, row).is_err(), "{row:?}");
        }
        assert_eq!(
            available(false, (1, 2, 100, 0, 0)),
            Err(PadError::LastDebitedCycleBeforeCurrentCycle)
        );
        assert_eq!(
            available(false, (5, 1, 100, 100, 600)),
            Err(PadError::ArithmeticOverflow)
        );
    }

    #[test]
    fn resetting_invalid_states() {
        #[rustfmt::skip]
        let cases: [Row; 7] = [
            (0, 1, 100, 0, 0),
            (1, 0, 100, 0, 0),
            (1, 2, 100, 0, 0),
            (1, 1, 10, 10, 5),
            (5, 5, 100, 400, 400),
            (5, 5, 100, 400, 500),
            (5, 5, 100, 500, 500),
        ];
        for row in cases {
            assert!(available(true, row).is_err(), "{row:?}");
        }
    }

    #[test]
    fn current_cycle() {
        #[rustfmt::skip]
        let cases: [((i64, i64, u64), u64); 7] = [
            ((100, 100, 1), 1),
            ((101, 100, 1), 2),
            ((102, 100, 1), 3),
            ((98, 0, 33), 3),
            ((100, 0, 33), 4),
            ((100, -100, 33), 7),
            ((i64::MAX, 0, 1), 1 << 63),
        ];
        for ((now, activation, freq), expected) in cases {
            assert_eq!(compute_current_cycle(now, activation, freq), Ok(expected));
        }
    }

    #[test]
    fn current_cycle_before_activation() {
        for (now, activation, freq) in [(0, 100, 1), (-1, 100, 1), (99, 100, 1)] {
            assert_eq!(
                compute_current_cycle(now, activation, freq),
                Err(PadError::PreAuthorizationNotActive)
            );
        }
        assert_eq!(
            compute_current_cycle(100, 0, 0),
            Err(PadError::InvalidTimestamp)
        );
    }

    fn one_time(amount_authorized: u64, expiry_unix_timestamp: i64) -> PreAuthorization {
        PreAuthorization {
            bump: 255,
            paused: false,
            token_account: Address::new_from_array([1; 32]),
            variant: PreAuthorizationVariant::OneTime {
                amount_authorized,
                expiry_unix_timestamp,
                amount_debited: 0,
            },
            debit_authority: Address::new_from_array([2; 32]),
            activation_unix_timestamp: 1_000,
        }
    }

    fn recurring(num_cycles: Option<u64>, reset_every_cycle: bool) -> PreAuthorization {
        PreAuthorization {
            bump: 255,
            paused: false,
            token_account: Address::new_from_array([1; 32]),
            variant: PreAuthorizationVariant::Recurring {
                repeat_frequency_seconds: 100,
                recurring_amount_authorized: 50,
                amount_debited_last_cycle: 0,
                amount_debited_total: 0,
                last_debited_cycle: 1,
                num_cycles,
                reset_every_cycle,
            },
            debit_authority: Address::new_from_array([2; 32]),
            activation_unix_timestamp: 1_000,
        }
    }

    #[test]
    fn one_time_debits() {
        let mut pre_authorization = one_time(100, 2_000);

        assert_eq!(
            apply_debit(&mut pre_authorization, 1, 999),
            Err(PadError::PreAuthorizationNotActive)
        );
        assert_eq!(
            apply_debit(&mut pre_authorization, 60, 1_000),
            Ok(DebitEventVariant::OneTime { debit_amount: 60 })
        );
        assert_eq!(
            apply_debit(&mut pre_authorization, 41, 1_500),
            Err(PadError::CannotDebitMoreThanAvailable)
        );
        assert_eq!(available_debit_amount(&pre_authorization, 1_999), Ok(40));
        assert_eq!(
            available_debit_amount(&pre_authorization, 2_000),
            Err(PadError::PreAuthorizationNotActive)
        );

        pre_authorization.paused = true;
        assert_eq!(
            validate_debit(&pre_authorization, 0, 1_500),
            Err(PadError::PreAuthorizationPaused)
        );
    }

    #[test]
    fn recurring_debits_accumulate() {
        let mut pre_authorization = recurring(Some(3), false);

        // Cycle 2 with nothing debited in cycle 1.
        assert_eq!(available_debit_amount(&pre_authorization, 1_150), Ok(100));
        assert_eq!(
            apply_debit(&mut pre_authorization, 70, 1_150),
            Ok(DebitEventVariant::Recurring {
                debit_amount: 70,
                cycle: 2,
            })
        );
        assert_eq!(
            apply_debit(&mut pre_authorization, 30, 1_199),
            Ok(DebitEventVariant::Recurring {
                debit_amount: 30,
                cycle: 2,
            })
        );
        let PreAuthorizationVariant::Recurring {
            amount_debited_last_cycle,
            amount_debited_total,
            last_debited_cycle,
            ..
        } = pre_authorization.variant
        else {
            panic!("expected a recurring pre-authorization");
        };
        assert_eq!(
            (amount_debited_last_cycle, amount_debited_total, last_debited_cycle),
            (100, 100, 2)
        );

        assert_eq!(
            validate_debit(&pre_authorization, 1, 1_199),
            Err(PadError::CannotDebitMoreThanAvailable)
        );
        assert_eq!(available_debit_amount(&pre_authorization, 1_200), Ok(50));
        assert_eq!(
            available_debit_amount(&pre_authorization, 1_300),
            Err(PadError::PreAuthorizationNotActive)
        );
    }

    #[test]
    fn recurring_debits_reset() {
        let mut pre_authorization = recurring(None, true);

        apply_debit(&mut pre_authorization, 50, 1_000).unwrap();
        assert_eq!(available_debit_amount(&pre_authorization, 1_099), Ok(0));
        // Unused allowance doesn't carry over into cycle 10.
        assert_eq!(available_debit_amount(&pre_authorization, 1_900), Ok(50));
        assert_eq!(
            apply_debit(&mut pre_authorization, 20, 1_900),
            Ok(DebitEventVariant::Recurring {
                debit_amount: 20,
                cycle: 10,
            })
        );
        assert_eq!(available_debit_amount(&pre_authorization, 1_950), Ok(30));
    }
}
