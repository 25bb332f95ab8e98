use std::collections::HashSet;

use colored::{
    Color,
    Colorize,
};
use solana_address::Address;
use transaction_parser::{
    client_rpc::{
        parsed_transaction::ParsedTransaction,
        InvocationResult,
    },
    events::PadEvent,
};

/// Format a key/value pair with optional color overrides.
///
/// Requires the `colored::Colorize` trait to be in scope.
///
/// Examples, where `key_color` and `value_color` are `LogColor` values:
/// - fmt_kv!(key, value)
/// - fmt_kv!(key, value, key_color)
/// - fmt_kv!(key, value, key_color, value_color)
#[macro_export]
macro_rules! fmt_kv {
    ($key:expr, $value:expr $(,)?) => {
        $crate::fmt_kv!(
            $key,
            $value,
            $crate::LogColor::Highlight,
            $crate::LogColor::FadedGray
        )
    };
    ($key:expr, $value:expr, $key_color:expr $(,)?) => {
        $crate::fmt_kv!($key, $value, $key_color, $crate::LogColor::FadedGray)
    };
    ($key:expr, $value:expr, $key_color:expr, $value_color:expr $(,)?) => {{
        let __k = ::std::string::ToString::to_string(&$key);
        let __v = ::std::string::ToString::to_string(&$value);
        ::std::format!("{}: {}", __k.color($key_color), __v.color($value_color))
    }};
}

/// Prints a key/value pair with optional color overrides.
///
/// Requires the `colored::Colorize` trait to be in scope.
#[macro_export]
macro_rules! print_kv {
    ($key:expr, $value:expr $(,)?) => {
        ::std::println!("{}", $crate::fmt_kv!($key, $value))
    };
    ($key:expr, $value:expr, $key_color:expr $(,)?) => {
        ::std::println!("{}", $crate::fmt_kv!($key, $value, $key_color))
    };
    ($key:expr, $value:expr, $key_color:expr, $value_color:expr $(,)?) => {
        ::std::println!(
            "{}",
            $crate::fmt_kv!($key, $value, $key_color, $value_color)
        )
    };
}

#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub enum LogColor {
    Highlight,
    Debug,
    Error,
    Warning,
    Header,
    Info,
    Gray,
    FadedGray,
}

#[rustfmt::skip]
mod unformatted {
    use super::*;

    pub fn fmt_divider() -> String { "--------------------------------------------------------------------------------".into() }

    pub fn log_divider() { println!("{}", fmt_divider()); }

    impl From<LogColor> for Color {
        fn from(value: LogColor) -> Color {
            match value {
                LogColor::Highlight  => Color::TrueColor { r: 255, g: 215, b: 87  },
                LogColor::Debug      => Color::TrueColor { r: 40, g: 100,  b: 153 },
                LogColor::Error      => Color::TrueColor { r: 255, g: 0,   b: 45  },
                LogColor::Warning    => Color::TrueColor { r: 180, g: 105, b: 0   },
                LogColor::Header     => Color::TrueColor { r: 0,   g: 255, b: 0   },
                LogColor::Info       => Color::TrueColor { r: 0,   g: 95,  b: 255 },
                LogColor::Gray       => Color::TrueColor { r: 192, g: 192, b: 192 },
                LogColor::FadedGray  => Color::TrueColor { r: 95,  g: 95,  b: 95  },
            }
        }
    }
}

pub use unformatted::*;

/// One line per event: the event name followed by the fields an operator usually cares about.
pub fn fmt_event(event: &PadEvent) -> String {
    let name = event.tag().name().color(LogColor::Header);
    let fields = match event {
        PadEvent::SmartDelegateInitialized(e) => vec![
            fmt_kv!("payer", e.payer),
            fmt_kv!("smart_delegate", e.smart_delegate),
        ],
        PadEvent::OneTimePreAuthorizationCreated(e) => vec![
            fmt_kv!("pre_authorization", e.data.pre_authorization),
            fmt_kv!("debit_authority", e.data.debit_authority),
            fmt_kv!("token_account", e.data.token_account),
        ],
        PadEvent::RecurringPreAuthorizationCreated(e) => vec![
            fmt_kv!("pre_authorization", e.data.pre_authorization),
            fmt_kv!("debit_authority", e.data.debit_authority),
            fmt_kv!("token_account", e.data.token_account),
        ],
        PadEvent::OneTimePreAuthorizationClosed(e) => vec![
            fmt_kv!("pre_authorization", e.data.pre_authorization),
            fmt_kv!("closing_authority", e.data.closing_authority),
            fmt_kv!("receiver", e.data.receiver),
        ],
        PadEvent::RecurringPreAuthorizationClosed(e) => vec![
            fmt_kv!("pre_authorization", e.data.pre_authorization),
            fmt_kv!("closing_authority", e.data.closing_authority),
            fmt_kv!("receiver", e.data.receiver),
        ],
        PadEvent::Debit(e) => vec![
            fmt_kv!("pre_authorization", e.pre_authorization),
            fmt_kv!("amount", e.debit_variant.debit_amount()),
            fmt_kv!("destination", e.destination_token_account),
        ],
        PadEvent::PreAuthorizationPaused(e) => {
            vec![fmt_kv!("pre_authorization", e.data.pre_authorization)]
        }
        PadEvent::PreAuthorizationUnpaused(e) => {
            vec![fmt_kv!("pre_authorization", e.data.pre_authorization)]
        }
    };

    format!("{name} {}", fields.join(", "))
}

/// Prints a transaction's status, the compute units used by each top-level invocation and its
/// program events.
///
/// An empty `program_id_filter` prints every invocation.
pub fn print_transaction(transaction: &ParsedTransaction, program_id_filter: &HashSet<Address>) {
    log_divider();
    let status = match &transaction.err {
        None => "success".color(LogColor::Header),
        Some(err) => err.to_string().color(LogColor::Error),
    };
    print_kv!("Signature", transaction.signature, LogColor::Info);
    print_kv!("Slot", transaction.slot);
    println!("{}: {status}", "Status".color(LogColor::Highlight));

    for invocation in transaction.invocations.iter().filter(|invocation| {
        invocation.is_top_level()
            && (program_id_filter.is_empty() || program_id_filter.contains(&invocation.program_id))
    }) {
        let result_color = match &invocation.result {
            Some(InvocationResult::Success) => LogColor::Gray,
            _ => LogColor::Warning,
        };
        print_kv!(
            format!("  {}", invocation.program_id),
            invocation
                .units_consumed
                .map_or("? CUs".to_string(), |units| format!("{units} CUs")),
            result_color,
        );
    }

    for event in transaction.events.iter() {
        println!("  {}", fmt_event(event));
    }
    if let Some(err) = transaction.pad_error() {
        print_kv!("  Program error", err, LogColor::Error);
    }
}
