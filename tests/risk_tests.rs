//! Capital accounting under concurrent sizing.

mod support;

use std::sync::{Arc, Barrier};
use std::thread;

use paritybot::config::{RiskConfig, TradingConfig};
use paritybot::risk::{AccountState, CapitalAllocator, Sizing};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::market::{make_opportunity, make_overpriced_event};

fn allocator(initial_capital: Decimal) -> Arc<CapitalAllocator> {
    let account = Arc::new(AccountState::new(initial_capital));
    let risk = RiskConfig {
        initial_capital,
        ..RiskConfig::default()
    };
    Arc::new(CapitalAllocator::new(
        risk,
        TradingConfig::default(),
        account,
    ))
}

#[test]
fn concurrent_sizing_never_reserves_more_than_available() {
    let initial = dec!(10000);
    let allocator = allocator(initial);
    let opportunity = Arc::new(make_opportunity(&make_overpriced_event()));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = Vec::new();

    for _ in 0..threads {
        let allocator = Arc::clone(&allocator);
        let opportunity = Arc::clone(&opportunity);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            allocator.size(&opportunity)
        }));
    }

    let mut reserved = Decimal::ZERO;
    let mut reservations = Vec::new();
    for handle in handles {
        if let Sizing::Sized { size, reservation } = handle.join().unwrap() {
            // both legs are covered by the reservation
            assert_eq!(reservation.amount(), size * dec!(2));
            reserved += reservation.amount();
            reservations.push(reservation);
        }
    }

    let account = allocator.account();
    assert!(reserved <= initial, "reserved {reserved} exceeds capital");
    assert_eq!(account.available_capital() + reserved, initial);

    // releasing everything restores the starting balance exactly
    for reservation in reservations {
        account.release(reservation);
    }
    assert_eq!(account.available_capital(), initial);
}

#[test]
fn sizing_respects_open_position_cap() {
    let initial = dec!(10000);
    let allocator = allocator(initial);
    let opportunity = make_opportunity(&make_overpriced_event());

    // drain the position limit (default max is 10)
    let mut sized = 0;
    for _ in 0..64 {
        match allocator.size(&opportunity) {
            Sizing::Sized { size, reservation } => {
                sized += 1;
                let result = support::successful_result(&opportunity, size);
                allocator.account().settle(reservation, &result);
            }
            Sizing::TooSmall => break,
            Sizing::Refused(_) => break,
        }
    }

    assert!(sized <= 10, "sized {sized} trades past the open-position cap");
    assert!(matches!(
        allocator.size(&opportunity),
        Sizing::Refused(_) | Sizing::TooSmall
    ));
}
