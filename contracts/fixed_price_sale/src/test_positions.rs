#![allow(clippy::unwrap_used)]

use soroban_sdk::{symbol_short, testutils::Address as _, Address, BytesN, String};

use crate::events::{PositionBurned, PositionTransferred};
use crate::testutils::{last_sale_event, SaleFixture, UNIT};
use crate::Error;

fn two_investors(f: &SaleFixture) -> (Address, Address) {
    let alice = f.investor(1_000 * UNIT);
    let bob = f.investor(1_000 * UNIT);
    f.invest(&alice, 400 * UNIT);
    f.invest(&bob, 100 * UNIT);
    (alice, bob)
}

// ==================== Token facade ====================

#[test]
fn test_position_ids_are_sequential() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);

    assert_eq!(f.sale.investor_position(&alice).position_id, 1);
    assert_eq!(f.sale.investor_position(&bob).position_id, 2);
    assert_eq!(f.sale.owner_of(&2), bob);
    assert_eq!(f.sale.total_positions(), 2);
}

#[test]
fn test_token_metadata() {
    let f = SaleFixture::new();
    let (_, _) = two_investors(&f);

    assert_eq!(f.sale.name(), String::from_str(&f.env, "Legion LFG Sale"));
    assert_eq!(f.sale.symbol(), String::from_str(&f.env, "LLFG"));
    assert_eq!(
        f.sale.token_uri(&2),
        String::from_str(&f.env, "https://metadata.legion.cc/2")
    );
}

#[test]
fn test_token_uri_for_missing_position_fails() {
    let f = SaleFixture::new();
    assert_eq!(
        f.sale.try_token_uri(&7),
        Err(Ok(Error::InvestorPositionDoesNotExist))
    );
    assert_eq!(f.sale.try_owner_of(&7), Err(Ok(Error::InvestorPositionDoesNotExist)));
    assert_eq!(f.sale.balance_of(&Address::generate(&f.env)), 0);
}

#[test]
fn test_token_uri_with_multi_digit_id() {
    let f = SaleFixture::new();
    let last = (0..12)
        .map(|_| {
            let investor = f.investor(10 * UNIT);
            f.invest(&investor, 10 * UNIT);
            investor
        })
        .last()
        .unwrap();
    assert_eq!(f.sale.investor_position(&last).position_id, 12);
    assert_eq!(
        f.sale.token_uri(&12),
        String::from_str(&f.env, "https://metadata.legion.cc/12")
    );
}

// ==================== Legion transfer ====================

#[test]
fn test_transfer_to_fresh_address_moves_position() {
    let f = SaleFixture::new();
    let (alice, _) = two_investors(&f);
    let carol = Address::generate(&f.env);
    f.warp_past_refund_period();

    f.sale.transfer_investor_position(&f.legion, &alice, &carol, &1);
    let event: PositionTransferred = last_sale_event(&f.env, symbol_short!("transfer")).unwrap();
    assert_eq!(
        event,
        PositionTransferred {
            from: alice.clone(),
            to: carol.clone(),
            position_id: 1,
        }
    );

    assert_eq!(f.sale.owner_of(&1), carol);
    assert_eq!(f.sale.balance_of(&alice), 0);
    assert_eq!(f.sale.balance_of(&carol), 1);
    assert_eq!(f.sale.investor_position(&carol).invested_capital, 400 * UNIT);
    assert_eq!(
        f.sale.try_investor_position(&alice),
        Err(Ok(Error::InvestorPositionDoesNotExist))
    );
}

#[test]
fn test_transfer_to_holder_merges_and_burns_source() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    f.warp_past_refund_period();

    f.sale.transfer_investor_position(&f.legion, &alice, &bob, &1);
    let event: PositionBurned = last_sale_event(&f.env, symbol_short!("burn")).unwrap();
    assert_eq!(
        event,
        PositionBurned {
            owner: alice.clone(),
            position_id: 1,
        }
    );

    let merged = f.sale.investor_position(&bob);
    assert_eq!(merged.position_id, 2);
    assert_eq!(merged.invested_capital, 500 * UNIT);
    assert_eq!(f.sale.try_owner_of(&1), Err(Ok(Error::InvestorPositionDoesNotExist)));
    assert_eq!(f.sale.balance_of(&alice), 0);
    assert_eq!(f.sale.sale_status().total_capital_invested, 500 * UNIT);
}

#[test]
fn test_merge_into_refunded_position_fails() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    f.warp_to_refund_period();
    f.sale.refund(&bob);
    f.warp_past_refund_period();

    assert_eq!(
        f.sale
            .try_transfer_investor_position(&f.legion, &alice, &bob, &1),
        Err(Ok(Error::UnableToMergeInvestorPosition))
    );
}

#[test]
fn test_transfer_of_refunded_position_fails() {
    let f = SaleFixture::new();
    let (alice, _) = two_investors(&f);
    f.sale.refund(&alice);
    f.warp_past_refund_period();

    assert_eq!(
        f.sale.try_transfer_investor_position(
            &f.legion,
            &alice,
            &Address::generate(&f.env),
            &1
        ),
        Err(Ok(Error::UnableToTransferInvestorPosition))
    );
}

#[test]
fn test_transfer_of_foreign_position_fails() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    f.warp_past_refund_period();

    assert_eq!(
        f.sale.try_transfer_investor_position(
            &f.legion,
            &alice,
            &Address::generate(&f.env),
            &2
        ),
        Err(Ok(Error::UnableToTransferInvestorPosition))
    );
    assert_eq!(f.sale.owner_of(&2), bob);
}

#[test]
fn test_transfer_before_refund_over_fails() {
    let f = SaleFixture::new();
    let (alice, _) = two_investors(&f);
    f.warp_to_refund_period();

    assert_eq!(
        f.sale.try_transfer_investor_position(
            &f.legion,
            &alice,
            &Address::generate(&f.env),
            &1
        ),
        Err(Ok(Error::RefundPeriodIsNotOver))
    );
}

#[test]
fn test_transfer_after_publish_fails() {
    let f = SaleFixture::new();
    let (alice, _) = two_investors(&f);
    f.warp_past_refund_period();
    f.sale.publish_sale_results(
        &f.legion,
        &BytesN::from_array(&f.env, &[1u8; 32]),
        &BytesN::from_array(&f.env, &[2u8; 32]),
        &(100 * UNIT),
    );

    assert_eq!(
        f.sale.try_transfer_investor_position(
            &f.legion,
            &alice,
            &Address::generate(&f.env),
            &1
        ),
        Err(Ok(Error::SaleResultsAlreadyPublished))
    );
}

#[test]
fn test_transfer_after_cancel_fails() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    f.sale.cancel_sale(&f.project);
    f.warp_past_refund_period();

    assert_eq!(
        f.sale
            .try_transfer_investor_position(&f.legion, &alice, &bob, &1),
        Err(Ok(Error::SaleIsCanceled))
    );
}

#[test]
fn test_transfer_requires_legion() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    f.warp_past_refund_period();

    assert_eq!(
        f.sale
            .try_transfer_investor_position(&alice, &alice, &bob, &1),
        Err(Ok(Error::NotCalledByLegion))
    );
}

// ==================== Signed transfer ====================

#[test]
fn test_signed_transfer_consumes_nonce() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    f.warp_past_refund_period();
    assert_eq!(f.sale.transfer_nonce(&alice), 0);

    let signature = f.sign_transfer(&alice, &bob, 1);
    f.sale
        .transfer_investor_position_auth(&alice, &bob, &1, &signature);

    assert_eq!(f.sale.transfer_nonce(&alice), 1);
    assert_eq!(f.sale.investor_position(&bob).invested_capital, 500 * UNIT);
}

#[test]
fn test_signed_transfer_bound_to_destination() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    let mallory = Address::generate(&f.env);
    f.warp_past_refund_period();

    let signature = f.sign_transfer(&alice, &bob, 1);
    assert_eq!(
        f.sale
            .try_transfer_investor_position_auth(&alice, &mallory, &1, &signature),
        Err(Ok(Error::InvalidSignature))
    );
    assert_eq!(f.sale.transfer_nonce(&alice), 0);
}

#[test]
fn test_signed_transfer_cannot_be_replayed() {
    let f = SaleFixture::new();
    let (alice, bob) = two_investors(&f);
    let carol = Address::generate(&f.env);
    f.warp_past_refund_period();

    let to_carol = f.sign_transfer(&alice, &carol, 1);
    f.sale
        .transfer_investor_position_auth(&alice, &carol, &1, &to_carol);

    // Carol hands it back, then the stale approval is presented again.
    let back = f.sign_transfer(&carol, &alice, 1);
    f.sale
        .transfer_investor_position_auth(&carol, &alice, &1, &back);
    assert_eq!(
        f.sale
            .try_transfer_investor_position_auth(&alice, &carol, &1, &to_carol),
        Err(Ok(Error::InvalidSignature))
    );
    assert_eq!(f.sale.owner_of(&1), alice);
    assert_eq!(f.sale.owner_of(&2), bob);
}
