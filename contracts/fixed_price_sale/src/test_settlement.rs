#![allow(clippy::unwrap_used)]

use soroban_sdk::{symbol_short, testutils::Address as _, Address, BytesN, Vec};

use crate::events::{
    AcceptedCapitalSet, CapitalWithdrawn, ExcessCapitalWithdrawn, SaleResultsPublished,
    TokenAllocationClaimed, TokensSuppliedForDistribution,
};
use crate::testutils::{last_sale_event, linear_vesting, FeeRates, MerkleTree, SaleFixture, UNIT};
use crate::{Error, SaleState, VestingType};

const DAY: u64 = 24 * 3_600;

struct Settlement {
    f: SaleFixture,
    alice: Address,
    bob: Address,
    accepted: MerkleTree,
    claims: MerkleTree,
}

/// Alice over-subscribes by 200, Bob is fully accepted; 4000 tokens at price 1.
fn invested(fees: FeeRates) -> Settlement {
    let f = SaleFixture::with_fees(fees);
    let alice = f.investor(1_200 * UNIT);
    let bob = f.investor(3_000 * UNIT);
    f.invest(&alice, 1_200 * UNIT);
    f.warp_to_sale_start();
    f.invest(&bob, 3_000 * UNIT);

    let accepted = MerkleTree::new(
        &f.env,
        &[(alice.clone(), 1_000 * UNIT), (bob.clone(), 3_000 * UNIT)],
    );
    let claims = MerkleTree::new(
        &f.env,
        &[(alice.clone(), 1_000 * UNIT), (bob.clone(), 3_000 * UNIT)],
    );
    Settlement {
        f,
        alice,
        bob,
        accepted,
        claims,
    }
}

fn published(fees: FeeRates) -> Settlement {
    let s = invested(fees);
    s.f.warp_past_refund_period();
    s.f.sale.publish_sale_results(
        &s.f.legion,
        &s.claims.root(),
        &s.accepted.root(),
        &(4_000 * UNIT),
    );
    s
}

fn supplied() -> Settlement {
    let s = published(FeeRates::default());
    s.f.supply_allocated_tokens();
    s
}

// ==================== Publish ====================

#[test]
fn test_publish_records_snapshot() {
    let s = invested(FeeRates::default());
    s.f.warp_past_refund_period();
    s.f.sale.publish_sale_results(
        &s.f.legion,
        &s.claims.root(),
        &s.accepted.root(),
        &(4_000 * UNIT),
    );

    let event: SaleResultsPublished =
        last_sale_event(&s.f.env, symbol_short!("published")).unwrap();
    assert_eq!(
        event,
        SaleResultsPublished {
            claim_merkle_root: s.claims.root(),
            accepted_merkle_root: s.accepted.root(),
            tokens_allocated: 4_000 * UNIT,
        }
    );

    let status = s.f.sale.sale_status();
    assert!(status.results_published);
    assert_eq!(status.total_tokens_allocated, 4_000 * UNIT);
    assert_eq!(status.total_capital_raised, 4_000 * UNIT);
    assert_eq!(status.total_capital_invested, 4_200 * UNIT);
    assert_eq!(s.f.sale.sale_state(), SaleState::ResultsPublished);
}

#[test]
fn test_publish_is_one_shot() {
    let s = published(FeeRates::default());
    assert_eq!(
        s.f.sale.try_publish_sale_results(
            &s.f.legion,
            &s.claims.root(),
            &s.accepted.root(),
            &(4_000 * UNIT)
        ),
        Err(Ok(Error::TokensAlreadyAllocated))
    );
}

#[test]
fn test_publish_during_refund_period_fails() {
    let s = invested(FeeRates::default());
    s.f.warp_to_refund_period();
    assert_eq!(
        s.f.sale.try_publish_sale_results(
            &s.f.legion,
            &s.claims.root(),
            &s.accepted.root(),
            &(4_000 * UNIT)
        ),
        Err(Ok(Error::RefundPeriodIsNotOver))
    );
}

#[test]
fn test_publish_rejects_zero_allocation_and_strangers() {
    let s = invested(FeeRates::default());
    s.f.warp_past_refund_period();
    assert_eq!(
        s.f.sale.try_publish_sale_results(
            &s.f.legion,
            &s.claims.root(),
            &s.accepted.root(),
            &0
        ),
        Err(Ok(Error::ZeroValueProvided))
    );
    assert_eq!(
        s.f.sale.try_publish_sale_results(
            &s.f.project,
            &s.claims.root(),
            &s.accepted.root(),
            &(4_000 * UNIT)
        ),
        Err(Ok(Error::NotCalledByLegion))
    );
}

#[test]
fn test_cancel_after_publish_fails() {
    let s = published(FeeRates::default());
    assert_eq!(
        s.f.sale.try_cancel_sale(&s.f.project),
        Err(Ok(Error::SaleResultsAlreadyPublished))
    );
}

#[test]
fn test_publish_after_cancel_fails() {
    let s = invested(FeeRates::default());
    s.f.sale.cancel_sale(&s.f.project);
    s.f.warp_past_refund_period();
    assert_eq!(
        s.f.sale.try_publish_sale_results(
            &s.f.legion,
            &s.claims.root(),
            &s.accepted.root(),
            &(4_000 * UNIT)
        ),
        Err(Ok(Error::SaleIsCanceled))
    );
}

// ==================== Supply ====================

#[test]
fn test_supply_exact_amount_and_fees() {
    let s = published(FeeRates::default());
    assert_eq!(s.f.sale.expected_token_fees(), (100 * UNIT, 40 * UNIT));

    s.f.ask_admin.mint(&s.f.project, &(4_140 * UNIT));
    s.f.sale.supply_tokens(
        &s.f.project,
        &(4_000 * UNIT),
        &(100 * UNIT),
        &(40 * UNIT),
    );

    let event: TokensSuppliedForDistribution =
        last_sale_event(&s.f.env, symbol_short!("supplied")).unwrap();
    assert_eq!(
        event,
        TokensSuppliedForDistribution {
            amount: 4_000 * UNIT,
            legion_fee: 100 * UNIT,
            referrer_fee: 40 * UNIT,
        }
    );
    assert_eq!(s.f.ask.balance(&s.f.sale_id), 4_000 * UNIT);
    assert_eq!(s.f.ask.balance(&s.f.fee_receiver), 100 * UNIT);
    assert_eq!(s.f.ask.balance(&s.f.referrer), 40 * UNIT);
    assert_eq!(s.f.sale.sale_state(), SaleState::TokensSupplied);
}

#[test]
fn test_supply_wrong_amount_fails() {
    let s = published(FeeRates::default());
    s.f.ask_admin.mint(&s.f.project, &(10_130 * UNIT));
    assert_eq!(
        s.f.sale.try_supply_tokens(
            &s.f.project,
            &(9_990 * UNIT),
            &(100 * UNIT),
            &(40 * UNIT)
        ),
        Err(Ok(Error::InvalidTokenAmountSupplied))
    );
}

#[test]
fn test_supply_wrong_fee_fails() {
    let s = published(FeeRates::default());
    s.f.ask_admin.mint(&s.f.project, &(4_200 * UNIT));
    assert_eq!(
        s.f.sale.try_supply_tokens(
            &s.f.project,
            &(4_000 * UNIT),
            &(99 * UNIT),
            &(40 * UNIT)
        ),
        Err(Ok(Error::InvalidFeeAmount))
    );
    assert_eq!(
        s.f.sale.try_supply_tokens(
            &s.f.project,
            &(4_000 * UNIT),
            &(100 * UNIT),
            &0
        ),
        Err(Ok(Error::InvalidFeeAmount))
    );
}

#[test]
fn test_supply_with_zero_fee_rates() {
    let s = published(FeeRates {
        legion_on_capital: 0,
        legion_on_tokens: 0,
        referrer_on_capital: 0,
        referrer_on_tokens: 0,
    });
    s.f.ask_admin.mint(&s.f.project, &(4_000 * UNIT));
    s.f.sale
        .supply_tokens(&s.f.project, &(4_000 * UNIT), &0, &0);

    let event: TokensSuppliedForDistribution =
        last_sale_event(&s.f.env, symbol_short!("supplied")).unwrap();
    assert_eq!(event.legion_fee, 0);
    assert_eq!(event.referrer_fee, 0);
    assert_eq!(s.f.ask.balance(&s.f.fee_receiver), 0);
}

#[test]
fn test_supply_preconditions() {
    let s = invested(FeeRates::default());
    s.f.warp_past_refund_period();
    assert_eq!(
        s.f.sale.try_supply_tokens(&s.f.project, &(4_000 * UNIT), &0, &0),
        Err(Ok(Error::TokensNotAllocated))
    );
    assert_eq!(s.f.sale.try_expected_token_fees(), Err(Ok(Error::TokensNotAllocated)));

    s.f.sale.publish_sale_results(
        &s.f.legion,
        &s.claims.root(),
        &s.accepted.root(),
        &(4_000 * UNIT),
    );
    assert_eq!(
        s.f.sale.try_supply_tokens(
            &s.f.legion,
            &(4_000 * UNIT),
            &(100 * UNIT),
            &(40 * UNIT)
        ),
        Err(Ok(Error::NotCalledByProject))
    );

    s.f.supply_allocated_tokens();
    assert_eq!(
        s.f.sale.try_supply_tokens(
            &s.f.project,
            &(4_000 * UNIT),
            &(100 * UNIT),
            &(40 * UNIT)
        ),
        Err(Ok(Error::TokensAlreadySupplied))
    );
}

// ==================== Capital withdrawal ====================

#[test]
fn test_withdraw_raised_capital_once() {
    let s = supplied();

    assert_eq!(s.f.sale.withdraw_raised_capital(&s.f.project), 3_860 * UNIT);
    let event: CapitalWithdrawn = last_sale_event(&s.f.env, symbol_short!("cap_wdrw")).unwrap();
    assert_eq!(
        event,
        CapitalWithdrawn {
            amount: 4_000 * UNIT
        }
    );
    assert_eq!(s.f.bid.balance(&s.f.project), 3_860 * UNIT);
    assert_eq!(s.f.bid.balance(&s.f.fee_receiver), 100 * UNIT);
    assert_eq!(s.f.bid.balance(&s.f.referrer), 40 * UNIT);
    assert_eq!(s.f.bid.balance(&s.f.sale_id), 200 * UNIT);
    assert_eq!(s.f.sale.sale_state(), SaleState::CapitalWithdrawn);

    assert_eq!(
        s.f.sale.try_withdraw_raised_capital(&s.f.project),
        Err(Ok(Error::CapitalAlreadyWithdrawn))
    );
}

#[test]
fn test_withdraw_raised_capital_requires_supply() {
    let s = published(FeeRates::default());
    assert_eq!(
        s.f.sale.try_withdraw_raised_capital(&s.f.project),
        Err(Ok(Error::TokensNotSupplied))
    );
    assert_eq!(
        s.f.sale.try_withdraw_raised_capital(&s.f.legion),
        Err(Ok(Error::NotCalledByProject))
    );
}

#[test]
fn test_withdraw_raised_capital_before_publish_fails() {
    let s = invested(FeeRates::default());
    s.f.warp_past_refund_period();
    assert_eq!(
        s.f.sale.try_withdraw_raised_capital(&s.f.project),
        Err(Ok(Error::SaleResultsNotPublished))
    );
}

#[test]
fn test_withdraw_fails_when_allocation_rounds_to_no_capital() {
    // 1000 base units at one base unit of bid token per whole ask token.
    let f = SaleFixture::deploy(FeeRates::default());
    let mut fixed_params = f.fixed_price_params.clone();
    fixed_params.token_price = 1;
    f.sale.initialize(&f.sale_params, &fixed_params);

    f.warp_past_refund_period();
    let root = BytesN::from_array(&f.env, &[3u8; 32]);
    f.sale.publish_sale_results(&f.legion, &root, &root, &1_000);
    assert_eq!(f.sale.sale_status().total_capital_raised, 0);
    f.supply_allocated_tokens();

    assert_eq!(
        f.sale.try_withdraw_raised_capital(&f.project),
        Err(Ok(Error::CapitalNotRaised))
    );
    assert!(!f.sale.sale_status().capital_withdrawn);
}

// ==================== Excess capital ====================

#[test]
fn test_excess_withdrawal_once() {
    let s = published(FeeRates::default());

    s.f.sale.withdraw_excess_invested_capital(
        &s.alice,
        &(200 * UNIT),
        &s.accepted.proof(0),
    );
    let event: ExcessCapitalWithdrawn =
        last_sale_event(&s.f.env, symbol_short!("excess")).unwrap();
    assert_eq!(
        event,
        ExcessCapitalWithdrawn {
            amount: 200 * UNIT,
            investor: s.alice.clone(),
            position_id: 1,
        }
    );

    assert_eq!(s.f.bid.balance(&s.alice), 200 * UNIT);
    let position = s.f.sale.investor_position(&s.alice);
    assert!(position.has_claimed_excess);
    assert_eq!(position.invested_capital, 1_000 * UNIT);
    assert_eq!(s.f.sale.sale_status().total_capital_invested, 4_000 * UNIT);

    assert_eq!(
        s.f.sale.try_withdraw_excess_invested_capital(
            &s.alice,
            &(200 * UNIT),
            &s.accepted.proof(0)
        ),
        Err(Ok(Error::AlreadyClaimedExcess))
    );
}

#[test]
fn test_excess_withdrawal_with_tampered_amount_fails() {
    let s = published(FeeRates::default());
    assert_eq!(
        s.f.sale.try_withdraw_excess_invested_capital(
            &s.alice,
            &(250 * UNIT),
            &s.accepted.proof(0)
        ),
        Err(Ok(Error::CannotWithdrawExcessInvestedCapital))
    );
    assert_eq!(
        s.f.sale.try_withdraw_excess_invested_capital(
            &s.bob,
            &(200 * UNIT),
            &s.accepted.proof(0)
        ),
        Err(Ok(Error::CannotWithdrawExcessInvestedCapital))
    );
}

#[test]
fn test_excess_withdrawal_without_root_fails() {
    let s = invested(FeeRates::default());
    assert_eq!(
        s.f.sale.try_withdraw_excess_invested_capital(
            &s.alice,
            &(200 * UNIT),
            &Vec::new(&s.f.env)
        ),
        Err(Ok(Error::CannotWithdrawExcessInvestedCapital))
    );
}

#[test]
fn test_excess_withdrawal_during_sale_via_accepted_capital() {
    let s = invested(FeeRates::default());
    s.f.sale
        .set_accepted_capital(&s.f.legion, &s.accepted.root());
    let event: AcceptedCapitalSet = last_sale_event(&s.f.env, symbol_short!("acc_cap")).unwrap();
    assert_eq!(event.accepted_merkle_root, s.accepted.root());

    s.f.sale.withdraw_excess_invested_capital(
        &s.alice,
        &(200 * UNIT),
        &s.accepted.proof(0),
    );
    assert_eq!(s.f.bid.balance(&s.alice), 200 * UNIT);

    // A position that already took back excess can neither refund nor top up.
    assert_eq!(s.f.sale.try_refund(&s.alice), Err(Ok(Error::InvestorHasClaimedExcess)));
    let signature = s.f.sign_investment(&s.alice);
    assert_eq!(
        s.f.sale.try_invest(&s.alice, &(100 * UNIT), &signature),
        Err(Ok(Error::InvestorHasClaimedExcess))
    );
}

#[test]
fn test_set_accepted_capital_requires_legion() {
    let s = invested(FeeRates::default());
    assert_eq!(
        s.f.sale
            .try_set_accepted_capital(&s.alice, &s.accepted.root()),
        Err(Ok(Error::NotCalledByLegion))
    );
}

#[test]
fn test_excess_withdrawal_by_stranger_fails() {
    let s = published(FeeRates::default());
    let stranger = Address::generate(&s.f.env);
    assert_eq!(
        s.f.sale.try_withdraw_excess_invested_capital(
            &stranger,
            &(200 * UNIT),
            &s.accepted.proof(0)
        ),
        Err(Ok(Error::InvestorPositionDoesNotExist))
    );
}

// ==================== Token claims ====================

#[test]
fn test_claim_fully_unlocked_at_tge() {
    let s = supplied();
    let now = s.f.env.ledger().timestamp();

    s.f.sale.claim_token_allocation(
        &s.bob,
        &(3_000 * UNIT),
        &linear_vesting(now, 10_000),
        &s.claims.proof(1),
    );
    let event: TokenAllocationClaimed =
        last_sale_event(&s.f.env, symbol_short!("claimed")).unwrap();
    assert_eq!(
        event,
        TokenAllocationClaimed {
            amount: 3_000 * UNIT,
            investor: s.bob.clone(),
            position_id: 2,
            vesting_address: None,
        }
    );
    assert_eq!(s.f.ask.balance(&s.bob), 3_000 * UNIT);
    assert_eq!(s.f.factory.created_count(), 0);

    let position = s.f.sale.investor_position(&s.bob);
    assert!(position.has_settled);
    assert_eq!(position.vesting_address, None);
    assert_eq!(
        s.f.sale.try_release_vested_tokens(&s.bob),
        Err(Ok(Error::ZeroAddressProvided))
    );
}

#[test]
fn test_claim_splits_between_tge_and_vesting() {
    let s = supplied();
    let sinks = s.f.provision_vesting_sinks(1);
    let sink = sinks.get_unchecked(0);
    let start = s.f.env.ledger().timestamp();

    s.f.sale.claim_token_allocation(
        &s.alice,
        &(1_000 * UNIT),
        &linear_vesting(start, 1_000),
        &s.claims.proof(0),
    );
    let event: TokenAllocationClaimed =
        last_sale_event(&s.f.env, symbol_short!("claimed")).unwrap();
    assert_eq!(event.vesting_address, Some(sink.clone()));

    assert_eq!(s.f.ask.balance(&s.alice), 100 * UNIT);
    assert_eq!(s.f.ask.balance(&sink), 900 * UNIT);
    assert_eq!(
        s.f.sale.investor_position(&s.alice).vesting_address,
        Some(sink.clone())
    );

    let status = s.f.sale.investor_vesting_status(&s.alice);
    assert_eq!(status.vesting_address, sink);
    assert_eq!(status.start, start);
    assert_eq!(status.cliff_end, start + DAY);
    assert_eq!(status.end, start + 7 * DAY);
    assert_eq!(status.releasable, 0);

    // Nothing unlocks before the cliff.
    s.f.warp_to(start + DAY - 1);
    assert_eq!(s.f.sale.release_vested_tokens(&s.alice), 0);

    s.f.warp_to(start + 7 * DAY / 2);
    assert_eq!(s.f.sale.release_vested_tokens(&s.alice), 450 * UNIT);
    assert_eq!(s.f.ask.balance(&s.alice), 550 * UNIT);

    s.f.warp_to(start + 7 * DAY);
    assert_eq!(s.f.sale.release_vested_tokens(&s.alice), 450 * UNIT);
    assert_eq!(s.f.ask.balance(&s.alice), 1_000 * UNIT);
    assert_eq!(s.f.sale.investor_vesting_status(&s.alice).released, 900 * UNIT);
}

#[test]
fn test_claim_with_epoch_vesting() {
    let s = supplied();
    s.f.provision_vesting_sinks(1);
    let start = s.f.env.ledger().timestamp();
    let mut config = linear_vesting(start, 0);
    config.vesting_type = VestingType::LinearEpoch;
    config.vesting_cliff_duration_seconds = 0;
    config.epoch_duration_seconds = DAY;
    config.number_of_epochs = 7;

    s.f.sale.claim_token_allocation(
        &s.bob,
        &(3_000 * UNIT),
        &config,
        &s.claims.proof(1),
    );
    assert_eq!(s.f.ask.balance(&s.bob), 0);

    // Two full epochs plus change.
    s.f.warp_to(start + 2 * DAY + 100);
    let released = s.f.sale.release_vested_tokens(&s.bob);
    assert_eq!(released, 3_000 * UNIT * 2 / 7);
}

#[test]
fn test_claim_twice_fails() {
    let s = supplied();
    let now = s.f.env.ledger().timestamp();
    let config = linear_vesting(now, 10_000);
    s.f.sale
        .claim_token_allocation(&s.bob, &(3_000 * UNIT), &config, &s.claims.proof(1));
    assert_eq!(
        s.f.sale.try_claim_token_allocation(
            &s.bob,
            &(3_000 * UNIT),
            &config,
            &s.claims.proof(1)
        ),
        Err(Ok(Error::AlreadySettled))
    );
}

#[test]
fn test_claim_outside_whitelist_fails() {
    let s = supplied();
    let now = s.f.env.ledger().timestamp();
    assert_eq!(
        s.f.sale.try_claim_token_allocation(
            &s.bob,
            &(3_001 * UNIT),
            &linear_vesting(now, 10_000),
            &s.claims.proof(1)
        ),
        Err(Ok(Error::NotInClaimWhitelist))
    );
}

#[test]
fn test_claim_with_malformed_schedule_fails() {
    let s = supplied();
    let now = s.f.env.ledger().timestamp();
    let mut config = linear_vesting(now, 1_000);
    config.vesting_cliff_duration_seconds = config.vesting_duration_seconds + 1;
    assert_eq!(
        s.f.sale.try_claim_token_allocation(
            &s.bob,
            &(3_000 * UNIT),
            &config,
            &s.claims.proof(1)
        ),
        Err(Ok(Error::InvalidVestingConfig))
    );
}

#[test]
fn test_claim_preconditions() {
    let s = invested(FeeRates::default());
    let now = s.f.env.ledger().timestamp();
    let config = linear_vesting(now, 10_000);

    s.f.warp_to_refund_period();
    assert_eq!(
        s.f.sale.try_claim_token_allocation(
            &s.bob,
            &(3_000 * UNIT),
            &config,
            &s.claims.proof(1)
        ),
        Err(Ok(Error::RefundPeriodIsNotOver))
    );

    s.f.warp_past_refund_period();
    assert_eq!(
        s.f.sale.try_claim_token_allocation(
            &s.bob,
            &(3_000 * UNIT),
            &config,
            &s.claims.proof(1)
        ),
        Err(Ok(Error::SaleResultsNotPublished))
    );

    s.f.sale.publish_sale_results(
        &s.f.legion,
        &s.claims.root(),
        &s.accepted.root(),
        &(4_000 * UNIT),
    );
    assert_eq!(
        s.f.sale.try_claim_token_allocation(
            &s.bob,
            &(3_000 * UNIT),
            &config,
            &s.claims.proof(1)
        ),
        Err(Ok(Error::TokensNotSupplied))
    );
}

#[test]
fn test_full_settlement_drains_sale() {
    let s = supplied();
    s.f.provision_vesting_sinks(1);
    let now = s.f.env.ledger().timestamp();

    s.f.sale.withdraw_excess_invested_capital(
        &s.alice,
        &(200 * UNIT),
        &s.accepted.proof(0),
    );
    s.f.sale.claim_token_allocation(
        &s.alice,
        &(1_000 * UNIT),
        &linear_vesting(now, 2_500),
        &s.claims.proof(0),
    );
    s.f.sale.claim_token_allocation(
        &s.bob,
        &(3_000 * UNIT),
        &linear_vesting(now, 10_000),
        &s.claims.proof(1),
    );
    s.f.sale.withdraw_raised_capital(&s.f.project);

    assert_eq!(s.f.ask.balance(&s.f.sale_id), 0);
    assert_eq!(s.f.bid.balance(&s.f.sale_id), 0);
    assert_eq!(s.f.ask.balance(&s.alice), 250 * UNIT);
}

#[test]
fn test_emergency_withdraw_ignores_lifecycle() {
    let s = supplied();
    let rescue = Address::generate(&s.f.env);
    s.f.sale.pause(&s.f.legion);
    s.f.sale.emergency_withdraw(
        &s.f.legion,
        &rescue,
        &s.f.ask.address,
        &(4_000 * UNIT),
    );
    assert_eq!(s.f.ask.balance(&rescue), 4_000 * UNIT);
    assert_eq!(
        s.f.sale.try_emergency_withdraw(
            &s.f.legion,
            &rescue,
            &s.f.ask.address,
            &0
        ),
        Err(Ok(Error::ZeroValueProvided))
    );
}
