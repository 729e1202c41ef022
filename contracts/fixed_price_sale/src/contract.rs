use soroban_sdk::{
    contract, contractimpl, contractmeta, log, token, Address, BytesN, Env, String, Vec,
};

use crate::authorizer;
use crate::clock::{self, Timeline};
use crate::errors::Error;
use crate::events;
use crate::fees;
use crate::merkle;
use crate::positions;
use crate::registry;
use crate::storage::{self, InitState};
use crate::types::*;
use crate::vesting;

// Metadata that is added on to every WASM custom section
contractmeta!(
    key = "Description",
    val = "Fixed-price token sale with prefunding, Merkle-gated settlement and vesting"
);

#[contract]
pub struct FixedPriceSale;

// ── Guards ───────────────────────────────────────────────────────────

fn only_legion(env: &Env, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    if *caller != storage::get_legion_addresses(env)?.bouncer {
        return Err(Error::NotCalledByLegion);
    }
    Ok(())
}

fn only_project(caller: &Address, config: &SaleConfiguration) -> Result<(), Error> {
    caller.require_auth();
    if *caller != config.project_admin {
        return Err(Error::NotCalledByProject);
    }
    Ok(())
}

fn when_not_paused(env: &Env) -> Result<(), Error> {
    if storage::is_paused(env) {
        return Err(Error::SaleIsPaused);
    }
    Ok(())
}

fn when_not_canceled(status: &SaleStatus) -> Result<(), Error> {
    if status.is_canceled {
        return Err(Error::SaleIsCanceled);
    }
    Ok(())
}

fn timeline(env: &Env) -> Result<Timeline, Error> {
    let config = storage::get_sale_config(env)?;
    let fixed = storage::get_fixed_price_config(env)?;
    Ok(Timeline::from_config(&config, &fixed))
}

fn add_capital(status: &mut SaleStatus, amount: i128) -> Result<(), Error> {
    status.total_capital_invested = status
        .total_capital_invested
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    Ok(())
}

fn remove_capital(status: &mut SaleStatus, amount: i128) -> Result<(), Error> {
    status.total_capital_invested = status
        .total_capital_invested
        .checked_sub(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    Ok(())
}

/// Pays `amount` of `token` out of the sale. Zero amounts are skipped.
fn pay_out(env: &Env, token: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        token::Client::new(env, token).transfer(&env.current_contract_address(), to, &amount);
    }
}

/// Pulls `amount` of `token` from `from` into `to`. Zero amounts are skipped.
fn pull(env: &Env, token: &Address, from: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        token::Client::new(env, token).transfer(from, to, &amount);
    }
}

/// Positions move only between the end of the refund period and publication, since
/// the settlement snapshot is keyed by address.
fn verify_can_transfer_position(env: &Env) -> Result<(), Error> {
    let status = storage::get_status(env)?;
    when_not_canceled(&status)?;
    clock::verify_refund_period_is_over(env, &timeline(env)?)?;
    if status.results_published {
        return Err(Error::SaleResultsAlreadyPublished);
    }
    Ok(())
}

#[contractimpl]
impl FixedPriceSale {
    // ==================== Initialization ====================

    /// Configures the sale. Callable exactly once, and never on a template instance.
    pub fn initialize(
        env: Env,
        sale_params: SaleInitParams,
        fixed_price_params: FixedPriceSaleInitParams,
    ) -> Result<(), Error> {
        if storage::get_init_state(&env).is_some() {
            return Err(Error::InvalidInitialization);
        }
        sale_params.project_admin.require_auth();

        for address in [
            &sale_params.bid_token,
            &sale_params.ask_token,
            &sale_params.project_admin,
            &sale_params.address_registry,
            &sale_params.referrer_fee_receiver,
        ] {
            registry::require_non_zero(&env, address)?;
        }
        if sale_params.minimum_invest_amount <= 0 || fixed_price_params.token_price <= 0 {
            return Err(Error::ZeroValueProvided);
        }
        clock::validate_periods(
            sale_params.sale_period,
            sale_params.refund_period,
            fixed_price_params.prefund_period,
            fixed_price_params.prefund_allocation_period,
        )?;

        let timeline = Timeline::starting_at(
            clock::now(&env),
            fixed_price_params.prefund_period,
            fixed_price_params.prefund_allocation_period,
            sale_params.sale_period,
            sale_params.refund_period,
        )?;

        let config = SaleConfiguration {
            start_time: timeline.start_time,
            end_time: timeline.end_time,
            refund_end_time: timeline.refund_end_time,
            sale_period: sale_params.sale_period,
            refund_period: sale_params.refund_period,
            legion_capital_fee_bps: sale_params.legion_capital_fee_bps,
            legion_token_fee_bps: sale_params.legion_token_fee_bps,
            referrer_capital_fee_bps: sale_params.referrer_capital_fee_bps,
            referrer_token_fee_bps: sale_params.referrer_token_fee_bps,
            minimum_invest_amount: sale_params.minimum_invest_amount,
            bid_token: sale_params.bid_token,
            ask_token: sale_params.ask_token,
            project_admin: sale_params.project_admin,
            address_registry: sale_params.address_registry,
            referrer_fee_receiver: sale_params.referrer_fee_receiver,
        };
        fees::validate_fee_config(&config)?;

        let ask_token_decimals = token::Client::new(&env, &config.ask_token).decimals();
        let legion = registry::resolve(&env, &config.address_registry)?;

        storage::set_init_state(&env, InitState::Initialized);
        storage::set_sale_config(&env, &config);
        storage::set_fixed_price_config(
            &env,
            &FixedPriceSaleConfiguration {
                prefund_period: fixed_price_params.prefund_period,
                prefund_allocation_period: fixed_price_params.prefund_allocation_period,
                prefund_end_time: timeline.prefund_end_time,
                token_price: fixed_price_params.token_price,
                ask_token_decimals,
            },
        );
        storage::set_token_metadata(
            &env,
            &PositionTokenMetadata {
                name: sale_params.sale_name,
                symbol: sale_params.sale_symbol,
                base_uri: sale_params.sale_base_uri,
            },
        );
        storage::set_legion_addresses(&env, &legion);
        storage::set_status(
            &env,
            &SaleStatus {
                total_capital_invested: 0,
                total_capital_raised: 0,
                total_tokens_allocated: 0,
                total_capital_withdrawn: 0,
                tokens_supplied_amount: 0,
                legion_fee_supplied: 0,
                referrer_fee_supplied: 0,
                is_canceled: false,
                results_published: false,
                tokens_supplied: false,
                capital_withdrawn: false,
                accepted_capital_merkle_root: None,
                claim_tokens_merkle_root: None,
            },
        );
        storage::set_paused(&env, false);
        Ok(())
    }

    /// Locks an uninitialized instance as a template so it can never hold a sale.
    pub fn disable_initializers(env: Env) -> Result<(), Error> {
        if storage::get_init_state(&env).is_some() {
            return Err(Error::InvalidInitialization);
        }
        storage::set_init_state(&env, InitState::Template);
        Ok(())
    }

    // ==================== Investor Operations ====================

    /// Deposits `amount` bid tokens, opening a position on first investment.
    ///
    /// `signature` is the signer's approval of [`authorizer::investment_message`].
    pub fn invest(
        env: Env,
        investor: Address,
        amount: i128,
        signature: BytesN<65>,
    ) -> Result<u64, Error> {
        investor.require_auth();
        when_not_paused(&env)?;

        let config = storage::get_sale_config(&env)?;
        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        let timeline = timeline(&env)?;
        clock::verify_investment_window(&env, &timeline)?;

        if amount < config.minimum_invest_amount {
            log!(&env, "invest amount below minimum", amount, config.minimum_invest_amount);
            return Err(Error::InvalidInvestAmount);
        }

        let existing = positions::position_id_of(&env, &investor)
            .map(|_| positions::load(&env, &investor))
            .transpose()?;
        if let Some(position) = &existing {
            if position.has_refunded {
                log!(&env, "investor has refunded", investor.clone());
                return Err(Error::InvestorHasRefunded);
            }
            if position.has_claimed_excess {
                log!(&env, "investor has claimed excess", investor.clone());
                return Err(Error::InvestorHasClaimedExcess);
            }
        }

        let legion = storage::get_legion_addresses(&env)?;
        authorizer::authorize_investment(&env, &investor, &signature, &legion.signer)?;

        let mut position = match existing {
            Some(position) => position,
            None => positions::mint(&env, &investor),
        };
        position.invested_capital = position
            .invested_capital
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        add_capital(&mut status, amount)?;
        positions::save(&env, &position);
        storage::set_status(&env, &status);

        pull(
            &env,
            &config.bid_token,
            &investor,
            &env.current_contract_address(),
            amount,
        );

        events::emit_capital_invested(
            &env,
            amount,
            investor,
            timeline.is_prefund(clock::now(&env)),
            position.position_id,
        );
        Ok(position.position_id)
    }

    /// Returns the full invested capital of `investor`, any time before the refund
    /// period ends.
    pub fn refund(env: Env, investor: Address) -> Result<i128, Error> {
        investor.require_auth();
        when_not_paused(&env)?;

        let config = storage::get_sale_config(&env)?;
        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        clock::verify_refund_period_is_not_over(&env, &timeline(&env)?)?;

        let mut position = positions::load(&env, &investor)?;
        if position.has_refunded {
            log!(&env, "investor has refunded", investor.clone());
            return Err(Error::InvestorHasRefunded);
        }
        if position.has_claimed_excess {
            log!(&env, "investor has claimed excess", investor.clone());
            return Err(Error::InvestorHasClaimedExcess);
        }
        let amount = position.invested_capital;
        if amount <= 0 {
            log!(&env, "nothing to refund", amount);
            return Err(Error::InvalidWithdrawAmount);
        }

        position.invested_capital = 0;
        position.has_refunded = true;
        remove_capital(&mut status, amount)?;
        positions::save(&env, &position);
        storage::set_status(&env, &status);

        pay_out(&env, &config.bid_token, &investor, amount);
        events::emit_capital_refunded(&env, amount, investor, position.position_id);
        Ok(amount)
    }

    /// Returns the invested capital of `investor` once the sale is canceled.
    pub fn withdraw_capital_if_canceled(
        env: Env,
        investor: Address,
    ) -> Result<i128, Error> {
        investor.require_auth();
        when_not_paused(&env)?;

        let config = storage::get_sale_config(&env)?;
        let mut status = storage::get_status(&env)?;
        if !status.is_canceled {
            return Err(Error::SaleIsNotCanceled);
        }

        let mut position = positions::load(&env, &investor)?;
        let amount = position.invested_capital;
        if amount <= 0 {
            log!(&env, "nothing to withdraw", amount);
            return Err(Error::InvalidWithdrawAmount);
        }

        position.invested_capital = 0;
        remove_capital(&mut status, amount)?;
        positions::save(&env, &position);
        storage::set_status(&env, &status);

        pay_out(&env, &config.bid_token, &investor, amount);
        events::emit_capital_refunded_after_cancel(&env, amount, investor);
        Ok(amount)
    }

    /// Withdraws `amount` of capital the sale did not accept.
    ///
    /// `proof` must show that `(investor, invested_capital - amount)` is a leaf of the
    /// accepted-capital root.
    pub fn withdraw_excess_invested_capital(
        env: Env,
        investor: Address,
        amount: i128,
        proof: Vec<BytesN<32>>,
    ) -> Result<(), Error> {
        investor.require_auth();
        when_not_paused(&env)?;

        let config = storage::get_sale_config(&env)?;
        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;

        let mut position = positions::load(&env, &investor)?;
        if position.has_refunded {
            log!(&env, "investor has refunded", investor.clone());
            return Err(Error::InvestorHasRefunded);
        }
        if position.has_claimed_excess {
            log!(&env, "excess already claimed", investor.clone());
            return Err(Error::AlreadyClaimedExcess);
        }
        if amount <= 0 {
            log!(&env, "invalid excess amount", amount);
            return Err(Error::InvalidWithdrawAmount);
        }

        let Some(root) = status.accepted_capital_merkle_root.clone() else {
            log!(&env, "accepted capital not set", investor.clone(), amount);
            return Err(Error::CannotWithdrawExcessInvestedCapital);
        };
        let kept = position
            .invested_capital
            .checked_sub(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        if kept < 0 || !merkle::verify(&env, &proof, &root, merkle::leaf_hash(&env, &investor, kept))
        {
            log!(&env, "cannot withdraw excess", investor.clone(), amount);
            return Err(Error::CannotWithdrawExcessInvestedCapital);
        }

        position.invested_capital = kept;
        position.has_claimed_excess = true;
        remove_capital(&mut status, amount)?;
        positions::save(&env, &position);
        storage::set_status(&env, &status);

        pay_out(&env, &config.bid_token, &investor, amount);
        events::emit_excess_capital_withdrawn(&env, amount, investor, position.position_id);
        Ok(())
    }

    /// Settles the token allocation of `investor`.
    ///
    /// The TGE share goes to the investor directly, the remainder into a vesting sink
    /// deployed on first claim.
    pub fn claim_token_allocation(
        env: Env,
        investor: Address,
        amount: i128,
        vesting_config: InvestorVestingConfig,
        proof: Vec<BytesN<32>>,
    ) -> Result<(), Error> {
        investor.require_auth();
        when_not_paused(&env)?;

        let config = storage::get_sale_config(&env)?;
        let status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        clock::verify_refund_period_is_over(&env, &timeline(&env)?)?;
        if !status.results_published {
            return Err(Error::SaleResultsNotPublished);
        }
        if !status.tokens_supplied {
            return Err(Error::TokensNotSupplied);
        }

        let mut position = positions::load(&env, &investor)?;
        if position.has_settled {
            log!(&env, "already settled", investor.clone());
            return Err(Error::AlreadySettled);
        }
        if position.has_refunded {
            log!(&env, "investor has refunded", investor.clone());
            return Err(Error::InvestorHasRefunded);
        }
        let in_whitelist = match &status.claim_tokens_merkle_root {
            Some(root) => merkle::verify(
                &env,
                &proof,
                root,
                merkle::leaf_hash(&env, &investor, amount),
            ),
            None => false,
        };
        if amount <= 0 || !in_whitelist {
            log!(&env, "not in claim whitelist", investor.clone(), amount);
            return Err(Error::NotInClaimWhitelist);
        }
        vesting::validate_investor_config(&env, &vesting_config)?;

        let unlocked = fees::apply_bps(amount, vesting_config.token_allocation_on_tge_rate)?;
        let vested = amount - unlocked;

        let mut sink = None;
        if vested > 0 {
            let legion = storage::get_legion_addresses(&env)?;
            sink = Some(vesting::deploy_or_reuse(
                &env,
                position.vesting_address.clone(),
                &investor,
                &legion,
                &config.ask_token,
                &vesting_config,
            )?);
            position.vesting_address = sink.clone();
        }
        position.has_settled = true;
        positions::save(&env, &position);

        if let Some(sink) = &sink {
            pay_out(&env, &config.ask_token, sink, vested);
        }
        pay_out(&env, &config.ask_token, &investor, unlocked);

        events::emit_token_allocation_claimed(
            &env,
            amount,
            investor,
            position.position_id,
            sink,
        );
        Ok(())
    }

    /// Releases whatever the investor's vesting sink has unlocked so far.
    pub fn release_vested_tokens(env: Env, investor: Address) -> Result<i128, Error> {
        investor.require_auth();
        when_not_paused(&env)?;

        let config = storage::get_sale_config(&env)?;
        let position = positions::load(&env, &investor)?;
        let sink = position.vesting_address.ok_or(Error::ZeroAddressProvided)?;
        Ok(vesting::release(&env, &sink, &config.ask_token))
    }

    /// Moves the position of `from` to `to` with the signer's approval.
    ///
    /// `signature` covers [`authorizer::transfer_message`] built with the current
    /// [`FixedPriceSale::transfer_nonce`] of `from`.
    pub fn transfer_investor_position_auth(
        env: Env,
        from: Address,
        to: Address,
        position_id: u64,
        signature: BytesN<65>,
    ) -> Result<(), Error> {
        from.require_auth();
        when_not_paused(&env)?;
        verify_can_transfer_position(&env)?;

        let legion = storage::get_legion_addresses(&env)?;
        authorizer::authorize_transfer(&env, &from, &to, position_id, &signature, &legion.signer)?;
        positions::transfer(&env, &from, &to, position_id)
    }

    // ==================== Project Operations ====================

    /// Cancels the sale. Only possible before results are published.
    pub fn cancel_sale(env: Env, caller: Address) -> Result<(), Error> {
        let config = storage::get_sale_config(&env)?;
        only_project(&caller, &config)?;
        when_not_paused(&env)?;

        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        if status.results_published {
            return Err(Error::SaleResultsAlreadyPublished);
        }

        status.is_canceled = true;
        storage::set_status(&env, &status);
        events::emit_sale_canceled(&env);
        Ok(())
    }

    /// Supplies exactly the allocated tokens plus the token-side fees.
    pub fn supply_tokens(
        env: Env,
        caller: Address,
        amount: i128,
        legion_fee: i128,
        referrer_fee: i128,
    ) -> Result<(), Error> {
        let config = storage::get_sale_config(&env)?;
        only_project(&caller, &config)?;
        when_not_paused(&env)?;

        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        if !status.results_published {
            return Err(Error::TokensNotAllocated);
        }
        if status.tokens_supplied {
            return Err(Error::TokensAlreadySupplied);
        }
        if amount != status.total_tokens_allocated {
            log!(&env, "invalid token amount supplied", amount, status.total_tokens_allocated);
            return Err(Error::InvalidTokenAmountSupplied);
        }

        let (expected_legion_fee, expected_referrer_fee) =
            fees::token_fees(&config, status.total_tokens_allocated)?;
        if legion_fee != expected_legion_fee {
            log!(&env, "invalid legion fee", legion_fee, expected_legion_fee);
            return Err(Error::InvalidFeeAmount);
        }
        if referrer_fee != expected_referrer_fee {
            log!(&env, "invalid referrer fee", referrer_fee, expected_referrer_fee);
            return Err(Error::InvalidFeeAmount);
        }

        status.tokens_supplied = true;
        status.tokens_supplied_amount = amount;
        status.legion_fee_supplied = legion_fee;
        status.referrer_fee_supplied = referrer_fee;
        storage::set_status(&env, &status);

        let legion = storage::get_legion_addresses(&env)?;
        pull(
            &env,
            &config.ask_token,
            &caller,
            &env.current_contract_address(),
            amount,
        );
        pull(&env, &config.ask_token, &caller, &legion.fee_receiver, legion_fee);
        pull(
            &env,
            &config.ask_token,
            &caller,
            &config.referrer_fee_receiver,
            referrer_fee,
        );

        events::emit_tokens_supplied(&env, amount, legion_fee, referrer_fee);
        Ok(())
    }

    /// Pays the raised capital, net of capital-side fees, to the project. One-shot.
    pub fn withdraw_raised_capital(env: Env, caller: Address) -> Result<i128, Error> {
        let config = storage::get_sale_config(&env)?;
        only_project(&caller, &config)?;
        when_not_paused(&env)?;

        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        clock::verify_refund_period_is_over(&env, &timeline(&env)?)?;
        if !status.results_published {
            return Err(Error::SaleResultsNotPublished);
        }
        if !status.tokens_supplied {
            return Err(Error::TokensNotSupplied);
        }
        if status.capital_withdrawn {
            return Err(Error::CapitalAlreadyWithdrawn);
        }
        let raised = status.total_capital_raised;
        if raised <= 0 {
            return Err(Error::CapitalNotRaised);
        }

        let (legion_fee, referrer_fee) = fees::capital_fees(&config, raised)?;
        let net = raised - legion_fee - referrer_fee;

        status.capital_withdrawn = true;
        status.total_capital_withdrawn = raised;
        storage::set_status(&env, &status);

        let legion = storage::get_legion_addresses(&env)?;
        pay_out(&env, &config.bid_token, &caller, net);
        pay_out(&env, &config.bid_token, &legion.fee_receiver, legion_fee);
        pay_out(
            &env,
            &config.bid_token,
            &config.referrer_fee_receiver,
            referrer_fee,
        );

        events::emit_capital_withdrawn(&env, raised);
        Ok(net)
    }

    // ==================== Legion Operations ====================

    pub fn set_accepted_capital(
        env: Env,
        caller: Address,
        merkle_root: BytesN<32>,
    ) -> Result<(), Error> {
        only_legion(&env, &caller)?;
        when_not_paused(&env)?;

        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        if status.results_published {
            return Err(Error::SaleResultsAlreadyPublished);
        }

        status.accepted_capital_merkle_root = Some(merkle_root.clone());
        storage::set_status(&env, &status);
        events::emit_accepted_capital_set(&env, merkle_root);
        Ok(())
    }

    /// Freezes the settlement snapshot. One-shot, after the refund period.
    pub fn publish_sale_results(
        env: Env,
        caller: Address,
        claim_merkle_root: BytesN<32>,
        accepted_merkle_root: BytesN<32>,
        tokens_allocated: i128,
    ) -> Result<(), Error> {
        only_legion(&env, &caller)?;
        when_not_paused(&env)?;

        let mut status = storage::get_status(&env)?;
        when_not_canceled(&status)?;
        clock::verify_refund_period_is_over(&env, &timeline(&env)?)?;
        if status.results_published {
            return Err(Error::TokensAlreadyAllocated);
        }
        if tokens_allocated <= 0 {
            return Err(Error::ZeroValueProvided);
        }

        let fixed = storage::get_fixed_price_config(&env)?;
        status.total_capital_raised =
            fees::capital_raised(tokens_allocated, fixed.token_price, fixed.ask_token_decimals)?;
        status.total_tokens_allocated = tokens_allocated;
        status.results_published = true;
        status.claim_tokens_merkle_root = Some(claim_merkle_root.clone());
        status.accepted_capital_merkle_root = Some(accepted_merkle_root.clone());
        storage::set_status(&env, &status);

        events::emit_sale_results_published(
            &env,
            claim_merkle_root,
            accepted_merkle_root,
            tokens_allocated,
        );
        Ok(())
    }

    pub fn transfer_investor_position(
        env: Env,
        caller: Address,
        from: Address,
        to: Address,
        position_id: u64,
    ) -> Result<(), Error> {
        only_legion(&env, &caller)?;
        when_not_paused(&env)?;
        verify_can_transfer_position(&env)?;
        positions::transfer(&env, &from, &to, position_id)
    }

    /// Re-reads every Legion role from the registry.
    pub fn sync_legion_addresses(env: Env, caller: Address) -> Result<(), Error> {
        only_legion(&env, &caller)?;
        when_not_paused(&env)?;

        let config = storage::get_sale_config(&env)?;
        let legion = registry::resolve(&env, &config.address_registry)?;
        storage::set_legion_addresses(&env, &legion);

        events::emit_legion_addresses_synced(
            &env,
            events::LegionAddressesSynced {
                bouncer: legion.bouncer,
                signer: legion.signer,
                fee_receiver: legion.fee_receiver,
                vesting_factory: legion.vesting_factory,
                vesting_controller: legion.vesting_controller,
            },
        );
        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), Error> {
        only_legion(&env, &caller)?;
        storage::set_paused(&env, true);
        events::emit_paused(&env, true);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), Error> {
        only_legion(&env, &caller)?;
        storage::set_paused(&env, false);
        events::emit_paused(&env, false);
        Ok(())
    }

    /// Moves any token balance out of the sale, regardless of lifecycle state.
    pub fn emergency_withdraw(
        env: Env,
        caller: Address,
        to: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), Error> {
        only_legion(&env, &caller)?;
        registry::require_non_zero(&env, &to)?;
        if amount <= 0 {
            return Err(Error::ZeroValueProvided);
        }

        pay_out(&env, &token, &to, amount);
        events::emit_emergency_withdraw(&env, to, token, amount);
        Ok(())
    }

    // ==================== Queries ====================

    pub fn sale_configuration(env: Env) -> Result<SaleConfiguration, Error> {
        storage::get_sale_config(&env)
    }

    pub fn fixed_price_sale_configuration(env: Env) -> Result<FixedPriceSaleConfiguration, Error> {
        storage::get_fixed_price_config(&env)
    }

    pub fn sale_status(env: Env) -> Result<SaleStatus, Error> {
        storage::get_status(&env)
    }

    pub fn sale_state(env: Env) -> Result<SaleState, Error> {
        let status = storage::get_status(&env)?;
        Ok(if status.is_canceled {
            SaleState::Canceled
        } else if status.capital_withdrawn {
            SaleState::CapitalWithdrawn
        } else if status.tokens_supplied {
            SaleState::TokensSupplied
        } else if status.results_published {
            SaleState::ResultsPublished
        } else {
            SaleState::Active
        })
    }

    pub fn sale_phase(env: Env) -> Result<SalePhase, Error> {
        Ok(timeline(&env)?.phase(clock::now(&env)))
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    pub fn investor_position(env: Env, investor: Address) -> Result<InvestorPosition, Error> {
        positions::load(&env, &investor)
    }

    pub fn investor_vesting_status(env: Env, investor: Address) -> Result<VestingStatus, Error> {
        let config = storage::get_sale_config(&env)?;
        let position = positions::load(&env, &investor)?;
        let sink = position.vesting_address.ok_or(Error::ZeroAddressProvided)?;
        Ok(vesting::status(&env, &sink, &config.ask_token))
    }

    pub fn vesting_configuration(env: Env) -> Result<VestingConfiguration, Error> {
        let legion = storage::get_legion_addresses(&env)?;
        Ok(VestingConfiguration {
            vesting_factory: legion.vesting_factory,
            vesting_controller: legion.vesting_controller,
        })
    }

    pub fn legion_addresses(env: Env) -> Result<LegionAddresses, Error> {
        storage::get_legion_addresses(&env)
    }

    /// Current anti-replay sequence bound into transfer approvals of `owner`.
    pub fn transfer_nonce(env: Env, owner: Address) -> u64 {
        storage::get_transfer_nonce(&env, &owner)
    }

    /// `(legion_fee, referrer_fee)` that `supply_tokens` expects.
    pub fn expected_token_fees(env: Env) -> Result<(i128, i128), Error> {
        let config = storage::get_sale_config(&env)?;
        let status = storage::get_status(&env)?;
        if !status.results_published {
            return Err(Error::TokensNotAllocated);
        }
        fees::token_fees(&config, status.total_tokens_allocated)
    }

    // ==================== Position Token ====================

    pub fn name(env: Env) -> Result<String, Error> {
        Ok(storage::get_token_metadata(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, Error> {
        Ok(storage::get_token_metadata(&env)?.symbol)
    }

    pub fn token_uri(env: Env, position_id: u64) -> Result<String, Error> {
        positions::token_uri(&env, position_id)
    }

    pub fn owner_of(env: Env, position_id: u64) -> Result<Address, Error> {
        positions::owner_of(&env, position_id)
    }

    pub fn balance_of(env: Env, owner: Address) -> u32 {
        positions::balance_of(&env, &owner)
    }

    /// Number of positions ever minted, burned ones included.
    pub fn total_positions(env: Env) -> u64 {
        storage::get_position_count(&env)
    }
}
