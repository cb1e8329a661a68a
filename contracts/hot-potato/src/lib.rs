//! Stellarcade Hot Potato Contract
//!
//! A escalating-stakes "hot potato" contest. Players pay an escalating entry
//! price to take the potato; a keeper settles each attempt a few ledgers
//! later using an ambient pseudo-random draw. A successful take promotes the
//! caller to current holder and raises the price for the next taker; a loss
//! ends the round and distributes the pot across every participant of that
//! round, minus a keeper reward and a creator fee. A secondary sponsor
//! sub-protocol lets third parties attach a promotional message to the
//! current round by posting a refundable deposit that strictly outbids
//! whoever holds the slot.
//!
//! ## Game Flow
//! 1. Player calls `enter` → tokens transfer in, a pending settlement
//!    ticket is installed, `Take` is emitted.
//! 2. A couple of ledgers later, anyone calls `settle` (typically a
//!    keeper bot) → the ticket is resolved via an ambient PRNG draw into a
//!    win (new holder, price escalates) or a loss (round pays out and
//!    resets).
//! 3. Independently, `sponsor` lets a caller post a refundable deposit to
//!    attach a message to the round, strictly outbidding the incumbent by
//!    20%; the round's loss clears whoever holds the slot.
//!
//! ## Accounting
//! `pot_balance` is the portion of the contract's token balance this
//! contract considers in-play. `sponsor_reserved` is the sub-portion of
//! `pot_balance` earmarked to refund the incumbent sponsor; `available_pot`
//! (`pot_balance - sponsor_reserved`) is what keeper rewards, the creator
//! fee, and participant payouts are drawn from. A single reentrancy flag
//! guards every state-mutating entry point, since each of them calls out to
//! the configured SEP-41 token at least once.
//!
//! ## Entropy
//! `settle` requires at least two ledgers to have closed since the
//! corresponding `enter`, then draws `env.prng().u64_in_range(0..10)` — a
//! value the taking player could not have known or influenced at take time,
//! analogous to an EVM contract reading `blockhash(take_block + 1)`. A
//! settlement of the round's 50th participant (or any settlement once the
//! cap is already hit) is always a forced loss regardless of the draw, which
//! bounds round length even if the draw keeps favoring the player.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, token::TokenClient,
    Address, Bytes, Env, Vec,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Instance/persistent storage TTL in ledgers (~30 days at 5 s/ledger).
/// Bumped on every write so live round data never expires mid-round.
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Hard participation ceiling per round; the round's 50th entrant plays
/// free and forces a loss regardless of the settle-time draw.
pub const MAX_PARTICIPANTS: u32 = 50;

/// Maximum sponsor message length, in bytes.
pub const MAX_MESSAGE_LEN: u32 = 256;

/// Ledgers that must close between `enter` and `settle` for the same
/// ticket, so the PRNG draw `settle` takes could not have existed at
/// take time.
pub const MIN_SETTLE_DELAY: u32 = 2;

/// Ledgers after which a pending ticket is considered stale and `settle`
/// refuses to resolve it. Scaled from the distilled spec's ~256-block
/// window (Ethereum, ~12 s/block) to Stellar's ~5 s ledger close time.
pub const MAX_SETTLE_WINDOW: u32 = 4096;

const BASIS_POINTS_DIVISOR: i128 = 10_000;
/// A sponsor replacement must post at least 120% of the incumbent's amount.
const SPONSOR_OUTBID_BPS: i128 = 12_000;
/// Minimum sponsor deposit, denominated in the configured token's base unit.
const SPONSOR_MIN_AMOUNT: i128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidAmount = 3,
    PendingAttemptExists = 4,
    NoPendingAttempt = 5,
    TooSoonToSettle = 6,
    StaleAttempt = 7,
    AlreadyPlayedThisRound = 8,
    MaxParticipantsReached = 9,
    NotCreator = 10,
    MessageTooLong = 11,
    ReentrancyDetected = 12,
}

// ---------------------------------------------------------------------------
// Storage types
// ---------------------------------------------------------------------------

/// Storage key discriminants.
///
/// Instance keys (Config, State, Pending, Reentrancy): small, fixed-size
/// engine state, one ledger entry shared across all of them. Persistent
/// keys (Participants, HasPlayed, Sponsor) are keyed per round so TTL cost
/// does not scale with how many rounds have been played.
#[contracttype]
pub enum DataKey {
    // --- instance() ---
    Config,
    State,
    Pending,
    Reentrancy,
    // --- persistent() ---
    /// Insertion-ordered participant list for a round.
    Participants(u64),
    /// Presence flag: has this address already played this round.
    HasPlayed(u64, Address),
    /// The round's current sponsor slot, if any.
    Sponsor(u64),
}

/// Immutable engine configuration, set once at `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub token: Address,
    pub base_entry_price: i128,
    pub price_multiplier_bps: u32,
    pub keeper_reward: i128,
    pub creator_fee: i128,
}

/// Mutable engine state. `creator_address` lives here rather than in
/// `Config` because `update_creator` legitimately rotates it at runtime.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct State {
    pub current_entry_price: i128,
    pub current_holder: Option<Address>,
    pub current_round_id: u64,
    pub pot_balance: i128,
    pub sponsor_reserved: i128,
    pub creator_address: Address,
}

/// The single outstanding take awaiting settlement. At most one may exist
/// engine-wide.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingTicket {
    pub player: Address,
    pub amount_paid: i128,
    pub take_ledger: u32,
    pub created_in_round: u64,
}

/// The round's current sponsor slot.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SponsorInfo {
    pub sponsor: Address,
    pub amount: i128,
    pub message: Bytes,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Initialized {
    #[topic]
    pub creator_address: Address,
    pub token: Address,
    pub base_entry_price: i128,
}

#[contractevent]
pub struct Take {
    #[topic]
    pub player: Address,
    #[topic]
    pub round_id: u64,
    pub price_paid: i128,
    pub target_ledger: u32,
}

#[contractevent]
pub struct Settle {
    #[topic]
    pub player: Address,
    #[topic]
    pub round_id: u64,
    pub win: bool,
    pub randomness: u64,
}

#[contractevent]
pub struct NewHolder {
    #[topic]
    pub holder: Address,
    #[topic]
    pub round_id: u64,
    pub new_price: i128,
}

#[contractevent]
pub struct RoundEnded {
    #[topic]
    pub round_id: u64,
    pub payout_amount: i128,
    pub num_eligible: u32,
    pub pot_after: i128,
}

#[contractevent]
pub struct PotUpdated {
    pub new_pot: i128,
}

#[contractevent]
pub struct SponsorUpdated {
    #[topic]
    pub sponsor: Address,
    #[topic]
    pub round_id: u64,
    pub amount: i128,
    pub message: Bytes,
}

#[contractevent]
pub struct SponsorReplaced {
    #[topic]
    pub previous_sponsor: Address,
    #[topic]
    pub round_id: u64,
    pub refund_amount: i128,
}

#[contractevent]
pub struct SponsorCleared {
    #[topic]
    pub round_id: u64,
}

#[contractevent]
pub struct ParticipantPayoutFailed {
    #[topic]
    pub participant: Address,
    #[topic]
    pub round_id: u64,
    pub amount: i128,
}

#[contractevent]
pub struct SponsorRefundFailed {
    #[topic]
    pub previous_sponsor: Address,
    #[topic]
    pub round_id: u64,
    pub amount: i128,
}

#[contractevent]
pub struct CreatorUpdated {
    #[topic]
    pub previous_creator: Address,
    pub new_creator: Address,
    pub round_id: u64,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct HotPotato;

#[contractimpl]
impl HotPotato {
    // -----------------------------------------------------------------------
    // init
    // -----------------------------------------------------------------------

    /// Initialize the engine. May only be called once.
    ///
    /// `price_multiplier_bps` must be at least 10000 (1.0x) — the price
    /// never decreases across a win. `token` is the SEP-41 token every
    /// amount in this contract is denominated in.
    pub fn init(
        env: Env,
        creator_address: Address,
        token: Address,
        base_entry_price: i128,
        price_multiplier_bps: u32,
        keeper_reward: i128,
        creator_fee: i128,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(Error::AlreadyInitialized);
        }
        creator_address.require_auth();

        if base_entry_price <= 0 {
            return Err(Error::InvalidAmount);
        }
        if price_multiplier_bps < BASIS_POINTS_DIVISOR as u32 {
            return Err(Error::InvalidAmount);
        }
        if keeper_reward < 0 || creator_fee < 0 {
            return Err(Error::InvalidAmount);
        }

        let config = Config {
            token: token.clone(),
            base_entry_price,
            price_multiplier_bps,
            keeper_reward,
            creator_fee,
        };
        env.storage().instance().set(&DataKey::Config, &config);

        let state = State {
            current_entry_price: base_entry_price,
            current_holder: None,
            current_round_id: 1,
            pot_balance: 0,
            sponsor_reserved: 0,
            creator_address: creator_address.clone(),
        };
        env.storage().instance().set(&DataKey::State, &state);
        env.storage()
            .instance()
            .set(&DataKey::Pending, &Option::<PendingTicket>::None);
        env.storage().instance().set(&DataKey::Reentrancy, &false);
        env.storage()
            .instance()
            .extend_ttl(PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);

        Initialized {
            creator_address,
            token,
            base_entry_price,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // enter
    // -----------------------------------------------------------------------

    /// Take the potato for the current round. `amount` must be at least
    /// the current entry price, except for the round's 50th entrant, who
    /// plays free (and always forces that round to end in a loss).
    pub fn enter(env: Env, player: Address, amount: i128) -> Result<(), Error> {
        let _guard = ReentrancyGuard::enter(&env)?;
        require_initialized(&env)?;
        player.require_auth();

        let mut state = load_state(&env);

        if load_pending(&env).is_some() {
            return Err(Error::PendingAttemptExists);
        }

        let round = state.current_round_id;
        let mut participants = load_participants(&env, round);
        if participants.len() >= MAX_PARTICIPANTS {
            return Err(Error::MaxParticipantsReached);
        }

        let is_fiftieth = participants.len() == MAX_PARTICIPANTS - 1;
        let required = if is_fiftieth {
            0
        } else {
            state.current_entry_price
        };
        if amount < required {
            return Err(Error::InvalidAmount);
        }

        if has_played(&env, round, &player) {
            return Err(Error::AlreadyPlayedThisRound);
        }

        mark_played(&env, round, &player);
        participants.push_back(player.clone());
        save_participants(&env, round, &participants);

        if amount > 0 {
            let config = load_config(&env);
            TokenClient::new(&env, &config.token).transfer(
                &player,
                &env.current_contract_address(),
                &amount,
            );
            credit_pot(&env, &mut state, amount);
        }

        let take_ledger = env.ledger().sequence();
        save_pending(
            &env,
            &Some(PendingTicket {
                player: player.clone(),
                amount_paid: amount,
                take_ledger,
                created_in_round: round,
            }),
        );

        Take {
            player,
            round_id: round,
            price_paid: amount,
            target_ledger: take_ledger,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // settle
    // -----------------------------------------------------------------------

    /// Resolve the single pending ticket. Anyone may call this (typically a
    /// keeper bot) once `MIN_SETTLE_DELAY` ledgers have closed since the
    /// corresponding `enter`, and before `MAX_SETTLE_WINDOW` ledgers have
    /// elapsed.
    pub fn settle(env: Env, keeper: Address) -> Result<(), Error> {
        let _guard = ReentrancyGuard::enter(&env)?;
        require_initialized(&env)?;

        let mut state = load_state(&env);
        let config = load_config(&env);

        let pending = load_pending(&env).ok_or(Error::NoPendingAttempt)?;

        let current_ledger = env.ledger().sequence();
        if current_ledger < pending.take_ledger.saturating_add(MIN_SETTLE_DELAY) {
            return Err(Error::TooSoonToSettle);
        }
        if current_ledger > pending.take_ledger.saturating_add(MAX_SETTLE_WINDOW) {
            return Err(Error::StaleAttempt);
        }

        // 1. Pay the keeper; failure is swallowed, the pot keeps the funds.
        try_pay(&env, &config.token, &mut state, &keeper, config.keeper_reward);

        // 2/3. Draw the ambient outcome and decide win/lose.
        let round = pending.created_in_round;
        let participants = load_participants(&env, round);
        let forced_loss = participants.len() >= MAX_PARTICIPANTS;
        let roll: u64 = env.prng().u64_in_range(0..10);
        let win = !forced_loss && roll < 8;

        // 4. Clear the pending ticket before any further external call.
        save_pending(&env, &None);

        // 5. Dispatch.
        if win {
            win_path(&env, &config, &mut state, &pending.player);
            let participants_after = load_participants(&env, round);
            if participants_after.len() >= MAX_PARTICIPANTS {
                lose_path(&env, &config, &mut state, round);
            }
        } else {
            lose_path(&env, &config, &mut state, round);
        }

        // 6. The settle signal is emitted after any Win/Lose events above.
        Settle {
            player: pending.player,
            round_id: round,
            win,
            randomness: roll,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // sponsor
    // -----------------------------------------------------------------------

    /// Post (or replace) the current round's sponsor slot. A replacement
    /// must post at least 120% of the incumbent's deposit; the incumbent's
    /// deposit is refunded and its reservation released.
    pub fn sponsor(
        env: Env,
        sponsor_addr: Address,
        amount: i128,
        message: Bytes,
    ) -> Result<(), Error> {
        let _guard = ReentrancyGuard::enter(&env)?;
        require_initialized(&env)?;
        sponsor_addr.require_auth();

        if amount < SPONSOR_MIN_AMOUNT {
            return Err(Error::InvalidAmount);
        }
        if message.len() > MAX_MESSAGE_LEN {
            return Err(Error::MessageTooLong);
        }

        let mut state = load_state(&env);
        let config = load_config(&env);
        let round = state.current_round_id;
        let existing = load_sponsor(&env, round);
        let token_client = TokenClient::new(&env, &config.token);

        if let Some(prev) = existing {
            let min_next = ceil_mul_div(prev.amount, SPONSOR_OUTBID_BPS, BASIS_POINTS_DIVISOR);
            if amount < min_next {
                return Err(Error::InvalidAmount);
            }

            // Credit the new funds first so a refund always has liquidity.
            token_client.transfer(&sponsor_addr, &env.current_contract_address(), &amount);
            state.pot_balance = state.pot_balance.saturating_add(amount);
            state.sponsor_reserved = state.sponsor_reserved.saturating_add(amount);
            save_state(&env, &state);
            PotUpdated {
                new_pot: state.pot_balance,
            }
            .publish(&env);

            // Release the incumbent's reservation before attempting its
            // refund, so a refusing recipient cannot lock it as reserved.
            state.sponsor_reserved = state.sponsor_reserved.saturating_sub(prev.amount);
            save_state(&env, &state);

            match token_client.try_transfer(
                &env.current_contract_address(),
                &prev.sponsor,
                &prev.amount,
            ) {
                Ok(Ok(())) => {
                    state.pot_balance = (state.pot_balance - prev.amount).max(0);
                    save_state(&env, &state);
                }
                _ => {
                    SponsorRefundFailed {
                        previous_sponsor: prev.sponsor.clone(),
                        round_id: round,
                        amount: prev.amount,
                    }
                    .publish(&env);
                }
            }

            SponsorReplaced {
                previous_sponsor: prev.sponsor,
                round_id: round,
                refund_amount: prev.amount,
            }
            .publish(&env);
        } else {
            token_client.transfer(&sponsor_addr, &env.current_contract_address(), &amount);
            state.pot_balance = state.pot_balance.saturating_add(amount);
            state.sponsor_reserved = state.sponsor_reserved.saturating_add(amount);
            save_state(&env, &state);
            PotUpdated {
                new_pot: state.pot_balance,
            }
            .publish(&env);
        }

        save_sponsor(
            &env,
            round,
            &Some(SponsorInfo {
                sponsor: sponsor_addr.clone(),
                amount,
                message: message.clone(),
            }),
        );
        SponsorUpdated {
            sponsor: sponsor_addr,
            round_id: round,
            amount,
            message,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // deposit
    // -----------------------------------------------------------------------

    /// Top up the pot outside of `enter`/`sponsor`. Any address may call
    /// this — the Soroban realization of the distilled spec's "any value
    /// received outside of an explicit operation credits the pot" rule,
    /// since a bare token transfer to this contract's address does not
    /// itself invoke contract code.
    pub fn deposit(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        let _guard = ReentrancyGuard::enter(&env)?;
        require_initialized(&env)?;
        from.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut state = load_state(&env);
        let config = load_config(&env);
        TokenClient::new(&env, &config.token).transfer(
            &from,
            &env.current_contract_address(),
            &amount,
        );
        credit_pot(&env, &mut state, amount);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // update_creator
    // -----------------------------------------------------------------------

    /// Rotate the creator address. Only the current creator may call this.
    ///
    /// The distilled spec also rejects a zero address here; Soroban's
    /// `Address` has no null sentinel (every value is a valid account or
    /// contract id), so that half of the precondition does not apply on
    /// this host and is omitted rather than kept as dead validation.
    pub fn update_creator(env: Env, caller: Address, new_creator: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        caller.require_auth();

        let mut state = load_state(&env);
        if caller != state.creator_address {
            return Err(Error::NotCreator);
        }

        state.creator_address = new_creator.clone();
        let round_id = state.current_round_id;
        save_state(&env, &state);

        CreatorUpdated {
            previous_creator: caller,
            new_creator,
            round_id,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // read views
    // -----------------------------------------------------------------------

    pub fn has_pending(env: Env) -> bool {
        load_pending(&env).is_some()
    }

    /// The ledger at which the pending ticket, if any, becomes eligible for
    /// settlement (`take_ledger + MIN_SETTLE_DELAY`).
    pub fn pending_target_ledger(env: Env) -> Option<u32> {
        load_pending(&env).map(|p| p.take_ledger.saturating_add(MIN_SETTLE_DELAY))
    }

    pub fn available_pot(env: Env) -> i128 {
        available_pot_of(&load_state(&env))
    }

    pub fn current_sponsor(env: Env) -> Option<SponsorInfo> {
        let state = load_state(&env);
        load_sponsor(&env, state.current_round_id)
    }

    pub fn base_entry_price(env: Env) -> i128 {
        load_config(&env).base_entry_price
    }

    pub fn price_multiplier_bps(env: Env) -> u32 {
        load_config(&env).price_multiplier_bps
    }

    pub fn current_entry_price(env: Env) -> i128 {
        load_state(&env).current_entry_price
    }

    pub fn current_round_id(env: Env) -> u64 {
        load_state(&env).current_round_id
    }

    pub fn current_holder(env: Env) -> Option<Address> {
        load_state(&env).current_holder
    }

    pub fn creator_address(env: Env) -> Address {
        load_state(&env).creator_address
    }

    pub fn keeper_reward(env: Env) -> i128 {
        load_config(&env).keeper_reward
    }

    pub fn creator_fee(env: Env) -> i128 {
        load_config(&env).creator_fee
    }

    pub fn participants(env: Env, round_id: u64) -> Vec<Address> {
        load_participants(&env, round_id)
    }
}

// ---------------------------------------------------------------------------
// Win / Lose paths
// ---------------------------------------------------------------------------

/// Promote `player` to holder and escalate the entry price. No transfers;
/// no round advancement.
fn win_path(env: &Env, config: &Config, state: &mut State, player: &Address) {
    state.current_holder = Some(player.clone());
    state.current_entry_price = ceil_mul_div(
        state.current_entry_price,
        config.price_multiplier_bps as i128,
        BASIS_POINTS_DIVISOR,
    );
    save_state(env, state);

    NewHolder {
        holder: player.clone(),
        round_id: state.current_round_id,
        new_price: state.current_entry_price,
    }
    .publish(env);
    PotUpdated {
        new_pot: state.pot_balance,
    }
    .publish(env);
}

/// Finalize round `round`: pay the creator fee, distribute the contract's
/// live token balance across every participant, clear the sponsor, and
/// advance to the next round.
fn lose_path(env: &Env, config: &Config, state: &mut State, round: u64) {
    // 1. Creator fee (best-effort).
    let creator_address = state.creator_address.clone();
    let creator_pay = config.creator_fee.min(available_pot_of(state));
    try_pay(env, &config.token, state, &creator_address, creator_pay);

    // 2. Participant distribution, from the contract's live token balance —
    // not `pot_balance` — so stray deposits and earlier partial-payout
    // drift still flow back to players.
    let participants = load_participants(env, round);
    let n = participants.len();
    let token_client = TokenClient::new(env, &config.token);
    let balance_after_fees = token_client.balance(&env.current_contract_address());

    let per_share: i128 = if n == 0 || balance_after_fees == 0 {
        0
    } else {
        balance_after_fees / (n as i128)
    };

    let mut paid_total: i128 = 0;
    if per_share > 0 {
        for participant in participants.iter() {
            match token_client.try_transfer(
                &env.current_contract_address(),
                &participant,
                &per_share,
            ) {
                Ok(Ok(())) => {
                    paid_total = paid_total.saturating_add(per_share);
                }
                _ => {
                    ParticipantPayoutFailed {
                        participant: participant.clone(),
                        round_id: round,
                        amount: per_share,
                    }
                    .publish(env);
                }
            }
        }
    }

    state.pot_balance = (state.pot_balance - paid_total).max(0);
    save_state(env, state);

    RoundEnded {
        round_id: round,
        payout_amount: paid_total,
        num_eligible: n,
        pot_after: state.pot_balance,
    }
    .publish(env);
    PotUpdated {
        new_pot: state.pot_balance,
    }
    .publish(env);

    // 4. Clear the sponsor slot. Its funds stay in `pot_balance`,
    // now un-reserved, and flow into the next round's pot.
    let sponsor = load_sponsor(env, round);
    if state.sponsor_reserved > 0 || sponsor.is_some() {
        state.sponsor_reserved = 0;
        save_sponsor(env, round, &None);
        save_state(env, state);
        SponsorCleared { round_id: round }.publish(env);
    }

    // 5. Advance.
    state.current_round_id = round.saturating_add(1);
    state.current_holder = None;
    state.current_entry_price = config.base_entry_price;
    save_state(env, state);
}

// ---------------------------------------------------------------------------
// Accounting core
// ---------------------------------------------------------------------------

fn available_pot_of(state: &State) -> i128 {
    (state.pot_balance - state.sponsor_reserved).max(0)
}

/// Add `amount` to the pot, saturating on overflow, and emit `PotUpdated`.
fn credit_pot(env: &Env, state: &mut State, amount: i128) {
    state.pot_balance = state.pot_balance.saturating_add(amount);
    save_state(env, state);
    PotUpdated {
        new_pot: state.pot_balance,
    }
    .publish(env);
}

/// Clamp `amount` to `available_pot`, attempt a best-effort transfer, and on
/// success decrement `pot_balance` and emit `PotUpdated`. Failure (a
/// rejecting recipient, or nothing to pay) is swallowed: the funds remain
/// accounted for in the pot.
fn try_pay(env: &Env, token: &Address, state: &mut State, recipient: &Address, amount: i128) -> (bool, i128) {
    let paid = amount.min(available_pot_of(state));
    if paid <= 0 {
        return (false, 0);
    }

    let client = TokenClient::new(env, token);
    match client.try_transfer(&env.current_contract_address(), recipient, &paid) {
        Ok(Ok(())) => {
            state.pot_balance -= paid;
            save_state(env, state);
            PotUpdated {
                new_pot: state.pot_balance,
            }
            .publish(env);
            (true, paid)
        }
        _ => (false, 0),
    }
}

/// Ceiling division of `x * n / d`, saturating at `i128::MAX` if the
/// product would overflow. Returns 0 if `x` or `n` is 0.
fn ceil_mul_div(x: i128, n: i128, d: i128) -> i128 {
    if x == 0 || n == 0 {
        return 0;
    }
    let prod = match x.checked_mul(n) {
        Some(p) => p,
        None => return i128::MAX,
    };
    let q = prod / d;
    let r = prod % d;
    if r == 0 {
        q
    } else {
        q.checked_add(1).unwrap_or(i128::MAX)
    }
}

// ---------------------------------------------------------------------------
// Reentrancy gate
// ---------------------------------------------------------------------------

/// Guards every externally callable, state-mutating operation. Held for the
/// duration of the call (including any token transfers it makes) and
/// released on every exit path via `Drop`.
struct ReentrancyGuard<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyGuard<'a> {
    fn enter(env: &'a Env) -> Result<Self, Error> {
        let entered: bool = env
            .storage()
            .instance()
            .get(&DataKey::Reentrancy)
            .unwrap_or(false);
        if entered {
            return Err(Error::ReentrancyDetected);
        }
        env.storage().instance().set(&DataKey::Reentrancy, &true);
        Ok(Self { env })
    }
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        self.env.storage().instance().set(&DataKey::Reentrancy, &false);
    }
}

// ---------------------------------------------------------------------------
// Storage helpers
// ---------------------------------------------------------------------------

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Config) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

fn load_config(env: &Env) -> Config {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("HotPotato: config not set")
}

fn load_state(env: &Env) -> State {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .expect("HotPotato: not initialized")
}

fn save_state(env: &Env, state: &State) {
    env.storage().instance().set(&DataKey::State, state);
    env.storage()
        .instance()
        .extend_ttl(PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

fn load_pending(env: &Env) -> Option<PendingTicket> {
    env.storage()
        .instance()
        .get(&DataKey::Pending)
        .unwrap_or(None)
}

fn save_pending(env: &Env, pending: &Option<PendingTicket>) {
    env.storage().instance().set(&DataKey::Pending, pending);
}

fn load_participants(env: &Env, round: u64) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Participants(round))
        .unwrap_or(Vec::new(env))
}

fn save_participants(env: &Env, round: u64, participants: &Vec<Address>) {
    let key = DataKey::Participants(round);
    env.storage().persistent().set(&key, participants);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

fn has_played(env: &Env, round: u64, player: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::HasPlayed(round, player.clone()))
}

fn mark_played(env: &Env, round: u64, player: &Address) {
    let key = DataKey::HasPlayed(round, player.clone());
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

fn load_sponsor(env: &Env, round: u64) -> Option<SponsorInfo> {
    env.storage()
        .persistent()
        .get(&DataKey::Sponsor(round))
        .unwrap_or(None)
}

fn save_sponsor(env: &Env, round: u64, sponsor: &Option<SponsorInfo>) {
    let key = DataKey::Sponsor(round);
    match sponsor {
        Some(_) => {
            env.storage().persistent().set(&key, sponsor);
            env.storage()
                .persistent()
                .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
        }
        None => {
            env.storage().persistent().remove(&key);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
