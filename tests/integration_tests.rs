use offer_crossing::book::basic_taker::TakerFlags;
use offer_crossing::book::flow::CrossType;
use offer_crossing::book::offer::Offer;
use offer_crossing::book::result::{CrossError, ResultCode};
use offer_crossing::book::taker::Taker;
use offer_crossing::core::account::AccountId;
use offer_crossing::core::amount::{Amount, Amounts};
use offer_crossing::core::currency::Issue;
use offer_crossing::core::ledger::{InMemoryLedger, LedgerView, NATIVE_SUPPLY_CAP};
use offer_crossing::core::rate::TransferRate;
use offer_crossing::scenario::{Scenario, StopReason};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn acct(name: &str) -> AccountId {
    AccountId::new(name)
}

fn usd_issue() -> Issue {
    Issue::new("USD", acct("usd-gateway"))
}

fn eur_issue() -> Issue {
    Issue::new("EUR", acct("eur-gateway"))
}

fn usd(v: Decimal) -> Amount {
    Amount::new(v, usd_issue())
}

fn eur(v: Decimal) -> Amount {
    Amount::new(v, eur_issue())
}

fn native(v: Decimal) -> Amount {
    Amount::native(v)
}

fn offer(owner: &str, sequence: u32, input: Amount, output: Amount) -> Offer {
    Offer::new(acct(owner), sequence, Amounts::new(input, output)).unwrap()
}

/// Selling 100 native for USD against an offer of 50 -> 100.
#[test]
fn partial_sell_against_matching_offer() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &native(dec!(1000)));
    ledger.credit(&acct("bob"), &usd(dec!(1000)));
    let mut bob_offer = offer("bob", 1, native(dec!(50)), usd(dec!(100)));

    {
        let mut taker = Taker::new(
            CrossType::NativeToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(native(dec!(100)), usd(dec!(200))),
            TakerFlags::sell(),
        )
        .unwrap();
        assert!(!taker.reject(bob_offer.quality()));

        let flow = taker.cross(&mut bob_offer).unwrap();
        assert_eq!(flow.order.input.value(), dec!(50));
        assert_eq!(flow.order.output.value(), dec!(100));
        assert_eq!(taker.basic().remaining().input.value(), dec!(50));
        assert!(!taker.done());

        let rest = taker.remaining_offer();
        assert_eq!(rest.input.value(), dec!(50));
        assert_eq!(rest.output.value(), dec!(100));
    }

    assert!(bob_offer.is_consumed());
    assert_eq!(ledger.balance(&acct("alice"), &Issue::native()), dec!(950));
    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(100));
    assert_eq!(ledger.balance(&acct("bob"), &Issue::native()), dec!(50));
    assert_eq!(ledger.balance(&acct("bob"), &usd_issue()), dec!(900));
}

/// Issuer fee of 1.02 on the output leg of an issued->issued
/// crossing.
#[test]
fn output_issuer_fee_is_paid_by_offer_owner() {
    let mut ledger = InMemoryLedger::new();
    ledger.set_transfer_rate(
        &acct("eur-gateway"),
        TransferRate::from_billionths(1_020_000_000).unwrap(),
    );
    ledger.credit(&acct("alice"), &usd(dec!(1000)));
    ledger.credit(&acct("bob"), &eur(dec!(1000)));
    let mut bob_offer = offer("bob", 1, usd(dec!(100)), eur(dec!(100)));

    {
        let mut taker = Taker::new(
            CrossType::IssuedToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(usd(dec!(1000)), eur(dec!(1000))),
            TakerFlags::default(),
        )
        .unwrap();
        let flow = taker.cross(&mut bob_offer).unwrap();

        assert_eq!(flow.order.output.value(), dec!(100));
        assert_eq!(flow.issuers.output.value(), dec!(102));
        assert_eq!(flow.order.input, flow.issuers.input);
    }

    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(900));
    assert_eq!(ledger.balance(&acct("alice"), &eur_issue()), dec!(100));
    assert_eq!(ledger.balance(&acct("bob"), &usd_issue()), dec!(100));
    assert_eq!(ledger.balance(&acct("bob"), &eur_issue()), dec!(898));
    // The fee returns to the issuer.
    assert_eq!(ledger.total_supply(&eur_issue()), dec!(998));
}

/// Leg 1 can supply 40 native, leg 2 wants 60.
#[test]
fn bridged_crossing_limited_by_first_leg() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &usd(dec!(1000)));
    ledger.credit(&acct("carol"), &native(dec!(1000)));
    ledger.credit(&acct("dave"), &eur(dec!(1000)));
    let mut leg1 = offer("carol", 1, usd(dec!(20)), native(dec!(40)));
    let mut leg2 = offer("dave", 2, native(dec!(60)), eur(dec!(120)));

    {
        let mut taker = Taker::new(
            CrossType::IssuedToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(usd(dec!(1000)), eur(dec!(1000))),
            TakerFlags::sell(),
        )
        .unwrap();
        assert!(!taker.reject(leg1.quality().compose(&leg2.quality())));
        let (flow1, flow2) = taker.cross_bridged(&mut leg1, &mut leg2).unwrap();

        assert_eq!(flow1.order.output.value(), dec!(40));
        assert_eq!(flow2.order.input.value(), dec!(40));
        assert_eq!(flow2.order.output.value(), dec!(80));
        assert_eq!(taker.native_flow().value(), dec!(40));
        assert_eq!(taker.bridge_crossings(), 1);
        assert_eq!(taker.direct_crossings(), 0);
        assert_eq!(taker.basic().remaining().input.value(), dec!(980));
        assert_eq!(taker.basic().remaining().output.value(), dec!(920));
    }

    assert!(leg1.is_consumed());
    assert_eq!(leg2.amounts().input.value(), dec!(20));
    assert_eq!(leg2.amounts().output.value(), dec!(40));

    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(980));
    assert_eq!(ledger.balance(&acct("alice"), &eur_issue()), dec!(80));
    assert_eq!(ledger.balance(&acct("carol"), &usd_issue()), dec!(20));
    assert_eq!(ledger.balance(&acct("carol"), &Issue::native()), dec!(960));
    assert_eq!(ledger.balance(&acct("dave"), &Issue::native()), dec!(40));
    assert_eq!(ledger.balance(&acct("dave"), &eur_issue()), dec!(920));
}

/// The taker owns leg 1: it pays itself nothing in USD, so it needs no
/// USD balance, only the native currency leg 1 hands to leg 2.
#[test]
fn bridge_through_takers_own_first_leg() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &native(dec!(100)));
    ledger.credit(&acct("dave"), &eur(dec!(1000)));
    let mut leg1 = offer("alice", 1, usd(dec!(20)), native(dec!(40)));
    let mut leg2 = offer("dave", 2, native(dec!(60)), eur(dec!(120)));

    {
        let mut taker = Taker::new(
            CrossType::IssuedToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(usd(dec!(1000)), eur(dec!(1000))),
            TakerFlags::sell(),
        )
        .unwrap();
        let (flow1, flow2) = taker.cross_bridged(&mut leg1, &mut leg2).unwrap();

        assert_eq!(flow1.order.input.value(), dec!(20));
        assert_eq!(flow1.order.output, flow2.order.input);
        assert_eq!(flow2.order.input.value(), dec!(40));
        assert_eq!(flow2.order.output.value(), dec!(80));
        assert_eq!(taker.basic().remaining().input.value(), dec!(980));
    }

    assert!(leg1.is_consumed());
    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), Decimal::ZERO);
    assert_eq!(ledger.balance(&acct("alice"), &Issue::native()), dec!(60));
    assert_eq!(ledger.balance(&acct("alice"), &eur_issue()), dec!(80));
    assert_eq!(ledger.balance(&acct("dave"), &Issue::native()), dec!(40));
    assert_eq!(ledger.balance(&acct("dave"), &eur_issue()), dec!(920));
}

/// The taker owns leg 2: its EUR never leaves its own account, so it needs
/// no EUR balance.
#[test]
fn bridge_through_takers_own_second_leg() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &usd(dec!(1000)));
    ledger.credit(&acct("carol"), &native(dec!(1000)));
    let mut leg1 = offer("carol", 1, usd(dec!(20)), native(dec!(40)));
    let mut leg2 = offer("alice", 2, native(dec!(60)), eur(dec!(120)));

    {
        let mut taker = Taker::new(
            CrossType::IssuedToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(usd(dec!(1000)), eur(dec!(1000))),
            TakerFlags::sell(),
        )
        .unwrap();
        let (flow1, flow2) = taker.cross_bridged(&mut leg1, &mut leg2).unwrap();

        assert_eq!(flow1.order.output.value(), dec!(40));
        assert_eq!(flow1.order.output, flow2.order.input);
        assert_eq!(flow2.order.output.value(), dec!(80));
        assert_eq!(taker.basic().remaining().output.value(), dec!(920));
    }

    assert!(leg1.is_consumed());
    assert_eq!(leg2.amounts().input.value(), dec!(20));
    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(980));
    assert_eq!(ledger.balance(&acct("alice"), &Issue::native()), dec!(40));
    assert_eq!(ledger.balance(&acct("alice"), &eur_issue()), Decimal::ZERO);
    assert_eq!(ledger.balance(&acct("carol"), &usd_issue()), dec!(20));
    assert_eq!(ledger.balance(&acct("carol"), &Issue::native()), dec!(960));
}

/// One account owns both legs: the native currency only moves between its
/// own offers, so it needs no native balance at all.
#[test]
fn bridge_with_both_legs_owned_by_one_account() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &usd(dec!(1000)));
    ledger.credit(&acct("bob"), &eur(dec!(1000)));
    let mut leg1 = offer("bob", 1, usd(dec!(20)), native(dec!(40)));
    let mut leg2 = offer("bob", 2, native(dec!(60)), eur(dec!(120)));

    {
        let mut taker = Taker::new(
            CrossType::IssuedToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(usd(dec!(1000)), eur(dec!(1000))),
            TakerFlags::sell(),
        )
        .unwrap();
        let (flow1, flow2) = taker.cross_bridged(&mut leg1, &mut leg2).unwrap();

        // Leg 1 is the smaller of the two, so it sets the native amount.
        assert_eq!(flow1.order.output.value(), dec!(40));
        assert_eq!(flow1.order.output, flow2.order.input);
        assert_eq!(flow2.order.output.value(), dec!(80));
        assert_eq!(taker.native_flow().value(), dec!(40));
    }

    assert!(leg1.is_consumed());
    assert_eq!(leg2.amounts().input.value(), dec!(20));
    assert_eq!(ledger.balance(&acct("bob"), &Issue::native()), Decimal::ZERO);
    assert_eq!(ledger.balance(&acct("bob"), &usd_issue()), dec!(20));
    assert_eq!(ledger.balance(&acct("bob"), &eur_issue()), dec!(920));
    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(980));
    assert_eq!(ledger.balance(&acct("alice"), &eur_issue()), dec!(80));
}

/// The same bridge with distinct leg owners fails when leg 1's owner holds
/// no native currency.
#[test]
fn bridge_with_distinct_owners_needs_native_funds() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &usd(dec!(1000)));
    ledger.credit(&acct("dave"), &eur(dec!(1000)));
    let mut leg1 = offer("carol", 1, usd(dec!(20)), native(dec!(40)));
    let mut leg2 = offer("dave", 2, native(dec!(60)), eur(dec!(120)));

    let mut taker = Taker::new(
        CrossType::IssuedToIssued,
        &mut ledger,
        acct("alice"),
        Amounts::new(usd(dec!(1000)), eur(dec!(1000))),
        TakerFlags::sell(),
    )
    .unwrap();
    let result = taker.cross_bridged(&mut leg1, &mut leg2);
    assert_eq!(ResultCode::of(&result), ResultCode::TecUnfundedOffer);
    assert_eq!(taker.bridge_crossings(), 0);
}

/// An offer below the taker's threshold is never crossed.
#[test]
fn worse_offer_is_rejected_before_crossing() {
    let json = r#"{
        "ledger": {
            "balances": [
                { "account": "alice", "value": "1000" },
                { "account": "bob", "currency": "USD", "issuer": "usd-gateway", "value": "1000" }
            ]
        },
        "taker": {
            "account": "alice",
            "input": { "value": "100" },
            "output": { "currency": "USD", "issuer": "usd-gateway", "value": "200" }
        },
        "steps": [
            { "direct": { "owner": "bob", "sequence": 1,
                          "input": { "value": "50" },
                          "output": { "currency": "USD", "issuer": "usd-gateway", "value": "90" } } }
        ]
    }"#;
    let report = Scenario::from_json(json).unwrap().run().unwrap();

    assert_eq!(report.stop, StopReason::QualityRejected);
    assert!(report.steps.is_empty());
    assert_eq!(report.remaining, report.original);
    assert_eq!(report.balance(&acct("bob"), &usd_issue()), dec!(1000));
    assert_eq!(report.balance(&acct("alice"), &Issue::native()), dec!(1000));
}

/// The offer owner holds nothing.
#[test]
fn unfunded_owner_aborts_step_without_changes() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &native(dec!(1000)));
    let mut bob_offer = offer("bob", 1, native(dec!(50)), usd(dec!(100)));
    let before = bob_offer.clone();

    {
        let mut taker = Taker::new(
            CrossType::NativeToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(native(dec!(100)), usd(dec!(200))),
            TakerFlags::default(),
        )
        .unwrap();
        let outcome = taker.cross(&mut bob_offer);
        let code = ResultCode::of(&outcome);

        assert!(matches!(outcome, Err(CrossError::UnfundedOffer { .. })));
        assert_eq!(code, ResultCode::TecUnfundedOffer);
        assert!(code.is_insufficient_funds());
        assert!(!code.is_fatal());
        assert_eq!(taker.basic().remaining(), taker.original_offer());
        assert_eq!(taker.direct_crossings(), 0);
    }

    assert_eq!(bob_offer, before);
    assert_eq!(ledger.balance(&acct("alice"), &Issue::native()), dec!(1000));
}

/// A native transfer that fails after the issued leg was staged leaves the
/// issued balances as they were.
#[test]
fn failed_native_leg_rolls_back_issued_leg() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &usd(dec!(100)));
    ledger.credit(&acct("alice"), &native(NATIVE_SUPPLY_CAP));
    ledger.credit(&acct("bob"), &native(dec!(10)));
    let mut bob_offer = offer("bob", 1, usd(dec!(10)), native(dec!(10)));
    let before = bob_offer.clone();

    {
        let mut taker = Taker::new(
            CrossType::IssuedToNative,
            &mut ledger,
            acct("alice"),
            Amounts::new(usd(dec!(100)), native(dec!(100))),
            TakerFlags::sell(),
        )
        .unwrap();
        let err = taker.cross(&mut bob_offer).unwrap_err();
        assert_eq!(err.code(), ResultCode::TecOversize);
        assert_eq!(taker.basic().remaining(), taker.original_offer());
    }

    assert_eq!(bob_offer, before);
    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(100));
    assert_eq!(ledger.balance(&acct("bob"), &usd_issue()), Decimal::ZERO);
    assert_eq!(ledger.balance(&acct("bob"), &Issue::native()), dec!(10));
}

#[test]
fn failed_bridge_leaves_both_legs_untouched() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &usd(dec!(1000)));
    ledger.credit(&acct("carol"), &native(dec!(1000)));
    ledger.credit(&acct("dave"), &eur(dec!(1000)));
    // Dave cannot receive any more native currency.
    ledger.credit(&acct("dave"), &native(NATIVE_SUPPLY_CAP));
    let mut leg1 = offer("carol", 1, usd(dec!(20)), native(dec!(40)));
    let mut leg2 = offer("dave", 2, native(dec!(60)), eur(dec!(120)));
    let (leg1_before, leg2_before) = (leg1.clone(), leg2.clone());

    {
        let mut taker = Taker::new(
            CrossType::IssuedToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(usd(dec!(1000)), eur(dec!(10000))),
            TakerFlags::sell(),
        )
        .unwrap();
        let err = taker.cross_bridged(&mut leg1, &mut leg2).unwrap_err();
        assert_eq!(err.code(), ResultCode::TecOversize);
        assert_eq!(taker.bridge_crossings(), 0);
        assert!(taker.native_flow().is_zero());
        assert_eq!(taker.basic().remaining(), taker.original_offer());
    }

    assert_eq!(leg1, leg1_before);
    assert_eq!(leg2, leg2_before);
    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(1000));
    assert_eq!(ledger.balance(&acct("carol"), &usd_issue()), Decimal::ZERO);
    assert_eq!(ledger.balance(&acct("carol"), &Issue::native()), dec!(1000));
}

#[test]
fn bridge_rejected_for_direct_taker() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &native(dec!(1000)));
    let mut leg1 = offer("carol", 1, usd(dec!(20)), native(dec!(40)));
    let mut leg2 = offer("dave", 2, native(dec!(60)), eur(dec!(120)));

    let mut taker = Taker::new(
        CrossType::NativeToIssued,
        &mut ledger,
        acct("alice"),
        Amounts::new(native(dec!(100)), eur(dec!(200))),
        TakerFlags::default(),
    )
    .unwrap();
    let err = taker.cross_bridged(&mut leg1, &mut leg2).unwrap_err();
    assert_eq!(err.code(), ResultCode::TefBadCross);
    assert!(err.code().is_fatal());
}

#[test]
fn issuer_offer_is_unlimited_and_fee_free() {
    let mut ledger = InMemoryLedger::new();
    ledger.set_transfer_rate(&acct("usd-gateway"), TransferRate::new(dec!(1.5)).unwrap());
    ledger.credit(&acct("alice"), &native(dec!(1000)));
    let mut gateway_offer = offer("usd-gateway", 1, native(dec!(50)), usd(dec!(100)));

    {
        let mut taker = Taker::new(
            CrossType::NativeToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(native(dec!(50)), usd(dec!(100))),
            TakerFlags::default(),
        )
        .unwrap();
        let flow = taker.cross(&mut gateway_offer).unwrap();
        assert_eq!(flow.issuers, flow.order);
        assert!(taker.done());
    }

    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(100));
    assert_eq!(ledger.balance(&acct("usd-gateway"), &Issue::native()), dec!(50));
    assert_eq!(ledger.total_supply(&usd_issue()), dec!(100));
}

#[test]
fn crossing_own_offer_moves_nothing() {
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&acct("alice"), &native(dec!(1000)));
    ledger.credit(&acct("alice"), &usd(dec!(500)));
    let mut own = offer("alice", 7, native(dec!(50)), usd(dec!(100)));

    {
        let mut taker = Taker::new(
            CrossType::NativeToIssued,
            &mut ledger,
            acct("alice"),
            Amounts::new(native(dec!(100)), usd(dec!(200))),
            TakerFlags::sell(),
        )
        .unwrap();
        taker.cross(&mut own).unwrap();
    }

    assert!(own.is_consumed());
    assert_eq!(ledger.balance(&acct("alice"), &Issue::native()), dec!(1000));
    assert_eq!(ledger.balance(&acct("alice"), &usd_issue()), dec!(500));
}

#[test]
fn scenario_file_skips_unfunded_offers_until_filled() {
    let json = r#"{
        "ledger": {
            "base_reserve": "10",
            "balances": [
                { "account": "alice", "value": "1000" },
                { "account": "bob", "currency": "USD", "issuer": "usd-gateway", "value": "100" },
                { "account": "carol", "currency": "USD", "issuer": "usd-gateway", "value": "100" }
            ]
        },
        "taker": {
            "account": "alice",
            "input": { "value": "100" },
            "output": { "currency": "USD", "issuer": "usd-gateway", "value": "200" },
            "flags": { "sell": true }
        },
        "steps": [
            { "direct": { "owner": "empty", "sequence": 1,
                          "input": { "value": "50" },
                          "output": { "currency": "USD", "issuer": "usd-gateway", "value": "100" } } },
            { "direct": { "owner": "bob", "sequence": 2,
                          "input": { "value": "50" },
                          "output": { "currency": "USD", "issuer": "usd-gateway", "value": "100" } } },
            { "direct": { "owner": "carol", "sequence": 3,
                          "input": { "value": "50" },
                          "output": { "currency": "USD", "issuer": "usd-gateway", "value": "100" } } },
            { "direct": { "owner": "dave", "sequence": 4,
                          "input": { "value": "50" },
                          "output": { "currency": "USD", "issuer": "usd-gateway", "value": "100" } } }
        ]
    }"#;
    let report = Scenario::from_json(json).unwrap().run().unwrap();

    let codes: Vec<ResultCode> = report.steps.iter().map(|s| s.code).collect();
    assert_eq!(
        codes,
        vec![
            ResultCode::TecUnfundedOffer,
            ResultCode::TesSuccess,
            ResultCode::TesSuccess
        ]
    );
    assert_eq!(report.stop, StopReason::Filled);
    assert_eq!(report.code(), ResultCode::TesSuccess);
    assert_eq!(report.direct_crossings, 2);
    assert!(report.remaining.input.is_zero());
    assert_eq!(report.balance(&acct("alice"), &usd_issue()), dec!(200));
    assert_eq!(report.balance(&acct("alice"), &Issue::native()), dec!(900));

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["steps"][0]["code"], "tecUNFUNDED_OFFER");
    assert_eq!(value["stop"], "filled");
    assert_eq!(value["cross_type"], "native_to_issued");
}

#[test]
fn scenario_file_bridged_step() {
    let json = r#"{
        "ledger": {
            "balances": [
                { "account": "alice", "currency": "USD", "issuer": "usd-gateway", "value": "1000" },
                { "account": "carol", "value": "1000" },
                { "account": "dave", "currency": "EUR", "issuer": "eur-gateway", "value": "1000" }
            ]
        },
        "taker": {
            "account": "alice",
            "input": { "currency": "USD", "issuer": "usd-gateway", "value": "1000" },
            "output": { "currency": "EUR", "issuer": "eur-gateway", "value": "1000" },
            "flags": { "sell": true }
        },
        "steps": [
            { "bridged": {
                "leg1": { "owner": "carol", "sequence": 1,
                          "input": { "currency": "USD", "issuer": "usd-gateway", "value": "20" },
                          "output": { "value": "40" } },
                "leg2": { "owner": "dave", "sequence": 2,
                          "input": { "value": "60" },
                          "output": { "currency": "EUR", "issuer": "eur-gateway", "value": "120" } } } }
        ]
    }"#;
    let report = Scenario::from_json(json).unwrap().run().unwrap();

    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].code, ResultCode::TesSuccess);
    assert_eq!(report.steps[0].flows.len(), 2);
    assert_eq!(report.bridge_crossings, 1);
    assert_eq!(report.native_flow.value(), dec!(40));
    assert_eq!(report.balance(&acct("alice"), &eur_issue()), dec!(80));
    assert_eq!(report.stop, StopReason::BookExhausted);
}
