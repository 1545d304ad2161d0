//! Bridged crossing example.
//!
//! Demonstrates how a USD -> EUR trade is filled through two offers that
//! meet in the native currency, and how the issuer's transfer fee shows up
//! in the flows.

use offer_crossing::book::basic_taker::TakerFlags;
use offer_crossing::book::flow::CrossType;
use offer_crossing::book::offer::Offer;
use offer_crossing::book::taker::Taker;
use offer_crossing::core::account::AccountId;
use offer_crossing::core::amount::{Amount, Amounts};
use offer_crossing::core::currency::Issue;
use offer_crossing::core::ledger::{InMemoryLedger, LedgerView};
use offer_crossing::core::rate::TransferRate;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  offer-crossing: Bridged Crossing             ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let usd_gateway = AccountId::new("USD-GATEWAY");
    let eur_gateway = AccountId::new("EUR-GATEWAY");
    let usd = Issue::new("USD", usd_gateway.clone());
    let eur = Issue::new("EUR", eur_gateway.clone());

    let alice = AccountId::new("ALICE");
    let carol = AccountId::new("CAROL");
    let dave = AccountId::new("DAVE");

    let mut ledger = InMemoryLedger::new();
    ledger.set_transfer_rate(&eur_gateway, TransferRate::new(dec!(1.002)).unwrap());
    ledger.credit(&alice, &Amount::new(dec!(1_000), usd.clone()));
    ledger.credit(&carol, &Amount::native(dec!(5_000)));
    ledger.credit(&dave, &Amount::new(dec!(1_000), eur.clone()));

    println!("Book:");
    println!("  CAROL sells 400 SWT for 200 USD");
    println!("  DAVE  sells 180 EUR for 600 SWT");
    println!("  EUR-GATEWAY charges a 0.2% transfer fee\n");

    let mut leg1 = Offer::new(
        carol.clone(),
        1,
        Amounts::new(
            Amount::new(dec!(200), usd.clone()),
            Amount::native(dec!(400)),
        ),
    )
    .unwrap();
    let mut leg2 = Offer::new(
        dave.clone(),
        2,
        Amounts::new(
            Amount::native(dec!(600)),
            Amount::new(dec!(180), eur.clone()),
        ),
    )
    .unwrap();

    println!("━━━ Crossing ━━━\n");
    {
        let mut taker = Taker::new(
            CrossType::IssuedToIssued,
            &mut ledger,
            alice.clone(),
            Amounts::new(
                Amount::new(dec!(500), usd.clone()),
                Amount::new(dec!(100), eur.clone()),
            ),
            TakerFlags::default(),
        )
        .unwrap();

        let quality = leg1.quality().compose(&leg2.quality());
        println!("  Bridge quality:  {} EUR per USD", quality);
        println!("  Rejected:        {}", taker.reject(quality));

        match taker.cross_bridged(&mut leg1, &mut leg2) {
            Ok((flow1, flow2)) => {
                println!("  Leg 1:           {}", flow1);
                println!("  Leg 2:           {}", flow2);
            }
            Err(e) => println!("  Failed:          {} ({})", e, e.code()),
        }
        println!("  Native bridged:  {}", taker.native_flow());
        println!("  Remaining:       {}", taker.remaining_offer());
        println!("  Done:            {}", taker.done());
    }

    println!("\n━━━ Balances ━━━\n");
    for (name, account) in [("ALICE", &alice), ("CAROL", &carol), ("DAVE", &dave)] {
        println!(
            "  {:<6} USD {:>10}  EUR {:>10}  SWT {:>10}",
            name,
            ledger.balance(account, &usd).normalize(),
            ledger.balance(account, &eur).normalize(),
            ledger.balance(account, &Issue::native()).normalize(),
        );
    }

    println!("\n━━━ Interpretation ━━━\n");
    println!("  ALICE only buys 100 EUR, which DAVE sells for 333.333334 SWT.");
    println!("  CAROL's leg is scaled down to deliver exactly that much SWT, so");
    println!("  nothing is left in the bridge. DAVE pays the EUR transfer fee on");
    println!("  top of what ALICE receives.");
}
