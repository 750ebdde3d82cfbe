//! Voucher assembly: business totals in, balanced double-entry lines out.
//!
//! Every assembler records non-negative magnitudes: a negative amount moves
//! its line to the opposite side, so vouchers balance for any input. Zero
//! amounts and blank ledgers are dropped, so a voucher may carry fewer lines
//! than the document type could produce.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;
use crate::settings::LedgerNames;

/// Remote voucher type (`VCHTYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    Sales,
    Purchase,
    Receipt,
    Payment,
}

impl VoucherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherType::Sales => "Sales",
            VoucherType::Purchase => "Purchase",
            VoucherType::Receipt => "Receipt",
            VoucherType::Payment => "Payment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }
}

/// One ledger entry of a voucher (immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherLine {
    pub ledger_name: String,
    pub side: Side,
    /// Always strictly positive.
    pub amount: Decimal,
}

impl VoucherLine {
    pub fn is_debit(&self) -> bool {
        self.side == Side::Debit
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub voucher_type: VoucherType,
    pub number: String,
    pub date: NaiveDate,
    pub party_ledger: Option<String>,
    pub narration: Option<String>,
    pub lines: Vec<VoucherLine>,
}

impl Voucher {
    pub fn debit_total(&self) -> Decimal {
        self.side_total(Side::Debit)
    }

    pub fn credit_total(&self) -> Decimal {
        self.side_total(Side::Credit)
    }

    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }

    fn side_total(&self, side: Side) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.side == side)
            .map(|l| l.amount)
            .sum()
    }
}

/// Line accumulator applying the suppression rules.
#[derive(Debug, Default)]
struct Lines(Vec<VoucherLine>);

impl Lines {
    fn push(&mut self, ledger: &str, side: Side, amount: Decimal) -> &mut Self {
        let ledger = ledger.trim();
        let side = if amount.is_sign_negative() { side.opposite() } else { side };
        let amount = amount.abs();
        if !ledger.is_empty() && !amount.is_zero() {
            self.0.push(VoucherLine {
                ledger_name: ledger.to_string(),
                side,
                amount,
            });
        }
        self
    }

    fn debit(&mut self, ledger: &str, amount: Decimal) -> &mut Self {
        self.push(ledger, Side::Debit, amount)
    }

    fn credit(&mut self, ledger: &str, amount: Decimal) -> &mut Self {
        self.push(ledger, Side::Credit, amount)
    }

    fn into_vec(self) -> Vec<VoucherLine> {
        self.0
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// A business document that turns into exactly one voucher.
pub trait Posting {
    /// Remote voucher type the document is posted as.
    const VOUCHER_TYPE: VoucherType;

    fn kind(&self) -> DocumentKind;

    /// Voucher number, also the sync-log document key.
    fn voucher_no(&self) -> &str;

    fn assemble(&self, ledgers: &LedgerNames) -> Voucher;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesPosting {
    pub voucher_no: String,
    pub date: NaiveDate,
    pub party_ledger: String,
    pub is_cash_sale: bool,
    pub subtotal: Decimal,
    pub vat: Decimal,
    /// Positive when the bill was rounded up.
    pub rounding_delta: Decimal,
}

impl Posting for SalesPosting {
    const VOUCHER_TYPE: VoucherType = VoucherType::Sales;

    fn kind(&self) -> DocumentKind {
        DocumentKind::Sale
    }

    fn voucher_no(&self) -> &str {
        &self.voucher_no
    }

    fn assemble(&self, ledgers: &LedgerNames) -> Voucher {
        let total = self.subtotal + self.vat + self.rounding_delta;
        let target = if self.is_cash_sale {
            ledgers.cash.as_str()
        } else {
            self.party_ledger.as_str()
        };

        let mut lines = Lines::default();
        lines
            .debit(target, total)
            .credit(&ledgers.sales, self.subtotal)
            .credit(&ledgers.vat_output, self.vat);
        let rounding = self.rounding_delta.abs();
        if self.rounding_delta.is_sign_negative() {
            lines.debit(&ledgers.rounding, rounding);
        } else {
            lines.credit(&ledgers.rounding, rounding);
        }

        Voucher {
            voucher_type: Self::VOUCHER_TYPE,
            number: self.voucher_no.clone(),
            date: self.date,
            party_ledger: if self.is_cash_sale {
                None
            } else {
                non_blank(Some(&self.party_ledger))
            },
            narration: None,
            lines: lines.into_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePosting {
    pub voucher_no: String,
    pub date: NaiveDate,
    pub vendor_ledger: String,
    pub is_cash_purchase: bool,
    pub subtotal: Decimal,
    pub vat: Decimal,
    /// Positive when the bill was rounded up.
    pub rounding_delta: Decimal,
}

impl Posting for PurchasePosting {
    const VOUCHER_TYPE: VoucherType = VoucherType::Purchase;

    fn kind(&self) -> DocumentKind {
        DocumentKind::Purchase
    }

    fn voucher_no(&self) -> &str {
        &self.voucher_no
    }

    fn assemble(&self, ledgers: &LedgerNames) -> Voucher {
        let total = self.subtotal + self.vat + self.rounding_delta;
        let source = if self.is_cash_purchase {
            ledgers.cash.as_str()
        } else {
            self.vendor_ledger.as_str()
        };

        let mut lines = Lines::default();
        lines
            .debit(&ledgers.purchase, self.subtotal)
            .debit(&ledgers.vat_input, self.vat);
        let rounding = self.rounding_delta.abs();
        if self.rounding_delta.is_sign_negative() {
            lines.credit(&ledgers.rounding, rounding);
        } else {
            lines.debit(&ledgers.rounding, rounding);
        }
        lines.credit(source, total);

        Voucher {
            voucher_type: Self::VOUCHER_TYPE,
            number: self.voucher_no.clone(),
            date: self.date,
            party_ledger: if self.is_cash_purchase {
                None
            } else {
                non_blank(Some(&self.vendor_ledger))
            },
            narration: None,
            lines: lines.into_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptPosting {
    pub voucher_no: String,
    pub date: NaiveDate,
    pub customer_ledger: String,
    pub to_bank: bool,
    pub amount: Decimal,
    pub narration: Option<String>,
}

impl Posting for ReceiptPosting {
    const VOUCHER_TYPE: VoucherType = VoucherType::Receipt;

    fn kind(&self) -> DocumentKind {
        DocumentKind::Receipt
    }

    fn voucher_no(&self) -> &str {
        &self.voucher_no
    }

    fn assemble(&self, ledgers: &LedgerNames) -> Voucher {
        let mut lines = Lines::default();
        lines
            .debit(ledgers.cash_or_bank(self.to_bank), self.amount)
            .credit(&self.customer_ledger, self.amount);

        Voucher {
            voucher_type: Self::VOUCHER_TYPE,
            number: self.voucher_no.clone(),
            date: self.date,
            party_ledger: non_blank(Some(&self.customer_ledger)),
            narration: non_blank(self.narration.as_deref()),
            lines: lines.into_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorPaymentPosting {
    pub voucher_no: String,
    pub date: NaiveDate,
    pub vendor_ledger: String,
    pub from_bank: bool,
    pub amount: Decimal,
    pub narration: Option<String>,
}

impl Posting for VendorPaymentPosting {
    const VOUCHER_TYPE: VoucherType = VoucherType::Payment;

    fn kind(&self) -> DocumentKind {
        DocumentKind::VendorPayment
    }

    fn voucher_no(&self) -> &str {
        &self.voucher_no
    }

    fn assemble(&self, ledgers: &LedgerNames) -> Voucher {
        let mut lines = Lines::default();
        lines
            .debit(&self.vendor_ledger, self.amount)
            .credit(ledgers.cash_or_bank(self.from_bank), self.amount);

        Voucher {
            voucher_type: Self::VOUCHER_TYPE,
            number: self.voucher_no.clone(),
            date: self.date,
            party_ledger: non_blank(Some(&self.vendor_ledger)),
            narration: non_blank(self.narration.as_deref()),
            lines: lines.into_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePosting {
    pub voucher_no: String,
    pub date: NaiveDate,
    pub expense_ledger: String,
    pub from_bank: bool,
    pub amount: Decimal,
    pub narration: Option<String>,
}

impl Posting for ExpensePosting {
    const VOUCHER_TYPE: VoucherType = VoucherType::Payment;

    fn kind(&self) -> DocumentKind {
        DocumentKind::Expense
    }

    fn voucher_no(&self) -> &str {
        &self.voucher_no
    }

    fn assemble(&self, ledgers: &LedgerNames) -> Voucher {
        let mut lines = Lines::default();
        lines
            .debit(&self.expense_ledger, self.amount)
            .credit(ledgers.cash_or_bank(self.from_bank), self.amount);

        Voucher {
            voucher_type: Self::VOUCHER_TYPE,
            number: self.voucher_no.clone(),
            date: self.date,
            party_ledger: None,
            narration: non_blank(self.narration.as_deref()),
            lines: lines.into_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn sale(is_cash_sale: bool, subtotal: Decimal, vat: Decimal, rounding: Decimal) -> SalesPosting {
        SalesPosting {
            voucher_no: "S-1".to_string(),
            date: date(),
            party_ledger: "Acme Traders".to_string(),
            is_cash_sale,
            subtotal,
            vat,
            rounding_delta: rounding,
        }
    }

    fn purchase(subtotal: Decimal, vat: Decimal, rounding: Decimal) -> PurchasePosting {
        PurchasePosting {
            voucher_no: "P-1".to_string(),
            date: date(),
            vendor_ledger: "Wholesale Ltd".to_string(),
            is_cash_purchase: false,
            subtotal,
            vat,
            rounding_delta: rounding,
        }
    }

    fn line<'a>(v: &'a Voucher, ledger: &str) -> Option<&'a VoucherLine> {
        v.lines.iter().find(|l| l.ledger_name == ledger)
    }

    #[test]
    fn credit_sale_debits_the_party() {
        let v = sale(false, dec!(100), dec!(5), dec!(0)).assemble(&LedgerNames::default());
        assert_eq!(v.voucher_type, VoucherType::Sales);
        assert_eq!(v.party_ledger.as_deref(), Some("Acme Traders"));
        let dr = line(&v, "Acme Traders").unwrap();
        assert!(dr.is_debit());
        assert_eq!(dr.amount, dec!(105));
        assert_eq!(line(&v, "Sales").unwrap().amount, dec!(100));
        assert_eq!(line(&v, "Output VAT").unwrap().side, Side::Credit);
        assert_eq!(v.lines.len(), 3);
        assert!(v.is_balanced());
    }

    #[test]
    fn cash_sale_debits_cash_and_omits_party() {
        let v = sale(true, dec!(100), dec!(5), dec!(0)).assemble(&LedgerNames::default());
        assert_eq!(v.party_ledger, None);
        assert_eq!(line(&v, "Cash").unwrap().amount, dec!(105));
        assert!(line(&v, "Acme Traders").is_none());
    }

    #[test]
    fn zero_vat_and_rounding_produce_no_lines() {
        let v = sale(true, dec!(40), dec!(0), dec!(0)).assemble(&LedgerNames::default());
        assert_eq!(v.lines.len(), 2);
        assert!(line(&v, "Output VAT").is_none());
        assert!(line(&v, "Round Off").is_none());
    }

    #[test]
    fn sales_rounding_side_follows_delta_sign() {
        let up = sale(true, dec!(99.70), dec!(0), dec!(0.30)).assemble(&LedgerNames::default());
        let r = line(&up, "Round Off").unwrap();
        assert_eq!((r.side, r.amount), (Side::Credit, dec!(0.30)));
        assert_eq!(line(&up, "Cash").unwrap().amount, dec!(100.00));

        let down = sale(true, dec!(100.20), dec!(0), dec!(-0.20)).assemble(&LedgerNames::default());
        let r = line(&down, "Round Off").unwrap();
        assert_eq!((r.side, r.amount), (Side::Debit, dec!(0.20)));
        assert!(down.is_balanced());
    }

    #[test]
    fn purchase_rounding_side_is_inverted() {
        let up = purchase(dec!(99.70), dec!(0), dec!(0.30)).assemble(&LedgerNames::default());
        assert_eq!(line(&up, "Round Off").unwrap().side, Side::Debit);
        assert_eq!(line(&up, "Wholesale Ltd").unwrap().side, Side::Credit);
        assert_eq!(line(&up, "Wholesale Ltd").unwrap().amount, dec!(100.00));

        let down = purchase(dec!(100.20), dec!(0), dec!(-0.20)).assemble(&LedgerNames::default());
        assert_eq!(line(&down, "Round Off").unwrap().side, Side::Credit);
        assert!(down.is_balanced());
    }

    #[test]
    fn cash_purchase_credits_cash() {
        let mut p = purchase(dec!(10), dec!(1), dec!(0));
        p.is_cash_purchase = true;
        let v = p.assemble(&LedgerNames::default());
        assert_eq!(v.party_ledger, None);
        assert_eq!(line(&v, "Cash").unwrap().side, Side::Credit);
        assert_eq!(line(&v, "Input VAT").unwrap().amount, dec!(1));
    }

    #[test]
    fn receipt_to_bank_debits_bank() {
        let r = ReceiptPosting {
            voucher_no: "R-7".to_string(),
            date: date(),
            customer_ledger: "Acme Traders".to_string(),
            to_bank: true,
            amount: dec!(250),
            narration: Some("  ".to_string()),
        };
        let v = r.assemble(&LedgerNames::default());
        assert_eq!(v.voucher_type, VoucherType::Receipt);
        assert_eq!(v.narration, None);
        let bank = line(&v, "Bank").unwrap();
        assert_eq!((bank.side, bank.amount), (Side::Debit, dec!(250)));
        assert_eq!(line(&v, "Acme Traders").unwrap().side, Side::Credit);
    }

    #[test]
    fn vendor_payment_credits_cash_or_bank() {
        let p = VendorPaymentPosting {
            voucher_no: "PAY-1".to_string(),
            date: date(),
            vendor_ledger: "Wholesale Ltd".to_string(),
            from_bank: false,
            amount: dec!(75.5),
            narration: Some("March dues".to_string()),
        };
        let v = p.assemble(&LedgerNames::default());
        assert_eq!(v.voucher_type, VoucherType::Payment);
        assert_eq!(line(&v, "Wholesale Ltd").unwrap().side, Side::Debit);
        assert_eq!(line(&v, "Cash").unwrap().side, Side::Credit);
        assert_eq!(v.narration.as_deref(), Some("March dues"));
    }

    #[test]
    fn expense_uses_payment_voucher_without_party() {
        let e = ExpensePosting {
            voucher_no: "EXP-3".to_string(),
            date: date(),
            expense_ledger: "Electricity".to_string(),
            from_bank: true,
            amount: dec!(120),
            narration: None,
        };
        assert_eq!(e.kind(), DocumentKind::Expense);
        let v = e.assemble(&LedgerNames::default());
        assert_eq!(v.voucher_type, VoucherType::Payment);
        assert_eq!(v.party_ledger, None);
        assert_eq!(line(&v, "Electricity").unwrap().side, Side::Debit);
        assert_eq!(line(&v, "Bank").unwrap().side, Side::Credit);
    }

    #[test]
    fn blank_ledgers_are_dropped() {
        let mut ledgers = LedgerNames::default();
        ledgers.vat_output = "   ".to_string();
        let v = sale(true, dec!(10), dec!(2), dec!(0)).assemble(&ledgers);
        assert_eq!(v.lines.len(), 2);
        assert!(v.lines.iter().all(|l| !l.ledger_name.trim().is_empty()));
    }

    #[test]
    fn negative_sale_total_moves_the_target_to_the_credit_side() {
        let v = sale(true, dec!(0.10), dec!(0), dec!(-0.20)).assemble(&LedgerNames::default());
        let cash = line(&v, "Cash").unwrap();
        assert_eq!((cash.side, cash.amount), (Side::Credit, dec!(0.10)));
        assert_eq!(line(&v, "Round Off").unwrap().side, Side::Debit);
        assert!(v.is_balanced());
    }

    #[test]
    fn negative_purchase_total_moves_the_vendor_to_the_debit_side() {
        let v = purchase(dec!(0), dec!(0), dec!(-0.40)).assemble(&LedgerNames::default());
        let vendor = line(&v, "Wholesale Ltd").unwrap();
        assert_eq!((vendor.side, vendor.amount), (Side::Debit, dec!(0.40)));
        assert_eq!(line(&v, "Round Off").unwrap().side, Side::Credit);
        assert!(v.is_balanced());
    }

    #[test]
    fn negative_receipt_amount_reverses_both_lines() {
        let r = ReceiptPosting {
            voucher_no: "R-9".to_string(),
            date: date(),
            customer_ledger: "Acme Traders".to_string(),
            to_bank: false,
            amount: dec!(-25),
            narration: None,
        };
        let v = r.assemble(&LedgerNames::default());
        assert_eq!(line(&v, "Cash").unwrap().side, Side::Credit);
        assert_eq!(line(&v, "Acme Traders").unwrap().side, Side::Debit);
        assert!(v.is_balanced());
    }

    #[test]
    fn voucher_types_follow_the_document() {
        assert_eq!(SalesPosting::VOUCHER_TYPE, VoucherType::Sales);
        assert_eq!(PurchasePosting::VOUCHER_TYPE, VoucherType::Purchase);
        assert_eq!(ReceiptPosting::VOUCHER_TYPE, VoucherType::Receipt);
        assert_eq!(VendorPaymentPosting::VOUCHER_TYPE, VoucherType::Payment);
        assert_eq!(ExpensePosting::VOUCHER_TYPE, VoucherType::Payment);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: sales vouchers balance for any non-negative totals and
        /// any rounding, including a delta larger than the bill itself.
        #[test]
        fn sales_vouchers_balance(
            subtotal in 0i64..10_000_000i64,
            vat in 0i64..1_000_000i64,
            rounding in -20_000_000i64..=20_000_000i64,
            is_cash_sale in any::<bool>(),
        ) {
            let (s, v, r) = (Decimal::new(subtotal, 2), Decimal::new(vat, 2), Decimal::new(rounding, 2));
            let voucher = sale(is_cash_sale, s, v, r).assemble(&LedgerNames::default());

            prop_assert_eq!(voucher.debit_total(), voucher.credit_total());
            prop_assert!(voucher.lines.iter().all(|l| l.amount > Decimal::ZERO));
            if s + v + r >= Decimal::ZERO {
                prop_assert_eq!(voucher.debit_total(), s + v + r.max(Decimal::ZERO));
            }
        }

        /// Property: purchase vouchers balance with the inverted rounding rule.
        #[test]
        fn purchase_vouchers_balance(
            subtotal in 0i64..10_000_000i64,
            vat in 0i64..1_000_000i64,
            rounding in -20_000_000i64..=20_000_000i64,
        ) {
            let (s, v, r) = (Decimal::new(subtotal, 2), Decimal::new(vat, 2), Decimal::new(rounding, 2));
            let voucher = purchase(s, v, r).assemble(&LedgerNames::default());

            prop_assert_eq!(voucher.debit_total(), voucher.credit_total());
            prop_assert!(voucher.lines.iter().all(|l| l.amount > Decimal::ZERO));
        }
    }
}
