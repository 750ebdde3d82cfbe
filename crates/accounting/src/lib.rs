//! Accounting bridge domain (chart of accounts, posting settings, vouchers).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod chart;
pub mod document;
pub mod settings;
pub mod voucher;

pub use chart::{default_parent_group, AccountGroup, BalanceType, GroupNature, LedgerAccount};
pub use document::DocumentKind;
pub use settings::{AutoPostFlags, LedgerNames, PostingSettings};
pub use voucher::{
    ExpensePosting, Posting, PurchasePosting, ReceiptPosting, SalesPosting, Side,
    VendorPaymentPosting, Voucher, VoucherLine, VoucherType,
};
