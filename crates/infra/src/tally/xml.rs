//! Tally XML wire encoder.
//!
//! Pure string builders. The remote importer is sensitive to tag order and
//! stray whitespace, so output is emitted compact with no indentation.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use retailpos_accounting::{Side, Voucher};

const LIST_COMPANIES_REQUEST: &str = concat!(
    "<ENVELOPE>",
    "<HEADER><TALLYREQUEST>Export Data</TALLYREQUEST></HEADER>",
    "<BODY><EXPORTDATA><REQUESTDESC>",
    "<REPORTNAME>List of Companies</REPORTNAME>",
    "<STATICVARIABLES><SVEXPORTFORMAT>$$SysName:XML</SVEXPORTFORMAT></STATICVARIABLES>",
    "</REQUESTDESC></EXPORTDATA></BODY>",
    "</ENVELOPE>",
);

/// Escape free text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the predefined XML entities and numeric character references
/// (`&#38;`, `&#x26;`) found in remote responses. Unknown or malformed
/// references are kept verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let decoded = rest
            .find(';')
            .filter(|&end| end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Longest reference body considered, `&#x10FFFF` plus the ampersand.
const MAX_ENTITY_LEN: usize = 9;

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Two decimal digits, `.` separator, leading `-` for negatives.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded.to_string()
}

/// `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn import_envelope(report_name: &str, company: &str, inner_xml: &str) -> String {
    format!(
        "<ENVELOPE><HEADER><TALLYREQUEST>Import Data</TALLYREQUEST></HEADER>\
         <BODY><IMPORTDATA><REQUESTDESC><REPORTNAME>{report_name}</REPORTNAME>\
         <STATICVARIABLES><SVCURRENTCOMPANY>{company}</SVCURRENTCOMPANY></STATICVARIABLES>\
         </REQUESTDESC><REQUESTDATA>{inner_xml}</REQUESTDATA></IMPORTDATA></BODY></ENVELOPE>",
        company = escape(company),
    )
}

pub fn build_master_envelope(company: &str, inner_xml: &str) -> String {
    import_envelope("All Masters", company, inner_xml)
}

pub fn build_voucher_envelope(company: &str, inner_xml: &str) -> String {
    import_envelope("Vouchers", company, inner_xml)
}

/// Ledger-create message. `signed_opening_balance` is positive for a debit
/// opening and negative for a credit opening.
pub fn build_ledger_master(
    name: &str,
    parent_group: &str,
    signed_opening_balance: Decimal,
    cost_centres: bool,
) -> String {
    format!(
        "<TALLYMESSAGE><LEDGER NAME=\"{name}\" ACTION=\"Create\">\
         <PARENT>{parent}</PARENT>\
         <OPENINGBALANCE>{opening}</OPENINGBALANCE>\
         <ISCOSTCENTRESON>{cost_centres}</ISCOSTCENTRESON>\
         </LEDGER></TALLYMESSAGE>",
        name = escape(name),
        parent = escape(parent_group),
        opening = format_amount(signed_opening_balance),
        cost_centres = yes_no(cost_centres),
    )
}

/// Voucher-create message with one `ALLLEDGERENTRIES.LIST` block per line.
///
/// Debit lines are sent as `ISDEEMEDPOSITIVE=No` with a positive amount and
/// credit lines as `ISDEEMEDPOSITIVE=Yes` with a negated amount. This is the
/// convention the deployed remote instance accepts; keep it as is.
pub fn build_voucher(voucher: &Voucher) -> String {
    let mut xml = format!(
        "<TALLYMESSAGE><VOUCHER VCHTYPE=\"{vch_type}\" ACTION=\"Create\">\
         <DATE>{date}</DATE><VOUCHERNUMBER>{number}</VOUCHERNUMBER>",
        vch_type = escape(voucher.voucher_type.as_str()),
        date = format_date(voucher.date),
        number = escape(&voucher.number),
    );

    if let Some(party) = voucher.party_ledger.as_deref().filter(|p| !p.trim().is_empty()) {
        xml.push_str(&format!("<PARTYLEDGERNAME>{}</PARTYLEDGERNAME>", escape(party)));
    }
    if let Some(narration) = voucher.narration.as_deref().filter(|n| !n.trim().is_empty()) {
        xml.push_str(&format!("<NARRATION>{}</NARRATION>", escape(narration)));
    }

    for line in &voucher.lines {
        let (deemed_positive, amount) = match line.side {
            Side::Debit => (false, line.amount),
            Side::Credit => (true, -line.amount),
        };
        xml.push_str(&format!(
            "<ALLLEDGERENTRIES.LIST><LEDGERNAME>{ledger}</LEDGERNAME>\
             <ISDEEMEDPOSITIVE>{deemed}</ISDEEMEDPOSITIVE>\
             <AMOUNT>{amount}</AMOUNT></ALLLEDGERENTRIES.LIST>",
            ledger = escape(&line.ledger_name),
            deemed = yes_no(deemed_positive),
            amount = format_amount(amount),
        ));
    }

    xml.push_str("</VOUCHER></TALLYMESSAGE>");
    xml
}

/// Fixed diagnostic request, not scoped to any company.
pub fn list_companies_request() -> &'static str {
    LIST_COMPANIES_REQUEST
}
