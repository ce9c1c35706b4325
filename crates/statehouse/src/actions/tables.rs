//! Static action-code and action-text tables.
//!
//! Edit these to change how actions are tagged; the lookup logic in the parent
//! module never needs to change. A code mapped to `None` is known and
//! deliberately left unclassified.

use super::ActionTag::{self, *};

pub(super) type CodeRow = (&'static str, Option<&'static [ActionTag]>);

/// Every listed needle must appear (case-insensitive) for the rule to fire.
/// A needle prefixed with `!` must not appear.
pub(super) type TextRule = (&'static [&'static str], &'static [ActionTag]);

pub(super) const GA_CODES: &[CodeRow] = &[
    ("HI", None),
    ("SI", None),
    ("HH", Some(&[Introduction])),
    ("SH", Some(&[Introduction])),
    ("HPF", Some(&[Filing])),
    ("HDSAS", None),
    ("SPF", Some(&[Filing])),
    ("HSR", Some(&[Reading2])),
    ("SSR", Some(&[Reading2])),
    ("HFR", Some(&[Reading1])),
    ("SFR", Some(&[Reading1])),
    ("HRECM", Some(&[Withdrawal, ReferralCommittee])),
    ("SRECM", Some(&[Withdrawal, ReferralCommittee])),
    ("SW&C", Some(&[Withdrawal, ReferralCommittee])),
    ("HW&C", Some(&[Withdrawal, ReferralCommittee])),
    ("HRA", Some(&[Passage])),
    ("SRA", Some(&[Passage])),
    ("HPA", Some(&[Passage])),
    ("HRECO", None),
    ("SPA", Some(&[Passage])),
    ("HTABL", None),
    ("SDHAS", None),
    ("HCFR", Some(&[CommitteePassageFavorable])),
    ("SCFR", Some(&[CommitteePassageFavorable])),
    ("HRAR", Some(&[ReferralCommittee])),
    ("SRAR", Some(&[ReferralCommittee])),
    ("STR", Some(&[Reading3])),
    ("SAHAS", None),
    ("SE", Some(&[Passage])),
    ("SR", Some(&[ReferralCommittee])),
    ("HTRL", Some(&[Reading3, Failure])),
    ("HTR", Some(&[Reading3])),
    ("S3RLT", Some(&[Reading3, Failure])),
    ("HASAS", None),
    ("S3RPP", None),
    ("STAB", None),
    ("SRECO", None),
    ("SAPPT", None),
    ("HCA", None),
    ("HNOM", None),
    ("HTT", None),
    ("STT", None),
    ("SRECP", None),
    ("SCRA", None),
    ("SNOM", None),
    ("S2R", Some(&[Reading2])),
    ("H2R", Some(&[Reading2])),
    ("SENG", Some(&[Passage])),
    ("HENG", Some(&[Passage])),
    ("HPOST", None),
    ("HCAP", None),
    ("SDSG", Some(&[ExecutiveSignature])),
    ("SSG", Some(&[ExecutiveReceipt])),
    ("Signed Gov", Some(&[ExecutiveSignature])),
    ("HDSG", Some(&[ExecutiveSignature])),
    ("HSG", Some(&[ExecutiveReceipt])),
    ("EFF", None),
    ("HRP", None),
    ("STH", None),
    ("HTS", None),
];

/// `DateType` values of the Arizona bill-status API.
pub(super) const AZ_CODES: &[CodeRow] = &[
    ("FIRST", Some(&[Reading1])),
    ("SECOND", Some(&[Reading2])),
    ("THIRD", Some(&[Reading3])),
    ("FINAL", Some(&[Passage])),
    ("TRANSMIT TO GOVERNOR", Some(&[ExecutiveReceipt])),
    ("GOVERNOR ACTION", None),
];

pub(super) const NO_CODES: &[CodeRow] = &[];

/// Phrasing shared by the free-text history pages (NV, UT, IL, WI, TX, PA).
pub(super) const COMMON_TEXT_RULES: &[TextRule] = &[
    (&["introduced"], &[Introduction]),
    (&["prefiled"], &[Filing]),
    (&["filed with"], &[Filing]),
    (&["read first time"], &[Reading1]),
    (&["first reading"], &[Reading1]),
    (&["1st reading"], &[Reading1]),
    (&["read second time"], &[Reading2]),
    (&["second reading"], &[Reading2]),
    (&["2nd reading"], &[Reading2]),
    (&["read third time"], &[Reading3]),
    (&["third reading"], &[Reading3]),
    (&["3rd reading"], &[Reading3]),
    (&["withdrawn"], &[Withdrawal]),
    (&["referred to"], &[ReferralCommittee]),
    (&["rereferred"], &[ReferralCommittee]),
    (&["do pass"], &[CommitteePassageFavorable]),
    (&["recommended", "passage"], &[CommitteePassageFavorable]),
    (
        &["passed", "!1st reading", "!2nd reading", "!first reading", "!second reading"],
        &[Passage],
    ),
    (&["final passage"], &[Passage]),
    (&["concurred"], &[Passage]),
    (&["to governor"], &[ExecutiveReceipt]),
    (&["delivered to", "governor"], &[ExecutiveReceipt]),
    (&["approved by", "governor"], &[ExecutiveSignature]),
    (&["signed by", "governor"], &[ExecutiveSignature]),
    (&["governor signed"], &[ExecutiveSignature]),
    (&["failed"], &[Failure]),
    (&["lost"], &[Failure]),
];

pub(super) const NO_TEXT_RULES: &[TextRule] = &[];
