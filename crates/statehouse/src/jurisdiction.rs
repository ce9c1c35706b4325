//! Named per-state policy.
//!
//! Each legislature gets one [`JurisdictionProfile`]. Every behaviour that
//! differs between states (the history prefix used when an action names no
//! chamber, the two-digit-year pivot, whether printed tallies are trusted, the
//! roll-call vocabulary, the action table and the sponsor rule) is read from
//! here instead of being hard-coded in the extractors.

use crate::{
    actions::ActionTable,
    dates::{DateNormalizer, TWO_DIGIT_YEAR_PIVOT},
    sponsors::SponsorRule,
    types::{Chamber, ChamberTag, Jurisdiction},
    votes::{TallyPolicy, vocabulary::ResponseVocabulary},
};

#[derive(Debug, Clone, Copy)]
pub struct JurisdictionProfile {
    pub jurisdiction: Jurisdiction,
    /// Prefix for history actions that mention no chamber.
    pub default_history_tag: ChamberTag,
    /// Chamber recorded for a vote whose page and link name no chamber.
    pub default_vote_chamber: Chamber,
    pub dates: DateNormalizer,
    pub tally_policy: TallyPolicy,
    pub sponsor_rule: SponsorRule,
}

impl JurisdictionProfile {
    pub fn vocabulary(&self) -> ResponseVocabulary {
        ResponseVocabulary::for_jurisdiction(self.jurisdiction)
    }

    pub fn actions(&self) -> ActionTable {
        ActionTable::for_jurisdiction(self.jurisdiction)
    }
}

impl Jurisdiction {
    pub fn profile(&self) -> JurisdictionProfile {
        let dates = DateNormalizer::new(TWO_DIGIT_YEAR_PIVOT);
        let (default_history_tag, default_vote_chamber, tally_policy, sponsor_rule) = match self {
            Jurisdiction::Az => (
                ChamberTag::House,
                Chamber::House,
                TallyPolicy::TrustPage,
                SponsorRule::PrimeFlag,
            ),
            Jurisdiction::Ga => (
                ChamberTag::House,
                Chamber::House,
                TallyPolicy::DeriveFromRoster,
                SponsorRule::Sequence,
            ),
            Jurisdiction::Il => (
                ChamberTag::House,
                Chamber::House,
                TallyPolicy::TrustPage,
                SponsorRule::FirstListed,
            ),
            Jurisdiction::Nv => (
                ChamberTag::Prior,
                Chamber::House,
                TallyPolicy::TrustPage,
                SponsorRule::FirstListed,
            ),
            Jurisdiction::Pa => (
                ChamberTag::House,
                Chamber::House,
                TallyPolicy::DeriveFromRoster,
                SponsorRule::FirstListed,
            ),
            Jurisdiction::Tx => (
                ChamberTag::House,
                Chamber::House,
                TallyPolicy::DeriveFromRoster,
                SponsorRule::FirstListed,
            ),
            Jurisdiction::Ut => (
                ChamberTag::House,
                Chamber::House,
                TallyPolicy::DeriveFromRoster,
                SponsorRule::FirstListed,
            ),
            Jurisdiction::Wi => (
                ChamberTag::Assembly,
                Chamber::Assembly,
                TallyPolicy::DeriveFromRoster,
                SponsorRule::FirstListed,
            ),
        };

        JurisdictionProfile {
            jurisdiction: *self,
            default_history_tag,
            default_vote_chamber,
            dates,
            tally_policy,
            sponsor_rule,
        }
    }
}
