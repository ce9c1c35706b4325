mod tables;

use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::Jurisdiction;
use tables::{CodeRow, TextRule};

#[derive(Debug, thiserror::Error)]
#[error("Invalid action tag '{0}'. Accepted values: introduction, filing, reading-1, reading-2, reading-3, withdrawal, referral-committee, passage, committee-passage-favorable, executive-receipt, executive-signature, failure")]
pub struct ActionTagParseError(String);

/// Normalised legislative action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ActionTag {
    #[serde(rename = "introduction")]
    Introduction,
    #[serde(rename = "filing")]
    Filing,
    #[serde(rename = "reading-1")]
    Reading1,
    #[serde(rename = "reading-2")]
    Reading2,
    #[serde(rename = "reading-3")]
    Reading3,
    #[serde(rename = "withdrawal")]
    Withdrawal,
    #[serde(rename = "referral-committee")]
    ReferralCommittee,
    #[serde(rename = "passage")]
    Passage,
    #[serde(rename = "committee-passage-favorable")]
    CommitteePassageFavorable,
    #[serde(rename = "executive-receipt")]
    ExecutiveReceipt,
    #[serde(rename = "executive-signature")]
    ExecutiveSignature,
    #[serde(rename = "failure")]
    Failure,
}

impl ActionTag {
    pub const ALL: [ActionTag; 12] = [
        ActionTag::Introduction,
        ActionTag::Filing,
        ActionTag::Reading1,
        ActionTag::Reading2,
        ActionTag::Reading3,
        ActionTag::Withdrawal,
        ActionTag::ReferralCommittee,
        ActionTag::Passage,
        ActionTag::CommitteePassageFavorable,
        ActionTag::ExecutiveReceipt,
        ActionTag::ExecutiveSignature,
        ActionTag::Failure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::Introduction => "introduction",
            ActionTag::Filing => "filing",
            ActionTag::Reading1 => "reading-1",
            ActionTag::Reading2 => "reading-2",
            ActionTag::Reading3 => "reading-3",
            ActionTag::Withdrawal => "withdrawal",
            ActionTag::ReferralCommittee => "referral-committee",
            ActionTag::Passage => "passage",
            ActionTag::CommitteePassageFavorable => "committee-passage-favorable",
            ActionTag::ExecutiveReceipt => "executive-receipt",
            ActionTag::ExecutiveSignature => "executive-signature",
            ActionTag::Failure => "failure",
        }
    }
}

impl FromStr for ActionTag {
    type Err = ActionTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ActionTagParseError(s.to_string()))
    }
}

impl Display for ActionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "kind", content = "tags", rename_all = "lowercase")]
pub enum Classification {
    Tagged(Vec<ActionTag>),
    Unclassified,
}

impl Classification {
    pub fn tags(&self) -> &[ActionTag] {
        match self {
            Classification::Tagged(tags) => tags,
            Classification::Unclassified => &[],
        }
    }

    pub fn has(&self, tag: ActionTag) -> bool {
        self.tags().contains(&tag)
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Tagged(tags) => {
                let names: Vec<&str> = tags.iter().map(ActionTag::as_str).collect();
                write!(f, "{}", names.join(", "))
            }
            Classification::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// A jurisdiction's code table and free-text rules.
#[derive(Debug, Clone, Copy)]
pub struct ActionTable {
    jurisdiction: Jurisdiction,
    codes: &'static [CodeRow],
    rules: &'static [TextRule],
}

impl ActionTable {
    pub fn for_jurisdiction(jurisdiction: Jurisdiction) -> Self {
        let (codes, rules) = match jurisdiction {
            Jurisdiction::Ga => (tables::GA_CODES, tables::NO_TEXT_RULES),
            Jurisdiction::Az => (tables::AZ_CODES, tables::COMMON_TEXT_RULES),
            _ => (tables::NO_CODES, tables::COMMON_TEXT_RULES),
        };
        Self {
            jurisdiction,
            codes,
            rules,
        }
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    /// Tags an action code (exact, then case-insensitive) or, failing that, action text.
    pub fn classify(&self, code_or_text: &str) -> Classification {
        let input = code_or_text.trim();
        if input.is_empty() {
            return Classification::Unclassified;
        }

        let row = self
            .codes
            .iter()
            .find(|(code, _)| *code == input)
            .or_else(|| self.codes.iter().find(|(code, _)| code.eq_ignore_ascii_case(input)));
        if let Some((_, tags)) = row {
            return match tags {
                Some(tags) => Classification::Tagged(tags.to_vec()),
                None => Classification::Unclassified,
            };
        }

        let low = input.to_lowercase();
        let mut tags: Vec<ActionTag> = Vec::new();
        for (needles, rule_tags) in self.rules {
            let fires = needles.iter().all(|needle| match needle.strip_prefix('!') {
                Some(absent) => !low.contains(absent),
                None => low.contains(needle),
            });
            if fires {
                for tag in rule_tags.iter() {
                    if !tags.contains(tag) {
                        tags.push(*tag);
                    }
                }
            }
        }

        if tags.is_empty() {
            log::debug!("[{}] no action tag for {:?}", self.jurisdiction.code(), input);
            Classification::Unclassified
        } else {
            Classification::Tagged(tags)
        }
    }
}

pub fn classify(jurisdiction: Jurisdiction, code_or_text: &str) -> Classification {
    ActionTable::for_jurisdiction(jurisdiction).classify(code_or_text)
}
