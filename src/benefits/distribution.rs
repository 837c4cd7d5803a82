//! Statutory distribution of a pension among beneficiaries
//!
//! Rule shares:
//! - spouse or domestic partner: 60% without eligible children, 50% with them
//! - each eligible child: 15% (every child, unless an age limit is configured)
//! - each parent: 15%, only when there is no partner and no eligible child
//!
//! A caller-assigned share replaces the rule share of an eligible beneficiary.
//! If the shares add up to more than 100% they are scaled down proportionally.
//! Shares depend only on the composition of the list, never on its order.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::affiliate::{Beneficiary, Relationship};
use crate::assumptions::StatutoryParameters;

/// One beneficiary with its final share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryShare {
    pub beneficiary: Beneficiary,
    pub share: f64,
}

/// Result of distributing a pension among beneficiaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Eligible beneficiaries in input order
    pub shares: Vec<BeneficiaryShare>,

    /// Sum of shares before normalization
    pub raw_total: f64,

    /// True when shares were scaled down to total 100%
    pub normalized: bool,
}

impl Distribution {
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn total(&self) -> f64 {
        sorted_sum(self.shares.iter().map(|s| s.share))
    }

    pub fn advisory(&self) -> Option<String> {
        self.normalized.then(|| {
            format!(
                "beneficiary shares totalled {:.1}% and were scaled down to 100%",
                self.raw_total * 100.0
            )
        })
    }
}

/// Sum in ascending order so the result is the same for any permutation
fn sorted_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.iter().sum()
}

fn is_eligible_child(params: &StatutoryParameters, beneficiary: &Beneficiary) -> bool {
    match params.child_age_limit {
        Some(limit) => beneficiary.person.age < limit || beneficiary.person.is_disabled,
        None => true,
    }
}

/// Rule share for one beneficiary given the household composition
fn rule_share(
    params: &StatutoryParameters,
    beneficiary: &Beneficiary,
    has_partner: bool,
    has_children: bool,
) -> f64 {
    match beneficiary.relationship {
        Relationship::Spouse | Relationship::DomesticPartner => {
            if has_children {
                params.partner_share_with_children
            } else {
                params.partner_share_without_children
            }
        }
        Relationship::Child => {
            if is_eligible_child(params, beneficiary) {
                params.child_share
            } else {
                0.0
            }
        }
        Relationship::Father | Relationship::Mother => {
            if has_partner || has_children {
                0.0
            } else {
                params.parent_share
            }
        }
    }
}

/// Distribute the pension among `beneficiaries`
pub fn distribute(params: &StatutoryParameters, beneficiaries: &[Beneficiary]) -> Distribution {
    let has_partner = beneficiaries.iter().any(|b| b.relationship.is_partner());
    let has_children = beneficiaries
        .iter()
        .any(|b| b.relationship == Relationship::Child && is_eligible_child(params, b));

    let eligible: Vec<BeneficiaryShare> = beneficiaries
        .iter()
        .filter_map(|b| {
            let rule = rule_share(params, b, has_partner, has_children);
            if rule <= 0.0 {
                return None;
            }
            Some(BeneficiaryShare {
                beneficiary: *b,
                share: b.assigned_share.unwrap_or(rule),
            })
        })
        .collect();

    let raw_total = sorted_sum(eligible.iter().map(|s| s.share));
    let normalized = raw_total > 1.0;

    let shares = if normalized {
        let scale = 1.0 / raw_total;
        debug!("normalizing beneficiary shares by {:.6}", scale);
        eligible
            .into_iter()
            .map(|s| BeneficiaryShare {
                share: s.share * scale,
                ..s
            })
            .collect()
    } else {
        eligible
    };

    Distribution {
        shares,
        raw_total,
        normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::{Person, Sex};
    use approx::assert_relative_eq;

    fn beneficiary(relationship: Relationship, age: u32) -> Beneficiary {
        let sex = match relationship {
            Relationship::Father => Sex::Male,
            _ => Sex::Female,
        };
        Beneficiary::new(Person::new(age, sex), relationship)
    }

    fn shares(distribution: &Distribution) -> Vec<f64> {
        distribution.shares.iter().map(|s| s.share).collect()
    }

    #[test]
    fn test_spouse_alone() {
        let params = StatutoryParameters::default();
        let d = distribute(&params, &[beneficiary(Relationship::Spouse, 60)]);
        assert_eq!(shares(&d), vec![0.60]);
        assert!(!d.normalized);
        assert!(d.advisory().is_none());
    }

    #[test]
    fn test_spouse_with_children() {
        let params = StatutoryParameters::default();
        let d = distribute(
            &params,
            &[
                beneficiary(Relationship::Spouse, 45),
                beneficiary(Relationship::Child, 10),
                beneficiary(Relationship::Child, 15),
            ],
        );
        assert_eq!(shares(&d), vec![0.50, 0.15, 0.15]);
        assert_relative_eq!(d.total(), 0.80, epsilon = 1e-12);
    }

    #[test]
    fn test_parents_only_without_partner_or_children() {
        let params = StatutoryParameters::default();
        let parents = [
            beneficiary(Relationship::Father, 70),
            beneficiary(Relationship::Mother, 68),
        ];
        assert_eq!(shares(&distribute(&params, &parents)), vec![0.15, 0.15]);

        let mut with_spouse = parents.to_vec();
        with_spouse.push(beneficiary(Relationship::DomesticPartner, 40));
        let d = distribute(&params, &with_spouse);
        assert_eq!(d.shares.len(), 1);
        assert_eq!(d.shares[0].beneficiary.relationship, Relationship::DomesticPartner);
    }

    #[test]
    fn test_children_only() {
        let params = StatutoryParameters::default();
        let children = [
            beneficiary(Relationship::Child, 30),
            beneficiary(Relationship::Child, 30),
            beneficiary(Relationship::Child, 30),
        ];
        assert_eq!(shares(&distribute(&params, &children)), vec![0.15, 0.15, 0.15]);
    }

    #[test]
    fn test_child_age_limit_applies_when_configured() {
        let params = StatutoryParameters {
            child_age_limit: Some(24),
            ..StatutoryParameters::default()
        };
        let adult = beneficiary(Relationship::Child, 30);
        let mut disabled_adult = beneficiary(Relationship::Child, 30);
        disabled_adult.person.is_disabled = true;

        assert!(distribute(&params, &[adult]).is_empty());
        assert_eq!(shares(&distribute(&params, &[disabled_adult])), vec![0.15]);

        // An ineligible child does not reduce the partner's share
        let d = distribute(&params, &[beneficiary(Relationship::Spouse, 55), adult]);
        assert_eq!(shares(&d), vec![0.60]);
    }

    #[test]
    fn test_normalization_when_over_full() {
        let params = StatutoryParameters::default();
        let mut list = vec![beneficiary(Relationship::Spouse, 40)];
        list.extend((0..5).map(|i| beneficiary(Relationship::Child, 2 + i)));

        let d = distribute(&params, &list);
        assert!(d.normalized);
        assert_relative_eq!(d.raw_total, 1.25, epsilon = 1e-12);
        assert_relative_eq!(d.total(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(d.shares[0].share, 0.40, epsilon = 1e-12);
        assert_relative_eq!(d.shares[1].share, 0.12, epsilon = 1e-12);
        assert!(d.advisory().is_some());
    }

    #[test]
    fn test_assigned_share_overrides_rule() {
        let params = StatutoryParameters::default();
        let d = distribute(
            &params,
            &[
                beneficiary(Relationship::Spouse, 50).with_assigned_share(0.70),
                beneficiary(Relationship::Child, 12),
            ],
        );
        assert_eq!(shares(&d), vec![0.70, 0.15]);
    }

    #[test]
    fn test_order_independent() {
        let params = StatutoryParameters::default();
        let mut list = vec![
            beneficiary(Relationship::Spouse, 40),
            beneficiary(Relationship::Child, 3),
            beneficiary(Relationship::Child, 5).with_assigned_share(0.33),
            beneficiary(Relationship::Child, 7),
            beneficiary(Relationship::Child, 9),
        ];
        let forward = distribute(&params, &list);
        list.reverse();
        let backward = distribute(&params, &list);

        for share in &forward.shares {
            let twin = backward
                .shares
                .iter()
                .find(|s| s.beneficiary == share.beneficiary)
                .unwrap();
            assert_eq!(twin.share, share.share);
        }
        assert_eq!(forward.raw_total, backward.raw_total);
    }

    #[test]
    fn test_empty_list() {
        let params = StatutoryParameters::default();
        let d = distribute(&params, &[]);
        assert!(d.is_empty());
        assert_eq!(d.total(), 0.0);
    }
}
