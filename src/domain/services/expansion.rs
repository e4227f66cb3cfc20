use std::collections::HashSet;

use crate::domain::models::meeting::{InviteSource, ResolvedInvite};
use crate::domain::ports::{CategoryRepository, CustomerRepository};
use crate::error::{AppError, ScheduleError};

/// Flattens manual invites and category references into the concrete
/// customer set a meeting will materialize appointments for.
///
/// Manual invites come first in request order, then each category's current
/// membership in submission order. A customer reachable twice counts once,
/// keeping the earliest source. An unknown category aborts the whole
/// expansion; a manual invite pointing at a missing customer record
/// surfaces as stale data.
pub async fn expand(
    customer_repo: &dyn CustomerRepository,
    category_repo: &dyn CategoryRepository,
    invites: &[String],
    categories: &[String],
) -> Result<Vec<ResolvedInvite>, AppError> {
    let mut candidates = Vec::new();

    if !invites.is_empty() {
        let found = customer_repo.find_by_ids(invites).await?;
        let found_ids: HashSet<&str> = found.iter().map(|c| c.id.as_str()).collect();
        for customer_id in invites {
            if !found_ids.contains(customer_id.as_str()) {
                return Err(ScheduleError::StaleInviteData(customer_id.clone()).into());
            }
            candidates.push(ResolvedInvite {
                customer_id: customer_id.clone(),
                source: InviteSource::Manual,
            });
        }
    }

    for category_id in categories {
        let category = category_repo
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| ScheduleError::UnknownCategory(category_id.clone()))?;
        for member in category_repo.list_members(&category.id).await? {
            candidates.push(ResolvedInvite {
                customer_id: member.id,
                source: InviteSource::Category(category.id.clone()),
            });
        }
    }

    let resolved = dedup_first_occurrence(candidates);
    if resolved.is_empty() {
        return Err(ScheduleError::EmptyInviteSet.into());
    }
    Ok(resolved)
}

/// Stable dedup by customer id. First occurrence wins so the recorded
/// source stays deterministic across resubmissions.
pub fn dedup_first_occurrence(candidates: Vec<ResolvedInvite>) -> Vec<ResolvedInvite> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|invite| seen.insert(invite.customer_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual(id: &str) -> ResolvedInvite {
        ResolvedInvite {
            customer_id: id.to_string(),
            source: InviteSource::Manual,
        }
    }

    fn via_category(id: &str, category: &str) -> ResolvedInvite {
        ResolvedInvite {
            customer_id: id.to_string(),
            source: InviteSource::Category(category.to_string()),
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_and_order() {
        let result = dedup_first_occurrence(vec![
            manual("cust2"),
            via_category("cust1", "cat1"),
            via_category("cust2", "cat1"),
        ]);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].customer_id, "cust2");
        assert_eq!(result[0].source, InviteSource::Manual);
        assert_eq!(result[1].customer_id, "cust1");
        assert_eq!(result[1].source, InviteSource::Category("cat1".to_string()));
    }

    #[test]
    fn test_dedup_same_category_listed_twice() {
        let result = dedup_first_occurrence(vec![
            via_category("cust1", "cat1"),
            via_category("cust2", "cat1"),
            via_category("cust1", "cat1"),
            via_category("cust2", "cat1"),
        ]);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].customer_id, "cust1");
        assert_eq!(result[1].customer_id, "cust2");
    }

    #[test]
    fn test_dedup_empty_input() {
        assert!(dedup_first_occurrence(Vec::new()).is_empty());
    }
}
