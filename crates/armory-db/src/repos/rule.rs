//! Rule repository.

use armory_core::entities::Rule;
use armory_core::enums::AuditAction;
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_RULE;
use armory_core::pagination::{PageRequest, Paginated};
use armory_core::snapshot::Snapshottable;
use chrono::Utc;
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{SetClauses, get_opt_string, opt_text, parse_datetime};
use crate::repos::ListQuery;
use crate::service::ArmoryService;
use crate::updates::rule::RuleUpdate;

pub(crate) const RULE_COLUMNS: &str = "r.id, r.name, r.link, r.created_at, r.updated_at";
pub(crate) const RULE_COLUMN_COUNT: i32 = 5;

pub(crate) fn row_to_rule(row: &libsql::Row) -> Result<Rule, DatabaseError> {
    Ok(Rule {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        link: get_opt_string(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl ArmoryService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name, or
    /// `DatabaseError` if the INSERT fails.
    pub async fn create_rule(
        &self,
        acting_user_id: Option<&str>,
        name: &str,
        link: Option<&str>,
    ) -> Result<Rule, DatabaseError> {
        CoreError::require_name("name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_RULE).await?;

        self.db()
            .execute(
                "INSERT INTO rules (id, name, link, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![id.as_str(), name, link, now.to_rfc3339(), now.to_rfc3339()],
            )
            .await?;

        let rule = Rule {
            id,
            name: name.to_string(),
            link: link.map(String::from),
            created_at: now,
            updated_at: now,
        };
        self.record_audit(acting_user_id, AuditAction::Create, &rule.snapshot(), None)
            .await;
        Ok(rule)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no rule has that id.
    pub async fn get_rule(&self, id: &str) -> Result<Rule, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {RULE_COLUMNS} FROM rules r WHERE r.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_rule(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the rule does not exist,
    /// `DatabaseError::Validation` for a blank name, or `DatabaseError` if
    /// the UPDATE fails.
    pub async fn update_rule(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
        update: RuleUpdate,
    ) -> Result<Rule, DatabaseError> {
        let before = self.get_rule(id).await?;

        let mut after = before.clone();
        let mut sets = SetClauses::new();
        if let Some(name) = update.name {
            CoreError::require_name("name", &name)?;
            sets.push("name", Value::Text(name.clone()));
            after.name = name;
        }
        if let Some(link) = update.link {
            sets.push("link", opt_text(link.as_deref()));
            after.link = link;
        }
        if sets.is_empty() {
            return Ok(before);
        }

        after.updated_at = Utc::now();
        let (sql, params) = sets.into_update("rules", id, after.updated_at);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after)
    }

    /// Delete a rule. Weapon modes lose it from their trait sets.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the rule does not exist.
    pub async fn delete_rule(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let before = self.get_rule(id).await?;
        self.db()
            .execute("DELETE FROM rules WHERE id = ?1", [id])
            .await?;
        self.record_audit(acting_user_id, AuditAction::Delete, &before.snapshot(), None)
            .await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_and_count_rules(
        &self,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<Rule>, DatabaseError> {
        let query = ListQuery::new("rules r", RULE_COLUMNS, "r.name, r.id")
            .name_contains("r.name", name_contains);
        self.find_and_count(query, page, row_to_rule).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::test_service;
    use crate::updates::rule::RuleUpdateBuilder;
    use armory_core::render::render_record;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn link_can_be_set_and_cleared() {
        let svc = test_service().await;
        let rule = svc
            .create_rule(None, "Suppressive Fire", Some("https://wiki.example/sf"))
            .await
            .unwrap();
        assert_eq!(svc.get_rule(&rule.id).await.unwrap(), rule);

        let cleared = svc
            .update_rule(None, &rule.id, RuleUpdateBuilder::new().link(None).build())
            .await
            .unwrap();
        assert_eq!(cleared.link, None);

        let records = svc
            .query_audit(
                &AuditFilter {
                    entity_id: Some(rule.id.clone()),
                    action: Some(AuditAction::Update),
                    ..AuditFilter::default()
                },
                PageRequest::first(10),
            )
            .await
            .unwrap();
        let view = render_record(&records.items[0]);
        assert_eq!(view.summary, "Updated rule 'Suppressive Fire'");
        assert_eq!(view.rows[0].old_value, "https://wiki.example/sf");
        assert_eq!(view.rows[0].new_value, "");
    }

    #[tokio::test]
    async fn delete_detaches_from_modes() {
        let svc = test_service().await;
        let seed = crate::test_support::helpers::seed_combi_rifle(&svc).await;
        let rule = svc.create_rule(None, "Suppressive Fire", None).await.unwrap();
        svc.set_mode_traits(None, &seed.mode.id, &[rule.id.clone()])
            .await
            .unwrap();

        svc.delete_rule(None, &rule.id).await.unwrap();

        let graph = svc.load_weapon_mode_graph(&seed.mode.id).await.unwrap();
        assert!(graph.traits.is_empty());
    }
}
