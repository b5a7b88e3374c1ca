//! Repository implementation for leads.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::{
    db::fold_case,
    domain::{
        lead::{Lead, NewLead, UpdateLead},
        types::{LeadId, UserId},
    },
    models::lead::{Lead as DbLead, NewLead as DbNewLead, UpdateLead as DbUpdateLead},
    repository::{
        DieselRepository, LeadListQuery, LeadReader, LeadWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

const LIKE_ESCAPE: char = '\\';

/// Wraps the search term in `%` wildcards, escaping any wildcard it contains.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl LeadReader for DieselRepository {
    fn get_lead_by_id(&self, id: LeadId, owner_id: &UserId) -> RepositoryResult<Option<Lead>> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let db_lead = leads::table
            .filter(leads::id.eq(id.get()))
            .filter(leads::owner_id.eq(owner_id.as_str()))
            .first::<DbLead>(&mut conn)
            .optional()?;

        db_lead
            .map(Lead::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)> {
        use crate::schema::leads;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = leads::table
                .filter(leads::owner_id.eq(query.owner_id.as_str()))
                .into_boxed::<Sqlite>();

            if let Some(term) = &query.search {
                let pattern = like_pattern(&term.to_lowercase());
                items = items.filter(
                    fold_case(leads::first_name.nullable())
                        .like(pattern.clone())
                        .escape(LIKE_ESCAPE)
                        .or(fold_case(leads::last_name.nullable())
                            .like(pattern.clone())
                            .escape(LIKE_ESCAPE))
                        .or(fold_case(leads::email.nullable())
                            .like(pattern.clone())
                            .escape(LIKE_ESCAPE))
                        .or(fold_case(leads::company).like(pattern).escape(LIKE_ESCAPE)),
                );
            }
            if let Some(status) = query.status {
                items = items.filter(leads::status.eq(status.as_str()));
            }
            if let Some(source) = query.source {
                items = items.filter(leads::source.eq(source.as_str()));
            }
            if let Some(is_qualified) = query.is_qualified {
                items = items.filter(leads::is_qualified.eq(is_qualified));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((leads::created_at.desc(), leads::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
                .limit(i64::try_from(pagination.per_page).unwrap_or(i64::MAX));
        }

        let leads = items
            .load::<DbLead>(&mut conn)?
            .into_iter()
            .map(Lead::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total, leads))
    }
}

impl LeadWriter for DieselRepository {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let insertable = DbNewLead::from_domain(new_lead, Utc::now().naive_utc());

        let db_lead = diesel::insert_into(leads::table)
            .values(&insertable)
            .get_result::<DbLead>(&mut conn)?;

        Lead::try_from(db_lead).map_err(RepositoryError::from)
    }

    fn update_lead(
        &self,
        id: LeadId,
        owner_id: &UserId,
        updates: &UpdateLead,
    ) -> RepositoryResult<Lead> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let changeset = DbUpdateLead::from_domain(updates, Utc::now().naive_utc());

        let db_lead = diesel::update(
            leads::table
                .filter(leads::id.eq(id.get()))
                .filter(leads::owner_id.eq(owner_id.as_str())),
        )
        .set(&changeset)
        .get_result::<DbLead>(&mut conn)?;

        Lead::try_from(db_lead).map_err(RepositoryError::from)
    }

    fn delete_lead(&self, id: LeadId, owner_id: &UserId) -> RepositoryResult<()> {
        use crate::schema::leads;

        let mut conn = self.conn()?;

        let affected = diesel::delete(
            leads::table
                .filter(leads::id.eq(id.get()))
                .filter(leads::owner_id.eq(owner_id.as_str())),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
