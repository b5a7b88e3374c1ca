use lead_manager::domain::lead::{LeadFields, NewLead, UpdateLead};
use lead_manager::domain::types::{
    LeadEmail, LeadSource, LeadStatus, LeadValue, PersonName, Score, UserId,
};
use lead_manager::repository::errors::RepositoryError;
use lead_manager::repository::{DieselRepository, LeadListQuery, LeadReader, LeadWriter};

mod common;

fn owner(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn fields(first: &str, last: &str, company: Option<&str>) -> LeadFields {
    LeadFields::new(
        PersonName::new(first).unwrap(),
        PersonName::new(last).unwrap(),
        LeadEmail::new(format!("{}.{}@example.com", first, last)).unwrap(),
        None,
        company.map(str::to_string),
        None,
        None,
        LeadSource::Website,
        LeadStatus::New,
        Score::new(50).unwrap(),
        LeadValue::new(100.0).unwrap(),
        false,
    )
}

#[test]
fn test_lead_repository_crud() {
    let test_db = common::TestDb::new("test_lead_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");

    let created = repo
        .create_lead(&NewLead::new(
            alice.clone(),
            fields("Ada", "Lovelace", Some("Engines")),
        ))
        .unwrap();
    assert_eq!(created.owner_id, alice);
    assert_eq!(created.fields.company.as_deref(), Some("Engines"));
    assert_eq!(created.last_activity_at, None);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = repo.get_lead_by_id(created.id, &alice).unwrap().unwrap();
    assert_eq!(fetched, created);

    let mut changed = created.fields.clone();
    changed.status = LeadStatus::Won;
    changed.company = None;
    changed.is_qualified = true;
    let updated = repo
        .update_lead(created.id, &alice, &UpdateLead::new(changed))
        .unwrap();
    assert_eq!(updated.fields.status, LeadStatus::Won);
    assert_eq!(updated.fields.company, None);
    assert!(updated.fields.is_qualified);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.last_activity_at, Some(updated.updated_at));

    repo.delete_lead(created.id, &alice).unwrap();
    assert!(repo.get_lead_by_id(created.id, &alice).unwrap().is_none());
}

#[test]
fn test_leads_are_scoped_to_owner() {
    let test_db = common::TestDb::new("test_leads_are_scoped_to_owner.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");
    let mallory = owner("mallory");

    let lead = repo
        .create_lead(&NewLead::new(alice.clone(), fields("Ada", "Lovelace", None)))
        .unwrap();
    repo.create_lead(&NewLead::new(mallory.clone(), fields("Eve", "Hacker", None)))
        .unwrap();

    let (total, leads) = repo.list_leads(LeadListQuery::new(alice.clone())).unwrap();
    assert_eq!(total, 1);
    assert_eq!(leads[0].id, lead.id);

    assert!(repo.get_lead_by_id(lead.id, &mallory).unwrap().is_none());

    let mut hijacked = lead.fields.clone();
    hijacked.status = LeadStatus::Lost;
    assert!(matches!(
        repo.update_lead(lead.id, &mallory, &UpdateLead::new(hijacked)),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.delete_lead(lead.id, &mallory),
        Err(RepositoryError::NotFound)
    ));

    let untouched = repo.get_lead_by_id(lead.id, &alice).unwrap().unwrap();
    assert_eq!(untouched, lead);
}

#[test]
fn test_delete_removes_exactly_one_row() {
    let test_db = common::TestDb::new("test_delete_removes_exactly_one_row.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");
    let bob = owner("bob");

    let mut ids = Vec::new();
    for name in ["Ada", "Grace", "Alan", "Edsger"] {
        let lead = repo
            .create_lead(&NewLead::new(alice.clone(), fields(name, "Test", None)))
            .unwrap();
        ids.push(lead.id);
    }
    let bobs = repo
        .create_lead(&NewLead::new(bob.clone(), fields("Barbara", "Liskov", None)))
        .unwrap();

    let (before, _) = repo.list_leads(LeadListQuery::new(alice.clone())).unwrap();
    assert_eq!(before, 4);

    let removed = ids.remove(1);
    repo.delete_lead(removed, &alice).unwrap();

    let (after, remaining) = repo.list_leads(LeadListQuery::new(alice.clone())).unwrap();
    assert_eq!(after, before - 1);
    let mut remaining: Vec<_> = remaining.into_iter().map(|lead| lead.id).collect();
    remaining.sort_by_key(|id| id.get());
    assert_eq!(remaining, ids);
    assert!(repo.get_lead_by_id(removed, &alice).unwrap().is_none());

    let (bob_total, bob_leads) = repo.list_leads(LeadListQuery::new(bob)).unwrap();
    assert_eq!(bob_total, 1);
    assert_eq!(bob_leads[0], bobs);

    assert!(matches!(
        repo.delete_lead(removed, &alice),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_search_matches_any_text_column() {
    let test_db = common::TestDb::new("test_search_matches_any_text_column.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");

    repo.create_lead(&NewLead::new(alice.clone(), fields("Ada", "Lovelace", Some("Acme Corp"))))
        .unwrap();
    repo.create_lead(&NewLead::new(alice.clone(), fields("Grace", "Hopper", None)))
        .unwrap();
    repo.create_lead(&NewLead::new(alice.clone(), fields("Alan", "Turing", Some("Bletchley"))))
        .unwrap();

    let (total, leads) = repo
        .list_leads(LeadListQuery::new(alice.clone()).search("acme"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(leads[0].fields.first_name.as_str(), "Ada");

    let (total, _) = repo
        .list_leads(LeadListQuery::new(alice.clone()).search("HOPPER"))
        .unwrap();
    assert_eq!(total, 1);

    let (total, _) = repo
        .list_leads(LeadListQuery::new(alice.clone()).search("example.com"))
        .unwrap();
    assert_eq!(total, 3);
}

#[test]
fn test_search_folds_non_ascii_case() {
    let test_db = common::TestDb::new("test_search_folds_non_ascii_case.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");

    let mut emile = fields("Émile", "Ørsted", Some("Ångström AB"));
    emile.email = LeadEmail::new("emile@example.com").unwrap();
    repo.create_lead(&NewLead::new(alice.clone(), emile)).unwrap();
    repo.create_lead(&NewLead::new(alice.clone(), fields("Ada", "Lovelace", Some("Acme"))))
        .unwrap();

    for term in ["ångström", "ÅNGSTRÖM", "émile", "ÉMILE", "ørsted"] {
        let (total, leads) = repo
            .list_leads(LeadListQuery::new(alice.clone()).search(term))
            .unwrap();
        assert_eq!(total, 1, "search {term:?}");
        assert_eq!(leads[0].fields.first_name.as_str(), "Émile");
    }
}

#[test]
fn test_search_escapes_wildcards() {
    let test_db = common::TestDb::new("test_search_escapes_wildcards.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");

    repo.create_lead(&NewLead::new(alice.clone(), fields("Ada", "Lovelace", Some("100% Growth"))))
        .unwrap();
    repo.create_lead(&NewLead::new(alice.clone(), fields("Grace", "Hopper", Some("1000 Growth"))))
        .unwrap();

    let (total, leads) = repo
        .list_leads(LeadListQuery::new(alice.clone()).search("100%"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(leads[0].fields.company.as_deref(), Some("100% Growth"));

    let (total, _) = repo
        .list_leads(LeadListQuery::new(alice.clone()).search("_"))
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_filters_combine_with_and() {
    let test_db = common::TestDb::new("test_filters_combine_with_and.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");

    let mut won = fields("Ada", "Lovelace", None);
    won.status = LeadStatus::Won;
    won.source = LeadSource::Referral;
    won.is_qualified = true;
    repo.create_lead(&NewLead::new(alice.clone(), won)).unwrap();

    let mut lost = fields("Grace", "Hopper", None);
    lost.status = LeadStatus::Lost;
    lost.source = LeadSource::Referral;
    repo.create_lead(&NewLead::new(alice.clone(), lost)).unwrap();

    repo.create_lead(&NewLead::new(alice.clone(), fields("Alan", "Turing", None)))
        .unwrap();

    let (total, _) = repo
        .list_leads(LeadListQuery::new(alice.clone()).source(LeadSource::Referral))
        .unwrap();
    assert_eq!(total, 2);

    let (total, leads) = repo
        .list_leads(
            LeadListQuery::new(alice.clone())
                .source(LeadSource::Referral)
                .qualified(true),
        )
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(leads[0].fields.status, LeadStatus::Won);

    let (total, _) = repo
        .list_leads(
            LeadListQuery::new(alice.clone())
                .status(LeadStatus::Lost)
                .qualified(true),
        )
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_pagination_returns_window_and_total() {
    let test_db = common::TestDb::new("test_pagination_returns_window_and_total.db");
    let repo = DieselRepository::new(test_db.pool());
    let alice = owner("alice");

    for i in 0..45 {
        repo.create_lead(&NewLead::new(
            alice.clone(),
            fields(&format!("Lead{i}"), "Test", None),
        ))
        .unwrap();
    }

    let (total, page) = repo
        .list_leads(LeadListQuery::new(alice.clone()).paginate(3, 20))
        .unwrap();
    assert_eq!(total, 45);
    assert_eq!(page.len(), 5);

    // Newest first: the last page holds the five oldest leads.
    let mut names: Vec<_> = page
        .iter()
        .map(|lead| lead.fields.first_name.to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Lead0", "Lead1", "Lead2", "Lead3", "Lead4"]);

    let (_, first) = repo
        .list_leads(LeadListQuery::new(alice).paginate(1, 20))
        .unwrap();
    assert_eq!(first.len(), 20);
    assert_eq!(first[0].fields.first_name.as_str(), "Lead44");
}
