mod common;

use bson::Bson;
use chrono::{TimeZone, Utc};

use docmodel_core::{
    adapter::Adapter,
    error::DocumentStoreError,
    materialize::Loaded,
    model::ModelExt,
    query::{Filter, OperationNode, Query},
};
use docmodel_mongodb::MongoAdapter;

use common::{Person, RecordingDriver};

async fn seeded(people: &[(&str, i32)]) -> MongoAdapter<RecordingDriver> {
    let adapter = MongoAdapter::new(RecordingDriver::new());
    let mut items = people
        .iter()
        .map(|(name, age)| Person::new(name, *age))
        .collect::<Vec<_>>();

    adapter.insert(&mut items).await.unwrap();

    adapter
}

fn names(people: &[Person]) -> Vec<&str> {
    people.iter().map(|person| person.name.as_str()).collect()
}

#[tokio::test]
async fn insert_stamps_items_in_order() {
    let adapter = MongoAdapter::new(RecordingDriver::new());
    let mut items = vec![Person::new("ann", 30), Person::new("bob", 40)];

    let inserted = adapter.insert(&mut items).await.unwrap();

    assert_eq!(names(&inserted), vec!["ann", "bob"]);
    for person in items.iter().chain(inserted.iter()) {
        assert!(person.is_saved());
        assert!(person.id().is_some());
        assert!(matches!(person.meta.internal_id, Some(Bson::ObjectId(_))));
    }
    assert_ne!(inserted[0].id(), inserted[1].id());

    let stored = adapter.driver().inner.records("people").await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].get_str("id").ok(), inserted[0].id());
}

#[tokio::test]
async fn insert_of_nothing_is_empty_success() {
    let adapter = MongoAdapter::new(RecordingDriver::new());

    let mut nobody: Vec<Person> = vec![];
    let inserted = adapter.insert(&mut nobody).await.unwrap();

    assert!(inserted.is_empty());
    assert_eq!(adapter.driver().calls.total(), 0);
}

#[tokio::test]
async fn insert_aborts_on_first_failure_without_rollback() {
    let adapter = MongoAdapter::new(RecordingDriver::failing_insert_at(1));
    let mut items = vec![
        Person::new("ann", 30),
        Person::new("bob", 40),
        Person::new("cid", 50),
    ];

    let result = adapter.insert(&mut items).await;

    assert!(matches!(result, Err(DocumentStoreError::Backend(_))));
    assert!(items[0].is_saved());
    assert!(!items[1].is_saved());
    assert!(!items[2].is_saved());
    assert_eq!(RecordingDriver::count(&adapter.driver().calls.insert_one), 2);

    let stored = adapter.driver().inner.records("people").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get_str("name").unwrap(), "ann");
}

#[tokio::test]
async fn load_by_id_materializes_record() {
    let adapter = seeded(&[("ann", 30), ("bob", 40)]).await;
    let bob_id = adapter.driver().inner.records("people").await[1]
        .get_str("id")
        .unwrap()
        .to_string();

    let loaded = adapter.load(&Query::<Person>::for_id(&bob_id)).await.unwrap();

    match loaded {
        Loaded::Many(people) => {
            assert_eq!(names(&people), vec!["bob"]);
            assert_eq!(people[0].id(), Some(bob_id.as_str()));
            assert!(people[0].is_saved());
            assert!(people[0].meta.internal_id.is_some());
        }
        other => panic!("expected a sequence, got {other:?}"),
    }
    assert_eq!(RecordingDriver::count(&adapter.driver().calls.find_one), 1);
    assert_eq!(RecordingDriver::count(&adapter.driver().calls.find), 0);
}

#[tokio::test]
async fn load_by_id_miss_is_empty() {
    let adapter = seeded(&[("ann", 30)]).await;

    let many = adapter.load(&Query::<Person>::for_id("missing")).await.unwrap();
    let one = adapter
        .load(&Query::<Person>::builder().by_id("missing").limit(1).build())
        .await
        .unwrap();

    assert!(matches!(many, Loaded::Many(ref people) if people.is_empty()));
    assert!(matches!(one, Loaded::One(None)));
}

#[tokio::test]
async fn limit_one_collapses_to_first_match() {
    let adapter = seeded(&[("ann", 30), ("bob", 40), ("cid", 50)]).await;

    let query = Query::<Person>::builder()
        .filter(Filter::gte("age", 30))
        .limit(1)
        .build();

    match adapter.load(&query).await.unwrap() {
        Loaded::One(Some(person)) => assert_eq!(person.name, "ann"),
        other => panic!("expected a single instance, got {other:?}"),
    }
}

#[tokio::test]
async fn sorted_load_follows_sort_order() {
    let adapter = seeded(&[("ann", 30), ("bob", 50), ("cid", 40)]).await;

    let query = Query::<Person>::builder().sort("age", "desc").build();
    let people = adapter.load(&query).await.unwrap().into_vec();

    assert_eq!(names(&people), vec!["bob", "cid", "ann"]);
}

#[tokio::test]
async fn empty_condition_tree_matches_everything() {
    let adapter = seeded(&[("ann", 30), ("bob", 40)]).await;

    let and_all = adapter.load(&Query::<Person>::new()).await.unwrap();
    let or_all = adapter
        .load(&Query::<Person>::builder().filter(OperationNode::Or(vec![])).build())
        .await
        .unwrap();

    assert_eq!(and_all.len(), 2);
    assert_eq!(or_all.len(), 2);
}

#[tokio::test]
async fn case_insensitive_equality_matches_whole_value_only() {
    let adapter = seeded(&[("FOO", 1), ("foo", 2), ("foobar", 3)]).await;

    let query = Query::<Person>::builder()
        .filter(Filter::eq("name", "Foo").case_insensitive())
        .build();
    let people = adapter.load(&query).await.unwrap().into_vec();

    assert_eq!(names(&people), vec!["FOO", "foo"]);
}

#[tokio::test]
async fn like_matches_prefix() {
    let adapter = seeded(&[("abc", 1), ("ab", 0), ("ABD", 2), ("xab", 3)]).await;

    let sensitive = Query::<Person>::builder().filter(Filter::like("name", "ab")).build();
    let insensitive = Query::<Person>::builder()
        .filter(Filter::like("name", "ab").case_insensitive())
        .build();

    assert_eq!(names(&adapter.load(&sensitive).await.unwrap().into_vec()), vec!["abc", "ab"]);
    assert_eq!(
        names(&adapter.load(&insensitive).await.unwrap().into_vec()),
        vec!["abc", "ab", "ABD"],
    );
}

#[tokio::test]
async fn escaped_patterns_match_literally() {
    let driver = RecordingDriver::new();
    let adapter = MongoAdapter::builder(driver).escape_patterns(true).build();
    adapter
        .insert(&mut [Person::new("a.b", 1), Person::new("axb", 2)])
        .await
        .unwrap();

    let query = Query::<Person>::builder().filter(Filter::like("name", "a.")).build();

    assert_eq!(names(&adapter.load(&query).await.unwrap().into_vec()), vec!["a.b"]);
}

#[tokio::test]
async fn not_excludes_matching_records() {
    let adapter = seeded(&[("ann", 30), ("bob", 40), ("cid", 50)]).await;

    let query = Query::<Person>::builder()
        .filter(Filter::not(Filter::or([Filter::eq("name", "ann"), Filter::gt("age", 45)])))
        .build();

    assert_eq!(names(&adapter.load(&query).await.unwrap().into_vec()), vec!["bob"]);
}

#[tokio::test]
async fn load_rejects_invalid_comparison_before_fetching() {
    let adapter = seeded(&[("ann", 30)]).await;

    let query = Query::<Person>::builder().filter(Filter::like("age", 3)).build();
    let result = adapter.load(&query).await;

    assert!(matches!(result, Err(DocumentStoreError::InvalidComparison(_))));
    assert_eq!(RecordingDriver::count(&adapter.driver().calls.find), 0);
}

#[tokio::test]
async fn update_without_id_is_rejected_before_backend() {
    let adapter = seeded(&[("ann", 30)]).await;

    let result = adapter
        .update(&Person::new("", -1), &Query::<Person>::new())
        .await;

    assert!(matches!(result, Err(DocumentStoreError::UnsupportedOperation(_))));
    assert_eq!(RecordingDriver::count(&adapter.driver().calls.replace_one), 0);
}

#[tokio::test]
async fn update_with_invalid_data_makes_no_backend_call() {
    let adapter = MongoAdapter::new(RecordingDriver::new());

    let result = adapter
        .update(&Person::new("", -1), &Query::<Person>::for_id("p-1"))
        .await;

    match result {
        Err(DocumentStoreError::Validation(errors)) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.get("name").is_some());
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert_eq!(adapter.driver().calls.total(), 0);
}

#[tokio::test]
async fn update_by_id_preserves_identifiers() {
    let adapter = MongoAdapter::new(RecordingDriver::new());
    let mut person = adapter.insert_one(&mut Person::new("ann", 30)).await.unwrap();
    let id = person.id().unwrap().to_string();
    let internal_id = person.meta.internal_id.clone();

    person.age = 31;
    let updated = adapter.update(&person, &Query::for_id(&id)).await.unwrap();

    assert!(updated);
    let stored = adapter.driver().inner.records("people").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get_i32("age").unwrap(), 31);
    assert_eq!(stored[0].get_str("id").unwrap(), id);
    assert_eq!(stored[0].get("_id").cloned(), internal_id);
}

#[tokio::test]
async fn update_replaces_stored_properties() {
    let adapter = MongoAdapter::new(RecordingDriver::new());
    let created_at = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
    let mut rex = Person::new("rex", 3);
    rex.nickname = Some("old".to_string());
    rex.meta.created_at = Some(created_at);
    let mut rex = adapter.insert_one(&mut rex).await.unwrap();
    let id = rex.id().unwrap().to_string();

    rex.nickname = None;
    rex.meta.created_at = None;
    adapter.update(&rex, &Query::for_id(&id)).await.unwrap();

    let stored = adapter.driver().inner.records("people").await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].get("nickname").is_none());
    assert_eq!(stored[0].get_str("name").unwrap(), "rex");
    assert_eq!(stored[0].get_str("id").unwrap(), id);
    assert_eq!(stored[0].get("_id").cloned(), rex.meta.internal_id);

    let loaded = adapter.load(&Query::<Person>::for_id(&id)).await.unwrap().into_one().unwrap();
    assert_eq!(loaded.nickname, None);
    assert_eq!(loaded.meta.created_at, Some(created_at));
}

#[tokio::test]
async fn update_of_missing_record_surfaces_backend_error() {
    let adapter = MongoAdapter::new(RecordingDriver::new());

    let result = adapter
        .update(&Person::new("ann", 30), &Query::for_id("missing"))
        .await;

    assert!(matches!(result, Err(DocumentStoreError::Backend(_))));
}

#[tokio::test]
async fn remove_matching_nothing_is_success() {
    let adapter = seeded(&[("ann", 30)]).await;

    let removed = adapter
        .remove(&Query::<Person>::builder().filter(Filter::eq("name", "zed")).build())
        .await
        .unwrap();

    assert!(removed);
    assert_eq!(adapter.driver().inner.records("people").await.len(), 1);
}

#[tokio::test]
async fn remove_by_filter_and_by_id() {
    let adapter = seeded(&[("ann", 30), ("bob", 40), ("cid", 50)]).await;
    let ann_id = adapter.driver().inner.records("people").await[0]
        .get_str("id")
        .unwrap()
        .to_string();

    assert!(adapter.remove(&Query::<Person>::for_id(&ann_id)).await.unwrap());
    assert!(
        adapter
            .remove(&Query::<Person>::builder().filter(Filter::gt("age", 45)).build())
            .await
            .unwrap()
    );

    let left = adapter.load(&Query::<Person>::new()).await.unwrap().into_vec();
    assert_eq!(names(&left), vec!["bob"]);
}

#[tokio::test]
async fn create_collections_runs_in_order() {
    let adapter = MongoAdapter::new(RecordingDriver::new());

    adapter.create_collections(&["a", "b"]).await.unwrap();
    adapter.create_collection("c").await.unwrap();

    assert_eq!(adapter.driver().inner.collection_names().await, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn create_collections_aborts_on_first_failure() {
    let adapter = MongoAdapter::new(RecordingDriver::failing_create("b"));

    let result = adapter.create_collections(&["a", "b", "c"]).await;

    assert!(matches!(result, Err(DocumentStoreError::Backend(_))));
    assert_eq!(RecordingDriver::count(&adapter.driver().calls.create_collection), 2);
    assert_eq!(adapter.driver().inner.collection_names().await, vec!["a"]);
}

#[tokio::test]
async fn adapter_reports_its_name() {
    assert_eq!(MongoAdapter::new(RecordingDriver::new()).name(), "mongo");
}
