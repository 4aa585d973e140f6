//! Integration tests for the movie synchronization engine against a real
//! (throwaway) store and an in-process metadata gateway.

mod common;

use std::sync::Arc;

use common::{
    FakeGateway, credit, movie_data, person_data, seed_default_genres, test_store,
};
use filmarr::Store;
use filmarr::db::MovieFilter;
use filmarr::entities::prelude::Credits;
use filmarr::models::page::PageRequest;
use filmarr::services::{
    GenreQuery, GenreService, MovieError, MovieQuery, MovieRefetchInput, MovieService,
    MovieUpdateInput, PersonService, TmdbMovieService,
};
use sea_orm::{EntityTrait, PaginatorTrait};

async fn setup() -> (Arc<Store>, Arc<FakeGateway>, TmdbMovieService) {
    let store = Arc::new(test_store("filmarr-sync-test").await);
    seed_default_genres(&store).await;

    let gateway = Arc::new(FakeGateway::default());
    let service = TmdbMovieService::new(store.clone(), gateway.clone());
    (store, gateway, service)
}

async fn credit_count(store: &Store) -> u64 {
    Credits::find().count(&store.conn).await.unwrap()
}

fn genre_names(movie: &filmarr::api::MovieDto) -> Vec<String> {
    let mut names: Vec<String> = movie.genres.iter().map(|g| g.name.clone()).collect();
    names.sort();
    names
}

#[tokio::test]
async fn create_imports_movie_with_genres_and_credits() {
    let (store, gateway, service) = setup().await;

    // genre ref 99 has no local counterpart and must be dropped silently
    gateway.set_movie(movie_data(100, "Inception", &[1, 2, 99]));
    gateway.set_person(person_data(7, "Alice"));
    gateway.set_person(person_data(8, "Bob"));
    gateway.set_credits(
        100,
        vec![
            credit(7, "c1", "Acting", Some("The Lead"), Some(0)),
            credit(7, "c2", "Directing", None, None),
            credit(8, "c3", "Acting", Some("The Friend"), Some(1)),
        ],
    );

    let payload = service.create(100).await.unwrap();

    assert!(payload.ok);
    assert!(payload.errors.is_none());
    let movie = payload.movie.unwrap();
    assert_eq!(movie.tmdb, 100);
    assert_eq!(movie.title, "Inception");
    assert_eq!(genre_names(&movie), vec!["Bar", "Foo"]);

    assert_eq!(store.count_people().await.unwrap(), 2);
    assert_eq!(credit_count(&store).await, 3);
    assert_eq!(gateway.person_fetch_count(), 2);

    let credits = service.credits(movie.id).await.unwrap();
    assert_eq!(credits.len(), 3);
    let directing = credits
        .iter()
        .find(|c| c.department == "Directing")
        .unwrap();
    assert_eq!(directing.person.name, "Alice");
    assert_eq!(directing.character, None);
}

#[tokio::test]
async fn create_twice_reports_conflict_without_new_rows() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "Inception", &[1]));
    gateway.set_person(person_data(7, "Alice"));
    gateway.set_credits(100, vec![credit(7, "c1", "Acting", Some("X"), Some(0))]);

    let first = service.create(100).await.unwrap();
    assert!(first.ok);

    let second = service.create(100).await.unwrap();
    assert!(!second.ok);
    let errors = second.errors.unwrap();
    assert_eq!(errors[0].field, "id");
    assert_eq!(errors[0].message, "This Movie already exists.");

    // the conflicting payload still carries the existing movie
    let existing = second.movie.unwrap();
    assert_eq!(existing.id, first.movie.unwrap().id);

    assert_eq!(store.count_movies().await.unwrap(), 1);
    assert_eq!(store.count_people().await.unwrap(), 1);
    assert_eq!(credit_count(&store).await, 1);
    assert_eq!(gateway.person_fetch_count(), 1);
}

#[tokio::test]
async fn create_with_empty_genre_refs_yields_no_genres() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "Plain", &[]));

    let payload = service.create(100).await.unwrap();
    assert!(payload.ok);
    assert!(payload.movie.unwrap().genres.is_empty());
    assert_eq!(store.count_genres().await.unwrap(), 3);
}

#[tokio::test]
async fn shared_person_deduplicated_across_imports() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "First", &[]));
    gateway.set_movie(movie_data(200, "Second", &[]));
    gateway.set_person(person_data(7, "Alice"));
    gateway.set_credits(100, vec![credit(7, "c1", "Acting", None, Some(0))]);
    gateway.set_credits(200, vec![credit(7, "c2", "Acting", None, Some(0))]);

    let first = service.create(100).await.unwrap();
    let second = service.create(200).await.unwrap();
    assert!(first.ok && second.ok);

    assert_eq!(store.count_people().await.unwrap(), 1);

    let credits_first = service.credits(first.movie.unwrap().id).await.unwrap();
    let credits_second = service.credits(second.movie.unwrap().id).await.unwrap();
    assert_eq!(
        credits_first[0].person.id,
        credits_second[0].person.id
    );
}

#[tokio::test]
async fn concurrent_imports_share_one_person_row() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "First", &[]));
    gateway.set_movie(movie_data(200, "Second", &[]));
    gateway.set_person(person_data(7, "Alice"));
    gateway.set_credits(100, vec![credit(7, "c1", "Acting", None, Some(0))]);
    gateway.set_credits(200, vec![credit(7, "c2", "Acting", None, Some(0))]);

    let (first, second) = tokio::join!(service.create(100), service.create(200));
    assert!(first.unwrap().ok);
    assert!(second.unwrap().ok);

    assert_eq!(store.count_people().await.unwrap(), 1);
    assert_eq!(credit_count(&store).await, 2);
}

#[tokio::test]
async fn existing_person_attributes_are_not_refreshed() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "First", &[]));
    gateway.set_person(person_data(7, "Old Name"));
    gateway.set_credits(100, vec![credit(7, "c1", "Acting", None, Some(0))]);
    service.create(100).await.unwrap();

    // provider now reports different attributes for the same person
    gateway.set_person(person_data(7, "New Name"));
    gateway.set_movie(movie_data(200, "Second", &[]));
    gateway.set_credits(200, vec![credit(7, "c2", "Acting", None, Some(0))]);
    let payload = service.create(200).await.unwrap();

    let credits = service.credits(payload.movie.unwrap().id).await.unwrap();
    assert_eq!(credits[0].person.name, "Old Name");
    assert_eq!(store.count_people().await.unwrap(), 1);
    assert_eq!(gateway.person_fetch_count(), 1);
}

#[tokio::test]
async fn update_applies_only_supplied_fields() {
    let (_store, gateway, service) = setup().await;

    let mut data = movie_data(100, "Inception", &[]);
    data.backdrop = Some("/backdrop-v1.jpg".to_string());
    data.poster = Some("/poster-v1.jpg".to_string());
    gateway.set_movie(data);

    let movie = service.create(100).await.unwrap().movie.unwrap();

    let payload = service
        .update(
            movie.id,
            MovieUpdateInput {
                poster: Some("/poster-v2.jpg".to_string()),
                backdrop: None,
            },
        )
        .await
        .unwrap();

    assert!(payload.ok);
    let updated = payload.movie.unwrap();
    assert_eq!(updated.poster.as_deref(), Some("/poster-v2.jpg"));
    assert_eq!(updated.backdrop.as_deref(), Some("/backdrop-v1.jpg"));
}

#[tokio::test]
async fn update_with_no_fields_is_a_successful_noop() {
    let (_store, gateway, service) = setup().await;

    let mut data = movie_data(100, "Inception", &[]);
    data.backdrop = Some("/backdrop.jpg".to_string());
    gateway.set_movie(data);

    let movie = service.create(100).await.unwrap().movie.unwrap();

    let payload = service
        .update(movie.id, MovieUpdateInput::default())
        .await
        .unwrap();

    assert!(payload.ok);
    let updated = payload.movie.unwrap();
    assert_eq!(updated.backdrop.as_deref(), Some("/backdrop.jpg"));
    assert_eq!(updated.poster, None);

    // empty strings count as "not supplied" as well
    let payload = service
        .update(
            updated.id,
            MovieUpdateInput {
                backdrop: Some(String::new()),
                poster: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert!(payload.ok);
    assert_eq!(
        payload.movie.unwrap().backdrop.as_deref(),
        Some("/backdrop.jpg")
    );
}

#[tokio::test]
async fn update_missing_movie_reports_not_found() {
    let (_store, _gateway, service) = setup().await;

    let payload = service
        .update(4711, MovieUpdateInput::default())
        .await
        .unwrap();

    assert!(!payload.ok);
    assert!(payload.movie.is_none());
    let errors = payload.errors.unwrap();
    assert_eq!(errors[0].field, "id");
    assert_eq!(errors[0].message, "Movie not found.");
}

#[tokio::test]
async fn refetch_replaces_genres_and_credits_wholesale() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "Inception", &[1]));
    gateway.set_person(person_data(7, "Alice"));
    gateway.set_credits(100, vec![credit(7, "c1", "Acting", None, Some(0))]);

    let movie = service.create(100).await.unwrap().movie.unwrap();
    assert_eq!(genre_names(&movie), vec!["Foo"]);

    // provider state moves to a disjoint genre set and a new credit list
    gateway.set_movie(movie_data(100, "Inception", &[2, 3]));
    gateway.set_person(person_data(8, "Bob"));
    gateway.set_credits(100, vec![credit(8, "c9", "Directing", None, None)]);

    let payload = service
        .refetch(movie.id, MovieRefetchInput::default())
        .await
        .unwrap();

    assert!(payload.ok);
    let refreshed = payload.movie.unwrap();
    assert_eq!(genre_names(&refreshed), vec!["Bar", "Baz"]);

    let credits = service.credits(refreshed.id).await.unwrap();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].person.name, "Bob");

    // Alice's row survives; people are shared reference entities
    assert_eq!(store.count_people().await.unwrap(), 2);
}

#[tokio::test]
async fn refetch_preserves_images_unless_requested() {
    let (_store, gateway, service) = setup().await;

    let mut data = movie_data(100, "Old Title", &[]);
    data.backdrop = Some("/backdrop-v1.jpg".to_string());
    data.poster = Some("/poster-v1.jpg".to_string());
    gateway.set_movie(data);

    let movie = service.create(100).await.unwrap().movie.unwrap();

    let mut fresh = movie_data(100, "New Title", &[]);
    fresh.backdrop = Some("/backdrop-v2.jpg".to_string());
    fresh.poster = Some("/poster-v2.jpg".to_string());
    gateway.set_movie(fresh.clone());

    let payload = service
        .refetch(movie.id, MovieRefetchInput::default())
        .await
        .unwrap();
    let refreshed = payload.movie.unwrap();
    assert_eq!(refreshed.title, "New Title");
    assert_eq!(refreshed.backdrop.as_deref(), Some("/backdrop-v1.jpg"));
    assert_eq!(refreshed.poster.as_deref(), Some("/poster-v1.jpg"));

    let payload = service
        .refetch(refreshed.id, MovieRefetchInput { with_images: true })
        .await
        .unwrap();
    let refreshed = payload.movie.unwrap();
    assert_eq!(refreshed.backdrop.as_deref(), Some("/backdrop-v2.jpg"));
    assert_eq!(refreshed.poster.as_deref(), Some("/poster-v2.jpg"));
}

#[tokio::test]
async fn refetch_missing_movie_reports_not_found() {
    let (_store, _gateway, service) = setup().await;

    let payload = service
        .refetch(4711, MovieRefetchInput::default())
        .await
        .unwrap();

    assert!(!payload.ok);
    assert_eq!(payload.errors.unwrap()[0].message, "Movie not found.");
}

#[tokio::test]
async fn delete_removes_movie_and_credits_but_keeps_people() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "Inception", &[1]));
    gateway.set_person(person_data(7, "Alice"));
    gateway.set_credits(100, vec![credit(7, "c1", "Acting", None, Some(0))]);

    let movie = service.create(100).await.unwrap().movie.unwrap();

    let payload = service.delete(movie.id).await.unwrap();
    assert!(payload.ok);
    assert!(payload.errors.is_none());

    let looked_up = service
        .get(MovieQuery {
            id: Some(movie.id),
            title: None,
        })
        .await
        .unwrap();
    assert!(looked_up.is_none());

    assert_eq!(credit_count(&store).await, 0);
    assert_eq!(store.count_people().await.unwrap(), 1);
    assert_eq!(store.count_genres().await.unwrap(), 3);
}

#[tokio::test]
async fn delete_missing_movie_fails_with_field_error() {
    let (_store, _gateway, service) = setup().await;

    let payload = service.delete(4711).await.unwrap();
    assert!(!payload.ok);
    let errors = payload.errors.unwrap();
    assert_eq!(errors[0].field, "id");
    assert_eq!(errors[0].message, "Error during movie delete.");
}

#[tokio::test]
async fn lookup_requires_exactly_one_key() {
    let (_store, _gateway, service) = setup().await;

    let err = service
        .get(MovieQuery {
            id: Some(1),
            title: Some("X".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MovieError::Validation(_)));
    assert_eq!(
        err.to_string(),
        "Invalid request: You can only search by one attribute."
    );

    let err = service.get(MovieQuery::default()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid request: You must enter at least one attribute."
    );
}

#[tokio::test]
async fn lookup_by_id_or_title() {
    let (_store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "Inception", &[]));
    let movie = service.create(100).await.unwrap().movie.unwrap();

    let by_id = service
        .get(MovieQuery {
            id: Some(movie.id),
            title: None,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.title, "Inception");

    let by_title = service
        .get(MovieQuery {
            id: None,
            title: Some("Inception".to_string()),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_title.id, movie.id);

    let missing = service
        .get(MovieQuery {
            id: None,
            title: Some("Nope".to_string()),
        })
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn list_connection_orders_and_pages() {
    let (_store, gateway, service) = setup().await;

    for (tmdb, title) in [(201, "Foo"), (202, "Bar"), (203, "Baz")] {
        gateway.set_movie(movie_data(tmdb, title, &[]));
        assert!(service.create(tmdb).await.unwrap().ok);
    }

    let titles = |conn: &filmarr::models::page::Connection<filmarr::api::MovieDto>| {
        conn.edges
            .iter()
            .map(|edge| edge.node.title.clone())
            .collect::<Vec<_>>()
    };

    let asc = service
        .list_connection(
            MovieFilter::default(),
            Some("title".to_string()),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(titles(&asc), vec!["Bar", "Baz", "Foo"]);
    assert_eq!(asc.total_count, 3);

    let desc = service
        .list_connection(
            MovieFilter::default(),
            Some("-title".to_string()),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(titles(&desc), vec!["Foo", "Baz", "Bar"]);

    let last_page = service
        .list_connection(
            MovieFilter::default(),
            Some("title".to_string()),
            PageRequest {
                limit: Some(1),
                offset: Some(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(titles(&last_page), vec!["Foo"]);
    assert!(!last_page.page_info.has_next_page);
    assert!(last_page.page_info.has_previous_page);
    assert_eq!(last_page.total_count, 3);

    let err = service
        .list_connection(
            MovieFilter::default(),
            Some("-rating".to_string()),
            PageRequest::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MovieError::Validation(_)));
}

#[tokio::test]
async fn list_plain_filters_by_genre() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "FooMovie", &[1]));
    gateway.set_movie(movie_data(200, "BarMovie", &[2]));
    service.create(100).await.unwrap();
    service.create(200).await.unwrap();

    let genre_service = GenreService::new(store.clone());
    let foo = genre_service
        .get(GenreQuery {
            id: None,
            name: Some("Foo".to_string()),
        })
        .await
        .unwrap()
        .unwrap();

    let movies = service
        .list_plain(
            MovieFilter {
                genre_id: Some(foo.id),
                ..MovieFilter::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "FooMovie");
}

#[tokio::test]
async fn filmography_carries_role_metadata() {
    let (store, gateway, service) = setup().await;

    gateway.set_movie(movie_data(100, "The Matrix", &[1]));
    gateway.set_person(person_data(7, "Keanu"));
    gateway.set_credits(
        100,
        vec![credit(7, "c1", "Acting", Some("Neo"), Some(0))],
    );
    let movie = service.create(100).await.unwrap().movie.unwrap();

    let person_service = PersonService::new(store.clone());
    let credits = service.credits(movie.id).await.unwrap();
    let person_id = credits[0].person.id;

    let filmography = person_service.filmography(person_id).await.unwrap();
    assert_eq!(filmography.len(), 1);
    assert_eq!(filmography[0].movie.title, "The Matrix");
    assert_eq!(filmography[0].department, "Acting");
    assert_eq!(filmography[0].character.as_deref(), Some("Neo"));
    assert_eq!(filmography[0].cast_order, Some(0));
    assert_eq!(genre_names(&filmography[0].movie), vec!["Foo"]);
}
